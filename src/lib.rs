//! A pure Rust engine for merger-tree construction and cross-snapshot galaxy
//! evolution in semi-analytic models of galaxy formation.
//! It links the halos/subhalos of an N-body structure-finder catalog into
//! validated merger trees and carries galaxies and baryon reservoirs forward
//! along those links so per-snapshot physics can be applied.
//!
//! # Features
//!
//! - **Tree building** — Roots identified at the last output snapshot, then a
//!   descending-time sweep links every traceable ancestor with strict
//!   single-descendant invariants
//! - **Partial-failure handling** — Lineages whose descendant halo was lost by
//!   the structure finder are pruned and counted; contradictory descendant
//!   claims abort the run
//! - **Snapshot advancement** — Galaxies move (never copy) to descendant
//!   subhalos, halo-scale gas reservoirs and cooling histories are carried
//!   forward, central galaxies falling into other lineages are demoted
//! - **Pluggable physics** — Per-galaxy rate equations live behind the
//!   [`PhysicalModel`] trait, invoked once per galaxy per snapshot
//!
//! # Quick Start
//!
//! Construct a [`HaloCatalog`] from your catalog rows, declare the output
//! snapshots, and call [`build_trees`]:
//!
//! ```
//! use halo_forge::{Halo, HaloCatalog, Subhalo, SubhaloType};
//! use halo_forge::{build_trees, ExecutionParameters, TreeError};
//!
//! let mut catalog = HaloCatalog::new();
//!
//! // Snapshot 2 is the last output snapshot: this halo becomes a tree root.
//! let root = catalog.add_halo(Halo::new(300, 2));
//! let root_sub = catalog.add_subhalo(root, Subhalo::new(3, 2, SubhaloType::Central));
//!
//! // A progenitor at snapshot 1 whose subhalo descends into the root.
//! let mid = catalog.add_halo(Halo::new(200, 1));
//! let mut sub = Subhalo::new(2, 1, SubhaloType::Central);
//! sub.descendant_id = 3;
//! sub.descendant_halo_id = 300;
//! sub.descendant_snapshot = 2;
//! let mid_sub = catalog.add_subhalo(mid, sub);
//!
//! let params = ExecutionParameters::new([2]);
//! let trees = build_trees(&mut catalog, &params)?;
//!
//! // One root, one tree, both halos linked into it.
//! assert_eq!(trees.len(), 1);
//! assert_eq!(catalog.halo(root).merger_tree, Some(trees[0]));
//! assert_eq!(catalog.halo(mid).merger_tree, Some(trees[0]));
//!
//! // The subhalo link is resolved and back-referenced.
//! assert_eq!(catalog.subhalo(mid_sub).descendant, Some(root_sub));
//! assert_eq!(catalog.subhalo(root_sub).ascendants, vec![mid_sub]);
//! # Ok::<(), TreeError>(())
//! ```
//!
//! With the forest built, drive the evolution with [`evolve_tree`] (or the
//! lower-level [`populate_halos`] / [`transfer_galaxies_to_next_snapshot`]
//! pair) and your [`PhysicalModel`] implementation.
//!
//! # Module Organization
//!
//! - [`model`] — Entities: galaxies, subhalos, halos, merger trees, and the
//!   [`HaloCatalog`] arena that owns them
//! - [`tree`] — The [`TreeBuilder`] linking pipeline and the snapshot
//!   evolution driver
//!
//! # Data Types
//!
//! ## Entities
//!
//! - [`Galaxy`] — Disk/bulge baryon reservoirs, a black hole, and a
//!   classification ([`GalaxyType`])
//! - [`Subhalo`] — Virial properties, halo-scale gas, galaxies, and
//!   descendant/ascendant linkage
//! - [`Halo`] — One central plus satellite subhalos and aggregate virial
//!   properties
//! - [`MergerTree`] — One lineage's halos indexed by snapshot
//! - [`Baryon`] / [`BlackHole`] — Mass and metal bookkeeping per phase
//!
//! ## Pipeline
//!
//! - [`ExecutionParameters`] — Output snapshot selection, loadable from TOML
//! - [`TreeBuilder`] — Forest construction with invariant validation
//! - [`PhysicalModel`] / [`Epoch`] — The per-galaxy physics interface and the
//!   redshift/timestep of a snapshot
//! - [`TreeError`] — All fatal conditions of building and evolving

pub mod model;
pub mod tree;

pub use model::baryon::{Baryon, BlackHole};
pub use model::catalog::{HaloCatalog, HaloKey, SubhaloKey, TreeKey};
pub use model::galaxy::{Galaxy, GalaxyId, GalaxyType};
pub use model::halo::{Halo, HaloId};
pub use model::mixins::{Identifiable, Spatial};
pub use model::subhalo::{
    CoolingHistory, DuplicateCentralGalaxy, Subhalo, SubhaloId, SubhaloType, NO_DESCENDANT,
};
pub use model::tree::{MergerTree, TreeId};

pub use tree::{
    build_trees, destroy_galaxies_this_snapshot, evolve_tree, populate_halos,
    transfer_galaxies_to_next_snapshot, Epoch, ExecutionParameters, PhysicalModel, TreeBuilder,
};

pub use tree::Error as TreeError;
