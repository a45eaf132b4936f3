//! Error types for merger-tree construction and snapshot evolution.
//!
//! Unresolvable descendant halos are not represented here: losing track
//! of a small halo is a normal structure-finder outcome, so those
//! lineages are pruned and counted rather than surfaced as errors.
//! Everything in this enum signals corrupt input or malformed state and
//! aborts the run.

use thiserror::Error;

use crate::model::halo::HaloId;
use crate::model::subhalo::SubhaloId;

/// Errors that can occur while building merger trees or advancing
/// galaxies across snapshots.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to parse execution parameters TOML.
    #[error("failed to parse execution parameters: {0}")]
    ParameterParse(#[from] toml::de::Error),

    /// The execution parameters name no output snapshots.
    #[error("no output snapshots configured: at least one is required to identify tree roots")]
    NoOutputSnapshots,

    /// No halos exist at the configured final output snapshot.
    ///
    /// Without roots the run cannot proceed; the variant lists which
    /// snapshots actually contain halos to aid diagnosis.
    #[error(
        "no halo definitions found at snapshot {last_snapshot}, cannot proceed with merger tree creation; \
         halos found at snapshots {snapshots_found:?}, output snapshots considered: {output_snapshots:?}"
    )]
    MissingRootSnapshot {
        /// The last snapshot to consider, where roots were expected.
        last_snapshot: i32,
        /// Snapshots that do contain halos, sorted ascending.
        snapshots_found: Vec<i32>,
        /// The configured output snapshots.
        output_snapshots: Vec<i32>,
    },

    /// A descendant halo was resolved but contains no subhalo matching
    /// the claimed descendant ID. The catalog is corrupt.
    #[error(
        "descendant subhalo id={descendant_id} for subhalo {subhalo_id} not found in its descendant \
         halo {descendant_halo_id}; subhalos present there: {subhalos_present:?}"
    )]
    DanglingDescendantSubhalo {
        /// The subhalo whose descendant was being resolved.
        subhalo_id: SubhaloId,
        /// The claimed descendant subhalo ID.
        descendant_id: SubhaloId,
        /// The halo that was searched.
        descendant_halo_id: HaloId,
        /// IDs of the subhalos actually present in the descendant halo.
        subhalos_present: Vec<SubhaloId>,
    },

    /// A subhalo would receive a second descendant.
    #[error(
        "subhalo {subhalo_id} already has descendant {existing}; refusing to also link {rejected}"
    )]
    DuplicateSubhaloDescendant {
        subhalo_id: SubhaloId,
        existing: SubhaloId,
        rejected: SubhaloId,
    },

    /// A halo would receive a second, different descendant.
    #[error(
        "halo {halo_id} already has descendant {existing}; refusing to relink to {rejected}"
    )]
    DuplicateHaloDescendant {
        halo_id: HaloId,
        existing: HaloId,
        rejected: HaloId,
    },

    /// A resolved descendant halo belongs to no merger tree.
    ///
    /// The descending sweep guarantees every reachable descendant is
    /// already rooted or linked; hitting this means the catalog's
    /// snapshot/descendant fields contradict each other.
    #[error("descendant halo {halo_id} at snapshot {snapshot} is not attached to any merger tree")]
    UnrootedDescendant { halo_id: HaloId, snapshot: i32 },

    /// A central subhalo about to merge into another lineage hosts
    /// galaxies but none of them is central.
    #[error(
        "subhalo {subhalo_id} hosts {galaxy_count} galaxies but none is central; cannot demote to type 1"
    )]
    MissingCentralGalaxy {
        subhalo_id: SubhaloId,
        galaxy_count: usize,
    },

    /// A snapshot of an evolving tree has no epoch (redshift/timestep)
    /// entry.
    #[error("no epoch (redshift, delta_t) provided for snapshot {snapshot}")]
    MissingEpoch { snapshot: i32 },
}

impl Error {
    /// Creates a [`DanglingDescendantSubhalo`](Error::DanglingDescendantSubhalo) error.
    pub fn dangling_descendant_subhalo(
        subhalo_id: SubhaloId,
        descendant_id: SubhaloId,
        descendant_halo_id: HaloId,
        subhalos_present: Vec<SubhaloId>,
    ) -> Self {
        Self::DanglingDescendantSubhalo {
            subhalo_id,
            descendant_id,
            descendant_halo_id,
            subhalos_present,
        }
    }
}
