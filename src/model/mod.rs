//! Core data structures representing dark-matter structures and their baryons.
//!
//! This module provides the foundational types that flow through `halo-forge`:
//!
//! - [`mixins`] – Identity and spatial capabilities shared by all entity kinds.
//! - [`baryon`] – Mass/metal bookkeeping for gas, stellar, and black-hole phases.
//! - [`galaxy`] – Galaxies composed of disk/bulge reservoirs and a central black hole.
//! - [`subhalo`] – Subhalos, the atomic units of dark-matter clustering.
//! - [`halo`] – Halos grouping one central and zero or more satellite subhalos.
//! - [`tree`] – Merger trees indexing halos by snapshot.
//! - [`catalog`] – The arena that owns every halo, subhalo, and tree.
//!
//! The data model intentionally separates per-snapshot structure
//! ([`Halo`]/[`Subhalo`]) from cross-snapshot lineage ([`MergerTree`]),
//! allowing the [`crate::tree`] pipeline to wire the former into the latter
//! while mutating no baryonic state.
//!
//! [`Halo`]: halo::Halo
//! [`Subhalo`]: subhalo::Subhalo
//! [`MergerTree`]: tree::MergerTree

pub mod baryon;
pub mod catalog;
pub mod galaxy;
pub mod halo;
pub mod mixins;
pub mod subhalo;
pub mod tree;
