//! Merger-tree construction.
//!
//! [`TreeBuilder`] turns a flat, unlinked [`HaloCatalog`] into a forest
//! of [`MergerTree`]s. Roots are the halos at the last output snapshot;
//! linking then sweeps the remaining snapshots in descending order so
//! that every halo's descendant is already rooted or linked by the time
//! the halo itself is visited, making resolution a single by-ID lookup.
//!
//! The failure policy is deliberately asymmetric. A subhalo whose
//! descendant *halo* cannot be resolved is a normal outcome of a
//! structure finder losing a small halo: the owning halo and everything
//! upstream of it are pruned and counted. A descendant halo that exists
//! but lacks the claimed descendant *subhalo*, or a second descendant
//! for an already-linked subhalo or halo, is corrupt input and aborts
//! the run.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::model::catalog::{HaloCatalog, HaloKey, SubhaloKey, TreeKey};
use crate::model::halo::HaloId;
use crate::model::tree::MergerTree;

use super::config::ExecutionParameters;
use super::error::Error;

/// Builds merger trees from an unlinked halo catalog.
pub struct TreeBuilder {
    exec_params: ExecutionParameters,
}

impl TreeBuilder {
    pub fn new(exec_params: ExecutionParameters) -> Self {
        Self { exec_params }
    }

    /// Builds the merger-tree forest in place.
    ///
    /// Creates one [`MergerTree`] per halo at the last output snapshot,
    /// then links every traceable ancestor into those trees. On success
    /// returns the keys of the created trees; any error leaves no
    /// partial forest contract — the catalog must be discarded.
    ///
    /// # Errors
    ///
    /// [`Error::NoOutputSnapshots`] when the execution parameters are
    /// empty, [`Error::MissingRootSnapshot`] when no halo exists at the
    /// last output snapshot, and the fatal data-consistency errors
    /// raised by linking (see [`Error`]).
    pub fn build_trees(&self, catalog: &mut HaloCatalog) -> Result<Vec<TreeKey>, Error> {
        let last_snapshot = self
            .exec_params
            .last_snapshot_to_consider()
            .ok_or(Error::NoOutputSnapshots)?;

        // Find roots and create trees for each of them.
        let halo_keys: Vec<HaloKey> = catalog.halo_keys().collect();
        let mut trees = Vec::new();
        for halo_key in &halo_keys {
            if catalog.halo(*halo_key).snapshot != last_snapshot {
                continue;
            }
            let tree_key = catalog.add_tree(MergerTree::new(trees.len() as i64));
            log::debug!(
                "creating {} at {}",
                catalog.tree(tree_key),
                catalog.halo(*halo_key)
            );
            catalog.halo_mut(*halo_key).merger_tree = Some(tree_key);
            catalog.tree_mut(tree_key).add_halo(last_snapshot, *halo_key);
            trees.push(tree_key);
        }

        // No halos found at the desired snapshot, end now.
        if trees.is_empty() {
            let snapshots_found: BTreeSet<i32> = halo_keys
                .iter()
                .map(|&k| catalog.halo(k).snapshot)
                .collect();
            return Err(Error::MissingRootSnapshot {
                last_snapshot,
                snapshots_found: snapshots_found.into_iter().collect(),
                output_snapshots: self.exec_params.output_snapshots.iter().copied().collect(),
            });
        }

        self.loop_through_halos(catalog)?;

        Ok(trees)
    }

    /// Links subhalos/halos to their descendants, snapshot by snapshot.
    ///
    /// To find the subhalos/halos that correspond to each other:
    ///  1. Iterate over snapshots in descending order, skipping the most
    ///     recent one (those halos are already rooted).
    ///  2. For each snapshot iterate over its halos, and for each halo
    ///     over its subhalos in mass-descending order.
    ///  3. For each subhalo find the halo matching its
    ///     `descendant_halo_id` in the global by-ID index, then the
    ///     subhalo inside it matching `descendant_id`.
    ///  4. Link subhalo, halo, descendant subhalo, and descendant halo
    ///     together, and the halo into the descendant's tree.
    fn loop_through_halos(&self, catalog: &mut HaloCatalog) -> Result<(), Error> {
        // Index all halos by snapshot and by ID; the by-ID index shrinks
        // as lineages are pruned.
        let mut halos_by_snapshot: BTreeMap<i32, Vec<HaloKey>> = BTreeMap::new();
        let mut halos_by_id: HashMap<HaloId, HaloKey> = HashMap::new();
        for key in catalog.halo_keys() {
            let halo = catalog.halo(key);
            halos_by_snapshot.entry(halo.snapshot).or_default().push(key);
            halos_by_id.insert(halo.id, key);
        }

        // All snapshots present, in decreasing order, skipping the most
        // recent one.
        let sorted_halo_snapshots: Vec<i32> =
            halos_by_snapshot.keys().rev().skip(1).copied().collect();

        for snapshot in sorted_halo_snapshots {
            log::info!("linking halos/subhalos at snapshot {}", snapshot);

            // Materialized before linking begins: by-ID removals below
            // must never affect the snapshot currently being swept.
            let halos_here: Vec<HaloKey> = halos_by_snapshot[&snapshot].clone();

            let mut ignored = 0usize;
            for &halo_key in &halos_here {
                for subhalo_key in catalog.all_subhalos(halo_key) {
                    let subhalo = catalog.subhalo(subhalo_key);

                    // This subhalo has no descendant, let's not even try.
                    if !subhalo.has_descendant_marker() {
                        log::debug!("{} has no descendant, not following", subhalo);
                        continue;
                    }

                    let descendant_id = subhalo.descendant_id;
                    let descendant_halo_id = subhalo.descendant_halo_id;

                    // If the descendant halo is not found we don't
                    // consider this halo anymore, nor any of its
                    // progenitors: later snapshots resolve through the
                    // by-ID index, so erasing the entry prunes the whole
                    // upstream lineage.
                    let Some(&d_halo_key) = halos_by_id.get(&descendant_halo_id) else {
                        log::debug!(
                            "{} points to descendant halo/subhalo {} / {}, which doesn't exist; \
                             ignoring this halo and the rest of its progenitors",
                            catalog.subhalo(subhalo_key),
                            descendant_halo_id,
                            descendant_id,
                        );
                        halos_by_id.remove(&catalog.halo(halo_key).id);
                        ignored += 1;
                        break;
                    };

                    // The descendant halo exists; the claimed subhalo
                    // inside it must too.
                    let d_subhalo_key = catalog
                        .all_subhalos(d_halo_key)
                        .into_iter()
                        .find(|&k| catalog.subhalo(k).id == descendant_id);

                    match d_subhalo_key {
                        Some(d_subhalo_key) => {
                            self.link(catalog, subhalo_key, d_subhalo_key, halo_key, d_halo_key)?;
                        }
                        None => {
                            let subhalos_present: Vec<_> = catalog
                                .all_subhalos(d_halo_key)
                                .into_iter()
                                .map(|k| catalog.subhalo(k).id)
                                .collect();
                            return Err(Error::dangling_descendant_subhalo(
                                catalog.subhalo(subhalo_key).id,
                                descendant_id,
                                catalog.halo(d_halo_key).id,
                                subhalos_present,
                            ));
                        }
                    }
                }
            }

            log::info!(
                "{}/{} halos ignored at snapshot {} due to missing descendant halo \
                 (i.e., they were the last of their family line)",
                ignored,
                halos_here.len(),
                snapshot,
            );
        }

        Ok(())
    }

    /// Establishes the parentage links between a subhalo/halo pair and
    /// their descendants, and attaches the halo to the descendant's
    /// merger tree.
    ///
    /// Duplicate detection runs before any edge is written, so a failed
    /// link leaves no partial back-reference. At halo granularity a
    /// repeated link into the same descendant is idempotent: several
    /// subhalos of one halo routinely descend into the same halo, and
    /// only the first of those links performs the halo-level attach.
    fn link(
        &self,
        catalog: &mut HaloCatalog,
        subhalo: SubhaloKey,
        d_subhalo: SubhaloKey,
        halo: HaloKey,
        d_halo: HaloKey,
    ) -> Result<(), Error> {
        // Parentage at subhalo level; a subhalo resolves to exactly one
        // descendant.
        if let Some(existing) = catalog.subhalo(subhalo).descendant {
            return Err(Error::DuplicateSubhaloDescendant {
                subhalo_id: catalog.subhalo(subhalo).id,
                existing: catalog.subhalo(existing).id,
                rejected: catalog.subhalo(d_subhalo).id,
            });
        }
        catalog.subhalo_mut(d_subhalo).ascendants.push(subhalo);
        catalog.subhalo_mut(subhalo).descendant = Some(d_subhalo);

        // Parentage at halo level.
        if let Some(existing) = catalog.halo(halo).descendant {
            let existing_id = catalog.halo(existing).id;
            let d_halo_id = catalog.halo(d_halo).id;
            if existing_id != d_halo_id {
                return Err(Error::DuplicateHaloDescendant {
                    halo_id: catalog.halo(halo).id,
                    existing: existing_id,
                    rejected: d_halo_id,
                });
            }
            // Same descendant as before: the halo-level attach already
            // happened.
            return Ok(());
        }

        log::debug!(
            "linking {} as descendant of {}",
            catalog.halo(d_halo),
            catalog.halo(halo)
        );
        catalog.halo_mut(d_halo).ascendants.push(halo);
        catalog.halo_mut(halo).descendant = Some(d_halo);

        // Attach the halo to the descendant's merger tree and index it
        // under its own snapshot.
        let tree_key = catalog
            .halo(d_halo)
            .merger_tree
            .ok_or_else(|| Error::UnrootedDescendant {
                halo_id: catalog.halo(d_halo).id,
                snapshot: catalog.halo(d_halo).snapshot,
            })?;
        let snapshot = catalog.halo(halo).snapshot;
        catalog.halo_mut(halo).merger_tree = Some(tree_key);
        catalog.tree_mut(tree_key).add_halo(snapshot, halo);

        Ok(())
    }
}
