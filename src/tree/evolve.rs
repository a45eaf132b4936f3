//! Cross-snapshot galaxy evolution.
//!
//! Once the forest is linked, each snapshot of a tree is processed in
//! two phases: [`populate_halos`] applies the physics model to every
//! galaxy of every subhalo of a halo, and
//! [`transfer_galaxies_to_next_snapshot`] carries the surviving state
//! (galaxies, halo-scale gas, cooling history) onto the descendant
//! subhalos so the next snapshot starts from it. [`evolve_tree`] drives
//! both phases over a whole tree. Processing assumes linking has fully
//! succeeded; within one tree snapshots are strictly sequential.

use std::collections::BTreeMap;
use std::mem;

use crate::model::catalog::{HaloCatalog, HaloKey, SubhaloKey, TreeKey};
use crate::model::galaxy::{Galaxy, GalaxyType};
use crate::model::subhalo::{Subhalo, SubhaloType};

use super::error::Error;

/// The per-galaxy physics applied at every snapshot.
///
/// Implementations hold the astrophysical rate equations (cooling, star
/// formation, feedback, instabilities); the driver only guarantees one
/// invocation per galaxy per snapshot and imposes no processing order
/// across galaxies beyond the host subhalo's list order.
pub trait PhysicalModel {
    /// Evolves one galaxy over the timestep ending at redshift `z`.
    fn evolve_galaxy(&mut self, subhalo: &mut Subhalo, galaxy: &mut Galaxy, z: f64, delta_t: f64);
}

/// Redshift and timestep of one snapshot interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Epoch {
    pub redshift: f64,
    pub delta_t: f64,
}

/// Applies the physics model to every galaxy of every subhalo of `halo`.
pub fn populate_halos(
    model: &mut dyn PhysicalModel,
    catalog: &mut HaloCatalog,
    halo: HaloKey,
    snapshot: i32,
    z: f64,
    delta_t: f64,
) {
    log::debug!(
        "evolving galaxies of {} at snapshot {}",
        catalog.halo(halo),
        snapshot
    );
    for subhalo_key in catalog.all_subhalos(halo) {
        evolve_system(model, catalog, subhalo_key, z, delta_t);
    }
}

/// Solves the physics for every galaxy of one subhalo.
fn evolve_system(
    model: &mut dyn PhysicalModel,
    catalog: &mut HaloCatalog,
    subhalo_key: SubhaloKey,
    z: f64,
    delta_t: f64,
) {
    // Detach the galaxy list so the model can mutate galaxy and subhalo
    // at the same time.
    let mut galaxies = mem::take(&mut catalog.subhalo_mut(subhalo_key).galaxies);

    let subhalo = catalog.subhalo_mut(subhalo_key);
    for galaxy in &mut galaxies {
        model.evolve_galaxy(subhalo, galaxy, z, delta_t);
    }

    // The model may have created new galaxies while the list was
    // detached; keep them behind the evolved ones.
    let subhalo = catalog.subhalo_mut(subhalo_key);
    galaxies.append(&mut subhalo.galaxies);
    subhalo.galaxies = galaxies;
}

/// Moves galaxies and copies halo-scale gas from every subhalo of `halo`
/// onto its descendant subhalo.
///
/// A central subhalo whose descendant is a satellite is merging into
/// another lineage: its central galaxy is demoted to type 1 before the
/// move. Subhalos without a linked descendant are terminal leaves; their
/// galaxies stay in place for [`destroy_galaxies_this_snapshot`].
///
/// # Errors
///
/// [`Error::MissingCentralGalaxy`] when a demotion is due but the
/// subhalo hosts galaxies and none of them is central — malformed
/// post-link state.
pub fn transfer_galaxies_to_next_snapshot(
    catalog: &mut HaloCatalog,
    halo: HaloKey,
) -> Result<(), Error> {
    for subhalo_key in catalog.all_subhalos(halo) {
        let Some(descendant_key) = catalog.subhalo(subhalo_key).descendant else {
            log::debug!(
                "{} has no descendant; leaving its galaxies in place",
                catalog.subhalo(subhalo_key)
            );
            continue;
        };

        let subhalo_type = catalog.subhalo(subhalo_key).subhalo_type;
        let descendant_type = catalog.subhalo(descendant_key).subhalo_type;
        if subhalo_type == SubhaloType::Central && descendant_type == SubhaloType::Satellite {
            demote_central_galaxy(catalog.subhalo_mut(subhalo_key))?;
        }

        catalog.transfer_galaxies(subhalo_key, descendant_key);
        catalog.copy_halo_gas(subhalo_key, descendant_key);
    }
    Ok(())
}

/// Reclassifies the central galaxy of a subhalo merging into another
/// lineage as a type 1 satellite.
///
/// An empty galaxy list is a legitimate pre-population state and a
/// no-op; a populated list with no central galaxy is malformed.
fn demote_central_galaxy(subhalo: &mut Subhalo) -> Result<(), Error> {
    if subhalo.galaxies.is_empty() {
        return Ok(());
    }
    match subhalo.central_galaxy_mut() {
        Some(galaxy) => {
            galaxy.galaxy_type = GalaxyType::Type1;
            Ok(())
        }
        None => Err(Error::MissingCentralGalaxy {
            subhalo_id: subhalo.id,
            galaxy_count: subhalo.galaxies.len(),
        }),
    }
}

/// Clears the galaxy list of every subhalo across the given halos.
///
/// Used once terminal lineages have been fully processed and persisted,
/// to bound memory growth across a long snapshot sweep. Idempotent.
pub fn destroy_galaxies_this_snapshot(catalog: &mut HaloCatalog, halos: &[HaloKey]) {
    for &halo in halos {
        for subhalo_key in catalog.all_subhalos(halo) {
            catalog.subhalo_mut(subhalo_key).galaxies.clear();
        }
    }
}

/// Evolves one merger tree from its earliest to its latest snapshot.
///
/// For each snapshot the tree's halos are populated with the physics
/// model and, for every snapshot but the last, their galaxies and gas
/// reservoirs are transferred to the descendants.
///
/// # Errors
///
/// [`Error::MissingEpoch`] when a snapshot of the tree has no entry in
/// `epochs`, plus anything [`transfer_galaxies_to_next_snapshot`]
/// raises.
pub fn evolve_tree(
    model: &mut dyn PhysicalModel,
    catalog: &mut HaloCatalog,
    tree: TreeKey,
    epochs: &BTreeMap<i32, Epoch>,
) -> Result<(), Error> {
    let snapshots: Vec<i32> = catalog.tree(tree).halos.keys().copied().collect();
    let Some(&last_snapshot) = snapshots.last() else {
        return Ok(());
    };

    for snapshot in snapshots {
        let epoch = epochs
            .get(&snapshot)
            .copied()
            .ok_or(Error::MissingEpoch { snapshot })?;

        let halos_here: Vec<HaloKey> = catalog.tree(tree).halos[&snapshot].clone();
        for &halo in &halos_here {
            populate_halos(model, catalog, halo, snapshot, epoch.redshift, epoch.delta_t);
        }
        if snapshot != last_snapshot {
            for &halo in &halos_here {
                transfer_galaxies_to_next_snapshot(catalog, halo)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::halo::Halo;
    use crate::model::subhalo::SubhaloId;
    use crate::tree::builder::TreeBuilder;
    use crate::tree::config::ExecutionParameters;

    /// Records every invocation and deposits stellar mass so state flow
    /// is observable across snapshots.
    #[derive(Default)]
    struct RecordingModel {
        calls: Vec<(SubhaloId, i32, i32)>,
    }

    impl PhysicalModel for RecordingModel {
        fn evolve_galaxy(
            &mut self,
            subhalo: &mut Subhalo,
            galaxy: &mut Galaxy,
            _z: f64,
            delta_t: f64,
        ) {
            self.calls.push((subhalo.id, galaxy.id, subhalo.snapshot));
            galaxy.disk_stars.mass += delta_t;
            subhalo.hot_halo_gas.mass += 1.0;
        }
    }

    fn add_halo_with_subhalo(
        catalog: &mut HaloCatalog,
        halo_id: i64,
        snapshot: i32,
        subhalo_id: SubhaloId,
        subhalo_type: SubhaloType,
        mvir: f64,
    ) -> (HaloKey, SubhaloKey) {
        let halo_key = catalog.add_halo(Halo::new(halo_id, snapshot));
        let mut subhalo = Subhalo::new(subhalo_id, snapshot, subhalo_type);
        subhalo.mvir = mvir;
        let subhalo_key = catalog.add_subhalo(halo_key, subhalo);
        (halo_key, subhalo_key)
    }

    /// Central subhalo at snapshot 0 descending into a satellite subhalo
    /// of the root halo at snapshot 1.
    fn make_demotion_scenario() -> (HaloCatalog, HaloKey, SubhaloKey, SubhaloKey) {
        let mut catalog = HaloCatalog::new();
        let (h0, s0) =
            add_halo_with_subhalo(&mut catalog, 100, 0, 1, SubhaloType::Central, 10.0);
        let (h1, _s1) =
            add_halo_with_subhalo(&mut catalog, 200, 1, 2, SubhaloType::Central, 50.0);
        let mut satellite = Subhalo::new(3, 1, SubhaloType::Satellite);
        satellite.mvir = 9.0;
        let d_sat = catalog.add_subhalo(h1, satellite);

        let src = catalog.subhalo_mut(s0);
        src.descendant_id = 3;
        src.descendant_halo_id = 200;
        src.descendant_snapshot = 1;

        TreeBuilder::new(ExecutionParameters::new([1]))
            .build_trees(&mut catalog)
            .unwrap();

        (catalog, h0, s0, d_sat)
    }

    #[test]
    fn populate_halos_visits_every_galaxy_once() {
        let mut catalog = HaloCatalog::new();
        let (halo, central) =
            add_halo_with_subhalo(&mut catalog, 100, 0, 1, SubhaloType::Central, 10.0);
        let mut satellite = Subhalo::new(2, 0, SubhaloType::Satellite);
        satellite.mvir = 2.0;
        let sat = catalog.add_subhalo(halo, satellite);

        catalog
            .subhalo_mut(central)
            .add_galaxy(Galaxy::new(1, GalaxyType::Central))
            .unwrap();
        catalog
            .subhalo_mut(central)
            .add_galaxy(Galaxy::new(2, GalaxyType::Type2))
            .unwrap();
        catalog
            .subhalo_mut(sat)
            .add_galaxy(Galaxy::new(3, GalaxyType::Type1))
            .unwrap();

        let mut model = RecordingModel::default();
        populate_halos(&mut model, &mut catalog, halo, 0, 2.0, 0.1);

        assert_eq!(model.calls, vec![(1, 1, 0), (1, 2, 0), (2, 3, 0)]);
        // The model mutated both sides of the interface.
        assert_eq!(catalog.subhalo(central).hot_halo_gas.mass, 2.0);
        assert!(catalog.subhalo(central).galaxies[0].disk_stars.mass > 0.0);
    }

    #[test]
    fn transfer_demotes_central_into_satellite_lineage() {
        let (mut catalog, h0, s0, d_sat) = make_demotion_scenario();
        catalog
            .subhalo_mut(s0)
            .add_galaxy(Galaxy::new(1, GalaxyType::Central))
            .unwrap();
        catalog
            .subhalo_mut(s0)
            .add_galaxy(Galaxy::new(2, GalaxyType::Type2))
            .unwrap();
        catalog.subhalo_mut(s0).hot_halo_gas.mass = 7.0;
        catalog.subhalo_mut(s0).cooling_history.tcooling.push(0.5);

        transfer_galaxies_to_next_snapshot(&mut catalog, h0).unwrap();

        // Source emptied, descendant received everything.
        assert!(catalog.subhalo(s0).galaxies.is_empty());
        let received = &catalog.subhalo(d_sat).galaxies;
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].id, 1);
        assert_eq!(received[0].galaxy_type, GalaxyType::Type1);
        assert_eq!(received[1].galaxy_type, GalaxyType::Type2);

        // Gas reservoirs overwritten, not merged.
        assert_eq!(catalog.subhalo(d_sat).hot_halo_gas.mass, 7.0);
        assert_eq!(catalog.subhalo(d_sat).cooling_history.tcooling, vec![0.5]);
    }

    #[test]
    fn transfer_without_demotion_keeps_galaxy_types() {
        let mut catalog = HaloCatalog::new();
        let (h0, s0) =
            add_halo_with_subhalo(&mut catalog, 100, 0, 1, SubhaloType::Central, 10.0);
        let (_, _) = add_halo_with_subhalo(&mut catalog, 200, 1, 2, SubhaloType::Central, 12.0);
        let src = catalog.subhalo_mut(s0);
        src.descendant_id = 2;
        src.descendant_halo_id = 200;
        src.descendant_snapshot = 1;
        TreeBuilder::new(ExecutionParameters::new([1]))
            .build_trees(&mut catalog)
            .unwrap();

        catalog
            .subhalo_mut(s0)
            .add_galaxy(Galaxy::new(1, GalaxyType::Central))
            .unwrap();
        transfer_galaxies_to_next_snapshot(&mut catalog, h0).unwrap();

        let descendant = catalog.subhalo(s0).descendant.unwrap();
        assert_eq!(
            catalog.subhalo(descendant).galaxies[0].galaxy_type,
            GalaxyType::Central
        );
    }

    #[test]
    fn demotion_with_no_central_galaxy_is_an_error() {
        let (mut catalog, h0, s0, _) = make_demotion_scenario();
        catalog
            .subhalo_mut(s0)
            .add_galaxy(Galaxy::new(1, GalaxyType::Type2))
            .unwrap();

        let err = transfer_galaxies_to_next_snapshot(&mut catalog, h0).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingCentralGalaxy {
                subhalo_id: 1,
                galaxy_count: 1,
            }
        ));
    }

    #[test]
    fn demotion_with_no_galaxies_is_a_no_op() {
        let (mut catalog, h0, s0, d_sat) = make_demotion_scenario();
        transfer_galaxies_to_next_snapshot(&mut catalog, h0).unwrap();
        assert!(catalog.subhalo(s0).galaxies.is_empty());
        assert!(catalog.subhalo(d_sat).galaxies.is_empty());
    }

    #[test]
    fn terminal_subhalos_keep_their_galaxies() {
        let mut catalog = HaloCatalog::new();
        let (halo, subhalo) =
            add_halo_with_subhalo(&mut catalog, 100, 0, 1, SubhaloType::Central, 10.0);
        catalog
            .subhalo_mut(subhalo)
            .add_galaxy(Galaxy::new(1, GalaxyType::Central))
            .unwrap();

        transfer_galaxies_to_next_snapshot(&mut catalog, halo).unwrap();
        assert_eq!(catalog.subhalo(subhalo).galaxies.len(), 1);
    }

    #[test]
    fn destroy_galaxies_is_idempotent() {
        let mut catalog = HaloCatalog::new();
        let (halo, subhalo) =
            add_halo_with_subhalo(&mut catalog, 100, 0, 1, SubhaloType::Central, 10.0);
        catalog
            .subhalo_mut(subhalo)
            .add_galaxy(Galaxy::new(1, GalaxyType::Central))
            .unwrap();

        destroy_galaxies_this_snapshot(&mut catalog, &[halo]);
        assert!(catalog.subhalo(subhalo).galaxies.is_empty());

        destroy_galaxies_this_snapshot(&mut catalog, &[halo]);
        assert!(catalog.subhalo(subhalo).galaxies.is_empty());
    }

    #[test]
    fn evolve_tree_walks_snapshots_and_carries_state_forward() {
        // 0 -> 1 -> 2, one galaxy seeded at the leaf.
        let mut catalog = HaloCatalog::new();
        let (_, s0) = add_halo_with_subhalo(&mut catalog, 100, 0, 1, SubhaloType::Central, 10.0);
        let (_, s1) = add_halo_with_subhalo(&mut catalog, 200, 1, 2, SubhaloType::Central, 12.0);
        let (_, s2) = add_halo_with_subhalo(&mut catalog, 300, 2, 3, SubhaloType::Central, 15.0);
        {
            let s = catalog.subhalo_mut(s0);
            s.descendant_id = 2;
            s.descendant_halo_id = 200;
        }
        {
            let s = catalog.subhalo_mut(s1);
            s.descendant_id = 3;
            s.descendant_halo_id = 300;
        }

        let trees = TreeBuilder::new(ExecutionParameters::new([2]))
            .build_trees(&mut catalog)
            .unwrap();
        catalog
            .subhalo_mut(s0)
            .add_galaxy(Galaxy::new(1, GalaxyType::Central))
            .unwrap();

        let epochs: BTreeMap<i32, Epoch> = [
            (0, Epoch { redshift: 2.0, delta_t: 0.1 }),
            (1, Epoch { redshift: 1.0, delta_t: 0.2 }),
            (2, Epoch { redshift: 0.0, delta_t: 0.3 }),
        ]
        .into_iter()
        .collect();

        let mut model = RecordingModel::default();
        evolve_tree(&mut model, &mut catalog, trees[0], &epochs).unwrap();

        // The one galaxy was evolved at every snapshot, in its owning
        // subhalo of the moment.
        assert_eq!(model.calls, vec![(1, 1, 0), (2, 1, 1), (3, 1, 2)]);

        // State ended up at the root; earlier subhalos are empty.
        assert!(catalog.subhalo(s0).galaxies.is_empty());
        assert_eq!(catalog.subhalo(s2).galaxies.len(), 1);
        let final_mass = catalog.subhalo(s2).galaxies[0].disk_stars.mass;
        assert!((final_mass - 0.6).abs() < 1e-12);
    }

    #[test]
    fn evolve_tree_requires_an_epoch_per_snapshot() {
        let (mut catalog, ..) = make_demotion_scenario();
        let tree = catalog.tree_keys().next().unwrap();

        let epochs: BTreeMap<i32, Epoch> =
            [(1, Epoch { redshift: 0.0, delta_t: 0.1 })].into_iter().collect();

        let mut model = RecordingModel::default();
        let err = evolve_tree(&mut model, &mut catalog, tree, &epochs).unwrap_err();
        assert!(matches!(err, Error::MissingEpoch { snapshot: 0 }));
    }
}
