//! Arena ownership of halos, subhalos, and merger trees.
//!
//! The C-style pointer graph of a merger forest (descendant/ascendant
//! links, subhalo↔halo and halo↔tree back-references) is cyclic, so the
//! entities live in flat arenas inside [`HaloCatalog`] and refer to each
//! other through copyable keys. Ownership edges (halo → subhalo,
//! tree → halo) are key lists; back-references are single keys. Galaxies
//! are the exception: a subhalo owns its galaxies by value, so moving
//! them to a descendant is a plain vector move.
//!
//! Keys are only ever minted by the catalog that owns the entity;
//! indexing with a key from a different catalog is a logic error and
//! panics like any out-of-bounds slice access.

use std::mem;

use super::halo::Halo;
use super::subhalo::Subhalo;
use super::tree::MergerTree;

/// Stable arena key of a [`Halo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HaloKey(usize);

/// Stable arena key of a [`Subhalo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubhaloKey(usize);

/// Stable arena key of a [`MergerTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeKey(usize);

/// The arena owning every halo, subhalo, and merger tree of one
/// simulation box.
#[derive(Debug, Clone, Default)]
pub struct HaloCatalog {
    halos: Vec<Halo>,
    subhalos: Vec<Subhalo>,
    trees: Vec<MergerTree>,
}

impl HaloCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn halo_count(&self) -> usize {
        self.halos.len()
    }

    #[inline]
    pub fn subhalo_count(&self) -> usize {
        self.subhalos.len()
    }

    #[inline]
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Adds a halo and returns its key.
    pub fn add_halo(&mut self, halo: Halo) -> HaloKey {
        self.halos.push(halo);
        HaloKey(self.halos.len() - 1)
    }

    /// Adds a subhalo to a halo, wiring the host back-reference and
    /// assigning it to the central or satellite slot by its type.
    ///
    /// The halo's virial mass is the running sum over its subhalos and
    /// is updated here.
    pub fn add_subhalo(&mut self, host: HaloKey, mut subhalo: Subhalo) -> SubhaloKey {
        subhalo.host_halo = Some(host);
        let mvir = subhalo.mvir;
        let is_central = subhalo.subhalo_type == super::subhalo::SubhaloType::Central;

        self.subhalos.push(subhalo);
        let key = SubhaloKey(self.subhalos.len() - 1);

        let halo = &mut self.halos[host.0];
        if is_central {
            halo.central_subhalo = Some(key);
        } else {
            halo.satellite_subhalos.push(key);
        }
        halo.mvir += mvir;

        key
    }

    /// Adds a merger tree and returns its key.
    pub fn add_tree(&mut self, tree: MergerTree) -> TreeKey {
        self.trees.push(tree);
        TreeKey(self.trees.len() - 1)
    }

    #[inline]
    pub fn halo(&self, key: HaloKey) -> &Halo {
        &self.halos[key.0]
    }

    #[inline]
    pub fn halo_mut(&mut self, key: HaloKey) -> &mut Halo {
        &mut self.halos[key.0]
    }

    #[inline]
    pub fn subhalo(&self, key: SubhaloKey) -> &Subhalo {
        &self.subhalos[key.0]
    }

    #[inline]
    pub fn subhalo_mut(&mut self, key: SubhaloKey) -> &mut Subhalo {
        &mut self.subhalos[key.0]
    }

    #[inline]
    pub fn tree(&self, key: TreeKey) -> &MergerTree {
        &self.trees[key.0]
    }

    #[inline]
    pub fn tree_mut(&mut self, key: TreeKey) -> &mut MergerTree {
        &mut self.trees[key.0]
    }

    /// Iterates over all halo keys in insertion order.
    pub fn halo_keys(&self) -> impl Iterator<Item = HaloKey> {
        (0..self.halos.len()).map(HaloKey)
    }

    /// Iterates over all tree keys in insertion order.
    pub fn tree_keys(&self) -> impl Iterator<Item = TreeKey> {
        (0..self.trees.len()).map(TreeKey)
    }

    /// Returns a halo's subhalos: the central (if present) followed by
    /// the satellites, with the whole set sorted by virial mass in
    /// descending order whenever the halo holds more than one subhalo.
    ///
    /// Deterministic central-galaxy selection and ascendant resolution
    /// both rely on this ordering.
    pub fn all_subhalos(&self, halo: HaloKey) -> Vec<SubhaloKey> {
        let halo = &self.halos[halo.0];

        let mut all = Vec::with_capacity(halo.subhalo_count());
        if let Some(central) = halo.central_subhalo {
            all.push(central);
        }
        all.extend_from_slice(&halo.satellite_subhalos);

        if all.len() > 1 {
            all.sort_by(|a, b| self.subhalos[b.0].mvir.total_cmp(&self.subhalos[a.0].mvir));
        }

        all
    }

    /// Returns a subhalo's ascendants sorted by virial mass in
    /// descending order.
    pub fn ordered_ascendants(&self, subhalo: SubhaloKey) -> Vec<SubhaloKey> {
        let mut ascendants = self.subhalos[subhalo.0].ascendants.clone();
        if ascendants.len() > 1 {
            ascendants
                .sort_by(|a, b| self.subhalos[b.0].mvir.total_cmp(&self.subhalos[a.0].mvir));
        }
        ascendants
    }

    /// Moves every galaxy of `source` to the end of `target`'s galaxy
    /// list, leaving `source` with none.
    pub fn transfer_galaxies(&mut self, source: SubhaloKey, target: SubhaloKey) {
        let moved = mem::take(&mut self.subhalos[source.0].galaxies);
        self.subhalos[target.0].galaxies.extend(moved);
    }

    /// Overwrites `target`'s halo-scale gas reservoirs and cooling
    /// history with `source`'s.
    pub fn copy_halo_gas(&mut self, source: SubhaloKey, target: SubhaloKey) {
        let src = &self.subhalos[source.0];
        let cold = src.cold_halo_gas;
        let hot = src.hot_halo_gas;
        let ejected = src.ejected_galaxy_gas;
        let cooling = src.cooling_history.clone();

        let dst = &mut self.subhalos[target.0];
        dst.cold_halo_gas = cold;
        dst.hot_halo_gas = hot;
        dst.ejected_galaxy_gas = ejected;
        dst.cooling_history = cooling;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::galaxy::{Galaxy, GalaxyType};
    use crate::model::subhalo::SubhaloType;

    fn make_subhalo(id: i64, snapshot: i32, subhalo_type: SubhaloType, mvir: f64) -> Subhalo {
        let mut subhalo = Subhalo::new(id, snapshot, subhalo_type);
        subhalo.mvir = mvir;
        subhalo
    }

    #[test]
    fn mvir_is_the_running_sum_of_subhalo_masses() {
        let mut catalog = HaloCatalog::new();
        let halo = catalog.add_halo(Halo::new(1, 0));

        catalog.add_subhalo(halo, make_subhalo(10, 0, SubhaloType::Central, 100.0));
        catalog.add_subhalo(halo, make_subhalo(11, 0, SubhaloType::Satellite, 30.0));
        catalog.add_subhalo(halo, make_subhalo(12, 0, SubhaloType::Satellite, 7.0));

        assert_eq!(catalog.halo(halo).mvir, 137.0);

        let total: f64 = catalog
            .all_subhalos(halo)
            .into_iter()
            .map(|k| catalog.subhalo(k).mvir)
            .sum();
        assert_eq!(catalog.halo(halo).mvir, total);
    }

    #[test]
    fn add_subhalo_wires_host_and_slots() {
        let mut catalog = HaloCatalog::new();
        let halo = catalog.add_halo(Halo::new(1, 0));

        let central = catalog.add_subhalo(halo, make_subhalo(10, 0, SubhaloType::Central, 5.0));
        let satellite =
            catalog.add_subhalo(halo, make_subhalo(11, 0, SubhaloType::Satellite, 1.0));

        assert_eq!(catalog.halo(halo).central_subhalo, Some(central));
        assert_eq!(catalog.halo(halo).satellite_subhalos, vec![satellite]);
        assert_eq!(catalog.subhalo(central).host_halo, Some(halo));
        assert_eq!(catalog.subhalo(satellite).host_halo, Some(halo));
    }

    #[test]
    fn all_subhalos_sorted_by_mvir_descending() {
        let mut catalog = HaloCatalog::new();
        let halo = catalog.add_halo(Halo::new(1, 0));

        // A satellite heavier than the central must come first.
        let central = catalog.add_subhalo(halo, make_subhalo(10, 0, SubhaloType::Central, 50.0));
        let big_sat =
            catalog.add_subhalo(halo, make_subhalo(11, 0, SubhaloType::Satellite, 80.0));
        let small_sat =
            catalog.add_subhalo(halo, make_subhalo(12, 0, SubhaloType::Satellite, 10.0));

        let ordered = catalog.all_subhalos(halo);
        assert_eq!(ordered, vec![big_sat, central, small_sat]);

        // Stable under repeated calls without mutation.
        assert_eq!(catalog.all_subhalos(halo), ordered);
    }

    #[test]
    fn all_subhalos_single_member_keeps_central_first() {
        let mut catalog = HaloCatalog::new();
        let halo = catalog.add_halo(Halo::new(1, 0));
        let central = catalog.add_subhalo(halo, make_subhalo(10, 0, SubhaloType::Central, 1.0));
        assert_eq!(catalog.all_subhalos(halo), vec![central]);
    }

    #[test]
    fn ordered_ascendants_sorted_by_mvir() {
        let mut catalog = HaloCatalog::new();
        let halo = catalog.add_halo(Halo::new(1, 1));
        let descendant = catalog.add_subhalo(halo, make_subhalo(1, 1, SubhaloType::Central, 10.0));

        let earlier = catalog.add_halo(Halo::new(2, 0));
        let light = catalog.add_subhalo(earlier, make_subhalo(2, 0, SubhaloType::Central, 2.0));
        let heavy = catalog.add_subhalo(earlier, make_subhalo(3, 0, SubhaloType::Satellite, 8.0));

        catalog.subhalo_mut(descendant).ascendants.push(light);
        catalog.subhalo_mut(descendant).ascendants.push(heavy);

        assert_eq!(catalog.ordered_ascendants(descendant), vec![heavy, light]);
        assert!(catalog.ordered_ascendants(light).is_empty());
    }

    #[test]
    fn transfer_galaxies_moves_and_empties() {
        let mut catalog = HaloCatalog::new();
        let halo = catalog.add_halo(Halo::new(1, 0));
        let source = catalog.add_subhalo(halo, make_subhalo(1, 0, SubhaloType::Central, 1.0));
        let target = catalog.add_subhalo(halo, make_subhalo(2, 0, SubhaloType::Satellite, 1.0));

        catalog
            .subhalo_mut(source)
            .add_galaxy(Galaxy::new(1, GalaxyType::Central))
            .unwrap();
        catalog
            .subhalo_mut(target)
            .add_galaxy(Galaxy::new(2, GalaxyType::Type2))
            .unwrap();

        catalog.transfer_galaxies(source, target);

        assert!(catalog.subhalo(source).galaxies.is_empty());
        let ids: Vec<_> = catalog.subhalo(target).galaxies.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn copy_halo_gas_overwrites_target() {
        let mut catalog = HaloCatalog::new();
        let halo = catalog.add_halo(Halo::new(1, 0));
        let source = catalog.add_subhalo(halo, make_subhalo(1, 0, SubhaloType::Central, 1.0));
        let target = catalog.add_subhalo(halo, make_subhalo(2, 0, SubhaloType::Satellite, 1.0));

        catalog.subhalo_mut(source).hot_halo_gas.mass = 5.0;
        catalog.subhalo_mut(source).cold_halo_gas.mass = 3.0;
        catalog.subhalo_mut(source).ejected_galaxy_gas.mass = 1.0;
        catalog.subhalo_mut(source).cooling_history.temp.push(1e6);

        catalog.subhalo_mut(target).hot_halo_gas.mass = 99.0;

        catalog.copy_halo_gas(source, target);

        let dst = catalog.subhalo(target);
        assert_eq!(dst.hot_halo_gas.mass, 5.0);
        assert_eq!(dst.cold_halo_gas.mass, 3.0);
        assert_eq!(dst.ejected_galaxy_gas.mass, 1.0);
        assert_eq!(dst.cooling_history.temp, vec![1e6]);
    }
}
