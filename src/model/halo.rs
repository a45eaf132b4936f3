use std::fmt;

use super::catalog::{HaloKey, SubhaloKey, TreeKey};
use super::mixins::{Identifiable, Spatial};

/// Halo ID type, matching the structure finder's 64-bit IDs.
pub type HaloId = i64;

/// A halo, the largest gravitationally bound structure kind.
///
/// A halo groups one optional central subhalo with zero or more
/// satellites and owns the aggregate virial properties. `mvir` is kept
/// as the running sum of the member subhalos' virial masses; membership
/// is managed through [`HaloCatalog::add_subhalo`] so the sum never
/// drifts from the member list.
///
/// [`HaloCatalog::add_subhalo`]: super::catalog::HaloCatalog::add_subhalo
#[derive(Debug, Clone, PartialEq)]
pub struct Halo {
    pub id: HaloId,
    /// The snapshot at which this halo is found.
    pub snapshot: i32,
    pub spatial: Spatial,

    /// Virial velocity.
    pub vvir: f64,
    /// Virial mass; running sum over the member subhalos.
    pub mvir: f64,
    /// Halo concentration.
    pub concentration: f64,
    /// Fraction of the halo mass resolved into subhalos. Classic
    /// structure finders report 1; finders that track unbound mass can
    /// report less.
    pub mass_fraction_subhalos: f64,

    /// The central subhalo, if the finder identified one.
    pub central_subhalo: Option<SubhaloKey>,
    /// The satellite subhalos contained in this halo.
    pub satellite_subhalos: Vec<SubhaloKey>,

    /// Resolved link to the descendant halo, set by tree building.
    pub descendant: Option<HaloKey>,
    /// Back-references to the halos that merge into this one.
    pub ascendants: Vec<HaloKey>,
    /// The merger tree that holds this halo.
    pub merger_tree: Option<TreeKey>,
}

impl Halo {
    /// Creates an empty halo at the given snapshot.
    pub fn new(id: HaloId, snapshot: i32) -> Self {
        Self {
            id,
            snapshot,
            spatial: Spatial::default(),
            vvir: 0.0,
            mvir: 0.0,
            concentration: 0.0,
            mass_fraction_subhalos: -1.0,
            central_subhalo: None,
            satellite_subhalos: Vec::new(),
            descendant: None,
            ascendants: Vec::new(),
            merger_tree: None,
        }
    }

    /// Number of subhalos contained in this halo.
    pub fn subhalo_count(&self) -> usize {
        self.satellite_subhalos.len() + usize::from(self.central_subhalo.is_some())
    }
}

impl Identifiable for Halo {
    type Id = HaloId;

    fn id(&self) -> HaloId {
        self.id
    }
}

impl fmt::Display for Halo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Halo {}>", self.id)
    }
}
