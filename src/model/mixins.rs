use std::fmt;
use std::hash::Hash;

/// Unique identity within one entity kind's ID space.
///
/// Galaxies, subhalos, halos, and merger trees each draw their IDs from
/// a separate space; the associated [`Id`](Identifiable::Id) type keeps
/// those spaces from mixing at compile time where the widths differ.
pub trait Identifiable {
    /// The integer ID type of this entity kind.
    type Id: Copy + Eq + Hash + fmt::Display;

    /// Returns the unique ID of this entity.
    fn id(&self) -> Self::Id;
}

/// 3D position and peculiar velocity, in comoving catalog units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Spatial {
    pub position: [f64; 3],
    pub velocity: [f64; 3],
}

impl Spatial {
    pub fn new(position: [f64; 3], velocity: [f64; 3]) -> Self {
        Self { position, velocity }
    }
}
