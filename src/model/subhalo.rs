use std::fmt;

use thiserror::Error;

use super::baryon::Baryon;
use super::catalog::{HaloKey, SubhaloKey};
use super::galaxy::{Galaxy, GalaxyType};
use super::halo::HaloId;
use super::mixins::{Identifiable, Spatial};

/// Subhalo ID type, matching the structure finder's 64-bit IDs.
pub type SubhaloId = i64;

/// Sentinel descendant ID marking a subhalo as the terminal leaf of its
/// lineage.
pub const NO_DESCENDANT: SubhaloId = -1;

/// The dynamical role of a subhalo within its host halo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SubhaloType {
    #[default]
    Central,
    Satellite,
    Flyby,
}

/// Cooling history of a subhalo's hot gas.
///
/// Keeps the virial temperature, gas mass, and cooling time of each past
/// timestep so that sophisticated cooling models can integrate over the
/// thermal history rather than the instantaneous state. The four vectors
/// grow in lockstep, one entry per timestep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoolingHistory {
    pub deltat: Vec<f64>,
    pub temp: Vec<f64>,
    pub mass: Vec<f64>,
    pub tcooling: Vec<f64>,
}

/// Rejected attempt to add a second central galaxy to a subhalo.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("subhalo {subhalo_id} already hosts central galaxy {existing}; rejected galaxy {rejected}")]
pub struct DuplicateCentralGalaxy {
    /// The subhalo that rejected the galaxy.
    pub subhalo_id: SubhaloId,
    /// ID of the central galaxy already present.
    pub existing: super::galaxy::GalaxyId,
    /// ID of the galaxy that was rejected.
    pub rejected: super::galaxy::GalaxyId,
}

/// A subhalo, the atomic unit of how dark matter clusters.
///
/// Subhalos coexist with other subhalos in the same [`Halo`] and host
/// zero or more galaxies. Before tree linking the raw `descendant_*`
/// fields carry the structure finder's claims; once [`descendant`] is
/// set it is authoritative and the raw IDs are advisory only.
///
/// [`Halo`]: super::halo::Halo
/// [`descendant`]: Subhalo::descendant
#[derive(Debug, Clone, PartialEq)]
pub struct Subhalo {
    pub id: SubhaloId,
    /// The snapshot at which this subhalo is found.
    pub snapshot: i32,
    pub subhalo_type: SubhaloType,
    pub spatial: Spatial,

    /// Virial velocity.
    pub vvir: f64,
    /// Virial mass.
    pub mvir: f64,
    /// Angular momentum vector.
    pub l: [f64; 3],
    /// Maximum circular velocity.
    pub vcirc: f64,
    /// Halo concentration.
    pub concentration: f64,
    /// Mass accreted onto the subhalo, as reported by the merger tree.
    pub accreted_mass: f64,

    /// Whether this subhalo is the main progenitor of its descendant.
    pub main_progenitor: bool,
    /// Set when the structure finder loses this subhalo at the next
    /// snapshot.
    pub last_snapshot_identified: i32,

    /// Raw descendant subhalo ID from the catalog; [`NO_DESCENDANT`] when
    /// this subhalo is the last of its lineage.
    pub descendant_id: SubhaloId,
    /// Raw ID of the halo containing the descendant subhalo.
    pub descendant_halo_id: HaloId,
    /// The snapshot at which the descendant can be found.
    pub descendant_snapshot: i32,

    /// Resolved link to the descendant subhalo, set by tree building.
    pub descendant: Option<SubhaloKey>,
    /// Back-references to the subhalos that merge into this one.
    pub ascendants: Vec<SubhaloKey>,
    /// The halo that holds this subhalo.
    pub host_halo: Option<HaloKey>,

    /// The galaxies hosted by this subhalo. Ownership is transient: the
    /// evolution driver moves the whole list to the descendant subhalo
    /// when a snapshot completes.
    pub galaxies: Vec<Galaxy>,

    /// Hot gas in the halo, outside the galaxies, allowed to cool down
    /// and/or fall onto the galaxy.
    pub hot_halo_gas: Baryon,
    /// Gas in the halo, outside the galaxies, that has already cooled.
    pub cold_halo_gas: Baryon,
    /// Outflowing gas ejected from the galaxy, not yet available for
    /// cooling.
    pub ejected_galaxy_gas: Baryon,
    pub cooling_history: CoolingHistory,
}

impl Subhalo {
    /// Creates a subhalo with empty reservoirs and no descendant marker.
    pub fn new(id: SubhaloId, snapshot: i32, subhalo_type: SubhaloType) -> Self {
        Self {
            id,
            snapshot,
            subhalo_type,
            spatial: Spatial::default(),
            vvir: 0.0,
            mvir: 0.0,
            l: [0.0; 3],
            vcirc: 0.0,
            concentration: 0.0,
            accreted_mass: 0.0,
            main_progenitor: false,
            last_snapshot_identified: -1,
            descendant_id: NO_DESCENDANT,
            descendant_halo_id: 0,
            descendant_snapshot: -1,
            descendant: None,
            ascendants: Vec::new(),
            host_halo: None,
            galaxies: Vec::new(),
            hot_halo_gas: Baryon::new(),
            cold_halo_gas: Baryon::new(),
            ejected_galaxy_gas: Baryon::new(),
            cooling_history: CoolingHistory::default(),
        }
    }

    /// Whether the catalog claims a descendant for this subhalo.
    pub fn has_descendant_marker(&self) -> bool {
        self.descendant_id != NO_DESCENDANT
    }

    /// Returns the central galaxy of this subhalo, if any.
    pub fn central_galaxy(&self) -> Option<&Galaxy> {
        self.galaxies
            .iter()
            .find(|g| g.galaxy_type == GalaxyType::Central)
    }

    /// Mutable access to the central galaxy of this subhalo, if any.
    pub fn central_galaxy_mut(&mut self) -> Option<&mut Galaxy> {
        self.galaxies
            .iter_mut()
            .find(|g| g.galaxy_type == GalaxyType::Central)
    }

    /// Adds a galaxy, enforcing that at most one central galaxy exists
    /// per subhalo at any time.
    pub fn add_galaxy(&mut self, galaxy: Galaxy) -> Result<(), DuplicateCentralGalaxy> {
        if galaxy.galaxy_type == GalaxyType::Central {
            if let Some(existing) = self.central_galaxy() {
                return Err(DuplicateCentralGalaxy {
                    subhalo_id: self.id,
                    existing: existing.id,
                    rejected: galaxy.id,
                });
            }
        }
        self.galaxies.push(galaxy);
        Ok(())
    }
}

impl Identifiable for Subhalo {
    type Id = SubhaloId;

    fn id(&self) -> SubhaloId {
        self.id
    }
}

impl fmt::Display for Subhalo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Subhalo {}>", self.id)
    }
}
