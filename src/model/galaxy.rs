use super::baryon::{Baryon, BlackHole};
use super::mixins::{Identifiable, Spatial};

/// Galaxy ID type. Galaxies draw from their own ID space.
pub type GalaxyId = i32;

/// The dynamical role of a galaxy within its host subhalo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GalaxyType {
    /// The central galaxy of a central subhalo.
    #[default]
    Central,
    /// Satellite galaxy that still has its own subhalo.
    Type1,
    /// Satellite galaxy whose subhalo has been disrupted.
    Type2,
    /// Galaxy in a subhalo flying by its host.
    Flyby,
}

/// A galaxy.
///
/// Galaxies have at least a disk, a bulge, and a black hole, with either
/// structural component holding gas and stars. A galaxy is owned by exactly
/// one [`Subhalo`](super::subhalo::Subhalo) at a time; ownership moves to
/// the descendant subhalo when snapshots advance.
#[derive(Debug, Clone, PartialEq)]
pub struct Galaxy {
    pub id: GalaxyId,
    pub galaxy_type: GalaxyType,

    pub disk_gas: Baryon,
    pub disk_stars: Baryon,
    pub bulge_gas: Baryon,
    pub bulge_stars: Baryon,
    pub smbh: BlackHole,

    /// Running average star formation rate in the disk.
    pub sfr_disk: f64,
    /// Running average star formation rate in the bulge.
    pub sfr_bulge: f64,

    /// Dynamical friction merging timescale, meaningful only while the
    /// galaxy is a satellite.
    pub tmerge: f64,

    /// Optional spatial payload; present when the pipeline tracks galaxy
    /// positions separately from the host subhalo.
    pub spatial: Option<Spatial>,
}

impl Galaxy {
    /// Creates a galaxy with all reservoirs empty.
    pub fn new(id: GalaxyId, galaxy_type: GalaxyType) -> Self {
        Self {
            id,
            galaxy_type,
            disk_gas: Baryon::new(),
            disk_stars: Baryon::new(),
            bulge_gas: Baryon::new(),
            bulge_stars: Baryon::new(),
            smbh: BlackHole::new(),
            sfr_disk: 0.0,
            sfr_bulge: 0.0,
            tmerge: 0.0,
            spatial: None,
        }
    }

    pub fn disk_mass(&self) -> f64 {
        self.disk_gas.mass + self.disk_stars.mass
    }

    pub fn disk_mass_metals(&self) -> f64 {
        self.disk_gas.mass_metals + self.disk_stars.mass_metals
    }

    pub fn bulge_mass(&self) -> f64 {
        self.bulge_gas.mass + self.bulge_stars.mass
    }

    pub fn bulge_mass_metals(&self) -> f64 {
        self.bulge_gas.mass_metals + self.bulge_stars.mass_metals
    }

    /// Total baryonic mass across the disk and bulge.
    pub fn baryon_mass(&self) -> f64 {
        self.disk_mass() + self.bulge_mass()
    }

    pub fn stellar_mass(&self) -> f64 {
        self.disk_stars.mass + self.bulge_stars.mass
    }

    pub fn stellar_mass_metals(&self) -> f64 {
        self.disk_stars.mass_metals + self.bulge_stars.mass_metals
    }

    pub fn gas_mass(&self) -> f64 {
        self.disk_gas.mass + self.bulge_gas.mass
    }

    pub fn gas_mass_metals(&self) -> f64 {
        self.disk_gas.mass_metals + self.bulge_gas.mass_metals
    }

    /// Mass-weighted composite size of the galaxy.
    ///
    /// Disk and bulge sizes are themselves mass-weighted over their gas
    /// and stellar reservoirs. Returns zero for a massless galaxy.
    pub fn composite_size(&self) -> f64 {
        let disk_mass = self.disk_mass();
        let bulge_mass = self.bulge_mass();

        let mut rdisk = 0.0;
        if disk_mass > 0.0 {
            rdisk = (self.disk_stars.mass * self.disk_stars.rscale
                + self.disk_gas.mass * self.disk_gas.rscale)
                / disk_mass;
        }

        let mut rbulge = 0.0;
        if bulge_mass > 0.0 {
            rbulge = (self.bulge_stars.mass * self.bulge_stars.rscale
                + self.bulge_gas.mass * self.bulge_gas.rscale)
                / bulge_mass;
        }

        let baryon_mass = self.baryon_mass();
        if baryon_mass > 0.0 {
            (disk_mass * rdisk + bulge_mass * rbulge) / baryon_mass
        } else {
            0.0
        }
    }
}

impl Identifiable for Galaxy {
    type Id = GalaxyId;

    fn id(&self) -> GalaxyId {
        self.id
    }
}
