/// A baryon reservoir for one gas or stellar phase.
///
/// Tracks total mass, mass in metals, and (for disk/bulge components)
/// a scale radius and specific angular momentum. Phases that have no
/// meaningful size simply leave `rscale` and `s_am` at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Baryon {
    /// Mass content of the reservoir.
    pub mass: f64,
    /// Mass locked in metals.
    pub mass_metals: f64,
    /// Scale radius.
    pub rscale: f64,
    /// Specific angular momentum.
    pub s_am: f64,
}

impl Baryon {
    /// Creates an empty reservoir.
    pub fn new() -> Self {
        Self::default()
    }

    /// Metallicity of the reservoir, zero when the reservoir is empty.
    pub fn metallicity(&self) -> f64 {
        if self.mass > 0.0 {
            self.mass_metals / self.mass
        } else {
            0.0
        }
    }
}

/// A supermassive black hole.
///
/// By the no-hair theorem a black hole carries only mass and, for the
/// bookkeeping done here, an accretion rate; it is deliberately not a
/// [`Baryon`] because it has no size or angular-momentum reservoir.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BlackHole {
    /// Black hole mass.
    pub mass: f64,
    /// Mass in metals accreted onto the black hole.
    pub mass_metals: f64,
    /// Current accretion rate.
    pub macc: f64,
}

impl BlackHole {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reservoirs_start_empty() {
        let baryon = Baryon::new();
        assert_eq!(baryon.mass, 0.0);
        assert_eq!(baryon.mass_metals, 0.0);
        assert_eq!(baryon.rscale, 0.0);
        assert_eq!(baryon.s_am, 0.0);

        let smbh = BlackHole::new();
        assert_eq!(smbh.mass, 0.0);
        assert_eq!(smbh.macc, 0.0);
    }

    #[test]
    fn metallicity_guards_empty_reservoir() {
        let empty = Baryon::new();
        assert_eq!(empty.metallicity(), 0.0);

        let enriched = Baryon {
            mass: 10.0,
            mass_metals: 0.2,
            ..Baryon::default()
        };
        assert_eq!(enriched.metallicity(), 0.02);
    }
}
