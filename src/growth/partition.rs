//! Allocation of net production among foliage, stem and root pools.
//!
//! The foliage:stem ratio follows a power law of stem diameter anchored at
//! the 2 cm and 20 cm reference diameters. The diameter fed in is the
//! previous month's value; that one-month lag is a deliberate part of the
//! recurrence, not an artefact.

use crate::config::SimulationConfig;
use crate::parameters::SpeciesParameters;
use crate::FloatValue;
use serde::{Deserialize, Serialize};

/// Partitioning ratios for one month. `foliage + stem + root == 1` within
/// floating tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartitionRatios {
    /// Fraction of NPP allocated to foliage (nf)
    pub foliage: FloatValue,
    /// Fraction of NPP allocated to stem (ns)
    pub stem: FloatValue,
    /// Fraction of NPP allocated to roots (nr)
    pub root: FloatValue,
    /// Foliage:stem mass ratio at the current diameter (pfs)
    pub foliage_stem_ratio: FloatValue,
}

/// Computes partitioning ratios for a species under a fixed configuration.
pub struct PartitionEngine<'a> {
    species: &'a SpeciesParameters,
    config: &'a SimulationConfig,
    pfs_power: FloatValue,
    pfs_const: FloatValue,
}

impl<'a> PartitionEngine<'a> {
    pub fn new(species: &'a SpeciesParameters, config: &'a SimulationConfig) -> Self {
        Self {
            species,
            config,
            pfs_power: species.pfs_power(),
            pfs_const: species.pfs_const(),
        }
    }

    /// Foliage:stem mass ratio at a given stem diameter (cm).
    pub fn foliage_stem_ratio(&self, dbh_cm: FloatValue) -> FloatValue {
        self.pfs_const * dbh_cm.powf(self.pfs_power)
    }

    /// Root allocation: a saturating function of the fertility term
    /// `m = m0 + (1 - m0)·fr` and the physiological modifier, spanning
    /// `nr_max` (poor, stressed sites) down to `nr_min` (fertile, unstressed
    /// sites).
    pub fn root_ratio(&self, physiological_modifier: FloatValue) -> FloatValue {
        let s = self.species;
        let m = s.m0 + (1.0 - s.m0) * self.config.fertility_rating;
        let nr = s.nr_max * s.nr_min
            / (s.nr_min + (s.nr_max - s.nr_min) * m * physiological_modifier);
        nr.clamp(s.nr_min, s.nr_max)
    }

    /// Compute the three ratios for one month.
    ///
    /// `dbh_cm` is the previous month's mean stem diameter.
    pub fn compute(
        &self,
        dbh_cm: FloatValue,
        physiological_modifier: FloatValue,
    ) -> PartitionRatios {
        let pfs = self.foliage_stem_ratio(dbh_cm);
        let root = self.root_ratio(physiological_modifier);
        let stem = (1.0 - root) / (1.0 + pfs);
        let foliage = pfs * stem;

        PartitionRatios {
            foliage,
            stem,
            root,
            foliage_stem_ratio: pfs,
        }
    }
}
