//! The three-pool monthly biomass integrator.
//!
//! Each pool advances as
//! `new = old + ratio·NPP − turnover·old − mortality_frac·(old/N)·died`.
//! A non-positive result is rejected and the pool holds its prior value:
//! an explicit stability floor, not a physical statement, and observable
//! through the debug log.

use crate::growth::partition::PartitionRatios;
use crate::parameters::SpeciesParameters;
use crate::FloatValue;
use log::debug;
use serde::{Deserialize, Serialize};

/// The three biomass pools after one month's update, tDM/ha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiomassPools {
    pub foliage: FloatValue,
    pub stem: FloatValue,
    pub root: FloatValue,
}

/// Advances the biomass pools for a species.
pub struct BiomassIntegrator<'a> {
    species: &'a SpeciesParameters,
}

impl<'a> BiomassIntegrator<'a> {
    pub fn new(species: &'a SpeciesParameters) -> Self {
        Self { species }
    }

    /// Monthly foliage litterfall rate: a saturating curve from `gamma_f0`
    /// towards `gamma_f1`, reaching their mean at stand age `t_gamma_f`
    /// months.
    ///
    /// Species with a zero base or maximum rate (deciduous parameterisation)
    /// get exactly 0; the curve's denominator would otherwise divide by zero.
    pub fn litterfall_rate(&self, age_years: FloatValue) -> FloatValue {
        let s = self.species;
        if s.has_zero_litterfall() {
            return 0.0;
        }
        let kg = 12.0 * (1.0 + s.gamma_f1 / s.gamma_f0).ln() / s.t_gamma_f;
        s.gamma_f1 * s.gamma_f0 / (s.gamma_f0 + (s.gamma_f1 - s.gamma_f0) * (-kg * age_years).exp())
    }

    /// Advance one pool, applying the non-positive floor policy.
    fn step_pool(
        &self,
        pool_name: &str,
        old: FloatValue,
        gain: FloatValue,
        turnover_rate: FloatValue,
        mortality_loss: FloatValue,
    ) -> FloatValue {
        let new = old + gain - turnover_rate * old - mortality_loss;
        if new <= 0.0 {
            debug!(
                "'{}' {} pool update rejected ({:.4} -> {:.4}); holding prior value",
                self.species.name, pool_name, old, new
            );
            old
        } else {
            new
        }
    }

    /// Advance all three pools for one month.
    ///
    /// `tree_count` is the count the stand had when this month's thinning
    /// ran, so `old/tree_count` is the mean mass the removed trees actually
    /// carried.
    #[allow(clippy::too_many_arguments)]
    pub fn integrate(
        &self,
        foliage: FloatValue,
        stem: FloatValue,
        root: FloatValue,
        npp: FloatValue,
        ratios: &PartitionRatios,
        age_years: FloatValue,
        tree_count: FloatValue,
        trees_died: u32,
    ) -> BiomassPools {
        let s = self.species;
        let died = trees_died as FloatValue;
        let per_tree = |pool: FloatValue| {
            if trees_died > 0 && tree_count > 0.0 {
                pool / tree_count * died
            } else {
                0.0
            }
        };

        let gamma_f = self.litterfall_rate(age_years);
        let new_foliage = self.step_pool(
            "foliage",
            foliage,
            ratios.foliage * npp,
            gamma_f,
            s.mf * per_tree(foliage),
        );
        let new_stem = self.step_pool(
            "stem",
            stem,
            ratios.stem * npp,
            s.gamma_s,
            s.ms * per_tree(stem),
        );
        let new_root = self.step_pool(
            "root",
            root,
            ratios.root * npp,
            s.gamma_r,
            s.mr * per_tree(root),
        );

        BiomassPools {
            foliage: new_foliage,
            stem: new_stem,
            root: new_root,
        }
    }
}
