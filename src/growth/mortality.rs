//! Density-dependent self-thinning.
//!
//! The self-thinning rule caps the mean individual stem mass at
//! `wsx(N) = wsx1000·(1000/N)^nm`. While the cap is violated, trees are
//! removed one at a time and the cap is recomputed after each removal,
//! because removing a tree raises the cap for the survivors. The loop is
//! hard-capped at the tree count it entered with, so it terminates even
//! under pathological parameters.

use crate::parameters::SpeciesParameters;
use crate::FloatValue;
use log::debug;
use serde::{Deserialize, Serialize};

/// Result of one month's self-thinning pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thinning {
    /// Surviving trees per hectare. Zero means the stand is extinct.
    pub tree_count: FloatValue,
    /// Trees removed this month; feeds the mortality-loss terms of the
    /// biomass integrator, then resets.
    pub trees_died: u32,
}

/// Runs the self-thinning rule for a species.
pub struct MortalityEngine<'a> {
    species: &'a SpeciesParameters,
}

impl<'a> MortalityEngine<'a> {
    pub fn new(species: &'a SpeciesParameters) -> Self {
        Self { species }
    }

    /// Maximum allowable individual stem mass (tDM/tree) at a stand density
    /// of `tree_count` trees per hectare.
    pub fn max_stem_mass(&self, tree_count: FloatValue) -> FloatValue {
        self.species.wsx1000 * (1000.0 / tree_count).powf(self.species.nm)
    }

    /// Remove trees until the mean stem mass satisfies the cap, or the
    /// stand runs out of trees.
    pub fn thin(&self, stem_biomass: FloatValue, tree_count: FloatValue) -> Thinning {
        let mut n = tree_count;
        let mut died: u32 = 0;
        // Hard iteration bound: the count at loop entry.
        let max_removals = tree_count.ceil().max(0.0) as u32;

        while n > 0.0 && died < max_removals && stem_biomass / n > self.max_stem_mass(n) {
            n -= 1.0;
            died += 1;
            if n <= 0.0 {
                n = 0.0;
                break;
            }
        }

        if died > 0 {
            debug!(
                "self-thinning removed {} trees of '{}' ({} -> {} trees/ha)",
                died, self.species.name, tree_count, n
            );
        }

        Thinning {
            tree_count: n,
            trees_died: died,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_thinning_when_under_cap() {
        let species = SpeciesParameters::default();
        let engine = MortalityEngine::new(&species);

        // 1000 trees/ha at wsx1000 = 0.3 allows up to 300 tDM/ha of stem.
        let result = engine.thin(100.0, 1000.0);
        assert_eq!(result.trees_died, 0);
        assert_eq!(result.tree_count, 1000.0);
    }

    #[test]
    fn test_cap_satisfied_after_thinning() {
        let species = SpeciesParameters::default();
        let engine = MortalityEngine::new(&species);

        let stem = 400.0;
        let result = engine.thin(stem, 1200.0);
        assert!(result.trees_died > 0);
        assert!(
            stem / result.tree_count <= engine.max_stem_mass(result.tree_count),
            "post-thinning mean stem mass must satisfy the cap"
        );
    }

    #[test]
    fn test_removal_count_matches_brute_force_minimum() {
        let species = SpeciesParameters::default();
        let engine = MortalityEngine::new(&species);

        let stem = 400.0;
        let initial = 1200.0;
        let result = engine.thin(stem, initial);

        // Brute force: the largest N <= initial satisfying the constraint,
        // scanning downwards one tree at a time.
        let mut expected_n = initial;
        while expected_n > 0.0 && stem / expected_n > engine.max_stem_mass(expected_n) {
            expected_n -= 1.0;
        }

        assert_eq!(result.tree_count, expected_n);
        assert_eq!(result.trees_died as FloatValue, initial - expected_n);
        // The margin is real: the count one tree higher must still violate.
        let one_more = result.tree_count + 1.0;
        assert!(stem / one_more > engine.max_stem_mass(one_more));
    }

    #[test]
    fn test_extinction_when_no_count_satisfies_cap() {
        // A cap so low that even a single tree is overweight.
        let species = SpeciesParameters {
            wsx1000: 1e-6,
            ..Default::default()
        };
        let engine = MortalityEngine::new(&species);

        let result = engine.thin(200.0, 500.0);
        assert_eq!(result.tree_count, 0.0);
        assert_eq!(result.trees_died, 500);
    }

    #[test]
    fn test_terminates_under_pathological_parameters() {
        // nm < 0 makes the cap fall as trees are removed, so the loop would
        // never satisfy the constraint; the iteration bound must stop it.
        let species = SpeciesParameters {
            nm: -2.0,
            wsx1000: 1e-9,
            ..Default::default()
        };
        let engine = MortalityEngine::new(&species);

        let result = engine.thin(1e6, 10_000.0);
        assert!(result.trees_died <= 10_000);
        assert_eq!(result.tree_count, 0.0);
    }

    #[test]
    fn test_fractional_tree_count_clamps_to_zero() {
        let species = SpeciesParameters {
            wsx1000: 1e-6,
            ..Default::default()
        };
        let engine = MortalityEngine::new(&species);

        let result = engine.thin(50.0, 2.4);
        assert_eq!(result.tree_count, 0.0);
    }

    #[test]
    fn test_max_stem_mass_scales_with_density() {
        let species = SpeciesParameters::default();
        let engine = MortalityEngine::new(&species);

        assert!((engine.max_stem_mass(1000.0) - species.wsx1000).abs() < 1e-12);
        assert!(
            engine.max_stem_mass(500.0) > engine.max_stem_mass(2000.0),
            "sparser stands allow heavier individuals"
        );
    }
}
