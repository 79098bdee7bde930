//! Process-wide simulation configuration.
//!
//! The original model kept these values as module-level mutable globals. They
//! are re-architected here as an explicit immutable [`SimulationConfig`] that
//! is passed into the engine, so two runs can never observe each other's
//! state through hidden globals.

use crate::errors::{ThreePGError, ThreePGResult};
use crate::FloatValue;
use serde::{Deserialize, Serialize};

/// Policy for combining the age, VPD and soil-water modifiers into the
/// physiological modifier.
///
/// The original model carried both policies, one of them as dead code. Only
/// [`PhysiologicalPolicy::Combined`] runs by default; the most-limiting
/// alternative is an explicit variant rather than a commented-out code path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhysiologicalPolicy {
    /// Product of the age, VPD and soil-water modifiers.
    #[default]
    Combined,
    /// Age modifier times the smaller of the VPD and soil-water modifiers.
    MostLimiting,
}

/// Immutable configuration shared by every stage of a simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Atmospheric CO2 concentration
    /// unit: ppm
    /// default: 420.0
    pub co2_ppm: FloatValue,

    /// Mean daytime vapour pressure deficit
    /// unit: mbar
    /// default: 5.0
    pub vpd_mbar: FloatValue,

    /// NPP/GPP conversion ratio (respiration losses)
    /// unit: dimensionless
    /// default: 0.47
    pub npp_ratio: FloatValue,

    /// Site fertility rating, 0 = infertile, 1 = optimal
    /// unit: dimensionless, [0, 1]
    /// default: 0.5
    pub fertility_rating: FloatValue,

    /// Stand age at the start of the simulation
    /// unit: years
    /// default: 5.0
    pub starting_age_years: FloatValue,

    /// Calendar month of the first simulated month, 0 = January
    /// default: 0
    pub starting_month: usize,

    /// Whether the age modifier participates in the physiological modifier.
    /// When disabled the age modifier is exactly 1.
    /// default: false
    pub use_age_modifier: bool,

    /// How the physiological modifier is assembled from its factors.
    /// default: Combined
    pub physiological_policy: PhysiologicalPolicy,

    /// Seed for the one-shot soil-water sampling. Fixing the seed makes the
    /// whole simulation deterministic.
    /// default: 0
    pub soil_water_seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            co2_ppm: 420.0,
            vpd_mbar: 5.0,
            npp_ratio: 0.47,
            fertility_rating: 0.5,
            starting_age_years: 5.0,
            starting_month: 0,
            use_age_modifier: false,
            physiological_policy: PhysiologicalPolicy::default(),
            soil_water_seed: 0,
        }
    }
}

impl SimulationConfig {
    /// Check that the configuration is usable before a simulation starts.
    pub fn validate(&self) -> ThreePGResult<()> {
        if !(0.0..=1.0).contains(&self.fertility_rating) {
            return Err(ThreePGError::InvalidConfig {
                parameter: "fertility_rating".to_string(),
                reason: format!("must be within [0, 1], got {}", self.fertility_rating),
            });
        }
        if !(self.npp_ratio > 0.0 && self.npp_ratio <= 1.0) {
            return Err(ThreePGError::InvalidConfig {
                parameter: "npp_ratio".to_string(),
                reason: format!("must be within (0, 1], got {}", self.npp_ratio),
            });
        }
        if self.co2_ppm <= 0.0 {
            return Err(ThreePGError::InvalidConfig {
                parameter: "co2_ppm".to_string(),
                reason: format!("must be positive, got {}", self.co2_ppm),
            });
        }
        if self.vpd_mbar < 0.0 {
            return Err(ThreePGError::InvalidConfig {
                parameter: "vpd_mbar".to_string(),
                reason: format!("must be non-negative, got {}", self.vpd_mbar),
            });
        }
        if self.starting_age_years < 0.0 {
            return Err(ThreePGError::InvalidConfig {
                parameter: "starting_age_years".to_string(),
                reason: format!("must be non-negative, got {}", self.starting_age_years),
            });
        }
        if self.starting_month >= 12 {
            return Err(ThreePGError::InvalidConfig {
                parameter: "starting_month".to_string(),
                reason: format!("must be within [0, 11], got {}", self.starting_month),
            });
        }
        Ok(())
    }

    /// Load a configuration from a TOML document and validate it.
    pub fn from_toml_str(s: &str) -> ThreePGResult<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| ThreePGError::Error(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
