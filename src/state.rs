//! Stand state, derived metrics and per-month output records.

use crate::errors::{ThreePGError, ThreePGResult};
use crate::FloatValue;
use serde::{Deserialize, Serialize};

/// The mutable state of one species' stand, advanced once per month.
///
/// Biomass pools are tonnes of dry mass per hectare and never go negative
/// (the integrator holds a pool at its prior value instead). The tree count
/// is non-increasing over a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandState {
    pub foliage_biomass: FloatValue,
    pub stem_biomass: FloatValue,
    pub root_biomass: FloatValue,
    /// Live trees per hectare.
    pub tree_count: FloatValue,
}

impl StandState {
    /// Build an initial state. All pools and the tree count must be
    /// positive; a stand that starts massless or empty has nothing to
    /// simulate and would break the diameter-lagged partitioning.
    pub fn new(
        foliage_biomass: FloatValue,
        stem_biomass: FloatValue,
        root_biomass: FloatValue,
        tree_count: FloatValue,
    ) -> ThreePGResult<Self> {
        for (name, value) in [
            ("foliage_biomass", foliage_biomass),
            ("stem_biomass", stem_biomass),
            ("root_biomass", root_biomass),
            ("tree_count", tree_count),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ThreePGError::Error(format!(
                    "initial {} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        Ok(Self {
            foliage_biomass,
            stem_biomass,
            root_biomass,
            tree_count,
        })
    }
}

/// Metrics derived from a stand state. Recomputed every month, never
/// carried forward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandMetrics {
    /// Mean stem diameter at breast height, cm
    pub dbh: FloatValue,
    /// Mean tree height, m
    pub height: FloatValue,
    /// Live crown length, m
    pub live_crown_length: FloatValue,
    /// Crown diameter, m
    pub crown_diameter: FloatValue,
    /// Mean single-tree basal area, m²
    pub basal_area: FloatValue,
    /// Stand volume, m³/ha
    pub stand_volume: FloatValue,
    /// Trunk diameter recovered from basal area, cm
    pub trunk_diameter: FloatValue,
}

impl StandMetrics {
    /// The all-zero metrics of a dead or massless stand.
    pub fn zeroed() -> Self {
        Self {
            dbh: 0.0,
            height: 0.0,
            live_crown_length: 0.0,
            crown_diameter: 0.0,
            basal_area: 0.0,
            stand_volume: 0.0,
            trunk_diameter: 0.0,
        }
    }
}

/// One month's output record: the downstream-facing metrics plus the
/// internal state snapshot and production diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthRecord {
    /// Elapsed month index, 0-based.
    pub month: usize,
    pub species: String,
    pub bark_texture: String,
    pub bark_color: String,

    pub height: FloatValue,
    pub dbh: FloatValue,
    pub live_crown_length: FloatValue,
    pub crown_diameter: FloatValue,
    pub basal_area: FloatValue,
    pub stand_volume: FloatValue,

    pub foliage_biomass: FloatValue,
    pub stem_biomass: FloatValue,
    pub root_biomass: FloatValue,
    pub tree_count: FloatValue,
    pub trees_died: u32,

    pub gpp: FloatValue,
    pub npp: FloatValue,
}

/// How a simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StandOutcome {
    /// All requested months were simulated.
    Completed,
    /// The tree count reached zero during the given month; no records are
    /// produced from that month on.
    Extinct { month: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_must_be_positive() {
        assert!(StandState::new(7.0, 5.0, 2.0, 1200.0).is_ok());
        for bad in [
            StandState::new(0.0, 5.0, 2.0, 1200.0),
            StandState::new(7.0, -1.0, 2.0, 1200.0),
            StandState::new(7.0, 5.0, 2.0, 0.0),
            StandState::new(7.0, FloatValue::NAN, 2.0, 1200.0),
        ] {
            assert!(bad.is_err());
        }
    }

    #[test]
    fn test_record_serialises() {
        let record = MonthRecord {
            month: 3,
            species: "generic conifer".to_string(),
            bark_texture: "furrowed".to_string(),
            bark_color: "grey-brown".to_string(),
            height: 12.5,
            dbh: 18.0,
            live_crown_length: 6.5,
            crown_diameter: 3.2,
            basal_area: 0.025,
            stand_volume: 210.0,
            foliage_biomass: 7.1,
            stem_biomass: 121.0,
            root_biomass: 39.5,
            tree_count: 1180.0,
            trees_died: 2,
            gpp: 3.1,
            npp: 1.46,
        };
        let json = serde_json::to_string(&record).unwrap();
        let parsed: MonthRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_outcome_variants_distinguishable() {
        assert_ne!(StandOutcome::Completed, StandOutcome::Extinct { month: 4 });
    }
}
