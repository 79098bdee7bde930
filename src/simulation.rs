//! The monthly stand-simulation runner.
//!
//! [`StandSimulation`] owns one species' state and advances it through the
//! fixed per-month stage order:
//!
//! 1. resolve this month's climate from the cyclic calendar
//! 2. growth modifier bank
//! 3. light interception and production
//! 4. partitioning, fed by the **previous** month's stem diameter (the
//!    one-month lag is deliberate and load-bearing)
//! 5. self-thinning
//! 6. biomass integration
//! 7. stand metrics for the new state
//!
//! Each month depends only on the prior month's biomass pools and tree
//! count. Simulations of different species share no mutable state and can
//! run concurrently; months within a species must run in order.

use crate::climate::{ClimateCalendar, MonthlyClimate};
use crate::config::SimulationConfig;
use crate::errors::{ThreePGError, ThreePGResult};
use crate::growth::{
    stand_metrics, BiomassIntegrator, GrowthModifierBank, MortalityEngine, PartitionEngine,
    ProductionEngine,
};
use crate::parameters::SpeciesParameters;
use crate::state::{MonthRecord, StandMetrics, StandOutcome, StandState};
use crate::FloatValue;
use log::warn;
use serde::{Deserialize, Serialize};

/// The records produced by a run, plus how the run ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRun {
    pub records: Vec<MonthRecord>,
    pub outcome: StandOutcome,
}

/// Monthly recurrence for one species' stand.
#[derive(Debug, Clone)]
pub struct StandSimulation {
    species: SpeciesParameters,
    calendar: ClimateCalendar,
    config: SimulationConfig,
    state: StandState,
    /// Metrics of the current state; the next month's partitioning reads
    /// its diameter.
    metrics: StandMetrics,
    month: usize,
    extinct_at: Option<usize>,
}

impl StandSimulation {
    /// Validate the inputs and set up the recurrence.
    ///
    /// Fails fast on invalid species data or configuration rather than
    /// letting NaN propagate through the monthly formulas.
    pub fn new(
        species: SpeciesParameters,
        calendar: ClimateCalendar,
        config: SimulationConfig,
        initial_state: StandState,
    ) -> ThreePGResult<Self> {
        species.validate()?;
        config.validate()?;
        for elapsed in 0..12 {
            let month = calendar.month_at(0, elapsed);
            if !(month.max_soil_water > 0.0) {
                return Err(ThreePGError::Error(format!(
                    "calendar month {} has unresolved soil water (max_soil_water = {}); \
                     build the calendar with sampled water or supply resolved records",
                    elapsed, month.max_soil_water
                )));
            }
        }

        let metrics = stand_metrics(&species, &initial_state);
        Ok(Self {
            species,
            calendar,
            config,
            state: initial_state,
            metrics,
            month: 0,
            extinct_at: None,
        })
    }

    /// Build a simulation from raw climate records, resolving each month's
    /// soil water from its texture category with the configured seed.
    pub fn from_climate_records(
        species: SpeciesParameters,
        records: Vec<MonthlyClimate>,
        config: SimulationConfig,
        initial_state: StandState,
    ) -> ThreePGResult<Self> {
        let calendar =
            ClimateCalendar::from_records_with_sampled_water(records, config.soil_water_seed)?;
        Self::new(species, calendar, config, initial_state)
    }

    /// Stand age in years at the current month.
    pub fn age_years(&self) -> FloatValue {
        self.config.starting_age_years + self.month as FloatValue / 12.0
    }

    pub fn state(&self) -> &StandState {
        &self.state
    }

    pub fn metrics(&self) -> &StandMetrics {
        &self.metrics
    }

    /// The month the stand died out, if it has.
    pub fn extinct_at(&self) -> Option<usize> {
        self.extinct_at
    }

    /// The extinction error for this stand, for callers that want to
    /// propagate extinction as a hard failure.
    pub fn extinction_error(&self) -> Option<ThreePGError> {
        self.extinct_at.map(|month| ThreePGError::StandExtinct {
            species: self.species.name.clone(),
            month,
        })
    }

    /// Advance one month.
    ///
    /// Returns `None` once the stand is extinct: a terminal "no further
    /// data" condition, deliberately distinct from an error. Use
    /// [`StandSimulation::extinct_at`] to see when it happened.
    pub fn step(&mut self) -> Option<MonthRecord> {
        if self.extinct_at.is_some() {
            return None;
        }

        let age = self.age_years();
        let climate = self
            .calendar
            .month_at(self.config.starting_month, self.month);

        let modifiers =
            GrowthModifierBank::new(&self.species, &self.config).compute(climate, age);
        let production = ProductionEngine::new(&self.species, &self.config).compute(
            age,
            self.state.foliage_biomass,
            climate.solar_kwh_m2,
            &modifiers,
        );
        // Previous month's diameter: the structural one-month lag.
        let ratios = PartitionEngine::new(&self.species, &self.config)
            .compute(self.metrics.dbh, modifiers.physiological);

        let thinning =
            MortalityEngine::new(&self.species).thin(self.state.stem_biomass, self.state.tree_count);
        if thinning.tree_count <= 0.0 {
            self.state.tree_count = 0.0;
            self.metrics = StandMetrics::zeroed();
            self.extinct_at = Some(self.month);
            warn!(
                "stand of '{}' died out at month {}",
                self.species.name, self.month
            );
            return None;
        }

        let entry_count = self.state.tree_count;
        let pools = BiomassIntegrator::new(&self.species).integrate(
            self.state.foliage_biomass,
            self.state.stem_biomass,
            self.state.root_biomass,
            production.npp,
            &ratios,
            age,
            entry_count,
            thinning.trees_died,
        );

        self.state = StandState {
            foliage_biomass: pools.foliage,
            stem_biomass: pools.stem,
            root_biomass: pools.root,
            tree_count: thinning.tree_count,
        };
        self.metrics = stand_metrics(&self.species, &self.state);

        let record = MonthRecord {
            month: self.month,
            species: self.species.name.clone(),
            bark_texture: self.species.bark_texture.clone(),
            bark_color: self.species.bark_color.clone(),
            height: self.metrics.height,
            dbh: self.metrics.dbh,
            live_crown_length: self.metrics.live_crown_length,
            crown_diameter: self.metrics.crown_diameter,
            basal_area: self.metrics.basal_area,
            stand_volume: self.metrics.stand_volume,
            foliage_biomass: self.state.foliage_biomass,
            stem_biomass: self.state.stem_biomass,
            root_biomass: self.state.root_biomass,
            tree_count: self.state.tree_count,
            trees_died: thinning.trees_died,
            gpp: production.gpp,
            npp: production.npp,
        };

        self.month += 1;
        Some(record)
    }

    /// Run up to `months` further months, collecting one record per month
    /// actually simulated.
    pub fn run(&mut self, months: usize) -> SimulationRun {
        let mut records = Vec::with_capacity(months);
        for _ in 0..months {
            match self.step() {
                Some(record) => records.push(record),
                None => {
                    return SimulationRun {
                        records,
                        outcome: StandOutcome::Extinct {
                            month: self.extinct_at.expect("step returned None while alive"),
                        },
                    }
                }
            }
        }
        SimulationRun {
            records,
            outcome: StandOutcome::Completed,
        }
    }
}
