//! Environmental growth modifier bank.
//!
//! Each modifier is a dimensionless factor in [0, 1] (the CO2 modifier may
//! exceed 1) computed from the month's climate, the species parameters and
//! the simulation configuration. The bank assumes a parameter set that has
//! already passed [`SpeciesParameters::validate`]; the degenerate cases the
//! formulas cannot tolerate (`t_opt == t_min`, `f_cax_700 >= 2`) are rejected
//! there rather than evaluated here.
//!
//! [`SpeciesParameters::validate`]: crate::parameters::SpeciesParameters::validate

use crate::climate::MonthlyClimate;
use crate::config::{PhysiologicalPolicy, SimulationConfig};
use crate::parameters::SpeciesParameters;
use crate::FloatValue;
use serde::{Deserialize, Serialize};

/// The modifiers computed for one month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthModifiers {
    pub temperature: FloatValue,
    pub frost: FloatValue,
    pub nutrition: FloatValue,
    pub co2: FloatValue,
    pub vpd: FloatValue,
    pub soil_water: FloatValue,
    pub age: FloatValue,
    /// Combination of the age, VPD and soil-water modifiers per the
    /// configured [`PhysiologicalPolicy`].
    pub physiological: FloatValue,
}

/// Computes the modifier bank for a species under a fixed configuration.
pub struct GrowthModifierBank<'a> {
    species: &'a SpeciesParameters,
    config: &'a SimulationConfig,
}

impl<'a> GrowthModifierBank<'a> {
    pub fn new(species: &'a SpeciesParameters, config: &'a SimulationConfig) -> Self {
        Self { species, config }
    }

    /// Bell-shaped temperature response around `t_opt`.
    ///
    /// Zero outside `[t_min, t_max]`; inside, the ratio of distances to the
    /// cardinal temperatures raised to `(t_max - t_opt)/(t_opt - t_min)`,
    /// which peaks at exactly 1 when `t_a == t_opt`.
    pub fn temperature_modifier(&self, t_mean: FloatValue) -> FloatValue {
        let s = self.species;
        if t_mean < s.t_min || t_mean > s.t_max {
            return 0.0;
        }
        let exponent = (s.t_max - s.t_opt) / (s.t_opt - s.t_min);
        let base = ((t_mean - s.t_min) / (s.t_opt - s.t_min))
            * ((s.t_max - t_mean) / (s.t_max - s.t_opt)).powf(exponent);
        base.clamp(0.0, 1.0)
    }

    /// Linear decay with the fraction of the month covered by frost days,
    /// floored at 0 so a fully frozen month halts production rather than
    /// reversing it.
    pub fn frost_modifier(&self, frost_days: FloatValue) -> FloatValue {
        (1.0 - self.species.kf * (frost_days / 30.0)).max(0.0)
    }

    /// Fertility response, monotonic increasing in the fertility rating and
    /// equal to `fn0` on infertile sites.
    pub fn nutrition_modifier(&self) -> FloatValue {
        let s = self.species;
        let fr = self.config.fertility_rating;
        1.0 - (1.0 - s.fn0) * (1.0 - fr).powf(s.nfn)
    }

    /// Saturating CO2 enhancement, anchored so the modifier equals
    /// `f_cax_700` at 700 ppm and 1 at 350 ppm. Not bounded above 1.
    pub fn co2_modifier(&self) -> FloatValue {
        let f_cax = self.species.f_cax_700 / (2.0 - self.species.f_cax_700);
        let ca = self.config.co2_ppm;
        f_cax * ca / (350.0 * (f_cax - 1.0) + ca)
    }

    /// Exponential stomatal closure with mean daytime VPD.
    pub fn vpd_modifier(&self) -> FloatValue {
        (-self.species.kd * self.config.vpd_mbar).exp()
    }

    /// Logistic response to the soil moisture deficit ratio.
    pub fn soil_water_modifier(&self, climate: &MonthlyClimate) -> FloatValue {
        let s = self.species;
        let deficit = 1.0 - climate.available_soil_water / climate.max_soil_water;
        1.0 / (1.0 + (deficit / s.sw_const).powf(s.sw_power))
    }

    /// Logistic decline with relative stand age; exactly 1 while age
    /// modelling is disabled.
    pub fn age_modifier(&self, age_years: FloatValue) -> FloatValue {
        if !self.config.use_age_modifier {
            return 1.0;
        }
        let s = self.species;
        let relative_age = age_years / s.max_age;
        1.0 / (1.0 + (relative_age / s.r_age).powf(s.n_age))
    }

    /// Compute the full bank for one month.
    pub fn compute(&self, climate: &MonthlyClimate, age_years: FloatValue) -> GrowthModifiers {
        let temperature = self.temperature_modifier(climate.mean_temperature());
        let frost = self.frost_modifier(climate.frost_days);
        let nutrition = self.nutrition_modifier();
        let co2 = self.co2_modifier();
        let vpd = self.vpd_modifier();
        let soil_water = self.soil_water_modifier(climate);
        let age = self.age_modifier(age_years);

        let physiological = match self.config.physiological_policy {
            PhysiologicalPolicy::Combined => age * vpd * soil_water,
            PhysiologicalPolicy::MostLimiting => age * vpd.min(soil_water),
        };

        GrowthModifiers {
            temperature,
            frost,
            nutrition,
            co2,
            vpd,
            soil_water,
            age,
            physiological,
        }
    }
}
