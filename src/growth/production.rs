//! Light interception and primary production.
//!
//! Converts the month's modifier bank, the current foliage biomass and the
//! incident solar radiation into intercepted photosynthetically active
//! radiation, gross primary production and net primary production.

use crate::config::SimulationConfig;
use crate::growth::modifiers::GrowthModifiers;
use crate::parameters::SpeciesParameters;
use crate::FloatValue;
use serde::{Deserialize, Serialize};

/// Production quantities derived for one month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Production {
    /// Specific leaf area, m²/kg
    pub sla: FloatValue,
    /// Leaf area index
    pub lai: FloatValue,
    /// Fraction of the ground covered by canopy, [0, 1]
    pub canopy_cover: FloatValue,
    /// Intercepted photosynthetically active radiation
    pub par: FloatValue,
    /// Gross primary production, tDM/ha
    pub gpp: FloatValue,
    /// Net primary production, tDM/ha
    pub npp: FloatValue,
}

/// Computes monthly production for a species under a fixed configuration.
pub struct ProductionEngine<'a> {
    species: &'a SpeciesParameters,
    config: &'a SimulationConfig,
}

impl<'a> ProductionEngine<'a> {
    pub fn new(species: &'a SpeciesParameters, config: &'a SimulationConfig) -> Self {
        Self { species, config }
    }

    /// Specific leaf area: exponential interpolation from the juvenile value
    /// `sla_0` towards the mature value `sla_1`, halfway at age `t_sla`.
    pub fn specific_leaf_area(&self, age_years: FloatValue) -> FloatValue {
        let s = self.species;
        s.sla_1
            + (s.sla_0 - s.sla_1)
                * (-std::f64::consts::LN_2 * (age_years / s.t_sla).powi(2)).exp()
    }

    /// Leaf area index from foliage biomass (tDM/ha) and SLA.
    pub fn leaf_area_index(&self, sla: FloatValue, foliage_biomass: FloatValue) -> FloatValue {
        0.1 * sla * foliage_biomass
    }

    /// Ground area covered by canopy: a linear ramp reaching 1 at the canopy
    /// closure age `tc`, clamped at 1 thereafter. A species with `tc == 0`
    /// is closed from the start.
    pub fn canopy_cover(&self, age_years: FloatValue) -> FloatValue {
        if self.species.tc == 0.0 {
            return 1.0;
        }
        (age_years / self.species.tc).clamp(0.0, 1.0)
    }

    /// Beer–Lambert light interception over the covered fraction of the
    /// stand. Zero cover intercepts nothing; the extinction term divides by
    /// cover only when cover is positive.
    pub fn intercepted_par(
        &self,
        lai: FloatValue,
        canopy_cover: FloatValue,
        solar_radiation: FloatValue,
    ) -> FloatValue {
        if canopy_cover <= 0.0 {
            return 0.0;
        }
        let extinction = 1.0 - (-self.species.k * lai / canopy_cover).exp();
        extinction * 2.3 * canopy_cover * solar_radiation
    }

    /// Gross production: the product of the temperature, frost, nutrition,
    /// CO2 and physiological modifiers, the quantum efficiency ceiling and
    /// the intercepted radiation.
    pub fn gross_production(&self, modifiers: &GrowthModifiers, par: FloatValue) -> FloatValue {
        modifiers.temperature
            * modifiers.frost
            * modifiers.nutrition
            * modifiers.co2
            * modifiers.physiological
            * self.species.alpha_cx
            * par
    }

    /// Net production after the fixed respiration conversion.
    pub fn net_production(&self, gpp: FloatValue) -> FloatValue {
        gpp * self.config.npp_ratio
    }

    /// Compute the full production chain for one month.
    pub fn compute(
        &self,
        age_years: FloatValue,
        foliage_biomass: FloatValue,
        solar_radiation: FloatValue,
        modifiers: &GrowthModifiers,
    ) -> Production {
        let sla = self.specific_leaf_area(age_years);
        let lai = self.leaf_area_index(sla, foliage_biomass);
        let canopy_cover = self.canopy_cover(age_years);
        let par = self.intercepted_par(lai, canopy_cover, solar_radiation);
        let gpp = self.gross_production(modifiers, par);
        let npp = self.net_production(gpp);

        Production {
            sla,
            lai,
            canopy_cover,
            par,
            gpp,
            npp,
        }
    }
}
