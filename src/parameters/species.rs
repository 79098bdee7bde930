//! Species physiological and allometric parameters.
//!
//! Every constant the monthly recurrence needs for one species lives here.
//! Ordering invariants (notably `t_min < t_opt < t_max`) are enforced by
//! [`SpeciesParameters::validate`] before a simulation starts; the growth
//! stages assume a validated parameter set and never re-check.

use crate::errors::{ThreePGError, ThreePGResult};
use crate::FloatValue;
use serde::{Deserialize, Serialize};

/// Foliage habit of the species.
///
/// Deciduous species typically carry zero base/maximum litterfall rates and
/// shed foliage through an external mechanism; the litterfall curve treats
/// that case as an exact zero rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafHabit {
    #[default]
    Evergreen,
    Deciduous,
}

/// Physiological and allometric constants for one species.
///
/// Roughly four groups of constants feed the four numerical stages:
///
/// 1. Modifier shapes: cardinal temperatures, frost/VPD/soil-water/nutrition
///    response coefficients, CO2 enhancement, age-decline curve.
/// 2. Canopy and production: specific leaf area decay, light extinction,
///    canopy closure age, quantum efficiency ceiling.
/// 3. Partitioning and turnover: foliage:stem ratios at the 2 cm and 20 cm
///    reference diameters, root allocation extremes, litterfall curve,
///    root/stem turnover, per-pool mortality fractions, self-thinning curve.
/// 4. Allometry: power-law coefficients for stem mass, height, crown
///    dimensions and stand volume.
///
/// The categorical descriptors (`leaf_habit`, `bark_texture`, `bark_color`)
/// do not participate in the maths; they are carried through to the output
/// records for downstream visualisation consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesParameters {
    /// Species name, used in error reporting and output records.
    pub name: String,

    /// Foliage habit descriptor.
    /// default: evergreen
    pub leaf_habit: LeafHabit,

    /// Bark texture descriptor, passed through to output records.
    pub bark_texture: String,

    /// Bark colour descriptor, passed through to output records.
    pub bark_color: String,

    // ===== Temperature response =====
    /// Minimum temperature for growth
    /// unit: °C
    /// default: 0.0
    pub t_min: FloatValue,

    /// Optimum temperature for growth
    /// unit: °C
    /// default: 20.0
    pub t_opt: FloatValue,

    /// Maximum temperature for growth
    /// unit: °C
    /// default: 40.0
    pub t_max: FloatValue,

    /// Frost sensitivity: production lost per month fully covered by frost
    /// days
    /// unit: dimensionless
    /// default: 0.3
    pub kf: FloatValue,

    // ===== Soil water response =====
    /// Moisture ratio deficit at which the soil-water modifier halves
    /// unit: dimensionless
    /// default: 0.7
    pub sw_const: FloatValue,

    /// Power of the moisture ratio deficit response
    /// unit: dimensionless
    /// default: 9.0
    pub sw_power: FloatValue,

    // ===== VPD response =====
    /// Stomatal response coefficient to vapour pressure deficit
    /// unit: mbar⁻¹
    /// default: 0.05
    pub kd: FloatValue,

    // ===== Nutrition response =====
    /// Value of the nutrition modifier at fertility rating 0
    /// unit: dimensionless, [0, 1]
    /// default: 0.5
    pub fn0: FloatValue,

    /// Power of (1 - fertility rating) in the nutrition modifier
    /// unit: dimensionless
    /// default: 1.0
    pub nfn: FloatValue,

    // ===== CO2 response =====
    /// Assimilation enhancement factor at 700 ppm atmospheric CO2
    /// unit: dimensionless, (1, 2)
    /// default: 1.4
    pub f_cax_700: FloatValue,

    // ===== Age decline =====
    /// Maximum expected stand age, scales the relative age
    /// unit: years
    /// default: 100.0
    pub max_age: FloatValue,

    /// Power of relative age in the age modifier
    /// unit: dimensionless
    /// default: 4.0
    pub n_age: FloatValue,

    /// Relative age at which the age modifier halves
    /// unit: dimensionless
    /// default: 0.95
    pub r_age: FloatValue,

    // ===== Canopy =====
    /// Specific leaf area at stand age 0
    /// unit: m²/kg
    /// default: 6.0
    pub sla_0: FloatValue,

    /// Specific leaf area for mature stands
    /// unit: m²/kg
    /// default: 4.0
    pub sla_1: FloatValue,

    /// Stand age at which specific leaf area is halfway between `sla_0` and
    /// `sla_1`
    /// unit: years
    /// default: 2.5
    pub t_sla: FloatValue,

    /// Light extinction coefficient of the canopy
    /// unit: dimensionless
    /// default: 0.5
    pub k: FloatValue,

    /// Stand age at full canopy cover
    /// unit: years
    /// default: 3.0
    pub tc: FloatValue,

    /// Canopy quantum efficiency ceiling
    /// unit: tDM/(kWh/m²) equivalent
    /// default: 0.055
    pub alpha_cx: FloatValue,

    // ===== Partitioning =====
    /// Foliage:stem partitioning ratio at 2 cm dbh
    /// unit: dimensionless
    /// default: 1.0
    pub pfs2: FloatValue,

    /// Foliage:stem partitioning ratio at 20 cm dbh
    /// unit: dimensionless
    /// default: 0.15
    pub pfs20: FloatValue,

    /// Value of `m` (root allocation fertility term) at fertility rating 0
    /// unit: dimensionless
    /// default: 0.0
    pub m0: FloatValue,

    /// Minimum fraction of NPP allocated to roots
    /// unit: dimensionless
    /// default: 0.25
    pub nr_min: FloatValue,

    /// Maximum fraction of NPP allocated to roots
    /// unit: dimensionless
    /// default: 0.8
    pub nr_max: FloatValue,

    // ===== Litterfall and turnover =====
    /// Litterfall rate at stand age 0. Zero (with `gamma_f1` zero) marks a
    /// deciduous species whose litterfall rate is exactly 0.
    /// unit: month⁻¹
    /// default: 0.001
    pub gamma_f0: FloatValue,

    /// Maximum litterfall rate for mature stands
    /// unit: month⁻¹
    /// default: 0.027
    pub gamma_f1: FloatValue,

    /// Stand age at which the litterfall rate reaches the mean of
    /// `gamma_f0` and `gamma_f1`
    /// unit: months
    /// default: 24.0
    pub t_gamma_f: FloatValue,

    /// Root turnover rate
    /// unit: month⁻¹
    /// default: 0.015
    pub gamma_r: FloatValue,

    /// Stem turnover rate
    /// unit: month⁻¹
    /// default: 0.0
    pub gamma_s: FloatValue,

    // ===== Mortality fractions =====
    /// Fraction of mean foliage mass lost per tree that dies
    /// unit: dimensionless
    /// default: 0.0
    pub mf: FloatValue,

    /// Fraction of mean root mass lost per tree that dies
    /// unit: dimensionless
    /// default: 0.2
    pub mr: FloatValue,

    /// Fraction of mean stem mass lost per tree that dies
    /// unit: dimensionless
    /// default: 0.2
    pub ms: FloatValue,

    // ===== Self-thinning =====
    /// Maximum individual stem mass at 1000 trees/ha
    /// unit: tDM/tree
    /// default: 0.3
    pub wsx1000: FloatValue,

    /// Power of (1000/N) in the self-thinning rule
    /// unit: dimensionless
    /// default: 1.5
    pub nm: FloatValue,

    // ===== Allometry =====
    /// Stem mass of a tree of 1 m dbh
    /// unit: tDM
    /// default: 6.0
    pub aws: FloatValue,

    /// Power of dbh in the stem mass relationship
    /// unit: dimensionless
    /// default: 2.4
    pub nws: FloatValue,

    /// Asymptotic contribution of the height curve
    /// unit: m
    /// default: 35.0
    pub ah: FloatValue,

    /// Exponential decay constant of the height curve
    /// unit: cm
    /// default: 25.0
    pub nhb: FloatValue,

    /// Linear dbh term of the height curve
    /// unit: m/cm
    /// default: 0.05
    pub nhc: FloatValue,

    /// Asymptotic contribution of the live crown length curve
    /// unit: m
    /// default: 25.0
    pub acl: FloatValue,

    /// Exponential decay constant of the live crown length curve
    /// unit: cm
    /// default: 30.0
    pub ncl_b: FloatValue,

    /// Linear dbh term of the live crown length curve
    /// unit: m/cm
    /// default: 0.01
    pub ncl_c: FloatValue,

    /// Crown diameter coefficient
    /// unit: m
    /// default: 0.3
    pub ak: FloatValue,

    /// Power of dbh in the crown diameter relationship
    /// unit: dimensionless
    /// default: 0.7
    pub nkb: FloatValue,

    /// Power of height in the crown diameter relationship
    /// unit: dimensionless
    /// default: 0.15
    pub nkh: FloatValue,

    /// Stand volume coefficient
    /// unit: m³
    /// default: 4.5e-5
    pub av: FloatValue,

    /// Power of dbh in the stand volume relationship
    /// unit: dimensionless
    /// default: 1.9
    pub nvb: FloatValue,

    /// Power of height in the stand volume relationship
    /// unit: dimensionless
    /// default: 1.0
    pub nvh: FloatValue,

    /// Power of dbh²·height in the stand volume relationship
    /// unit: dimensionless
    /// default: 0.0
    pub nvbh: FloatValue,
}

impl Default for SpeciesParameters {
    fn default() -> Self {
        Self {
            name: "generic conifer".to_string(),
            leaf_habit: LeafHabit::Evergreen,
            bark_texture: "furrowed".to_string(),
            bark_color: "grey-brown".to_string(),

            t_min: 0.0,
            t_opt: 20.0,
            t_max: 40.0,
            kf: 0.3,

            sw_const: 0.7,
            sw_power: 9.0,
            kd: 0.05,
            fn0: 0.5,
            nfn: 1.0,
            f_cax_700: 1.4,

            max_age: 100.0,
            n_age: 4.0,
            r_age: 0.95,

            sla_0: 6.0,
            sla_1: 4.0,
            t_sla: 2.5,
            k: 0.5,
            tc: 3.0,
            alpha_cx: 0.055,

            pfs2: 1.0,
            pfs20: 0.15,
            m0: 0.0,
            nr_min: 0.25,
            nr_max: 0.8,

            gamma_f0: 0.001,
            gamma_f1: 0.027,
            t_gamma_f: 24.0,
            gamma_r: 0.015,
            gamma_s: 0.0,

            mf: 0.0,
            mr: 0.2,
            ms: 0.2,

            wsx1000: 0.3,
            nm: 1.5,

            aws: 6.0,
            nws: 2.4,
            ah: 35.0,
            nhb: 25.0,
            nhc: 0.05,
            acl: 25.0,
            ncl_b: 30.0,
            ncl_c: 0.01,
            ak: 0.3,
            nkb: 0.7,
            nkh: 0.15,
            av: 4.5e-5,
            nvb: 1.9,
            nvh: 1.0,
            nvbh: 0.0,
        }
    }
}

impl SpeciesParameters {
    /// Power of dbh in the foliage:stem partitioning ratio (derived).
    ///
    /// `np = log10(pfs20 / pfs2)`, so that the ratio interpolates between the
    /// two reference diameters on a log scale.
    pub fn pfs_power(&self) -> FloatValue {
        (self.pfs20 / self.pfs2).log10()
    }

    /// Scale of the foliage:stem partitioning ratio (derived).
    ///
    /// `ap = pfs2 / 2^np`, so that `ap·2^np == pfs2` and `ap·20^np == pfs20`.
    pub fn pfs_const(&self) -> FloatValue {
        self.pfs2 / 2.0_f64.powf(self.pfs_power())
    }

    /// Whether the litterfall rate is pinned to exactly zero.
    ///
    /// Deciduous species are parameterised with zero base and maximum
    /// litterfall rates; evaluating the saturating litterfall curve there
    /// would divide by zero.
    pub fn has_zero_litterfall(&self) -> bool {
        self.gamma_f0 == 0.0 || self.gamma_f1 == 0.0
    }

    /// Check the parameter set before a simulation starts.
    ///
    /// Fails fast with a descriptive [`ThreePGError::InvalidSpeciesData`]
    /// naming the offending parameter instead of letting a degenerate value
    /// propagate NaN or Inf through the modifier formulas.
    pub fn validate(&self) -> ThreePGResult<()> {
        if self.t_opt == self.t_min {
            return self.invalid(
                "t_opt",
                "must differ from t_min: the temperature modifier exponent divides by (t_opt - t_min)",
            );
        }
        if self.t_opt == self.t_max {
            return self.invalid(
                "t_opt",
                "must differ from t_max: the temperature modifier divides by (t_max - t_opt)",
            );
        }
        if !(self.t_min < self.t_opt && self.t_opt < self.t_max) {
            return self.invalid(
                "t_min/t_opt/t_max",
                "must satisfy t_min < t_opt < t_max",
            );
        }
        if !(self.f_cax_700 > 1.0 && self.f_cax_700 < 2.0) {
            return self.invalid(
                "f_cax_700",
                "must lie within (1, 2): the CO2 response divides by (2 - f_cax_700)",
            );
        }
        if self.sw_const <= 0.0 {
            return self.invalid("sw_const", "must be positive");
        }
        if !(self.pfs2 > 0.0 && self.pfs20 > 0.0) {
            return self.invalid("pfs2/pfs20", "must both be positive");
        }
        if !(self.nr_min >= 0.0 && self.nr_min <= self.nr_max && self.nr_max <= 1.0) {
            return self.invalid("nr_min/nr_max", "must satisfy 0 <= nr_min <= nr_max <= 1");
        }
        if !(self.aws > 0.0 && self.nws > 0.0) {
            return self.invalid("aws/nws", "must both be positive");
        }
        if !(self.wsx1000 > 0.0) {
            return self.invalid("wsx1000", "must be positive");
        }
        if self.t_sla <= 0.0 {
            return self.invalid("t_sla", "must be positive");
        }
        if !self.has_zero_litterfall() && self.t_gamma_f <= 0.0 {
            return self.invalid(
                "t_gamma_f",
                "must be positive when litterfall rates are non-zero",
            );
        }
        if self.max_age <= 0.0 || self.r_age <= 0.0 {
            return self.invalid("max_age/r_age", "must both be positive");
        }
        if self.tc < 0.0 {
            return self.invalid("tc", "must be non-negative");
        }

        let non_negative = [
            ("kf", self.kf),
            ("kd", self.kd),
            ("nfn", self.nfn),
            ("sla_0", self.sla_0),
            ("sla_1", self.sla_1),
            ("k", self.k),
            ("alpha_cx", self.alpha_cx),
            ("gamma_f0", self.gamma_f0),
            ("gamma_f1", self.gamma_f1),
            ("gamma_r", self.gamma_r),
            ("gamma_s", self.gamma_s),
            ("mf", self.mf),
            ("mr", self.mr),
            ("ms", self.ms),
            ("av", self.av),
        ];
        for (parameter, value) in non_negative {
            if value < 0.0 {
                return self.invalid(parameter, "must be non-negative");
            }
        }
        if !(0.0..=1.0).contains(&self.fn0) {
            return self.invalid("fn0", "must lie within [0, 1]");
        }

        for (parameter, value) in [
            ("gamma_r", self.gamma_r),
            ("gamma_s", self.gamma_s),
            ("gamma_f1", self.gamma_f1),
        ] {
            if value > 0.2 {
                log::warn!(
                    "species '{}': {} = {} is an unusually fast monthly turnover rate",
                    self.name,
                    parameter,
                    value
                );
            }
        }

        Ok(())
    }

    /// Load a species from a TOML document and validate it.
    pub fn from_toml_str(s: &str) -> ThreePGResult<Self> {
        let species: Self =
            toml::from_str(s).map_err(|e| ThreePGError::Error(e.to_string()))?;
        species.validate()?;
        Ok(species)
    }

    fn invalid(&self, parameter: &str, reason: &str) -> ThreePGResult<()> {
        Err(ThreePGError::InvalidSpeciesData {
            species: self.name.clone(),
            parameter: parameter.to_string(),
            reason: reason.to_string(),
        })
    }
}
