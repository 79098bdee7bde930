//! Soil texture categories and water-holding-capacity sampling.
//!
//! Each of the six recognised texture categories maps to an empirical band
//! of plant-available water-holding capacity (cm of water per ft of soil).
//! Maximum and available soil water are drawn once, uniformly within the
//! band, and then held fixed for the whole simulation; determinism comes
//! from seeding the generator from the simulation configuration.

use crate::errors::{ThreePGError, ThreePGResult};
use crate::FloatValue;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Soil texture category of a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilTexture {
    Sand,
    LoamySand,
    SandyLoam,
    Loam,
    ClayLoam,
    Clay,
}

/// Empirical water-holding-capacity band for a texture category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterCapacityBand {
    /// Lower bound, cm of water per ft of soil
    pub min_cm_per_ft: FloatValue,
    /// Upper bound, cm of water per ft of soil
    pub max_cm_per_ft: FloatValue,
}

/// Soil water quantities resolved for a site, cm of water per ft of soil.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilWater {
    /// Water currently available to roots
    pub available: FloatValue,
    /// Maximum the soil can hold
    pub maximum: FloatValue,
}

impl SoilTexture {
    /// Empirical plant-available water-holding-capacity band.
    pub fn water_capacity_band(&self) -> WaterCapacityBand {
        let (min_cm_per_ft, max_cm_per_ft) = match self {
            SoilTexture::Sand => (1.0, 2.0),
            SoilTexture::LoamySand => (1.8, 3.0),
            SoilTexture::SandyLoam => (3.0, 4.3),
            SoilTexture::Loam => (4.3, 5.8),
            SoilTexture::ClayLoam => (4.6, 6.4),
            SoilTexture::Clay => (4.1, 6.1),
        };
        WaterCapacityBand {
            min_cm_per_ft,
            max_cm_per_ft,
        }
    }

    /// Draw maximum and available soil water for this texture.
    ///
    /// The maximum is uniform within the texture's band; the available water
    /// is uniform between the band's lower bound and the drawn maximum, so
    /// `available <= maximum` always holds.
    pub fn sample_water<R: Rng>(&self, rng: &mut R) -> SoilWater {
        let band = self.water_capacity_band();
        let maximum = rng.random_range(band.min_cm_per_ft..=band.max_cm_per_ft);
        let available = rng.random_range(band.min_cm_per_ft..=maximum);
        SoilWater { available, maximum }
    }
}

impl FromStr for SoilTexture {
    type Err = ThreePGError;

    fn from_str(s: &str) -> ThreePGResult<Self> {
        match s.trim().to_lowercase().replace('_', " ").as_str() {
            "sand" => Ok(SoilTexture::Sand),
            "loamy sand" => Ok(SoilTexture::LoamySand),
            "sandy loam" => Ok(SoilTexture::SandyLoam),
            "loam" => Ok(SoilTexture::Loam),
            "clay loam" => Ok(SoilTexture::ClayLoam),
            "clay" => Ok(SoilTexture::Clay),
            _ => Err(ThreePGError::UnknownSoilTexture(s.to_string())),
        }
    }
}

impl fmt::Display for SoilTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SoilTexture::Sand => "sand",
            SoilTexture::LoamySand => "loamy sand",
            SoilTexture::SandyLoam => "sandy loam",
            SoilTexture::Loam => "loam",
            SoilTexture::ClayLoam => "clay loam",
            SoilTexture::Clay => "clay",
        };
        write!(f, "{}", name)
    }
}
