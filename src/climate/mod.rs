//! Site climate: the cyclic 12-month calendar and soil water resolution.

pub mod soil;

use crate::errors::{ThreePGError, ThreePGResult};
use crate::FloatValue;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use soil::{SoilTexture, SoilWater, WaterCapacityBand};

/// Climate record for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyClimate {
    /// Mean daily maximum temperature, °C
    pub t_max: FloatValue,
    /// Mean daily minimum temperature, °C
    pub t_min: FloatValue,
    /// Total rainfall, cm
    pub rainfall_cm: FloatValue,
    /// Incident solar radiation, kWh/m²
    pub solar_kwh_m2: FloatValue,
    /// Number of frost days in the month
    pub frost_days: FloatValue,
    /// Soil texture category of the site
    pub soil_texture: SoilTexture,
    /// Water currently available to roots, cm/ft
    pub available_soil_water: FloatValue,
    /// Maximum water the soil can hold, cm/ft
    pub max_soil_water: FloatValue,
}

impl MonthlyClimate {
    /// Mean monthly temperature, the average of the daily max/min means.
    pub fn mean_temperature(&self) -> FloatValue {
        (self.t_max + self.t_min) / 2.0
    }
}

/// An ordered 12-month climate calendar, indexed cyclically by elapsed month.
///
/// Soil water is resolved once, at construction, and held fixed for the
/// whole simulation. Months sharing a texture category share one sample, so
/// a calendar built twice with the same seed is identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateCalendar {
    months: Vec<MonthlyClimate>,
}

impl ClimateCalendar {
    /// Build a calendar from records whose soil water is already resolved.
    ///
    /// Rejects anything other than exactly 12 records.
    pub fn from_records(months: Vec<MonthlyClimate>) -> ThreePGResult<Self> {
        if months.len() != 12 {
            return Err(ThreePGError::InvalidClimateLength(months.len()));
        }
        Ok(Self { months })
    }

    /// Build a calendar, overwriting each record's soil water with a fresh
    /// per-texture sample.
    ///
    /// One sample is drawn per distinct texture category and reused across
    /// all months sharing that category.
    pub fn from_records_with_sampled_water(
        months: Vec<MonthlyClimate>,
        seed: u64,
    ) -> ThreePGResult<Self> {
        let mut calendar = Self::from_records(months)?;
        calendar.resample_soil_water(seed);
        Ok(calendar)
    }

    /// Redraw the per-texture soil water samples with the given seed.
    pub fn resample_soil_water(&mut self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut samples: HashMap<SoilTexture, SoilWater> = HashMap::new();
        // Sample in calendar order so the draw sequence does not depend on
        // hash iteration order.
        for month in &mut self.months {
            let water = *samples
                .entry(month.soil_texture)
                .or_insert_with(|| month.soil_texture.sample_water(&mut rng));
            month.available_soil_water = water.available;
            month.max_soil_water = water.maximum;
        }
    }

    /// The climate record for a given elapsed month, starting from the
    /// configured calendar month (0 = January).
    pub fn month_at(&self, starting_month: usize, elapsed_months: usize) -> &MonthlyClimate {
        &self.months[(starting_month + elapsed_months) % 12]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_year(texture: SoilTexture) -> Vec<MonthlyClimate> {
        (0..12)
            .map(|m| MonthlyClimate {
                t_max: 20.0 + m as FloatValue,
                t_min: 10.0,
                rainfall_cm: 8.0,
                solar_kwh_m2: 150.0,
                frost_days: 0.0,
                soil_texture: texture,
                available_soil_water: 0.0,
                max_soil_water: 0.0,
            })
            .collect()
    }

    #[test]
    fn test_rejects_wrong_length() {
        let mut records = flat_year(SoilTexture::Loam);
        records.pop();
        let err = ClimateCalendar::from_records(records).unwrap_err();
        assert!(err.to_string().contains("11"));
    }

    #[test]
    fn test_cyclic_indexing_wraps() {
        let calendar = ClimateCalendar::from_records(flat_year(SoilTexture::Loam)).unwrap();
        assert_eq!(calendar.month_at(0, 0).t_max, 20.0);
        assert_eq!(calendar.month_at(0, 13).t_max, 21.0);
        assert_eq!(calendar.month_at(11, 1).t_max, 20.0);
        assert_eq!(calendar.month_at(6, 30).t_max, 20.0);
    }

    #[test]
    fn test_shared_texture_shares_one_sample() {
        let calendar =
            ClimateCalendar::from_records_with_sampled_water(flat_year(SoilTexture::ClayLoam), 3)
                .unwrap();
        let first = calendar.month_at(0, 0);
        for m in 1..12 {
            let month = calendar.month_at(0, m);
            assert_eq!(month.available_soil_water, first.available_soil_water);
            assert_eq!(month.max_soil_water, first.max_soil_water);
        }
        assert!(first.max_soil_water > 0.0);
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let a = ClimateCalendar::from_records_with_sampled_water(flat_year(SoilTexture::Sand), 11)
            .unwrap();
        let b = ClimateCalendar::from_records_with_sampled_water(flat_year(SoilTexture::Sand), 11)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_mean_temperature() {
        let records = flat_year(SoilTexture::Loam);
        assert_eq!(records[0].mean_temperature(), 15.0);
    }
}
