//! Species parameters
//!
//! This module contains the per-species physiological and allometric
//! constants consumed by the growth stages. Defaults describe a generic
//! temperate conifer and are intended as a starting point for calibration,
//! not as a fitted species.

mod species;

pub use species::{LeafHabit, SpeciesParameters};
