//! A simplified 3-PG forest stand growth model.
//!
//! 3-PG ("Physiological Principles Predicting Growth") relates absorbed light
//! and a bank of environmental limitation factors to net biomass production,
//! partitions that production among foliage, stem and root pools, and removes
//! trees through density-dependent self-thinning. The engine advances one
//! stand of one species in monthly steps; each month depends only on the
//! previous month's biomass pools and tree count.
//!
//! # Module Organisation
//!
//! - `climate`: the 12-month site calendar and soil-texture water lookup
//! - `growth`: the per-month numerical stages (modifiers, production,
//!   partitioning, self-thinning, biomass integration, allometry)
//! - `parameters`: species physiological and allometric constants
//! - `config`: process-wide simulation configuration
//! - `state`: stand state, derived metrics and per-month output records
//! - `simulation`: the monthly recurrence runner
//!
//! Per-species simulations are independent and may run concurrently; months
//! within one species must execute strictly in order.

pub mod climate;
pub mod config;
pub mod errors;
pub mod growth;
pub mod parameters;
pub mod simulation;
pub mod state;

/// Scalar value type used throughout the crate.
pub type FloatValue = f64;

pub use config::{PhysiologicalPolicy, SimulationConfig};
pub use errors::{ThreePGError, ThreePGResult};
pub use parameters::SpeciesParameters;
pub use simulation::{SimulationRun, StandSimulation};
pub use state::{MonthRecord, StandMetrics, StandOutcome, StandState};
