//! The per-month numerical stages of the growth model.
//!
//! Each stage is a small component parameterised by the species constants and
//! the simulation configuration, with pure solver methods:
//!
//! - `modifiers`: the bank of dimensionless environmental growth modifiers
//! - `production`: light interception and gross/net primary production
//! - `partition`: allocation of net production among foliage, stem and roots
//! - `mortality`: density-dependent self-thinning
//! - `biomass`: the three-pool monthly integrator
//! - `allometry`: derived stand metrics (dbh, height, crowns, volume)

pub mod allometry;
pub mod biomass;
pub mod modifiers;
pub mod mortality;
pub mod partition;
pub mod production;

pub use allometry::stand_metrics;
pub use biomass::BiomassIntegrator;
pub use modifiers::{GrowthModifierBank, GrowthModifiers};
pub use mortality::{MortalityEngine, Thinning};
pub use partition::{PartitionEngine, PartitionRatios};
pub use production::{Production, ProductionEngine};
