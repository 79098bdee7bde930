use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum ThreePGError {
    #[error("{0}")]
    Error(String),
    #[error("Invalid species data for '{species}': {parameter} {reason}")]
    InvalidSpeciesData {
        species: String,
        parameter: String,
        reason: String,
    },
    #[error("Unknown soil texture '{0}'. Expected one of: sand, loamy sand, sandy loam, loam, clay loam, clay")]
    UnknownSoilTexture(String),
    #[error("Stand of '{species}' died out at month {month}; no further growth can be simulated")]
    StandExtinct { species: String, month: usize },
    #[error("Expected exactly 12 monthly climate records, got {0}")]
    InvalidClimateLength(usize),
    #[error("Invalid configuration: {parameter} {reason}")]
    InvalidConfig { parameter: String, reason: String },
}

/// Convenience type for `Result<T, ThreePGError>`.
pub type ThreePGResult<T> = Result<T, ThreePGError>;
