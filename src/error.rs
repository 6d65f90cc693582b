// Error types: configuration and drill setup

use thiserror::Error;

/// Configuration Errors
#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum ConfigError {
    #[error("Battlefield {width}x{height} is too small or not finite")]
    InvalidBattlefield { width: f64, height: f64 },
    #[error("Maximum fire distance must be positive, got {0}")]
    InvalidFireDistance(f64),
}

/// Drill Errors
#[derive(Error, Debug, PartialEq)]
pub enum DrillError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Drill needs at least one round and one turn")]
    EmptyDrill,
}
