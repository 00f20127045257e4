// src/utils/errors.rs
//! Engine error types
//!
//! All fallible library paths return [`EngineError`] through the crate-wide
//! [`Result`] alias. Resource bookkeeping violations (releasing a unit that
//! is not held, tower underflow) get their own variants so they can never be
//! mistaken for ordinary contention outcomes.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, EngineError>;

/// Engine error taxonomy
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration could not be loaded from file/environment
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration loaded but failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A release was attempted on a pool index that is not currently held
    #[error("{pool} unit {index} released while not held")]
    UnitNotHeld { pool: &'static str, index: usize },

    /// A release or acquire referenced an index outside the pool
    #[error("{pool} unit {index} out of range (pool size {size})")]
    UnitOutOfRange {
        pool: &'static str,
        index: usize,
        size: usize,
    },

    /// Tower clearance released more times than acquired
    #[error("tower clearance released with none outstanding")]
    TowerUnderflow,

    /// Tracing/telemetry initialization failed
    #[error("telemetry error: {0}")]
    Telemetry(String),

    /// A spawned simulation task panicked or was cancelled
    #[error("task failure: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::UnitNotHeld {
            pool: "runway",
            index: 2,
        };
        assert_eq!(err.to_string(), "runway unit 2 released while not held");

        let err = EngineError::TowerUnderflow;
        assert!(err.to_string().contains("tower"));
    }
}
