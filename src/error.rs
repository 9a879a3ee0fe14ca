//! Error types for loading engine configuration.
//!
//! Gameplay rejections (blocked moves, unsuitable spawns) are ordinary
//! values and never flow through here.

use thiserror::Error;

/// Failure to load or validate an [`EngineConfig`](crate::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the config file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The JSON document could not be parsed.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of its valid range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Convenience alias for `Result<T, ConfigError>`.
pub type ConfigResult<T> = Result<T, ConfigError>;
