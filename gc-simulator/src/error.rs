//! Error types for the heap simulator
//!
//! Only the outer surfaces can fail: configuration loading and validation,
//! fragmentation overrides and report serialization. Collection cycles
//! themselves never fail.

use std::path::PathBuf;

/// Simulator operation result type
pub type SimResult<T> = Result<T, SimError>;

/// Errors surfaced by configuration and reporting
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Invalid configuration
    #[error("Invalid simulation configuration: {0}")]
    InvalidConfig(String),

    /// Fragmentation override outside [0, 1]
    #[error("Fragmentation override {0} is outside [0, 1]")]
    InvalidFragmentation(f64),

    /// Fragmentation override used outside test mode
    #[error("Fragmentation override requires test mode")]
    OverrideRequiresTestMode,

    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    ConfigIo {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::SimulationConfig`]
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Report could not be serialized
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SimError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a config I/O error
    pub fn config_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigIo {
            path: path.into(),
            source,
        }
    }
}
