//! Error types for the load engine

use thiserror::Error;

/// Load engine errors.
///
/// Transport and classification problems are not represented here: they
/// are recovered inside task execution and recorded as failure outcomes.
/// Engine errors are configuration-level and fatal before any user starts.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid profile {profile}: {message}")]
    InvalidProfile { profile: String, message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] stampede_config::ConfigError),
}
