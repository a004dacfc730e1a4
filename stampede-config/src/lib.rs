//! Stampede configuration management
//!
//! Provides typed configuration domains (run parameters, HTTP client,
//! logging) with serde-based YAML loading, environment variable overrides
//! and per-domain validation.

pub mod domains;
pub mod error;
pub mod loader;
pub mod validation;

// Re-export main types
pub use domains::http::HttpConfig;
pub use domains::logging::{LogLevel, LoggingConfig};
pub use domains::run::{ProfileKind, RunConfig};
pub use domains::StampedeConfig;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use validation::Validatable;
