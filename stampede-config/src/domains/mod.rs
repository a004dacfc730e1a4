//! Configuration domains

pub mod http;
pub mod logging;
pub mod run;
pub mod utils;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Root configuration for a Stampede run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StampedeConfig {
    /// Load run parameters
    #[serde(default)]
    pub run: run::RunConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: http::HttpConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl StampedeConfig {
    /// Validate all configuration domains
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.run.validate()?;
        self.http.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
