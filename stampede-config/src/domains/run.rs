//! Load run configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_url, Validatable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Which load pattern a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// Normal traffic: registration and login with realistic pacing
    #[default]
    Load,
    /// High-intensity traffic: adds randomized stress logins, short pacing
    Stress,
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileKind::Load => f.write_str("load"),
            ProfileKind::Stress => f.write_str("stress"),
        }
    }
}

impl FromStr for ProfileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "load" => Ok(ProfileKind::Load),
            "stress" => Ok(ProfileKind::Stress),
            other => Err(format!("unknown profile: {} (expected load or stress)", other)),
        }
    }
}

/// Load run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Base URL of the target service
    #[serde(default = "default_target_url")]
    pub target_url: String,

    /// Load pattern to run
    #[serde(default)]
    pub profile: ProfileKind,

    /// Number of concurrent virtual users
    #[serde(default = "default_users")]
    pub users: usize,

    /// Ramp-up window: user starts are staggered evenly across it
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_ramp"
    )]
    pub ramp: Duration,

    /// Total run duration
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_duration"
    )]
    pub duration: Duration,

    /// Optional swarm-wide iteration bound; the run stops at whichever
    /// of duration/iterations is reached first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u64>,

    /// Base RNG seed for reproducible task/wait sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            target_url: default_target_url(),
            profile: ProfileKind::default(),
            users: default_users(),
            ramp: default_ramp(),
            duration: default_duration(),
            iterations: None,
            seed: None,
        }
    }
}

impl Validatable for RunConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_url(&self.target_url, "target_url", self.domain_name())?;
        validate_positive(self.users as u64, "users", self.domain_name())?;

        if self.duration.is_zero() && self.iterations.is_none() {
            return Err(self.validation_error(
                "either duration or iterations must bound the run",
            ));
        }

        if let Some(0) = self.iterations {
            return Err(self.validation_error("iterations must be greater than 0"));
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "run"
    }
}

fn default_target_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_users() -> usize {
    10
}

fn default_ramp() -> Duration {
    Duration::ZERO
}

fn default_duration() -> Duration {
    Duration::from_secs(60)
}
