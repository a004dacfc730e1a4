//! Stampede load engine
//!
//! Simulates concurrent virtual users exercising a target service's
//! registration and login endpoints. Each user runs an independent
//! weighted-random task loop with sampled think time; outcomes are
//! classified against the service's expected responses and aggregated
//! into swarm-wide statistics.

pub mod classify;
pub mod error;
pub mod profile;
pub mod scheduler;
pub mod stats;
pub mod swarm;
pub mod task;
pub mod user;

// Re-export main types
pub use classify::{classify, Outcome};
pub use error::EngineError;
pub use profile::Profile;
pub use scheduler::{sample_wait, UserScheduler, WeightTable};
pub use stats::{StatsAggregator, StatsSnapshot, TaskStats};
pub use swarm::{SwarmController, SwarmHandle, SwarmOptions};
pub use task::{Task, TaskKind};
pub use user::VirtualUserState;
