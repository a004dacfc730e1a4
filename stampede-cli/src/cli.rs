//! CLI argument parsing definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a load test against the target service
    Run {
        /// Base URL of the target service
        #[arg(long, value_name = "URL")]
        target: Option<String>,

        /// Load pattern: load or stress
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,

        /// Number of concurrent virtual users
        #[arg(long, value_name = "COUNT")]
        users: Option<usize>,

        /// Ramp-up window in seconds (user starts staggered across it)
        #[arg(long, value_name = "SECONDS")]
        ramp: Option<u64>,

        /// Run duration in seconds
        #[arg(long, value_name = "SECONDS")]
        duration: Option<u64>,

        /// Stop after this many task executions across the swarm
        #[arg(long, value_name = "COUNT")]
        iterations: Option<u64>,

        /// Base RNG seed for reproducible task and wait sampling
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,

        /// Print the final report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Validate the configuration and profile without generating load
    Check {
        /// Load pattern: load or stress
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
    },
}
