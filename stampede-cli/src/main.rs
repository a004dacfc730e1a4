//! Stampede: load and stress testing for auth endpoints

use anyhow::{Context, Result};
use clap::Parser;
use stampede_config::{ConfigLoader, StampedeConfig};
use stampede_core::{Profile, StatsAggregator, SwarmController, SwarmOptions};
use stampede_http::HttpTransport;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod cli;
mod report;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loader = ConfigLoader::new();
    let mut config = loader
        .load(cli.config.as_ref())
        .context("failed to load configuration")?;

    if let Some(level) = &cli.log_level {
        config.logging.level = level
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid --log-level: {}", e))?;
    }
    init_logging(&config);

    match cli.command {
        Commands::Run {
            target,
            profile,
            users,
            ramp,
            duration,
            iterations,
            seed,
            json,
        } => {
            apply_run_overrides(
                &mut config, target, profile, users, ramp, duration, iterations, seed,
            )?;
            config
                .validate_all()
                .context("invalid run configuration")?;
            run_load_test(config, json).await
        }
        Commands::Check { profile } => {
            apply_run_overrides(&mut config, None, profile, None, None, None, None, None)?;
            config
                .validate_all()
                .context("invalid run configuration")?;
            check(&config)
        }
    }
}

fn init_logging(config: &StampedeConfig) {
    let mut directives = config.logging.level.as_filter_str().to_string();
    if config.logging.trace_requests {
        // Per-request logging lives at debug level in the transport crate
        directives.push_str(",stampede_http=debug");
    }
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[allow(clippy::too_many_arguments)]
fn apply_run_overrides(
    config: &mut StampedeConfig,
    target: Option<String>,
    profile: Option<String>,
    users: Option<usize>,
    ramp: Option<u64>,
    duration: Option<u64>,
    iterations: Option<u64>,
    seed: Option<u64>,
) -> Result<()> {
    if let Some(target) = target {
        config.run.target_url = target;
    }
    if let Some(profile) = profile {
        config.run.profile = profile
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid --profile: {}", e))?;
    }
    if let Some(users) = users {
        config.run.users = users;
    }
    if let Some(ramp) = ramp {
        config.run.ramp = Duration::from_secs(ramp);
    }
    if let Some(duration) = duration {
        config.run.duration = Duration::from_secs(duration);
    }
    if iterations.is_some() {
        config.run.iterations = iterations;
    }
    if seed.is_some() {
        config.run.seed = seed;
    }
    Ok(())
}

/// Validate everything a run would use, without generating load
fn check(config: &StampedeConfig) -> Result<()> {
    let profile = Profile::for_kind(config.run.profile);
    profile.validate().context("invalid profile")?;
    HttpTransport::new(&config.run.target_url, &config.http)
        .context("invalid HTTP configuration")?;

    println!(
        "ok: profile {} ({} tasks, total weight {}), target {}",
        profile.name,
        profile.tasks.len(),
        profile.total_weight(),
        config.run.target_url
    );
    Ok(())
}

async fn run_load_test(config: StampedeConfig, json: bool) -> Result<()> {
    let profile = Profile::for_kind(config.run.profile);
    let transport = Arc::new(
        HttpTransport::new(&config.run.target_url, &config.http)
            .context("failed to build HTTP transport")?,
    );
    let stats = Arc::new(StatsAggregator::new());

    let controller = SwarmController::new(profile, transport, stats.clone())
        .context("invalid profile")?;

    let options = SwarmOptions {
        users: config.run.users,
        ramp: config.run.ramp,
        iterations: config.run.iterations,
        base_seed: config.run.seed.unwrap_or_else(rand::random),
    };

    info!(
        "running {} profile against {} with {} users for {:?}",
        config.run.profile, config.run.target_url, config.run.users, config.run.duration
    );

    let mut handle = controller.start(&options);

    // An unbounded duration (0) leaves the iteration budget as the only stop
    let duration = if config.run.duration.is_zero() {
        Duration::from_secs(60 * 60 * 24 * 365)
    } else {
        config.run.duration
    };

    tokio::select! {
        _ = tokio::time::sleep(duration) => {
            info!("run duration reached");
        }
        _ = handle.stopped() => {
            info!("iteration budget exhausted");
        }
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                warn!("failed to listen for shutdown signal: {}", err);
            }
            info!("interrupted, stopping swarm");
        }
    }

    handle.stop().await;

    let snapshot = stats.snapshot();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).context("failed to serialize report")?
        );
    } else {
        report::print_report(&snapshot);
    }

    Ok(())
}
