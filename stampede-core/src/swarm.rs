//! Swarm control
//!
//! Spawns and stops the set of concurrent virtual users for one run.
//! Users run fully independently; the only shared mutable state is the
//! stats aggregator. Stopping is graceful: the stop flag flips and every
//! user is awaited, so no user is killed mid-request.

use crate::error::EngineError;
use crate::profile::Profile;
use crate::scheduler::{IterationBudget, UserScheduler};
use crate::stats::StatsAggregator;
use rand::rngs::StdRng;
use rand::SeedableRng;
use stampede_http::Transport;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Parameters for one swarm run
#[derive(Debug, Clone)]
pub struct SwarmOptions {
    /// Number of concurrent virtual users to spawn
    pub users: usize,
    /// Window across which user starts are staggered evenly
    pub ramp: Duration,
    /// Optional swarm-wide bound on task executions
    pub iterations: Option<u64>,
    /// Base seed; user `i` samples from `base_seed + i`
    pub base_seed: u64,
}

impl SwarmOptions {
    pub fn new(users: usize) -> Self {
        Self {
            users,
            ramp: Duration::ZERO,
            iterations: None,
            base_seed: rand::random(),
        }
    }
}

/// Spawns virtual users of one profile against one transport
pub struct SwarmController {
    profile: Arc<Profile>,
    transport: Arc<dyn Transport>,
    stats: Arc<StatsAggregator>,
}

impl SwarmController {
    /// Create a controller. Profile validation happens here, before any
    /// user starts; an invalid profile never generates load.
    pub fn new(
        profile: Profile,
        transport: Arc<dyn Transport>,
        stats: Arc<StatsAggregator>,
    ) -> Result<Self, EngineError> {
        profile.validate()?;
        Ok(Self {
            profile: Arc::new(profile),
            transport,
            stats,
        })
    }

    /// Spawn the swarm and return a handle controlling it.
    ///
    /// With a non-zero ramp, user starts are spread evenly across the
    /// window to avoid a thundering-herd startup spike.
    pub fn start(&self, options: &SwarmOptions) -> SwarmHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let stop_tx = Arc::new(stop_tx);

        let budget = options
            .iterations
            .map(|max| IterationBudget::new(max, stop_tx.clone()));

        let stagger = if options.users > 0 {
            options.ramp / options.users as u32
        } else {
            Duration::ZERO
        };

        info!(
            "starting swarm: {} users, {} profile, ramp {:?}",
            options.users, self.profile.name, options.ramp
        );

        let mut handles = Vec::with_capacity(options.users);
        for i in 0..options.users {
            let scheduler = UserScheduler::new(
                i,
                stagger * i as u32,
                self.profile.clone(),
                self.transport.clone(),
                self.stats.clone(),
                stop_rx.clone(),
                StdRng::seed_from_u64(options.base_seed.wrapping_add(i as u64)),
                budget.clone(),
            );
            handles.push(tokio::spawn(scheduler.run()));
        }

        SwarmHandle {
            stop_tx,
            stopped: stop_rx,
            handles,
        }
    }
}

/// Handle to a running swarm
pub struct SwarmHandle {
    stop_tx: Arc<watch::Sender<bool>>,
    stopped: watch::Receiver<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl SwarmHandle {
    /// Number of users spawned for this run
    pub fn user_count(&self) -> usize {
        self.handles.len()
    }

    /// Resolves once the swarm-wide stop flag flips (for example when an
    /// iteration budget is exhausted). Does not itself stop the swarm.
    pub async fn stopped(&mut self) {
        while !*self.stopped.borrow() {
            if self.stopped.changed().await.is_err() {
                break;
            }
        }
    }

    /// Signal every user to stop and wait for all of them to finish.
    /// After this returns, no further outcomes are recorded.
    pub async fn stop(self) {
        info!("stopping swarm ({} users)", self.handles.len());
        let _ = self.stop_tx.send(true);

        for (i, handle) in self.handles.into_iter().enumerate() {
            if let Err(err) = handle.await {
                // A panicked user only loses its own loop
                warn!("virtual user {} terminated abnormally: {}", i, err);
            }
        }
        info!("swarm stopped");
    }
}
