//! Per-user task scheduling
//!
//! One scheduler drives one virtual user: initialize state once, then
//! loop picking a weighted-random task, executing it, recording the
//! outcome and sleeping for a sampled wait time until the stop flag is
//! observed. The stop is cooperative and only honored at loop
//! boundaries; an in-flight request is never interrupted.

use crate::profile::Profile;
use crate::stats::StatsAggregator;
use crate::task::Task;
use crate::user::VirtualUserState;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::Rng;
use stampede_http::Transport;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::debug;

/// Cumulative-weight table for task selection with replacement.
///
/// Built once per user and cached for its lifetime. A draw is uniform in
/// `[0, total)`; empirical frequencies converge to `weight/total` over
/// many iterations, with no iteration-to-iteration history.
pub struct WeightTable {
    cumulative: Vec<u64>,
    total: u64,
}

impl WeightTable {
    /// Build the table over a validated task list (all weights positive)
    pub fn new(tasks: &[Task]) -> Self {
        let mut cumulative = Vec::with_capacity(tasks.len());
        let mut total = 0u64;
        for task in tasks {
            total += u64::from(task.weight);
            cumulative.push(total);
        }
        Self { cumulative, total }
    }

    /// Draw one task index
    pub fn pick<R: Rng>(&self, rng: &mut R) -> usize {
        let roll = rng.random_range(0..self.total);
        self.cumulative.partition_point(|&bound| bound <= roll)
    }
}

/// Sample a uniform wait within the profile's inclusive range.
/// A range with min == max yields a fixed delay. Sampling works in
/// microseconds so sub-millisecond bounds are honored.
pub fn sample_wait<R: Rng>(range: (Duration, Duration), rng: &mut R) -> Duration {
    let (min, max) = range;
    if min == max {
        return min;
    }
    let us = rng.random_range(min.as_micros() as u64..=max.as_micros() as u64);
    Duration::from_micros(us)
}

/// Swarm-wide iteration budget shared by all users.
///
/// The user that exhausts the budget trips the swarm stop flag; at most
/// one extra draw per user can race past the boundary without executing.
#[derive(Clone)]
pub struct IterationBudget {
    counter: Arc<AtomicU64>,
    max: u64,
    stop: Arc<watch::Sender<bool>>,
}

impl IterationBudget {
    pub fn new(max: u64, stop: Arc<watch::Sender<bool>>) -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(0)),
            max,
            stop,
        }
    }

    /// Claim one iteration. Returns false once the budget is spent.
    fn take(&self) -> bool {
        let prev = self.counter.fetch_add(1, Ordering::Relaxed);
        if prev >= self.max {
            let _ = self.stop.send(true);
            return false;
        }
        true
    }
}

/// Drives one virtual user's behavior loop until stopped
pub struct UserScheduler {
    user_index: usize,
    start_delay: Duration,
    profile: Arc<Profile>,
    transport: Arc<dyn Transport>,
    stats: Arc<StatsAggregator>,
    stop: watch::Receiver<bool>,
    rng: StdRng,
    budget: Option<IterationBudget>,
}

impl UserScheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_index: usize,
        start_delay: Duration,
        profile: Arc<Profile>,
        transport: Arc<dyn Transport>,
        stats: Arc<StatsAggregator>,
        stop: watch::Receiver<bool>,
        rng: StdRng,
        budget: Option<IterationBudget>,
    ) -> Self {
        Self {
            user_index,
            start_delay,
            profile,
            transport,
            stats,
            stop,
            rng,
            budget,
        }
    }

    /// Run the user loop to completion.
    ///
    /// Never returns an error: every failure mode inside the loop is
    /// recorded as an outcome, and the loop exits only on the stop flag
    /// or an exhausted iteration budget.
    pub async fn run(mut self) {
        // Ramp-up stagger: wait for this user's start slot, unless the
        // swarm is stopped first.
        if !self.start_delay.is_zero() && !self.pause(self.start_delay).await {
            return;
        }

        let state = VirtualUserState::generate(&mut self.rng);
        let table = WeightTable::new(&self.profile.tasks);
        debug!(
            "virtual user {} started as user{} ({} profile)",
            self.user_index, state.user_id, self.profile.name
        );

        loop {
            if *self.stop.borrow() {
                break;
            }
            if let Some(budget) = &self.budget {
                if !budget.take() {
                    break;
                }
            }

            let task = &self.profile.tasks[table.pick(&mut self.rng)];
            let timestamp = Utc::now();
            let started = Instant::now();
            let outcome = task
                .execute(self.transport.as_ref(), &state, &mut self.rng)
                .await;
            self.stats
                .record(task.name, &outcome, timestamp, started.elapsed());

            let wait = sample_wait(self.profile.wait_time, &mut self.rng);
            if !self.pause(wait).await {
                break;
            }
        }

        debug!("virtual user {} stopped", self.user_index);
    }

    /// Sleep without blocking sibling users, abandoning the wait as soon
    /// as the stop flag flips. Returns false when stopped.
    async fn pause(&mut self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.stop.changed() => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskKind;
    use rand::SeedableRng;

    fn weighted_tasks() -> Vec<Task> {
        vec![
            Task::new("register", 2, TaskKind::Register),
            Task::new("login", 3, TaskKind::Login),
            Task::new("stress-login", 1, TaskKind::StressLogin),
        ]
    }

    #[test]
    fn test_weighted_selection_converges_to_weight_ratios() {
        let tasks = weighted_tasks();
        let table = WeightTable::new(&tasks);
        let mut rng = StdRng::seed_from_u64(99);

        let draws = 60_000usize;
        let mut counts = [0usize; 3];
        for _ in 0..draws {
            counts[table.pick(&mut rng)] += 1;
        }

        let total_weight = 6.0;
        for (i, task) in tasks.iter().enumerate() {
            let expected = f64::from(task.weight) / total_weight;
            let observed = counts[i] as f64 / draws as f64;
            assert!(
                (observed - expected).abs() < 0.01,
                "task {} drifted: expected {:.3}, observed {:.3}",
                task.name,
                expected,
                observed
            );
        }
    }

    #[test]
    fn test_pick_covers_every_task() {
        let tasks = weighted_tasks();
        let table = WeightTable::new(&tasks);
        let mut rng = StdRng::seed_from_u64(3);

        let mut seen = [false; 3];
        for _ in 0..1000 {
            seen[table.pick(&mut rng)] = true;
        }
        assert_eq!(seen, [true, true, true]);
    }

    #[test]
    fn test_sampled_wait_stays_within_bounds() {
        let range = (Duration::from_millis(100), Duration::from_millis(500));
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..10_000 {
            let wait = sample_wait(range, &mut rng);
            assert!(wait >= range.0 && wait <= range.1);
        }
    }

    #[test]
    fn test_sampled_wait_honors_submillisecond_bounds() {
        let range = (Duration::from_micros(1500), Duration::from_micros(2500));
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..10_000 {
            let wait = sample_wait(range, &mut rng);
            assert!(
                wait >= range.0 && wait <= range.1,
                "sampled {:?} outside [{:?}, {:?}]",
                wait,
                range.0,
                range.1
            );
        }
    }

    #[test]
    fn test_degenerate_wait_range_is_fixed_delay() {
        let range = (Duration::from_millis(250), Duration::from_millis(250));
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            assert_eq!(sample_wait(range, &mut rng), Duration::from_millis(250));
        }
    }

    #[test]
    fn test_iteration_budget_trips_stop_when_spent() {
        let (stop_tx, stop_rx) = watch::channel(false);
        let budget = IterationBudget::new(3, Arc::new(stop_tx));

        assert!(budget.take());
        assert!(budget.take());
        assert!(budget.take());
        assert!(!*stop_rx.borrow());

        assert!(!budget.take());
        assert!(*stop_rx.borrow());
    }
}
