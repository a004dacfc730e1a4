//! Result aggregation
//!
//! The aggregator is the only state shared across virtual users. Writes
//! are serialized by a std mutex held for a bounded critical section;
//! readers take an eventually-consistent point-in-time snapshot.

use crate::classify::Outcome;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

/// Latency summary for one task
#[derive(Debug, Clone, Default, Serialize)]
pub struct LatencyStats {
    count: u64,
    sum_ms: u64,
    pub min_ms: u64,
    pub max_ms: u64,
}

impl LatencyStats {
    fn observe(&mut self, latency: Duration) {
        let ms = latency.as_millis() as u64;
        if self.count == 0 || ms < self.min_ms {
            self.min_ms = ms;
        }
        if ms > self.max_ms {
            self.max_ms = ms;
        }
        self.count += 1;
        self.sum_ms += ms;
    }

    pub fn mean_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum_ms as f64 / self.count as f64
        }
    }
}

/// Per-task counters. Counts only ever increase during a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskStats {
    pub success_count: u64,
    pub failure_count: u64,
    /// Multiset of failure reasons
    pub failure_reasons: BTreeMap<String, u64>,
    pub latency: LatencyStats,
    pub last_recorded_at: Option<DateTime<Utc>>,
}

impl TaskStats {
    pub fn total(&self) -> u64 {
        self.success_count + self.failure_count
    }
}

/// Point-in-time copy of the aggregate statistics
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub started_at: DateTime<Utc>,
    pub tasks: BTreeMap<String, TaskStats>,
}

impl StatsSnapshot {
    pub fn total_requests(&self) -> u64 {
        self.tasks.values().map(TaskStats::total).sum()
    }

    pub fn total_failures(&self) -> u64 {
        self.tasks.values().map(|t| t.failure_count).sum()
    }
}

/// Thread-safe outcome collector shared by all virtual users
#[derive(Debug)]
pub struct StatsAggregator {
    started_at: DateTime<Utc>,
    tasks: Mutex<BTreeMap<String, TaskStats>>,
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            tasks: Mutex::new(BTreeMap::new()),
        }
    }

    /// Record one task outcome. Never blocks beyond the map update.
    pub fn record(
        &self,
        task_name: &str,
        outcome: &Outcome,
        timestamp: DateTime<Utc>,
        latency: Duration,
    ) {
        let mut tasks = self.tasks.lock().expect("stats lock poisoned");
        let entry = tasks.entry(task_name.to_string()).or_default();

        match outcome {
            Outcome::Success => entry.success_count += 1,
            Outcome::Failure(reason) => {
                entry.failure_count += 1;
                *entry.failure_reasons.entry(reason.clone()).or_insert(0) += 1;
            }
        }
        entry.latency.observe(latency);
        entry.last_recorded_at = Some(timestamp);
    }

    /// Consistent point-in-time copy of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            started_at: self.started_at,
            tasks: self.tasks.lock().expect("stats lock poisoned").clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_record_counts_successes_and_failures() {
        let stats = StatsAggregator::new();
        let now = Utc::now();

        stats.record("login", &Outcome::Success, now, Duration::from_millis(12));
        stats.record("login", &Outcome::Success, now, Duration::from_millis(8));
        stats.record(
            "login",
            &Outcome::Failure("invalid response body".to_string()),
            now,
            Duration::from_millis(30),
        );

        let snapshot = stats.snapshot();
        let login = &snapshot.tasks["login"];
        assert_eq!(login.success_count, 2);
        assert_eq!(login.failure_count, 1);
        assert_eq!(login.failure_reasons["invalid response body"], 1);
        assert_eq!(login.latency.min_ms, 8);
        assert_eq!(login.latency.max_ms, 30);
        assert!((login.latency.mean_ms() - 50.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_failure_reasons_form_a_multiset() {
        let stats = StatsAggregator::new();
        let now = Utc::now();
        for _ in 0..3 {
            stats.record(
                "register",
                &Outcome::Failure("unexpected response: {}".to_string()),
                now,
                Duration::ZERO,
            );
        }

        let snapshot = stats.snapshot();
        assert_eq!(
            snapshot.tasks["register"].failure_reasons["unexpected response: {}"],
            3
        );
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let stats = StatsAggregator::new();
        let now = Utc::now();
        stats.record("login", &Outcome::Success, now, Duration::ZERO);

        let before = stats.snapshot();
        stats.record("login", &Outcome::Success, now, Duration::ZERO);

        assert_eq!(before.tasks["login"].success_count, 1);
        assert_eq!(stats.snapshot().tasks["login"].success_count, 2);
    }

    #[test]
    fn test_concurrent_records_are_all_counted() {
        let stats = Arc::new(StatsAggregator::new());
        let mut threads = Vec::new();

        for _ in 0..8 {
            let stats = stats.clone();
            threads.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    stats.record("login", &Outcome::Success, Utc::now(), Duration::ZERO);
                }
            }));
        }
        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(stats.snapshot().tasks["login"].success_count, 8000);
    }
}
