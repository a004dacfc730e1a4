//! Load profiles
//!
//! A profile bundles a weighted task set with a wait-time range. The
//! stress profile is built by explicit composition: it copies the load
//! profile's tasks and weights, appends the high-intensity stress-login
//! task and substitutes a shorter wait range.

use crate::error::EngineError;
use crate::task::{Task, TaskKind};
use stampede_config::ProfileKind;
use std::time::Duration;

/// A named load pattern: tasks, weights and pacing
#[derive(Debug, Clone)]
pub struct Profile {
    pub name: &'static str,
    pub tasks: Vec<Task>,
    /// Inclusive (min, max) bounds for the inter-task wait
    pub wait_time: (Duration, Duration),
}

impl Profile {
    /// Normal traffic: registration and login with realistic pacing
    pub fn load() -> Self {
        Self {
            name: "load",
            tasks: vec![
                Task::new("register", 2, TaskKind::Register),
                Task::new("login", 3, TaskKind::Login),
            ],
            wait_time: (Duration::from_secs(1), Duration::from_secs(2)),
        }
    }

    /// High-intensity traffic: the load profile's tasks plus randomized
    /// stress logins, with much shorter pacing
    pub fn stress() -> Self {
        let base = Self::load();
        let mut tasks = base.tasks;
        tasks.push(Task::new("stress-login", 1, TaskKind::StressLogin));
        Self {
            name: "stress",
            tasks,
            wait_time: (Duration::from_millis(100), Duration::from_millis(500)),
        }
    }

    /// Look up the built-in profile for a configured kind
    pub fn for_kind(kind: ProfileKind) -> Self {
        match kind {
            ProfileKind::Load => Self::load(),
            ProfileKind::Stress => Self::stress(),
        }
    }

    /// Sum of all task weights
    pub fn total_weight(&self) -> u64 {
        self.tasks.iter().map(|t| u64::from(t.weight)).sum()
    }

    /// Validate the profile. Runs before any virtual user starts; a
    /// profile that fails here never generates load.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.tasks.is_empty() {
            return Err(self.invalid("profile has no tasks"));
        }

        for task in &self.tasks {
            if task.weight == 0 {
                return Err(self.invalid(format!("task {} has zero weight", task.name)));
            }
        }

        if self.total_weight() == 0 {
            return Err(self.invalid("total task weight is zero"));
        }

        let (min, max) = self.wait_time;
        if min > max {
            return Err(self.invalid(format!(
                "wait time range is inverted: {:?} > {:?}",
                min, max
            )));
        }

        Ok(())
    }

    fn invalid(&self, message: impl Into<String>) -> EngineError {
        EngineError::InvalidProfile {
            profile: self.name.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles_are_valid() {
        assert!(Profile::load().validate().is_ok());
        assert!(Profile::stress().validate().is_ok());
    }

    #[test]
    fn test_stress_task_set_is_strict_superset_of_load() {
        let load = Profile::load();
        let stress = Profile::stress();

        for task in &load.tasks {
            let inherited = stress
                .tasks
                .iter()
                .find(|t| t.name == task.name)
                .expect("stress profile must inherit every load task");
            assert_eq!(inherited.weight, task.weight, "inherited weight changed");
            assert_eq!(inherited.kind, task.kind);
        }
        assert!(stress.tasks.len() > load.tasks.len());
    }

    #[test]
    fn test_stress_wait_range_dominated_by_load() {
        let load = Profile::load();
        let stress = Profile::stress();
        assert!(stress.wait_time.0 <= load.wait_time.0);
        assert!(stress.wait_time.1 <= load.wait_time.1);
    }

    #[test]
    fn test_zero_weight_task_rejected() {
        let profile = Profile {
            name: "broken",
            tasks: vec![Task::new("noop", 0, TaskKind::Login)],
            wait_time: (Duration::ZERO, Duration::ZERO),
        };
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_empty_task_set_rejected() {
        let profile = Profile {
            name: "empty",
            tasks: vec![],
            wait_time: (Duration::ZERO, Duration::ZERO),
        };
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_inverted_wait_range_rejected() {
        let profile = Profile {
            name: "inverted",
            tasks: vec![Task::new("login", 1, TaskKind::Login)],
            wait_time: (Duration::from_secs(2), Duration::from_secs(1)),
        };
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_for_kind_maps_to_builtins() {
        assert_eq!(Profile::for_kind(ProfileKind::Load).name, "load");
        assert_eq!(Profile::for_kind(ProfileKind::Stress).name, "stress");
    }
}
