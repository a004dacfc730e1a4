//! Weighted tasks
//!
//! A task is one named, weighted unit of simulated user behavior. Executing
//! a task sends a single form-encoded POST through the transport and
//! classifies the response. Transport failures become failure outcomes,
//! never unhandled faults.

use crate::classify::{classify, Outcome};
use crate::user::{LoginPayload, VirtualUserState, USER_ID_RANGE};
use rand::Rng;
use stampede_http::Transport;
use tracing::debug;

/// Registration endpoint path on the target service
pub const REGISTER_PATH: &str = "/register";
/// Login endpoint path on the target service
pub const LOGIN_PATH: &str = "/login";

/// The behaviors a virtual user can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Register the user's own identity
    Register,
    /// Log in with the user's own credentials
    Login,
    /// Log in with a fresh random identity on every execution
    StressLogin,
}

/// A named task with a relative selection weight.
///
/// Within a profile, a task of weight `w` out of total weight `T` is
/// selected with probability `w/T`.
#[derive(Debug, Clone)]
pub struct Task {
    pub name: &'static str,
    pub weight: u32,
    pub kind: TaskKind,
}

impl Task {
    pub const fn new(name: &'static str, weight: u32, kind: TaskKind) -> Self {
        Self { name, weight, kind }
    }

    /// Execute this task once for the given user.
    ///
    /// The RNG is only consulted by [`TaskKind::StressLogin`], which draws
    /// a new random identity per request.
    pub async fn execute<R: Rng>(
        &self,
        transport: &dyn Transport,
        state: &VirtualUserState,
        rng: &mut R,
    ) -> Outcome {
        let (path, form) = match self.kind {
            TaskKind::Register => (REGISTER_PATH, state.registration.form()),
            TaskKind::Login => (LOGIN_PATH, state.login.form()),
            TaskKind::StressLogin => {
                let random_id = rng.random_range(USER_ID_RANGE);
                (LOGIN_PATH, LoginPayload::for_user_id(random_id).form())
            }
        };

        match transport.post_form(path, &form).await {
            Ok(response) => classify(self.kind, &response.body),
            Err(err) => {
                debug!("transport error on {}: {}", path, err);
                Outcome::Failure(format!("transport error: {}", err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use stampede_http::MockTransport;

    fn test_state() -> VirtualUserState {
        VirtualUserState::generate(&mut StdRng::seed_from_u64(1))
    }

    #[tokio::test]
    async fn test_register_task_hits_register_endpoint() {
        let mock = MockTransport::new().with_response(
            REGISTER_PATH,
            200,
            r#"{"msg":"User Registered"}"#,
        );
        let task = Task::new("register", 2, TaskKind::Register);
        let mut rng = StdRng::seed_from_u64(2);

        let outcome = task.execute(&mock, &test_state(), &mut rng).await;
        assert!(outcome.is_success());
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_login_task_hits_login_endpoint() {
        let mock =
            MockTransport::new().with_response(LOGIN_PATH, 200, r#"{"token":"abc123"}"#);
        let task = Task::new("login", 3, TaskKind::Login);
        let mut rng = StdRng::seed_from_u64(2);

        let outcome = task.execute(&mock, &test_state(), &mut rng).await;
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_transport_error_becomes_failure_outcome() {
        let mock = MockTransport::new().with_failure(LOGIN_PATH, "connection refused");
        let task = Task::new("login", 3, TaskKind::Login);
        let mut rng = StdRng::seed_from_u64(2);

        let outcome = task.execute(&mock, &test_state(), &mut rng).await;
        let reason = outcome.failure_reason().unwrap();
        assert!(reason.contains("transport error"));
        assert!(reason.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_stress_login_posts_to_login_path() {
        let mock = MockTransport::new().with_response(
            LOGIN_PATH,
            200,
            r#"{"msg":"Incorrect email or password"}"#,
        );
        let task = Task::new("stress-login", 1, TaskKind::StressLogin);
        let mut rng = StdRng::seed_from_u64(2);

        let outcome = task.execute(&mock, &test_state(), &mut rng).await;
        assert!(outcome.is_success());
    }
}
