//! Request outcome classification
//!
//! Decides whether one task execution counts as a success or a failure.
//! Classification is a pure function of the task kind and the response
//! body; it never panics and never propagates an error to the caller.

use crate::task::TaskKind;
use serde_json::Value as JsonValue;

/// Acceptance strings returned by the target auth service
pub const MSG_REGISTERED: &str = "User Registered";
pub const MSG_ALREADY_EXISTS: &str = "Email already Exists";
pub const MSG_BAD_CREDENTIALS: &str = "Incorrect email or password";

/// Result of classifying one task execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Outcome::Success => None,
            Outcome::Failure(reason) => Some(reason),
        }
    }
}

/// Classify a response body for the given task kind.
///
/// A rejected login ("Incorrect email or password") classifies as success:
/// credential rejection is correct behavior of the system under test, not
/// a harness failure.
pub fn classify(kind: TaskKind, body: &str) -> Outcome {
    let parsed: JsonValue = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return Outcome::Failure("invalid response body".to_string()),
    };

    let msg = parsed.get("msg").and_then(|m| m.as_str());

    match kind {
        TaskKind::Register => match msg {
            Some(MSG_REGISTERED) | Some(MSG_ALREADY_EXISTS) => Outcome::Success,
            _ => Outcome::Failure(format!("unexpected response: {}", body)),
        },
        TaskKind::Login | TaskKind::StressLogin => {
            if parsed.get("token").is_some() || msg == Some(MSG_BAD_CREDENTIALS) {
                Outcome::Success
            } else {
                Outcome::Failure(format!("unexpected response: {}", body))
            }
        }
    }
}
