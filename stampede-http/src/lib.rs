//! HTTP transport capability for Stampede
//!
//! The load engine talks to the system under test exclusively through the
//! [`Transport`] trait: a single form-encoded POST primitive. A pooled
//! reqwest implementation is provided for real runs and an in-memory mock
//! for offline tests.

pub mod client;
pub mod errors;
pub mod types;

// Re-export main types for convenience
pub use client::{HttpTransport, MockTransport, Transport};
pub use errors::HttpError;
pub use types::{FormField, RawResponse};
