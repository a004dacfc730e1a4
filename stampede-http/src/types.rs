//! HTTP types shared by transport implementations

/// A form field being posted to the target service
pub type FormField = (&'static str, String);

/// Raw HTTP response as seen by the harness: status plus body text.
/// Interpretation of the body is left to the outcome classifier.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}
