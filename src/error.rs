use thiserror::Error;

use crate::sanitize::strip_tags;

/// Everything that can end a request/response cycle. None of these are fatal:
/// the page shows the message and the user can resubmit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Request never made it, HTTP status was not 2xx, or the body did not parse.
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with `{"error": ...}`.
    #[error("Service error: {0}")]
    Service(String),

    /// Body had neither a payload nor an `error` key.
    #[error("No output received")]
    Empty,

    /// A form field could not be parsed as a number; nothing was sent.
    #[error("Invalid {field}: '{value}'")]
    InvalidInput { field: &'static str, value: String },
}

impl ApiError {
    pub fn invalid(field: &'static str, value: &str) -> Self {
        Self::InvalidInput { field, value: value.to_string() }
    }

    /// Text shown to the user after the `Error: ` prefix.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Could not connect to API".to_string(),
            Self::Service(msg) => strip_tags(msg),
            Self::Empty => "No output received".to_string(),
            Self::InvalidInput { .. } => self.to_string(),
        }
    }

    /// Single display line. `Empty` is a placeholder, not an error line.
    pub fn display_line(&self) -> String {
        match self {
            Self::Empty => self.user_message(),
            _ => format!("Error: {}", self.user_message()),
        }
    }
}
