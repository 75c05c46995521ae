//! Error types for Sentry API operations.

use thiserror::Error;

/// Errors that can occur while talking to the Sentry API or decoding its data.
#[derive(Debug, Error)]
pub enum SentryError {
    /// Configuration is missing or incomplete.
    #[error("Sentry configuration required: {0}")]
    ConfigMissing(String),

    /// A composite identifier did not have the expected shape.
    #[error("unexpected format of ID ({id}), expected {expected}")]
    InvalidId { id: String, expected: String },

    /// The API answered with a non-success status.
    #[error("API returned status {status}: {body}")]
    Api { status: u16, body: String },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A request could not be dispatched through the transport stack.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A value could not be converted between the model and its wire form.
    #[error("{0}")]
    Codec(String),
}

impl SentryError {
    /// Build a codec error from anything printable.
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec(message.into())
    }

    /// HTTP status code of an API error, if this is one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true when the API reported the subject as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Result type alias for Sentry operations.
pub type Result<T> = core::result::Result<T, SentryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        let err = SentryError::Api {
            status: 404,
            body: "{\"detail\":\"The requested resource does not exist\"}".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));

        let err = SentryError::Api {
            status: 500,
            body: String::new(),
        };
        assert!(!err.is_not_found());
        assert!(!SentryError::codec("boom").is_not_found());
    }

    #[test]
    fn test_invalid_id_message() {
        let err = SentryError::InvalidId {
            id: "a/b".to_string(),
            expected: "organization/project-slug/key-id".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unexpected format of ID (a/b), expected organization/project-slug/key-id"
        );
    }
}
