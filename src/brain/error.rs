//! Error types for TheBrain API operations.

use thiserror::Error;

use crate::error::ConfigError;

/// Result type for TheBrain API operations.
pub type BrainResult<T> = Result<T, BrainError>;

/// Errors that can occur while talking to the TheBrain API.
///
/// The status-bearing variants ([`Self::Authentication`], [`Self::ThoughtNotFound`],
/// [`Self::RateLimit`], [`Self::Api`]) form the API error family; use
/// [`BrainError::is_api_error`] to catch any of them without enumerating kinds.
#[derive(Debug, Error)]
pub enum BrainError {
    /// The client was constructed with incomplete settings.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// Base URL failed to parse.
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// The API rejected the credentials (HTTP 401).
    #[error("Authentication failed")]
    Authentication {
        /// HTTP status returned by the API.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The requested thought does not exist (HTTP 404).
    #[error("Thought not found")]
    ThoughtNotFound {
        /// HTTP status returned by the API.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Too many requests (HTTP 429).
    #[error("Rate limit exceeded")]
    RateLimit {
        /// HTTP status returned by the API.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Any other non-2xx status.
    #[error("API request failed: {status}")]
    Api {
        /// HTTP status returned by the API.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// HTTP layer failed before a response was received (connect, timeout).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response carried a body that is not JSON.
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl BrainError {
    /// Maps a non-2xx status to its error kind.
    #[must_use]
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 => Self::Authentication { status, body },
            404 => Self::ThoughtNotFound { status, body },
            429 => Self::RateLimit { status, body },
            _ => Self::Api { status, body },
        }
    }

    /// Returns `true` for errors produced from a received HTTP response.
    #[must_use]
    pub const fn is_api_error(&self) -> bool {
        self.status_code().is_some()
    }

    /// HTTP status that triggered the error, if any.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. }
            | Self::ThoughtNotFound { status, .. }
            | Self::RateLimit { status, .. }
            | Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body kept for diagnostics.
    #[must_use]
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::Authentication { body, .. }
            | Self::ThoughtNotFound { body, .. }
            | Self::RateLimit { body, .. }
            | Self::Api { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(
            BrainError::from_status(401, String::new()),
            BrainError::Authentication { status: 401, .. }
        ));
        assert!(matches!(
            BrainError::from_status(404, String::new()),
            BrainError::ThoughtNotFound { status: 404, .. }
        ));
        assert!(matches!(
            BrainError::from_status(429, String::new()),
            BrainError::RateLimit { status: 429, .. }
        ));
        assert!(matches!(
            BrainError::from_status(500, String::new()),
            BrainError::Api { status: 500, .. }
        ));
        assert!(matches!(
            BrainError::from_status(403, String::new()),
            BrainError::Api { status: 403, .. }
        ));
    }

    #[test]
    fn api_family_carries_status_and_body() {
        let error = BrainError::from_status(429, "slow down".into());
        assert!(error.is_api_error());
        assert_eq!(error.status_code(), Some(429));
        assert_eq!(error.response_body(), Some("slow down"));
        assert_eq!(error.to_string(), "Rate limit exceeded");
    }

    #[test]
    fn generic_api_error_message_includes_status() {
        let error = BrainError::from_status(502, String::new());
        assert_eq!(error.to_string(), "API request failed: 502");
    }

    #[test]
    fn configuration_errors_are_not_api_errors() {
        let error = BrainError::from(ConfigError::MissingValue { field: "Brain ID" });
        assert!(!error.is_api_error());
        assert_eq!(error.status_code(), None);
        assert_eq!(error.to_string(), "Brain ID is required");
    }
}
