//! Error types for thebrain-mcp.
//!
//! # Security Note
//!
//! Error messages are carefully crafted to NEVER include credentials.
//! The API key never appears in any variant; configuration errors only name
//! the field that is missing.

use std::path::PathBuf;

use thiserror::Error;

use crate::brain::BrainError;

/// Result type used by the protocol layer.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },

    /// A required value was absent or empty.
    #[error("{field} is required")]
    MissingValue {
        /// Human-readable field name ("API key", "Brain ID", "Base URL").
        field: &'static str,
    },
}

/// Caller-input problems detected while parsing or dispatching a message.
///
/// Always recoverable: the router turns these into `-32600` envelopes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The line was not valid JSON.
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// The decoded value was not a JSON object.
    #[error("Message must be a map")]
    NotAMap,

    /// `jsonrpc` was missing or not "2.0".
    #[error("Invalid JSON-RPC version")]
    InvalidVersion,

    /// `method` was missing or not a string.
    #[error("Method must be a string")]
    MethodNotString,

    /// A required tool argument was missing or empty.
    #[error("{0} is required")]
    MissingArgument(&'static str),

    /// `tools/call` named a tool outside the catalog.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

/// Every failure kind the protocol layer can surface.
///
/// Translated to JSON-RPC error codes in exactly one place, the router.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Malformed message or tool call.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// No handler registered for the method.
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Parameters were present but unusable.
    #[error("{0}")]
    InvalidParams(String),

    /// Failure reported by the TheBrain API client.
    #[error(transparent)]
    Brain(#[from] BrainError),

    /// Anything else; detail is logged, never sent to the caller.
    #[error("{0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let error = ConfigError::NotFound {
            path: PathBuf::from("/path/to/config.json"),
        };
        let msg = error.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("config.json"));
    }

    #[test]
    fn validation_error_display() {
        let error = ConfigError::ValidationError {
            message: "invalid setting".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("invalid setting"));
    }

    #[test]
    fn missing_value_names_the_field() {
        let error = ConfigError::MissingValue { field: "API key" };
        assert_eq!(error.to_string(), "API key is required");
    }

    #[test]
    fn protocol_error_messages() {
        assert_eq!(ProtocolError::NotAMap.to_string(), "Message must be a map");
        assert_eq!(
            ProtocolError::InvalidVersion.to_string(),
            "Invalid JSON-RPC version"
        );
        assert_eq!(
            ProtocolError::MethodNotString.to_string(),
            "Method must be a string"
        );
        assert_eq!(
            ProtocolError::UnknownTool("nope".into()).to_string(),
            "Unknown tool: nope"
        );
        assert_eq!(
            ProtocolError::MissingArgument("thought_id").to_string(),
            "thought_id is required"
        );
    }

    #[test]
    fn method_not_found_display() {
        let error = Error::MethodNotFound("foo/bar".into());
        assert_eq!(error.to_string(), "Method not found: foo/bar");
    }
}
