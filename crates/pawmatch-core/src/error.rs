//! Error types for the PawMatch client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire PawMatch client.
///
/// The enum is `Clone` so that a single failed request can be handed to every
/// reader that joined it through the result cache.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PawError {
    /// Field-level input error, raised before any network call
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// The remote service rejected the credentials or the session cookie
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Transport-level failure (connection refused, timeout, DNS, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// The remote service answered with a non-success status
    #[error("Service error ({status}): {message}")]
    Service { status: u16, message: String },

    /// An operation of the same kind is already running
    #[error("Operation already in progress: {0}")]
    Busy(String),

    /// Match generation failed in either of its two calls
    #[error("Match generation failed: {0}")]
    MatchFailed(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Persisted client storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PawError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error for a single input field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Service error from an HTTP status and response body
    pub fn service(status: u16, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            message: message.into(),
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a field validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this is an authentication error
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    /// Check if this error is transient and the user may simply retry.
    ///
    /// Returns true for network failures and server-side (5xx) or throttling
    /// (429) responses.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Service { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns the field name for validation errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Text shown to the user for this error.
    ///
    /// Validation errors show their field message verbatim; everything else
    /// collapses to a single banner-level sentence.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message, .. } => message.clone(),
            Self::Authentication(_) => "Login failed. Please try again.".to_string(),
            Self::Network(_) | Self::Service { .. } => {
                "Something went wrong while contacting the service. Please try again.".to_string()
            }
            Self::Busy(what) => format!("Please wait, {} is still running.", what),
            Self::MatchFailed(_) => "Failed to generate match. Please try again.".to_string(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for PawError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for PawError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for PawError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for PawError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (used at the binary boundary)
impl From<anyhow::Error> for PawError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, PawError>`.
pub type Result<T> = std::result::Result<T, PawError>;
