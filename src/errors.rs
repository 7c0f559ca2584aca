//! Error types for rapid_stc
//!
//! A clustering run fails as a whole or not at all: there is no partial
//! [`ClusterResult`](crate::result::ClusterResult). Malformed individual
//! documents are not errors; they are skipped and reported as warnings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ClusteringError>;

/// Stable, machine-readable error code.
///
/// Serialized in `snake_case` so callers can match on it without parsing
/// display strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidConfig,
    InvalidInput,
    InconsistentState,
    Cancelled,
    Serialization,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidConfig => "invalid_config",
            ErrorCode::InvalidInput => "invalid_input",
            ErrorCode::InconsistentState => "inconsistent_state",
            ErrorCode::Cancelled => "cancelled",
            ErrorCode::Serialization => "serialization",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for rapid_stc
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClusteringError {
    /// Configuration validation failed; nothing was processed
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The document batch as a whole is unusable (e.g. duplicate ids)
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// An internal invariant was broken (should not occur on valid input)
    #[error("Inconsistent state in stage '{stage}': {message}")]
    InconsistentState { stage: String, message: String },

    /// The caller cancelled the run before the named stage started
    #[error("Clustering cancelled before stage '{stage}'")]
    Cancelled { stage: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl ClusteringError {
    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an inconsistent state error for the given stage
    pub fn inconsistent_state(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InconsistentState {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Create a cancellation error
    pub fn cancelled(stage: impl Into<String>) -> Self {
        Self::Cancelled {
            stage: stage.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Stable code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidConfig { .. } => ErrorCode::InvalidConfig,
            Self::InvalidInput { .. } => ErrorCode::InvalidInput,
            Self::InconsistentState { .. } => ErrorCode::InconsistentState,
            Self::Cancelled { .. } => ErrorCode::Cancelled,
            Self::Serialization { .. } => ErrorCode::Serialization,
        }
    }

    /// Check if the run was abandoned by the caller rather than failing
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

impl From<serde_json::Error> for ClusteringError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClusteringError::invalid_config("merge_threshold must be in (0, 1]");
        assert!(err.to_string().contains("Invalid configuration"));
        assert!(err.to_string().contains("merge_threshold"));

        let err = ClusteringError::inconsistent_state("merge", "unknown document 42");
        assert_eq!(
            err.to_string(),
            "Inconsistent state in stage 'merge': unknown document 42"
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ClusteringError::invalid_input("dup").code(),
            ErrorCode::InvalidInput
        );
        assert_eq!(
            ClusteringError::cancelled("tokenize").code(),
            ErrorCode::Cancelled
        );
        assert_eq!(ErrorCode::InconsistentState.to_string(), "inconsistent_state");
    }

    #[test]
    fn test_error_code_serde() {
        let json = serde_json::to_string(&ErrorCode::InvalidConfig).unwrap();
        assert_eq!(json, r#""invalid_config""#);
        let back: ErrorCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ErrorCode::InvalidConfig);
    }

    #[test]
    fn test_is_cancelled() {
        assert!(ClusteringError::cancelled("merge").is_cancelled());
        assert!(!ClusteringError::invalid_input("x").is_cancelled());
    }

    #[test]
    fn test_from_serde_json() {
        let err: ClusteringError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert_eq!(err.code(), ErrorCode::Serialization);
    }
}
