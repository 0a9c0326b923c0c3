//! Error types for the telemetry edge of the standings pipeline.
//!
//! The leaderboard core never fails: malformed or missing telemetry degrades to
//! a partially populated snapshot. Errors only surface where raw data enters the
//! crate (frame decoding, session YAML parsing, connection state) and where
//! configuration is loaded.
//!
//! ## Error Categories
//!
//! - **Connection Errors**: the telemetry source is not delivering frames
//! - **Parse Errors**: session YAML or configuration could not be understood
//! - **Field Errors**: a telemetry variable is missing from the frame schema
//! - **Type Conversion Errors**: a variable exists but has an unexpected type
//! - **Memory Errors**: a variable points outside the frame buffer
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use pitwall_standings::StandingsError;
//!
//! let error = StandingsError::connection_failed("no frames received");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use thiserror::Error;

/// Result type alias for standings operations.
pub type Result<T, E = StandingsError> = std::result::Result<T, E>;

/// Main error type for standings operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StandingsError {
    #[error("Telemetry source unavailable: {reason}")]
    Connection {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Field '{field}' not found in telemetry data")]
    FieldNotFound { field: String },

    #[error("Type conversion error: {details}")]
    TypeConversion { details: String },

    #[error("Frame access out of bounds at offset {offset:#x}")]
    Memory { offset: usize },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },
}

impl StandingsError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            StandingsError::Connection { .. } => true,
            StandingsError::Parse { .. } => true,
            StandingsError::FieldNotFound { .. } => false,
            StandingsError::TypeConversion { .. } => false,
            StandingsError::Memory { .. } => false,
            StandingsError::Config { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            StandingsError::Connection { .. } => vec![
                "Ensure iRacing is running and a session is loaded",
                "Wait for the next telemetry frame",
                "Check that the frame feed sender is still alive",
            ],
            StandingsError::Parse { .. } => vec![
                "Wait for the next session info update",
                "Verify session YAML integrity",
                "Check configuration file syntax",
            ],
            StandingsError::FieldNotFound { .. } => vec![
                "Check field name spelling",
                "Verify the variable exists in the current iRacing version",
            ],
            StandingsError::TypeConversion { .. } => vec![
                "Check data type compatibility",
                "Verify expected vs actual variable types",
            ],
            StandingsError::Memory { .. } => vec![
                "Check that the schema matches the frame buffer",
                "Verify frame size against variable offsets",
            ],
            StandingsError::Config { .. } => vec![
                "Check configuration values against documented ranges",
                "Remove the field to fall back to its default",
            ],
        }
    }

    /// Helper constructor for connection errors.
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        StandingsError::Connection { reason: reason.into(), source: None }
    }

    /// Helper constructor for connection errors with source.
    pub fn connection_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        StandingsError::Connection { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for parse errors.
    pub fn parse_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        StandingsError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for configuration errors.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        StandingsError::Config { reason: reason.into() }
    }
}

impl From<serde_yaml_ng::Error> for StandingsError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        StandingsError::Parse { context: "YAML deserialization".to_string(), details: err.to_string() }
    }
}

impl From<serde_json::Error> for StandingsError {
    fn from(err: serde_json::Error) -> Self {
        StandingsError::Parse { context: "JSON serialization".to_string(), details: err.to_string() }
    }
}
