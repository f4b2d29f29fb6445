//! Error types for milelog.
//!
//! This module defines all error types used throughout the milelog crate.
//! Location and validation failures are recoverable in the guided session
//! and are matched on by the caller rather than reported as fatal.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for milelog operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Journey Errors ===
    /// The device position could not be acquired.
    #[error("location unavailable: {reason}")]
    LocationUnavailable {
        /// Why no position was obtained.
        reason: String,
    },

    /// A required journey field is empty or malformed.
    #[error("{field} is required")]
    ValidationFailed {
        /// Name of the offending field.
        field: &'static str,
    },

    /// The event is not accepted in the current step.
    #[error("cannot {event} while {from}")]
    InvalidTransition {
        /// The step the machine was in.
        from: &'static str,
        /// The event that was rejected.
        event: &'static str,
    },

    // === Export Errors ===
    /// A share or file sink could not take the export.
    #[error("export sink '{sink}' unavailable: {message}")]
    ExportSinkUnavailable {
        /// Name of the sink.
        sink: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    /// No stored journey has the requested id.
    #[error("no journey with id {0}")]
    JourneyNotFound(i64),

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// HTTP request to the postcode service failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for milelog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a location unavailable error.
    #[must_use]
    pub fn location_unavailable(reason: impl Into<String>) -> Self {
        Self::LocationUnavailable {
            reason: reason.into(),
        }
    }

    /// Create an export sink error.
    #[must_use]
    pub fn export_sink(sink: &'static str, message: impl Into<String>) -> Self {
        Self::ExportSinkUnavailable {
            sink,
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error only blocks the current step.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationFailed { .. })
    }

    /// Check if this error means the position lookup failed.
    #[must_use]
    pub fn is_location_unavailable(&self) -> bool {
        matches!(self, Self::LocationUnavailable { .. })
    }
}
