//! Error types for telemetry-oxide
//!
//! Structural problems (missing timestamp column, unreadable source) are typed
//! errors. Field-level problems never surface here: a malformed field degrades
//! to a text value during parsing.

use thiserror::Error;

/// Main error type for ingestion, configuration and file access
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// File I/O error
    #[error("Failed to access file: {0}")]
    FileIo(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration value out of range
    #[error("Configuration error: {0}")]
    Config(String),

    /// The configured timestamp column is not in the header
    #[error("Column '{column}' not found in header")]
    MissingTimestampColumn { column: String },

    /// Input has no header line at all
    #[error("Input is empty")]
    EmptyFile,

    /// The collaborator providing the raw text could not deliver it
    #[error("Failed to fetch '{source_name}': {reason}")]
    FetchFailure { source_name: String, reason: String },

    /// A newer load started before this one finished
    #[error("Load was superseded by a newer one")]
    Superseded,
}

/// Result type alias for telemetry-oxide operations
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// UI-friendly error message formatting
impl TelemetryError {
    /// Get a user-friendly error message suitable for displaying in UI
    pub fn user_message(&self) -> String {
        match self {
            TelemetryError::FileIo(e) => format!("File error: {}", e),
            TelemetryError::Json(e) => format!("JSON error: {}", e),
            TelemetryError::Config(msg) => format!("Config error: {}", msg),
            TelemetryError::MissingTimestampColumn { column } => {
                format!("No \"{}\" field found in the data", column)
            }
            TelemetryError::EmptyFile => "The file contains no data".to_string(),
            TelemetryError::FetchFailure {
                source_name,
                reason,
            } => format!("Could not load {}: {}", source_name, reason),
            TelemetryError::Superseded => "Loading was replaced by a newer file".to_string(),
        }
    }

    /// Get a short title for the error (for banners)
    pub fn title(&self) -> &'static str {
        match self {
            TelemetryError::FileIo(_) => "File Error",
            TelemetryError::Json(_) => "JSON Error",
            TelemetryError::Config(_) => "Configuration Error",
            TelemetryError::MissingTimestampColumn { .. } => "Missing Timestamp",
            TelemetryError::EmptyFile => "Empty File",
            TelemetryError::FetchFailure { .. } => "Load Failed",
            TelemetryError::Superseded => "Load Cancelled",
        }
    }
}
