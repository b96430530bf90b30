//! Error types surfaced by the loaders and the data view
//!
//! Every error here is terminal for the operation that produced it only.
//! The caller shows the message and the user may simply try again.

use thiserror::Error;

/// Message shown when a file with the wrong extension is picked
pub const WRONG_FORMAT_MESSAGE: &str = "Please upload an Excel (.xlsx) file";

/// Fallback message when the backend rejects a file without saying why
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload file";

/// Failure to turn an uploaded spreadsheet into a dataset
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Rejected before any network call (wrong extension)
    #[error("{0}")]
    WrongFormat(String),

    /// Network or HTTP failure, message includes status code and reason
    #[error("Error uploading file: {0}")]
    Transport(String),

    /// Backend answered with `success: false`
    #[error("{0}")]
    Backend(String),

    /// Response body or local file could not be decoded
    #[error("Error reading file: {0}")]
    ParseFailure(String),
}

impl LoadError {
    pub fn wrong_format() -> Self {
        LoadError::WrongFormat(WRONG_FORMAT_MESSAGE.to_string())
    }

    /// Build a backend error, falling back to the generic upload message
    pub fn backend(message: Option<String>) -> Self {
        match message {
            Some(msg) if !msg.trim().is_empty() => LoadError::Backend(msg),
            _ => LoadError::Backend(UPLOAD_FAILED_MESSAGE.to_string()),
        }
    }

    /// True when the error was raised without touching the network
    pub fn is_input_rejected(&self) -> bool {
        matches!(self, LoadError::WrongFormat(_))
    }
}

/// Failure of a data view operation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewError {
    #[error("No data to export")]
    EmptyExport,

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Invalid range for {column}: min {min} is greater than max {max}")]
    InvalidRange { column: String, min: f64, max: f64 },

    #[error("No dataset loaded")]
    NoDataset,
}
