//! Error handling for the lookup pipeline.
//!
//! Two layers exist: [`DigipostError`] aborts a whole batch, while
//! [`LookupError`] describes a single failed registry call and is always
//! converted into an error row by the dispatcher.

use std::io;
use std::time::Duration;

use arrow::error::ArrowError;

/// Batch-level error for the lookup pipeline
#[derive(Debug, thiserror::Error)]
pub enum DigipostError {
    /// Error opening, reading or writing a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// The registry credential could not be resolved
    #[error("Credential error: {0}")]
    Credential(String),

    /// The intake request could not be understood
    #[error("Intake error: {0}")]
    Intake(String),

    /// A position ended up without exactly one outcome
    #[error("Internal consistency fault at position {position}: {message}")]
    Consistency {
        /// Input position that is missing or duplicated
        position: usize,
        /// What went wrong
        message: String,
    },

    /// Error building the result table or the spreadsheet
    #[error("Report error: {0}")]
    Report(String),

    /// Error handing the report to the mail transport
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// JSON (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DigipostError {
    /// Create a consistency fault for a position
    pub fn consistency(position: usize, message: impl Into<String>) -> Self {
        Self::Consistency {
            position,
            message: message.into(),
        }
    }
}

impl From<ArrowError> for DigipostError {
    fn from(error: ArrowError) -> Self {
        Self::Report(format!("Arrow error: {error}"))
    }
}

impl From<rust_xlsxwriter::XlsxError> for DigipostError {
    fn from(error: rust_xlsxwriter::XlsxError) -> Self {
        Self::Report(format!("Spreadsheet error: {error}"))
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, DigipostError>;

/// Failure of a single registry lookup
///
/// `NotFound` is an error, unlike a "not registered" answer which is a
/// successful lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// Network or connection failure
    #[error("transport failure: {0}")]
    Transport(String),

    /// The registry rejected the credential
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The registry does not know the identifier
    #[error("identifier not found in registry")]
    NotFound,

    /// The response body did not have the expected shape
    #[error("malformed registry response: {0}")]
    MalformedResponse(String),

    /// Any other non-success answer from the registry
    #[error("registry returned status {status}: {message}")]
    Service {
        /// HTTP status code
        status: u16,
        /// Response text or reason
        message: String,
    },

    /// The lookup did not finish within the configured limit
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),
}
