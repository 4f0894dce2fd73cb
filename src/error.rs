//! Error types for the tax form library.
//!
//! Structural failures (the input is not a parsable PDF) are fatal for the
//! operation that hit them. Failures of a single mapping batch never surface
//! here: the mapper isolates them and reports them through
//! [`BatchReport`](crate::mapper::BatchReport).

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting, mapping or filling forms.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input bytes could not be parsed as a PDF document
    #[error("Invalid PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Document is encrypted with a user password or an unsupported handler
    #[error("Encrypted PDF cannot be opened without a user password")]
    Encrypted,

    /// Invalid PDF structure that prevents the operation from completing
    #[error("Invalid PDF structure: {0}")]
    InvalidStructure(String),

    /// Caller-supplied configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Text-completion collaborator failed (transport, status or payload)
    #[error("Completion request failed: {message}")]
    Completion {
        /// Description of the failure
        message: String,
    },

    /// Blank form could not be retrieved
    #[error("Form not found: {0}")]
    FormNotFound(String),

    /// Every mapping batch failed to produce a usable response
    #[error("All {batches} mapping batches failed")]
    AllBatchesFailed {
        /// Number of batches that were issued
        batches: usize,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Build a [`Error::Completion`] from anything printable.
    pub fn completion(message: impl std::fmt::Display) -> Self {
        Error::Completion {
            message: message.to_string(),
        }
    }
}
