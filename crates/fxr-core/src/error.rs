//! Error types for the fxr-core library.

use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the fxr library.
#[derive(Error, Debug)]
pub enum FxrError {
    /// Document decoding error.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Invoice field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// The document source could not be listed.
    #[error(transparent)]
    Enumeration(#[from] EnumerationError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl FxrError {
    /// Message reported for a single failed document.
    ///
    /// Per-document errors report their own message without the umbrella
    /// prefix, so a missing rate reads exactly as the extraction error does.
    pub fn reason(&self) -> String {
        match self {
            FxrError::Decode(e) => e.to_string(),
            FxrError::Extraction(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

/// Errors turning a document into text.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The document could not be read.
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    /// The document exceeds the configured size limit.
    #[error("document is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },

    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to invoice field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Zero or several exchange-rate lines matched.
    #[error("No USD/EUR rate found for this invoice")]
    RateNotFound { matches: usize },

    /// A matched token is not a number.
    #[error("malformed number for {field}: {value:?}")]
    MalformedNumber { field: String, value: String },

    /// The rate cannot be inverted.
    #[error("malformed exchange rate: {0}")]
    MalformedRate(Decimal),
}

/// The document source could not be listed. Fatal for a whole batch.
#[derive(Error, Debug)]
#[error("failed to list documents in {}: {source}", .path.display())]
pub struct EnumerationError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Result type for the fxr library.
pub type Result<T> = std::result::Result<T, FxrError>;
