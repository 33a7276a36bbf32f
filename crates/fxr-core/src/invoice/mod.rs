//! Invoice field extraction module.

mod extractor;
pub mod rules;

pub use extractor::RateExtractor;

use crate::error::ExtractionError;
use crate::models::rates::{ExtractionResult, RawDocument};

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for invoice field extractors.
pub trait InvoiceExtractor {
    /// Extract fields from a decoded document.
    fn extract(&self, document: &RawDocument) -> Result<ExtractionResult>;

    /// Extract fields from plain text.
    fn extract_from_text(&self, name: &str, text: &str) -> Result<ExtractionResult> {
        self.extract(&RawDocument::from_text(name, text))
    }
}
