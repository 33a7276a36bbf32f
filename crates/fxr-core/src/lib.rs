//! Core library for invoice exchange-rate extraction.
//!
//! This crate provides:
//! - PDF decoding into text lines
//! - USD/EUR rate and total recognition with ambiguity handling
//! - Reverse-rate and EUR total derivation with floor rounding
//! - Order-preserving concurrent batch processing with per-document failures

pub mod batch;
pub mod error;
pub mod invoice;
pub mod models;
pub mod pdf;

pub use batch::{BatchProcessor, DirectorySource, DocumentSource};
pub use error::{DecodeError, EnumerationError, ExtractionError, FxrError, Result};
pub use invoice::rules::{FieldSpec, MatchOutcome};
pub use invoice::{InvoiceExtractor, RateExtractor};
pub use models::config::{FxrConfig, MissingRatePolicy};
pub use models::rates::{BatchOutcome, DocumentRef, ExtractionResult, FieldValue, RawDocument};
pub use pdf::{DocumentDecoder, PdfDecoder};
