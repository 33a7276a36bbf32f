//! Document decoding module.

mod decoder;

pub use decoder::PdfDecoder;

use crate::error::DecodeError;
use crate::models::rates::DocumentRef;

/// Result type for decoding operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Turns a document into its text content.
///
/// Decoding is blocking and CPU-bound; the batch processor runs it on the
/// blocking thread pool.
pub trait DocumentDecoder: Send + Sync {
    /// Decode the referenced document into text.
    fn decode(&self, document: &DocumentRef) -> Result<String>;
}
