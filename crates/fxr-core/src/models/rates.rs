//! Per-document data models for exchange-rate extraction.

use std::fmt;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

/// Sentinel rendered in place of an unavailable numeric value.
pub const UNAVAILABLE: &str = "-";

/// A candidate document found by a document source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    /// File name used in reports.
    pub name: String,
    /// Location of the document.
    pub path: PathBuf,
}

impl DocumentRef {
    /// Create a reference from a path, naming it after its file name.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Decoded document text, split into lines.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Document name.
    pub name: String,
    /// Text lines in document order.
    pub lines: Vec<String>,
}

impl RawDocument {
    /// Split decoded text into lines (`\n` or `\r\n` terminated).
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        Self {
            name: name.into(),
            lines: text.lines().map(str::to_string).collect(),
        }
    }
}

/// A numeric field that may be unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldValue {
    /// The value was extracted or derived.
    Available(Decimal),
    /// The value is missing from the document, or an input it derives from is.
    #[default]
    Unavailable,
}

impl FieldValue {
    pub fn as_option(&self) -> Option<Decimal> {
        match self {
            FieldValue::Available(v) => Some(*v),
            FieldValue::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, FieldValue::Available(_))
    }
}

impl From<Option<Decimal>> for FieldValue {
    fn from(value: Option<Decimal>) -> Self {
        value.map_or(FieldValue::Unavailable, FieldValue::Available)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Available(v) => write!(f, "{}", v.normalize()),
            FieldValue::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

// Always serialized as a string so the placeholder survives every format.
impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Rates and totals extracted from one invoice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    /// Source document name.
    pub filename: String,
    /// EUR received for one USD, as printed on the invoice.
    pub usd_to_eur: FieldValue,
    /// Reciprocal of `usd_to_eur`, floored to 3 places.
    pub eur_to_usd: FieldValue,
    /// Invoice total in USD.
    pub total_in_usd: FieldValue,
    /// `total_in_usd` converted to EUR, floored to 2 places.
    pub total_in_eur: FieldValue,
}

/// Outcome of processing one document in a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    /// Fields were extracted.
    Success(ExtractionResult),
    /// The document could not be decoded or its rate was not recognized.
    Failure { filename: String, reason: String },
}

impl BatchOutcome {
    pub fn failure(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        BatchOutcome::Failure {
            filename: filename.into(),
            reason: reason.into(),
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            BatchOutcome::Success(result) => &result.filename,
            BatchOutcome::Failure { filename, .. } => filename,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BatchOutcome::Success(_))
    }

    pub fn result(&self) -> Option<&ExtractionResult> {
        match self {
            BatchOutcome::Success(result) => Some(result),
            BatchOutcome::Failure { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            BatchOutcome::Success(_) => None,
            BatchOutcome::Failure { reason, .. } => Some(reason),
        }
    }
}
