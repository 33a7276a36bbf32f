//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::invoice::rules::patterns::{DEFAULT_RATE_PATTERN, DEFAULT_TOTAL_PATTERN};

/// Main configuration for fxr.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FxrConfig {
    /// Where invoices are read from.
    pub source: SourceConfig,

    /// Batch processing configuration.
    pub batch: BatchConfig,

    /// PDF decoding configuration.
    pub pdf: PdfConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,
}

/// Document source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Directory scanned for invoices.
    pub dir: PathBuf,

    /// File extension of recognized documents (case-insensitive).
    pub extension: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("invoices"),
            extension: "pdf".to_string(),
        }
    }
}

/// Batch processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum number of documents processed at once.
    pub concurrency: usize,

    /// Per-document time limit in seconds (none = unlimited).
    pub timeout_secs: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            timeout_secs: None,
        }
    }
}

/// PDF decoding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Largest document accepted, in bytes.
    pub max_file_size: u64,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
        }
    }
}

/// What to do when an invoice has no single exchange-rate line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingRatePolicy {
    /// Fail the document.
    #[default]
    Strict,
    /// Report the document with unavailable rate fields.
    Lenient,
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Pattern recognizing the USD/EUR rate line. Capture group 1 is the rate.
    pub rate_pattern: String,

    /// Pattern recognizing the USD total line. Capture group 1 is the amount.
    pub total_pattern: String,

    /// Handling of invoices without a single rate line.
    pub missing_rate: MissingRatePolicy,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            rate_pattern: DEFAULT_RATE_PATTERN.to_string(),
            total_pattern: DEFAULT_TOTAL_PATTERN.to_string(),
            missing_rate: MissingRatePolicy::Strict,
        }
    }
}

impl FxrConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Per-document time limit, if configured.
    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.batch.timeout_secs.map(std::time::Duration::from_secs)
    }
}
