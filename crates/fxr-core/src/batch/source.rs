//! Document enumeration.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::EnumerationError;
use crate::models::config::SourceConfig;
use crate::models::rates::DocumentRef;

/// Lists the candidate documents of a batch.
pub trait DocumentSource {
    /// Enumerate documents. Failure aborts the whole batch.
    fn list(&self) -> Result<Vec<DocumentRef>, EnumerationError>;
}

/// Documents with a given extension in one directory (not recursive).
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
    extension: String,
}

impl DirectorySource {
    /// Source listing `*.pdf` files in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: "pdf".to_string(),
        }
    }

    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(&config.dir).with_extension(&config.extension)
    }

    /// Accept files with this extension instead (case-insensitive).
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.extension))
    }

    /// Keep accepted files, sorted by name. Unreadable entries are skipped.
    fn collect<I>(&self, entries: I) -> Vec<DocumentRef>
    where
        I: IntoIterator<Item = io::Result<PathBuf>>,
    {
        let mut documents: Vec<DocumentRef> = entries
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", self.dir.display(), e);
                    None
                }
            })
            .filter(|path| path.is_file() && self.accepts(path))
            .map(DocumentRef::from_path)
            .collect();

        // read_dir order is platform dependent
        documents.sort_by(|a, b| a.name.cmp(&b.name));
        documents
    }
}

impl DocumentSource for DirectorySource {
    fn list(&self) -> Result<Vec<DocumentRef>, EnumerationError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| EnumerationError {
            path: self.dir.clone(),
            source,
        })?;
        let documents = self.collect(entries.map(|entry| entry.map(|e| e.path())));

        debug!("Found {} documents in {}", documents.len(), self.dir.display());
        Ok(documents)
    }
}
