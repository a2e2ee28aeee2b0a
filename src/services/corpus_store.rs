// Corpus Storage Service
// Reference documents checked for external plagiarism matches

use crate::models::{CorpusDocument, CorpusEntry};
use crate::services::extraction::{extract_file, ExtractError};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("corpus I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("corpus file is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Read/write access to the reference corpus. The analyzer only ever calls `list`.
pub trait CorpusStore {
    fn add(&mut self, name: &str, text: &str) -> Result<Uuid, CorpusError>;
    /// Entries in insertion order, oldest first.
    fn list(&self) -> Result<Vec<CorpusEntry>, CorpusError>;
    fn clear(&mut self) -> Result<(), CorpusError>;
    fn count(&self) -> Result<usize, CorpusError>;
}

fn new_document(name: &str, text: &str) -> CorpusDocument {
    CorpusDocument {
        id: Uuid::new_v4(),
        name: name.to_string(),
        text: text.to_string(),
        added_at: Utc::now(),
    }
}

/// Extract a file and store its text under the file name.
pub fn add_file<S: CorpusStore + ?Sized>(store: &mut S, path: &Path) -> Result<Uuid, CorpusError> {
    let text = extract_file(path)?;
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    store.add(&name, &text)
}

// ============ In-memory store ============

#[derive(Debug, Clone, Default)]
pub struct MemoryCorpus {
    documents: Vec<CorpusDocument>,
}

impl MemoryCorpus {
    pub fn documents(&self) -> &[CorpusDocument] {
        &self.documents
    }
}

impl CorpusStore for MemoryCorpus {
    fn add(&mut self, name: &str, text: &str) -> Result<Uuid, CorpusError> {
        let doc = new_document(name, text);
        let id = doc.id;
        self.documents.push(doc);
        Ok(id)
    }

    fn list(&self) -> Result<Vec<CorpusEntry>, CorpusError> {
        Ok(self.documents.iter().map(CorpusEntry::from).collect())
    }

    fn clear(&mut self) -> Result<(), CorpusError> {
        self.documents.clear();
        Ok(())
    }

    fn count(&self) -> Result<usize, CorpusError> {
        Ok(self.documents.len())
    }
}

// ============ JSON file store ============

/// Corpus persisted as a single JSON array. A missing file is an empty corpus.
pub struct JsonCorpusStore {
    path: PathBuf,
}

impl JsonCorpusStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default corpus location under the local data directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|p| p.join("acadcheck").join("corpus.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored documents with ids and timestamps, oldest first.
    pub fn documents(&self) -> Result<Vec<CorpusDocument>, CorpusError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let mut docs: Vec<CorpusDocument> = serde_json::from_str(&content)?;
        docs.sort_by_key(|d| d.added_at);
        Ok(docs)
    }

    fn write(&self, docs: &[CorpusDocument]) -> Result<(), CorpusError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(docs)?;
        // Write-then-rename so readers never see a half-written corpus.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl CorpusStore for JsonCorpusStore {
    fn add(&mut self, name: &str, text: &str) -> Result<Uuid, CorpusError> {
        let mut docs = self.documents()?;
        let doc = new_document(name, text);
        let id = doc.id;
        docs.push(doc);
        self.write(&docs)?;
        info!(id = %id, name = name, chars = text.chars().count(), "corpus.added");
        Ok(id)
    }

    fn list(&self) -> Result<Vec<CorpusEntry>, CorpusError> {
        Ok(self.documents()?.iter().map(CorpusEntry::from).collect())
    }

    fn clear(&mut self) -> Result<(), CorpusError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        info!(path = %self.path.display(), "corpus.cleared");
        Ok(())
    }

    fn count(&self) -> Result<usize, CorpusError> {
        Ok(self.documents()?.len())
    }
}
