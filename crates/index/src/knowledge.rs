use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::IndexBuildError;

/// One curated question with its canonical answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub question: String,
    pub answer: String,
}

impl Entry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Ordered, immutable set of knowledge-base entries.
///
/// Order is significant: entry `i` pairs with vector `i` of the index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBase {
    entries: Vec<Entry>,
}

impl KnowledgeBase {
    /// Validate and wrap `entries`. Rejects an empty set and blank fields.
    pub fn from_entries(entries: Vec<Entry>) -> Result<Self, IndexBuildError> {
        if entries.is_empty() {
            return Err(IndexBuildError::Empty);
        }
        for (index, entry) in entries.iter().enumerate() {
            if entry.question.trim().is_empty() {
                return Err(IndexBuildError::InvalidEntry {
                    index,
                    reason: "question is blank".into(),
                });
            }
            if entry.answer.trim().is_empty() {
                return Err(IndexBuildError::InvalidEntry {
                    index,
                    reason: "answer is blank".into(),
                });
            }
        }
        Ok(Self { entries })
    }

    /// Parse a JSON array of `{"question": ..., "answer": ...}` objects.
    pub fn from_json_str(json: &str) -> Result<Self, IndexBuildError> {
        let entries: Vec<Entry> =
            serde_json::from_str(json).map_err(|e| IndexBuildError::Malformed(e.to_string()))?;
        Self::from_entries(entries)
    }

    /// Read and parse a knowledge-base JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IndexBuildError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| IndexBuildError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let kb = Self::from_json_str(&raw)?;
        tracing::info!(path = %path.display(), entries = kb.len(), "knowledge base loaded");
        Ok(kb)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn questions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.question.as_str())
    }
}
