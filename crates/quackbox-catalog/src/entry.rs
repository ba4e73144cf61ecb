//! Catalog data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

/// A game tracked by the catalog
///
/// `file_path` is the natural key linking an entry to a file on disk;
/// `id` is assigned once and never regenerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    pub file_path: PathBuf,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub is_multiplayer: bool,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub cover_image: Option<PathBuf>,
    #[serde(default)]
    pub times_played: u64,
    #[serde(default)]
    pub last_played: Option<DateTime<Utc>>,
}

impl CatalogEntry {
    /// A freshly discovered game with every descriptive field empty
    pub fn discovered(id: impl Into<String>, file_name: &str, file_path: PathBuf) -> Self {
        Self {
            id: id.into(),
            title: file_name.to_string(),
            file_path,
            author: String::new(),
            summary: String::new(),
            release_date: String::new(),
            is_multiplayer: false,
            genres: Vec::new(),
            cover_image: None,
            times_played: 0,
            last_played: None,
        }
    }

    /// Count one launch
    pub fn record_play(&mut self, at: DateTime<Utc>) {
        self.times_played = self.times_played.saturating_add(1);
        self.last_played = Some(at);
    }
}

/// A key that appears on more than one entry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DuplicateKey {
    #[error("duplicate file_path {0}")]
    FilePath(PathBuf),

    #[error("duplicate id {0}")]
    Id(String),
}

/// Ordered collection of entries, persisted as one JSON array
///
/// Both `id` and `file_path` are unique within a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog, rejecting duplicate ids or file paths
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self, DuplicateKey> {
        let mut paths = HashSet::with_capacity(entries.len());
        let mut ids = HashSet::with_capacity(entries.len());

        for entry in &entries {
            if !paths.insert(entry.file_path.as_path()) {
                return Err(DuplicateKey::FilePath(entry.file_path.clone()));
            }
            if !ids.insert(entry.id.as_str()) {
                return Err(DuplicateKey::Id(entry.id.clone()));
            }
        }

        Ok(Self { entries })
    }

    /// Caller guarantees both keys are unique
    pub(crate) fn from_unique(entries: Vec<CatalogEntry>) -> Self {
        debug_assert!(Self::from_entries(entries.clone()).is_ok());
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<CatalogEntry> {
        self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by id
    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Bump play statistics for `id`, returning the updated entry
    pub fn record_play(&mut self, id: &str, at: DateTime<Utc>) -> Option<&CatalogEntry> {
        let entry = self.entries.iter_mut().find(|e| e.id == id)?;
        entry.record_play(at);
        Some(entry)
    }
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<CatalogEntry>::deserialize(deserializer)?;
        Catalog::from_entries(entries).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogEntry;
    type IntoIter = std::slice::Iter<'a, CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
