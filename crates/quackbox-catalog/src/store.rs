//! Catalog persistence
//!
//! The catalog file is the only record of assigned ids and user metadata, so
//! the store never guesses: a missing file is a first run, anything that does
//! not parse is reported as corrupt, and every save replaces the file
//! atomically through a temporary sibling.

use crate::{Catalog, CatalogError};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Loads and saves the catalog JSON file
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted catalog
    ///
    /// Only an absent file yields an empty catalog. Anything else that is not
    /// a valid catalog (empty or truncated file, bad JSON, wrong types,
    /// duplicate ids or paths) is `CorruptCatalog`.
    pub fn load(&self) -> Result<Catalog, CatalogError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No catalog at {}, starting empty", self.path.display());
                return Ok(Catalog::new());
            }
            Err(e) => return Err(CatalogError::Io(e)),
        };

        let catalog: Catalog =
            serde_json::from_slice(&bytes).map_err(|e| CatalogError::CorruptCatalog {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        debug!("Loaded {} entries from {}", catalog.len(), self.path.display());
        Ok(catalog)
    }

    /// Replace the persisted catalog
    ///
    /// On failure the previous file is left as it was.
    pub fn save(&self, catalog: &Catalog) -> Result<(), CatalogError> {
        let failure = |reason: String| CatalogError::WriteFailure {
            path: self.path.clone(),
            reason,
        };

        let mut json = serde_json::to_vec_pretty(catalog).map_err(|e| failure(e.to_string()))?;
        json.push(b'\n');

        let dir = self.parent_dir();
        fs::create_dir_all(&dir).map_err(|e| failure(e.to_string()))?;

        let mut tmp = tempfile::Builder::new()
            .prefix(&self.temp_prefix())
            .suffix(".tmp")
            .tempfile_in(&dir)
            .map_err(|e| failure(e.to_string()))?;

        tmp.write_all(&json).map_err(|e| failure(e.to_string()))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| failure(e.to_string()))?;
        tmp.persist(&self.path)
            .map_err(|e| failure(e.error.to_string()))?;

        sync_dir(&dir);

        info!("Saved {} entries to {}", catalog.len(), self.path.display());
        Ok(())
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Temporary files are named `.<catalog file name>.<random>.tmp`
    pub fn temp_prefix(&self) -> String {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        format!(".{}.", name)
    }
}

/// Make the rename itself durable
#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Err(e) = fs::File::open(dir).and_then(|d| d.sync_all()) {
        warn!("Failed to sync directory {}: {}", dir.display(), e);
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}
