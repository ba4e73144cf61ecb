//! Game catalog service for Quackbox
//!
//! Tracks the executables found in the games directory and persists them,
//! together with user-entered metadata and play statistics, as a single JSON
//! catalog file. A refresh pass scans the directory, keeps every known entry
//! (matched by file path) untouched apart from its cover art, appends newly
//! discovered games and writes the result back atomically.

mod cover;
mod entry;
mod reconcile;
mod scanner;
mod service;
mod store;
mod watcher;

pub use cover::CoverArtResolver;
pub use entry::{Catalog, CatalogEntry, DuplicateKey};
pub use reconcile::{IdGenerator, ReconcileOutcome, ReconcileReport, Reconciler, UuidGenerator};
pub use scanner::{DirectoryScanner, ScanConfig, ScannedFile};
pub use service::{CatalogService, LaunchReport};
pub use store::CatalogStore;
pub use watcher::DirectoryWatcher;

use quackbox_launch::LaunchError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Games directory unavailable: {path}: {reason}")]
    DirectoryUnavailable { path: PathBuf, reason: String },

    #[error("Corrupt catalog {path}: {reason}")]
    CorruptCatalog { path: PathBuf, reason: String },

    #[error("Failed to write catalog {path}: {reason}")]
    WriteFailure { path: PathBuf, reason: String },

    #[error("Game not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CatalogError::DirectoryUnavailable {
            path: PathBuf::from("/opt/quackbox/games"),
            reason: "No such file or directory".into(),
        };
        assert!(err.to_string().contains("/opt/quackbox/games"));

        let err = CatalogError::NotFound("abc".into());
        assert_eq!(err.to_string(), "Game not found: abc");
    }

    #[test]
    fn test_launch_error_is_transparent() {
        let err: CatalogError = LaunchError::LaunchFailed {
            path: PathBuf::from("/games/foo.bin"),
            reason: "executable not found".into(),
        }
        .into();
        assert!(err.to_string().starts_with("Launch failed"));
    }
}
