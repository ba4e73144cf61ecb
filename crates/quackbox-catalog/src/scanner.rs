//! Games directory scanning

use crate::CatalogError;
use quackbox_config::ScanSettings;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// One entry found directly inside the games directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub file_name: String,
    pub file_path: PathBuf,
}

/// Scanner configuration
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Lowercased extensions to accept; empty accepts everything
    pub extensions: HashSet<String>,

    /// Skip hidden files/directories
    pub skip_hidden: bool,
}

impl From<&ScanSettings> for ScanConfig {
    fn from(settings: &ScanSettings) -> Self {
        Self {
            extensions: settings
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            skip_hidden: settings.skip_hidden,
        }
    }
}

/// Lists candidate games in a directory, without recursing
#[derive(Debug, Clone, Default)]
pub struct DirectoryScanner {
    config: ScanConfig,
}

impl DirectoryScanner {
    /// Create a scanner that accepts every entry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: ScanConfig) -> Self {
        Self { config }
    }

    /// List the directory, sorted by file name
    ///
    /// Paths are made absolute so they stay valid as catalog keys.
    pub fn scan(&self, dir: &Path) -> Result<Vec<ScannedFile>, CatalogError> {
        let unavailable = |reason: String| CatalogError::DirectoryUnavailable {
            path: dir.to_path_buf(),
            reason,
        };

        if !dir.is_dir() {
            return Err(unavailable("not a readable directory".into()));
        }

        let dir = std::path::absolute(dir).map_err(|e| unavailable(e.to_string()))?;
        let mut files = Vec::new();

        for entry in fs::read_dir(&dir).map_err(|e| unavailable(e.to_string()))? {
            let entry = entry.map_err(|e| unavailable(e.to_string()))?;
            let file_name = entry.file_name().to_string_lossy().to_string();

            if !self.accepts(&file_name) {
                tracing::debug!("Skipping {}", file_name);
                continue;
            }

            files.push(ScannedFile {
                file_path: entry.path(),
                file_name,
            });
        }

        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        tracing::debug!("Found {} entries in {}", files.len(), dir.display());
        Ok(files)
    }

    fn accepts(&self, file_name: &str) -> bool {
        if self.config.skip_hidden && file_name.starts_with('.') {
            return false;
        }

        if self.config.extensions.is_empty() {
            return true;
        }

        Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.config.extensions.contains(&ext.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn games_dir(names: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in names {
            fs::write(dir.path().join(name), b"GAME").unwrap();
        }
        dir
    }

    #[test]
    fn test_scan_lists_every_entry_sorted() {
        let dir = games_dir(&["foo.bin", "bar.bin", ".hidden"]);
        fs::create_dir(dir.path().join("subdir")).unwrap();
        fs::write(dir.path().join("subdir").join("nested.bin"), b"GAME").unwrap();

        let files = DirectoryScanner::new().scan(dir.path()).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec![".hidden", "bar.bin", "foo.bin", "subdir"]);
        assert_eq!(files[1].file_path, dir.path().join("bar.bin"));
    }

    #[test]
    fn test_scan_skips_hidden() {
        let dir = games_dir(&["foo.bin", ".DS_Store"]);
        let scanner = DirectoryScanner::with_config(ScanConfig {
            skip_hidden: true,
            ..Default::default()
        });

        let files = scanner.scan(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name, "foo.bin");
    }

    #[test]
    fn test_scan_filters_extensions() {
        let dir = games_dir(&["foo.EXE", "bar.sh", "notes.txt", "noext"]);
        let settings = ScanSettings {
            skip_hidden: false,
            extensions: vec![".exe".into(), "sh".into()],
        };
        let scanner = DirectoryScanner::with_config(ScanConfig::from(&settings));

        let files = scanner.scan(dir.path()).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["bar.sh", "foo.EXE"]);
    }

    #[test]
    fn test_scan_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = DirectoryScanner::new()
            .scan(&dir.path().join("missing"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::DirectoryUnavailable { .. }));
    }

    #[test]
    fn test_scan_file_instead_of_directory() {
        let dir = games_dir(&["foo.bin"]);
        let err = DirectoryScanner::new()
            .scan(&dir.path().join("foo.bin"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::DirectoryUnavailable { .. }));
    }
}
