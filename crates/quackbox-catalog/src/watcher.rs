//! Games directory watcher for automatic refreshes

use crate::CatalogError;
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError, channel};
use std::time::{Duration, Instant};

/// Reports files appearing, disappearing or being renamed in one directory
pub struct DirectoryWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    path: PathBuf,
    ignored: Vec<(PathBuf, OsString)>,
}

impl DirectoryWatcher {
    /// Start watching `path` (not recursive)
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        if !path.is_dir() {
            return Err(CatalogError::DirectoryUnavailable {
                path: path.to_path_buf(),
                reason: "not a readable directory".into(),
            });
        }

        let (tx, rx) = channel();
        let mut watcher = notify::recommended_watcher(tx)?;
        watcher.watch(path, RecursiveMode::NonRecursive)?;
        tracing::info!("Watching {}", path.display());

        Ok(Self {
            _watcher: watcher,
            rx,
            path: path.to_path_buf(),
            ignored: Vec::new(),
        })
    }

    /// Ignore events for `file` and its `.<name>.*` temporaries
    ///
    /// Needed when the catalog file lives inside the watched directory, so
    /// that saving it does not trigger another refresh.
    pub fn ignore_file(mut self, file: &Path) -> Self {
        if let (Some(parent), Some(name)) = (file.parent(), file.file_name()) {
            let parent = std::path::absolute(parent).unwrap_or_else(|_| parent.to_path_buf());
            self.ignored.push((parent, name.to_os_string()));
        }
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block until a relevant change arrives, then wait for `quiet` without
    /// further changes
    ///
    /// Returns the number of relevant events folded into this batch,
    /// `Some(0)` if `timeout` passed without any, or `None` once the watcher
    /// has shut down.
    pub fn wait_for_change(&self, timeout: Option<Duration>, quiet: Duration) -> Option<usize> {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            let event = match deadline {
                None => self.rx.recv().ok()?,
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match self.rx.recv_timeout(remaining) {
                        Ok(event) => event,
                        Err(RecvTimeoutError::Timeout) => return Some(0),
                        Err(RecvTimeoutError::Disconnected) => return None,
                    }
                }
            };
            if self.is_relevant(&event) {
                return Some(1 + self.drain_until_quiet(quiet));
            }
        }
    }

    fn drain_until_quiet(&self, quiet: Duration) -> usize {
        let mut count = 0;
        while let Ok(event) = self.rx.recv_timeout(quiet) {
            if self.is_relevant(&event) {
                count += 1;
            }
        }
        count
    }

    fn is_relevant(&self, event: &notify::Result<Event>) -> bool {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Watch error on {}: {}", self.path.display(), e);
                return false;
            }
        };

        let kind_matters = matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_))
        );

        kind_matters && event.paths.iter().any(|p| !self.is_ignored(p))
    }

    fn is_ignored(&self, path: &Path) -> bool {
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return false;
        };
        let name = name.to_string_lossy();

        self.ignored.iter().any(|(dir, file)| {
            let file = file.to_string_lossy();
            dir == parent && (name == file || name.starts_with(&format!(".{}.", file)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange};
    use std::fs;
    use tempfile::TempDir;

    fn event(kind: EventKind, path: PathBuf) -> notify::Result<Event> {
        Ok(Event::new(kind).add_path(path))
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = DirectoryWatcher::new(&dir.path().join("missing")).err().unwrap();
        assert!(matches!(err, CatalogError::DirectoryUnavailable { .. }));
    }

    #[test]
    fn test_relevant_event_kinds() {
        let dir = TempDir::new().unwrap();
        let watcher = DirectoryWatcher::new(dir.path()).unwrap();
        let game = dir.path().join("foo.bin");

        assert!(watcher.is_relevant(&event(EventKind::Create(CreateKind::File), game.clone())));
        assert!(!watcher.is_relevant(&event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            game.clone()
        )));
        assert!(!watcher.is_relevant(&Err(notify::Error::generic("boom"))));
    }

    #[test]
    fn test_ignored_catalog_file() {
        let dir = TempDir::new().unwrap();
        let catalog = dir.path().join("games.json");
        let watcher = DirectoryWatcher::new(dir.path()).unwrap().ignore_file(&catalog);

        assert!(watcher.is_ignored(&catalog));
        assert!(watcher.is_ignored(&dir.path().join(".games.json.a1b2c3.tmp")));
        assert!(!watcher.is_ignored(&dir.path().join("foo.bin")));
        assert!(!watcher.is_relevant(&event(EventKind::Create(CreateKind::File), catalog)));
    }

    #[test]
    fn test_detects_new_file() {
        let dir = TempDir::new().unwrap();
        let watcher = DirectoryWatcher::new(dir.path()).unwrap();

        fs::write(dir.path().join("foo.bin"), b"GAME").unwrap();

        let batch =
            watcher.wait_for_change(Some(Duration::from_secs(10)), Duration::from_millis(50));
        assert!(matches!(batch, Some(n) if n >= 1));
    }

    #[test]
    fn test_timeout_without_changes() {
        let dir = TempDir::new().unwrap();
        let watcher = DirectoryWatcher::new(dir.path()).unwrap();

        let batch =
            watcher.wait_for_change(Some(Duration::from_millis(50)), Duration::from_millis(10));
        assert_eq!(batch, Some(0));
    }
}
