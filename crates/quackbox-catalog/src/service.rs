//! Boundary operations: refresh, lookup and launch

use crate::{
    Catalog, CatalogEntry, CatalogError, CatalogStore, CoverArtResolver, DirectoryScanner,
    ReconcileReport, Reconciler, ScanConfig,
};
use chrono::Utc;
use quackbox_config::QuackboxConfig;
use quackbox_launch::{LaunchHandle, Launcher, ProcessLauncher};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

/// Outcome of a successful launch
#[derive(Debug)]
pub struct LaunchReport {
    /// Entry with its play statistics already updated
    pub entry: CatalogEntry,

    /// The running game
    pub handle: LaunchHandle,
}

/// Owns the catalog file and serializes every read-modify-write of it
///
/// `refresh` and the play-statistics update after `launch` hold the same
/// lock for the whole load, modify, save sequence. Plain reads go straight
/// to the store; atomic saves mean they always see a complete catalog.
pub struct CatalogService<L: Launcher = ProcessLauncher> {
    games_dir: PathBuf,
    scanner: DirectoryScanner,
    store: CatalogStore,
    reconciler: Reconciler,
    launcher: L,
    lock: Mutex<()>,
}

impl CatalogService<ProcessLauncher> {
    /// Wire up the service from configuration
    pub fn from_config(config: &QuackboxConfig) -> Self {
        Self::new(
            &config.paths.games_dir,
            DirectoryScanner::with_config(ScanConfig::from(&config.scan)),
            CatalogStore::new(&config.paths.catalog_file),
            Reconciler::new(CoverArtResolver::new(&config.paths.cover_dir)),
            ProcessLauncher::new(),
        )
    }
}

impl<L: Launcher> CatalogService<L> {
    pub fn new(
        games_dir: impl Into<PathBuf>,
        scanner: DirectoryScanner,
        store: CatalogStore,
        reconciler: Reconciler,
        launcher: L,
    ) -> Self {
        Self {
            games_dir: games_dir.into(),
            scanner,
            store,
            reconciler,
            launcher,
            lock: Mutex::new(()),
        }
    }

    pub fn games_dir(&self) -> &Path {
        &self.games_dir
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// Run one reconciliation pass and persist the result
    pub fn refresh(&self) -> Result<Catalog, CatalogError> {
        self.refresh_with_report().map(|(catalog, _)| catalog)
    }

    /// Same as [`refresh`](Self::refresh), also returning the pass counts
    pub fn refresh_with_report(&self) -> Result<(Catalog, ReconcileReport), CatalogError> {
        let _guard = self.lock_catalog();

        let previous = self.store.load()?;
        let scanned = self.scanner.scan(&self.games_dir)?;
        let outcome = self.reconciler.reconcile(previous, &scanned);
        let report = outcome.report;

        // Always rewrite so older records gain every field on disk.
        self.store.save(&outcome.catalog)?;

        info!(
            "Refreshed catalog: {} listed, {} added, {} retained, {} missing, {} with covers",
            report.scanned, report.added, report.retained, report.missing, report.covers
        );

        Ok((outcome.catalog, report))
    }

    /// The persisted catalog, without rescanning
    pub fn entries(&self) -> Result<Catalog, CatalogError> {
        self.store.load()
    }

    /// Look up one entry, without rescanning
    pub fn entry(&self, id: &str) -> Result<CatalogEntry, CatalogError> {
        self.store
            .load()?
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// Start a game and count the play
    ///
    /// Statistics are only touched once the process has been spawned. A game
    /// that started is reported as launched even if its statistics could not
    /// be saved; the returned entry then carries the previous counts.
    pub fn launch(&self, id: &str) -> Result<LaunchReport, CatalogError> {
        let entry = self.entry(id)?;
        let handle = self.launcher.launch(&entry.file_path)?;

        let entry = match self.record_play(id) {
            Ok(updated) => updated,
            Err(e) => {
                warn!("Launched {} but failed to record the play: {}", entry.title, e);
                entry
            }
        };

        info!(
            "Launched {} (pid {}), played {} time(s)",
            entry.title, handle.pid, entry.times_played
        );

        Ok(LaunchReport { entry, handle })
    }

    fn record_play(&self, id: &str) -> Result<CatalogEntry, CatalogError> {
        let played_at = Utc::now();
        let _guard = self.lock_catalog();
        let mut catalog = self.store.load()?;
        let updated = catalog
            .record_play(id, played_at)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        self.store.save(&catalog)?;
        Ok(updated)
    }

    /// The lock guards the file, not in-memory data, so a panic in another
    /// holder leaves nothing to repair.
    fn lock_catalog(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quackbox_launch::LaunchError;
    use std::fs;
    use std::process::Command;
    use tempfile::TempDir;

    /// Starts a harmless stand-in process instead of the game
    #[derive(Default)]
    struct StubLauncher {
        fail: bool,
        /// Overwrite this file with garbage while launching
        clobber: Option<PathBuf>,
    }

    impl Launcher for StubLauncher {
        fn launch(&self, path: &Path) -> Result<LaunchHandle, LaunchError> {
            if let Some(file) = &self.clobber {
                fs::write(file, b"not json").unwrap();
            }
            if self.fail {
                return Err(LaunchError::LaunchFailed {
                    path: path.to_path_buf(),
                    reason: "stubbed failure".into(),
                });
            }
            let child = Command::new(std::env::current_exe().unwrap())
                .arg("--help")
                .stdout(std::process::Stdio::null())
                .spawn()
                .unwrap();
            Ok(LaunchHandle {
                pid: child.id(),
                child,
                path: path.to_path_buf(),
            })
        }
    }

    fn service(root: &Path, fail: bool) -> CatalogService<StubLauncher> {
        with_launcher(root, StubLauncher { fail, clobber: None })
    }

    fn with_launcher(root: &Path, launcher: StubLauncher) -> CatalogService<StubLauncher> {
        let games = root.join("games");
        fs::create_dir_all(&games).unwrap();
        fs::write(games.join("foo.bin"), b"GAME").unwrap();

        CatalogService::new(
            &games,
            DirectoryScanner::new(),
            CatalogStore::new(root.join("games.json")),
            Reconciler::new(CoverArtResolver::new(root.join("covers"))),
            launcher,
        )
    }

    #[test]
    fn test_refresh_then_entry() {
        let dir = TempDir::new().unwrap();
        let svc = service(dir.path(), false);

        let catalog = svc.refresh().unwrap();
        let id = &catalog.entries()[0].id;

        assert_eq!(svc.entry(id).unwrap().title, "foo.bin");
        assert_eq!(svc.entries().unwrap(), catalog);
    }

    #[test]
    fn test_entry_not_found() {
        let dir = TempDir::new().unwrap();
        let svc = service(dir.path(), false);
        svc.refresh().unwrap();

        assert!(matches!(svc.entry("nope"), Err(CatalogError::NotFound(_))));
        assert!(matches!(svc.launch("nope"), Err(CatalogError::NotFound(_))));
    }

    #[test]
    fn test_launch_records_play() {
        let dir = TempDir::new().unwrap();
        let svc = service(dir.path(), false);
        let id = svc.refresh().unwrap().entries()[0].id.clone();

        let mut report = svc.launch(&id).unwrap();
        report.handle.child.wait().unwrap();

        assert_eq!(report.entry.times_played, 1);
        assert!(report.entry.last_played.is_some());
        assert_eq!(svc.entry(&id).unwrap().times_played, 1);
    }

    #[test]
    fn test_failed_launch_leaves_stats() {
        let dir = TempDir::new().unwrap();
        let svc = service(dir.path(), true);
        let id = svc.refresh().unwrap().entries()[0].id.clone();

        let err = svc.launch(&id).unwrap_err();

        assert!(matches!(err, CatalogError::Launch(_)));
        let entry = svc.entry(&id).unwrap();
        assert_eq!(entry.times_played, 0);
        assert_eq!(entry.last_played, None);
    }

    #[test]
    fn test_launch_survives_stats_failure() {
        let dir = TempDir::new().unwrap();
        let catalog_file = dir.path().join("games.json");
        let svc = with_launcher(
            dir.path(),
            StubLauncher {
                clobber: Some(catalog_file.clone()),
                ..StubLauncher::default()
            },
        );
        let id = svc.refresh().unwrap().entries()[0].id.clone();

        let mut report = svc.launch(&id).unwrap();
        report.handle.child.wait().unwrap();

        assert_eq!(report.entry.id, id);
        assert_eq!(report.entry.times_played, 0);
        assert_eq!(fs::read(&catalog_file).unwrap(), b"not json");
    }

    #[test]
    fn test_refresh_missing_games_dir() {
        let dir = TempDir::new().unwrap();
        let svc = service(dir.path(), false);
        fs::remove_dir_all(svc.games_dir()).unwrap();

        let err = svc.refresh().unwrap_err();
        assert!(matches!(err, CatalogError::DirectoryUnavailable { .. }));
    }

    #[test]
    fn test_refresh_refuses_corrupt_catalog() {
        let dir = TempDir::new().unwrap();
        let svc = service(dir.path(), false);
        fs::write(svc.store().path(), b"not json").unwrap();

        let err = svc.refresh().unwrap_err();

        assert!(matches!(err, CatalogError::CorruptCatalog { .. }));
        assert_eq!(fs::read(svc.store().path()).unwrap(), b"not json");
    }
}
