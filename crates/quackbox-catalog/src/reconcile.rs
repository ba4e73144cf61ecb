//! Merging a directory listing into the stored catalog

use crate::{Catalog, CatalogEntry, CoverArtResolver, ScannedFile};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// Source of identifiers for newly discovered entries
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random UUID v4 identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Counts from one reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Distinct paths in the listing
    pub scanned: usize,
    /// New entries appended
    pub added: usize,
    /// Known entries seen again on disk
    pub retained: usize,
    /// Known entries whose file was not in the listing (kept as-is)
    pub missing: usize,
    /// Entries with a cover after the pass
    pub covers: usize,
    /// Whether the catalog differs from the input
    pub changed: bool,
}

/// Result of one reconciliation
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub catalog: Catalog,
    pub report: ReconcileReport,
}

/// Computes the next catalog from the stored one and a fresh listing
///
/// Known entries keep their position, id and every user or play field; only
/// `cover_image` is recomputed. New files are appended in listing order.
/// Nothing is ever removed.
pub struct Reconciler {
    covers: CoverArtResolver,
    ids: Box<dyn IdGenerator>,
}

impl Reconciler {
    /// Create a reconciler issuing UUID identifiers
    pub fn new(covers: CoverArtResolver) -> Self {
        Self::with_id_generator(covers, UuidGenerator)
    }

    pub fn with_id_generator(covers: CoverArtResolver, ids: impl IdGenerator + 'static) -> Self {
        Self {
            covers,
            ids: Box::new(ids),
        }
    }

    pub fn reconcile(&self, previous: Catalog, scanned: &[ScannedFile]) -> ReconcileOutcome {
        let mut entries = previous.into_entries();
        let mut report = ReconcileReport::default();

        let known: HashSet<&Path> = entries.iter().map(|e| e.file_path.as_path()).collect();
        let mut ids: HashSet<String> = entries.iter().map(|e| e.id.clone()).collect();
        let mut listed: HashSet<&Path> = HashSet::with_capacity(scanned.len());
        let mut discovered = Vec::new();

        for file in scanned {
            if !listed.insert(file.file_path.as_path()) {
                continue;
            }

            if known.contains(file.file_path.as_path()) {
                report.retained += 1;
                continue;
            }

            let id = self.fresh_id(&mut ids);
            debug!("New game {} ({})", file.file_path.display(), id);
            discovered.push(CatalogEntry::discovered(
                id,
                &file.file_name,
                file.file_path.clone(),
            ));
        }

        report.scanned = listed.len();
        report.added = discovered.len();

        for entry in entries.iter().filter(|e| !listed.contains(e.file_path.as_path())) {
            warn!(
                "Game file missing, keeping entry {} ({})",
                entry.id,
                entry.file_path.display()
            );
            report.missing += 1;
        }

        drop(known);

        let mut covers_changed = false;
        entries.extend(discovered);
        for entry in &mut entries {
            let cover = self.covers.resolve(&entry.title);
            if cover != entry.cover_image {
                covers_changed = true;
                entry.cover_image = cover;
            }
            if entry.cover_image.is_some() {
                report.covers += 1;
            }
        }

        report.changed = report.added > 0 || covers_changed;

        ReconcileOutcome {
            catalog: Catalog::from_unique(entries),
            report,
        }
    }

    fn fresh_id(&self, taken: &mut HashSet<String>) -> String {
        loop {
            let id = self.ids.next_id();
            if taken.insert(id.clone()) {
                return id;
            }
            warn!("Generated id {} already in use, drawing another", id);
        }
    }
}
