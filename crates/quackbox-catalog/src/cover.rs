//! Cover art lookup by naming convention

use std::path::{Component, Path, PathBuf};

pub const COVER_EXTENSION: &str = "jpg";

/// Finds `<cover_dir>/<title>.jpg`
///
/// Nothing is cached; every call reflects the filesystem as it is now.
#[derive(Debug, Clone)]
pub struct CoverArtResolver {
    cover_dir: PathBuf,
}

impl CoverArtResolver {
    pub fn new(cover_dir: impl Into<PathBuf>) -> Self {
        Self {
            cover_dir: cover_dir.into(),
        }
    }

    /// Path of the cover for `title`, if one exists
    pub fn resolve(&self, title: &str) -> Option<PathBuf> {
        if title.is_empty() {
            return None;
        }

        // Titles are user-editable; the cover must stay directly in the cover dir.
        let file_name = format!("{}.{}", title, COVER_EXTENSION);
        let mut components = Path::new(&file_name).components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) {
            return None;
        }

        let candidate = self.cover_dir.join(file_name);
        candidate.is_file().then_some(candidate)
    }
}
