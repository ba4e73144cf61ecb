//! Configuration sections

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Filesystem locations the catalog works against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory scanned for game executables
    #[serde(default = "default_games_dir")]
    pub games_dir: PathBuf,

    /// Directory holding `<title>.jpg` cover images
    #[serde(default = "default_cover_dir")]
    pub cover_dir: PathBuf,

    /// Persisted catalog (JSON)
    #[serde(default = "default_catalog_file")]
    pub catalog_file: PathBuf,
}

fn default_games_dir() -> PathBuf {
    PathBuf::from("/opt/quackbox/games")
}

fn default_cover_dir() -> PathBuf {
    PathBuf::from("/opt/quackbox/cover_images")
}

fn default_catalog_file() -> PathBuf {
    PathBuf::from("/opt/quackbox/data/games.json")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            games_dir: default_games_dir(),
            cover_dir: default_cover_dir(),
            catalog_file: default_catalog_file(),
        }
    }
}

/// Directory listing filters
///
/// The defaults accept every entry in the games directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Skip dot-files
    #[serde(default)]
    pub skip_hidden: bool,

    /// Only accept these extensions (case-insensitive, empty = everything)
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// Settings for `quackbox watch`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Quiet period after the last filesystem event before refreshing
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    500
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}
