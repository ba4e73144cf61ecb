//! Game process launching for Quackbox
//!
//! The catalog only needs one thing from the operating system: start the
//! executable behind an entry and hand control back immediately. That
//! contract is the [`Launcher`] trait; [`ProcessLauncher`] is the real
//! implementation.

mod process;

pub use process::{LaunchHandle, ProcessLauncher};

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Launch failed for {path}: {reason}")]
    LaunchFailed { path: PathBuf, reason: String },
}

/// Starts game executables without waiting for them to exit
pub trait Launcher: Send + Sync {
    fn launch(&self, path: &Path) -> Result<LaunchHandle, LaunchError>;
}
