//! Spawning game executables as detached child processes

use crate::{LaunchError, Launcher};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

/// Handle to a launched game
///
/// Dropping the handle does not stop the game.
#[derive(Debug)]
pub struct LaunchHandle {
    /// Child process handle
    pub child: Child,

    /// PID of the launched process
    pub pid: u32,

    /// Executable that was started
    pub path: PathBuf,
}

/// Launches games with [`std::process::Command`], from the directory
/// containing the executable
#[derive(Debug, Clone, Default)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub fn new() -> Self {
        Self
    }

    fn build_command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(path);

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            cmd.current_dir(parent);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());
        cmd
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&self, path: &Path) -> Result<LaunchHandle, LaunchError> {
        if !path.is_file() {
            return Err(LaunchError::LaunchFailed {
                path: path.to_path_buf(),
                reason: "executable not found".into(),
            });
        }

        tracing::info!("Launching {}", path.display());

        let child = self
            .build_command(path)
            .spawn()
            .map_err(|e| LaunchError::LaunchFailed {
                path: path.to_path_buf(),
                reason: format!("Failed to spawn process: {}", e),
            })?;

        let pid = child.id();
        tracing::debug!("Spawned {} as pid {}", path.display(), pid);

        Ok(LaunchHandle {
            child,
            pid,
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_runs_from_game_dir() {
        let launcher = ProcessLauncher::new();
        let cmd = launcher.build_command(Path::new("/opt/quackbox/games/foo.bin"));
        assert_eq!(
            cmd.get_current_dir(),
            Some(Path::new("/opt/quackbox/games"))
        );
    }

    #[test]
    fn test_command_has_no_args() {
        let launcher = ProcessLauncher::new();
        let cmd = launcher.build_command(Path::new("/opt/quackbox/games/foo.bin"));
        assert_eq!(cmd.get_args().count(), 0);
        assert_eq!(cmd.get_program(), "/opt/quackbox/games/foo.bin");
    }

    #[test]
    fn test_launch_missing_executable() {
        let launcher = ProcessLauncher::new();
        let err = launcher
            .launch(Path::new("/definitely/not/here/game.bin"))
            .unwrap_err();
        assert!(matches!(err, LaunchError::LaunchFailed { .. }));
    }
}
