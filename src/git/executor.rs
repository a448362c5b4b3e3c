//! Shelling out to the system `git` binary.
//!
//! Commands inherit the runner's git config and credential helpers, which is
//! how `actions/checkout` leaves push credentials behind.

use std::path::PathBuf;
use std::process::Command;

use crate::error::AmendError;

/// Runs git subcommands and returns their trimmed stdout.
#[cfg_attr(test, mockall::automock)]
pub trait GitExecutor: Send + Sync {
    fn run(&self, operation: &str, args: &[String]) -> Result<String, AmendError>;
}

/// The `git` binary on `PATH`, run in `workdir` or the current directory.
#[derive(Debug, Clone, Default)]
pub struct SystemGit {
    workdir: Option<PathBuf>,
}

impl SystemGit {
    pub fn new(workdir: Option<PathBuf>) -> Self {
        Self { workdir }
    }
}

impl GitExecutor for SystemGit {
    fn run(&self, operation: &str, args: &[String]) -> Result<String, AmendError> {
        let mut command = Command::new("git");
        command.args(args);
        if let Some(dir) = &self.workdir {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|source| AmendError::SpawnFailed {
            operation: operation.to_string(),
            source,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AmendError::GitFailed {
                operation: operation.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_git_version_succeeds() {
        let out = SystemGit::default()
            .run("version check", &args(&["--version"]))
            .unwrap();
        assert!(out.starts_with("git version"));
    }

    #[test]
    fn test_invalid_subcommand_fails() {
        let err = SystemGit::default()
            .run("invalid", &args(&["not-a-real-command"]))
            .unwrap_err();
        assert!(matches!(err, AmendError::GitFailed { .. }));
        assert!(err.to_string().starts_with("git invalid failed"));
    }

    #[test]
    fn test_missing_workdir_fails_to_spawn() {
        let git = SystemGit::new(Some(PathBuf::from("/nonexistent/papertrail/dir")));
        let err = git.run("status", &args(&["status"])).unwrap_err();
        assert!(matches!(err, AmendError::SpawnFailed { .. }));
    }
}
