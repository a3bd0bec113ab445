//! Repository root resolution.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use docbuild_shared::{DocBuildError, Result};

/// Finds the top-level directory of the repository containing `cwd`.
#[async_trait]
pub trait RepoLocator: Send + Sync {
    async fn repo_root(&self, cwd: &Path) -> Result<PathBuf>;
}

/// Asks git for the work tree's top level (`git rev-parse --show-toplevel`).
#[derive(Debug, Clone)]
pub struct GitLocator {
    program: String,
}

impl GitLocator {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GitLocator {
    fn default() -> Self {
        Self::new("git")
    }
}

#[async_trait]
impl RepoLocator for GitLocator {
    async fn repo_root(&self, cwd: &Path) -> Result<PathBuf> {
        debug!(program = %self.program, cwd = %cwd.display(), "querying repository root");

        let output = Command::new(&self.program)
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                DocBuildError::environment(format!(
                    "failed to run `{}`: {e} (is it installed and on PATH?)",
                    self.program
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DocBuildError::environment(format!(
                "not inside a git repository ({}): {}",
                cwd.display(),
                stderr.trim()
            )));
        }

        path_from_stdout(&output.stdout).ok_or_else(|| {
            DocBuildError::environment(format!(
                "`{} rev-parse --show-toplevel` printed no path",
                self.program
            ))
        })
    }
}

/// The first line of a VCS query's stdout as a path, bytes preserved.
fn path_from_stdout(stdout: &[u8]) -> Option<PathBuf> {
    let line = stdout.strip_suffix(b"\n").unwrap_or(stdout);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    if line.is_empty() {
        return None;
    }

    #[cfg(unix)]
    {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;
        Some(PathBuf::from(OsStr::from_bytes(line)))
    }
    #[cfg(not(unix))]
    {
        // git for Windows prints UTF-8
        Some(PathBuf::from(String::from_utf8_lossy(line).into_owned()))
    }
}

/// A root given explicitly instead of discovered.
#[derive(Debug, Clone)]
pub struct FixedRoot(pub PathBuf);

#[async_trait]
impl RepoLocator for FixedRoot {
    async fn repo_root(&self, cwd: &Path) -> Result<PathBuf> {
        let root = cwd.join(&self.0);
        let is_dir = tokio::fs::metadata(&root)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(DocBuildError::environment(format!(
                "repository root {} is not a directory",
                root.display()
            )));
        }
        Ok(root)
    }
}
