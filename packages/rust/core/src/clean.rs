//! Forced recursive removal of the generator's working directories.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use docbuild_shared::{DocBuildError, DocLayout, Result};

/// Remove `path` and everything under it, like `rm -rf`.
///
/// Returns `Ok(false)` when nothing was there. Symlinks are removed, never
/// followed.
pub async fn remove_dir_forced(path: &Path) -> Result<bool> {
    let metadata = match tokio::fs::symlink_metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "nothing to remove");
            return Ok(false);
        }
        Err(e) => return Err(DocBuildError::io(path, e)),
    };

    let removal = if metadata.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };

    match removal {
        Ok(()) => {
            info!(path = %path.display(), "removed");
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(DocBuildError::io(path, e)),
    }
}

/// Remove the generated and output directories, in that order.
///
/// Returns the paths that actually existed.
pub async fn clean_layout(layout: &DocLayout) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for target in layout.pre_build_targets() {
        if remove_dir_forced(target).await? {
            removed.push(target.to_path_buf());
        }
    }
    Ok(removed)
}
