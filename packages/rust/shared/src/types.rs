//! Core domain types: the resolved documentation layout and build lifecycle.

use std::path::{Component, Path, PathBuf};

use crate::config::LayoutConfig;
use crate::error::{DocBuildError, Result};

// ---------------------------------------------------------------------------
// DocLayout
// ---------------------------------------------------------------------------

/// Absolute documentation paths under a resolved repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocLayout {
    /// Repository root.
    pub root: PathBuf,
    /// Documentation configuration directory (sources + `conf.py`).
    pub config_dir: PathBuf,
    /// Scratch directory the generator writes under `config_dir`.
    pub generated_dir: PathBuf,
    /// Where the generator writes its artifacts.
    pub output_dir: PathBuf,
}

impl DocLayout {
    /// Join a [`LayoutConfig`] onto `root`.
    ///
    /// Every configured path must be relative and must not climb out of the
    /// root, and neither deleted directory may be `config_dir` or one of its
    /// ancestors, since both are removed recursively.
    pub fn resolve(root: impl Into<PathBuf>, layout: &LayoutConfig) -> Result<Self> {
        let root = root.into();
        let config_rel = checked_relative("layout.config_dir", &layout.config_dir)?;
        let generated_rel = checked_relative("layout.generated_dir", &layout.generated_dir)?;
        let output_rel = checked_relative("layout.output_dir", &layout.output_dir)?;

        let config_dir = root.join(config_rel);
        let generated_dir = config_dir.join(generated_rel);
        let output_dir = root.join(output_rel);

        spares_sources("layout.generated_dir", &generated_dir, &config_dir)?;
        spares_sources("layout.output_dir", &output_dir, &config_dir)?;

        Ok(Self {
            root,
            config_dir,
            generated_dir,
            output_dir,
        })
    }

    /// Directories removed before the build, in removal order.
    pub fn pre_build_targets(&self) -> [&Path; 2] {
        [self.generated_dir.as_path(), self.output_dir.as_path()]
    }
}

/// Reject absolute paths, `..` segments, and paths that name the root itself.
fn checked_relative<'a>(field: &str, value: &'a str) -> Result<&'a Path> {
    let path = Path::new(value);
    let mut normal_segments = 0usize;

    for component in path.components() {
        match component {
            Component::Normal(_) => normal_segments += 1,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(DocBuildError::validation(format!(
                    "{field} = {value:?} must be a relative path inside the repository"
                )));
            }
        }
    }

    if normal_segments == 0 {
        return Err(DocBuildError::validation(format!(
            "{field} = {value:?} must name a directory below the repository root"
        )));
    }

    Ok(path)
}

/// Reject a deletion target that is `config_dir` or contains it.
fn spares_sources(field: &str, target: &Path, config_dir: &Path) -> Result<()> {
    if config_dir.starts_with(target) {
        return Err(DocBuildError::validation(format!(
            "{field} = {} would delete the documentation sources in {}",
            target.display(),
            config_dir.display()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// BuildStage
// ---------------------------------------------------------------------------

/// Lifecycle of one orchestrated build.
///
/// `Start → RootResolved → PreCleaned → Built → PostCleaned → Done`; any
/// failing step moves straight to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildStage {
    Start,
    RootResolved,
    PreCleaned,
    Built,
    PostCleaned,
    Done,
    Failed,
}

impl BuildStage {
    /// Stable lowercase name, used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::RootResolved => "root_resolved",
            Self::PreCleaned => "pre_cleaned",
            Self::Built => "built",
            Self::PostCleaned => "post_cleaned",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// The stage a successful step moves to, `None` for terminal stages.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Start => Some(Self::RootResolved),
            Self::RootResolved => Some(Self::PreCleaned),
            Self::PreCleaned => Some(Self::Built),
            Self::Built => Some(Self::PostCleaned),
            Self::PostCleaned => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }

    /// Whether the lifecycle has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl std::fmt::Display for BuildStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_resolves_under_root() {
        let layout = DocLayout::resolve("/repo", &LayoutConfig::default()).expect("resolve");
        assert_eq!(layout.root, PathBuf::from("/repo"));
        assert_eq!(layout.config_dir, PathBuf::from("/repo/docs"));
        assert_eq!(layout.generated_dir, PathBuf::from("/repo/docs/generated"));
        assert_eq!(layout.output_dir, PathBuf::from("/repo/docs/_build"));
        assert_eq!(
            layout.pre_build_targets(),
            [
                Path::new("/repo/docs/generated"),
                Path::new("/repo/docs/_build")
            ]
        );
    }

    #[test]
    fn layout_rejects_escaping_paths() {
        let mut config = LayoutConfig::default();
        config.output_dir = "../elsewhere".into();
        let err = DocLayout::resolve("/repo", &config).unwrap_err();
        assert!(err.to_string().contains("layout.output_dir"));

        let mut config = LayoutConfig::default();
        config.generated_dir = "/tmp/generated".into();
        assert!(DocLayout::resolve("/repo", &config).is_err());
    }

    #[test]
    fn layout_rejects_root_itself() {
        let mut config = LayoutConfig::default();
        config.output_dir = ".".into();
        let err = DocLayout::resolve("/repo", &config).unwrap_err();
        assert!(err.to_string().contains("below the repository root"));

        config.output_dir = String::new();
        assert!(DocLayout::resolve("/repo", &config).is_err());
    }

    #[test]
    fn layout_rejects_targets_covering_sources() {
        for output_dir in ["docs", "docs/.", "./docs", "docs//"] {
            let mut config = LayoutConfig::default();
            config.output_dir = output_dir.into();
            let err = DocLayout::resolve("/repo", &config).unwrap_err();
            assert!(
                matches!(err, DocBuildError::Validation { .. }),
                "{output_dir}: {err:?}"
            );
            assert!(err.to_string().contains("layout.output_dir"));
        }

        let mut config = LayoutConfig::default();
        config.config_dir = "docs/source".into();
        config.output_dir = "docs".into();
        let err = DocLayout::resolve("/repo", &config).unwrap_err();
        assert!(err.to_string().contains("documentation sources"));

        // Siblings and children of the sources are fine.
        config.output_dir = "docs/_build".into();
        assert!(DocLayout::resolve("/repo", &config).is_ok());
        config.output_dir = "docs/source/_build".into();
        assert!(DocLayout::resolve("/repo", &config).is_ok());
        config.output_dir = "docs/sourcecode".into();
        assert!(DocLayout::resolve("/repo", &config).is_ok());
    }

    #[test]
    fn stage_walk_ends_at_done() {
        let mut stage = BuildStage::Start;
        let mut walked = vec![stage];
        while let Some(next) = stage.next() {
            walked.push(next);
            stage = next;
        }
        assert_eq!(
            walked,
            vec![
                BuildStage::Start,
                BuildStage::RootResolved,
                BuildStage::PreCleaned,
                BuildStage::Built,
                BuildStage::PostCleaned,
                BuildStage::Done,
            ]
        );
        assert!(stage.is_terminal());
        assert!(BuildStage::Failed.is_terminal());
        assert_eq!(BuildStage::Failed.next(), None);
        assert_eq!(BuildStage::PreCleaned.to_string(), "pre_cleaned");
    }
}
