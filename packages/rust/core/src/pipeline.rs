//! End-to-end `build` pipeline: root → pre-clean → sphinx-build → post-clean.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use docbuild_shared::{BuildStage, DocLayout, LayoutConfig, Result};

use crate::builder::SphinxBuilder;
use crate::clean::{clean_layout, remove_dir_forced};
use crate::repo::RepoLocator;

/// Configuration for the `build_docs` pipeline.
#[derive(Debug, Clone)]
pub struct BuildDocsConfig {
    /// Directory the repository root is resolved from.
    pub cwd: PathBuf,
    /// Layout relative to the repository root.
    pub layout: LayoutConfig,
    /// Documentation builder to invoke.
    pub builder: SphinxBuilder,
}

/// Result of the `build_docs` pipeline.
#[derive(Debug)]
pub struct BuildDocsResult {
    /// Resolved absolute paths.
    pub layout: DocLayout,
    /// Directories removed before the build.
    pub removed: Vec<PathBuf>,
    /// Whether the post-build cleanup found a generated directory.
    pub generated_cleaned: bool,
    /// Every stage walked, `Start` through `Done`.
    pub stages: Vec<BuildStage>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Result of the `clean_docs` pipeline.
#[derive(Debug)]
pub struct CleanDocsResult {
    /// Resolved absolute paths.
    pub layout: DocLayout,
    /// Directories that existed and were removed.
    pub removed: Vec<PathBuf>,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called on every lifecycle transition, including `Failed`.
    fn stage(&self, stage: BuildStage);
    /// Called when entering a filesystem or lookup phase.
    fn phase(&self, name: &str);
    /// Called right before the external builder takes over the terminal.
    fn builder_started(&self, command: &str);
    /// Called when the pipeline completes successfully.
    fn done(&self, result: &BuildDocsResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage(&self, _stage: BuildStage) {}
    fn phase(&self, _name: &str) {}
    fn builder_started(&self, _command: &str) {}
    fn done(&self, _result: &BuildDocsResult) {}
}

/// Walks the [`BuildStage`] sequence and mirrors it to a reporter.
struct StageTracker<'a> {
    current: BuildStage,
    walked: Vec<BuildStage>,
    progress: &'a dyn ProgressReporter,
}

impl<'a> StageTracker<'a> {
    fn new(progress: &'a dyn ProgressReporter) -> Self {
        progress.stage(BuildStage::Start);
        Self {
            current: BuildStage::Start,
            walked: vec![BuildStage::Start],
            progress,
        }
    }

    fn advance(&mut self) {
        if let Some(next) = self.current.next() {
            self.enter(next);
        }
    }

    fn fail(&mut self) {
        if !self.current.is_terminal() {
            self.enter(BuildStage::Failed);
        }
    }

    fn enter(&mut self, stage: BuildStage) {
        self.current = stage;
        self.walked.push(stage);
        self.progress.stage(stage);
    }
}

/// Run the full `build` pipeline.
///
/// 1. Resolve the repository root
/// 2. Remove `<config>/generated`
/// 3. Remove `<output>`
/// 4. Run the documentation builder
/// 5. Remove `<config>/generated` again
///
/// Any failure stops the sequence; step 5 only runs after a successful build.
#[instrument(skip_all, fields(cwd = %config.cwd.display()))]
pub async fn build_docs(
    config: &BuildDocsConfig,
    locator: &dyn RepoLocator,
    progress: &dyn ProgressReporter,
) -> Result<BuildDocsResult> {
    let start = Instant::now();
    let mut tracker = StageTracker::new(progress);

    match run_build(config, locator, progress, &mut tracker).await {
        Ok((layout, removed, generated_cleaned)) => {
            tracker.advance();
            let result = BuildDocsResult {
                layout,
                removed,
                generated_cleaned,
                stages: tracker.walked,
                elapsed: start.elapsed(),
            };
            info!(
                output = %result.layout.output_dir.display(),
                elapsed_ms = u64::try_from(result.elapsed.as_millis()).unwrap_or(u64::MAX),
                "documentation built"
            );
            progress.done(&result);
            Ok(result)
        }
        Err(e) => {
            warn!(stage = %tracker.current, error = %e, "documentation build failed");
            tracker.fail();
            Err(e)
        }
    }
}

async fn run_build(
    config: &BuildDocsConfig,
    locator: &dyn RepoLocator,
    progress: &dyn ProgressReporter,
    tracker: &mut StageTracker<'_>,
) -> Result<(DocLayout, Vec<PathBuf>, bool)> {
    // --- Step 1: Repository root ---
    progress.phase("Resolving repository root");
    let root = locator.repo_root(&config.cwd).await?;
    let layout = DocLayout::resolve(root, &config.layout)?;
    info!(root = %layout.root.display(), "repository root resolved");
    tracker.advance();

    // --- Steps 2 & 3: Pre-build cleanup ---
    progress.phase("Removing previous build output");
    let removed = clean_layout(&layout).await?;
    tracker.advance();

    // --- Step 4: Build ---
    progress.builder_started(
        &config
            .builder
            .command_line(&layout.config_dir, &layout.output_dir),
    );
    config
        .builder
        .run(&layout.root, &layout.config_dir, &layout.output_dir)
        .await?;
    tracker.advance();

    // --- Step 5: Post-build cleanup ---
    progress.phase("Removing generated sources");
    let generated_cleaned = remove_dir_forced(&layout.generated_dir).await?;
    tracker.advance();

    Ok((layout, removed, generated_cleaned))
}

/// Resolve the root and remove the generated and output directories,
/// without building.
#[instrument(skip_all, fields(cwd = %cwd.display()))]
pub async fn clean_docs(
    cwd: &Path,
    layout: &LayoutConfig,
    locator: &dyn RepoLocator,
    progress: &dyn ProgressReporter,
) -> Result<CleanDocsResult> {
    progress.phase("Resolving repository root");
    let root = locator.repo_root(cwd).await?;
    let layout = DocLayout::resolve(root, layout)?;

    progress.phase("Removing build output");
    let removed = clean_layout(&layout).await?;
    info!(count = removed.len(), "documentation directories cleaned");

    Ok(CleanDocsResult { layout, removed })
}
