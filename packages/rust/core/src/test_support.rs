//! Fixtures for exercising the pipeline against a fake `sphinx-build`.
//!
//! Fake builders are `sh` scripts run as `sh <script> -M html <src> <out>`,
//! so inside the script `$3` is the source dir and `$4` the output dir.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use docbuild_shared::{BuildStage, BuilderConfig, DocLayout, LayoutConfig};
use tempfile::TempDir;

use crate::builder::SphinxBuilder;
use crate::pipeline::{BuildDocsResult, ProgressReporter};

/// Writes HTML into the output dir and autosummary stubs into `generated/`.
pub const WORKING_SPHINX: &str = r#"
mkdir -p "$4/html" "$3/generated"
echo '<html><body>docs</body></html>' > "$4/html/index.html"
echo 'stub' > "$3/generated/module.rst"
"#;

/// Leaves autosummary stubs behind and fails.
pub const FAILING_SPHINX: &str = r#"
mkdir -p "$3/generated"
echo 'stub' > "$3/generated/module.rst"
echo 'Sphinx error: something broke' >&2
exit 3
"#;

/// A temporary repository with a `docs/` directory.
pub struct FakeRepo {
    dir: TempDir,
    tools: TempDir,
    pub layout: DocLayout,
}

impl FakeRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let tools = tempfile::tempdir().expect("tools tempdir");
        let layout = DocLayout::resolve(dir.path(), &LayoutConfig::default()).expect("layout");
        std::fs::create_dir_all(&layout.config_dir).expect("mkdir docs");
        std::fs::write(layout.config_dir.join("conf.py"), "project = 'demo'\n")
            .expect("write conf.py");
        Self { dir, tools, layout }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a file outside the repository, for scripts to leave markers in.
    pub fn tool_path(&self, name: &str) -> PathBuf {
        self.tools.path().join(name)
    }

    /// A builder that runs `body` under `sh`.
    pub fn builder(&self, body: &str) -> SphinxBuilder {
        let script = self.tool_path("fake-sphinx.sh");
        std::fs::write(&script, body).expect("write fake sphinx");
        SphinxBuilder::from_config(&BuilderConfig {
            program: "sh".into(),
            prefix_args: vec![script.to_string_lossy().into_owned()],
            ..BuilderConfig::default()
        })
    }
}

/// Records every progress callback as a string event.
#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("events lock").clone()
    }

    fn push(&self, event: String) {
        self.events.lock().expect("events lock").push(event);
    }
}

impl ProgressReporter for RecordingProgress {
    fn stage(&self, stage: BuildStage) {
        self.push(format!("stage:{stage}"));
    }

    fn phase(&self, name: &str) {
        self.push(format!("phase:{name}"));
    }

    fn builder_started(&self, _command: &str) {
        self.push("builder".into());
    }

    fn done(&self, _result: &BuildDocsResult) {
        self.push("done".into());
    }
}
