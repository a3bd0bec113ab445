//! Invocation of the external documentation builder (`sphinx-build`).
//!
//! The builder runs in make-mode (`-M <format> <source> <output>`), with its
//! working directory at the repository root and the terminal's stdio, so its
//! own progress output reaches the user unchanged. Only the exit status is
//! observed.

use std::ffi::OsString;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tracing::{info, instrument};

use docbuild_shared::{BuilderConfig, DocBuildError, Result};

/// A configured `sphinx-build` command.
#[derive(Debug, Clone)]
pub struct SphinxBuilder {
    program: String,
    prefix_args: Vec<String>,
    format: String,
    extra_args: Vec<String>,
}

impl SphinxBuilder {
    /// Builder with the given executable and default arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self::from_config(&BuilderConfig {
            program: program.into(),
            ..BuilderConfig::default()
        })
    }

    pub fn from_config(config: &BuilderConfig) -> Self {
        Self {
            program: config.program.clone(),
            prefix_args: config.prefix_args.clone(),
            format: config.format.clone(),
            extra_args: config.extra_args.clone(),
        }
    }

    /// The executable that will be spawned.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument list for building `source` into `output`.
    pub fn args(&self, source: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.prefix_args.iter().map(OsString::from).collect();
        args.push("-M".into());
        args.push(self.format.as_str().into());
        args.push(source.as_os_str().to_owned());
        args.push(output.as_os_str().to_owned());
        args.extend(self.extra_args.iter().map(OsString::from));
        args
    }

    /// Shell-like rendering of the command, for logs and progress output.
    pub fn command_line(&self, source: &Path, output: &Path) -> String {
        let mut line = self.program.clone();
        for arg in self.args(source, output) {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    /// Run the builder and wait for it to exit.
    ///
    /// A non-zero exit becomes [`DocBuildError::Build`] carrying the status.
    #[instrument(skip_all, fields(program = %self.program))]
    pub async fn run(&self, root: &Path, source: &Path, output: &Path) -> Result<()> {
        info!(
            cwd = %root.display(),
            command = %self.command_line(source, output),
            "running documentation builder"
        );

        let status = tokio::process::Command::new(&self.program)
            .args(self.args(source, output))
            .current_dir(root)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| {
                DocBuildError::environment(format!(
                    "failed to spawn `{}`: {e} (is Sphinx installed and on PATH?)",
                    self.program
                ))
            })?;

        if status.success() {
            info!("documentation builder finished");
            Ok(())
        } else {
            Err(DocBuildError::build(&self.program, status_code(status)))
        }
    }
}

/// Exit code of a finished child; signal deaths map to `128 + signal`.
fn status_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_args_use_make_mode_html() {
        let builder = SphinxBuilder::from_config(&BuilderConfig::default());
        let args = builder.args(Path::new("/repo/docs"), Path::new("/repo/docs/_build"));
        assert_eq!(
            args,
            vec![
                OsString::from("-M"),
                OsString::from("html"),
                OsString::from("/repo/docs"),
                OsString::from("/repo/docs/_build"),
            ]
        );
        assert_eq!(builder.program(), "sphinx-build");
    }

    #[test]
    fn prefix_and_extra_args_wrap_positionals() {
        let builder = SphinxBuilder::from_config(&BuilderConfig {
            program: "python3".into(),
            prefix_args: vec!["-m".into(), "sphinx".into()],
            format: "dirhtml".into(),
            extra_args: vec!["-W".into(), "--keep-going".into()],
        });
        assert_eq!(
            builder.command_line(Path::new("docs"), Path::new("docs/_build")),
            "python3 -m sphinx -M dirhtml docs docs/_build -W --keep-going"
        );
    }

    #[tokio::test]
    async fn missing_program_is_environment_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let builder = SphinxBuilder::new("docbuild-no-such-sphinx");
        let err = builder
            .run(dir.path(), &dir.path().join("docs"), &dir.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, DocBuildError::Environment { .. }));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use crate::test_support::{FAILING_SPHINX, FakeRepo};

        #[tokio::test]
        async fn non_zero_exit_carries_status() {
            let repo = FakeRepo::new();
            let builder = repo.builder(FAILING_SPHINX);
            let err = builder
                .run(repo.root(), &repo.layout.config_dir, &repo.layout.output_dir)
                .await
                .unwrap_err();
            match err {
                DocBuildError::Build { program, code } => {
                    assert_eq!(program, "sh");
                    assert_eq!(code, 3);
                }
                other => panic!("expected build error, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn signal_death_reports_shell_style_status() {
            let repo = FakeRepo::new();
            let builder = repo.builder("kill -TERM $$\nsleep 5\n");
            let err = builder
                .run(repo.root(), &repo.layout.config_dir, &repo.layout.output_dir)
                .await
                .unwrap_err();
            assert!(matches!(err, DocBuildError::Build { code: 143, .. }), "{err:?}");
            assert_eq!(err.exit_code(), 143);
        }

        #[tokio::test]
        async fn runs_in_repository_root() {
            let repo = FakeRepo::new();
            let builder = repo.builder("pwd > \"$4.cwd\"\n");
            builder
                .run(repo.root(), &repo.layout.config_dir, &repo.layout.output_dir)
                .await
                .expect("run");

            let mut cwd_file = repo.layout.output_dir.clone().into_os_string();
            cwd_file.push(".cwd");
            let cwd = std::fs::read_to_string(cwd_file).expect("read cwd");
            assert_eq!(
                Path::new(cwd.trim()).canonicalize().expect("canonicalize cwd"),
                repo.root().canonicalize().expect("canonicalize root")
            );
        }
    }
}
