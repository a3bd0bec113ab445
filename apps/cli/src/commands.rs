//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Mutex, PoisonError};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use docbuild_core::builder::SphinxBuilder;
use docbuild_core::pipeline::{
    BuildDocsConfig, BuildDocsResult, ProgressReporter, build_docs, clean_docs,
};
use docbuild_core::repo::{FixedRoot, GitLocator, RepoLocator};
use docbuild_shared::{
    AppConfig, BuildStage, init_config, init_config_at, load_config, load_config_from,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docbuild — build the repository's HTML documentation with Sphinx.
#[derive(Parser)]
#[command(
    name = "docbuild",
    version,
    about = "Build the repository's HTML documentation with Sphinx.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ~/.docbuild/docbuild.toml).
    #[arg(long, env = "DOCBUILD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Use this directory as the repository root instead of asking git.
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Documentation builder executable (overrides `builder.program`).
    #[arg(long, env = "SPHINXBUILD", global = true)]
    pub sphinx: Option<String>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Defaults to `build`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Clean, build the HTML docs, and drop generated sources (default).
    Build,

    /// Remove generated sources and build output without building.
    Clean,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docbuild=info",
        1 => "docbuild=debug",
        _ => "docbuild=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        None | Some(Command::Build) => cmd_build(&cli).await,
        Some(Command::Clean) => cmd_clean(&cli).await,
        Some(Command::Config { ref action }) => match action {
            ConfigAction::Init => cmd_config_init(&cli),
            ConfigAction::Show => cmd_config_show(&cli),
        },
    }
}

/// Load the config file and apply CLI overrides.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    if let Some(program) = &cli.sphinx {
        debug!(program, "builder program overridden from command line");
        config.builder.program = program.clone();
    }

    Ok(config)
}

fn locator_for(cli: &Cli, config: &AppConfig) -> Box<dyn RepoLocator> {
    match &cli.root {
        Some(root) => Box::new(FixedRoot(root.clone())),
        None => Box::new(GitLocator::new(&config.vcs.program)),
    }
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| eyre!("cannot determine working directory: {e}"))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_build(cli: &Cli) -> Result<ExitCode> {
    let config = resolve_config(cli)?;
    let locator = locator_for(cli, &config);

    let build_config = BuildDocsConfig {
        cwd: current_dir()?,
        layout: config.layout.clone(),
        builder: SphinxBuilder::from_config(&config.builder),
    };

    info!(
        builder = %config.builder.program,
        format = %config.builder.format,
        "building documentation"
    );

    let reporter = CliProgress::new();

    match build_docs(&build_config, locator.as_ref(), &reporter).await {
        Ok(result) => {
            println!();
            println!("  ✓ Documentation built successfully!");
            println!(
                "  Output: {}",
                result
                    .layout
                    .output_dir
                    .join(&config.builder.format)
                    .display()
            );
            match result.removed.len() {
                0 => {}
                1 => println!("  Cleaned: 1 stale directory"),
                n => println!("  Cleaned: {n} stale directories"),
            }
            println!("  Time:   {:.1}s", result.elapsed.as_secs_f64());
            println!();
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_build_failure() => {
            eprintln!();
            eprintln!("  ✗ FAILED: documentation build did not succeed ({e})");
            eprintln!();
            Ok(ExitCode::from(e.exit_code()))
        }
        Err(e) => Err(e.into()),
    }
}

async fn cmd_clean(cli: &Cli) -> Result<ExitCode> {
    let config = resolve_config(cli)?;
    let locator = locator_for(cli, &config);
    let reporter = CliProgress::new();

    let result = clean_docs(&current_dir()?, &config.layout, locator.as_ref(), &reporter).await;
    reporter.clear();
    let result = result?;

    if result.removed.is_empty() {
        println!("  Nothing to clean under {}", result.layout.root.display());
    } else {
        for path in &result.removed {
            println!("  Removed: {}", path.display());
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_config_init(cli: &Cli) -> Result<ExitCode> {
    let path = match &cli.config {
        Some(path) => init_config_at(path)?,
        None => init_config()?,
    };
    println!("Config initialized at: {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_config_show(cli: &Cli) -> Result<ExitCode> {
    let config = resolve_config(cli)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner for the filesystem
/// phases. The spinner is cleared before the builder runs so its output is
/// not interleaved with spinner frames.
struct CliProgress {
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn show(&self, message: &str) {
        let mut slot = self.spinner.lock().unwrap_or_else(PoisonError::into_inner);
        let spinner = slot.get_or_insert_with(|| {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner:.cyan} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
            spinner.enable_steady_tick(std::time::Duration::from_millis(80));
            spinner
        });
        spinner.set_message(message.to_string());
    }

    fn clear(&self) {
        let mut slot = self.spinner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(spinner) = slot.take() {
            spinner.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliProgress {
    fn stage(&self, stage: BuildStage) {
        debug!(%stage, "build stage");
        if stage.is_terminal() {
            self.clear();
        }
    }

    fn phase(&self, name: &str) {
        self.show(name);
    }

    fn builder_started(&self, command: &str) {
        self.clear();
        eprintln!("  → {command}");
    }

    fn done(&self, _result: &BuildDocsResult) {
        self.clear();
    }
}
