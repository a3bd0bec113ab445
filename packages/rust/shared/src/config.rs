//! Application configuration for docbuild.
//!
//! User config lives at `~/.docbuild/docbuild.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocBuildError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docbuild.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docbuild";

// ---------------------------------------------------------------------------
// Config structs (matching docbuild.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Documentation directory layout.
    #[serde(default)]
    pub layout: LayoutConfig,

    /// External documentation builder.
    #[serde(default)]
    pub builder: BuilderConfig,

    /// Version-control tool used to find the repository root.
    #[serde(default)]
    pub vcs: VcsConfig,
}

/// `[layout]` section. All paths are relative to the repository root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Documentation configuration directory.
    #[serde(default = "default_config_dir")]
    pub config_dir: String,

    /// Scratch directory, relative to `config_dir`.
    #[serde(default = "default_generated_dir")]
    pub generated_dir: String,

    /// Output directory for built docs.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            generated_dir: default_generated_dir(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_config_dir() -> String {
    "docs".into()
}
fn default_generated_dir() -> String {
    "generated".into()
}
fn default_output_dir() -> String {
    "docs/_build".into()
}

/// `[builder]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Executable to run.
    #[serde(default = "default_builder_program")]
    pub program: String,

    /// Arguments placed before `-M`, e.g. `["-m", "sphinx"]` for `python3`.
    #[serde(default)]
    pub prefix_args: Vec<String>,

    /// Make-mode target passed after `-M`.
    #[serde(default = "default_format")]
    pub format: String,

    /// Arguments appended after the output directory.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            program: default_builder_program(),
            prefix_args: Vec::new(),
            format: default_format(),
            extra_args: Vec::new(),
        }
    }
}

fn default_builder_program() -> String {
    "sphinx-build".into()
}
fn default_format() -> String {
    "html".into()
}

/// `[vcs]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VcsConfig {
    /// Git executable.
    #[serde(default = "default_vcs_program")]
    pub program: String,
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            program: default_vcs_program(),
        }
    }
}

fn default_vcs_program() -> String {
    "git".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docbuild/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DocBuildError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docbuild/docbuild.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocBuildError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        DocBuildError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    tracing::debug!(?path, "loaded config file");
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    init_config_at(&config_file_path()?)
}

/// Write a default config file at `path`, creating parent directories.
///
/// Refuses to overwrite an existing file.
pub fn init_config_at(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Err(DocBuildError::config(format!(
            "{} already exists; remove it first to regenerate defaults",
            path.display()
        )));
    }

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| DocBuildError::io(dir, e))?;
    }

    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocBuildError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| DocBuildError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path.to_path_buf())
}
