//! Shared types, error model, and configuration for docbuild.
//!
//! This crate is the foundation depended on by the other docbuild crates.
//! It provides:
//! - [`DocBuildError`] — the unified error type
//! - Layout and lifecycle types ([`DocLayout`], [`BuildStage`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BuilderConfig, LayoutConfig, VcsConfig, config_dir, config_file_path,
    init_config, init_config_at, load_config, load_config_from,
};
pub use error::{DocBuildError, Result};
pub use types::{BuildStage, DocLayout};
