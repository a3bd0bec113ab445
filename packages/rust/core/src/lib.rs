//! Core orchestration for docbuild.
//!
//! This crate ties together repository-root resolution, directory cleanup,
//! and the external documentation builder into one fail-fast workflow
//! (`build_docs`).

pub mod builder;
pub mod clean;
pub mod pipeline;
pub mod repo;

#[cfg(all(test, unix))]
pub(crate) mod test_support;
