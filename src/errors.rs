// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! The taxonomy mirrors how failures surface at runtime:
//! - `Config` fails at startup, before any task runs.
//! - `Io` aborts the invoking task (missing source, permissions, ...).
//! - `Transform` means an external transformer rejected its input; it fails
//!   only the task that invoked it.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown task: {0}")]
    TaskNotFound(String),

    #[error("transform failed in task '{task}': {message}")]
    Transform { task: String, message: String },

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PipelineError>;
