// src/config/mod.rs

//! Declarative pipeline configuration.
//!
//! - [`model`] maps the TOML file onto plain structs with defaults that
//!   reproduce the conventional source/public layout.
//! - [`loader`] reads and deserializes the file.
//! - [`validate`] turns the raw file into a checked [`model::ConfigFile`].
//!
//! The configuration is constructed once at startup and passed explicitly to
//! everything that needs it; nothing reads from process-wide state.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate};
pub use model::ConfigFile;
