// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (layout checks, port sanity). Use [`load_and_validate`] for
/// that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML (a missing file at the *default* path means "use built-in
///   defaults"; an explicitly named file must exist).
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks layout and option sanity before any task runs.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();

    let raw = if !path.exists() && path == default_config_path() {
        RawConfigFile::default()
    } else {
        load_from_path(path)?
    };

    let config = ConfigFile::try_from(raw)?;
    Ok(config)
}

/// Helper to resolve the default config path.
///
/// Currently this just returns `Assetpipe.toml` in the current working
/// directory; it exists so project-local discovery or an env var override
/// can slot in later.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Assetpipe.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_default_config_falls_back_to_defaults() {
        let cfg = load_and_validate(default_config_path()).unwrap();
        assert_eq!(cfg.paths.source_root, PathBuf::from("source"));
        assert_eq!(cfg.serve.port, 8888);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = load_and_validate("does/not/exist.toml");
        assert!(err.is_err());
    }

    #[test]
    fn partial_config_keeps_defaults_for_the_rest() {
        let raw: RawConfigFile = toml::from_str(
            r#"
            [serve]
            port = 3000
            "#,
        )
        .unwrap();
        let cfg = ConfigFile::try_from(raw).unwrap();
        assert_eq!(cfg.serve.port, 3000);
        assert_eq!(cfg.serve.ws_port, 8080);
        assert_eq!(cfg.paths.source.styles, "styles/*.css");
    }
}
