// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PipelineError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = PipelineError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_runtime(cfg)?;
    validate_paths(cfg)?;
    validate_serve(cfg)?;
    validate_transform(cfg)?;
    Ok(())
}

fn validate_runtime(cfg: &RawConfigFile) -> Result<()> {
    if cfg.runtime.queue_length == 0 {
        return Err(PipelineError::Config(
            "[runtime].queue_length must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_paths(cfg: &RawConfigFile) -> Result<()> {
    if cfg.paths.source_root.as_os_str().is_empty() {
        return Err(PipelineError::Config(
            "[paths].source_root must not be empty".to_string(),
        ));
    }
    if cfg.paths.public_root.as_os_str().is_empty() {
        return Err(PipelineError::Config(
            "[paths].public_root must not be empty".to_string(),
        ));
    }
    if cfg.paths.source_root == cfg.paths.public_root {
        return Err(PipelineError::Config(format!(
            "[paths].source_root and public_root must differ (both are {:?}); \
             the clean command would delete the sources",
            cfg.paths.source_root
        )));
    }
    Ok(())
}

fn validate_serve(cfg: &RawConfigFile) -> Result<()> {
    if cfg.serve.port == cfg.serve.ws_port {
        return Err(PipelineError::Config(format!(
            "[serve].port and ws_port must differ (both are {})",
            cfg.serve.port
        )));
    }
    Ok(())
}

fn validate_transform(cfg: &RawConfigFile) -> Result<()> {
    let q = cfg.transform.images.jpeg_quality;
    if q == 0 || q > 100 {
        return Err(PipelineError::Config(format!(
            "[transform.images].jpeg_quality must be in 1..=100 (got {q})"
        )));
    }
    Ok(())
}
