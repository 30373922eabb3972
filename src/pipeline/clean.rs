// src/pipeline/clean.rs

use std::path::Path;

use tracing::info;

use crate::errors::Result;
use crate::fs::FileSystem;

/// Remove the public root entirely. The next build regenerates everything
/// because change detection finds no outputs to compare against.
pub fn clean(fs: &dyn FileSystem, public_root: &Path) -> Result<()> {
    if fs.exists(public_root) {
        info!(path = %public_root.display(), "removing output directory");
        fs.remove_dir_all(public_root)?;
    } else {
        info!(path = %public_root.display(), "output directory already absent");
    }
    Ok(())
}
