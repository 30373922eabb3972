use std::fs;
use std::path::{Path, PathBuf};

use assetpipe::config::model::ConfigFile;
use tempfile::TempDir;

/// A temporary project directory laid out the way the default config
/// expects: `source/` for inputs, `public/` for outputs.
pub struct SiteFixture {
    dir: TempDir,
}

impl SiteFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("creating temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn source_root(&self) -> PathBuf {
        self.dir.path().join("source")
    }

    pub fn public_root(&self) -> PathBuf {
        self.dir.path().join("public")
    }

    /// Write a file under `source/`, creating parent directories.
    pub fn write_source(&self, rel: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        self.write_at(self.source_root().join(rel), contents)
    }

    /// Write a file under `public/`, creating parent directories.
    pub fn write_public(&self, rel: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        self.write_at(self.public_root().join(rel), contents)
    }

    pub fn read_public(&self, rel: &str) -> String {
        fs::read_to_string(self.public_root().join(rel)).expect("reading public file")
    }

    pub fn public_exists(&self, rel: &str) -> bool {
        self.public_root().join(rel).is_file()
    }

    /// The default config rebased onto this fixture's directories.
    pub fn config(&self) -> ConfigFile {
        let mut cfg = ConfigFile::default();
        cfg.paths.source_root = self.source_root();
        cfg.paths.public_root = self.public_root();
        cfg
    }

    fn write_at(&self, path: PathBuf, contents: impl AsRef<[u8]>) -> PathBuf {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("creating parent dirs");
        }
        fs::write(&path, contents).expect("writing fixture file");
        path
    }
}

impl Default for SiteFixture {
    fn default() -> Self {
        Self::new()
    }
}
