// src/fs/mock.rs

//! In-memory filesystem used by unit tests.
//!
//! Stores `(contents, mtime)` per path; directories are implied by file
//! paths. Modification times are set explicitly by the test, which keeps
//! change-detection tests deterministic without sleeping.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Result, anyhow};

use super::FileSystem;

#[derive(Debug, Default)]
pub struct MockFileSystem {
    files: Mutex<HashMap<PathBuf, (Vec<u8>, SystemTime)>>,
}

/// A deterministic mtime `secs` seconds past the epoch.
pub fn mtime_at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a file with an explicit modification time.
    pub fn add_file(&self, path: impl Into<PathBuf>, contents: &[u8], mtime: SystemTime) {
        self.files
            .lock()
            .unwrap()
            .insert(path.into(), (contents.to_vec(), mtime));
    }

    /// Update only the modification time of an existing file.
    pub fn touch(&self, path: &Path, mtime: SystemTime) {
        if let Some(entry) = self.files.lock().unwrap().get_mut(path) {
            entry.1 = mtime;
        }
    }

    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path).map(|(c, _)| c.clone())
    }
}

impl FileSystem for MockFileSystem {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.contents(path)
            .ok_or_else(|| anyhow!("mock: no such file {:?}", path))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| anyhow!("mock: invalid utf-8 in {:?}: {e}", path))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.add_file(path, contents, SystemTime::now());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        files.keys().any(|p| p.starts_with(path) && p != path)
    }

    fn modified(&self, path: &Path) -> Option<SystemTime> {
        self.files.lock().unwrap().get(path).map(|(_, t)| *t)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let files = self.files.lock().unwrap();
        let mut entries: Vec<PathBuf> = Vec::new();

        for file in files.keys() {
            let Ok(rel) = file.strip_prefix(path) else {
                continue;
            };
            let Some(first) = rel.components().next() else {
                continue;
            };
            let entry = path.join(first.as_os_str());
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.files.lock().unwrap().retain(|p, _| !p.starts_with(path));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_dir_lists_immediate_children_once() {
        let fs = MockFileSystem::new();
        fs.add_file("src/a/x.css", b"x", mtime_at(1));
        fs.add_file("src/a/y.css", b"y", mtime_at(1));
        fs.add_file("src/b.css", b"b", mtime_at(1));

        let mut entries = fs.read_dir(Path::new("src")).unwrap();
        entries.sort();
        assert_eq!(
            entries,
            vec![PathBuf::from("src/a"), PathBuf::from("src/b.css")]
        );
        assert!(fs.is_dir(Path::new("src/a")));
        assert!(fs.is_file(Path::new("src/b.css")));
    }

    #[test]
    fn remove_dir_all_drops_subtree() {
        let fs = MockFileSystem::new();
        fs.add_file("pub/styles/site.css", b"", mtime_at(1));
        fs.add_file("src/site.css", b"", mtime_at(1));

        fs.remove_dir_all(Path::new("pub")).unwrap();
        assert!(!fs.exists(Path::new("pub/styles/site.css")));
        assert!(fs.exists(Path::new("src/site.css")));
    }
}
