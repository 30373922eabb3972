// src/changed.rs

//! Timestamp-based change detection.
//!
//! A source file is *stale* relative to its destination artifact when the
//! destination is missing or strictly older than the source. There is no
//! hashing and no content comparison; both sides of the check are plain
//! mtimes, recomputed on every task invocation and never cached across
//! runs.

use std::path::{Path, PathBuf};

use crate::fs::FileSystem;

/// Report whether `dest` needs regenerating from `source`.
///
/// Read-only. A missing *source* also reports `false`; there is nothing to
/// transform in that case and the caller's glob walk will not produce such
/// paths in practice.
pub fn is_stale(fs: &dyn FileSystem, source: &Path, dest: &Path) -> bool {
    let Some(source_time) = fs.modified(source) else {
        return false;
    };
    match fs.modified(dest) {
        None => true,
        Some(dest_time) => dest_time < source_time,
    }
}

/// Filter `sources` down to the change set for a per-file task.
///
/// `dest_for` maps each source to its destination artifact. Order of the
/// input is preserved.
pub fn change_set<F>(fs: &dyn FileSystem, sources: &[PathBuf], dest_for: F) -> Vec<PathBuf>
where
    F: Fn(&Path) -> PathBuf,
{
    sources
        .iter()
        .filter(|src| is_stale(fs, src, &dest_for(src)))
        .cloned()
        .collect()
}

/// Report whether any of `sources` is stale relative to a single shared
/// destination (used by concatenating tasks).
pub fn any_stale(fs: &dyn FileSystem, sources: &[PathBuf], dest: &Path) -> bool {
    sources.iter().any(|src| is_stale(fs, src, dest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::{MockFileSystem, mtime_at};

    #[test]
    fn missing_dest_is_stale() {
        let fs = MockFileSystem::new();
        fs.add_file("src/a.css", b"a", mtime_at(100));
        assert!(is_stale(&fs, Path::new("src/a.css"), Path::new("pub/a.css")));
    }

    #[test]
    fn older_dest_is_stale_newer_dest_is_fresh() {
        let fs = MockFileSystem::new();
        fs.add_file("src/a.css", b"a", mtime_at(100));
        fs.add_file("pub/a.css", b"a", mtime_at(50));
        assert!(is_stale(&fs, Path::new("src/a.css"), Path::new("pub/a.css")));

        fs.touch(Path::new("pub/a.css"), mtime_at(200));
        assert!(!is_stale(&fs, Path::new("src/a.css"), Path::new("pub/a.css")));
    }

    #[test]
    fn equal_mtimes_are_fresh() {
        let fs = MockFileSystem::new();
        fs.add_file("src/a.css", b"a", mtime_at(100));
        fs.add_file("pub/a.css", b"a", mtime_at(100));
        assert!(!is_stale(&fs, Path::new("src/a.css"), Path::new("pub/a.css")));
    }

    #[test]
    fn change_set_keeps_only_stale_sources() {
        let fs = MockFileSystem::new();
        fs.add_file("src/a.js", b"a", mtime_at(300));
        fs.add_file("src/b.js", b"b", mtime_at(100));
        fs.add_file("pub/a.js", b"a", mtime_at(200));
        fs.add_file("pub/b.js", b"b", mtime_at(200));

        let sources = vec![PathBuf::from("src/a.js"), PathBuf::from("src/b.js")];
        let changed = change_set(&fs, &sources, |src| {
            Path::new("pub").join(src.file_name().unwrap())
        });
        assert_eq!(changed, vec![PathBuf::from("src/a.js")]);
    }

    #[test]
    fn any_stale_against_shared_dest() {
        let fs = MockFileSystem::new();
        fs.add_file("src/a.js", b"a", mtime_at(100));
        fs.add_file("src/b.js", b"b", mtime_at(300));
        fs.add_file("pub/main.js", b"ab", mtime_at(200));

        let sources = vec![PathBuf::from("src/a.js"), PathBuf::from("src/b.js")];
        assert!(any_stale(&fs, &sources, Path::new("pub/main.js")));

        fs.touch(Path::new("pub/main.js"), mtime_at(400));
        assert!(!any_stale(&fs, &sources, Path::new("pub/main.js")));
    }
}
