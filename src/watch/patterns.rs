// src/watch/patterns.rs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::fs::FileSystem;

/// Compile a single glob pattern into a `GlobSet`.
///
/// Patterns are evaluated against `/`-separated paths relative to a base
/// directory (the source or public root).
pub fn compile_glob(pattern: &str) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    let glob =
        Glob::new(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;
    builder.add(glob);
    Ok(builder.build()?)
}

/// The literal directory prefix of a glob pattern: every leading `/`
/// component that contains no glob metacharacter.
///
/// `"scripts/vendor/*.js"` -> `"scripts/vendor"`, `"fonts/**/*"` ->
/// `"fonts"`. Destination paths mirror the part of a matched path *after*
/// this prefix, so `fonts/deep/a.woff` lands at `<dest>/deep/a.woff`.
pub fn glob_prefix(pattern: &str) -> PathBuf {
    let mut prefix = PathBuf::new();
    for comp in pattern.split('/') {
        if comp.contains(['*', '?', '[', '{']) {
            break;
        }
        prefix.push(comp);
    }
    prefix
}

/// Relative `/`-separated form of `path` under `base`, if any.
pub fn relative_str(base: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}

/// Collect all files under `base` matching `glob`, sorted by path.
///
/// The sort makes concatenating tasks deterministic: output order is the
/// path order of the matched inputs.
pub fn collect_matching_files(
    fs: &dyn FileSystem,
    base: &Path,
    glob: &GlobSet,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![base.to_path_buf()];

    while let Some(dir) = stack.pop() {
        if !fs.is_dir(&dir) {
            continue;
        }
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) {
                if let Some(rel) = relative_str(base, &path) {
                    if glob.is_match(&rel) {
                        files.push(path);
                    }
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::{MockFileSystem, mtime_at};

    #[test]
    fn glob_prefix_stops_at_first_metachar() {
        assert_eq!(glob_prefix("fonts/**/*"), PathBuf::from("fonts"));
        assert_eq!(
            glob_prefix("scripts/vendor/*.js"),
            PathBuf::from("scripts/vendor")
        );
        assert_eq!(glob_prefix("*.html"), PathBuf::new());
    }

    #[test]
    fn collect_is_sorted_and_filtered() {
        let fs = MockFileSystem::new();
        fs.add_file("src/scripts/b.js", b"", mtime_at(1));
        fs.add_file("src/scripts/a.js", b"", mtime_at(1));
        fs.add_file("src/scripts/vendor/lib.js", b"", mtime_at(1));
        fs.add_file("src/styles/site.css", b"", mtime_at(1));

        let glob = compile_glob("scripts/*.js").unwrap();
        let files = collect_matching_files(&fs, Path::new("src"), &glob).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("src/scripts/a.js"),
                PathBuf::from("src/scripts/b.js"),
            ]
        );
    }

    #[test]
    fn nested_glob_matches_subdirectories() {
        let fs = MockFileSystem::new();
        fs.add_file("src/fonts/sans/regular.woff2", b"", mtime_at(1));
        fs.add_file("src/fonts/mono.woff2", b"", mtime_at(1));

        let glob = compile_glob("fonts/**/*").unwrap();
        let files = collect_matching_files(&fs, Path::new("src"), &glob).unwrap();
        assert_eq!(files.len(), 2);
    }
}
