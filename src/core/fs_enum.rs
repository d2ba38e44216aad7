//! Enumerates the Python source files a scan should cover.
//!
//! Walks each configured include root, rejects anything matching an
//! exclude pattern, and deduplicates files reachable from more than one
//! include root, then reads each survivor into a [`SourceFile`].

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::core::config::PathsConfig;
use crate::core::errors::{CqError, Result};
use crate::core::model::SourceFile;

/// Enumerate and read every `.py` file under `paths.include` that is not
/// excluded, relative to `root`. Results are sorted by relative path for
/// a deterministic scan order.
pub fn enumerate_sources(root: &Path, paths: &PathsConfig) -> Result<Vec<SourceFile>> {
    let mut seen = BTreeSet::new();
    let mut files: Vec<PathBuf> = Vec::new();

    for include in &paths.include {
        let base = root.join(include);
        if !base.exists() {
            continue;
        }
        for entry in WalkDir::new(&base).into_iter().filter_map(std::result::Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("py") {
                continue;
            }
            let abs = path
                .canonicalize()
                .unwrap_or_else(|_| path.to_path_buf());
            if is_excluded(&abs, &paths.exclude) {
                continue;
            }
            if !seen.insert(abs.clone()) {
                continue;
            }
            files.push(abs);
        }
    }

    files.sort();

    let mut sources = Vec::with_capacity(files.len());
    for abs in files {
        let rel = abs
            .strip_prefix(root)
            .unwrap_or(&abs)
            .to_string_lossy()
            .replace('\\', "/");
        let text = std::fs::read_to_string(&abs)
            .map_err(|e| CqError::io(format!("reading {}", abs.display()), e))?;
        sources.push(SourceFile::new(rel, text));
    }

    Ok(sources)
}

fn is_excluded(path: &Path, excludes: &[String]) -> bool {
    let normalized = path.to_string_lossy().replace('\\', "/");
    excludes.iter().any(|pattern| normalized.contains(pattern.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn enumerates_py_files_and_skips_excluded_dirs() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join(".venv/pkg")).unwrap();
        fs::write(dir.path().join("src/a.py"), "x = 1\n").unwrap();
        fs::write(dir.path().join(".venv/pkg/b.py"), "y = 2\n").unwrap();
        fs::write(dir.path().join("src/readme.md"), "not python\n").unwrap();

        let paths = PathsConfig {
            include: vec!["./".to_string()],
            exclude: vec!["/.venv/".to_string()],
        };
        let sources = enumerate_sources(dir.path(), &paths).unwrap();
        let rel_paths: Vec<&str> = sources.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(rel_paths, vec!["src/a.py"]);
    }

    #[test]
    fn missing_include_root_is_skipped_not_an_error() {
        let dir = tempdir().unwrap();
        let paths = PathsConfig {
            include: vec!["does-not-exist".to_string()],
            exclude: vec![],
        };
        let sources = enumerate_sources(dir.path(), &paths).unwrap();
        assert!(sources.is_empty());
    }
}
