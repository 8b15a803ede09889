use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::CoreError;

/// Extension of Clockwise compilation units.
pub const SOURCE_EXTENSION: &str = "cw";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the directory that was walked.
    pub path: PathBuf,
    pub contents: String,
}

/// Collect every `.cw` file under `root`, ordered by relative path so
/// that merging is deterministic.
pub fn load_sources(root: impl AsRef<Path>) -> Result<Vec<SourceFile>, CoreError> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(CoreError::MissingSourceDir(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
            let contents = fs::read_to_string(path)?;
            let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
            files.push(SourceFile {
                path: relative,
                contents,
            });
        }
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(root = %root.display(), files = files.len(), "loaded sources");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_cw_files_sorted_by_relative_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("lib")).expect("mkdir");
        fs::write(dir.path().join("main.cw"), "fn main() -> int { return 0 }").expect("write");
        fs::write(dir.path().join("lib/b.cw"), "fn b() -> int { return 2 }").expect("write");
        fs::write(dir.path().join("a.cw"), "fn a() -> int { return 1 }").expect("write");
        fs::write(dir.path().join("notes.txt"), "not a unit").expect("write");

        let files = load_sources(dir.path()).expect("sources should load");
        let paths: Vec<PathBuf> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("a.cw"),
                PathBuf::from("lib").join("b.cw"),
                PathBuf::from("main.cw"),
            ]
        );
        assert_eq!(files[0].contents, "fn a() -> int { return 1 }");
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_is_an_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let locked = dir.path().join("locked");
        fs::create_dir_all(&locked).expect("mkdir");
        fs::write(locked.join("hidden.cw"), "fn h() -> int { return 1 }").expect("write");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).expect("chmod");
        // Root ignores directory permissions.
        let readable = fs::read_dir(&locked).is_ok();

        let result = load_sources(dir.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("chmod");
        if readable {
            return;
        }
        match result {
            Err(err @ CoreError::SourceWalk(_)) => {
                assert!(err.to_string().starts_with("failed to walk source directory"));
            }
            other => panic!("expected SourceWalk, got {other:?}"),
        }
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nowhere");
        match load_sources(&missing) {
            Err(CoreError::MissingSourceDir(path)) => assert_eq!(path, missing),
            other => panic!("expected MissingSourceDir, got {other:?}"),
        }
    }
}
