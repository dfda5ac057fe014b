//! Artifact inventory: list backup files with their mtimes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

/// A single backup file as observed in a storage directory.
///
/// Immutable once observed; `modified` is the file's last-modified time as
/// Unix seconds (UTC), not its creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Absolute or storage-relative path of the backup file.
    pub path: PathBuf,
    /// Last-modified time in Unix seconds, UTC.
    pub modified: i64,
}

/// Errors raised while scanning a storage directory.
#[derive(Error, Debug)]
pub enum InventoryError {
    /// The storage directory is missing or unreadable.
    #[error("failed to read storage directory {}: {source}", .dir.display())]
    ReadDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A directory entry could not be stat'ed.
    #[error("failed to read metadata for {}: {source}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_secs() as i64,
        Err(before) => -(before.duration().as_secs() as i64),
    }
}

/// List all entries directly inside `dir` (non-recursive) with their
/// last-modified timestamps.
///
/// The result is sorted by path so indexing is reproducible within a run;
/// the evaluator does not depend on the order.
pub fn scan(dir: &Path) -> Result<Vec<Artifact>, InventoryError> {
    let entries = fs::read_dir(dir).map_err(|source| InventoryError::ReadDir {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut artifacts = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| InventoryError::ReadDir {
            dir: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let metadata = entry.metadata().map_err(|source| InventoryError::Metadata {
            path: path.clone(),
            source,
        })?;
        let modified = metadata.modified().map_err(|source| InventoryError::Metadata {
            path: path.clone(),
            source,
        })?;

        artifacts.push(Artifact {
            path,
            modified: unix_seconds(modified),
        });
    }

    artifacts.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    fn touch_with_mtime(path: &Path, unix: u64) {
        let file = File::create(path).unwrap();
        file.set_modified(UNIX_EPOCH + Duration::from_secs(unix))
            .unwrap();
    }

    #[test]
    fn test_scan_pairs_paths_with_mtimes() {
        let dir = tempfile::tempdir().unwrap();
        touch_with_mtime(&dir.path().join("b.tar.gz"), 1_400_000_000);
        touch_with_mtime(&dir.path().join("a.tar.gz"), 1_300_000_000);

        let artifacts = scan(dir.path()).unwrap();
        assert_eq!(artifacts.len(), 2);
        // Sorted by path for stable indexing.
        assert!(artifacts[0].path.ends_with("a.tar.gz"));
        assert_eq!(artifacts[0].modified, 1_300_000_000);
        assert!(artifacts[1].path.ends_with("b.tar.gz"));
        assert_eq!(artifacts[1].modified, 1_400_000_000);
    }

    #[test]
    fn test_scan_is_not_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("nested");
        fs::create_dir(&sub).unwrap();
        touch_with_mtime(&sub.join("inner.tar.gz"), 1_400_000_000);

        let artifacts = scan(dir.path()).unwrap();
        // The subdirectory itself is listed, its contents are not.
        assert_eq!(artifacts.len(), 1);
        assert!(artifacts[0].path.ends_with("nested"));
    }

    #[test]
    fn test_scan_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let err = scan(&missing).unwrap_err();
        assert!(matches!(err, InventoryError::ReadDir { .. }));
    }
}
