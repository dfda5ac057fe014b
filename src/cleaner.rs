//! Cleanup executor: apply retention decisions to a storage directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::inventory::{self, InventoryError};
use crate::retention::{self, RetentionPolicy};

/// Outcome of one cleanup run over a storage directory.
#[derive(Debug, Clone)]
pub struct CleanReport {
    /// Paths marked for deletion, in the order they were processed
    /// (descending inventory index).
    pub marked: Vec<PathBuf>,
    /// Number of files actually removed. Always zero in dry-run mode.
    pub deleted: usize,
    /// Files that could not be removed, with the error message.
    pub failed: Vec<(PathBuf, String)>,
    /// Whether this run was a simulation.
    pub dry_run: bool,
}

/// Run retention over `storage_dir`: inventory, evaluate, execute.
///
/// In dry-run mode (the default and safer mode) every marked artifact is
/// logged and nothing on the file system changes. Otherwise marked
/// artifacts are removed in descending index order, so a removal never
/// invalidates the index of another artifact still pending deletion.
/// A single failed removal (already gone, permission denied) is recorded
/// in the report and does not abort the remaining deletions.
///
/// # Errors
///
/// Fails only when the storage directory itself cannot be scanned.
pub fn clean(
    storage_dir: &Path,
    policy: RetentionPolicy,
    now: NaiveDateTime,
    dry_run: bool,
) -> Result<CleanReport, InventoryError> {
    let artifacts = inventory::scan(storage_dir)?;
    let dates: Vec<i64> = artifacts.iter().map(|a| a.modified).collect();
    let decision = retention::evaluate(&dates, policy, now);

    tracing::info!(
        storage_dir = %storage_dir.display(),
        artifacts = artifacts.len(),
        marked = decision.len(),
        dry_run,
        "Starting cleanup"
    );

    let mut report = CleanReport {
        marked: Vec::with_capacity(decision.len()),
        deleted: 0,
        failed: Vec::new(),
        dry_run,
    };

    for &idx in decision.iter().rev() {
        let artifact = &artifacts[idx];
        report.marked.push(artifact.path.clone());

        if dry_run {
            tracing::info!(path = %artifact.path.display(), "[DRY-RUN] Marked for removal");
            continue;
        }

        match fs::remove_file(&artifact.path) {
            Ok(()) => {
                tracing::info!(path = %artifact.path.display(), "Removed outdated backup");
                report.deleted += 1;
            }
            Err(e) => {
                tracing::error!(
                    path = %artifact.path.display(),
                    error = %e,
                    "Failed to remove outdated backup"
                );
                report.failed.push((artifact.path.clone(), e.to_string()));
            }
        }
    }

    tracing::info!(
        marked = report.marked.len(),
        deleted = report.deleted,
        failed = report.failed.len(),
        dry_run,
        "Cleanup complete"
    );

    Ok(report)
}
