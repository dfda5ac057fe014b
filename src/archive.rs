//! Archiving collaborator: thin wrapper around the external `tar` tool.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};

/// A finished archive: where it came from and where it landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOutcome {
    /// Source directory that was archived.
    pub source: PathBuf,
    /// Path of the produced `.tar.gz` file.
    pub dest: PathBuf,
}

/// File name of the archive for `source` under a group's base path.
///
/// Path separators are replaced with `#` so the source path stays
/// readable in a flat directory listing, e.g.
/// `2014-11-11--00-00-00__#srv#www.tar.gz`.
pub fn archive_file_name(prefix: &str, source: &Path) -> String {
    let flattened = source
        .to_string_lossy()
        .replace(std::path::MAIN_SEPARATOR, "#");
    format!("{prefix}__{flattened}.tar.gz")
}

/// Produce a gzip-compressed tar archive of `source` at `dest`.
///
/// The archive file is chmod'ed to 0400 once written, matching the dump
/// files. Returns the outcome on success; a non-zero `tar` exit is an
/// error.
pub fn archive_directory(source: &Path, dest: &Path) -> Result<ArchiveOutcome> {
    let status = Command::new("tar")
        .arg("-czf")
        .arg(dest)
        .arg(source)
        .status()
        .context("failed to run tar")?;

    if !status.success() {
        bail!(
            "tar for source '{}' exited with {status}",
            source.display()
        );
    }

    restrict_permissions(dest)?;

    Ok(ArchiveOutcome {
        source: source.to_path_buf(),
        dest: dest.to_path_buf(),
    })
}

/// Make a produced backup file read-only for its owner (mode 0400).
pub fn restrict_permissions(path: &Path) -> Result<()> {
    let mut perms = fs::metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?
        .permissions();
    perms.set_mode(0o400);
    fs::set_permissions(path, perms)
        .with_context(|| format!("failed to chmod {}", path.display()))
}
