//! Per-group orchestration: archive, dump, ship and clean one backup group.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use crate::archive::{self, ArchiveOutcome};
use crate::cleaner::{self, CleanReport};
use crate::config::GroupConfig;
use crate::dump;

/// One configured backup group bound to its storage folder.
///
/// Groups are independent of each other; a failure inside one group is
/// reported and never aborts its siblings.
pub struct BackupGroup {
    /// Group name (the config section name).
    pub name: String,
    /// `<storage root>/<group name>`, where artifacts land.
    pub base_path: PathBuf,
    /// Timestamp prefix shared by every artifact of this run.
    pub filename_prefix: String,
    config: GroupConfig,
}

impl BackupGroup {
    pub fn new(
        name: &str,
        storage_root: &std::path::Path,
        config: GroupConfig,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            name: name.to_string(),
            base_path: storage_root.join(name),
            filename_prefix: now.format("%Y-%m-%d--%H-%M-%S").to_string(),
            config,
        }
    }

    fn ensure_base_path(&self) -> Result<()> {
        fs::create_dir_all(&self.base_path)
            .with_context(|| format!("failed to create group folder {}", self.base_path.display()))
    }

    /// Archive every configured source directory into the group folder.
    ///
    /// Missing source directories are skipped with a warning. Each
    /// finished archive is reported through `progress`; a failed archive
    /// is logged and does not stop the remaining sources.
    pub fn run_archives(&self, progress: &mut dyn FnMut(&ArchiveOutcome)) -> Result<()> {
        self.ensure_base_path()?;

        for source in self.config.source_dirs() {
            if !source.exists() {
                tracing::warn!(
                    group = %self.name,
                    source = %source.display(),
                    "Source directory does not exist, skipping"
                );
                continue;
            }

            let dest = self
                .base_path
                .join(archive::archive_file_name(&self.filename_prefix, &source));

            match archive::archive_directory(&source, &dest) {
                Ok(outcome) => {
                    tracing::info!(
                        group = %self.name,
                        source = %outcome.source.display(),
                        dest = %outcome.dest.display(),
                        "Wrote archive"
                    );
                    progress(&outcome);
                }
                Err(e) => {
                    tracing::error!(
                        group = %self.name,
                        source = %source.display(),
                        error = %e,
                        "Archive failed"
                    );
                }
            }
        }

        Ok(())
    }

    /// Dump every configured database into the group folder.
    ///
    /// Only postgres is supported; other engines are silently skipped.
    /// A failed dump is logged and does not stop the remaining databases.
    pub fn run_dumps(&self) -> Result<()> {
        self.ensure_base_path()?;

        for spec in self.config.database_specs() {
            if spec.engine != dump::POSTGRES {
                tracing::debug!(
                    group = %self.name,
                    engine = %spec.engine,
                    database = %spec.name,
                    "Unsupported database engine, skipping"
                );
                continue;
            }

            let dest = self.base_path.join(spec.dump_file_name(&self.filename_prefix));

            match dump::dump_database(&spec, &dest)
                .and_then(|()| archive::restrict_permissions(&dest))
            {
                Ok(()) => {
                    tracing::info!(
                        group = %self.name,
                        database = %spec.name,
                        dest = %dest.display(),
                        "Wrote database dump"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        group = %self.name,
                        database = %spec.name,
                        error = %e,
                        "Database dump failed"
                    );
                }
            }
        }

        Ok(())
    }

    /// Ship this group's folder to its remote target, if one is
    /// configured.
    pub fn ship(&self) -> Result<()> {
        match self.config.shipper(self.base_path.clone()) {
            Some(shipper) => shipper.ship(),
            None => {
                tracing::debug!(group = %self.name, "No shipper configured, skipping");
                Ok(())
            }
        }
    }

    /// Run retention over this group's folder.
    ///
    /// Returns `None` when the group has no retention policy configured;
    /// the evaluator is not invoked for it.
    pub fn clean(&self, now: NaiveDateTime, dry_run: bool) -> Result<Option<CleanReport>> {
        let Some(policy) = self.config.retention_policy() else {
            tracing::debug!(group = %self.name, "No retention policy configured, skipping");
            return Ok(None);
        };
        policy
            .validate()
            .with_context(|| format!("invalid retention policy for group '{}'", self.name))?;

        let report = cleaner::clean(&self.base_path, policy, now, dry_run)
            .with_context(|| format!("cleanup failed for group '{}'", self.name))?;

        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs::File;
    use std::time::{Duration, UNIX_EPOCH};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2014, 11, 11)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn group_with(config: GroupConfig, root: &std::path::Path) -> BackupGroup {
        BackupGroup::new("unit", root, config, now())
    }

    #[test]
    fn test_filename_prefix_format() {
        let root = tempfile::tempdir().unwrap();
        let group = group_with(GroupConfig::default(), root.path());
        assert_eq!(group.filename_prefix, "2014-11-11--00-00-00");
        assert!(group.base_path.ends_with("unit"));
    }

    #[test]
    fn test_run_archives_skips_missing_sources_and_reports_progress() {
        let root = tempfile::tempdir().unwrap();
        let source = tempfile::tempdir().unwrap();
        fs::write(source.path().join("f.txt"), b"x").unwrap();

        let config = GroupConfig {
            base_name: "unit".to_string(),
            dir: format!("{}, /no/such/source", source.path().display()),
            ..GroupConfig::default()
        };
        let group = group_with(config, root.path());

        let mut outcomes = Vec::new();
        group
            .run_archives(&mut |outcome| outcomes.push(outcome.clone()))
            .unwrap();

        // Only the existing source produced an archive.
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].dest.starts_with(&group.base_path));
        assert_eq!(fs::read_dir(&group.base_path).unwrap().count(), 1);
    }

    #[test]
    fn test_clean_without_policy_is_skipped() {
        let root = tempfile::tempdir().unwrap();
        let group = group_with(GroupConfig::default(), root.path());

        assert!(group.clean(now(), true).unwrap().is_none());
    }

    #[test]
    fn test_clean_with_policy_prunes_group_folder() {
        let root = tempfile::tempdir().unwrap();
        let config = GroupConfig {
            base_name: "unit".to_string(),
            cleaner_days_to_keep: Some(7),
            cleaner_weeks_to_keep: Some(4),
            cleaner_months_to_keep: Some(12),
            cleaner_day_of_week_to_keep: Some(5),
            cleaner_day_of_month_to_keep: Some(1),
            ..GroupConfig::default()
        };
        let group = group_with(config, root.path());
        fs::create_dir_all(&group.base_path).unwrap();

        let ancient = now().and_utc().timestamp() - 400 * 86_400;
        let path = group.base_path.join("old.tar.gz");
        let file = File::create(&path).unwrap();
        file.set_modified(UNIX_EPOCH + Duration::from_secs(ancient as u64))
            .unwrap();

        let report = group.clean(now(), false).unwrap().unwrap();
        assert_eq!(report.deleted, 1);
        assert!(!path.exists());
    }

    #[test]
    fn test_invalid_policy_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let config = GroupConfig {
            cleaner_days_to_keep: Some(7),
            cleaner_weeks_to_keep: Some(4),
            cleaner_months_to_keep: Some(12),
            cleaner_day_of_week_to_keep: Some(9),
            cleaner_day_of_month_to_keep: Some(1),
            ..GroupConfig::default()
        };
        let group = group_with(config, root.path());

        assert!(group.clean(now(), true).is_err());
    }
}
