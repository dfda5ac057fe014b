//! Configuration: a TOML file of backup groups, layered with environment
//! overrides via figment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dump::DatabaseSpec;
use crate::retention::RetentionPolicy;
use crate::shipper::Shipper;

/// Top-level configuration.
///
/// ```toml
/// backup_storage_dir = "/var/backups"
///
/// [groups.websites]
/// base_name = "websites"
/// dir = "/srv/www, /etc/nginx"
/// db = "postgres:blog:blog_rw"
/// shipper_host = "backup.example.com"
/// shipper_ssh_port = 22
/// shipper_user = "backups"
/// shipper_dir = "/remote/backups"
/// cleaner_days_to_keep = 7
/// cleaner_weeks_to_keep = 4
/// cleaner_months_to_keep = 12
/// cleaner_day_of_week_to_keep = 5
/// cleaner_day_of_month_to_keep = 1
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Configuration {
    /// Root directory under which each group gets its own folder.
    pub backup_storage_dir: PathBuf,

    /// Backup groups, keyed by group name.
    #[serde(default)]
    pub groups: BTreeMap<String, GroupConfig>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            backup_storage_dir: PathBuf::from("backups"),
            groups: BTreeMap::new(),
        }
    }
}

/// One backup group.
///
/// `dir` and `db` are comma-separated lists. The `shipper_*` block and the
/// `cleaner_*` block are each all-or-nothing: any missing key means the
/// feature is not configured for this group.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Base name for this group's artifacts.
    pub base_name: String,

    /// Comma-separated source directories to archive.
    #[serde(default)]
    pub dir: String,

    /// Comma-separated `type:name:user` database strings to dump.
    #[serde(default)]
    pub db: String,

    pub shipper_host: Option<String>,
    pub shipper_ssh_port: Option<u16>,
    pub shipper_user: Option<String>,
    pub shipper_dir: Option<String>,

    pub cleaner_days_to_keep: Option<u32>,
    pub cleaner_weeks_to_keep: Option<u32>,
    pub cleaner_months_to_keep: Option<u32>,
    pub cleaner_day_of_week_to_keep: Option<u8>,
    pub cleaner_day_of_month_to_keep: Option<u8>,
}

/// Configuration errors are fatal to the run (missing file, missing
/// storage root) or to a parse (figment).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file does not exist.
    #[error("config file does not exist: {}", .0.display())]
    MissingFile(PathBuf),

    /// The backup storage directory does not exist.
    #[error("backup storage directory does not exist at {}", .0.display())]
    MissingStorageRoot(PathBuf),

    /// The config file or environment could not be parsed.
    #[error(transparent)]
    Parse(#[from] Box<figment::Error>),
}

impl Configuration {
    /// Load configuration from a TOML file, layered with `BACKSTOW__`
    /// prefixed environment variables over the serde defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }

        let config = Figment::from(Serialized::defaults(Configuration::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("BACKSTOW__").split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }

    /// Verify the storage root exists; it is never created implicitly.
    pub fn ensure_storage_root(&self) -> Result<(), ConfigError> {
        if !self.backup_storage_dir.exists() {
            return Err(ConfigError::MissingStorageRoot(
                self.backup_storage_dir.clone(),
            ));
        }
        Ok(())
    }

    /// Groups selected by name, or all groups when `names` is empty.
    /// Unknown names are logged and skipped.
    pub fn selected_groups(&self, names: &[String]) -> Vec<(&String, &GroupConfig)> {
        if names.is_empty() {
            return self.groups.iter().collect();
        }

        names
            .iter()
            .filter_map(|name| match self.groups.get_key_value(name) {
                Some(entry) => Some(entry),
                None => {
                    tracing::warn!(group = %name, "Unknown group in --groups, skipping");
                    None
                }
            })
            .collect()
    }
}

fn split_csv(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

impl GroupConfig {
    /// Source directories parsed from the comma-separated `dir` value.
    pub fn source_dirs(&self) -> Vec<PathBuf> {
        split_csv(&self.dir).map(PathBuf::from).collect()
    }

    /// Database specs parsed from the comma-separated `db` value.
    ///
    /// A malformed entry (wrong token count) is reported and skipped; the
    /// remaining entries still go through.
    pub fn database_specs(&self) -> Vec<DatabaseSpec> {
        split_csv(&self.db)
            .filter_map(|raw| match raw.parse::<DatabaseSpec>() {
                Ok(spec) => Some(spec),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed database entry");
                    None
                }
            })
            .collect()
    }

    /// The retention policy, if all five `cleaner_*` keys are present.
    pub fn retention_policy(&self) -> Option<RetentionPolicy> {
        Some(RetentionPolicy {
            days_to_keep: self.cleaner_days_to_keep?,
            weeks_to_keep: self.cleaner_weeks_to_keep?,
            months_to_keep: self.cleaner_months_to_keep?,
            anchor_weekday: self.cleaner_day_of_week_to_keep?,
            anchor_day_of_month: self.cleaner_day_of_month_to_keep?,
        })
    }

    /// The shipper for `source_dir`, if all four `shipper_*` keys are
    /// present.
    pub fn shipper(&self, source_dir: PathBuf) -> Option<Shipper> {
        Some(Shipper {
            host: self.shipper_host.clone()?,
            ssh_port: self.shipper_ssh_port?,
            user: self.shipper_user.clone()?,
            source_dir,
            target_dir: self.shipper_dir.clone()?,
        })
    }
}
