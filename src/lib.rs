//! backstow: backup directories and databases, ship the archives to a
//! remote host and prune outdated backups.
//!
//! The core of the crate is the retention engine:
//!
//! - [`calendar`]: month/week/day arithmetic for zone boundaries
//! - [`inventory`]: lists backup artifacts with their mtimes
//! - [`retention`]: the pure tiered keep/delete evaluator
//! - [`cleaner`]: applies decisions (dry-run or real deletion)
//!
//! Archiving ([`archive`]), database dumping ([`dump`]) and remote
//! transfer ([`shipper`]) are thin wrappers around external tools
//! (`tar`, `pg_dump`, `rsync`); [`group`] ties them together per
//! configured backup group.

pub mod archive;
pub mod calendar;
pub mod cleaner;
pub mod cli;
pub mod config;
pub mod dump;
pub mod group;
pub mod inventory;
pub mod retention;
pub mod shipper;

pub use cleaner::{CleanReport, clean};
pub use config::{ConfigError, Configuration, GroupConfig};
pub use group::BackupGroup;
pub use inventory::{Artifact, InventoryError};
pub use retention::{RetentionPolicy, evaluate};
