//! Command line surface and logging setup.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Backs up directories and databases, ships them to a remote host and
/// prunes outdated backups according to a tiered retention policy.
#[derive(Parser, Debug)]
#[command(name = "backstow", version, about)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "backstow.toml")]
    pub config: PathBuf,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create archives and database dumps for the configured groups.
    Start {
        /// Only run these groups (comma-separated section names).
        #[arg(long, value_delimiter = ',')]
        groups: Vec<String>,

        /// Only run these routines, e.g. --routines=dir,db.
        #[arg(long, value_delimiter = ',')]
        routines: Vec<Routine>,
    },

    /// Ship group folders to their remote targets via rsync.
    Ship {
        /// Only ship these groups (comma-separated section names).
        #[arg(long, value_delimiter = ',')]
        groups: Vec<String>,
    },

    /// Prune outdated backups per each group's retention policy.
    ///
    /// By default only lists what would be deleted; pass --dry-run false
    /// to actually delete.
    Clean {
        /// Only clean these groups (comma-separated section names).
        #[arg(long, value_delimiter = ',')]
        groups: Vec<String>,

        /// Simulate only; pass --dry-run false to delete for real.
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        dry_run: bool,
    },
}

/// The backup routines `start` can run.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Routine {
    /// Archive the configured source directories.
    Dir,
    /// Dump the configured databases.
    Db,
}

/// Initialize the tracing subscriber. `RUST_LOG` wins when set; otherwise
/// the verbosity flags pick the default level.
pub fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_dry_run_defaults_to_true() {
        let cli = Cli::parse_from(["backstow", "clean"]);
        match cli.command {
            Command::Clean { dry_run, .. } => assert!(dry_run),
            _ => panic!("expected clean subcommand"),
        }
    }

    #[test]
    fn test_clean_dry_run_can_be_disabled() {
        let cli = Cli::parse_from(["backstow", "clean", "--dry-run", "false"]);
        match cli.command {
            Command::Clean { dry_run, .. } => assert!(!dry_run),
            _ => panic!("expected clean subcommand"),
        }
    }

    #[test]
    fn test_groups_are_comma_separated() {
        let cli = Cli::parse_from(["backstow", "ship", "--groups", "a,b"]);
        match cli.command {
            Command::Ship { groups } => assert_eq!(groups, vec!["a", "b"]),
            _ => panic!("expected ship subcommand"),
        }
    }

    #[test]
    fn test_routines_parse() {
        let cli = Cli::parse_from(["backstow", "start", "--routines", "dir,db"]);
        match cli.command {
            Command::Start { routines, .. } => {
                assert_eq!(routines, vec![Routine::Dir, Routine::Db]);
            }
            _ => panic!("expected start subcommand"),
        }
    }
}
