use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;

use backstow::cli::{self, Cli, Command, Routine};
use backstow::config::Configuration;
use backstow::group::BackupGroup;

fn main() -> Result<()> {
    let args = Cli::parse();
    cli::init_logging(args.verbose, args.quiet);

    // Missing config file or storage root is fatal (non-zero exit);
    // everything past this point is reported per group and exits zero.
    let config = Configuration::load_from_path(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config.display()))?;
    config.ensure_storage_root()?;

    let now = Utc::now().naive_utc();
    let build_groups = |names: &[String]| -> Vec<BackupGroup> {
        config
            .selected_groups(names)
            .into_iter()
            .map(|(name, group)| {
                BackupGroup::new(name, &config.backup_storage_dir, group.clone(), now)
            })
            .collect()
    };

    match args.command {
        Command::Start { groups, routines } => {
            for group in build_groups(&groups) {
                run_start(&group, &routines);
            }
        }
        Command::Ship { groups } => {
            for group in build_groups(&groups) {
                if let Err(e) = group.ship() {
                    tracing::error!(group = %group.name, error = %e, "Shipping failed");
                }
            }
        }
        Command::Clean { groups, dry_run } => {
            for group in build_groups(&groups) {
                match group.clean(now, dry_run) {
                    Ok(Some(report)) => {
                        tracing::info!(
                            group = %group.name,
                            marked = report.marked.len(),
                            deleted = report.deleted,
                            failed = report.failed.len(),
                            dry_run = report.dry_run,
                            "Group cleaned"
                        );
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::error!(group = %group.name, error = %e, "Cleanup failed");
                    }
                }
            }
        }
    }

    Ok(())
}

/// Run the selected routines for one group. Failures are logged; sibling
/// groups and routines still run.
fn run_start(group: &BackupGroup, routines: &[Routine]) {
    let wants = |routine: Routine| routines.is_empty() || routines.contains(&routine);

    if wants(Routine::Dir) {
        let mut archived = 0usize;
        if let Err(e) = group.run_archives(&mut |_| archived += 1) {
            tracing::error!(group = %group.name, error = %e, "Archiving failed");
        } else {
            tracing::info!(group = %group.name, archives = archived, "Archiving finished");
        }
    }

    if wants(Routine::Db) {
        if let Err(e) = group.run_dumps() {
            tracing::error!(group = %group.name, error = %e, "Database dumps failed");
        }
    }
}
