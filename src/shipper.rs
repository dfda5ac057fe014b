//! Transfer collaborator: one-way rsync of a group folder to a remote host.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result, bail};

/// Ships a group's backup folder via rsync over ssh.
///
/// Transfers are one-way and never overwrite files that already exist on
/// the remote side (`--ignore-existing`). Failures are reported to the
/// caller and retried by no one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shipper {
    /// Remote host name or address.
    pub host: String,
    /// SSH port on the remote host.
    pub ssh_port: u16,
    /// Remote user.
    pub user: String,
    /// Local directory to ship.
    pub source_dir: PathBuf,
    /// Destination directory on the remote host.
    pub target_dir: String,
}

impl Shipper {
    /// `user@host:target` destination argument.
    pub fn remote_spec(&self) -> String {
        format!("{}@{}:{}", self.user, self.host, self.target_dir)
    }

    /// Full rsync argv, built as a list rather than a shell string.
    pub fn rsync_args(&self) -> Vec<OsString> {
        vec![
            OsString::from("-rz"),
            OsString::from("-e"),
            OsString::from(format!("ssh -p {}", self.ssh_port)),
            OsString::from("--ignore-existing"),
            self.source_dir.clone().into_os_string(),
            OsString::from(self.remote_spec()),
        ]
    }

    /// Synchronize the source directory to the remote destination.
    pub fn ship(&self) -> Result<()> {
        tracing::info!(
            source = %self.source_dir.display(),
            remote = %self.remote_spec(),
            ssh_port = self.ssh_port,
            "Shipping backups via rsync"
        );

        let status = Command::new("rsync")
            .args(self.rsync_args())
            .status()
            .context("failed to run rsync")?;

        if !status.success() {
            bail!("rsync to '{}' exited with {status}", self.remote_spec());
        }

        Ok(())
    }
}
