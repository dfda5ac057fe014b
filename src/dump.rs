//! Database-dump collaborator: thin wrapper around `pg_dump`.

use std::fs::File;
use std::path::Path;
use std::process::{Command, Stdio};
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use thiserror::Error;

/// Engine name recognized by the dump step. Everything else is skipped.
pub const POSTGRES: &str = "postgres";

/// One configured database, parsed from a `"type:name:user"` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSpec {
    /// Database engine, e.g. `postgres`.
    pub engine: String,
    /// Database name.
    pub name: String,
    /// User to connect as.
    pub user: String,
}

/// Raised when a database string does not have exactly three tokens.
#[derive(Error, Debug, PartialEq, Eq)]
#[error(
    "invalid database string '{0}': expected three colon-separated tokens, \
     e.g. postgres:my_database:my_user"
)]
pub struct DbSpecError(pub String);

impl FromStr for DatabaseSpec {
    type Err = DbSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split(':').collect();
        let [engine, name, user] = tokens.as_slice() else {
            return Err(DbSpecError(s.to_string()));
        };

        Ok(DatabaseSpec {
            engine: engine.to_string(),
            name: name.to_string(),
            user: user.to_string(),
        })
    }
}

impl DatabaseSpec {
    /// File name of the dump this spec produces under a group's base path.
    pub fn dump_file_name(&self, prefix: &str) -> String {
        format!(
            "{}__{}_{}.dump",
            prefix,
            self.engine.to_lowercase(),
            self.name.to_lowercase()
        )
    }
}

/// Dump a postgres database to `dest` with `pg_dump -Fc`, stdout redirected
/// to the destination file. No shell is involved.
pub fn dump_database(spec: &DatabaseSpec, dest: &Path) -> Result<()> {
    let out = File::create(dest)
        .with_context(|| format!("failed to create dump file {}", dest.display()))?;

    let status = Command::new("pg_dump")
        .args(["-Fc", "-U", &spec.user, &spec.name])
        .stdout(Stdio::from(out))
        .status()
        .context("failed to run pg_dump")?;

    if !status.success() {
        bail!("pg_dump for database '{}' exited with {status}", spec.name);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_spec() {
        let spec: DatabaseSpec = "postgres:blog:blog_rw".parse().unwrap();
        assert_eq!(spec.engine, "postgres");
        assert_eq!(spec.name, "blog");
        assert_eq!(spec.user, "blog_rw");
    }

    #[test]
    fn test_parse_rejects_wrong_token_count() {
        assert_eq!(
            "postgres:blog".parse::<DatabaseSpec>(),
            Err(DbSpecError("postgres:blog".to_string()))
        );
        assert_eq!(
            "postgres:blog:user:extra".parse::<DatabaseSpec>(),
            Err(DbSpecError("postgres:blog:user:extra".to_string()))
        );
    }

    #[test]
    fn test_dump_file_name() {
        let spec: DatabaseSpec = "Postgres:Blog:rw".parse().unwrap();
        assert_eq!(
            spec.dump_file_name("2014-11-11--00-00-00"),
            "2014-11-11--00-00-00__postgres_blog.dump"
        );
    }
}
