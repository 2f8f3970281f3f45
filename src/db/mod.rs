// src/db/mod.rs

//! SQLite store for upstream package metadata
//!
//! The database holds one row per upstream package: the raw DCF descriptor
//! block plus where it came from (CRAN, or a Bioconductor release and
//! category). It is rebuilt from a local metadata mirror by
//! [`crate::index::build_database`] and read by [`crate::index::SqliteIndex`].

pub mod models;
pub mod paths;
pub mod schema;

use crate::error::{Error, Result};
use rusqlite::{Connection, Transaction};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// How long a reader waits on a locked database
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Create the database file (and its directory) and bring the schema up to date
pub fn init(db_path: &str) -> Result<()> {
    let path = Path::new(db_path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            Error::InitError(format!(
                "Failed to create database directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let conn = open(db_path)?;
    schema::migrate(&conn)?;
    info!("Metadata database ready at {}", db_path);
    Ok(())
}

/// Open an existing database
pub fn open(db_path: &str) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

/// Open a database, failing with a clear message when it was never built
pub fn open_existing(db_path: &str) -> Result<Connection> {
    if !Path::new(db_path).exists() {
        return Err(Error::NotFoundError(format!(
            "metadata database {} (run 'bioarch-sync build-db' first)",
            db_path
        )));
    }
    let conn = open(db_path)?;
    schema::migrate(&conn)?;
    Ok(conn)
}

/// Run `f` inside a transaction, committing only when it succeeds
pub fn transaction<F, T>(conn: &mut Connection, f: F) -> Result<T>
where
    F: FnOnce(&Transaction) -> Result<T>,
{
    let tx = conn.transaction()?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested/meta.db");
        let db_path = db_path.to_str().unwrap();

        init(db_path).unwrap();
        assert!(Path::new(db_path).exists());
        let conn = open(db_path).unwrap();
        assert_eq!(
            schema::get_schema_version(&conn).unwrap(),
            schema::SCHEMA_VERSION
        );
    }

    #[test]
    fn test_open_existing_requires_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("missing.db");
        let err = open_existing(db_path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, Error::NotFoundError(_)));
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("meta.db");
        let db_path = db_path.to_str().unwrap();
        init(db_path).unwrap();
        let mut conn = open(db_path).unwrap();

        let result: Result<()> = transaction(&mut conn, |tx| {
            tx.execute(
                "INSERT INTO pkgmeta (name, desc, repo) VALUES ('a', 'Package: a', 'CRAN')",
                [],
            )?;
            Err(Error::InitError("boom".to_string()))
        });
        assert!(result.is_err());

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM pkgmeta", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
