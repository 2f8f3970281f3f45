// src/db/models/pkgmeta.rs

//! Upstream package metadata rows
//!
//! One row per upstream package name. When the same package appears in
//! several sources (an old Bioconductor release, a newer one, then CRAN), the
//! last upsert wins.

use crate::error::Result;
use crate::index::{IndexEntry, Origin};
use rusqlite::{Connection, OptionalExtension, Row, params};

/// Database representation of one upstream package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkgMeta {
    pub name: String,
    pub desc: String,
    pub repo: Origin,
    pub bioc_ver: Option<String>,
    pub bioc_category: Option<String>,
    pub updated_at: Option<String>,
}

impl PkgMeta {
    /// Create a row from an index entry
    pub fn from_entry(entry: &IndexEntry) -> Self {
        Self {
            name: entry.name.clone(),
            desc: entry.desc.clone(),
            repo: entry.origin,
            bioc_ver: entry.bioc_ver.map(|v| v.to_string()),
            bioc_category: entry.bioc_category.clone(),
            updated_at: None,
        }
    }

    /// Convert back to an index entry
    ///
    /// A stored Bioconductor version that no longer parses is dropped rather
    /// than failing the lookup.
    pub fn to_entry(&self) -> IndexEntry {
        IndexEntry {
            name: self.name.clone(),
            desc: self.desc.clone(),
            origin: self.repo,
            bioc_ver: self.bioc_ver.as_deref().and_then(|v| v.parse().ok()),
            bioc_category: self.bioc_category.clone(),
        }
    }

    /// Insert this row, replacing any existing row with the same name
    pub fn upsert(&mut self, conn: &Connection) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO pkgmeta (name, desc, repo, bioc_ver, bioc_category, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(name) DO UPDATE SET
                desc = excluded.desc,
                repo = excluded.repo,
                bioc_ver = excluded.bioc_ver,
                bioc_category = excluded.bioc_category,
                updated_at = excluded.updated_at",
            params![
                &self.name,
                &self.desc,
                self.repo.as_str(),
                &self.bioc_ver,
                &self.bioc_category,
                &now,
            ],
        )?;

        self.updated_at = Some(now);
        Ok(())
    }

    /// Find a package by its exact upstream name
    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT name, desc, repo, bioc_ver, bioc_category, updated_at
             FROM pkgmeta WHERE name = ?1",
        )?;

        let meta = stmt.query_row([name], Self::from_row).optional()?;
        Ok(meta)
    }

    /// Count rows, optionally restricted to one origin
    pub fn count(conn: &Connection, repo: Option<Origin>) -> Result<i64> {
        let count = match repo {
            Some(repo) => conn.query_row(
                "SELECT COUNT(*) FROM pkgmeta WHERE repo = ?1",
                [repo.as_str()],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM pkgmeta", [], |row| row.get(0))?,
        };
        Ok(count)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let repo_str: String = row.get(2)?;
        let repo = repo_str.parse::<Origin>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
            )
        })?;

        Ok(Self {
            name: row.get(0)?,
            desc: row.get(1)?,
            repo,
            bioc_ver: row.get(3)?,
            bioc_category: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}
