// src/index/build.rs

//! Rebuild the metadata database from a local mirror
//!
//! Sources are loaded oldest first: every mirrored Bioconductor release not
//! older than the configured minimum, each of its categories, then CRAN.
//! Each record is upserted, so a package present in several sources ends up
//! described by the last one (the newest Bioconductor release, or CRAN).

use super::{package_blocks, IndexEntry, Origin};
use crate::db::{self, models::PkgMeta, paths};
use crate::error::{Error, Result};
use crate::version::{BiocVersion, BiocVersions};
use rusqlite::{Connection, Transaction};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Counters reported after a rebuild
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// `PACKAGES` files read
    pub sources: usize,
    /// Records upserted
    pub records: usize,
    /// Blocks skipped because they could not be parsed
    pub skipped: usize,
    /// Expected `PACKAGES` files that were not mirrored
    pub missing: usize,
}

/// Load every mirrored `PACKAGES` file into `conn`
pub fn build_database(
    conn: &mut Connection,
    meta_path: &Path,
    versions: &BiocVersions,
    min_ver: BiocVersion,
) -> Result<BuildStats> {
    let mut releases: Vec<BiocVersion> = versions.at_least(min_ver).collect();
    releases.sort();

    db::transaction(conn, |tx| {
        let mut stats = BuildStats::default();

        for version in &releases {
            for &category in paths::BIOC_CATEGORIES {
                let file = paths::bioc_packages_file(meta_path, version, category);
                load_file(tx, &file, Origin::Bioc, Some((*version, category)), &mut stats)?;
            }
        }

        let cran = paths::cran_packages_file(meta_path);
        load_file(tx, &cran, Origin::Cran, None, &mut stats)?;

        info!(
            "Loaded {} records from {} index files ({} skipped, {} missing)",
            stats.records, stats.sources, stats.skipped, stats.missing
        );
        Ok(stats)
    })
}

fn load_file(
    tx: &Transaction,
    file: &Path,
    origin: Origin,
    bioc: Option<(BiocVersion, &str)>,
    stats: &mut BuildStats,
) -> Result<()> {
    if !file.exists() {
        warn!("Index file {} not mirrored, skipping", file.display());
        stats.missing += 1;
        return Ok(());
    }

    let text = fs::read_to_string(file)
        .map_err(|e| Error::IoError(format!("Failed to read {}: {}", file.display(), e)))?;
    debug!("Loading {} from {}", origin, file.display());

    for block in package_blocks(&text) {
        let entry = match IndexEntry::from_block(block, origin) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("{}: {}", file.display(), e);
                stats.skipped += 1;
                continue;
            }
        };
        let entry = match bioc {
            Some((version, category)) => entry.with_bioc(version, category),
            None => entry,
        };
        PkgMeta::from_entry(&entry).upsert(tx)?;
        stats.records += 1;
    }

    stats.sources += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write(path: PathBuf, text: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    #[test]
    fn test_later_sources_win() {
        let meta = tempfile::tempdir().unwrap();
        let v17 = BiocVersion::new(3, 17);
        let v18 = BiocVersion::new(3, 18);
        write(
            paths::bioc_packages_file(meta.path(), &v17, "bioc"),
            "Package: limma\nVersion: 3.56.0\n\nPackage: oldpkg\nVersion: 1.0\n",
        );
        write(
            paths::bioc_packages_file(meta.path(), &v18, "bioc"),
            "Package: limma\nVersion: 3.58.1\n",
        );
        write(
            paths::cran_packages_file(meta.path()),
            "Package: Rcpp\nVersion: 1.0.12\n\nbroken block\n\nPackage: oldpkg\nVersion: 2.0\n",
        );

        let mut conn = Connection::open_in_memory().unwrap();
        crate::db::schema::migrate(&conn).unwrap();
        let versions = BiocVersions::new(vec![v18, v17, BiocVersion::new(3, 9)]);

        let stats = build_database(&mut conn, meta.path(), &versions, v17).unwrap();
        assert_eq!(stats.records, 5);
        assert_eq!(stats.skipped, 1);
        // only the bioc category of each release is mirrored
        assert_eq!(stats.sources, 3);
        assert_eq!(stats.missing, 4);

        let limma = PkgMeta::find_by_name(&conn, "limma").unwrap().unwrap();
        assert_eq!(limma.bioc_ver.as_deref(), Some("3.18"));
        assert!(limma.desc.contains("3.58.1"));

        let moved = PkgMeta::find_by_name(&conn, "oldpkg").unwrap().unwrap();
        assert_eq!(moved.repo, Origin::Cran);
        assert_eq!(moved.bioc_ver, None);
    }

    #[test]
    fn test_releases_below_minimum_ignored() {
        let meta = tempfile::tempdir().unwrap();
        write(
            paths::bioc_packages_file(meta.path(), &BiocVersion::new(3, 9), "bioc"),
            "Package: ancient\nVersion: 0.1\n",
        );

        let mut conn = Connection::open_in_memory().unwrap();
        crate::db::schema::migrate(&conn).unwrap();
        let versions = BiocVersions::new(vec![BiocVersion::new(3, 9), BiocVersion::new(3, 10)]);

        build_database(&mut conn, meta.path(), &versions, BiocVersion::new(3, 10)).unwrap();
        assert!(PkgMeta::find_by_name(&conn, "ancient").unwrap().is_none());
    }
}
