// src/commands/database.rs

//! Build the metadata database

use super::{bioc_versions, db_path_str};
use anyhow::{Context, Result};
use bioarch_sync::db::{self, models::PkgMeta};
use bioarch_sync::index::{build_database, Origin};
use bioarch_sync::repository::MirrorClient;
use bioarch_sync::Config;
use tracing::info;

/// Load every mirrored `PACKAGES` file into the database
pub fn cmd_build_db(config: &Config) -> Result<()> {
    let db_path = db_path_str(config)?;
    let min_ver = config.min_bioc_version()?;

    let client = MirrorClient::new()?;
    let versions = bioc_versions(config, Some(&client))?;
    info!(
        "Building {} from {} ({} Bioconductor releases known)",
        db_path,
        config.meta_path.display(),
        versions.len()
    );

    db::init(db_path).with_context(|| format!("Failed to initialize {}", db_path))?;
    let mut conn = db::open(db_path)?;
    let stats = build_database(&mut conn, &config.meta_path, &versions, min_ver)
        .context("Failed to build metadata database")?;

    let cran = PkgMeta::count(&conn, Some(Origin::Cran))?;
    let bioc = PkgMeta::count(&conn, Some(Origin::Bioc))?;
    println!(
        "Database {} holds {} packages ({} CRAN, {} Bioconductor)",
        db_path,
        cran + bioc,
        cran,
        bioc
    );
    println!(
        "  {} records loaded from {} index files, {} skipped, {} index files missing",
        stats.records, stats.sources, stats.skipped, stats.missing
    );
    Ok(())
}
