// src/commands/mod.rs
//! Command handlers for the bioarch-sync CLI

mod archive;
mod database;
pub mod progress;
mod show;
mod sync;
mod update;

pub use archive::{cmd_archive, cmd_bump_pkgrel};
pub use database::cmd_build_db;
pub use show::cmd_show;
pub use sync::cmd_sync_meta;
pub use update::{cmd_update_depends, UpdateArgs};

use crate::cli::GlobalArgs;
use anyhow::{Context, Result};
use bioarch_sync::index::{LiveIndex, MetadataIndex, SqliteIndex};
use bioarch_sync::repository::{load_bioc_versions, MirrorClient};
use bioarch_sync::{BiocVersions, Config};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load the config file and apply command-line overrides
pub fn load_config(global: &GlobalArgs) -> Result<Config> {
    let mut config = Config::load(global.config.as_deref())
        .context("Failed to load configuration")?;

    if let Some(path) = &global.db_path {
        config.db_path = path.clone();
    }
    if let Some(path) = &global.meta_path {
        config.meta_path = path.clone();
    }
    if let Some(path) = &global.bioarch_path {
        config.bioarch_path = path.clone();
    }
    if let Some(ver) = &global.bioc_min_ver {
        config.bioc_min_ver = ver.clone();
    }
    if let Some(url) = &global.bioc_meta_mirror {
        config.bioc_meta_mirror = url.clone();
    }
    if let Some(url) = &global.bioc_mirror {
        config.bioc_mirror = url.clone();
    }
    if let Some(url) = &global.cran_mirror {
        config.cran_mirror = url.clone();
    }

    config.validate().context("Invalid configuration")?;
    debug!("Effective configuration: {:?}", config);
    Ok(config)
}

/// Read a package list file
pub fn read_names(file: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read package list: {}", file.display()))?;
    Ok(bioarch_sync::batch::read_package_list(&text))
}

/// The Bioconductor release list, from the mirror or the release-list server
pub fn bioc_versions(config: &Config, client: Option<&MirrorClient>) -> Result<BiocVersions> {
    load_bioc_versions(client, &config.meta_path, &config.bioc_meta_mirror)
        .context("Failed to load Bioconductor releases")
}

/// Open the metadata index selected on the command line
pub fn open_index(
    config: &Config,
    live: bool,
    versions: &BiocVersions,
) -> Result<Box<dyn MetadataIndex>> {
    if live {
        let latest = versions
            .latest()
            .context("Bioconductor release list is empty")?;
        let client = MirrorClient::new()?;
        let index = LiveIndex::fetch(&client, &config.bioc_mirror, &config.cran_mirror, latest)
            .context("Failed to fetch live metadata")?;
        return Ok(Box::new(index));
    }

    let db_path = db_path_str(config)?;
    let index = SqliteIndex::open(db_path)
        .with_context(|| format!("Failed to open metadata database {}", db_path))?;
    Ok(Box::new(index))
}

/// Database path as the `&str` the db layer expects
pub fn db_path_str(config: &Config) -> Result<&str> {
    config
        .db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", config.db_path.display()))
}
