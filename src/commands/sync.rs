// src/commands/sync.rs

//! Mirror upstream metadata

use anyhow::{Context, Result};
use bioarch_sync::repository::{Downloader, MirrorClient};
use bioarch_sync::Config;
use tracing::info;

/// Mirror CRAN and Bioconductor `PACKAGES` indexes into `config.meta_path`
pub fn cmd_sync_meta(config: &Config) -> Result<()> {
    let min_ver = config.min_bioc_version()?;
    info!(
        "Syncing metadata to {} (Bioconductor >= {})",
        config.meta_path.display(),
        min_ver
    );

    let client = MirrorClient::new()?;
    let downloader = Downloader::new(client, &config.bioc_mirror, &config.cran_mirror, min_ver);
    let stats = downloader
        .sync(&config.meta_path)
        .context("Metadata sync failed")?;

    println!(
        "Metadata synced to {}: {} downloaded, {} up to date, {} failed",
        config.meta_path.display(),
        stats.downloaded,
        stats.up_to_date,
        stats.failed
    );
    if stats.failed > 0 {
        anyhow::bail!("{} index downloads failed", stats.failed);
    }
    Ok(())
}
