// src/commands/archive.rs

//! Archive and pkgrel commands for package lists

use super::progress::BatchProgress;
use super::read_names;
use anyhow::{Context, Result};
use bioarch_sync::batch::{archive_package, bump_package, recipe_dir_name};
use bioarch_sync::{BiocVersion, Config};
use std::path::Path;
use tracing::error;

/// Pin sources of every listed package to archive locations
pub fn cmd_archive(config: &Config, file: &Path, bioc_ver: &str, dry_run: bool) -> Result<()> {
    let bioc_ver = BiocVersion::parse(bioc_ver)
        .with_context(|| format!("Invalid Bioconductor version: {}", bioc_ver))?;
    let names = read_names(file)?;

    let progress = BatchProgress::new(names.len() as u64, "Archiving");
    let mut failed = 0;
    for name in &names {
        let dir = recipe_dir_name(name);
        match archive_package(&config.bioarch_path, name, bioc_ver, dry_run) {
            Ok(true) => println!("  [ARCHIVED] {}", dir),
            Ok(false) => println!("  [UNCHANGED] {}", dir),
            Err(e) => {
                error!("Failed to archive {}: {}", dir, e);
                println!("  [FAILED] {}: {}", dir, e);
                failed += 1;
            }
        }
        progress.step(&dir);
    }
    progress.finish();

    if failed > 0 {
        anyhow::bail!("{} of {} packages failed", failed, names.len());
    }
    Ok(())
}

/// Bump pkgrel of every listed package
pub fn cmd_bump_pkgrel(config: &Config, file: &Path, dry_run: bool) -> Result<()> {
    let names = read_names(file)?;

    let mut failed = 0;
    for name in &names {
        let dir = recipe_dir_name(name);
        match bump_package(&config.bioarch_path, name, dry_run) {
            Ok(pkgrel) => println!("  {} pkgrel={}", dir, pkgrel),
            Err(e) => {
                println!("  [FAILED] {}: {}", dir, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} packages failed", failed, names.len());
    }
    Ok(())
}
