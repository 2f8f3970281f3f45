// src/commands/update.rs

//! Batch dependency update

use super::progress::BatchProgress;
use super::{bioc_versions, open_index, read_names};
use anyhow::{Context, Result};
use bioarch_sync::batch::{run_batch, BatchOptions};
use bioarch_sync::repository::MirrorClient;
use bioarch_sync::Config;
use std::path::PathBuf;
use tracing::info;

/// Arguments of `update-depends`
#[derive(Debug, Clone)]
pub struct UpdateArgs {
    pub file: PathBuf,
    pub output: PathBuf,
    pub auto_archive: bool,
    pub auto_unarchive: bool,
    pub jobs: Option<usize>,
    pub dry_run: bool,
    pub live: bool,
}

/// Reconcile every listed package and write the added-dependency list
pub fn cmd_update_depends(config: &Config, args: &UpdateArgs) -> Result<()> {
    let names = read_names(&args.file)?;
    if names.is_empty() {
        println!("No packages listed in {}", args.file.display());
        return Ok(());
    }

    let client = MirrorClient::new()?;
    let versions = bioc_versions(config, Some(&client))?;
    let index = open_index(config, args.live, &versions)?;

    let options = BatchOptions {
        bioarch_path: config.bioarch_path.clone(),
        auto_archive: args.auto_archive,
        auto_unarchive: args.auto_unarchive,
        jobs: args.jobs.unwrap_or(config.jobs),
        dry_run: args.dry_run,
    };
    info!("Batch options: {:?}", options);

    let progress = BatchProgress::new(names.len() as u64, "Updating");
    let report = run_batch(index.as_ref(), &versions, &options, &names, |outcome| {
        progress.package_done(outcome)
    })?;
    progress.finish();

    if !args.dry_run {
        report
            .write_added_dependencies(&args.output)
            .with_context(|| format!("Failed to write {}", args.output.display()))?;
    }

    let verb = if args.dry_run { "would update" } else { "updated" };
    println!(
        "{} packages: {} {}, {} unchanged, {} failed",
        report.total(),
        verb,
        report.updated.len(),
        report.unchanged.len(),
        report.failed.len()
    );
    for name in &report.updated {
        println!("  [UPDATED] {}", name);
    }
    for name in &report.archived {
        println!("  [ARCHIVED] {}", name);
    }
    for (name, error) in &report.failed {
        println!("  [FAILED] {}: {}", name, error);
    }
    if !report.added_dependencies.is_empty() {
        println!(
            "{} new upstream dependencies{}",
            report.added_dependencies.len(),
            if args.dry_run {
                String::new()
            } else {
                format!(" written to {}", args.output.display())
            }
        );
    }

    if !report.failed.is_empty() {
        anyhow::bail!("{} packages failed", report.failed.len());
    }
    Ok(())
}
