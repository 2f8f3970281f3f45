// src/cli/mod.rs
//! CLI definitions for bioarch-sync
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! Metadata:
//! - `sync-meta` - Mirror CRAN and Bioconductor `PACKAGES` indexes
//! - `build-db` - Build the metadata database from the mirror
//!
//! Recipes:
//! - `update-depends` - Reconcile dependencies of listed packages
//! - `archive` - Point listed packages at archived sources
//! - `bump-pkgrel` - Bump pkgrel of listed packages
//! - `show` - Preview reconciliation of one recipe

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bioarch-sync")]
#[command(author = "BioArchLinux Project")]
#[command(version)]
#[command(about = "Keep R package PKGBUILDs in sync with CRAN and Bioconductor", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand; each overrides the config file
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Configuration file (default: ~/.config/bioarch-sync/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the metadata database file
    #[arg(short, long = "db", global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Path to the local metadata mirror
    #[arg(short, long, global = true, value_name = "PATH")]
    pub meta_path: Option<PathBuf>,

    /// Root of the recipe tree (one directory per package)
    #[arg(short = 'p', long, global = true, value_name = "PATH")]
    pub bioarch_path: Option<PathBuf>,

    /// Oldest Bioconductor release to mirror and index
    #[arg(long, global = true, value_name = "VERSION")]
    pub bioc_min_ver: Option<String>,

    /// Server publishing the Bioconductor release list
    #[arg(long, global = true, value_name = "URL")]
    pub bioc_meta_mirror: Option<String>,

    /// Bioconductor mirror
    #[arg(long, global = true, value_name = "URL")]
    pub bioc_mirror: Option<String>,

    /// CRAN mirror
    #[arg(long, global = true, value_name = "URL")]
    pub cran_mirror: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    // =========================================================================
    // Metadata
    // =========================================================================
    /// Mirror CRAN and Bioconductor package indexes to the local metadata path
    SyncMeta,

    /// Build the metadata database from the local mirror
    BuildDb,

    // =========================================================================
    // Recipes
    // =========================================================================
    /// Update depends/optdepends of the packages listed in a file
    UpdateDepends {
        /// File with one package name per line (`Rcpp` or `r-rcpp`)
        #[arg(short, long)]
        file: PathBuf,

        /// Where to write newly required upstream packages
        #[arg(short, long, default_value = "added_depends.txt")]
        output: PathBuf,

        /// Point packages no longer listed upstream at archived sources
        #[arg(long)]
        auto_archive: bool,

        /// Keep CRAN archive urls even when the package is listed again
        #[arg(long)]
        no_auto_unarchive: bool,

        /// Worker threads (0 = one per CPU)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,

        /// Fetch metadata from the mirrors instead of the database
        #[arg(long)]
        live: bool,
    },

    /// Point the packages listed in a file at archived sources
    Archive {
        /// File with one package name per line (`Rcpp` or `r-rcpp`)
        #[arg(short, long)]
        file: PathBuf,

        /// Bioconductor release to pin sources to
        #[arg(long, default_value = "3.15")]
        bioc_ver: String,

        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Bump pkgrel of the packages listed in a file
    BumpPkgrel {
        /// File with one package name per line (`Rcpp` or `r-rcpp`)
        #[arg(short, long)]
        file: PathBuf,

        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Show upstream metadata and the reconciliation preview for one recipe
    Show {
        /// Package name (`edgeR` or `r-edger`)
        package: String,

        /// Fetch metadata from the mirrors instead of the database
        #[arg(long)]
        live: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_update_depends_defaults() {
        let cli = Cli::parse_from(["bioarch-sync", "update-depends", "-f", "pkgs.txt"]);
        match cli.command {
            Commands::UpdateDepends { file, output, auto_archive, no_auto_unarchive, jobs, .. } => {
                assert_eq!(file, PathBuf::from("pkgs.txt"));
                assert_eq!(output, PathBuf::from("added_depends.txt"));
                assert!(!auto_archive);
                assert!(!no_auto_unarchive);
                assert_eq!(jobs, None);
            }
            _ => panic!("expected update-depends"),
        }
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let cli = Cli::parse_from(["bioarch-sync", "build-db", "--db", "/tmp/x.db", "-v"]);
        assert_eq!(cli.global.db_path, Some(PathBuf::from("/tmp/x.db")));
        assert!(cli.global.verbose);
    }
}
