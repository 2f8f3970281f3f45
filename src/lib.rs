// src/lib.rs

//! bioarch-sync
//!
//! Keeps Arch Linux PKGBUILDs of R packages in step with CRAN and
//! Bioconductor metadata: dependency arrays, `lilac.yaml` build-bot
//! descriptors, architecture and archive locations.
//!
//! # Architecture
//!
//! - Metadata index: upstream `PACKAGES` records by package name, served from
//!   SQLite, a live mirror fetch, or memory
//! - Reconciliation: pure computation of the new `depends`/`optdepends`
//!   from a recipe snapshot and an upstream descriptor
//! - Recipe writing: bounded array regions replaced atomically, every other
//!   byte of the PKGBUILD preserved
//! - Archival: a post-processing step driven by index provenance

pub mod archive;
pub mod batch;
pub mod config;
pub mod db;
pub mod dependencies;
pub mod descriptor;
mod error;
pub mod index;
pub mod recipe;
pub mod reconcile;
pub mod repository;
pub mod version;

pub use batch::{BatchOptions, BatchReport};
pub use config::Config;
pub use dependencies::{DependencyName, OptionalDependency};
pub use descriptor::Descriptor;
pub use error::{Error, Result};
pub use index::{IndexEntry, MetadataIndex, Origin};
pub use recipe::{RecipeDocument, RecipeSnapshot, RecipeState, RecipeWriter};
pub use reconcile::{reconcile, ReconciliationResult, Reconciler};
pub use version::{BiocVersion, BiocVersions};
