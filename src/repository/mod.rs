// src/repository/mod.rs

//! Upstream mirror access
//!
//! This module provides functionality for:
//! - Fetching text and files from CRAN and Bioconductor mirrors with retry
//! - Comparing remote `Last-Modified` times against local copies
//! - Mirroring every `PACKAGES` index into a local metadata tree

mod client;
mod sync;

pub use client::{parse_http_date, MirrorClient};
pub use sync::{copy_tree, load_bioc_versions, Downloader, SyncStats, RELEASE_ALIAS};
