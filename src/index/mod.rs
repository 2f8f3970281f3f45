// src/index/mod.rs

//! Upstream metadata index
//!
//! Maps an upstream package name (`Rcpp`, `BiocGenerics`) to its DCF
//! descriptor block and provenance. Three backends implement
//! [`MetadataIndex`]:
//! - [`SqliteIndex`] - the local database built by `build-db`
//! - [`LiveIndex`] - `PACKAGES` files fetched straight from the mirrors
//! - [`MemoryIndex`] - an in-memory map, used by the live backend and tests
//!
//! A missing package is `Ok(None)`, not an error: upstream dropping a
//! package is how archival is detected.

mod build;
mod live;
mod memory;
mod sqlite;

pub use build::{build_database, BuildStats};
pub use live::LiveIndex;
pub use memory::MemoryIndex;
pub use sqlite::SqliteIndex;

use crate::descriptor::DcfFields;
use crate::error::Result;
use crate::version::BiocVersion;
use std::fmt;
use std::str::FromStr;

/// Where an upstream package is published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    Cran,
    Bioc,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Cran => "CRAN",
            Origin::Bioc => "BIOC",
        }
    }
}

impl FromStr for Origin {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "CRAN" => Ok(Origin::Cran),
            "BIOC" => Ok(Origin::Bioc),
            _ => Err(format!("Invalid package origin: {}", s)),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptor text and provenance of one upstream package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub name: String,
    /// Raw DCF block
    pub desc: String,
    pub origin: Origin,
    /// Release the entry was taken from (Bioconductor only)
    pub bioc_ver: Option<BiocVersion>,
    /// `bioc`, `data/annotation` or `data/experiment`
    pub bioc_category: Option<String>,
}

impl IndexEntry {
    pub fn new(name: impl Into<String>, desc: impl Into<String>, origin: Origin) -> Self {
        Self {
            name: name.into(),
            desc: desc.into(),
            origin,
            bioc_ver: None,
            bioc_category: None,
        }
    }

    /// Attach Bioconductor release and category
    pub fn with_bioc(mut self, version: BiocVersion, category: &str) -> Self {
        self.bioc_ver = Some(version);
        self.bioc_category = Some(category.to_string());
        self
    }

    /// Build an entry from one `PACKAGES` block
    ///
    /// Fails with a parse error when the block has no `Package:` field.
    pub fn from_block(block: &str, origin: Origin) -> Result<Self> {
        let fields = DcfFields::parse(block)?;
        let name = fields.package()?.to_string();
        Ok(Self::new(name, block.trim_end().to_string() + "\n", origin))
    }
}

/// Lookup of upstream package metadata by name
///
/// Implementations are read-only during a run and may be shared between
/// worker threads.
pub trait MetadataIndex: Send + Sync {
    /// Look up a package by its exact upstream name
    fn get(&self, name: &str) -> Result<Option<IndexEntry>>;

    /// Short description for log messages
    fn describe(&self) -> String;
}

/// Split a `PACKAGES` file into its non-empty blocks
pub fn package_blocks(text: &str) -> impl Iterator<Item = &str> {
    text.split("\n\n").filter(|block| !block.trim().is_empty())
}
