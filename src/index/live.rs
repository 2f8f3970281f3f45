// src/index/live.rs

//! Metadata fetched straight from the mirrors
//!
//! Downloads the `PACKAGES` indexes of the newest Bioconductor release and of
//! CRAN once, then answers lookups from memory. Bioconductor is loaded first
//! so that a package published by both resolves to CRAN, matching the
//! database built by [`super::build_database`].

use super::{IndexEntry, MemoryIndex, MetadataIndex, Origin};
use crate::db::paths::BIOC_CATEGORIES;
use crate::error::Result;
use crate::repository::MirrorClient;
use crate::version::BiocVersion;
use tracing::{info, warn};

/// Index populated from live mirror downloads
pub struct LiveIndex {
    index: MemoryIndex,
    bioc_ver: BiocVersion,
}

impl LiveIndex {
    /// Fetch all indexes of `bioc_ver` and CRAN
    ///
    /// A Bioconductor category that cannot be downloaded is skipped with a
    /// warning; CRAN is required.
    pub fn fetch(
        client: &MirrorClient,
        bioc_mirror: &str,
        cran_mirror: &str,
        bioc_ver: BiocVersion,
    ) -> Result<Self> {
        let mut index = MemoryIndex::new();
        let bioc_mirror = bioc_mirror.trim_end_matches('/');

        for &category in BIOC_CATEGORIES {
            let url = format!(
                "{}/packages/{}/{}/src/contrib/PACKAGES",
                bioc_mirror, bioc_ver, category
            );
            match client.get_text(&url) {
                Ok(text) => {
                    let loaded =
                        index.load_packages(&text, Origin::Bioc, Some((bioc_ver, category)));
                    info!("Loaded {} Bioconductor {} {} packages", loaded, bioc_ver, category);
                }
                Err(e) => warn!("Skipping Bioconductor {} {}: {}", bioc_ver, category, e),
            }
        }

        let url = format!("{}/src/contrib/PACKAGES", cran_mirror.trim_end_matches('/'));
        let loaded = index.load_packages(&client.get_text(&url)?, Origin::Cran, None);
        info!("Loaded {} CRAN packages", loaded);

        Ok(Self { index, bioc_ver })
    }

    /// Build from already downloaded texts, in the same precedence as [`fetch`](Self::fetch)
    pub fn from_texts(bioc_ver: BiocVersion, bioc: &[(&str, &str)], cran: &str) -> Self {
        let mut index = MemoryIndex::new();
        for &(category, text) in bioc {
            index.load_packages(text, Origin::Bioc, Some((bioc_ver, category)));
        }
        index.load_packages(cran, Origin::Cran, None);
        Self { index, bioc_ver }
    }

    pub fn bioc_ver(&self) -> BiocVersion {
        self.bioc_ver
    }
}

impl MetadataIndex for LiveIndex {
    fn get(&self, name: &str) -> Result<Option<IndexEntry>> {
        self.index.get(name)
    }

    fn describe(&self) -> String {
        format!(
            "live mirror index (Bioconductor {}, {} packages)",
            self.bioc_ver,
            self.index.len()
        )
    }
}
