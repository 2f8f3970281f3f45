// src/index/memory.rs

//! In-memory metadata index

use super::{package_blocks, IndexEntry, MetadataIndex, Origin};
use crate::error::Result;
use crate::version::BiocVersion;
use std::collections::HashMap;
use tracing::warn;

/// Metadata held in a hash map, keyed by upstream name
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    entries: HashMap<String, IndexEntry>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry
    pub fn insert(&mut self, entry: IndexEntry) {
        self.entries.insert(entry.name.clone(), entry);
    }

    /// Load every block of a `PACKAGES` file
    ///
    /// Blocks without a `Package:` field are logged and skipped. Returns the
    /// number of entries loaded.
    pub fn load_packages(
        &mut self,
        text: &str,
        origin: Origin,
        bioc: Option<(BiocVersion, &str)>,
    ) -> usize {
        let mut loaded = 0;
        for block in package_blocks(text) {
            match IndexEntry::from_block(block, origin) {
                Ok(entry) => {
                    let entry = match bioc {
                        Some((version, category)) => entry.with_bioc(version, category),
                        None => entry,
                    };
                    self.insert(entry);
                    loaded += 1;
                }
                Err(e) => warn!("Skipping {} index block: {}", origin, e),
            }
        }
        loaded
    }

    /// Build an index from a single `PACKAGES` text
    pub fn from_packages_text(text: &str, origin: Origin) -> Self {
        let mut index = Self::new();
        index.load_packages(text, origin, None);
        index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MetadataIndex for MemoryIndex {
    fn get(&self, name: &str) -> Result<Option<IndexEntry>> {
        Ok(self.entries.get(name).cloned())
    }

    fn describe(&self) -> String {
        format!("in-memory index ({} packages)", self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACKAGES: &str = "\
Package: A3
Version: 1.0.0
Depends: R (>= 2.15.0), xtable, pbapply
Suggests: randomForest, e1071

Version: 0.1
NeedsCompilation: no

Package: abc
Version: 2.2.1
Depends: R (>= 2.10), abc.data, nnet, quantreg, MASS, locfit
";

    #[test]
    fn test_from_packages_text_skips_bad_blocks() {
        let index = MemoryIndex::from_packages_text(PACKAGES, Origin::Cran);
        assert_eq!(index.len(), 2);

        let entry = index.get("abc").unwrap().unwrap();
        assert_eq!(entry.origin, Origin::Cran);
        assert!(entry.desc.contains("quantreg"));
        assert!(index.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_later_loads_replace_earlier() {
        let mut index = MemoryIndex::new();
        index.load_packages(
            "Package: S4Vectors\nVersion: 0.38.0\n",
            Origin::Bioc,
            Some((BiocVersion::new(3, 17), "bioc")),
        );
        index.load_packages(
            "Package: S4Vectors\nVersion: 0.40.0\n",
            Origin::Bioc,
            Some((BiocVersion::new(3, 18), "bioc")),
        );
        let entry = index.get("S4Vectors").unwrap().unwrap();
        assert_eq!(entry.bioc_ver, Some(BiocVersion::new(3, 18)));
        assert_eq!(index.len(), 1);
    }
}
