// src/db/paths.rs
//! Centralized path derivation for the metadata mirror

use crate::version::BiocVersion;
use std::path::{Path, PathBuf};

/// Bioconductor package categories mirrored for every release
pub const BIOC_CATEGORIES: &[&str] = &["bioc", "data/annotation", "data/experiment"];

/// Name of the comma-separated release list inside the mirror
pub const BIOC_VERSION_FILE: &str = "bioc_version";

/// `PACKAGES` index of a Bioconductor release and category
pub fn bioc_packages_file(meta_path: &Path, version: &BiocVersion, category: &str) -> PathBuf {
    bioc_release_dir(meta_path, &version.to_string())
        .join(category)
        .join("src/contrib/PACKAGES")
}

/// Root of a Bioconductor release tree (`packages/<ver>` or `packages/release`)
pub fn bioc_release_dir(meta_path: &Path, release: &str) -> PathBuf {
    meta_path.join("packages").join(release)
}

/// `PACKAGES` index of CRAN
pub fn cran_packages_file(meta_path: &Path) -> PathBuf {
    meta_path.join("src/contrib/PACKAGES")
}

/// The mirrored release list
pub fn bioc_version_file(meta_path: &Path) -> PathBuf {
    meta_path.join(BIOC_VERSION_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bioc_packages_file() {
        assert_eq!(
            bioc_packages_file(Path::new("/srv/bioc"), &BiocVersion::new(3, 18), "data/annotation"),
            PathBuf::from("/srv/bioc/packages/3.18/data/annotation/src/contrib/PACKAGES")
        );
    }

    #[test]
    fn test_cran_packages_file() {
        assert_eq!(
            cran_packages_file(Path::new("bioc")),
            PathBuf::from("bioc/src/contrib/PACKAGES")
        );
    }

    #[test]
    fn test_bioc_version_file() {
        assert_eq!(
            bioc_version_file(Path::new("/srv/bioc")),
            PathBuf::from("/srv/bioc/bioc_version")
        );
    }
}
