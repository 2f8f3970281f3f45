// src/repository/sync.rs

//! Metadata mirror synchronization
//!
//! Mirrors the `PACKAGES` indexes of every Bioconductor release not older
//! than a minimum, plus CRAN, into a local tree laid out like the upstream
//! servers (see [`crate::db::paths`]). Files are only fetched when the
//! remote copy is newer than the local one.

use super::client::MirrorClient;
use crate::db::paths;
use crate::error::{Error, Result};
use crate::version::{BiocVersion, BiocVersions};
use std::fs;
use std::path::Path;
use tracing::{debug, error, info};
use walkdir::WalkDir;

/// Page listing every Bioconductor release
const RELEASE_PAGE: &str = "about/release-announcements/";

/// Release directory alias pointing at the newest release
pub const RELEASE_ALIAS: &str = "release";

/// Counters reported after a sync
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub downloaded: usize,
    pub up_to_date: usize,
    pub failed: usize,
}

/// Mirrors upstream metadata into a local directory
pub struct Downloader {
    client: MirrorClient,
    bioc_mirror: String,
    cran_mirror: String,
    bioc_min_ver: BiocVersion,
}

impl Downloader {
    pub fn new(
        client: MirrorClient,
        bioc_mirror: &str,
        cran_mirror: &str,
        bioc_min_ver: BiocVersion,
    ) -> Self {
        Self {
            client,
            bioc_mirror: bioc_mirror.trim_end_matches('/').to_string(),
            cran_mirror: cran_mirror.trim_end_matches('/').to_string(),
            bioc_min_ver,
        }
    }

    /// Discover all Bioconductor releases from the release-announcement page
    pub fn fetch_bioc_versions(&self) -> Result<BiocVersions> {
        let url = format!("{}/{}", self.bioc_mirror, RELEASE_PAGE);
        info!("Fetching Bioconductor releases from {}", url);
        let versions = BiocVersions::from_release_page(&self.client.get_text(&url)?)?;
        if versions.latest().is_none() {
            return Err(Error::ParseError(format!("No Bioconductor releases found at {url}")));
        }
        Ok(versions)
    }

    /// Mirror Bioconductor and CRAN metadata into `meta_path`
    pub fn sync(&self, meta_path: &Path) -> Result<SyncStats> {
        let versions = self.fetch_bioc_versions()?;
        let mut stats = self.sync_bioc(meta_path, &versions)?;

        info!("Downloading CRAN metadata...");
        let url = format!("{}/src/contrib/PACKAGES", self.cran_mirror);
        self.fetch_if_newer(&url, &paths::cran_packages_file(meta_path), "CRAN", &mut stats)?;

        info!(
            "Metadata sync complete: {} downloaded, {} up to date, {} failed",
            stats.downloaded, stats.up_to_date, stats.failed
        );
        Ok(stats)
    }

    /// Mirror Bioconductor indexes, refresh `packages/release` and the release list
    pub fn sync_bioc(&self, meta_path: &Path, versions: &BiocVersions) -> Result<SyncStats> {
        let latest = versions
            .latest()
            .ok_or_else(|| Error::NotFoundError("Bioconductor release list is empty".to_string()))?;
        let mut stats = SyncStats::default();

        for &category in paths::BIOC_CATEGORIES {
            // newest first; once one release is current, older ones are too
            for version in versions.at_least(self.bioc_min_ver) {
                let url = format!(
                    "{}/packages/{}/{}/src/contrib/PACKAGES",
                    self.bioc_mirror, version, category
                );
                let dest = paths::bioc_packages_file(meta_path, &version, category);
                let label = format!("Bioconductor {} {}", version, category);
                if !self.fetch_if_newer(&url, &dest, &label, &mut stats)? {
                    info!("Local index for Bioconductor {} and older is current, skip", version);
                    break;
                }
            }
        }

        copy_tree(
            &paths::bioc_release_dir(meta_path, &latest.to_string()),
            &paths::bioc_release_dir(meta_path, RELEASE_ALIAS),
        )?;
        fs::write(paths::bioc_version_file(meta_path), versions.to_list())?;

        Ok(stats)
    }

    /// Download `url` when it is newer than `dest`
    ///
    /// Returns false when the local copy is current. A failed download is
    /// logged and counted but does not stop the sync.
    fn fetch_if_newer(
        &self,
        url: &str,
        dest: &Path,
        label: &str,
        stats: &mut SyncStats,
    ) -> Result<bool> {
        if !self.client.remote_is_newer(url, dest)? {
            stats.up_to_date += 1;
            return Ok(false);
        }

        info!("Downloading {}...", label);
        match self.client.download_to_file(url, dest) {
            Ok(_) => stats.downloaded += 1,
            Err(e) => {
                error!("Failed to download index for {}: {}", label, e);
                stats.failed += 1;
            }
        }
        Ok(true)
    }
}

/// Read the release list, from the local mirror or a remote `bioc_version` file
pub fn load_bioc_versions(
    client: Option<&MirrorClient>,
    meta_path: &Path,
    bioc_meta_mirror: &str,
) -> Result<BiocVersions> {
    let local = paths::bioc_version_file(meta_path);
    if local.exists() {
        debug!("Reading Bioconductor releases from {}", local.display());
        return BiocVersions::parse_list(&fs::read_to_string(&local)?);
    }

    let client = client.ok_or_else(|| {
        Error::NotFoundError(format!(
            "{} (run 'bioarch-sync sync-meta' first)",
            local.display()
        ))
    })?;
    let url = format!(
        "{}/{}",
        bioc_meta_mirror.trim_end_matches('/'),
        paths::BIOC_VERSION_FILE
    );
    info!("Fetching Bioconductor releases from {}", url);
    BiocVersions::parse_list(&client.get_text(&url)?)
}

/// Recursively copy `src` over `dest`, overwriting files that exist
pub fn copy_tree(src: &Path, dest: &Path) -> Result<usize> {
    let mut copied = 0;
    if !src.exists() {
        return Ok(copied);
    }

    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| Error::IoError(format!("Failed to walk {}: {}", src.display(), e)))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| Error::IoError(e.to_string()))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_tree() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("packages/3.18");
        fs::create_dir_all(src.join("bioc/src/contrib")).unwrap();
        fs::write(src.join("bioc/src/contrib/PACKAGES"), "Package: limma\n").unwrap();

        let dest = dir.path().join("packages/release");
        fs::create_dir_all(dest.join("bioc/src/contrib")).unwrap();
        fs::write(dest.join("bioc/src/contrib/PACKAGES"), "stale").unwrap();

        assert_eq!(copy_tree(&src, &dest).unwrap(), 1);
        assert_eq!(
            fs::read_to_string(dest.join("bioc/src/contrib/PACKAGES")).unwrap(),
            "Package: limma\n"
        );
    }

    #[test]
    fn test_copy_tree_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(copy_tree(&dir.path().join("nope"), &dir.path().join("out")).unwrap(), 0);
    }

    #[test]
    fn test_load_bioc_versions_local() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(paths::bioc_version_file(dir.path()), "3.18,3.17,1.0").unwrap();
        let versions = load_bioc_versions(None, dir.path(), "https://example.invalid").unwrap();
        assert_eq!(versions.latest(), Some(BiocVersion::new(3, 18)));
        assert_eq!(versions.len(), 3);
    }

    #[test]
    fn test_load_bioc_versions_offline_without_mirror() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_bioc_versions(None, dir.path(), "https://example.invalid").unwrap_err();
        assert!(matches!(err, Error::NotFoundError(_)));
    }
}
