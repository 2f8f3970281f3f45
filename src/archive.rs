// src/archive.rs

//! Archival policy
//!
//! A package disappears from the current upstream listing when CRAN archives
//! it or when Bioconductor drops it from the newest release. Its recipe keeps
//! building as long as the sources point at the archive instead:
//!
//! - CRAN: `src/contrib/<file>` moves to `src/contrib/Archive/<pkg>/<file>`
//! - Bioconductor: `packages/release/...` is pinned to the last release that
//!   carried the package, e.g. `packages/3.17/...`
//!
//! When a CRAN package comes back, the rewrite is undone. These functions
//! only edit the in-memory documents; the batch driver decides what to save.

use crate::index::{IndexEntry, Origin};
use crate::recipe::{LilacDocument, RecipeDocument};
use crate::version::{BiocVersion, BiocVersions};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

const CRAN_HOST: &str = "cran.r-project.org";
const BIOC_HOST: &str = "//bioconductor.org";
const CRAN_CONTRIB: &str = "src/contrib";
const CRAN_ARCHIVE: &str = "src/contrib/Archive/${_pkgname}";

/// Whether upstream no longer carries the package in its current listing
///
/// True when the package is absent, or is a Bioconductor package last seen
/// in a release other than the newest.
pub fn is_archived(entry: Option<&IndexEntry>, versions: &BiocVersions) -> bool {
    let Some(entry) = entry else {
        return true;
    };
    match (entry.origin, entry.bioc_ver) {
        (Origin::Bioc, Some(version)) => versions.latest() != Some(version),
        _ => false,
    }
}

/// Point the `update_on` url of an archived package at the archive
pub fn archive_lilac(lilac: &mut LilacDocument, bioc_ver: Option<BiocVersion>) -> bool {
    let Some(url) = lilac.update_on_url().map(str::to_string) else {
        return false;
    };

    let archive_url = if url.contains(CRAN_HOST) {
        Some(format!("https://{}/src/contrib/Archive/{}", CRAN_HOST, url_package(&url)))
    } else if url.contains(BIOC_HOST) {
        bioc_ver.map(|ver| url.replace("release", &ver.to_string()))
    } else {
        None
    };

    match archive_url {
        Some(archive_url) => {
            debug!("update_on url {} -> {}", url, archive_url);
            lilac.set_update_on_url(&archive_url)
        }
        None => false,
    }
}

/// Rewrite `url=` and the `source` array to archive locations
///
/// Returns whether anything changed.
pub fn archive_pkgbuild(doc: &mut RecipeDocument, bioc_ver: Option<BiocVersion>) -> bool {
    let mut changed = false;

    if let Some(ver) = bioc_ver {
        if let Some(index) = doc.find_line(|line| line.trim_start().starts_with("url=")) {
            let line = &doc.lines()[index];
            if line.contains(BIOC_HOST) && !pinned_release().is_match(line) {
                let updated = if line.contains("packages/release/") {
                    line.replacen("packages/release/", &format!("packages/{}/", ver), 1)
                } else {
                    line.replacen("packages/", &format!("packages/{}/", ver), 1)
                };
                changed |= replace_line(doc, index, updated);
            }
        }
    }

    for index in source_lines(doc) {
        let line = &doc.lines()[index];
        let updated = if line.contains(CRAN_HOST) && !line.contains("src/contrib/Archive") {
            line.replace(CRAN_CONTRIB, CRAN_ARCHIVE)
        } else if line.contains(BIOC_HOST) {
            match bioc_ver {
                Some(ver) => line.replace("packages/release/bioc", &format!("packages/{}/bioc", ver)),
                None => continue,
            }
        } else {
            continue;
        };
        changed |= replace_line(doc, index, updated);
    }

    changed
}

/// Undo the CRAN archive rewrite of the `source` array
pub fn unarchive_cran_pkgbuild(doc: &mut RecipeDocument) -> bool {
    let mut changed = false;
    for index in source_lines(doc) {
        let line = &doc.lines()[index];
        if line.contains(CRAN_ARCHIVE) {
            let updated = line.replace(CRAN_ARCHIVE, CRAN_CONTRIB);
            changed |= replace_line(doc, index, updated);
        }
    }
    changed
}

/// Point a CRAN `update_on` url back at the package page
pub fn unarchive_cran_lilac(lilac: &mut LilacDocument) -> bool {
    let Some(url) = lilac.update_on_url().map(str::to_string) else {
        return false;
    };
    if !url.contains(CRAN_HOST) {
        return false;
    }
    lilac.set_update_on_url(&format!("https://{}/package={}", CRAN_HOST, url_package(&url)))
}

/// Last segment of a package url (`.../Archive/pkg/` or `...package=pkg`)
fn url_package(url: &str) -> &str {
    url.trim_end_matches('/')
        .rsplit(['/', '='])
        .next()
        .unwrap_or_default()
}

fn pinned_release() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"packages/[\d.]+").expect("Invalid release regex"))
}

/// Line indices of the `source` array
fn source_lines(doc: &RecipeDocument) -> std::ops::Range<usize> {
    match doc.locate_array("source") {
        Ok(Some(region)) => region.span.start..region.span.end + 1,
        _ => 0..0,
    }
}

fn replace_line(doc: &mut RecipeDocument, index: usize, updated: String) -> bool {
    if doc.lines()[index] == updated {
        return false;
    }
    doc.set_line(index, updated);
    true
}
