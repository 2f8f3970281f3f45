// src/version/mod.rs

//! Bioconductor release versions
//!
//! Bioconductor releases are numbered `major.minor` (`3.9`, `3.18`) and must
//! be compared numerically, not as strings or floats.

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Releases before 2.0 that the release-announcement page no longer links
const LEGACY_MINORS: std::ops::RangeInclusive<u32> = 0..=7;

/// A Bioconductor release number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BiocVersion {
    pub major: u32,
    pub minor: u32,
}

impl BiocVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse `major.minor`
    ///
    /// Examples:
    /// - "3.18" → 3.18
    /// - "3.0" → 3.0
    /// - " 2.14 " → 2.14
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (major, minor) = s
            .split_once('.')
            .ok_or_else(|| Error::ParseError(format!("Invalid Bioconductor version '{}'", s)))?;

        let major = major
            .parse::<u32>()
            .map_err(|e| Error::ParseError(format!("Invalid major in version '{}': {}", s, e)))?;
        let minor = minor
            .parse::<u32>()
            .map_err(|e| Error::ParseError(format!("Invalid minor in version '{}': {}", s, e)))?;

        Ok(Self { major, minor })
    }
}

impl FromStr for BiocVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for BiocVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// The set of known Bioconductor releases, newest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BiocVersions {
    versions: Vec<BiocVersion>,
}

impl BiocVersions {
    pub fn new(mut versions: Vec<BiocVersion>) -> Self {
        versions.sort_by(|a, b| b.cmp(a));
        versions.dedup();
        Self { versions }
    }

    /// Parse the comma-separated `bioc_version` file
    pub fn parse_list(text: &str) -> Result<Self> {
        let versions = text
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(BiocVersion::parse)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(versions))
    }

    /// Extract releases linked from the Bioconductor release-announcement page
    ///
    /// The page links every release as `/packages/<ver>/`; releases 1.0 to
    /// 1.7 are not linked and are appended.
    pub fn from_release_page(html: &str) -> Result<Self> {
        let re = Regex::new(r"/packages/(\d+\.\d+)/")
            .map_err(|e| Error::ParseError(e.to_string()))?;

        let mut versions = re
            .captures_iter(html)
            .filter_map(|caps| caps.get(1))
            .map(|m| BiocVersion::parse(m.as_str()))
            .collect::<Result<Vec<_>>>()?;
        versions.extend(LEGACY_MINORS.map(|minor| BiocVersion::new(1, minor)));

        Ok(Self::new(versions))
    }

    /// Render as the comma-separated `bioc_version` file
    pub fn to_list(&self) -> String {
        self.versions
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Newest release
    pub fn latest(&self) -> Option<BiocVersion> {
        self.versions.first().copied()
    }

    pub fn contains(&self, version: &BiocVersion) -> bool {
        self.versions.contains(version)
    }

    /// Releases not older than `min`, newest first
    pub fn at_least(&self, min: BiocVersion) -> impl Iterator<Item = BiocVersion> + '_ {
        self.versions.iter().copied().filter(move |v| *v >= min)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BiocVersion> {
        self.versions.iter()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(BiocVersion::parse("3.18").unwrap(), BiocVersion::new(3, 18));
        assert_eq!(" 2.14 ".parse::<BiocVersion>().unwrap(), BiocVersion::new(2, 14));
        assert!(BiocVersion::parse("3").is_err());
        assert!(BiocVersion::parse("release").is_err());
    }

    #[test]
    fn test_numeric_ordering() {
        assert!(BiocVersion::parse("3.10").unwrap() > BiocVersion::parse("3.9").unwrap());
        assert!(BiocVersion::parse("3.0").unwrap() > BiocVersion::parse("2.14").unwrap());
    }

    #[test]
    fn test_display() {
        assert_eq!(BiocVersion::new(3, 0).to_string(), "3.0");
    }

    #[test]
    fn test_list_round_trip() {
        let versions = BiocVersions::parse_list("3.17,3.18,3.9, 3.10\n").unwrap();
        assert_eq!(versions.latest(), Some(BiocVersion::new(3, 18)));
        assert_eq!(versions.to_list(), "3.18,3.17,3.10,3.9");
    }

    #[test]
    fn test_from_release_page() {
        let html = r#"<a href="/packages/3.18/">3.18</a> <a href="/packages/3.17/">3.17</a>
            <a href="/packages/3.18/">again</a>"#;
        let versions = BiocVersions::from_release_page(html).unwrap();
        assert_eq!(versions.latest(), Some(BiocVersion::new(3, 18)));
        assert_eq!(versions.len(), 2 + 8);
        assert!(versions.contains(&BiocVersion::new(1, 0)));
    }

    #[test]
    fn test_at_least() {
        let versions = BiocVersions::parse_list("2.14,3.0,3.1").unwrap();
        let kept: Vec<String> = versions
            .at_least(BiocVersion::new(3, 0))
            .map(|v| v.to_string())
            .collect();
        assert_eq!(kept, vec!["3.1", "3.0"]);
    }
}
