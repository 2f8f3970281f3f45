// src/dependencies/classes.rs

//! Dependency namespaces and normalized dependency names
//!
//! A PKGBUILD `depends` array mixes two kinds of entries: system packages
//! (`gcc-fortran`, `gsl`, `r`) and R packages from the ecosystem, which are
//! always spelled `r-<lowercase upstream name>`.

use std::fmt;

/// Prefix marking a dependency as an R ecosystem package
pub const ECOSYSTEM_MARKER: &str = "r-";

/// Package name of the R runtime itself
pub const RUNTIME_PACKAGE: &str = "r";

/// Which namespace a dependency name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyNamespace {
    /// Opaque distribution package name (`gcc-fortran`, `r`)
    System,
    /// R package packaged as `r-<name>`
    Ecosystem,
}

/// A normalized dependency name as it appears in a PKGBUILD
///
/// Ordering and equality are plain case-sensitive string comparisons.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DependencyName(String);

impl DependencyName {
    /// Wrap a name exactly as written in the recipe
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Map an upstream package name (`Rcpp`) to its ecosystem form (`r-rcpp`)
    pub fn from_upstream(name: &str) -> Self {
        Self(format!("{}{}", ECOSYSTEM_MARKER, name.to_lowercase()))
    }

    /// Normalize a user-supplied package name that may be either style
    ///
    /// `Rcpp` and `r-rcpp` both yield `r-rcpp`.
    pub fn from_any(name: &str) -> Self {
        let name = name.trim();
        if name.starts_with(ECOSYSTEM_MARKER) {
            Self(name.to_string())
        } else {
            Self::from_upstream(name)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn namespace(&self) -> DependencyNamespace {
        if self.0.starts_with(ECOSYSTEM_MARKER) {
            DependencyNamespace::Ecosystem
        } else {
            DependencyNamespace::System
        }
    }

    pub fn is_ecosystem(&self) -> bool {
        self.namespace() == DependencyNamespace::Ecosystem
    }

    /// True for names that would make a package depend on the R runtime
    /// through the ecosystem mapping (`r-r`) or the bare runtime token.
    pub fn is_runtime_self_reference(&self) -> bool {
        self.0 == RUNTIME_PACKAGE || self.0 == format!("{ECOSYSTEM_MARKER}{RUNTIME_PACKAGE}")
    }
}

impl fmt::Display for DependencyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DependencyName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for DependencyName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_upstream_lowercases() {
        assert_eq!(DependencyName::from_upstream("Rcpp").as_str(), "r-rcpp");
        assert_eq!(
            DependencyName::from_upstream("BiocGenerics").as_str(),
            "r-biocgenerics"
        );
    }

    #[test]
    fn test_from_any_accepts_both_styles() {
        assert_eq!(DependencyName::from_any("Rcpp").as_str(), "r-rcpp");
        assert_eq!(DependencyName::from_any("r-rcpp").as_str(), "r-rcpp");
        assert_eq!(DependencyName::from_any("  ggplot2\n").as_str(), "r-ggplot2");
    }

    #[test]
    fn test_namespace() {
        assert_eq!(
            DependencyName::new("gcc-fortran").namespace(),
            DependencyNamespace::System
        );
        assert_eq!(DependencyName::new("r").namespace(), DependencyNamespace::System);
        assert!(DependencyName::new("r-foo").is_ecosystem());
    }

    #[test]
    fn test_runtime_self_reference() {
        assert!(DependencyName::from_upstream("R").is_runtime_self_reference());
        assert!(DependencyName::new("r").is_runtime_self_reference());
        assert!(!DependencyName::new("r-rcpp").is_runtime_self_reference());
    }

    #[test]
    fn test_ordering_is_case_sensitive() {
        let mut names = vec![
            DependencyName::new("zlib"),
            DependencyName::new("Xorg"),
            DependencyName::new("gsl"),
        ];
        names.sort();
        let sorted: Vec<&str> = names.iter().map(|n| n.as_str()).collect();
        assert_eq!(sorted, vec!["Xorg", "gsl", "zlib"]);
    }
}
