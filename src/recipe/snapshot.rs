// src/recipe/snapshot.rs

//! Current dependency declarations of a recipe

use super::document::{LineSpan, RecipeDocument};
use crate::dependencies::{DependencyName, OptionalDependency};
use crate::error::{Error, Result};

pub const DEPENDS_FIELD: &str = "depends";
pub const OPTDEPENDS_FIELD: &str = "optdepends";

/// Dependencies declared by a recipe, with where they live in the document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeState {
    pub depends: Vec<DependencyName>,
    pub optdepends: Vec<OptionalDependency>,
    pub depends_region: Option<LineSpan>,
    pub optdepends_region: Option<LineSpan>,
}

impl RecipeState {
    /// State with no document behind it, mostly useful in tests
    pub fn from_lists(depends: &[&str], optdepends: &[&str]) -> Self {
        Self {
            depends: depends.iter().map(|d| DependencyName::new(*d)).collect(),
            optdepends: optdepends.iter().map(|d| OptionalDependency::parse(d)).collect(),
            depends_region: None,
            optdepends_region: None,
        }
    }

    /// Fail when both regions are known and share a line
    pub fn check_regions(&self) -> Result<()> {
        if let (Some(deps), Some(opts)) = (self.depends_region, self.optdepends_region) {
            if deps.overlaps(&opts) {
                return Err(Error::locate(
                    DEPENDS_FIELD,
                    format!(
                        "lines {}..={} overlap optdepends at lines {}..={}",
                        deps.start + 1,
                        deps.end + 1,
                        opts.start + 1,
                        opts.end + 1
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// Reads [`RecipeState`] out of a PKGBUILD document
pub struct RecipeSnapshot;

impl RecipeSnapshot {
    /// Extract `depends` and `optdepends`
    ///
    /// A missing array reads as empty. Ambiguous or overlapping arrays are a
    /// [`Error::LocateError`].
    pub fn read(doc: &RecipeDocument) -> Result<RecipeState> {
        let depends = doc.locate_array(DEPENDS_FIELD)?;
        let optdepends = doc.locate_array(OPTDEPENDS_FIELD)?;

        let state = RecipeState {
            depends: depends
                .as_ref()
                .map(|r| {
                    r.items
                        .iter()
                        .filter(|item| !item.trim().is_empty())
                        .map(|item| DependencyName::new(item.trim()))
                        .collect()
                })
                .unwrap_or_default(),
            optdepends: optdepends
                .as_ref()
                .map(|r| {
                    r.items
                        .iter()
                        .filter(|item| !item.trim().is_empty())
                        .map(|item| OptionalDependency::parse(item))
                        .collect()
                })
                .unwrap_or_default(),
            depends_region: depends.map(|r| r.span),
            optdepends_region: optdepends.map(|r| r.span),
        };

        state.check_regions()?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_both_arrays() {
        let doc = RecipeDocument::parse(
            "depends=(\n  r\n  gsl\n  r-rcpp\n)\noptdepends=(\n  'r-knitr: vignettes'\n  r-testthat\n)\n",
        );
        let state = RecipeSnapshot::read(&doc).unwrap();
        let deps: Vec<&str> = state.depends.iter().map(|d| d.as_str()).collect();
        assert_eq!(deps, vec!["r", "gsl", "r-rcpp"]);
        assert_eq!(state.optdepends.len(), 2);
        assert_eq!(state.optdepends[0].annotation, "vignettes");
        assert!(!state.optdepends[1].has_annotation());
        assert_eq!(state.depends_region, Some(LineSpan::new(0, 4)));
        assert_eq!(state.optdepends_region, Some(LineSpan::new(5, 8)));
    }

    #[test]
    fn test_missing_arrays_read_empty() {
        let doc = RecipeDocument::parse("pkgname=r-foo\n");
        let state = RecipeSnapshot::read(&doc).unwrap();
        assert!(state.depends.is_empty());
        assert!(state.optdepends.is_empty());
        assert!(state.depends_region.is_none());
    }

    #[test]
    fn test_overlapping_regions_are_rejected() {
        // depends is never closed on its own line, so its scan runs into optdepends
        let doc = RecipeDocument::parse("depends=(r\noptdepends=('r-a')\n");
        let err = RecipeSnapshot::read(&doc).unwrap_err();
        assert!(matches!(err, Error::LocateError { .. }));
    }

    #[test]
    fn test_check_regions() {
        let mut state = RecipeState::from_lists(&["r"], &[]);
        state.depends_region = Some(LineSpan::new(2, 5));
        state.optdepends_region = Some(LineSpan::new(6, 6));
        assert!(state.check_regions().is_ok());
        state.optdepends_region = Some(LineSpan::new(5, 7));
        assert!(state.check_regions().is_err());
    }
}
