// src/dependencies/optional.rs

//! Optional dependency entries (`optdepends`)
//!
//! PKGBUILD optional dependencies carry a human-written explanation after a
//! colon: `'r-knitr: for building vignettes'`.

use super::classes::DependencyName;
use std::fmt;

/// One `optdepends` entry, name plus optional annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalDependency {
    pub name: DependencyName,
    /// Free text after the colon, trimmed; empty when absent
    pub annotation: String,
}

impl OptionalDependency {
    pub fn new(name: DependencyName, annotation: impl Into<String>) -> Self {
        Self {
            name,
            annotation: annotation.into(),
        }
    }

    /// An entry without annotation
    pub fn bare(name: DependencyName) -> Self {
        Self::new(name, String::new())
    }

    /// Parse `name` or `name: annotation`
    ///
    /// Only the first colon separates; annotations may contain further colons.
    pub fn parse(entry: &str) -> Self {
        match entry.split_once(':') {
            Some((name, annotation)) => Self::new(
                DependencyName::new(name.trim()),
                annotation.trim().to_string(),
            ),
            None => Self::bare(DependencyName::new(entry.trim())),
        }
    }

    pub fn has_annotation(&self) -> bool {
        !self.annotation.is_empty()
    }
}

impl fmt::Display for OptionalDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_annotation() {
            write!(f, "{}: {}", self.name, self.annotation)
        } else {
            write!(f, "{}", self.name)
        }
    }
}
