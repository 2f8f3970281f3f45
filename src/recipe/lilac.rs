// src/recipe/lilac.rs

//! lilac.yaml build-bot descriptors
//!
//! Each recipe directory carries a `lilac.yaml` next to its PKGBUILD:
//!
//! ```yaml
//! maintainers:
//!   - github: someone
//! build_prefix: extra-x86_64
//! repo_depends:
//!   - gsl
//!   - r-limma
//! update_on:
//!   - source: rpkgs
//!     pkgname: edgeR
//!   - url: https://bioconductor.org/packages/release/bioc/html/edgeR.html
//! ```
//!
//! The document is held as a [`serde_yaml::Value`]; mappings keep their key
//! order, so rewriting only changes the keys that were edited (comments and
//! quoting style are not preserved).

use super::document::write_atomic;
use crate::dependencies::DependencyName;
use crate::error::{Error, Result};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

pub const REPO_DEPENDS_KEY: &str = "repo_depends";
pub const UPDATE_ON_KEY: &str = "update_on";
const URL_KEY: &str = "url";

/// A parsed lilac.yaml
#[derive(Debug, Clone, PartialEq)]
pub struct LilacDocument {
    root: Mapping,
}

impl LilacDocument {
    /// Parse YAML text; the top level must be a mapping
    pub fn parse(text: &str) -> Result<Self> {
        match serde_yaml::from_str::<Value>(text)? {
            Value::Mapping(root) => Ok(Self { root }),
            Value::Null => Ok(Self { root: Mapping::new() }),
            _ => Err(Error::ParseError(
                "lilac.yaml top level is not a mapping".to_string(),
            )),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFoundError(path.display().to_string())
            } else {
                Error::IoError(format!("Failed to read {}: {}", path.display(), e))
            }
        })?;
        Self::parse(&text)
    }

    pub fn to_text(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.root)?)
    }

    /// Write atomically to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, self.to_text()?.as_bytes())
    }

    /// Plain string entries of `repo_depends`
    pub fn repo_depends(&self) -> Vec<String> {
        self.root
            .get(REPO_DEPENDS_KEY)
            .and_then(Value::as_sequence)
            .map(|seq| seq.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Align `repo_depends` with a reconciled depends list
    ///
    /// The new list is the old system entries still present in
    /// `new_depends`, sorted, followed by the sorted R entries of
    /// `new_depends`. Entries that are not plain strings are kept in front.
    /// When the new list would be empty the key is left untouched. Returns
    /// whether the document changed.
    pub fn update_repo_depends(&mut self, new_depends: &[DependencyName]) -> bool {
        let old: Vec<Value> = self
            .root
            .get(REPO_DEPENDS_KEY)
            .and_then(Value::as_sequence)
            .cloned()
            .unwrap_or_default();

        let mut system: Vec<&str> = old
            .iter()
            .filter_map(Value::as_str)
            .filter(|name| !DependencyName::new(*name).is_ecosystem())
            .filter(|name| new_depends.iter().any(|dep| dep.as_str() == *name))
            .collect();
        system.sort();

        let mut ecosystem: Vec<&str> = new_depends
            .iter()
            .filter(|dep| dep.is_ecosystem())
            .map(DependencyName::as_str)
            .collect();
        ecosystem.sort();

        if system.is_empty() && ecosystem.is_empty() {
            return false;
        }

        let updated: Vec<Value> = old
            .iter()
            .filter(|value| value.as_str().is_none())
            .cloned()
            .chain(system.into_iter().chain(ecosystem).map(|name| Value::String(name.to_string())))
            .collect();

        if updated == old {
            return false;
        }
        self.root
            .insert(Value::String(REPO_DEPENDS_KEY.to_string()), Value::Sequence(updated));
        true
    }

    /// The first `url` entry of `update_on`
    pub fn update_on_url(&self) -> Option<&str> {
        self.update_on_entries()
            .into_iter()
            .flatten()
            .find_map(|entry| entry.get(URL_KEY))
            .and_then(Value::as_str)
    }

    /// Replace the first `url` entry of `update_on`
    ///
    /// Returns false when there is no such entry or the url is unchanged.
    pub fn set_update_on_url(&mut self, url: &str) -> bool {
        let Some(entries) = self
            .root
            .get_mut(UPDATE_ON_KEY)
            .and_then(Value::as_sequence_mut)
        else {
            return false;
        };

        for entry in entries.iter_mut() {
            if let Some(current) = entry.get_mut(URL_KEY) {
                if current.as_str() == Some(url) {
                    return false;
                }
                *current = Value::String(url.to_string());
                return true;
            }
        }
        false
    }

    fn update_on_entries(&self) -> Option<&Vec<Value>> {
        self.root.get(UPDATE_ON_KEY).and_then(Value::as_sequence)
    }
}
