// src/descriptor.rs

//! Upstream package descriptor parser
//!
//! CRAN and Bioconductor describe every package with a DCF block, the same
//! `Key: value` format used by `DESCRIPTION` files and `PACKAGES` indexes:
//!
//! ```text
//! Package: edgeR
//! Version: 4.0.2
//! Depends: R (>= 3.6.0), limma (>= 3.41.5)
//! Imports: methods, graphics, stats, utils, locfit, Rcpp
//! LinkingTo: Rcpp
//! Suggests: jsonlite, readr, rhdf5, SeuratObject
//! NeedsCompilation: yes
//! ```
//!
//! Long values continue on indented lines. Keys are matched
//! case-insensitively and unknown keys are ignored.

use crate::error::{Error, Result};
use std::collections::{BTreeSet, HashMap};

/// Packages shipped with R itself; never turned into explicit dependencies
pub const EXCLUDED_PACKAGES: &[&str] = &[
    "base",
    "compiler",
    "datasets",
    "graphics",
    "grDevices",
    "grid",
    "methods",
    "parallel",
    "splines",
    "stats",
    "stats4",
    "tcltk",
    "tools",
    "utils",
];

/// Fields contributing hard dependencies
const HARD_DEPENDENCY_FIELDS: &[&str] = &["depends", "imports", "linkingto"];

/// Fields contributing optional dependencies
const OPTIONAL_DEPENDENCY_FIELDS: &[&str] = &["suggests", "enhances"];

/// Raw fields of one DCF block, keyed by lowercased field name
#[derive(Debug, Clone, Default)]
pub struct DcfFields {
    fields: HashMap<String, String>,
}

impl DcfFields {
    /// Split a DCF block into fields
    ///
    /// Continuation lines (leading whitespace) are appended to the previous
    /// value. A line that neither continues a value nor contains a colon is
    /// rejected.
    pub fn parse(text: &str) -> Result<Self> {
        let mut fields: HashMap<String, String> = HashMap::new();
        let mut current: Option<String> = None;

        for (lineno, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            if line.starts_with(char::is_whitespace) {
                let key = current.as_ref().ok_or_else(|| {
                    Error::ParseError(format!(
                        "line {}: continuation line before any field",
                        lineno + 1
                    ))
                })?;
                if let Some(value) = fields.get_mut(key) {
                    value.push('\n');
                    value.push_str(line.trim());
                }
                continue;
            }

            let (key, value) = line.split_once(':').ok_or_else(|| {
                Error::ParseError(format!("line {}: expected 'Key: value', got '{}'", lineno + 1, line))
            })?;
            let key = key.trim().to_lowercase();
            if key.is_empty() {
                return Err(Error::ParseError(format!("line {}: empty field name", lineno + 1)));
            }
            fields.insert(key.clone(), value.trim().to_string());
            current = Some(key);
        }

        Ok(Self { fields })
    }

    /// Look up a field by name (case-insensitive)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(&key.to_lowercase()).map(String::as_str)
    }

    /// The `Package:` field, required for index records
    pub fn package(&self) -> Result<&str> {
        self.get("package")
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::ParseError("missing 'Package:' field".to_string()))
    }
}

/// Parsed dependency information for one upstream package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
    pub version: Option<String>,
    /// Depends ∪ Imports ∪ LinkingTo, minus [`EXCLUDED_PACKAGES`]
    pub hard_deps: BTreeSet<String>,
    /// Suggests ∪ Enhances, not filtered
    pub optional_deps: BTreeSet<String>,
    /// `NeedsCompilation`, when the field is present
    pub needs_compilation: Option<bool>,
}

impl Descriptor {
    /// Parse a descriptor block
    pub fn parse(text: &str) -> Result<Self> {
        let fields = DcfFields::parse(text)?;
        Ok(Self::from_fields(&fields))
    }

    /// Build a descriptor from already split fields
    pub fn from_fields(fields: &DcfFields) -> Self {
        let mut hard_deps = collect_relations(fields, HARD_DEPENDENCY_FIELDS);
        hard_deps.retain(|name| !EXCLUDED_PACKAGES.contains(&name.as_str()));

        // Suggests/Enhances deliberately keep base packages
        let optional_deps = collect_relations(fields, OPTIONAL_DEPENDENCY_FIELDS);

        let needs_compilation = fields
            .get("needscompilation")
            .and_then(|v| match v.to_lowercase().as_str() {
                "yes" => Some(true),
                "no" => Some(false),
                _ => None,
            });

        Self {
            version: fields.get("version").map(str::to_string),
            hard_deps,
            optional_deps,
            needs_compilation,
        }
    }
}

/// Names listed in a relation field, version constraints stripped
///
/// `"Rcpp (>= 1.0), \n methods,"` yields `["Rcpp", "methods"]`.
pub fn relation_names(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(',')
        .map(|token| token.split('(').next().unwrap_or_default().trim())
        .filter(|name| !name.is_empty())
}

fn collect_relations(fields: &DcfFields, keys: &[&str]) -> BTreeSet<String> {
    keys.iter()
        .filter_map(|key| fields.get(key))
        .flat_map(relation_names)
        .map(str::to_string)
        .collect()
}
