// src/reconcile.rs

//! Dependency reconciliation
//!
//! Merges what upstream declares for a package with what its PKGBUILD
//! currently says:
//! - System dependencies in the recipe are kept as written
//! - R dependencies are replaced wholesale by the upstream hard dependencies
//! - Optional dependencies follow Suggests/Enhances, keeping the
//!   explanations a packager attached to entries that survive
//!
//! Reconciliation is pure: it never touches the document. The writer in
//! [`crate::recipe::RecipeWriter`] applies the result.

use crate::dependencies::{DependencyName, OptionalDependency};
use crate::descriptor::Descriptor;
use crate::error::Result;
use crate::index::{IndexEntry, MetadataIndex};
use crate::recipe::{RecipeDocument, RecipeSnapshot, RecipeState};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Outcome of reconciling one recipe against its upstream descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationResult {
    /// System entries (sorted) followed by R entries (sorted)
    pub depends: Vec<DependencyName>,
    /// Sorted by name, annotations re-attached
    pub optdepends: Vec<OptionalDependency>,
    pub depends_changed: bool,
    pub optdepends_changed: bool,
    /// Upstream names whose `r-` form was missing from the recipe
    pub added_dependencies: BTreeSet<String>,
}

impl ReconciliationResult {
    /// True when the recipe needs rewriting
    pub fn is_changed(&self) -> bool {
        self.depends_changed || self.optdepends_changed
    }

    /// The recipe state this result would produce once written
    pub fn to_state(&self) -> RecipeState {
        RecipeState {
            depends: self.depends.clone(),
            optdepends: self.optdepends.clone(),
            depends_region: None,
            optdepends_region: None,
        }
    }
}

/// Reconcile a recipe snapshot with an upstream descriptor
///
/// Fails with a locate error, without computing anything, when the snapshot
/// reports overlapping array regions.
pub fn reconcile(current: &RecipeState, descriptor: &Descriptor) -> Result<ReconciliationResult> {
    current.check_regions()?;

    let ecosystem_deps: BTreeSet<DependencyName> = descriptor
        .hard_deps
        .iter()
        .map(|name| DependencyName::from_upstream(name))
        .filter(|dep| !dep.is_runtime_self_reference())
        .collect();

    let mut depends: Vec<DependencyName> = current
        .depends
        .iter()
        .filter(|dep| !dep.is_ecosystem())
        .cloned()
        .collect();
    depends.sort();
    depends.extend(ecosystem_deps.iter().cloned());

    let depends_changed = sorted(&depends) != sorted(&current.depends);

    let added_dependencies: BTreeSet<String> = descriptor
        .hard_deps
        .iter()
        .filter(|name| {
            let dep = DependencyName::from_upstream(name);
            !dep.is_runtime_self_reference() && !current.depends.contains(&dep)
        })
        .cloned()
        .collect();

    let ecosystem_optdeps: BTreeSet<DependencyName> = descriptor
        .optional_deps
        .iter()
        .map(|name| DependencyName::from_upstream(name))
        .collect();

    let optdepends = merge_optional(&current.optdepends, &ecosystem_optdeps);

    let old_names: BTreeSet<&DependencyName> = current.optdepends.iter().map(|o| &o.name).collect();
    let new_names: BTreeSet<&DependencyName> = optdepends.iter().map(|o| &o.name).collect();
    let optdepends_changed = old_names != new_names;

    debug!(
        "Reconciled: {} depends (changed: {}), {} optdepends (changed: {}), {} added",
        depends.len(),
        depends_changed,
        optdepends.len(),
        optdepends_changed,
        added_dependencies.len()
    );

    Ok(ReconciliationResult {
        depends,
        optdepends,
        depends_changed,
        optdepends_changed,
        added_dependencies,
    })
}

/// Attach old annotations to the new optional dependency names
///
/// Annotations are only carried when the recipe already annotates at least
/// one entry; otherwise the new list is bare names.
fn merge_optional(
    current: &[OptionalDependency],
    names: &BTreeSet<DependencyName>,
) -> Vec<OptionalDependency> {
    let annotated = current.iter().any(OptionalDependency::has_annotation);
    if !annotated {
        return names.iter().cloned().map(OptionalDependency::bare).collect();
    }

    let annotations: HashMap<&DependencyName, &str> = current
        .iter()
        .filter(|entry| entry.has_annotation())
        .map(|entry| (&entry.name, entry.annotation.as_str()))
        .collect();

    names
        .iter()
        .map(|name| {
            let annotation = annotations.get(name).copied().unwrap_or_default();
            OptionalDependency::new(name.clone(), annotation)
        })
        .collect()
}

fn sorted(deps: &[DependencyName]) -> Vec<&DependencyName> {
    let mut refs: Vec<&DependencyName> = deps.iter().collect();
    refs.sort();
    refs
}

/// Everything learned about one recipe in a reconciliation pass
#[derive(Debug, Clone)]
pub struct ReconcilePlan {
    pub state: RecipeState,
    /// `None` when upstream no longer lists the package
    pub entry: Option<IndexEntry>,
    pub descriptor: Option<Descriptor>,
    pub result: Option<ReconciliationResult>,
}

impl ReconcilePlan {
    /// Upstream no longer carries this package
    pub fn is_missing_upstream(&self) -> bool {
        self.entry.is_none()
    }
}

/// Reconciler wired to a metadata index
pub struct Reconciler<'a> {
    index: &'a dyn MetadataIndex,
}

impl<'a> Reconciler<'a> {
    pub fn new(index: &'a dyn MetadataIndex) -> Self {
        Self { index }
    }

    /// Snapshot `doc`, look up `upstream_name` and reconcile
    ///
    /// A package absent from the index yields a plan without result rather
    /// than an error.
    pub fn plan(&self, doc: &RecipeDocument, upstream_name: &str) -> Result<ReconcilePlan> {
        let state = RecipeSnapshot::read(doc)?;

        let Some(entry) = self.index.get(upstream_name)? else {
            info!("{} not found in upstream metadata", upstream_name);
            return Ok(ReconcilePlan {
                state,
                entry: None,
                descriptor: None,
                result: None,
            });
        };

        let descriptor = Descriptor::parse(&entry.desc)?;
        let result = reconcile(&state, &descriptor)?;

        Ok(ReconcilePlan {
            state,
            entry: Some(entry),
            descriptor: Some(descriptor),
            result: Some(result),
        })
    }
}
