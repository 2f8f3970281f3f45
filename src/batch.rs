// src/batch.rs

//! Batch driver over a recipe tree
//!
//! Takes a list of package names, either upstream style (`Rcpp`) or recipe
//! style (`r-rcpp`), and processes each recipe directory under the tree
//! root independently:
//!
//! 1. Load `PKGBUILD` and `lilac.yaml` into memory
//! 2. Look up the upstream descriptor by `_pkgname` and reconcile
//! 3. Write the arrays, switch `arch`, refresh `repo_depends`
//! 4. Archive or unarchive source urls
//! 5. If the PKGBUILD text changed, bump `pkgrel` and save both files;
//!    otherwise discard every edit
//!
//! A failing package is reported and leaves its files untouched; the batch
//! carries on with the rest.

use crate::archive;
use crate::dependencies::DependencyName;
use crate::error::{Error, Result};
use crate::index::MetadataIndex;
use crate::reconcile::Reconciler;
use crate::recipe::{
    pkgbuild, LilacDocument, RecipeDocument, RecipeWriter, LILAC_FILE, PKGBUILD_FILE,
};
use crate::version::{BiocVersion, BiocVersions};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Options for [`run_batch`]
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Root of the recipe tree
    pub bioarch_path: PathBuf,
    /// Rewrite sources of packages upstream no longer lists
    pub auto_archive: bool,
    /// Undo CRAN archive rewrites of packages upstream lists again
    pub auto_unarchive: bool,
    /// Worker threads (0 = one per CPU, 1 = sequential)
    pub jobs: usize,
    /// Compute everything but write nothing
    pub dry_run: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            bioarch_path: PathBuf::from("BioArchLinux"),
            auto_archive: false,
            auto_unarchive: true,
            jobs: 1,
            dry_run: false,
        }
    }
}

/// What happened to one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageStatus {
    /// PKGBUILD changed (and was written unless dry run)
    Updated { pkgrel: u32 },
    Unchanged,
    Failed(String),
}

/// Result of processing one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOutcome {
    /// Recipe directory name (`r-rcpp`)
    pub name: String,
    pub status: PackageStatus,
    /// Archive rewrites were applied
    pub archived: bool,
    /// Upstream names newly required by this package
    pub added_dependencies: BTreeSet<String>,
}

impl PackageOutcome {
    fn failed(name: &str, error: &Error) -> Self {
        Self {
            name: name.to_string(),
            status: PackageStatus::Failed(error.to_string()),
            archived: false,
            added_dependencies: BTreeSet::new(),
        }
    }
}

/// Summary of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
    pub archived: Vec<String>,
    /// Package and error message
    pub failed: Vec<(String, String)>,
    /// Union of all packages' added dependencies, sorted
    pub added_dependencies: BTreeSet<String>,
}

impl BatchReport {
    pub fn from_outcomes(outcomes: Vec<PackageOutcome>) -> Self {
        let mut report = Self::default();
        for outcome in outcomes {
            if outcome.archived {
                report.archived.push(outcome.name.clone());
            }
            report.added_dependencies.extend(outcome.added_dependencies);
            match outcome.status {
                PackageStatus::Updated { .. } => report.updated.push(outcome.name),
                PackageStatus::Unchanged => report.unchanged.push(outcome.name),
                PackageStatus::Failed(message) => report.failed.push((outcome.name, message)),
            }
        }
        report
    }

    pub fn total(&self) -> usize {
        self.updated.len() + self.unchanged.len() + self.failed.len()
    }

    /// Newline-separated added dependencies, as written to the output file
    pub fn added_dependencies_text(&self) -> String {
        self.added_dependencies
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn write_added_dependencies(&self, path: &Path) -> Result<()> {
        fs::write(path, self.added_dependencies_text()).map_err(|e| {
            Error::IoError(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}

/// Parse a package list: one name per line, blank lines and `#` comments skipped
pub fn read_package_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Recipe directory name for a listed package
pub fn recipe_dir_name(name: &str) -> String {
    DependencyName::from_any(name).as_str().to_string()
}

/// PKGBUILD and lilac.yaml of one recipe, held in memory
#[derive(Debug, Clone)]
pub struct RecipeFiles {
    pub dir: PathBuf,
    pub pkgbuild: RecipeDocument,
    /// `None` when the recipe has no lilac.yaml
    pub lilac: Option<LilacDocument>,
}

impl RecipeFiles {
    /// Load the recipe of `name` under `root`
    pub fn open(root: &Path, name: &str) -> Result<Self> {
        let dir = root.join(recipe_dir_name(name));
        if !dir.is_dir() {
            return Err(Error::NotFoundError(format!(
                "recipe directory {}",
                dir.display()
            )));
        }

        let pkgbuild = RecipeDocument::load(&dir.join(PKGBUILD_FILE))?;
        let lilac_path = dir.join(LILAC_FILE);
        let lilac = if lilac_path.exists() {
            Some(LilacDocument::load(&lilac_path)?)
        } else {
            debug!("{} has no {}", dir.display(), LILAC_FILE);
            None
        };

        Ok(Self { dir, pkgbuild, lilac })
    }

    pub fn pkgbuild_path(&self) -> PathBuf {
        self.dir.join(PKGBUILD_FILE)
    }

    pub fn lilac_path(&self) -> PathBuf {
        self.dir.join(LILAC_FILE)
    }

    /// Write both files; the PKGBUILD goes last
    pub fn save(&self) -> Result<()> {
        if let Some(lilac) = &self.lilac {
            lilac.save(&self.lilac_path())?;
        }
        self.pkgbuild.save(&self.pkgbuild_path())
    }
}

/// Reconcile, archive and bump one package
pub fn update_package(
    index: &dyn MetadataIndex,
    versions: &BiocVersions,
    options: &BatchOptions,
    name: &str,
) -> Result<PackageOutcome> {
    let mut files = RecipeFiles::open(&options.bioarch_path, name)?;
    let original = files.pkgbuild.to_text();

    let upstream = pkgbuild::upstream_name(&files.pkgbuild)
        .ok_or_else(|| Error::locate("_pkgname", "no upstream name assignment"))?;
    let plan = Reconciler::new(index).plan(&files.pkgbuild, &upstream)?;

    let mut added_dependencies = BTreeSet::new();
    if let Some(result) = &plan.result {
        if RecipeWriter::apply(&mut files.pkgbuild, result)? {
            let needs_compilation = plan.descriptor.as_ref().and_then(|d| d.needs_compilation);
            if let Some(needs_compilation) = needs_compilation {
                pkgbuild::set_arch(&mut files.pkgbuild, needs_compilation)?;
            }
        }
        if let Some(lilac) = files.lilac.as_mut() {
            lilac.update_repo_depends(&result.depends);
        }
        added_dependencies = result.added_dependencies.clone();
    }

    let archived = options.auto_archive && archive::is_archived(plan.entry.as_ref(), versions);
    if archived {
        let bioc_ver = plan.entry.as_ref().and_then(|e| e.bioc_ver);
        info!("{} is archived upstream", upstream);
        if let Some(lilac) = files.lilac.as_mut() {
            archive::archive_lilac(lilac, bioc_ver);
        }
        archive::archive_pkgbuild(&mut files.pkgbuild, bioc_ver);
    }

    if options.auto_unarchive && plan.entry.is_some() {
        if let Some(lilac) = files.lilac.as_mut() {
            archive::unarchive_cran_lilac(lilac);
        }
        archive::unarchive_cran_pkgbuild(&mut files.pkgbuild);
    }

    let status = if files.pkgbuild.to_text() != original {
        let pkgrel = pkgbuild::bump_pkgrel(&mut files.pkgbuild, 1)?;
        if options.dry_run {
            info!("Would update {} (pkgrel {})", files.dir.display(), pkgrel);
        } else {
            files.save()?;
            info!("Updated {} (pkgrel {})", files.dir.display(), pkgrel);
        }
        PackageStatus::Updated { pkgrel }
    } else {
        debug!("No changes to {}", files.dir.display());
        PackageStatus::Unchanged
    };

    Ok(PackageOutcome {
        name: recipe_dir_name(name),
        status,
        archived,
        added_dependencies,
    })
}

/// Process every listed package
///
/// Names resolving to the same recipe directory are processed once.
/// `on_done` is called after each package, from the worker that ran it.
pub fn run_batch<F>(
    index: &dyn MetadataIndex,
    versions: &BiocVersions,
    options: &BatchOptions,
    names: &[String],
    on_done: F,
) -> Result<BatchReport>
where
    F: Fn(&PackageOutcome) + Sync,
{
    let mut seen = HashSet::new();
    let names: Vec<&String> = names
        .iter()
        .filter(|name| seen.insert(recipe_dir_name(name)))
        .collect();
    info!(
        "Updating {} packages using {}",
        names.len(),
        index.describe()
    );

    let process = |name: &&String| {
        let outcome = match update_package(index, versions, options, name) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Failed to update {}: {}", name, e);
                PackageOutcome::failed(&recipe_dir_name(name), &e)
            }
        };
        on_done(&outcome);
        outcome
    };

    let outcomes: Vec<PackageOutcome> = match options.jobs {
        1 => names.iter().map(process).collect(),
        0 => names.par_iter().map(process).collect(),
        jobs => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .map_err(|e| Error::InitError(format!("Failed to build thread pool: {}", e)))?;
            pool.install(|| names.par_iter().map(process).collect())
        }
    };

    let report = BatchReport::from_outcomes(outcomes);
    if !report.failed.is_empty() {
        warn!("{} of {} packages failed", report.failed.len(), report.total());
    }
    Ok(report)
}

/// Pin an archived package's sources to `bioc_ver` and bump `pkgrel`
///
/// lilac.yaml is saved whenever its url changed; the PKGBUILD only when its
/// sources changed. Returns whether the PKGBUILD changed.
pub fn archive_package(
    root: &Path,
    name: &str,
    bioc_ver: BiocVersion,
    dry_run: bool,
) -> Result<bool> {
    let mut files = RecipeFiles::open(root, name)?;

    let lilac_changed = match files.lilac.as_mut() {
        Some(lilac) => archive::archive_lilac(lilac, Some(bioc_ver)),
        None => false,
    };
    let pkgbuild_changed = archive::archive_pkgbuild(&mut files.pkgbuild, Some(bioc_ver));
    if pkgbuild_changed {
        pkgbuild::bump_pkgrel(&mut files.pkgbuild, 1)?;
    }

    if dry_run {
        return Ok(pkgbuild_changed);
    }
    if lilac_changed {
        if let Some(lilac) = &files.lilac {
            lilac.save(&files.lilac_path())?;
        }
    }
    if pkgbuild_changed {
        files.pkgbuild.save(&files.pkgbuild_path())?;
    }
    Ok(pkgbuild_changed)
}

/// Bump `pkgrel` of one package, returning the new value
pub fn bump_package(root: &Path, name: &str, dry_run: bool) -> Result<u32> {
    let mut files = RecipeFiles::open(root, name)?;
    let pkgrel = pkgbuild::bump_pkgrel(&mut files.pkgbuild, 1)?;
    if !dry_run {
        files.pkgbuild.save(&files.pkgbuild_path())?;
    }
    Ok(pkgrel)
}
