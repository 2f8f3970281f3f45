// tests/database.rs

//! Integration tests for building the metadata database from a mirror
//! and running batches against it

mod common;

use bioarch_sync::batch::{self, BatchOptions, PackageStatus};
use bioarch_sync::db::{self, models::PkgMeta, paths};
use bioarch_sync::index::{build_database, MetadataIndex, Origin, SqliteIndex};
use bioarch_sync::repository::load_bioc_versions;
use bioarch_sync::BiocVersion;
use common::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const LIMMA_317: &str = "\
Package: limma
Version: 3.56.2
Depends: R (>= 3.6.0)
Imports: methods

Package: oldpkg
Version: 1.0.0
Imports: limma
";

const CRAN: &str = "\
Package: Rcpp
Version: 1.0.11
Imports: methods, utils
NeedsCompilation: yes

Package: abc.data
Version: 1.0
Depends: R (>= 2.10)
";

fn write(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

/// Mirror with releases 3.17 and 3.18 (bioc category only) plus CRAN
fn setup_mirror() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let meta = dir.path();
    write(&paths::bioc_version_file(meta), "3.18,3.17");
    write(
        &paths::bioc_packages_file(meta, &BiocVersion::new(3, 17), "bioc"),
        LIMMA_317,
    );
    write(
        &paths::bioc_packages_file(meta, &BiocVersion::new(3, 18), "bioc"),
        &format!("{}\n{}", EDGER_DESC, LIMMA_DESC),
    );
    write(&paths::cran_packages_file(meta), CRAN);
    dir
}

/// Build the database from `meta` into a fresh file
fn setup_db(meta: &Path) -> (TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("sqlite.db").to_str().unwrap().to_string();
    db::init(&db_path).unwrap();

    let versions = load_bioc_versions(None, meta, "https://bioconductor.org").unwrap();
    let mut conn = db::open(&db_path).unwrap();
    let stats = build_database(&mut conn, meta, &versions, BiocVersion::new(3, 17)).unwrap();

    assert_eq!(stats.sources, 3);
    assert_eq!(stats.records, 6);
    assert_eq!(stats.missing, 4);
    (dir, db_path)
}

#[test]
fn test_build_database_from_mirror() {
    let mirror = setup_mirror();
    let (_dir, db_path) = setup_db(mirror.path());

    let conn = db::open(&db_path).unwrap();
    assert_eq!(PkgMeta::count(&conn, None).unwrap(), 5);
    assert_eq!(PkgMeta::count(&conn, Some(Origin::Cran)).unwrap(), 2);

    let limma = PkgMeta::find_by_name(&conn, "limma").unwrap().unwrap();
    assert_eq!(limma.bioc_ver.as_deref(), Some("3.18"));
    assert!(limma.desc.contains("statmod"));
}

#[test]
fn test_sqlite_index_lookup() {
    let mirror = setup_mirror();
    let (_dir, db_path) = setup_db(mirror.path());
    let index = SqliteIndex::open(&db_path).unwrap();

    let old = index.get("oldpkg").unwrap().unwrap();
    assert_eq!(old.origin, Origin::Bioc);
    assert_eq!(old.bioc_ver, Some(BiocVersion::new(3, 17)));
    assert_eq!(old.bioc_category.as_deref(), Some("bioc"));

    let rcpp = index.get("Rcpp").unwrap().unwrap();
    assert_eq!(rcpp.origin, Origin::Cran);
    assert_eq!(rcpp.bioc_ver, None);

    assert!(index.get("nothere").unwrap().is_none());
    assert!(index.describe().contains(&db_path));
}

#[test]
fn test_open_missing_database() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("absent.db");
    assert!(SqliteIndex::open(db_path.to_str().unwrap()).is_err());
}

#[test]
fn test_rebuild_replaces_rows() {
    let mirror = setup_mirror();
    let (_dir, db_path) = setup_db(mirror.path());

    write(
        &paths::cran_packages_file(mirror.path()),
        "Package: Rcpp\nVersion: 1.0.12\nNeedsCompilation: yes\n",
    );
    let versions = load_bioc_versions(None, mirror.path(), "https://bioconductor.org").unwrap();
    let mut conn = db::open(&db_path).unwrap();
    build_database(&mut conn, mirror.path(), &versions, BiocVersion::new(3, 18)).unwrap();

    let rcpp = PkgMeta::find_by_name(&conn, "Rcpp").unwrap().unwrap();
    assert!(rcpp.desc.contains("1.0.12"));
    assert_eq!(PkgMeta::count(&conn, None).unwrap(), 5);
}

#[test]
fn test_batch_against_database() {
    let mirror = setup_mirror();
    let (_dir, db_path) = setup_db(mirror.path());
    let index = SqliteIndex::open(&db_path).unwrap();
    let versions = load_bioc_versions(None, mirror.path(), "https://bioconductor.org").unwrap();

    let tree = RecipeTree::new();
    tree.add("r-edger", EDGER_PKGBUILD, Some(EDGER_LILAC));
    tree.add(
        "r-oldpkg",
        "_pkgname=oldpkg\npkgrel=1\ndepends=(\n  r-limma\n)\n\
         source=(\"https://bioconductor.org/packages/release/bioc/src/contrib/${_pkgname}_1.0.0.tar.gz\")\n",
        None,
    );
    let options = BatchOptions {
        bioarch_path: tree.root().to_path_buf(),
        auto_archive: true,
        jobs: 0,
        ..BatchOptions::default()
    };

    let report =
        batch::run_batch(&index, &versions, &options, &names(&["edgeR", "oldpkg"]), |_| {})
            .unwrap();

    assert!(report.failed.is_empty());
    assert_eq!(report.archived, vec!["r-oldpkg"]);
    assert!(tree.pkgbuild("r-edger").contains("  r-locfit\n  r-rcpp\n"));

    let old = tree.pkgbuild("r-oldpkg");
    assert!(old.contains("packages/3.17/bioc/src/contrib"));
    assert!(old.contains("\npkgrel=2\n"));

    let outcome = batch::update_package(&index, &versions, &options, "oldpkg").unwrap();
    assert_eq!(outcome.status, PackageStatus::Unchanged);
}
