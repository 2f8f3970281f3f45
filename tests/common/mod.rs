// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use bioarch_sync::index::{IndexEntry, MemoryIndex, Origin};
use bioarch_sync::{BiocVersion, BiocVersions};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const EDGER_PKGBUILD: &str = r#"# Maintainer: Someone <someone@example.org>

_pkgname=edgeR
_pkgver=4.0.2
pkgname=r-${_pkgname,,}
pkgver=${_pkgver//-/.}
pkgrel=1
pkgdesc="Empirical Analysis of Digital Gene Expression Data in R"
arch=('any')
url="https://bioconductor.org/packages/${_pkgname}"
license=('GPL-2.0-or-later')
depends=(
  r
  r-limma
  r-old
)
optdepends=(
  'r-jsonlite: read JSON'
  r-readr
)
source=("https://bioconductor.org/packages/release/bioc/src/contrib/${_pkgname}_${_pkgver}.tar.gz")
sha256sums=('0000')

build() {
  mkdir -p build
  R CMD INSTALL . -l build
}

package() {
  install -d "$pkgdir/usr/lib/R/library"
  cp -a --no-preserve=ownership "build/$_pkgname" "$pkgdir/usr/lib/R/library"
}
"#;

pub const EDGER_LILAC: &str = "\
maintainers:
- github: someone
build_prefix: extra-x86_64
repo_depends:
- r-limma
- r-old
update_on:
- source: rpkgs
  pkgname: edgeR
  repo: bioc
- url: https://bioconductor.org/packages/release/bioc/html/edgeR.html
";

pub const EDGER_DESC: &str = "\
Package: edgeR
Version: 4.0.16
Depends: R (>= 3.6.0), limma (>= 3.41.5)
Imports: methods, graphics, stats, utils, locfit, Rcpp
LinkingTo: Rcpp
Suggests: jsonlite, readr, rhdf5
NeedsCompilation: yes
";

pub const LIMMA_PKGBUILD: &str = r#"_pkgname=limma
_pkgver=3.58.1
pkgname=r-${_pkgname,,}
pkgver=${_pkgver//-/.}
pkgrel=3
arch=('x86_64')
depends=(
  r
  r-statmod
)
optdepends=(
  r-affy
)
source=("https://bioconductor.org/packages/release/bioc/src/contrib/${_pkgname}_${_pkgver}.tar.gz")
"#;

pub const LIMMA_LILAC: &str = "\
build_prefix: extra-x86_64
repo_depends:
- r-stale
update_on:
- url: https://bioconductor.org/packages/release/bioc/html/limma.html
";

pub const LIMMA_DESC: &str = "\
Package: limma
Version: 3.58.1
Depends: R (>= 3.6.0)
Imports: grDevices, graphics, stats, utils, methods, statmod
Suggests: affy
NeedsCompilation: yes
";

pub const ABC_PKGBUILD: &str = r#"_pkgname=abc
_pkgver=2.2.1
pkgname=r-${_pkgname,,}
pkgver=${_pkgver//[:-]/.}
pkgrel=1
arch=('any')
url="https://cran.r-project.org/package=${_pkgname}"
depends=(
  r-abc.data
)
source=("https://cran.r-project.org/src/contrib/${_pkgname}_${_pkgver}.tar.gz")
"#;

pub const ABC_LILAC: &str = "\
update_on:
- source: rpkgs
  pkgname: abc
- url: https://cran.r-project.org/package=abc
";

/// A temporary recipe tree, one directory per package
pub struct RecipeTree {
    _dir: TempDir,
    root: PathBuf,
}

impl RecipeTree {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("BioArchLinux");
        fs::create_dir_all(&root).unwrap();
        Self { _dir: dir, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create `name/PKGBUILD` and, when given, `name/lilac.yaml`
    pub fn add(&self, name: &str, pkgbuild: &str, lilac: Option<&str>) {
        let dir = self.root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("PKGBUILD"), pkgbuild).unwrap();
        if let Some(lilac) = lilac {
            fs::write(dir.join("lilac.yaml"), lilac).unwrap();
        }
    }

    pub fn pkgbuild(&self, name: &str) -> String {
        fs::read_to_string(self.root.join(name).join("PKGBUILD")).unwrap()
    }

    pub fn lilac(&self, name: &str) -> String {
        fs::read_to_string(self.root.join(name).join("lilac.yaml")).unwrap()
    }
}

/// Releases 3.18 (latest) and 3.17
pub fn bioc_versions() -> BiocVersions {
    BiocVersions::new(vec![BiocVersion::new(3, 18), BiocVersion::new(3, 17)])
}

/// Index with edgeR and limma from Bioconductor 3.18
pub fn sample_index() -> MemoryIndex {
    let mut index = MemoryIndex::new();
    index.insert(
        IndexEntry::new("edgeR", EDGER_DESC, Origin::Bioc).with_bioc(BiocVersion::new(3, 18), "bioc"),
    );
    index.insert(
        IndexEntry::new("limma", LIMMA_DESC, Origin::Bioc).with_bioc(BiocVersion::new(3, 18), "bioc"),
    );
    index
}

/// Names as a batch expects them
pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
