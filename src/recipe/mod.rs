// src/recipe/mod.rs

//! Recipe files of a packaged R library
//!
//! Every recipe directory holds a `PKGBUILD` and a `lilac.yaml`:
//! - [`RecipeDocument`] keeps the PKGBUILD as lines and locates arrays
//! - [`RecipeSnapshot`] reads the current `depends`/`optdepends`
//! - [`RecipeWriter`] writes reconciled arrays back
//! - [`pkgbuild`] bumps `pkgrel` and switches `arch`
//! - [`LilacDocument`] maintains `repo_depends` and `update_on`
//!
//! # Example PKGBUILD
//!
//! ```bash
//! _pkgname=edgeR
//! _pkgver=4.0.2
//! pkgname=r-${_pkgname,,}
//! pkgver=${_pkgver//-/.}
//! pkgrel=1
//! arch=(x86_64)
//! depends=(
//!   r-limma
//!   r-locfit
//!   r-rcpp
//! )
//! optdepends=(
//!   r-jsonlite
//!   r-readr
//! )
//! ```

mod document;
mod lilac;
pub mod pkgbuild;
mod snapshot;
mod writer;

pub use document::{write_atomic, ArrayRegion, LineEdit, LineSpan, RecipeDocument};
pub use lilac::{LilacDocument, REPO_DEPENDS_KEY, UPDATE_ON_KEY};
pub use snapshot::{RecipeSnapshot, RecipeState, DEPENDS_FIELD, OPTDEPENDS_FIELD};
pub use writer::{render_array, write_recipe, RecipeWriter};

/// File name of the build script inside a recipe directory
pub const PKGBUILD_FILE: &str = "PKGBUILD";

/// File name of the build-bot descriptor inside a recipe directory
pub const LILAC_FILE: &str = "lilac.yaml";
