// src/dependencies/mod.rs

//! Dependency names as they appear in PKGBUILDs
//!
//! Distribution recipes refer to R packages through a fixed prefix:
//! - `r-rcpp` - the R package `Rcpp`
//! - `r-biocgenerics` - the Bioconductor package `BiocGenerics`
//! - `gcc-fortran` - a plain system package, kept as written
//!
//! # Example
//!
//! ```
//! use bioarch_sync::dependencies::{DependencyName, OptionalDependency};
//!
//! let dep = DependencyName::from_upstream("Rcpp");
//! assert_eq!(dep.as_str(), "r-rcpp");
//!
//! let opt = OptionalDependency::parse("r-knitr: for vignettes");
//! assert_eq!(opt.annotation, "for vignettes");
//! ```

mod classes;
mod optional;

pub use classes::{DependencyName, DependencyNamespace, ECOSYSTEM_MARKER, RUNTIME_PACKAGE};
pub use optional::OptionalDependency;
