// src/recipe/pkgbuild.rs

//! PKGBUILD field maintenance
//!
//! Small edits on top of [`RecipeDocument`] that the batch driver performs
//! besides dependency reconciliation:
//!
//! ```bash
//! _pkgname=edgeR          # upstream name used for metadata lookups
//! pkgname=r-${_pkgname,,}
//! pkgver=4.0.2
//! pkgrel=1                # bumped whenever the recipe changes
//! arch=(x86_64)           # 'any' unless upstream needs compilation
//! ```
//!
//! # Limitations
//!
//! - Only plain top-level assignments are recognized
//! - Values are not expanded (`${pkgver}` stays literal)

use super::document::RecipeDocument;
use crate::error::{Error, Result};
use regex::Regex;
use tracing::debug;

/// Variables holding the upstream package name, in lookup order
pub const UPSTREAM_NAME_VARS: &[&str] = &["_pkgname", "_cranname", "_bioc_name"];

const PKGREL_VAR: &str = "pkgrel";
const ARCH_VAR: &str = "arch";

/// Architecture of packages without compiled code
pub const ARCH_ANY: &str = "any";

/// Architecture of packages with compiled code
pub const ARCH_NATIVE: &str = "x86_64";

/// Value of a simple top-level assignment `name=value`
///
/// Surrounding quotes are stripped. Returns `None` when the variable is not
/// assigned or is an array.
pub fn variable(doc: &RecipeDocument, name: &str) -> Option<String> {
    let line = assignment_line(doc, name)?;
    let value = doc.lines()[line]
        .trim()
        .strip_prefix(name)?
        .strip_prefix('=')?
        .trim();
    if value.starts_with('(') {
        return None;
    }
    Some(unquote(value).to_string())
}

/// Upstream (CRAN or Bioconductor) name of the packaged library
pub fn upstream_name(doc: &RecipeDocument) -> Option<String> {
    UPSTREAM_NAME_VARS
        .iter()
        .find_map(|var| variable(doc, var))
        .filter(|name| !name.is_empty())
}

/// Increment `pkgrel` by `step`, returning the new value
///
/// A fractional release (`2.1`) is bumped from its integer part.
pub fn bump_pkgrel(doc: &mut RecipeDocument, step: u32) -> Result<u32> {
    let index = assignment_line(doc, PKGREL_VAR)
        .ok_or_else(|| Error::locate(PKGREL_VAR, "no pkgrel assignment"))?;
    let line = &doc.lines()[index];

    let value = variable(doc, PKGREL_VAR).unwrap_or_default();
    let current: u32 = value
        .split('.')
        .next()
        .unwrap_or_default()
        .parse()
        .map_err(|e| Error::ParseError(format!("Invalid pkgrel '{}': {}", value, e)))?;
    let next = current
        .checked_add(step)
        .ok_or_else(|| Error::ParseError(format!("pkgrel '{}' is out of range", value)))?;

    let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
    let ending = line_ending(line);
    doc.set_line(index, format!("{}{}={}{}", indent, PKGREL_VAR, next, ending));

    debug!("pkgrel {} -> {}", value, next);
    Ok(next)
}

/// Switch the `arch` array between `any` and `x86_64`
///
/// `x86_64` replaces `any` when upstream needs compilation, and the other
/// way round otherwise. Returns whether the document changed; a recipe
/// without an `arch` array is left alone.
pub fn set_arch(doc: &mut RecipeDocument, needs_compilation: bool) -> Result<bool> {
    let Some(region) = doc.locate_array(ARCH_VAR)? else {
        return Ok(false);
    };

    let (from, to) = if needs_compilation {
        (ARCH_ANY, ARCH_NATIVE)
    } else {
        (ARCH_NATIVE, ARCH_ANY)
    };
    let re = Regex::new(&format!(r"\b{}\b", regex::escape(from)))
        .map_err(|e| Error::ParseError(e.to_string()))?;

    let mut changed = false;
    for index in region.span.start..=region.span.end {
        let line = &doc.lines()[index];
        let updated = re.replace_all(line, to);
        if updated != line.as_str() {
            let updated = updated.into_owned();
            doc.set_line(index, updated);
            changed = true;
        }
    }

    if changed {
        debug!("arch switched from {} to {}", from, to);
    }
    Ok(changed)
}

fn assignment_line(doc: &RecipeDocument, name: &str) -> Option<usize> {
    let prefix = format!("{}=", name);
    doc.find_line(|line| line.trim_start().starts_with(&prefix))
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn line_ending(line: &str) -> &'static str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PKGBUILD: &str = "\
# Maintainer: someone
_pkgname=edgeR
_pkgver=4.0.2
pkgname=r-${_pkgname,,}
pkgver=${_pkgver//-/.}
pkgrel=3
arch=('any')
depends=(r)
";

    #[test]
    fn test_variable() {
        let doc = RecipeDocument::parse(PKGBUILD);
        assert_eq!(variable(&doc, "pkgname").as_deref(), Some("r-${_pkgname,,}"));
        assert_eq!(variable(&doc, "pkgver").as_deref(), Some("${_pkgver//-/.}"));
        assert_eq!(variable(&doc, "depends"), None);
        assert_eq!(variable(&doc, "missing"), None);
    }

    #[test]
    fn test_upstream_name() {
        let doc = RecipeDocument::parse(PKGBUILD);
        assert_eq!(upstream_name(&doc).as_deref(), Some("edgeR"));

        let doc = RecipeDocument::parse("_cranname='Rcpp'\npkgname=r-rcpp\n");
        assert_eq!(upstream_name(&doc).as_deref(), Some("Rcpp"));

        let doc = RecipeDocument::parse("pkgname=r-rcpp\n");
        assert_eq!(upstream_name(&doc), None);
    }

    #[test]
    fn test_bump_pkgrel() {
        let mut doc = RecipeDocument::parse(PKGBUILD);
        assert_eq!(bump_pkgrel(&mut doc, 1).unwrap(), 4);
        assert!(doc.to_text().contains("\npkgrel=4\narch="));
    }

    #[test]
    fn test_bump_fractional_pkgrel() {
        let mut doc = RecipeDocument::parse("pkgrel=\"2.1\"\n");
        assert_eq!(bump_pkgrel(&mut doc, 1).unwrap(), 3);
        assert_eq!(doc.to_text(), "pkgrel=3\n");
    }

    #[test]
    fn test_bump_pkgrel_missing() {
        let mut doc = RecipeDocument::parse("pkgver=1\n");
        assert!(matches!(bump_pkgrel(&mut doc, 1), Err(Error::LocateError { .. })));

        let mut doc = RecipeDocument::parse("pkgrel=abc\n");
        assert!(matches!(bump_pkgrel(&mut doc, 1), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_bump_pkgrel_overflow() {
        let text = format!("pkgrel={}\n", u32::MAX);
        let mut doc = RecipeDocument::parse(&text);
        assert!(matches!(bump_pkgrel(&mut doc, 1), Err(Error::ParseError(_))));
        assert_eq!(doc.to_text(), text);
    }

    #[test]
    fn test_set_arch() {
        let mut doc = RecipeDocument::parse(PKGBUILD);
        assert!(set_arch(&mut doc, true).unwrap());
        assert!(doc.to_text().contains("arch=('x86_64')\n"));
        assert!(!set_arch(&mut doc, true).unwrap());

        assert!(set_arch(&mut doc, false).unwrap());
        assert_eq!(doc.to_text(), PKGBUILD);
    }

    #[test]
    fn test_set_arch_without_array() {
        let mut doc = RecipeDocument::parse("pkgname=r-a\n");
        assert!(!set_arch(&mut doc, true).unwrap());
    }
}
