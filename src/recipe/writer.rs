// src/recipe/writer.rs

//! Write reconciled dependency arrays back into a PKGBUILD
//!
//! Only the located `depends` and `optdepends` spans are touched; every other
//! line keeps its exact bytes. Arrays are rendered one entry per line:
//!
//! ```text
//! depends=(
//!   gsl
//!   r-rcpp
//! )
//! optdepends=(
//!   'r-knitr: for vignettes'
//!   r-testthat
//! )
//! ```

use super::document::{write_atomic, ArrayRegion, LineEdit, RecipeDocument};
use super::snapshot::{DEPENDS_FIELD, OPTDEPENDS_FIELD};
use crate::error::Result;
use crate::reconcile::ReconciliationResult;
use std::path::Path;
use tracing::{debug, info};

/// Indentation of array entries
const ENTRY_INDENT: &str = "  ";

/// Applies a [`ReconciliationResult`] to a recipe document
pub struct RecipeWriter;

impl RecipeWriter {
    /// Rewrite the arrays whose change flag is set
    ///
    /// Returns false, leaving the document untouched, when neither array
    /// changed. A removed `optdepends` list deletes the whole assignment.
    pub fn apply(doc: &mut RecipeDocument, result: &ReconciliationResult) -> Result<bool> {
        if !result.is_changed() {
            return Ok(false);
        }

        let depends = doc.locate_array(DEPENDS_FIELD)?;
        let optdepends = doc.locate_array(OPTDEPENDS_FIELD)?;
        let mut edits = Vec::new();

        let depends_lines = render_words(
            DEPENDS_FIELD,
            result
                .depends
                .iter()
                .map(|d| spell(depends.as_ref(), d.as_str())),
        );
        let optdepends_lines = if result.optdepends.is_empty() {
            Vec::new()
        } else {
            render_words(
                OPTDEPENDS_FIELD,
                result
                    .optdepends
                    .iter()
                    .map(|o| spell(optdepends.as_ref(), &o.to_string())),
            )
        };

        // insertion point for a missing optdepends
        let mut after_depends = depends.as_ref().map(|r| r.span.end + 1);

        if result.depends_changed {
            match &depends {
                Some(region) => edits.push(LineEdit::replace(region.span, depends_lines)),
                None => {
                    let at = optdepends
                        .as_ref()
                        .map(|r| r.span.start)
                        .or_else(|| first_function(doc))
                        .unwrap_or(doc.len());
                    debug!("Inserting depends array at line {}", at + 1);
                    after_depends = Some(at);
                    edits.push(LineEdit::insert(at, depends_lines));
                }
            }
        }

        if result.optdepends_changed {
            match &optdepends {
                Some(region) => edits.push(LineEdit::replace(region.span, optdepends_lines)),
                None if !optdepends_lines.is_empty() => {
                    let at = after_depends
                        .or_else(|| first_function(doc))
                        .unwrap_or(doc.len());
                    debug!("Inserting optdepends array at line {}", at + 1);
                    edits.push(LineEdit::insert(at, optdepends_lines));
                }
                None => {}
            }
        }

        doc.apply_edits(edits)?;
        Ok(true)
    }
}

/// Load `path`, apply `result` and write it back atomically
///
/// The file is not written when nothing changed.
pub fn write_recipe(path: &Path, result: &ReconciliationResult) -> Result<bool> {
    let mut doc = RecipeDocument::load(path)?;
    if !RecipeWriter::apply(&mut doc, result)? {
        return Ok(false);
    }
    write_atomic(path, doc.to_text().as_bytes())?;
    info!("Wrote {}", path.display());
    Ok(true)
}

/// Render `name=(...)` with one entry per line
pub fn render_array<I>(name: &str, entries: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    render_words(name, entries.into_iter().map(|entry| quote(&entry)))
}

/// Render already shell-quoted words
fn render_words<I>(name: &str, words: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let words: Vec<String> = words.into_iter().collect();
    if words.is_empty() {
        return vec![format!("{}=()\n", name)];
    }

    let mut lines = Vec::with_capacity(words.len() + 2);
    lines.push(format!("{}=(\n", name));
    for word in &words {
        lines.push(format!("{}{}\n", ENTRY_INDENT, word));
    }
    lines.push(")\n".to_string());
    lines
}

/// Entries already in the array keep their source spelling
fn spell(region: Option<&ArrayRegion>, entry: &str) -> String {
    region
        .and_then(|r| r.raw_of(entry))
        .map(str::to_string)
        .unwrap_or_else(|| quote(entry))
}

/// Quote entries the shell would otherwise split or interpret
///
/// Entries with a `$` are double-quoted so that expansions still happen.
fn quote(entry: &str) -> String {
    let plain = !entry.is_empty()
        && entry
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '-' | '@'));
    if plain {
        entry.to_string()
    } else if entry.contains('$') {
        let escaped = entry
            .replace('\\', r"\\")
            .replace('"', r#"\""#)
            .replace('`', r"\`");
        format!("\"{}\"", escaped)
    } else {
        format!("'{}'", entry.replace('\'', r"'\''"))
    }
}

/// Index of the first shell function definition (`build() {`)
fn first_function(doc: &RecipeDocument) -> Option<usize> {
    doc.find_line(|line| {
        let line = line.trim_start();
        let Some((name, rest)) = line.split_once("()") else {
            return false;
        };
        !name.is_empty()
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && (rest.trim().is_empty() || rest.trim_start().starts_with('{'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Descriptor;
    use crate::reconcile::reconcile;
    use crate::recipe::snapshot::RecipeSnapshot;

    const PKGBUILD: &str = "\
_pkgname=edgeR
pkgname=r-${_pkgname,,}
pkgver=4.0.2
pkgrel=1
arch=(x86_64)
depends=(
  r
  r-limma
  r-old
)
optdepends=(
  'r-jsonlite: read JSON'
  r-readr
)
source=(\"https://bioconductor.org/packages/release/bioc/src/contrib/${_pkgname}_${pkgver}.tar.gz\")

build() {
  R CMD INSTALL . -l \"$srcdir\"
}
";

    fn run(text: &str, desc: &str) -> (RecipeDocument, bool) {
        let mut doc = RecipeDocument::parse(text);
        let state = RecipeSnapshot::read(&doc).unwrap();
        let result = reconcile(&state, &Descriptor::parse(desc).unwrap()).unwrap();
        let changed = RecipeWriter::apply(&mut doc, &result).unwrap();
        (doc, changed)
    }

    #[test]
    fn test_rewrites_only_array_regions() {
        let (doc, changed) = run(
            PKGBUILD,
            "Package: edgeR\nDepends: R, limma\nImports: locfit\nSuggests: jsonlite, rhdf5\n",
        );
        assert!(changed);
        let text = doc.to_text();
        assert!(text.contains("depends=(\n  r\n  r-limma\n  r-locfit\n)\n"));
        assert!(text.contains("optdepends=(\n  'r-jsonlite: read JSON'\n  r-rhdf5\n)\n"));
        assert!(text.starts_with("_pkgname=edgeR\npkgname=r-${_pkgname,,}\n"));
        assert!(text.ends_with("build() {\n  R CMD INSTALL . -l \"$srcdir\"\n}\n"));
    }

    #[test]
    fn test_unchanged_is_noop() {
        let (doc, changed) = run(
            PKGBUILD,
            "Package: edgeR\nDepends: R, limma, old\nSuggests: readr, jsonlite\n",
        );
        assert!(!changed);
        assert_eq!(doc.to_text(), PKGBUILD);
    }

    #[test]
    fn test_removes_empty_optdepends() {
        let (doc, changed) = run(PKGBUILD, "Package: edgeR\nDepends: limma, old\n");
        assert!(changed);
        let text = doc.to_text();
        assert!(!text.contains("optdepends"));
        assert!(text.contains("  r-old\n)\nsource=("));
    }

    #[test]
    fn test_inserts_optdepends_after_depends() {
        let text = "pkgname=r-a\ndepends=(r-b)\nsource=(x)\n";
        let (doc, changed) = run(text, "Package: a\nImports: b\nSuggests: knitr\n");
        assert!(changed);
        assert_eq!(
            doc.to_text(),
            "pkgname=r-a\ndepends=(r-b)\noptdepends=(\n  r-knitr\n)\nsource=(x)\n"
        );
    }

    #[test]
    fn test_inserts_depends_before_functions() {
        let text = "pkgname=r-a\n\npackage() {\n  true\n}\n";
        let (doc, _) = run(text, "Package: a\nImports: b\n");
        assert_eq!(
            doc.to_text(),
            "pkgname=r-a\n\ndepends=(\n  r-b\n)\npackage() {\n  true\n}\n"
        );
    }

    #[test]
    fn test_appends_when_no_anchor() {
        let text = "pkgname=r-a";
        let (doc, _) = run(text, "Package: a\nImports: b\n");
        assert_eq!(doc.to_text(), "pkgname=r-a\ndepends=(\n  r-b\n)\n");
    }

    #[test]
    fn test_write_recipe_is_atomic_and_skips_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("PKGBUILD");
        std::fs::write(&path, PKGBUILD).unwrap();

        let doc = RecipeDocument::load(&path).unwrap();
        let state = RecipeSnapshot::read(&doc).unwrap();
        let desc = Descriptor::parse("Package: edgeR\nDepends: limma\n").unwrap();
        let result = reconcile(&state, &desc).unwrap();

        assert!(write_recipe(&path, &result).unwrap());
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("depends=(\n  r\n  r-limma\n)\n"));

        let doc = RecipeDocument::load(&path).unwrap();
        let state = RecipeSnapshot::read(&doc).unwrap();
        let again = reconcile(&state, &desc).unwrap();
        assert!(!write_recipe(&path, &again).unwrap());
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("r-rcpp"), "r-rcpp");
        assert_eq!(quote("r-knitr: docs"), "'r-knitr: docs'");
        assert_eq!(quote("it's"), r"'it'\''s'");
        assert_eq!(quote("java-runtime>=11"), "'java-runtime>=11'");
        assert_eq!(quote("java-runtime=${_jdk}"), "\"java-runtime=${_jdk}\"");
    }

    #[test]
    fn test_system_entries_keep_source_spelling() {
        let text = "\
_pkgname=rJava
pkgrel=1
depends=(
  r
  \"java-runtime=${_jdk}\"
  ${_extra_deps[@]}
  'zlib'
  r-old
)
";
        let (doc, changed) = run(text, "Package: rJava\nImports: utils, rJavaHelper\n");
        assert!(changed);
        assert_eq!(
            doc.to_text(),
            "\
_pkgname=rJava
pkgrel=1
depends=(
  ${_extra_deps[@]}
  \"java-runtime=${_jdk}\"
  r
  'zlib'
  r-rjavahelper
)
"
        );
    }
}
