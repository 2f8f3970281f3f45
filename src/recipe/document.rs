// src/recipe/document.rs

//! Line-indexed recipe document
//!
//! A PKGBUILD is read once into a vector of lines (each keeping its own line
//! terminator, so rendering the untouched document reproduces the input byte
//! for byte). Named arrays are located with a bounded scan that returns the
//! exact line span of the assignment, and edits replace whole spans at once.

use crate::error::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Inclusive range of line indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

impl LineSpan {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn overlaps(&self, other: &LineSpan) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// A located `name=( ... )` assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayRegion {
    pub span: LineSpan,
    /// Words of the array after shell quote removal
    pub items: Vec<String>,
    /// The same words as written in the source, quotes included
    pub raw_items: Vec<String>,
}

impl ArrayRegion {
    /// Source spelling of the first word whose value is `item`
    pub fn raw_of(&self, item: &str) -> Option<&str> {
        self.items
            .iter()
            .position(|i| i == item)
            .map(|idx| self.raw_items[idx].as_str())
    }
}

/// A replacement of `remove` lines starting at `at` by `lines`
///
/// `remove == 0` is a pure insertion before line `at`.
#[derive(Debug, Clone)]
pub struct LineEdit {
    pub at: usize,
    pub remove: usize,
    pub lines: Vec<String>,
}

impl LineEdit {
    pub fn replace(span: LineSpan, lines: Vec<String>) -> Self {
        Self {
            at: span.start,
            remove: span.len(),
            lines,
        }
    }

    pub fn insert(at: usize, lines: Vec<String>) -> Self {
        Self { at, remove: 0, lines }
    }

    fn removed_end(&self) -> usize {
        self.at + self.remove
    }
}

/// A recipe file held in memory as lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDocument {
    path: Option<PathBuf>,
    lines: Vec<String>,
}

impl RecipeDocument {
    /// Build a document from text; line terminators are kept per line
    pub fn parse(text: &str) -> Self {
        Self {
            path: None,
            lines: text.split_inclusive('\n').map(str::to_string).collect(),
        }
    }

    /// Read a recipe from disk
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFoundError(path.display().to_string())
            } else {
                Error::IoError(format!("Failed to read {}: {}", path.display(), e))
            }
        })?;
        let mut doc = Self::parse(&text);
        doc.path = Some(path.to_path_buf());
        Ok(doc)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Render the document back to text
    pub fn to_text(&self) -> String {
        self.lines.concat()
    }

    /// Replace a single line; the caller supplies the terminator
    pub fn set_line(&mut self, index: usize, line: String) {
        if let Some(slot) = self.lines.get_mut(index) {
            *slot = line;
        }
    }

    /// First line index whose content satisfies `pred`
    pub fn find_line<F>(&self, pred: F) -> Option<usize>
    where
        F: Fn(&str) -> bool,
    {
        self.lines.iter().position(|line| pred(line))
    }

    /// Locate the array assignment `name=( ... )`
    ///
    /// Returns `Ok(None)` when the array is absent. The region is rejected
    /// when the name is assigned more than once, appended to with `+=`,
    /// never closed, or when the closing line carries another statement.
    pub fn locate_array(&self, name: &str) -> Result<Option<ArrayRegion>> {
        let assign = format!("{name}=(");
        let append = format!("{name}+=(");
        let mut found: Option<(usize, usize)> = None;

        for (index, line) in self.lines.iter().enumerate() {
            let trimmed = line.trim_start();
            if trimmed.starts_with(&append) {
                return Err(Error::locate(
                    name,
                    format!("line {} appends with '+=', region is not bounded", index + 1),
                ));
            }
            if trimmed.starts_with(&assign) {
                if let Some((first, _)) = found {
                    return Err(Error::locate(
                        name,
                        format!("assigned on line {} and again on line {}", first + 1, index + 1),
                    ));
                }
                let open = (line.len() - trimmed.len()) + name.len() + 1;
                found = Some((index, open));
            }
        }

        match found {
            Some((start, open)) => {
                let region = self.scan_array(name, start, open)?;
                debug!(
                    "Located {} at lines {}..={} ({} items)",
                    name,
                    region.span.start + 1,
                    region.span.end + 1,
                    region.items.len()
                );
                Ok(Some(region))
            }
            None => Ok(None),
        }
    }

    /// Scan from the opening parenthesis to the matching close
    fn scan_array(&self, name: &str, start: usize, open: usize) -> Result<ArrayRegion> {
        let mut items = Vec::new();
        let mut raw_items = Vec::new();
        let mut token = String::new();
        let mut raw = String::new();
        let mut in_token = false;
        let mut quote: Option<char> = None;

        for lineno in start..self.lines.len() {
            let line = &self.lines[lineno];
            let body = if lineno == start { &line[open + 1..] } else { line.as_str() };
            let mut chars = body.char_indices();

            while let Some((idx, c)) = chars.next() {
                if let Some(q) = quote {
                    raw.push(c);
                    if c == q {
                        quote = None;
                    } else if c == '\\' && q == '"' {
                        if let Some((_, next)) = chars.next() {
                            raw.push(next);
                            token.push(next);
                        }
                    } else {
                        token.push(c);
                    }
                    continue;
                }

                match c {
                    '\'' | '"' => {
                        quote = Some(c);
                        raw.push(c);
                        in_token = true;
                    }
                    '\\' => {
                        if let Some((_, next)) = chars.next() {
                            if next != '\n' {
                                raw.push(c);
                                raw.push(next);
                                token.push(next);
                                in_token = true;
                            }
                        }
                    }
                    // comment to end of line
                    '#' if !in_token => break,
                    ')' => {
                        if in_token {
                            items.push(std::mem::take(&mut token));
                            raw_items.push(std::mem::take(&mut raw));
                        }
                        let rest = body[idx + 1..].trim();
                        if !rest.is_empty() && !rest.starts_with('#') {
                            return Err(Error::locate(
                                name,
                                format!("line {} continues after the closing ')'", lineno + 1),
                            ));
                        }
                        return Ok(ArrayRegion {
                            span: LineSpan::new(start, lineno),
                            items,
                            raw_items,
                        });
                    }
                    c if c.is_whitespace() => {
                        if in_token {
                            items.push(std::mem::take(&mut token));
                            raw_items.push(std::mem::take(&mut raw));
                            in_token = false;
                        }
                    }
                    _ => {
                        token.push(c);
                        raw.push(c);
                        in_token = true;
                    }
                }
            }
        }

        Err(Error::locate(
            name,
            format!("array opened on line {} is never closed", start + 1),
        ))
    }

    /// Apply a set of non-overlapping edits atomically
    ///
    /// Edits are validated against the current document before anything
    /// changes. Insertions sharing a position keep the order they were given.
    pub fn apply_edits(&mut self, mut edits: Vec<LineEdit>) -> Result<()> {
        // stable sort keeps caller order for equal positions
        edits.sort_by_key(|edit| edit.at);

        for edit in &edits {
            if edit.removed_end() > self.lines.len() {
                return Err(Error::IoError(format!(
                    "edit at line {} runs past end of document",
                    edit.at + 1
                )));
            }
        }
        for pair in edits.windows(2) {
            if pair[0].remove > 0 && pair[0].removed_end() > pair[1].at {
                return Err(Error::IoError(format!(
                    "overlapping edits at lines {} and {}",
                    pair[0].at + 1,
                    pair[1].at + 1
                )));
            }
        }

        if edits.iter().any(|edit| edit.at == self.lines.len()) {
            if let Some(last) = self.lines.last_mut() {
                if !last.ends_with('\n') {
                    last.push('\n');
                }
            }
        }

        for edit in edits.into_iter().rev() {
            self.lines.splice(edit.at..edit.removed_end(), edit.lines);
        }
        Ok(())
    }

    /// Write the document to `path` atomically
    ///
    /// The content goes to a temporary file in the same directory which is
    /// then renamed over the target, so a failure leaves the old file intact.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, self.to_text().as_bytes())
    }
}

/// Replace `path` with `contents` via temp file and rename
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| Error::IoError(format!("Failed to create temp file in {}: {}", dir.display(), e)))?;
    tmp.write_all(contents)
        .map_err(|e| Error::IoError(format!("Failed to write {}: {}", path.display(), e)))?;

    if let Ok(meta) = fs::metadata(path) {
        // keep the original mode
        if let Err(e) = fs::set_permissions(tmp.path(), meta.permissions()) {
            warn!("Could not copy permissions of {}: {}", path.display(), e);
        }
    }

    tmp.persist(path)
        .map_err(|e| Error::IoError(format!("Failed to replace {}: {}", path.display(), e.error)))?;
    Ok(())
}
