//! Source file access: module-name to path mapping and byte-accurate span
//! extraction.
//!
//! Columns in a `FilePos` are byte columns, so span extraction slices each
//! line's bytes and re-decodes, rather than indexing by character.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::position::FileRange;

/// One source directory, optionally claimed by a module-name prefix.
#[derive(Debug, Clone)]
pub struct SourceRoot {
    /// First-component prefix this root serves, e.g. `Mathlib`. `None`
    /// marks the default root.
    pub prefix: Option<String>,
    pub path: PathBuf,
}

/// Module name to file path substitution rule.
///
/// The first root whose prefix matches the module's leading component
/// wins; the default root catches the rest. Components may themselves be
/// dotted and expand to nested directories.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    roots: Vec<SourceRoot>,
}

impl SourceMap {
    pub fn new(default_root: impl Into<PathBuf>) -> Self {
        Self {
            roots: vec![SourceRoot {
                prefix: None,
                path: default_root.into(),
            }],
        }
    }

    /// Register a prefixed root, consulted before the default.
    pub fn with_root(mut self, prefix: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.roots.insert(
            0,
            SourceRoot {
                prefix: Some(prefix.into()),
                path: path.into(),
            },
        );
        self
    }

    /// Resolve a module name to its `.lean` file path.
    pub fn resolve(&self, module: &[String]) -> PathBuf {
        let root = self
            .roots
            .iter()
            .find(|root| match (&root.prefix, module.first()) {
                (Some(prefix), Some(first)) => first.starts_with(prefix.as_str()),
                (None, _) => true,
                _ => false,
            })
            .or_else(|| self.roots.last());

        let mut path = root.map_or_else(PathBuf::new, |r| r.path.clone());
        for component in module {
            for part in component.split('.') {
                path.push(part);
            }
        }
        path.set_extension("lean");
        path
    }
}

/// A loaded source file, split into lines with their terminators kept.
#[derive(Debug, Clone)]
pub struct SourceFile {
    lines: Vec<String>,
}

impl SourceFile {
    pub fn load(path: &Path) -> io::Result<Self> {
        Ok(Self::from_text(&fs::read_to_string(path)?))
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.split_inclusive('\n').map(str::to_string).collect(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Literal text of a resolved range, the stop position excluded.
    /// Out-of-bounds lines and columns clamp; the result is re-decoded
    /// lossily from the byte slices.
    pub fn slice(&self, range: &FileRange) -> String {
        let first = (range.start.line as usize).saturating_sub(1);
        let last = (range.stop.line as usize).min(self.lines.len());
        if first >= last {
            return String::new();
        }
        let start_col = (range.start.column as usize).saturating_sub(1);
        let stop_col = (range.stop.column as usize).saturating_sub(1);

        if last - first == 1 {
            return cut(&self.lines[first], start_col, Some(stop_col));
        }
        let mut text = cut(&self.lines[first], start_col, None);
        for line in &self.lines[first + 1..last - 1] {
            text.push_str(line);
        }
        text.push_str(&cut(&self.lines[last - 1], 0, Some(stop_col)));
        text
    }
}

fn cut(line: &str, start: usize, stop: Option<usize>) -> String {
    let bytes = line.as_bytes();
    let start = start.min(bytes.len());
    let stop = stop.unwrap_or(bytes.len()).min(bytes.len()).max(start);
    String::from_utf8_lossy(&bytes[start..stop]).into_owned()
}
