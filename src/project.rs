//! Per-module artifact loading.
//!
//! The analysis toolchain leaves one JSON file per module and plugin in an
//! artifact directory, named `<Module.Name>.<plugin>.json`. A missing
//! declaration or info-tree file means the module has nothing of interest
//! and is skipped without error; a missing line file only degrades
//! positions to the file-extent sentinels.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    error::Result,
    position::{LineEntry, LineTable},
    source::{SourceFile, SourceMap},
    tree::{Declaration, InfoNode},
};

const DECLARATION_PLUGIN: &str = "declaration";
const INFO_TREE_PLUGIN: &str = "elaboration";
const LINE_PLUGIN: &str = "line";
const AST_PLUGIN: &str = "ast";

/// A project under extraction: its artifact directory and the rule mapping
/// module names back to source files.
#[derive(Debug, Clone)]
pub struct Project {
    artifact_dir: PathBuf,
    sources: SourceMap,
}

impl Project {
    pub fn new(artifact_dir: impl Into<PathBuf>, sources: SourceMap) -> Self {
        Self {
            artifact_dir: artifact_dir.into(),
            sources,
        }
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    fn artifact_path(&self, module: &[String], plugin: &str) -> PathBuf {
        self.artifact_dir
            .join(format!("{}.{plugin}.json", module.join(".")))
    }

    fn load_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// Declaration records, or `None` when the module has no declaration
    /// artifact.
    pub fn load_declarations(&self, module: &[String]) -> Result<Option<Vec<Declaration>>> {
        self.load_json(&self.artifact_path(module, DECLARATION_PLUGIN))
    }

    /// Info-tree forest, or `None` when the module has no elaboration
    /// artifact.
    pub fn load_info_tree(&self, module: &[String]) -> Result<Option<Vec<InfoNode>>> {
        self.load_json(&self.artifact_path(module, INFO_TREE_PLUGIN))
    }

    /// Line table; empty when the artifact is absent, signaling "positions
    /// unavailable".
    pub fn load_line_table(&self, module: &[String]) -> Result<LineTable> {
        let entries: Option<Vec<LineEntry>> =
            self.load_json(&self.artifact_path(module, LINE_PLUGIN))?;
        Ok(entries.map(LineTable::from_entries).unwrap_or_default())
    }

    /// Raw syntax artifact for the fallback scan, if present.
    pub fn load_ast(&self, module: &[String]) -> Result<Option<Value>> {
        self.load_json(&self.artifact_path(module, AST_PLUGIN))
    }

    /// The module's source file, loaded through the source map.
    pub fn load_source(&self, module: &[String]) -> Result<SourceFile> {
        Ok(SourceFile::load(&self.sources.resolve(module))?)
    }
}
