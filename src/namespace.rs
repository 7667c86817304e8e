//! Namespace scope tracking and the raw-AST declaration scan.
//!
//! When structured declaration metadata is missing, declarations are
//! recovered straight from the syntax artifact: a scope stack follows
//! `namespace`/`end` commands so bare names found in the raw tree can be
//! qualified.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

/// Scope marker for declarations anchored at the root namespace.
const ROOT_MARKER: &str = "_root_";

/// Keywords that can never be a declaration or namespace name.
const NAME_KEYWORDS: &[&str] = &[
    "theorem",
    "lemma",
    "def",
    "instance",
    "namespace",
    "section",
    "protected",
    "private",
    "open",
    "variable",
];

/// Syntax kinds that introduce a declaration worth scanning.
const DECLARATION_KINDS: &[&str] = &["theorem", "lemma", "def", "instance", "declaration"];

static PROOF_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:by|where)\b|:=").expect("valid proof-start pattern"));
static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"--.*").expect("valid pattern"));
static BLOCK_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/-.*?-/").expect("valid pattern"));

/// Mutable stack of namespace components, scoped to one module pass.
///
/// Pushed on entering a `namespace` command, popped on its matching `end`.
/// Owned by the scan that uses it, never shared.
#[derive(Debug, Default)]
pub struct NamespaceScope {
    stack: Vec<String>,
}

impl NamespaceScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, name: impl Into<String>) {
        self.stack.push(name.into());
    }

    pub fn exit(&mut self) -> Option<String> {
        self.stack.pop()
    }

    pub fn top(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Qualify a bare name with the current scope.
    ///
    /// Root-marker components are dropped, and residual markers embedded
    /// in the joined name collapse with their adjacent separators.
    pub fn qualify(&self, name: &str) -> String {
        let joined = self
            .stack
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(name))
            .filter(|part| *part != ROOT_MARKER)
            .collect::<Vec<_>>()
            .join(".");
        let collapsed = joined.replace("._root_.", ".");
        match collapsed.strip_prefix("_root_.") {
            Some(stripped) => stripped.to_string(),
            None => collapsed,
        }
    }
}

/// A declaration recovered by the raw-AST scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScannedDecl {
    pub module: String,
    pub full_name: String,
    pub tactic_proof: String,
}

/// Recursive scan over a raw syntax artifact.
///
/// The artifact is schemaless JSON; nodes of interest are recognized by
/// their `kind` tag. Ranges already reported are skipped, guarding against
/// wrapper nodes that repeat their child's span.
pub struct AstScanner<'a> {
    module: &'a str,
    source: &'a [u8],
    scope: NamespaceScope,
    seen: HashSet<(u32, u32)>,
    decls: Vec<ScannedDecl>,
}

impl<'a> AstScanner<'a> {
    pub fn new(module: &'a str, source: &'a [u8]) -> Self {
        Self {
            module,
            source,
            scope: NamespaceScope::new(),
            seen: HashSet::new(),
            decls: Vec::new(),
        }
    }

    pub fn scan(mut self, root: &Value) -> Vec<ScannedDecl> {
        self.visit(root);
        self.decls
    }

    fn visit(&mut self, value: &Value) {
        match value {
            Value::Array(items) => {
                for item in items {
                    self.visit(item);
                }
            }
            Value::Object(_) => self.visit_node(value),
            _ => {}
        }
    }

    fn visit_node(&mut self, value: &Value) {
        let inner = match value.get("node") {
            Some(node @ Value::Object(_)) => node,
            Some(_) => return,
            None => value,
        };
        let kind = kind_string(inner);

        if kind.contains("namespace") {
            if let Some(name) = find_name(inner) {
                tracing::trace!(scope = self.scope.depth(), name = %name, "entering namespace");
                self.scope.enter(name);
            }
        }
        if kind.contains("command.end") {
            self.scope.exit();
        }

        if DECLARATION_KINDS.iter().any(|k| kind.contains(k)) {
            self.record_declaration(value, inner);
        }

        let Some(map) = inner.as_object() else {
            return;
        };
        for (key, child) in map {
            if key != "info" && (child.is_object() || child.is_array()) {
                self.visit(child);
            }
        }
    }

    fn record_declaration(&mut self, value: &Value, inner: &Value) {
        let Some(span) = full_range(value) else {
            return;
        };
        if self.seen.contains(&span) {
            return;
        }
        let Some(name) = find_name(inner) else {
            return;
        };
        // A namespace command re-encountered as a declaration-like node
        // would qualify itself; skip it.
        if self.scope.top() == Some(name.as_str()) {
            return;
        }
        self.seen.insert(span);

        let (start, stop) = (span.0 as usize, span.1 as usize);
        if start >= stop || stop > self.source.len() {
            return;
        }
        let text = String::from_utf8_lossy(&self.source[start..stop]);
        let Some(found) = PROOF_START.find(&text) else {
            return;
        };
        let proof = clean_proof(&text[found.start()..]);
        if proof.is_empty() {
            return;
        }
        self.decls.push(ScannedDecl {
            module: self.module.to_string(),
            full_name: self.scope.qualify(&name),
            tactic_proof: proof,
        });
    }
}

/// Lowercased kind tag of a node; the tag is either a plain string or an
/// object with a `name` field.
fn kind_string(inner: &Value) -> String {
    let kind = inner.get("kind");
    let text = match kind {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Object(map)) => map
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_default(),
        _ => String::new(),
    };
    text.to_lowercase()
}

/// First plausible identifier below a node: a raw atom or identifier value
/// that is neither a keyword nor an `@`-prefixed term.
fn find_name(node: &Value) -> Option<String> {
    let Some(map) = node.as_object() else {
        return None;
    };
    let direct = map
        .get("rawVal")
        .and_then(Value::as_str)
        .or_else(|| map.get("atom").and_then(|a| a.get("val")).and_then(Value::as_str))
        .or_else(|| {
            map.get("ident")
                .and_then(|i| i.get("rawVal"))
                .and_then(Value::as_str)
        });
    if let Some(val) = direct {
        if !NAME_KEYWORDS.contains(&val) && !val.starts_with('@') {
            return Some(val.to_string());
        }
    }

    if let Some(args) = map.get("args").and_then(Value::as_array) {
        for arg in args {
            if let Some(found) = find_name(arg) {
                return Some(found);
            }
        }
    }
    for (key, child) in map {
        if key != "args" && key != "info" && child.is_object() {
            if let Some(found) = find_name(child) {
                return Some(found);
            }
        }
    }
    None
}

/// Extreme byte offsets mentioned anywhere below a node.
fn full_range(value: &Value) -> Option<(u32, u32)> {
    let mut min = u32::MAX;
    let mut max = 0u32;
    let mut found = false;
    collect_offsets(value, &mut |offset| {
        min = min.min(offset);
        max = max.max(offset);
        found = true;
    });
    found.then_some((min, max))
}

fn collect_offsets(value: &Value, record: &mut impl FnMut(u32)) {
    match value {
        Value::Object(map) => {
            for key in ["pos", "endPos", "bytePos", "byteEndPos"] {
                if let Some(offset) = map.get(key).and_then(Value::as_u64) {
                    record(offset as u32);
                }
            }
            if let Some(original) = map.get("info").and_then(|i| i.get("original")) {
                for key in ["pos", "endPos"] {
                    if let Some(offset) = original.get(key).and_then(Value::as_u64) {
                        record(offset as u32);
                    }
                }
            }
            for child in map.values() {
                if child.is_object() || child.is_array() {
                    collect_offsets(child, record);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_offsets(item, record);
            }
        }
        _ => {}
    }
}

/// Trim a raw proof fragment: drop the leading operator characters, strip
/// comments, and cut at the first line that starts an unrelated command.
fn clean_proof(text: &str) -> String {
    let text = text.trim_start_matches([' ', '\t', '\n', ':', '=']);
    let text = LINE_COMMENT.replace_all(text, "");
    let text = BLOCK_COMMENT.replace_all(&text, "");

    const STOP_KEYWORDS: &[&str] = &[
        "theorem",
        "lemma",
        "instance",
        "variable",
        "section",
        "namespace",
        "def",
        "abbrev",
        "@[",
        "#",
    ];
    let mut kept = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim_start();
        if STOP_KEYWORDS.iter().any(|kw| trimmed.starts_with(kw)) {
            break;
        }
        kept.push(line);
    }
    kept.join("\n").trim().to_string()
}
