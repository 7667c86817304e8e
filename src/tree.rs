//! Data model of the elaboration artifacts and the info-tree walker.
//!
//! A module's info tree pairs syntax fragments with semantic annotations:
//! goal states around tactic applications, resolved types of identifier
//! references, and macro expansions. The walker is a plain pre-order
//! traversal; every collector downstream is a predicate over it.

use serde::Deserialize;

use crate::position::StringRange;

/// Syntax reference carried by every info-tree node.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeRef {
    /// Pretty-printed display text of the syntax fragment.
    #[serde(default)]
    pub pp: Option<String>,
    /// Byte span of the fragment in the source file.
    #[serde(default)]
    pub range: Option<StringRange>,
    /// Syntax-kind path, e.g. `["ident"]`.
    #[serde(default)]
    pub kind: Vec<String>,
}

/// A pretty-printed goal state snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct Goal {
    pub pp: String,
}

/// Goal states around one tactic application.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TacticData {
    #[serde(default)]
    pub before: Vec<Goal>,
    #[serde(default)]
    pub after: Vec<Goal>,
}

/// Semantic data attached to an identifier reference.
#[derive(Debug, Clone, Deserialize)]
pub struct TermData {
    /// The resolved identifier.
    pub value: String,
    /// The resolved type of the reference.
    #[serde(rename = "type")]
    pub ty: String,
    /// Expected type at the use site. Absent on the node that references a
    /// declaration's own statement, which is how such nodes are found.
    #[serde(default)]
    pub expected_type: Option<serde_json::Value>,
}

/// A recorded macro expansion.
#[derive(Debug, Clone, Deserialize)]
pub struct MacroData {
    /// Syntax the macro expanded to.
    pub expanded: NodeRef,
}

/// Annotation carried by an info-tree node, checked exhaustively.
///
/// The wire format carries the variants as sibling optional fields; a node
/// carries at most one of them in practice, and tactic data wins when the
/// producer emits more than one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Option<RawNodeInfo>")]
pub enum NodeInfo {
    #[default]
    None,
    Tactic(TacticData),
    Term(TermData),
    Macro(MacroData),
}

#[derive(Deserialize)]
struct RawNodeInfo {
    #[serde(default)]
    tactic: Option<TacticData>,
    #[serde(default)]
    term: Option<TermData>,
    #[serde(rename = "macro", default)]
    macro_: Option<MacroData>,
}

impl From<Option<RawNodeInfo>> for NodeInfo {
    fn from(raw: Option<RawNodeInfo>) -> Self {
        let Some(raw) = raw else {
            return Self::None;
        };
        if let Some(tactic) = raw.tactic {
            Self::Tactic(tactic)
        } else if let Some(term) = raw.term {
            Self::Term(term)
        } else if let Some(expansion) = raw.macro_ {
            Self::Macro(expansion)
        } else {
            Self::None
        }
    }
}

/// One node of the info tree. The parent exclusively owns its children;
/// the tree is finite and acyclic by construction of the deserializer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InfoNode {
    #[serde(rename = "ref", default)]
    pub node_ref: NodeRef,
    #[serde(default)]
    pub info: NodeInfo,
    #[serde(default)]
    pub children: Vec<InfoNode>,
}

/// Declaration record from the declaration artifact.
#[derive(Debug, Clone, Deserialize)]
pub struct Declaration {
    /// Declaration kind tag: `theorem`, `def`, `instance`, ...
    pub kind: String,
    /// Fully qualified name as an ordered component list.
    #[serde(default)]
    pub name: Vec<String>,
    #[serde(default)]
    pub signature: DeclSpan,
    #[serde(default)]
    pub value: DeclSpan,
    #[serde(rename = "ref", default)]
    pub decl_ref: DeclRef,
}

/// Text and span of one part of a declaration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeclSpan {
    #[serde(default)]
    pub pp: Option<String>,
    #[serde(default)]
    pub range: Option<StringRange>,
}

/// Overall source reference of a declaration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeclRef {
    #[serde(default)]
    pub range: Option<StringRange>,
}

/// Lazy pre-order traversal over an info-tree forest.
///
/// Depth-first, left-to-right, parent before children. Pure: restartable,
/// no filtering, no state beyond the visit stack.
pub struct InfoTreeWalker<'a> {
    stack: Vec<&'a InfoNode>,
}

impl<'a> InfoTreeWalker<'a> {
    pub fn new(forest: &'a [InfoNode]) -> Self {
        Self {
            stack: forest.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for InfoTreeWalker<'a> {
    type Item = &'a InfoNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
