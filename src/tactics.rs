//! Tactic, term and macro collection over the info tree.
//!
//! The elaborator re-emits the same tactic span at several tree levels, so
//! collection is cursor-tracked: a candidate contained in the previously
//! accepted span is a duplicate emission and is skipped. Acceptance is
//! monotonic left-to-right in source order.

use crate::{
    position::{FileRange, LineTable},
    tree::{InfoNode, InfoTreeWalker, NodeInfo, NodeRef, TacticData},
};

/// One proof step with its goal states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tactic {
    pub range: FileRange,
    pub text: String,
    /// Goal states pending before the step.
    pub before: Vec<String>,
    /// Goal states pending after the step.
    pub after: Vec<String>,
}

/// The outermost tactic-bearing node of a proof, with its flattened
/// sub-steps.
///
/// Children are strictly nested within the root's range and appear in
/// source order without overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootTactic {
    pub tactic: Tactic,
    pub children: Vec<Tactic>,
}

/// Build one tactic step from a node, or reject it.
///
/// Rejections: compound text (newline or semicolon) when `skip_compound`
/// is set, the bare `by` entry marker, and any span contained in the
/// previously accepted one.
fn build_tactic(
    node_ref: &NodeRef,
    data: &TacticData,
    lines: &LineTable,
    skip_compound: bool,
    previous: Option<&FileRange>,
) -> Option<Tactic> {
    let text = node_ref.pp.as_deref()?;
    if skip_compound && (text.contains('\n') || text.contains(';')) {
        return None;
    }
    let range = lines.file_range(node_ref.range);
    if let Some(previous) = previous {
        if previous.contains(&range) {
            return None;
        }
    }
    if text == "by" {
        return None;
    }
    Some(Tactic {
        range,
        text: text.to_string(),
        before: data.before.iter().map(|g| g.pp.clone()).collect(),
        after: data.after.iter().map(|g| g.pp.clone()).collect(),
    })
}

/// Flatten the atomic proof steps below a root tactic.
///
/// Descends through every node whether or not it matched, since nested
/// tactic calls sit under non-tactic wrapper nodes. The cursor threads
/// through the whole recursion so acceptance stays monotonic.
fn collect_sub_tactics(
    nodes: &[InfoNode],
    lines: &LineTable,
    cursor: &mut Option<FileRange>,
    out: &mut Vec<Tactic>,
) {
    for node in nodes {
        if let NodeInfo::Tactic(data) = &node.info {
            if let Some(tactic) = build_tactic(&node.node_ref, data, lines, true, cursor.as_ref()) {
                *cursor = Some(tactic.range);
                out.push(tactic);
            }
        }
        collect_sub_tactics(&node.children, lines, cursor, out);
    }
}

/// Collect the root tactics of a forest, each with its sub-steps.
///
/// Within one sibling list, the first tactic-bearing node wins and the
/// rest of the list is not searched; nodes without tactic info delegate
/// to their own children. The final sort by range is a correctness
/// safeguard, traversal order already yields it.
pub fn collect_root_tactics(forest: &[InfoNode], lines: &LineTable) -> Vec<RootTactic> {
    let mut roots = Vec::new();
    collect_roots(forest, lines, &mut roots);
    roots.sort_by_key(|root| root.tactic.range);
    roots
}

fn collect_roots(nodes: &[InfoNode], lines: &LineTable, out: &mut Vec<RootTactic>) {
    for node in nodes {
        if let NodeInfo::Tactic(data) = &node.info {
            // Compound text is legitimate for a whole proof block, so only
            // the duplicate-span check against the previous root applies.
            let previous = out.last().map(|root| root.tactic.range);
            if let Some(tactic) =
                build_tactic(&node.node_ref, data, lines, false, previous.as_ref())
            {
                let mut children = Vec::new();
                let mut cursor = None;
                collect_sub_tactics(&node.children, lines, &mut cursor, &mut children);
                out.push(RootTactic { tactic, children });
            }
            // One root per sibling list; later siblings re-emit this span.
            return;
        }
        collect_roots(&node.children, lines, out);
    }
}

/// Root tactics whose range falls inside the given range, in
/// non-decreasing start order.
///
/// A theorem may contain more than one top-level tactic invocation
/// (`where` clauses produce extra `by` blocks), so all matches are kept.
pub fn find_root_tactics(range: &FileRange, roots: &[RootTactic]) -> Vec<RootTactic> {
    roots
        .iter()
        .filter(|root| range.contains(&root.tactic.range))
        .cloned()
        .collect()
}

/// An identifier reference with its resolved type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub range: FileRange,
    pub ident: String,
    pub ty: String,
}

/// Gather identifier references that carry a resolved type and no expected
/// type.
///
/// These are the nodes where a declaration's own name appears as a value;
/// their type recovers the statement when structured signature data is
/// missing. The discriminator is a heuristic, not a verified invariant.
/// A matched node's subtree is not searched: elaboration of the reference
/// re-mentions the same identifier below it with narrower types.
pub fn collect_terms(forest: &[InfoNode], lines: &LineTable) -> Vec<Term> {
    let mut terms = Vec::new();
    collect_terms_into(forest, lines, &mut terms);
    terms
}

fn collect_terms_into(nodes: &[InfoNode], lines: &LineTable, out: &mut Vec<Term>) {
    for node in nodes {
        match &node.info {
            NodeInfo::Term(term)
                if node.node_ref.kind == ["ident"] && term.expected_type.is_none() =>
            {
                out.push(Term {
                    range: lines.file_range(node.node_ref.range),
                    ident: term.value.clone(),
                    ty: term.ty.clone(),
                });
            }
            _ => collect_terms_into(&node.children, lines, out),
        }
    }
}

/// First term inside `range` whose identifier matches.
pub fn find_term<'a>(range: &FileRange, ident: &str, terms: &'a [Term]) -> Option<&'a Term> {
    terms
        .iter()
        .find(|term| range.contains(&term.range) && term.ident == ident)
}

/// A macro expansion with a resolved source range.
#[derive(Debug, Clone)]
pub struct MacroExpansion {
    pub range: FileRange,
    pub kind: Vec<String>,
}

/// Gather macro expansions carrying a resolved range. Diagnostic lookup
/// only.
pub fn collect_macros(forest: &[InfoNode], lines: &LineTable) -> Vec<MacroExpansion> {
    InfoTreeWalker::new(forest)
        .filter_map(|node| match &node.info {
            NodeInfo::Macro(data) if data.expanded.range.is_some() => Some(MacroExpansion {
                range: lines.file_range(data.expanded.range),
                kind: data.expanded.kind.clone(),
            }),
            _ => None,
        })
        .collect()
}

/// Macro expansions inside the given range.
pub fn find_macros<'a>(range: &FileRange, macros: &'a [MacroExpansion]) -> Vec<&'a MacroExpansion> {
    macros.iter().filter(|m| range.contains(&m.range)).collect()
}
