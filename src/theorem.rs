//! Theorem assembly: joining declarations, root tactics and term
//! annotations into complete theorem records.

use crate::{
    error::{ExtractError, Result},
    position::{FileRange, LineTable},
    project::Project,
    source::SourceFile,
    split::split_signature_proof,
    tactics::{
        collect_macros, collect_root_tactics, collect_terms, find_macros, find_root_tactics,
        find_term, RootTactic, Term,
    },
    tree::Declaration,
};

/// Recognized proof operators in structured value text. Anything else
/// routes the declaration through the text-level splitter.
const STRUCTURED_OPERATORS: &[&str] = &[":=", "|"];

/// A fully assembled theorem record.
#[derive(Debug, Clone)]
pub struct Theorem {
    pub range: FileRange,
    pub name: String,
    pub signature: String,
    pub signature_range: FileRange,
    /// Token that begins the proof: `:=`, `|`, or (after stripping) `by`.
    pub operator: String,
    pub proof: String,
    pub proof_range: FileRange,
    /// Primary proof tactic for `by`-started proofs.
    pub proof_tactic: Option<RootTactic>,
    /// Remaining in-range root tactics, e.g. `by` blocks from `where`
    /// clauses.
    pub sibling_tactics: Vec<RootTactic>,
    /// Goal state before the proof: the primary tactic's before-state, or
    /// the theorem's own statement type recovered from a term annotation.
    pub prior_goal_state: Option<String>,
    /// Goal state after the primary tactic, if any remains.
    pub post_goal_state: Option<String>,
}

impl Theorem {
    pub fn starts_by_tactic(&self) -> bool {
        self.proof.split_whitespace().next() == Some("by")
    }
}

/// Extract every recoverable theorem of one module.
///
/// A module without declaration or info-tree artifacts yields an empty
/// list; individual unrecoverable theorems are dropped with a diagnostic.
pub fn extract_theorems(project: &Project, module: &[String]) -> Result<Vec<Theorem>> {
    let module_name = module.join(".");
    let Some(declarations) = project.load_declarations(module)? else {
        tracing::debug!(module = %module_name, "no declaration artifact, skipping");
        return Ok(Vec::new());
    };
    let Some(forest) = project.load_info_tree(module)? else {
        tracing::debug!(module = %module_name, "no info tree artifact, skipping");
        return Ok(Vec::new());
    };
    let lines = project.load_line_table(module)?;

    let roots = collect_root_tactics(&forest, &lines);
    let terms = collect_terms(&forest, &lines);
    let macros = collect_macros(&forest, &lines);
    let source = match project.load_source(module) {
        Ok(source) => Some(source),
        Err(e) => {
            tracing::debug!(module = %module_name, error = %e, "source file unavailable");
            None
        }
    };

    let mut theorems = Vec::new();
    for decl in &declarations {
        if decl.kind != "theorem" {
            continue;
        }
        if decl.name.is_empty() || decl.name[0] == "_private" {
            continue;
        }
        let range = lines.file_range(decl.decl_ref.range);
        let assembled = assemble(
            &module_name,
            decl,
            range,
            &lines,
            source.as_ref(),
            &roots,
            &terms,
        );
        match assembled {
            Ok(theorem) => theorems.push(theorem),
            Err(e) => {
                let nearby_macros = find_macros(&range, &macros).len();
                tracing::warn!(error = %e, nearby_macros, "dropping theorem");
            }
        }
    }
    Ok(theorems)
}

#[allow(clippy::too_many_lines)]
fn assemble(
    module: &str,
    decl: &Declaration,
    range: FileRange,
    lines: &LineTable,
    source: Option<&SourceFile>,
    roots: &[RootTactic],
    terms: &[Term],
) -> std::result::Result<Theorem, ExtractError> {
    let name = decl.name.join(".");
    let mut tactics = find_root_tactics(&range, roots);

    let mut signature_range = lines.file_range(decl.signature.range);
    let mut signature = decl
        .signature
        .pp
        .clone()
        .or_else(|| source.map(|s| s.slice(&signature_range)))
        .unwrap_or_default();

    let mut proof_range = lines.file_range(decl.value.range);
    let mut statement = decl
        .value
        .pp
        .clone()
        .or_else(|| source.map(|s| s.slice(&proof_range)));

    let mut operator = statement.as_deref().and_then(first_token).map(str::to_string);

    if !matches!(operator.as_deref(), Some(op) if STRUCTURED_OPERATORS.contains(&op)) {
        // Structured value text is absent or does not begin a proof;
        // fall back to splitting the raw declaration span.
        let split = match (
            source,
            decl.signature.range.and_then(|r| r.start),
            decl.decl_ref.range.and_then(|r| r.stop),
        ) {
            (Some(source), Some(sig_start), Some(decl_stop)) => {
                split_signature_proof(source, lines, sig_start, decl_stop)
            }
            _ => None,
        };
        if let (Some((sig_range, new_proof_range)), Some(source)) = (split, source) {
            signature_range = sig_range;
            signature = source.slice(&signature_range);
            proof_range = new_proof_range;
            let text = source.slice(&proof_range);
            operator = first_token(&text).map(str::to_string);
            statement = Some(text);
        }
    }

    let statement = statement.ok_or_else(|| ExtractError::MissingProof {
        module: module.to_string(),
        theorem: name.clone(),
    })?;
    let operator = operator.ok_or_else(|| ExtractError::MissingOperator {
        module: module.to_string(),
        theorem: name.clone(),
    })?;

    let rest = statement.trim_start();
    let proof = rest.strip_prefix(&operator).unwrap_or(rest).trim();
    let starts_by = first_token(proof) == Some("by");

    let mut proof_tactic = None;
    let mut prior_goal_state = None;
    let mut post_goal_state = None;
    if starts_by && !tactics.is_empty() {
        let primary = tactics.remove(0);
        prior_goal_state = Some(primary.tactic.before.join("\n\n"));
        post_goal_state = (!primary.tactic.after.is_empty())
            .then(|| primary.tactic.after.join("\n\n"));
        proof_tactic = Some(primary);
    }

    if proof_tactic.is_none() {
        // Term-mode proof: recover the statement type from the node where
        // the theorem's own name appears as a value.
        let term = lookup_candidates(&decl.name)
            .into_iter()
            .find_map(|candidate| find_term(&range, &candidate, terms));
        match term {
            Some(term) => prior_goal_state = Some(term.ty.clone()),
            None => {
                return Err(ExtractError::NoGoalEvidence {
                    module: module.to_string(),
                    theorem: name,
                })
            }
        }
    }

    Ok(Theorem {
        range,
        name,
        signature,
        signature_range,
        operator,
        proof: proof.to_string(),
        proof_range,
        proof_tactic,
        sibling_tactics: tactics,
        prior_goal_state,
        post_goal_state,
    })
}

/// First whitespace-delimited token, with embedded line breaks and tabs
/// treated as separators.
fn first_token(text: &str) -> Option<&str> {
    text.split_whitespace().next()
}

/// Ordered name-lookup strategies for the term fallback.
///
/// Progressively shorter dotted suffixes, then the `_root_`-qualified
/// name, then the bracket-quoted last component; each candidate is also
/// tried `@`-prefixed.
fn lookup_candidates(name: &[String]) -> Vec<String> {
    let mut bases = Vec::new();
    for from in 0..name.len() {
        bases.push(name[from..].join("."));
    }
    bases.push(format!("_root_.{}", name.join(".")));
    if let Some(last) = name.last() {
        bases.push(format!("«{last}»"));
    }
    bases
        .into_iter()
        .flat_map(|base| {
            let prefixed = format!("@{base}");
            [base, prefixed]
        })
        .collect()
}
