//! JSONL output records for the downstream dataset writer.
//!
//! One JSON object per recoverable theorem, one object per line. An empty
//! after-state is written as the literal `"no goals"`.

use std::{collections::BTreeMap, fmt, io::Write};

use serde::Serialize;

use crate::{
    error::Result,
    position::FilePos,
    project::Project,
    tactics::{RootTactic, Tactic},
    theorem::{extract_theorems, Theorem},
};

const NO_GOALS: &str = "no goals";

/// One tactic step as it appears in the dataset.
#[derive(Debug, Clone, Serialize)]
pub struct TacticRecord {
    pub tactic: String,
    pub tactic_before: String,
    pub tactic_after: String,
    pub tactic_start: FilePos,
    pub tactic_stop: FilePos,
}

impl TacticRecord {
    fn from_tactic(tactic: &Tactic) -> Self {
        let after = if tactic.after.is_empty() {
            NO_GOALS.to_string()
        } else {
            tactic.after.join("\n\n")
        };
        Self {
            tactic: tactic.text.clone(),
            tactic_before: tactic.before.join("\n\n"),
            tactic_after: after,
            tactic_start: tactic.range.start,
            tactic_stop: tactic.range.stop,
        }
    }
}

/// A root tactic block: the compound step plus its flattened sub-steps.
#[derive(Debug, Clone, Serialize)]
pub struct RootTacticRecord {
    #[serde(flatten)]
    pub step: TacticRecord,
    pub tactics: Vec<TacticRecord>,
}

impl RootTacticRecord {
    fn from_root(root: &RootTactic) -> Self {
        Self {
            step: TacticRecord::from_tactic(&root.tactic),
            tactics: root.children.iter().map(TacticRecord::from_tactic).collect(),
        }
    }
}

/// The per-theorem dataset record.
#[derive(Debug, Clone, Serialize)]
pub struct TheoremRecord {
    pub module: String,
    pub theorem: String,
    pub theorem_signature: String,
    pub theorem_operator: String,
    pub theorem_proof: String,
    pub tactic_before: Option<String>,
    pub tactic_after: String,
    pub start: FilePos,
    pub stop: FilePos,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tactics: Option<RootTacticRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ref_tactics: Vec<RootTacticRecord>,
}

impl TheoremRecord {
    pub fn new(module: &str, theorem: &Theorem) -> Self {
        let tactic_after = match theorem.post_goal_state.as_deref() {
            Some(state) if !state.is_empty() => state.to_string(),
            _ => NO_GOALS.to_string(),
        };
        Self {
            module: module.to_string(),
            theorem: theorem.name.clone(),
            theorem_signature: theorem.signature.clone(),
            theorem_operator: theorem.operator.clone(),
            theorem_proof: theorem.proof.clone(),
            tactic_before: theorem.prior_goal_state.clone(),
            tactic_after,
            start: theorem.proof_range.start,
            stop: theorem.proof_range.stop,
            tactics: theorem.proof_tactic.as_ref().map(RootTacticRecord::from_root),
            ref_tactics: theorem
                .sibling_tactics
                .iter()
                .map(RootTacticRecord::from_root)
                .collect(),
        }
    }
}

/// Newline-delimited JSON writer.
pub struct JsonlWriter<W: Write> {
    out: W,
}

impl<W: Write> JsonlWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write(&mut self, record: &impl Serialize) -> Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Running tally of proof operators seen across a run.
#[derive(Debug, Default)]
pub struct OperatorTally {
    counts: BTreeMap<String, u64>,
}

impl OperatorTally {
    pub fn record(&mut self, operator: &str) {
        *self.counts.entry(operator.to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, operator: &str) -> u64 {
        self.counts.get(operator).copied().unwrap_or(0)
    }
}

impl fmt::Display for OperatorTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (operator, count) in &self.counts {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "'{operator}': {count}")?;
            first = false;
        }
        Ok(())
    }
}

/// Extract one module and append its theorem records to the writer.
///
/// Returns the number of records written.
pub fn process_module<W: Write>(
    project: &Project,
    module: &[String],
    writer: &mut JsonlWriter<W>,
    tally: &mut OperatorTally,
) -> Result<usize> {
    let module_name = module.join(".");
    let theorems = extract_theorems(project, module)?;
    for theorem in &theorems {
        writer.write(&TheoremRecord::new(&module_name, theorem))?;
        tally.record(&theorem.operator);
    }
    Ok(theorems.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{FilePos, FileRange};

    fn tactic(text: &str, after: Vec<String>) -> Tactic {
        Tactic {
            range: FileRange::new(FilePos::new(2, 3), FilePos::new(2, 10)),
            text: text.to_string(),
            before: vec!["⊢ True".to_string()],
            after,
        }
    }

    #[test]
    fn empty_after_state_becomes_no_goals() {
        let record = TacticRecord::from_tactic(&tactic("trivial", vec![]));
        assert_eq!(record.tactic_after, "no goals");
        let record = TacticRecord::from_tactic(&tactic("intro x", vec!["⊢ P x".to_string()]));
        assert_eq!(record.tactic_after, "⊢ P x");
    }

    #[test]
    fn root_record_flattens_step_fields() {
        let root = RootTactic {
            tactic: tactic("by trivial", vec![]),
            children: vec![tactic("trivial", vec![])],
        };
        let json = serde_json::to_value(RootTacticRecord::from_root(&root)).unwrap();
        assert_eq!(json["tactic"], "by trivial");
        assert_eq!(json["tactics"][0]["tactic"], "trivial");
        assert_eq!(json["tactic_start"]["line"], 2);
    }

    #[test]
    fn jsonl_writer_emits_one_line_per_record() {
        let mut buffer = Vec::new();
        {
            let mut writer = JsonlWriter::new(&mut buffer);
            writer.write(&serde_json::json!({"a": 1})).unwrap();
            writer.write(&serde_json::json!({"b": 2})).unwrap();
        }
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().count(), 2);
        for line in text.lines() {
            serde_json::from_str::<serde_json::Value>(line).unwrap();
        }
    }

    #[test]
    fn tally_counts_operators() {
        let mut tally = OperatorTally::default();
        tally.record(":=");
        tally.record(":=");
        tally.record("|");
        assert_eq!(tally.count(":="), 2);
        assert_eq!(tally.count("|"), 1);
        assert_eq!(tally.to_string(), "':=': 2, '|': 1");
    }
}
