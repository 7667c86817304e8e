//! End-to-end extraction over an on-disk artifact set.

use std::fs;
use std::path::Path;

use lean_extract::{
    output::{process_module, JsonlWriter, OperatorTally},
    project::Project,
    source::SourceMap,
    theorem::extract_theorems,
};
use serde_json::{json, Value};

fn write_json(dir: &Path, name: &str, value: &Value) {
    fs::write(dir.join(name), serde_json::to_string(value).unwrap()).unwrap();
}

/// Artifact set with one tactic-mode theorem, one term-mode theorem, and
/// one unrecoverable declaration.
fn setup(root: &Path) -> Project {
    let source = "theorem foo : True := by\n  trivial\ntheorem tmode : True := trivial\ntheorem bad : True\n";
    fs::create_dir_all(root.join("Test")).unwrap();
    fs::write(root.join("Test/Basic.lean"), source).unwrap();

    let artifacts = root.join(".jixia");
    fs::create_dir_all(&artifacts).unwrap();

    write_json(
        &artifacts,
        "Test.Basic.line.json",
        &json!([{"start": 0}, {"start": 25}, {"start": 35}, {"start": 67}]),
    );
    write_json(
        &artifacts,
        "Test.Basic.declaration.json",
        &json!([
            {
                "kind": "theorem",
                "name": ["foo"],
                "signature": {"pp": "foo : True", "range": {"start": 8, "stop": 18}},
                "value": {"pp": ":= by\n  trivial", "range": {"start": 19, "stop": 34}},
                "ref": {"range": {"start": 0, "stop": 34}}
            },
            {
                "kind": "theorem",
                "name": ["tmode"],
                "signature": {"pp": "tmode : True", "range": {"start": 43, "stop": 55}},
                "value": {"pp": ":= trivial", "range": {"start": 56, "stop": 66}},
                "ref": {"range": {"start": 35, "stop": 66}}
            },
            {
                "kind": "theorem",
                "name": ["bad"],
                "signature": {"pp": null, "range": {"start": 75, "stop": 85}},
                "value": {"pp": null, "range": null},
                "ref": {"range": {"start": 67, "stop": 85}}
            }
        ]),
    );
    write_json(
        &artifacts,
        "Test.Basic.elaboration.json",
        &json!([
            {
                "ref": {"pp": "theorem foo : True := by\n  trivial",
                        "range": {"start": 0, "stop": 34}, "kind": ["command"]},
                "info": null,
                "children": [
                    {
                        "ref": {"pp": "by\n  trivial",
                                "range": {"start": 22, "stop": 34}, "kind": ["by"]},
                        "info": {"tactic": {"before": [{"pp": "⊢ True"}], "after": []}},
                        "children": [
                            {
                                "ref": {"pp": "trivial",
                                        "range": {"start": 27, "stop": 34}, "kind": ["tactic"]},
                                "info": {"tactic": {"before": [{"pp": "⊢ True"}], "after": []}},
                                "children": []
                            }
                        ]
                    }
                ]
            },
            {
                "ref": {"pp": "theorem tmode : True := trivial",
                        "range": {"start": 35, "stop": 66}, "kind": ["command"]},
                "info": null,
                "children": [
                    {
                        "ref": {"pp": "tmode", "range": {"start": 43, "stop": 48},
                                "kind": ["ident"]},
                        "info": {"term": {"value": "tmode", "type": "True",
                                          "expected_type": null}},
                        "children": []
                    }
                ]
            }
        ]),
    );

    Project::new(artifacts, SourceMap::new(root))
}

fn module() -> Vec<String> {
    vec!["Test".to_string(), "Basic".to_string()]
}

#[test]
fn extracts_tactic_and_term_mode_theorems() {
    let dir = tempfile::tempdir().unwrap();
    let project = setup(dir.path());

    let theorems = extract_theorems(&project, &module()).unwrap();
    assert_eq!(theorems.len(), 2, "the bad declaration must be dropped");

    let foo = &theorems[0];
    assert_eq!(foo.name, "foo");
    assert_eq!(foo.operator, ":=");
    assert_eq!(foo.proof, "by\n  trivial");
    assert!(foo.starts_by_tactic());
    let primary = foo.proof_tactic.as_ref().unwrap();
    assert_eq!(primary.tactic.text, "by\n  trivial");
    assert_eq!(primary.children.len(), 1);
    assert_eq!(primary.children[0].text, "trivial");
    assert_eq!(foo.prior_goal_state.as_deref(), Some("⊢ True"));
    assert!(foo.post_goal_state.is_none());
    assert!(foo.sibling_tactics.is_empty());

    let tmode = &theorems[1];
    assert_eq!(tmode.name, "tmode");
    assert_eq!(tmode.operator, ":=");
    assert_eq!(tmode.proof, "trivial");
    assert!(!tmode.starts_by_tactic());
    assert!(tmode.proof_tactic.is_none());
    assert_eq!(tmode.prior_goal_state.as_deref(), Some("True"));
}

#[test]
fn records_serialize_one_theorem_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let project = setup(dir.path());

    let mut buffer = Vec::new();
    let mut tally = OperatorTally::default();
    {
        let mut writer = JsonlWriter::new(&mut buffer);
        let written = process_module(&project, &module(), &mut writer, &mut tally).unwrap();
        assert_eq!(written, 2);
    }
    assert_eq!(tally.count(":="), 2);

    let text = String::from_utf8(buffer).unwrap();
    let records: Vec<Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 2);

    let foo = &records[0];
    assert_eq!(foo["module"], "Test.Basic");
    assert_eq!(foo["theorem"], "foo");
    assert_eq!(foo["theorem_operator"], ":=");
    assert_eq!(foo["theorem_proof"], "by\n  trivial");
    assert_eq!(foo["tactic_before"], "⊢ True");
    assert_eq!(foo["tactic_after"], "no goals");
    assert_eq!(foo["start"]["line"], 1);
    assert_eq!(foo["start"]["column"], 20);
    assert_eq!(foo["tactics"]["tactic"], "by\n  trivial");
    assert_eq!(foo["tactics"]["tactics"][0]["tactic"], "trivial");
    assert!(foo.get("ref_tactics").is_none());

    let tmode = &records[1];
    assert_eq!(tmode["tactic_before"], "True");
    assert_eq!(tmode["tactic_after"], "no goals");
    assert!(tmode.get("tactics").is_none());
}

/// Artifact set with a `where` clause (a second in-range `by` block) and a
/// match-alternative theorem proved with the `|` operator.
fn setup_where_and_alternative(root: &Path) -> Project {
    let source = "theorem two : True := by\n  trivial\nwhere\n  aux : True := by\n    exact trivial\ntheorem alt : True\n  | trivial\n";
    fs::write(root.join("Deep.lean"), source).unwrap();

    let artifacts = root.join(".jixia");
    fs::create_dir_all(&artifacts).unwrap();

    write_json(
        &artifacts,
        "Deep.line.json",
        &json!([
            {"start": 0}, {"start": 25}, {"start": 35}, {"start": 41},
            {"start": 60}, {"start": 78}, {"start": 97}
        ]),
    );
    write_json(
        &artifacts,
        "Deep.declaration.json",
        &json!([
            {
                "kind": "theorem",
                "name": ["two"],
                "signature": {"pp": "two : True", "range": {"start": 8, "stop": 18}},
                "value": {"pp": ":= by\n  trivial\nwhere\n  aux : True := by\n    exact trivial",
                          "range": {"start": 19, "stop": 77}},
                "ref": {"range": {"start": 0, "stop": 77}}
            },
            {
                "kind": "theorem",
                "name": ["alt"],
                "signature": {"pp": "alt : True", "range": {"start": 86, "stop": 96}},
                "value": {"pp": "| trivial", "range": {"start": 99, "stop": 108}},
                "ref": {"range": {"start": 78, "stop": 108}}
            }
        ]),
    );
    write_json(
        &artifacts,
        "Deep.elaboration.json",
        &json!([
            {
                "ref": {"range": {"start": 0, "stop": 77}, "kind": ["command"]},
                "info": null,
                "children": [
                    {
                        "ref": {"range": {"start": 19, "stop": 34}, "kind": ["term"]},
                        "info": null,
                        "children": [
                            {
                                "ref": {"pp": "by\n  trivial",
                                        "range": {"start": 22, "stop": 34}, "kind": ["by"]},
                                "info": {"tactic": {"before": [{"pp": "⊢ True"}], "after": []}},
                                "children": [
                                    {
                                        "ref": {"pp": "trivial",
                                                "range": {"start": 27, "stop": 34},
                                                "kind": ["tactic"]},
                                        "info": {"tactic": {"before": [{"pp": "⊢ True"}],
                                                            "after": []}},
                                        "children": []
                                    }
                                ]
                            }
                        ]
                    },
                    {
                        "ref": {"range": {"start": 41, "stop": 77}, "kind": ["whereDecls"]},
                        "info": null,
                        "children": [
                            {
                                "ref": {"pp": "by\n    exact trivial",
                                        "range": {"start": 57, "stop": 77}, "kind": ["by"]},
                                "info": {"tactic": {"before": [{"pp": "⊢ True"}], "after": []}},
                                "children": [
                                    {
                                        "ref": {"pp": "exact trivial",
                                                "range": {"start": 64, "stop": 77},
                                                "kind": ["tactic"]},
                                        "info": {"tactic": {"before": [{"pp": "⊢ True"}],
                                                            "after": []}},
                                        "children": []
                                    }
                                ]
                            }
                        ]
                    }
                ]
            },
            {
                "ref": {"range": {"start": 78, "stop": 108}, "kind": ["command"]},
                "info": null,
                "children": [
                    {
                        "ref": {"pp": "alt", "range": {"start": 86, "stop": 89},
                                "kind": ["ident"]},
                        "info": {"term": {"value": "alt", "type": "True",
                                          "expected_type": null}},
                        "children": []
                    }
                ]
            }
        ]),
    );

    Project::new(artifacts, SourceMap::new(root))
}

#[test]
fn where_clause_keeps_sibling_tactic_blocks() {
    let dir = tempfile::tempdir().unwrap();
    let project = setup_where_and_alternative(dir.path());

    let theorems = extract_theorems(&project, &["Deep".to_string()]).unwrap();
    assert_eq!(theorems.len(), 2);

    let two = &theorems[0];
    assert_eq!(two.operator, ":=");
    assert!(two.starts_by_tactic());
    let primary = two.proof_tactic.as_ref().unwrap();
    assert_eq!(primary.tactic.text, "by\n  trivial");
    assert_eq!(two.sibling_tactics.len(), 1);
    assert_eq!(two.sibling_tactics[0].tactic.text, "by\n    exact trivial");
    assert_eq!(two.sibling_tactics[0].children[0].text, "exact trivial");

    let alt = &theorems[1];
    assert_eq!(alt.operator, "|");
    assert_eq!(alt.proof, "trivial");
    assert!(!alt.starts_by_tactic());
    assert!(alt.proof_tactic.is_none());
    assert!(alt.sibling_tactics.is_empty());
    assert_eq!(alt.prior_goal_state.as_deref(), Some("True"));
}

#[test]
fn records_emit_ref_tactics_and_alternative_operator() {
    let dir = tempfile::tempdir().unwrap();
    let project = setup_where_and_alternative(dir.path());

    let mut buffer = Vec::new();
    let mut tally = OperatorTally::default();
    {
        let mut writer = JsonlWriter::new(&mut buffer);
        let written =
            process_module(&project, &["Deep".to_string()], &mut writer, &mut tally).unwrap();
        assert_eq!(written, 2);
    }
    assert_eq!(tally.count(":="), 1);
    assert_eq!(tally.count("|"), 1);

    let text = String::from_utf8(buffer).unwrap();
    let records: Vec<Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    let two = &records[0];
    assert_eq!(two["tactics"]["tactic"], "by\n  trivial");
    assert_eq!(two["ref_tactics"][0]["tactic"], "by\n    exact trivial");
    assert_eq!(two["ref_tactics"][0]["tactics"][0]["tactic"], "exact trivial");
    assert_eq!(two["ref_tactics"][0]["tactic_start"]["line"], 4);
    assert_eq!(two["ref_tactics"][0]["tactic_start"]["column"], 17);

    let alt = &records[1];
    assert_eq!(alt["theorem_operator"], "|");
    assert_eq!(alt["theorem_proof"], "trivial");
    assert_eq!(alt["tactic_before"], "True");
    assert!(alt.get("tactics").is_none());
    assert!(alt.get("ref_tactics").is_none());
}

#[test]
fn missing_artifacts_yield_no_records() {
    let dir = tempfile::tempdir().unwrap();
    let project = Project::new(dir.path().join(".jixia"), SourceMap::new(dir.path()));
    let theorems = extract_theorems(&project, &module()).unwrap();
    assert!(theorems.is_empty());
}

#[test]
fn splitter_recovers_signature_when_value_text_lacks_operator() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let source = "theorem qux : True := by\n  simp\n";
    fs::write(root.join("Lone.lean"), source).unwrap();

    let artifacts = root.join(".jixia");
    fs::create_dir_all(&artifacts).unwrap();
    write_json(
        &artifacts,
        "Lone.line.json",
        &json!([{"start": 0}, {"start": 25}]),
    );
    write_json(
        &artifacts,
        "Lone.declaration.json",
        &json!([{
            "kind": "theorem",
            "name": ["qux"],
            "signature": {"pp": null, "range": {"start": 8, "stop": 18}},
            "value": {"pp": "by\n  simp", "range": {"start": 22, "stop": 31}},
            "ref": {"range": {"start": 0, "stop": 31}}
        }]),
    );
    write_json(
        &artifacts,
        "Lone.elaboration.json",
        &json!([{
            "ref": {"pp": "by\n  simp", "range": {"start": 22, "stop": 31}, "kind": ["by"]},
            "info": {"tactic": {"before": [{"pp": "⊢ True"}], "after": []}},
            "children": []
        }]),
    );

    let project = Project::new(artifacts, SourceMap::new(root));
    let theorems = extract_theorems(&project, &["Lone".to_string()]).unwrap();
    assert_eq!(theorems.len(), 1);
    let qux = &theorems[0];
    assert_eq!(qux.operator, ":=");
    assert_eq!(qux.signature, "qux : True");
    assert_eq!(qux.proof, "by\n  simp");
    assert!(qux.proof_tactic.is_some());
}
