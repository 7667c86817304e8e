//! Extraction of theorem statements and tactic steps from Lean 4
//! elaboration artifacts.
//!
//! The analysis toolchain leaves, per module, a declaration list, an info
//! tree annotating syntax nodes with proof states and types, and a
//! line-offset table. This crate turns those into one dataset record per
//! theorem: signature, proof text, proof operator, and the ordered tactic
//! steps with their before/after goal states.

pub mod discover;
pub mod error;
pub mod namespace;
pub mod output;
pub mod position;
pub mod project;
pub mod source;
pub mod split;
pub mod tactics;
pub mod theorem;
pub mod tree;
