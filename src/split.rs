//! Text-level signature/proof splitting.
//!
//! Fallback for declarations whose structured value text is absent or does
//! not start with a recognized proof operator: find the literal assignment
//! token in the raw source and split the span there.

use crate::{
    position::{FileRange, LineTable, StringRange},
    source::SourceFile,
};

/// The assignment token searched for, with its mandatory surrounding
/// spaces so that `:=` inside an anonymous constructor does not match.
const ASSIGN_TOKEN: &str = " := ";

/// Split a declaration span into signature and proof ranges at the
/// assignment token.
///
/// The span from the signature start to the declaration end is fetched
/// from the source, embedded tabs/newlines/carriage-returns are normalized
/// to spaces so line wrapping cannot hide the token, and the first match
/// splits the span. Returns `None` when no token is present; such a
/// declaration is unrecoverable.
///
/// Assumes a single unambiguous top-level assignment token. A theorem
/// nested inside a signature would break this, but that is not legal in
/// the grammar this targets.
pub fn split_signature_proof(
    source: &SourceFile,
    lines: &LineTable,
    signature_start: u32,
    declaration_stop: u32,
) -> Option<(FileRange, FileRange)> {
    let span = lines.file_range(Some(StringRange::new(signature_start, declaration_stop)));
    let text = source
        .slice(&span)
        .replace(['\t', '\n', '\r'], " ");
    let offset = text.find(ASSIGN_TOKEN)? as u32;

    let match_start = signature_start + offset;
    let signature = lines.file_range(Some(StringRange::new(signature_start, match_start)));
    // The proof range starts on the token itself (minus its leading
    // space), so the operator stays the proof text's first token.
    let proof = lines.file_range(Some(StringRange::new(match_start + 1, declaration_stop)));
    Some((signature, proof))
}
