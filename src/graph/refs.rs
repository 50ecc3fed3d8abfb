//! Indirect reference tokens.

use std::collections::BTreeSet;
use std::ops::Range;

use crate::model::{Generation, ObjectId};
use crate::parser::{Dictionary, Lexer, Token};

/// An `id gen R` occurrence inside an object body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub id: ObjectId,
    pub generation: Generation,
    /// Span of the whole `id gen R` text within the body
    pub span: Range<usize>,
}

/// Every indirect reference in `body`, in order of appearance.
///
/// References inside literal strings and stream payloads are not
/// references and are never reported.
pub fn references(body: &[u8]) -> Vec<Reference> {
    let mut found = Vec::new();
    let mut window: [Option<Token>; 2] = [None, None];

    for token in Lexer::new(body) {
        if token.is_keyword(body, b"R") {
            if let Some(reference) = reference_from(&window, &token) {
                found.push(reference);
                window = [None, None];
                continue;
            }
        }
        let [_, last] = window;
        window = [last, Some(token)];
    }

    found
}

fn reference_from(window: &[Option<Token>; 2], r: &Token) -> Option<Reference> {
    let [Some(id), Some(generation)] = window else {
        return None;
    };
    Some(Reference {
        id: ObjectId::try_from(id.as_integer()?).ok()?,
        generation: Generation::try_from(generation.as_integer()?).ok()?,
        span: id.span.start..r.span.end,
    })
}

/// Distinct ids referenced from `body`.
pub fn referenced_ids(body: &[u8]) -> BTreeSet<ObjectId> {
    references(body).into_iter().map(|r| r.id).collect()
}

/// Spans of the top-level `/Parent` entries of a dictionary body.
pub fn parent_entries(body: &[u8]) -> Vec<Range<usize>> {
    Dictionary::parse(body)
        .map(|dict| dict.get_all(body, b"/Parent").map(|e| e.span()).collect())
        .unwrap_or_default()
}

/// References of a page body, minus its own `/Parent` link.
///
/// The parent named by a source page is that document's page-tree node,
/// which the merge replaces with a synthesized one.
pub fn page_references(body: &[u8]) -> Vec<Reference> {
    let parents = parent_entries(body);
    references(body)
        .into_iter()
        .filter(|r| {
            !parents
                .iter()
                .any(|p| p.start <= r.span.start && r.span.end <= p.end)
        })
        .collect()
}
