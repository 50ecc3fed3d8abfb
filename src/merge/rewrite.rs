//! Reference rewriting for retained object bodies.

use crate::graph::{parent_entries, references};
use crate::model::ObjectId;
use crate::parser::{is_whitespace, Dictionary};

use super::inherit::InheritedAttribute;
use super::remap::RemapTable;

/// A rewritten body and the references it kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rewritten {
    pub body: Vec<u8>,
    /// Original ids of references with no remap entry, in order of appearance
    pub unresolved: Vec<ObjectId>,
}

/// Replace every resolving reference in `body` with `"{new} 0 R"`.
///
/// Bytes outside reference spans are copied unchanged, as are references
/// the table cannot resolve.
pub fn rewrite_references(body: &[u8], table: &RemapTable) -> Rewritten {
    let mut out = Vec::with_capacity(body.len() + 16);
    let mut unresolved = Vec::new();
    let mut copied = 0;

    for reference in references(body) {
        let Some(new_id) = table.resolve(&reference) else {
            unresolved.push(reference.id);
            continue;
        };
        out.extend_from_slice(&body[copied..reference.span.start]);
        out.extend_from_slice(format!("{} 0 R", new_id).as_bytes());
        copied = reference.span.end;
    }
    out.extend_from_slice(&body[copied..]);

    Rewritten {
        body: out,
        unresolved,
    }
}

/// Remove every top-level `/Parent` entry and the whitespace after it.
pub fn strip_parent(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len());
    let mut copied = 0;

    for span in parent_entries(body) {
        out.extend_from_slice(&body[copied..span.start]);
        let mut end = span.end;
        while end < body.len() && is_whitespace(body[end]) {
            end += 1;
        }
        copied = end;
    }
    out.extend_from_slice(&body[copied..]);
    out
}

/// Rewrite a page body and point it at the merged page tree.
///
/// The page's own `/Parent` entries are dropped, references are remapped,
/// then any `inherited` attributes and a fresh `/Parent` link are inserted
/// before the closing `>>` of the page dictionary. A body without a
/// readable dictionary gets the link appended instead.
pub fn rewrite_page(
    body: &[u8],
    table: &RemapTable,
    pages_id: ObjectId,
    inherited: &[InheritedAttribute],
) -> Rewritten {
    let stripped = strip_parent(body);
    let Rewritten {
        body: rewritten,
        mut unresolved,
    } = rewrite_references(&stripped, table);

    let mut insertion = Vec::new();
    for attribute in inherited {
        let value = rewrite_references(&attribute.value, table);
        unresolved.extend(value.unresolved);
        insertion.extend_from_slice(attribute.key.as_bytes());
        insertion.push(b' ');
        insertion.extend_from_slice(&value.body);
        insertion.push(b' ');
    }
    insertion.extend_from_slice(format!("/Parent {} 0 R ", pages_id).as_bytes());

    let body = match Dictionary::parse(&rewritten) {
        Some(dict) => {
            let at = dict.close.start;
            let mut out = Vec::with_capacity(rewritten.len() + insertion.len() + 1);
            out.extend_from_slice(&rewritten[..at]);
            if at > 0 && !is_whitespace(rewritten[at - 1]) {
                out.push(b' ');
            }
            out.extend_from_slice(&insertion);
            out.extend_from_slice(&rewritten[at..]);
            out
        }
        None => {
            log::warn!("page body has no closing dictionary delimiter, appending /Parent");
            let mut out = rewritten;
            out.extend_from_slice(format!("\n/Parent {} 0 R\n", pages_id).as_bytes());
            out
        }
    };

    Rewritten { body, unresolved }
}
