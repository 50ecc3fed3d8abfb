//! Page attributes inherited through the source page tree.

use std::collections::HashSet;

use crate::model::{ObjectId, SourceDocument};
use crate::parser::{Dictionary, ValueKind};

/// Attributes a page may inherit from its page-tree ancestors.
pub const INHERITABLE_KEYS: [&str; 4] = ["/Resources", "/MediaBox", "/CropBox", "/Rotate"];

/// Maximum number of `/Parent` links followed from one page.
pub const MAX_INHERIT_DEPTH: usize = 64;

/// An attribute value copied from an ancestor node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InheritedAttribute {
    /// Key including the leading slash
    pub key: String,
    /// Raw value bytes, references still in the source id space
    pub value: Vec<u8>,
}

/// Inheritable attributes a page lacks but one of its ancestors defines.
///
/// For each missing key the nearest ancestor value wins. The walk stops at
/// a cycle, an unresolvable `/Parent`, or after [`MAX_INHERIT_DEPTH`] links.
pub fn inherited_attributes(doc: &SourceDocument, page: ObjectId) -> Vec<InheritedAttribute> {
    let Some(body) = doc.body(page) else {
        return Vec::new();
    };
    let Some(dict) = Dictionary::parse(body) else {
        return Vec::new();
    };

    let mut missing: Vec<&str> = INHERITABLE_KEYS
        .iter()
        .copied()
        .filter(|key| !dict.contains_key(body, key.as_bytes()))
        .collect();
    let mut found = Vec::new();
    let mut visited = HashSet::from([page]);
    let mut next = parent_of(body, &dict);

    for _ in 0..MAX_INHERIT_DEPTH {
        if missing.is_empty() {
            break;
        }
        let Some(current) = next else {
            break;
        };
        if !visited.insert(current) {
            log::warn!("{}: page tree cycle at object {}", doc.label(), current);
            break;
        }
        let Some(ancestor) = doc.body(current) else {
            break;
        };
        let Some(ancestor_dict) = Dictionary::parse(ancestor) else {
            break;
        };

        missing.retain(|key| match ancestor_dict.get(ancestor, key.as_bytes()) {
            Some(entry) => {
                found.push(InheritedAttribute {
                    key: key.to_string(),
                    value: ancestor[entry.value.clone()].to_vec(),
                });
                false
            }
            None => true,
        });
        next = parent_of(ancestor, &ancestor_dict);
    }

    // Keep the fixed key order regardless of which ancestor supplied a value.
    found.sort_by_key(|attribute| {
        INHERITABLE_KEYS
            .iter()
            .position(|key| *key == attribute.key)
            .unwrap_or(usize::MAX)
    });
    found
}

fn parent_of(body: &[u8], dict: &Dictionary) -> Option<ObjectId> {
    match dict.get(body, b"/Parent")?.kind {
        ValueKind::Reference { id, .. } => ObjectId::try_from(id).ok(),
        _ => None,
    }
}
