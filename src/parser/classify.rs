//! Page classifier.

use std::collections::BTreeMap;

use crate::model::{ObjectId, ObjectRecord};

use super::dict::{Dictionary, ValueKind};

/// Check whether an object body declares `/Type /Page`.
///
/// The type value must be exactly the name `/Page`: page-tree nodes
/// (`/Pages`) and other names that merely start with `Page` never match.
pub fn is_page_body(body: &[u8]) -> bool {
    Dictionary::parse(body)
        .and_then(|dict| {
            dict.get(body, b"/Type")
                .filter(|entry| entry.kind == ValueKind::Name)
                .map(|entry| &body[entry.value.clone()] == b"/Page")
        })
        .unwrap_or(false)
}

/// Ids of every page object, ascending and de-duplicated.
pub fn classify_pages(data: &[u8], objects: &BTreeMap<ObjectId, ObjectRecord>) -> Vec<ObjectId> {
    // BTreeMap iteration is already ascending by id and keys are unique.
    objects
        .values()
        .filter(|record| is_page_body(record.body(data)))
        .map(|record| record.id)
        .collect()
}
