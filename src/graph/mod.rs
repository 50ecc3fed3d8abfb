//! Reference graph: reference tokens and page dependency closure.

mod closure;
mod refs;

pub use closure::{dependency_closure, dependency_closure_with};
pub use refs::{page_references, parent_entries, referenced_ids, references, Reference};
