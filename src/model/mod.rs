//! Source document model.
//!
//! A [`SourceDocument`] owns the raw buffer it was scanned from and indexes
//! every indirect object in it by id. Documents are immutable once built:
//! the merge stages produce new bodies instead of editing the source.

mod document;
mod object;

pub use document::SourceDocument;
pub use object::{Generation, ObjectId, ObjectRecord, ScanStats};
