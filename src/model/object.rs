//! Indirect object records.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Object number of an indirect object.
pub type ObjectId = u32;

/// Generation number of an indirect object.
pub type Generation = u16;

/// One `id gen obj … endobj` span found in a source buffer.
///
/// The record does not own its bytes: `body` indexes into the buffer the
/// record was scanned from, and excludes both the opener and `endobj`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    /// Object number
    pub id: ObjectId,

    /// Generation number, carried through but always written as 0
    pub generation: Generation,

    /// Byte offset of the opener's first digit in the source buffer
    pub offset: usize,

    /// Body span in the source buffer
    pub body: Range<usize>,
}

impl ObjectRecord {
    /// Borrow the body bytes from the buffer this record was scanned from.
    pub fn body<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.body.clone()]
    }
}

/// Counters collected while scanning one buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Number of distinct objects kept
    pub objects: usize,

    /// Openers dropped because no `endobj` followed them
    pub unterminated: usize,

    /// Objects replaced by a later definition of the same id
    pub duplicates: usize,
}
