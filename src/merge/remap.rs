//! Output identifier assignment.

use std::collections::{BTreeMap, BTreeSet};

use crate::graph::Reference;
use crate::model::{Generation, ObjectId, SourceDocument};

/// Hands out output object ids, starting at 1.
///
/// One allocator is threaded through every document of a merge so ids
/// never collide across documents.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: ObjectId,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Take the next id.
    pub fn allocate(&mut self) -> ObjectId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next call to [`allocate`](Self::allocate) returns.
    pub fn peek(&self) -> ObjectId {
        self.next
    }

    /// Cross-reference table size: highest allocated id plus one.
    pub fn size(&self) -> u32 {
        self.next
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Where an original object lands in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    pub new_id: ObjectId,
    /// Generation of the original definition
    pub generation: Generation,
}

/// Original id to output id, for one source document.
#[derive(Debug, Clone, Default)]
pub struct RemapTable {
    entries: BTreeMap<ObjectId, Mapping>,
}

impl RemapTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, old: ObjectId, generation: Generation, new_id: ObjectId) {
        self.entries.insert(old, Mapping { new_id, generation });
    }

    pub fn get(&self, old: ObjectId) -> Option<ObjectId> {
        self.entries.get(&old).map(|m| m.new_id)
    }

    /// Output id for a reference, under the same generation rule the
    /// source document resolves with.
    pub fn resolve(&self, reference: &Reference) -> Option<ObjectId> {
        self.entries
            .get(&reference.id)
            .filter(|m| reference.generation == 0 || m.generation == reference.generation)
            .map(|m| m.new_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mappings in ascending original id order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, Mapping)> + '_ {
        self.entries.iter().map(|(&old, &m)| (old, m))
    }
}

/// Assign output ids to one document's retained objects.
///
/// Dependencies come first in ascending original id, then pages in the
/// given order.
pub fn assign_ids(
    alloc: &mut IdAllocator,
    doc: &SourceDocument,
    pages: &[ObjectId],
    dependencies: &BTreeSet<ObjectId>,
) -> RemapTable {
    let mut table = RemapTable::new();

    for &id in dependencies {
        if let Some(record) = doc.get(id) {
            table.insert(id, record.generation, alloc.allocate());
        }
    }
    for &id in pages {
        if let Some(record) = doc.get(id) {
            table.insert(id, record.generation, alloc.allocate());
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &[u8] = b"%PDF-1.4\n\
2 0 obj\n<< /Type /Pages /Kids [3 0 R 7 0 R] /Count 2 >>\nendobj\n\
3 0 obj\n<< /Type /Page /Parent 2 0 R /Contents 9 0 R >>\nendobj\n\
7 0 obj\n<< /Type /Page /Parent 2 0 R /Contents 4 1 R >>\nendobj\n\
4 1 obj\n(four)\nendobj\n\
9 0 obj\n(nine)\nendobj\n";

    #[test]
    fn test_allocator_sequence() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.peek(), 1);
        assert_eq!(alloc.allocate(), 1);
        assert_eq!(alloc.allocate(), 2);
        assert_eq!(alloc.size(), 3);
    }

    #[test]
    fn test_assign_dependencies_then_pages() {
        let doc = SourceDocument::parse(0, "doc.pdf", DOC.to_vec()).unwrap();
        let deps: BTreeSet<ObjectId> = [9, 4].into_iter().collect();
        let mut alloc = IdAllocator::new();
        let table = assign_ids(&mut alloc, &doc, doc.pages(), &deps);

        assert_eq!(table.get(4), Some(1));
        assert_eq!(table.get(9), Some(2));
        assert_eq!(table.get(3), Some(3));
        assert_eq!(table.get(7), Some(4));
        assert_eq!(table.get(2), None);
        assert_eq!(alloc.peek(), 5);
    }

    #[test]
    fn test_allocator_shared_across_documents() {
        let doc = SourceDocument::parse(0, "doc.pdf", DOC.to_vec()).unwrap();
        let deps: BTreeSet<ObjectId> = [4, 9].into_iter().collect();
        let mut alloc = IdAllocator::new();
        let first = assign_ids(&mut alloc, &doc, doc.pages(), &deps);
        let second = assign_ids(&mut alloc, &doc, doc.pages(), &deps);

        let mut ids: Vec<_> = first.iter().chain(second.iter()).map(|(_, m)| m.new_id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=8).collect::<Vec<_>>());
    }

    #[test]
    fn test_resolve_generation_rule() {
        let mut table = RemapTable::new();
        table.insert(4, 1, 10);
        let reference = |generation| Reference {
            id: 4,
            generation,
            span: 0..0,
        };
        assert_eq!(table.resolve(&reference(0)), Some(10));
        assert_eq!(table.resolve(&reference(1)), Some(10));
        assert_eq!(table.resolve(&reference(2)), None);
    }
}
