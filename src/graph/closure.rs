//! Dependency closure of a page set.

use std::collections::{BTreeSet, VecDeque};

use crate::model::{ObjectId, SourceDocument};

use super::refs::{page_references, references, Reference};

/// Non-page objects transitively reachable from `pages`.
///
/// Traversal starts at each listed page present in the document. A target
/// is collected only if it resolves within the document and is not a page
/// (any page of the document, selected or not), so pages are never pulled
/// in twice through links between them. Object 0 is the free-list head and
/// is never collected. Unresolvable targets are skipped here and surface
/// later as unresolved references.
pub fn dependency_closure(doc: &SourceDocument, pages: &[ObjectId]) -> BTreeSet<ObjectId> {
    dependency_closure_with(doc, pages, std::iter::empty())
}

/// [`dependency_closure`] with extra root ids.
///
/// Seeds are subject to the same rules as discovered targets; they carry
/// the targets of values copied into pages from elsewhere.
pub fn dependency_closure_with<I>(
    doc: &SourceDocument,
    pages: &[ObjectId],
    seeds: I,
) -> BTreeSet<ObjectId>
where
    I: IntoIterator<Item = ObjectId>,
{
    let mut collected = BTreeSet::new();
    let mut queue: VecDeque<ObjectId> = pages.iter().copied().filter(|&id| doc.contains(id)).collect();

    for seed in seeds {
        let reference = Reference {
            id: seed,
            generation: 0,
            span: 0..0,
        };
        visit(doc, &reference, &mut collected, &mut queue);
    }

    while let Some(current) = queue.pop_front() {
        let Some(body) = doc.body(current) else {
            continue;
        };
        let edges = if doc.is_page(current) {
            page_references(body)
        } else {
            references(body)
        };
        for reference in &edges {
            visit(doc, reference, &mut collected, &mut queue);
        }
    }

    log::debug!(
        "{}: {} dependencies for {} pages",
        doc.label(),
        collected.len(),
        pages.len()
    );
    collected
}

fn visit(
    doc: &SourceDocument,
    reference: &Reference,
    collected: &mut BTreeSet<ObjectId>,
    queue: &mut VecDeque<ObjectId>,
) {
    if reference.id == 0 || doc.is_page(reference.id) || doc.resolve(reference).is_none() {
        return;
    }
    if collected.insert(reference.id) {
        queue.push_back(reference.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(data: &[u8]) -> SourceDocument {
        SourceDocument::parse(0, "test.pdf", data.to_vec()).unwrap()
    }

    const TWO_PAGES: &[u8] = b"%PDF-1.4\n\
1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n\
2 0 obj\n<< /Type /Pages /Kids [3 0 R 5 0 R] /Count 2 >>\nendobj\n\
3 0 obj\n<< /Type /Page /Parent 2 0 R /Contents 4 0 R /Resources << /Font << /F1 7 0 R >> >> >>\nendobj\n\
4 0 obj\n<< /Length 0 >>\nstream\n\nendstream\nendobj\n\
5 0 obj\n<< /Type /Page /Parent 2 0 R /Contents 6 0 R /Annots [8 0 R] /Resources << /Font << /F1 7 0 R >> >> >>\nendobj\n\
6 0 obj\n<< /Length 0 >>\nstream\n\nendstream\nendobj\n\
7 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>\nendobj\n\
8 0 obj\n<< /Type /Annot /Subtype /Link /Dest [3 0 R /Fit] /A 9 0 R >>\nendobj\n\
9 0 obj\n<< /S /URI /URI (http://example.com) /Next 99 0 R >>\nendobj\n\
10 0 obj\n<< /Unused true >>\nendobj\n";

    #[test]
    fn test_closure_collects_shared_dependencies_once() {
        let doc = doc(TWO_PAGES);
        let deps = dependency_closure(&doc, doc.pages());
        assert_eq!(deps.into_iter().collect::<Vec<_>>(), vec![4, 6, 7, 8, 9]);
    }

    #[test]
    fn test_closure_excludes_pages_parent_catalog_and_dangling() {
        let doc = doc(TWO_PAGES);
        let deps = dependency_closure(&doc, doc.pages());
        // Page 3 is reachable from the annotation but is a page.
        assert!(!deps.contains(&3));
        // The old page tree and catalog are only reachable through /Parent.
        assert!(!deps.contains(&2));
        assert!(!deps.contains(&1));
        // 99 does not exist; 10 is unreachable.
        assert!(!deps.contains(&99));
        assert!(!deps.contains(&10));
    }

    #[test]
    fn test_closure_of_selected_page_only() {
        let doc = doc(TWO_PAGES);
        let deps = dependency_closure(&doc, &[3]);
        assert_eq!(deps.into_iter().collect::<Vec<_>>(), vec![4, 7]);
    }

    #[test]
    fn test_closure_with_seed() {
        let doc = doc(TWO_PAGES);
        let deps = dependency_closure_with(&doc, &[3], [10, 99, 5]);
        assert!(deps.contains(&10));
        assert!(!deps.contains(&99));
        assert!(!deps.contains(&5));
    }

    #[test]
    fn test_closure_handles_cycles() {
        let data = b"1 0 obj\n<< /Type /Page /A 2 0 R >>\nendobj\n\
2 0 obj\n<< /Next 3 0 R >>\nendobj\n\
3 0 obj\n<< /Next 2 0 R /Self 3 0 R >>\nendobj\n";
        let doc = doc(data);
        let deps = dependency_closure(&doc, doc.pages());
        assert_eq!(deps.into_iter().collect::<Vec<_>>(), vec![2, 3]);
    }
}
