//! Property tests for merge invariants.

mod common;

use proptest::prelude::*;

use common::{dangling_targets, labeled_pdf, page_labels};
use pdfstitch::{merge_bytes, verify, PageSelection, SourceDocument, Stitcher};

fn expected_labels(counts: &[usize]) -> Vec<String> {
    counts
        .iter()
        .enumerate()
        .flat_map(|(doc, &pages)| (1..=pages).map(move |page| format!("d{}:{}", doc, page)))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn merged_pages_are_concatenated_in_order(counts in prop::collection::vec(1usize..6, 1..5)) {
        let pdfs: Vec<Vec<u8>> = counts
            .iter()
            .enumerate()
            .map(|(i, &n)| labeled_pdf(&format!("d{}", i), n))
            .collect();
        let inputs: Vec<&[u8]> = pdfs.iter().map(Vec::as_slice).collect();
        let merged = merge_bytes(&inputs).unwrap();

        prop_assert_eq!(page_labels(&merged), expected_labels(&counts));
    }

    #[test]
    fn merged_output_is_consistent(counts in prop::collection::vec(1usize..6, 1..5)) {
        let pdfs: Vec<Vec<u8>> = counts
            .iter()
            .enumerate()
            .map(|(i, &n)| labeled_pdf(&format!("d{}", i), n))
            .collect();
        let inputs: Vec<&[u8]> = pdfs.iter().map(Vec::as_slice).collect();
        let merged = merge_bytes(&inputs).unwrap();

        let report = verify::check(&merged).unwrap();
        prop_assert!(report.is_valid());

        let doc = SourceDocument::parse(0, "merged", merged).unwrap();
        prop_assert_eq!(doc.stats().duplicates, 0);
        prop_assert!(dangling_targets(&doc).is_empty());
        // Every input object except its catalog and page tree, plus the new pair.
        let copied: usize = counts.iter().map(|n| 2 * n + 1).sum();
        prop_assert_eq!(doc.len(), copied + 2);
    }

    #[test]
    fn selection_keeps_only_selected_pages(pages in 1usize..8, picks in prop::collection::btree_set(1u32..8, 1..4)) {
        let picks: Vec<u32> = picks.into_iter().filter(|&p| p as usize <= pages).collect();
        prop_assume!(!picks.is_empty());

        let merged = Stitcher::new()
            .input_bytes_pages("d0", labeled_pdf("d0", pages), PageSelection::Pages(picks.clone()))
            .merge_to_vec()
            .unwrap();

        let expected: Vec<String> = picks.iter().map(|p| format!("d0:{}", p)).collect();
        prop_assert_eq!(page_labels(&merged), expected);
    }
}
