//! Shared fixtures for integration tests.

#![allow(dead_code)]

use pdfstitch::graph::references;
use pdfstitch::parser::{Dictionary, ValueKind};
use pdfstitch::{verify, SourceDocument};

/// Creates a synthetic PDF whose pages are marked `[[label:n]]` in their
/// content streams.
///
/// Layout: 1 catalog, 2 page tree, 3 shared font, then a page and its
/// content stream for every page.
pub fn labeled_pdf(label: &str, page_count: usize) -> Vec<u8> {
    labeled_pdf_with_version(label, page_count, "1.4")
}

pub fn labeled_pdf_with_version(label: &str, page_count: usize, version: &str) -> Vec<u8> {
    let mut content = format!("%PDF-{}\n", version);
    content.push_str("1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", i * 2 + 4)).collect();
    content.push_str(&format!(
        "2 0 obj\n<< /Type /Pages /Kids [{}] /Count {} >>\nendobj\n",
        kids.join(" "),
        page_count
    ));
    content.push_str("3 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>\nendobj\n");

    for i in 0..page_count {
        let page_obj = i * 2 + 4;
        let content_obj = page_obj + 1;
        content.push_str(&format!(
            "{} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents {} 0 R /Resources << /Font << /F1 3 0 R >> >> >>\nendobj\n",
            page_obj, content_obj
        ));
        let text = format!("BT /F1 12 Tf 72 720 Td ([[{}:{}]]) Tj ET", label, i + 1);
        content.push_str(&format!(
            "{} 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n",
            content_obj,
            text.len(),
            text
        ));
    }

    content.push_str("trailer\n<< /Root 1 0 R >>\n%%EOF\n");
    content.into_bytes()
}

fn reference_value(body: &[u8], key: &[u8]) -> Option<u32> {
    let dict = Dictionary::parse(body)?;
    match dict.get(body, key)?.kind {
        ValueKind::Reference { id, .. } => u32::try_from(id).ok(),
        _ => None,
    }
}

/// Page ids of a merged document, in page-tree order.
pub fn kids(merged: &[u8]) -> Vec<u32> {
    let report = verify::check(merged).expect("readable xref");
    let doc = SourceDocument::parse(0, "merged", merged.to_vec()).expect("scannable output");
    let catalog = doc.body(report.root.expect("root")).expect("catalog");
    let tree_id = reference_value(catalog, b"/Pages").expect("/Pages");
    let tree = doc.body(tree_id).expect("page tree");
    references(tree).into_iter().map(|r| r.id).collect()
}

/// Page labels of a merged document, in page-tree order.
pub fn page_labels(merged: &[u8]) -> Vec<String> {
    let doc = SourceDocument::parse(0, "merged", merged.to_vec()).expect("scannable output");
    kids(merged)
        .into_iter()
        .map(|page| {
            let body = doc.body(page).expect("page");
            let contents = reference_value(body, b"/Contents").expect("/Contents");
            let stream = String::from_utf8_lossy(doc.body(contents).expect("content stream"));
            let start = stream.find("[[").expect("label start") + 2;
            let end = stream.find("]]").expect("label end");
            stream[start..end].to_string()
        })
        .collect()
}

/// Ids referenced anywhere in `doc` that do not name one of its objects.
pub fn dangling_targets(doc: &SourceDocument) -> Vec<u32> {
    let mut dangling: Vec<u32> = doc
        .objects()
        .keys()
        .flat_map(|&id| references(doc.body(id).unwrap_or_default()))
        .map(|r| r.id)
        .filter(|id| !doc.contains(*id))
        .collect();
    dangling.sort_unstable();
    dangling.dedup();
    dangling
}
