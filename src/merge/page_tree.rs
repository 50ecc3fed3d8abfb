//! Synthesized page tree, catalog and information dictionary.

use chrono::{DateTime, Utc};

use crate::model::ObjectId;

/// Producer string written to the information dictionary.
pub const PRODUCER: &str = concat!("pdfstitch ", env!("CARGO_PKG_VERSION"));

/// Body of the single page-tree node listing every merged page.
pub fn page_tree_body(kids: &[ObjectId]) -> Vec<u8> {
    let refs = kids
        .iter()
        .map(|id| format!("{} 0 R", id))
        .collect::<Vec<_>>()
        .join(" ");
    format!("<< /Type /Pages /Kids [{}] /Count {} >>", refs, kids.len()).into_bytes()
}

/// Body of the catalog pointing at the page tree.
pub fn catalog_body(pages_id: ObjectId) -> Vec<u8> {
    format!("<< /Type /Catalog /Pages {} 0 R >>", pages_id).into_bytes()
}

/// Body of the document information dictionary.
pub fn info_body(created: DateTime<Utc>) -> Vec<u8> {
    format!(
        "<< /Producer ({}) /CreationDate ({}) >>",
        PRODUCER,
        pdf_date(created)
    )
    .into_bytes()
}

/// Format a timestamp as a PDF date string (`D:YYYYMMDDHHmmSSZ`).
pub fn pdf_date(date: DateTime<Utc>) -> String {
    date.format("D:%Y%m%d%H%M%SZ").to_string()
}
