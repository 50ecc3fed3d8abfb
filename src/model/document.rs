//! Document-level types.

use std::collections::BTreeMap;

use crate::detect::{detect_version, PdfVersion};
use crate::error::{Error, Result};
use crate::graph::Reference;
use crate::parser::{classify_pages, scan_objects};

use super::{ObjectId, ObjectRecord, ScanStats};

/// A scanned source document.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Position of this document in the merge order
    index: usize,

    /// Human-readable name (usually the input path)
    label: String,

    /// Version declared in the `%PDF-x.y` header, if any
    version: Option<PdfVersion>,

    /// Raw buffer every record indexes into
    data: Vec<u8>,

    /// Objects by id; the last definition of an id wins
    objects: BTreeMap<ObjectId, ObjectRecord>,

    /// Page object ids in ascending order
    pages: Vec<ObjectId>,

    stats: ScanStats,
}

impl SourceDocument {
    /// Scan a buffer into a document.
    ///
    /// `index` is the document's position in the merge order and is only
    /// used to label errors. A buffer without a single recognizable object
    /// is rejected with [`Error::UnrecognizedStructure`].
    pub fn parse(index: usize, label: impl Into<String>, data: Vec<u8>) -> Result<Self> {
        let label = label.into();
        let outcome = scan_objects(&data);

        if outcome.objects.is_empty() {
            return Err(Error::UnrecognizedStructure { index, label });
        }

        let version = detect_version(&data);
        let pages = classify_pages(&data, &outcome.objects);

        log::debug!(
            "{}: {} objects, {} pages, version {}",
            label,
            outcome.objects.len(),
            pages.len(),
            version.map_or_else(|| "unknown".to_string(), |v| v.to_string())
        );

        Ok(Self {
            index,
            label,
            version,
            data,
            objects: outcome.objects,
            pages,
            stats: outcome.stats,
        })
    }

    /// Position of this document in the merge order.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn version(&self) -> Option<PdfVersion> {
        self.version
    }

    /// The raw buffer the document was scanned from.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn objects(&self) -> &BTreeMap<ObjectId, ObjectRecord> {
        &self.objects
    }

    /// Page object ids in ascending order.
    pub fn pages(&self) -> &[ObjectId] {
        &self.pages
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Number of objects in the document.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Always false for a successfully parsed document.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: ObjectId) -> Option<&ObjectRecord> {
        self.objects.get(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Body bytes of an object.
    pub fn body(&self, id: ObjectId) -> Option<&[u8]> {
        self.objects.get(&id).map(|record| record.body(&self.data))
    }

    /// Check whether an object is classified as a page.
    pub fn is_page(&self, id: ObjectId) -> bool {
        self.pages.binary_search(&id).is_ok()
    }

    /// Look up the object a reference points at.
    ///
    /// A generation-0 reference resolves by id alone. A reference naming
    /// another generation only resolves when the object carries it.
    pub fn resolve(&self, reference: &Reference) -> Option<&ObjectRecord> {
        self.objects
            .get(&reference.id)
            .filter(|record| reference.generation == 0 || record.generation == reference.generation)
    }
}
