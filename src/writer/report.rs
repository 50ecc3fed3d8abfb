//! Serializable merge and inspection reports.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;

use crate::detect::PdfVersion;
use crate::graph::{dependency_closure, page_references, references};
use crate::merge::{MergePlan, MergedGraph};
use crate::model::{ObjectId, ScanStats, SourceDocument};

use super::serializer::WriteSummary;

/// Outcome of a completed merge.
#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    /// Version declared in the output header
    pub version: PdfVersion,

    /// Total pages written
    pub pages: usize,

    /// Total objects written
    pub objects: usize,

    /// Output size in bytes
    pub bytes: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    pub inputs: Vec<InputContribution>,
}

/// What one input contributed to a merge.
#[derive(Debug, Clone, Serialize)]
pub struct InputContribution {
    pub index: usize,
    pub label: String,
    pub pages: usize,
    pub dependencies: usize,
    /// Ids of references kept verbatim because they resolve to nothing
    pub unresolved: Vec<ObjectId>,
}

impl MergeReport {
    pub fn new(
        docs: &[SourceDocument],
        plan: &MergePlan,
        graph: &MergedGraph,
        summary: &WriteSummary,
    ) -> Self {
        let inputs = docs
            .iter()
            .zip(&plan.documents)
            .zip(&graph.unresolved)
            .map(|((doc, doc_plan), unresolved)| InputContribution {
                index: doc.index(),
                label: doc.label().to_string(),
                pages: doc_plan.pages.len(),
                dependencies: doc_plan.dependencies.len(),
                unresolved: unresolved.iter().copied().collect(),
            })
            .collect();

        Self {
            version: graph.version,
            pages: graph.page_count(),
            objects: summary.objects,
            bytes: summary.bytes,
            output: None,
            inputs,
        }
    }

    /// Record the path the output was written to.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Total number of distinct unresolved targets across inputs.
    pub fn unresolved_count(&self) -> usize {
        self.inputs.iter().map(|input| input.unresolved.len()).sum()
    }
}

/// Structure of a single scanned input.
#[derive(Debug, Clone, Serialize)]
pub struct InputReport {
    pub index: usize,
    pub label: String,
    pub version: Option<PdfVersion>,
    pub objects: usize,
    /// Page object ids in page order
    pub pages: Vec<ObjectId>,
    /// Non-page objects reachable from the pages
    pub dependencies: usize,
    /// Ids referenced from pages or their dependencies that do not resolve
    pub unresolved: Vec<ObjectId>,
    pub stats: ScanStats,
}

impl InputReport {
    /// Inspect a document as a merge would see it.
    pub fn inspect(doc: &SourceDocument) -> Self {
        let dependencies = dependency_closure(doc, doc.pages());

        let mut unresolved = BTreeSet::new();
        for &page in doc.pages() {
            if let Some(body) = doc.body(page) {
                for reference in page_references(body) {
                    if doc.resolve(&reference).is_none() {
                        unresolved.insert(reference.id);
                    }
                }
            }
        }
        for &id in &dependencies {
            if let Some(body) = doc.body(id) {
                for reference in references(body) {
                    if doc.resolve(&reference).is_none() {
                        unresolved.insert(reference.id);
                    }
                }
            }
        }

        Self {
            index: doc.index(),
            label: doc.label().to_string(),
            version: doc.version(),
            objects: doc.len(),
            pages: doc.pages().to_vec(),
            dependencies: dependencies.len(),
            unresolved: unresolved.into_iter().collect(),
            stats: doc.stats(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}
