//! Merge stages: id remapping, reference rewriting and page-tree rebuilding.
//!
//! A [`MergePlan`] fixes which objects each document contributes and the
//! output id of every one of them. [`MergedGraph::build`] then produces the
//! rewritten bodies in the order they are written.

mod inherit;
mod options;
mod page_tree;
mod plan;
mod remap;
mod rewrite;
mod selection;

pub use inherit::{inherited_attributes, InheritedAttribute, INHERITABLE_KEYS, MAX_INHERIT_DEPTH};
pub use options::MergeOptions;
pub use page_tree::{catalog_body, info_body, page_tree_body, pdf_date, PRODUCER};
pub use plan::{DocumentPlan, MergePlan};
pub use remap::{assign_ids, IdAllocator, Mapping, RemapTable};
pub use rewrite::{rewrite_page, rewrite_references, strip_parent, Rewritten};
pub use selection::PageSelection;

use std::collections::BTreeSet;

use chrono::Utc;
use rayon::prelude::*;

use crate::detect::{output_version, PdfVersion};
use crate::error::Result;
use crate::model::{ObjectId, SourceDocument};

/// Role of an object in the merged output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Dependency,
    Page,
    PageTree,
    Catalog,
    Info,
}

/// One object of the merged output.
#[derive(Debug, Clone)]
pub struct OutputObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub body: Vec<u8>,
}

/// The merged object graph, in write order.
#[derive(Debug, Clone)]
pub struct MergedGraph {
    /// Version declared in the output header
    pub version: PdfVersion,

    /// Dependencies, pages, page tree, catalog, then info
    pub objects: Vec<OutputObject>,

    /// Output page ids in merge order
    pub kids: Vec<ObjectId>,

    pub pages_id: ObjectId,
    pub catalog_id: ObjectId,
    pub info_id: Option<ObjectId>,

    /// Cross-reference table size
    pub size: u32,

    /// Original ids of references left verbatim, per input
    pub unresolved: Vec<BTreeSet<ObjectId>>,
}

impl MergedGraph {
    /// Rewrite every planned object and synthesize the page tree.
    ///
    /// `docs` must be the documents `plan` was built from, in the same order.
    /// Inputs are rewritten on the Rayon pool unless `options.parallel` is
    /// off; the output order does not depend on it.
    pub fn build(docs: &[SourceDocument], plan: &MergePlan, options: &MergeOptions) -> Self {
        let version = options
            .version
            .unwrap_or_else(|| output_version(docs.iter().map(SourceDocument::version)));

        let rewritten: Vec<RewrittenDocument> = if options.parallel {
            docs.par_iter()
                .zip(&plan.documents)
                .map(|(doc, doc_plan)| rewrite_document(doc, doc_plan, plan.pages_id))
                .collect()
        } else {
            docs.iter()
                .zip(&plan.documents)
                .map(|(doc, doc_plan)| rewrite_document(doc, doc_plan, plan.pages_id))
                .collect()
        };

        let mut dependencies = Vec::new();
        let mut pages = Vec::new();
        let mut unresolved = Vec::with_capacity(docs.len());
        for (doc, mut output) in docs.iter().zip(rewritten) {
            if !output.missing.is_empty() {
                log::warn!(
                    "{}: {} unresolved reference target(s) kept verbatim: {:?}",
                    doc.label(),
                    output.missing.len(),
                    output.missing
                );
            }
            dependencies.append(&mut output.dependencies);
            pages.append(&mut output.pages);
            unresolved.push(output.missing);
        }

        let kids = plan.kids();
        let mut objects = dependencies;
        objects.append(&mut pages);
        objects.push(OutputObject {
            id: plan.pages_id,
            kind: ObjectKind::PageTree,
            body: page_tree_body(&kids),
        });
        objects.push(OutputObject {
            id: plan.catalog_id,
            kind: ObjectKind::Catalog,
            body: catalog_body(plan.pages_id),
        });
        if let Some(info_id) = plan.info_id {
            let created = options.creation_date.unwrap_or_else(Utc::now);
            objects.push(OutputObject {
                id: info_id,
                kind: ObjectKind::Info,
                body: info_body(created),
            });
        }

        log::info!(
            "Merged {} document(s): {} pages, {} objects",
            docs.len(),
            kids.len(),
            objects.len()
        );

        Self {
            version,
            objects,
            kids,
            pages_id: plan.pages_id,
            catalog_id: plan.catalog_id,
            info_id: plan.info_id,
            size: plan.size,
            unresolved,
        }
    }

    /// Number of pages in the merged output.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    pub fn get(&self, id: ObjectId) -> Option<&OutputObject> {
        self.objects.iter().find(|object| object.id == id)
    }
}

/// Rewritten objects of one input.
struct RewrittenDocument {
    dependencies: Vec<OutputObject>,
    pages: Vec<OutputObject>,
    missing: BTreeSet<ObjectId>,
}

fn rewrite_document(
    doc: &SourceDocument,
    doc_plan: &DocumentPlan,
    pages_id: ObjectId,
) -> RewrittenDocument {
    let mut output = RewrittenDocument {
        dependencies: Vec::with_capacity(doc_plan.dependencies.len()),
        pages: Vec::with_capacity(doc_plan.pages.len()),
        missing: BTreeSet::new(),
    };

    for &id in &doc_plan.dependencies {
        let (Some(body), Some(new_id)) = (doc.body(id), doc_plan.table.get(id)) else {
            continue;
        };
        let rewritten = rewrite_references(body, &doc_plan.table);
        output.missing.extend(rewritten.unresolved);
        output.dependencies.push(OutputObject {
            id: new_id,
            kind: ObjectKind::Dependency,
            body: rewritten.body,
        });
    }

    for &id in &doc_plan.pages {
        let (Some(body), Some(new_id)) = (doc.body(id), doc_plan.table.get(id)) else {
            continue;
        };
        let inherited = doc_plan
            .inherited
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let rewritten = rewrite_page(body, &doc_plan.table, pages_id, inherited);
        output.missing.extend(rewritten.unresolved);
        output.pages.push(OutputObject {
            id: new_id,
            kind: ObjectKind::Page,
            body: rewritten.body,
        });
    }

    output
}

/// Plan and build a merge of already scanned documents.
pub fn merge_documents(
    docs: &[SourceDocument],
    selections: &[PageSelection],
    options: &MergeOptions,
) -> Result<MergedGraph> {
    let plan = MergePlan::build(docs, selections, options)?;
    Ok(MergedGraph::build(docs, &plan, options))
}
