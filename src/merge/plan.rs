//! Merge planning: page selection, closures and id assignment.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::graph::{dependency_closure_with, referenced_ids};
use crate::model::{ObjectId, SourceDocument};

use super::inherit::{inherited_attributes, InheritedAttribute};
use super::options::MergeOptions;
use super::remap::{assign_ids, IdAllocator, RemapTable};
use super::selection::PageSelection;

/// What one source document contributes to the output.
#[derive(Debug, Clone)]
pub struct DocumentPlan {
    /// Position of the document in the merge order
    pub index: usize,

    /// Selected page ids, in page order
    pub pages: Vec<ObjectId>,

    /// Non-page objects the selected pages depend on
    pub dependencies: BTreeSet<ObjectId>,

    /// Attributes copied into pages from their ancestors, by page id
    pub inherited: BTreeMap<ObjectId, Vec<InheritedAttribute>>,

    /// Original id to output id
    pub table: RemapTable,
}

/// Id layout of a whole merge.
#[derive(Debug, Clone)]
pub struct MergePlan {
    pub documents: Vec<DocumentPlan>,
    pub pages_id: ObjectId,
    pub catalog_id: ObjectId,
    pub info_id: Option<ObjectId>,
    /// Cross-reference table size
    pub size: u32,
}

impl MergePlan {
    /// Plan a merge of `docs` in the given order.
    ///
    /// `selections[i]` picks the pages of `docs[i]`; inputs without an
    /// entry contribute every page. Fails with [`Error::NoPages`] when no
    /// page is selected across all inputs.
    pub fn build(
        docs: &[SourceDocument],
        selections: &[PageSelection],
        options: &MergeOptions,
    ) -> Result<Self> {
        if docs.is_empty() {
            return Err(Error::NoInputs);
        }

        let mut alloc = IdAllocator::new();
        let mut documents = Vec::with_capacity(docs.len());

        for (position, doc) in docs.iter().enumerate() {
            let pages = match selections.get(position) {
                Some(selection) => selection.select(doc.pages()),
                None => doc.pages().to_vec(),
            };
            if pages.len() < doc.pages().len() {
                log::debug!(
                    "{}: {} of {} pages selected",
                    doc.label(),
                    pages.len(),
                    doc.pages().len()
                );
            }

            let inherited: BTreeMap<ObjectId, Vec<InheritedAttribute>> =
                if options.inherit_attributes {
                    pages
                        .iter()
                        .map(|&page| (page, inherited_attributes(doc, page)))
                        .filter(|(_, attributes)| !attributes.is_empty())
                        .collect()
                } else {
                    BTreeMap::new()
                };
            let seeds: Vec<ObjectId> = inherited
                .values()
                .flatten()
                .flat_map(|attribute| referenced_ids(&attribute.value))
                .collect();

            let dependencies = dependency_closure_with(doc, &pages, seeds);
            let table = assign_ids(&mut alloc, doc, &pages, &dependencies);

            documents.push(DocumentPlan {
                index: doc.index(),
                pages,
                dependencies,
                inherited,
                table,
            });
        }

        let total: usize = documents.iter().map(|d| d.pages.len()).sum();
        if total == 0 {
            return Err(Error::NoPages { inputs: docs.len() });
        }

        let pages_id = alloc.allocate();
        let catalog_id = alloc.allocate();
        let info_id = options.info.then(|| alloc.allocate());

        Ok(Self {
            documents,
            pages_id,
            catalog_id,
            info_id,
            size: alloc.size(),
        })
    }

    /// Total number of pages in the output.
    pub fn page_count(&self) -> usize {
        self.documents.iter().map(|d| d.pages.len()).sum()
    }

    /// Output ids of every page, in merge order.
    pub fn kids(&self) -> Vec<ObjectId> {
        self.documents
            .iter()
            .flat_map(|d| d.pages.iter().filter_map(|&page| d.table.get(page)))
            .collect()
    }
}
