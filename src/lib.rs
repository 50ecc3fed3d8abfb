//! # pdfstitch
//!
//! Page-level merging of PDF documents.
//!
//! This library combines the pages of several PDF documents into one,
//! working on the indirect objects of each input directly: every page is
//! copied together with the objects it depends on, object ids are
//! renumbered into one namespace, and a fresh page tree, catalog and
//! cross-reference table are written.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfstitch::merge_files;
//!
//! fn main() -> pdfstitch::Result<()> {
//!     let report = merge_files(&["a.pdf", "b.pdf"], "merged.pdf")?;
//!     println!("{} pages written", report.pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Object-level copying**: page content, fonts and images pass through byte for byte
//! - **Dependency closure**: only objects reachable from the selected pages are kept
//! - **Page selection**: pick page ranges per input
//! - **Exact offsets**: the cross-reference table is built from a counting writer
//! - **Parallel scanning**: inputs are scanned on the Rayon thread pool

pub mod detect;
pub mod error;
pub mod graph;
pub mod merge;
pub mod model;
pub mod parser;
pub mod verify;
pub mod writer;

#[cfg(feature = "ffi")]
pub mod ffi;

// Re-export commonly used types
pub use detect::{detect_version, is_pdf_bytes, PdfVersion};
pub use error::{Error, ErrorKind, Result};
pub use graph::dependency_closure;
pub use merge::{
    merge_documents, IdAllocator, MergeOptions, MergePlan, MergedGraph, PageSelection, RemapTable,
};
pub use model::{ObjectId, ObjectRecord, SourceDocument};
pub use parser::classify_pages;
pub use verify::XrefReport;
pub use writer::{ContainerWriter, InputReport, MergeReport};

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rayon::prelude::*;

/// Read one input file.
///
/// `index` is the input's position in the merge order. A file that cannot
/// be read fails with [`Error::UnreadableInput`], an empty one with
/// [`Error::EmptyInput`].
pub fn read_input<P: AsRef<Path>>(index: usize, path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|source| Error::UnreadableInput {
        index,
        path: path.to_path_buf(),
        source,
    })?;
    if data.is_empty() {
        return Err(Error::EmptyInput {
            index,
            path: path.to_path_buf(),
        });
    }
    Ok(data)
}

/// Read and scan one input file.
pub fn open_document<P: AsRef<Path>>(index: usize, path: P) -> Result<SourceDocument> {
    let path = path.as_ref();
    let data = read_input(index, path)?;
    SourceDocument::parse(index, path.display().to_string(), data)
}

/// Merge PDF files into `output`, in the given order.
///
/// # Example
///
/// ```no_run
/// use pdfstitch::merge_files;
///
/// let report = merge_files(&["cover.pdf", "body.pdf"], "book.pdf").unwrap();
/// assert!(report.pages > 0);
/// ```
pub fn merge_files<P, Q>(inputs: &[P], output: Q) -> Result<MergeReport>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    inputs
        .iter()
        .fold(Stitcher::new(), |stitcher, path| stitcher.input(path))
        .merge_to(output)
}

/// Merge in-memory PDF documents, in the given order.
///
/// # Example
///
/// ```no_run
/// use pdfstitch::merge_bytes;
///
/// let a = std::fs::read("a.pdf").unwrap();
/// let b = std::fs::read("b.pdf").unwrap();
/// let merged = merge_bytes(&[&a, &b]).unwrap();
/// ```
pub fn merge_bytes(inputs: &[&[u8]]) -> Result<Vec<u8>> {
    inputs
        .iter()
        .enumerate()
        .fold(Stitcher::new(), |stitcher, (index, data)| {
            stitcher.input_bytes(format!("input #{}", index + 1), data.to_vec())
        })
        .merge_to_vec()
}

/// Scan a file and report its structure.
pub fn inspect_file<P: AsRef<Path>>(path: P) -> Result<InputReport> {
    let doc = open_document(0, path)?;
    Ok(InputReport::inspect(&doc))
}

/// Where an input's bytes come from.
#[derive(Debug, Clone)]
enum InputSource {
    Path(PathBuf),
    Bytes { label: String, data: Vec<u8> },
}

#[derive(Debug, Clone)]
struct StitchInput {
    source: InputSource,
    selection: PageSelection,
}

/// Builder for merging PDF documents.
///
/// # Example
///
/// ```no_run
/// use pdfstitch::{PageSelection, Stitcher};
///
/// let report = Stitcher::new()
///     .input("cover.pdf")
///     .input_pages("report.pdf", PageSelection::Range(2..=5))
///     .with_info(true)
///     .merge_to("out.pdf")?;
/// println!("{} pages", report.pages);
/// # Ok::<(), pdfstitch::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Stitcher {
    inputs: Vec<StitchInput>,
    options: MergeOptions,
}

impl Stitcher {
    /// Create a new Stitcher builder.
    pub fn new() -> Self {
        Self {
            inputs: Vec::new(),
            options: MergeOptions::default(),
        }
    }

    /// Append every page of a file.
    pub fn input(self, path: impl AsRef<Path>) -> Self {
        self.input_pages(path, PageSelection::All)
    }

    /// Append the selected pages of a file.
    pub fn input_pages(mut self, path: impl AsRef<Path>, selection: PageSelection) -> Self {
        self.inputs.push(StitchInput {
            source: InputSource::Path(path.as_ref().to_path_buf()),
            selection,
        });
        self
    }

    /// Append every page of an in-memory document.
    pub fn input_bytes(self, label: impl Into<String>, data: Vec<u8>) -> Self {
        self.input_bytes_pages(label, data, PageSelection::All)
    }

    /// Append the selected pages of an in-memory document.
    pub fn input_bytes_pages(
        mut self,
        label: impl Into<String>,
        data: Vec<u8>,
        selection: PageSelection,
    ) -> Self {
        self.inputs.push(StitchInput {
            source: InputSource::Bytes {
                label: label.into(),
                data,
            },
            selection,
        });
        self
    }

    /// Disable parallel scanning.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Set the output header version.
    pub fn with_version(mut self, version: PdfVersion) -> Self {
        self.options = self.options.with_version(version);
        self
    }

    /// Write a document information dictionary.
    pub fn with_info(mut self, info: bool) -> Self {
        self.options = self.options.with_info(info);
        self
    }

    /// Copy inherited page attributes into pages.
    pub fn inherit_attributes(mut self, inherit: bool) -> Self {
        self.options = self.options.with_inherited_attributes(inherit);
        self
    }

    /// Replace all merge options.
    pub fn with_options(mut self, options: MergeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Number of inputs added so far.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Read and scan every input.
    ///
    /// Inputs are read in order, so the first unreadable one is reported.
    /// Scanning then runs on the Rayon thread pool unless
    /// [`sequential`](Self::sequential) was requested; the first input in
    /// merge order that fails to scan is reported.
    pub fn load(&self) -> Result<Vec<SourceDocument>> {
        if self.inputs.is_empty() {
            return Err(Error::NoInputs);
        }

        let mut buffers = Vec::with_capacity(self.inputs.len());
        for (index, input) in self.inputs.iter().enumerate() {
            let buffer = match &input.source {
                InputSource::Path(path) => (path.display().to_string(), read_input(index, path)?),
                InputSource::Bytes { label, data } => {
                    if data.is_empty() {
                        return Err(Error::EmptyInput {
                            index,
                            path: PathBuf::from(label),
                        });
                    }
                    (label.clone(), data.clone())
                }
            };
            buffers.push(buffer);
        }

        let scanned: Vec<Result<SourceDocument>> = if self.options.parallel {
            buffers
                .into_par_iter()
                .enumerate()
                .map(|(index, (label, data))| SourceDocument::parse(index, label, data))
                .collect()
        } else {
            buffers
                .into_iter()
                .enumerate()
                .map(|(index, (label, data))| SourceDocument::parse(index, label, data))
                .collect()
        };
        scanned.into_iter().collect()
    }

    fn selections(&self) -> Vec<PageSelection> {
        self.inputs.iter().map(|i| i.selection.clone()).collect()
    }

    /// Merge into any writer.
    ///
    /// A failing writer is reported as [`Error::WriterFailed`].
    pub fn merge_to_writer<W: Write>(&self, out: W) -> Result<MergeReport> {
        let docs = self.load()?;
        let plan = MergePlan::build(&docs, &self.selections(), &self.options)?;
        let graph = MergedGraph::build(&docs, &plan, &self.options);
        let (_, summary) = writer::serialize(&graph, out).map_err(Error::WriterFailed)?;
        Ok(MergeReport::new(&docs, &plan, &graph, &summary))
    }

    /// Merge into a file.
    ///
    /// Every input is read and planned before the output is created. Write
    /// failures are reported as [`Error::OutputWrite`] and leave no file
    /// behind.
    pub fn merge_to(&self, path: impl AsRef<Path>) -> Result<MergeReport> {
        let path = path.as_ref();
        let docs = self.load()?;
        let plan = MergePlan::build(&docs, &self.selections(), &self.options)?;
        let graph = MergedGraph::build(&docs, &plan, &self.options);

        let output_error = |source| Error::OutputWrite {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(output_error)?;
        let summary = match writer::serialize(&graph, BufWriter::new(file)) {
            Ok((_, summary)) => summary,
            Err(source) => {
                let _ = fs::remove_file(path);
                return Err(output_error(source));
            }
        };

        log::info!("Wrote {} ({} bytes)", path.display(), summary.bytes);
        Ok(MergeReport::new(&docs, &plan, &graph, &summary).with_output(path))
    }

    /// Merge into a new buffer.
    pub fn merge_to_vec(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.merge_to_writer(&mut out)?;
        Ok(out)
    }
}

impl Default for Stitcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_PAGE: &[u8] = b"%PDF-1.4\n\
1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n\
2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n\
3 0 obj\n<< /Type /Page /Parent 2 0 R /Contents 4 0 R >>\nendobj\n\
4 0 obj\n<< /Length 0 >>\nstream\n\nendstream\nendobj\n";

    #[test]
    fn test_stitcher_builder() {
        let stitcher = Stitcher::new()
            .input("a.pdf")
            .input_pages("b.pdf", PageSelection::Range(1..=2))
            .sequential()
            .with_info(true)
            .inherit_attributes(true);

        assert_eq!(stitcher.len(), 2);
        assert!(!stitcher.options().parallel);
        assert!(stitcher.options().info);
        assert!(stitcher.options().inherit_attributes);
    }

    #[test]
    fn test_stitcher_default() {
        let stitcher = Stitcher::default();
        assert!(stitcher.is_empty());
        assert!(stitcher.options().parallel);
    }

    #[test]
    fn test_no_inputs() {
        let err = Stitcher::new().merge_to_vec().unwrap_err();
        assert!(matches!(err, Error::NoInputs));
    }

    #[test]
    fn test_merge_bytes_two_documents() {
        let merged = merge_bytes(&[ONE_PAGE, ONE_PAGE]).unwrap();
        let doc = SourceDocument::parse(0, "merged", merged.clone()).unwrap();
        assert_eq!(doc.pages().len(), 2);

        let report = verify::check(&merged).unwrap();
        assert!(report.is_valid());
    }

    #[test]
    fn test_merge_bytes_empty_input() {
        let err = merge_bytes(&[ONE_PAGE, b""]).unwrap_err();
        assert!(matches!(err, Error::EmptyInput { index: 1, .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_merge_bytes_first_failure_in_order() {
        let err = merge_bytes(&[ONE_PAGE, b"junk", b"more junk"]).unwrap_err();
        assert_eq!(err.input_index(), Some(1));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let parallel = Stitcher::new()
            .input_bytes("a", ONE_PAGE.to_vec())
            .input_bytes("b", ONE_PAGE.to_vec())
            .merge_to_vec()
            .unwrap();
        let sequential = Stitcher::new()
            .input_bytes("a", ONE_PAGE.to_vec())
            .input_bytes("b", ONE_PAGE.to_vec())
            .sequential()
            .merge_to_vec()
            .unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_read_input_missing_file() {
        let err = read_input(3, "/nonexistent/input.pdf").unwrap_err();
        assert!(matches!(err, Error::UnreadableInput { index: 3, .. }));
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failing_writer_is_output_error() {
        let err = Stitcher::new()
            .input_bytes("a", ONE_PAGE.to_vec())
            .merge_to_writer(ClosedPipe)
            .unwrap_err();
        assert!(matches!(err, Error::WriterFailed(_)));
        assert_eq!(err.kind(), ErrorKind::OutputWrite);
        assert_eq!(err.exit_code(), 5);
    }
}
