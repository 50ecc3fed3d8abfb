//! Error types for pdfstitch library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pdfstitch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while merging documents.
///
/// Input-side variants carry the zero-based position of the offending input
/// in the merge order, so callers can tell one bad input from another.
#[derive(Error, Debug)]
pub enum Error {
    /// An input could not be opened or read.
    #[error("Cannot read input #{} ({}): {source}", .index + 1, .path.display())]
    UnreadableInput {
        index: usize,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An input was readable but contained no bytes.
    #[error("Input #{} ({}) is empty", .index + 1, .path.display())]
    EmptyInput { index: usize, path: PathBuf },

    /// Scanning a readable input found no objects.
    #[error("Input #{} ({label}) is not a recognizable PDF document", .index + 1)]
    UnrecognizedStructure { index: usize, label: String },

    /// No page objects were found across all inputs.
    #[error("No page objects found in {inputs} input(s)")]
    NoPages { inputs: usize },

    /// The merged output could not be written.
    #[error("Cannot write output {}: {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A caller-supplied writer failed while the merged output was written.
    #[error("Cannot write merged output: {0}")]
    WriterFailed(#[source] io::Error),

    /// The merge was started without any inputs.
    #[error("No input documents given")]
    NoInputs,

    /// A page selection string could not be parsed.
    #[error("Invalid page selection: {0}")]
    InvalidPageSelection(String),

    /// The cross-reference section of a document could not be read.
    #[error("Invalid cross-reference table: {0}")]
    InvalidXref(String),

    /// I/O error outside of the input/output taxonomy above.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Coarse classification of [`Error`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnreadableInput,
    UnparsableStructure,
    NoPages,
    OutputWrite,
    InvalidArgument,
    Other,
}

impl ErrorKind {
    /// Process exit code reported for this kind of failure.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::UnreadableInput => 2,
            ErrorKind::UnparsableStructure => 3,
            ErrorKind::NoPages => 4,
            ErrorKind::OutputWrite => 5,
            ErrorKind::InvalidArgument | ErrorKind::Other => 1,
        }
    }
}

impl Error {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnreadableInput { .. } | Error::EmptyInput { .. } => ErrorKind::UnreadableInput,
            Error::UnrecognizedStructure { .. } => ErrorKind::UnparsableStructure,
            Error::NoPages { .. } => ErrorKind::NoPages,
            Error::OutputWrite { .. } | Error::WriterFailed(_) => ErrorKind::OutputWrite,
            Error::NoInputs | Error::InvalidPageSelection(_) => ErrorKind::InvalidArgument,
            Error::InvalidXref(_) | Error::Io(_) => ErrorKind::Other,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }

    /// Zero-based index of the input that caused the error, if any.
    pub fn input_index(&self) -> Option<usize> {
        match self {
            Error::UnreadableInput { index, .. }
            | Error::EmptyInput { index, .. }
            | Error::UnrecognizedStructure { index, .. } => Some(*index),
            _ => None,
        }
    }
}
