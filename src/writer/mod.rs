//! Output container writing and merge reports.

mod report;
mod serializer;

pub use report::{InputContribution, InputReport, MergeReport};
pub use serializer::{serialize, to_vec, ContainerWriter, CountingWriter, WriteSummary};
