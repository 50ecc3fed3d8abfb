//! Container serialization with exact cross-reference offsets.

use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::detect::PdfVersion;
use crate::merge::MergedGraph;
use crate::model::ObjectId;

/// Binary-marker comment written after the header line.
const BINARY_MARKER: &[u8] = b"%\xE2\xE3\xCF\xD3\n";

/// A writer that counts the bytes passed through it.
#[derive(Debug)]
pub struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W: Write> CountingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }

    /// Bytes written so far.
    pub fn position(&self) -> u64 {
        self.count
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Totals of a finished container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    /// Number of objects written
    pub objects: usize,
    /// Offset of the `xref` keyword
    pub xref_offset: u64,
    /// Total bytes written
    pub bytes: u64,
    /// `/Size` written to the trailer
    pub size: u32,
}

/// Writes indirect objects and the trailing cross-reference section.
///
/// Each object's offset is taken from the byte count immediately before
/// its opener is written.
#[derive(Debug)]
pub struct ContainerWriter<W: Write> {
    out: CountingWriter<W>,
    offsets: BTreeMap<ObjectId, u64>,
}

impl<W: Write> ContainerWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            out: CountingWriter::new(inner),
            offsets: BTreeMap::new(),
        }
    }

    /// Write the `%PDF-x.y` header and binary marker.
    pub fn write_header(&mut self, version: PdfVersion) -> io::Result<()> {
        writeln!(self.out, "%PDF-{}", version)?;
        self.out.write_all(BINARY_MARKER)
    }

    /// Write one object as `"{id} 0 obj\n{body}endobj\n"`.
    ///
    /// A line break is added before `endobj` when the body lacks one.
    pub fn write_object(&mut self, id: ObjectId, body: &[u8]) -> io::Result<()> {
        self.offsets.insert(id, self.out.position());
        writeln!(self.out, "{} 0 obj", id)?;
        self.out.write_all(body)?;
        if !matches!(body.last().copied(), Some(b'\n' | b'\r')) {
            self.out.write_all(b"\n")?;
        }
        self.out.write_all(b"endobj\n")
    }

    /// Offset recorded for an object.
    pub fn offset(&self, id: ObjectId) -> Option<u64> {
        self.offsets.get(&id).copied()
    }

    /// Write the cross-reference table, trailer and `startxref`.
    ///
    /// The table covers ids `0..size`, where `size` is one past the highest
    /// id written. Ids never written get free entries.
    pub fn finish(mut self, root: ObjectId, info: Option<ObjectId>) -> io::Result<(W, WriteSummary)> {
        let xref_offset = self.out.position();
        let size = self.offsets.keys().next_back().map_or(1, |&max| max + 1);

        write!(self.out, "xref\n0 {}\n", size)?;
        self.out.write_all(b"0000000000 65535 f \n")?;
        for id in 1..size {
            match self.offsets.get(&id) {
                Some(offset) => writeln!(self.out, "{:010} 00000 n ", offset)?,
                None => self.out.write_all(b"0000000000 00000 f \n")?,
            }
        }

        write!(self.out, "trailer\n<< /Size {} /Root {} 0 R", size, root)?;
        if let Some(info) = info {
            write!(self.out, " /Info {} 0 R", info)?;
        }
        writeln!(self.out, " >>\nstartxref\n{}\n%%EOF", xref_offset)?;
        self.out.flush()?;

        let summary = WriteSummary {
            objects: self.offsets.len(),
            xref_offset,
            bytes: self.out.position(),
            size,
        };
        Ok((self.out.into_inner(), summary))
    }
}

/// Serialize a merged graph to `out`.
///
/// Fails with [`io::ErrorKind::InvalidData`] when the written table size
/// differs from the size the graph was planned with.
pub fn serialize<W: Write>(graph: &MergedGraph, out: W) -> io::Result<(W, WriteSummary)> {
    let mut writer = ContainerWriter::new(out);
    writer.write_header(graph.version)?;
    for object in &graph.objects {
        writer.write_object(object.id, &object.body)?;
    }
    let (out, summary) = writer.finish(graph.catalog_id, graph.info_id)?;
    if summary.size != graph.size {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "cross-reference size {} differs from planned size {}",
                summary.size, graph.size
            ),
        ));
    }
    Ok((out, summary))
}

/// Serialize a merged graph into a new buffer.
pub fn to_vec(graph: &MergedGraph) -> io::Result<Vec<u8>> {
    serialize(graph, Vec::new()).map(|(bytes, _)| bytes)
}
