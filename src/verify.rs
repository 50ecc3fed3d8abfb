//! Cross-reference verification of written documents.
//!
//! Reads the classic `xref` table a document ends with and checks that every
//! in-use entry points exactly at its object's `id gen obj` opener.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::ObjectId;
use crate::parser::{is_whitespace, skip_whitespace, Dictionary, ValueKind};

/// An in-use entry whose offset does not land on its opener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XrefMismatch {
    pub id: ObjectId,
    pub generation: u16,
    pub offset: u64,
}

/// Result of checking a document's cross-reference table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct XrefReport {
    /// Offset named by `startxref`
    pub xref_offset: u64,
    /// `/Size` from the trailer
    pub size: Option<u64>,
    /// `/Root` from the trailer
    pub root: Option<ObjectId>,
    /// `/Info` from the trailer
    pub info: Option<ObjectId>,
    /// Total table entries, including free ones
    pub entries: usize,
    pub in_use: usize,
    pub free: usize,
    pub mismatches: Vec<XrefMismatch>,
}

impl XrefReport {
    /// True when every in-use entry is exact and the trailer names a root.
    pub fn is_valid(&self) -> bool {
        self.mismatches.is_empty()
            && self.root.is_some()
            && self.size == Some(self.entries as u64)
    }
}

/// Check the cross-reference table of `data`.
///
/// Fails with [`Error::InvalidXref`] when the table or trailer cannot be
/// read at all. Offsets that are merely wrong are reported, not errors.
pub fn check(data: &[u8]) -> Result<XrefReport> {
    let xref_offset = startxref(data)?;
    let mut cursor = Cursor::new(data, usize::try_from(xref_offset).unwrap_or(usize::MAX));

    if cursor.token() != Some(b"xref".as_slice()) {
        return Err(Error::InvalidXref(format!(
            "no xref keyword at offset {}",
            xref_offset
        )));
    }

    let mut report = XrefReport {
        xref_offset,
        ..Default::default()
    };

    loop {
        let Some(token) = cursor.peek() else {
            return Err(Error::InvalidXref("missing trailer".to_string()));
        };
        if token == b"trailer" {
            cursor.token();
            break;
        }

        let start = cursor.number("subsection start")?;
        let count = cursor.number("subsection count")?;
        let end = start.checked_add(count).ok_or_else(|| {
            Error::InvalidXref(format!("subsection {} {} runs past the id range", start, count))
        })?;
        for id in start..end {
            let offset = cursor.number("entry offset")?;
            let generation = cursor.number("entry generation")?;
            report.entries += 1;
            match cursor.token() {
                Some(b"n") => {
                    report.in_use += 1;
                    let id = ObjectId::try_from(id)
                        .map_err(|_| Error::InvalidXref(format!("object id {} out of range", id)))?;
                    let generation = u16::try_from(generation).unwrap_or(u16::MAX);
                    if !opener_at(data, offset, id, generation) {
                        report.mismatches.push(XrefMismatch {
                            id,
                            generation,
                            offset,
                        });
                    }
                }
                Some(b"f") => report.free += 1,
                _ => {
                    return Err(Error::InvalidXref(format!(
                        "entry for object {} has no type",
                        id
                    )))
                }
            }
        }
    }

    let trailer = &data[cursor.pos..];
    let dict = Dictionary::parse(trailer)
        .ok_or_else(|| Error::InvalidXref("unreadable trailer dictionary".to_string()))?;
    report.size = dict.get(trailer, b"/Size").and_then(|e| match e.kind {
        ValueKind::Integer(n) => Some(n),
        _ => None,
    });
    report.root = dict.get(trailer, b"/Root").and_then(|e| reference_id(e.kind));
    report.info = dict.get(trailer, b"/Info").and_then(|e| reference_id(e.kind));

    if !report.mismatches.is_empty() {
        log::warn!(
            "{} of {} cross-reference offsets do not point at their objects",
            report.mismatches.len(),
            report.in_use
        );
    }
    Ok(report)
}

fn startxref(data: &[u8]) -> Result<u64> {
    const KEYWORD: &[u8] = b"startxref";
    let at = data
        .windows(KEYWORD.len())
        .rposition(|w| w == KEYWORD)
        .ok_or_else(|| Error::InvalidXref("no startxref keyword".to_string()))?;
    Cursor::new(data, at + KEYWORD.len()).number("startxref offset")
}

fn opener_at(data: &[u8], offset: u64, id: ObjectId, generation: u16) -> bool {
    let opener = format!("{} {} obj", id, generation);
    usize::try_from(offset)
        .ok()
        .and_then(|offset| data.get(offset..))
        .is_some_and(|rest| rest.starts_with(opener.as_bytes()))
}

fn reference_id(kind: ValueKind) -> Option<ObjectId> {
    match kind {
        ValueKind::Reference { id, .. } => ObjectId::try_from(id).ok(),
        _ => None,
    }
}

/// Whitespace-separated token reader over the xref section.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8], pos: usize) -> Self {
        Self {
            data,
            pos: pos.min(data.len()),
        }
    }

    fn peek(&self) -> Option<&'a [u8]> {
        let start = skip_whitespace(self.data, self.pos);
        let end = self.data[start..]
            .iter()
            .position(|&b| is_whitespace(b))
            .map_or(self.data.len(), |n| start + n);
        (start < end).then(|| &self.data[start..end])
    }

    fn token(&mut self) -> Option<&'a [u8]> {
        let token = self.peek()?;
        self.pos = skip_whitespace(self.data, self.pos) + token.len();
        Some(token)
    }

    fn number(&mut self, what: &str) -> Result<u64> {
        self.token()
            .and_then(|t| std::str::from_utf8(t).ok())
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| Error::InvalidXref(format!("expected {}", what)))
    }
}
