//! PDF header detection.

use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

/// Version written when no input declares a newer one.
pub const MIN_OUTPUT_VERSION: PdfVersion = PdfVersion { major: 1, minor: 4 };

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Readers accept the header anywhere in the first kilobyte.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// A `major.minor` PDF version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PdfVersion {
    pub major: u8,
    pub minor: u8,
}

impl PdfVersion {
    /// Parse a version string such as `"1.7"`.
    pub fn parse(version: &str) -> Option<Self> {
        let bytes = version.as_bytes();
        if bytes.len() != VERSION_LEN || bytes[1] != b'.' {
            return None;
        }
        if !bytes[0].is_ascii_digit() || !bytes[2].is_ascii_digit() {
            return None;
        }
        Some(Self {
            major: bytes[0] - b'0',
            minor: bytes[2] - b'0',
        })
    }
}

impl PartialOrd for PdfVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PdfVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor).cmp(&(other.major, other.minor))
    }
}

impl fmt::Display for PdfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl Serialize for PdfVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Detect the declared PDF version of a buffer.
///
/// Returns `None` when no `%PDF-x.y` header appears in the first kilobyte.
/// A missing header is not fatal for merging: whether a buffer is usable is
/// decided by the object scanner.
pub fn detect_version(data: &[u8]) -> Option<PdfVersion> {
    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW)];
    let start = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)?
        + PDF_MAGIC.len();

    let version_bytes = data.get(start..start + VERSION_LEN)?;
    let version = std::str::from_utf8(version_bytes).ok()?;
    PdfVersion::parse(version)
}

/// Check if bytes carry a PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    detect_version(data).is_some()
}

/// Pick the version to declare for a merged output.
///
/// The highest declared input version wins, but never below
/// [`MIN_OUTPUT_VERSION`].
pub fn output_version<I>(versions: I) -> PdfVersion
where
    I: IntoIterator<Item = Option<PdfVersion>>,
{
    versions
        .into_iter()
        .flatten()
        .fold(MIN_OUTPUT_VERSION, |acc, v| acc.max(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_valid_pdf() {
        let data = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3";
        assert_eq!(
            detect_version(data),
            Some(PdfVersion { major: 1, minor: 7 })
        );
    }

    #[test]
    fn test_detect_pdf_2_0() {
        let data = b"%PDF-2.0\n";
        assert_eq!(detect_version(data).unwrap().to_string(), "2.0");
    }

    #[test]
    fn test_detect_header_after_junk() {
        let data = b"\xef\xbb\xbfjunk\n%PDF-1.5\n1 0 obj";
        assert_eq!(detect_version(data).unwrap().to_string(), "1.5");
    }

    #[test]
    fn test_detect_invalid_format() {
        assert_eq!(detect_version(b"<!DOCTYPE html>"), None);
        assert_eq!(detect_version(b"%PDF"), None);
        assert_eq!(detect_version(b"%PDF-x.y"), None);
    }

    #[test]
    fn test_is_pdf_bytes() {
        assert!(is_pdf_bytes(b"%PDF-1.4\n"));
        assert!(!is_pdf_bytes(b"Not a PDF"));
        assert!(!is_pdf_bytes(b""));
    }

    #[test]
    fn test_version_validation() {
        assert!(PdfVersion::parse("1.0").is_some());
        assert!(PdfVersion::parse("2.0").is_some());
        assert!(PdfVersion::parse("10.0").is_none());
        assert!(PdfVersion::parse("abc").is_none());
    }

    #[test]
    fn test_output_version_floor_and_max() {
        assert_eq!(output_version([None, None]), MIN_OUTPUT_VERSION);
        let v13 = PdfVersion::parse("1.3");
        assert_eq!(output_version([v13]), MIN_OUTPUT_VERSION);
        let v17 = PdfVersion::parse("1.7");
        assert_eq!(output_version([v13, v17, None]).to_string(), "1.7");
    }
}
