//! Object scanner: finds every `id gen obj … endobj` span in a buffer.

use std::collections::BTreeMap;

use crate::model::{Generation, ObjectId, ObjectRecord, ScanStats};

use super::lexer::{skip_eol, Lexer, Token};

/// Objects found in one buffer.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub objects: BTreeMap<ObjectId, ObjectRecord>,
    pub stats: ScanStats,
}

/// An opener waiting for its terminator.
struct Opener {
    id: ObjectId,
    generation: Generation,
    offset: usize,
    body_start: usize,
}

/// Scan a raw buffer into a mapping of object id to record.
///
/// An opener is the token sequence `integer integer obj`; its body runs to
/// the next `endobj` keyword, with one leading line break trimmed. Literal
/// strings and stream payloads are skipped as opaque, so neither can end an
/// object early or fake a new one.
///
/// Recovery rules:
/// - an opener followed by end of input or by another opener before its
///   `endobj` is dropped, and scanning continues;
/// - a later definition of an id replaces an earlier one.
pub fn scan_objects(data: &[u8]) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();
    let mut lexer = Lexer::new(data);
    let mut window: [Option<Token>; 2] = [None, None];
    let mut open: Option<Opener> = None;

    while let Some(token) = lexer.next() {
        if token.is_keyword(data, b"obj") {
            if let Some(opener) = opener_from(&window, &token, data) {
                if let Some(dropped) = open.replace(opener) {
                    drop_unterminated(&mut outcome.stats, &dropped, "another object starts first");
                }
                window = [None, None];
                continue;
            }
        } else if token.is_keyword(data, b"endobj") {
            if let Some(opener) = open.take() {
                let record = ObjectRecord {
                    id: opener.id,
                    generation: opener.generation,
                    offset: opener.offset,
                    body: opener.body_start..token.span.start.max(opener.body_start),
                };
                if outcome.objects.insert(record.id, record).is_some() {
                    log::warn!(
                        "Object {} is defined more than once; keeping the last definition",
                        opener.id
                    );
                    outcome.stats.duplicates += 1;
                }
            }
            window = [None, None];
            continue;
        }

        let [_, last] = window;
        window = [last, Some(token)];
    }

    if let Some(dropped) = open {
        drop_unterminated(&mut outcome.stats, &dropped, "end of input reached");
    }

    outcome.stats.objects = outcome.objects.len();
    outcome
}

fn opener_from(window: &[Option<Token>; 2], obj: &Token, data: &[u8]) -> Option<Opener> {
    let [Some(first), Some(second)] = window else {
        return None;
    };
    let id = ObjectId::try_from(first.as_integer()?).ok()?;
    let generation = Generation::try_from(second.as_integer()?).ok()?;

    Some(Opener {
        id,
        generation,
        offset: first.span.start,
        body_start: skip_eol(data, obj.span.end),
    })
}

fn drop_unterminated(stats: &mut ScanStats, opener: &Opener, reason: &str) {
    log::warn!(
        "Dropping object {} {} at offset {}: no endobj ({})",
        opener.id,
        opener.generation,
        opener.offset,
        reason
    );
    stats.unterminated += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body<'a>(data: &'a [u8], outcome: &ScanOutcome, id: ObjectId) -> &'a [u8] {
        outcome.objects[&id].body(data)
    }

    #[test]
    fn test_scan_simple_objects() {
        let data = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\n2 0 obj\r\n(two)\nendobj\n";
        let outcome = scan_objects(data);

        assert_eq!(outcome.objects.len(), 2);
        assert_eq!(body(data, &outcome, 1), b"<< /Type /Catalog >>\n");
        assert_eq!(body(data, &outcome, 2), b"(two)\n");
        assert_eq!(outcome.objects[&1].offset, 9);
        assert_eq!(&data[outcome.objects[&2].offset..][..7], b"2 0 obj");
    }

    #[test]
    fn test_only_one_leading_line_break_is_trimmed() {
        let data = b"1 0 obj\n\n42\nendobj";
        let outcome = scan_objects(data);
        assert_eq!(body(data, &outcome, 1), b"\n42\n");
    }

    #[test]
    fn test_generation_is_recorded() {
        let data = b"7 3 obj\nnull\nendobj";
        let outcome = scan_objects(data);
        assert_eq!(outcome.objects[&7].generation, 3);
    }

    #[test]
    fn test_last_duplicate_wins() {
        let data = b"1 0 obj\n(first)\nendobj\n1 0 obj\n(second)\nendobj\n";
        let outcome = scan_objects(data);

        assert_eq!(outcome.objects.len(), 1);
        assert_eq!(body(data, &outcome, 1), b"(second)\n");
        assert_eq!(outcome.stats.duplicates, 1);
    }

    #[test]
    fn test_missing_terminator_at_end_is_dropped() {
        let data = b"1 0 obj\n(one)\nendobj\n2 0 obj\n<< /Type /Page >>\n";
        let outcome = scan_objects(data);

        assert_eq!(outcome.objects.len(), 1);
        assert!(outcome.objects.contains_key(&1));
        assert_eq!(outcome.stats.unterminated, 1);
    }

    #[test]
    fn test_missing_terminator_before_next_object_is_dropped() {
        let data = b"1 0 obj\n(one)\n2 0 obj\n(two)\nendobj\n";
        let outcome = scan_objects(data);

        assert_eq!(outcome.objects.len(), 1);
        assert_eq!(body(data, &outcome, 2), b"(two)\n");
        assert_eq!(outcome.stats.unterminated, 1);
    }

    #[test]
    fn test_stream_payload_cannot_fake_objects() {
        let payload = b"9 0 obj\nendobj\n";
        let mut data = Vec::new();
        data.extend_from_slice(b"4 0 obj\n<< /Length ");
        data.extend_from_slice(payload.len().to_string().as_bytes());
        data.extend_from_slice(b" >>\nstream\n");
        data.extend_from_slice(payload);
        data.extend_from_slice(b"\nendstream\nendobj\n");

        let outcome = scan_objects(&data);
        assert_eq!(outcome.objects.len(), 1);
        assert!(body(&data, &outcome, 4).ends_with(b"endstream\n"));
        assert!(!outcome.objects.contains_key(&9));
    }

    #[test]
    fn test_binary_payload_is_kept_verbatim() {
        let mut data = b"3 0 obj\n<< /Length 6 >>\nstream\n".to_vec();
        data.extend_from_slice(&[0x00, 0xff, b'(', b'e', b'n', b'd']);
        data.extend_from_slice(b"\nendstream\nendobj\n");

        let outcome = scan_objects(&data);
        let body = body(&data, &outcome, 3);
        assert!(body.windows(6).any(|w| w == [0x00, 0xff, b'(', b'e', b'n', b'd']));
    }

    #[test]
    fn test_xref_and_trailer_are_ignored() {
        let data = b"1 0 obj\n<< >>\nendobj\nxref\n0 2\n0000000000 65535 f \n0000000000 00000 n \n\
trailer\n<< /Size 2 /Root 1 0 R >>\nstartxref\n21\n%%EOF\n";
        let outcome = scan_objects(data);
        assert_eq!(outcome.objects.len(), 1);
        assert_eq!(outcome.stats.unterminated, 0);
    }

    #[test]
    fn test_no_objects() {
        let outcome = scan_objects(b"just some text, 1 0 R, nothing else");
        assert!(outcome.objects.is_empty());
        assert_eq!(outcome.stats, ScanStats::default());
    }
}
