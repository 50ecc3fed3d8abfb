//! Top-level dictionary reader.
//!
//! Reads the entries of the dictionary an object body starts with, as byte
//! spans relative to that body. Values are not decoded beyond what the merge
//! stages need: references, integers, and the extent of nested containers.

use std::ops::Range;

use super::lexer::{Lexer, Token, TokenKind};

/// Shape of a dictionary value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// `id gen R`
    Reference { id: u64, generation: u64 },
    Integer(u64),
    Name,
    Dictionary,
    Array,
    Other,
}

/// One `/Key value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictEntry {
    pub key: Range<usize>,
    pub value: Range<usize>,
    pub kind: ValueKind,
}

impl DictEntry {
    /// Span from the start of the key to the end of the value.
    pub fn span(&self) -> Range<usize> {
        self.key.start..self.value.end
    }
}

/// The dictionary at the start of a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dictionary {
    /// Span of the opening `<<`
    pub open: Range<usize>,
    /// Span of the matching closing `>>`
    pub close: Range<usize>,
    pub entries: Vec<DictEntry>,
}

impl Dictionary {
    /// Parse the dictionary `data` starts with.
    ///
    /// Returns `None` when the first token is not `<<` or the dictionary is
    /// never closed.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let mut lexer = Lexer::new(data).without_streams();
        let open = lexer.next().filter(|t| t.kind == TokenKind::DictOpen)?;

        let mut tokens = Vec::new();
        let mut depth = 1usize;
        let mut close = None;
        for token in lexer {
            match token.kind {
                TokenKind::DictOpen => depth += 1,
                TokenKind::DictClose => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(token.span);
                        break;
                    }
                }
                _ => {}
            }
            tokens.push(token);
        }

        Some(Self {
            open: open.span,
            close: close?,
            entries: read_entries(data, &tokens),
        })
    }

    /// First entry with the given key (including the slash, e.g. `b"/Type"`).
    pub fn get(&self, data: &[u8], key: &[u8]) -> Option<&DictEntry> {
        self.entries.iter().find(|e| &data[e.key.clone()] == key)
    }

    /// All entries with the given key.
    pub fn get_all<'s>(
        &'s self,
        data: &'s [u8],
        key: &'s [u8],
    ) -> impl Iterator<Item = &'s DictEntry> + 's {
        self.entries
            .iter()
            .filter(move |e| &data[e.key.clone()] == key)
    }

    pub fn contains_key(&self, data: &[u8], key: &[u8]) -> bool {
        self.get(data, key).is_some()
    }
}

fn read_entries(data: &[u8], tokens: &[Token]) -> Vec<DictEntry> {
    let mut entries = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        if tokens[i].kind != TokenKind::Name {
            // Malformed: skip anything that is not a key.
            i += 1;
            continue;
        }
        let key = tokens[i].span.clone();
        i += 1;
        if i >= tokens.len() {
            break;
        }

        let (end, kind) = read_value(data, tokens, i);
        entries.push(DictEntry {
            key,
            value: tokens[i].span.start..tokens[end - 1].span.end,
            kind,
        });
        i = end;
    }

    entries
}

/// Read one value starting at `tokens[i]`; returns the index after it.
fn read_value(data: &[u8], tokens: &[Token], i: usize) -> (usize, ValueKind) {
    match tokens[i].kind {
        TokenKind::Integer(id) => {
            if let (Some(generation), Some(r)) = (
                tokens.get(i + 1).and_then(Token::as_integer),
                tokens.get(i + 2),
            ) {
                if r.is_keyword(data, b"R") {
                    return (i + 3, ValueKind::Reference { id, generation });
                }
            }
            (i + 1, ValueKind::Integer(id))
        }
        TokenKind::DictOpen | TokenKind::ArrayOpen => {
            let kind = if tokens[i].kind == TokenKind::DictOpen {
                ValueKind::Dictionary
            } else {
                ValueKind::Array
            };
            let mut depth = 0usize;
            for (j, token) in tokens.iter().enumerate().skip(i) {
                match token.kind {
                    TokenKind::DictOpen | TokenKind::ArrayOpen => depth += 1,
                    TokenKind::DictClose | TokenKind::ArrayClose => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            return (j + 1, kind);
                        }
                    }
                    _ => {}
                }
            }
            (tokens.len(), kind)
        }
        TokenKind::Name => (i + 1, ValueKind::Name),
        _ => (i + 1, ValueKind::Other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<'a>(data: &'a [u8], dict: &Dictionary, key: &[u8]) -> &'a [u8] {
        &data[dict.get(data, key).unwrap().value.clone()]
    }

    #[test]
    fn test_parse_entries() {
        let data = b"<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Rotate 90 >>";
        let dict = Dictionary::parse(data).unwrap();

        assert_eq!(dict.entries.len(), 4);
        assert_eq!(value(data, &dict, b"/Type"), b"/Page");
        assert_eq!(value(data, &dict, b"/Parent"), b"2 0 R");
        assert_eq!(value(data, &dict, b"/MediaBox"), b"[0 0 612 792]");
        assert_eq!(
            dict.get(data, b"/Parent").unwrap().kind,
            ValueKind::Reference {
                id: 2,
                generation: 0
            }
        );
        assert_eq!(dict.get(data, b"/Rotate").unwrap().kind, ValueKind::Integer(90));
        assert_eq!(&data[dict.close.clone()], b">>");
        assert_eq!(dict.close.end, data.len());
    }

    #[test]
    fn test_nested_values() {
        let data = b"<< /Resources << /Font << /F1 5 0 R >> >> /Type /Page >>";
        let dict = Dictionary::parse(data).unwrap();

        assert_eq!(dict.entries.len(), 2);
        assert_eq!(
            value(data, &dict, b"/Resources"),
            b"<< /Font << /F1 5 0 R >> >>"
        );
        assert_eq!(value(data, &dict, b"/Type"), b"/Page");
        // Nested keys are not top-level entries.
        assert!(!dict.contains_key(data, b"/Font"));
    }

    #[test]
    fn test_stream_object_dictionary() {
        let data = b"<< /Length 5 >>\nstream\n>> <<\nendstream\n";
        let dict = Dictionary::parse(data).unwrap();
        assert_eq!(dict.get(data, b"/Length").unwrap().kind, ValueKind::Integer(5));
        assert_eq!(dict.close, 13..15);
    }

    #[test]
    fn test_non_dictionary_body() {
        assert!(Dictionary::parse(b"[1 2 3]").is_none());
        assert!(Dictionary::parse(b"42").is_none());
        assert!(Dictionary::parse(b"").is_none());
    }

    #[test]
    fn test_unclosed_dictionary() {
        assert!(Dictionary::parse(b"<< /Type /Page").is_none());
    }

    #[test]
    fn test_get_all_duplicates() {
        let data = b"<< /Parent 2 0 R /Parent 9 0 R >>";
        let dict = Dictionary::parse(data).unwrap();
        assert_eq!(dict.get_all(data, b"/Parent").count(), 2);
    }
}
