//! Byte-level tokenizer for PDF object syntax.
//!
//! The lexer is a small state machine over byte positions. It never looks
//! inside literal strings, comments or stream payloads, so keywords such as
//! `obj`, `endobj` and `R` are only recognized where a conforming reader
//! would see them.

use std::ops::Range;

use super::dict::{Dictionary, ValueKind};

/// PDF whitespace characters (ISO 32000-1, Table 1).
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' | b'\0')
}

/// PDF delimiter characters (ISO 32000-1, Table 2).
pub fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

/// Regular characters form names, numbers and keywords.
pub fn is_regular(b: u8) -> bool {
    !is_whitespace(b) && !is_delimiter(b)
}

/// Skip a single end-of-line marker (`\r\n`, `\n` or `\r`) at `pos`.
pub fn skip_eol(data: &[u8], pos: usize) -> usize {
    match data.get(pos..) {
        Some([b'\r', b'\n', ..]) => pos + 2,
        Some([b'\n', ..]) | Some([b'\r', ..]) => pos + 1,
        _ => pos,
    }
}

/// Skip any run of whitespace starting at `pos`.
pub fn skip_whitespace(data: &[u8], mut pos: usize) -> usize {
    while pos < data.len() && is_whitespace(data[pos]) {
        pos += 1;
    }
    pos
}

/// Find the first occurrence of `needle` in `haystack`.
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Unsigned integer that fits in a `u64`
    Integer(u64),
    /// Any other numeric literal (signed, real, or too large)
    Number,
    /// `/Name`, including the leading slash
    Name,
    /// Bare word: `obj`, `endobj`, `R`, `stream`, `true`, …
    Keyword,
    DictOpen,
    DictClose,
    ArrayOpen,
    ArrayClose,
    HexString,
    LiteralString,
    /// Opaque stream payload following a `stream` keyword
    StreamData,
    /// Stray delimiter
    Other,
}

/// A token and its byte span in the lexed buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    /// Bytes covered by this token.
    pub fn bytes<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.span.clone()]
    }

    /// Check for a specific keyword.
    pub fn is_keyword(&self, data: &[u8], keyword: &[u8]) -> bool {
        self.kind == TokenKind::Keyword && self.bytes(data) == keyword
    }

    pub fn as_integer(&self) -> Option<u64> {
        match self.kind {
            TokenKind::Integer(value) => Some(value),
            _ => None,
        }
    }
}

/// Tokenizer over a byte buffer.
pub struct Lexer<'a> {
    data: &'a [u8],
    pos: usize,
    streams: bool,
    depth: usize,
    /// Offset of the outermost open `<<`, used to find a stream's `/Length`
    dict_start: Option<usize>,
    /// Span of a `stream` keyword whose payload is emitted next
    pending_stream: Option<Range<usize>>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over `data` with stream payloads treated as opaque.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            streams: true,
            depth: 0,
            dict_start: None,
            pending_stream: None,
        }
    }

    /// Tokenize bytes after `stream` like any other content.
    ///
    /// Only meaningful for buffers known to end before any payload, such as
    /// a stream's dictionary.
    pub fn without_streams(mut self) -> Self {
        self.streams = false;
        self
    }

    /// Current byte position.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn regular_run_end(&self, mut pos: usize) -> usize {
        while pos < self.data.len() && is_regular(self.data[pos]) {
            pos += 1;
        }
        pos
    }

    fn skip_literal_string(&self, start: usize) -> usize {
        let mut depth = 0usize;
        let mut i = start;
        while i < self.data.len() {
            match self.data[i] {
                b'\\' => {
                    i += 2;
                    continue;
                }
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return i + 1;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        self.data.len()
    }

    fn skip_comment(&self, mut pos: usize) -> usize {
        while pos < self.data.len() && !matches!(self.data[pos], b'\n' | b'\r') {
            pos += 1;
        }
        pos
    }

    /// Direct `/Length` of the dictionary that precedes a `stream` keyword.
    fn declared_length(&self, keyword_start: usize) -> Option<usize> {
        let start = self.dict_start?;
        let dict_bytes = self.data.get(start..keyword_start)?;
        let dict = Dictionary::parse(dict_bytes)?;
        match dict.get(dict_bytes, b"/Length")?.kind {
            ValueKind::Integer(length) => usize::try_from(length).ok(),
            _ => None,
        }
    }

    fn stream_payload(&self, keyword: &Range<usize>) -> Range<usize> {
        let start = skip_eol(self.data, keyword.end);

        if let Some(end) = self
            .declared_length(keyword.start)
            .and_then(|length| start.checked_add(length))
            .filter(|&end| end <= self.data.len())
        {
            let after = skip_whitespace(self.data, end);
            if self.data[after..].starts_with(b"endstream") {
                return start..end;
            }
            log::debug!(
                "Declared stream length at offset {} does not reach endstream",
                keyword.start
            );
        }

        match find(&self.data[start..], b"endstream") {
            Some(i) => start..start + i,
            None => start..self.data.len(),
        }
    }

    fn classify_run(bytes: &[u8]) -> TokenKind {
        if bytes.iter().all(u8::is_ascii_digit) {
            return bytes
                .iter()
                .try_fold(0u64, |acc, &b| {
                    acc.checked_mul(10)?.checked_add(u64::from(b - b'0'))
                })
                .map_or(TokenKind::Number, TokenKind::Integer);
        }

        let unsigned = match bytes.first() {
            Some(b'+') | Some(b'-') => &bytes[1..],
            _ => bytes,
        };
        let digits = unsigned.iter().filter(|b| b.is_ascii_digit()).count();
        let dots = unsigned.iter().filter(|&&b| b == b'.').count();
        if digits > 0 && dots <= 1 && digits + dots == unsigned.len() {
            TokenKind::Number
        } else {
            TokenKind::Keyword
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if let Some(keyword) = self.pending_stream.take() {
            let span = self.stream_payload(&keyword);
            self.pos = span.end;
            return Some(Token {
                kind: TokenKind::StreamData,
                span,
            });
        }

        loop {
            self.pos = skip_whitespace(self.data, self.pos);
            if self.pos >= self.data.len() {
                return None;
            }
            if self.data[self.pos] == b'%' {
                self.pos = self.skip_comment(self.pos);
                continue;
            }
            break;
        }

        let start = self.pos;
        let next = self.data.get(start + 1).copied();
        let kind = match self.data[start] {
            b'(' => {
                self.pos = self.skip_literal_string(start);
                TokenKind::LiteralString
            }
            b'<' if next == Some(b'<') => {
                self.pos = start + 2;
                if self.depth == 0 {
                    self.dict_start = Some(start);
                }
                self.depth += 1;
                TokenKind::DictOpen
            }
            b'<' => {
                self.pos = match find(&self.data[start..], b">") {
                    Some(i) => start + i + 1,
                    None => self.data.len(),
                };
                TokenKind::HexString
            }
            b'>' if next == Some(b'>') => {
                self.pos = start + 2;
                self.depth = self.depth.saturating_sub(1);
                TokenKind::DictClose
            }
            b'[' => {
                self.pos = start + 1;
                TokenKind::ArrayOpen
            }
            b']' => {
                self.pos = start + 1;
                TokenKind::ArrayClose
            }
            b'/' => {
                self.pos = self.regular_run_end(start + 1);
                TokenKind::Name
            }
            b'>' | b')' | b'{' | b'}' => {
                self.pos = start + 1;
                TokenKind::Other
            }
            _ => {
                self.pos = self.regular_run_end(start);
                Self::classify_run(&self.data[start..self.pos])
            }
        };

        let token = Token {
            kind,
            span: start..self.pos,
        };

        if token.kind == TokenKind::Keyword {
            let word = token.bytes(self.data);
            if self.streams && word == b"stream" {
                self.pending_stream = Some(token.span.clone());
            } else if word == b"obj" || word == b"endobj" {
                // Object boundaries close any dictionary left open by bad input.
                self.depth = 0;
                self.dict_start = None;
            }
        }

        Some(token)
    }
}
