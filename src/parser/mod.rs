//! PDF object-level parsing: tokenizer, object scanner and page classifier.

mod classify;
mod dict;
mod lexer;
mod scanner;

pub use classify::{classify_pages, is_page_body};
pub use dict::{DictEntry, Dictionary, ValueKind};
pub use lexer::{
    find, is_delimiter, is_regular, is_whitespace, skip_eol, skip_whitespace, Lexer, Token,
    TokenKind,
};
pub use scanner::{scan_objects, ScanOutcome};
