//! C# subset scanner/tokenizer for the isx completion engine.
//!
//! This crate provides the lexical analysis phase:
//! - `SyntaxKind` - Token types and keyword tables
//! - `ScannerState` - Tokenizer producing a token vector plus comment trivia
//! - `TokenFlags` - Per-token facts (line breaks, unterminated literals)

pub mod syntax_kind;
pub use syntax_kind::{SyntaxKind, keyword_kind, text_to_keyword};

pub mod scanner;
pub use scanner::{CommentKind, CommentRange, ScanResult, ScannerState, Token, TokenFlags, scan};

#[cfg(test)]
#[path = "../tests/scanner_tests.rs"]
mod tests;
