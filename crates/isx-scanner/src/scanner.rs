//! Scanner implementation.
//!
//! The whole file is scanned up front into a token vector. The parser walks the
//! vector by index, which makes speculative parsing (generic argument lists,
//! lambda detection, local declarations) a matter of saving and restoring an
//! integer. Comments and preprocessor lines are not tokens; they are recorded
//! as `CommentRange`s so the completion classifier can reject carets inside them.

use crate::syntax_kind::{SyntaxKind, text_to_keyword};
use bitflags::bitflags;
use isx_common::Span;
use serde::Serialize;

bitflags! {
    /// Facts about a single token.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TokenFlags: u8 {
        /// A line break occurs between the previous token and this one.
        const PRECEDING_LINE_BREAK = 1 << 0;
        /// String, char or comment literal missing its terminator.
        const UNTERMINATED = 1 << 1;
        /// `@"..."` string or `@ident` escaped identifier.
        const VERBATIM = 1 << 2;
        /// `$"..."` string.
        const INTERPOLATED = 1 << 3;
        /// `"""..."""` string.
        const RAW = 1 << 4;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub start: u32,
    pub end: u32,
    pub flags: TokenFlags,
}

impl Token {
    #[inline]
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    #[inline]
    pub fn has_preceding_line_break(&self) -> bool {
        self.flags.contains(TokenFlags::PRECEDING_LINE_BREAK)
    }

    #[inline]
    pub fn is_unterminated(&self) -> bool {
        self.flags.contains(TokenFlags::UNTERMINATED)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CommentKind {
    /// `// ...`
    Line,
    /// `/// ...`
    Documentation,
    /// `/* ... */`
    Block,
    /// `#region`, `#if`, ...
    Directive,
}

/// A comment or preprocessor line in the source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CommentRange {
    pub span: Span,
    pub kind: CommentKind,
    pub unterminated: bool,
}

impl CommentRange {
    /// True if a caret at `offset` is inside the comment text.
    ///
    /// Line comments extend to the end of their line, so a caret at the very
    /// end counts as inside; a block comment only contains carets between its
    /// delimiters (or anywhere after the opener when unterminated).
    pub fn contains_caret(&self, offset: u32) -> bool {
        match self.kind {
            CommentKind::Line | CommentKind::Documentation | CommentKind::Directive => {
                self.span.start < offset && offset <= self.span.end
            }
            CommentKind::Block if self.unterminated => self.span.start < offset,
            CommentKind::Block => self.span.start < offset && offset < self.span.end,
        }
    }
}

/// Output of scanning one file.
#[derive(Clone, Debug, Default)]
pub struct ScanResult {
    /// Tokens in source order; always ends with `EndOfFileToken`.
    pub tokens: Vec<Token>,
    pub comments: Vec<CommentRange>,
}

/// Scan `text` into tokens and comment trivia.
pub fn scan(text: &str) -> ScanResult {
    let mut scanner = ScannerState::new(text);
    scanner.scan_all();
    ScanResult {
        tokens: scanner.tokens,
        comments: scanner.comments,
    }
}

/// Tokenizer state machine over a byte view of the source.
pub struct ScannerState<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line_break_pending: bool,
    at_line_start: bool,
    tokens: Vec<Token>,
    comments: Vec<CommentRange>,
}

impl<'a> ScannerState<'a> {
    pub fn new(text: &'a str) -> Self {
        ScannerState {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            line_break_pending: false,
            at_line_start: true,
            tokens: Vec::with_capacity(text.len() / 4 + 1),
            comments: Vec::new(),
        }
    }

    fn scan_all(&mut self) {
        loop {
            self.skip_trivia();
            let start = self.pos;
            if start >= self.bytes.len() {
                self.push(SyntaxKind::EndOfFileToken, start, start, TokenFlags::empty());
                break;
            }
            let (kind, flags) = self.scan_token();
            self.push(kind, start, self.pos, flags);
        }
    }

    fn push(&mut self, kind: SyntaxKind, start: usize, end: usize, mut flags: TokenFlags) {
        if self.line_break_pending {
            flags |= TokenFlags::PRECEDING_LINE_BREAK;
            self.line_break_pending = false;
        }
        self.at_line_start = false;
        self.tokens.push(Token {
            kind,
            start: start as u32,
            end: end as u32,
            flags,
        });
    }

    #[inline]
    fn peek(&self, offset: usize) -> u8 {
        self.bytes.get(self.pos + offset).copied().unwrap_or(0)
    }

    // =========================================================================
    // Trivia
    // =========================================================================

    fn skip_trivia(&mut self) {
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\n' | b'\r' => {
                    self.pos += 1;
                    self.line_break_pending = true;
                    self.at_line_start = true;
                }
                b' ' | b'\t' | 0x0B | 0x0C => self.pos += 1,
                b'/' if self.peek(1) == b'/' => {
                    let start = self.pos;
                    let kind = if self.peek(2) == b'/' && self.peek(3) != b'/' {
                        CommentKind::Documentation
                    } else {
                        CommentKind::Line
                    };
                    self.pos = self.line_end(self.pos);
                    self.comment(start, kind, false);
                }
                b'/' if self.peek(1) == b'*' => {
                    let start = self.pos;
                    let body = start + 2;
                    match memchr::memmem::find(&self.bytes[body..], b"*/") {
                        Some(rel) => {
                            let end = body + rel + 2;
                            if memchr::memchr2(b'\n', b'\r', &self.bytes[start..end]).is_some() {
                                self.line_break_pending = true;
                            }
                            self.pos = end;
                            self.comment(start, CommentKind::Block, false);
                        }
                        None => {
                            self.pos = self.bytes.len();
                            self.comment(start, CommentKind::Block, true);
                        }
                    }
                }
                b'#' if self.at_line_start => {
                    let start = self.pos;
                    self.pos = self.line_end(self.pos);
                    self.comment(start, CommentKind::Directive, false);
                }
                0xEF if self.pos == 0 && self.text.starts_with('\u{FEFF}') => self.pos += 3,
                _ => break,
            }
        }
    }

    fn line_end(&self, from: usize) -> usize {
        memchr::memchr2(b'\n', b'\r', &self.bytes[from..])
            .map(|rel| from + rel)
            .unwrap_or(self.bytes.len())
    }

    fn comment(&mut self, start: usize, kind: CommentKind, unterminated: bool) {
        self.comments.push(CommentRange {
            span: Span::new(start as u32, self.pos as u32),
            kind,
            unterminated,
        });
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    fn scan_token(&mut self) -> (SyntaxKind, TokenFlags) {
        let ch = self.bytes[self.pos];
        match ch {
            b'0'..=b'9' => (self.scan_number(), TokenFlags::empty()),
            b'.' if self.peek(1).is_ascii_digit() => (self.scan_number(), TokenFlags::empty()),
            b'"' => self.scan_string(TokenFlags::empty()),
            b'\'' => self.scan_char(),
            b'@' if self.peek(1) == b'"' => {
                self.pos += 1;
                self.scan_string(TokenFlags::VERBATIM)
            }
            b'@' if self.peek(1) == b'$' && self.peek(2) == b'"' => {
                self.pos += 2;
                self.scan_string(TokenFlags::VERBATIM | TokenFlags::INTERPOLATED)
            }
            b'$' if self.peek(1) == b'@' && self.peek(2) == b'"' => {
                self.pos += 2;
                self.scan_string(TokenFlags::VERBATIM | TokenFlags::INTERPOLATED)
            }
            b'$' if self.peek(1) == b'"' || self.peek(1) == b'$' => {
                while self.peek(0) == b'$' {
                    self.pos += 1;
                }
                self.scan_string(TokenFlags::INTERPOLATED)
            }
            b'@' if is_identifier_start(self.peek(1)) => {
                self.pos += 1;
                self.scan_identifier_rest();
                (SyntaxKind::Identifier, TokenFlags::VERBATIM)
            }
            c if is_identifier_start(c) && self.identifier_char_at(self.pos) => {
                let start = self.pos;
                self.scan_identifier_rest();
                let text = &self.text[start..self.pos];
                (
                    text_to_keyword(text).unwrap_or(SyntaxKind::Identifier),
                    TokenFlags::empty(),
                )
            }
            _ => (self.scan_punctuation(), TokenFlags::empty()),
        }
    }

    fn identifier_char_at(&self, pos: usize) -> bool {
        match self.bytes.get(pos) {
            Some(&c) if c < 0x80 => c.is_ascii_alphabetic() || c == b'_',
            Some(_) => self.text[pos..]
                .chars()
                .next()
                .is_some_and(char::is_alphabetic),
            None => false,
        }
    }

    fn scan_identifier_rest(&mut self) {
        while self.pos < self.bytes.len() {
            let c = self.bytes[self.pos];
            if c.is_ascii_alphanumeric() || c == b'_' {
                self.pos += 1;
            } else if c >= 0x80 {
                match self.text[self.pos..].chars().next() {
                    Some(ch) if ch.is_alphanumeric() => self.pos += ch.len_utf8(),
                    _ => break,
                }
            } else {
                break;
            }
        }
    }

    fn scan_number(&mut self) -> SyntaxKind {
        if self.peek(0) == b'0' && matches!(self.peek(1), b'x' | b'X' | b'b' | b'B') {
            self.pos += 2;
            while self.peek(0).is_ascii_hexdigit() || self.peek(0) == b'_' {
                self.pos += 1;
            }
            self.scan_integer_suffix();
            return SyntaxKind::NumericLiteral;
        }

        self.skip_digits();
        let mut is_real = false;
        if self.peek(0) == b'.' && self.peek(1).is_ascii_digit() {
            is_real = true;
            self.pos += 1;
            self.skip_digits();
        }
        if matches!(self.peek(0), b'e' | b'E') {
            let sign = usize::from(matches!(self.peek(1), b'+' | b'-'));
            if self.peek(1 + sign).is_ascii_digit() {
                is_real = true;
                self.pos += 1 + sign;
                self.skip_digits();
            }
        }
        match self.peek(0) {
            b'f' | b'F' | b'd' | b'D' | b'm' | b'M' => self.pos += 1,
            _ if !is_real => self.scan_integer_suffix(),
            _ => {}
        }
        SyntaxKind::NumericLiteral
    }

    fn skip_digits(&mut self) {
        while self.peek(0).is_ascii_digit() || self.peek(0) == b'_' {
            self.pos += 1;
        }
    }

    fn scan_integer_suffix(&mut self) {
        for _ in 0..2 {
            if matches!(self.peek(0), b'u' | b'U' | b'l' | b'L') {
                self.pos += 1;
            }
        }
    }

    /// Scan a string starting at the opening quote. The caller has already
    /// consumed any `@`/`$` prefix.
    fn scan_string(&mut self, mut flags: TokenFlags) -> (SyntaxKind, TokenFlags) {
        let quote_run = self.bytes[self.pos..]
            .iter()
            .take_while(|&&b| b == b'"')
            .count();
        if quote_run >= 3 {
            flags |= TokenFlags::RAW;
            self.pos += quote_run;
            let closing = "\"".repeat(quote_run);
            match memchr::memmem::find(&self.bytes[self.pos..], closing.as_bytes()) {
                Some(rel) => self.pos += rel + quote_run,
                None => {
                    self.pos = self.bytes.len();
                    flags |= TokenFlags::UNTERMINATED;
                }
            }
            return (SyntaxKind::StringLiteral, flags);
        }

        self.pos += 1;
        let verbatim = flags.contains(TokenFlags::VERBATIM);
        let interpolated = flags.contains(TokenFlags::INTERPOLATED);
        let mut brace_depth = 0u32;
        while self.pos < self.bytes.len() {
            let c = self.bytes[self.pos];
            match c {
                b'"' if verbatim && self.peek(1) == b'"' => self.pos += 2,
                b'"' if brace_depth == 0 => {
                    self.pos += 1;
                    return (SyntaxKind::StringLiteral, flags);
                }
                b'"' => {
                    // Nested string inside an interpolation hole.
                    self.pos += 1;
                    while self.pos < self.bytes.len() && !matches!(self.bytes[self.pos], b'"' | b'\n') {
                        if self.bytes[self.pos] == b'\\' {
                            self.pos += 1;
                        }
                        self.pos += 1;
                    }
                    self.pos += 1;
                }
                b'\\' if !verbatim => self.pos += 2,
                b'{' if interpolated && self.peek(1) == b'{' && brace_depth == 0 => self.pos += 2,
                b'{' if interpolated => {
                    brace_depth += 1;
                    self.pos += 1;
                }
                b'}' if interpolated && brace_depth > 0 => {
                    brace_depth -= 1;
                    self.pos += 1;
                }
                b'\n' | b'\r' if !verbatim => break,
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.bytes.len());
        (SyntaxKind::StringLiteral, flags | TokenFlags::UNTERMINATED)
    }

    fn scan_char(&mut self) -> (SyntaxKind, TokenFlags) {
        self.pos += 1;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\\' => self.pos += 2,
                b'\'' => {
                    self.pos += 1;
                    return (SyntaxKind::CharacterLiteral, TokenFlags::empty());
                }
                b'\n' | b'\r' => break,
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.bytes.len());
        (SyntaxKind::CharacterLiteral, TokenFlags::UNTERMINATED)
    }

    fn scan_punctuation(&mut self) -> SyntaxKind {
        let c0 = self.peek(0);
        let c1 = self.peek(1);
        let c2 = self.peek(2);
        let (kind, len) = match (c0, c1, c2) {
            (b'?', b'?', b'=') => (SyntaxKind::QuestionQuestionEqualsToken, 3),
            (b'<', b'<', b'=') => (SyntaxKind::LessThanLessThanEqualsToken, 3),
            (b'?', b'?', _) => (SyntaxKind::QuestionQuestionToken, 2),
            // `a?.5:b` is a conditional with a real literal, not a `?.`
            (b'?', b'.', d) if !d.is_ascii_digit() => (SyntaxKind::QuestionDotToken, 2),
            (b'.', b'.', _) => (SyntaxKind::DotDotToken, 2),
            (b':', b':', _) => (SyntaxKind::ColonColonToken, 2),
            (b'=', b'>', _) => (SyntaxKind::EqualsGreaterThanToken, 2),
            (b'=', b'=', _) => (SyntaxKind::EqualsEqualsToken, 2),
            (b'!', b'=', _) => (SyntaxKind::ExclamationEqualsToken, 2),
            (b'<', b'=', _) => (SyntaxKind::LessThanEqualsToken, 2),
            (b'<', b'<', _) => (SyntaxKind::LessThanLessThanToken, 2),
            (b'>', b'=', _) => (SyntaxKind::GreaterThanEqualsToken, 2),
            (b'-', b'>', _) => (SyntaxKind::MinusGreaterThanToken, 2),
            (b'+', b'+', _) => (SyntaxKind::PlusPlusToken, 2),
            (b'+', b'=', _) => (SyntaxKind::PlusEqualsToken, 2),
            (b'-', b'-', _) => (SyntaxKind::MinusMinusToken, 2),
            (b'-', b'=', _) => (SyntaxKind::MinusEqualsToken, 2),
            (b'*', b'=', _) => (SyntaxKind::AsteriskEqualsToken, 2),
            (b'/', b'=', _) => (SyntaxKind::SlashEqualsToken, 2),
            (b'%', b'=', _) => (SyntaxKind::PercentEqualsToken, 2),
            (b'&', b'&', _) => (SyntaxKind::AmpersandAmpersandToken, 2),
            (b'&', b'=', _) => (SyntaxKind::AmpersandEqualsToken, 2),
            (b'|', b'|', _) => (SyntaxKind::BarBarToken, 2),
            (b'|', b'=', _) => (SyntaxKind::BarEqualsToken, 2),
            (b'^', b'=', _) => (SyntaxKind::CaretEqualsToken, 2),
            (b'{', _, _) => (SyntaxKind::OpenBraceToken, 1),
            (b'}', _, _) => (SyntaxKind::CloseBraceToken, 1),
            (b'(', _, _) => (SyntaxKind::OpenParenToken, 1),
            (b')', _, _) => (SyntaxKind::CloseParenToken, 1),
            (b'[', _, _) => (SyntaxKind::OpenBracketToken, 1),
            (b']', _, _) => (SyntaxKind::CloseBracketToken, 1),
            (b'.', _, _) => (SyntaxKind::DotToken, 1),
            (b';', _, _) => (SyntaxKind::SemicolonToken, 1),
            (b',', _, _) => (SyntaxKind::CommaToken, 1),
            (b':', _, _) => (SyntaxKind::ColonToken, 1),
            (b'?', _, _) => (SyntaxKind::QuestionToken, 1),
            (b'<', _, _) => (SyntaxKind::LessThanToken, 1),
            // `>>` is two tokens; the parser joins adjacent ones for shifts so
            // nested generic argument lists close cleanly.
            (b'>', _, _) => (SyntaxKind::GreaterThanToken, 1),
            (b'=', _, _) => (SyntaxKind::EqualsToken, 1),
            (b'!', _, _) => (SyntaxKind::ExclamationToken, 1),
            (b'+', _, _) => (SyntaxKind::PlusToken, 1),
            (b'-', _, _) => (SyntaxKind::MinusToken, 1),
            (b'*', _, _) => (SyntaxKind::AsteriskToken, 1),
            (b'/', _, _) => (SyntaxKind::SlashToken, 1),
            (b'%', _, _) => (SyntaxKind::PercentToken, 1),
            (b'&', _, _) => (SyntaxKind::AmpersandToken, 1),
            (b'|', _, _) => (SyntaxKind::BarToken, 1),
            (b'^', _, _) => (SyntaxKind::CaretToken, 1),
            (b'~', _, _) => (SyntaxKind::TildeToken, 1),
            (b'#', _, _) => (SyntaxKind::HashToken, 1),
            _ => {
                let width = self.text[self.pos..]
                    .chars()
                    .next()
                    .map(char::len_utf8)
                    .unwrap_or(1);
                (SyntaxKind::Unknown, width)
            }
        };
        self.pos += len;
        kind
    }
}

#[inline]
fn is_identifier_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c >= 0x80
}
