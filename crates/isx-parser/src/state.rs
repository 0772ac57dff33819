//! Parser state: token cursor, speculation and diagnostics.
//!
//! The parser is a tolerant recursive-descent parser over a pre-scanned token
//! vector. It never fails: malformed input produces missing children
//! (`NodeIndex::NONE`) and a diagnostic, and parsing resumes at the next token
//! that can start a statement or member.

use crate::node::*;
use crate::node_arena::NodeArena;
use isx_common::{Atom, Span, limits};
use isx_scanner::{ScanResult, SyntaxKind, Token, TokenFlags};

/// A syntax error found while parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub span: Span,
    pub message: String,
}

/// Saved parser position for speculative parsing.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Checkpoint {
    pos: usize,
    arena_len: usize,
    diagnostics_len: usize,
}

pub struct ParserState<'a> {
    pub(crate) text: &'a str,
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    pub(crate) arena: NodeArena,
    pub(crate) diagnostics: Vec<ParseDiagnostic>,
    pub(crate) depth: u32,
}

impl<'a> ParserState<'a> {
    pub fn new(text: &'a str, scan: &ScanResult) -> Self {
        ParserState {
            text,
            tokens: scan.tokens.clone(),
            pos: 0,
            arena: NodeArena::new(),
            diagnostics: Vec::new(),
            depth: 0,
        }
    }

    pub(crate) fn into_parts(self) -> (NodeArena, Vec<ParseDiagnostic>) {
        (self.arena, self.diagnostics)
    }

    // =========================================================================
    // Token cursor
    // =========================================================================

    #[inline]
    pub(crate) fn current(&self) -> Token {
        self.peek_token(0)
    }

    #[inline]
    pub(crate) fn peek_token(&self, n: usize) -> Token {
        let idx = (self.pos + n).min(self.tokens.len().saturating_sub(1));
        self.tokens.get(idx).copied().unwrap_or(Token {
            kind: SyntaxKind::EndOfFileToken,
            start: self.text.len() as u32,
            end: self.text.len() as u32,
            flags: TokenFlags::empty(),
        })
    }

    #[inline]
    pub(crate) fn token(&self) -> SyntaxKind {
        self.current().kind
    }

    #[inline]
    pub(crate) fn peek(&self, n: usize) -> SyntaxKind {
        self.peek_token(n).kind
    }

    #[inline]
    pub(crate) fn is_token(&self, kind: SyntaxKind) -> bool {
        self.token() == kind
    }

    #[inline]
    pub(crate) fn at_eof(&self) -> bool {
        self.is_token(SyntaxKind::EndOfFileToken)
    }

    /// Start of the current token.
    #[inline]
    pub(crate) fn token_pos(&self) -> u32 {
        self.current().start
    }

    /// End of the most recently consumed token.
    #[inline]
    pub(crate) fn prev_end(&self) -> u32 {
        if self.pos == 0 {
            0
        } else {
            self.tokens
                .get(self.pos - 1)
                .map(|t| t.end)
                .unwrap_or_else(|| self.token_pos())
        }
    }

    #[inline]
    pub(crate) fn next_token(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    pub(crate) fn parse_optional(&mut self, kind: SyntaxKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    pub(crate) fn parse_expected(&mut self, kind: SyntaxKind) -> bool {
        if self.parse_optional(kind) {
            return true;
        }
        self.error_at_current(&format!("{kind:?} expected"));
        false
    }

    /// Text of a token; `@` is stripped from verbatim identifiers.
    pub(crate) fn text_of(&self, token: Token) -> &'a str {
        let text = self
            .text
            .get(token.start as usize..token.end as usize)
            .unwrap_or("");
        if token.kind == SyntaxKind::Identifier && token.flags.contains(TokenFlags::VERBATIM) {
            text.strip_prefix('@').unwrap_or(text)
        } else {
            text
        }
    }

    #[inline]
    pub(crate) fn token_text(&self) -> &'a str {
        self.text_of(self.current())
    }

    /// Current token is the identifier `text` (contextual keyword check).
    #[inline]
    pub(crate) fn is_contextual(&self, text: &str) -> bool {
        self.is_token(SyntaxKind::Identifier)
            && !self.current().flags.contains(TokenFlags::VERBATIM)
            && self.token_text() == text
    }

    pub(crate) fn is_contextual_at(&self, n: usize, text: &str) -> bool {
        let token = self.peek_token(n);
        token.kind == SyntaxKind::Identifier
            && !token.flags.contains(TokenFlags::VERBATIM)
            && self.text_of(token) == text
    }

    /// Two tokens are directly adjacent (`>>` written without a space).
    pub(crate) fn adjacent(&self, n: usize) -> bool {
        self.peek_token(n).end == self.peek_token(n + 1).start
    }

    /// At a `.`: the name after it sits on the next line and is followed by
    /// another identifier, as in `list.` followed by `var x = 1;`. The dotted
    /// name ends at the dot.
    pub(crate) fn dot_name_starts_declaration(&self) -> bool {
        self.peek_token(1).has_preceding_line_break() && self.peek(2) == SyntaxKind::Identifier
    }

    /// Consume an identifier and return its atom, or `Atom::NONE` with a diagnostic.
    pub(crate) fn parse_identifier(&mut self) -> Atom {
        if self.is_token(SyntaxKind::Identifier) {
            let atom = Atom::intern(self.token_text());
            self.next_token();
            atom
        } else {
            self.error_at_current("Identifier expected");
            Atom::NONE
        }
    }

    // =========================================================================
    // Speculation
    // =========================================================================

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            arena_len: self.arena.len(),
            diagnostics_len: self.diagnostics.len(),
        }
    }

    pub(crate) fn rewind(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.arena.truncate(checkpoint.arena_len);
        self.diagnostics.truncate(checkpoint.diagnostics_len);
    }

    /// Run `f`; if it returns `None`, restore the state as it was before.
    pub(crate) fn speculate<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let checkpoint = self.checkpoint();
        let result = f(self);
        if result.is_none() {
            self.rewind(checkpoint);
        }
        result
    }

    /// Run `f` and always restore the state; returns what `f` observed.
    pub(crate) fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let checkpoint = self.checkpoint();
        let result = f(self);
        self.rewind(checkpoint);
        result
    }

    // =========================================================================
    // Depth guard
    // =========================================================================

    pub(crate) fn enter(&mut self) -> bool {
        if self.depth >= limits::MAX_PARSE_DEPTH {
            self.error_at_current("Syntax nesting too deep");
            return false;
        }
        self.depth += 1;
        true
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub(crate) fn error_at_current(&mut self, message: &str) {
        let span = self.current().span();
        // One diagnostic per position keeps recovery loops from flooding.
        if self.diagnostics.last().is_some_and(|d| d.span.start == span.start) {
            return;
        }
        self.diagnostics.push(ParseDiagnostic {
            span,
            message: message.to_string(),
        });
    }

    /// Skip tokens until one that can start a member or statement, or a
    /// closing brace. Always consumes at least one token unless at EOF.
    pub(crate) fn skip_to_recovery_point(&mut self) {
        self.next_token();
        while !self.at_eof() {
            match self.token() {
                SyntaxKind::SemicolonToken => {
                    self.next_token();
                    return;
                }
                SyntaxKind::CloseBraceToken | SyntaxKind::OpenBraceToken => return,
                k if k.is_modifier() => return,
                SyntaxKind::ClassKeyword
                | SyntaxKind::StructKeyword
                | SyntaxKind::InterfaceKeyword
                | SyntaxKind::EnumKeyword
                | SyntaxKind::NamespaceKeyword
                | SyntaxKind::UsingKeyword => return,
                _ => self.next_token(),
            }
        }
    }

    // =========================================================================
    // Shared node builders
    // =========================================================================

    pub(crate) fn add_identifier_name(&mut self, name: Atom, pos: u32, end: u32) -> NodeIndex {
        self.arena
            .add_identifier(NodeKind::IdentifierName, pos, end, IdentifierData { name })
    }
}
