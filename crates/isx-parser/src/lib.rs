//! Tolerant C# subset parser.
//!
//! This crate provides:
//! - `NodeArena` - Thin node headers with typed data pools
//! - `ParserState` - Recursive-descent parser over pre-scanned tokens
//! - `SyntaxTree` - A parsed file with offset and ancestor queries
//!
//! The parser covers the declaration and expression surface the completion
//! engine needs (namespaces, usings, types, members, statements, lambdas,
//! patterns). Bodies it cannot read produce diagnostics, never failures.

pub mod node;
pub use node::*;

pub mod node_arena;
pub use node_arena::NodeArena;

pub mod node_access;
pub use node_access::SyntaxTree;

pub mod state;
pub use state::{ParseDiagnostic, ParserState};

mod state_declarations;
mod state_expressions;
mod state_statements;
mod state_types;

use isx_common::LineMap;
use std::sync::Arc;
use tracing::debug;

/// Parse one C# source file.
pub fn parse_source_file(file_name: &str, text: &str) -> SyntaxTree {
    let scan = isx_scanner::scan(text);
    let mut parser = ParserState::new(text, &scan);
    let root = parser.parse_compilation_unit();
    let (mut arena, diagnostics) = parser.into_parts();
    arena.link_parents(root);

    debug!(
        file = file_name,
        nodes = arena.len(),
        diagnostics = diagnostics.len(),
        "parsed source file"
    );

    SyntaxTree {
        file_name: file_name.to_string(),
        text: Arc::from(text),
        arena,
        root,
        tokens: scan.tokens,
        comments: scan.comments,
        diagnostics,
        line_map: LineMap::build(text),
    }
}
