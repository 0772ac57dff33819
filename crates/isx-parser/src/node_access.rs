//! `SyntaxTree`: a parsed file plus token, comment and position queries.
//!
//! The completion classifier works from a caret offset, so most helpers here
//! map offsets to tokens and tokens to nodes.

use crate::node::*;
use crate::node_arena::NodeArena;
use crate::state::ParseDiagnostic;
use isx_common::{Atom, LineMap, Span};
use isx_scanner::{CommentRange, SyntaxKind, Token};
use std::sync::Arc;

/// One parsed source file.
#[derive(Debug)]
pub struct SyntaxTree {
    pub file_name: String,
    pub text: Arc<str>,
    pub arena: NodeArena,
    pub root: NodeIndex,
    pub tokens: Vec<Token>,
    pub comments: Vec<CommentRange>,
    pub diagnostics: Vec<ParseDiagnostic>,
    pub line_map: LineMap,
}

impl SyntaxTree {
    #[inline]
    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.arena.get(index)
    }

    #[inline]
    pub fn kind(&self, index: NodeIndex) -> Option<NodeKind> {
        self.arena.kind(index)
    }

    #[inline]
    pub fn parent(&self, index: NodeIndex) -> NodeIndex {
        self.arena.parent(index)
    }

    /// Source text covered by a node.
    pub fn node_text(&self, index: NodeIndex) -> &str {
        self.node(index)
            .map(|n| n.span().text(&self.text))
            .unwrap_or("")
    }

    pub fn token_text(&self, token: &Token) -> &str {
        token.span().text(&self.text)
    }

    /// Name of an `IdentifierName` or `GenericName` node.
    pub fn simple_name(&self, index: NodeIndex) -> Option<Atom> {
        let node = self.node(index)?;
        match node.kind {
            NodeKind::IdentifierName => self.arena.get_identifier(node).map(|d| d.name),
            NodeKind::GenericName => self.arena.get_generic_name(node).map(|d| d.name),
            _ => None,
        }
    }

    /// Dotted text of a name node (`System.Collections.Generic`), without
    /// type arguments.
    pub fn dotted_name(&self, index: NodeIndex) -> Option<String> {
        let node = self.node(index)?;
        match node.kind {
            NodeKind::IdentifierName | NodeKind::GenericName => {
                self.simple_name(index).map(|a| a.as_str().to_string())
            }
            NodeKind::QualifiedName => {
                let data = self.arena.get_qualified_name(node)?;
                let left = self.dotted_name(data.left)?;
                let right = self.dotted_name(data.right)?;
                Some(format!("{left}.{right}"))
            }
            // `global::System` names the same namespace as `System`.
            NodeKind::AliasQualifiedName => {
                let data = self.arena.get_qualified_name(node)?;
                self.dotted_name(data.right)
            }
            _ => None,
        }
    }

    /// Ancestors of a node, nearest first, not including the node itself.
    pub fn ancestors(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        let mut current = self.parent(index);
        std::iter::from_fn(move || {
            if current.is_none() {
                return None;
            }
            let result = current;
            current = self.parent(current);
            Some(result)
        })
    }

    // =========================================================================
    // Offset queries
    // =========================================================================

    /// Index of the token whose span contains `offset` (start inclusive,
    /// end exclusive).
    pub fn token_index_at(&self, offset: u32) -> Option<usize> {
        let idx = self.tokens.partition_point(|t| t.end <= offset);
        self.tokens
            .get(idx)
            .filter(|t| t.start <= offset && offset < t.end)
            .map(|_| idx)
    }

    /// Last token that ends at or before `offset`.
    pub fn token_before(&self, offset: u32) -> Option<(usize, &Token)> {
        let idx = self.tokens.partition_point(|t| t.end <= offset);
        let idx = idx.checked_sub(1)?;
        self.tokens
            .get(idx)
            .filter(|t| t.kind != SyntaxKind::EndOfFileToken)
            .map(|t| (idx, t))
    }

    /// Comment or preprocessor line containing the caret, if any.
    pub fn comment_at(&self, offset: u32) -> Option<&CommentRange> {
        self.comments.iter().find(|c| c.contains_caret(offset))
    }

    /// The `MemberAccess` node whose operator token starts at `operator_pos`.
    pub fn find_member_access_by_operator(&self, operator_pos: u32) -> Option<NodeIndex> {
        self.arena
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.kind == NodeKind::MemberAccess && n.pos <= operator_pos)
            .find_map(|(i, n)| {
                let index = NodeIndex(i as u32);
                let data = self.arena.get_member_access(n)?;
                // Reachable from the root only; speculation leftovers have no parent.
                (data.operator_pos == operator_pos && self.parent(index).is_some())
                    .then_some(index)
            })
    }

    /// Smallest node reachable from the root whose span contains `offset`.
    pub fn innermost_node_at(&self, offset: u32) -> NodeIndex {
        let mut current = self.root;
        'descend: loop {
            for child in self.arena.children(current) {
                if self
                    .node(child)
                    .is_some_and(|n| n.pos <= offset && offset <= n.end && n.pos < n.end)
                {
                    current = child;
                    continue 'descend;
                }
            }
            return current;
        }
    }

    /// Span of a node, or an empty span at 0 for `NONE`.
    pub fn span(&self, index: NodeIndex) -> Span {
        self.node(index).map(|n| n.span()).unwrap_or_default()
    }
}
