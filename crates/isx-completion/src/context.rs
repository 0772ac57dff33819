//! Context classification.
//!
//! Decides whether the caret sits after `receiver.` or `receiver?.` (with an
//! optional partially typed member name) and, if so, what the receiver's
//! static type is. Everything else classifies as "not applicable".

use isx_binder::{ExprClass, SemanticModel};
use isx_common::{FileId, Span};
use isx_parser::{NodeIndex, NodeKind, SyntaxTree, node_flags};
use isx_scanner::{SyntaxKind, Token, TokenFlags};
use isx_solver::{TypeData, TypeId};
use tracing::trace;

/// A member-access caret position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiverContext {
    /// Static type of the expression before the dot.
    pub receiver_type: TypeId,
    /// The receiver names a type (`Console.`, `List<int>.`); terminal.
    pub is_type_name_access: bool,
    /// The operator is `?.`.
    pub is_null_conditional: bool,
    /// Member name text from its start up to the caret.
    pub typed_prefix: String,
    /// Where imports are checked and added: the caret.
    pub insertion_location: u32,
    /// Text an accepted item replaces: the whole member name being typed.
    pub replacement_span: Span,
    pub file: FileId,
}

/// Classify the caret at `offset`. Type-name receivers are not applicable.
pub fn classify_receiver(model: &SemanticModel<'_>, offset: u32) -> Option<ReceiverContext> {
    receiver_context(model, offset).filter(|context| {
        if context.is_type_name_access {
            trace!(offset, "receiver is a type name");
        }
        !context.is_type_name_access
    })
}

/// Classify the caret at `offset`, reporting type-name receivers as
/// terminal contexts instead of dropping them.
pub fn receiver_context(model: &SemanticModel<'_>, offset: u32) -> Option<ReceiverContext> {
    let tree = model.tree();
    if offset as usize > tree.text.len() {
        return None;
    }
    if tree.comment_at(offset).is_some() {
        trace!(offset, "caret in comment");
        return None;
    }
    if inside_literal(tree, offset) {
        trace!(offset, "caret in literal");
        return None;
    }

    let site = access_site(tree, offset)?;
    let access = tree.find_member_access_by_operator(site.operator.start)?;
    if let Some(excluded) = tree.ancestors(access).find(|&a| is_excluded_context(tree, a)) {
        trace!(offset, context = ?tree.kind(excluded), "member access in non-code context");
        return None;
    }

    let node = tree.node(access)?;
    let data = tree.arena.get_member_access(node)?;
    let is_null_conditional = node.has_flag(node_flags::CONDITIONAL_ACCESS)
        || data.operator == SyntaxKind::QuestionDotToken;

    let (receiver_type, is_type_name_access) = match model.classify_expression(data.expression) {
        ExprClass::Value(ty) => {
            let db = model.compilation().db();
            if matches!(
                db.lookup(ty),
                TypeData::Error | TypeData::Void | TypeData::Dynamic
            ) {
                trace!(offset, receiver = %tree.node_text(data.expression), "unusable receiver type");
                return None;
            }
            (ty, false)
        }
        ExprClass::Type(ty) => (ty, true),
        ExprClass::Namespace(namespace) => {
            trace!(offset, %namespace, "receiver is a namespace");
            return None;
        }
        ExprClass::Unknown => {
            trace!(offset, receiver = %tree.node_text(data.expression), "unresolved receiver");
            return None;
        }
    };

    Some(ReceiverContext {
        receiver_type,
        is_type_name_access,
        is_null_conditional,
        typed_prefix: site.prefix.text(&tree.text).to_string(),
        insertion_location: offset,
        replacement_span: site.name,
        file: model.file(),
    })
}

struct AccessSite {
    operator: Token,
    /// Member name typed before the caret.
    prefix: Span,
    /// Whole member name around the caret, empty when none is typed.
    name: Span,
}

fn access_site(tree: &SyntaxTree, offset: u32) -> Option<AccessSite> {
    let word = match tree.token_index_at(offset) {
        Some(index) if tree.tokens[index].start < offset => {
            if !is_word(tree.tokens[index].kind) {
                return None;
            }
            Some(index)
        }
        _ => tree
            .token_before(offset)
            .filter(|(_, token)| token.end == offset && is_word(token.kind))
            .map(|(index, _)| index),
    };

    let (operator, prefix, name) = match word {
        Some(index) => {
            let token = tree.tokens[index];
            let operator = *tree.tokens.get(index.checked_sub(1)?)?;
            (operator, Span::new(token.start, offset), token.span())
        }
        None => {
            let (_, operator) = tree.token_before(offset)?;
            // `obj.|Name` replaces the name after the caret.
            let name = tree
                .token_index_at(offset)
                .map(|index| tree.tokens[index])
                .filter(|token| token.start == offset && is_word(token.kind))
                .map_or(Span::at(offset), |token| token.span());
            (*operator, Span::at(offset), name)
        }
    };

    matches!(
        operator.kind,
        SyntaxKind::DotToken | SyntaxKind::QuestionDotToken
    )
    .then_some(AccessSite {
        operator,
        prefix,
        name,
    })
}

/// Identifiers and keywords: `obj.in` is a prefix of `Insert`.
fn is_word(kind: SyntaxKind) -> bool {
    kind.is_identifier() || kind.is_keyword()
}

fn inside_literal(tree: &SyntaxTree, offset: u32) -> bool {
    let is_literal = |kind: SyntaxKind| {
        matches!(
            kind,
            SyntaxKind::StringLiteral | SyntaxKind::CharacterLiteral | SyntaxKind::NumericLiteral
        )
    };
    if let Some(index) = tree.token_index_at(offset) {
        let token = &tree.tokens[index];
        if token.start < offset && is_literal(token.kind) {
            return true;
        }
    }
    tree.token_before(offset).is_some_and(|(_, token)| {
        token.end == offset
            && token.flags.contains(TokenFlags::UNTERMINATED)
            && token.kind != SyntaxKind::NumericLiteral
            && is_literal(token.kind)
    })
}

fn is_excluded_context(tree: &SyntaxTree, node: NodeIndex) -> bool {
    matches!(
        tree.kind(node),
        Some(NodeKind::AttributeList | NodeKind::Attribute | NodeKind::UsingDirective)
    )
}

#[cfg(test)]
#[path = "../tests/context_tests.rs"]
mod tests;
