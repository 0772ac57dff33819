//! Parser state - expression, pattern and argument parsing methods

use crate::node::*;
use crate::state::ParserState;
use crate::state_types::TypeContext;
use isx_common::{Atom, Span};
use isx_scanner::SyntaxKind;

/// Binary operator precedence, lowest first. `??`, `?:` and assignment are
/// handled above this table.
fn binary_precedence(kind: SyntaxKind) -> Option<u8> {
    Some(match kind {
        SyntaxKind::BarBarToken => 1,
        SyntaxKind::AmpersandAmpersandToken => 2,
        SyntaxKind::BarToken => 3,
        SyntaxKind::CaretToken => 4,
        SyntaxKind::AmpersandToken => 5,
        SyntaxKind::EqualsEqualsToken | SyntaxKind::ExclamationEqualsToken => 6,
        SyntaxKind::LessThanToken
        | SyntaxKind::GreaterThanToken
        | SyntaxKind::LessThanEqualsToken
        | SyntaxKind::GreaterThanEqualsToken
        | SyntaxKind::IsKeyword
        | SyntaxKind::AsKeyword => 7,
        SyntaxKind::LessThanLessThanToken => 8,
        SyntaxKind::PlusToken | SyntaxKind::MinusToken => 9,
        SyntaxKind::AsteriskToken | SyntaxKind::SlashToken | SyntaxKind::PercentToken => 10,
        _ => return None,
    })
}

const SHIFT_PRECEDENCE: u8 = 8;

impl<'a> ParserState<'a> {
    // =========================================================================
    // Parse Methods - Expressions
    // =========================================================================

    /// Assignment-level expression, including lambdas and `throw`.
    pub(crate) fn parse_expression(&mut self) -> NodeIndex {
        if !self.enter() {
            return NodeIndex::NONE;
        }
        let result = self.parse_expression_inner();
        self.leave();
        result
    }

    fn parse_expression_inner(&mut self) -> NodeIndex {
        let start = self.token_pos();

        if self.is_token(SyntaxKind::ThrowKeyword) {
            self.next_token();
            let operand = self.parse_expression();
            return self.arena.add_unary(
                NodeKind::ThrowExpression,
                start,
                self.prev_end(),
                UnaryData {
                    operator: SyntaxKind::ThrowKeyword,
                    operand,
                },
            );
        }

        if self.is_lambda_start() {
            return self.parse_lambda();
        }

        let left = self.parse_conditional_expression();
        if left.is_none() {
            return left;
        }

        let operator = if self.token().is_assignment_operator() {
            let op = self.token();
            self.next_token();
            Some(op)
        } else if self.is_token(SyntaxKind::GreaterThanToken)
            && self.peek(1) == SyntaxKind::GreaterThanEqualsToken
            && self.adjacent(0)
        {
            // `>>=`
            self.next_token();
            self.next_token();
            Some(SyntaxKind::GreaterThanEqualsToken)
        } else {
            None
        };

        match operator {
            Some(operator) => {
                let right = if operator == SyntaxKind::EqualsToken
                    && self.is_token(SyntaxKind::RefKeyword)
                {
                    self.parse_unary_expression()
                } else {
                    self.parse_expression()
                };
                self.arena.add_binary(
                    NodeKind::AssignmentExpression,
                    start,
                    self.prev_end(),
                    BinaryData {
                        left,
                        operator,
                        right,
                    },
                )
            }
            None => left,
        }
    }

    /// `c ? a : b`
    fn parse_conditional_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let condition = self.parse_coalesce_expression();
        if condition.is_none() || !self.is_token(SyntaxKind::QuestionToken) {
            return condition;
        }
        self.next_token();
        let when_true = self.parse_expression();
        self.parse_expected(SyntaxKind::ColonToken);
        let when_false = self.parse_expression();
        self.arena.add_conditional(
            NodeKind::ConditionalExpression,
            start,
            self.prev_end(),
            ConditionalData {
                condition,
                when_true,
                when_false,
            },
        )
    }

    /// `a ?? b` (right associative)
    fn parse_coalesce_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let left = self.parse_binary_expression(1);
        if left.is_none() || !self.is_token(SyntaxKind::QuestionQuestionToken) {
            return left;
        }
        self.next_token();
        let right = self.parse_coalesce_expression();
        self.arena.add_binary(
            NodeKind::BinaryExpression,
            start,
            self.prev_end(),
            BinaryData {
                left,
                operator: SyntaxKind::QuestionQuestionToken,
                right,
            },
        )
    }

    /// Precedence climbing over `binary_precedence`.
    fn parse_binary_expression(&mut self, min_precedence: u8) -> NodeIndex {
        let start = self.token_pos();
        let mut left = self.parse_range_expression();
        if left.is_none() {
            return left;
        }

        loop {
            let mut operator = self.token();
            // `>>` arrives as two adjacent `>` tokens.
            let is_shift_right = operator == SyntaxKind::GreaterThanToken
                && self.peek(1) == SyntaxKind::GreaterThanToken
                && self.adjacent(0);
            if operator == SyntaxKind::GreaterThanToken
                && self.peek(1) == SyntaxKind::GreaterThanEqualsToken
                && self.adjacent(0)
            {
                // `>>=` belongs to the assignment level.
                break;
            }
            let precedence = if is_shift_right {
                SHIFT_PRECEDENCE
            } else {
                match binary_precedence(operator) {
                    Some(p) => p,
                    None => break,
                }
            };
            if precedence < min_precedence {
                break;
            }
            self.next_token();
            if is_shift_right {
                self.next_token();
                operator = SyntaxKind::LessThanLessThanToken;
            }

            left = match operator {
                SyntaxKind::IsKeyword => {
                    let pattern = self.parse_pattern();
                    let kind = if self
                        .arena
                        .kind(pattern)
                        .is_some_and(|k| k.is_type_syntax())
                    {
                        NodeKind::IsExpression
                    } else {
                        NodeKind::IsPatternExpression
                    };
                    self.arena.add_binary(
                        kind,
                        start,
                        self.prev_end(),
                        BinaryData {
                            left,
                            operator,
                            right: pattern,
                        },
                    )
                }
                SyntaxKind::AsKeyword => {
                    let right = self.try_parse_type(TypeContext::Expression);
                    if right.is_none() {
                        self.error_at_current("Type expected");
                    }
                    self.arena.add_binary(
                        NodeKind::AsExpression,
                        start,
                        self.prev_end(),
                        BinaryData {
                            left,
                            operator,
                            right,
                        },
                    )
                }
                _ => {
                    let right = self.parse_binary_expression(precedence + 1);
                    if right.is_none() {
                        self.error_at_current("Expression expected");
                    }
                    // Shift-right is stored with the left-shift token and the
                    // node's source text tells them apart.
                    self.arena.add_binary(
                        NodeKind::BinaryExpression,
                        start,
                        self.prev_end(),
                        BinaryData {
                            left,
                            operator,
                            right,
                        },
                    )
                }
            };
        }
        left
    }

    /// `a..b`, and `e switch { ... }` postfix.
    fn parse_range_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut left = if self.is_token(SyntaxKind::DotDotToken) {
            NodeIndex::NONE
        } else {
            self.parse_unary_expression()
        };

        if self.is_token(SyntaxKind::DotDotToken) {
            self.next_token();
            let right = if self.can_start_expression() {
                self.parse_unary_expression()
            } else {
                NodeIndex::NONE
            };
            left = self.arena.add_binary(
                NodeKind::BinaryExpression,
                start,
                self.prev_end(),
                BinaryData {
                    left,
                    operator: SyntaxKind::DotDotToken,
                    right,
                },
            );
        }

        while left.is_some()
            && self.is_token(SyntaxKind::SwitchKeyword)
            && self.peek(1) == SyntaxKind::OpenBraceToken
        {
            left = self.parse_switch_expression(start, left);
        }
        left
    }

    // =========================================================================
    // Unary expressions
    // =========================================================================

    pub(crate) fn parse_unary_expression(&mut self) -> NodeIndex {
        if !self.enter() {
            return NodeIndex::NONE;
        }
        let result = self.parse_unary_inner();
        self.leave();
        result
    }

    fn parse_unary_inner(&mut self) -> NodeIndex {
        let start = self.token_pos();
        match self.token() {
            SyntaxKind::PlusToken
            | SyntaxKind::MinusToken
            | SyntaxKind::ExclamationToken
            | SyntaxKind::TildeToken
            | SyntaxKind::PlusPlusToken
            | SyntaxKind::MinusMinusToken
            | SyntaxKind::AmpersandToken
            | SyntaxKind::AsteriskToken
            | SyntaxKind::CaretToken => {
                let operator = self.token();
                self.next_token();
                let operand = self.parse_unary_expression();
                self.arena.add_unary(
                    NodeKind::PrefixUnary,
                    start,
                    self.prev_end(),
                    UnaryData { operator, operand },
                )
            }
            SyntaxKind::RefKeyword => {
                self.next_token();
                let operand = self.parse_unary_expression();
                self.arena.add_unary(
                    NodeKind::RefExpression,
                    start,
                    self.prev_end(),
                    UnaryData {
                        operator: SyntaxKind::RefKeyword,
                        operand,
                    },
                )
            }
            SyntaxKind::Identifier if self.is_await_expression() => {
                self.next_token();
                let operand = self.parse_unary_expression();
                self.arena.add_unary(
                    NodeKind::AwaitExpression,
                    start,
                    self.prev_end(),
                    UnaryData {
                        operator: SyntaxKind::Identifier,
                        operand,
                    },
                )
            }
            SyntaxKind::OpenParenToken => match self.try_parse_cast_expression() {
                Some(cast) => cast,
                None => self.parse_postfix_expression(),
            },
            _ => self.parse_postfix_expression(),
        }
    }

    fn is_await_expression(&self) -> bool {
        self.is_contextual("await")
            && matches!(
                self.peek(1),
                SyntaxKind::Identifier
                    | SyntaxKind::OpenParenToken
                    | SyntaxKind::ThisKeyword
                    | SyntaxKind::BaseKeyword
                    | SyntaxKind::NewKeyword
                    | SyntaxKind::TypeOfKeyword
                    | SyntaxKind::DefaultKeyword
                    | SyntaxKind::NumericLiteral
                    | SyntaxKind::StringLiteral
                    | SyntaxKind::NullKeyword
            )
    }

    /// `(T)x`. A parenthesized type is a cast when the next token can only
    /// start an operand; for predefined types any operand start will do.
    fn try_parse_cast_expression(&mut self) -> Option<NodeIndex> {
        self.speculate(|p| {
            let start = p.token_pos();
            p.next_token();
            let type_node = p.try_parse_type(TypeContext::Declaration);
            if type_node.is_none() || !p.parse_optional(SyntaxKind::CloseParenToken) {
                return None;
            }
            let next = p.token();
            let is_cast = if p.is_predefined_type_syntax(type_node) {
                p.can_start_expression()
            } else {
                matches!(
                    next,
                    SyntaxKind::TildeToken
                        | SyntaxKind::ExclamationToken
                        | SyntaxKind::OpenParenToken
                        | SyntaxKind::Identifier
                ) || next.is_literal()
                    || (next.is_keyword()
                        && !matches!(
                            next,
                            SyntaxKind::AsKeyword | SyntaxKind::IsKeyword | SyntaxKind::SwitchKeyword
                        ))
            };
            if !is_cast {
                return None;
            }
            let expression = p.parse_unary_expression();
            if expression.is_none() {
                return None;
            }
            Some(p.arena.add_type_operand(
                NodeKind::CastExpression,
                start,
                p.prev_end(),
                TypeOperandData {
                    type_node,
                    expression,
                },
            ))
        })
    }

    /// Predefined type, possibly wrapped in `?`/`[]`.
    fn is_predefined_type_syntax(&self, mut node: NodeIndex) -> bool {
        loop {
            let Some(n) = self.arena.get(node) else {
                return false;
            };
            match n.kind {
                NodeKind::PredefinedType => return true,
                NodeKind::NullableType | NodeKind::ArrayType | NodeKind::PointerType => {
                    match self.arena.get_wrapped_type(n) {
                        Some(w) => node = w.element,
                        None => return false,
                    }
                }
                _ => return false,
            }
        }
    }

    pub(crate) fn can_start_expression(&self) -> bool {
        let kind = self.token();
        kind.is_literal()
            || kind.is_predefined_type()
            || matches!(
                kind,
                SyntaxKind::Identifier
                    | SyntaxKind::OpenParenToken
                    | SyntaxKind::OpenBracketToken
                    | SyntaxKind::PlusToken
                    | SyntaxKind::MinusToken
                    | SyntaxKind::ExclamationToken
                    | SyntaxKind::TildeToken
                    | SyntaxKind::PlusPlusToken
                    | SyntaxKind::MinusMinusToken
                    | SyntaxKind::AmpersandToken
                    | SyntaxKind::AsteriskToken
                    | SyntaxKind::CaretToken
                    | SyntaxKind::DotDotToken
                    | SyntaxKind::ThisKeyword
                    | SyntaxKind::BaseKeyword
                    | SyntaxKind::NewKeyword
                    | SyntaxKind::TypeOfKeyword
                    | SyntaxKind::SizeOfKeyword
                    | SyntaxKind::DefaultKeyword
                    | SyntaxKind::CheckedKeyword
                    | SyntaxKind::UncheckedKeyword
                    | SyntaxKind::DelegateKeyword
                    | SyntaxKind::StackAllocKeyword
                    | SyntaxKind::ThrowKeyword
                    | SyntaxKind::RefKeyword
            )
    }

    // =========================================================================
    // Postfix and primary expressions
    // =========================================================================

    fn parse_postfix_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut expression = self.parse_primary_expression();
        if expression.is_none() {
            return expression;
        }

        loop {
            match self.token() {
                SyntaxKind::DotToken
                | SyntaxKind::QuestionDotToken
                | SyntaxKind::MinusGreaterThanToken => {
                    let (access, missing) = self.parse_member_access(start, expression);
                    expression = access;
                    if missing {
                        break;
                    }
                }
                SyntaxKind::OpenParenToken => {
                    let (arguments, argument_span) = self.parse_argument_list();
                    expression = self.arena.add_invocation(
                        NodeKind::Invocation,
                        start,
                        self.prev_end(),
                        InvocationData {
                            expression,
                            arguments,
                            argument_span,
                        },
                    );
                }
                SyntaxKind::OpenBracketToken => {
                    let (arguments, argument_span) = self.parse_bracketed_argument_list();
                    expression = self.arena.add_invocation(
                        NodeKind::ElementAccess,
                        start,
                        self.prev_end(),
                        InvocationData {
                            expression,
                            arguments,
                            argument_span,
                        },
                    );
                }
                SyntaxKind::QuestionToken if self.is_conditional_element_access() => {
                    self.next_token();
                    let (arguments, argument_span) = self.parse_bracketed_argument_list();
                    expression = self.arena.add_invocation(
                        NodeKind::ElementAccess,
                        start,
                        self.prev_end(),
                        InvocationData {
                            expression,
                            arguments,
                            argument_span,
                        },
                    );
                    self.arena
                        .set_flag(expression, node_flags::CONDITIONAL_ACCESS);
                }
                SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken => {
                    let operator = self.token();
                    self.next_token();
                    expression = self.arena.add_unary(
                        NodeKind::PostfixUnary,
                        start,
                        self.prev_end(),
                        UnaryData {
                            operator,
                            operand: expression,
                        },
                    );
                }
                SyntaxKind::ExclamationToken if self.is_null_forgiving() => {
                    self.next_token();
                    expression = self.arena.add_unary(
                        NodeKind::PostfixUnary,
                        start,
                        self.prev_end(),
                        UnaryData {
                            operator: SyntaxKind::ExclamationToken,
                            operand: expression,
                        },
                    );
                }
                _ => break,
            }
        }
        expression
    }

    /// `.Name`, `?.Name` or `->Name`. Returns the node and whether the name
    /// was missing (`list.` at the end of a statement).
    fn parse_member_access(&mut self, start: u32, expression: NodeIndex) -> (NodeIndex, bool) {
        let operator_token = self.current();
        self.next_token();

        let has_name = self.is_token(SyntaxKind::Identifier)
            && !(self.current().has_preceding_line_break()
                && self.peek(1) == SyntaxKind::Identifier);
        let name = if has_name {
            self.parse_simple_name(false)
        } else {
            NodeIndex::NONE
        };

        let access = self.arena.add_member_access(
            NodeKind::MemberAccess,
            start,
            self.prev_end(),
            MemberAccessData {
                expression,
                name,
                operator: operator_token.kind,
                operator_pos: operator_token.start,
            },
        );
        if operator_token.kind == SyntaxKind::QuestionDotToken {
            self.arena.set_flag(access, node_flags::CONDITIONAL_ACCESS);
        }
        if name.is_none() {
            self.arena.set_flag(access, node_flags::MISSING_NAME);
            self.error_at_current("Identifier expected");
        }
        (access, name.is_none())
    }

    /// `a?[i]`, as opposed to `c ? [1] : [2]`.
    fn is_conditional_element_access(&mut self) -> bool {
        if self.peek(1) != SyntaxKind::OpenBracketToken || !self.adjacent(0) {
            return false;
        }
        self.look_ahead(|p| {
            p.next_token();
            p.parse_bracketed_argument_list();
            !p.is_token(SyntaxKind::ColonToken)
        })
    }

    fn is_null_forgiving(&self) -> bool {
        matches!(
            self.peek(1),
            SyntaxKind::DotToken
                | SyntaxKind::QuestionDotToken
                | SyntaxKind::OpenBracketToken
                | SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken
                | SyntaxKind::CloseBraceToken
                | SyntaxKind::SemicolonToken
                | SyntaxKind::CommaToken
                | SyntaxKind::QuestionQuestionToken
                | SyntaxKind::EqualsToken
                | SyntaxKind::EndOfFileToken
        )
    }

    fn parse_primary_expression(&mut self) -> NodeIndex {
        let token = self.current();
        let start = token.start;
        match token.kind {
            k if k.is_literal() => {
                self.next_token();
                self.arena.add_token(
                    NodeKind::Literal,
                    start,
                    token.end,
                    TokenData {
                        token: k,
                        flags: token.flags,
                    },
                )
            }
            k if k.is_predefined_type() => {
                self.next_token();
                self.arena.add_token(
                    NodeKind::PredefinedType,
                    start,
                    token.end,
                    TokenData {
                        token: k,
                        flags: token.flags,
                    },
                )
            }
            SyntaxKind::Identifier => {
                let name = self.parse_simple_name(false);
                if self.is_token(SyntaxKind::ColonColonToken) {
                    self.next_token();
                    let right = self.parse_simple_name(false);
                    return self.arena.add_qualified_name(
                        NodeKind::AliasQualifiedName,
                        start,
                        self.prev_end(),
                        QualifiedNameData { left: name, right },
                    );
                }
                name
            }
            SyntaxKind::ThisKeyword => {
                self.next_token();
                self.arena
                    .add_leaf(NodeKind::ThisExpression, start, token.end)
            }
            SyntaxKind::BaseKeyword => {
                self.next_token();
                self.arena
                    .add_leaf(NodeKind::BaseExpression, start, token.end)
            }
            SyntaxKind::OpenParenToken => self.parse_parenthesized_or_tuple(),
            SyntaxKind::OpenBracketToken => self.parse_collection_expression(),
            SyntaxKind::NewKeyword => self.parse_creation_expression(),
            SyntaxKind::StackAllocKeyword => {
                self.next_token();
                let type_node = self.try_parse_type(TypeContext::Declaration);
                let arguments = if self.is_token(SyntaxKind::OpenBracketToken) {
                    self.parse_bracketed_argument_list().0
                } else {
                    Vec::new()
                };
                let initializer = if self.is_token(SyntaxKind::OpenBraceToken) {
                    self.parse_initializer_expression()
                } else {
                    NodeIndex::NONE
                };
                self.arena.add_creation(
                    NodeKind::StackAllocCreation,
                    start,
                    self.prev_end(),
                    CreationData {
                        type_node,
                        arguments,
                        initializer,
                    },
                )
            }
            SyntaxKind::TypeOfKeyword | SyntaxKind::SizeOfKeyword => {
                let kind = if token.kind == SyntaxKind::TypeOfKeyword {
                    NodeKind::TypeOfExpression
                } else {
                    NodeKind::SizeOfExpression
                };
                self.next_token();
                self.parse_expected(SyntaxKind::OpenParenToken);
                let type_node = self.parse_type();
                self.parse_expected(SyntaxKind::CloseParenToken);
                self.arena.add_type_operand(
                    kind,
                    start,
                    self.prev_end(),
                    TypeOperandData {
                        type_node,
                        expression: NodeIndex::NONE,
                    },
                )
            }
            SyntaxKind::DefaultKeyword => {
                self.next_token();
                let type_node = if self.parse_optional(SyntaxKind::OpenParenToken) {
                    let ty = self.parse_type();
                    self.parse_expected(SyntaxKind::CloseParenToken);
                    ty
                } else {
                    NodeIndex::NONE
                };
                self.arena.add_type_operand(
                    NodeKind::DefaultExpression,
                    start,
                    self.prev_end(),
                    TypeOperandData {
                        type_node,
                        expression: NodeIndex::NONE,
                    },
                )
            }
            SyntaxKind::CheckedKeyword | SyntaxKind::UncheckedKeyword => {
                self.next_token();
                self.parse_expected(SyntaxKind::OpenParenToken);
                let operand = self.parse_expression();
                self.parse_expected(SyntaxKind::CloseParenToken);
                self.arena.add_unary(
                    NodeKind::CheckedExpression,
                    start,
                    self.prev_end(),
                    UnaryData {
                        operator: token.kind,
                        operand,
                    },
                )
            }
            SyntaxKind::DelegateKeyword => self.parse_anonymous_method(),
            _ => NodeIndex::NONE,
        }
    }

    /// `(e)` or `(a, b)`; tuple elements may be named (`(x: 1, y: 2)`).
    fn parse_parenthesized_or_tuple(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.next_token();
        let first = self.parse_argument();
        if !self.is_token(SyntaxKind::CommaToken) {
            self.parse_expected(SyntaxKind::CloseParenToken);
            let operand = self
                .arena
                .get(first)
                .and_then(|n| self.arena.get_argument(n))
                .map(|a| a.expression)
                .unwrap_or(NodeIndex::NONE);
            return self.arena.add_unary(
                NodeKind::ParenthesizedExpression,
                start,
                self.prev_end(),
                UnaryData {
                    operator: SyntaxKind::OpenParenToken,
                    operand,
                },
            );
        }
        let mut items = vec![first];
        while self.parse_optional(SyntaxKind::CommaToken) {
            items.push(self.parse_argument());
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        self.arena.add_list(
            NodeKind::TupleExpression,
            start,
            self.prev_end(),
            ListData { items },
        )
    }

    /// `[1, 2, ..rest]`
    fn parse_collection_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.next_token();
        let mut items = Vec::new();
        while !matches!(
            self.token(),
            SyntaxKind::CloseBracketToken | SyntaxKind::EndOfFileToken
        ) {
            let item = self.parse_expression();
            if item.is_none() {
                break;
            }
            items.push(item);
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBracketToken);
        self.arena.add_list(
            NodeKind::CollectionExpression,
            start,
            self.prev_end(),
            ListData { items },
        )
    }

    // =========================================================================
    // Object and array creation
    // =========================================================================

    fn parse_creation_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.next_token();

        match self.token() {
            // new[] { 1, 2 }
            SyntaxKind::OpenBracketToken => {
                self.next_token();
                while self.parse_optional(SyntaxKind::CommaToken) {}
                self.parse_expected(SyntaxKind::CloseBracketToken);
                let initializer = self.parse_initializer_expression();
                self.arena.add_creation(
                    NodeKind::ImplicitArrayCreation,
                    start,
                    self.prev_end(),
                    CreationData {
                        initializer,
                        ..CreationData::default()
                    },
                )
            }
            // new(args) { ... }
            SyntaxKind::OpenParenToken => {
                let (arguments, _) = self.parse_argument_list();
                let initializer = if self.is_token(SyntaxKind::OpenBraceToken) {
                    self.parse_initializer_expression()
                } else {
                    NodeIndex::NONE
                };
                self.arena.add_creation(
                    NodeKind::ImplicitObjectCreation,
                    start,
                    self.prev_end(),
                    CreationData {
                        type_node: NodeIndex::NONE,
                        arguments,
                        initializer,
                    },
                )
            }
            // new { A = 1, b.C }
            SyntaxKind::OpenBraceToken => {
                let initializer = self.parse_initializer_expression();
                let items = self
                    .arena
                    .get(initializer)
                    .and_then(|n| self.arena.get_list(n))
                    .map(|l| l.items.clone())
                    .unwrap_or_default();
                self.arena.add_list(
                    NodeKind::AnonymousObjectCreation,
                    start,
                    self.prev_end(),
                    ListData { items },
                )
            }
            _ => {
                let type_node = self.try_parse_type(TypeContext::Declaration);
                if type_node.is_none() {
                    self.error_at_current("Type expected");
                    return self.arena.add_creation(
                        NodeKind::ObjectCreation,
                        start,
                        self.prev_end(),
                        CreationData::default(),
                    );
                }

                let is_array_type = self.arena.kind(type_node) == Some(NodeKind::ArrayType);
                if is_array_type || self.is_token(SyntaxKind::OpenBracketToken) {
                    let arguments = if self.is_token(SyntaxKind::OpenBracketToken) {
                        self.parse_bracketed_argument_list().0
                    } else {
                        Vec::new()
                    };
                    // Trailing rank specifiers of jagged arrays: new int[3][]
                    while self.is_token(SyntaxKind::OpenBracketToken)
                        && matches!(
                            self.peek(1),
                            SyntaxKind::CloseBracketToken | SyntaxKind::CommaToken
                        )
                    {
                        self.next_token();
                        while self.parse_optional(SyntaxKind::CommaToken) {}
                        self.parse_expected(SyntaxKind::CloseBracketToken);
                    }
                    let initializer = if self.is_token(SyntaxKind::OpenBraceToken) {
                        self.parse_initializer_expression()
                    } else {
                        NodeIndex::NONE
                    };
                    return self.arena.add_creation(
                        NodeKind::ArrayCreation,
                        start,
                        self.prev_end(),
                        CreationData {
                            type_node,
                            arguments,
                            initializer,
                        },
                    );
                }

                let arguments = if self.is_token(SyntaxKind::OpenParenToken) {
                    self.parse_argument_list().0
                } else {
                    Vec::new()
                };
                let initializer = if self.is_token(SyntaxKind::OpenBraceToken) {
                    self.parse_initializer_expression()
                } else {
                    NodeIndex::NONE
                };
                self.arena.add_creation(
                    NodeKind::ObjectCreation,
                    start,
                    self.prev_end(),
                    CreationData {
                        type_node,
                        arguments,
                        initializer,
                    },
                )
            }
        }
    }

    /// `{ a, B = 1, [0] = 2, { k, v } }`
    pub(crate) fn parse_initializer_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut items = Vec::new();
        if !self.parse_expected(SyntaxKind::OpenBraceToken) {
            return NodeIndex::NONE;
        }
        while !matches!(
            self.token(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            let item = self.parse_variable_initializer();
            if item.is_none() {
                self.error_at_current("Expression expected");
                break;
            }
            items.push(item);
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena.add_list(
            NodeKind::InitializerExpression,
            start,
            self.prev_end(),
            ListData { items },
        )
    }

    // =========================================================================
    // Arguments
    // =========================================================================

    /// `(a, name: b, out var c)`. Returns the arguments and the span of the
    /// whole list including parentheses.
    pub(crate) fn parse_argument_list(&mut self) -> (NodeList, Span) {
        self.parse_delimited_arguments(SyntaxKind::OpenParenToken, SyntaxKind::CloseParenToken)
    }

    /// `[a, b]`
    pub(crate) fn parse_bracketed_argument_list(&mut self) -> (NodeList, Span) {
        self.parse_delimited_arguments(SyntaxKind::OpenBracketToken, SyntaxKind::CloseBracketToken)
    }

    fn parse_delimited_arguments(
        &mut self,
        open: SyntaxKind,
        close: SyntaxKind,
    ) -> (NodeList, Span) {
        let start = self.token_pos();
        let mut arguments = Vec::new();
        if !self.parse_expected(open) {
            return (arguments, Span::at(start));
        }
        while !self.is_token(close) && !self.at_eof() {
            let argument = self.parse_argument();
            if argument.is_none() {
                break;
            }
            arguments.push(argument);
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(close);
        (arguments, Span::new(start, self.prev_end()))
    }

    fn parse_argument(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut name = Atom::NONE;
        if self.is_token(SyntaxKind::Identifier) && self.peek(1) == SyntaxKind::ColonToken {
            name = self.parse_identifier();
            self.next_token();
        }
        let ref_kind = match self.token() {
            SyntaxKind::RefKeyword | SyntaxKind::OutKeyword | SyntaxKind::InKeyword => {
                let kind = self.token();
                self.next_token();
                kind
            }
            _ => SyntaxKind::Unknown,
        };

        let expression = if ref_kind == SyntaxKind::OutKeyword {
            match self.try_parse_declaration_expression() {
                Some(declaration) => declaration,
                None => self.parse_expression(),
            }
        } else {
            self.parse_expression()
        };
        if expression.is_none() {
            if name.is_none() && ref_kind == SyntaxKind::Unknown {
                self.error_at_current("Argument expected");
                return NodeIndex::NONE;
            }
            self.error_at_current("Expression expected");
        }
        self.arena.add_argument(
            NodeKind::Argument,
            start,
            self.prev_end(),
            ArgumentData {
                name,
                ref_kind,
                expression,
            },
        )
    }

    /// `var x` / `int x` in `out` position.
    fn try_parse_declaration_expression(&mut self) -> Option<NodeIndex> {
        self.speculate(|p| {
            let start = p.token_pos();
            let type_node = p.try_parse_type(TypeContext::Declaration);
            if type_node.is_none() || !p.is_token(SyntaxKind::Identifier) {
                return None;
            }
            let name_pos = p.token_pos();
            let name = p.parse_identifier();
            if !matches!(
                p.token(),
                SyntaxKind::CommaToken | SyntaxKind::CloseParenToken | SyntaxKind::CloseBracketToken
            ) {
                return None;
            }
            Some(p.arena.add_declaration(
                NodeKind::DeclarationExpression,
                start,
                p.prev_end(),
                DeclarationData {
                    type_node,
                    name,
                    name_pos,
                },
            ))
        })
    }

    // =========================================================================
    // Lambdas and anonymous methods
    // =========================================================================

    fn is_lambda_start(&self) -> bool {
        let mut n = 0;
        loop {
            let is_modifier = (self.is_contextual_at(n, "async")
                && matches!(
                    self.peek(n + 1),
                    SyntaxKind::Identifier | SyntaxKind::OpenParenToken | SyntaxKind::StaticKeyword
                ))
                || self.peek(n) == SyntaxKind::StaticKeyword;
            if !is_modifier {
                break;
            }
            n += 1;
        }
        match self.peek(n) {
            SyntaxKind::Identifier => self.peek(n + 1) == SyntaxKind::EqualsGreaterThanToken,
            SyntaxKind::OpenParenToken => self
                .matching_close_offset(n)
                .is_some_and(|close| self.peek(close + 1) == SyntaxKind::EqualsGreaterThanToken),
            _ => false,
        }
    }

    /// Offset of the `)` matching the `(` at offset `n`.
    fn matching_close_offset(&self, n: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut offset = n;
        loop {
            match self.peek(offset) {
                SyntaxKind::OpenParenToken => depth += 1,
                SyntaxKind::CloseParenToken => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(offset);
                    }
                }
                SyntaxKind::EndOfFileToken
                | SyntaxKind::SemicolonToken
                | SyntaxKind::OpenBraceToken
                | SyntaxKind::CloseBraceToken => return None,
                _ => {}
            }
            offset += 1;
        }
    }

    fn parse_lambda(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut flags = 0u16;
        loop {
            if self.is_contextual("async") && self.peek(1) != SyntaxKind::EqualsGreaterThanToken {
                flags |= node_flags::ASYNC;
                self.next_token();
            } else if self.is_token(SyntaxKind::StaticKeyword) {
                flags |= node_flags::STATIC;
                self.next_token();
            } else {
                break;
            }
        }

        let parameters = if self.is_token(SyntaxKind::Identifier) {
            let pos = self.token_pos();
            let name = self.parse_identifier();
            vec![self.arena.add_parameter(
                NodeKind::Parameter,
                pos,
                self.prev_end(),
                ParameterData {
                    name,
                    name_pos: pos,
                    ..ParameterData::default()
                },
            )]
        } else {
            self.parse_expected(SyntaxKind::OpenParenToken);
            let mut parameters = Vec::new();
            while !self.is_token(SyntaxKind::CloseParenToken) && !self.at_eof() {
                let parameter = self.parse_parameter(false);
                if parameter.is_none() {
                    break;
                }
                parameters.push(parameter);
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            self.parse_expected(SyntaxKind::CloseParenToken);
            parameters
        };

        self.parse_expected(SyntaxKind::EqualsGreaterThanToken);
        let body = if self.is_token(SyntaxKind::OpenBraceToken) {
            self.parse_block()
        } else {
            self.parse_expression()
        };
        let lambda = self.arena.add_lambda(
            NodeKind::Lambda,
            start,
            self.prev_end(),
            LambdaData { parameters, body },
        );
        self.arena.set_flag(lambda, flags);
        lambda
    }

    /// `delegate (int x) { ... }`
    fn parse_anonymous_method(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.next_token();
        let parameters = if self.is_token(SyntaxKind::OpenParenToken) {
            self.parse_parameter_list()
        } else {
            Vec::new()
        };
        let body = self.parse_block();
        self.arena.add_lambda(
            NodeKind::AnonymousMethod,
            start,
            self.prev_end(),
            LambdaData { parameters, body },
        )
    }

    // =========================================================================
    // Patterns
    // =========================================================================

    /// Pattern after `is`, `case` or in a switch expression arm.
    pub(crate) fn parse_pattern(&mut self) -> NodeIndex {
        if !self.enter() {
            return NodeIndex::NONE;
        }
        let result = self.parse_combined_pattern("or");
        self.leave();
        result
    }

    /// `p or q` / `p and q`
    fn parse_combined_pattern(&mut self, combinator: &str) -> NodeIndex {
        let start = self.token_pos();
        let first = if combinator == "or" {
            self.parse_combined_pattern("and")
        } else {
            self.parse_negated_pattern()
        };
        if first.is_none() || !self.is_contextual(combinator) {
            return first;
        }
        let mut items = vec![first];
        while self.is_contextual(combinator) {
            self.next_token();
            let next = if combinator == "or" {
                self.parse_combined_pattern("and")
            } else {
                self.parse_negated_pattern()
            };
            if next.is_none() {
                break;
            }
            items.push(next);
        }
        self.arena
            .add_list(NodeKind::Pattern, start, self.prev_end(), ListData { items })
    }

    fn parse_negated_pattern(&mut self) -> NodeIndex {
        let start = self.token_pos();
        if self.is_contextual("not") && self.peek(1) != SyntaxKind::EqualsGreaterThanToken {
            self.next_token();
            let inner = self.parse_negated_pattern();
            return self.arena.add_list(
                NodeKind::Pattern,
                start,
                self.prev_end(),
                ListData { items: vec![inner] },
            );
        }
        self.parse_primary_pattern()
    }

    fn parse_primary_pattern(&mut self) -> NodeIndex {
        let start = self.token_pos();
        match self.token() {
            // Relational: `> 5`
            SyntaxKind::LessThanToken
            | SyntaxKind::GreaterThanToken
            | SyntaxKind::LessThanEqualsToken
            | SyntaxKind::GreaterThanEqualsToken => {
                self.next_token();
                let value = self.parse_binary_expression(SHIFT_PRECEDENCE);
                return self.arena.add_list(
                    NodeKind::Pattern,
                    start,
                    self.prev_end(),
                    ListData { items: vec![value] },
                );
            }
            SyntaxKind::OpenParenToken | SyntaxKind::OpenBraceToken | SyntaxKind::OpenBracketToken => {
                if let Some(pattern) = self.try_parse_recursive_pattern(start, NodeIndex::NONE) {
                    return pattern;
                }
            }
            _ => {}
        }

        if let Some(pattern) = self.try_parse_typed_pattern() {
            return pattern;
        }
        // Constant pattern
        self.parse_binary_expression(SHIFT_PRECEDENCE)
    }

    /// `Type name`, `var name`, `Type { ... } name`, `Type(...)`.
    fn try_parse_typed_pattern(&mut self) -> Option<NodeIndex> {
        self.speculate(|p| {
            let start = p.token_pos();
            let type_node = p.try_parse_type(TypeContext::Expression);
            if type_node.is_none() {
                return None;
            }
            if p.is_token(SyntaxKind::Identifier)
                && !p.is_contextual("and")
                && !p.is_contextual("or")
                && !p.is_contextual("when")
            {
                let name_pos = p.token_pos();
                let name = p.parse_identifier();
                return Some(p.arena.add_declaration(
                    NodeKind::DeclarationPattern,
                    start,
                    p.prev_end(),
                    DeclarationData {
                        type_node,
                        name,
                        name_pos,
                    },
                ));
            }
            if matches!(
                p.token(),
                SyntaxKind::OpenBraceToken | SyntaxKind::OpenParenToken
            ) {
                return p.try_parse_recursive_pattern(start, type_node);
            }
            None
        })
    }

    /// `(p, q)`, `{ Name: p }`, `[p, ..]` with optional designation.
    fn try_parse_recursive_pattern(&mut self, start: u32, type_node: NodeIndex) -> Option<NodeIndex> {
        self.speculate(|p| {
            let mut items = Vec::new();
            if type_node.is_some() {
                items.push(type_node);
            }
            while matches!(
                p.token(),
                SyntaxKind::OpenParenToken | SyntaxKind::OpenBraceToken | SyntaxKind::OpenBracketToken
            ) {
                let close = match p.token() {
                    SyntaxKind::OpenParenToken => SyntaxKind::CloseParenToken,
                    SyntaxKind::OpenBraceToken => SyntaxKind::CloseBraceToken,
                    _ => SyntaxKind::CloseBracketToken,
                };
                p.next_token();
                while !p.is_token(close) && !p.at_eof() {
                    // `Name:` and `A.B:` subpattern prefixes
                    if p.is_token(SyntaxKind::Identifier) {
                        let prefixed = p.look_ahead(|q| {
                            q.parse_qualified_name(false);
                            q.is_token(SyntaxKind::ColonToken)
                        });
                        if prefixed {
                            p.parse_qualified_name(false);
                            p.next_token();
                        }
                    }
                    if p.is_token(SyntaxKind::DotDotToken) {
                        p.next_token();
                        if p.is_token(close) || p.is_token(SyntaxKind::CommaToken) {
                            if !p.parse_optional(SyntaxKind::CommaToken) {
                                break;
                            }
                            continue;
                        }
                    }
                    let sub = p.parse_pattern();
                    if sub.is_none() {
                        return None;
                    }
                    items.push(sub);
                    if !p.parse_optional(SyntaxKind::CommaToken) {
                        break;
                    }
                }
                if !p.parse_optional(close) {
                    return None;
                }
            }
            // Designation
            if p.is_token(SyntaxKind::Identifier)
                && !p.is_contextual("and")
                && !p.is_contextual("or")
                && !p.is_contextual("when")
            {
                let name_pos = p.token_pos();
                let name = p.parse_identifier();
                items.push(p.arena.add_declaration(
                    NodeKind::DeclarationPattern,
                    name_pos,
                    p.prev_end(),
                    DeclarationData {
                        type_node,
                        name,
                        name_pos,
                    },
                ));
            }
            Some(
                p.arena
                    .add_list(NodeKind::Pattern, start, p.prev_end(), ListData { items }),
            )
        })
    }

    /// `e switch { pattern [when guard] => result, ... }`
    fn parse_switch_expression(&mut self, start: u32, expression: NodeIndex) -> NodeIndex {
        self.next_token();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let mut sections = Vec::new();
        while !matches!(
            self.token(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            let arm_start = self.token_pos();
            let pattern = self.parse_pattern();
            if pattern.is_none() {
                self.error_at_current("Pattern expected");
                self.skip_to_recovery_point();
                continue;
            }
            let guard = if self.is_contextual("when") {
                self.next_token();
                self.parse_expression()
            } else {
                NodeIndex::NONE
            };
            self.parse_expected(SyntaxKind::EqualsGreaterThanToken);
            let result = self.parse_expression();
            sections.push(self.arena.add_switch_arm(
                NodeKind::SwitchArm,
                arm_start,
                self.prev_end(),
                SwitchArmData {
                    pattern,
                    guard,
                    expression: result,
                },
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena.add_switch(
            NodeKind::SwitchExpression,
            start,
            self.prev_end(),
            SwitchData {
                expression,
                sections,
            },
        )
    }
}
