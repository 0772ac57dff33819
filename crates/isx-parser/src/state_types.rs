//! Parser state - type and name parsing methods

use crate::node::*;
use crate::state::ParserState;
use isx_common::Atom;
use isx_scanner::SyntaxKind;

/// Where a type is being parsed; affects how `?` and `<` are read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TypeContext {
    /// Declarations: field, parameter and return types, base lists.
    Declaration,
    /// Expression-adjacent positions (`is`, `as`, casts, local declarations)
    /// where `?` may start a conditional expression.
    Expression,
}

impl<'a> ParserState<'a> {
    // =========================================================================
    // Parse Methods - Types
    // =========================================================================

    /// Parse a type, returning `NONE` (with a diagnostic) if no type starts here.
    pub(crate) fn parse_type(&mut self) -> NodeIndex {
        let ty = self.try_parse_type(TypeContext::Declaration);
        if ty.is_none() {
            self.error_at_current("Type expected");
        }
        ty
    }

    /// Parse a type if one starts here; no diagnostic on failure, but tokens
    /// consumed by a partial parse stay consumed. Callers that need
    /// all-or-nothing behavior wrap this in `speculate`.
    pub(crate) fn try_parse_type(&mut self, context: TypeContext) -> NodeIndex {
        if !self.enter() {
            return NodeIndex::NONE;
        }
        let result = self.try_parse_type_inner(context);
        self.leave();
        result
    }

    fn try_parse_type_inner(&mut self, context: TypeContext) -> NodeIndex {
        let start = self.token_pos();

        if self.is_token(SyntaxKind::RefKeyword) {
            self.next_token();
            self.parse_optional(SyntaxKind::ReadOnlyKeyword);
            let element = self.try_parse_type(context);
            if element.is_none() {
                return NodeIndex::NONE;
            }
            return self.arena.add_wrapped_type(
                NodeKind::RefType,
                start,
                self.prev_end(),
                WrappedTypeData { element, rank: 0 },
            );
        }

        let mut ty = self.parse_non_array_type();
        if ty.is_none() {
            return ty;
        }

        loop {
            match self.token() {
                SyntaxKind::QuestionToken if self.question_is_nullable_suffix(context) => {
                    self.next_token();
                    ty = self.arena.add_wrapped_type(
                        NodeKind::NullableType,
                        start,
                        self.prev_end(),
                        WrappedTypeData {
                            element: ty,
                            rank: 0,
                        },
                    );
                }
                SyntaxKind::AsteriskToken if context == TypeContext::Declaration => {
                    self.next_token();
                    ty = self.arena.add_wrapped_type(
                        NodeKind::PointerType,
                        start,
                        self.prev_end(),
                        WrappedTypeData {
                            element: ty,
                            rank: 0,
                        },
                    );
                }
                SyntaxKind::OpenBracketToken
                    if matches!(
                        self.peek(1),
                        SyntaxKind::CloseBracketToken | SyntaxKind::CommaToken
                    ) =>
                {
                    self.next_token();
                    let mut rank = 1u8;
                    while self.parse_optional(SyntaxKind::CommaToken) {
                        rank = rank.saturating_add(1);
                    }
                    if !self.parse_expected(SyntaxKind::CloseBracketToken) {
                        return NodeIndex::NONE;
                    }
                    ty = self.arena.add_wrapped_type(
                        NodeKind::ArrayType,
                        start,
                        self.prev_end(),
                        WrappedTypeData { element: ty, rank },
                    );
                }
                _ => break,
            }
        }
        ty
    }

    /// In declarations `T?` is always nullable. In expression contexts it is
    /// nullable only when the next token cannot continue a conditional
    /// expression.
    fn question_is_nullable_suffix(&self, context: TypeContext) -> bool {
        if context == TypeContext::Declaration {
            return true;
        }
        matches!(
            self.peek(1),
            SyntaxKind::Identifier
                | SyntaxKind::CloseParenToken
                | SyntaxKind::CommaToken
                | SyntaxKind::GreaterThanToken
                | SyntaxKind::OpenBracketToken
                | SyntaxKind::CloseBracketToken
                | SyntaxKind::SemicolonToken
                | SyntaxKind::EqualsGreaterThanToken
                | SyntaxKind::EndOfFileToken
        )
    }

    fn parse_non_array_type(&mut self) -> NodeIndex {
        let token = self.current();
        match token.kind {
            k if k.is_predefined_type() => {
                self.next_token();
                self.arena.add_token(
                    NodeKind::PredefinedType,
                    token.start,
                    token.end,
                    TokenData {
                        token: k,
                        flags: token.flags,
                    },
                )
            }
            SyntaxKind::OpenParenToken => self.parse_tuple_type(),
            SyntaxKind::Identifier => self.parse_qualified_name(true),
            _ => NodeIndex::NONE,
        }
    }

    /// `(int a, string b)`
    fn parse_tuple_type(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.next_token();
        let mut elements = Vec::new();
        loop {
            let element_start = self.token_pos();
            let element_type = self.try_parse_type(TypeContext::Declaration);
            if element_type.is_none() {
                return NodeIndex::NONE;
            }
            let (name, name_pos) = if self.is_token(SyntaxKind::Identifier) {
                let pos = self.token_pos();
                (self.parse_identifier(), pos)
            } else {
                (Atom::NONE, 0)
            };
            elements.push(self.arena.add_declaration(
                NodeKind::TupleElement,
                element_start,
                self.prev_end(),
                DeclarationData {
                    type_node: element_type,
                    name,
                    name_pos,
                },
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        if elements.len() < 2 || !self.parse_optional(SyntaxKind::CloseParenToken) {
            return NodeIndex::NONE;
        }
        self.arena.add_list(
            NodeKind::TupleType,
            start,
            self.prev_end(),
            ListData { items: elements },
        )
    }

    /// Parse a dotted name: `A.B<C>.D`, `global::System.Linq`.
    ///
    /// With `in_type` set, `<` after a name always opens a type argument list.
    pub(crate) fn parse_qualified_name(&mut self, in_type: bool) -> NodeIndex {
        let start = self.token_pos();
        let mut left = self.parse_simple_name(in_type);
        if left.is_none() {
            return left;
        }

        if self.is_token(SyntaxKind::ColonColonToken) {
            self.next_token();
            let right = self.parse_simple_name(in_type);
            if right.is_none() {
                return NodeIndex::NONE;
            }
            left = self.arena.add_qualified_name(
                NodeKind::AliasQualifiedName,
                start,
                self.prev_end(),
                QualifiedNameData { left, right },
            );
        }

        while self.is_token(SyntaxKind::DotToken)
            && self.peek(1) == SyntaxKind::Identifier
            && !self.dot_name_starts_declaration()
        {
            self.next_token();
            let right = self.parse_simple_name(in_type);
            if right.is_none() {
                return NodeIndex::NONE;
            }
            left = self.arena.add_qualified_name(
                NodeKind::QualifiedName,
                start,
                self.prev_end(),
                QualifiedNameData { left, right },
            );
        }
        left
    }

    /// Identifier or generic name.
    pub(crate) fn parse_simple_name(&mut self, in_type: bool) -> NodeIndex {
        if !self.is_token(SyntaxKind::Identifier) {
            return NodeIndex::NONE;
        }
        let start = self.token_pos();
        let name = self.parse_identifier();
        let end = self.prev_end();

        if self.is_token(SyntaxKind::LessThanToken) {
            let type_arguments = if in_type {
                self.speculate(|p| p.parse_type_argument_list())
            } else {
                self.speculate(|p| {
                    let args = p.parse_type_argument_list()?;
                    p.can_follow_type_argument_list().then_some(args)
                })
            };
            if let Some(type_arguments) = type_arguments {
                return self.arena.add_generic_name(
                    NodeKind::GenericName,
                    start,
                    self.prev_end(),
                    GenericNameData {
                        name,
                        type_arguments,
                    },
                );
            }
        }
        self.add_identifier_name(name, start, end)
    }

    /// `<T, U>` or `<,>` (omitted arguments, as in `typeof(Dictionary<,>)`).
    pub(crate) fn parse_type_argument_list(&mut self) -> Option<NodeList> {
        if !self.parse_optional(SyntaxKind::LessThanToken) {
            return None;
        }
        let mut arguments = Vec::new();
        loop {
            if matches!(
                self.token(),
                SyntaxKind::CommaToken | SyntaxKind::GreaterThanToken
            ) {
                let pos = self.token_pos();
                arguments.push(
                    self.arena
                        .add_leaf(NodeKind::OmittedTypeArgument, pos, pos),
                );
            } else {
                let argument = self.try_parse_type(TypeContext::Declaration);
                if argument.is_none() {
                    return None;
                }
                arguments.push(argument);
            }
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        if !self.parse_optional(SyntaxKind::GreaterThanToken) {
            return None;
        }
        Some(arguments)
    }

    /// Disambiguation rule for `F<A, B>(x)` versus `F < A, B > (x)`: a type
    /// argument list in an expression is kept only when followed by one of
    /// these tokens.
    pub(crate) fn can_follow_type_argument_list(&self) -> bool {
        matches!(
            self.token(),
            SyntaxKind::OpenParenToken
                | SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken
                | SyntaxKind::CloseBraceToken
                | SyntaxKind::ColonToken
                | SyntaxKind::SemicolonToken
                | SyntaxKind::CommaToken
                | SyntaxKind::DotToken
                | SyntaxKind::QuestionDotToken
                | SyntaxKind::QuestionToken
                | SyntaxKind::EqualsEqualsToken
                | SyntaxKind::ExclamationEqualsToken
                | SyntaxKind::BarToken
                | SyntaxKind::CaretToken
                | SyntaxKind::AmpersandAmpersandToken
                | SyntaxKind::BarBarToken
                | SyntaxKind::AmpersandToken
                | SyntaxKind::OpenBracketToken
                | SyntaxKind::EndOfFileToken
        )
    }

    // =========================================================================
    // Type parameters and constraints
    // =========================================================================

    /// `<in T, out U>`
    pub(crate) fn parse_type_parameter_list(&mut self) -> NodeList {
        let mut parameters = Vec::new();
        if !self.parse_optional(SyntaxKind::LessThanToken) {
            return parameters;
        }
        loop {
            let start = self.token_pos();
            let attributes = self.parse_attribute_lists();
            let variance = match self.token() {
                SyntaxKind::InKeyword | SyntaxKind::OutKeyword => {
                    let kind = self.token();
                    self.next_token();
                    kind
                }
                _ => SyntaxKind::Unknown,
            };
            let name = self.parse_identifier();
            parameters.push(self.arena.add_type_parameter(
                NodeKind::TypeParameter,
                start,
                self.prev_end(),
                TypeParameterData {
                    attributes,
                    variance,
                    name,
                },
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::GreaterThanToken);
        parameters
    }

    /// Zero or more `where T : ...` clauses.
    pub(crate) fn parse_constraint_clauses(&mut self) -> NodeList {
        let mut clauses = Vec::new();
        while self.is_contextual("where") && self.peek(1) == SyntaxKind::Identifier {
            let start = self.token_pos();
            self.next_token();
            let name = self.parse_identifier();
            self.parse_expected(SyntaxKind::ColonToken);
            let mut constraints = Vec::new();
            loop {
                let constraint = self.parse_constraint();
                if constraint.is_none() {
                    break;
                }
                constraints.push(constraint);
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            clauses.push(self.arena.add_constraint_clause(
                NodeKind::TypeParameterConstraintClause,
                start,
                self.prev_end(),
                ConstraintClauseData { name, constraints },
            ));
        }
        clauses
    }

    fn parse_constraint(&mut self) -> NodeIndex {
        let start = self.token_pos();
        match self.token() {
            SyntaxKind::ClassKeyword => {
                self.next_token();
                self.parse_optional(SyntaxKind::QuestionToken);
                self.arena
                    .add_leaf(NodeKind::ClassConstraint, start, self.prev_end())
            }
            SyntaxKind::StructKeyword => {
                self.next_token();
                self.arena
                    .add_leaf(NodeKind::StructConstraint, start, self.prev_end())
            }
            SyntaxKind::DefaultKeyword => {
                self.next_token();
                self.arena
                    .add_leaf(NodeKind::DefaultConstraint, start, self.prev_end())
            }
            SyntaxKind::NewKeyword => {
                self.next_token();
                self.parse_expected(SyntaxKind::OpenParenToken);
                self.parse_expected(SyntaxKind::CloseParenToken);
                self.arena
                    .add_leaf(NodeKind::NewConstraint, start, self.prev_end())
            }
            _ => {
                // `unmanaged` and `notnull` parse as type names; the binder
                // recognizes them by text.
                let element = self.try_parse_type(TypeContext::Declaration);
                if element.is_none() {
                    self.error_at_current("Type constraint expected");
                    return NodeIndex::NONE;
                }
                self.arena.add_wrapped_type(
                    NodeKind::TypeConstraint,
                    start,
                    self.prev_end(),
                    WrappedTypeData { element, rank: 0 },
                )
            }
        }
    }

    /// `: Base, IFoo<T>`
    pub(crate) fn parse_base_list(&mut self) -> NodeList {
        let mut types = Vec::new();
        if !self.parse_optional(SyntaxKind::ColonToken) {
            return types;
        }
        loop {
            let ty = self.parse_type();
            if ty.is_none() {
                break;
            }
            types.push(ty);
            // Record base with primary constructor arguments: `record B(int X) : A(X)`
            if self.is_token(SyntaxKind::OpenParenToken) {
                self.parse_argument_list();
            }
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        types
    }
}
