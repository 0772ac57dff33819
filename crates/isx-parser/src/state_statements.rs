//! Parser state - statement parsing methods

use crate::node::*;
use crate::state::ParserState;
use crate::state_types::TypeContext;
use isx_common::Atom;
use isx_scanner::SyntaxKind;

impl<'a> ParserState<'a> {
    // =========================================================================
    // Parse Methods - Statements
    // =========================================================================

    /// `{ statements }`
    pub(crate) fn parse_block(&mut self) -> NodeIndex {
        let start = self.token_pos();
        if !self.parse_expected(SyntaxKind::OpenBraceToken) {
            return NodeIndex::NONE;
        }
        let mut items = Vec::new();
        while !matches!(
            self.token(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            let before = self.pos;
            let statement = self.parse_statement();
            if statement.is_some() {
                items.push(statement);
            }
            if self.pos == before {
                self.error_at_current("Statement expected");
                self.skip_statement_tokens();
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena
            .add_list(NodeKind::Block, start, self.prev_end(), ListData { items })
    }

    /// Recovery inside a block: never skip past the closing brace.
    fn skip_statement_tokens(&mut self) {
        if self.is_token(SyntaxKind::CloseBraceToken) {
            return;
        }
        self.next_token();
        while !matches!(
            self.token(),
            SyntaxKind::SemicolonToken | SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) && !self.current().has_preceding_line_break()
        {
            self.next_token();
        }
        self.parse_optional(SyntaxKind::SemicolonToken);
    }

    pub(crate) fn parse_statement(&mut self) -> NodeIndex {
        if !self.enter() {
            return NodeIndex::NONE;
        }
        let result = self.parse_statement_inner();
        self.leave();
        result
    }

    fn parse_statement_inner(&mut self) -> NodeIndex {
        let start = self.token_pos();
        match self.token() {
            SyntaxKind::OpenBraceToken => self.parse_block(),
            SyntaxKind::SemicolonToken => {
                self.next_token();
                self.arena
                    .add_leaf(NodeKind::EmptyStatement, start, self.prev_end())
            }
            SyntaxKind::IfKeyword => self.parse_if_statement(),
            SyntaxKind::WhileKeyword => {
                self.next_token();
                self.parse_expected(SyntaxKind::OpenParenToken);
                let condition = self.parse_expression();
                self.parse_expected(SyntaxKind::CloseParenToken);
                let body = self.parse_embedded_statement();
                self.arena.add_loop(
                    NodeKind::WhileStatement,
                    start,
                    self.prev_end(),
                    LoopData {
                        condition,
                        body,
                        ..LoopData::default()
                    },
                )
            }
            SyntaxKind::DoKeyword => {
                self.next_token();
                let body = self.parse_embedded_statement();
                self.parse_expected(SyntaxKind::WhileKeyword);
                self.parse_expected(SyntaxKind::OpenParenToken);
                let condition = self.parse_expression();
                self.parse_expected(SyntaxKind::CloseParenToken);
                self.parse_expected(SyntaxKind::SemicolonToken);
                self.arena.add_loop(
                    NodeKind::DoStatement,
                    start,
                    self.prev_end(),
                    LoopData {
                        condition,
                        body,
                        ..LoopData::default()
                    },
                )
            }
            SyntaxKind::ForKeyword => self.parse_for_statement(),
            SyntaxKind::ForEachKeyword => self.parse_foreach_statement(start),
            SyntaxKind::ReturnKeyword | SyntaxKind::ThrowKeyword => {
                let kind = if self.is_token(SyntaxKind::ReturnKeyword) {
                    NodeKind::ReturnStatement
                } else {
                    NodeKind::ThrowStatement
                };
                let operator = self.token();
                self.next_token();
                let operand = if self.is_token(SyntaxKind::SemicolonToken) {
                    NodeIndex::NONE
                } else {
                    self.parse_expression()
                };
                self.parse_expected(SyntaxKind::SemicolonToken);
                self.arena.add_unary(
                    kind,
                    start,
                    self.prev_end(),
                    UnaryData { operator, operand },
                )
            }
            SyntaxKind::BreakKeyword | SyntaxKind::ContinueKeyword => {
                let kind = if self.is_token(SyntaxKind::BreakKeyword) {
                    NodeKind::BreakStatement
                } else {
                    NodeKind::ContinueStatement
                };
                self.next_token();
                self.parse_expected(SyntaxKind::SemicolonToken);
                self.arena.add_leaf(kind, start, self.prev_end())
            }
            SyntaxKind::GotoKeyword => {
                self.next_token();
                let operator = self.token();
                let operand = match operator {
                    SyntaxKind::CaseKeyword => {
                        self.next_token();
                        self.parse_expression()
                    }
                    SyntaxKind::DefaultKeyword => {
                        self.next_token();
                        NodeIndex::NONE
                    }
                    _ => self.parse_expression(),
                };
                self.parse_expected(SyntaxKind::SemicolonToken);
                self.arena.add_unary(
                    NodeKind::GotoStatement,
                    start,
                    self.prev_end(),
                    UnaryData { operator, operand },
                )
            }
            SyntaxKind::TryKeyword => self.parse_try_statement(),
            SyntaxKind::SwitchKeyword => self.parse_switch_statement(),
            SyntaxKind::LockKeyword | SyntaxKind::FixedKeyword => {
                let kind = if self.is_token(SyntaxKind::LockKeyword) {
                    NodeKind::LockStatement
                } else {
                    NodeKind::FixedStatement
                };
                self.next_token();
                self.parse_expected(SyntaxKind::OpenParenToken);
                let (declaration, condition) = if kind == NodeKind::FixedStatement {
                    (self.parse_local_declaration_core(start, Modifiers::FIXED, false), NodeIndex::NONE)
                } else {
                    (NodeIndex::NONE, self.parse_expression())
                };
                self.parse_expected(SyntaxKind::CloseParenToken);
                let body = self.parse_embedded_statement();
                self.arena.add_loop(
                    kind,
                    start,
                    self.prev_end(),
                    LoopData {
                        declaration,
                        condition,
                        body,
                        ..LoopData::default()
                    },
                )
            }
            SyntaxKind::CheckedKeyword | SyntaxKind::UncheckedKeyword | SyntaxKind::UnsafeKeyword
                if self.peek(1) == SyntaxKind::OpenBraceToken =>
            {
                let kind = if self.is_token(SyntaxKind::UnsafeKeyword) {
                    NodeKind::UnsafeStatement
                } else {
                    NodeKind::CheckedStatement
                };
                self.next_token();
                let body = self.parse_block();
                self.arena.add_loop(
                    kind,
                    start,
                    self.prev_end(),
                    LoopData {
                        body,
                        ..LoopData::default()
                    },
                )
            }
            SyntaxKind::UsingKeyword => self.parse_using_statement(start),
            SyntaxKind::Identifier if self.is_contextual("yield") => {
                match self.peek(1) {
                    SyntaxKind::ReturnKeyword => {
                        self.next_token();
                        self.next_token();
                        let operand = self.parse_expression();
                        self.parse_expected(SyntaxKind::SemicolonToken);
                        return self.arena.add_unary(
                            NodeKind::YieldReturnStatement,
                            start,
                            self.prev_end(),
                            UnaryData {
                                operator: SyntaxKind::ReturnKeyword,
                                operand,
                            },
                        );
                    }
                    SyntaxKind::BreakKeyword => {
                        self.next_token();
                        self.next_token();
                        self.parse_expected(SyntaxKind::SemicolonToken);
                        return self.arena.add_leaf(
                            NodeKind::YieldBreakStatement,
                            start,
                            self.prev_end(),
                        );
                    }
                    _ => self.parse_declaration_or_expression_statement(start),
                }
            }
            SyntaxKind::Identifier
                if self.is_contextual("await")
                    && matches!(
                        self.peek(1),
                        SyntaxKind::ForEachKeyword | SyntaxKind::UsingKeyword
                    ) =>
            {
                self.next_token();
                if self.is_token(SyntaxKind::ForEachKeyword) {
                    self.parse_foreach_statement(start)
                } else {
                    self.parse_using_statement(start)
                }
            }
            SyntaxKind::Identifier if self.peek(1) == SyntaxKind::ColonToken => {
                self.next_token();
                self.next_token();
                let operand = self.parse_statement();
                self.arena.add_unary(
                    NodeKind::LabeledStatement,
                    start,
                    self.prev_end(),
                    UnaryData {
                        operator: SyntaxKind::Identifier,
                        operand,
                    },
                )
            }
            _ => self.parse_declaration_or_expression_statement(start),
        }
    }

    /// Body of `if`/`while`/`for`: a statement, never a declaration.
    fn parse_embedded_statement(&mut self) -> NodeIndex {
        let statement = self.parse_statement();
        if statement.is_none() {
            self.error_at_current("Statement expected");
        }
        statement
    }

    fn parse_if_statement(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);
        let condition = self.parse_expression();
        self.parse_expected(SyntaxKind::CloseParenToken);
        let when_true = self.parse_embedded_statement();
        let when_false = if self.parse_optional(SyntaxKind::ElseKeyword) {
            self.parse_embedded_statement()
        } else {
            NodeIndex::NONE
        };
        self.arena.add_conditional(
            NodeKind::IfStatement,
            start,
            self.prev_end(),
            ConditionalData {
                condition,
                when_true,
                when_false,
            },
        )
    }

    /// `for (init; condition; incrementors) body`
    fn parse_for_statement(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);

        let mut data = LoopData::default();
        if !self.is_token(SyntaxKind::SemicolonToken) {
            let decl_start = self.token_pos();
            match self.try_parse_local_declaration(decl_start, Modifiers::empty(), false) {
                Some(declaration) => data.declaration = declaration,
                None => data.initializers = self.parse_expression_list(SyntaxKind::SemicolonToken),
            }
        }
        self.parse_expected(SyntaxKind::SemicolonToken);
        if !self.is_token(SyntaxKind::SemicolonToken) {
            data.condition = self.parse_expression();
        }
        self.parse_expected(SyntaxKind::SemicolonToken);
        if !self.is_token(SyntaxKind::CloseParenToken) {
            data.incrementors = self.parse_expression_list(SyntaxKind::CloseParenToken);
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        data.body = self.parse_embedded_statement();
        self.arena
            .add_loop(NodeKind::ForStatement, start, self.prev_end(), data)
    }

    fn parse_expression_list(&mut self, terminator: SyntaxKind) -> NodeList {
        let mut expressions = Vec::new();
        while !self.is_token(terminator) && !self.at_eof() {
            let expression = self.parse_expression();
            if expression.is_none() {
                break;
            }
            expressions.push(expression);
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        expressions
    }

    /// `foreach (T x in e) body`; `start` covers a leading `await`.
    fn parse_foreach_statement(&mut self, start: u32) -> NodeIndex {
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);
        let type_node = self.try_parse_type(TypeContext::Declaration);
        let name_pos = self.token_pos();
        let name = if self.is_token(SyntaxKind::Identifier) {
            self.parse_identifier()
        } else {
            // Deconstruction: `foreach (var (a, b) in pairs)`
            if self.is_token(SyntaxKind::OpenParenToken) {
                self.parse_unary_expression();
            } else {
                self.error_at_current("Identifier expected");
            }
            Atom::NONE
        };
        self.parse_expected(SyntaxKind::InKeyword);
        let expression = self.parse_expression();
        self.parse_expected(SyntaxKind::CloseParenToken);
        let body = self.parse_embedded_statement();
        self.arena.add_for_each(
            NodeKind::ForEachStatement,
            start,
            self.prev_end(),
            ForEachData {
                type_node,
                name,
                name_pos,
                expression,
                body,
            },
        )
    }

    fn parse_try_statement(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.next_token();
        let mut data = TryData {
            block: self.parse_block(),
            ..TryData::default()
        };
        while self.is_token(SyntaxKind::CatchKeyword) {
            let catch_start = self.token_pos();
            self.next_token();
            let mut type_node = NodeIndex::NONE;
            let mut name = Atom::NONE;
            if self.parse_optional(SyntaxKind::OpenParenToken) {
                type_node = self.parse_type();
                if self.is_token(SyntaxKind::Identifier) {
                    name = self.parse_identifier();
                }
                self.parse_expected(SyntaxKind::CloseParenToken);
            }
            let filter = if self.is_contextual("when") {
                self.next_token();
                self.parse_expected(SyntaxKind::OpenParenToken);
                let filter = self.parse_expression();
                self.parse_expected(SyntaxKind::CloseParenToken);
                filter
            } else {
                NodeIndex::NONE
            };
            let block = self.parse_block();
            data.catches.push(self.arena.add_catch(
                NodeKind::CatchClause,
                catch_start,
                self.prev_end(),
                CatchData {
                    type_node,
                    name,
                    filter,
                    block,
                },
            ));
        }
        if self.parse_optional(SyntaxKind::FinallyKeyword) {
            data.finally_block = self.parse_block();
        }
        self.arena
            .add_try(NodeKind::TryStatement, start, self.prev_end(), data)
    }

    /// `switch (e) { case p when g: ... default: ... }`
    fn parse_switch_statement(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.next_token();
        let expression = self.parse_expression();
        let mut sections = Vec::new();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        while matches!(
            self.token(),
            SyntaxKind::CaseKeyword | SyntaxKind::DefaultKeyword
        ) {
            let section_start = self.token_pos();
            let mut labels = Vec::new();
            while matches!(
                self.token(),
                SyntaxKind::CaseKeyword | SyntaxKind::DefaultKeyword
            ) {
                let label_start = self.token_pos();
                if self.parse_optional(SyntaxKind::DefaultKeyword) {
                    self.parse_expected(SyntaxKind::ColonToken);
                    labels.push(self.arena.add_leaf(
                        NodeKind::DefaultLabel,
                        label_start,
                        self.prev_end(),
                    ));
                    continue;
                }
                self.next_token();
                let pattern = self.parse_pattern();
                let guard = if self.is_contextual("when") {
                    self.next_token();
                    self.parse_expression()
                } else {
                    NodeIndex::NONE
                };
                self.parse_expected(SyntaxKind::ColonToken);
                labels.push(self.arena.add_switch_arm(
                    NodeKind::CaseLabel,
                    label_start,
                    self.prev_end(),
                    SwitchArmData {
                        pattern,
                        guard,
                        expression: NodeIndex::NONE,
                    },
                ));
            }
            let mut statements = Vec::new();
            while !matches!(
                self.token(),
                SyntaxKind::CaseKeyword
                    | SyntaxKind::DefaultKeyword
                    | SyntaxKind::CloseBraceToken
                    | SyntaxKind::EndOfFileToken
            ) {
                let before = self.pos;
                let statement = self.parse_statement();
                if statement.is_some() {
                    statements.push(statement);
                }
                if self.pos == before {
                    self.error_at_current("Statement expected");
                    self.skip_statement_tokens();
                }
            }
            sections.push(self.arena.add_switch_section(
                NodeKind::SwitchSection,
                section_start,
                self.prev_end(),
                SwitchSectionData { labels, statements },
            ));
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena.add_switch(
            NodeKind::SwitchStatement,
            start,
            self.prev_end(),
            SwitchData {
                expression,
                sections,
            },
        )
    }

    /// `using (x) body`, `using (var x = ...) body` or `using var x = ...;`.
    fn parse_using_statement(&mut self, start: u32) -> NodeIndex {
        self.next_token();
        if !self.is_token(SyntaxKind::OpenParenToken) {
            return self.parse_local_declaration_core(start, Modifiers::USING, true);
        }
        self.next_token();
        let decl_start = self.token_pos();
        let mut data = LoopData::default();
        match self.try_parse_local_declaration(decl_start, Modifiers::empty(), false) {
            Some(declaration) => data.declaration = declaration,
            None => data.condition = self.parse_expression(),
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        data.body = self.parse_embedded_statement();
        self.arena
            .add_loop(NodeKind::UsingStatement, start, self.prev_end(), data)
    }

    // =========================================================================
    // Declarations and expression statements
    // =========================================================================

    fn parse_declaration_or_expression_statement(&mut self, start: u32) -> NodeIndex {
        let modifiers = self.parse_local_modifiers();

        if let Some(function) = self.try_parse_local_function(start, modifiers) {
            return function;
        }
        if let Some(declaration) = self.try_parse_local_declaration(start, modifiers, true) {
            return declaration;
        }

        let expression = self.parse_expression();
        if expression.is_none() {
            if !modifiers.is_empty() {
                self.error_at_current("Declaration expected");
            }
            return NodeIndex::NONE;
        }
        self.parse_expected(SyntaxKind::SemicolonToken);
        self.arena.add_unary(
            NodeKind::ExpressionStatement,
            start,
            self.prev_end(),
            UnaryData {
                operator: SyntaxKind::SemicolonToken,
                operand: expression,
            },
        )
    }

    /// Modifiers valid on locals and local functions.
    fn parse_local_modifiers(&mut self) -> Modifiers {
        let mut modifiers = Modifiers::empty();
        loop {
            let modifier = match self.token() {
                SyntaxKind::ConstKeyword => Modifiers::CONST,
                SyntaxKind::StaticKeyword => Modifiers::STATIC,
                SyntaxKind::UnsafeKeyword => Modifiers::UNSAFE,
                SyntaxKind::ExternKeyword => Modifiers::EXTERN,
                SyntaxKind::Identifier
                    if self.is_contextual("async")
                        && (self.peek(1).is_keyword() || self.peek(1) == SyntaxKind::Identifier)
                        && self.peek(2) != SyntaxKind::EqualsGreaterThanToken
                        && self.peek(1) != SyntaxKind::DelegateKeyword =>
                {
                    Modifiers::ASYNC
                }
                _ => break,
            };
            // `static x => ...` and `static (x) => ...` are lambdas.
            if modifier == Modifiers::STATIC
                && matches!(
                    self.peek(1),
                    SyntaxKind::OpenParenToken | SyntaxKind::Identifier
                )
                && self.peek(2) == SyntaxKind::EqualsGreaterThanToken
            {
                break;
            }
            modifiers |= modifier;
            self.next_token();
        }
        modifiers
    }

    /// `T Name<U>(params) { body }` inside a block.
    fn try_parse_local_function(&mut self, start: u32, modifiers: Modifiers) -> Option<NodeIndex> {
        self.speculate(|p| {
            let return_type = p.try_parse_type(TypeContext::Declaration);
            if return_type.is_none() || !p.is_token(SyntaxKind::Identifier) {
                return None;
            }
            if !matches!(
                p.peek(1),
                SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken
            ) {
                return None;
            }
            let name_pos = p.token_pos();
            let name = p.parse_identifier();
            let type_parameters = p.parse_type_parameter_list();
            if !p.is_token(SyntaxKind::OpenParenToken) {
                return None;
            }
            let diagnostics_before = p.diagnostics.len();
            let parameters = p.parse_parameter_list();
            if p.diagnostics.len() != diagnostics_before {
                return None;
            }
            let constraints = p.parse_constraint_clauses();
            if !matches!(
                p.token(),
                SyntaxKind::OpenBraceToken | SyntaxKind::EqualsGreaterThanToken
            ) {
                return None;
            }
            let (body, expression_body) = p.parse_function_body();
            let function = p.arena.add_method(
                NodeKind::LocalFunctionStatement,
                start,
                p.prev_end(),
                MethodData {
                    modifiers,
                    return_type,
                    name,
                    name_pos,
                    type_parameters,
                    parameters,
                    constraints,
                    body,
                    expression_body,
                    ..MethodData::default()
                },
            );
            if modifiers.contains(Modifiers::ASYNC) {
                p.arena.set_flag(function, node_flags::ASYNC);
            }
            Some(function)
        })
    }

    /// `T a = 1, b;` when it reads as a declaration; `None` (nothing
    /// consumed) otherwise.
    fn try_parse_local_declaration(
        &mut self,
        start: u32,
        modifiers: Modifiers,
        expect_semicolon: bool,
    ) -> Option<NodeIndex> {
        self.speculate(|p| {
            let type_node = p.try_parse_type(TypeContext::Expression);
            if type_node.is_none() || !p.is_token(SyntaxKind::Identifier) {
                return None;
            }
            if !matches!(
                p.peek(1),
                SyntaxKind::EqualsToken
                    | SyntaxKind::SemicolonToken
                    | SyntaxKind::CommaToken
                    | SyntaxKind::OpenBracketToken
                    | SyntaxKind::CloseParenToken
                    | SyntaxKind::InKeyword
                    | SyntaxKind::EndOfFileToken
                    | SyntaxKind::CloseBraceToken
            ) && !p.peek_token(1).has_preceding_line_break()
            {
                return None;
            }
            Some(p.finish_local_declaration(start, modifiers, type_node, expect_semicolon))
        })
    }

    /// Local declaration whose type has not been read yet; always produces a node.
    fn parse_local_declaration_core(
        &mut self,
        start: u32,
        modifiers: Modifiers,
        expect_semicolon: bool,
    ) -> NodeIndex {
        let type_node = self.parse_type();
        self.finish_local_declaration(start, modifiers, type_node, expect_semicolon)
    }

    fn finish_local_declaration(
        &mut self,
        start: u32,
        modifiers: Modifiers,
        type_node: NodeIndex,
        expect_semicolon: bool,
    ) -> NodeIndex {
        let mut declarators = Vec::new();
        loop {
            let name_pos = self.token_pos();
            let name = self.parse_identifier();
            declarators.push(self.finish_variable_declarator(name, name_pos));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        if expect_semicolon {
            self.parse_expected(SyntaxKind::SemicolonToken);
        }
        self.arena.add_variable_declaration(
            NodeKind::LocalDeclaration,
            start,
            self.prev_end(),
            VariableDeclarationData {
                attributes: Vec::new(),
                modifiers,
                type_node,
                declarators,
            },
        )
    }
}
