//! Parser state - compilation units, namespaces, types and members

use crate::node::*;
use crate::state::ParserState;
use crate::state_types::TypeContext;
use isx_common::{Atom, Span};
use isx_scanner::SyntaxKind;

impl<'a> ParserState<'a> {
    // =========================================================================
    // Parse Methods - Compilation unit
    // =========================================================================

    pub fn parse_compilation_unit(&mut self) -> NodeIndex {
        let mut data = SourceFileData::default();
        self.parse_namespace_body(
            &mut data.externs,
            &mut data.usings,
            &mut data.members,
            Some(&mut data.attributes),
            false,
        );
        let end = self.text.len() as u32;
        self.arena
            .add_source_file(NodeKind::CompilationUnit, 0, end, data)
    }

    /// Body shared by compilation units and namespaces. Stops at `}` when
    /// `braced`, otherwise at end of file.
    fn parse_namespace_body(
        &mut self,
        externs: &mut NodeList,
        usings: &mut NodeList,
        members: &mut NodeList,
        mut attributes: Option<&mut NodeList>,
        braced: bool,
    ) {
        loop {
            if self.at_eof() || (braced && self.is_token(SyntaxKind::CloseBraceToken)) {
                return;
            }
            let before = self.pos;

            if self.is_token(SyntaxKind::ExternKeyword) && self.is_contextual_at(1, "alias") {
                externs.push(self.parse_extern_alias());
            } else if self.is_using_directive_start() {
                usings.push(self.parse_using_directive());
            } else if self.is_global_attribute_start() {
                let list = self.parse_attribute_list();
                if let Some(attributes) = attributes.as_deref_mut() {
                    attributes.push(list);
                }
            } else if self.is_token(SyntaxKind::NamespaceKeyword) {
                let ns = self.parse_namespace_declaration();
                members.push(ns);
            } else {
                let member = self.parse_namespace_member();
                if member.is_some() {
                    members.push(member);
                }
            }

            if self.pos == before {
                self.error_at_current("Declaration expected");
                self.skip_to_recovery_point();
            }
        }
    }

    fn is_using_directive_start(&self) -> bool {
        let offset = usize::from(self.is_contextual("global"));
        if self.peek(offset) != SyntaxKind::UsingKeyword {
            return false;
        }
        // `using (...)` and `using var x` are statements.
        let next = self.peek(offset + 1);
        next != SyntaxKind::OpenParenToken
            && !(next == SyntaxKind::Identifier
                && self.is_contextual_at(offset + 1, "var")
                && self.peek(offset + 2) == SyntaxKind::Identifier)
    }

    fn is_global_attribute_start(&self) -> bool {
        self.is_token(SyntaxKind::OpenBracketToken)
            && self.peek(2) == SyntaxKind::ColonToken
            && (self.is_contextual_at(1, "assembly") || self.is_contextual_at(1, "module"))
    }

    fn parse_extern_alias(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.next_token();
        self.next_token();
        let alias = self.parse_identifier();
        self.parse_expected(SyntaxKind::SemicolonToken);
        self.arena.add_using(
            NodeKind::ExternAlias,
            start,
            self.prev_end(),
            UsingData {
                is_global: false,
                is_static: false,
                alias,
                name: NodeIndex::NONE,
            },
        )
    }

    /// `[global] using [static] [Alias =] Name;`
    fn parse_using_directive(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let is_global = self.is_contextual("global");
        if is_global {
            self.next_token();
        }
        self.parse_expected(SyntaxKind::UsingKeyword);
        let is_static = self.parse_optional(SyntaxKind::StaticKeyword);
        let mut alias = Atom::NONE;
        if self.is_token(SyntaxKind::Identifier) && self.peek(1) == SyntaxKind::EqualsToken {
            alias = self.parse_identifier();
            self.next_token();
        }
        let name = if alias.is_some() {
            self.parse_type()
        } else {
            self.parse_qualified_name(true)
        };
        if name.is_none() {
            self.error_at_current("Name expected");
        }
        self.parse_expected(SyntaxKind::SemicolonToken);
        self.arena.add_using(
            NodeKind::UsingDirective,
            start,
            self.prev_end(),
            UsingData {
                is_global,
                is_static,
                alias,
                name,
            },
        )
    }

    /// `namespace A.B { ... }` or file-scoped `namespace A.B;`
    fn parse_namespace_declaration(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.next_token();
        let mut data = NamespaceData {
            name: self.parse_qualified_name(true),
            ..NamespaceData::default()
        };
        if data.name.is_none() {
            self.error_at_current("Namespace name expected");
        }

        let file_scoped = self.parse_optional(SyntaxKind::SemicolonToken);
        if file_scoped {
            self.parse_namespace_body(
                &mut data.externs,
                &mut data.usings,
                &mut data.members,
                None,
                false,
            );
        } else if self.parse_expected(SyntaxKind::OpenBraceToken) {
            self.parse_namespace_body(
                &mut data.externs,
                &mut data.usings,
                &mut data.members,
                None,
                true,
            );
            self.parse_expected(SyntaxKind::CloseBraceToken);
            self.parse_optional(SyntaxKind::SemicolonToken);
        }

        let ns = self
            .arena
            .add_namespace(NodeKind::NamespaceDeclaration, start, self.prev_end(), data);
        if file_scoped {
            self.arena.set_flag(ns, node_flags::FILE_SCOPED);
        }
        ns
    }

    /// A type declaration, or a top-level statement.
    fn parse_namespace_member(&mut self) -> NodeIndex {
        let checkpoint = self.checkpoint();
        let start = self.token_pos();
        let attributes = self.parse_attribute_lists();
        let modifiers = self.parse_modifiers();
        if let Some(decl) = self.parse_type_declaration_after_modifiers(start, attributes, modifiers)
        {
            return decl;
        }
        // Not a type: top-level statements (or a local function)
        self.rewind(checkpoint);
        self.parse_statement()
    }

    // =========================================================================
    // Attributes and modifiers
    // =========================================================================

    pub(crate) fn parse_attribute_lists(&mut self) -> NodeList {
        let mut lists = Vec::new();
        while self.is_token(SyntaxKind::OpenBracketToken) {
            lists.push(self.parse_attribute_list());
        }
        lists
    }

    /// `[target: A, B(args)]`
    fn parse_attribute_list(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.next_token();
        let mut target = Atom::NONE;
        if (self.is_token(SyntaxKind::Identifier) || self.token().is_keyword())
            && self.peek(1) == SyntaxKind::ColonToken
        {
            target = Atom::intern(self.token_text());
            self.next_token();
            self.next_token();
        }

        let mut attributes = Vec::new();
        while !matches!(
            self.token(),
            SyntaxKind::CloseBracketToken | SyntaxKind::EndOfFileToken
        ) {
            let attr_start = self.token_pos();
            let name = self.parse_qualified_name(true);
            if name.is_none() {
                self.error_at_current("Attribute name expected");
                break;
            }
            let (arguments, argument_span) = if self.is_token(SyntaxKind::OpenParenToken) {
                self.parse_argument_list()
            } else {
                (Vec::new(), Span::at(self.prev_end()))
            };
            attributes.push(self.arena.add_invocation(
                NodeKind::Attribute,
                attr_start,
                self.prev_end(),
                InvocationData {
                    expression: name,
                    arguments,
                    argument_span,
                },
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBracketToken);
        self.arena.add_attribute_list(
            NodeKind::AttributeList,
            start,
            self.prev_end(),
            AttributeListData { target, attributes },
        )
    }

    pub(crate) fn parse_modifiers(&mut self) -> Modifiers {
        let mut modifiers = Modifiers::empty();
        loop {
            if let Some(m) = Modifiers::from_keyword(self.token()) {
                // `new` followed by `(`/`[` or a type-then-`(` is an expression.
                if m == Modifiers::NEW
                    && matches!(
                        self.peek(1),
                        SyntaxKind::OpenParenToken | SyntaxKind::OpenBracketToken
                    )
                {
                    break;
                }
                // `ref` is a modifier only in `ref struct`/`ref readonly struct`.
                if m == Modifiers::REF
                    && self.peek(1) != SyntaxKind::StructKeyword
                    && !(self.peek(1) == SyntaxKind::ReadOnlyKeyword
                        && self.peek(2) == SyntaxKind::StructKeyword)
                {
                    break;
                }
                modifiers |= m;
                self.next_token();
                continue;
            }
            if self.token() == SyntaxKind::EventKeyword {
                modifiers |= Modifiers::EVENT;
                self.next_token();
                continue;
            }
            if self.is_token(SyntaxKind::Identifier) {
                if let Some(m) = Modifiers::from_contextual(self.token_text()) {
                    let next = self.peek(1);
                    if next.is_keyword() || next == SyntaxKind::Identifier {
                        modifiers |= m;
                        self.next_token();
                        continue;
                    }
                }
            }
            break;
        }
        modifiers
    }

    // =========================================================================
    // Type declarations
    // =========================================================================

    /// Parse a class/struct/interface/enum/record/delegate declaration whose
    /// attributes and modifiers were already consumed. Returns `None` without
    /// consuming anything if no type keyword follows.
    fn parse_type_declaration_after_modifiers(
        &mut self,
        start: u32,
        attributes: NodeList,
        modifiers: Modifiers,
    ) -> Option<NodeIndex> {
        let kind = match self.token() {
            SyntaxKind::ClassKeyword => NodeKind::ClassDeclaration,
            SyntaxKind::StructKeyword => NodeKind::StructDeclaration,
            SyntaxKind::InterfaceKeyword => NodeKind::InterfaceDeclaration,
            SyntaxKind::EnumKeyword => NodeKind::EnumDeclaration,
            SyntaxKind::DelegateKeyword
                if !matches!(
                    self.peek(1),
                    SyntaxKind::OpenParenToken | SyntaxKind::OpenBraceToken
                ) =>
            {
                return Some(self.parse_delegate_declaration(start, attributes, modifiers));
            }
            SyntaxKind::Identifier
                if self.is_contextual("record")
                    && matches!(
                        self.peek(1),
                        SyntaxKind::Identifier | SyntaxKind::ClassKeyword | SyntaxKind::StructKeyword
                    ) =>
            {
                if self.peek(1) == SyntaxKind::StructKeyword {
                    self.next_token();
                    NodeKind::RecordStructDeclaration
                } else {
                    if self.peek(1) == SyntaxKind::ClassKeyword {
                        self.next_token();
                    }
                    NodeKind::RecordDeclaration
                }
            }
            _ => return None,
        };
        self.next_token();

        let mut data = TypeDeclData {
            attributes,
            modifiers,
            name_pos: self.token_pos(),
            name: self.parse_identifier(),
            ..TypeDeclData::default()
        };

        if kind == NodeKind::EnumDeclaration {
            data.base_types = self.parse_base_list();
            data.members = self.parse_enum_body();
            return Some(self.arena.add_type_decl(kind, start, self.prev_end(), data));
        }

        data.type_parameters = self.parse_type_parameter_list();
        if matches!(
            kind,
            NodeKind::RecordDeclaration
                | NodeKind::RecordStructDeclaration
                | NodeKind::ClassDeclaration
                | NodeKind::StructDeclaration
        ) && self.is_token(SyntaxKind::OpenParenToken)
        {
            data.parameters = self.parse_parameter_list();
        }
        data.base_types = self.parse_base_list();
        data.constraints = self.parse_constraint_clauses();

        if self.parse_optional(SyntaxKind::SemicolonToken) {
            return Some(self.arena.add_type_decl(kind, start, self.prev_end(), data));
        }
        if self.parse_expected(SyntaxKind::OpenBraceToken) {
            let type_name = data.name;
            while !matches!(
                self.token(),
                SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
            ) {
                let before = self.pos;
                let member = self.parse_member_declaration(type_name);
                if member.is_some() {
                    data.members.push(member);
                }
                if self.pos == before {
                    self.error_at_current("Member declaration expected");
                    self.skip_to_recovery_point();
                }
            }
            self.parse_expected(SyntaxKind::CloseBraceToken);
            self.parse_optional(SyntaxKind::SemicolonToken);
        }
        Some(self.arena.add_type_decl(kind, start, self.prev_end(), data))
    }

    fn parse_enum_body(&mut self) -> NodeList {
        let mut members = Vec::new();
        if !self.parse_expected(SyntaxKind::OpenBraceToken) {
            return members;
        }
        while !matches!(
            self.token(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            let start = self.token_pos();
            let attributes = self.parse_attribute_lists();
            if !self.is_token(SyntaxKind::Identifier) {
                self.error_at_current("Enum member expected");
                self.skip_to_recovery_point();
                continue;
            }
            let name = self.parse_identifier();
            let value = if self.parse_optional(SyntaxKind::EqualsToken) {
                self.parse_expression()
            } else {
                NodeIndex::NONE
            };
            members.push(self.arena.add_enum_member(
                NodeKind::EnumMember,
                start,
                self.prev_end(),
                EnumMemberData {
                    attributes,
                    name,
                    value,
                },
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.parse_optional(SyntaxKind::SemicolonToken);
        members
    }

    /// `delegate TResult Func<in T, out TResult>(T arg);`
    fn parse_delegate_declaration(
        &mut self,
        start: u32,
        attributes: NodeList,
        modifiers: Modifiers,
    ) -> NodeIndex {
        self.next_token();
        let return_type = self.parse_type();
        let name_pos = self.token_pos();
        let name = self.parse_identifier();
        let type_parameters = self.parse_type_parameter_list();
        let parameters = self.parse_parameter_list();
        let constraints = self.parse_constraint_clauses();
        self.parse_expected(SyntaxKind::SemicolonToken);
        self.arena.add_delegate(
            NodeKind::DelegateDeclaration,
            start,
            self.prev_end(),
            DelegateData {
                attributes,
                modifiers,
                return_type,
                name,
                name_pos,
                type_parameters,
                parameters,
                constraints,
            },
        )
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// Parse one member of a class, struct, interface or record body.
    pub(crate) fn parse_member_declaration(&mut self, type_name: Atom) -> NodeIndex {
        let start = self.token_pos();
        let attributes = self.parse_attribute_lists();
        let modifiers = self.parse_modifiers();

        if let Some(nested) =
            self.parse_type_declaration_after_modifiers(start, attributes.clone(), modifiers)
        {
            return nested;
        }

        // Destructor: ~Name()
        if self.is_token(SyntaxKind::TildeToken) {
            self.next_token();
            let name_pos = self.token_pos();
            let name = self.parse_identifier();
            let parameters = self.parse_parameter_list();
            let (body, expression_body) = self.parse_function_body();
            return self.arena.add_method(
                NodeKind::DestructorDeclaration,
                start,
                self.prev_end(),
                MethodData {
                    attributes,
                    modifiers,
                    name,
                    name_pos,
                    parameters,
                    body,
                    expression_body,
                    ..MethodData::default()
                },
            );
        }

        // Conversion operator: implicit/explicit operator T(...)
        if matches!(
            self.token(),
            SyntaxKind::ImplicitKeyword | SyntaxKind::ExplicitKeyword
        ) {
            let name = if self.is_token(SyntaxKind::ImplicitKeyword) {
                Atom::intern("op_Implicit")
            } else {
                Atom::intern("op_Explicit")
            };
            self.next_token();
            self.parse_expected(SyntaxKind::OperatorKeyword);
            let return_type = self.parse_type();
            let parameters = self.parse_parameter_list();
            let (body, expression_body) = self.parse_function_body();
            return self.arena.add_method(
                NodeKind::ConversionOperatorDeclaration,
                start,
                self.prev_end(),
                MethodData {
                    attributes,
                    modifiers,
                    return_type,
                    name,
                    parameters,
                    body,
                    expression_body,
                    ..MethodData::default()
                },
            );
        }

        // Constructor: Name(...)
        if self.is_token(SyntaxKind::Identifier)
            && self.peek(1) == SyntaxKind::OpenParenToken
            && Atom::intern(self.token_text()) == type_name
        {
            let name_pos = self.token_pos();
            let name = self.parse_identifier();
            let parameters = self.parse_parameter_list();
            let mut initializer = Vec::new();
            if self.parse_optional(SyntaxKind::ColonToken) {
                if matches!(
                    self.token(),
                    SyntaxKind::BaseKeyword | SyntaxKind::ThisKeyword
                ) {
                    self.next_token();
                }
                if self.is_token(SyntaxKind::OpenParenToken) {
                    initializer = self.parse_argument_list().0;
                }
            }
            let (body, expression_body) = self.parse_function_body();
            return self.arena.add_method(
                NodeKind::ConstructorDeclaration,
                start,
                self.prev_end(),
                MethodData {
                    attributes,
                    modifiers,
                    name,
                    name_pos,
                    parameters,
                    initializer,
                    body,
                    expression_body,
                    ..MethodData::default()
                },
            );
        }

        let member_type = self.parse_type();
        if member_type.is_none() {
            return NodeIndex::NONE;
        }

        // Operator: T operator +(...)
        if self.is_token(SyntaxKind::OperatorKeyword) {
            self.next_token();
            let op_token = self.current();
            if !matches!(
                op_token.kind,
                SyntaxKind::OpenParenToken | SyntaxKind::EndOfFileToken
            ) {
                self.next_token();
            }
            // `>>` operator arrives as two tokens
            if op_token.kind == SyntaxKind::GreaterThanToken
                && self.is_token(SyntaxKind::GreaterThanToken)
            {
                self.next_token();
            }
            let name = Atom::intern(&format!("op_{}", self.text_of(op_token)));
            let parameters = self.parse_parameter_list();
            let (body, expression_body) = self.parse_function_body();
            return self.arena.add_method(
                NodeKind::OperatorDeclaration,
                start,
                self.prev_end(),
                MethodData {
                    attributes,
                    modifiers,
                    return_type: member_type,
                    name,
                    parameters,
                    body,
                    expression_body,
                    ..MethodData::default()
                },
            );
        }

        // Indexer: T this[...]
        if self.is_token(SyntaxKind::ThisKeyword) {
            let name_pos = self.token_pos();
            self.next_token();
            let parameters = self.parse_bracketed_parameter_list();
            let (accessors, expression_body) = self.parse_accessor_block();
            return self.arena.add_property(
                NodeKind::IndexerDeclaration,
                start,
                self.prev_end(),
                PropertyData {
                    attributes,
                    modifiers,
                    type_node: member_type,
                    name: Atom::intern("this[]"),
                    name_pos,
                    parameters,
                    accessors,
                    expression_body,
                    ..PropertyData::default()
                },
            );
        }

        // Member name, optionally qualified by an explicit interface.
        let name_pos = self.token_pos();
        let (explicit_interface, name) = self.parse_member_name();
        if name.is_none() {
            self.error_at_current("Member name expected");
            return NodeIndex::NONE;
        }

        if matches!(
            self.token(),
            SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken
        ) {
            let type_parameters = self.parse_type_parameter_list();
            let parameters = self.parse_parameter_list();
            let constraints = self.parse_constraint_clauses();
            let (body, expression_body) = self.parse_function_body();
            return self.arena.add_method(
                NodeKind::MethodDeclaration,
                start,
                self.prev_end(),
                MethodData {
                    attributes,
                    modifiers,
                    return_type: member_type,
                    explicit_interface,
                    name,
                    name_pos,
                    type_parameters,
                    parameters,
                    constraints,
                    initializer: Vec::new(),
                    body,
                    expression_body,
                },
            );
        }

        if matches!(
            self.token(),
            SyntaxKind::OpenBraceToken | SyntaxKind::EqualsGreaterThanToken
        ) {
            let (accessors, expression_body) = self.parse_accessor_block();
            let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
                let init = self.parse_expression();
                self.parse_expected(SyntaxKind::SemicolonToken);
                init
            } else {
                NodeIndex::NONE
            };
            let kind = if modifiers.contains(Modifiers::EVENT) {
                NodeKind::EventDeclaration
            } else {
                NodeKind::PropertyDeclaration
            };
            return self.arena.add_property(
                kind,
                start,
                self.prev_end(),
                PropertyData {
                    attributes,
                    modifiers,
                    type_node: member_type,
                    explicit_interface,
                    name,
                    name_pos,
                    parameters: Vec::new(),
                    accessors,
                    expression_body,
                    initializer,
                },
            );
        }

        // Field (or event field): T a = 1, b;
        let first = self.finish_variable_declarator(name, name_pos);
        let mut declarators = vec![first];
        while self.parse_optional(SyntaxKind::CommaToken) {
            let pos = self.token_pos();
            let next_name = self.parse_identifier();
            declarators.push(self.finish_variable_declarator(next_name, pos));
        }
        self.parse_expected(SyntaxKind::SemicolonToken);
        let kind = if modifiers.contains(Modifiers::EVENT) {
            NodeKind::EventFieldDeclaration
        } else {
            NodeKind::FieldDeclaration
        };
        self.arena.add_variable_declaration(
            kind,
            start,
            self.prev_end(),
            VariableDeclarationData {
                attributes,
                modifiers,
                type_node: member_type,
                declarators,
            },
        )
    }

    /// `Name` or `IFoo<T>.Name`. Returns (explicit interface, name).
    fn parse_member_name(&mut self) -> (NodeIndex, Atom) {
        if !self.is_token(SyntaxKind::Identifier) {
            return (NodeIndex::NONE, Atom::NONE);
        }
        let start = self.token_pos();
        let mut qualifier = NodeIndex::NONE;
        loop {
            let segment_start = self.token_pos();
            let name = self.parse_identifier();
            let segment_end = self.prev_end();
            let segment = if self.is_token(SyntaxKind::DotToken)
                && self.peek(1) == SyntaxKind::Identifier
            {
                self.add_identifier_name(name, segment_start, segment_end)
            } else if self.is_token(SyntaxKind::LessThanToken) {
                // `IFoo<T>.M` qualifies; `M<T>(` is a generic method name.
                let interface_args = self.speculate(|p| {
                    let args = p.parse_type_argument_list()?;
                    (p.is_token(SyntaxKind::DotToken) && p.peek(1) == SyntaxKind::Identifier)
                        .then_some(args)
                });
                match interface_args {
                    Some(type_arguments) => self.arena.add_generic_name(
                        NodeKind::GenericName,
                        segment_start,
                        self.prev_end(),
                        GenericNameData {
                            name,
                            type_arguments,
                        },
                    ),
                    None => return (qualifier, name),
                }
            } else {
                return (qualifier, name);
            };

            self.next_token();
            qualifier = if qualifier.is_none() {
                segment
            } else {
                self.arena.add_qualified_name(
                    NodeKind::QualifiedName,
                    start,
                    segment_end.max(self.prev_end()),
                    QualifiedNameData {
                        left: qualifier,
                        right: segment,
                    },
                )
            };
        }
    }

    pub(crate) fn finish_variable_declarator(&mut self, name: Atom, name_pos: u32) -> NodeIndex {
        // Fixed-size buffer: `fixed int buf[4];`
        if self.is_token(SyntaxKind::OpenBracketToken) {
            self.parse_bracketed_argument_list();
        }
        let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
            self.parse_variable_initializer()
        } else {
            NodeIndex::NONE
        };
        self.arena.add_variable_declarator(
            NodeKind::VariableDeclarator,
            name_pos,
            self.prev_end().max(name_pos),
            VariableDeclaratorData {
                name,
                name_pos,
                initializer,
            },
        )
    }

    /// Expression or array initializer `{ 1, 2 }`.
    pub(crate) fn parse_variable_initializer(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::OpenBraceToken) {
            self.parse_initializer_expression()
        } else {
            self.parse_expression()
        }
    }

    /// `{ block }`, `=> expr;`, or `;`. Returns (block, expression body).
    pub(crate) fn parse_function_body(&mut self) -> (NodeIndex, NodeIndex) {
        match self.token() {
            SyntaxKind::OpenBraceToken => (self.parse_block(), NodeIndex::NONE),
            SyntaxKind::EqualsGreaterThanToken => {
                self.next_token();
                let expr = self.parse_expression();
                self.parse_expected(SyntaxKind::SemicolonToken);
                (NodeIndex::NONE, expr)
            }
            _ => {
                self.parse_expected(SyntaxKind::SemicolonToken);
                (NodeIndex::NONE, NodeIndex::NONE)
            }
        }
    }

    /// `{ get; set => x = value; }` or `=> expr;`. Returns (accessors, expression body).
    fn parse_accessor_block(&mut self) -> (NodeList, NodeIndex) {
        if self.parse_optional(SyntaxKind::EqualsGreaterThanToken) {
            let expr = self.parse_expression();
            self.parse_expected(SyntaxKind::SemicolonToken);
            return (Vec::new(), expr);
        }
        let mut accessors = Vec::new();
        if !self.parse_expected(SyntaxKind::OpenBraceToken) {
            return (accessors, NodeIndex::NONE);
        }
        while !matches!(
            self.token(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            let start = self.token_pos();
            let attributes = self.parse_attribute_lists();
            let modifiers = self.parse_modifiers();
            if !self.is_token(SyntaxKind::Identifier) {
                self.error_at_current("Accessor expected");
                self.skip_to_recovery_point();
                continue;
            }
            let keyword = self.parse_identifier();
            let (body, expression_body) = self.parse_function_body();
            accessors.push(self.arena.add_accessor(
                NodeKind::Accessor,
                start,
                self.prev_end(),
                AccessorData {
                    attributes,
                    modifiers,
                    keyword,
                    body,
                    expression_body,
                },
            ));
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        (accessors, NodeIndex::NONE)
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    pub(crate) fn parse_parameter_list(&mut self) -> NodeList {
        if !self.parse_expected(SyntaxKind::OpenParenToken) {
            return Vec::new();
        }
        let parameters = self.parse_parameters_until(SyntaxKind::CloseParenToken);
        self.parse_expected(SyntaxKind::CloseParenToken);
        parameters
    }

    fn parse_bracketed_parameter_list(&mut self) -> NodeList {
        if !self.parse_expected(SyntaxKind::OpenBracketToken) {
            return Vec::new();
        }
        let parameters = self.parse_parameters_until(SyntaxKind::CloseBracketToken);
        self.parse_expected(SyntaxKind::CloseBracketToken);
        parameters
    }

    fn parse_parameters_until(&mut self, close: SyntaxKind) -> NodeList {
        let mut parameters = Vec::new();
        while !self.is_token(close) && !self.at_eof() {
            let parameter = self.parse_parameter(true);
            if parameter.is_none() {
                break;
            }
            parameters.push(parameter);
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        parameters
    }

    /// `[attrs] [this|ref|out|in|params|scoped] Type name [= default]`.
    ///
    /// With `require_type` unset (lambda parameters) the type may be omitted.
    pub(crate) fn parse_parameter(&mut self, require_type: bool) -> NodeIndex {
        let start = self.token_pos();
        let attributes = self.parse_attribute_lists();
        let mut modifiers = ParameterModifiers::empty();
        loop {
            let m = match self.token() {
                SyntaxKind::ThisKeyword => ParameterModifiers::THIS,
                SyntaxKind::RefKeyword => ParameterModifiers::REF,
                SyntaxKind::OutKeyword => ParameterModifiers::OUT,
                SyntaxKind::InKeyword => ParameterModifiers::IN,
                SyntaxKind::ParamsKeyword => ParameterModifiers::PARAMS,
                SyntaxKind::ReadOnlyKeyword => ParameterModifiers::READONLY,
                SyntaxKind::Identifier
                    if self.is_contextual("scoped")
                        && matches!(
                            self.peek(1),
                            SyntaxKind::Identifier | SyntaxKind::RefKeyword
                        )
                        && self.peek(2) != SyntaxKind::CommaToken
                        && self.peek(2) != SyntaxKind::CloseParenToken =>
                {
                    ParameterModifiers::SCOPED
                }
                _ => break,
            };
            modifiers |= m;
            self.next_token();
        }

        let implicit = !require_type
            && self.is_token(SyntaxKind::Identifier)
            && matches!(
                self.peek(1),
                SyntaxKind::CommaToken | SyntaxKind::CloseParenToken | SyntaxKind::EqualsGreaterThanToken
            );
        let type_node = if implicit {
            NodeIndex::NONE
        } else {
            let ty = self.try_parse_type(TypeContext::Declaration);
            if ty.is_none() {
                self.error_at_current("Parameter type expected");
                return NodeIndex::NONE;
            }
            ty
        };

        let name_pos = self.token_pos();
        let name = self.parse_identifier();
        // `int[] a[]` is not C#, but `params` arrays and defaults are.
        let default_value = if self.parse_optional(SyntaxKind::EqualsToken) {
            self.parse_expression()
        } else {
            NodeIndex::NONE
        };
        self.arena.add_parameter(
            NodeKind::Parameter,
            start,
            self.prev_end(),
            ParameterData {
                attributes,
                modifiers,
                type_node,
                name,
                name_pos,
                default_value,
            },
        )
    }
}
