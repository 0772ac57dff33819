//! Node arena: contiguous node headers plus typed payload pools.

use crate::node::*;

macro_rules! node_pools {
    ($($category:ident => $pool:ident: $data:ty, $add:ident, $get:ident;)*) => {
        /// Arena-based storage for AST nodes.
        /// Nodes are stored contiguously and referenced by `NodeIndex`.
        #[derive(Debug, Default)]
        pub struct NodeArena {
            pub nodes: Vec<Node>,
            /// Parent of each node, filled in after parsing
            pub parents: Vec<NodeIndex>,
            $(pub $pool: Vec<$data>,)*
        }

        impl NodeArena {
            $(
                pub fn $add(&mut self, kind: NodeKind, pos: u32, end: u32, data: $data) -> NodeIndex {
                    debug_assert_eq!(kind.category(), NodeCategory::$category);
                    let data_index = self.$pool.len() as u32;
                    self.$pool.push(data);
                    self.add(Node::with_data(kind, pos, end, data_index))
                }

                #[inline]
                pub fn $get(&self, node: &Node) -> Option<&$data> {
                    if node.has_data() && node.kind.category() == NodeCategory::$category {
                        self.$pool.get(node.data_index as usize)
                    } else {
                        None
                    }
                }
            )*
        }
    };
}

node_pools! {
    SourceFile => source_files: SourceFileData, add_source_file, get_source_file;
    Using => usings: UsingData, add_using, get_using;
    Namespace => namespaces: NamespaceData, add_namespace, get_namespace;
    AttributeList => attribute_lists: AttributeListData, add_attribute_list, get_attribute_list;
    TypeDecl => type_decls: TypeDeclData, add_type_decl, get_type_decl;
    Delegate => delegates: DelegateData, add_delegate, get_delegate;
    EnumMember => enum_members: EnumMemberData, add_enum_member, get_enum_member;
    TypeParameter => type_parameters: TypeParameterData, add_type_parameter, get_type_parameter;
    ConstraintClause => constraint_clauses: ConstraintClauseData, add_constraint_clause, get_constraint_clause;
    Method => methods: MethodData, add_method, get_method;
    Property => properties: PropertyData, add_property, get_property;
    Accessor => accessors: AccessorData, add_accessor, get_accessor;
    Parameter => parameters: ParameterData, add_parameter, get_parameter;
    Identifier => identifiers: IdentifierData, add_identifier, get_identifier;
    GenericName => generic_names: GenericNameData, add_generic_name, get_generic_name;
    QualifiedName => qualified_names: QualifiedNameData, add_qualified_name, get_qualified_name;
    Token => tokens: TokenData, add_token, get_token;
    WrappedType => wrapped_types: WrappedTypeData, add_wrapped_type, get_wrapped_type;
    List => lists: ListData, add_list, get_list;
    Declaration => declarations: DeclarationData, add_declaration, get_declaration;
    VariableDeclaration => variable_declarations: VariableDeclarationData, add_variable_declaration, get_variable_declaration;
    VariableDeclarator => variable_declarators: VariableDeclaratorData, add_variable_declarator, get_variable_declarator;
    Conditional => conditionals: ConditionalData, add_conditional, get_conditional;
    Loop => loops: LoopData, add_loop, get_loop;
    ForEach => for_eachs: ForEachData, add_for_each, get_for_each;
    Try => tries: TryData, add_try, get_try;
    Catch => catches: CatchData, add_catch, get_catch;
    Switch => switches: SwitchData, add_switch, get_switch;
    SwitchSection => switch_sections: SwitchSectionData, add_switch_section, get_switch_section;
    SwitchArm => switch_arms: SwitchArmData, add_switch_arm, get_switch_arm;
    MemberAccess => member_accesses: MemberAccessData, add_member_access, get_member_access;
    Invocation => invocations: InvocationData, add_invocation, get_invocation;
    Argument => arguments: ArgumentData, add_argument, get_argument;
    Creation => creations: CreationData, add_creation, get_creation;
    Unary => unaries: UnaryData, add_unary, get_unary;
    Binary => binaries: BinaryData, add_binary, get_binary;
    TypeOperand => type_operands: TypeOperandData, add_type_operand, get_type_operand;
    Lambda => lambdas: LambdaData, add_lambda, get_lambda;
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    /// Add a node header and return its index.
    pub fn add(&mut self, node: Node) -> NodeIndex {
        let index = self.nodes.len() as u32;
        self.nodes.push(node);
        NodeIndex(index)
    }

    /// Add a node without payload.
    pub fn add_leaf(&mut self, kind: NodeKind, pos: u32, end: u32) -> NodeIndex {
        self.add(Node::new(kind, pos, end))
    }

    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get(index.0 as usize)
        }
    }

    #[inline]
    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get_mut(index.0 as usize)
        }
    }

    #[inline]
    pub fn kind(&self, index: NodeIndex) -> Option<NodeKind> {
        self.get(index).map(|n| n.kind)
    }

    /// Number of node headers; used as a speculation checkpoint.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop node headers added after a failed speculative parse.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    #[inline]
    pub fn parent(&self, index: NodeIndex) -> NodeIndex {
        if index.is_none() {
            return NodeIndex::NONE;
        }
        self.parents
            .get(index.0 as usize)
            .copied()
            .unwrap_or(NodeIndex::NONE)
    }

    pub(crate) fn set_flag(&mut self, index: NodeIndex, flag: u16) {
        if let Some(node) = self.get_mut(index) {
            node.flags |= flag;
        }
    }

    /// Compute `parents` by walking from `root`.
    pub(crate) fn link_parents(&mut self, root: NodeIndex) {
        let mut parents = vec![NodeIndex::NONE; self.nodes.len()];
        let mut stack = vec![root];
        let mut children = Vec::new();
        while let Some(current) = stack.pop() {
            children.clear();
            self.collect_children(current, &mut children);
            for &child in &children {
                if let Some(slot) = parents.get_mut(child.0 as usize) {
                    *slot = current;
                    stack.push(child);
                }
            }
        }
        self.parents = parents;
    }

    /// Direct children of a node in source order.
    pub fn children(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        self.collect_children(index, &mut out);
        out
    }

    fn collect_children(&self, index: NodeIndex, out: &mut Vec<NodeIndex>) {
        let Some(node) = self.get(index) else {
            return;
        };
        let start = out.len();
        macro_rules! push {
            ($($e:expr),* $(,)?) => {{ $(out.push($e);)* }};
        }
        macro_rules! extend {
            ($($e:expr),* $(,)?) => {{ $(out.extend_from_slice(&$e);)* }};
        }

        match node.kind.category() {
            NodeCategory::None | NodeCategory::Identifier | NodeCategory::Token => {}
            NodeCategory::SourceFile => {
                if let Some(d) = self.get_source_file(node) {
                    extend!(d.externs, d.usings, d.attributes, d.members);
                }
            }
            NodeCategory::Using => {
                if let Some(d) = self.get_using(node) {
                    push!(d.name);
                }
            }
            NodeCategory::Namespace => {
                if let Some(d) = self.get_namespace(node) {
                    push!(d.name);
                    extend!(d.externs, d.usings, d.members);
                }
            }
            NodeCategory::AttributeList => {
                if let Some(d) = self.get_attribute_list(node) {
                    extend!(d.attributes);
                }
            }
            NodeCategory::TypeDecl => {
                if let Some(d) = self.get_type_decl(node) {
                    extend!(
                        d.attributes,
                        d.type_parameters,
                        d.parameters,
                        d.base_types,
                        d.constraints,
                        d.members
                    );
                }
            }
            NodeCategory::Delegate => {
                if let Some(d) = self.get_delegate(node) {
                    extend!(d.attributes);
                    push!(d.return_type);
                    extend!(d.type_parameters, d.parameters, d.constraints);
                }
            }
            NodeCategory::EnumMember => {
                if let Some(d) = self.get_enum_member(node) {
                    extend!(d.attributes);
                    push!(d.value);
                }
            }
            NodeCategory::TypeParameter => {
                if let Some(d) = self.get_type_parameter(node) {
                    extend!(d.attributes);
                }
            }
            NodeCategory::ConstraintClause => {
                if let Some(d) = self.get_constraint_clause(node) {
                    extend!(d.constraints);
                }
            }
            NodeCategory::Method => {
                if let Some(d) = self.get_method(node) {
                    extend!(d.attributes);
                    push!(d.return_type, d.explicit_interface);
                    extend!(d.type_parameters, d.parameters, d.constraints, d.initializer);
                    push!(d.body, d.expression_body);
                }
            }
            NodeCategory::Property => {
                if let Some(d) = self.get_property(node) {
                    extend!(d.attributes);
                    push!(d.type_node, d.explicit_interface);
                    extend!(d.parameters, d.accessors);
                    push!(d.expression_body, d.initializer);
                }
            }
            NodeCategory::Accessor => {
                if let Some(d) = self.get_accessor(node) {
                    extend!(d.attributes);
                    push!(d.body, d.expression_body);
                }
            }
            NodeCategory::Parameter => {
                if let Some(d) = self.get_parameter(node) {
                    extend!(d.attributes);
                    push!(d.type_node, d.default_value);
                }
            }
            NodeCategory::GenericName => {
                if let Some(d) = self.get_generic_name(node) {
                    extend!(d.type_arguments);
                }
            }
            NodeCategory::QualifiedName => {
                if let Some(d) = self.get_qualified_name(node) {
                    push!(d.left, d.right);
                }
            }
            NodeCategory::WrappedType => {
                if let Some(d) = self.get_wrapped_type(node) {
                    push!(d.element);
                }
            }
            NodeCategory::List => {
                if let Some(d) = self.get_list(node) {
                    extend!(d.items);
                }
            }
            NodeCategory::Declaration => {
                if let Some(d) = self.get_declaration(node) {
                    push!(d.type_node);
                }
            }
            NodeCategory::VariableDeclaration => {
                if let Some(d) = self.get_variable_declaration(node) {
                    extend!(d.attributes);
                    push!(d.type_node);
                    extend!(d.declarators);
                }
            }
            NodeCategory::VariableDeclarator => {
                if let Some(d) = self.get_variable_declarator(node) {
                    push!(d.initializer);
                }
            }
            NodeCategory::Conditional => {
                if let Some(d) = self.get_conditional(node) {
                    push!(d.condition, d.when_true, d.when_false);
                }
            }
            NodeCategory::Loop => {
                if let Some(d) = self.get_loop(node) {
                    if node.kind == NodeKind::DoStatement {
                        push!(d.body, d.condition);
                    } else {
                        push!(d.declaration);
                        extend!(d.initializers);
                        push!(d.condition);
                        extend!(d.incrementors);
                        push!(d.body);
                    }
                }
            }
            NodeCategory::ForEach => {
                if let Some(d) = self.get_for_each(node) {
                    push!(d.type_node, d.expression, d.body);
                }
            }
            NodeCategory::Try => {
                if let Some(d) = self.get_try(node) {
                    push!(d.block);
                    extend!(d.catches);
                    push!(d.finally_block);
                }
            }
            NodeCategory::Catch => {
                if let Some(d) = self.get_catch(node) {
                    push!(d.type_node, d.filter, d.block);
                }
            }
            NodeCategory::Switch => {
                if let Some(d) = self.get_switch(node) {
                    push!(d.expression);
                    extend!(d.sections);
                }
            }
            NodeCategory::SwitchSection => {
                if let Some(d) = self.get_switch_section(node) {
                    extend!(d.labels, d.statements);
                }
            }
            NodeCategory::SwitchArm => {
                if let Some(d) = self.get_switch_arm(node) {
                    push!(d.pattern, d.guard, d.expression);
                }
            }
            NodeCategory::MemberAccess => {
                if let Some(d) = self.get_member_access(node) {
                    push!(d.expression, d.name);
                }
            }
            NodeCategory::Invocation => {
                if let Some(d) = self.get_invocation(node) {
                    push!(d.expression);
                    extend!(d.arguments);
                }
            }
            NodeCategory::Argument => {
                if let Some(d) = self.get_argument(node) {
                    push!(d.expression);
                }
            }
            NodeCategory::Creation => {
                if let Some(d) = self.get_creation(node) {
                    push!(d.type_node);
                    extend!(d.arguments);
                    push!(d.initializer);
                }
            }
            NodeCategory::Unary => {
                if let Some(d) = self.get_unary(node) {
                    push!(d.operand);
                }
            }
            NodeCategory::Binary => {
                if let Some(d) = self.get_binary(node) {
                    push!(d.left, d.right);
                }
            }
            NodeCategory::TypeOperand => {
                if let Some(d) = self.get_type_operand(node) {
                    push!(d.type_node, d.expression);
                }
            }
            NodeCategory::Lambda => {
                if let Some(d) = self.get_lambda(node) {
                    extend!(d.parameters);
                    push!(d.body);
                }
            }
        }

        // Drop NONE placeholders pushed for absent optional children.
        let mut write = start;
        for read in start..out.len() {
            if out[read].is_some() {
                out[write] = out[read];
                write += 1;
            }
        }
        out.truncate(write);
    }
}
