//! Expression typing over one document of a compilation.
//!
//! `SemanticModel` answers "what is this expression" for the receiver of a
//! member access: a value of some type, a type name, a namespace name, or
//! nothing the model understands. It covers the expression forms a receiver
//! can take, including locals declared with `var`, lambda parameters whose
//! types come from the enclosing call, and calls whose return types depend on
//! inferred method type arguments.
//!
//! Every query is total. Anything that cannot be typed classifies as
//! `ExprClass::Unknown` (or `TypeId::ERROR` from `type_of`).

use crate::compilation::Compilation;
use crate::literals::literal_type;
use crate::resolve::{Resolution, TypeResolver, type_args_of};
use crate::scope::Scope;
use isx_common::limits::MAX_EXPRESSION_DEPTH;
use isx_common::{Atom, FileId};
use isx_parser::{NodeIndex, NodeKind, SyntaxTree, node_flags};
use isx_scanner::SyntaxKind;
use isx_solver::hierarchy::{all_supertypes, base_chain, enumerable_element, instantiations_of};
use isx_solver::{
    DefId, DefKind, InferenceContext, MemberKind, MethodFlags, MethodId, MethodInfo, ParamModifier,
    ParameterInfo, SpecialType, Substitution, TypeArgs, TypeData, TypeDatabase, TypeId,
    TypeParamRef, is_implicitly_convertible, match_extension_receiver, mentions_type_param,
    substitute,
};
use tracing::trace;

/// What an expression denotes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExprClass {
    /// A value of the given type.
    Value(TypeId),
    /// A type name, as in `Console.` or `List<int>.`
    Type(TypeId),
    /// A namespace name, as in `System.`
    Namespace(Atom),
    Unknown,
}

impl ExprClass {
    pub fn value_type(self) -> Option<TypeId> {
        match self {
            ExprClass::Value(ty) => Some(ty),
            _ => None,
        }
    }
}

/// The method an invocation binds to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedCall {
    pub method: MethodId,
    /// Type arguments of the method and of its containing type.
    pub subst: Substitution,
    /// 1 for extension methods called on a receiver, 0 otherwise.
    pub receiver_offset: usize,
}

#[derive(Clone, Debug)]
struct Candidate {
    method: MethodId,
    seed: Substitution,
    receiver_offset: usize,
}

pub struct SemanticModel<'c> {
    compilation: &'c Compilation,
    file: FileId,
    tree: &'c SyntaxTree,
}

impl<'c> SemanticModel<'c> {
    pub fn new(compilation: &'c Compilation, file: FileId, tree: &'c SyntaxTree) -> Self {
        SemanticModel {
            compilation,
            file,
            tree,
        }
    }

    pub fn compilation(&self) -> &'c Compilation {
        self.compilation
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn tree(&self) -> &'c SyntaxTree {
        self.tree
    }

    fn db(&self) -> &'c dyn TypeDatabase {
        self.compilation.db()
    }

    pub fn scope_at(&self, node: NodeIndex) -> Scope {
        Scope::at(self.tree, self.file, node, self.compilation.declarations())
    }

    /// Resolve type syntax in the scope of `node`.
    pub fn resolve_type_syntax(&self, node: NodeIndex) -> TypeId {
        let scope = self.scope_at(node);
        TypeResolver::new(self.db(), self.tree, &scope).resolve_type(node)
    }

    pub fn classify_expression(&self, node: NodeIndex) -> ExprClass {
        self.classify(node, 0)
    }

    /// Type of a value expression; `ERROR` for anything else.
    pub fn type_of(&self, node: NodeIndex) -> TypeId {
        self.type_at(node, 0)
    }

    /// Method bound by an `Invocation` node.
    pub fn resolve_call(&self, invocation: NodeIndex) -> Option<ResolvedCall> {
        self.resolve_call_at(invocation, 0, true)
    }

    fn type_at(&self, node: NodeIndex, depth: u32) -> TypeId {
        self.classify(node, depth)
            .value_type()
            .unwrap_or(TypeId::ERROR)
    }

    // =========================================================================
    // Classification
    // =========================================================================

    fn classify(&self, node: NodeIndex, depth: u32) -> ExprClass {
        if depth > MAX_EXPRESSION_DEPTH {
            trace!("expression too deep to classify");
            return ExprClass::Unknown;
        }
        let Some(n) = self.tree.node(node) else {
            return ExprClass::Unknown;
        };
        let arena = &self.tree.arena;
        let db = self.db();
        let depth = depth + 1;

        match n.kind {
            NodeKind::Literal => match arena.get_token(n) {
                Some(token) => value(literal_type(db, token.token, self.tree.node_text(node))),
                None => ExprClass::Unknown,
            },
            NodeKind::IdentifierName => self.classify_identifier(node, depth),
            NodeKind::GenericName | NodeKind::QualifiedName | NodeKind::AliasQualifiedName => {
                let scope = self.scope_at(node);
                from_resolution(TypeResolver::new(db, self.tree, &scope).resolve_name(node))
            }
            kind if kind.is_type_syntax() => type_class(self.resolve_type_syntax(node)),
            NodeKind::MemberAccess => self.classify_member_access(node, depth),
            NodeKind::Invocation => self.classify_invocation(node, depth),
            NodeKind::ElementAccess => self.classify_element_access(node, depth),
            NodeKind::Argument => match arena.get_argument(n) {
                Some(data) => self.classify(data.expression, depth),
                None => ExprClass::Unknown,
            },
            NodeKind::ObjectCreation => match arena.get_creation(n) {
                Some(data) => value(self.resolve_type_syntax(data.type_node)),
                None => ExprClass::Unknown,
            },
            NodeKind::ImplicitObjectCreation => self
                .target_type(node, depth)
                .map(value)
                .unwrap_or(ExprClass::Unknown),
            NodeKind::ArrayCreation => self.classify_array_creation(node, depth),
            NodeKind::ImplicitArrayCreation => {
                let element = arena
                    .get_creation(n)
                    .and_then(|data| self.tree.node(data.initializer))
                    .and_then(|init| arena.get_list(init))
                    .and_then(|list| {
                        list.items
                            .iter()
                            .map(|&item| self.type_at(item, depth))
                            .find(|ty| !ty.is_error() && *ty != TypeId::NULL)
                    });
                match element {
                    Some(element) => value(db.types().array(element, 1)),
                    None => ExprClass::Unknown,
                }
            }
            NodeKind::AnonymousObjectCreation => value(db.special(SpecialType::Object)),
            NodeKind::TupleExpression => {
                let Some(list) = arena.get_list(n) else {
                    return ExprClass::Unknown;
                };
                let elements: TypeArgs = list
                    .items
                    .iter()
                    .map(|&item| self.type_at(item, depth))
                    .collect();
                if elements.iter().any(|ty| ty.is_error()) {
                    return ExprClass::Unknown;
                }
                let scope = self.scope_at(node);
                value(TypeResolver::new(db, self.tree, &scope).tuple_type(elements))
            }
            NodeKind::ParenthesizedExpression
            | NodeKind::CheckedExpression
            | NodeKind::RefExpression => match arena.get_unary(n) {
                Some(data) => match self.classify(data.operand, depth) {
                    class @ ExprClass::Value(_) => class,
                    _ => ExprClass::Unknown,
                },
                None => ExprClass::Unknown,
            },
            NodeKind::CastExpression => match arena.get_type_operand(n) {
                Some(data) => value(self.resolve_type_syntax(data.type_node)),
                None => ExprClass::Unknown,
            },
            NodeKind::AsExpression => match arena.get_binary(n) {
                Some(data) => {
                    let scope = self.scope_at(node);
                    let resolver = TypeResolver::new(db, self.tree, &scope);
                    let target = resolver.resolve_type(data.right);
                    value(resolver.make_nullable(target))
                }
                None => ExprClass::Unknown,
            },
            NodeKind::IsExpression | NodeKind::IsPatternExpression => {
                value(db.special(SpecialType::Boolean))
            }
            NodeKind::BinaryExpression => self.classify_binary(node, depth),
            NodeKind::AssignmentExpression => match arena.get_binary(n) {
                Some(data) if data.operator == SyntaxKind::QuestionQuestionEqualsToken => {
                    self.classify_coalesce(data.left, data.right, depth)
                }
                Some(data) => match self.classify(data.left, depth) {
                    class @ ExprClass::Value(_) => class,
                    _ => ExprClass::Unknown,
                },
                None => ExprClass::Unknown,
            },
            NodeKind::ConditionalExpression => {
                let Some(data) = arena.get_conditional(n) else {
                    return ExprClass::Unknown;
                };
                let when_true = self.type_at(data.when_true, depth);
                if !when_true.is_error() && when_true != TypeId::NULL {
                    return value(when_true);
                }
                value(self.type_at(data.when_false, depth))
            }
            NodeKind::PrefixUnary => self.classify_prefix_unary(node, depth),
            NodeKind::PostfixUnary => match arena.get_unary(n) {
                // `x++`, `x--` and `x!` keep the operand type.
                Some(data) => value(self.type_at(data.operand, depth)),
                None => ExprClass::Unknown,
            },
            NodeKind::AwaitExpression => match arena.get_unary(n) {
                Some(data) => {
                    let awaited = self.type_at(data.operand, depth);
                    self.awaited_type(awaited)
                        .map(value)
                        .unwrap_or(ExprClass::Unknown)
                }
                None => ExprClass::Unknown,
            },
            NodeKind::TypeOfExpression => value(db.special(SpecialType::Type)),
            NodeKind::SizeOfExpression => value(db.special(SpecialType::Int32)),
            NodeKind::DefaultExpression => match arena.get_type_operand(n) {
                Some(data) if data.type_node.is_some() => {
                    value(self.resolve_type_syntax(data.type_node))
                }
                _ => self
                    .target_type(node, depth)
                    .map(value)
                    .unwrap_or(ExprClass::Unknown),
            },
            NodeKind::ThisExpression => self
                .this_type(node)
                .map(value)
                .unwrap_or(ExprClass::Unknown),
            NodeKind::BaseExpression => self
                .this_type(node)
                .and_then(|this| base_chain(db, this).get(1).copied())
                .map(value)
                .unwrap_or(ExprClass::Unknown),
            NodeKind::DeclarationExpression => match arena.get_declaration(n) {
                Some(data) => value(self.declaration_type(node, data.type_node, depth)),
                None => ExprClass::Unknown,
            },
            NodeKind::SwitchExpression => {
                let Some(data) = arena.get_switch(n) else {
                    return ExprClass::Unknown;
                };
                data.sections
                    .iter()
                    .filter_map(|&arm| self.tree.node(arm).and_then(|a| arena.get_switch_arm(a)))
                    .map(|arm| self.type_at(arm.expression, depth))
                    .find(|ty| !ty.is_error() && *ty != TypeId::NULL)
                    .map(value)
                    .unwrap_or(ExprClass::Unknown)
            }
            _ => ExprClass::Unknown,
        }
    }

    fn classify_identifier(&self, node: NodeIndex, depth: u32) -> ExprClass {
        let Some(name) = self.tree.simple_name(node) else {
            return ExprClass::Unknown;
        };
        if let Some(ty) = self.lookup_local(node, name, depth) {
            return value(ty);
        }
        let scope = self.scope_at(node);
        if let Some(ty) = self.lookup_enclosing_member(&scope, name) {
            return value(ty);
        }
        from_resolution(TypeResolver::new(self.db(), self.tree, &scope).lookup_simple(
            name,
            &[],
            depth,
        ))
    }

    fn classify_member_access(&self, node: NodeIndex, depth: u32) -> ExprClass {
        let db = self.db();
        let Some(data) = self
            .tree
            .node(node)
            .and_then(|n| self.tree.arena.get_member_access(n))
        else {
            return ExprClass::Unknown;
        };
        let Some(name) = self.tree.simple_name(data.name) else {
            return ExprClass::Unknown;
        };
        let args = self.explicit_type_args(data.name);

        match self.classify(data.expression, depth) {
            ExprClass::Namespace(namespace) => {
                let scope = self.scope_at(node);
                from_resolution(
                    TypeResolver::new(db, self.tree, &scope)
                        .member_of_namespace(namespace, name, &args),
                )
            }
            ExprClass::Type(ty) => {
                if let Some((def, _)) = db.named_def(ty)
                    && let Some(nested) = db.defs().lookup_nested(def, name, args.len() as u16)
                {
                    return ExprClass::Type(db.types().named(nested, args));
                }
                self.member_type(ty, name)
                    .map(value)
                    .unwrap_or(ExprClass::Unknown)
            }
            ExprClass::Value(ty) => {
                let receiver = self.access_receiver(ty, data.operator);
                self.member_type(receiver, name)
                    .map(value)
                    .unwrap_or(ExprClass::Unknown)
            }
            ExprClass::Unknown => ExprClass::Unknown,
        }
    }

    fn classify_invocation(&self, node: NodeIndex, depth: u32) -> ExprClass {
        let db = self.db();
        if let Some(call) = self.resolve_call_at(node, depth, true) {
            return match db.method(call.method) {
                Some(info) => value(substitute(db, info.return_type, &call.subst)),
                None => ExprClass::Unknown,
            };
        }
        let Some(data) = self
            .tree
            .node(node)
            .and_then(|n| self.tree.arena.get_invocation(n))
        else {
            return ExprClass::Unknown;
        };
        if self.tree.kind(data.expression) == Some(NodeKind::IdentifierName)
            && self.tree.node_text(data.expression) == "nameof"
        {
            return value(db.special(SpecialType::String));
        }
        // Invoking a delegate-typed value.
        match self.classify(data.expression, depth) {
            ExprClass::Value(callee) => self
                .delegate_invoke(callee)
                .map(|(invoke, subst)| value(substitute(db, invoke.return_type, &subst)))
                .unwrap_or(ExprClass::Unknown),
            _ => ExprClass::Unknown,
        }
    }

    fn classify_element_access(&self, node: NodeIndex, depth: u32) -> ExprClass {
        let db = self.db();
        let Some(n) = self.tree.node(node) else {
            return ExprClass::Unknown;
        };
        let Some(data) = self.tree.arena.get_invocation(n) else {
            return ExprClass::Unknown;
        };
        let mut receiver = self.type_at(data.expression, depth);
        if n.has_flag(node_flags::CONDITIONAL_ACCESS)
            && let Some(underlying) = db.nullable_underlying(receiver)
        {
            receiver = underlying;
        }
        if let TypeData::Array { element, .. } = db.lookup(receiver) {
            return value(element);
        }
        if db.special_of(receiver) == Some(SpecialType::String) {
            return value(db.special(SpecialType::Char));
        }
        self.indexer_type(receiver)
            .map(value)
            .unwrap_or(ExprClass::Unknown)
    }

    fn classify_array_creation(&self, node: NodeIndex, _depth: u32) -> ExprClass {
        let Some(data) = self
            .tree
            .node(node)
            .and_then(|n| self.tree.arena.get_creation(n))
        else {
            return ExprClass::Unknown;
        };
        let ty = self.resolve_type_syntax(data.type_node);
        if self.tree.kind(data.type_node) == Some(NodeKind::ArrayType) {
            return value(ty);
        }
        let rank = data.arguments.len().clamp(1, u8::MAX as usize) as u8;
        value(self.db().types().array(ty, rank))
    }

    fn classify_binary(&self, node: NodeIndex, depth: u32) -> ExprClass {
        let db = self.db();
        let Some(data) = self
            .tree
            .node(node)
            .and_then(|n| self.tree.arena.get_binary(n))
        else {
            return ExprClass::Unknown;
        };
        use SyntaxKind::*;
        match data.operator {
            EqualsEqualsToken
            | ExclamationEqualsToken
            | LessThanToken
            | LessThanEqualsToken
            | GreaterThanToken
            | GreaterThanEqualsToken
            | AmpersandAmpersandToken
            | BarBarToken => value(db.special(SpecialType::Boolean)),
            QuestionQuestionToken => self.classify_coalesce(data.left, data.right, depth),
            PlusToken => {
                let left = self.type_at(data.left, depth);
                let right = self.type_at(data.right, depth);
                let string = db.special(SpecialType::String);
                if left == string || right == string {
                    return value(string);
                }
                self.numeric_promotion(left, right)
                    .map(value)
                    .unwrap_or(ExprClass::Unknown)
            }
            MinusToken | AsteriskToken | SlashToken | PercentToken => {
                let left = self.type_at(data.left, depth);
                let right = self.type_at(data.right, depth);
                self.numeric_promotion(left, right)
                    .map(value)
                    .unwrap_or(ExprClass::Unknown)
            }
            AmpersandToken | BarToken | CaretToken => {
                let left = self.type_at(data.left, depth);
                let right = self.type_at(data.right, depth);
                let boolean = db.special(SpecialType::Boolean);
                if left == boolean && right == boolean {
                    return value(boolean);
                }
                if self.is_enum(left) {
                    return value(left);
                }
                self.numeric_promotion(left, right)
                    .map(value)
                    .unwrap_or(ExprClass::Unknown)
            }
            // `>>` arrives as `<<` too.
            LessThanLessThanToken => {
                let left = self.type_at(data.left, depth);
                self.unary_promotion(left, false)
                    .map(value)
                    .unwrap_or(ExprClass::Unknown)
            }
            DotDotToken => db
                .defs()
                .lookup_qualified("System.Range", 0)
                .map(|def| value(db.types().simple(def)))
                .unwrap_or(ExprClass::Unknown),
            _ => ExprClass::Unknown,
        }
    }

    /// `a ?? b`
    fn classify_coalesce(&self, left: NodeIndex, right: NodeIndex, depth: u32) -> ExprClass {
        let db = self.db();
        let left = self.type_at(left, depth);
        if left.is_error() || left == TypeId::NULL {
            return value(self.type_at(right, depth));
        }
        match db.nullable_underlying(left) {
            Some(underlying) => {
                let right = self.type_at(right, depth);
                if right == left {
                    value(left)
                } else {
                    value(underlying)
                }
            }
            None => value(left),
        }
    }

    fn classify_prefix_unary(&self, node: NodeIndex, depth: u32) -> ExprClass {
        let db = self.db();
        let Some(data) = self
            .tree
            .node(node)
            .and_then(|n| self.tree.arena.get_unary(n))
        else {
            return ExprClass::Unknown;
        };
        let operand = self.type_at(data.operand, depth);
        match data.operator {
            SyntaxKind::ExclamationToken => value(db.special(SpecialType::Boolean)),
            SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken => value(operand),
            SyntaxKind::MinusToken => self
                .unary_promotion(operand, true)
                .map(value)
                .unwrap_or(ExprClass::Unknown),
            SyntaxKind::PlusToken | SyntaxKind::TildeToken => {
                if self.is_enum(operand) {
                    return value(operand);
                }
                self.unary_promotion(operand, false)
                    .map(value)
                    .unwrap_or(ExprClass::Unknown)
            }
            _ => ExprClass::Unknown,
        }
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// `x?.M` looks `M` up on the underlying type of a nullable value.
    fn access_receiver(&self, ty: TypeId, operator: SyntaxKind) -> TypeId {
        if operator == SyntaxKind::QuestionDotToken
            && let Some(underlying) = self.db().nullable_underlying(ty)
        {
            return underlying;
        }
        ty
    }

    /// Type of field, property, event or constant `name` on `ty` or one of
    /// its supertypes, with the owner's type arguments applied.
    fn member_type(&self, ty: TypeId, name: Atom) -> Option<TypeId> {
        self.find_member(ty, |kind, member_name| {
            kind != MemberKind::Indexer && member_name == name
        })
    }

    fn indexer_type(&self, ty: TypeId) -> Option<TypeId> {
        self.find_member(ty, |kind, _| kind == MemberKind::Indexer)
    }

    fn find_member(&self, ty: TypeId, accept: impl Fn(MemberKind, Atom) -> bool) -> Option<TypeId> {
        let db = self.db();
        std::iter::once(ty)
            .chain(all_supertypes(db, ty))
            .find_map(|candidate| {
                let (def, info) = db.named_def(candidate)?;
                let member = info.members.iter().find(|m| accept(m.kind, m.name))?;
                let subst = Substitution::for_type_args(def, &type_args_of(db, candidate));
                Some(substitute(db, member.ty, &subst))
            })
    }

    /// Members of the enclosing types, innermost first.
    fn lookup_enclosing_member(&self, scope: &Scope, name: Atom) -> Option<TypeId> {
        scope
            .types
            .iter()
            .find_map(|&def| self.member_type(self.instance_type(def), name))
    }

    /// `def` instantiated with its own type parameters.
    fn instance_type(&self, def: DefId) -> TypeId {
        let db = self.db();
        let arity = db.def(def).map(|info| info.arity()).unwrap_or(0);
        let args: TypeArgs = (0..arity)
            .map(|index| db.types().type_param(TypeParamRef::of_type(def, index)))
            .collect();
        db.types().named(def, args)
    }

    fn this_type(&self, node: NodeIndex) -> Option<TypeId> {
        self.scope_at(node)
            .enclosing_type()
            .map(|def| self.instance_type(def))
    }

    fn is_enum(&self, ty: TypeId) -> bool {
        self.db()
            .named_def(ty)
            .is_some_and(|(_, info)| info.kind == DefKind::Enum)
    }

    fn delegate_invoke(&self, ty: TypeId) -> Option<(&'c MethodInfo, Substitution)> {
        let db = self.db();
        let (def, info) = db.named_def(ty)?;
        let invoke = db.method(info.invoke?)?;
        Some((invoke, Substitution::for_type_args(def, &type_args_of(db, ty))))
    }

    /// Parameter count of the delegate type `ty`.
    fn delegate_arity(&self, ty: TypeId) -> Option<usize> {
        self.delegate_invoke(ty)
            .map(|(invoke, _)| invoke.params.len())
    }

    /// `T` of `Task<T>`/`ValueTask<T>`; `void` for `Task`/`ValueTask`.
    fn awaited_type(&self, ty: TypeId) -> Option<TypeId> {
        let db = self.db();
        let (def, _) = db.named_def(ty)?;
        let defs = db.defs();
        for name in ["System.Threading.Tasks.Task", "System.Threading.Tasks.ValueTask"] {
            if defs.lookup_qualified(name, 1) == Some(def) {
                return type_args_of(db, ty).first().copied();
            }
            if defs.lookup_qualified(name, 0) == Some(def) {
                return Some(TypeId::VOID);
            }
        }
        None
    }

    fn explicit_type_args(&self, name: NodeIndex) -> TypeArgs {
        let Some(n) = self.tree.node(name) else {
            return TypeArgs::new();
        };
        if n.kind != NodeKind::GenericName {
            return TypeArgs::new();
        }
        match self.tree.arena.get_generic_name(n) {
            Some(data) => data
                .type_arguments
                .iter()
                .map(|&arg| self.resolve_type_syntax(arg))
                .collect(),
            None => TypeArgs::new(),
        }
    }

    // =========================================================================
    // Numeric promotion
    // =========================================================================

    fn numeric_promotion(&self, left: TypeId, right: TypeId) -> Option<TypeId> {
        let db = self.db();
        if left.is_error() {
            return (!right.is_error()).then_some(right);
        }
        if right.is_error() {
            return Some(left);
        }
        let (Some(l), Some(r)) = (db.special_of(left), db.special_of(right)) else {
            // Enum arithmetic and user-defined operators keep the left type.
            return Some(left);
        };
        if !l.is_numeric() || !r.is_numeric() {
            return Some(left);
        }
        use SpecialType::*;
        let signed_small = |s: SpecialType| matches!(s, SByte | Int16 | Int32);
        let result = if l == Decimal || r == Decimal {
            Decimal
        } else if l == Double || r == Double {
            Double
        } else if l == Single || r == Single {
            Single
        } else if l == UInt64 || r == UInt64 {
            UInt64
        } else if l == Int64 || r == Int64 {
            Int64
        } else if (l == UInt32 && signed_small(r)) || (r == UInt32 && signed_small(l)) {
            Int64
        } else if l == UInt32 || r == UInt32 {
            UInt32
        } else if l == IntPtr || r == IntPtr {
            IntPtr
        } else if l == UIntPtr || r == UIntPtr {
            UIntPtr
        } else {
            Int32
        };
        Some(db.special(result))
    }

    fn unary_promotion(&self, operand: TypeId, negate: bool) -> Option<TypeId> {
        let db = self.db();
        if operand.is_error() {
            return None;
        }
        use SpecialType::*;
        let promoted = match db.special_of(operand) {
            Some(SByte | Byte | Int16 | UInt16 | Char) => Int32,
            Some(UInt32) if negate => Int64,
            _ => return Some(operand),
        };
        Some(db.special(promoted))
    }

    // =========================================================================
    // Locals and parameters
    // =========================================================================

    /// Type of the local, parameter or range variable `name` visible at
    /// `node`, stopping at the enclosing type declaration.
    fn lookup_local(&self, node: NodeIndex, name: Atom, depth: u32) -> Option<TypeId> {
        let arena = &self.tree.arena;
        let position = self.tree.span(node).start;
        let mut child = node;

        for ancestor in self.tree.ancestors(node) {
            let n = self.tree.node(ancestor)?;
            let found = match n.kind {
                NodeKind::Block => arena
                    .get_list(n)
                    .and_then(|list| self.declared_in_statements(&list.items, name, position, depth)),
                NodeKind::SwitchSection => arena.get_switch_section(n).and_then(|section| {
                    section
                        .labels
                        .iter()
                        .find_map(|&label| self.declared_in(label, name, position, depth))
                        .or_else(|| {
                            self.declared_in_statements(&section.statements, name, position, depth)
                        })
                }),
                NodeKind::ForStatement
                | NodeKind::UsingStatement
                | NodeKind::FixedStatement
                | NodeKind::WhileStatement
                | NodeKind::DoStatement
                | NodeKind::LockStatement => arena.get_loop(n).and_then(|data| {
                    [data.declaration, data.condition]
                        .into_iter()
                        .chain(data.initializers.iter().copied())
                        .filter(|part| part.is_some() && *part != child)
                        .find_map(|part| self.declared_in(part, name, position, depth))
                }),
                NodeKind::IfStatement => arena
                    .get_conditional(n)
                    .filter(|data| data.condition != child)
                    .and_then(|data| self.declared_in(data.condition, name, position, depth)),
                NodeKind::ForEachStatement => arena.get_for_each(n).and_then(|data| {
                    if data.name != name || child == data.expression {
                        return None;
                    }
                    Some(self.foreach_variable_type(data.type_node, data.expression, depth))
                }),
                NodeKind::CatchClause => arena
                    .get_catch(n)
                    .filter(|data| data.name == name)
                    .map(|data| self.resolve_type_syntax(data.type_node)),
                NodeKind::SwitchArm => arena.get_switch_arm(n).and_then(|data| {
                    (child != data.pattern)
                        .then(|| self.declared_in(data.pattern, name, position, depth))
                        .flatten()
                }),
                NodeKind::Lambda | NodeKind::AnonymousMethod => {
                    arena.get_lambda(n).and_then(|data| {
                        let index = data.parameters.iter().position(|&p| {
                            self.tree
                                .node(p)
                                .and_then(|p| arena.get_parameter(p))
                                .is_some_and(|p| p.name == name)
                        })?;
                        Some(self.lambda_parameter_type(ancestor, index, depth))
                    })
                }
                NodeKind::MethodDeclaration
                | NodeKind::ConstructorDeclaration
                | NodeKind::DestructorDeclaration
                | NodeKind::OperatorDeclaration
                | NodeKind::ConversionOperatorDeclaration
                | NodeKind::LocalFunctionStatement => arena
                    .get_method(n)
                    .and_then(|data| self.parameter_type(&data.parameters, name)),
                NodeKind::IndexerDeclaration => arena
                    .get_property(n)
                    .and_then(|data| self.parameter_type(&data.parameters, name)),
                NodeKind::Accessor => self.accessor_value_type(ancestor, name),
                kind if kind.category() == isx_parser::NodeCategory::TypeDecl => {
                    // Primary constructor parameters, then stop.
                    return arena
                        .get_type_decl(n)
                        .and_then(|data| self.parameter_type(&data.parameters, name));
                }
                NodeKind::DelegateDeclaration => return None,
                _ => None,
            };
            if found.is_some() {
                return found;
            }
            child = ancestor;
        }
        None
    }

    /// Declarations among the statements of a block that start before
    /// `position`. Nested blocks and function bodies are not searched.
    fn declared_in_statements(
        &self,
        statements: &[NodeIndex],
        name: Atom,
        position: u32,
        depth: u32,
    ) -> Option<TypeId> {
        statements
            .iter()
            .take_while(|&&stmt| self.tree.span(stmt).start <= position)
            .filter(|&&stmt| !self.tree.kind(stmt).is_some_and(is_scope_boundary))
            .find_map(|&stmt| self.declared_in(stmt, name, position, depth))
    }

    fn declared_in(&self, root: NodeIndex, name: Atom, position: u32, depth: u32) -> Option<TypeId> {
        let arena = &self.tree.arena;
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            let Some(n) = self.tree.node(current) else {
                continue;
            };
            match n.kind {
                NodeKind::LocalDeclaration => {
                    if let Some(decl) = arena.get_variable_declaration(n) {
                        for &declarator in &decl.declarators {
                            let Some(d) = self
                                .tree
                                .node(declarator)
                                .and_then(|d| arena.get_variable_declarator(d))
                            else {
                                continue;
                            };
                            // `var x = x.` does not see itself.
                            if d.name == name
                                && d.name_pos < position
                                && !self.tree.span(declarator).contains(position)
                            {
                                return Some(self.declarator_type(
                                    decl.type_node,
                                    d.initializer,
                                    depth,
                                ));
                            }
                        }
                    }
                }
                NodeKind::DeclarationExpression | NodeKind::DeclarationPattern => {
                    if let Some(data) = arena.get_declaration(n)
                        && data.name == name
                        && data.name_pos < position
                    {
                        return Some(self.declaration_type(current, data.type_node, depth));
                    }
                }
                NodeKind::LocalFunctionStatement => continue,
                _ => {}
            }
            for child in arena.children(current) {
                if self.tree.kind(child).is_some_and(is_scope_boundary) {
                    continue;
                }
                stack.push(child);
            }
        }
        None
    }

    fn is_var(&self, type_node: NodeIndex) -> bool {
        self.tree.kind(type_node) == Some(NodeKind::IdentifierName)
            && self.tree.node_text(type_node) == "var"
    }

    fn declarator_type(&self, type_node: NodeIndex, initializer: NodeIndex, depth: u32) -> TypeId {
        if self.is_var(type_node) {
            let ty = self.type_at(initializer, depth);
            return if ty == TypeId::NULL { TypeId::ERROR } else { ty };
        }
        self.resolve_type_syntax(type_node)
    }

    /// Type of `T x` / `var x` in a pattern or `out` argument.
    fn declaration_type(&self, node: NodeIndex, type_node: NodeIndex, depth: u32) -> TypeId {
        if type_node.is_some() && !self.is_var(type_node) {
            return self.resolve_type_syntax(type_node);
        }
        let parent = self.tree.parent(node);
        if self.tree.kind(parent) == Some(NodeKind::Argument) {
            return self.argument_parameter_type(parent, depth).unwrap_or(TypeId::ERROR);
        }
        // `e is var x`
        let is_pattern = self.tree.ancestors(node).find(|&a| {
            self.tree.kind(a) == Some(NodeKind::IsPatternExpression)
        });
        match is_pattern.and_then(|p| self.tree.node(p)).and_then(|p| self.tree.arena.get_binary(p)) {
            Some(data) => self.type_at(data.left, depth),
            None => TypeId::ERROR,
        }
    }

    /// Parameter type that the `Argument` node binds to.
    fn argument_parameter_type(&self, argument: NodeIndex, depth: u32) -> Option<TypeId> {
        let db = self.db();
        let invocation = self.tree.parent(argument);
        let data = self
            .tree
            .node(invocation)
            .filter(|n| n.kind == NodeKind::Invocation)
            .and_then(|n| self.tree.arena.get_invocation(n))?;
        let position = data.arguments.iter().position(|&a| a == argument)?;
        let call = self.resolve_call_at(invocation, depth, false)?;
        let info = db.method(call.method)?;
        let param = parameter_at(info.params.get(call.receiver_offset..)?, position)?;
        Some(substitute(db, param.ty, &call.subst))
    }

    fn foreach_variable_type(&self, type_node: NodeIndex, expression: NodeIndex, depth: u32) -> TypeId {
        if !self.is_var(type_node) {
            return self.resolve_type_syntax(type_node);
        }
        let collection = self.type_at(expression, depth);
        enumerable_element(self.db(), collection).unwrap_or(TypeId::ERROR)
    }

    fn parameter_type(&self, parameters: &[NodeIndex], name: Atom) -> Option<TypeId> {
        parameters.iter().find_map(|&p| {
            let data = self
                .tree
                .node(p)
                .and_then(|n| self.tree.arena.get_parameter(n))
                .filter(|data| data.name == name)?;
            Some(self.resolve_type_syntax(data.type_node))
        })
    }

    /// `value` inside `set`, `init`, `add` and `remove` accessors.
    fn accessor_value_type(&self, accessor: NodeIndex, name: Atom) -> Option<TypeId> {
        if name.as_str() != "value" {
            return None;
        }
        let arena = &self.tree.arena;
        let keyword = self
            .tree
            .node(accessor)
            .and_then(|n| arena.get_accessor(n))?
            .keyword;
        if !matches!(keyword.as_str(), "set" | "init" | "add" | "remove") {
            return None;
        }
        let property = self
            .tree
            .node(self.tree.parent(accessor))
            .and_then(|n| arena.get_property(n))?;
        Some(self.resolve_type_syntax(property.type_node))
    }

    // =========================================================================
    // Lambdas
    // =========================================================================

    /// Type of parameter `index` of a lambda: declared, or taken from the
    /// delegate type the lambda converts to.
    fn lambda_parameter_type(&self, lambda: NodeIndex, index: usize, depth: u32) -> TypeId {
        let arena = &self.tree.arena;
        let Some(data) = self.tree.node(lambda).and_then(|n| arena.get_lambda(n)) else {
            return TypeId::ERROR;
        };
        let declared = data
            .parameters
            .get(index)
            .and_then(|&p| self.tree.node(p))
            .and_then(|p| arena.get_parameter(p))
            .map(|p| p.type_node)
            .filter(|t| t.is_some());
        if let Some(type_node) = declared {
            return self.resolve_type_syntax(type_node);
        }

        let parent = self.tree.parent(lambda);
        match self.tree.kind(parent) {
            Some(NodeKind::Argument) => self.lambda_argument_parameter(parent, index, depth),
            _ => {
                let Some(target) = self.target_type(lambda, depth) else {
                    return TypeId::ERROR;
                };
                let db = self.db();
                match self.delegate_invoke(target) {
                    Some((invoke, subst)) => invoke
                        .params
                        .get(index)
                        .map(|p| substitute(db, p.ty, &subst))
                        .unwrap_or(TypeId::ERROR),
                    None => TypeId::ERROR,
                }
            }
        }
    }

    /// `list.Select(x => ...)`: bind the call without lambda bodies, then
    /// read parameter `index` of the delegate the lambda's slot expects.
    fn lambda_argument_parameter(&self, argument: NodeIndex, index: usize, depth: u32) -> TypeId {
        let db = self.db();
        let invocation = self.tree.parent(argument);
        let Some(data) = self
            .tree
            .node(invocation)
            .filter(|n| n.kind == NodeKind::Invocation)
            .and_then(|n| self.tree.arena.get_invocation(n))
        else {
            return TypeId::ERROR;
        };
        let Some(position) = data.arguments.iter().position(|&a| a == argument) else {
            return TypeId::ERROR;
        };
        let Some(call) = self.resolve_call_at(invocation, depth, false) else {
            return TypeId::ERROR;
        };
        let Some(info) = db.method(call.method) else {
            return TypeId::ERROR;
        };
        let Some(param) = info
            .params
            .get(call.receiver_offset..)
            .and_then(|params| parameter_at(params, position))
        else {
            return TypeId::ERROR;
        };
        let delegate = substitute(db, param.ty, &call.subst);
        let Some((invoke, subst)) = self.delegate_invoke(delegate) else {
            return TypeId::ERROR;
        };
        let Some(lambda_param) = invoke.params.get(index) else {
            return TypeId::ERROR;
        };
        let ty = substitute(db, lambda_param.ty, &subst);
        let method = call.method;
        if mentions_type_param(db, ty, &|p| p.is_method_param_of(method)) {
            trace!("lambda parameter depends on an uninferred type argument");
            return TypeId::ERROR;
        }
        ty
    }

    /// Type a lambda body produces, wrapped in `Task<T>` for async lambdas.
    fn lambda_return_type(&self, lambda: NodeIndex, depth: u32) -> TypeId {
        let db = self.db();
        let Some(n) = self.tree.node(lambda) else {
            return TypeId::ERROR;
        };
        let Some(data) = self.tree.arena.get_lambda(n) else {
            return TypeId::ERROR;
        };
        let ty = if self.tree.kind(data.body) == Some(NodeKind::Block) {
            self.returned_type(data.body, depth)
        } else {
            self.type_at(data.body, depth)
        };
        if !n.has_flag(node_flags::ASYNC) || ty.is_error() {
            return ty;
        }
        let task = if ty == TypeId::VOID {
            db.defs()
                .lookup_qualified("System.Threading.Tasks.Task", 0)
                .map(|def| db.types().simple(def))
        } else {
            db.defs()
                .lookup_qualified("System.Threading.Tasks.Task", 1)
                .map(|def| db.types().named(def, [ty].into_iter().collect()))
        };
        task.unwrap_or(TypeId::ERROR)
    }

    /// Type of the first typed `return e;` in a block body, `void` if there
    /// is none.
    fn returned_type(&self, body: NodeIndex, depth: u32) -> TypeId {
        let arena = &self.tree.arena;
        let mut stack = vec![body];
        let mut saw_return = false;
        while let Some(current) = stack.pop() {
            let Some(n) = self.tree.node(current) else {
                continue;
            };
            if n.kind == NodeKind::ReturnStatement {
                saw_return = true;
                if let Some(data) = arena.get_unary(n)
                    && data.operand.is_some()
                {
                    let ty = self.type_at(data.operand, depth);
                    if !ty.is_error() && ty != TypeId::NULL {
                        return ty;
                    }
                }
                continue;
            }
            if current != body && (n.kind.is_function_like()) {
                continue;
            }
            // Children pushed in reverse so the first return is found first.
            let mut children = arena.children(current);
            children.reverse();
            stack.extend(children);
        }
        if saw_return { TypeId::ERROR } else { TypeId::VOID }
    }

    /// Type an expression converts to from its context: the declared type of
    /// a variable, the left side of an assignment, or a cast.
    fn target_type(&self, node: NodeIndex, depth: u32) -> Option<TypeId> {
        let arena = &self.tree.arena;
        let parent = self.tree.parent(node);
        let n = self.tree.node(parent)?;
        let target = match n.kind {
            NodeKind::VariableDeclarator => {
                let declaration = self.tree.node(self.tree.parent(parent))?;
                let data = arena.get_variable_declaration(declaration)?;
                (!self.is_var(data.type_node)).then(|| self.resolve_type_syntax(data.type_node))
            }
            NodeKind::AssignmentExpression => {
                let data = arena.get_binary(n)?;
                (data.right == node).then(|| self.type_at(data.left, depth))
            }
            NodeKind::CastExpression => {
                let data = arena.get_type_operand(n)?;
                Some(self.resolve_type_syntax(data.type_node))
            }
            NodeKind::Argument => self.argument_parameter_type(parent, depth),
            NodeKind::PropertyDeclaration => {
                let data = arena.get_property(n)?;
                Some(self.resolve_type_syntax(data.type_node))
            }
            _ => None,
        };
        target.filter(|ty| !ty.is_error())
    }

    // =========================================================================
    // Calls
    // =========================================================================

    fn resolve_call_at(
        &self,
        invocation: NodeIndex,
        depth: u32,
        include_lambdas: bool,
    ) -> Option<ResolvedCall> {
        if depth > MAX_EXPRESSION_DEPTH {
            return None;
        }
        let depth = depth + 1;
        let data = self
            .tree
            .node(invocation)
            .filter(|n| n.kind == NodeKind::Invocation)
            .and_then(|n| self.tree.arena.get_invocation(n))?;
        let arguments: Vec<NodeIndex> = data
            .arguments
            .iter()
            .map(|&a| {
                self.tree
                    .node(a)
                    .and_then(|n| self.tree.arena.get_argument(n))
                    .map(|d| d.expression)
                    .unwrap_or(a)
            })
            .collect();

        let (name_node, receiver) = self.callee(data.expression, depth)?;
        let name = self.tree.simple_name(name_node)?;
        let explicit = self.explicit_type_args(name_node);

        let instance = self.method_candidates(invocation, name, receiver);
        let chosen = self.select_overload(&instance, &arguments, &explicit, depth);
        let (candidates, index) = match chosen {
            Some(index) => (instance, index),
            None => {
                let Callee::Value(receiver) = receiver else {
                    return None;
                };
                let extensions = self.extension_candidates(invocation, name, receiver);
                let index = self.select_overload(&extensions, &arguments, &explicit, depth)?;
                (extensions, index)
            }
        };
        let candidate = candidates.get(index)?;
        let subst = self.infer(candidate, &arguments, &explicit, include_lambdas, depth);
        Some(ResolvedCall {
            method: candidate.method,
            subst,
            receiver_offset: candidate.receiver_offset,
        })
    }

    /// Method name node of a callee and what the method is looked up on.
    fn callee(&self, expression: NodeIndex, depth: u32) -> Option<(NodeIndex, Callee)> {
        let n = self.tree.node(expression)?;
        match n.kind {
            NodeKind::IdentifierName | NodeKind::GenericName => {
                Some((expression, Callee::Enclosing))
            }
            NodeKind::MemberAccess => {
                let data = self.tree.arena.get_member_access(n)?;
                if data.name.is_none() {
                    return None;
                }
                let receiver = match self.classify(data.expression, depth) {
                    ExprClass::Value(ty) if !ty.is_error() => {
                        Callee::Value(self.access_receiver(ty, data.operator))
                    }
                    ExprClass::Type(ty) => Callee::Type(ty),
                    _ => return None,
                };
                Some((data.name, receiver))
            }
            _ => None,
        }
    }

    /// Methods named `name` found by ordinary member lookup.
    fn method_candidates(&self, at: NodeIndex, name: Atom, receiver: Callee) -> Vec<Candidate> {
        let db = self.db();
        let collect = |ty: TypeId, static_only: bool| -> Vec<Candidate> {
            std::iter::once(ty)
                .chain(all_supertypes(db, ty))
                .filter_map(|candidate| {
                    let (def, info) = db.named_def(candidate)?;
                    Some((def, info, type_args_of(db, candidate)))
                })
                .flat_map(|(def, info, args)| {
                    info.methods.iter().filter_map(move |&method| {
                        let m = db.method(method)?;
                        if m.name != name
                            || m.flags.contains(MethodFlags::CONSTRUCTOR)
                            || (static_only && !m.is_static())
                        {
                            return None;
                        }
                        Some(Candidate {
                            method,
                            seed: Substitution::for_type_args(def, &args),
                            receiver_offset: 0,
                        })
                    })
                })
                .collect()
        };
        match receiver {
            Callee::Value(ty) => collect(ty, false),
            Callee::Type(ty) => collect(ty, true),
            Callee::Enclosing => self
                .scope_at(at)
                .types
                .iter()
                .map(|&def| collect(self.instance_type(def), false))
                .find(|found| !found.is_empty())
                .unwrap_or_default(),
        }
    }

    /// Extension methods named `name` in scope at `at` whose receiver
    /// parameter accepts `receiver`.
    fn extension_candidates(&self, at: NodeIndex, name: Atom, receiver: TypeId) -> Vec<Candidate> {
        let db = self.db();
        let imported = self.scope_at(at).imported_namespaces();
        self.compilation
            .extension_methods_named(name)
            .filter(|&method| {
                db.method(method)
                    .is_some_and(|m| imported.contains(&db.defs().namespace_of(m.container)))
            })
            .filter_map(|method| {
                let seed = match_extension_receiver(db, receiver, method).ok()?;
                Some(Candidate {
                    method,
                    seed,
                    receiver_offset: 1,
                })
            })
            .collect()
    }

    /// Index of the best candidate for `arguments`. Ties keep declaration
    /// order.
    fn select_overload(
        &self,
        candidates: &[Candidate],
        arguments: &[NodeIndex],
        explicit: &[TypeId],
        depth: u32,
    ) -> Option<usize> {
        let db = self.db();
        let mut best: Option<(usize, i32)> = None;
        'candidates: for (index, candidate) in candidates.iter().enumerate() {
            let Some(info) = db.method(candidate.method) else {
                continue;
            };
            if !explicit.is_empty() && info.type_params.len() != explicit.len() {
                continue;
            }
            let Some(params) = info.params.get(candidate.receiver_offset..) else {
                continue;
            };
            let has_params_array = params
                .last()
                .is_some_and(|p| p.modifier == ParamModifier::Params);
            let required = params
                .iter()
                .filter(|p| !p.has_default && p.modifier != ParamModifier::Params)
                .count();
            if arguments.len() < required || (arguments.len() > params.len() && !has_params_array)
            {
                continue;
            }

            let mut score = 0i32;
            for (position, &argument) in arguments.iter().enumerate() {
                let Some(param) = parameter_at(params, position) else {
                    continue 'candidates;
                };
                let param_ty = substitute(db, param.ty, &candidate.seed);
                if let Some(lambda_arity) = self.lambda_arity(argument) {
                    match self.delegate_arity(param_ty) {
                        Some(arity) if arity == lambda_arity => score += 2,
                        Some(_) => continue 'candidates,
                        None => {}
                    }
                    continue;
                }
                let method = candidate.method;
                if mentions_type_param(db, param_ty, &|p| p.is_method_param_of(method)) {
                    continue;
                }
                if self.is_untyped_declaration(argument) {
                    continue;
                }
                let argument_ty = self.type_at(argument, depth);
                if argument_ty.is_error() {
                    continue;
                }
                if is_implicitly_convertible(db, argument_ty, param_ty) {
                    score += 1;
                } else {
                    score -= 1;
                }
            }
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((index, score));
            }
        }
        best.map(|(index, _)| index)
    }

    /// `out var x`, typed by the call it appears in.
    fn is_untyped_declaration(&self, argument: NodeIndex) -> bool {
        self.tree
            .node(argument)
            .filter(|n| n.kind == NodeKind::DeclarationExpression)
            .and_then(|n| self.tree.arena.get_declaration(n))
            .is_some_and(|data| data.type_node.is_none() || self.is_var(data.type_node))
    }

    /// Parameter count of a lambda or anonymous method argument.
    fn lambda_arity(&self, argument: NodeIndex) -> Option<usize> {
        let n = self.tree.node(argument)?;
        if !matches!(n.kind, NodeKind::Lambda | NodeKind::AnonymousMethod) {
            return None;
        }
        self.tree.arena.get_lambda(n).map(|data| data.parameters.len())
    }

    /// Infer the method type arguments of `candidate` from the arguments.
    /// Lambda bodies take part only when `include_lambdas` is set; typing a
    /// lambda parameter binds the call without them.
    fn infer(
        &self,
        candidate: &Candidate,
        arguments: &[NodeIndex],
        explicit: &[TypeId],
        include_lambdas: bool,
        depth: u32,
    ) -> Substitution {
        let db = self.db();
        let method = candidate.method;
        let mut subst = candidate.seed.clone();
        let Some(info) = db.method(method) else {
            return subst;
        };
        if info.type_params.is_empty() {
            return subst;
        }
        if explicit.len() == info.type_params.len() {
            for (index, &ty) in explicit.iter().enumerate() {
                subst.insert(TypeParamRef::of_method(method, index as u16), ty);
            }
            return subst;
        }
        let Some(params) = info.params.get(candidate.receiver_offset..) else {
            return subst;
        };

        let mut ctx = InferenceContext::new(db, method);
        for (param, ty) in candidate.seed.iter() {
            if let Some(var) = ctx.var_for(param) {
                let _ = ctx.unify_var_type(var, ty);
            }
        }

        let mut lambdas = Vec::new();
        for (position, &argument) in arguments.iter().enumerate() {
            let Some(param) = parameter_at(params, position) else {
                continue;
            };
            let pattern = substitute(db, param.ty, &candidate.seed);
            if self.lambda_arity(argument).is_some() {
                lambdas.push((argument, pattern));
                continue;
            }
            if self.is_untyped_declaration(argument) {
                continue;
            }
            let actual = self.type_at(argument, depth);
            if actual.is_error() || actual == TypeId::NULL {
                continue;
            }
            let outcome = match db.lookup(pattern) {
                TypeData::Named { def, .. } => match instantiations_of(db, actual, def).as_slice() {
                    [single] => ctx.unify(pattern, *single),
                    _ => ctx.unify(pattern, actual),
                },
                _ => ctx.unify(pattern, actual),
            };
            if let Err(error) = outcome {
                trace!(%error, "argument does not constrain inference");
            }
        }

        if include_lambdas {
            for (lambda, pattern) in lambdas {
                let Some((invoke, delegate_subst)) = self.delegate_invoke(pattern) else {
                    continue;
                };
                let known = ctx.substitution();
                let inputs_known = invoke.params.iter().all(|p| {
                    let ty = substitute(db, substitute(db, p.ty, &delegate_subst), &known);
                    !mentions_type_param(db, ty, &|param| param.is_method_param_of(method))
                });
                if !inputs_known {
                    continue;
                }
                let return_pattern = substitute(db, invoke.return_type, &delegate_subst);
                let body = self.lambda_return_type(lambda, depth);
                if body.is_error() || body == TypeId::NULL {
                    continue;
                }
                if let Err(error) = ctx.unify(return_pattern, body) {
                    trace!(%error, "lambda body does not constrain inference");
                }
            }
        }

        let mut inferred = ctx.substitution();
        inferred.extend_from(&subst);
        inferred
    }
}

/// What a called method is looked up on.
#[derive(Clone, Copy, Debug)]
enum Callee {
    Value(TypeId),
    Type(TypeId),
    /// A simple name: the enclosing types.
    Enclosing,
}

/// Parameter receiving argument `position`, honoring a trailing `params`.
fn parameter_at(params: &[ParameterInfo], position: usize) -> Option<&ParameterInfo> {
    params.get(position).or_else(|| {
        params
            .last()
            .filter(|p| p.modifier == ParamModifier::Params)
    })
}

/// Nodes whose declarations are not visible to the statements after them.
fn is_scope_boundary(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Block
            | NodeKind::Lambda
            | NodeKind::AnonymousMethod
            | NodeKind::LocalFunctionStatement
            | NodeKind::SwitchSection
            | NodeKind::SwitchArm
            | NodeKind::CatchClause
            | NodeKind::ForStatement
            | NodeKind::ForEachStatement
            | NodeKind::WhileStatement
            | NodeKind::DoStatement
            | NodeKind::UsingStatement
            | NodeKind::FixedStatement
    )
}

fn value(ty: TypeId) -> ExprClass {
    if ty.is_error() {
        ExprClass::Unknown
    } else {
        ExprClass::Value(ty)
    }
}

fn type_class(ty: TypeId) -> ExprClass {
    if ty.is_error() {
        ExprClass::Unknown
    } else {
        ExprClass::Type(ty)
    }
}

fn from_resolution(resolution: Resolution) -> ExprClass {
    match resolution {
        Resolution::Type(ty) => type_class(ty),
        Resolution::Namespace(namespace) => ExprClass::Namespace(namespace),
        Resolution::Unresolved => ExprClass::Unknown,
    }
}
