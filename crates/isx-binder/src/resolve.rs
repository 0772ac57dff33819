//! C# name lookup for type syntax.
//!
//! Lookup order for a simple name `N<A1..Ak>`:
//! 1. type parameters of enclosing methods, innermost first
//! 2. type parameters and nested types of enclosing types (nested types are
//!    also searched through the base chain)
//! 3. for each namespace level, innermost first: a type `N` in that
//!    namespace, a namespace `N` below it, a using alias `N`, and types named
//!    `N` in the namespaces imported at that level
//!
//! Keyword types go through `SpecialType::from_keyword`. Names that resolve
//! to nothing produce `TypeId::ERROR`; callers never fail on them.

use crate::scope::{AliasTarget, NamespaceLevel, Scope, join_namespace};
use isx_common::Atom;
use isx_common::limits::MAX_EXPRESSION_DEPTH;
use isx_parser::{NodeIndex, NodeKind, SyntaxTree};
use isx_solver::hierarchy::base_chain;
use isx_solver::{
    DefId, SpecialType, TypeArgs, TypeData, TypeDatabase, TypeId, TypeParamRef, is_value_type,
};
use tracing::trace;

/// What a name denotes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Type(TypeId),
    Namespace(Atom),
    Unresolved,
}

impl Resolution {
    pub fn as_type(self) -> Option<TypeId> {
        match self {
            Resolution::Type(ty) => Some(ty),
            _ => None,
        }
    }
}

pub struct TypeResolver<'a> {
    pub db: &'a dyn TypeDatabase,
    pub tree: &'a SyntaxTree,
    pub scope: &'a Scope,
}

impl<'a> TypeResolver<'a> {
    pub fn new(db: &'a dyn TypeDatabase, tree: &'a SyntaxTree, scope: &'a Scope) -> Self {
        TypeResolver { db, tree, scope }
    }

    /// Resolve type syntax to a type; `ERROR` when it names nothing.
    pub fn resolve_type(&self, node: NodeIndex) -> TypeId {
        self.resolve_type_at(node, 0)
    }

    fn resolve_type_at(&self, node: NodeIndex, depth: u32) -> TypeId {
        if depth > MAX_EXPRESSION_DEPTH {
            return TypeId::ERROR;
        }
        let Some(n) = self.tree.node(node) else {
            return TypeId::ERROR;
        };
        let arena = &self.tree.arena;
        match n.kind {
            NodeKind::PredefinedType => self.keyword_type(self.tree.node_text(node)),
            NodeKind::IdentifierName
            | NodeKind::GenericName
            | NodeKind::QualifiedName
            | NodeKind::AliasQualifiedName => match self.resolve_name_at(node, None, depth) {
                Resolution::Type(ty) => ty,
                _ => {
                    let text = self.tree.node_text(node);
                    // Contextual keyword types, unless shadowed by a declaration.
                    match text {
                        "dynamic" => TypeId::DYNAMIC,
                        "nint" | "nuint" => self.keyword_type(text),
                        _ => {
                            trace!(name = text, "unresolved type name");
                            TypeId::ERROR
                        }
                    }
                }
            },
            NodeKind::ArrayType => {
                let Some(data) = arena.get_wrapped_type(n) else {
                    return TypeId::ERROR;
                };
                let element = self.resolve_type_at(data.element, depth + 1);
                self.db.types().array(element, data.rank)
            }
            NodeKind::NullableType => {
                let Some(data) = arena.get_wrapped_type(n) else {
                    return TypeId::ERROR;
                };
                let element = self.resolve_type_at(data.element, depth + 1);
                self.make_nullable(element)
            }
            NodeKind::RefType => arena
                .get_wrapped_type(n)
                .map(|data| self.resolve_type_at(data.element, depth + 1))
                .unwrap_or(TypeId::ERROR),
            NodeKind::TupleType => {
                let Some(list) = arena.get_list(n) else {
                    return TypeId::ERROR;
                };
                let elements: TypeArgs = list
                    .items
                    .iter()
                    .map(|&item| {
                        let element_type = self
                            .tree
                            .node(item)
                            .and_then(|e| arena.get_declaration(e))
                            .map(|d| d.type_node)
                            .unwrap_or(item);
                        self.resolve_type_at(element_type, depth + 1)
                    })
                    .collect();
                self.tuple_type(elements)
            }
            _ => TypeId::ERROR,
        }
    }

    /// `int`, `string`, `void`, ...
    pub fn keyword_type(&self, keyword: &str) -> TypeId {
        if keyword == "void" {
            return TypeId::VOID;
        }
        match SpecialType::from_keyword(keyword) {
            Some(special) => self.db.special(special),
            None => TypeId::ERROR,
        }
    }

    /// `T?`: `Nullable<T>` for value types, `T` itself otherwise.
    pub fn make_nullable(&self, ty: TypeId) -> TypeId {
        if !is_value_type(self.db, ty) || self.db.nullable_underlying(ty).is_some() {
            return ty;
        }
        match self.db.well_known().def(SpecialType::Nullable) {
            Some(nullable) => self.db.types().named(nullable, [ty].into_iter().collect()),
            None => ty,
        }
    }

    /// `(A, B)` as `System.ValueTuple<A, B>`.
    pub fn tuple_type(&self, elements: TypeArgs) -> TypeId {
        let arity = elements.len() as u16;
        match self.db.defs().lookup_qualified("System.ValueTuple", arity) {
            Some(def) => self.db.types().named(def, elements),
            None => TypeId::ERROR,
        }
    }

    /// Resolve a name node to a type or namespace.
    pub fn resolve_name(&self, node: NodeIndex) -> Resolution {
        self.resolve_name_at(node, None, 0)
    }

    /// Resolve an attribute name: `Obsolete` tries `ObsoleteAttribute` first.
    pub fn resolve_attribute(&self, node: NodeIndex) -> Option<DefId> {
        let resolution = match self.resolve_name_at(node, Some("Attribute"), 0) {
            Resolution::Type(ty) => Resolution::Type(ty),
            _ => self.resolve_name_at(node, None, 0),
        };
        let ty = resolution.as_type()?;
        self.db.named_def(ty).map(|(def, _)| def)
    }

    fn resolve_name_at(&self, node: NodeIndex, suffix: Option<&str>, depth: u32) -> Resolution {
        if depth > MAX_EXPRESSION_DEPTH {
            return Resolution::Unresolved;
        }
        let Some(n) = self.tree.node(node) else {
            return Resolution::Unresolved;
        };
        let arena = &self.tree.arena;
        match n.kind {
            NodeKind::IdentifierName | NodeKind::GenericName => {
                let Some(name) = self.tree.simple_name(node) else {
                    return Resolution::Unresolved;
                };
                let args = self.type_arguments(node, depth);
                let name = suffixed(name, suffix);
                self.lookup_simple(name, &args, depth)
            }
            NodeKind::QualifiedName => {
                let Some(data) = arena.get_qualified_name(n) else {
                    return Resolution::Unresolved;
                };
                let left = self.resolve_name_at(data.left, None, depth + 1);
                self.resolve_right(left, data.right, suffix, depth)
            }
            NodeKind::AliasQualifiedName => {
                let Some(data) = arena.get_qualified_name(n) else {
                    return Resolution::Unresolved;
                };
                let Some(alias) = self.tree.simple_name(data.left) else {
                    return Resolution::Unresolved;
                };
                let left = if alias.as_str() == "global" {
                    Resolution::Namespace(Atom::NONE)
                } else {
                    match self.lookup_alias(alias, depth) {
                        Some(ns @ Resolution::Namespace(_)) => ns,
                        _ => return Resolution::Unresolved,
                    }
                };
                self.resolve_right(left, data.right, suffix, depth)
            }
            _ => Resolution::Unresolved,
        }
    }

    /// `Left.Right` once `Left` is known.
    fn resolve_right(
        &self,
        left: Resolution,
        right: NodeIndex,
        suffix: Option<&str>,
        depth: u32,
    ) -> Resolution {
        let Some(name) = self.tree.simple_name(right) else {
            return Resolution::Unresolved;
        };
        let args = self.type_arguments(right, depth);
        let name = suffixed(name, suffix);
        match left {
            Resolution::Namespace(namespace) => self.member_of_namespace(namespace, name, &args),
            Resolution::Type(ty) => match self.db.named_def(ty) {
                Some((def, _)) => self
                    .nested_type(def, name, &args)
                    .map(Resolution::Type)
                    .unwrap_or(Resolution::Unresolved),
                None => Resolution::Unresolved,
            },
            Resolution::Unresolved => Resolution::Unresolved,
        }
    }

    /// A type or namespace directly inside `namespace`.
    pub fn member_of_namespace(&self, namespace: Atom, name: Atom, args: &[TypeId]) -> Resolution {
        let defs = self.db.defs();
        if let Some(def) = defs.lookup_type(namespace, name, args.len() as u16) {
            return Resolution::Type(self.instantiate(def, args));
        }
        if args.is_empty() {
            let nested = join_namespace(namespace, name.as_str());
            if defs.namespace_exists(nested) {
                return Resolution::Namespace(nested);
            }
        }
        Resolution::Unresolved
    }

    fn type_arguments(&self, node: NodeIndex, depth: u32) -> TypeArgs {
        let Some(n) = self.tree.node(node) else {
            return TypeArgs::new();
        };
        match self.tree.arena.get_generic_name(n) {
            Some(data) if n.kind == NodeKind::GenericName => data
                .type_arguments
                .iter()
                .map(|&arg| self.resolve_type_at(arg, depth + 1))
                .collect(),
            _ => TypeArgs::new(),
        }
    }

    fn instantiate(&self, def: DefId, args: &[TypeId]) -> TypeId {
        self.db.types().named(def, args.iter().copied().collect())
    }

    /// Simple-name lookup through the scope chain.
    pub fn lookup_simple(&self, name: Atom, args: &[TypeId], depth: u32) -> Resolution {
        let arity = args.len() as u16;

        if arity == 0 {
            for &method in &self.scope.methods {
                let Some(info) = self.db.method(method) else {
                    continue;
                };
                if let Some(index) = info.type_params.iter().position(|p| p.name == name) {
                    let param = TypeParamRef::of_method(method, index as u16);
                    return Resolution::Type(self.db.types().type_param(param));
                }
            }
        }

        for &def in &self.scope.types {
            if arity == 0
                && let Some(info) = self.db.def(def)
                && let Some(index) = info.type_params.iter().position(|p| p.name == name)
            {
                let param = TypeParamRef::of_type(def, index as u16);
                return Resolution::Type(self.db.types().type_param(param));
            }
            if let Some(ty) = self.nested_type(def, name, args) {
                return Resolution::Type(ty);
            }
        }

        for (index, level) in self.scope.levels.iter().enumerate() {
            let found = self.member_of_namespace(level.namespace, name, args);
            if found != Resolution::Unresolved {
                return found;
            }
            if arity == 0
                && let Some(target) = self.alias_at(level, index, name, depth)
            {
                return target;
            }
            if let Some(ty) = self.imported_type(level, name, args) {
                return Resolution::Type(ty);
            }
        }
        Resolution::Unresolved
    }

    /// Nested type of `def` or one of its base classes.
    fn nested_type(&self, def: DefId, name: Atom, args: &[TypeId]) -> Option<TypeId> {
        let defs = self.db.defs();
        let arity = args.len() as u16;
        if let Some(nested) = defs.lookup_nested(def, name, arity) {
            return Some(self.instantiate(nested, args));
        }
        let own = self.db.types().simple(def);
        base_chain(self.db, own).into_iter().skip(1).find_map(|base| {
            let (base_def, _) = self.db.named_def(base)?;
            defs.lookup_nested(base_def, name, arity)
                .map(|nested| self.instantiate(nested, args))
        })
    }

    fn imported_type(&self, level: &NamespaceLevel, name: Atom, args: &[TypeId]) -> Option<TypeId> {
        let arity = args.len() as u16;
        let mut found = level
            .imports
            .iter()
            .filter_map(|&namespace| self.db.defs().lookup_type(namespace, name, arity));
        let first = found.next()?;
        if found.any(|other| other != first) {
            trace!(name = %name, "ambiguous imported type, taking the first");
        }
        Some(self.instantiate(first, args))
    }

    fn lookup_alias(&self, alias: Atom, depth: u32) -> Option<Resolution> {
        self.scope
            .levels
            .iter()
            .enumerate()
            .find_map(|(index, level)| self.alias_at(level, index, alias, depth))
    }

    /// Target of alias `name` declared at `level`. Syntax targets resolve in
    /// the enclosing levels, without the usings of their own level.
    fn alias_at(
        &self,
        level: &NamespaceLevel,
        index: usize,
        name: Atom,
        depth: u32,
    ) -> Option<Resolution> {
        let &(_, target) = level.aliases.iter().find(|(alias, _)| *alias == name)?;
        match target {
            AliasTarget::Resolved(resolution) => Some(resolution),
            AliasTarget::Syntax(node) => {
                let mut levels = vec![NamespaceLevel::new(level.namespace)];
                levels.extend(self.scope.levels[index + 1..].iter().cloned());
                let outer = Scope {
                    levels,
                    types: Vec::new(),
                    methods: Vec::new(),
                };
                let resolver = TypeResolver::new(self.db, self.tree, &outer);
                Some(resolver.resolve_name_at(node, None, depth + 1))
            }
        }
    }
}

fn suffixed(name: Atom, suffix: Option<&str>) -> Atom {
    match suffix {
        Some(suffix) if !name.as_str().ends_with(suffix) => {
            Atom::intern(&format!("{name}{suffix}"))
        }
        _ => name,
    }
}

/// Type arguments of a `Named` type, empty for anything else.
pub fn type_args_of(db: &dyn TypeDatabase, ty: TypeId) -> TypeArgs {
    match db.lookup(ty) {
        TypeData::Named { args, .. } => args,
        _ => TypeArgs::new(),
    }
}
