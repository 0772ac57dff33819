//! Layer binding: parsed files to definitions.
//!
//! A layer (the bound reference set, or one compilation's sources) is bound in
//! passes over the same `DefinitionStore`:
//!
//! 1. **declare**: namespaces and types, with names, kinds, modifiers and
//!    type parameter names. Partial declarations merge into one definition.
//! 2. **global usings**: resolved once so every scope can see them.
//! 3. **methods**: skeleton `MethodInfo`s so method type parameters can be
//!    referenced while signatures resolve.
//! 4. **constraints**: `where` clauses of types and methods, applied before
//!    any signature so `T?` under `where T : struct` becomes `Nullable<T>`.
//! 5. **signatures**: bases, members and method signatures, resolved
//!    through a read-only `LayerView` and applied afterwards.
//! 6. **defaults**: implicit base classes and parameterless constructors.

use crate::resolve::{Resolution, TypeResolver};
use crate::scope::{DeclarationMap, Scope, join_namespace};
use isx_common::{Atom, FileId};
use isx_parser::{
    Modifiers, NodeIndex, NodeKind, ParameterModifiers, SyntaxTree, TypeParameterData,
};
use isx_scanner::SyntaxKind;
use isx_solver::{
    Accessibility, AssemblyId, ConstraintFlags, DefFlags, DefId, DefKind, DefinitionInfo,
    DefinitionStore, MemberInfo, MemberKind, MethodFlags, MethodId, MethodInfo, ParamModifier,
    ParameterInfo, SpecialType, TypeDatabase, TypeId, TypeInterner, TypeParamInfo, Variance,
    WellKnown,
};
use std::sync::Arc;
use tracing::{debug, trace};

/// One file of a layer and the assembly it belongs to.
#[derive(Clone, Debug)]
pub struct BindFile {
    pub file: FileId,
    pub tree: Arc<SyntaxTree>,
    pub assembly: AssemblyId,
}

/// Read-only database over a store that is still being bound.
pub(crate) struct LayerView<'a> {
    pub types: &'a TypeInterner,
    pub defs: &'a DefinitionStore,
    pub well_known: &'a WellKnown,
}

impl TypeDatabase for LayerView<'_> {
    fn types(&self) -> &TypeInterner {
        self.types
    }

    fn defs(&self) -> &DefinitionStore {
        self.defs
    }

    fn well_known(&self) -> &WellKnown {
        self.well_known
    }
}

#[derive(Clone, Copy, Debug)]
struct PendingType {
    file: usize,
    node: NodeIndex,
    def: DefId,
}

#[derive(Clone, Copy, Debug)]
struct PendingMethod {
    file: usize,
    /// Method declaration, or the delegate declaration for `Invoke`.
    node: NodeIndex,
    method: MethodId,
}

/// Resolved pieces of one type declaration.
#[derive(Default)]
struct TypeSignature {
    base: Option<TypeId>,
    interfaces: Vec<TypeId>,
    enum_underlying: Option<TypeId>,
    members: Vec<MemberInfo>,
    obsolete: bool,
}

struct MethodSignature {
    params: Vec<ParameterInfo>,
    return_type: TypeId,
    obsolete: bool,
}

/// Flags and bounds per type parameter index.
type Constraints = Vec<(usize, ConstraintFlags, Vec<TypeId>)>;

pub struct LayerBinder<'a> {
    types: &'a TypeInterner,
    store: DefinitionStore,
    files: &'a [BindFile],
    decls: DeclarationMap,
    types_pending: Vec<PendingType>,
    methods_pending: Vec<PendingMethod>,
    global_usings: Vec<(usize, NodeIndex)>,
}

impl<'a> LayerBinder<'a> {
    pub fn new(types: &'a TypeInterner, store: DefinitionStore, files: &'a [BindFile]) -> Self {
        LayerBinder {
            types,
            store,
            files,
            decls: DeclarationMap::default(),
            types_pending: Vec::new(),
            methods_pending: Vec::new(),
            global_usings: Vec::new(),
        }
    }

    /// Run every pass and hand back the finished store.
    pub fn bind(mut self) -> (DefinitionStore, DeclarationMap) {
        for index in 0..self.files.len() {
            self.declare_file(index);
        }
        let well_known = WellKnown::resolve(&self.store);
        self.resolve_global_usings(&well_known);
        self.declare_methods();

        let (type_constraints, method_constraints) = {
            let view = LayerView {
                types: self.types,
                defs: &self.store,
                well_known: &well_known,
            };
            let type_constraints: Vec<(DefId, Constraints)> = self
                .types_pending
                .iter()
                .map(|pending| (pending.def, self.type_constraints(&view, *pending)))
                .collect();
            let method_constraints: Vec<(MethodId, Constraints)> = self
                .methods_pending
                .iter()
                .map(|pending| (pending.method, self.method_constraints(&view, *pending)))
                .collect();
            (type_constraints, method_constraints)
        };
        for (def, constraints) in type_constraints {
            if let Some(info) = self.store.def_mut(def) {
                apply_constraints(&mut info.type_params, constraints);
            }
        }
        for (method, constraints) in method_constraints {
            if let Some(info) = self.store.method_mut(method) {
                apply_constraints(&mut info.type_params, constraints);
            }
        }

        let (type_sigs, method_sigs) = {
            let view = LayerView {
                types: self.types,
                defs: &self.store,
                well_known: &well_known,
            };
            let type_sigs: Vec<(DefId, TypeSignature)> = self
                .types_pending
                .iter()
                .map(|pending| (pending.def, self.type_signature(&view, *pending)))
                .collect();
            let method_sigs: Vec<(MethodId, MethodSignature)> = self
                .methods_pending
                .iter()
                .filter_map(|pending| {
                    self.method_signature(&view, *pending)
                        .map(|sig| (pending.method, sig))
                })
                .collect();
            (type_sigs, method_sigs)
        };
        for (def, sig) in type_sigs {
            self.apply_type_signature(def, sig);
        }
        for (method, sig) in method_sigs {
            self.apply_method_signature(method, sig);
        }
        self.apply_defaults(&well_known);

        debug!(
            files = self.files.len(),
            types = self.types_pending.len(),
            methods = self.methods_pending.len(),
            "bound layer"
        );
        (self.store, self.decls)
    }

    fn tree(&self, file: usize) -> &'a SyntaxTree {
        let files: &'a [BindFile] = self.files;
        &files[file].tree
    }

    // =========================================================================
    // Pass 1: namespaces and types
    // =========================================================================

    fn declare_file(&mut self, file: usize) {
        let tree = self.tree(file);
        let Some(unit) = tree.node(tree.root).and_then(|n| tree.arena.get_source_file(n)) else {
            return;
        };
        for &using in &unit.usings {
            if tree
                .node(using)
                .and_then(|n| tree.arena.get_using(n))
                .is_some_and(|u| u.is_global)
            {
                self.global_usings.push((file, using));
            }
        }
        let members = unit.members.clone();
        self.declare_members(file, &members, Atom::NONE, None);
    }

    fn declare_members(
        &mut self,
        file: usize,
        members: &[NodeIndex],
        namespace: Atom,
        container: Option<DefId>,
    ) {
        let tree = self.tree(file);
        for &member in members {
            let Some(kind) = tree.kind(member) else {
                continue;
            };
            if kind == NodeKind::NamespaceDeclaration {
                let Some(data) = tree.node(member).and_then(|n| tree.arena.get_namespace(n))
                else {
                    continue;
                };
                let Some(dotted) = tree.dotted_name(data.name) else {
                    continue;
                };
                let inner = join_namespace(namespace, &dotted);
                self.store.register_namespace(inner);
                let members = data.members.clone();
                self.declare_members(file, &members, inner, None);
            } else if kind.is_type_declaration() {
                self.declare_type(file, member, namespace, container);
            }
        }
    }

    fn declare_type(
        &mut self,
        file: usize,
        node: NodeIndex,
        namespace: Atom,
        container: Option<DefId>,
    ) {
        let tree = self.tree(file);
        let Some(n) = tree.node(node) else {
            return;
        };
        let (name, modifiers, type_parameters, members) = if n.kind == NodeKind::DelegateDeclaration
        {
            let Some(data) = tree.arena.get_delegate(n) else {
                return;
            };
            (data.name, data.modifiers, data.type_parameters.clone(), Vec::new())
        } else {
            let Some(data) = tree.arena.get_type_decl(n) else {
                return;
            };
            (
                data.name,
                data.modifiers,
                data.type_parameters.clone(),
                data.members.clone(),
            )
        };
        if name.is_none() {
            return;
        }

        let (kind, mut flags) = match n.kind {
            NodeKind::StructDeclaration => (DefKind::Struct, DefFlags::empty()),
            NodeKind::InterfaceDeclaration => (DefKind::Interface, DefFlags::empty()),
            NodeKind::EnumDeclaration => (DefKind::Enum, DefFlags::empty()),
            NodeKind::RecordDeclaration => (DefKind::Class, DefFlags::RECORD),
            NodeKind::RecordStructDeclaration => (DefKind::Struct, DefFlags::RECORD),
            NodeKind::DelegateDeclaration => (DefKind::Delegate, DefFlags::empty()),
            _ => (DefKind::Class, DefFlags::empty()),
        };
        for (modifier, flag) in [
            (Modifiers::STATIC, DefFlags::STATIC),
            (Modifiers::ABSTRACT, DefFlags::ABSTRACT),
            (Modifiers::SEALED, DefFlags::SEALED),
            (Modifiers::READONLY, DefFlags::READONLY),
        ] {
            if modifiers.contains(modifier) {
                flags |= flag;
            }
        }
        if kind == DefKind::Struct && modifiers.contains(Modifiers::REF) {
            flags |= DefFlags::REF_STRUCT;
        }

        let type_params: Vec<TypeParamInfo> = type_parameters
            .iter()
            .filter_map(|&p| type_parameter(tree, p))
            .map(|data| {
                let mut info = TypeParamInfo::new(data.name);
                info.variance = match data.variance {
                    SyntaxKind::OutKeyword => Variance::Covariant,
                    SyntaxKind::InKeyword => Variance::Contravariant,
                    _ => Variance::Invariant,
                };
                info
            })
            .collect();
        let arity = type_params.len() as u16;

        let default_access = match container {
            None => Accessibility::Internal,
            Some(outer) if self.store.def(outer).is_some_and(|d| d.kind == DefKind::Interface) => {
                Accessibility::Public
            }
            Some(_) => Accessibility::Private,
        };

        let existing = if modifiers.contains(Modifiers::PARTIAL) {
            match container {
                Some(outer) => self.store.lookup_nested(outer, name, arity),
                None => self.store.lookup_type(namespace, name, arity),
            }
            .filter(|&id| {
                self.store.owns_def(id) && self.store.def(id).is_some_and(|d| d.kind == kind)
            })
        } else {
            None
        };

        let def = match existing {
            Some(def) => {
                if let Some(info) = self.store.def_mut(def) {
                    info.flags |= flags;
                    if !modifiers.accessibility().is_empty() {
                        info.accessibility = accessibility(modifiers, default_access);
                    }
                }
                def
            }
            None => {
                let mut info =
                    DefinitionInfo::new(name, kind, namespace, self.files[file].assembly);
                info.container = container;
                info.accessibility = accessibility(modifiers, default_access);
                info.flags = flags;
                info.type_params = type_params;
                self.store.add_type(info)
            }
        };

        self.decls.types.insert((self.files[file].file, node), def);
        self.types_pending.push(PendingType { file, node, def });

        for member in members {
            if tree.kind(member).is_some_and(NodeKind::is_type_declaration) {
                self.declare_type(file, member, namespace, Some(def));
            }
        }
    }

    // =========================================================================
    // Pass 2: global usings
    // =========================================================================

    fn resolve_global_usings(&mut self, well_known: &WellKnown) {
        let bare = Scope::global(&Default::default());
        for &(file, using) in &self.global_usings {
            let tree = self.tree(file);
            let Some(data) = tree.node(using).and_then(|n| tree.arena.get_using(n)) else {
                continue;
            };
            if data.is_static {
                continue;
            }
            if data.alias.is_some() {
                let view = LayerView {
                    types: self.types,
                    defs: &self.store,
                    well_known,
                };
                let target = TypeResolver::new(&view, tree, &bare).resolve_name(data.name);
                if target == Resolution::Unresolved {
                    trace!(alias = %data.alias, "unresolved global using alias");
                }
                self.decls.global_usings.aliases.push((data.alias, target));
            } else if let Some(name) = tree.dotted_name(data.name) {
                let namespace = Atom::intern(&name);
                if !self.decls.global_usings.imports.contains(&namespace) {
                    self.decls.global_usings.imports.push(namespace);
                }
            }
        }
    }

    // =========================================================================
    // Pass 3: method skeletons
    // =========================================================================

    fn declare_methods(&mut self) {
        let pending = self.types_pending.clone();
        for PendingType { file, node, def } in pending {
            let tree = self.tree(file);
            let Some(n) = tree.node(node) else {
                continue;
            };
            if n.kind == NodeKind::DelegateDeclaration {
                let mut info = MethodInfo::new(Atom::intern("Invoke"), def);
                info.accessibility = Accessibility::Public;
                let method = self.store.add_method(info);
                if let Some(def_info) = self.store.def_mut(def) {
                    def_info.invoke = Some(method);
                }
                self.methods_pending.push(PendingMethod { file, node, method });
                continue;
            }
            let Some(data) = tree.arena.get_type_decl(n) else {
                continue;
            };
            if !data.parameters.is_empty() {
                if let Some(info) = self.store.def_mut(def) {
                    info.flags |= DefFlags::HAS_CONSTRUCTORS;
                }
            }
            for &member in &data.members {
                let Some(kind) = tree.kind(member) else {
                    continue;
                };
                if matches!(
                    kind,
                    NodeKind::MethodDeclaration
                        | NodeKind::ConstructorDeclaration
                        | NodeKind::OperatorDeclaration
                        | NodeKind::ConversionOperatorDeclaration
                ) {
                    self.declare_method(file, member, kind, def);
                }
            }
        }
    }

    fn declare_method(&mut self, file: usize, node: NodeIndex, kind: NodeKind, def: DefId) {
        let tree = self.tree(file);
        let Some(data) = tree.node(node).and_then(|n| tree.arena.get_method(n)) else {
            return;
        };
        let Some(container) = self.store.def(def) else {
            return;
        };
        let in_interface = container.kind == DefKind::Interface;
        let modifiers = data.modifiers;

        let mut flags = MethodFlags::empty();
        for (modifier, flag) in [
            (Modifiers::STATIC, MethodFlags::STATIC),
            (Modifiers::ABSTRACT, MethodFlags::ABSTRACT),
            (Modifiers::VIRTUAL, MethodFlags::VIRTUAL),
            (Modifiers::OVERRIDE, MethodFlags::OVERRIDE),
            (Modifiers::ASYNC, MethodFlags::ASYNC),
        ] {
            if modifiers.contains(modifier) {
                flags |= flag;
            }
        }
        match kind {
            NodeKind::ConstructorDeclaration => flags |= MethodFlags::CONSTRUCTOR,
            NodeKind::OperatorDeclaration | NodeKind::ConversionOperatorDeclaration => {
                flags |= MethodFlags::OPERATOR | MethodFlags::STATIC
            }
            _ => {}
        }
        if in_interface
            && !flags.contains(MethodFlags::STATIC)
            && data.body.is_none()
            && data.expression_body.is_none()
        {
            flags |= MethodFlags::ABSTRACT;
        }

        let has_this = data.parameters.first().is_some_and(|&p| {
            tree.node(p)
                .and_then(|n| tree.arena.get_parameter(n))
                .is_some_and(|param| param.modifiers.contains(ParameterModifiers::THIS))
        });
        if has_this && kind == NodeKind::MethodDeclaration {
            let valid_container = container.kind == DefKind::Class
                && container.is_static()
                && container.container.is_none()
                && container.type_params.is_empty();
            if valid_container && flags.contains(MethodFlags::STATIC) {
                flags |= MethodFlags::EXTENSION;
            } else {
                trace!(
                    method = %data.name,
                    container = %container.name,
                    "`this` parameter outside a top-level non-generic static class"
                );
            }
        }

        let default_access = if in_interface {
            Accessibility::Public
        } else {
            Accessibility::Private
        };
        let access = if data.explicit_interface.is_some() {
            Accessibility::Private
        } else {
            accessibility(modifiers, default_access)
        };

        let mut info = MethodInfo::new(data.name, def);
        info.flags = flags;
        info.accessibility = access;
        info.type_params = data
            .type_parameters
            .iter()
            .filter_map(|&p| type_parameter(tree, p))
            .map(|p| TypeParamInfo::new(p.name))
            .collect();
        let is_instance_ctor =
            kind == NodeKind::ConstructorDeclaration && !flags.contains(MethodFlags::STATIC);
        let parameterless = data.parameters.iter().all(|&p| {
            tree.node(p)
                .and_then(|n| tree.arena.get_parameter(n))
                .is_some_and(|param| param.default_value.is_some())
        });

        let method = self.store.add_method(info);
        self.decls.methods.insert((self.files[file].file, node), method);
        self.methods_pending.push(PendingMethod { file, node, method });

        if is_instance_ctor && let Some(def_info) = self.store.def_mut(def) {
            def_info.flags |= DefFlags::HAS_CONSTRUCTORS;
            if parameterless && access != Accessibility::Private {
                def_info.flags |= DefFlags::PARAMETERLESS_CONSTRUCTOR;
            }
        }
    }

    // =========================================================================
    // Pass 4: constraints
    // =========================================================================

    fn type_constraints(&self, view: &LayerView<'_>, pending: PendingType) -> Constraints {
        let tree = self.tree(pending.file);
        let Some(n) = tree.node(pending.node) else {
            return Vec::new();
        };
        let clauses = if n.kind == NodeKind::DelegateDeclaration {
            tree.arena.get_delegate(n).map(|data| &data.constraints)
        } else {
            tree.arena.get_type_decl(n).map(|data| &data.constraints)
        };
        let Some(clauses) = clauses.filter(|clauses| !clauses.is_empty()) else {
            return Vec::new();
        };
        let scope = Scope::at(tree, self.files[pending.file].file, pending.node, &self.decls);
        let resolver = TypeResolver::new(view, tree, &scope);
        let names: Vec<Atom> = view
            .def(pending.def)
            .map(|info| info.type_params.iter().map(|p| p.name).collect())
            .unwrap_or_default();
        clause_constraints(&resolver, clauses, &names)
    }

    fn method_constraints(&self, view: &LayerView<'_>, pending: PendingMethod) -> Constraints {
        let tree = self.tree(pending.file);
        let Some(data) = tree.node(pending.node).and_then(|n| tree.arena.get_method(n)) else {
            return Vec::new();
        };
        if data.constraints.is_empty() {
            return Vec::new();
        }
        let scope = Scope::at(tree, self.files[pending.file].file, pending.node, &self.decls);
        let resolver = TypeResolver::new(view, tree, &scope);
        let names: Vec<Atom> = view
            .method(pending.method)
            .map(|info| info.type_params.iter().map(|p| p.name).collect())
            .unwrap_or_default();
        clause_constraints(&resolver, &data.constraints, &names)
    }

    // =========================================================================
    // Pass 5: signatures
    // =========================================================================

    fn type_signature(&self, view: &LayerView<'_>, pending: PendingType) -> TypeSignature {
        let tree = self.tree(pending.file);
        let file = self.files[pending.file].file;
        let mut sig = TypeSignature::default();
        let Some(n) = tree.node(pending.node) else {
            return sig;
        };
        let scope = Scope::at(tree, file, pending.node, &self.decls);
        let resolver = TypeResolver::new(view, tree, &scope);

        if n.kind == NodeKind::DelegateDeclaration {
            if let Some(data) = tree.arena.get_delegate(n) {
                sig.obsolete = is_obsolete(&resolver, &data.attributes);
            }
            return sig;
        }
        let Some(data) = tree.arena.get_type_decl(n) else {
            return sig;
        };
        let Some(info) = view.def(pending.def) else {
            return sig;
        };

        sig.obsolete = is_obsolete(&resolver, &data.attributes);

        for (index, &base) in data.base_types.iter().enumerate() {
            let ty = resolver.resolve_type(base);
            if ty.is_error() {
                trace!(
                    def = %info.name,
                    base = tree.node_text(base),
                    "unresolved base type dropped"
                );
                continue;
            }
            if info.kind == DefKind::Enum {
                sig.enum_underlying.get_or_insert(ty);
                continue;
            }
            let is_class = view
                .named_def(ty)
                .is_some_and(|(_, base_info)| base_info.kind == DefKind::Class);
            if index == 0 && info.kind == DefKind::Class && is_class {
                sig.base = Some(ty);
            } else {
                sig.interfaces.push(ty);
            }
        }

        let self_type = view.types().simple(pending.def);
        let in_interface = info.kind == DefKind::Interface;
        let member_default = if in_interface {
            Accessibility::Public
        } else {
            Accessibility::Private
        };

        // Positional record parameters become public properties.
        if n.kind == NodeKind::RecordDeclaration || n.kind == NodeKind::RecordStructDeclaration {
            for &param in &data.parameters {
                let Some(p) = tree.node(param).and_then(|n| tree.arena.get_parameter(n)) else {
                    continue;
                };
                sig.members.push(MemberInfo {
                    name: p.name,
                    kind: MemberKind::Property,
                    ty: resolver.resolve_type(p.type_node),
                    is_static: false,
                    accessibility: Accessibility::Public,
                    parameters: Vec::new(),
                });
            }
        }

        for &member in &data.members {
            let Some(m) = tree.node(member) else {
                continue;
            };
            match m.kind {
                NodeKind::FieldDeclaration | NodeKind::EventFieldDeclaration => {
                    let Some(decl) = tree.arena.get_variable_declaration(m) else {
                        continue;
                    };
                    let ty = resolver.resolve_type(decl.type_node);
                    let is_const = decl.modifiers.contains(Modifiers::CONST);
                    let kind = if m.kind == NodeKind::EventFieldDeclaration {
                        MemberKind::Event
                    } else if is_const {
                        MemberKind::Constant
                    } else {
                        MemberKind::Field
                    };
                    for &declarator in &decl.declarators {
                        let Some(d) = tree
                            .node(declarator)
                            .and_then(|n| tree.arena.get_variable_declarator(n))
                        else {
                            continue;
                        };
                        sig.members.push(MemberInfo {
                            name: d.name,
                            kind,
                            ty,
                            is_static: is_const || decl.modifiers.contains(Modifiers::STATIC),
                            accessibility: accessibility(decl.modifiers, member_default),
                            parameters: Vec::new(),
                        });
                    }
                }
                NodeKind::PropertyDeclaration
                | NodeKind::IndexerDeclaration
                | NodeKind::EventDeclaration => {
                    let Some(prop) = tree.arena.get_property(m) else {
                        continue;
                    };
                    let kind = match m.kind {
                        NodeKind::IndexerDeclaration => MemberKind::Indexer,
                        NodeKind::EventDeclaration => MemberKind::Event,
                        _ => MemberKind::Property,
                    };
                    let parameters = prop
                        .parameters
                        .iter()
                        .filter_map(|&p| tree.node(p).and_then(|n| tree.arena.get_parameter(n)))
                        .map(|p| resolver.resolve_type(p.type_node))
                        .collect();
                    let access = if prop.explicit_interface.is_some() {
                        Accessibility::Private
                    } else {
                        accessibility(prop.modifiers, member_default)
                    };
                    sig.members.push(MemberInfo {
                        name: prop.name,
                        kind,
                        ty: resolver.resolve_type(prop.type_node),
                        is_static: prop.modifiers.contains(Modifiers::STATIC),
                        accessibility: access,
                        parameters,
                    });
                }
                NodeKind::EnumMember => {
                    let Some(data) = tree.arena.get_enum_member(m) else {
                        continue;
                    };
                    sig.members.push(MemberInfo {
                        name: data.name,
                        kind: MemberKind::EnumMember,
                        ty: self_type,
                        is_static: true,
                        accessibility: Accessibility::Public,
                        parameters: Vec::new(),
                    });
                }
                _ => {}
            }
        }
        sig
    }

    fn method_signature(
        &self,
        view: &LayerView<'_>,
        pending: PendingMethod,
    ) -> Option<MethodSignature> {
        let tree = self.tree(pending.file);
        let file = self.files[pending.file].file;
        let n = tree.node(pending.node)?;
        let scope = Scope::at(tree, file, pending.node, &self.decls);
        let resolver = TypeResolver::new(view, tree, &scope);

        if n.kind == NodeKind::DelegateDeclaration {
            let data = tree.arena.get_delegate(n)?;
            return Some(MethodSignature {
                params: parameters(&resolver, &data.parameters),
                return_type: resolver.resolve_type(data.return_type),
                obsolete: false,
            });
        }

        let data = tree.arena.get_method(n)?;
        let return_type = if data.return_type.is_some() {
            resolver.resolve_type(data.return_type)
        } else {
            TypeId::VOID
        };
        Some(MethodSignature {
            params: parameters(&resolver, &data.parameters),
            return_type,
            obsolete: is_obsolete(&resolver, &data.attributes),
        })
    }

    fn apply_type_signature(&mut self, def: DefId, sig: TypeSignature) {
        let Some(info) = self.store.def_mut(def) else {
            return;
        };
        if info.base.is_none() {
            info.base = sig.base;
        }
        for iface in sig.interfaces {
            if !info.interfaces.contains(&iface) {
                info.interfaces.push(iface);
            }
        }
        if info.enum_underlying.is_none() {
            info.enum_underlying = sig.enum_underlying;
        }
        info.members.extend(sig.members);
        if sig.obsolete {
            info.flags |= DefFlags::OBSOLETE;
        }
    }

    fn apply_method_signature(&mut self, method: MethodId, sig: MethodSignature) {
        let Some(info) = self.store.method_mut(method) else {
            return;
        };
        info.params = sig.params;
        info.return_type = sig.return_type;
        if sig.obsolete {
            info.flags |= MethodFlags::OBSOLETE;
        }
    }

    // =========================================================================
    // Pass 6: defaults
    // =========================================================================

    fn apply_defaults(&mut self, well_known: &WellKnown) {
        let special = |special: SpecialType| {
            well_known
                .def(special)
                .map(|def| (def, self.types.simple(def)))
        };
        let object = special(SpecialType::Object);
        let value_type = special(SpecialType::ValueType);
        let enum_ = special(SpecialType::Enum);
        let multicast = special(SpecialType::MulticastDelegate);
        let int = special(SpecialType::Int32).map(|(_, ty)| ty);

        let defs: Vec<DefId> = self.store.local_defs().collect();
        for def in defs {
            let Some(info) = self.store.def_mut(def) else {
                continue;
            };
            let default_base = match info.kind {
                DefKind::Class => object,
                DefKind::Struct => value_type,
                DefKind::Enum => enum_,
                DefKind::Delegate => multicast,
                DefKind::Interface => None,
            };
            if info.base.is_none()
                && let Some((base_def, base_ty)) = default_base
                && base_def != def
            {
                info.base = Some(base_ty);
            }
            match info.kind {
                DefKind::Class if !info.flags.contains(DefFlags::HAS_CONSTRUCTORS) => {
                    info.flags |= DefFlags::PARAMETERLESS_CONSTRUCTOR;
                }
                DefKind::Struct => info.flags |= DefFlags::PARAMETERLESS_CONSTRUCTOR,
                DefKind::Enum if info.enum_underlying.is_none() => {
                    info.enum_underlying = int;
                }
                _ => {}
            }
        }
    }
}

fn type_parameter(tree: &SyntaxTree, node: NodeIndex) -> Option<&TypeParameterData> {
    tree.node(node)
        .and_then(|n| tree.arena.get_type_parameter(n))
}

fn accessibility(modifiers: Modifiers, default: Accessibility) -> Accessibility {
    let access = modifiers.accessibility();
    if access.contains(Modifiers::PUBLIC) {
        Accessibility::Public
    } else if access.contains(Modifiers::PROTECTED | Modifiers::INTERNAL) {
        Accessibility::ProtectedInternal
    } else if access.contains(Modifiers::PRIVATE | Modifiers::PROTECTED) {
        Accessibility::PrivateProtected
    } else if access.contains(Modifiers::INTERNAL) {
        Accessibility::Internal
    } else if access.contains(Modifiers::PROTECTED) {
        Accessibility::Protected
    } else if access.contains(Modifiers::PRIVATE) {
        Accessibility::Private
    } else {
        default
    }
}

fn parameters(resolver: &TypeResolver<'_>, params: &[NodeIndex]) -> Vec<ParameterInfo> {
    let tree = resolver.tree;
    params
        .iter()
        .filter_map(|&p| tree.node(p).and_then(|n| tree.arena.get_parameter(n)))
        .map(|p| {
            let modifier = if p.modifiers.contains(ParameterModifiers::REF) {
                ParamModifier::Ref
            } else if p.modifiers.contains(ParameterModifiers::OUT) {
                ParamModifier::Out
            } else if p.modifiers.contains(ParameterModifiers::IN) {
                ParamModifier::In
            } else if p.modifiers.contains(ParameterModifiers::PARAMS) {
                ParamModifier::Params
            } else {
                ParamModifier::None
            };
            ParameterInfo {
                name: p.name,
                ty: resolver.resolve_type(p.type_node),
                modifier,
                has_default: p.default_value.is_some(),
            }
        })
        .collect()
}

/// Whether any attribute in `lists` resolves to `System.ObsoleteAttribute`.
fn is_obsolete(resolver: &TypeResolver<'_>, lists: &[NodeIndex]) -> bool {
    let Some(obsolete) = resolver.db.well_known().def(SpecialType::ObsoleteAttribute) else {
        return false;
    };
    let tree = resolver.tree;
    lists
        .iter()
        .filter_map(|&list| tree.node(list).and_then(|n| tree.arena.get_attribute_list(n)))
        .flat_map(|list| list.attributes.iter())
        .filter_map(|&attr| tree.node(attr).and_then(|n| tree.arena.get_invocation(n)))
        .any(|attr| resolver.resolve_attribute(attr.expression) == Some(obsolete))
}

fn apply_constraints(params: &mut [TypeParamInfo], constraints: Constraints) {
    for (index, flags, bounds) in constraints {
        if let Some(param) = params.get_mut(index) {
            param.constraints |= flags;
            param.bounds.extend(bounds);
        }
    }
}

/// `where` clauses against the type parameter `names` of their declaration.
fn clause_constraints(
    resolver: &TypeResolver<'_>,
    clauses: &[NodeIndex],
    names: &[Atom],
) -> Constraints {
    let tree = resolver.tree;
    let mut out = Vec::new();
    for &clause in clauses {
        let Some(data) = tree
            .node(clause)
            .and_then(|n| tree.arena.get_constraint_clause(n))
        else {
            continue;
        };
        let Some(index) = names.iter().position(|&n| n == data.name) else {
            trace!(name = %data.name, "constraint clause for unknown type parameter");
            continue;
        };
        let mut flags = ConstraintFlags::empty();
        let mut bounds = Vec::new();
        for &constraint in &data.constraints {
            let Some(c) = tree.node(constraint) else {
                continue;
            };
            match c.kind {
                NodeKind::ClassConstraint => flags |= ConstraintFlags::CLASS,
                NodeKind::StructConstraint => flags |= ConstraintFlags::STRUCT,
                NodeKind::NewConstraint => flags |= ConstraintFlags::NEW,
                NodeKind::DefaultConstraint => flags |= ConstraintFlags::DEFAULT,
                NodeKind::TypeConstraint => {
                    let Some(wrapped) = tree.arena.get_wrapped_type(c) else {
                        continue;
                    };
                    match tree.node_text(wrapped.element) {
                        "unmanaged" => flags |= ConstraintFlags::UNMANAGED | ConstraintFlags::STRUCT,
                        "notnull" => flags |= ConstraintFlags::NOT_NULL,
                        _ => {
                            let bound = resolver.resolve_type(wrapped.element);
                            if !bound.is_error() {
                                bounds.push(bound);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        out.push((index, flags, bounds));
    }
    out
}
