//! Definition storage.
//!
//! `DefinitionStore` holds every type and method declaration the solver can
//! reason about. Like `TypeInterner` it is layered: the bound reference set is
//! one store, each compilation's source declarations live in a child store
//! whose ids continue after the parent's.
//!
//! A store is mutable while its layer is being bound and frozen behind an
//! `Arc` afterwards.

use crate::types::{AssemblyId, DefId, MethodId, TypeId, Variance};
use bitflags::bitflags;
use isx_common::Atom;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::sync::Arc;

// =============================================================================
// Definition data
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DefKind {
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
}

/// Declared accessibility, ordered from least to most restrictive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Accessibility {
    #[default]
    Public,
    ProtectedInternal,
    Internal,
    Protected,
    PrivateProtected,
    Private,
}

impl Accessibility {
    /// The more restrictive of two accessibilities.
    pub fn restrict(self, other: Accessibility) -> Accessibility {
        self.max(other)
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DefFlags: u16 {
        const STATIC = 1 << 0;
        const ABSTRACT = 1 << 1;
        const SEALED = 1 << 2;
        const OBSOLETE = 1 << 3;
        const READONLY = 1 << 4;
        const REF_STRUCT = 1 << 5;
        const RECORD = 1 << 6;
        /// Declares at least one instance constructor.
        const HAS_CONSTRUCTORS = 1 << 7;
        /// Has an accessible parameterless instance constructor, declared or implicit.
        const PARAMETERLESS_CONSTRUCTOR = 1 << 8;
    }
}

bitflags! {
    /// Constraint keywords on a type parameter.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ConstraintFlags: u8 {
        const CLASS = 1 << 0;
        const STRUCT = 1 << 1;
        const UNMANAGED = 1 << 2;
        const NOT_NULL = 1 << 3;
        const NEW = 1 << 4;
        const DEFAULT = 1 << 5;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParamInfo {
    pub name: Atom,
    pub variance: Variance,
    pub constraints: ConstraintFlags,
    /// Type bounds from the `where` clause (`where T : IComparable<T>`).
    pub bounds: Vec<TypeId>,
}

impl TypeParamInfo {
    pub fn new(name: Atom) -> Self {
        TypeParamInfo {
            name,
            variance: Variance::Invariant,
            constraints: ConstraintFlags::empty(),
            bounds: Vec::new(),
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.constraints.is_empty() && self.bounds.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum MemberKind {
    Field,
    Constant,
    Property,
    Indexer,
    Event,
    EnumMember,
}

/// Fields, properties, indexers and events.
#[derive(Clone, Debug)]
pub struct MemberInfo {
    pub name: Atom,
    pub kind: MemberKind,
    pub ty: TypeId,
    pub is_static: bool,
    pub accessibility: Accessibility,
    /// Indexer parameter types.
    pub parameters: Vec<TypeId>,
}

#[derive(Clone, Debug)]
pub struct DefinitionInfo {
    pub name: Atom,
    pub kind: DefKind,
    /// Dotted namespace, `Atom::NONE` for the global namespace.
    pub namespace: Atom,
    /// Enclosing type for nested declarations.
    pub container: Option<DefId>,
    pub assembly: AssemblyId,
    pub accessibility: Accessibility,
    pub flags: DefFlags,
    pub type_params: Vec<TypeParamInfo>,
    pub base: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub methods: Vec<MethodId>,
    pub members: Vec<MemberInfo>,
    pub nested: Vec<DefId>,
    pub enum_underlying: Option<TypeId>,
    /// Signature of a delegate's `Invoke`.
    pub invoke: Option<MethodId>,
}

impl DefinitionInfo {
    pub fn new(name: Atom, kind: DefKind, namespace: Atom, assembly: AssemblyId) -> Self {
        DefinitionInfo {
            name,
            kind,
            namespace,
            container: None,
            assembly,
            accessibility: Accessibility::Internal,
            flags: DefFlags::empty(),
            type_params: Vec::new(),
            base: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
            members: Vec::new(),
            nested: Vec::new(),
            enum_underlying: None,
            invoke: None,
        }
    }

    pub fn arity(&self) -> u16 {
        self.type_params.len() as u16
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(DefFlags::STATIC)
    }

    pub fn is_value_type(&self) -> bool {
        matches!(self.kind, DefKind::Struct | DefKind::Enum)
    }

    pub fn is_reference_type(&self) -> bool {
        matches!(
            self.kind,
            DefKind::Class | DefKind::Interface | DefKind::Delegate
        )
    }

    /// Interfaces and delegates may declare variant type parameters.
    pub fn allows_variance(&self) -> bool {
        matches!(self.kind, DefKind::Interface | DefKind::Delegate)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ParamModifier {
    #[default]
    None,
    Ref,
    Out,
    In,
    Params,
}

#[derive(Clone, Debug)]
pub struct ParameterInfo {
    pub name: Atom,
    pub ty: TypeId,
    pub modifier: ParamModifier,
    pub has_default: bool,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MethodFlags: u16 {
        const STATIC = 1 << 0;
        /// First parameter carries `this`.
        const EXTENSION = 1 << 1;
        const OBSOLETE = 1 << 2;
        const ABSTRACT = 1 << 3;
        const VIRTUAL = 1 << 4;
        const OVERRIDE = 1 << 5;
        const CONSTRUCTOR = 1 << 6;
        const OPERATOR = 1 << 7;
        const ASYNC = 1 << 8;
    }
}

#[derive(Clone, Debug)]
pub struct MethodInfo {
    pub name: Atom,
    pub container: DefId,
    pub accessibility: Accessibility,
    pub flags: MethodFlags,
    pub type_params: Vec<TypeParamInfo>,
    pub params: Vec<ParameterInfo>,
    pub return_type: TypeId,
}

impl MethodInfo {
    pub fn new(name: Atom, container: DefId) -> Self {
        MethodInfo {
            name,
            container,
            accessibility: Accessibility::Private,
            flags: MethodFlags::empty(),
            type_params: Vec::new(),
            params: Vec::new(),
            return_type: TypeId::VOID,
        }
    }

    pub fn is_extension(&self) -> bool {
        self.flags.contains(MethodFlags::EXTENSION)
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(MethodFlags::STATIC)
    }

    pub fn arity(&self) -> u16 {
        self.type_params.len() as u16
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct AssemblyInfo {
    pub name: String,
    pub version: String,
}

// =============================================================================
// DefinitionStore
// =============================================================================

#[derive(Clone, Debug, Default)]
pub struct DefinitionStore {
    parent: Option<Arc<DefinitionStore>>,
    def_base: u32,
    method_base: u32,
    assembly_base: u32,
    defs: Vec<DefinitionInfo>,
    methods: Vec<MethodInfo>,
    assemblies: Vec<AssemblyInfo>,
    /// Top-level types keyed by `(namespace, name, arity)`.
    top_level: FxHashMap<(Atom, Atom, u16), DefId>,
    namespaces: FxHashSet<Atom>,
}

impl DefinitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A layer over a frozen parent store.
    pub fn child(parent: Arc<DefinitionStore>) -> Self {
        DefinitionStore {
            def_base: parent.def_count() as u32,
            method_base: parent.method_count() as u32,
            assembly_base: parent.assembly_count() as u32,
            parent: Some(parent),
            ..Self::default()
        }
    }

    pub fn parent(&self) -> Option<&Arc<DefinitionStore>> {
        self.parent.as_ref()
    }

    pub fn def_count(&self) -> usize {
        self.def_base as usize + self.defs.len()
    }

    pub fn method_count(&self) -> usize {
        self.method_base as usize + self.methods.len()
    }

    pub fn assembly_count(&self) -> usize {
        self.assembly_base as usize + self.assemblies.len()
    }

    // =========================================================================
    // Building
    // =========================================================================

    pub fn add_assembly(&mut self, name: &str, version: &str) -> AssemblyId {
        let id = AssemblyId(self.assembly_base + self.assemblies.len() as u32);
        self.assemblies.push(AssemblyInfo {
            name: name.to_string(),
            version: version.to_string(),
        });
        id
    }

    /// Register a type. Top-level types become visible to namespace lookup;
    /// nested types are appended to their container's `nested` list.
    ///
    /// A second top-level type with the same name and arity in the same
    /// namespace keeps the first registration for lookup.
    pub fn add_type(&mut self, info: DefinitionInfo) -> DefId {
        let id = DefId(self.def_base + self.defs.len() as u32);
        match info.container {
            Some(container) => {
                if let Some(outer) = self.def_mut(container) {
                    outer.nested.push(id);
                }
            }
            None => {
                self.top_level
                    .entry((info.namespace, info.name, info.arity()))
                    .or_insert(id);
                self.register_namespace(info.namespace);
            }
        }
        self.defs.push(info);
        id
    }

    /// Mark a dotted namespace and all its prefixes as existing.
    pub fn register_namespace(&mut self, namespace: Atom) {
        if namespace.is_none() || self.namespaces.contains(&namespace) {
            return;
        }
        let text = namespace.as_str();
        let mut end = 0;
        for segment in text.split('.') {
            end += segment.len();
            self.namespaces.insert(Atom::intern(&text[..end]));
            end += 1;
        }
    }

    pub fn add_method(&mut self, info: MethodInfo) -> MethodId {
        let id = MethodId(self.method_base + self.methods.len() as u32);
        if let Some(container) = self.def_mut(info.container) {
            container.methods.push(id);
        }
        self.methods.push(info);
        id
    }

    /// Mutable access to a definition owned by this layer.
    pub fn def_mut(&mut self, id: DefId) -> Option<&mut DefinitionInfo> {
        let index = id.0.checked_sub(self.def_base)?;
        self.defs.get_mut(index as usize)
    }

    /// Mutable access to a method owned by this layer.
    pub fn method_mut(&mut self, id: MethodId) -> Option<&mut MethodInfo> {
        let index = id.0.checked_sub(self.method_base)?;
        self.methods.get_mut(index as usize)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn def(&self, id: DefId) -> Option<&DefinitionInfo> {
        if id.0 < self.def_base {
            return self.parent.as_ref()?.def(id);
        }
        self.defs.get((id.0 - self.def_base) as usize)
    }

    pub fn method(&self, id: MethodId) -> Option<&MethodInfo> {
        if id.0 < self.method_base {
            return self.parent.as_ref()?.method(id);
        }
        self.methods.get((id.0 - self.method_base) as usize)
    }

    pub fn assembly(&self, id: AssemblyId) -> Option<&AssemblyInfo> {
        if id.0 < self.assembly_base {
            return self.parent.as_ref()?.assembly(id);
        }
        self.assemblies.get((id.0 - self.assembly_base) as usize)
    }

    /// True when the definition was added to this layer rather than a parent.
    pub fn owns_def(&self, id: DefId) -> bool {
        id.0 >= self.def_base && ((id.0 - self.def_base) as usize) < self.defs.len()
    }

    /// Definitions of this layer in declaration order.
    pub fn local_defs(&self) -> impl Iterator<Item = DefId> + '_ {
        (0..self.defs.len() as u32).map(move |i| DefId(self.def_base + i))
    }

    /// Assemblies of this layer in registration order.
    pub fn local_assemblies(&self) -> impl Iterator<Item = AssemblyId> + '_ {
        (0..self.assemblies.len() as u32).map(move |i| AssemblyId(self.assembly_base + i))
    }

    /// Top-level type by namespace, simple name and arity. This layer's
    /// declarations win over the parent's.
    pub fn lookup_type(&self, namespace: Atom, name: Atom, arity: u16) -> Option<DefId> {
        if let Some(&id) = self.top_level.get(&(namespace, name, arity)) {
            return Some(id);
        }
        self.parent.as_ref()?.lookup_type(namespace, name, arity)
    }

    /// Top-level type by qualified metadata-style name (`System.Collections.Generic.List`).
    pub fn lookup_qualified(&self, qualified: &str, arity: u16) -> Option<DefId> {
        let (namespace, name) = match qualified.rfind('.') {
            Some(dot) => (Atom::intern(&qualified[..dot]), &qualified[dot + 1..]),
            None => (Atom::NONE, qualified),
        };
        self.lookup_type(namespace, Atom::intern(name), arity)
    }

    pub fn lookup_nested(&self, container: DefId, name: Atom, arity: u16) -> Option<DefId> {
        self.def(container)?.nested.iter().copied().find(|&id| {
            self.def(id)
                .is_some_and(|d| d.name == name && d.arity() == arity)
        })
    }

    pub fn namespace_exists(&self, namespace: Atom) -> bool {
        namespace.is_none()
            || self.namespaces.contains(&namespace)
            || self
                .parent
                .as_ref()
                .is_some_and(|p| p.namespace_exists(namespace))
    }

    /// Declared accessibility intersected over the container chain.
    pub fn effective_accessibility(&self, id: DefId) -> Accessibility {
        let mut result = Accessibility::Public;
        let mut current = Some(id);
        let mut hops = 0;
        while let Some(def_id) = current {
            let Some(def) = self.def(def_id) else {
                break;
            };
            result = result.restrict(def.accessibility);
            current = def.container;
            hops += 1;
            if hops > isx_common::limits::MAX_BASE_CHAIN {
                break;
            }
        }
        result
    }

    /// `Outer.Inner` style display name of a definition, without namespace.
    pub fn nested_name(&self, id: DefId) -> String {
        let Some(def) = self.def(id) else {
            return String::new();
        };
        match def.container {
            Some(outer) => format!("{}.{}", self.nested_name(outer), def.name),
            None => def.name.as_str().to_string(),
        }
    }

    /// Namespace a definition lives in, following its containers.
    pub fn namespace_of(&self, id: DefId) -> Atom {
        let mut current = id;
        for _ in 0..isx_common::limits::MAX_BASE_CHAIN {
            match self.def(current) {
                Some(def) => match def.container {
                    Some(outer) => current = outer,
                    None => return def.namespace,
                },
                None => break,
            }
        }
        Atom::NONE
    }
}

#[cfg(test)]
#[path = "../tests/def_tests.rs"]
mod tests;
