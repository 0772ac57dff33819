//! Type database abstraction for the solver.
//!
//! Solver algorithms take `&dyn TypeDatabase` so they can run against any
//! combination of interner, definition store and well-known table: a bound
//! reference set on its own, or a compilation layered on top of one.

use crate::def::{DefinitionInfo, DefinitionStore, MethodInfo, TypeParamInfo};
use crate::intern::TypeInterner;
use crate::types::{DefId, MethodId, TypeData, TypeId, TypeParamOwner, TypeParamRef};
use crate::well_known::{SpecialType, WellKnown};
use std::sync::Arc;

pub trait TypeDatabase {
    fn types(&self) -> &TypeInterner;
    fn defs(&self) -> &DefinitionStore;
    fn well_known(&self) -> &WellKnown;

    fn lookup(&self, id: TypeId) -> TypeData {
        self.types().lookup(id).unwrap_or(TypeData::Error)
    }

    fn intern(&self, data: TypeData) -> TypeId {
        self.types().intern(data)
    }

    fn def(&self, id: DefId) -> Option<&DefinitionInfo> {
        self.defs().def(id)
    }

    fn method(&self, id: MethodId) -> Option<&MethodInfo> {
        self.defs().method(id)
    }

    /// The non-generic well-known type, or `ERROR` when the reference set
    /// lacks it.
    fn special(&self, special: SpecialType) -> TypeId {
        match self.well_known().def(special) {
            Some(def) => self.types().simple(def),
            None => TypeId::ERROR,
        }
    }

    fn special_of(&self, ty: TypeId) -> Option<SpecialType> {
        match self.lookup(ty) {
            TypeData::Named { def, .. } => self.well_known().special_of(def),
            _ => None,
        }
    }

    /// Declaration of a type parameter.
    fn type_param_info(&self, param: TypeParamRef) -> Option<&TypeParamInfo> {
        let params = match param.owner {
            TypeParamOwner::Type(def) => &self.def(def)?.type_params,
            TypeParamOwner::Method(method) => &self.method(method)?.type_params,
        };
        params.get(param.index as usize)
    }

    /// Definition named by a `Named` type.
    fn named_def(&self, ty: TypeId) -> Option<(DefId, &DefinitionInfo)> {
        match self.lookup(ty) {
            TypeData::Named { def, .. } => self.def(def).map(|info| (def, info)),
            _ => None,
        }
    }

    /// Element type of `Nullable<T>`.
    fn nullable_underlying(&self, ty: TypeId) -> Option<TypeId> {
        let nullable = self.well_known().def(SpecialType::Nullable)?;
        match self.lookup(ty) {
            TypeData::Named { def, args } if def == nullable => args.first().copied(),
            _ => None,
        }
    }
}

/// A concrete type environment: interner, definitions and well-known table.
#[derive(Clone, Debug)]
pub struct TypeEnv {
    pub types: Arc<TypeInterner>,
    pub defs: Arc<DefinitionStore>,
    pub well_known: Arc<WellKnown>,
}

impl TypeEnv {
    pub fn new(types: Arc<TypeInterner>, defs: Arc<DefinitionStore>) -> Self {
        let well_known = Arc::new(WellKnown::resolve(&defs));
        TypeEnv {
            types,
            defs,
            well_known,
        }
    }
}

impl TypeDatabase for TypeEnv {
    fn types(&self) -> &TypeInterner {
        &self.types
    }

    fn defs(&self) -> &DefinitionStore {
        &self.defs
    }

    fn well_known(&self) -> &WellKnown {
        &self.well_known
    }
}
