//! Type interning for structural deduplication.
//!
//! `TypeInterner` converts `TypeData` into `TypeId` handles. Interners are
//! layered: a child created with [`TypeInterner::child`] reads through a
//! frozen parent and allocates new ids after the parent's last id, so types
//! interned while binding a shared reference set keep their ids in every
//! compilation built on top of it.
//!
//! Interning takes `&self`; completion requests intern instantiated types
//! (`IEnumerable<string>`) long after binding finished.

use crate::types::{DefId, TypeArgs, TypeData, TypeId, TypeParamRef};
use rustc_hash::FxHashMap;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Default)]
struct Layer {
    data: Vec<TypeData>,
    ids: FxHashMap<TypeData, TypeId>,
}

pub struct TypeInterner {
    parent: Option<Arc<TypeInterner>>,
    /// First id owned by this layer.
    base: u32,
    layer: RwLock<Layer>,
}

impl TypeInterner {
    /// A root interner with the intrinsic types pre-registered.
    pub fn new() -> Self {
        let interner = TypeInterner {
            parent: None,
            base: 0,
            layer: RwLock::new(Layer::default()),
        };
        for (data, expected) in [
            (TypeData::Error, TypeId::ERROR),
            (TypeData::Null, TypeId::NULL),
            (TypeData::Void, TypeId::VOID),
            (TypeData::Dynamic, TypeId::DYNAMIC),
        ] {
            let id = interner.intern(data);
            debug_assert_eq!(id, expected);
        }
        interner
    }

    /// A layer over `parent`. The parent must not intern anything afterwards,
    /// or its new ids would collide with this layer's.
    pub fn child(parent: Arc<TypeInterner>) -> Self {
        let base = parent.len() as u32;
        TypeInterner {
            parent: Some(parent),
            base,
            layer: RwLock::new(Layer::default()),
        }
    }

    /// Total number of ids visible through this interner.
    pub fn len(&self) -> usize {
        self.base as usize + self.read().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Layer> {
        self.layer.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Existing id for `data`, searching parents first.
    pub fn find(&self, data: &TypeData) -> Option<TypeId> {
        if let Some(parent) = &self.parent {
            if let Some(id) = parent.find(data) {
                return Some(id);
            }
        }
        self.read().ids.get(data).copied()
    }

    pub fn intern(&self, data: TypeData) -> TypeId {
        if let Some(id) = self.find(&data) {
            return id;
        }
        let mut layer = self.layer.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have interned it between the two locks.
        if let Some(&id) = layer.ids.get(&data) {
            return id;
        }
        let id = TypeId(self.base + layer.data.len() as u32);
        layer.data.push(data.clone());
        layer.ids.insert(data, id);
        id
    }

    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        if id.0 < self.base {
            return self.parent.as_ref()?.lookup(id);
        }
        self.read().data.get((id.0 - self.base) as usize).cloned()
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn named(&self, def: DefId, args: TypeArgs) -> TypeId {
        self.intern(TypeData::Named { def, args })
    }

    /// Non-generic named type.
    pub fn simple(&self, def: DefId) -> TypeId {
        self.intern(TypeData::Named {
            def,
            args: TypeArgs::new(),
        })
    }

    pub fn array(&self, element: TypeId, rank: u8) -> TypeId {
        self.intern(TypeData::Array {
            element,
            rank: rank.max(1),
        })
    }

    pub fn type_param(&self, param: TypeParamRef) -> TypeId {
        self.intern(TypeData::TypeParam(param))
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeInterner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeInterner")
            .field("base", &self.base)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod tests;
