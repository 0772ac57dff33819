//! Type parameter substitution.

use crate::db::TypeDatabase;
use crate::types::{DefId, TypeArgs, TypeData, TypeId, TypeParamRef};
use isx_common::limits::MAX_INFERENCE_DEPTH;
use smallvec::SmallVec;

/// A mapping from type parameters to types.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substitution {
    entries: SmallVec<[(TypeParamRef, TypeId); 4]>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps the type parameters of `def` to `args` positionally.
    pub fn for_type_args(def: DefId, args: &[TypeId]) -> Self {
        Substitution {
            entries: args
                .iter()
                .enumerate()
                .map(|(i, &arg)| (TypeParamRef::of_type(def, i as u16), arg))
                .collect(),
        }
    }

    pub fn insert(&mut self, param: TypeParamRef, ty: TypeId) {
        match self.entries.iter_mut().find(|(p, _)| *p == param) {
            Some(entry) => entry.1 = ty,
            None => self.entries.push((param, ty)),
        }
    }

    pub fn get(&self, param: TypeParamRef) -> Option<TypeId> {
        self.entries
            .iter()
            .find(|(p, _)| *p == param)
            .map(|&(_, ty)| ty)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeParamRef, TypeId)> + '_ {
        self.entries.iter().copied()
    }

    /// Adds every entry of `other` not already bound here.
    pub fn extend_from(&mut self, other: &Substitution) {
        for (param, ty) in other.iter() {
            if self.get(param).is_none() {
                self.entries.push((param, ty));
            }
        }
    }
}

/// Replace type parameters in `ty` according to `subst`. Unmapped parameters
/// stay as they are.
pub fn substitute(db: &dyn TypeDatabase, ty: TypeId, subst: &Substitution) -> TypeId {
    if subst.is_empty() {
        return ty;
    }
    substitute_at(db, ty, subst, 0)
}

fn substitute_at(db: &dyn TypeDatabase, ty: TypeId, subst: &Substitution, depth: u32) -> TypeId {
    if depth > MAX_INFERENCE_DEPTH {
        return TypeId::ERROR;
    }
    match db.lookup(ty) {
        TypeData::TypeParam(param) => subst.get(param).unwrap_or(ty),
        TypeData::Named { def, args } if !args.is_empty() => {
            let new_args: TypeArgs = args
                .iter()
                .map(|&arg| substitute_at(db, arg, subst, depth + 1))
                .collect();
            if new_args == args {
                ty
            } else {
                db.intern(TypeData::Named {
                    def,
                    args: new_args,
                })
            }
        }
        TypeData::Array { element, rank } => {
            let new_element = substitute_at(db, element, subst, depth + 1);
            if new_element == element {
                ty
            } else {
                db.intern(TypeData::Array {
                    element: new_element,
                    rank,
                })
            }
        }
        _ => ty,
    }
}

/// True if `ty` mentions any type parameter accepted by `pred`.
pub fn mentions_type_param(
    db: &dyn TypeDatabase,
    ty: TypeId,
    pred: &dyn Fn(TypeParamRef) -> bool,
) -> bool {
    fn walk(
        db: &dyn TypeDatabase,
        ty: TypeId,
        pred: &dyn Fn(TypeParamRef) -> bool,
        depth: u32,
    ) -> bool {
        if depth > MAX_INFERENCE_DEPTH {
            return false;
        }
        match db.lookup(ty) {
            TypeData::TypeParam(param) => pred(param),
            TypeData::Named { args, .. } => args.iter().any(|&a| walk(db, a, pred, depth + 1)),
            TypeData::Array { element, .. } => walk(db, element, pred, depth + 1),
            _ => false,
        }
    }
    walk(db, ty, pred, 0)
}
