//! Base chains and interface sets.
//!
//! Supertypes are instantiated: the supertypes of `List<string>` include
//! `IEnumerable<string>`, not `IEnumerable<T>`.

use crate::db::TypeDatabase;
use crate::def::ConstraintFlags;
use crate::subst::{Substitution, substitute};
use crate::types::{DefId, TypeData, TypeId};
use crate::well_known::SpecialType;
use indexmap::IndexSet;
use isx_common::limits::{MAX_BASE_CHAIN, MAX_SUPERTYPE_WALK};
use smallvec::SmallVec;
use tracing::trace;

pub type SupertypeList = SmallVec<[TypeId; 4]>;

/// Immediate base type and interfaces of `ty`, instantiated.
pub fn direct_supertypes(db: &dyn TypeDatabase, ty: TypeId) -> SupertypeList {
    let mut result = SupertypeList::new();
    match db.lookup(ty) {
        TypeData::Named { def, args } => {
            let Some(info) = db.def(def) else {
                return result;
            };
            let subst = Substitution::for_type_args(def, &args);
            if let Some(base) = info.base {
                result.push(substitute(db, base, &subst));
            }
            for &iface in &info.interfaces {
                result.push(substitute(db, iface, &subst));
            }
        }
        TypeData::Array { element, rank } => {
            push_special(db, &mut result, SpecialType::Array, None);
            if rank == 1 {
                for special in [
                    SpecialType::IListT,
                    SpecialType::IReadOnlyListT,
                    SpecialType::ICollectionT,
                    SpecialType::IReadOnlyCollectionT,
                    SpecialType::IEnumerableT,
                ] {
                    push_special(db, &mut result, special, Some(element));
                }
            }
        }
        TypeData::TypeParam(param) => {
            let Some(info) = db.type_param_info(param) else {
                return result;
            };
            result.extend(info.bounds.iter().copied());
            if info.constraints.contains(ConstraintFlags::STRUCT)
                || info.constraints.contains(ConstraintFlags::UNMANAGED)
            {
                push_special(db, &mut result, SpecialType::ValueType, None);
            }
            push_special(db, &mut result, SpecialType::Object, None);
        }
        _ => {}
    }
    result
}

fn push_special(
    db: &dyn TypeDatabase,
    out: &mut SupertypeList,
    special: SpecialType,
    element: Option<TypeId>,
) {
    let Some(def) = db.well_known().def(special) else {
        return;
    };
    let ty = match element {
        Some(element) => db.types().named(def, [element].into_iter().collect()),
        None => db.types().simple(def),
    };
    out.push(ty);
}

/// Every supertype reachable from `ty` through bases, interfaces and
/// constraints, nearest first. Does not include `ty` itself.
pub fn all_supertypes(db: &dyn TypeDatabase, ty: TypeId) -> IndexSet<TypeId> {
    let mut seen: IndexSet<TypeId> = IndexSet::new();
    let mut cursor = 0;
    for direct in direct_supertypes(db, ty) {
        if direct != ty {
            seen.insert(direct);
        }
    }
    while cursor < seen.len() {
        if seen.len() >= MAX_SUPERTYPE_WALK {
            trace!(ty = ty.0, "supertype walk limit reached");
            break;
        }
        let current = seen[cursor];
        cursor += 1;
        for next in direct_supertypes(db, current) {
            if next != ty {
                seen.insert(next);
            }
        }
    }
    seen
}

/// `ty` followed by its base classes, most derived first.
pub fn base_chain(db: &dyn TypeDatabase, ty: TypeId) -> Vec<TypeId> {
    let mut chain = vec![ty];
    let mut current = ty;
    for _ in 0..MAX_BASE_CHAIN {
        let TypeData::Named { def, args } = db.lookup(current) else {
            break;
        };
        let Some(base) = db.def(def).and_then(|info| info.base) else {
            break;
        };
        let base = substitute(db, base, &Substitution::for_type_args(def, &args));
        if chain.contains(&base) {
            break;
        }
        chain.push(base);
        current = base;
    }
    chain
}

/// Instantiations of `def` among `ty` and its supertypes, in walk order.
pub fn instantiations_of(db: &dyn TypeDatabase, ty: TypeId, def: DefId) -> SmallVec<[TypeId; 2]> {
    let names_def = |candidate: TypeId| {
        matches!(db.lookup(candidate), TypeData::Named { def: d, .. } if d == def)
    };
    let mut result = SmallVec::new();
    if names_def(ty) {
        result.push(ty);
    }
    for supertype in all_supertypes(db, ty) {
        if names_def(supertype) && !result.contains(&supertype) {
            result.push(supertype);
        }
    }
    result
}

/// Element type of a `foreach` over `ty`: the array element, or the argument
/// of the single `IEnumerable<T>` instantiation.
pub fn enumerable_element(db: &dyn TypeDatabase, ty: TypeId) -> Option<TypeId> {
    if let TypeData::Array { element, .. } = db.lookup(ty) {
        return Some(element);
    }
    let enumerable = db.well_known().def(SpecialType::IEnumerableT)?;
    let found = instantiations_of(db, ty, enumerable);
    match found.as_slice() {
        [single] => match db.lookup(*single) {
            TypeData::Named { args, .. } => args.first().copied(),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
#[path = "../tests/hierarchy_tests.rs"]
mod tests;
