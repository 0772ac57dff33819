//! Implicit conversions between types.
//!
//! Covers what extension applicability needs: identity, implicit reference
//! conversions (base classes, interfaces, variance), boxing, implicit numeric
//! widening, nullable wrapping, array conversions and the null literal.
//! User-defined conversions are not considered.

use crate::db::TypeDatabase;
use crate::def::{ConstraintFlags, DefKind};
use crate::hierarchy::all_supertypes;
use crate::types::{TypeData, TypeId, Variance};
use crate::well_known::SpecialType;
use isx_common::limits::MAX_INFERENCE_DEPTH;

/// Classes, interfaces, delegates, arrays, and type parameters constrained to them.
pub fn is_reference_type(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    match db.lookup(ty) {
        TypeData::Named { def, .. } => db.def(def).is_some_and(|info| info.is_reference_type()),
        TypeData::Array { .. } | TypeData::Dynamic => true,
        TypeData::TypeParam(param) => db.type_param_info(param).is_some_and(|info| {
            info.constraints.contains(ConstraintFlags::CLASS)
                || info.bounds.iter().any(|&b| is_class_bound(db, b))
        }),
        _ => false,
    }
}

/// A class-type bound makes a type parameter a reference type, except the
/// special classes value types also derive from.
fn is_class_bound(db: &dyn TypeDatabase, bound: TypeId) -> bool {
    let Some((_, info)) = db.named_def(bound) else {
        return false;
    };
    info.kind == DefKind::Class
        && !matches!(
            db.special_of(bound),
            Some(SpecialType::Object | SpecialType::ValueType | SpecialType::Enum)
        )
}

/// Structs, enums, and type parameters with a `struct`/`unmanaged` constraint.
pub fn is_value_type(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    match db.lookup(ty) {
        TypeData::Named { def, .. } => db.def(def).is_some_and(|info| info.is_value_type()),
        TypeData::TypeParam(param) => db.type_param_info(param).is_some_and(|info| {
            info.constraints
                .intersects(ConstraintFlags::STRUCT | ConstraintFlags::UNMANAGED)
        }),
        _ => false,
    }
}

/// True if `from` converts implicitly to `to`.
pub fn is_implicitly_convertible(db: &dyn TypeDatabase, from: TypeId, to: TypeId) -> bool {
    convertible_at(db, from, to, 0)
}

fn convertible_at(db: &dyn TypeDatabase, from: TypeId, to: TypeId, depth: u32) -> bool {
    if depth > MAX_INFERENCE_DEPTH || from.is_error() || to.is_error() {
        return false;
    }
    if from == to {
        return from != TypeId::VOID;
    }
    if from == TypeId::VOID || to == TypeId::VOID || to == TypeId::NULL {
        return false;
    }
    if to == TypeId::DYNAMIC {
        return true;
    }
    if from == TypeId::DYNAMIC {
        return false;
    }
    if from == TypeId::NULL {
        return is_reference_type(db, to) || db.nullable_underlying(to).is_some();
    }
    if db.special_of(to) == Some(SpecialType::Object) {
        return true;
    }

    let from_special = db.special_of(from);
    if let (Some(a), Some(b)) = (from_special, db.special_of(to)) {
        if a.widens_to(b) {
            return true;
        }
    }

    if let Some(underlying) = db.nullable_underlying(to) {
        if from == underlying || widens(db, from, underlying) {
            return true;
        }
        if let Some(inner) = db.nullable_underlying(from) {
            if widens(db, inner, underlying) {
                return true;
            }
        }
    }

    if variance_convertible(db, from, to, depth) {
        return true;
    }
    all_supertypes(db, from)
        .into_iter()
        .any(|s| s == to || variance_convertible(db, s, to, depth))
}

fn widens(db: &dyn TypeDatabase, from: TypeId, to: TypeId) -> bool {
    matches!(
        (db.special_of(from), db.special_of(to)),
        (Some(a), Some(b)) if a.widens_to(b)
    )
}

/// `IEnumerable<string>` to `IEnumerable<object>` and friends: same generic
/// interface or delegate, each argument related according to its variance.
fn variance_convertible(db: &dyn TypeDatabase, from: TypeId, to: TypeId, depth: u32) -> bool {
    let (
        TypeData::Named {
            def: from_def,
            args: from_args,
        },
        TypeData::Named {
            def: to_def,
            args: to_args,
        },
    ) = (db.lookup(from), db.lookup(to))
    else {
        return false;
    };
    if from_def != to_def || from_args.len() != to_args.len() || from_args.is_empty() {
        return false;
    }
    let Some(info) = db.def(from_def) else {
        return false;
    };
    if !info.allows_variance() {
        return false;
    }
    from_args
        .iter()
        .zip(to_args.iter())
        .zip(info.type_params.iter())
        .all(|((&a, &b), param)| {
            a == b
                || match param.variance {
                    Variance::Invariant => false,
                    Variance::Covariant => reference_convertible(db, a, b, depth + 1),
                    Variance::Contravariant => reference_convertible(db, b, a, depth + 1),
                }
        })
}

/// Implicit reference conversion only: no boxing, numeric or nullable steps.
fn reference_convertible(db: &dyn TypeDatabase, from: TypeId, to: TypeId, depth: u32) -> bool {
    is_reference_type(db, from) && is_reference_type(db, to) && convertible_at(db, from, to, depth)
}

#[cfg(test)]
#[path = "../tests/relations_tests.rs"]
mod tests;
