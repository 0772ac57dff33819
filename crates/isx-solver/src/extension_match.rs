//! Extension method receiver applicability.
//!
//! Decides whether a receiver of static type `R` can be passed as the `this`
//! argument of an extension method whose first parameter has type `P`, and
//! infers the method type arguments that `P` determines.
//!
//! - Non-generic `P`: `R` must convert implicitly to `P`.
//! - Generic `P`: a bare `T` binds to `R`; otherwise the single instantiation
//!   of `P`'s definition reachable from `R` (itself, bases, interfaces) is
//!   unified with `P`. Several distinct instantiations fail inference.
//! - Inferred bindings are checked against the method's constraints. Bounds
//!   that mention still-unbound parameters are skipped.
//! - `null` receivers and unconstrained type-parameter receivers only match
//!   `object` or a bare unconstrained method type parameter.

use crate::db::TypeDatabase;
use crate::def::{ConstraintFlags, DefFlags, DefKind, MemberKind, TypeParamInfo};
use crate::hierarchy::instantiations_of;
use crate::infer::{InferenceContext, InferenceError, InferenceVar};
use crate::relations::{is_implicitly_convertible, is_reference_type, is_value_type};
use crate::subst::{Substitution, mentions_type_param, substitute};
use crate::types::{MethodId, TypeData, TypeId, TypeParamRef};
use crate::well_known::SpecialType;
use isx_common::Atom;
use isx_common::limits::MAX_INFERENCE_DEPTH;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error("method {0:?} is not an extension method")]
    NotExtension(MethodId),
    #[error("receiver type {0:?} cannot be used as an extension receiver")]
    UnusableReceiver(TypeId),
    #[error("receiver {receiver:?} does not convert to {parameter:?}")]
    NotConvertible { receiver: TypeId, parameter: TypeId },
    #[error("receiver {0:?} implements several instantiations of the parameter type")]
    AmbiguousInstantiation(TypeId),
    #[error("{ty:?} violates the constraints of type parameter {param}")]
    ConstraintViolated { param: Atom, ty: TypeId },
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Match `receiver` against the first parameter of `method`.
pub fn match_extension_receiver(
    db: &dyn TypeDatabase,
    receiver: TypeId,
    method: MethodId,
) -> Result<Substitution, MatchError> {
    let info = db.method(method).ok_or(MatchError::NotExtension(method))?;
    let parameter = info
        .params
        .first()
        .filter(|_| info.is_extension())
        .map(|p| p.ty)
        .ok_or(MatchError::NotExtension(method))?;

    match db.lookup(receiver) {
        TypeData::Error | TypeData::Void | TypeData::Dynamic => {
            return Err(MatchError::UnusableReceiver(receiver));
        }
        _ => {}
    }

    if receiver == TypeId::NULL || is_unconstrained_type_param(db, receiver) {
        return conservative_match(db, receiver, parameter, method);
    }

    let is_own_param = |p: TypeParamRef| p.is_method_param_of(method);
    if !mentions_type_param(db, parameter, &is_own_param) {
        return if is_implicitly_convertible(db, receiver, parameter) {
            Ok(Substitution::new())
        } else {
            Err(MatchError::NotConvertible {
                receiver,
                parameter,
            })
        };
    }

    let mut ctx = InferenceContext::new(db, method);
    match db.lookup(parameter) {
        TypeData::TypeParam(_) | TypeData::Array { .. } => ctx.unify(parameter, receiver)?,
        TypeData::Named { def, .. } => {
            let found = instantiations_of(db, receiver, def);
            match found.as_slice() {
                [] => {
                    return Err(MatchError::NotConvertible {
                        receiver,
                        parameter,
                    });
                }
                [single] => ctx.unify(parameter, *single)?,
                _ => return Err(MatchError::AmbiguousInstantiation(receiver)),
            }
        }
        _ => {
            return Err(MatchError::NotConvertible {
                receiver,
                parameter,
            });
        }
    }

    let subst = ctx.substitution();
    check_constraints(db, method, &subst)?;
    Ok(subst)
}

/// Convenience wrapper: applicability only.
pub fn is_applicable_receiver(db: &dyn TypeDatabase, receiver: TypeId, method: MethodId) -> bool {
    match_extension_receiver(db, receiver, method).is_ok()
}

fn is_unconstrained_type_param(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    match db.lookup(ty) {
        TypeData::TypeParam(param) => db
            .type_param_info(param)
            .is_none_or(TypeParamInfo::is_unconstrained),
        _ => false,
    }
}

fn conservative_match(
    db: &dyn TypeDatabase,
    receiver: TypeId,
    parameter: TypeId,
    method: MethodId,
) -> Result<Substitution, MatchError> {
    if db.special_of(parameter) == Some(SpecialType::Object) {
        return Ok(Substitution::new());
    }
    if let TypeData::TypeParam(param) = db.lookup(parameter) {
        if param.is_method_param_of(method)
            && db
                .type_param_info(param)
                .is_some_and(TypeParamInfo::is_unconstrained)
        {
            let mut subst = Substitution::new();
            subst.insert(param, receiver);
            return Ok(subst);
        }
    }
    Err(MatchError::NotConvertible {
        receiver,
        parameter,
    })
}

/// Check inferred bindings against the method's type parameter constraints.
pub fn check_constraints(
    db: &dyn TypeDatabase,
    method: MethodId,
    subst: &Substitution,
) -> Result<(), MatchError> {
    let Some(info) = db.method(method) else {
        return Ok(());
    };
    let is_unbound = |p: TypeParamRef| p.is_method_param_of(method) && subst.get(p).is_none();

    for (index, param) in info.type_params.iter().enumerate() {
        let param_ref = TypeParamRef::of_method(method, index as u16);
        let Some(arg) = subst.get(param_ref) else {
            continue;
        };
        if !satisfies_constraint_flags(db, param.constraints, arg) {
            return Err(MatchError::ConstraintViolated {
                param: param.name,
                ty: arg,
            });
        }
        for &bound in &param.bounds {
            if mentions_type_param(db, bound, &is_unbound) {
                continue;
            }
            let upper = substitute(db, bound, subst);
            if !is_implicitly_convertible(db, arg, upper) {
                return Err(InferenceError::BoundsViolation {
                    var: InferenceVar(index as u32),
                    lower: arg,
                    upper,
                }
                .into());
            }
        }
    }
    Ok(())
}

fn satisfies_constraint_flags(db: &dyn TypeDatabase, flags: ConstraintFlags, arg: TypeId) -> bool {
    let is_nullable = db.nullable_underlying(arg).is_some();
    if flags.contains(ConstraintFlags::CLASS) && !(is_reference_type(db, arg) || arg == TypeId::NULL)
    {
        return false;
    }
    if flags.contains(ConstraintFlags::STRUCT) && !(is_value_type(db, arg) && !is_nullable) {
        return false;
    }
    if flags.contains(ConstraintFlags::UNMANAGED) && !is_unmanaged(db, arg, 0) {
        return false;
    }
    if flags.contains(ConstraintFlags::NOT_NULL) && (arg == TypeId::NULL || is_nullable) {
        return false;
    }
    if flags.contains(ConstraintFlags::NEW) && !has_parameterless_constructor(db, arg) {
        return false;
    }
    true
}

fn is_unmanaged(db: &dyn TypeDatabase, ty: TypeId, depth: u32) -> bool {
    if depth > MAX_INFERENCE_DEPTH {
        return false;
    }
    match db.lookup(ty) {
        TypeData::TypeParam(param) => db
            .type_param_info(param)
            .is_some_and(|p| p.constraints.contains(ConstraintFlags::UNMANAGED)),
        TypeData::Named { def, args } => {
            let Some(info) = db.def(def) else {
                return false;
            };
            if db.special_of(ty).is_some_and(SpecialType::is_numeric)
                || db.special_of(ty) == Some(SpecialType::Boolean)
            {
                return true;
            }
            match info.kind {
                DefKind::Enum => true,
                DefKind::Struct => {
                    let subst = Substitution::for_type_args(def, &args);
                    info.members
                        .iter()
                        .filter(|m| m.kind == MemberKind::Field && !m.is_static)
                        .all(|m| is_unmanaged(db, substitute(db, m.ty, &subst), depth + 1))
                }
                _ => false,
            }
        }
        _ => false,
    }
}

fn has_parameterless_constructor(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    match db.lookup(ty) {
        TypeData::TypeParam(param) => db.type_param_info(param).is_some_and(|p| {
            p.constraints.intersects(
                ConstraintFlags::NEW | ConstraintFlags::STRUCT | ConstraintFlags::UNMANAGED,
            )
        }),
        TypeData::Named { def, .. } => db.def(def).is_some_and(|info| match info.kind {
            DefKind::Struct | DefKind::Enum => true,
            DefKind::Class => {
                !info.flags.intersects(DefFlags::ABSTRACT | DefFlags::STATIC)
                    && info.flags.contains(DefFlags::PARAMETERLESS_CONSTRUCTOR)
            }
            DefKind::Interface | DefKind::Delegate => false,
        }),
        _ => false,
    }
}

#[cfg(test)]
#[path = "../tests/extension_match_tests.rs"]
mod tests;
