//! Method type argument inference using Union-Find.
//!
//! Each method type parameter gets an inference variable in an `ena`
//! unification table. Binding a variable twice to different types is a
//! conflict; binding two variables to each other merges them so later
//! bindings of either must agree.

use crate::db::TypeDatabase;
use crate::subst::{Substitution, mentions_type_param};
use crate::types::{MethodId, TypeData, TypeId, TypeParamRef};
use ena::unify::{InPlaceUnificationTable, UnifyKey, UnifyValue};
use isx_common::limits::MAX_INFERENCE_DEPTH;

/// An inference variable standing for one method type parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InferenceVar(pub u32);

/// Wrapper for TypeId to implement UnifyValue (avoiding orphan rule)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InferenceValue(pub Option<TypeId>);

impl UnifyKey for InferenceVar {
    type Value = InferenceValue;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        InferenceVar(u)
    }

    fn tag() -> &'static str {
        "InferenceVar"
    }
}

/// Two different types were bound to the same variable.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BindingConflict(pub TypeId, pub TypeId);

impl UnifyValue for InferenceValue {
    type Error = BindingConflict;

    fn unify_values(a: &Self, b: &Self) -> Result<Self, Self::Error> {
        match (a.0, b.0) {
            (None, None) => Ok(InferenceValue(None)),
            (Some(t), None) | (None, Some(t)) => Ok(InferenceValue(Some(t))),
            (Some(a), Some(b)) if a == b => Ok(InferenceValue(Some(a))),
            (Some(a), Some(b)) => Err(BindingConflict(a, b)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InferenceError {
    #[error("conflicting inferences {0:?} and {1:?}")]
    Conflict(TypeId, TypeId),
    #[error("inference variable {0:?} was not resolved")]
    Unresolved(InferenceVar),
    #[error("inference variable {var:?} occurs in {ty:?}")]
    OccursCheck { var: InferenceVar, ty: TypeId },
    #[error("inferred {lower:?} for {var:?} does not satisfy {upper:?}")]
    BoundsViolation {
        var: InferenceVar,
        lower: TypeId,
        upper: TypeId,
    },
}

impl From<BindingConflict> for InferenceError {
    fn from(conflict: BindingConflict) -> Self {
        InferenceError::Conflict(conflict.0, conflict.1)
    }
}

/// Inference state for one candidate method.
pub struct InferenceContext<'a> {
    db: &'a dyn TypeDatabase,
    method: MethodId,
    table: InPlaceUnificationTable<InferenceVar>,
    vars: Vec<InferenceVar>,
}

impl<'a> InferenceContext<'a> {
    /// One fresh variable per type parameter of `method`.
    pub fn new(db: &'a dyn TypeDatabase, method: MethodId) -> Self {
        let arity = db.method(method).map(|m| m.type_params.len()).unwrap_or(0);
        let mut table = InPlaceUnificationTable::new();
        let vars = (0..arity)
            .map(|_| table.new_key(InferenceValue(None)))
            .collect();
        InferenceContext {
            db,
            method,
            table,
            vars,
        }
    }

    pub fn var_for(&self, param: TypeParamRef) -> Option<InferenceVar> {
        if !param.is_method_param_of(self.method) {
            return None;
        }
        self.vars.get(param.index as usize).copied()
    }

    pub fn probe(&mut self, var: InferenceVar) -> Option<TypeId> {
        self.table.probe_value(var).0
    }

    /// Bind `var` to `ty`.
    pub fn unify_var_type(&mut self, var: InferenceVar, ty: TypeId) -> Result<(), InferenceError> {
        if self.occurs_in(var, ty) {
            return Err(InferenceError::OccursCheck { var, ty });
        }
        self.table.unify_var_value(var, InferenceValue(Some(ty)))?;
        Ok(())
    }

    pub fn unify_vars(&mut self, a: InferenceVar, b: InferenceVar) -> Result<(), InferenceError> {
        self.table.unify_var_var(a, b)?;
        Ok(())
    }

    fn occurs_in(&self, var: InferenceVar, ty: TypeId) -> bool {
        let method = self.method;
        let index = var.0;
        mentions_type_param(self.db, ty, &|p| {
            p.is_method_param_of(method) && u32::from(p.index) == index
        })
    }

    /// Structurally match `pattern` (which may mention this method's type
    /// parameters) against the concrete type `actual`, binding variables.
    pub fn unify(&mut self, pattern: TypeId, actual: TypeId) -> Result<(), InferenceError> {
        self.unify_at(pattern, actual, 0)
    }

    fn unify_at(&mut self, pattern: TypeId, actual: TypeId, depth: u32) -> Result<(), InferenceError> {
        if depth > MAX_INFERENCE_DEPTH {
            return Err(InferenceError::Conflict(pattern, actual));
        }
        if pattern == actual {
            return Ok(());
        }
        let pattern_data = self.db.lookup(pattern);
        if let TypeData::TypeParam(param) = pattern_data {
            if let Some(var) = self.var_for(param) {
                return self.unify_var_type(var, actual);
            }
        }
        match (pattern_data, self.db.lookup(actual)) {
            (
                TypeData::Named { def, args },
                TypeData::Named {
                    def: actual_def,
                    args: actual_args,
                },
            ) if def == actual_def && args.len() == actual_args.len() => {
                for (&p, &a) in args.iter().zip(actual_args.iter()) {
                    self.unify_at(p, a, depth + 1)?;
                }
                Ok(())
            }
            (
                TypeData::Array { element, rank },
                TypeData::Array {
                    element: actual_element,
                    rank: actual_rank,
                },
            ) if rank == actual_rank => self.unify_at(element, actual_element, depth + 1),
            _ => Err(InferenceError::Conflict(pattern, actual)),
        }
    }

    /// Bindings found so far. Unbound parameters are absent.
    pub fn substitution(&mut self) -> Substitution {
        let mut subst = Substitution::new();
        for index in 0..self.vars.len() {
            let var = self.vars[index];
            if let Some(ty) = self.probe(var) {
                subst.insert(TypeParamRef::of_method(self.method, index as u16), ty);
            }
        }
        subst
    }

    /// Every variable's binding, failing on the first unbound one.
    pub fn resolve_all(&mut self) -> Result<Substitution, InferenceError> {
        for index in 0..self.vars.len() {
            let var = self.vars[index];
            if self.probe(var).is_none() {
                return Err(InferenceError::Unresolved(var));
            }
        }
        Ok(self.substitution())
    }
}

#[cfg(test)]
#[path = "../tests/infer_tests.rs"]
mod tests;
