//! Applicability of a candidate at a receiver.
//!
//! Checks run in a fixed order and the first failure wins:
//! 1. deprecation of the method or its container
//! 2. effective accessibility
//! 3. receiver type compatibility (`isx_solver::extension_match`)

use crate::candidate::{CandidateAccessibility, ExtensionCandidate};
use crate::context::ReceiverContext;
use isx_binder::Compilation;
use isx_solver::{AssemblyId, MatchError, Substitution, TypeDatabase, match_extension_receiver};

/// Why a candidate was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("obsolete")]
    Obsolete,
    #[error("not accessible from the compilation")]
    Inaccessible,
    #[error(transparent)]
    Incompatible(#[from] MatchError),
}

pub struct ApplicabilityFilter<'c> {
    db: &'c dyn TypeDatabase,
    assembly: AssemblyId,
}

impl<'c> ApplicabilityFilter<'c> {
    pub fn new(compilation: &'c Compilation) -> Self {
        ApplicabilityFilter {
            db: compilation.db(),
            assembly: compilation.assembly(),
        }
    }

    /// Run every check; on success return the method type arguments the
    /// receiver determines.
    pub fn check(
        &self,
        candidate: &ExtensionCandidate,
        context: &ReceiverContext,
    ) -> Result<Substitution, Rejection> {
        if candidate.is_obsolete {
            return Err(Rejection::Obsolete);
        }
        if !self.is_accessible(candidate) {
            return Err(Rejection::Inaccessible);
        }
        Ok(match_extension_receiver(
            self.db,
            context.receiver_type,
            candidate.method,
        )?)
    }

    pub fn filter(&self, candidate: &ExtensionCandidate, context: &ReceiverContext) -> bool {
        self.check(candidate, context).is_ok()
    }

    fn is_accessible(&self, candidate: &ExtensionCandidate) -> bool {
        match candidate.accessibility {
            CandidateAccessibility::Public => true,
            CandidateAccessibility::Internal => candidate.assembly == self.assembly,
            CandidateAccessibility::ProtectedOrPrivate => false,
        }
    }
}
