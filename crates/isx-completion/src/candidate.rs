//! Extension method candidates and the symbol space they are drawn from.
//!
//! The symbol space of a compilation is every extension method of its
//! reference set followed by every extension method of its own documents.
//! Reference candidates only depend on the reference set, so they are built
//! once per `ReferenceKey` and shared through the process-wide
//! `SurfaceCache`; source candidates come from the compilation snapshot.

use dashmap::DashMap;
use isx_binder::{BoundReferences, Compilation, ReferenceKey, is_extension_container};
use isx_common::limits::CANCELLATION_CHECK_INTERVAL;
use isx_common::{Atom, CancellationToken, Cancelled};
use isx_solver::{
    Accessibility, AssemblyId, DefFlags, DefId, MethodFlags, MethodId, TypeDatabase, TypeId,
};
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::{debug, trace};

/// Effective accessibility of a candidate, as far as completion cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CandidateAccessibility {
    Public,
    /// `internal` and `protected internal`
    Internal,
    /// `private`, `protected`, `private protected`
    ProtectedOrPrivate,
}

impl From<Accessibility> for CandidateAccessibility {
    fn from(accessibility: Accessibility) -> Self {
        match accessibility {
            Accessibility::Public => CandidateAccessibility::Public,
            Accessibility::ProtectedInternal | Accessibility::Internal => {
                CandidateAccessibility::Internal
            }
            Accessibility::Protected
            | Accessibility::PrivateProtected
            | Accessibility::Private => CandidateAccessibility::ProtectedOrPrivate,
        }
    }
}

/// An extension method that may be offered at a member access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtensionCandidate {
    pub method: MethodId,
    pub name: Atom,
    pub declaring_namespace: Atom,
    /// The static class declaring the method.
    pub container: DefId,
    pub assembly: AssemblyId,
    /// The method or its container is `[Obsolete]`.
    pub is_obsolete: bool,
    pub accessibility: CandidateAccessibility,
    pub first_parameter_type: TypeId,
    pub generic_arity: u16,
}

impl ExtensionCandidate {
    /// Describe `method`; `None` unless it is a well-formed extension method.
    pub fn from_method(db: &dyn TypeDatabase, method: MethodId) -> Option<ExtensionCandidate> {
        let info = db.method(method)?;
        let receiver = info.params.first()?;
        if !info.is_extension() {
            return None;
        }
        let container = db.def(info.container)?;
        let defs = db.defs();
        let accessibility = info
            .accessibility
            .restrict(defs.effective_accessibility(info.container));
        Some(ExtensionCandidate {
            method,
            name: info.name,
            declaring_namespace: defs.namespace_of(info.container),
            container: info.container,
            assembly: container.assembly,
            is_obsolete: info.flags.contains(MethodFlags::OBSOLETE)
                || container.flags.contains(DefFlags::OBSOLETE),
            accessibility: accessibility.into(),
            first_parameter_type: receiver.ty,
            generic_arity: info.arity(),
        })
    }
}

// =============================================================================
// Library surfaces
// =============================================================================

/// Extension candidates of one reference set, in reference and declaration
/// order. Never mutated after construction.
#[derive(Debug)]
pub struct LibrarySurface {
    pub key: ReferenceKey,
    pub candidates: Vec<ExtensionCandidate>,
}

impl LibrarySurface {
    /// Walk the containers of `references`, checking `cancellation` between
    /// them.
    pub fn build(
        references: &BoundReferences,
        cancellation: &CancellationToken,
    ) -> Result<LibrarySurface, Cancelled> {
        let db = &references.env;
        let defs = &references.env.defs;
        let mut candidates = Vec::new();
        for def in defs.local_defs() {
            let Some(info) = defs.def(def).filter(|info| is_extension_container(info)) else {
                continue;
            };
            cancellation.check()?;
            candidates.extend(
                info.methods
                    .iter()
                    .filter_map(|&method| ExtensionCandidate::from_method(db, method)),
            );
        }
        debug!(
            libraries = references.key.0.len(),
            candidates = candidates.len(),
            "built library surface"
        );
        Ok(LibrarySurface {
            key: references.key.clone(),
            candidates,
        })
    }
}

/// Process-wide cache of library surfaces keyed by reference set.
///
/// Candidate ids belong to the bound layer of one reference set, so two sets
/// that share a library each hold their own surface for it. Entries are
/// replaced wholesale when a library changes version, `invalidate` drops
/// every set containing a library, and a cancelled build leaves no entry
/// behind.
#[derive(Debug, Default)]
pub struct SurfaceCache {
    entries: DashMap<ReferenceKey, Arc<LibrarySurface>>,
}

static GLOBAL_SURFACES: Lazy<Arc<SurfaceCache>> = Lazy::new(|| Arc::new(SurfaceCache::new()));

impl SurfaceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> Arc<SurfaceCache> {
        GLOBAL_SURFACES.clone()
    }

    pub fn get_or_build(
        &self,
        references: &BoundReferences,
        cancellation: &CancellationToken,
    ) -> Result<Arc<LibrarySurface>, Cancelled> {
        if let Some(entry) = self.entries.get(&references.key) {
            return Ok(entry.value().clone());
        }
        let surface = Arc::new(LibrarySurface::build(references, cancellation)?);
        let key = references.key.clone();
        self.entries
            .retain(|existing, _| existing == &key || !existing.same_libraries(&key));
        Ok(self.entries.entry(key).or_insert(surface).value().clone())
    }

    /// Drop every surface that includes library `name`.
    pub fn invalidate(&self, name: &str) {
        self.entries.retain(|key, _| !key.contains_library(name));
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Symbol space
// =============================================================================

/// All extension candidates visible to one compilation.
pub struct SymbolSpace<'c> {
    compilation: &'c Compilation,
    library: Option<Arc<LibrarySurface>>,
}

impl<'c> SymbolSpace<'c> {
    /// The symbol space of `compilation`. With `user_code_only` the reference
    /// set is left out.
    pub fn new(
        compilation: &'c Compilation,
        surfaces: &SurfaceCache,
        user_code_only: bool,
        cancellation: &CancellationToken,
    ) -> Result<SymbolSpace<'c>, Cancelled> {
        let library = if user_code_only {
            None
        } else {
            Some(surfaces.get_or_build(compilation.references(), cancellation)?)
        };
        Ok(SymbolSpace {
            compilation,
            library,
        })
    }

    /// Candidates in enumeration order: referenced libraries in reference
    /// order, then documents in program order.
    ///
    /// Yields `Err(Cancelled)` once, and then stops, when `cancellation` is
    /// observed between containers.
    pub fn candidates<'s>(
        &'s self,
        cancellation: &'s CancellationToken,
    ) -> impl Iterator<Item = Result<ExtensionCandidate, Cancelled>> + 's {
        let db = self.compilation.db();
        let library = self
            .library
            .iter()
            .flat_map(|surface| surface.candidates.iter().copied());
        let sources = self
            .compilation
            .source_extension_methods()
            .iter()
            .filter_map(move |&method| {
                let candidate = ExtensionCandidate::from_method(db, method);
                if candidate.is_none() {
                    trace!(?method, "skipping malformed extension method");
                }
                candidate
            });

        let mut previous_container = None;
        let mut stopped = false;
        library
            .chain(sources)
            .enumerate()
            .map_while(move |(index, candidate)| {
                if stopped {
                    return None;
                }
                let crossed = previous_container != Some(candidate.container);
                previous_container = Some(candidate.container);
                if (crossed || index % CANCELLATION_CHECK_INTERVAL == 0)
                    && cancellation.is_cancelled()
                {
                    stopped = true;
                    return Some(Err(Cancelled));
                }
                Some(Ok(candidate))
            })
    }
}

#[cfg(test)]
#[path = "../tests/candidate_tests.rs"]
mod tests;
