//! Bound reference sets and their process-wide cache.
//!
//! Binding the embedded core libraries is the expensive part of creating a
//! compilation, and every compilation over the same reference set produces
//! the same result. `ReferenceCache` keeps one frozen `BoundReferences` per
//! `ReferenceKey`; compilations layer their sources on top of it.

use crate::declare::{BindFile, LayerBinder};
use crate::program::{Library, ReferenceKey};
use dashmap::DashMap;
use isx_common::{Atom, FileId};
use isx_solver::{AssemblyId, DefinitionStore, MethodId, TypeEnv, TypeInterner};
use once_cell::sync::{Lazy, OnceCell};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;

/// A frozen reference layer.
///
/// The interner inside `env` must not intern new types: compilations hold
/// child interners whose ids start after it. Query through a `Compilation`.
#[derive(Debug)]
pub struct BoundReferences {
    pub key: ReferenceKey,
    pub env: TypeEnv,
    /// `(library, assembly)` in reference order.
    pub assemblies: Vec<(Arc<Library>, AssemblyId)>,
    extension_list: OnceCell<Vec<MethodId>>,
    extensions: OnceCell<FxHashMap<Atom, Vec<MethodId>>>,
}

impl BoundReferences {
    /// Parse and bind `libraries` into a fresh root layer.
    pub fn bind(libraries: &[Arc<Library>]) -> BoundReferences {
        let key = ReferenceKey::of(libraries);
        let types = Arc::new(TypeInterner::new());
        let mut store = DefinitionStore::new();
        let mut files = Vec::new();
        let mut assemblies = Vec::new();
        for library in libraries {
            let assembly = store.add_assembly(&library.name, &library.version);
            assemblies.push((library.clone(), assembly));
            for source in &library.files {
                let tree = isx_parser::parse_source_file(&source.name, &source.text);
                files.push(BindFile {
                    file: FileId(files.len() as u32),
                    tree: Arc::new(tree),
                    assembly,
                });
            }
        }
        let (store, _) = LayerBinder::new(&types, store, &files).bind();
        debug!(
            libraries = libraries.len(),
            types = store.def_count(),
            methods = store.method_count(),
            "bound reference set"
        );
        BoundReferences {
            key,
            env: TypeEnv::new(types, Arc::new(store)),
            assemblies,
            extension_list: OnceCell::new(),
            extensions: OnceCell::new(),
        }
    }

    pub fn assembly_of(&self, name: &str) -> Option<AssemblyId> {
        self.assemblies
            .iter()
            .find(|(library, _)| library.name == name)
            .map(|&(_, id)| id)
    }

    /// Extension methods of the reference set in reference and declaration
    /// order.
    pub fn extension_method_list(&self) -> &[MethodId] {
        self.extension_list
            .get_or_init(|| crate::compilation::extension_methods_in(&self.env.defs))
    }

    /// Extension methods of the reference set, by name, in declaration order.
    pub fn extension_methods(&self) -> &FxHashMap<Atom, Vec<MethodId>> {
        self.extensions.get_or_init(|| {
            crate::compilation::index_by_name(&self.env.defs, self.extension_method_list())
        })
    }
}

/// Process-wide cache of bound reference sets.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    entries: DashMap<ReferenceKey, Arc<BoundReferences>>,
}

static GLOBAL_CACHE: Lazy<ReferenceCache> = Lazy::new(ReferenceCache::new);

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> &'static ReferenceCache {
        &GLOBAL_CACHE
    }

    /// The bound layer for `libraries`, binding it on first use. Entries for
    /// the same libraries at other versions are dropped.
    pub fn get_or_bind(&self, libraries: &[Arc<Library>]) -> Arc<BoundReferences> {
        let key = ReferenceKey::of(libraries);
        if let Some(entry) = self.entries.get(&key) {
            return entry.value().clone();
        }
        let bound = Arc::new(BoundReferences::bind(libraries));
        self.entries
            .retain(|existing, _| existing == &key || !existing.same_libraries(&key));
        self.entries.entry(key).or_insert(bound).value().clone()
    }

    /// Drop every entry that references library `name`.
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
