//! Compilations: immutable snapshots of a program.
//!
//! A `Compilation` binds the program's documents into a layer over the cached
//! `BoundReferences` of its reference set. Editing a document means building
//! a new compilation; the reference layer is shared.

use crate::declare::{BindFile, LayerBinder};
use crate::program::Program;
use crate::references::{BoundReferences, ReferenceCache};
use crate::scope::{DeclarationMap, Scope};
use crate::semantic::SemanticModel;
use indexmap::IndexSet;
use isx_common::{Atom, FileId};
use isx_parser::SyntaxTree;
use isx_solver::{
    AssemblyId, DefKind, DefinitionInfo, DefinitionStore, MethodId, TypeDatabase, TypeEnv,
    TypeInterner,
};
use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;

/// Version recorded for the compilation's own assembly.
const SOURCE_ASSEMBLY_VERSION: &str = "0.0.0";

#[derive(Debug)]
pub struct Compilation {
    assembly_name: String,
    assembly: AssemblyId,
    references: Arc<BoundReferences>,
    env: TypeEnv,
    files: Vec<BindFile>,
    decls: DeclarationMap,
    source_extensions: OnceCell<Vec<MethodId>>,
    extensions: OnceCell<FxHashMap<Atom, Vec<MethodId>>>,
}

impl Compilation {
    /// Compile `program` against the process-wide reference cache.
    pub fn new(program: &Program) -> Compilation {
        Self::with_cache(program, ReferenceCache::global())
    }

    pub fn with_cache(program: &Program, cache: &ReferenceCache) -> Compilation {
        let references = cache.get_or_bind(&program.reference_set());
        let types = Arc::new(TypeInterner::child(references.env.types.clone()));
        let mut store = DefinitionStore::child(references.env.defs.clone());
        let assembly = store.add_assembly(&program.assembly_name, SOURCE_ASSEMBLY_VERSION);

        let files: Vec<BindFile> = program
            .documents
            .iter()
            .enumerate()
            .map(|(index, document)| BindFile {
                file: FileId(index as u32),
                tree: Arc::new(isx_parser::parse_source_file(&document.name, &document.text)),
                assembly,
            })
            .collect();
        let (store, decls) = LayerBinder::new(&types, store, &files).bind();
        debug!(
            assembly = %program.assembly_name,
            documents = files.len(),
            types = store.local_defs().count(),
            "created compilation"
        );

        Compilation {
            assembly_name: program.assembly_name.clone(),
            assembly,
            references,
            env: TypeEnv::new(types, Arc::new(store)),
            files,
            decls,
            source_extensions: OnceCell::new(),
            extensions: OnceCell::new(),
        }
    }

    pub fn assembly_name(&self) -> &str {
        &self.assembly_name
    }

    /// Assembly of the documents being edited.
    pub fn assembly(&self) -> AssemblyId {
        self.assembly
    }

    pub fn env(&self) -> &TypeEnv {
        &self.env
    }

    pub fn db(&self) -> &dyn TypeDatabase {
        &self.env
    }

    pub fn references(&self) -> &Arc<BoundReferences> {
        &self.references
    }

    pub fn declarations(&self) -> &DeclarationMap {
        &self.decls
    }

    /// Document ids in program order.
    pub fn files(&self) -> impl Iterator<Item = FileId> + '_ {
        self.files.iter().map(|f| f.file)
    }

    pub fn file(&self, file: FileId) -> Option<&SyntaxTree> {
        self.files.get(file.index()).map(|f| f.tree.as_ref())
    }

    pub fn file_by_name(&self, name: &str) -> Option<FileId> {
        self.files
            .iter()
            .find(|f| f.tree.file_name == name)
            .map(|f| f.file)
    }

    pub fn semantic_model(&self, file: FileId) -> Option<SemanticModel<'_>> {
        let tree = self.file(file)?;
        Some(SemanticModel::new(self, file, tree))
    }

    /// Namespaces imported at `offset`: usings in scope, global usings,
    /// enclosing namespaces and their parents, and the global namespace.
    pub fn imported_namespaces_at(&self, file: FileId, offset: u32) -> IndexSet<Atom> {
        let Some(tree) = self.file(file) else {
            return IndexSet::new();
        };
        let node = tree.innermost_node_at(offset);
        Scope::at(tree, file, node, &self.decls).imported_namespaces()
    }

    /// Extension methods declared in the program's documents, in program and
    /// declaration order.
    pub fn source_extension_methods(&self) -> &[MethodId] {
        self.source_extensions
            .get_or_init(|| extension_methods_in(&self.env.defs))
    }

    /// Extension methods named `name`: references first, then sources.
    pub fn extension_methods_named(&self, name: Atom) -> impl Iterator<Item = MethodId> + '_ {
        let from_references = self.references.extension_methods().get(&name);
        let from_sources = self
            .extensions
            .get_or_init(|| index_by_name(&self.env.defs, self.source_extension_methods()))
            .get(&name);
        from_references
            .into_iter()
            .chain(from_sources)
            .flat_map(|methods| methods.iter().copied())
    }
}

/// Top-level, non-generic static classes: the only containers whose `this`
/// methods are extension methods.
pub fn is_extension_container(info: &DefinitionInfo) -> bool {
    info.kind == DefKind::Class
        && info.is_static()
        && info.container.is_none()
        && info.type_params.is_empty()
}

/// Extension methods declared in `store`'s own layer, in declaration order.
pub fn extension_methods_in(store: &DefinitionStore) -> Vec<MethodId> {
    let mut methods = Vec::new();
    for def in store.local_defs() {
        let Some(info) = store.def(def).filter(|info| is_extension_container(info)) else {
            continue;
        };
        methods.extend(
            info.methods
                .iter()
                .copied()
                .filter(|&m| store.method(m).is_some_and(|m| m.is_extension())),
        );
    }
    methods
}

pub(crate) fn index_by_name(
    store: &DefinitionStore,
    methods: &[MethodId],
) -> FxHashMap<Atom, Vec<MethodId>> {
    let mut index: FxHashMap<Atom, Vec<MethodId>> = FxHashMap::default();
    for &method in methods {
        if let Some(info) = store.method(method) {
            index.entry(info.name).or_default().push(method);
        }
    }
    index
}
