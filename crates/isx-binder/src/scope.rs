//! Lookup scopes at a syntax position.
//!
//! A `Scope` is rebuilt from the ancestors of a node whenever a name has to be
//! resolved: enclosing methods and types contribute type parameters and
//! nested types, every namespace declaration contributes one level per name
//! segment, and the compilation unit level carries the file's usings plus the
//! `global using` directives of the whole layer.

use crate::resolve::Resolution;
use indexmap::IndexSet;
use isx_common::{Atom, FileId};
use isx_parser::{NodeIndex, NodeKind, SyntaxTree};
use isx_solver::{DefId, MethodId};
use rustc_hash::FxHashMap;

/// Target of a `using A = ...;` alias.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AliasTarget {
    /// Name node in the scope's own file, resolved on use.
    Syntax(NodeIndex),
    /// A `global using` alias, resolved when its layer was bound.
    Resolved(Resolution),
}

/// `global using` directives of one binding layer.
#[derive(Clone, Debug, Default)]
pub struct GlobalUsings {
    pub imports: Vec<Atom>,
    pub aliases: Vec<(Atom, Resolution)>,
}

/// Declaration nodes of a layer mapped to the definitions they produced.
#[derive(Clone, Debug, Default)]
pub struct DeclarationMap {
    pub types: FxHashMap<(FileId, NodeIndex), DefId>,
    pub methods: FxHashMap<(FileId, NodeIndex), MethodId>,
    pub global_usings: GlobalUsings,
}

#[derive(Clone, Debug)]
pub struct NamespaceLevel {
    /// Full dotted namespace, `Atom::NONE` at the compilation unit.
    pub namespace: Atom,
    pub imports: Vec<Atom>,
    pub aliases: Vec<(Atom, AliasTarget)>,
}

impl NamespaceLevel {
    pub fn new(namespace: Atom) -> Self {
        NamespaceLevel {
            namespace,
            imports: Vec::new(),
            aliases: Vec::new(),
        }
    }

    fn add_usings(&mut self, tree: &SyntaxTree, usings: &[NodeIndex]) {
        for &using in usings {
            let Some(data) = tree.node(using).and_then(|n| tree.arena.get_using(n)) else {
                continue;
            };
            // Global usings reach every file through `GlobalUsings`.
            if data.is_global || data.is_static {
                continue;
            }
            if data.alias.is_some() {
                self.aliases
                    .push((data.alias, AliasTarget::Syntax(data.name)));
            } else if let Some(name) = tree.dotted_name(data.name) {
                self.imports.push(Atom::intern(&name));
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scope {
    /// Innermost first; the last level is the compilation unit.
    pub levels: Vec<NamespaceLevel>,
    /// Enclosing type declarations, innermost first.
    pub types: Vec<DefId>,
    /// Enclosing method declarations, innermost first.
    pub methods: Vec<MethodId>,
}

impl Scope {
    /// Scope seen by `node` (a declaration node sees its own type parameters).
    pub fn at(tree: &SyntaxTree, file: FileId, node: NodeIndex, decls: &DeclarationMap) -> Scope {
        let mut scope = Scope::default();
        let mut namespaces = Vec::new();
        let mut unit = NodeIndex::NONE;

        for current in std::iter::once(node).chain(tree.ancestors(node)) {
            let Some(kind) = tree.kind(current) else {
                continue;
            };
            match kind {
                NodeKind::MethodDeclaration => {
                    if let Some(&method) = decls.methods.get(&(file, current)) {
                        scope.methods.push(method);
                    }
                }
                NodeKind::NamespaceDeclaration => namespaces.push(current),
                NodeKind::CompilationUnit => unit = current,
                k if k.is_type_declaration() => {
                    if let Some(&def) = decls.types.get(&(file, current)) {
                        scope.types.push(def);
                    }
                }
                _ => {}
            }
        }

        // Build namespace levels outermost first, then flip.
        let mut prefix = Atom::NONE;
        for &ns in namespaces.iter().rev() {
            let Some(data) = tree.node(ns).and_then(|n| tree.arena.get_namespace(n)) else {
                continue;
            };
            let Some(dotted) = tree.dotted_name(data.name) else {
                continue;
            };
            let segments: Vec<&str> = dotted.split('.').collect();
            for (i, segment) in segments.iter().enumerate() {
                prefix = join_namespace(prefix, segment);
                let mut level = NamespaceLevel::new(prefix);
                if i + 1 == segments.len() {
                    level.add_usings(tree, &data.usings);
                }
                scope.levels.push(level);
            }
        }
        scope.levels.reverse();

        let mut global = NamespaceLevel::new(Atom::NONE);
        if let Some(data) = tree.node(unit).and_then(|n| tree.arena.get_source_file(n)) {
            global.add_usings(tree, &data.usings);
        }
        global
            .imports
            .extend(decls.global_usings.imports.iter().copied());
        global.aliases.extend(
            decls
                .global_usings
                .aliases
                .iter()
                .map(|&(alias, target)| (alias, AliasTarget::Resolved(target))),
        );
        scope.levels.push(global);
        scope
    }

    /// A scope with only the global namespace and the given global usings.
    pub fn global(usings: &GlobalUsings) -> Scope {
        let mut level = NamespaceLevel::new(Atom::NONE);
        level.imports.extend(usings.imports.iter().copied());
        Scope {
            levels: vec![level],
            types: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn enclosing_type(&self) -> Option<DefId> {
        self.types.first().copied()
    }

    /// Namespaces whose members are in scope: the global namespace, every
    /// enclosing namespace and its parents, and every imported namespace.
    pub fn imported_namespaces(&self) -> IndexSet<Atom> {
        let mut out = IndexSet::new();
        out.insert(Atom::NONE);
        for level in &self.levels {
            if level.namespace.is_some() {
                out.insert(level.namespace);
            }
        }
        for level in &self.levels {
            out.extend(level.imports.iter().copied());
        }
        out
    }
}

/// `A.B` + `C` = `A.B.C`
pub fn join_namespace(prefix: Atom, segment: &str) -> Atom {
    if prefix.is_none() {
        Atom::intern(segment)
    } else {
        Atom::intern(&format!("{prefix}.{segment}"))
    }
}
