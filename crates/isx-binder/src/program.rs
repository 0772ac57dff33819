//! Programs and the libraries they reference.
//!
//! A `Program` is the input of a `Compilation`: the documents being edited
//! plus an ordered reference set. Libraries are declaration-only C# sources
//! identified by name and version; the identities of a reference set form the
//! `ReferenceKey` the shared caches are keyed by.

use crate::libs::core_libraries;
use std::sync::Arc;

/// One source file: a display name and its text.
#[derive(Clone, Debug)]
pub struct SourceText {
    pub name: String,
    pub text: Arc<str>,
}

impl SourceText {
    pub fn new(name: impl Into<String>, text: impl Into<Arc<str>>) -> Self {
        SourceText {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Name and version of a library.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LibraryIdentity {
    pub name: String,
    pub version: String,
}

/// A referenced library.
#[derive(Clone, Debug)]
pub struct Library {
    pub name: String,
    pub version: String,
    pub files: Vec<SourceText>,
}

impl Library {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Library {
            name: name.into(),
            version: version.into(),
            files: Vec::new(),
        }
    }

    pub fn with_file(mut self, name: impl Into<String>, text: impl Into<Arc<str>>) -> Self {
        self.files.push(SourceText::new(name, text));
        self
    }

    pub fn identity(&self) -> LibraryIdentity {
        LibraryIdentity {
            name: self.name.clone(),
            version: self.version.clone(),
        }
    }
}

/// Ordered identities of a reference set.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReferenceKey(pub Vec<LibraryIdentity>);

impl ReferenceKey {
    pub fn of(libraries: &[Arc<Library>]) -> Self {
        ReferenceKey(libraries.iter().map(|l| l.identity()).collect())
    }

    pub fn contains_library(&self, name: &str) -> bool {
        self.0.iter().any(|id| id.name == name)
    }

    /// Same libraries in the same order, possibly at other versions.
    pub fn same_libraries(&self, other: &ReferenceKey) -> bool {
        self.0.len() == other.0.len()
            && self.0.iter().zip(&other.0).all(|(a, b)| a.name == b.name)
    }
}

#[derive(Clone, Debug)]
pub struct Program {
    pub assembly_name: String,
    pub documents: Vec<SourceText>,
    pub references: Vec<Arc<Library>>,
    /// Prepend the embedded `System.Runtime` and `System.Linq` libraries.
    pub include_core_library: bool,
}

impl Program {
    pub fn new(assembly_name: impl Into<String>) -> Self {
        Program {
            assembly_name: assembly_name.into(),
            documents: Vec::new(),
            references: Vec::new(),
            include_core_library: true,
        }
    }

    pub fn with_document(mut self, name: impl Into<String>, text: impl Into<Arc<str>>) -> Self {
        self.documents.push(SourceText::new(name, text));
        self
    }

    pub fn with_reference(mut self, library: Library) -> Self {
        self.references.push(Arc::new(library));
        self
    }

    pub fn without_core_library(mut self) -> Self {
        self.include_core_library = false;
        self
    }

    /// The full reference set in binding order: core libraries first.
    pub fn reference_set(&self) -> Vec<Arc<Library>> {
        let mut libraries = Vec::new();
        if self.include_core_library {
            libraries.extend(core_libraries().iter().cloned());
        }
        libraries.extend(self.references.iter().cloned());
        libraries
    }

    pub fn reference_key(&self) -> ReferenceKey {
        ReferenceKey::of(&self.reference_set())
    }
}
