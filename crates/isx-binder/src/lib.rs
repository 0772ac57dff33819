//! Declaration binding and expression typing for the isx completion engine.
//!
//! This crate provides:
//! - `Program` / `Library` - The documents and references being compiled
//! - `libs` - Embedded declaration stubs of the core libraries
//! - `BoundReferences` / `ReferenceCache` - Reference sets bound once and shared
//! - `Compilation` - A program's documents bound over its reference layer
//! - `TypeResolver` - C# name lookup for type syntax
//! - `SemanticModel` - Expression classification, call binding, lambda typing

pub mod program;
pub use program::{Library, LibraryIdentity, Program, ReferenceKey, SourceText};

pub mod libs;

pub mod scope;
pub use scope::{DeclarationMap, GlobalUsings, NamespaceLevel, Scope};

pub mod resolve;
pub use resolve::{Resolution, TypeResolver, type_args_of};

mod declare;
pub use declare::BindFile;

pub mod references;
pub use references::{BoundReferences, ReferenceCache};

pub mod compilation;
pub use compilation::{Compilation, extension_methods_in, is_extension_container};

pub mod literals;
pub use literals::{literal_type, numeric_literal_type};

pub mod semantic;
pub use semantic::{ExprClass, ResolvedCall, SemanticModel};
