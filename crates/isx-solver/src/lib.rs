//! Type graph and type relations for the isx completion engine.
//!
//! This crate provides:
//! - `TypeInterner` - Layered interning of `TypeData` into `TypeId` handles
//! - `DefinitionStore` - Type and method declarations, layered the same way
//! - `TypeDatabase` - The query surface solver algorithms run against
//! - `hierarchy` / `relations` - Supertypes and implicit conversions
//! - `infer` - `ena`-backed method type argument inference
//! - `extension_match` - Extension method receiver applicability
//! - `format` - C#-style type display

pub mod types;
pub use types::*;

pub mod intern;
pub use intern::TypeInterner;

pub mod def;
pub use def::*;

pub mod well_known;
pub use well_known::{SpecialType, WellKnown};

pub mod db;
pub use db::{TypeDatabase, TypeEnv};

pub mod subst;
pub use subst::{Substitution, mentions_type_param, substitute};

pub mod hierarchy;
pub mod relations;
pub use relations::{is_implicitly_convertible, is_reference_type, is_value_type};

pub mod infer;
pub use infer::{InferenceContext, InferenceError, InferenceVar};

pub mod extension_match;
pub use extension_match::{MatchError, is_applicable_receiver, match_extension_receiver};

pub mod format;
pub use format::{TypeFormatter, format_type};

#[cfg(test)]
#[path = "../tests/fixture.rs"]
pub(crate) mod fixture;
