//! User-facing completion options.
//!
//! Deserialized from the `completion` section of `isx.json`; every field is
//! optional and falls back to its default.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompletionOptions {
    /// Offer extension methods from namespaces that are not imported yet.
    pub suggest_extension_methods: bool,
    /// Sort items from imported namespaces before the rest.
    pub sort_after_imported: bool,
    /// Match the typed prefix case-sensitively.
    pub case_sensitive_prefix: bool,
    /// Insert `Name($1)` snippets instead of the bare name.
    pub method_snippets: bool,
    /// Keep `System` usings ahead of the others when adding one.
    pub place_system_namespace_first: bool,
    /// Only offer extension methods declared in the program's own documents.
    pub user_code_only: bool,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        CompletionOptions {
            suggest_extension_methods: true,
            sort_after_imported: true,
            case_sensitive_prefix: false,
            method_snippets: false,
            place_system_namespace_first: true,
            user_code_only: false,
        }
    }
}
