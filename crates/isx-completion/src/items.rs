//! Completion items and their construction from accepted candidates.

use crate::candidate::ExtensionCandidate;
use crate::context::ReceiverContext;
use crate::options::CompletionOptions;
use indexmap::{IndexMap, IndexSet};
use isx_common::{Atom, Span};
use isx_solver::{Substitution, TypeDatabase, TypeFormatter, TypeId, substitute};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Sort text prefixes. Lower strings appear first.
pub mod sort_priority {
    /// Members of namespaces already imported at the caret.
    pub const IMPORTED: &str = "0";
    /// Members whose namespace is imported when the item is accepted.
    pub const NOT_IMPORTED: &str = "1";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CompletionTag {
    ExtensionMethod,
    /// The method declares type parameters; the label ends in `<>`.
    Generic,
    /// Accepting the item adds a `using` directive.
    RequiresImport,
}

/// What happens when an item is accepted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitAction {
    /// Plain text that replaces `replacement_span`.
    pub insert_text: String,
    pub replacement_span: Span,
    /// Namespace to import afterwards, when it is not imported at the caret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_namespace: Option<String>,
    pub place_system_namespace_first: bool,
}

/// A completion item to be suggested to the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionItem {
    /// Display text: the method name, `Select<>` for generic methods.
    pub label: String,
    /// See [`sort_priority`].
    pub sort_text: String,
    /// Namespace of the declaring static class; empty for the global namespace.
    pub origin_namespace: String,
    /// Text inserted by the editor. For snippets this contains `$1`.
    pub insert_text: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_snippet: bool,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<CompletionTag>,
    /// Signature shown next to the label.
    pub detail: String,
    pub commit: CommitAction,
    /// The candidate this item was built from.
    #[serde(skip)]
    pub candidate: Option<ExtensionCandidate>,
}

impl CompletionItem {
    pub fn new(label: impl Into<String>, origin_namespace: impl Into<String>) -> Self {
        let label = label.into();
        CompletionItem {
            sort_text: format!("{}{label}", sort_priority::IMPORTED),
            insert_text: label.clone(),
            commit: CommitAction {
                insert_text: label.clone(),
                ..CommitAction::default()
            },
            label,
            origin_namespace: origin_namespace.into(),
            is_snippet: false,
            tags: BTreeSet::new(),
            detail: String::new(),
            candidate: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    pub fn with_sort_text(mut self, sort_text: impl Into<String>) -> Self {
        self.sort_text = sort_text.into();
        self
    }

    pub fn with_insert_text(mut self, insert_text: impl Into<String>) -> Self {
        self.insert_text = insert_text.into();
        self
    }

    /// Mark the insert text as a snippet with tab stops.
    pub fn as_snippet(mut self) -> Self {
        self.is_snippet = true;
        self
    }

    pub fn with_tag(mut self, tag: CompletionTag) -> Self {
        self.tags.insert(tag);
        self
    }

    pub fn with_commit(mut self, commit: CommitAction) -> Self {
        self.commit = commit;
        self
    }

    pub fn with_candidate(mut self, candidate: ExtensionCandidate) -> Self {
        self.candidate = Some(candidate);
        self
    }

    pub fn requires_import(&self) -> bool {
        self.commit.import_namespace.is_some()
    }

    /// `(sort text, label, origin namespace, detail)`
    pub fn sort_key(&self) -> (&str, &str, &str, &str) {
        (
            &self.sort_text,
            &self.label,
            &self.origin_namespace,
            &self.detail,
        )
    }
}

pub fn compare_items(a: &CompletionItem, b: &CompletionItem) -> Ordering {
    a.sort_key().cmp(&b.sort_key())
}

/// Prefix rule for the typed member name. Case-insensitive matching folds
/// ASCII letters only.
pub fn matches_prefix(name: &str, prefix: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        name.starts_with(prefix)
    } else {
        name.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    }
}

/// Turns accepted candidates into deduplicated, ordered items.
pub struct ItemBuilder<'a> {
    db: &'a dyn TypeDatabase,
    context: &'a ReceiverContext,
    options: &'a CompletionOptions,
    imported: &'a IndexSet<Atom>,
    /// Keyed by `(name, parameters without the receiver, namespace)`.
    items: IndexMap<(Atom, String, Atom), CompletionItem>,
}

impl<'a> ItemBuilder<'a> {
    pub fn new(
        db: &'a dyn TypeDatabase,
        context: &'a ReceiverContext,
        options: &'a CompletionOptions,
        imported: &'a IndexSet<Atom>,
    ) -> Self {
        ItemBuilder {
            db,
            context,
            options,
            imported,
            items: IndexMap::new(),
        }
    }

    pub fn matches_prefix(&self, candidate: &ExtensionCandidate) -> bool {
        matches_prefix(
            candidate.name.as_str(),
            &self.context.typed_prefix,
            self.options.case_sensitive_prefix,
        )
    }

    /// Add an accepted candidate. `subst` holds the method type arguments
    /// inferred from the receiver. Repeated signatures keep the first item.
    pub fn add(&mut self, candidate: &ExtensionCandidate, subst: &Substitution) {
        let formatter = TypeFormatter::new(self.db);
        let parameters = formatter.parameter_list(candidate.method, true, &Substitution::new());
        let key = (candidate.name, parameters, candidate.declaring_namespace);
        if self.items.contains_key(&key) {
            return;
        }
        let item = self.build(candidate, subst, &formatter);
        self.items.insert(key, item);
    }

    fn build(
        &self,
        candidate: &ExtensionCandidate,
        subst: &Substitution,
        formatter: &TypeFormatter<'_>,
    ) -> CompletionItem {
        let name = candidate.name.as_str();
        let namespace = candidate.declaring_namespace.as_str();
        let is_imported = self.imported.contains(&candidate.declaring_namespace);

        let label = if candidate.generic_arity > 0 {
            format!("{name}<>")
        } else {
            name.to_string()
        };
        let priority = if is_imported || !self.options.sort_after_imported {
            sort_priority::IMPORTED
        } else {
            sort_priority::NOT_IMPORTED
        };

        let return_type = self
            .db
            .method(candidate.method)
            .map_or(TypeId::ERROR, |m| substitute(self.db, m.return_type, subst));
        let detail = format!(
            "(extension) {} {}.{}{}",
            formatter.format(return_type),
            self.db.defs().nested_name(candidate.container),
            formatter.method_name(candidate.method),
            formatter.parameter_list(candidate.method, true, subst)
        );

        let mut item = CompletionItem::new(label, namespace)
            .with_sort_text(format!("{priority}{name}"))
            .with_detail(detail)
            .with_tag(CompletionTag::ExtensionMethod)
            .with_candidate(*candidate)
            .with_commit(CommitAction {
                insert_text: name.to_string(),
                replacement_span: self.context.replacement_span,
                import_namespace: (!is_imported).then(|| namespace.to_string()),
                place_system_namespace_first: self.options.place_system_namespace_first,
            });
        if candidate.generic_arity > 0 {
            item = item.with_tag(CompletionTag::Generic);
        }
        if !is_imported {
            item = item.with_tag(CompletionTag::RequiresImport);
        }
        if self.options.method_snippets {
            let takes_arguments = self
                .db
                .method(candidate.method)
                .is_some_and(|m| m.params.len() > 1);
            let snippet = if takes_arguments {
                format!("{name}($1)")
            } else {
                format!("{name}()")
            };
            item = item.with_insert_text(snippet).as_snippet();
        }
        item
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The items in presentation order.
    pub fn finish(self) -> Vec<CompletionItem> {
        let mut items: Vec<CompletionItem> = self.items.into_values().collect();
        items.sort_by(compare_items);
        items
    }
}

#[cfg(test)]
#[path = "../tests/items_tests.rs"]
mod tests;
