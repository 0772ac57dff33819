use super::*;
use crate::context::classify_receiver;
use isx_binder::{Compilation, Program};

#[test]
fn test_matches_prefix() {
    assert!(matches_prefix("Select", "", false));
    assert!(matches_prefix("Select", "Sel", false));
    assert!(matches_prefix("Select", "sel", false));
    assert!(matches_prefix("Select", "SELECT", false));
    assert!(!matches_prefix("Select", "Selects", false));
    assert!(!matches_prefix("Select", "elect", false));

    assert!(matches_prefix("Select", "Sel", true));
    assert!(!matches_prefix("Select", "sel", true));
}

#[test]
fn test_matches_prefix_does_not_split_characters() {
    assert!(!matches_prefix("Ünder", "U", false));
    assert!(matches_prefix("Ünder", "Ü", false));
}

#[test]
fn test_item_serialization() {
    let item = CompletionItem::new("Where", "System.Linq")
        .with_sort_text("1Where")
        .with_detail("(extension) IEnumerable<string> Enumerable.Where<string>(Func<string, bool> predicate)")
        .with_tag(CompletionTag::RequiresImport)
        .with_tag(CompletionTag::ExtensionMethod);
    let json = serde_json::to_value(&item).unwrap();

    assert_eq!(json["label"], "Where");
    assert_eq!(json["sortText"], "1Where");
    assert_eq!(json["originNamespace"], "System.Linq");
    assert_eq!(
        json["tags"],
        serde_json::json!(["extensionMethod", "requiresImport"])
    );
    assert!(json.get("isSnippet").is_none());
    assert!(json.get("candidate").is_none());
    assert!(json["commit"].get("importNamespace").is_none());
    assert_eq!(json["commit"]["insertText"], "Where");
}

#[test]
fn test_compare_items_breaks_ties_by_namespace() {
    let mut items = vec![
        CompletionItem::new("Go", "Zeta").with_sort_text("1Go"),
        CompletionItem::new("Go", "Alpha").with_sort_text("1Go"),
        CompletionItem::new("Any", "Zeta").with_sort_text("1Any"),
        CompletionItem::new("Stop", "Zeta").with_sort_text("0Stop"),
    ];
    items.sort_by(compare_items);
    let order: Vec<(&str, &str)> = items
        .iter()
        .map(|i| (i.label.as_str(), i.origin_namespace.as_str()))
        .collect();
    assert_eq!(
        order,
        [("Stop", "Zeta"), ("Any", "Zeta"), ("Go", "Alpha"), ("Go", "Zeta")]
    );
}

const SOURCE: &str = r#"
using System.Collections.Generic;

namespace Tools
{
    public static class Texts
    {
        public static string Shout(this string s) => s;
        public static T Pick<T>(this IEnumerable<T> source, int index) => default(T);
    }
}

class Program
{
    void Run(List<string> list)
    {
        list.
    }
}
"#;

fn build_items(options: &CompletionOptions) -> Vec<CompletionItem> {
    let compilation = Compilation::new(&Program::new("Tests").with_document("test.cs", SOURCE));
    let file = compilation.file_by_name("test.cs").unwrap();
    let model = compilation.semantic_model(file).unwrap();
    let offset = SOURCE.find("list.").unwrap() as u32 + 5;
    let context = classify_receiver(&model, offset).unwrap();
    let imported = compilation.imported_namespaces_at(file, offset);

    let mut builder = ItemBuilder::new(compilation.db(), &context, options, &imported);
    for method in compilation.source_extension_methods() {
        let candidate = ExtensionCandidate::from_method(compilation.db(), *method).unwrap();
        if candidate.name.as_str() == "Pick" {
            let subst = isx_solver::match_extension_receiver(
                compilation.db(),
                context.receiver_type,
                candidate.method,
            )
            .unwrap();
            builder.add(&candidate, &subst);
            builder.add(&candidate, &subst);
        }
    }
    assert_eq!(builder.len(), 1);
    builder.finish()
}

#[test]
fn test_generic_item_from_unimported_namespace() {
    let items = build_items(&CompletionOptions::default());
    let pick = &items[0];

    assert_eq!(pick.label, "Pick<>");
    assert_eq!(pick.sort_text, "1Pick");
    assert_eq!(pick.origin_namespace, "Tools");
    assert_eq!(pick.insert_text, "Pick");
    assert_eq!(pick.detail, "(extension) string Texts.Pick<T>(int index)");
    assert!(pick.requires_import());
    assert_eq!(pick.commit.import_namespace.as_deref(), Some("Tools"));
    assert!(pick.tags.contains(&CompletionTag::Generic));
    assert!(pick.tags.contains(&CompletionTag::RequiresImport));
    assert!(pick.candidate.is_some());
}

#[test]
fn test_snippets_and_flat_sorting() {
    let options = CompletionOptions {
        method_snippets: true,
        sort_after_imported: false,
        ..CompletionOptions::default()
    };
    let items = build_items(&options);
    let pick = &items[0];

    assert_eq!(pick.insert_text, "Pick($1)");
    assert!(pick.is_snippet);
    assert_eq!(pick.commit.insert_text, "Pick");
    assert_eq!(pick.sort_text, "0Pick");
    assert!(pick.requires_import());
}
