//! Provider aggregation and commit behaviour.

use isx_binder::{Compilation, Program};
use isx_common::CancellationToken;
use isx_completion::{
    AggregateCompletionProvider, CompletionError, CompletionItem, CompletionOptions,
    CompletionProvider, CompletionRequest, ExtensionMethodCompletionProvider, ImportError,
    ImportInserter, SurfaceCache,
};
use isx_parser::SyntaxTree;
use std::sync::{Arc, Mutex};

const SOURCE: &str = r#"
using System.Collections.Generic;

class Program
{
    void Run(List<string> list)
    {
        list.Sel
    }
}
"#;

fn compile() -> (Compilation, u32) {
    let compilation = Compilation::new(&Program::new("Tests").with_document("test.cs", SOURCE));
    let offset = (SOURCE.find("list.Sel").unwrap() + "list.Sel".len()) as u32;
    (compilation, offset)
}

fn extension_provider() -> ExtensionMethodCompletionProvider {
    ExtensionMethodCompletionProvider::new(CompletionOptions::default())
        .with_surface_cache(Arc::new(SurfaceCache::new()))
}

struct Fixed(Vec<CompletionItem>);

impl CompletionProvider for Fixed {
    fn name(&self) -> &str {
        "fixed"
    }

    fn provide(
        &self,
        _request: &CompletionRequest<'_>,
    ) -> Result<Vec<CompletionItem>, CompletionError> {
        Ok(self.0.clone())
    }
}

struct Failing(CompletionError);

impl CompletionProvider for Failing {
    fn name(&self) -> &str {
        "failing"
    }

    fn provide(
        &self,
        _request: &CompletionRequest<'_>,
    ) -> Result<Vec<CompletionItem>, CompletionError> {
        Err(self.0.clone())
    }
}

fn run(aggregate: &AggregateCompletionProvider) -> Result<Vec<CompletionItem>, CompletionError> {
    let (compilation, offset) = compile();
    let token = CancellationToken::new();
    aggregate.complete(&CompletionRequest {
        compilation: &compilation,
        file: compilation.file_by_name("test.cs").unwrap(),
        offset,
        cancellation: &token,
    })
}

#[test]
fn test_duplicate_items_are_merged() {
    let extensions = Arc::new(extension_provider());
    let aggregate = AggregateCompletionProvider::new()
        .with_provider(extensions.clone())
        .with_provider(extensions);
    let items = run(&aggregate).unwrap();
    let labels: Vec<&str> = items.iter().map(|item| item.label.as_str()).collect();
    assert_eq!(labels, ["Select<>", "Select<>", "SelectMany<>"]);
    assert_ne!(items[0].detail, items[1].detail);
}

#[test]
fn test_items_from_several_providers_are_sorted_together() {
    let keyword = CompletionItem::new("Sealed", "").with_sort_text("0Sealed");
    let aggregate = AggregateCompletionProvider::new()
        .with_provider(Arc::new(extension_provider()))
        .with_provider(Arc::new(Fixed(vec![keyword])));
    let items = run(&aggregate).unwrap();
    assert_eq!(items[0].label, "Sealed");
    assert_eq!(items.len(), 4);
}

#[test]
fn test_failing_provider_is_skipped() {
    let aggregate = AggregateCompletionProvider::new()
        .with_provider(Arc::new(Failing(CompletionError::MalformedProgramState(
            "broken".to_string(),
        ))))
        .with_provider(Arc::new(extension_provider()));
    assert_eq!(aggregate.providers().len(), 2);
    assert_eq!(run(&aggregate).unwrap().len(), 3);
}

#[test]
fn test_cancellation_aborts_the_request() {
    let aggregate = AggregateCompletionProvider::new()
        .with_provider(Arc::new(extension_provider()))
        .with_provider(Arc::new(Failing(CompletionError::Cancelled)));
    assert_eq!(run(&aggregate), Err(CompletionError::Cancelled));
}

// =============================================================================
// Commit
// =============================================================================

#[derive(Default)]
struct Recording {
    calls: Mutex<Vec<(u32, Vec<String>, bool)>>,
}

impl ImportInserter for Recording {
    fn add_imports(
        &self,
        _compilation: &Compilation,
        root: &SyntaxTree,
        context_location: u32,
        namespaces: &[String],
        place_system_namespace_first: bool,
    ) -> Result<String, ImportError> {
        self.calls.lock().unwrap().push((
            context_location,
            namespaces.to_vec(),
            place_system_namespace_first,
        ));
        let usings: String = namespaces.iter().map(|ns| format!("using {ns};")).collect();
        Ok(format!("{usings}{}", root.text))
    }
}

struct Rejecting;

impl ImportInserter for Rejecting {
    fn add_imports(
        &self,
        _compilation: &Compilation,
        _root: &SyntaxTree,
        _context_location: u32,
        namespaces: &[String],
        _place_system_namespace_first: bool,
    ) -> Result<String, ImportError> {
        Err(ImportError::Rejected {
            namespace: namespaces.join(","),
            reason: "read-only document".to_string(),
        })
    }
}

struct Panicking;

impl ImportInserter for Panicking {
    fn add_imports(
        &self,
        _compilation: &Compilation,
        _root: &SyntaxTree,
        _context_location: u32,
        _namespaces: &[String],
        _place_system_namespace_first: bool,
    ) -> Result<String, ImportError> {
        panic!("inserter bug")
    }
}

fn commit_select(
    provider: &ExtensionMethodCompletionProvider,
    source: &str,
    caret: &str,
) -> isx_completion::CommittedText {
    let compilation = Compilation::new(&Program::new("Tests").with_document("test.cs", source));
    let offset = (source.find(caret).unwrap() + caret.len()) as u32;
    let token = CancellationToken::new();
    let request = CompletionRequest {
        compilation: &compilation,
        file: compilation.file_by_name("test.cs").unwrap(),
        offset,
        cancellation: &token,
    };
    let items = provider.complete(&request).unwrap();
    let select = items.iter().find(|item| item.label == "Select<>").unwrap();
    provider.commit(&request, select).unwrap()
}

#[test]
fn test_commit_inserts_name_and_import() {
    let recording = Arc::new(Recording::default());
    let provider = extension_provider().with_import_inserter(recording.clone());
    let committed = commit_select(&provider, SOURCE, "list.Sel");

    assert!(committed.import_added);
    assert!(committed.text.starts_with("using System.Linq;"));
    assert!(committed.text.contains("list.Select\n"));

    let calls = recording.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (location, namespaces, system_first) = &calls[0];
    assert_eq!(namespaces, &["System.Linq".to_string()]);
    assert!(*system_first);
    let expected = (SOURCE.find("list.Sel").unwrap() + "list.Select".len()) as u32;
    assert_eq!(*location, expected);
}

#[test]
fn test_commit_without_import_skips_the_inserter() {
    let recording = Arc::new(Recording::default());
    let provider = extension_provider().with_import_inserter(recording.clone());
    let source = format!("using System.Linq;\n{SOURCE}");
    let committed = commit_select(&provider, &source, "list.Sel");

    assert!(!committed.import_added);
    assert!(committed.text.contains("list.Select\n"));
    assert!(recording.calls.lock().unwrap().is_empty());
}

#[test]
fn test_failed_import_keeps_the_inserted_text() {
    let expected = SOURCE.replace("list.Sel\n", "list.Select\n");

    let rejecting = extension_provider().with_import_inserter(Arc::new(Rejecting));
    let committed = commit_select(&rejecting, SOURCE, "list.Sel");
    assert!(!committed.import_added);
    assert_eq!(committed.text, expected);

    let panicking = extension_provider().with_import_inserter(Arc::new(Panicking));
    let committed = commit_select(&panicking, SOURCE, "list.Sel");
    assert!(!committed.import_added);
    assert_eq!(committed.text, expected);

    let missing = extension_provider();
    let committed = commit_select(&missing, SOURCE, "list.Sel");
    assert!(!committed.import_added);
    assert_eq!(committed.text, expected);
}
