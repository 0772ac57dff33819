use super::config::{find_project_config, load_project_config, parse_project_config};
use std::path::Path;
use tempfile::TempDir;

#[test]
fn parses_defaults() {
    let config = parse_project_config("{}").expect("empty config should parse");
    assert!(config.assembly_name.is_none());
    assert!(config.files.is_empty());
    assert!(config.references.is_empty());
    assert!(!config.no_core_library);
    assert!(config.completion.suggest_extension_methods);
    assert!(config.completion.place_system_namespace_first);
}

#[test]
fn parses_camel_case_fields() {
    let config = parse_project_config(
        r#"{
          "assemblyName": "App",
          "noCoreLibrary": true,
          "references": [{ "name": "Helpers", "files": ["lib/Helpers.cs"] }],
          "completion": { "userCodeOnly": true, "methodSnippets": true }
        }"#,
    )
    .expect("config should parse");
    assert_eq!(config.assembly_name.as_deref(), Some("App"));
    assert!(config.no_core_library);
    assert_eq!(config.references[0].name, "Helpers");
    assert_eq!(config.references[0].version, "1.0.0");
    assert!(config.completion.user_code_only);
    assert!(config.completion.method_snippets);
    assert!(config.completion.sort_after_imported);
}

#[test]
fn rejects_malformed_json() {
    assert!(parse_project_config("{ \"files\": 3 }").is_err());
}

#[test]
fn load_resolves_paths_against_the_project_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("isx.json");
    std::fs::write(
        &path,
        r#"{ "files": ["src/A.cs"], "references": [{ "name": "L", "files": ["lib/L.cs"] }] }"#,
    )
    .unwrap();

    let config = load_project_config(&path).unwrap();
    assert_eq!(config.files, vec![temp.path().join("src/A.cs")]);
    assert_eq!(config.references[0].files, vec![temp.path().join("lib/L.cs")]);
    assert_eq!(find_project_config(&temp.path().join("Program.cs")), Some(path));
}

#[test]
fn load_reports_missing_file() {
    let error = load_project_config(Path::new("/nonexistent/isx.json")).unwrap_err();
    assert!(error.to_string().contains("failed to read project file"));
}
