use clap::Parser;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::args::{CliArgs, Command, CompleteArgs};
use super::driver::{caret_offset, render_text, run_complete};

const PROGRAM: &str = r#"using System.Collections.Generic;

class Program
{
    void Run(List<string> list)
    {
        list.Sel
    }
}
"#;

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, contents).unwrap();
    path
}

fn parse(argv: &[&str]) -> CompleteArgs {
    let mut full = vec!["isx", "complete"];
    full.extend_from_slice(argv);
    match CliArgs::try_parse_from(full).unwrap().command {
        Command::Complete(args) => args,
    }
}

#[test]
fn caret_from_each_form() {
    let text = "class C\n{\n    list.\n}\n";
    let expected = (text.find("list.").unwrap() + 5) as u32;

    assert_eq!(caret_offset(&parse(&["a.cs", "--after", "list."]), text).unwrap(), expected);
    assert_eq!(
        caret_offset(&parse(&["a.cs", "--line", "3", "--column", "10"]), text).unwrap(),
        expected
    );
    assert_eq!(
        caret_offset(&parse(&["a.cs", "--offset", &expected.to_string()]), text).unwrap(),
        expected
    );
}

#[test]
fn caret_errors() {
    let text = "class C { }";
    assert!(caret_offset(&parse(&["a.cs", "--offset", "100"]), text).is_err());
    assert!(caret_offset(&parse(&["a.cs", "--after", "missing"]), text).is_err());
    assert!(caret_offset(&parse(&["a.cs", "--line", "0", "--column", "1"]), text).is_err());
    assert!(caret_offset(&parse(&["a.cs", "--line", "9", "--column", "1"]), text).is_err());
}

#[test]
fn lists_items_as_text() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "Program.cs", PROGRAM);

    let output = run_complete(&parse(&["Program.cs", "--after", "list.Sel"]), temp.path()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Select<>\tSystem.Linq\t(extension) "));
    assert!(lines[0].ends_with("\t+using"));
    assert!(lines[2].starts_with("SelectMany<>\t"));
}

#[test]
fn lists_items_as_json() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "Program.cs", PROGRAM);

    let output = run_complete(
        &parse(&["Program.cs", "--after", "list.Sel", "--format", "json"]),
        temp.path(),
    )
    .unwrap();
    let items: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(items[0]["label"], "Select<>");
    assert_eq!(items[0]["sortText"], "1Select");
    assert_eq!(items[0]["commit"]["importNamespace"], "System.Linq");
}

#[test]
fn commit_adds_the_using() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "Program.cs", PROGRAM);

    let output = run_complete(
        &parse(&["Program.cs", "--after", "list.Sel", "--commit", "Select<>"]),
        temp.path(),
    )
    .unwrap();
    assert!(output.starts_with("using System.Collections.Generic;\nusing System.Linq;\n"));
    assert!(output.contains("list.Select\n"));
}

#[test]
fn commit_of_unknown_label_fails() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "Program.cs", PROGRAM);
    let result = run_complete(
        &parse(&["Program.cs", "--after", "list.Sel", "--commit", "Where<>"]),
        temp.path(),
    );
    assert!(result.is_err());
}

#[test]
fn project_file_and_references() {
    let temp = TempDir::new().unwrap();
    let source = "class Program\n{\n    void Run(object obj)\n    {\n        obj.\n    }\n}\n";
    write_file(temp.path(), "src/Program.cs", source);
    write_file(
        temp.path(),
        "src/Local.cs",
        "namespace App { public static class Local { public static void Here(this object o) { } } }",
    );
    write_file(
        temp.path(),
        "lib/Helpers.cs",
        "namespace Helpers { public static class H { public static void Help(this object o) { } } }",
    );
    write_file(
        temp.path(),
        "Extra.cs",
        "namespace Extra { public static class E { public static void More(this object o) { } } }",
    );
    write_file(
        temp.path(),
        "src/isx.json",
        r#"{
          "assemblyName": "App",
          "files": ["Program.cs", "Local.cs"],
          "references": [{ "name": "Helpers", "files": ["../lib/Helpers.cs"] }]
        }"#,
    );

    let output = run_complete(
        &parse(&["src/Program.cs", "--after", "obj.", "-r", "Extra.cs"]),
        temp.path(),
    )
    .unwrap();
    let labels: Vec<&str> = output.lines().filter_map(|l| l.split('\t').next()).collect();
    assert_eq!(labels, ["Help", "Here", "More"]);
}

#[test]
fn render_marks_items_needing_an_import() {
    let items = vec![
        isx_completion::CompletionItem::new("Go", "Tools").with_detail("(extension) void T.Go()"),
    ];
    assert_eq!(render_text(&items), "Go\tTools\t(extension) void T.Go()\n");
}
