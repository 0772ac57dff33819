use super::*;
use isx_binder::{Compilation, Program};
use isx_solver::format_type;

/// Compile `markup` with the caret marker `$$` removed and classify the caret.
fn context_at(markup: &str, keep_type_names: bool) -> Option<(ReceiverContext, String)> {
    let offset = markup.find("$$").expect("caret marker") as u32;
    let source = markup.replacen("$$", "", 1);
    let compilation = Compilation::new(&Program::new("Tests").with_document("test.cs", source));
    let file = compilation.file_by_name("test.cs").unwrap();
    let model = compilation.semantic_model(file).unwrap();
    let context = if keep_type_names {
        receiver_context(&model, offset)
    } else {
        classify_receiver(&model, offset)
    }?;
    let receiver = format_type(compilation.db(), context.receiver_type);
    Some((context, receiver))
}

fn in_method(body: &str) -> String {
    format!(
        r#"
using System;
using System.Collections.Generic;

class Holder
{{
    public const string Message = "message";
}}

class Program
{{
    void Run(List<string> list, object obj)
    {{
        {body}
    }}
}}
"#
    )
}

#[test]
fn test_plain_member_access() {
    let (context, receiver) = context_at(&in_method("list.$$"), false).unwrap();
    assert_eq!(receiver, "List<string>");
    assert!(!context.is_null_conditional);
    assert!(!context.is_type_name_access);
    assert_eq!(context.typed_prefix, "");
    assert!(context.replacement_span.is_empty());
}

#[test]
fn test_null_conditional_access() {
    let (context, receiver) = context_at(&in_method("list?.$$"), false).unwrap();
    assert_eq!(receiver, "List<string>");
    assert!(context.is_null_conditional);
}

#[test]
fn test_typed_prefix_runs_to_the_caret() {
    let markup = in_method("obj.Som$$");
    let (context, _) = context_at(&markup, false).unwrap();
    assert_eq!(context.typed_prefix, "Som");
    let start = markup.find("Som").unwrap() as u32;
    assert_eq!(context.replacement_span, Span::new(start, start + 3));
}

#[test]
fn test_caret_inside_a_name_replaces_the_whole_name() {
    let markup = in_method("obj.So$$meName;");
    let (context, _) = context_at(&markup, false).unwrap();
    assert_eq!(context.typed_prefix, "So");
    let start = markup.find("So").unwrap() as u32;
    assert_eq!(context.replacement_span.start, start);
    assert_eq!(context.replacement_span.len(), "SomeName".len() as u32);
}

#[test]
fn test_literal_receivers() {
    for (markup, expected) in [
        ("111.$$", "int"),
        ("1L.$$", "long"),
        ("1.5.$$", "double"),
        ("1f.$$", "float"),
        ("1m.$$", "decimal"),
        ("'c'.$$", "char"),
        ("\"s\".$$", "string"),
        ("@\"s\".$$", "string"),
        ("$\"s\".$$", "string"),
        ("true.$$", "bool"),
    ] {
        let (_, receiver) = context_at(&in_method(markup), false)
            .unwrap_or_else(|| panic!("no context for {markup}"));
        assert_eq!(receiver, expected, "{markup}");
    }
}

#[test]
fn test_type_name_receivers_are_terminal() {
    for markup in ["object.$$", "Console.$$", "List<int>.$$", "String.$$"] {
        let source = in_method(markup);
        assert!(context_at(&source, false).is_none(), "{markup}");
        let (context, _) = context_at(&source, true).unwrap();
        assert!(context.is_type_name_access, "{markup}");
    }
}

#[test]
fn test_unusable_receivers() {
    assert!(context_at(&in_method("System.$$"), true).is_none());
    assert!(context_at(&in_method("missing.$$"), true).is_none());
    assert!(context_at(&in_method("Console.WriteLine().$$"), true).is_none());
}

#[test]
fn test_non_code_positions() {
    assert!(context_at(&in_method("// list.$$"), false).is_none());
    assert!(context_at(&in_method("/* list.$$ */"), false).is_none());
    assert!(context_at(&in_method("var s = \"list.$$\";"), false).is_none());
    assert!(context_at(&in_method("var s = \"list.$$"), false).is_none());
    assert!(context_at(&in_method("var d = 1.$$5;"), false).is_none());
    assert!(context_at("using System.$$", false).is_none());
    assert!(context_at("namespace Company.$$", false).is_none());
    assert!(context_at("class C : System.$$", false).is_none());
}

#[test]
fn test_attribute_arguments_are_not_member_access() {
    let source = r#"
class Holder
{
    public const string Message = "message";
}

[System.Obsolete(Holder.Message.$$)]
class C { }
"#;
    assert!(context_at(source, true).is_none());
}

#[test]
fn test_words_after_a_non_dot_are_ignored() {
    assert!(context_at(&in_method("var x = obj$$"), false).is_none());
    assert!(context_at(&in_method("obj. Some $$"), false).is_none());
}

#[test]
fn test_keyword_prefix() {
    let (context, _) = context_at(&in_method("list.in$$"), false).unwrap();
    assert_eq!(context.typed_prefix, "in");
}
