use isx_binder::{Compilation, ExprClass, Program, numeric_literal_type};
use isx_solver::{SpecialType, TypeDatabase, format_type};

/// Classify the receiver of the member access at the last `receiver.` in
/// `source`.
fn classify(source: &str, receiver: &str) -> String {
    let compilation = Compilation::new(&Program::new("Tests").with_document("test.cs", source));
    let file = compilation.file_by_name("test.cs").unwrap();
    let model = compilation.semantic_model(file).unwrap();
    let tree = model.tree();

    let operator = (source
        .rfind(&format!("{receiver}."))
        .expect("receiver text")
        + receiver.len()) as u32;
    let access = tree
        .find_member_access_by_operator(operator)
        .expect("member access at receiver");
    let expression = tree
        .arena
        .get_member_access(tree.node(access).unwrap())
        .unwrap()
        .expression;

    let db = compilation.db();
    match model.classify_expression(expression) {
        ExprClass::Value(ty) => format!("value {}", format_type(db, ty)),
        ExprClass::Type(ty) => format!("type {}", format_type(db, ty)),
        ExprClass::Namespace(ns) => format!("namespace {ns}"),
        ExprClass::Unknown => "unknown".to_string(),
    }
}

fn in_method(body: &str) -> String {
    format!(
        r#"
using System;
using System.Collections.Generic;
using System.Linq;
using System.Threading.Tasks;

class Program
{{
    int counter;
    string Name {{ get; set; }}

    async Task Run(int[] values, Task<string> pending, int? maybe)
    {{
        {body}
    }}
}}
"#
    )
}

#[test]
fn test_var_local_takes_initializer_type() {
    let source = in_method("var list = new List<string>();\n        list.");
    assert_eq!(classify(&source, "list"), "value List<string>");
}

#[test]
fn test_explicitly_typed_local() {
    let source = in_method("IEnumerable<int> numbers = null;\n        numbers.");
    assert_eq!(classify(&source, "numbers"), "value IEnumerable<int>");
}

#[test]
fn test_parameters_and_fields() {
    assert_eq!(classify(&in_method("values."), "values"), "value int[]");
    assert_eq!(classify(&in_method("maybe."), "maybe"), "value int?");
    assert_eq!(classify(&in_method("counter."), "counter"), "value int");
    assert_eq!(classify(&in_method("Name."), "Name"), "value string");
    assert_eq!(classify(&in_method("this.Name."), "this.Name"), "value string");
}

#[test]
fn test_extension_call_return_type_is_inferred() {
    let source = in_method("var list = new List<string>();\n        list.Where(x => true).");
    assert_eq!(classify(&source, "list.Where(x => true)"), "value IEnumerable<string>");
}

#[test]
fn test_lambda_body_drives_result_type() {
    let source = in_method("var list = new List<string>();\n        list.Select(s => s.Length).");
    assert_eq!(classify(&source, "list.Select(s => s.Length)"), "value IEnumerable<int>");
}

#[test]
fn test_lambda_parameter_type_comes_from_call() {
    let source = in_method("var list = new List<string>();\n        list.Select(s => s.");
    assert_eq!(classify(&source, "s"), "value string");
}

#[test]
fn test_instance_method_call() {
    let source = in_method("var list = new List<int>();\n        list.ToArray().");
    assert_eq!(classify(&source, "list.ToArray()"), "value int[]");
}

#[test]
fn test_element_access_and_indexers() {
    assert_eq!(classify(&in_method("values[0]."), "values[0]"), "value int");
    let source = in_method("var list = new List<string>();\n        list[0].");
    assert_eq!(classify(&source, "list[0]"), "value string");
    let source = in_method("var text = \"abc\";\n        text[0].");
    assert_eq!(classify(&source, "text[0]"), "value char");
}

#[test]
fn test_literals() {
    assert_eq!(classify(&in_method("\"text\"."), "\"text\""), "value string");
    assert_eq!(classify(&in_method("(42)."), "(42)"), "value int");
    assert_eq!(classify(&in_method("'c'."), "'c'"), "value char");
    assert_eq!(classify(&in_method("true."), "true"), "value bool");
}

#[test]
fn test_numeric_literal_types() {
    assert_eq!(numeric_literal_type("42"), SpecialType::Int32);
    assert_eq!(numeric_literal_type("4_000_000_000"), SpecialType::UInt32);
    assert_eq!(numeric_literal_type("10000000000"), SpecialType::Int64);
    assert_eq!(numeric_literal_type("42L"), SpecialType::Int64);
    assert_eq!(numeric_literal_type("42u"), SpecialType::UInt32);
    assert_eq!(numeric_literal_type("42UL"), SpecialType::UInt64);
    assert_eq!(numeric_literal_type("0xFF"), SpecialType::Int32);
    assert_eq!(numeric_literal_type("0b1010"), SpecialType::Int32);
    assert_eq!(numeric_literal_type("1.5"), SpecialType::Double);
    assert_eq!(numeric_literal_type("1e3"), SpecialType::Double);
    assert_eq!(numeric_literal_type("1.5f"), SpecialType::Single);
    assert_eq!(numeric_literal_type("2d"), SpecialType::Double);
    assert_eq!(numeric_literal_type("9.99m"), SpecialType::Decimal);
}

#[test]
fn test_type_and_namespace_names() {
    assert_eq!(classify(&in_method("Console."), "Console"), "type Console");
    assert_eq!(classify(&in_method("string."), "string"), "type string");
    assert_eq!(classify(&in_method("System."), "System"), "namespace System");
    assert_eq!(
        classify(&in_method("System.Collections."), "System.Collections"),
        "namespace System.Collections"
    );
    assert_eq!(
        classify(&in_method("System.Collections.Generic.List<int>."), "List<int>"),
        "type List<int>"
    );
}

#[test]
fn test_static_member_of_type() {
    assert_eq!(classify(&in_method("String.Empty."), "String.Empty"), "value string");
    assert_eq!(classify(&in_method("int.MaxValue."), "int.MaxValue"), "value int");
}

#[test]
fn test_await_unwraps_task() {
    assert_eq!(classify(&in_method("(await pending)."), "(await pending)"), "value string");
    let source = in_method("var t = Task.FromResult(5);\n        (await t).");
    assert_eq!(classify(&source, "(await t)"), "value int");
}

#[test]
fn test_foreach_variable() {
    let source = in_method("foreach (var item in values)\n        {\n            item.\n        }");
    assert_eq!(classify(&source, "item"), "value int");
    let source = in_method(
        "var words = new List<string>();\n        foreach (var w in words) { w. }",
    );
    assert_eq!(classify(&source, "w"), "value string");
}

#[test]
fn test_pattern_and_out_variables() {
    let source = in_method("object o = null;\n        if (o is string s)\n        {\n            s.\n        }");
    assert_eq!(classify(&source, "s"), "value string");
    let source = in_method("int.TryParse(\"1\", out var parsed);\n        parsed.");
    assert_eq!(classify(&source, "parsed"), "value int");
}

#[test]
fn test_operators() {
    assert_eq!(classify(&in_method("(1 + 2L)."), "(1 + 2L)"), "value long");
    assert_eq!(classify(&in_method("(\"a\" + 1)."), "(\"a\" + 1)"), "value string");
    assert_eq!(classify(&in_method("(1 < 2)."), "(1 < 2)"), "value bool");
    assert_eq!(classify(&in_method("(maybe ?? 0)."), "(maybe ?? 0)"), "value int");
    assert_eq!(classify(&in_method("(values as object)."), "(values as object)"), "value object");
    assert_eq!(classify(&in_method("((long)counter)."), "((long)counter)"), "value long");
}

#[test]
fn test_this_in_generic_class() {
    let source = r#"
class Box<T>
{
    void M()
    {
        this.
    }
}
"#;
    assert_eq!(classify(source, "this"), "value Box<T>");
}

#[test]
fn test_using_alias() {
    let source = r#"
using Names = System.Collections.Generic.List<string>;

class C
{
    void M(Names names)
    {
        names.
    }
}
"#;
    assert_eq!(classify(source, "names"), "value List<string>");
}

#[test]
fn test_unknown_names_classify_as_unknown() {
    assert_eq!(classify(&in_method("missing."), "missing"), "unknown");
    assert_eq!(classify(&in_method("Console.WriteLine()."), "Console.WriteLine()"), "value void");
}

#[test]
fn test_later_declarations_are_not_visible() {
    let source = in_method("early.\n        var early = 1;");
    assert_eq!(classify(&source, "early"), "unknown");
}

#[test]
fn test_literal_type_queries_through_database() {
    let compilation = Compilation::new(&Program::new("Tests").with_document("test.cs", ""));
    let db = compilation.db();
    assert_eq!(
        db.special_of(isx_binder::literal_type(db, isx_scanner::SyntaxKind::NumericLiteral, "7")),
        Some(SpecialType::Int32)
    );
}
