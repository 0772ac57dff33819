//! Parser tests: declarations, expressions and recovery around incomplete
//! member access.

use isx_parser::*;

fn nodes_of(tree: &SyntaxTree, kind: NodeKind) -> Vec<NodeIndex> {
    tree.arena
        .nodes
        .iter()
        .enumerate()
        .filter(|(i, n)| {
            n.kind == kind && (tree.parent(NodeIndex(*i as u32)).is_some() || *i as u32 == tree.root.0)
        })
        .map(|(i, _)| NodeIndex(i as u32))
        .collect()
}

fn single(tree: &SyntaxTree, kind: NodeKind) -> NodeIndex {
    let found = nodes_of(tree, kind);
    assert_eq!(found.len(), 1, "expected one {kind:?}, found {}", found.len());
    found[0]
}

#[test]
fn test_extension_class_declaration() {
    let source = r#"
namespace Lib
{
    public static class Extensions
    {
        public static void Do(this object obj) { }
        private static int Hidden<T>(this T value) where T : class => 0;
    }
}
"#;
    let tree = parse_source_file("ext.cs", source);
    assert!(tree.diagnostics.is_empty(), "{:?}", tree.diagnostics);

    let class = single(&tree, NodeKind::ClassDeclaration);
    let class_node = tree.node(class).unwrap();
    let data = tree.arena.get_type_decl(class_node).unwrap();
    assert_eq!(data.name.as_str(), "Extensions");
    assert!(data.modifiers.contains(Modifiers::STATIC | Modifiers::PUBLIC));
    assert_eq!(data.members.len(), 2);

    let methods = nodes_of(&tree, NodeKind::MethodDeclaration);
    assert_eq!(methods.len(), 2);
    let hidden = tree
        .arena
        .get_method(tree.node(methods[1]).unwrap())
        .unwrap();
    assert_eq!(hidden.name.as_str(), "Hidden");
    assert_eq!(hidden.type_parameters.len(), 1);
    assert_eq!(hidden.constraints.len(), 1);
    assert!(hidden.expression_body.is_some());

    let param = tree
        .arena
        .get_parameter(tree.node(hidden.parameters[0]).unwrap())
        .unwrap();
    assert!(param.modifiers.contains(ParameterModifiers::THIS));
    assert_eq!(param.name.as_str(), "value");
}

#[test]
fn test_incomplete_member_access_at_end_of_block() {
    let source = "class C { void M(System.Collections.Generic.List<string> list) { list. } }";
    let tree = parse_source_file("a.cs", source);
    let dot = source.find("list.").unwrap() as u32 + 4;

    let access = tree
        .find_member_access_by_operator(dot)
        .expect("member access for the dot");
    let node = tree.node(access).unwrap();
    assert!(node.has_flag(node_flags::MISSING_NAME));
    let data = tree.arena.get_member_access(node).unwrap();
    assert!(data.name.is_none());
    assert_eq!(tree.node_text(data.expression), "list");
}

#[test]
fn test_conditional_member_access_sets_flag() {
    let source = "class C { void M(object o) { o?.Some } }";
    let tree = parse_source_file("a.cs", source);
    let dot = source.find("?.").unwrap() as u32;
    let access = tree.find_member_access_by_operator(dot).unwrap();
    let node = tree.node(access).unwrap();
    assert!(node.has_flag(node_flags::CONDITIONAL_ACCESS));
    assert!(!node.has_flag(node_flags::MISSING_NAME));
    let data = tree.arena.get_member_access(node).unwrap();
    assert_eq!(tree.simple_name(data.name).unwrap().as_str(), "Some");
}

#[test]
fn test_numeric_literal_member_access() {
    let source = "class C { void M() { 111. } }";
    let tree = parse_source_file("a.cs", source);
    let dot = source.find("111.").unwrap() as u32 + 3;
    let access = tree.find_member_access_by_operator(dot).unwrap();
    let data = tree
        .arena
        .get_member_access(tree.node(access).unwrap())
        .unwrap();
    assert_eq!(tree.kind(data.expression), Some(NodeKind::Literal));
}

#[test]
fn test_dot_before_declaration_on_next_line_ends_member_access() {
    let source = "class C { void M(object obj) {\n obj.\n var x = 1;\n } }";
    let tree = parse_source_file("a.cs", source);
    let dot = source.find("obj.").unwrap() as u32 + 3;
    let access = tree.find_member_access_by_operator(dot).unwrap();
    assert!(tree.node(access).unwrap().has_flag(node_flags::MISSING_NAME));
    assert_eq!(nodes_of(&tree, NodeKind::LocalDeclaration).len(), 1);
}

#[test]
fn test_using_directive_forms() {
    let source = r#"
global using System;
using static System.Math;
using Gen = System.Collections.Generic;
using System.Linq;
namespace App;
class C { }
"#;
    let tree = parse_source_file("a.cs", source);
    assert!(tree.diagnostics.is_empty(), "{:?}", tree.diagnostics);

    let root = tree.node(tree.root).unwrap();
    let file = tree.arena.get_source_file(root).unwrap();
    assert_eq!(file.usings.len(), 4);

    let usings: Vec<&UsingData> = file
        .usings
        .iter()
        .map(|&u| tree.arena.get_using(tree.node(u).unwrap()).unwrap())
        .collect();
    assert!(usings[0].is_global);
    assert!(usings[1].is_static);
    assert_eq!(usings[2].alias.as_str(), "Gen");
    assert_eq!(tree.dotted_name(usings[3].name).as_deref(), Some("System.Linq"));

    let ns = single(&tree, NodeKind::NamespaceDeclaration);
    assert!(tree.node(ns).unwrap().has_flag(node_flags::FILE_SCOPED));
    assert_eq!(nodes_of(&tree, NodeKind::ClassDeclaration).len(), 1);
}

#[test]
fn test_attribute_with_arguments() {
    let source = r#"[System.Obsolete("old", true)] static class E { }"#;
    let tree = parse_source_file("a.cs", source);
    let attribute = single(&tree, NodeKind::Attribute);
    let data = tree
        .arena
        .get_invocation(tree.node(attribute).unwrap())
        .unwrap();
    assert_eq!(
        tree.dotted_name(data.expression).as_deref(),
        Some("System.Obsolete")
    );
    assert_eq!(data.arguments.len(), 2);
}

#[test]
fn test_generic_name_disambiguation() {
    let source = "class C { void M() { var a = x < y; var b = F<int>(1); var c = p < q > (r); } }";
    let tree = parse_source_file("a.cs", source);
    let generic_names: Vec<String> = nodes_of(&tree, NodeKind::GenericName)
        .into_iter()
        .map(|g| tree.node_text(g).to_string())
        .collect();
    assert_eq!(generic_names, vec!["F<int>".to_string(), "p < q >".to_string()]);
}

#[test]
fn test_nested_generic_closing_angles() {
    let source = "class C { System.Collections.Generic.List<System.Collections.Generic.List<int>> items; }";
    let tree = parse_source_file("a.cs", source);
    assert!(tree.diagnostics.is_empty(), "{:?}", tree.diagnostics);
    assert_eq!(nodes_of(&tree, NodeKind::FieldDeclaration).len(), 1);
    assert_eq!(nodes_of(&tree, NodeKind::GenericName).len(), 2);
}

#[test]
fn test_lambda_argument() {
    let source = "class C { void M() { var r = xs.Select(x => x.Length).Where((a, b) => true); } }";
    let tree = parse_source_file("a.cs", source);
    assert!(tree.diagnostics.is_empty(), "{:?}", tree.diagnostics);
    let lambdas = nodes_of(&tree, NodeKind::Lambda);
    assert_eq!(lambdas.len(), 2);
    let second = tree
        .arena
        .get_lambda(tree.node(lambdas[1]).unwrap())
        .unwrap();
    assert_eq!(second.parameters.len(), 2);
}

#[test]
fn test_cast_and_parenthesized_expression() {
    let source = "class C { void M() { var a = (int)x; var b = (y).Z; var c = (d) - 1; } }";
    let tree = parse_source_file("a.cs", source);
    assert_eq!(nodes_of(&tree, NodeKind::CastExpression).len(), 1);
    assert_eq!(nodes_of(&tree, NodeKind::ParenthesizedExpression).len(), 2);
}

#[test]
fn test_is_pattern_declares_variable() {
    let source = "class C { void M(object o) { if (o is string s && s.Length > 0) { } } }";
    let tree = parse_source_file("a.cs", source);
    let pattern = single(&tree, NodeKind::DeclarationPattern);
    let data = tree
        .arena
        .get_declaration(tree.node(pattern).unwrap())
        .unwrap();
    assert_eq!(data.name.as_str(), "s");
    assert_eq!(nodes_of(&tree, NodeKind::IsPatternExpression).len(), 1);
}

#[test]
fn test_top_level_statements() {
    let source = "using System;\nvar list = new System.Collections.Generic.List<int>();\nlist.";
    let tree = parse_source_file("a.cs", source);
    assert_eq!(nodes_of(&tree, NodeKind::LocalDeclaration).len(), 1);
    let dot = source.rfind('.').unwrap() as u32;
    assert!(tree.find_member_access_by_operator(dot).is_some());
}

#[test]
fn test_out_var_and_switch_expression() {
    let source = r#"
class C
{
    int M(string s) => int.TryParse(s, out var n) ? n switch { 0 => 1, > 5 and < 10 => 2, _ => 3 } : -1;
}
"#;
    let tree = parse_source_file("a.cs", source);
    assert!(tree.diagnostics.is_empty(), "{:?}", tree.diagnostics);
    assert_eq!(nodes_of(&tree, NodeKind::DeclarationExpression).len(), 1);
    assert_eq!(nodes_of(&tree, NodeKind::SwitchArm).len(), 3);
}

#[test]
fn test_recovery_terminates_on_garbage() {
    let source = "class C { void M( { ) ] } ; @@ namespace { int x = ; } } }}}";
    let tree = parse_source_file("a.cs", source);
    assert!(!tree.diagnostics.is_empty());
    assert_eq!(tree.kind(tree.root), Some(NodeKind::CompilationUnit));
}

#[test]
fn test_deep_nesting_is_bounded() {
    let source = format!("class C {{ int M() => {}1{}; }}", "(".repeat(2000), ")".repeat(2000));
    let tree = parse_source_file("a.cs", &source);
    assert!(
        tree.diagnostics
            .iter()
            .any(|d| d.message.contains("nesting too deep"))
    );
}

#[test]
fn test_token_queries() {
    let source = "class C { }";
    let tree = parse_source_file("a.cs", source);
    let idx = tree.token_index_at(6).unwrap();
    assert_eq!(tree.token_text(&tree.tokens[idx]), "C");
    let (_, before) = tree.token_before(8).unwrap();
    assert_eq!(tree.token_text(before), "{");
    assert!(tree.token_before(0).is_none());
}
