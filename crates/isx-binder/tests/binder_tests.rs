use isx_binder::{Compilation, Library, Program, ReferenceCache, libs};
use isx_common::Atom;
use isx_parser::{NodeIndex, NodeKind, SyntaxTree};
use isx_solver::{
    Accessibility, DefFlags, DefId, DefKind, MemberKind, MethodFlags, TypeDatabase,
};
use std::sync::Arc;

fn compile(source: &str) -> Compilation {
    let program = Program::new("Tests").with_document("test.cs", source);
    Compilation::new(&program)
}

fn extension_count(compilation: &Compilation, name: &str) -> usize {
    compilation
        .extension_methods_named(Atom::intern(name))
        .count()
}

#[test]
fn test_extension_flag_requires_top_level_static_class() {
    let compilation = compile(
        r#"
static class Good
{
    public static string Shout(this string s) => s;
    public static string NotExtension(string s) => s;
}

class NotStatic
{
    public static string Whisper(this string s) => s;
}

static class Outer
{
    static class Inner
    {
        public static string Mumble(this string s) => s;
    }
}

static class Generic<T>
{
    public static string Hum(this string s) => s;
}
"#,
    );

    assert_eq!(extension_count(&compilation, "Shout"), 1);
    assert_eq!(extension_count(&compilation, "NotExtension"), 0);
    assert_eq!(extension_count(&compilation, "Whisper"), 0);
    assert_eq!(extension_count(&compilation, "Mumble"), 0);
    assert_eq!(extension_count(&compilation, "Hum"), 0);
}

#[test]
fn test_reference_extensions_come_before_source_extensions() {
    let compilation = compile(
        r#"
namespace Mine
{
    public static class Extra
    {
        public static bool Any<T>(this System.Collections.Generic.IEnumerable<T> source) => true;
    }
}
"#,
    );
    let db = compilation.db();
    let containers: Vec<String> = compilation
        .extension_methods_named(Atom::intern("Any"))
        .filter_map(|m| db.method(m))
        .map(|m| db.defs().namespace_of(m.container).as_str().to_string())
        .collect();
    assert_eq!(containers.first().map(String::as_str), Some("System.Linq"));
    assert_eq!(containers.last().map(String::as_str), Some("Mine"));
}

#[test]
fn test_obsolete_attribute_is_recorded() {
    let compilation = compile(
        r#"
using System;

public static class Legacy
{
    [Obsolete]
    public static int Old(this string s) => 0;

    [System.Obsolete("use New")]
    public static int Older(this string s) => 0;

    [ObsoleteAttribute]
    public static int Oldest(this string s) => 0;

    public static int New(this string s) => 0;
}

[Obsolete]
public class Retired { }
"#,
    );
    let db = compilation.db();
    let obsolete = |name: &str| {
        compilation
            .extension_methods_named(Atom::intern(name))
            .filter_map(|m| db.method(m))
            .any(|m| m.flags.contains(MethodFlags::OBSOLETE))
    };
    assert!(obsolete("Old"));
    assert!(obsolete("Older"));
    assert!(obsolete("Oldest"));
    assert!(!obsolete("New"));

    let retired = db.defs().lookup_qualified("Retired", 0).unwrap();
    assert!(db.def(retired).unwrap().flags.contains(DefFlags::OBSOLETE));
}

#[test]
fn test_declared_accessibility_and_defaults() {
    let compilation = compile(
        r#"
namespace Shapes
{
    static class Helpers
    {
        internal static int Area(this int side) => side * side;
        static int Hidden(this int side) => side;
        public static int Visible(this int side) => side;
    }

    public class Outer
    {
        class Nested { }
    }

    enum Color { Red, Green }
    struct Point { public int X; }
}
"#,
    );
    let db = compilation.db();
    let defs = db.defs();

    let helpers = defs.lookup_qualified("Shapes.Helpers", 0).unwrap();
    assert_eq!(db.def(helpers).unwrap().accessibility, Accessibility::Internal);
    let method_access = |name: &str| {
        compilation
            .extension_methods_named(Atom::intern(name))
            .filter_map(|m| db.method(m))
            .map(|m| m.accessibility)
            .next()
    };
    assert_eq!(method_access("Area"), Some(Accessibility::Internal));
    assert_eq!(method_access("Hidden"), Some(Accessibility::Private));
    assert_eq!(method_access("Visible"), Some(Accessibility::Public));

    let outer = defs.lookup_qualified("Shapes.Outer", 0).unwrap();
    let nested = defs
        .lookup_nested(outer, Atom::intern("Nested"), 0)
        .unwrap();
    assert_eq!(db.def(nested).unwrap().accessibility, Accessibility::Private);
    assert_eq!(defs.effective_accessibility(nested), Accessibility::Private);

    let color = defs.lookup_qualified("Shapes.Color", 0).unwrap();
    let color_info = db.def(color).unwrap();
    assert_eq!(color_info.kind, DefKind::Enum);
    assert_eq!(
        color_info
            .members
            .iter()
            .filter(|m| m.kind == MemberKind::EnumMember)
            .count(),
        2
    );

    let point = defs.lookup_qualified("Shapes.Point", 0).unwrap();
    assert!(db.def(point).unwrap().is_value_type());
}

#[test]
fn test_partial_declarations_merge() {
    let compilation = Compilation::new(
        &Program::new("Tests")
            .with_document("a.cs", "public partial class Parts { public int A; }")
            .with_document("b.cs", "public partial class Parts { public int B; }"),
    );
    let db = compilation.db();
    let parts = db.defs().lookup_qualified("Parts", 0).unwrap();
    let names: Vec<&str> = db
        .def(parts)
        .unwrap()
        .members
        .iter()
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[test]
fn test_imported_namespaces_at_offset() {
    let source = r#"
using System.Text;

namespace Outer.Inner
{
    using System.Collections.Generic;

    class C
    {
        void M()
        {
            // caret
        }
    }
}
"#;
    let compilation = compile(source);
    let file = compilation.file_by_name("test.cs").unwrap();
    let offset = source.find("// caret").unwrap() as u32;
    let imported: Vec<&str> = compilation
        .imported_namespaces_at(file, offset)
        .iter()
        .map(|ns| ns.as_str())
        .collect();

    for expected in [
        "",
        "Outer",
        "Outer.Inner",
        "System.Text",
        "System.Collections.Generic",
    ] {
        assert!(imported.contains(&expected), "missing {expected:?} in {imported:?}");
    }
    assert!(!imported.contains(&"System.Linq"));
}

#[test]
fn test_global_usings_reach_every_document() {
    let source = "class C { void M() { /* caret */ } }";
    let compilation = Compilation::new(
        &Program::new("Tests")
            .with_document("usings.cs", "global using System.Linq;")
            .with_document("test.cs", source),
    );
    let file = compilation.file_by_name("test.cs").unwrap();
    let offset = source.find("/* caret */").unwrap() as u32;
    let imported = compilation.imported_namespaces_at(file, offset);
    assert!(imported.contains(&Atom::intern("System.Linq")));
}

#[test]
fn test_referenced_library_is_bound() {
    let library = Library::new("Contoso.Text", "1.0.0").with_file(
        "Contoso.cs",
        r#"
namespace Contoso.Text
{
    public static class StringExtensions
    {
        public static int WordCount(this string text);
    }
}
"#,
    );
    let program = Program::new("Tests")
        .with_document("test.cs", "class C { }")
        .with_reference(library);
    let cache = ReferenceCache::new();
    let compilation = Compilation::with_cache(&program, &cache);
    let db = compilation.db();

    let methods: Vec<_> = compilation
        .extension_methods_named(Atom::intern("WordCount"))
        .collect();
    assert_eq!(methods.len(), 1);
    let container = db.method(methods[0]).unwrap().container;
    assert_eq!(db.defs().namespace_of(container).as_str(), "Contoso.Text");
    assert!(compilation.references().assembly_of("Contoso.Text").is_some());
}

#[test]
fn test_reference_cache_shares_and_evicts() {
    let cache = ReferenceCache::new();
    let with_version = |version: &str| {
        Program::new("Tests")
            .with_document("test.cs", "class C { }")
            .with_reference(
                Library::new("Contoso", version)
                    .with_file("c.cs", "namespace Contoso { public class Widget { } }"),
            )
    };

    let first = Compilation::with_cache(&with_version("1.0"), &cache);
    let second = Compilation::with_cache(&with_version("1.0"), &cache);
    assert_eq!(cache.len(), 1);
    assert!(Arc::ptr_eq(first.references(), second.references()));

    // A new version of the same library replaces the old entry.
    let third = Compilation::with_cache(&with_version("2.0"), &cache);
    assert_eq!(cache.len(), 1);
    assert!(!Arc::ptr_eq(first.references(), third.references()));

    cache.invalidate("Contoso");
    assert!(cache.is_empty());
}

#[test]
fn test_compilations_do_not_leak_source_types() {
    let cache = ReferenceCache::new();
    let a = Compilation::with_cache(
        &Program::new("A").with_document("a.cs", "class OnlyInA { }"),
        &cache,
    );
    let b = Compilation::with_cache(
        &Program::new("B").with_document("b.cs", "class OnlyInB { }"),
        &cache,
    );
    assert!(a.db().defs().lookup_qualified("OnlyInA", 0).is_some());
    assert!(a.db().defs().lookup_qualified("OnlyInB", 0).is_none());
    assert!(b.db().defs().lookup_qualified("OnlyInA", 0).is_none());
    assert!(Arc::ptr_eq(a.references(), b.references()));
}

/// Name and arity of a base-list entry, ignoring any qualifier.
fn base_name(tree: &SyntaxTree, node: NodeIndex) -> Option<(Atom, usize)> {
    let n = tree.node(node)?;
    let name = if n.kind == NodeKind::QualifiedName {
        tree.arena.get_qualified_name(n)?.right
    } else {
        node
    };
    let arity = tree
        .node(name)
        .filter(|n| n.kind == NodeKind::GenericName)
        .and_then(|n| tree.arena.get_generic_name(n))
        .map_or(0, |data| data.type_arguments.len());
    Some((tree.simple_name(name)?, arity))
}

/// The definition bound for a type declaration, nested types included.
fn declared_def(db: &dyn TypeDatabase, tree: &SyntaxTree, node: NodeIndex) -> Option<DefId> {
    let data = tree.node(node).and_then(|n| tree.arena.get_type_decl(n))?;
    let arity = data.type_parameters.len() as u16;
    let outer = tree
        .ancestors(node)
        .find(|&a| tree.kind(a).is_some_and(NodeKind::is_type_declaration));
    if let Some(outer) = outer {
        let container = declared_def(db, tree, outer)?;
        return db.defs().lookup_nested(container, data.name, arity);
    }
    let mut segments: Vec<String> = tree
        .ancestors(node)
        .filter_map(|a| tree.node(a).and_then(|n| tree.arena.get_namespace(n)))
        .filter_map(|ns| tree.dotted_name(ns.name))
        .collect();
    segments.reverse();
    segments.push(data.name.as_str().to_string());
    db.defs().lookup_qualified(&segments.join("."), arity)
}

#[test]
fn test_core_library_base_lists_resolve() {
    let compilation = compile("class C { }");
    let db = compilation.db();
    let mut checked = 0;

    for lib in libs::CORE_LIBS {
        let tree = isx_parser::parse_source_file(lib.file_name, lib.content);
        for index in 0..tree.arena.nodes.len() as u32 {
            let node = NodeIndex(index);
            let Some(data) = tree
                .node(node)
                .filter(|n| n.kind.is_type_declaration() && n.kind != NodeKind::EnumDeclaration)
                .and_then(|n| tree.arena.get_type_decl(n))
            else {
                continue;
            };
            let def = declared_def(db, &tree, node)
                .unwrap_or_else(|| panic!("{} is not declared", data.name));
            let name = data.name.as_str();
            let info = db.def(def).unwrap();
            let bound: Vec<(Atom, usize)> = info
                .base
                .iter()
                .chain(info.interfaces.iter())
                .filter_map(|&ty| db.named_def(ty))
                .map(|(_, base)| (base.name, base.type_params.len()))
                .collect();

            for &base in &data.base_types {
                let expected = base_name(&tree, base)
                    .unwrap_or_else(|| panic!("{name}: unexpected base syntax"));
                assert!(
                    bound.contains(&expected),
                    "{name}: base `{}` did not resolve",
                    tree.node_text(base)
                );
                checked += 1;
            }
        }
    }
    assert!(checked > 0);
}

#[test]
fn test_string_and_array_are_sequences() {
    let compilation = compile("class C { }");
    let db = compilation.db();
    let interface_names = |qualified: &str| -> Vec<String> {
        let def = db.defs().lookup_qualified(qualified, 0).unwrap();
        db.def(def)
            .unwrap()
            .interfaces
            .iter()
            .map(|&ty| isx_solver::format_type(db, ty))
            .collect()
    };

    assert!(interface_names("System.String").contains(&"IEnumerable<char>".to_string()));
    let array = interface_names("System.Array");
    assert!(array.contains(&"IList".to_string()));
    assert!(array.contains(&"IEnumerable".to_string()));

    let string = db.defs().lookup_qualified("System.String", 0).unwrap();
    let enumerator = db
        .def(string)
        .unwrap()
        .methods
        .iter()
        .filter_map(|&m| db.method(m))
        .find(|m| m.name.as_str() == "GetEnumerator")
        .map(|m| isx_solver::format_type(db, m.return_type));
    assert_eq!(enumerator.as_deref(), Some("IEnumerator<char>"));
}

#[test]
fn test_nullable_type_parameter_under_struct_constraint() {
    let compilation = compile(
        r#"
static class Numbers
{
    public static T OrZero<T>(this T? value) where T : struct => default;
    public static T Plain<T>(this T? value) where T : class => value;
}

struct Slot<T> where T : struct
{
    public T? Value;
}
"#,
    );
    let db = compilation.db();
    let param_type = |name: &str| {
        let method = compilation
            .extension_methods_named(Atom::intern(name))
            .next()
            .unwrap();
        db.method(method).unwrap().params[0].ty
    };

    let or_zero = param_type("OrZero");
    assert!(db.nullable_underlying(or_zero).is_some());
    assert_eq!(isx_solver::format_type(db, or_zero), "T?");

    let plain = param_type("Plain");
    assert!(db.nullable_underlying(plain).is_none());

    let slot = db.defs().lookup_qualified("Slot", 1).unwrap();
    let value = db
        .def(slot)
        .unwrap()
        .members
        .iter()
        .find(|m| m.name.as_str() == "Value")
        .unwrap()
        .ty;
    assert!(db.nullable_underlying(value).is_some());
}
