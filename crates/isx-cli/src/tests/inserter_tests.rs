use super::*;
use isx_binder::Program;

fn insert(source: &str, location: u32, namespace: &str, system_first: bool) -> Result<String, ImportError> {
    let compilation = Compilation::new(&Program::new("Tests").with_document("test.cs", source));
    let tree = isx_parser::parse_source_file("test.cs", source);
    UsingDirectiveInserter::new().add_imports(
        &compilation,
        &tree,
        location,
        &[namespace.to_string()],
        system_first,
    )
}

#[test]
fn test_inserts_in_sorted_position() {
    let source = "using System;\nusing System.Collections.Generic;\nusing Zeta;\n\nclass C { }\n";
    let result = insert(source, source.len() as u32, "System.Linq", true).unwrap();
    assert_eq!(
        result,
        "using System;\nusing System.Collections.Generic;\nusing System.Linq;\nusing Zeta;\n\nclass C { }\n"
    );
}

#[test]
fn test_system_first_ordering() {
    let source = "using System;\nusing Alpha;\n\nclass C { }\n";
    let result = insert(source, source.len() as u32, "Beta", true).unwrap();
    assert_eq!(result, "using System;\nusing Alpha;\nusing Beta;\n\nclass C { }\n");

    let source = "using Alpha;\nusing System;\n\nclass C { }\n";
    let result = insert(source, source.len() as u32, "Beta", false).unwrap();
    assert_eq!(result, "using Alpha;\nusing Beta;\nusing System;\n\nclass C { }\n");
}

#[test]
fn test_file_without_usings() {
    let source = "class C { }\n";
    assert_eq!(
        insert(source, 0, "Tools", true).unwrap(),
        "using Tools;\n\nclass C { }\n"
    );
}

#[test]
fn test_after_extern_aliases() {
    let source = "extern alias Lib;\n\nclass C { }\n";
    assert_eq!(
        insert(source, source.len() as u32, "Tools", true).unwrap(),
        "extern alias Lib;\nusing Tools;\n\nclass C { }\n"
    );
}

#[test]
fn test_namespace_with_usings_is_preferred() {
    let source = "using System;\n\nnamespace App\n{\n    using Beta;\n\n    class C { void M() { } }\n}\n";
    let location = source.find("void M").unwrap() as u32;
    assert_eq!(
        insert(source, location, "Tools", true).unwrap(),
        "using System;\n\nnamespace App\n{\n    using Beta;\n    using Tools;\n\n    class C { void M() { } }\n}\n"
    );
}

#[test]
fn test_already_imported_namespace_is_left_alone() {
    let source = "using Tools;\n\nclass C { }\n";
    assert_eq!(insert(source, source.len() as u32, "Tools", true).unwrap(), source);
}

#[test]
fn test_global_namespace_is_rejected() {
    let result = insert("class C { }", 0, "", true);
    assert!(matches!(result, Err(ImportError::Rejected { .. })));
}
