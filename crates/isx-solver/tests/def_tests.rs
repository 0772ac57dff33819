use super::*;

fn class(store: &mut DefinitionStore, namespace: &str, name: &str, assembly: AssemblyId) -> DefId {
    let mut info = DefinitionInfo::new(
        Atom::intern(name),
        DefKind::Class,
        Atom::intern(namespace),
        assembly,
    );
    info.accessibility = Accessibility::Public;
    store.add_type(info)
}

#[test]
fn test_lookup_by_namespace_name_and_arity() {
    let mut store = DefinitionStore::new();
    let asm = store.add_assembly("Lib", "1.0");
    let plain = class(&mut store, "System.Collections.Generic", "List", asm);
    let mut generic = DefinitionInfo::new(
        Atom::intern("List"),
        DefKind::Class,
        Atom::intern("System.Collections.Generic"),
        asm,
    );
    generic.type_params.push(TypeParamInfo::new(Atom::intern("T")));
    let generic = store.add_type(generic);

    assert_eq!(
        store.lookup_qualified("System.Collections.Generic.List", 1),
        Some(generic)
    );
    assert_eq!(
        store.lookup_qualified("System.Collections.Generic.List", 0),
        Some(plain)
    );
    assert_eq!(store.lookup_qualified("System.Collections.Generic.List", 2), None);
    assert!(store.namespace_exists(Atom::intern("System")));
    assert!(store.namespace_exists(Atom::intern("System.Collections")));
    assert!(!store.namespace_exists(Atom::intern("System.Coll")));
    assert!(store.namespace_exists(Atom::NONE));
}

#[test]
fn test_nested_types_and_names() {
    let mut store = DefinitionStore::new();
    let asm = store.add_assembly("Lib", "1.0");
    let outer = class(&mut store, "App", "Outer", asm);
    let mut inner = DefinitionInfo::new(
        Atom::intern("Inner"),
        DefKind::Class,
        Atom::intern("App"),
        asm,
    );
    inner.container = Some(outer);
    inner.accessibility = Accessibility::Private;
    let inner = store.add_type(inner);

    assert_eq!(store.def(outer).unwrap().nested, vec![inner]);
    assert_eq!(store.lookup_nested(outer, Atom::intern("Inner"), 0), Some(inner));
    assert_eq!(store.lookup_type(Atom::intern("App"), Atom::intern("Inner"), 0), None);
    assert_eq!(store.nested_name(inner), "Outer.Inner");
    assert_eq!(store.namespace_of(inner), Atom::intern("App"));
    assert_eq!(store.effective_accessibility(inner), Accessibility::Private);
    assert_eq!(store.effective_accessibility(outer), Accessibility::Public);
}

#[test]
fn test_effective_accessibility_takes_most_restrictive() {
    let mut store = DefinitionStore::new();
    let asm = store.add_assembly("Lib", "1.0");
    let outer = class(&mut store, "App", "Outer", asm);
    store.def_mut(outer).unwrap().accessibility = Accessibility::Internal;
    let mut inner = DefinitionInfo::new(Atom::intern("Inner"), DefKind::Class, Atom::intern("App"), asm);
    inner.container = Some(outer);
    inner.accessibility = Accessibility::Public;
    let inner = store.add_type(inner);
    assert_eq!(store.effective_accessibility(inner), Accessibility::Internal);
    assert_eq!(
        Accessibility::ProtectedInternal.restrict(Accessibility::Protected),
        Accessibility::Protected
    );
}

#[test]
fn test_child_store_continues_ids() {
    let mut parent = DefinitionStore::new();
    let lib = parent.add_assembly("Lib", "1.0");
    let shared = class(&mut parent, "Lib", "Shared", lib);
    let parent = Arc::new(parent);

    let mut child = DefinitionStore::child(parent.clone());
    let app = child.add_assembly("App", "0.0");
    let local = class(&mut child, "Lib", "Shared", app);

    assert!(local.0 > shared.0);
    assert!(child.owns_def(local));
    assert!(!child.owns_def(shared));
    assert!(child.def_mut(shared).is_none());
    // Source declarations shadow referenced ones.
    assert_eq!(child.lookup_qualified("Lib.Shared", 0), Some(local));
    assert_eq!(parent.lookup_qualified("Lib.Shared", 0), Some(shared));
    assert_eq!(child.assembly(lib).unwrap().name, "Lib");
    assert_eq!(child.assembly(app).unwrap().name, "App");
    assert_eq!(child.local_defs().collect::<Vec<_>>(), vec![local]);
}

#[test]
fn test_methods_attach_to_container() {
    let mut store = DefinitionStore::new();
    let asm = store.add_assembly("Lib", "1.0");
    let owner = class(&mut store, "Lib", "Ext", asm);
    let method = store.add_method(MethodInfo::new(Atom::intern("Do"), owner));
    assert_eq!(store.def(owner).unwrap().methods, vec![method]);
    assert_eq!(store.method(method).unwrap().name.as_str(), "Do");
}
