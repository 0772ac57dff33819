use super::*;
use crate::def::DefKind;
use crate::fixture::Fixture;

#[test]
fn test_list_supertypes_are_instantiated() {
    let fx = Fixture::new();
    let env = fx.env();
    let string = fx.ty(fx.string);
    let list = fx.generic(fx.list_t, &[string]);

    let supers = all_supertypes(&env, list);
    assert!(supers.contains(&fx.generic(fx.ienumerable_t, &[string])));
    assert!(supers.contains(&fx.generic(fx.ilist_t, &[string])));
    assert!(supers.contains(&fx.generic(fx.ireadonly_collection_t, &[string])));
    assert!(supers.contains(&fx.ty(fx.object)));
    assert!(supers.contains(&fx.ty(fx.ienumerable)));
    assert!(!supers.contains(&list));
    // Direct supertypes come first.
    assert_eq!(supers.get_index(0), Some(&fx.ty(fx.object)));
}

#[test]
fn test_array_supertypes() {
    let fx = Fixture::new();
    let env = fx.env();
    let int = fx.ty(fx.int);
    let supers = all_supertypes(&env, fx.array_of(int));
    assert!(supers.contains(&fx.ty(fx.array)));
    assert!(supers.contains(&fx.generic(fx.ienumerable_t, &[int])));
    assert!(supers.contains(&fx.generic(fx.ireadonly_list_t, &[int])));

    let matrix = fx.types.array(int, 2);
    let supers = all_supertypes(&env, matrix);
    assert!(supers.contains(&fx.ty(fx.array)));
    assert!(!supers.contains(&fx.generic(fx.ienumerable_t, &[int])));
}

#[test]
fn test_base_chain_of_struct() {
    let fx = Fixture::new();
    let env = fx.env();
    let int = fx.ty(fx.int);
    assert_eq!(
        base_chain(&env, int),
        vec![int, fx.ty(fx.value_type), fx.ty(fx.object)]
    );
}

#[test]
fn test_instantiations_and_enumerable_element() {
    let mut fx = Fixture::new();
    let int = fx.ty(fx.int);
    let string = fx.ty(fx.string);
    let both = fx.add("App", "Both", DefKind::Class, &[]);
    for arg in [int, string] {
        let iface = fx.generic(fx.ienumerable_t, &[arg]);
        fx.add_interface(both, iface);
    }
    let env = fx.env();

    assert_eq!(instantiations_of(&env, fx.ty(both), fx.ienumerable_t).len(), 2);
    assert_eq!(enumerable_element(&env, fx.ty(both)), None);
    assert_eq!(enumerable_element(&env, string), Some(fx.ty(fx.char_)));
    assert_eq!(enumerable_element(&env, fx.array_of(int)), Some(int));
}

#[test]
fn test_constrained_type_parameter_supertypes() {
    let mut fx = Fixture::new();
    let method = fx.extension("M", &["T"], |_, p| p[0]);
    let string = fx.ty(fx.string);
    let bound = fx.generic(fx.ienumerable_t, &[string]);
    fx.method_type_param_mut(method, 0).bounds.push(bound);
    let env = fx.env();

    let t = fx.method_param(method, 0);
    let supers = all_supertypes(&env, t);
    assert!(supers.contains(&bound));
    assert!(supers.contains(&fx.ty(fx.ienumerable)));
    assert!(supers.contains(&fx.ty(fx.object)));
}
