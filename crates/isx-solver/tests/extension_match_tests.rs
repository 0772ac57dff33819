use super::*;
use crate::def::{DefKind, MethodFlags};
use crate::fixture::Fixture;

#[test]
fn test_enumerable_extension_infers_element_type() {
    let mut fx = Fixture::new();
    let select = fx.extension("Select", &["TSource"], |fx, p| {
        fx.generic(fx.ienumerable_t, &[p[0]])
    });
    let env = fx.env();
    let string = fx.ty(fx.string);

    let subst = match_extension_receiver(&env, fx.generic(fx.list_t, &[string]), select).unwrap();
    assert_eq!(subst.get(TypeParamRef::of_method(select, 0)), Some(string));

    // Arrays and strings implement IEnumerable<T> too.
    let int = fx.ty(fx.int);
    let subst = match_extension_receiver(&env, fx.array_of(int), select).unwrap();
    assert_eq!(subst.get(TypeParamRef::of_method(select, 0)), Some(int));
    let subst = match_extension_receiver(&env, string, select).unwrap();
    assert_eq!(
        subst.get(TypeParamRef::of_method(select, 0)),
        Some(fx.ty(fx.char_))
    );

    assert!(!is_applicable_receiver(&env, int, select));
}

#[test]
fn test_object_extension_accepts_everything() {
    let mut fx = Fixture::new();
    let object = fx.ty(fx.object);
    let do_ = fx.extension("Do", &[], |_, _| object);
    let env = fx.env();

    for receiver in [
        fx.ty(fx.int),
        fx.ty(fx.string),
        fx.generic(fx.list_t, &[fx.ty(fx.int)]),
        fx.array_of(fx.ty(fx.double)),
        TypeId::NULL,
    ] {
        assert!(is_applicable_receiver(&env, receiver, do_), "{receiver:?}");
    }
    for receiver in [TypeId::ERROR, TypeId::VOID, TypeId::DYNAMIC] {
        assert!(matches!(
            match_extension_receiver(&env, receiver, do_),
            Err(MatchError::UnusableReceiver(_))
        ));
    }
}

#[test]
fn test_bare_type_parameter_binds_receiver() {
    let mut fx = Fixture::new();
    let identity = fx.extension("Identity", &["T"], |_, p| p[0]);
    let env = fx.env();
    let list = fx.generic(fx.list_t, &[fx.ty(fx.string)]);
    let subst = match_extension_receiver(&env, list, identity).unwrap();
    assert_eq!(subst.get(TypeParamRef::of_method(identity, 0)), Some(list));
}

#[test]
fn test_ambiguous_instantiations_fail() {
    let mut fx = Fixture::new();
    let int = fx.ty(fx.int);
    let string = fx.ty(fx.string);
    let both = fx.add("App", "Both", DefKind::Class, &[]);
    for arg in [int, string] {
        let iface = fx.generic(fx.ienumerable_t, &[arg]);
        fx.add_interface(both, iface);
    }
    let select = fx.extension("Select", &["T"], |fx, p| fx.generic(fx.ienumerable_t, &[p[0]]));
    let env = fx.env();
    assert_eq!(
        match_extension_receiver(&env, fx.ty(both), select),
        Err(MatchError::AmbiguousInstantiation(fx.ty(both)))
    );
}

#[test]
fn test_non_generic_parameter_uses_conversions() {
    let mut fx = Fixture::new();
    let long = fx.ty(fx.long);
    let string = fx.ty(fx.string);
    let widen = fx.extension("Widen", &[], |_, _| long);
    let text = fx.extension("Text", &[], |_, _| string);
    let env = fx.env();

    assert!(is_applicable_receiver(&env, fx.ty(fx.int), widen));
    assert!(!is_applicable_receiver(&env, fx.ty(fx.double), widen));
    assert!(is_applicable_receiver(&env, string, text));
    assert!(!is_applicable_receiver(&env, fx.ty(fx.object), text));
}

#[test]
fn test_null_receiver_is_conservative() {
    let mut fx = Fixture::new();
    let object = fx.ty(fx.object);
    let string = fx.ty(fx.string);
    let on_object = fx.extension("OnObject", &[], |_, _| object);
    let on_string = fx.extension("OnString", &[], |_, _| string);
    let on_t = fx.extension("OnT", &["T"], |_, p| p[0]);
    let on_class_t = fx.extension("OnClassT", &["T"], |_, p| p[0]);
    fx.method_type_param_mut(on_class_t, 0).constraints = ConstraintFlags::CLASS;
    let env = fx.env();

    assert!(is_applicable_receiver(&env, TypeId::NULL, on_object));
    assert!(!is_applicable_receiver(&env, TypeId::NULL, on_string));
    assert!(is_applicable_receiver(&env, TypeId::NULL, on_t));
    assert!(!is_applicable_receiver(&env, TypeId::NULL, on_class_t));
}

#[test]
fn test_type_parameter_receivers() {
    let mut fx = Fixture::new();
    let object = fx.ty(fx.object);
    let on_object = fx.extension("OnObject", &[], |_, _| object);
    let on_comparable = fx.extension("OnComparable", &["T"], |fx, p| {
        fx.generic(fx.icomparable_t, &[p[0]])
    });
    let on_enumerable = fx.extension("OnEnumerable", &["T"], |fx, p| {
        fx.generic(fx.ienumerable_t, &[p[0]])
    });
    // Receiver owners: an unconstrained U and a V : IComparable<V>.
    let owner = fx.extension("Owner", &["U", "V"], |_, p| p[0]);
    let v = fx.method_param(owner, 1);
    let comparable_v = fx.generic(fx.icomparable_t, &[v]);
    fx.method_type_param_mut(owner, 1).bounds.push(comparable_v);
    let env = fx.env();
    let u = fx.method_param(owner, 0);

    assert!(is_applicable_receiver(&env, u, on_object));
    assert!(!is_applicable_receiver(&env, u, on_comparable));

    let subst = match_extension_receiver(&env, v, on_comparable).unwrap();
    assert_eq!(subst.get(TypeParamRef::of_method(on_comparable, 0)), Some(v));
    assert!(is_applicable_receiver(&env, v, on_object));
    assert!(!is_applicable_receiver(&env, v, on_enumerable));
}

#[test]
fn test_constraint_flags_reject_bindings() {
    let mut fx = Fixture::new();
    let needs_struct = fx.extension("NeedsStruct", &["T"], |_, p| p[0]);
    fx.method_type_param_mut(needs_struct, 0).constraints = ConstraintFlags::STRUCT;
    let needs_class = fx.extension("NeedsClass", &["T"], |_, p| p[0]);
    fx.method_type_param_mut(needs_class, 0).constraints = ConstraintFlags::CLASS;
    let needs_new = fx.extension("NeedsNew", &["T"], |_, p| p[0]);
    fx.method_type_param_mut(needs_new, 0).constraints = ConstraintFlags::NEW;
    let needs_unmanaged = fx.extension("NeedsUnmanaged", &["T"], |_, p| p[0]);
    fx.method_type_param_mut(needs_unmanaged, 0).constraints = ConstraintFlags::UNMANAGED;
    let needs_not_null = fx.extension("NeedsNotNull", &["T"], |_, p| p[0]);
    fx.method_type_param_mut(needs_not_null, 0).constraints = ConstraintFlags::NOT_NULL;

    let shape = fx.add("App", "Shape", DefKind::Class, &[]);
    fx.add_flags(shape, DefFlags::ABSTRACT | DefFlags::PARAMETERLESS_CONSTRUCTOR);
    let env = fx.env();

    let int = fx.ty(fx.int);
    let string = fx.ty(fx.string);
    let list = fx.generic(fx.list_t, &[int]);
    let nullable_int = fx.generic(fx.nullable, &[int]);

    assert!(is_applicable_receiver(&env, int, needs_struct));
    assert!(!is_applicable_receiver(&env, nullable_int, needs_struct));
    assert!(matches!(
        match_extension_receiver(&env, string, needs_struct),
        Err(MatchError::ConstraintViolated { .. })
    ));

    assert!(is_applicable_receiver(&env, string, needs_class));
    assert!(!is_applicable_receiver(&env, int, needs_class));

    assert!(is_applicable_receiver(&env, list, needs_new));
    assert!(is_applicable_receiver(&env, int, needs_new));
    assert!(!is_applicable_receiver(&env, fx.ty(shape), needs_new));
    assert!(!is_applicable_receiver(&env, string, needs_new));

    assert!(is_applicable_receiver(&env, int, needs_unmanaged));
    assert!(!is_applicable_receiver(&env, string, needs_unmanaged));

    assert!(is_applicable_receiver(&env, int, needs_not_null));
    assert!(!is_applicable_receiver(&env, nullable_int, needs_not_null));
}

#[test]
fn test_type_bounds_are_checked_after_substitution() {
    let mut fx = Fixture::new();
    let sorted = fx.extension("Sorted", &["T"], |_, p| p[0]);
    let t = fx.method_param(sorted, 0);
    let comparable_t = fx.generic(fx.icomparable_t, &[t]);
    fx.method_type_param_mut(sorted, 0).bounds.push(comparable_t);

    // `where TKey : TOther` with TOther never inferred from the receiver.
    let loose = fx.extension("Loose", &["TKey", "TOther"], |_, p| p[0]);
    let other = fx.method_param(loose, 1);
    fx.method_type_param_mut(loose, 0).bounds.push(other);
    let env = fx.env();

    assert!(is_applicable_receiver(&env, fx.ty(fx.string), sorted));
    assert!(is_applicable_receiver(&env, fx.ty(fx.int), sorted));
    let list = fx.generic(fx.list_t, &[fx.ty(fx.int)]);
    assert!(matches!(
        match_extension_receiver(&env, list, sorted),
        Err(MatchError::Inference(InferenceError::BoundsViolation { .. }))
    ));

    assert!(is_applicable_receiver(&env, list, loose));
}

#[test]
fn test_nullable_and_array_patterns() {
    let mut fx = Fixture::new();
    let on_nullable = fx.extension("OrZero", &["T"], |fx, p| fx.generic(fx.nullable, &[p[0]]));
    let on_array = fx.extension("Count", &["T"], |fx, p| fx.array_of(p[0]));
    let env = fx.env();
    let int = fx.ty(fx.int);

    let subst = match_extension_receiver(&env, fx.generic(fx.nullable, &[int]), on_nullable).unwrap();
    assert_eq!(subst.get(TypeParamRef::of_method(on_nullable, 0)), Some(int));
    assert!(!is_applicable_receiver(&env, int, on_nullable));

    let string = fx.ty(fx.string);
    let subst = match_extension_receiver(&env, fx.array_of(string), on_array).unwrap();
    assert_eq!(subst.get(TypeParamRef::of_method(on_array, 0)), Some(string));
    assert!(!is_applicable_receiver(&env, fx.types.array(string, 2), on_array));
}

#[test]
fn test_non_extension_methods_never_match() {
    let mut fx = Fixture::new();
    let object = fx.ty(fx.object);
    let method = fx.extension("Plain", &[], |_, _| object);
    fx.store.method_mut(method).unwrap().flags = MethodFlags::STATIC;
    let env = fx.env();
    assert_eq!(
        match_extension_receiver(&env, fx.ty(fx.int), method),
        Err(MatchError::NotExtension(method))
    );
}
