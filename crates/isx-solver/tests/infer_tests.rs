use super::*;
use crate::fixture::Fixture;

#[test]
fn test_bind_and_probe() {
    let mut fx = Fixture::new();
    let method = fx.extension("M", &["T", "U"], |_, p| p[0]);
    let env = fx.env();
    let mut ctx = InferenceContext::new(&env, method);

    let t = ctx.var_for(TypeParamRef::of_method(method, 0)).unwrap();
    let int = fx.ty(fx.int);
    ctx.unify_var_type(t, int).unwrap();
    ctx.unify_var_type(t, int).unwrap();
    assert_eq!(ctx.probe(t), Some(int));

    let subst = ctx.substitution();
    assert_eq!(subst.len(), 1);
    assert_eq!(subst.get(TypeParamRef::of_method(method, 0)), Some(int));
    assert!(matches!(ctx.resolve_all(), Err(InferenceError::Unresolved(_))));
}

#[test]
fn test_conflicting_bindings() {
    let mut fx = Fixture::new();
    let method = fx.extension("M", &["T"], |_, p| p[0]);
    let env = fx.env();
    let mut ctx = InferenceContext::new(&env, method);
    let t = ctx.var_for(TypeParamRef::of_method(method, 0)).unwrap();

    ctx.unify_var_type(t, fx.ty(fx.int)).unwrap();
    let err = ctx.unify_var_type(t, fx.ty(fx.string)).unwrap_err();
    assert_eq!(err, InferenceError::Conflict(fx.ty(fx.int), fx.ty(fx.string)));
}

#[test]
fn test_unified_vars_share_bindings() {
    let mut fx = Fixture::new();
    let method = fx.extension("M", &["T", "U"], |_, p| p[0]);
    let env = fx.env();
    let mut ctx = InferenceContext::new(&env, method);
    let t = ctx.var_for(TypeParamRef::of_method(method, 0)).unwrap();
    let u = ctx.var_for(TypeParamRef::of_method(method, 1)).unwrap();

    ctx.unify_vars(t, u).unwrap();
    ctx.unify_var_type(u, fx.ty(fx.long)).unwrap();
    assert_eq!(ctx.probe(t), Some(fx.ty(fx.long)));
    assert!(ctx.unify_var_type(t, fx.ty(fx.int)).is_err());
}

#[test]
fn test_structural_unification() {
    let mut fx = Fixture::new();
    let method = fx.extension("M", &["TKey", "TValue"], |fx, p| {
        let pair = fx.generic(fx.func, &[p[0], p[1]]);
        fx.generic(fx.list_t, &[pair])
    });
    let env = fx.env();
    let int = fx.ty(fx.int);
    let string = fx.ty(fx.string);
    let receiver = fx.generic(fx.list_t, &[fx.generic(fx.func, &[int, string])]);
    let pattern = env.method(method).unwrap().params[0].ty;

    let mut ctx = InferenceContext::new(&env, method);
    ctx.unify(pattern, receiver).unwrap();
    let subst = ctx.resolve_all().unwrap();
    assert_eq!(subst.get(TypeParamRef::of_method(method, 0)), Some(int));
    assert_eq!(subst.get(TypeParamRef::of_method(method, 1)), Some(string));

    let mut ctx = InferenceContext::new(&env, method);
    assert!(ctx.unify(pattern, fx.generic(fx.list_t, &[int])).is_err());
}

#[test]
fn test_occurs_check() {
    let mut fx = Fixture::new();
    let method = fx.extension("M", &["T"], |_, p| p[0]);
    let env = fx.env();
    let mut ctx = InferenceContext::new(&env, method);
    let t = ctx.var_for(TypeParamRef::of_method(method, 0)).unwrap();
    let list_of_t = fx.generic(fx.list_t, &[fx.method_param(method, 0)]);
    assert!(matches!(
        ctx.unify_var_type(t, list_of_t),
        Err(InferenceError::OccursCheck { .. })
    ));
}
