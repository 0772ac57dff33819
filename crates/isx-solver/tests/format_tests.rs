use super::*;
use crate::fixture::Fixture;

#[test]
fn test_format_types() {
    let fx = Fixture::new();
    let env = fx.env();
    let int = fx.ty(fx.int);
    let string = fx.ty(fx.string);

    assert_eq!(format_type(&env, int), "int");
    assert_eq!(format_type(&env, fx.generic(fx.list_t, &[string])), "List<string>");
    assert_eq!(format_type(&env, fx.array_of(int)), "int[]");
    assert_eq!(format_type(&env, fx.types.array(int, 3)), "int[,,]");
    assert_eq!(format_type(&env, fx.generic(fx.nullable, &[int])), "int?");
    assert_eq!(format_type(&env, TypeId::NULL), "null");
    assert_eq!(format_type(&env, fx.own_param(fx.list_t, 0)), "T");

    let mut qualified = TypeFormatter::new(&env);
    qualified.qualified = true;
    assert_eq!(
        qualified.format(fx.generic(fx.list_t, &[string])),
        "System.Collections.Generic.List<string>"
    );
}

#[test]
fn test_format_extension_signature() {
    let mut fx = Fixture::new();
    let method = fx.extension("Select", &["TSource", "TResult"], |fx, p| {
        fx.generic(fx.ienumerable_t, &[p[0]])
    });
    let selector = fx.generic(fx.func, &[fx.method_param(method, 0), fx.method_param(method, 1)]);
    let result = fx.generic(fx.ienumerable_t, &[fx.method_param(method, 1)]);
    {
        let info = fx.store.method_mut(method).unwrap();
        info.params.push(crate::def::ParameterInfo {
            name: isx_common::Atom::intern("selector"),
            ty: selector,
            modifier: ParamModifier::None,
            has_default: false,
        });
        info.return_type = result;
    }
    let env = fx.env();
    let formatter = TypeFormatter::new(&env);

    assert_eq!(
        formatter.parameter_list(method, true, &Substitution::new()),
        "(Func<TSource, TResult> selector)"
    );
    assert_eq!(
        formatter.signature(method, true, &Substitution::new()),
        "IEnumerable<TResult> Select<TSource, TResult>(Func<TSource, TResult> selector)"
    );

    let mut subst = Substitution::new();
    subst.insert(crate::types::TypeParamRef::of_method(method, 0), fx.ty(fx.string));
    assert_eq!(
        formatter.parameter_list(method, true, &subst),
        "(Func<string, TResult> selector)"
    );
    assert_eq!(
        formatter.parameter_list(method, false, &subst),
        "(IEnumerable<string> source, Func<string, TResult> selector)"
    );
}
