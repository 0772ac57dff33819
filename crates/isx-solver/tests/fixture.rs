//! A hand-built miniature core library for solver unit tests.

use crate::*;
use isx_common::Atom;
use std::sync::Arc;

pub(crate) struct Fixture {
    pub store: DefinitionStore,
    pub types: Arc<TypeInterner>,
    pub assembly: AssemblyId,

    pub object: DefId,
    pub value_type: DefId,
    pub enum_: DefId,
    pub string: DefId,
    pub boolean: DefId,
    pub char_: DefId,
    pub int: DefId,
    pub long: DefId,
    pub float: DefId,
    pub double: DefId,
    pub decimal: DefId,
    pub array: DefId,
    pub multicast_delegate: DefId,
    pub nullable: DefId,
    pub ienumerable: DefId,
    pub ienumerable_t: DefId,
    pub icollection_t: DefId,
    pub ilist_t: DefId,
    pub ireadonly_collection_t: DefId,
    pub ireadonly_list_t: DefId,
    pub list_t: DefId,
    pub icomparable_t: DefId,
    pub func: DefId,
    /// `public static class Lib.Extensions`
    pub extensions: DefId,
}

impl Fixture {
    pub fn new() -> Self {
        let mut store = DefinitionStore::new();
        let types = Arc::new(TypeInterner::new());
        let assembly = store.add_assembly("System.Runtime", "8.0.0");
        let placeholder = DefId(0);

        let mut fixture = Fixture {
            store,
            types,
            assembly,
            object: placeholder,
            value_type: placeholder,
            enum_: placeholder,
            string: placeholder,
            boolean: placeholder,
            char_: placeholder,
            int: placeholder,
            long: placeholder,
            float: placeholder,
            double: placeholder,
            decimal: placeholder,
            array: placeholder,
            multicast_delegate: placeholder,
            nullable: placeholder,
            ienumerable: placeholder,
            ienumerable_t: placeholder,
            icollection_t: placeholder,
            ilist_t: placeholder,
            ireadonly_collection_t: placeholder,
            ireadonly_list_t: placeholder,
            list_t: placeholder,
            icomparable_t: placeholder,
            func: placeholder,
            extensions: placeholder,
        };

        fixture.object = fixture.add("System", "Object", DefKind::Class, &[]);
        let object = fixture.ty(fixture.object);
        fixture.value_type = fixture.add("System", "ValueType", DefKind::Class, &[]);
        fixture.set_base(fixture.value_type, object);
        let value_type = fixture.ty(fixture.value_type);
        fixture.enum_ = fixture.add("System", "Enum", DefKind::Class, &[]);
        fixture.set_base(fixture.enum_, value_type);

        fixture.ienumerable = fixture.add("System.Collections", "IEnumerable", DefKind::Interface, &[]);
        fixture.ienumerable_t =
            fixture.add("System.Collections.Generic", "IEnumerable", DefKind::Interface, &["T"]);
        fixture.set_variance(fixture.ienumerable_t, 0, Variance::Covariant);
        let plain_enumerable = fixture.ty(fixture.ienumerable);
        fixture.add_interface(fixture.ienumerable_t, plain_enumerable);

        fixture.icollection_t =
            fixture.add("System.Collections.Generic", "ICollection", DefKind::Interface, &["T"]);
        fixture.ilist_t = fixture.add("System.Collections.Generic", "IList", DefKind::Interface, &["T"]);
        fixture.ireadonly_collection_t = fixture.add(
            "System.Collections.Generic",
            "IReadOnlyCollection",
            DefKind::Interface,
            &["T"],
        );
        fixture.set_variance(fixture.ireadonly_collection_t, 0, Variance::Covariant);
        fixture.ireadonly_list_t =
            fixture.add("System.Collections.Generic", "IReadOnlyList", DefKind::Interface, &["T"]);
        fixture.set_variance(fixture.ireadonly_list_t, 0, Variance::Covariant);

        let enumerable_t = fixture.ienumerable_t;
        let collection_t = fixture.icollection_t;
        for (def, parent) in [
            (fixture.icollection_t, enumerable_t),
            (fixture.ilist_t, collection_t),
            (fixture.ireadonly_collection_t, enumerable_t),
            (fixture.ireadonly_list_t, fixture.ireadonly_collection_t),
        ] {
            let own = fixture.own_param(def, 0);
            let iface = fixture.generic(parent, &[own]);
            fixture.add_interface(def, iface);
        }

        fixture.list_t = fixture.add("System.Collections.Generic", "List", DefKind::Class, &["T"]);
        fixture.set_base(fixture.list_t, object);
        let list_param = fixture.own_param(fixture.list_t, 0);
        for iface in [fixture.ilist_t, fixture.ireadonly_list_t] {
            let instantiated = fixture.generic(iface, &[list_param]);
            fixture.add_interface(fixture.list_t, instantiated);
        }
        fixture.add_flags(fixture.list_t, DefFlags::PARAMETERLESS_CONSTRUCTOR);

        fixture.icomparable_t = fixture.add("System", "IComparable", DefKind::Interface, &["T"]);
        fixture.set_variance(fixture.icomparable_t, 0, Variance::Contravariant);

        let mut structs = Vec::new();
        for name in ["Boolean", "Char", "Int32", "Int64", "Single", "Double", "Decimal"] {
            let def = fixture.add("System", name, DefKind::Struct, &[]);
            fixture.set_base(def, value_type);
            let self_ty = fixture.ty(def);
            let comparable = fixture.generic(fixture.icomparable_t, &[self_ty]);
            fixture.add_interface(def, comparable);
            structs.push(def);
        }
        fixture.boolean = structs[0];
        fixture.char_ = structs[1];
        fixture.int = structs[2];
        fixture.long = structs[3];
        fixture.float = structs[4];
        fixture.double = structs[5];
        fixture.decimal = structs[6];

        fixture.string = fixture.add("System", "String", DefKind::Class, &[]);
        fixture.set_base(fixture.string, object);
        let char_ty = fixture.ty(fixture.char_);
        let chars = fixture.generic(fixture.ienumerable_t, &[char_ty]);
        fixture.add_interface(fixture.string, chars);
        let string_ty = fixture.ty(fixture.string);
        let comparable_string = fixture.generic(fixture.icomparable_t, &[string_ty]);
        fixture.add_interface(fixture.string, comparable_string);

        fixture.array = fixture.add("System", "Array", DefKind::Class, &[]);
        fixture.set_base(fixture.array, object);
        fixture.add_interface(fixture.array, plain_enumerable);

        let delegate = fixture.add("System", "Delegate", DefKind::Class, &[]);
        fixture.set_base(delegate, object);
        fixture.multicast_delegate = fixture.add("System", "MulticastDelegate", DefKind::Class, &[]);
        let delegate_ty = fixture.ty(delegate);
        fixture.set_base(fixture.multicast_delegate, delegate_ty);

        fixture.func = fixture.add("System", "Func", DefKind::Delegate, &["T", "TResult"]);
        fixture.set_variance(fixture.func, 0, Variance::Contravariant);
        fixture.set_variance(fixture.func, 1, Variance::Covariant);
        let multicast = fixture.ty(fixture.multicast_delegate);
        fixture.set_base(fixture.func, multicast);

        fixture.nullable = fixture.add("System", "Nullable", DefKind::Struct, &["T"]);
        fixture.set_base(fixture.nullable, value_type);
        fixture.set_constraints(fixture.nullable, 0, ConstraintFlags::STRUCT);

        fixture.extensions = fixture.add("Lib", "Extensions", DefKind::Class, &[]);
        fixture.add_flags(fixture.extensions, DefFlags::STATIC);
        fixture.set_base(fixture.extensions, object);

        fixture
    }

    pub fn add(&mut self, namespace: &str, name: &str, kind: DefKind, params: &[&str]) -> DefId {
        let mut info = DefinitionInfo::new(
            Atom::intern(name),
            kind,
            Atom::intern(namespace),
            self.assembly,
        );
        info.accessibility = Accessibility::Public;
        info.type_params = params
            .iter()
            .map(|p| TypeParamInfo::new(Atom::intern(p)))
            .collect();
        self.store.add_type(info)
    }

    pub fn ty(&self, def: DefId) -> TypeId {
        self.types.simple(def)
    }

    pub fn generic(&self, def: DefId, args: &[TypeId]) -> TypeId {
        self.types.named(def, args.iter().copied().collect())
    }

    pub fn array_of(&self, element: TypeId) -> TypeId {
        self.types.array(element, 1)
    }

    pub fn own_param(&self, def: DefId, index: u16) -> TypeId {
        self.types.type_param(TypeParamRef::of_type(def, index))
    }

    pub fn set_base(&mut self, def: DefId, base: TypeId) {
        self.store.def_mut(def).unwrap().base = Some(base);
    }

    pub fn add_interface(&mut self, def: DefId, iface: TypeId) {
        self.store.def_mut(def).unwrap().interfaces.push(iface);
    }

    pub fn add_flags(&mut self, def: DefId, flags: DefFlags) {
        self.store.def_mut(def).unwrap().flags |= flags;
    }

    pub fn set_variance(&mut self, def: DefId, index: usize, variance: Variance) {
        self.store.def_mut(def).unwrap().type_params[index].variance = variance;
    }

    pub fn set_constraints(&mut self, def: DefId, index: usize, flags: ConstraintFlags) {
        self.store.def_mut(def).unwrap().type_params[index].constraints = flags;
    }

    /// Declare `public static R name<params>(this <receiver> source)` in
    /// `Lib.Extensions`. `receiver` gets the method's type parameter types.
    pub fn extension(
        &mut self,
        name: &str,
        params: &[&str],
        receiver: impl FnOnce(&Fixture, &[TypeId]) -> TypeId,
    ) -> MethodId {
        let mut info = MethodInfo::new(Atom::intern(name), self.extensions);
        info.flags = MethodFlags::STATIC | MethodFlags::EXTENSION;
        info.accessibility = Accessibility::Public;
        info.type_params = params
            .iter()
            .map(|p| TypeParamInfo::new(Atom::intern(p)))
            .collect();
        let id = self.store.add_method(info);
        let param_types: Vec<TypeId> = (0..params.len() as u16)
            .map(|i| self.types.type_param(TypeParamRef::of_method(id, i)))
            .collect();
        let receiver_ty = receiver(self, &param_types);
        self.store.method_mut(id).unwrap().params.push(ParameterInfo {
            name: Atom::intern("source"),
            ty: receiver_ty,
            modifier: ParamModifier::None,
            has_default: false,
        });
        id
    }

    pub fn method_param(&self, method: MethodId, index: u16) -> TypeId {
        self.types.type_param(TypeParamRef::of_method(method, index))
    }

    pub fn method_type_param_mut(&mut self, method: MethodId, index: usize) -> &mut TypeParamInfo {
        &mut self.store.method_mut(method).unwrap().type_params[index]
    }

    pub fn env(&self) -> TypeEnv {
        TypeEnv::new(self.types.clone(), Arc::new(self.store.clone()))
    }
}
