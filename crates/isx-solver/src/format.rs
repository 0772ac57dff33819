//! C#-style display of types and signatures.

use crate::db::TypeDatabase;
use crate::def::ParamModifier;
use crate::subst::{Substitution, substitute};
use crate::types::{MethodId, TypeData, TypeId};
use crate::well_known::SpecialType;
use isx_common::limits::MAX_INFERENCE_DEPTH;
use std::fmt::Write;

pub struct TypeFormatter<'a> {
    db: &'a dyn TypeDatabase,
    /// Prefix named types with their namespace.
    pub qualified: bool,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(db: &'a dyn TypeDatabase) -> Self {
        TypeFormatter {
            db,
            qualified: false,
        }
    }

    pub fn format(&self, ty: TypeId) -> String {
        let mut out = String::new();
        self.write_type(&mut out, ty, 0);
        out
    }

    fn write_type(&self, out: &mut String, ty: TypeId, depth: u32) {
        if depth > MAX_INFERENCE_DEPTH {
            out.push_str("...");
            return;
        }
        match self.db.lookup(ty) {
            TypeData::Error => out.push('?'),
            TypeData::Null => out.push_str("null"),
            TypeData::Void => out.push_str("void"),
            TypeData::Dynamic => out.push_str("dynamic"),
            TypeData::TypeParam(param) => match self.db.type_param_info(param) {
                Some(info) => out.push_str(info.name.as_str()),
                None => out.push('?'),
            },
            TypeData::Array { element, rank } => {
                self.write_type(out, element, depth + 1);
                out.push('[');
                for _ in 1..rank {
                    out.push(',');
                }
                out.push(']');
            }
            TypeData::Named { def, args } => {
                if let Some(underlying) = self.db.nullable_underlying(ty) {
                    self.write_type(out, underlying, depth + 1);
                    out.push('?');
                    return;
                }
                if let Some(keyword) = self
                    .db
                    .well_known()
                    .special_of(def)
                    .and_then(SpecialType::keyword)
                {
                    out.push_str(keyword);
                    return;
                }
                if self.qualified {
                    let namespace = self.db.defs().namespace_of(def);
                    if namespace.is_some() {
                        out.push_str(namespace.as_str());
                        out.push('.');
                    }
                }
                out.push_str(&self.db.defs().nested_name(def));
                if !args.is_empty() {
                    out.push('<');
                    for (i, &arg) in args.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        self.write_type(out, arg, depth + 1);
                    }
                    out.push('>');
                }
            }
        }
    }

    /// Parameter list in parentheses, e.g. `(int count, string separator)`.
    ///
    /// With `skip_receiver` the first parameter of an extension method is
    /// left out. `subst` is applied to every parameter type.
    pub fn parameter_list(&self, method: MethodId, skip_receiver: bool, subst: &Substitution) -> String {
        let Some(info) = self.db.method(method) else {
            return "()".to_string();
        };
        let skip = usize::from(skip_receiver && info.is_extension());
        let mut out = String::from("(");
        for (i, param) in info.params.iter().skip(skip).enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            match param.modifier {
                ParamModifier::None => {}
                ParamModifier::Ref => out.push_str("ref "),
                ParamModifier::Out => out.push_str("out "),
                ParamModifier::In => out.push_str("in "),
                ParamModifier::Params => out.push_str("params "),
            }
            self.write_type(&mut out, substitute(self.db, param.ty, subst), 0);
            let _ = write!(out, " {}", param.name);
        }
        out.push(')');
        out
    }

    /// `Name<T1, T2>` for a method's declared type parameters.
    pub fn method_name(&self, method: MethodId) -> String {
        let Some(info) = self.db.method(method) else {
            return String::new();
        };
        let mut out = info.name.as_str().to_string();
        if !info.type_params.is_empty() {
            out.push('<');
            for (i, param) in info.type_params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(param.name.as_str());
            }
            out.push('>');
        }
        out
    }

    /// Full signature: `IEnumerable<TResult> Select<TSource, TResult>(Func<TSource, TResult> selector)`.
    pub fn signature(&self, method: MethodId, skip_receiver: bool, subst: &Substitution) -> String {
        let Some(info) = self.db.method(method) else {
            return String::new();
        };
        let mut out = String::new();
        self.write_type(&mut out, substitute(self.db, info.return_type, subst), 0);
        out.push(' ');
        out.push_str(&self.method_name(method));
        out.push_str(&self.parameter_list(method, skip_receiver, subst));
        out
    }
}

pub fn format_type(db: &dyn TypeDatabase, ty: TypeId) -> String {
    TypeFormatter::new(db).format(ty)
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod tests;
