//! Core type representation.
//!
//! Types are interned structures referenced by `TypeId`. Named types point at
//! a `DefId` in the `DefinitionStore` and carry their type arguments; type
//! parameters are referenced positionally through their owner.

use serde::Serialize;
use smallvec::SmallVec;

/// Handle to an interned type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Unresolvable or malformed type.
    pub const ERROR: TypeId = TypeId(0);
    /// The type of the `null` literal.
    pub const NULL: TypeId = TypeId(1);
    pub const VOID: TypeId = TypeId(2);
    pub const DYNAMIC: TypeId = TypeId(3);

    /// Number of ids reserved for the intrinsics above.
    pub const FIRST_USER: u32 = 4;

    #[inline]
    pub fn is_error(self) -> bool {
        self == TypeId::ERROR
    }

    #[inline]
    pub fn is_intrinsic(self) -> bool {
        self.0 < Self::FIRST_USER
    }
}

/// Handle to a type definition (class, struct, interface, enum, delegate).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DefId(pub u32);

/// Handle to a method definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MethodId(pub u32);

/// Handle to an assembly: a referenced library or the compilation itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AssemblyId(pub u32);

/// Declaration that owns a type parameter list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeParamOwner {
    Type(DefId),
    Method(MethodId),
}

/// Positional reference to a type parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeParamRef {
    pub owner: TypeParamOwner,
    pub index: u16,
}

impl TypeParamRef {
    pub fn of_type(def: DefId, index: u16) -> Self {
        TypeParamRef {
            owner: TypeParamOwner::Type(def),
            index,
        }
    }

    pub fn of_method(method: MethodId, index: u16) -> Self {
        TypeParamRef {
            owner: TypeParamOwner::Method(method),
            index,
        }
    }

    pub fn is_method_param_of(self, method: MethodId) -> bool {
        self.owner == TypeParamOwner::Method(method)
    }
}

/// Inline storage for type argument lists; most generic types take one or two.
pub type TypeArgs = SmallVec<[TypeId; 2]>;

/// Structural type data. Equal data interns to the same `TypeId`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Error,
    Null,
    Void,
    Dynamic,
    /// A class, struct, interface, enum or delegate, possibly instantiated.
    Named { def: DefId, args: TypeArgs },
    Array { element: TypeId, rank: u8 },
    TypeParam(TypeParamRef),
}

impl TypeData {
    pub fn named(def: DefId, args: impl IntoIterator<Item = TypeId>) -> TypeData {
        TypeData::Named {
            def,
            args: args.into_iter().collect(),
        }
    }
}

/// Variance annotation on an interface or delegate type parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Variance {
    #[default]
    Invariant,
    /// `out T`
    Covariant,
    /// `in T`
    Contravariant,
}
