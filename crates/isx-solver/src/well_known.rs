//! Well-known library types.
//!
//! Keyword types, conversions and array interfaces refer to core library
//! definitions by metadata name. `WellKnown` resolves those names once per
//! bound reference set. A program compiled without a core library simply has
//! fewer entries; relations that need a missing type never succeed.

use crate::def::DefinitionStore;
use crate::types::DefId;
use rustc_hash::FxHashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpecialType {
    Object,
    String,
    Boolean,
    Char,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
    IntPtr,
    UIntPtr,
    ValueType,
    Enum,
    Array,
    Delegate,
    MulticastDelegate,
    Type,
    Nullable,
    IEnumerable,
    IEnumerableT,
    ICollectionT,
    IListT,
    IReadOnlyCollectionT,
    IReadOnlyListT,
    ObsoleteAttribute,
}

impl SpecialType {
    pub const ALL: &'static [SpecialType] = &[
        SpecialType::Object,
        SpecialType::String,
        SpecialType::Boolean,
        SpecialType::Char,
        SpecialType::SByte,
        SpecialType::Byte,
        SpecialType::Int16,
        SpecialType::UInt16,
        SpecialType::Int32,
        SpecialType::UInt32,
        SpecialType::Int64,
        SpecialType::UInt64,
        SpecialType::Single,
        SpecialType::Double,
        SpecialType::Decimal,
        SpecialType::IntPtr,
        SpecialType::UIntPtr,
        SpecialType::ValueType,
        SpecialType::Enum,
        SpecialType::Array,
        SpecialType::Delegate,
        SpecialType::MulticastDelegate,
        SpecialType::Type,
        SpecialType::Nullable,
        SpecialType::IEnumerable,
        SpecialType::IEnumerableT,
        SpecialType::ICollectionT,
        SpecialType::IListT,
        SpecialType::IReadOnlyCollectionT,
        SpecialType::IReadOnlyListT,
        SpecialType::ObsoleteAttribute,
    ];

    /// Metadata name and arity.
    pub fn metadata_name(self) -> (&'static str, u16) {
        match self {
            SpecialType::Object => ("System.Object", 0),
            SpecialType::String => ("System.String", 0),
            SpecialType::Boolean => ("System.Boolean", 0),
            SpecialType::Char => ("System.Char", 0),
            SpecialType::SByte => ("System.SByte", 0),
            SpecialType::Byte => ("System.Byte", 0),
            SpecialType::Int16 => ("System.Int16", 0),
            SpecialType::UInt16 => ("System.UInt16", 0),
            SpecialType::Int32 => ("System.Int32", 0),
            SpecialType::UInt32 => ("System.UInt32", 0),
            SpecialType::Int64 => ("System.Int64", 0),
            SpecialType::UInt64 => ("System.UInt64", 0),
            SpecialType::Single => ("System.Single", 0),
            SpecialType::Double => ("System.Double", 0),
            SpecialType::Decimal => ("System.Decimal", 0),
            SpecialType::IntPtr => ("System.IntPtr", 0),
            SpecialType::UIntPtr => ("System.UIntPtr", 0),
            SpecialType::ValueType => ("System.ValueType", 0),
            SpecialType::Enum => ("System.Enum", 0),
            SpecialType::Array => ("System.Array", 0),
            SpecialType::Delegate => ("System.Delegate", 0),
            SpecialType::MulticastDelegate => ("System.MulticastDelegate", 0),
            SpecialType::Type => ("System.Type", 0),
            SpecialType::Nullable => ("System.Nullable", 1),
            SpecialType::IEnumerable => ("System.Collections.IEnumerable", 0),
            SpecialType::IEnumerableT => ("System.Collections.Generic.IEnumerable", 1),
            SpecialType::ICollectionT => ("System.Collections.Generic.ICollection", 1),
            SpecialType::IListT => ("System.Collections.Generic.IList", 1),
            SpecialType::IReadOnlyCollectionT => {
                ("System.Collections.Generic.IReadOnlyCollection", 1)
            }
            SpecialType::IReadOnlyListT => ("System.Collections.Generic.IReadOnlyList", 1),
            SpecialType::ObsoleteAttribute => ("System.ObsoleteAttribute", 0),
        }
    }

    /// The type a keyword names (`int`, `string`, `object`, ...).
    pub fn from_keyword(keyword: &str) -> Option<SpecialType> {
        Some(match keyword {
            "object" => SpecialType::Object,
            "string" => SpecialType::String,
            "bool" => SpecialType::Boolean,
            "char" => SpecialType::Char,
            "sbyte" => SpecialType::SByte,
            "byte" => SpecialType::Byte,
            "short" => SpecialType::Int16,
            "ushort" => SpecialType::UInt16,
            "int" => SpecialType::Int32,
            "uint" => SpecialType::UInt32,
            "long" => SpecialType::Int64,
            "ulong" => SpecialType::UInt64,
            "float" => SpecialType::Single,
            "double" => SpecialType::Double,
            "decimal" => SpecialType::Decimal,
            "nint" => SpecialType::IntPtr,
            "nuint" => SpecialType::UIntPtr,
            _ => return None,
        })
    }

    pub fn keyword(self) -> Option<&'static str> {
        Some(match self {
            SpecialType::Object => "object",
            SpecialType::String => "string",
            SpecialType::Boolean => "bool",
            SpecialType::Char => "char",
            SpecialType::SByte => "sbyte",
            SpecialType::Byte => "byte",
            SpecialType::Int16 => "short",
            SpecialType::UInt16 => "ushort",
            SpecialType::Int32 => "int",
            SpecialType::UInt32 => "uint",
            SpecialType::Int64 => "long",
            SpecialType::UInt64 => "ulong",
            SpecialType::Single => "float",
            SpecialType::Double => "double",
            SpecialType::Decimal => "decimal",
            _ => return None,
        })
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            SpecialType::Char
                | SpecialType::SByte
                | SpecialType::Byte
                | SpecialType::Int16
                | SpecialType::UInt16
                | SpecialType::Int32
                | SpecialType::UInt32
                | SpecialType::Int64
                | SpecialType::UInt64
                | SpecialType::Single
                | SpecialType::Double
                | SpecialType::Decimal
                | SpecialType::IntPtr
                | SpecialType::UIntPtr
        )
    }

    /// Implicit numeric conversion targets.
    pub fn widens_to(self, target: SpecialType) -> bool {
        use SpecialType::*;
        let targets: &[SpecialType] = match self {
            SByte => &[Int16, Int32, Int64, Single, Double, Decimal, IntPtr],
            Byte => &[
                Int16, UInt16, Int32, UInt32, Int64, UInt64, Single, Double, Decimal, IntPtr,
                UIntPtr,
            ],
            Int16 => &[Int32, Int64, Single, Double, Decimal, IntPtr],
            UInt16 => &[Int32, UInt32, Int64, UInt64, Single, Double, Decimal, IntPtr, UIntPtr],
            Int32 => &[Int64, Single, Double, Decimal, IntPtr],
            UInt32 => &[Int64, UInt64, Single, Double, Decimal, UIntPtr],
            Int64 => &[Single, Double, Decimal],
            UInt64 => &[Single, Double, Decimal],
            Char => &[UInt16, Int32, UInt32, Int64, UInt64, Single, Double, Decimal, IntPtr, UIntPtr],
            Single => &[Double],
            IntPtr => &[Int64, Single, Double, Decimal],
            UIntPtr => &[UInt64, Single, Double, Decimal],
            _ => &[],
        };
        targets.contains(&target)
    }
}

/// Resolved well-known definitions for one reference set.
#[derive(Clone, Debug, Default)]
pub struct WellKnown {
    defs: FxHashMap<SpecialType, DefId>,
    specials: FxHashMap<DefId, SpecialType>,
}

impl WellKnown {
    pub fn resolve(store: &DefinitionStore) -> Self {
        let mut well_known = WellKnown::default();
        for &special in SpecialType::ALL {
            let (name, arity) = special.metadata_name();
            if let Some(def) = store.lookup_qualified(name, arity) {
                well_known.defs.insert(special, def);
                well_known.specials.insert(def, special);
            }
        }
        well_known
    }

    pub fn def(&self, special: SpecialType) -> Option<DefId> {
        self.defs.get(&special).copied()
    }

    pub fn special_of(&self, def: DefId) -> Option<SpecialType> {
        self.specials.get(&def).copied()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
