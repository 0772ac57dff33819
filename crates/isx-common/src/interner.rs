//! Process-wide string interner for identifiers.
//!
//! Identifiers, namespace segments and type names are interned into a global
//! sharded pool and passed around as `Atom` handles. Comparisons become integer
//! comparisons, and atoms stay valid across compilations, so symbol tables built
//! for a cached reference set can be shared with every compilation that reuses it.
//!
//! Interned strings live for the rest of the process.

use once_cell::sync::Lazy;
use rustc_hash::{FxHashMap, FxHasher};
use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::RwLock;

/// An interned string identifier.
///
/// Atoms are cheap to copy (just a u32) and can be compared with == in O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Atom(u32);

impl Atom {
    /// A sentinel value representing no atom / empty string.
    pub const NONE: Atom = Atom(0);

    /// Intern `s` in the global pool.
    #[inline]
    pub fn intern(s: &str) -> Atom {
        GLOBAL.intern(s)
    }

    /// Check if this is the empty/none atom.
    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_some(self) -> bool {
        self.0 != 0
    }

    /// Resolve the atom back to its text.
    #[inline]
    pub fn as_str(self) -> &'static str {
        GLOBAL.resolve(self)
    }

    /// Get the raw index value.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({:?})", self.as_str())
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Atom {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl From<&str> for Atom {
    fn from(s: &str) -> Self {
        Atom::intern(s)
    }
}

const SHARD_BITS: u32 = 5;
const SHARD_COUNT: usize = 1 << SHARD_BITS;
const SHARD_MASK: u32 = (SHARD_COUNT as u32) - 1;

/// Names that are looked up on every request; interning them up front keeps
/// them in the low shard slots.
const COMMON_STRINGS: &[&str] = &[
    "System",
    "Object",
    "String",
    "ValueType",
    "Enum",
    "Array",
    "Nullable",
    "Linq",
    "Collections",
    "Generic",
    "IEnumerable",
    "Obsolete",
    "ObsoleteAttribute",
    "var",
    "value",
];

static GLOBAL: Lazy<ShardedInterner> = Lazy::new(|| {
    let interner = ShardedInterner::new();
    for s in COMMON_STRINGS {
        interner.intern(s);
    }
    interner
});

#[derive(Default)]
struct ShardState {
    map: FxHashMap<&'static str, Atom>,
    strings: Vec<&'static str>,
}

/// Sharded string interner for concurrent use.
///
/// Uses fixed buckets to reduce lock contention while keeping lookups O(1).
pub struct ShardedInterner {
    shards: [RwLock<ShardState>; SHARD_COUNT],
}

impl ShardedInterner {
    /// Create a new sharded interner with the empty string pre-interned at index 0.
    pub fn new() -> Self {
        let shards: [RwLock<ShardState>; SHARD_COUNT] =
            std::array::from_fn(|_| RwLock::new(ShardState::default()));
        if let Ok(mut state) = shards[0].write() {
            state.strings.push("");
            state.map.insert("", Atom::NONE);
        }
        ShardedInterner { shards }
    }

    /// Intern a string, returning its Atom handle.
    pub fn intern(&self, s: &str) -> Atom {
        if s.is_empty() {
            return Atom::NONE;
        }

        let shard_idx = Self::shard_for(s);
        if let Ok(state) = self.shards[shard_idx].read() {
            if let Some(&atom) = state.map.get(s) {
                return atom;
            }
        }

        let Ok(mut state) = self.shards[shard_idx].write() else {
            return Atom::NONE;
        };
        if let Some(&atom) = state.map.get(s) {
            return atom;
        }

        let local_index = state.strings.len() as u32;
        if local_index > (u32::MAX >> SHARD_BITS) {
            return Atom::NONE;
        }

        let atom = Atom((local_index << SHARD_BITS) | (shard_idx as u32 & SHARD_MASK));
        let owned: &'static str = Box::leak(s.to_owned().into_boxed_str());
        state.strings.push(owned);
        state.map.insert(owned, atom);
        atom
    }

    /// Resolve an Atom back to its string value.
    /// Returns the empty string for atoms this interner never produced.
    pub fn resolve(&self, atom: Atom) -> &'static str {
        if atom.is_none() {
            return "";
        }
        let shard_idx = (atom.0 & SHARD_MASK) as usize;
        let local_index = (atom.0 >> SHARD_BITS) as usize;
        self.shards[shard_idx]
            .read()
            .ok()
            .and_then(|state| state.strings.get(local_index).copied())
            .unwrap_or("")
    }

    /// Number of interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.read().map(|state| state.strings.len()).unwrap_or(0))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    #[inline]
    fn shard_for(s: &str) -> usize {
        let mut hasher = FxHasher::default();
        s.hash(&mut hasher);
        (hasher.finish() as usize) & (SHARD_COUNT - 1)
    }
}

impl Default for ShardedInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/interner_tests.rs"]
mod tests;
