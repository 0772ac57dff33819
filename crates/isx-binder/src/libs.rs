//! Embedded core libraries.
//!
//! Declaration-only C# sources for the parts of `System.Runtime` and
//! `System.Linq` completion needs, embedded with `include_str!` so a
//! compilation works without any reference files on disk.

use crate::program::Library;
use once_cell::sync::Lazy;
use std::sync::Arc;

/// An embedded library source file.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedLib {
    /// Assembly name (e.g. "System.Linq")
    pub name: &'static str,
    pub version: &'static str,
    pub file_name: &'static str,
    pub content: &'static str,
}

impl EmbeddedLib {
    pub fn to_library(&self) -> Library {
        Library::new(self.name, self.version).with_file(self.file_name, self.content)
    }
}

/// Object model, primitives, delegates, collections and tasks.
pub const LIB_SYSTEM_RUNTIME: EmbeddedLib = EmbeddedLib {
    name: "System.Runtime",
    version: "8.0.0",
    file_name: "System.Runtime.cs",
    content: include_str!("../libs/System.Runtime.cs"),
};

/// `System.Linq.Enumerable` extension methods.
pub const LIB_SYSTEM_LINQ: EmbeddedLib = EmbeddedLib {
    name: "System.Linq",
    version: "8.0.0",
    file_name: "System.Linq.cs",
    content: include_str!("../libs/System.Linq.cs"),
};

pub const CORE_LIBS: &[EmbeddedLib] = &[LIB_SYSTEM_RUNTIME, LIB_SYSTEM_LINQ];

static CORE_LIBRARIES: Lazy<Vec<Arc<Library>>> = Lazy::new(|| {
    CORE_LIBS
        .iter()
        .map(|lib| Arc::new(lib.to_library()))
        .collect()
});

/// The embedded libraries, shared so their identities stay stable.
pub fn core_libraries() -> &'static [Arc<Library>] {
    &CORE_LIBRARIES
}

pub fn get_lib(name: &str) -> Option<&'static EmbeddedLib> {
    CORE_LIBS.iter().find(|lib| lib.name == name)
}
