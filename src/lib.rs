//! Loads an oftr shared library, calls its `oftr_call` entry point and checks the reported version


pub use error::{ProbeError,Result};
pub use oftr_library::{OftrLibrary, Opcode};
pub use version::{VersionInfo, VERSION_PATTERN};

mod error;
pub mod oftr_library;
pub mod version;
