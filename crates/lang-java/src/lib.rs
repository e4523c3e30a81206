//! Class reflection for JVM archives.
//!
//! [`JavaArchiveReflector`] opens JAR/ZIP files of compiled classes and
//! reads the public members of each class straight from its class file.
//! Nothing is loaded or executed.

pub mod reflect;

pub use reflect::{JarArchive, JavaArchiveReflector};

use luasense_plugin::ClassReflector;
use std::sync::Arc;

/// The reflector registered by default with the index service.
pub fn java_reflector() -> Arc<dyn ClassReflector> {
    Arc::new(JavaArchiveReflector)
}
