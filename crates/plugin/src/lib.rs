//! Plugin seam for class discovery.
//!
//! The index builder does not know how classes are stored. It asks a
//! [`ClassReflector`] whether it understands an archive, opens it, lists the
//! classes inside and reflects their public members. Concrete reflectors live
//! in their own crates (`luasense-java` reads JAR/ZIP archives of class
//! files).

pub mod reflect;

pub use reflect::{BoxError, ClassMembers, ClassReflector, ReflectedArchive};
