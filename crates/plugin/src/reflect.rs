use luasense_api::CompletionEntry;
use std::collections::HashMap;
use std::path::Path;

/// Error type for reflection operations
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Public members of one class, keyed by member name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassMembers {
    /// Binary name of the class (`a.b.Outer$Inner`)
    pub class: String,
    pub members: HashMap<String, CompletionEntry>,
}

impl ClassMembers {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            members: HashMap::new(),
        }
    }

    /// Insert a member; a later entry with the same name replaces the earlier one.
    pub fn insert(&mut self, entry: CompletionEntry) {
        self.members.insert(entry.name().to_string(), entry);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Reflector - knows how to open one kind of class archive
pub trait ClassReflector: Send + Sync {
    /// Reflector name (for logging/debugging)
    fn name(&self) -> &str;

    /// Check if this reflector can handle the archive
    fn can_reflect(&self, archive: &Path) -> bool;

    /// Open the archive for listing and reflection
    fn open(&self, archive: &Path) -> Result<Box<dyn ReflectedArchive>, BoxError>;
}

/// An opened archive.
///
/// Reflection of a single class may fail (corrupt entry, unsupported class
/// version); callers skip that class and continue.
pub trait ReflectedArchive: Send {
    /// Binary names of every class in the archive, nested ones included.
    fn class_names(&self) -> Vec<String>;

    /// Reflect the public members of one class.
    fn reflect(&mut self, class: &str) -> Result<ClassMembers, BoxError>;

    /// Reflect a batch of classes, one result per requested class.
    fn reflect_batch(&mut self, classes: &[String]) -> Vec<(String, Result<ClassMembers, BoxError>)> {
        classes
            .iter()
            .map(|class| (class.clone(), self.reflect(class)))
            .collect()
    }

    /// Binary names of the classes declared directly inside `class`,
    /// anonymous and local classes excluded.
    fn inner_classes(&mut self, class: &str) -> Result<Vec<String>, BoxError>;
}
