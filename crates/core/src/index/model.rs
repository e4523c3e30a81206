use luasense_api::naming::{is_anonymous, is_nested, short_name};
use luasense_api::{CompletionEntry, Fingerprint};
use luasense_plugin::ClassMembers;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

pub type MemberMap = BTreeMap<String, CompletionEntry>;

/// Binary class name → member name → entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassIndex {
    classes: BTreeMap<String, MemberMap>,
}

impl ClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn member_count(&self) -> usize {
        self.classes.values().map(BTreeMap::len).sum()
    }

    pub fn contains(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    pub fn members(&self, class: &str) -> Option<&MemberMap> {
        self.classes.get(class)
    }

    pub fn member(&self, class: &str, name: &str) -> Option<&CompletionEntry> {
        self.classes.get(class)?.get(name)
    }

    /// Replace the member set of a class with a fresh reflection result.
    pub fn insert_members(&mut self, reflected: ClassMembers) {
        let members = reflected.members.into_iter().collect();
        self.classes.insert(reflected.class, members);
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Classes equal to `path`, nested in it (`path$X`), or declared directly
    /// in package `path` (`path.X`, `path.X$Y`). Sub-packages are excluded.
    pub fn classes_under<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.classes
            .range::<str, _>((std::ops::Bound::Included(path), std::ops::Bound::Unbounded))
            .map(|(name, _)| name.as_str())
            .take_while(move |name| name.starts_with(path))
            .filter(move |name| {
                let rest = &name[path.len()..];
                match rest.chars().next() {
                    None | Some('$') => true,
                    Some('.') => !rest[1..].contains('.'),
                    Some(_) => false,
                }
            })
    }
}

/// Order of candidates sharing a short name: top-level classes before
/// nested ones, then alphabetical.
fn candidate_order(a: &str, b: &str) -> Ordering {
    is_nested(a).cmp(&is_nested(b)).then_with(|| a.cmp(b))
}

/// Short name (`Button`, `AlertDialog.Builder`) → binary names sharing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameIndex {
    names: BTreeMap<String, Vec<String>>,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_classes(classes: &ClassIndex) -> Self {
        let mut index = Self::new();
        for class in classes.class_names() {
            index.insert(class);
        }
        index
    }

    /// Register a class under its short name. Anonymous classes are ignored.
    pub fn insert(&mut self, fqn: &str) {
        if is_anonymous(fqn) {
            return;
        }
        let candidates = self.names.entry(short_name(fqn)).or_default();
        if let Err(pos) = candidates.binary_search_by(|c| candidate_order(c, fqn)) {
            candidates.insert(pos, fqn.to_string());
        }
    }

    pub fn lookup(&self, short: &str) -> &[String] {
        self.names.get(short).map_or(&[], Vec::as_slice)
    }

    /// The preferred candidate for an ambiguous short name.
    pub fn first(&self, short: &str) -> Option<&str> {
        self.lookup(short).first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.names.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Fingerprints of archives already folded into the index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanLedger {
    entries: BTreeSet<Fingerprint>,
}

impl ScanLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.contains(fingerprint)
    }

    /// Record a scanned archive, forgetting older versions of the same path.
    pub fn record(&mut self, fingerprint: Fingerprint) {
        self.entries.retain(|fp| fp.path != fingerprint.path);
        self.entries.insert(fingerprint);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fingerprint> {
        self.entries.iter()
    }
}

impl FromIterator<Fingerprint> for ScanLedger {
    fn from_iter<I: IntoIterator<Item = Fingerprint>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Short names made visible by the buffer's imports.
///
/// Consulted before the global [`NameIndex`] so an imported class wins over
/// an unrelated class with a similar name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRegistry {
    names: BTreeMap<String, Vec<String>>,
}

impl ImportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve import paths (`android.widget.*`, `android.app.AlertDialog`)
    /// against the indexed classes.
    pub fn from_imports<I, S>(imports: I, classes: &ClassIndex) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for import in imports {
            let path = import.as_ref();
            let path = path.strip_suffix(".*").unwrap_or(path);
            if path.is_empty() {
                continue;
            }
            for class in classes.classes_under(path) {
                if !is_anonymous(class) {
                    registry.insert(short_name(class), class);
                }
            }
        }
        registry
    }

    pub fn insert(&mut self, short: impl Into<String>, fqn: impl Into<String>) {
        let fqn = fqn.into();
        let candidates = self.names.entry(short.into()).or_default();
        if let Err(pos) = candidates.binary_search_by(|c| candidate_order(c, &fqn)) {
            candidates.insert(pos, fqn);
        }
    }

    pub fn lookup(&self, short: &str) -> &[String] {
        self.names.get(short).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.names.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}
