//! Registries of identifiers visible in the current buffer.
//!
//! [`IdentifierSet`] is built once from a finished analysis and then only
//! read. [`SharedIdentifiers`] is updated by buffer-change events while
//! completion requests read it; reads never wait longer than the configured
//! bound and report nothing when the lock is busy.

use super::matcher::Matcher;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Read side shared by both registries.
pub trait IdentifierSource: Send + Sync {
    /// Identifiers starting with `prefix`, exact matches included.
    fn matching(&self, matcher: &Matcher, prefix: &str) -> Vec<String>;
}

/// Build phase of an [`IdentifierSet`]; duplicates are dropped on insert.
#[derive(Debug, Default)]
pub struct IdentifierSetBuilder {
    seen: HashSet<String>,
    names: Vec<String>,
}

impl IdentifierSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        if !name.is_empty() && self.seen.insert(name.clone()) {
            self.names.push(name);
        }
        self
    }

    pub fn extend<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.add(name);
        }
        self
    }

    pub fn build(self) -> IdentifierSet {
        IdentifierSet { names: self.names }
    }
}

/// Read-only identifier list in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierSet {
    names: Vec<String>,
}

impl IdentifierSet {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut builder = IdentifierSetBuilder::new();
        builder.extend(names);
        builder.build()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl IdentifierSource for IdentifierSet {
    fn matching(&self, matcher: &Matcher, prefix: &str) -> Vec<String> {
        self.names
            .iter()
            .filter(|name| matcher.starts_with(name, prefix))
            .cloned()
            .collect()
    }
}

/// Reference-counted identifier multiset shared between writers and
/// completion requests.
#[derive(Debug, Default)]
pub struct SharedIdentifiers {
    counts: Mutex<HashMap<String, usize>>,
    wait: Option<Duration>,
}

impl SharedIdentifiers {
    /// Reads try the lock once and give up immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads wait up to `wait` for the lock.
    pub fn with_wait(wait: Duration) -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
            wait: Some(wait),
        }
    }

    pub fn increase(&self, name: &str) {
        if name.is_empty() {
            return;
        }
        let mut counts = self.counts.lock();
        *counts.entry(name.to_string()).or_insert(0) += 1;
    }

    pub fn increase_all<'a>(&self, names: impl IntoIterator<Item = &'a str>) {
        let mut counts = self.counts.lock();
        for name in names.into_iter().filter(|n| !n.is_empty()) {
            *counts.entry(name.to_string()).or_insert(0) += 1;
        }
    }

    /// Drop one reference; the name disappears when none are left.
    pub fn decrease(&self, name: &str) {
        let mut counts = self.counts.lock();
        if let Some(count) = counts.get_mut(name) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                counts.remove(name);
            }
        }
    }

    pub fn clear(&self) {
        self.counts.lock().clear();
    }

    pub fn count(&self, name: &str) -> usize {
        self.counts.lock().get(name).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.lock().is_empty()
    }

    /// Matching names, sorted. `wait` overrides the registry's own bound;
    /// `None` means a single non-blocking attempt.
    pub fn matching_within(
        &self,
        matcher: &Matcher,
        prefix: &str,
        wait: Option<Duration>,
    ) -> Vec<String> {
        let guard = match wait {
            Some(timeout) => self.counts.try_lock_for(timeout),
            None => self.counts.try_lock(),
        };
        let Some(counts) = guard else {
            tracing::trace!("Identifier registry busy, skipping");
            return Vec::new();
        };

        let mut names: Vec<String> = counts
            .keys()
            .filter(|name| matcher.starts_with(name, prefix))
            .cloned()
            .collect();
        drop(counts);
        names.sort_unstable();
        names
    }
}

impl IdentifierSource for SharedIdentifiers {
    fn matching(&self, matcher: &Matcher, prefix: &str) -> Vec<String> {
        self.matching_within(matcher, prefix, self.wait)
    }
}
