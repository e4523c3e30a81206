//! Best-effort static typing of access chains.
//!
//! The head of a chain is the longest dotted prefix that names an alias, a
//! short class name or a binary class name. Every following segment is
//! looked up as a member of the type resolved so far.

use crate::index::{ClassIndex, IndexSnapshot, NameIndex};
use crate::syntax::{Access, Chain};
use std::collections::{BTreeMap, HashSet};

/// Alias expansion stops past this depth.
pub const MAX_ALIAS_DEPTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Binary name of the resolved class, or a primitive type name
    Resolved(String),
    /// Some segment of the chain returns nothing
    Void,
    Unresolved,
}

impl Resolution {
    pub fn class(&self) -> Option<&str> {
        match self {
            Resolution::Resolved(name) => Some(name),
            _ => None,
        }
    }
}

/// Contextual names: either a binary class name or an expression whose type
/// is resolved on demand (`dialog` → `AlertDialog.Builder(ctx).create()`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasMap {
    aliases: BTreeMap<String, String>,
}

impl AliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        self.aliases.insert(alias.into(), target.into());
    }

    pub fn get(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    /// These aliases over `defaults`; an alias present in both keeps this
    /// map's target.
    pub fn merged_over(&self, defaults: &AliasMap) -> AliasMap {
        let mut merged = defaults.clone();
        merged
            .aliases
            .extend(self.aliases.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<BTreeMap<String, String>> for AliasMap {
    fn from(aliases: BTreeMap<String, String>) -> Self {
        Self { aliases }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AliasMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            aliases: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

pub struct Resolver<'a> {
    classes: &'a ClassIndex,
    names: &'a NameIndex,
    aliases: &'a AliasMap,
}

impl<'a> Resolver<'a> {
    pub fn new(snapshot: &'a IndexSnapshot, aliases: &'a AliasMap) -> Self {
        Self {
            classes: &snapshot.classes,
            names: &snapshot.names,
            aliases,
        }
    }

    pub fn resolve(&self, chain: &Chain) -> Resolution {
        let mut visited = HashSet::new();
        self.resolve_chain(chain, 0, &mut visited)
    }

    fn resolve_chain<'c>(
        &self,
        chain: &'c Chain,
        depth: usize,
        visited: &mut HashSet<&'a str>,
    ) -> Resolution {
        let Some((head, consumed)) = self.resolve_head(chain, depth, visited) else {
            return Resolution::Unresolved;
        };
        let mut current = match head {
            Resolution::Resolved(class) => class,
            other => return other,
        };

        for segment in &chain.segments[consumed..] {
            let Some(member) = self.classes.member(&current, &segment.name) else {
                return Resolution::Unresolved;
            };
            if member.is_void() {
                return Resolution::Void;
            }
            if segment.access == Access::Index {
                return Resolution::Unresolved;
            }
            current = member.type_name().to_string();
        }

        Resolution::Resolved(current)
    }

    /// Type of the longest resolvable head and the number of segments it
    /// covers.
    fn resolve_head(
        &self,
        chain: &Chain,
        depth: usize,
        visited: &mut HashSet<&'a str>,
    ) -> Option<(Resolution, usize)> {
        // a head may only end in a call or index on its last segment
        let plain_run = chain
            .segments
            .iter()
            .position(|s| !s.is_plain())
            .map_or(chain.len(), |i| i + 1);

        for len in (1..=plain_run).rev() {
            let key = chain.segments[..len]
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(".");
            let access = chain.segments[len - 1].access;

            if let Some((alias, target)) = self.aliases.aliases.get_key_value(key.as_str()) {
                let resolution = match access {
                    Access::Plain => self.resolve_alias(alias, target, depth, visited),
                    _ => Resolution::Unresolved,
                };
                return Some((resolution, len));
            }

            let class = self
                .names
                .first(&key)
                .or_else(|| self.classes.contains(&key).then_some(key.as_str()));
            if let Some(class) = class {
                // `Widget(...)` constructs a Widget
                let resolution = match access {
                    Access::Index => Resolution::Unresolved,
                    _ => Resolution::Resolved(class.to_string()),
                };
                return Some((resolution, len));
            }
        }

        None
    }

    fn resolve_alias(
        &self,
        alias: &'a str,
        target: &'a str,
        depth: usize,
        visited: &mut HashSet<&'a str>,
    ) -> Resolution {
        if self.classes.contains(target) {
            return Resolution::Resolved(target.to_string());
        }
        if depth >= MAX_ALIAS_DEPTH || !visited.insert(alias) {
            tracing::debug!("Alias cycle or depth limit at {}", alias);
            return Resolution::Unresolved;
        }

        let resolution = match Chain::parse(target) {
            Ok(chain) if !chain.is_empty() && !chain.trailing_dot => {
                self.resolve_chain(&chain, depth + 1, visited)
            }
            _ => Resolution::Unresolved,
        };
        visited.remove(alias);
        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{ClassIndex, ScanLedger};
    use luasense_api::CompletionEntry;
    use luasense_api::models::entry::VOID;
    use luasense_plugin::ClassMembers;

    fn class(name: &str, members: Vec<CompletionEntry>) -> ClassMembers {
        let mut reflected = ClassMembers::new(name);
        for member in members {
            reflected.insert(member);
        }
        reflected
    }

    fn snapshot() -> IndexSnapshot {
        let mut classes = ClassIndex::new();
        classes.insert_members(class(
            "android.app.AlertDialog$Builder",
            vec![
                CompletionEntry::method("setTitle", "android.app.AlertDialog$Builder", "java.lang.CharSequence"),
                CompletionEntry::method("create", "android.app.AlertDialog", ""),
            ],
        ));
        classes.insert_members(class(
            "android.app.AlertDialog",
            vec![CompletionEntry::method("show", VOID, "")],
        ));
        classes.insert_members(class(
            "java.lang.String",
            vec![
                CompletionEntry::method("valueOf", "java.lang.String", "int"),
                CompletionEntry::method("length", "int", ""),
            ],
        ));
        classes.insert_members(class(
            "com.app.Host",
            vec![CompletionEntry::field("items", "java.lang.String")],
        ));
        IndexSnapshot::new(classes, ScanLedger::new())
    }

    fn resolve(snapshot: &IndexSnapshot, aliases: &AliasMap, text: &str) -> Resolution {
        Resolver::new(snapshot, aliases).resolve(&Chain::parse(text).unwrap())
    }

    #[test]
    fn test_longest_prefix_head() {
        let snap = snapshot();
        let aliases = AliasMap::new();
        assert_eq!(
            resolve(&snap, &aliases, "AlertDialog.Builder(ctx).setTitle('x')"),
            Resolution::Resolved("android.app.AlertDialog$Builder".to_string())
        );
        assert_eq!(
            resolve(&snap, &aliases, "java.lang.String.valueOf(1)"),
            Resolution::Resolved("java.lang.String".to_string())
        );
        assert_eq!(
            resolve(&snap, &aliases, "String.valueOf(1).length()"),
            Resolution::Resolved("int".to_string())
        );
    }

    #[test]
    fn test_void_and_unknown_segments() {
        let snap = snapshot();
        let aliases = AliasMap::new();
        assert_eq!(
            resolve(&snap, &aliases, "AlertDialog.Builder(ctx).create().show()"),
            Resolution::Void
        );
        assert_eq!(resolve(&snap, &aliases, "String.missing"), Resolution::Unresolved);
        assert_eq!(resolve(&snap, &aliases, "nothing.at.all"), Resolution::Unresolved);
        assert_eq!(resolve(&snap, &aliases, "host.items[1]"), Resolution::Unresolved);
    }

    #[test]
    fn test_alias_targets() {
        let snap = snapshot();
        let aliases: AliasMap = [
            ("host", "com.app.Host"),
            ("dialog", "AlertDialog.Builder(this).create()"),
            ("label", "host.items"),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            resolve(&snap, &aliases, "dialog"),
            Resolution::Resolved("android.app.AlertDialog".to_string())
        );
        assert_eq!(
            resolve(&snap, &aliases, "label.length()"),
            Resolution::Resolved("int".to_string())
        );
        assert_eq!(resolve(&snap, &aliases, "host()"), Resolution::Unresolved);
    }

    #[test]
    fn test_alias_cycles_terminate() {
        let snap = snapshot();
        let aliases: AliasMap = [("a", "b.x"), ("b", "a.y"), ("c", "c")]
            .into_iter()
            .collect();
        assert_eq!(resolve(&snap, &aliases, "a"), Resolution::Unresolved);
        assert_eq!(resolve(&snap, &aliases, "c.length"), Resolution::Unresolved);
    }

    #[test]
    fn test_merge_prefers_request_aliases() {
        let defaults: AliasMap = [("this", "com.app.Host"), ("ctx", "android.content.Context")]
            .into_iter()
            .collect();
        let request: AliasMap = [("this", "java.lang.String")].into_iter().collect();
        let merged = request.merged_over(&defaults);
        assert_eq!(merged.get("this"), Some("java.lang.String"));
        assert_eq!(merged.get("ctx"), Some("android.content.Context"));
    }
}
