//! Candidate collection for code (non-string) prefixes.
//!
//! Sources are consulted in a fixed order: keywords, buffer identifiers,
//! imported classes (which suppress the global class list), indexed class
//! names, package functions, then members of the resolved receiver with a
//! one-level fallback to the receiver's parent. Each source deduplicates
//! its own names; the configured ranking orders the merged list.

use super::identifiers::IdentifierSource;
use super::keywords::KeywordTable;
use super::matcher::Matcher;
use super::packages::PackageTable;
use super::ranking::RankingStrategy;
use super::render::MemberRenderer;
use super::resolve::{AliasMap, Resolution, Resolver};
use crate::config::{CompletionConfig, LuasenseConfig};
use crate::index::{ImportRegistry, IndexSnapshot};
use crate::logging::diagnostic;
use crate::syntax::{Chain, LexError};
use luasense_api::{CompletionItem, CompletionKind};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use std::collections::HashSet;

static NUMBERED_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\d+$").expect("valid numbered class pattern"));

static NO_IMPORTS: Lazy<ImportRegistry> = Lazy::new(ImportRegistry::new);
static NO_ALIASES: Lazy<AliasMap> = Lazy::new(AliasMap::new);

/// Everything one completion call reads besides the engine's own tables.
#[derive(Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub prefix: &'a str,
    pub identifiers: Option<&'a dyn IdentifierSource>,
    pub snapshot: &'a IndexSnapshot,
    pub imports: &'a ImportRegistry,
    pub aliases: &'a AliasMap,
}

impl<'a> CompletionRequest<'a> {
    pub fn new(prefix: &'a str, snapshot: &'a IndexSnapshot) -> Self {
        Self {
            prefix,
            identifiers: None,
            snapshot,
            imports: &NO_IMPORTS,
            aliases: &NO_ALIASES,
        }
    }

    pub fn with_identifiers(mut self, identifiers: &'a dyn IdentifierSource) -> Self {
        self.identifiers = Some(identifiers);
        self
    }

    pub fn with_imports(mut self, imports: &'a ImportRegistry) -> Self {
        self.imports = imports;
        self
    }

    pub fn with_aliases(mut self, aliases: &'a AliasMap) -> Self {
        self.aliases = aliases;
        self
    }
}

pub struct CompletionEngine {
    keywords: RwLock<KeywordTable>,
    packages: RwLock<PackageTable>,
    renderer: MemberRenderer,
    matcher: Matcher,
    ranking: RankingStrategy,
    synthetic_marker: char,
}

impl Default for CompletionEngine {
    fn default() -> Self {
        Self::new(&CompletionConfig::default())
    }
}

impl CompletionEngine {
    pub fn new(config: &CompletionConfig) -> Self {
        let matcher = Matcher::new(config.case_sensitive);
        Self {
            keywords: RwLock::new(KeywordTable::lua_default(matcher)),
            packages: RwLock::new(PackageTable::lua_standard()),
            renderer: MemberRenderer::new(config.full_parameter_types),
            matcher,
            ranking: config.ranking,
            synthetic_marker: config.synthetic_marker,
        }
    }

    /// Engine with the configured extra keywords and package tables.
    pub fn from_config(config: &LuasenseConfig) -> Self {
        let engine = Self::new(&config.completion);
        for keyword in &config.keywords {
            engine.add_keyword(keyword);
        }
        for (package, functions) in &config.packages {
            engine.add_package(package.clone(), functions.clone());
        }
        engine
    }

    pub fn add_keyword(&self, keyword: &str) -> bool {
        self.keywords.write().add_keyword(keyword)
    }

    pub fn add_package(&self, package: impl Into<String>, functions: Vec<String>) {
        self.packages.write().insert(package, functions);
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn ranking(&self) -> RankingStrategy {
        self.ranking
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.read().contains(word)
    }

    /// Ranked candidates for `request.prefix`; empty for an empty prefix.
    pub fn complete(&self, request: &CompletionRequest<'_>) -> Vec<CompletionItem> {
        let prefix = request.prefix;
        if prefix.is_empty() {
            return Vec::new();
        }

        let mut items = Vec::new();
        {
            let keywords = self.keywords.read();
            items.extend(self.keyword_items(&keywords, prefix));
            items.extend(self.identifier_items(&keywords, request));
        }

        let imported = self.import_items(request);
        if imported.is_empty() {
            items.extend(self.class_items(request));
        } else {
            items.extend(imported);
        }

        items.extend(self.package_items(prefix));

        match self.member_items(request) {
            Ok(members) => items.extend(members),
            Err(e) => diagnostic("complete", &format!("{prefix:?}: {e}")),
        }

        self.ranking.sort(&mut items);
        items
    }

    fn is_synthetic(&self, name: &str) -> bool {
        name.chars().filter(|&c| c == self.synthetic_marker).count() >= 2
    }

    fn keyword_items(&self, keywords: &KeywordTable, prefix: &str) -> Vec<CompletionItem> {
        keywords
            .iter()
            .filter(|(keyword, _)| {
                self.matcher.starts_with(keyword, prefix) && !self.is_synthetic(keyword)
            })
            .map(|(keyword, info)| {
                CompletionItem::new(keyword, info.kind, prefix.len())
                    .with_description(info.description.clone())
            })
            .collect()
    }

    fn identifier_items(
        &self,
        keywords: &KeywordTable,
        request: &CompletionRequest<'_>,
    ) -> Vec<CompletionItem> {
        let Some(source) = request.identifiers else {
            return Vec::new();
        };
        let prefix = request.prefix;
        let folded_prefix = prefix.to_lowercase();
        let mut seen = HashSet::new();

        source
            .matching(&self.matcher, prefix)
            .into_iter()
            .filter(|name| name.to_lowercase() != folded_prefix)
            .filter(|name| !keywords.contains(name) && !self.is_synthetic(name))
            .filter(|name| seen.insert(name.clone()))
            .map(|name| {
                CompletionItem::new(name, CompletionKind::Identifier, prefix.len())
                    .with_description("Identifier")
            })
            .collect()
    }

    fn import_items(&self, request: &CompletionRequest<'_>) -> Vec<CompletionItem> {
        let prefix = request.prefix;
        request
            .imports
            .iter()
            .filter(|(short, _)| self.matcher.starts_with(short, prefix) && !self.is_synthetic(short))
            .map(|(short, candidates)| {
                let item = CompletionItem::new(short, CompletionKind::Class, prefix.len());
                match candidates.first() {
                    Some(fqn) => item.with_description(fqn.clone()),
                    None => item,
                }
            })
            .collect()
    }

    fn class_items(&self, request: &CompletionRequest<'_>) -> Vec<CompletionItem> {
        let prefix = request.prefix;
        request
            .snapshot
            .names
            .iter()
            .filter(|(short, _)| {
                self.matcher.starts_with(short, prefix)
                    && !NUMBERED_CLASS.is_match(short)
                    && !self.is_synthetic(short)
            })
            .filter_map(|(short, candidates)| {
                let fqn = candidates.first()?;
                Some(
                    CompletionItem::new(short, CompletionKind::Class, prefix.len())
                        .with_description(fqn.clone()),
                )
            })
            .collect()
    }

    /// `pkg.fu` → functions of `pkg` starting with `fu`, or containing it
    /// when nothing starts with it.
    fn package_items(&self, prefix: &str) -> Vec<CompletionItem> {
        let Some((package, partial)) = prefix.rsplit_once('.') else {
            return Vec::new();
        };
        let packages = self.packages.read();
        let Some(functions) = packages.lookup(&self.matcher, package) else {
            return Vec::new();
        };

        let mut matched: Vec<&String> = functions
            .iter()
            .filter(|f| self.matcher.starts_with(f, partial))
            .collect();
        if matched.is_empty() && !partial.is_empty() {
            let needle = self.matcher.fold(partial);
            matched = functions
                .iter()
                .filter(|f| self.matcher.fold(f).contains(&needle))
                .collect();
        }

        let mut seen = HashSet::new();
        matched
            .into_iter()
            .filter(|f| !self.is_synthetic(f) && seen.insert(f.as_str()))
            .map(|function| {
                let qualified = format!("{package}.{function}");
                CompletionItem::new(function.as_str(), CompletionKind::Function, prefix.len())
                    .with_description(format!("Package function: {qualified}"))
                    .with_insert_text(qualified)
            })
            .collect()
    }

    /// Members of the receiver before the last `.`; when the receiver does
    /// not resolve, members of its parent.
    fn member_items(&self, request: &CompletionRequest<'_>) -> Result<Vec<CompletionItem>, LexError> {
        if !request.prefix.contains('.') {
            return Ok(Vec::new());
        }
        let chain = Chain::parse(request.prefix)?;
        let Some((receiver, partial)) = chain.split_member() else {
            return Ok(Vec::new());
        };

        let resolver = Resolver::new(request.snapshot, request.aliases);
        let class = match resolver.resolve(&receiver) {
            Resolution::Resolved(class) => class,
            Resolution::Void => return Ok(Vec::new()),
            Resolution::Unresolved if receiver.len() > 1 => {
                match resolver.resolve(&receiver.parent()) {
                    Resolution::Resolved(class) => class,
                    _ => return Ok(Vec::new()),
                }
            }
            Resolution::Unresolved => return Ok(Vec::new()),
        };

        Ok(self.members_of(request.snapshot, &class, partial))
    }

    fn members_of(&self, snapshot: &IndexSnapshot, class: &str, partial: &str) -> Vec<CompletionItem> {
        let Some(members) = snapshot.classes.members(class) else {
            return Vec::new();
        };
        members
            .iter()
            .filter(|(name, _)| self.matcher.starts_with(name, partial) && !self.is_synthetic(name))
            .map(|(name, entry)| {
                CompletionItem::new(self.renderer.label(entry), entry.kind(), partial.len())
                    .with_insert_text(name.clone())
                    .with_description(entry.description())
            })
            .collect()
    }
}
