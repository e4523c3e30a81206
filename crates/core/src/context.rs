//! Process-scoped completion context.
//!
//! One [`EditorContext`] is built at startup and shared by the typing path
//! and the scan service: it reads the committed snapshot from the shared
//! [`IndexStore`], owns the keyword and package tables, and routes each
//! cursor position to string or code completion.

use crate::complete::{
    AliasMap, CompletionEngine, CompletionRequest, IdentifierSet, SharedIdentifiers,
};
use crate::config::LuasenseConfig;
use crate::index::{ImportRegistry, IndexStore};
use crate::syntax::{BufferFacts, TokenKind, analyze_buffer, tokenize_lossy};
use crate::text::{
    ContextKeyword, Quote, StringCompleter, compute_prefix, detect_context_keyword,
    inside_string, string_prefix,
};
use luasense_api::CompletionItem;
use crate::logging::diagnostic;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

/// Where the cursor sits, with the text completion should extend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorContext<'a> {
    String {
        quote: Quote,
        prefix: &'a str,
        keyword: Option<ContextKeyword>,
    },
    Code {
        prefix: &'a str,
    },
}

pub struct EditorContext {
    store: Arc<IndexStore>,
    engine: CompletionEngine,
    strings: StringCompleter,
    default_aliases: RwLock<AliasMap>,
    identifiers: Arc<SharedIdentifiers>,
}

impl EditorContext {
    pub fn new(store: Arc<IndexStore>, config: &LuasenseConfig) -> Self {
        let identifiers = if config.completion.wait_for_identifiers {
            SharedIdentifiers::with_wait(config.completion.identifier_wait())
        } else {
            SharedIdentifiers::new()
        };
        Self {
            store,
            engine: CompletionEngine::from_config(config),
            strings: StringCompleter::new(),
            default_aliases: RwLock::new(AliasMap::from(config.aliases.clone())),
            identifiers: Arc::new(identifiers),
        }
    }

    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    pub fn engine(&self) -> &CompletionEngine {
        &self.engine
    }

    pub fn strings(&self) -> &StringCompleter {
        &self.strings
    }

    pub fn identifiers(&self) -> &Arc<SharedIdentifiers> {
        &self.identifiers
    }

    /// Set a contextual alias applied to every request.
    pub fn set_alias(&self, alias: impl Into<String>, target: impl Into<String>) {
        self.default_aliases.write().insert(alias, target);
    }

    pub fn default_aliases(&self) -> AliasMap {
        self.default_aliases.read().clone()
    }

    /// Classify the cursor position.
    pub fn classify<'a>(&self, line: &'a str, column: usize) -> CursorContext<'a> {
        if let Some(quote) = inside_string(line, column) {
            return CursorContext::String {
                quote,
                prefix: string_prefix(line, column).unwrap_or_default(),
                keyword: detect_context_keyword(line, column),
            };
        }
        CursorContext::Code {
            prefix: compute_prefix(line, column),
        }
    }

    /// Candidates for the cursor at byte `column` of `line`. `buffer` is the
    /// whole document when available; it seeds identifiers, imports and
    /// aliases, and supplies literals inside strings.
    pub fn complete(&self, line: &str, column: usize, buffer: Option<&str>) -> Vec<CompletionItem> {
        match self.classify(line, column) {
            CursorContext::String {
                prefix, keyword, ..
            } => self.strings.complete(prefix, keyword, buffer),
            CursorContext::Code { prefix } => {
                let facts = buffer.map(analyze_buffer);
                self.complete_code(prefix, facts.as_ref())
            }
        }
    }

    /// Code completion for an already extracted prefix.
    ///
    /// With buffer facts, identifiers come from the analysis; without them,
    /// from the shared registry.
    pub fn complete_code(&self, prefix: &str, facts: Option<&BufferFacts>) -> Vec<CompletionItem> {
        let snapshot = self.store.snapshot();

        let Some(facts) = facts else {
            let aliases = self.default_aliases();
            let request = CompletionRequest::new(prefix, &snapshot)
                .with_identifiers(self.identifiers.as_ref())
                .with_aliases(&aliases);
            return self.engine.complete(&request);
        };

        let identifiers = IdentifierSet::from_names(facts.identifiers.iter().cloned());
        let imports = ImportRegistry::from_imports(&facts.imports, &snapshot.classes);
        let aliases = AliasMap::from(facts.assignments.clone()).merged_over(&self.default_aliases());

        let request = CompletionRequest::new(prefix, &snapshot)
            .with_identifiers(&identifiers)
            .with_imports(&imports)
            .with_aliases(&aliases);
        self.engine.complete(&request)
    }

    /// Register every name of a freshly opened buffer.
    pub fn load_buffer(&self, text: &str) {
        self.identifiers.increase_all(names_in(text));
    }

    /// Update the shared identifier registry for an edit of `buffer` that
    /// replaces the byte range `range` with `inserted`.
    ///
    /// The affected lines are re-tokenized before and after the edit, so
    /// typing inside or next to a name swaps the whole name.
    pub fn apply_edit(&self, buffer: &str, range: Range<usize>, inserted: &str) {
        if range.start > range.end
            || range.end > buffer.len()
            || !buffer.is_char_boundary(range.start)
            || !buffer.is_char_boundary(range.end)
        {
            diagnostic("apply-edit", &format!("invalid range {range:?}"));
            return;
        }

        let line_start = buffer[..range.start].rfind('\n').map_or(0, |i| i + 1);
        let line_end = buffer[range.end..]
            .find('\n')
            .map_or(buffer.len(), |i| range.end + i);

        let before = &buffer[line_start..line_end];
        let after = format!(
            "{}{}{}",
            &buffer[line_start..range.start],
            inserted,
            &buffer[range.end..line_end]
        );

        let mut delta: HashMap<&str, isize> = HashMap::new();
        for name in names_in(before) {
            *delta.entry(name).or_default() -= 1;
        }
        for name in names_in(&after) {
            *delta.entry(name).or_default() += 1;
        }

        for (name, change) in delta {
            for _ in change..0 {
                self.identifiers.decrease(name);
            }
            for _ in 0..change {
                self.identifiers.increase(name);
            }
        }
    }
}

fn names_in(text: &str) -> Vec<&str> {
    let (tokens, _) = tokenize_lossy(text);
    tokens
        .into_iter()
        .filter(|t| t.kind == TokenKind::Name)
        .map(|t| t.text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{ClassIndex, IndexSnapshot, ScanLedger};
    use luasense_api::{CompletionEntry, CompletionKind};
    use luasense_plugin::ClassMembers;

    fn context() -> EditorContext {
        let mut classes = ClassIndex::new();
        let mut builder = ClassMembers::new("android.app.AlertDialog$Builder");
        builder.insert(CompletionEntry::method(
            "setTitle",
            "android.app.AlertDialog$Builder",
            "java.lang.CharSequence",
        ));
        classes.insert_members(builder);
        classes.insert_members(ClassMembers::new("android.app.AlertDialog"));
        classes.insert_members(ClassMembers::new("android.widget.Button"));

        let store = Arc::new(IndexStore::new(IndexSnapshot::new(classes, ScanLedger::new())));
        EditorContext::new(store, &LuasenseConfig::default())
    }

    #[test]
    fn test_classify() {
        let ctx = context();
        let line = r#"local m = require("str"#;
        assert_eq!(
            ctx.classify(line, line.len()),
            CursorContext::String {
                quote: Quote::Double,
                prefix: "str",
                keyword: Some(ContextKeyword::Require),
            }
        );

        let line = "x = foo.bar(1).ba";
        assert_eq!(
            ctx.classify(line, line.len()),
            CursorContext::Code {
                prefix: "foo.bar(1).ba"
            }
        );
    }

    #[test]
    fn test_buffer_assignments_drive_members() {
        let ctx = context();
        let buffer = "import 'android.app.*'\nlocal b = AlertDialog.Builder(this)\nb.se";
        let line = "b.se";

        let items = ctx.complete(line, line.len(), Some(buffer));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "setTitle(CharSequence)");
        assert_eq!(items[0].insert_text, "setTitle");
    }

    #[test]
    fn test_buffer_imports_take_priority() {
        let ctx = context();
        let buffer = "import 'android.app.*'\nAle";
        let items = ctx.complete("Ale", 3, Some(buffer));
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["AlertDialog", "AlertDialog.Builder"]);
        assert!(items.iter().all(|i| i.kind == CompletionKind::Class));
    }

    #[test]
    fn test_shared_identifiers_without_buffer() {
        let ctx = context();
        let buffer = "local counter = counter + 1";
        ctx.load_buffer(buffer);

        let items = ctx.complete("cou", 3, None);
        assert_eq!(items[0].label, "counter");
        assert_eq!(items[0].kind, CompletionKind::Identifier);

        // delete the whole line
        ctx.apply_edit(buffer, 0..buffer.len(), "");
        assert!(ctx.complete("cou", 3, None).is_empty());
    }

    #[test]
    fn test_edit_inside_name_replaces_it() {
        let ctx = context();
        ctx.apply_edit("", 0..0, "counter");
        ctx.apply_edit("counter", 7..7, "s");

        let labels: Vec<String> = ctx
            .complete("cou", 3, None)
            .into_iter()
            .map(|i| i.label)
            .collect();
        assert_eq!(labels, vec!["counters"]);
        assert_eq!(ctx.identifiers().count("counter"), 0);
        assert_eq!(ctx.identifiers().count("s"), 0);

        // split the name in the middle, on the second line of the buffer
        let buffer = "x = 1\ncounters\n";
        ctx.apply_edit(buffer, 9..9, " = ");
        assert_eq!(ctx.identifiers().count("counters"), 0);
        assert_eq!(ctx.identifiers().count("cou"), 1);
        assert_eq!(ctx.identifiers().count("nters"), 1);
    }

    #[test]
    fn test_edit_with_invalid_range_is_ignored() {
        let ctx = context();
        ctx.load_buffer("alpha");
        ctx.apply_edit("alpha", 3..9, "");
        assert_eq!(ctx.identifiers().count("alpha"), 1);
    }

    #[test]
    fn test_wildcard_import_leaves_subpackages_to_class_names() {
        let mut classes = ClassIndex::new();
        classes.insert_members(ClassMembers::new("java.util.List"));
        classes.insert_members(ClassMembers::new("java.util.concurrent.ConcurrentHashMap"));
        let store = Arc::new(IndexStore::new(IndexSnapshot::new(classes, ScanLedger::new())));
        let ctx = EditorContext::new(store, &LuasenseConfig::default());

        let buffer = "import 'java.util.*'\nCon";
        let classes: Vec<CompletionItem> = ctx
            .complete("Con", 3, Some(buffer))
            .into_iter()
            .filter(|i| i.kind == CompletionKind::Class)
            .collect();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].label, "ConcurrentHashMap");
        assert_eq!(classes[0].description, "java.util.concurrent.ConcurrentHashMap");

        let items = ctx.complete("Li", 2, Some("import 'java.util.*'\nLi"));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "List");
    }

    #[test]
    fn test_default_alias() {
        let ctx = context();
        ctx.set_alias("dlg", "android.app.AlertDialog$Builder");
        let items = ctx.complete("dlg.", 4, None);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].replace_len, 0);
    }
}
