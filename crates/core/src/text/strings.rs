//! Completions offered while the cursor is inside a string literal.

use super::quote::ContextKeyword;
use indexmap::IndexSet;
use luasense_api::{CompletionItem, CompletionKind};
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::Arc;
use xxhash_rust::xxh3::xxh3_64;

/// Buffers larger than this are not scanned for literals.
pub const MAX_SCAN_BYTES: usize = 50_000;

/// Longer literals are not offered back.
pub const MAX_LITERAL_CHARS: usize = 100;

const LITERAL_PREFIX_LIMIT: usize = 20;
const LITERAL_CONTAINS_LIMIT: usize = 10;

const BUILTIN_MODULES: &[&str] = &[
    "import",
    "lazyimport",
    "loadlayout",
    "loadbitmap",
    "loadmenu",
    "json",
    "xml",
    "lon",
    "hex",
    "http",
    "ftp",
    "smtp",
    "socket",
    "ltn12",
    "mime",
    "mbox",
    "Colors",
    "IconDrawable",
    "LuaRecyclerAdapter",
    "functional",
    "middleclass",
    "rx",
    "debugger",
    "console",
    "permission",
    "system",
    "options",
    "jpairs",
    "lsqlite3",
    "cjson",
    "md5",
    "crypt",
    "ffi",
    "lfs",
    "zip",
    "zlib",
    "android.widget.*",
    "android.view.*",
    "android.content.*",
    "android.graphics.*",
    "android.os.*",
    "android.app.*",
    "android.util.*",
    "android.net.*",
    "android.media.*",
    "android.animation.*",
    "androidx.appcompat.app.*",
    "androidx.recyclerview.widget.*",
    "androidx.fragment.app.*",
    "androidx.core.content.*",
    "java.io.*",
    "java.util.*",
    "java.lang.*",
    "java.net.*",
    "java.text.*",
    "android.widget.LinearLayout",
    "android.widget.TextView",
    "android.widget.Button",
    "android.widget.ImageView",
    "android.widget.EditText",
    "android.widget.ListView",
    "android.widget.Toast",
    "android.view.View",
    "android.view.ViewGroup",
    "android.graphics.Color",
    "android.graphics.Paint",
    "android.graphics.Bitmap",
    "android.content.Intent",
    "android.content.Context",
    "android.os.Handler",
    "android.os.Bundle",
    "android.util.Log",
    "android.app.Activity",
    "android.app.AlertDialog",
];

const FILE_ROOTS: &[&str] = &[
    "/sdcard/",
    "/sdcard/Download/",
    "/data/data/",
    "/storage/emulated/0/",
];

// One pass over both quote kinds, so a match consumes quotes of the other kind
static QUOTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)'"#).expect("valid literal regex")
});

struct LiteralCache {
    hash: u64,
    literals: Arc<BTreeSet<String>>,
}

/// Module paths, file roots and buffer literals matched against the text
/// typed inside a string.
pub struct StringCompleter {
    importable: RwLock<IndexSet<String>>,
    file_roots: Vec<String>,
    literals: Mutex<Option<LiteralCache>>,
}

impl Default for StringCompleter {
    fn default() -> Self {
        Self::new()
    }
}

impl StringCompleter {
    pub fn new() -> Self {
        Self {
            importable: RwLock::new(builtin_paths()),
            file_roots: FILE_ROOTS.iter().map(|s| s.to_string()).collect(),
            literals: Mutex::new(None),
        }
    }

    pub fn with_file_roots(mut self, roots: Vec<String>) -> Self {
        self.file_roots = roots;
        self
    }

    pub fn add_importable_paths<I, S>(&self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.importable.write().extend(paths.into_iter().map(Into::into));
    }

    /// Replace host-added paths, keeping the built-in modules.
    pub fn set_importable_paths<I, S>(&self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut importable = builtin_paths();
        importable.extend(paths.into_iter().map(Into::into));
        *self.importable.write() = importable;
    }

    pub fn reset_importable_paths(&self) {
        *self.importable.write() = builtin_paths();
    }

    /// Register script files as requirable modules (`util.lua` → `util`).
    pub fn add_lua_modules<I, S>(&self, files: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut importable = self.importable.write();
        for file in files {
            let file = file.as_ref();
            let module = file.strip_suffix(".lua").unwrap_or(file);
            if !module.is_empty() {
                importable.insert(module.to_string());
            }
        }
    }

    pub fn importable_paths(&self) -> Vec<String> {
        self.importable.read().iter().cloned().collect()
    }

    pub fn complete(
        &self,
        prefix: &str,
        keyword: Option<ContextKeyword>,
        content: Option<&str>,
    ) -> Vec<CompletionItem> {
        match keyword {
            Some(k) if k.takes_module() => self.module_items(prefix),
            Some(k) if k.takes_file() => self.file_items(prefix),
            _ => content
                .map(|content| self.literal_items(prefix, content))
                .unwrap_or_default(),
        }
    }

    fn module_items(&self, prefix: &str) -> Vec<CompletionItem> {
        let importable = self.importable.read();
        let (starts, contains) = split_matches(importable.iter(), prefix);

        starts
            .into_iter()
            .chain(contains)
            .map(|path| {
                let (description, kind) = module_kind(path);
                CompletionItem::new(path, kind, prefix.len()).with_description(description)
            })
            .collect()
    }

    fn file_items(&self, prefix: &str) -> Vec<CompletionItem> {
        let needle = prefix.to_lowercase();
        self.file_roots
            .iter()
            .filter(|root| root.to_lowercase().starts_with(&needle))
            .map(|root| {
                CompletionItem::new(root, CompletionKind::File, prefix.len())
                    .with_description("path")
            })
            .collect()
    }

    fn literal_items(&self, prefix: &str, content: &str) -> Vec<CompletionItem> {
        if content.len() > MAX_SCAN_BYTES {
            return Vec::new();
        }

        let literals = self.literals_of(content);
        let (starts, contains) = split_matches(literals.iter(), prefix);

        starts
            .into_iter()
            .take(LITERAL_PREFIX_LIMIT)
            .chain(contains.into_iter().take(LITERAL_CONTAINS_LIMIT))
            .map(|literal| {
                CompletionItem::new(literal, CompletionKind::Text, prefix.len())
                    .with_description("string")
            })
            .collect()
    }

    fn literals_of(&self, content: &str) -> Arc<BTreeSet<String>> {
        let hash = xxh3_64(content.as_bytes());
        let mut cache = self.literals.lock();
        if let Some(cached) = cache.as_ref().filter(|c| c.hash == hash) {
            return cached.literals.clone();
        }

        let literals = Arc::new(extract_literals(content));
        *cache = Some(LiteralCache {
            hash,
            literals: literals.clone(),
        });
        literals
    }
}

fn builtin_paths() -> IndexSet<String> {
    BUILTIN_MODULES.iter().map(|s| s.to_string()).collect()
}

/// Case-insensitive prefix matches and contains-only matches, each sorted.
/// An empty prefix matches everything as a prefix.
fn split_matches<'a, I>(candidates: I, prefix: &str) -> (Vec<&'a str>, Vec<&'a str>)
where
    I: Iterator<Item = &'a String>,
{
    let needle = prefix.to_lowercase();
    let mut starts = Vec::new();
    let mut contains = Vec::new();

    for candidate in candidates {
        let folded = candidate.to_lowercase();
        if folded.starts_with(&needle) {
            starts.push(candidate.as_str());
        } else if folded.contains(&needle) {
            contains.push(candidate.as_str());
        }
    }

    starts.sort_unstable();
    contains.sort_unstable();
    (starts, contains)
}

/// Non-empty quoted literals of at most [`MAX_LITERAL_CHARS`] characters.
pub fn extract_literals(content: &str) -> BTreeSet<String> {
    QUOTED
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty() && s.chars().count() <= MAX_LITERAL_CHARS)
        .map(str::to_string)
        .collect()
}

/// Description and kind for an importable path.
pub fn module_kind(path: &str) -> (&'static str, CompletionKind) {
    if path.ends_with(".*") {
        let label = if path.starts_with("android.") {
            "Android package"
        } else if path.starts_with("androidx.") {
            "AndroidX package"
        } else {
            "Java package"
        };
        return (label, CompletionKind::Module);
    }

    if path.contains('.') {
        const CLASS_LABELS: &[(&str, &str)] = &[
            ("android.widget.", "Android widget"),
            ("android.view.", "Android view"),
            ("android.graphics.", "Android graphics"),
            ("android.content.", "Android content"),
            ("android.os.", "Android system"),
            ("android.app.", "Android app"),
            ("android.util.", "Android utility"),
            ("android.", "Android class"),
            ("androidx.", "AndroidX class"),
        ];
        let label = CLASS_LABELS
            .iter()
            .find(|(package, _)| path.starts_with(package))
            .map_or("Java class", |(_, label)| label);
        return (label, CompletionKind::Class);
    }

    ("Lua module", CompletionKind::Module)
}
