use super::matcher::Matcher;
use indexmap::IndexMap;
use luasense_api::CompletionKind;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordInfo {
    pub kind: CompletionKind,
    pub description: String,
}

const DEFAULT_KEYWORDS: &[(&str, CompletionKind, &str)] = &[
    ("and", CompletionKind::Operator, "logical and"),
    ("break", CompletionKind::Keyword, "leave the loop"),
    ("case", CompletionKind::Keyword, "switch branch"),
    ("continue", CompletionKind::Keyword, "next iteration"),
    ("default", CompletionKind::Keyword, "default branch"),
    ("do", CompletionKind::Keyword, "block start"),
    ("else", CompletionKind::Keyword, "otherwise"),
    ("elseif", CompletionKind::Keyword, "otherwise if"),
    ("end", CompletionKind::Keyword, "block end"),
    ("false", CompletionKind::Constant, "boolean false"),
    ("for", CompletionKind::Keyword, "loop"),
    ("function", CompletionKind::Function, "function definition"),
    ("goto", CompletionKind::Keyword, "jump to label"),
    ("if", CompletionKind::Keyword, "condition"),
    ("in", CompletionKind::Operator, "iteration"),
    ("local", CompletionKind::Keyword, "local variable"),
    ("nil", CompletionKind::Constant, "no value"),
    ("not", CompletionKind::Operator, "logical not"),
    ("or", CompletionKind::Operator, "logical or"),
    ("repeat", CompletionKind::Keyword, "repeat loop"),
    ("return", CompletionKind::Keyword, "return values"),
    ("switch", CompletionKind::Keyword, "branch selection"),
    ("then", CompletionKind::Keyword, "condition body"),
    ("true", CompletionKind::Constant, "boolean true"),
    ("until", CompletionKind::Keyword, "loop end condition"),
    ("while", CompletionKind::Keyword, "conditional loop"),
    ("when", CompletionKind::Keyword, "conditional trigger"),
    ("lambda", CompletionKind::Function, "anonymous function"),
    ("print", CompletionKind::Function, "print output"),
    ("require", CompletionKind::Function, "load a module"),
    ("import", CompletionKind::Function, "import a class"),
    ("async", CompletionKind::Keyword, "asynchronous function"),
    ("await", CompletionKind::Keyword, "wait for a result"),
    ("class", CompletionKind::Class, "class definition"),
    ("extends", CompletionKind::Keyword, "inherit from a class"),
    ("implements", CompletionKind::Keyword, "implement an interface"),
    ("interface", CompletionKind::Interface, "interface definition"),
    ("new", CompletionKind::Constructor, "create an instance"),
    ("private", CompletionKind::Keyword, "private member"),
    ("protected", CompletionKind::Keyword, "protected member"),
    ("public", CompletionKind::Keyword, "public member"),
    ("static", CompletionKind::Keyword, "static member"),
    ("super", CompletionKind::Keyword, "parent class"),
];

/// Keywords in declaration order, with a folded set for membership tests.
#[derive(Debug, Clone)]
pub struct KeywordTable {
    entries: IndexMap<String, KeywordInfo>,
    folded: HashSet<String>,
    matcher: Matcher,
}

impl KeywordTable {
    pub fn new(matcher: Matcher) -> Self {
        Self {
            entries: IndexMap::new(),
            folded: HashSet::new(),
            matcher,
        }
    }

    /// Lua keywords plus the host's extensions.
    pub fn lua_default(matcher: Matcher) -> Self {
        let mut table = Self::new(matcher);
        for (keyword, kind, description) in DEFAULT_KEYWORDS {
            table.insert(*keyword, *kind, *description);
        }
        table
    }

    pub fn insert(
        &mut self,
        keyword: impl Into<String>,
        kind: CompletionKind,
        description: impl Into<String>,
    ) {
        let keyword = keyword.into();
        self.folded.insert(self.matcher.fold(&keyword));
        self.entries.insert(
            keyword,
            KeywordInfo {
                kind,
                description: description.into(),
            },
        );
    }

    /// Append a plain keyword. Returns false if it was already present.
    pub fn add_keyword(&mut self, keyword: &str) -> bool {
        if keyword.is_empty() || self.entries.contains_key(keyword) {
            return false;
        }
        self.insert(keyword, CompletionKind::Keyword, "keyword");
        true
    }

    /// Membership under the table's comparison rule.
    pub fn contains(&self, word: &str) -> bool {
        self.folded.contains(&self.matcher.fold(word))
    }

    pub fn get(&self, keyword: &str) -> Option<&KeywordInfo> {
        self.entries.get(keyword)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &KeywordInfo)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_kinds() {
        let table = KeywordTable::lua_default(Matcher::default());
        assert_eq!(table.get("and").unwrap().kind, CompletionKind::Operator);
        assert_eq!(table.get("nil").unwrap().kind, CompletionKind::Constant);
        assert_eq!(table.get("new").unwrap().kind, CompletionKind::Constructor);
        assert_eq!(table.get("interface").unwrap().kind, CompletionKind::Interface);
        assert_eq!(table.iter().next().map(|(k, _)| k), Some("and"));
    }

    #[test]
    fn test_membership_follows_matcher() {
        let insensitive = KeywordTable::lua_default(Matcher::new(false));
        assert!(insensitive.contains("For"));

        let sensitive = KeywordTable::lua_default(Matcher::new(true));
        assert!(!sensitive.contains("For"));
        assert!(sensitive.contains("for"));
    }

    #[test]
    fn test_add_keyword() {
        let mut table = KeywordTable::lua_default(Matcher::default());
        let before = table.len();
        assert!(table.add_keyword("defer"));
        assert!(!table.add_keyword("defer"));
        assert!(!table.add_keyword("for"));
        assert_eq!(table.len(), before + 1);
        assert!(table.contains("DEFER"));
    }
}
