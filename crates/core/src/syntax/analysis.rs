//! Whole-buffer facts used to seed completion: identifiers, simple
//! assignments and imported paths.

use super::chain::reduce_at;
use super::lexer::{Token, TokenKind, string_value, tokenize_lossy};
use indexmap::IndexSet;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferFacts {
    /// Distinct names in order of first appearance
    pub identifiers: Vec<String>,
    /// Assigned name → chain text of the assigned expression
    pub assignments: BTreeMap<String, String>,
    /// String arguments of `import` / `require`
    pub imports: Vec<String>,
}

/// Tokenize the buffer and collect what completion needs from it.
///
/// Lexer errors are skipped; the facts cover every token that could be
/// read.
pub fn analyze_buffer(source: &str) -> BufferFacts {
    let (tokens, errors) = tokenize_lossy(source);
    if !errors.is_empty() {
        debug!("Buffer analysis skipped {} unreadable spans", errors.len());
    }

    let identifiers: IndexSet<&str> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Name)
        .map(|t| t.text)
        .collect();

    BufferFacts {
        identifiers: identifiers.into_iter().map(str::to_string).collect(),
        assignments: collect_assignments(&tokens),
        imports: collect_imports(&tokens),
    }
}

fn collect_imports(tokens: &[Token<'_>]) -> Vec<String> {
    let mut imports = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        if token.kind != TokenKind::Name || !matches!(token.text, "import" | "require") {
            continue;
        }
        let mut j = i + 1;
        if tokens.get(j).is_some_and(|t| t.kind == TokenKind::LParen) {
            j += 1;
        }
        if let Some(arg) = tokens.get(j).filter(|t| t.kind == TokenKind::Str) {
            let path = string_value(arg.text);
            if !path.is_empty() {
                imports.push(path.to_string());
            }
        }
    }
    imports
}

/// Names of a plain assignment target list starting at `start`, and the
/// index of the `=` that follows it.
fn target_list<'a>(tokens: &[Token<'a>], start: usize) -> Option<(Vec<&'a str>, usize)> {
    let mut targets = Vec::new();
    let mut i = start;
    loop {
        let token = tokens.get(i).filter(|t| t.kind == TokenKind::Name)?;
        targets.push(token.text);
        i += 1;
        match tokens.get(i)?.kind {
            TokenKind::Comma => i += 1,
            TokenKind::Assign => return Some((targets, i)),
            _ => return None,
        }
    }
}

/// Parse the value list after `=`. Values that are not access chains are
/// `None`. Returns the values and the index after the list.
fn value_list(tokens: &[Token<'_>], start: usize) -> (Vec<Option<String>>, usize) {
    let mut values = Vec::new();
    let mut i = start;

    while let Some(token) = tokens.get(i) {
        if token.kind == TokenKind::Name {
            let (chain, next, _) = reduce_at(tokens, i);
            if tokens.get(next).is_some_and(|t| t.kind == TokenKind::Assign) {
                // a target of the next statement: the value itself was unreadable
                values.push(None);
                break;
            }
            let continues = tokens
                .get(next)
                .is_some_and(|t| t.kind == TokenKind::Op && t.text != ";");
            values.push((!continues && !chain.is_empty()).then(|| chain.to_string()));
            i = next;
        } else {
            values.push(None);
            i += 1;
        }

        // skip the rest of a compound expression up to the next value
        while let Some(t) = tokens.get(i) {
            match t.kind {
                TokenKind::Comma => break,
                TokenKind::Op if t.text != ";" => i += 1,
                TokenKind::Number | TokenKind::Str => i += 1,
                _ => break,
            }
        }

        if tokens.get(i).map(|t| t.kind) != Some(TokenKind::Comma) {
            break;
        }
        i += 1;
    }

    (values, i)
}

fn collect_assignments(tokens: &[Token<'_>]) -> BTreeMap<String, String> {
    let mut assignments = BTreeMap::new();
    let mut i = 0;

    while i < tokens.len() {
        // `a.b = x` and `a:b = x` assign fields, not names
        let after_access = i > 0
            && (tokens[i - 1].kind == TokenKind::Dot
                || tokens[i - 1].kind == TokenKind::Op && tokens[i - 1].text == ":");
        let parsed = (!after_access)
            .then(|| target_list(tokens, i))
            .flatten();

        let Some((targets, assign_at)) = parsed else {
            i += 1;
            continue;
        };

        let (values, next) = value_list(tokens, assign_at + 1);
        for (k, target) in targets.iter().enumerate() {
            let value = values.get(k).or(values.last()).cloned().flatten();
            if let Some(value) = value {
                assignments.insert(target.to_string(), value);
            }
        }
        i = next.max(i + 1);
    }

    assignments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers_in_first_seen_order() {
        let facts = analyze_buffer("local foo = 1\nfood = foo + bar\nfor i = 1, foo do end");
        assert_eq!(facts.identifiers, vec!["foo", "food", "bar", "i"]);
    }

    #[test]
    fn test_assignments() {
        let source = r#"
            local dialog = AlertDialog.Builder(activity)
            window = activity.getWindow()
            a, b = x.y, z
            c, d = w
            n = 1
            s = "text"
            t.field = Button
            sum = p + q
        "#;
        let facts = analyze_buffer(source);

        assert_eq!(facts.assignments["dialog"], "AlertDialog.Builder()");
        assert_eq!(facts.assignments["window"], "activity.getWindow()");
        assert_eq!(facts.assignments["a"], "x.y");
        assert_eq!(facts.assignments["b"], "z");
        assert_eq!(facts.assignments["c"], "w");
        assert_eq!(facts.assignments["d"], "w");
        assert!(!facts.assignments.contains_key("n"));
        assert!(!facts.assignments.contains_key("s"));
        assert!(!facts.assignments.contains_key("field"));
        assert!(!facts.assignments.contains_key("sum"));
    }

    #[test]
    fn test_imports() {
        let source = r#"
            import "android.widget.*"
            import("android.app.AlertDialog")
            local json = require 'cjson'
            require(name)
        "#;
        let facts = analyze_buffer(source);
        assert_eq!(
            facts.imports,
            vec!["android.widget.*", "android.app.AlertDialog", "cjson"]
        );
        assert_eq!(facts.assignments["json"], "require()");
    }

    #[test]
    fn test_recovers_from_bad_input() {
        let facts = analyze_buffer("a = b ? \nc = 'unterminated\nd = e.f");
        assert_eq!(facts.assignments["d"], "e.f");
        assert!(facts.identifiers.contains(&"a".to_string()));
    }
}
