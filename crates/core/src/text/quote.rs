//! String-literal detection with backslash-escape handling.
//!
//! A quote is escaped only when an odd number of backslashes immediately
//! precedes it: `\"` is escaped, `\\"` closes the string, `\\\"` is escaped
//! again. While inside one quote kind the other kind is plain text.

use super::clamp_column;
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quote {
    Single,
    Double,
}

impl Quote {
    pub fn as_char(self) -> char {
        match self {
            Quote::Single => '\'',
            Quote::Double => '"',
        }
    }

    fn byte(self) -> u8 {
        match self {
            Quote::Single => b'\'',
            Quote::Double => b'"',
        }
    }
}

/// Keywords that take a string argument and select which completion set
/// applies inside that string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKeyword {
    Import,
    Require,
    Dofile,
    Loadfile,
}

impl ContextKeyword {
    pub fn as_str(self) -> &'static str {
        match self {
            ContextKeyword::Import => "import",
            ContextKeyword::Require => "require",
            ContextKeyword::Dofile => "dofile",
            ContextKeyword::Loadfile => "loadfile",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "import" => Some(ContextKeyword::Import),
            "require" => Some(ContextKeyword::Require),
            "dofile" => Some(ContextKeyword::Dofile),
            "loadfile" => Some(ContextKeyword::Loadfile),
            _ => None,
        }
    }

    /// The string names a module or class path.
    pub fn takes_module(self) -> bool {
        matches!(self, ContextKeyword::Import | ContextKeyword::Require)
    }

    /// The string names a file on disk.
    pub fn takes_file(self) -> bool {
        matches!(self, ContextKeyword::Dofile | ContextKeyword::Loadfile)
    }
}

// keyword, optional `(`, optional whitespace, then the opening quote (already cut off)
static CONTEXT_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(import|require|dofile|loadfile)\s*\(?\s*$").expect("valid keyword regex")
});

/// Left-to-right pass: the quote kind and byte offset of the string that is
/// still open at `end`, if any.
fn open_string(line: &str, end: usize) -> Option<(Quote, usize)> {
    let bytes = line.as_bytes();
    let mut open: Option<(Quote, usize)> = None;
    let mut backslashes = 0usize;

    for (i, &b) in bytes[..end].iter().enumerate() {
        if b == b'\\' {
            backslashes += 1;
            continue;
        }
        let escaped = backslashes % 2 == 1;
        backslashes = 0;
        if escaped {
            continue;
        }

        let quote = match b {
            b'"' => Quote::Double,
            b'\'' => Quote::Single,
            _ => continue,
        };
        open = match open {
            None => Some((quote, i)),
            Some((current, _)) if current == quote => None,
            still_open => still_open,
        };
    }

    open
}

fn is_escaped(bytes: &[u8], index: usize) -> bool {
    let run = bytes[..index]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count();
    run % 2 == 1
}

/// The quote kind that opened the string containing byte `column`, or
/// `None` when the column is in code.
pub fn inside_string(line: &str, column: usize) -> Option<Quote> {
    let end = clamp_column(line, column);
    if end == 0 {
        return None;
    }
    open_string(line, end).map(|(quote, _)| quote)
}

/// Text between the opening quote and `column`.
///
/// Scans right-to-left from the cursor to the nearest unescaped quote of the
/// kind that opened the string. Empty when the cursor sits right after the
/// opening quote; `None` when the column is not inside a string.
pub fn string_prefix(line: &str, column: usize) -> Option<&str> {
    let end = clamp_column(line, column);
    let quote = inside_string(line, end)?;
    let bytes = line.as_bytes();

    let mut start = end;
    while start > 0 {
        let i = start - 1;
        if bytes[i] == quote.byte() && !is_escaped(bytes, i) {
            return Some(&line[start..end]);
        }
        start -= 1;
    }

    // inside_string found an opening quote, so the loop always returns
    Some("")
}

/// The string-consuming keyword right before the string that contains
/// `column`, ignoring an optional `(` and whitespace.
pub fn detect_context_keyword(line: &str, column: usize) -> Option<ContextKeyword> {
    let end = clamp_column(line, column);
    let (_, open_at) = open_string(line, end)?;

    CONTEXT_KEYWORD
        .captures(&line[..open_at])
        .and_then(|caps| caps.get(1))
        .and_then(|m| ContextKeyword::parse(m.as_str()))
}
