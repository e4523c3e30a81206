//! Reduction of an expression to its dotted access chain.
//!
//! `foo.bar(x, y).baz` becomes the segments `foo`, `bar()`, `baz`: call
//! arguments and index expressions collapse into a marker on the segment so
//! the resolver only walks names.

use super::lexer::{LexError, Token, TokenKind, tokenize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Plain,
    /// `name(...)`, `name"..."` or `name{...}`
    Call,
    /// `name[...]`
    Index,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    pub access: Access,
}

impl Segment {
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            access: Access::Plain,
        }
    }

    pub fn is_plain(&self) -> bool {
        self.access == Access::Plain
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chain {
    pub segments: Vec<Segment>,
    /// The expression ends with `.`, so the member being typed is empty
    pub trailing_dot: bool,
}

impl Chain {
    /// Tokenize and reduce. Lexer errors are returned so the caller can
    /// decide how to degrade.
    pub fn parse(text: &str) -> Result<Chain, LexError> {
        let tokens = tokenize(text)?;
        Ok(reduce(&tokens))
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// The chain without its last segment and without a trailing dot.
    pub fn parent(&self) -> Chain {
        let keep = self.segments.len().saturating_sub(1);
        Chain {
            segments: self.segments[..keep].to_vec(),
            trailing_dot: false,
        }
    }

    /// Split into the receiver chain and the member name being typed.
    ///
    /// `a.b.` → (`a.b`, ""); `a.b.c` → (`a.b`, "c"). `None` when there is
    /// no receiver (`a`) or the last segment is already a call or index.
    pub fn split_member(&self) -> Option<(Chain, &str)> {
        if self.trailing_dot {
            if self.is_empty() {
                return None;
            }
            let receiver = Chain {
                segments: self.segments.clone(),
                trailing_dot: false,
            };
            return Some((receiver, ""));
        }

        let last = self.segments.last()?;
        if self.segments.len() < 2 || !last.is_plain() {
            return None;
        }
        Some((self.parent(), last.name.as_str()))
    }

    /// Names joined with `.`, calls and indexes erased.
    pub fn dotted(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&segment.name)?;
            match segment.access {
                Access::Plain => {}
                Access::Call => f.write_str("()")?,
                Access::Index => f.write_str("[]")?,
            }
        }
        if self.trailing_dot {
            f.write_str(".")?;
        }
        Ok(())
    }
}

fn closing(kind: TokenKind) -> Option<TokenKind> {
    match kind {
        TokenKind::LParen => Some(TokenKind::RParen),
        TokenKind::LBracket => Some(TokenKind::RBracket),
        TokenKind::LBrace => Some(TokenKind::RBrace),
        _ => None,
    }
}

/// Index just past the group opened at `open`, or `None` when the input
/// ends before the group is closed.
fn skip_group(tokens: &[Token<'_>], open: usize) -> Option<usize> {
    let mut stack = vec![closing(tokens[open].kind)?];
    let mut i = open + 1;
    while let Some(token) = tokens.get(i) {
        if let Some(close) = closing(token.kind) {
            stack.push(close);
        } else if stack.last() == Some(&token.kind) {
            stack.pop();
            if stack.is_empty() {
                return Some(i + 1);
            }
        }
        i += 1;
    }
    None
}

/// Parse one access chain starting at `start`.
///
/// Returns the chain and the index of the first token not consumed.
/// `complete` is false when an unterminated call cut the chain short.
pub(crate) fn reduce_at(tokens: &[Token<'_>], start: usize) -> (Chain, usize, bool) {
    let mut chain = Chain::default();
    let mut i = start;

    while let Some(token) = tokens.get(i).filter(|t| t.kind == TokenKind::Name) {
        chain.segments.push(Segment::plain(token.text));
        chain.trailing_dot = false;
        i += 1;

        while let Some(token) = tokens.get(i) {
            let access = match token.kind {
                TokenKind::LParen | TokenKind::LBrace => Access::Call,
                TokenKind::LBracket => Access::Index,
                TokenKind::Str => {
                    i += 1;
                    set_access(&mut chain, Access::Call);
                    continue;
                }
                _ => break,
            };
            match skip_group(tokens, i) {
                Some(next) => {
                    set_access(&mut chain, access);
                    i = next;
                }
                None => return (chain, tokens.len(), false),
            }
        }

        if tokens.get(i).map(|t| t.kind) != Some(TokenKind::Dot) {
            break;
        }
        chain.trailing_dot = true;
        i += 1;
    }

    (chain, i, true)
}

fn set_access(chain: &mut Chain, access: Access) {
    if let Some(last) = chain.segments.last_mut() {
        last.access = access;
    }
}

/// The access chain that ends the token stream.
///
/// Anything before it (operators, unrelated expressions) is discarded; an
/// unterminated trailing call is dropped and the chain up to its callee is
/// returned.
pub fn reduce(tokens: &[Token<'_>]) -> Chain {
    let mut last = Chain::default();
    let mut i = 0;

    while i < tokens.len() {
        let (chain, next, complete) = reduce_at(tokens, i);
        if !complete {
            return chain;
        }
        if next > i {
            last = chain;
            i = next;
        } else {
            last = Chain::default();
            i += 1;
        }
    }

    last
}
