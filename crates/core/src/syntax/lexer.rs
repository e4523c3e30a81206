use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Name,
    Keyword,
    Number,
    Str,
    Dot,
    Comma,
    Assign,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    /// Any other operator or punctuation (`..`, `==`, `:`, `+`, ...)
    Op,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset in the source
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unexpected character {ch:?} at byte {offset}")]
    UnexpectedChar { ch: char, offset: usize },
    #[error("unterminated string starting at byte {0}")]
    UnterminatedString(usize),
    #[error("unterminated long bracket starting at byte {0}")]
    UnterminatedLongBracket(usize),
}

const KEYWORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if", "in",
    "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text)
}

fn is_name_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

/// Lua tokenizer over a borrowed source.
///
/// Comments and whitespace are skipped. After an error the cursor has
/// already moved past the offending input, so iteration can continue.
pub struct Lexer<'a> {
    source: &'a str,
    cursor: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, cursor: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.cursor..].chars().next()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.source[self.cursor..].chars().nth(ahead)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.cursor += ch.len_utf8();
        Some(ch)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token<'a> {
        Token {
            kind,
            text: &self.source[start..self.cursor],
            offset: start,
        }
    }

    /// Skip whitespace and comments. Returns an error for an unterminated
    /// long comment.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            self.eat_while(char::is_whitespace);
            if !self.source[self.cursor..].starts_with("--") {
                return Ok(());
            }
            let start = self.cursor;
            self.cursor += 2;
            if let Some(level) = self.long_bracket_level() {
                self.read_long_bracket(start, level)?;
            } else {
                self.eat_while(|c| c != '\n');
            }
        }
    }

    /// Level of a `[==[` opener at the cursor, without consuming it.
    fn long_bracket_level(&self) -> Option<usize> {
        let rest = self.source[self.cursor..].strip_prefix('[')?;
        let level = rest.chars().take_while(|&c| c == '=').count();
        rest[level..].starts_with('[').then_some(level)
    }

    fn read_long_bracket(&mut self, start: usize, level: usize) -> Result<(), LexError> {
        self.cursor += level + 2;
        let close = format!("]{}]", "=".repeat(level));
        match self.source[self.cursor..].find(&close) {
            Some(pos) => {
                self.cursor += pos + close.len();
                Ok(())
            }
            None => {
                self.cursor = self.source.len();
                Err(LexError::UnterminatedLongBracket(start))
            }
        }
    }

    fn read_quoted(&mut self, quote: char, start: usize) -> Result<Token<'a>, LexError> {
        self.bump();
        while let Some(ch) = self.peek() {
            match ch {
                '\\' => {
                    self.bump();
                    self.bump();
                }
                '\n' => break,
                c if c == quote => {
                    self.bump();
                    return Ok(self.token(TokenKind::Str, start));
                }
                _ => {
                    self.bump();
                }
            }
        }
        Err(LexError::UnterminatedString(start))
    }

    fn read_number(&mut self, start: usize) -> Token<'a> {
        let hex = self.source[self.cursor..].starts_with("0x")
            || self.source[self.cursor..].starts_with("0X");
        if hex {
            self.cursor += 2;
        }
        let exponent = if hex { ['p', 'P'] } else { ['e', 'E'] };

        while let Some(ch) = self.peek() {
            if exponent.contains(&ch) {
                self.bump();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.bump();
                }
            } else if ch.is_ascii_hexdigit() && hex || ch.is_ascii_digit() || ch == '.' {
                // `1..x` is concatenation, not a decimal point
                if ch == '.' && self.peek_at(1) == Some('.') {
                    break;
                }
                self.bump();
            } else {
                break;
            }
        }
        self.token(TokenKind::Number, start)
    }

    fn read_operator(&mut self, ch: char, start: usize) -> Result<Token<'a>, LexError> {
        const LONG_OPS: &[&str] = &["...", "..", "==", "~=", "<=", ">=", "<<", ">>", "//", "::"];

        let rest = &self.source[self.cursor..];
        if let Some(op) = LONG_OPS.iter().find(|op| rest.starts_with(*op)) {
            self.cursor += op.len();
            return Ok(self.token(TokenKind::Op, start));
        }

        let kind = match ch {
            '.' => TokenKind::Dot,
            ',' => TokenKind::Comma,
            '=' => TokenKind::Assign,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '+' | '-' | '*' | '/' | '%' | '^' | '#' | '&' | '~' | '|' | '<' | '>' | ':' | ';'
            | '@' => TokenKind::Op,
            other => {
                self.bump();
                return Err(LexError::UnexpectedChar {
                    ch: other,
                    offset: start,
                });
            }
        };
        self.bump();
        Ok(self.token(kind, start))
    }

    pub fn next_token(&mut self) -> Option<Result<Token<'a>, LexError>> {
        if let Err(e) = self.skip_trivia() {
            return Some(Err(e));
        }

        let start = self.cursor;
        let ch = self.peek()?;

        let result = if is_name_start(ch) {
            self.eat_while(is_name_char);
            let kind = if is_keyword(&self.source[start..self.cursor]) {
                TokenKind::Keyword
            } else {
                TokenKind::Name
            };
            Ok(self.token(kind, start))
        } else if ch.is_ascii_digit()
            || ch == '.' && self.peek_at(1).is_some_and(|c| c.is_ascii_digit())
        {
            Ok(self.read_number(start))
        } else if ch == '"' || ch == '\'' {
            self.read_quoted(ch, start)
        } else if let Some(level) = self.long_bracket_level() {
            self.read_long_bracket(start, level)
                .map(|_| self.token(TokenKind::Str, start))
        } else {
            self.read_operator(ch, start)
        };

        Some(result)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenize, failing on the first error.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, LexError> {
    Lexer::new(source).collect()
}

/// Tokenize everything that can be tokenized, returning the errors met on
/// the way.
pub fn tokenize_lossy(source: &str) -> (Vec<Token<'_>>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    for item in Lexer::new(source) {
        match item {
            Ok(token) => tokens.push(token),
            Err(e) => errors.push(e),
        }
    }
    (tokens, errors)
}

/// Contents of a string token without its delimiters. Escapes are kept.
pub fn string_value(text: &str) -> &str {
    if let Some(rest) = text.strip_prefix('[') {
        let level = rest.chars().take_while(|&c| c == '=').count();
        let inner = &rest[level + 1..];
        return inner.get(..inner.len().saturating_sub(level + 2)).unwrap_or("");
    }
    text.get(1..text.len().saturating_sub(1)).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_names_keywords_and_punctuation() {
        let tokens = tokenize("local x = foo.bar(1, 'a')").unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text).collect();
        assert_eq!(
            texts,
            vec!["local", "x", "=", "foo", ".", "bar", "(", "1", ",", "'a'", ")"]
        );
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[1].kind, TokenKind::Name);
        assert_eq!(tokens[9].kind, TokenKind::Str);
        assert_eq!(tokens[3].offset, 10);
    }

    #[test]
    fn test_multi_char_operators() {
        use TokenKind::*;
        assert_eq!(kinds("a == b"), vec![Name, Op, Name]);
        assert_eq!(kinds("a .. b"), vec![Name, Op, Name]);
        assert_eq!(kinds("1..x"), vec![Number, Op, Name]);
        assert_eq!(kinds("x = .5e-3"), vec![Name, Assign, Number]);
        assert_eq!(kinds("0x1Fp2"), vec![Number]);
    }

    #[test]
    fn test_comments_are_skipped() {
        let source = "a -- line comment\n--[[ block\ncomment ]] b --[==[ x ]==] c";
        let names: Vec<&str> = tokenize(source).unwrap().iter().map(|t| t.text).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_strings() {
        let tokens = tokenize(r#"s = "a\"b" .. [[long]] .. [=[x]]y]=]"#).unwrap();
        let strings: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Str)
            .map(|t| string_value(t.text))
            .collect();
        assert_eq!(strings, vec![r#"a\"b"#, "long", "x]]y"]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(tokenize("s = 'abc"), Err(LexError::UnterminatedString(4)));
        assert_eq!(
            tokenize("a ? b"),
            Err(LexError::UnexpectedChar { ch: '?', offset: 2 })
        );
        assert_eq!(tokenize("--[[ open"), Err(LexError::UnterminatedLongBracket(0)));
    }

    #[test]
    fn test_lossy_recovers() {
        let (tokens, errors) = tokenize_lossy("a ? b\nc = 'open\nd");
        let names: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Name)
            .map(|t| t.text)
            .collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
        assert_eq!(errors.len(), 2);
    }
}
