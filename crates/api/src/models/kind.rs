use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of a completion candidate.
///
/// The same enum tags both indexed members (`Method`, `Field`, `Property`)
/// and the synthetic candidates produced by the engine (`Keyword`,
/// `Identifier`, `Module`, ...).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CompletionKind {
    Method,
    Field,
    Property,
    Class,
    Interface,
    Module,
    Constant,
    Keyword,
    Operator,
    Function,
    Constructor,
    Identifier,
    Text,
    File,
}

impl CompletionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionKind::Method => "method",
            CompletionKind::Field => "field",
            CompletionKind::Property => "property",
            CompletionKind::Class => "class",
            CompletionKind::Interface => "interface",
            CompletionKind::Module => "module",
            CompletionKind::Constant => "constant",
            CompletionKind::Keyword => "keyword",
            CompletionKind::Operator => "operator",
            CompletionKind::Function => "function",
            CompletionKind::Constructor => "constructor",
            CompletionKind::Identifier => "identifier",
            CompletionKind::Text => "text",
            CompletionKind::File => "file",
        }
    }

    /// Members that can be followed by a further `.` access.
    pub fn is_member(&self) -> bool {
        matches!(
            self,
            CompletionKind::Method | CompletionKind::Field | CompletionKind::Property
        )
    }
}

impl fmt::Display for CompletionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompletionKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_ascii_lowercase().as_str() {
            "method" => CompletionKind::Method,
            "field" => CompletionKind::Field,
            "property" => CompletionKind::Property,
            "class" => CompletionKind::Class,
            "interface" => CompletionKind::Interface,
            "module" => CompletionKind::Module,
            "constant" => CompletionKind::Constant,
            "keyword" => CompletionKind::Keyword,
            "operator" => CompletionKind::Operator,
            "function" => CompletionKind::Function,
            "constructor" => CompletionKind::Constructor,
            "identifier" => CompletionKind::Identifier,
            "text" => CompletionKind::Text,
            "file" => CompletionKind::File,
            other => return Err(ApiError::UnknownKind(other.to_string())),
        };
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_is_case_insensitive() {
        assert_eq!(
            "Method".parse::<CompletionKind>().unwrap(),
            CompletionKind::Method
        );
        assert_eq!(
            "PROPERTY".parse::<CompletionKind>().unwrap(),
            CompletionKind::Property
        );
        assert!("widget".parse::<CompletionKind>().is_err());
    }

    #[test]
    fn test_member_kinds() {
        assert!(CompletionKind::Field.is_member());
        assert!(!CompletionKind::Keyword.is_member());
    }
}
