use super::kind::CompletionKind;
use serde::{Deserialize, Serialize};

/// A completion candidate as handed to the host editor.
///
/// `replace_len` is the number of bytes before the cursor that the
/// insertion overwrites (the length of the prefix segment being completed).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: String,
    pub insert_text: String,
    pub replace_len: usize,
    pub kind: CompletionKind,
    pub description: String,
}

impl CompletionItem {
    pub fn new(label: impl Into<String>, kind: CompletionKind, replace_len: usize) -> Self {
        let label = label.into();
        Self {
            insert_text: label.clone(),
            label,
            replace_len,
            kind,
            description: String::new(),
        }
    }

    pub fn with_insert_text(mut self, text: impl Into<String>) -> Self {
        self.insert_text = text.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
