//! Line-level text helpers run on every keystroke: string-literal detection,
//! prefix extraction and in-string completions.

pub mod prefix;
pub mod quote;
pub mod strings;

pub use prefix::compute_prefix;
pub use quote::{ContextKeyword, Quote, detect_context_keyword, inside_string, string_prefix};
pub use strings::StringCompleter;

/// Clamp a byte column to the line length and down to a char boundary.
pub(crate) fn clamp_column(line: &str, column: usize) -> usize {
    let mut col = column.min(line.len());
    while !line.is_char_boundary(col) {
        col -= 1;
    }
    col
}
