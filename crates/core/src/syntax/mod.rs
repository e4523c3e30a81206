//! Lua tokenizer, access-chain reduction and buffer analysis.

pub mod analysis;
pub mod chain;
pub mod lexer;

pub use analysis::{BufferFacts, analyze_buffer};
pub use chain::{Access, Chain, Segment};
pub use lexer::{LexError, Lexer, Token, TokenKind, tokenize, tokenize_lossy};
