//! Code completion: matching rules, candidate sources, type resolution and
//! ranking.

pub mod engine;
pub mod identifiers;
pub mod keywords;
pub mod matcher;
pub mod packages;
pub mod ranking;
pub mod render;
pub mod resolve;

pub use engine::{CompletionEngine, CompletionRequest};
pub use identifiers::{IdentifierSet, IdentifierSetBuilder, IdentifierSource, SharedIdentifiers};
pub use keywords::{KeywordInfo, KeywordTable};
pub use matcher::Matcher;
pub use packages::PackageTable;
pub use ranking::RankingStrategy;
pub use render::MemberRenderer;
pub use resolve::{AliasMap, Resolution, Resolver};
