//! Search data index for generated documentation sites
//!
//! Reads the `search/*.js` tables a documentation generator emits next to
//! its HTML pages, and answers symbol lookups against them.
//!
//! Each table element is `[key, [label, [url, flag, scope], ...]]`. Tables
//! are loaded once and never change afterwards.

mod key;
mod parser;
mod search;
mod store;
mod types;
mod validate;
mod writer;

pub use key::{decode_key, encode_key, encode_name, DecodedKey};
pub use parser::parse_search_data;
pub use search::{execute_search, MatchMode, SearchHit, SearchQuery};
pub use store::{CategoryStats, SearchDataError, SearchIndex, SourceFile};
pub use types::{LinkTarget, SearchCategory, SearchEntry, SearchLink};
pub use validate::{validate, IssueKind, ValidationIssue};
pub use writer::{from_json, to_json, write_search_data};
