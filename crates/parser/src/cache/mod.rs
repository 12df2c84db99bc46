//! Lookup tables used by the parser's fast paths.
//!
//! - [`Trie`]: exact and longest-prefix byte lookup
//! - [`KnownHeader`] / [`KnownValue`]: the process-wide tables of well-known tokens
//! - [`FieldCache`]: the bounded per-connection cache of complete fields
//!
//! The parser behaves identically without any hit in these tables, only slower.

mod field_cache;
pub(crate) mod known;
mod trie;

pub use field_cache::{CachedField, FieldCache};
pub use known::{KnownHeader, KnownValue};
pub use trie::Trie;
