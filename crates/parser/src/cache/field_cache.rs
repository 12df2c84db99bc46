//! Per-connection cache of complete header fields.
//!
//! Clients on a persistent connection tend to repeat the same `User-Agent`,
//! `Accept` or `Cookie` lines on every request. Remembering the exact
//! `Name: value` text lets the parser skip over such a line in one step.

use crate::cache::known::KnownHeader;
use crate::cache::trie::Trie;

/// A header field whose exact text is known in advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedField {
    header: KnownHeader,
    name: String,
    value: String,
}

impl CachedField {
    pub fn new(header: KnownHeader, name: &str, value: &str) -> Self {
        Self { header, name: name.to_owned(), value: value.to_owned() }
    }

    pub fn header(&self) -> KnownHeader {
        self.header
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// The bytes of the field line as it appears on the wire, without the line end.
    pub(crate) fn key(&self) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.name.len() + self.value.len() + 2);
        key.extend(latin1_bytes(&self.name));
        key.extend_from_slice(b": ");
        key.extend(latin1_bytes(&self.value));
        key
    }
}

/// Header text is accumulated one byte per char, so every char fits a byte.
fn latin1_bytes(text: &str) -> impl Iterator<Item = u8> + '_ {
    text.chars().filter_map(|c| u8::try_from(c).ok())
}

/// Bounded cache of fields seen on one connection.
///
/// Owned by a single parser, never shared.
#[derive(Debug, Clone)]
pub struct FieldCache {
    fields: Trie<CachedField>,
    capacity: usize,
}

impl FieldCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { fields: Trie::new(), capacity }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.fields.len() >= self.capacity
    }

    /// Remembers a field unless the cache is full.
    ///
    /// Returns true if the field was added.
    pub fn put(&mut self, header: KnownHeader, name: &str, value: &str) -> bool {
        if self.is_full() || value.is_empty() {
            return false;
        }
        let field = CachedField::new(header, name, value);
        self.fields.insert(&field.key(), field)
    }

    /// Longest cached field line at the start of `input`.
    pub fn best<I: IntoIterator<Item = u8>>(&self, input: I) -> Option<(usize, &CachedField)> {
        self.fields.best(input)
    }
}
