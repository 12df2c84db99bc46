//! A byte trie supporting exact and longest-prefix lookups.
//!
//! Keys are byte strings; children are kept sorted per node so a lookup walks the
//! input once with a binary search per byte. A trie built case-insensitive folds
//! ASCII letters both when inserting and when looking up.

/// Trie node.
#[derive(Debug, Clone, Default)]
struct Node {
    /// Sorted by byte
    children: Vec<(u8, usize)>,
    /// Index into the value table if a key ends here
    value: Option<usize>,
}

impl Node {
    fn child(&self, byte: u8) -> Option<usize> {
        self.children.binary_search_by_key(&byte, |(b, _)| *b).ok().map(|i| self.children[i].1)
    }
}

/// Byte trie mapping keys to values of type `V`.
#[derive(Debug, Clone)]
pub struct Trie<V> {
    nodes: Vec<Node>,
    values: Vec<V>,
    case_insensitive: bool,
}

impl<V> Default for Trie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Trie<V> {
    /// Creates an empty trie matching bytes exactly.
    pub fn new() -> Self {
        Self { nodes: vec![Node::default()], values: Vec::new(), case_insensitive: false }
    }

    /// Creates an empty trie that ignores ASCII case.
    pub fn case_insensitive() -> Self {
        Self { case_insensitive: true, ..Self::new() }
    }

    /// Number of keys stored.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    fn fold(&self, byte: u8) -> u8 {
        if self.case_insensitive { byte.to_ascii_lowercase() } else { byte }
    }

    /// Inserts `key`, replacing the value of an equal key.
    ///
    /// Returns true if the key was not present before.
    pub fn insert(&mut self, key: &[u8], value: V) -> bool {
        let mut node = 0;
        for &byte in key {
            let byte = self.fold(byte);
            node = match self.nodes[node].children.binary_search_by_key(&byte, |(b, _)| *b) {
                Ok(i) => self.nodes[node].children[i].1,
                Err(i) => {
                    let next = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[node].children.insert(i, (byte, next));
                    next
                }
            };
        }

        if let Some(index) = self.nodes[node].value {
            self.values[index] = value;
            false
        } else {
            self.nodes[node].value = Some(self.values.len());
            self.values.push(value);
            true
        }
    }

    /// Exact lookup.
    pub fn get(&self, key: &[u8]) -> Option<&V> {
        let mut node = 0;
        for &byte in key {
            node = self.nodes[node].child(self.fold(byte))?;
        }
        self.nodes[node].value.map(|index| &self.values[index])
    }

    /// Finds the longest key that is a prefix of `input`.
    ///
    /// Returns the key length in bytes together with its value. The input is only
    /// walked as far as the trie has matching branches.
    pub fn best<I>(&self, input: I) -> Option<(usize, &V)>
    where
        I: IntoIterator<Item = u8>,
    {
        let mut node = 0;
        let mut best = None;
        for (depth, byte) in input.into_iter().enumerate() {
            match self.nodes[node].child(self.fold(byte)) {
                Some(next) => node = next,
                None => break,
            }
            if let Some(index) = self.nodes[node].value {
                best = Some((depth + 1, index));
            }
        }
        best.map(|(len, index)| (len, &self.values[index]))
    }
}
