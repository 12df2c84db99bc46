/// Default start-line plus header byte budget
pub const DEFAULT_MAX_HEADER_BYTES: usize = 8 * 1024;

/// Default number of fields remembered per connection
pub const DEFAULT_HEADER_CACHE_CAPACITY: usize = 32;

/// Limits and switches of an [`HttpParser`](crate::parser::HttpParser).
///
/// ```
/// use micro_http_parser::parser::ParserConfig;
///
/// let config = ParserConfig::default().with_max_header_bytes(16 * 1024).with_header_cache_capacity(0);
/// assert_eq!(config.max_header_bytes(), Some(16 * 1024));
/// assert_eq!(config.header_cache_capacity(), 0);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    max_header_bytes: usize,
    header_cache_capacity: usize,
    parse_trailers: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            header_cache_capacity: DEFAULT_HEADER_CACHE_CAPACITY,
            parse_trailers: false,
        }
    }
}

impl ParserConfig {
    /// Sets the byte budget for the start line and headers of one message, `0` for unlimited.
    pub fn with_max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.max_header_bytes = max_header_bytes;
        self
    }

    /// Sets how many fields the per-connection cache keeps, `0` to disable it.
    pub fn with_header_cache_capacity(mut self, capacity: usize) -> Self {
        self.header_cache_capacity = capacity;
        self
    }

    /// Parses trailer fields after the last chunk instead of leaving them unread.
    pub fn with_trailers(mut self, parse_trailers: bool) -> Self {
        self.parse_trailers = parse_trailers;
        self
    }

    /// The byte budget, `None` when unlimited.
    pub fn max_header_bytes(&self) -> Option<usize> {
        (self.max_header_bytes > 0).then_some(self.max_header_bytes)
    }

    pub fn header_cache_capacity(&self) -> usize {
        self.header_cache_capacity
    }

    pub fn parse_trailers(&self) -> bool {
        self.parse_trailers
    }
}
