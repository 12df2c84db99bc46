/// How the end of a message body is determined.
///
/// The framing starts out [`Framing::Unknown`] for every message, is narrowed while
/// the header fields are parsed and is fixed once the blank line ending the headers
/// has been seen.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Framing {
    /// Not decided yet
    #[default]
    Unknown,
    /// No body at all
    NoContent,
    /// The body runs until the peer closes the connection
    EofContent,
    /// The body has exactly `Content-Length` bytes
    ContentLength,
    /// The body uses chunked transfer encoding
    Chunked,
}

impl Framing {
    /// Returns true if the payload uses chunked transfer encoding
    #[inline]
    pub fn is_chunked(self) -> bool {
        matches!(self, Framing::Chunked)
    }

    /// Returns true once the framing has been decided
    #[inline]
    pub fn is_known(self) -> bool {
        !matches!(self, Framing::Unknown)
    }
}
