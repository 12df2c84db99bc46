use std::io;

use http::StatusCode;
use thiserror::Error;

/// A malformed or oversized HTTP/1.x message.
///
/// Every variant maps onto the status code a server would answer with through
/// [`ParseError::status`]; the parser reports each one exactly once through
/// [`HttpHandler::bad_message`](crate::handler::HttpHandler::bad_message) and then stays closed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid http method: {method}")]
    BadMethod { method: String },

    #[error("no uri")]
    NoUri,

    #[error("no status")]
    NoStatus,

    #[error("unknown http version: {version}")]
    UnknownVersion { version: String },

    #[error("bad status code")]
    BadStatus,

    #[error("invalid content-length header: {value}")]
    BadContentLength { value: String },

    #[error("bad chunking: {value}")]
    BadChunking { value: String },

    #[error("bad host header: {value}")]
    BadHost { value: String },

    #[error("bad ipv6 host header: {value}")]
    BadIpv6Host { value: String },

    #[error("no host header")]
    NoHost,

    #[error("header continuation without a header")]
    BadContinuation,

    #[error("bad chunk char: {byte:#04x}")]
    BadChunkChar { byte: u8 },

    #[error("chunk size overflow")]
    ChunkSizeOverflow,

    #[error("uri is too large, exceed the limit {max_size}")]
    UriTooLong { max_size: usize },

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },
}

impl ParseError {
    pub fn bad_method<S: ToString>(method: S) -> Self {
        Self::BadMethod { method: method.to_string() }
    }

    pub fn unknown_version<S: ToString>(version: S) -> Self {
        Self::UnknownVersion { version: version.to_string() }
    }

    pub fn bad_content_length<S: ToString>(value: S) -> Self {
        Self::BadContentLength { value: value.to_string() }
    }

    pub fn bad_chunking<S: ToString>(value: S) -> Self {
        Self::BadChunking { value: value.to_string() }
    }

    pub fn bad_host<S: ToString>(value: S) -> Self {
        Self::BadHost { value: value.to_string() }
    }

    pub fn bad_ipv6_host<S: ToString>(value: S) -> Self {
        Self::BadIpv6Host { value: value.to_string() }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    /// The status code a server should answer this error with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UriTooLong { .. } => StatusCode::URI_TOO_LONG,
            Self::TooLargeHeader { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// The short reason phrase, if the error carries one.
    ///
    /// Limit violations have none: the status code says it all.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Self::BadMethod { .. } => Some("Bad Method"),
            Self::NoUri => Some("No URI"),
            Self::NoStatus => Some("No Status"),
            Self::UnknownVersion { .. } => Some("Unknown Version"),
            Self::BadStatus => Some("Bad Status"),
            Self::BadContentLength { .. } => Some("Bad Content-Length"),
            Self::BadChunking { .. } => Some("Bad chunking"),
            Self::BadHost { .. } => Some("Bad Host header"),
            Self::BadIpv6Host { .. } => Some("Bad IPv6 Host header"),
            Self::NoHost => Some("No Host"),
            Self::BadContinuation => Some("Bad Continuation"),
            Self::BadChunkChar { .. } | Self::ChunkSizeOverflow => Some("Bad chunk size"),
            Self::UriTooLong { .. } | Self::TooLargeHeader { .. } => None,
        }
    }
}

/// Errors surfaced by [`EventDecoder`](crate::codec::EventDecoder).
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("bad message: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl DecodeError {
    /// Returns the parse error if this is a bad message.
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match self {
            Self::Parse { source } => Some(source),
            Self::Io { .. } => None,
        }
    }
}
