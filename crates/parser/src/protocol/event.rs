use bytes::Bytes;
use http::{Method, Version};

/// An owned copy of one parser callback.
///
/// The parser itself never materializes events; this type exists for consumers that
/// want to queue them, such as [`EventDecoder`](crate::codec::EventDecoder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEvent {
    /// A request line; `version` is `None` for an HTTP/0.9 request
    RequestLine { method: Method, uri: Bytes, version: Option<Version> },
    /// A status line
    StatusLine { version: Version, status: u16, reason: Option<String> },
    /// One header field, after any folded continuation lines were joined
    Header { name: String, value: String },
    /// The checked `Host` header of a request
    Host { host: String, port: Option<u16> },
    /// The blank line ending the header section
    HeaderComplete,
    /// A slice of the message body
    Content(Bytes),
    /// One trailer field after the last chunk
    Trailer { name: String, value: String },
    /// The message is fully delimited
    MessageComplete,
    /// The input ended before the message was fully delimited
    EarlyEof,
}

impl ParseEvent {
    /// Returns true if this event carries body bytes
    #[inline]
    pub fn is_content(&self) -> bool {
        matches!(self, ParseEvent::Content(_))
    }

    /// Returns true if this event ends a message
    #[inline]
    pub fn is_message_complete(&self) -> bool {
        matches!(self, ParseEvent::MessageComplete)
    }

    /// Returns the body bytes if this is a content event
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            ParseEvent::Content(bytes) => Some(bytes),
            _ => None,
        }
    }
}
