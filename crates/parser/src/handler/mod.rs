//! The event-consumer side of the parser.
//!
//! The parser never builds a message object. Each construct it recognizes is handed to
//! an [`HttpHandler`] as soon as it is complete. Callbacks returning `bool` return `true`
//! to make [`HttpParser::parse_next`](crate::parser::HttpParser::parse_next) return to
//! its caller right after the current event; parsing resumes on the next call.
//!
//! Byte slices passed to a callback borrow the caller's buffer and are only valid for
//! the duration of the call. The request URI is the exception: it is buffered by the
//! parser and stays unchanged until [`HttpParser::reset`](crate::parser::HttpParser::reset).

use http::{Method, Version};

use crate::protocol::ParseError;

/// Receives parse events.
///
/// The start-line and host callbacks have no-op defaults so a consumer only
/// implements the side (request or response) it parses.
#[allow(unused_variables, reason = "default implementations ignore their arguments")]
pub trait HttpHandler {
    /// A request line was parsed.
    ///
    /// `version` is `None` for an HTTP/0.9 request, which has no headers and no body.
    fn start_request(&mut self, method: &Method, uri: &[u8], version: Option<Version>) -> bool {
        false
    }

    /// A status line was parsed. `reason` has its trailing whitespace removed.
    fn start_response(&mut self, version: Version, status: u16, reason: Option<&str>) -> bool {
        false
    }

    /// One header field, delivered once the line after it shows it is not continued.
    ///
    /// `value` is empty for a header line without a colon or without a value.
    fn parsed_header(&mut self, name: &str, value: &str) -> bool;

    /// The checked `Host` header of a request, before its generic field event.
    fn parsed_host_header(&mut self, host: &str, port: Option<u16>) -> bool {
        false
    }

    /// The header section ended.
    fn header_complete(&mut self) -> bool;

    /// A slice of the body, borrowed from the buffer being parsed.
    fn content(&mut self, chunk: &[u8]) -> bool;

    /// A trailer field after the last chunk, only when trailer parsing is enabled.
    fn parsed_trailer(&mut self, name: &str, value: &str) -> bool {
        false
    }

    /// The current message is fully delimited.
    fn message_complete(&mut self) -> bool;

    /// The input ended in the middle of a message.
    fn early_eof(&mut self);

    /// The message is malformed or too large. The parser is closed afterwards.
    fn bad_message(&mut self, error: &ParseError);

    /// Capacity of the per-connection header cache, `None` to use the parser config.
    fn header_cache_capacity(&self) -> Option<usize> {
        None
    }
}

impl<H: HttpHandler + ?Sized> HttpHandler for &mut H {
    fn start_request(&mut self, method: &Method, uri: &[u8], version: Option<Version>) -> bool {
        (**self).start_request(method, uri, version)
    }

    fn start_response(&mut self, version: Version, status: u16, reason: Option<&str>) -> bool {
        (**self).start_response(version, status, reason)
    }

    fn parsed_header(&mut self, name: &str, value: &str) -> bool {
        (**self).parsed_header(name, value)
    }

    fn parsed_host_header(&mut self, host: &str, port: Option<u16>) -> bool {
        (**self).parsed_host_header(host, port)
    }

    fn header_complete(&mut self) -> bool {
        (**self).header_complete()
    }

    fn content(&mut self, chunk: &[u8]) -> bool {
        (**self).content(chunk)
    }

    fn parsed_trailer(&mut self, name: &str, value: &str) -> bool {
        (**self).parsed_trailer(name, value)
    }

    fn message_complete(&mut self) -> bool {
        (**self).message_complete()
    }

    fn early_eof(&mut self) {
        (**self).early_eof();
    }

    fn bad_message(&mut self, error: &ParseError) {
        (**self).bad_message(error);
    }

    fn header_cache_capacity(&self) -> Option<usize> {
        (**self).header_cache_capacity()
    }
}
