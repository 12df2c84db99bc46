//! An incremental, non-blocking HTTP/1.x parser
//!
//! This crate parses HTTP/1.0 and HTTP/1.1 requests and responses (plus HTTP/0.9 simple
//! requests) from whatever bytes a connection happens to deliver. It never blocks and
//! never waits for a complete message: every call consumes as much input as it can and
//! reports each recognized construct as an event to a caller-supplied handler.
//!
//! # Features
//!
//! - Push parsing over any [`bytes::Buf`], including chained buffers
//! - Request and response start lines, header folding, ISO-8859-1 header text
//! - Fixed-length, close-delimited and chunked bodies, with optional trailers
//! - Start-line and header byte budget with 413 / 414 classification
//! - Per-connection cache of repeated header fields for keep-alive connections
//! - A [`tokio_util::codec::Decoder`] adapter yielding owned events
//!
//! # Example
//!
//! ```
//! use micro_http_parser::handler::HttpHandler;
//! use micro_http_parser::parser::HttpParser;
//! use micro_http_parser::protocol::ParseError;
//!
//! #[derive(Default)]
//! struct Counter {
//!     headers: usize,
//!     body: usize,
//!     complete: bool,
//! }
//!
//! impl HttpHandler for Counter {
//!     fn parsed_header(&mut self, _name: &str, _value: &str) -> bool {
//!         self.headers += 1;
//!         false
//!     }
//!
//!     fn header_complete(&mut self) -> bool {
//!         false
//!     }
//!
//!     fn content(&mut self, chunk: &[u8]) -> bool {
//!         self.body += chunk.len();
//!         false
//!     }
//!
//!     fn message_complete(&mut self) -> bool {
//!         self.complete = true;
//!         true
//!     }
//!
//!     fn early_eof(&mut self) {}
//!
//!     fn bad_message(&mut self, _error: &ParseError) {}
//! }
//!
//! let mut parser = HttpParser::request(Counter::default());
//! for mut fragment in [&b"POST /form HTTP/1.1\r\nHost: local"[..], b"host\r\nContent-Length: 3\r\n\r\nab", b"c"] {
//!     parser.parse_next(&mut fragment);
//! }
//!
//! let counter = parser.into_handler();
//! assert_eq!(counter.headers, 2);
//! assert_eq!(counter.body, 3);
//! assert!(counter.complete);
//! ```
//!
//! # Architecture
//!
//! - [`parser`]: the state machine, its configuration and lifecycle
//! - [`handler`]: the callback trait the parser reports to
//! - [`protocol`]: framing, owned events and error types
//! - [`cache`]: well-known token tables and the per-connection field cache
//! - [`codec`]: an event-collecting handler and a `tokio_util` decoder built on it
//!
//! # Error Handling
//!
//! A malformed or oversized message is reported once through
//! [`handler::HttpHandler::bad_message`] with a [`protocol::ParseError`] that carries the
//! status code a server should answer with. The parser is closed afterwards and discards
//! further input until it is reset.
//!
//! # Limitations
//!
//! - No HTTP/2 or HTTP/3 framing
//! - No message object is built; consumers assemble what they need from the events
//! - Body content is passed through as-is, no decompression

pub mod cache;
pub mod codec;
pub mod handler;
pub mod parser;
pub mod protocol;

mod utils;
