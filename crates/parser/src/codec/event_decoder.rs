//! Adapts [`HttpParser`] to [`tokio_util::codec::Decoder`].
//!
//! The decoder yields one [`ParseEvent`] per call and resets the parser after every
//! completed message, so a `FramedRead` over a connection produces the events of all
//! pipelined messages in order.
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use micro_http_parser::codec::EventDecoder;
//! use micro_http_parser::protocol::ParseEvent;
//! use tokio_util::codec::Decoder;
//!
//! let mut decoder = EventDecoder::request();
//! let mut buffer = BytesMut::from(&b"GET / HTTP/1.0\r\n\r\n"[..]);
//!
//! let mut events = Vec::new();
//! while let Some(event) = decoder.decode(&mut buffer).unwrap() {
//!     events.push(event);
//! }
//! assert_eq!(events.last(), Some(&ParseEvent::MessageComplete));
//! ```

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::EventCollector;
use crate::parser::{HttpParser, Mode, ParserConfig, State};
use crate::protocol::{DecodeError, ParseEvent};

/// Decodes a byte stream into [`ParseEvent`]s.
#[derive(Debug)]
pub struct EventDecoder {
    parser: HttpParser<EventCollector>,
}

impl EventDecoder {
    /// Creates a decoder for requests with the default [`ParserConfig`].
    pub fn request() -> Self {
        Self::with_config(Mode::Request, ParserConfig::default())
    }

    /// Creates a decoder for responses with the default [`ParserConfig`].
    pub fn response() -> Self {
        Self::with_config(Mode::Response, ParserConfig::default())
    }

    pub fn with_config(mode: Mode, config: ParserConfig) -> Self {
        Self { parser: HttpParser::with_config(EventCollector::new(), mode, config) }
    }

    /// Responses decoded from now on answer HEAD requests and carry no body.
    pub fn set_head_response(&mut self, head: bool) {
        self.parser.set_head_response(head);
    }

    pub fn parser(&self) -> &HttpParser<EventCollector> {
        &self.parser
    }
}

impl Decoder for EventDecoder {
    type Item = ParseEvent;
    type Error = DecodeError;

    /// Returns the next event, or `Ok(None)` when more input is needed.
    ///
    /// A malformed message is returned as an error once; the parser discards
    /// everything after it.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if let Some(event) = self.parser.handler_mut().pop_event() {
                return Ok(Some(event));
            }
            if let Some(error) = self.parser.handler_mut().take_error() {
                return Err(error.into());
            }

            if self.parser.state() == State::End {
                trace!("message complete, reset parser for the next message");
                self.parser.reset();
            }

            let remaining = src.len();
            self.parser.parse_next(src);
            if src.len() == remaining && self.parser.handler().is_empty() {
                return Ok(None);
            }
        }
    }

    /// Lets the parser know the input ended, then drains the remaining events.
    ///
    /// A message cut short by the end of input closes the parser for good.
    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(event) = self.decode(buf)? {
            return Ok(Some(event));
        }

        self.parser.shutdown_input();
        Ok(self.parser.handler_mut().pop_event())
    }
}
