//! The incremental HTTP/1.x parser.
//!
//! [`HttpParser`] is a finite-state machine fed with whatever bytes the connection
//! happens to have. It consumes as much as it can, reports every recognized construct
//! to its [`HttpHandler`] and keeps enough state to resume on the next call, so message
//! boundaries never need to line up with buffer boundaries.
//!
//! # Example
//!
//! ```
//! use micro_http_parser::codec::EventCollector;
//! use micro_http_parser::parser::HttpParser;
//! use micro_http_parser::protocol::ParseEvent;
//!
//! let mut parser = HttpParser::request(EventCollector::new());
//!
//! let mut buf = &b"GET /index.html HTTP/1.1\r\nHost: localhost\r\n"[..];
//! parser.parse_next(&mut buf);
//! let mut buf = &b"\r\n"[..];
//! parser.parse_next(&mut buf);
//!
//! assert!(parser.is_complete());
//! let events = parser.handler_mut().drain();
//! assert_eq!(events.last(), Some(&ParseEvent::MessageComplete));
//! ```

mod body;
mod config;
mod header;
mod start_line;

use std::fmt;

use bytes::{Buf, BytesMut};
use http::{Method, Version};
use tracing::{debug, trace, warn};

use crate::cache::{FieldCache, KnownHeader};
use crate::handler::HttpHandler;
use crate::protocol::{Framing, ParseError};
use crate::utils::{CR, LF};

pub use config::{DEFAULT_HEADER_CACHE_CAPACITY, DEFAULT_MAX_HEADER_BYTES, ParserConfig};

const INITIAL_URI_LENGTH: usize = 256;

/// Fast paths only look at a chunk holding at least this many bytes from the
/// current position, counting the byte that was just consumed.
const LOOKAHEAD_MIN_BYTES: usize = 7;

/// Parser states.
///
/// The declaration order is significant: [`State::Start`] and [`State::End`] delimit the
/// header phase, and everything after `End` up to [`State::Closed`] is the body phase.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum State {
    Start,
    Method,
    ResponseVersion,
    Space1,
    Status,
    Uri,
    Space2,
    RequestVersion,
    Reason,
    Header,
    HeaderName,
    HeaderInName,
    HeaderValue,
    HeaderInValue,
    End,
    EofContent,
    Content,
    ChunkedContent,
    ChunkSize,
    ChunkParams,
    Chunk,
    ChunkTrailer,
    Closed,
}

/// Coarse classification of [`State`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Between messages, or after a message completed
    Idle,
    /// Inside the start line or header section
    Headers,
    /// Inside the body
    Content,
    /// Terminal until [`HttpParser::reset`]
    Closed,
}

/// Which side of the exchange the parser decodes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    Request,
    Response,
}

/// Start-line context of the message being parsed.
#[derive(Debug, Clone)]
enum StartLine {
    Request {
        /// Valid once the parser left [`State::Method`]
        method: Method,
        /// A `Host` header was seen
        host: bool,
    },
    Response {
        status: u16,
        digits: u8,
    },
}

impl StartLine {
    fn new(mode: Mode) -> Self {
        match mode {
            Mode::Request => StartLine::Request { method: Method::GET, host: false },
            Mode::Response => StartLine::Response { status: 0, digits: 0 },
        }
    }

    fn mode(&self) -> Mode {
        match self {
            StartLine::Request { .. } => Mode::Request,
            StartLine::Response { .. } => Mode::Response,
        }
    }

    fn status(&self) -> u16 {
        match self {
            StartLine::Request { .. } => 0,
            StartLine::Response { status, .. } => *status,
        }
    }
}

/// The header field waiting for the next line to show whether it is continued.
#[derive(Debug, Default)]
struct PendingField {
    header: Option<KnownHeader>,
    name: Option<String>,
    value: Option<String>,
    /// Name and value were taken verbatim from a cache hit
    cached: bool,
}

#[derive(Debug)]
enum CacheState {
    Unset,
    Active(FieldCache),
    /// A `Connection: close` was seen; nothing is cached for the rest of the connection
    Disabled,
}

/// An incremental, non-blocking HTTP/1.x parser.
///
/// One instance serves one connection and is driven by one caller at a time. Call
/// [`parse_next`](Self::parse_next) whenever bytes arrive, [`reset`](Self::reset) between
/// messages, and [`shutdown_input`](Self::shutdown_input) or [`close`](Self::close) when the
/// input ends.
#[derive(Debug)]
pub struct HttpParser<H> {
    handler: H,
    config: ParserConfig,
    state: State,
    line: StartLine,
    version: Option<Version>,
    uri: BytesMut,
    /// Token being accumulated, one char per input byte
    string: String,
    /// Length of `string` up to its last non-whitespace char
    length: usize,
    field: PendingField,
    /// A continuation line started; a single space is due before its first char
    fold: bool,
    eol: Option<u8>,
    framing: Framing,
    content_length: Option<u64>,
    content_position: u64,
    chunk_length: u64,
    chunk_position: u64,
    header_bytes: usize,
    head_response: bool,
    field_cache: CacheState,
    closed_warned: bool,
}

impl<H: HttpHandler> HttpParser<H> {
    /// Creates a parser for requests with the default [`ParserConfig`].
    pub fn request(handler: H) -> Self {
        Self::with_config(handler, Mode::Request, ParserConfig::default())
    }

    /// Creates a parser for responses with the default [`ParserConfig`].
    pub fn response(handler: H) -> Self {
        Self::with_config(handler, Mode::Response, ParserConfig::default())
    }

    pub fn with_config(handler: H, mode: Mode, config: ParserConfig) -> Self {
        Self {
            handler,
            config,
            state: State::Start,
            line: StartLine::new(mode),
            version: None,
            uri: BytesMut::with_capacity(INITIAL_URI_LENGTH),
            string: String::new(),
            length: 0,
            field: PendingField::default(),
            fold: false,
            eol: None,
            framing: Framing::Unknown,
            content_length: None,
            content_position: 0,
            chunk_length: 0,
            chunk_position: 0,
            header_bytes: 0,
            head_response: false,
            field_cache: CacheState::Unset,
            closed_warned: false,
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.line.mode()
    }

    /// Marks the response being parsed as the answer to a HEAD request, so it has no body.
    ///
    /// Must be set before the end of the response headers is parsed.
    pub fn set_head_response(&mut self, head: bool) {
        self.head_response = head;
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Start | State::End => Phase::Idle,
            State::Closed => Phase::Closed,
            state if state < State::End => Phase::Headers,
            _ => Phase::Content,
        }
    }

    pub fn is_start(&self) -> bool {
        self.state == State::Start
    }

    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Start | State::End | State::Closed)
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, State::End | State::Closed)
    }

    pub fn in_header_state(&self) -> bool {
        self.state < State::End
    }

    pub fn in_content_state(&self) -> bool {
        self.state > State::End && self.state < State::Closed
    }

    pub fn is_chunking(&self) -> bool {
        self.framing.is_chunked()
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// The declared `Content-Length`, if one was parsed for this message.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Body bytes delivered so far for this message.
    pub fn content_read(&self) -> u64 {
        self.content_position
    }

    /// The request URI; valid until the next [`reset`](Self::reset).
    pub fn uri(&self) -> &[u8] {
        &self.uri
    }

    /// The per-connection field cache, if one is active.
    pub fn field_cache(&self) -> Option<&FieldCache> {
        match &self.field_cache {
            CacheState::Active(cache) => Some(cache),
            CacheState::Unset | CacheState::Disabled => None,
        }
    }

    /// Parses as much of `buf` as possible.
    ///
    /// Returns true if a handler callback asked to return early, or if the message
    /// turned out to be bad. Bytes after a completed message are left in `buf`.
    pub fn parse_next<B: Buf>(&mut self, buf: &mut B) -> bool {
        match self.try_parse_next(buf) {
            Ok(stop) => stop,
            Err(error) => {
                self.bad_message(buf, &error);
                true
            }
        }
    }

    fn try_parse_next<B: Buf>(&mut self, buf: &mut B) -> Result<bool, ParseError> {
        match self.state {
            State::Start => {
                self.begin_message();
                self.quick_start(buf)?;
            }
            State::Content if self.content_length == Some(self.content_position) => {
                self.set_state(State::End);
                return Ok(self.handler.message_complete());
            }
            State::End => return Ok(false),
            State::Closed => {
                self.discard(buf);
                return Ok(false);
            }
            _ => {}
        }

        if self.state < State::Header && self.parse_line(buf)? {
            return Ok(true);
        }

        if self.state < State::End && self.parse_headers(buf)? {
            return Ok(true);
        }

        self.parse_content(buf)
    }

    /// Signals that the peer will send nothing more.
    ///
    /// Completes a close-delimited body; in the middle of any other message this fires
    /// `early_eof` and then `message_complete`. Either way the parser is closed
    /// afterwards. Between messages this does nothing. Returns the stop signal of
    /// `message_complete`.
    pub fn shutdown_input(&mut self) -> bool {
        debug!(parser = %self, "shutdown input");

        let stop = match self.state {
            State::Start | State::End | State::Closed => return false,
            State::EofContent => self.handler.message_complete(),
            _ => {
                if !self.head_response {
                    self.handler.early_eof();
                }
                self.handler.message_complete()
            }
        };
        self.set_state(State::Closed);
        stop
    }

    /// Terminates the parser; only [`reset`](Self::reset) makes it usable again.
    pub fn close(&mut self) {
        debug!(parser = %self, "close");

        match self.state {
            State::Start | State::End | State::Closed => {}
            State::EofContent => {
                self.handler.message_complete();
            }
            _ => {
                self.handler.early_eof();
                self.handler.message_complete();
            }
        }

        self.set_state(State::Closed);
        self.framing = Framing::Unknown;
        self.content_length = None;
        self.content_position = 0;
        self.line = StartLine::new(self.line.mode());
        self.header_bytes = 0;
    }

    /// Prepares for the next message on the same connection.
    ///
    /// Message state is cleared; the per-connection field cache is kept.
    pub fn reset(&mut self) {
        debug!(parser = %self, "reset");

        self.set_state(State::Start);
        self.line = StartLine::new(self.line.mode());
        self.version = None;
        self.uri.clear();
        self.string.clear();
        self.length = 0;
        self.field = PendingField::default();
        self.fold = false;
        self.framing = Framing::Unknown;
        self.content_length = None;
        self.content_position = 0;
        self.chunk_length = 0;
        self.chunk_position = 0;
        self.header_bytes = 0;
        self.closed_warned = false;
    }

    /// Clears what a previous message may have left behind while parsing from `Start`.
    fn begin_message(&mut self) {
        self.version = None;
        self.line = StartLine::new(self.line.mode());
        self.framing = Framing::Unknown;
        self.field = PendingField::default();
        self.fold = false;
    }

    fn set_state(&mut self, state: State) {
        trace!(from = ?self.state, to = ?state, "parser state");
        self.state = state;
    }

    fn bad_message<B: Buf>(&mut self, buf: &mut B, error: &ParseError) {
        warn!(status = %error.status(), cause = %error, parser = %self, "bad message");
        buf.advance(buf.remaining());
        self.set_state(State::Closed);
        self.handler.bad_message(error);
    }

    fn discard<B: Buf>(&mut self, buf: &mut B) {
        let len = buf.remaining();
        if len == 0 {
            return;
        }
        self.header_bytes += len;
        if !self.closed_warned && self.config.max_header_bytes().is_some_and(|max| self.header_bytes > max) {
            warn!(len, total = self.header_bytes, "data received when closed");
            self.closed_warned = true;
        }
        buf.advance(len);
    }

    /// Accounts for consumed start-line or header bytes.
    fn count_bytes(&mut self, n: usize) -> Result<(), ParseError> {
        self.header_bytes += n;
        match self.config.max_header_bytes() {
            Some(max) if self.header_bytes > max => Err(self.limit_error(max)),
            _ => Ok(()),
        }
    }

    fn limit_error(&self, max: usize) -> ParseError {
        match (self.state, self.line.mode()) {
            (State::Uri, _) => {
                warn!(max, "uri is too large");
                ParseError::UriTooLong { max_size: max }
            }
            (_, Mode::Request) => {
                warn!(max, "request is too large");
                ParseError::too_large_header(self.header_bytes, max)
            }
            (_, Mode::Response) => {
                warn!(max, "response is too large");
                ParseError::too_large_header(self.header_bytes, max)
            }
        }
    }

    /// Whether `n` more bytes still fit the budget.
    ///
    /// Fast paths only run when they do, so an overflow is always reported by the
    /// byte-at-a-time path, at the same byte and in the same state.
    fn fits(&self, n: usize) -> bool {
        self.config.max_header_bytes().is_none_or(|max| self.header_bytes + n <= max)
    }

    fn remaining_budget(&self) -> usize {
        self.config.max_header_bytes().map_or(usize::MAX, |max| max.saturating_sub(self.header_bytes))
    }

    /// Skips the LF of a CR LF pair, or a repeated CR, split from its line.
    fn skip_eol(&mut self, ch: u8) -> bool {
        if self.eol == Some(CR) && (ch == LF || ch == CR) {
            self.eol = Some(ch);
            return true;
        }
        self.eol = None;
        false
    }

    fn enable_field_cache(&mut self) {
        if matches!(self.field_cache, CacheState::Unset) {
            let capacity = self.handler.header_cache_capacity().unwrap_or(self.config.header_cache_capacity());
            if capacity > 0 {
                trace!(capacity, "enable per-connection field cache");
                self.field_cache = CacheState::Active(FieldCache::with_capacity(capacity));
            }
        }
    }
}

impl<H> fmt::Display for HttpParser<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.content_length {
            Some(length) => write!(f, "HttpParser{{s={:?},{} of {}}}", self.state, self.content_position, length),
            None => write!(f, "HttpParser{{s={:?},{} of -1}}", self.state, self.content_position),
        }
    }
}

#[cfg(test)]
mod tests;
