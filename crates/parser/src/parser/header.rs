//! Header section: field lines, folding, well-known header semantics and the
//! decision on how the body is delimited.

use bytes::Buf;
use http::Version;
use tracing::{debug, trace};

use crate::cache::known::{self, KnownHeader, KnownValue};
use crate::handler::HttpHandler;
use crate::parser::{CacheState, HttpParser, LOOKAHEAD_MIN_BYTES, PendingField, StartLine, State};
use crate::protocol::{Framing, ParseError};
use crate::utils::{COLON, CR, LF, SPACE, TAB, ensure, push_latin1};

impl<H: HttpHandler> HttpParser<H> {
    /// Parses header lines until the header section ends or the buffer runs out.
    pub(super) fn parse_headers<B: Buf>(&mut self, buf: &mut B) -> Result<bool, ParseError> {
        let mut stop = false;

        while self.state < State::End && buf.has_remaining() && !stop {
            let ch = buf.get_u8();
            self.count_bytes(1)?;
            if self.skip_eol(ch) {
                continue;
            }

            match self.state {
                State::Header => match ch {
                    COLON | SPACE | TAB => self.begin_continuation()?,
                    _ => {
                        stop |= self.flush_field()?;
                        if ch == CR || ch == LF {
                            self.consume_crlf(ch, buf);
                            stop |= self.end_of_headers()?;
                        } else if !self.lookahead_field(ch, buf) {
                            self.string.clear();
                            push_latin1(&mut self.string, ch);
                            self.length = self.string.len();
                            self.set_state(State::HeaderInName);
                        }
                    }
                },

                State::HeaderName | State::HeaderInName => match ch {
                    CR | LF => {
                        self.consume_crlf(ch, buf);
                        self.complete_name();
                        self.set_state(State::Header);
                    }
                    COLON => {
                        self.complete_name();
                        self.string.clear();
                        self.length = 0;
                        self.set_state(State::HeaderValue);
                    }
                    SPACE | TAB => {
                        push_latin1(&mut self.string, ch);
                        if self.state == State::HeaderInName {
                            self.set_state(State::HeaderName);
                        }
                    }
                    _ => {
                        push_latin1(&mut self.string, ch);
                        self.length = self.string.len();
                        if self.state == State::HeaderName {
                            self.set_state(State::HeaderInName);
                        }
                    }
                },

                State::HeaderValue => match ch {
                    CR | LF => {
                        self.consume_crlf(ch, buf);
                        self.complete_value();
                        self.set_state(State::Header);
                    }
                    SPACE | TAB => {
                        if !self.fold && !self.string.is_empty() {
                            push_latin1(&mut self.string, ch);
                        }
                    }
                    _ => {
                        if self.fold && !self.string.is_empty() {
                            self.string.push(' ');
                        }
                        self.fold = false;
                        self.field.cached = false;
                        push_latin1(&mut self.string, ch);
                        self.length = self.string.len();
                        self.set_state(State::HeaderInValue);
                    }
                },

                State::HeaderInValue => match ch {
                    CR | LF => {
                        self.consume_crlf(ch, buf);
                        self.complete_value();
                        self.set_state(State::Header);
                    }
                    SPACE | TAB => {
                        push_latin1(&mut self.string, ch);
                        self.set_state(State::HeaderValue);
                    }
                    _ => {
                        self.field.cached = false;
                        push_latin1(&mut self.string, ch);
                        self.length = self.string.len();
                    }
                },

                state => unreachable!("{state:?} is not a header state"),
            }
        }

        Ok(stop)
    }

    /// Consumes the rest of a line terminator within the byte budget.
    ///
    /// A CR may be followed by its LF or by further CRs; anything else is left for
    /// the state machine.
    pub(super) fn consume_crlf<B: Buf>(&mut self, ch: u8, buf: &mut B) {
        self.eol = Some(ch);
        while self.eol == Some(CR) && buf.has_remaining() && self.fits(1) {
            match buf.chunk()[0] {
                LF => {
                    buf.advance(1);
                    self.header_bytes += 1;
                    self.eol = None;
                }
                CR => {
                    buf.advance(1);
                    self.header_bytes += 1;
                }
                _ => break,
            }
        }
    }

    /// Matches a complete field line, or else a known name, at the start of a line.
    fn lookahead_field<B: Buf>(&mut self, first: u8, buf: &mut B) -> bool {
        let chunk = buf.chunk();
        if chunk.len() + 1 < LOOKAHEAD_MIN_BYTES {
            return false;
        }

        let cached = match &self.field_cache {
            CacheState::Active(cache) => cache.best(known::lookahead_input(first, chunk)),
            CacheState::Unset | CacheState::Disabled => None,
        };
        if let Some((len, field)) = cached.or_else(|| known::lookahead_field(known::lookahead_input(first, chunk)))
            && self.fits(len - 1)
        {
            self.field = PendingField {
                header: Some(field.header()),
                name: Some(field.name().to_owned()),
                value: None,
                cached: true,
            };
            self.string.clear();
            self.string.push_str(field.value());
            self.length = self.string.len();
            buf.advance(len - 1);
            self.header_bytes += len - 1;
            self.set_state(State::HeaderInValue);
            return true;
        }

        if let Some((len, header)) = known::lookahead_header(known::lookahead_input(first, chunk))
            && self.fits(len - 1)
        {
            self.string.clear();
            self.string.push_str(header.as_str());
            self.length = self.string.len();
            buf.advance(len - 1);
            self.header_bytes += len - 1;
            self.set_state(State::HeaderInName);
            return true;
        }

        false
    }

    /// A line starting with white space continues the value of the pending field.
    fn begin_continuation(&mut self) -> Result<(), ParseError> {
        ensure!(self.field.name.is_some(), ParseError::BadContinuation);
        self.string.clear();
        if let Some(value) = self.field.value.take() {
            self.string.push_str(&value);
        }
        self.length = self.string.len();
        self.fold = true;
        self.field.cached = false;
        self.set_state(State::HeaderValue);
        Ok(())
    }

    fn complete_name(&mut self) {
        let name = self.string[..self.length].to_owned();
        self.field = PendingField { header: KnownHeader::from_name(&name), name: Some(name), value: None, cached: false };
    }

    fn complete_value(&mut self) {
        self.field.value = Some(self.string[..self.length].to_owned());
        self.fold = false;
    }

    /// Delivers the pending field, known-header handling first.
    fn flush_field(&mut self) -> Result<bool, ParseError> {
        let PendingField { header, name, value, cached } = std::mem::take(&mut self.field);
        let Some(name) = name else {
            return Ok(false);
        };
        let value = value.unwrap_or_default();

        let mut stop = false;
        if let Some(header) = header {
            stop |= self.handle_known_header(header, &name, &value, cached)?;
        }
        trace!(%name, %value, "header");
        stop |= self.handler.parsed_header(&name, &value);
        Ok(stop)
    }

    fn handle_known_header(&mut self, header: KnownHeader, name: &str, value: &str, cached: bool) -> Result<bool, ParseError> {
        let mut stop = false;
        let mut cacheable = header.is_connection_cacheable();

        match header {
            KnownHeader::ContentLength if !self.framing.is_chunked() => {
                let Ok(length) = value.parse::<i64>() else {
                    return Err(ParseError::bad_content_length(value));
                };
                match u64::try_from(length) {
                    Ok(length) if length > 0 => {
                        self.framing = Framing::ContentLength;
                        self.content_length = Some(length);
                    }
                    _ => {
                        self.framing = Framing::NoContent;
                        self.content_length = Some(0);
                    }
                }
            }

            KnownHeader::TransferEncoding => {
                let last = value.rsplit(',').next().map(str::trim).unwrap_or_default();
                if KnownValue::from_token(last) == Some(KnownValue::Chunked) {
                    self.framing = Framing::Chunked;
                } else if value.split(',').any(|token| KnownValue::from_token(token.trim()) == Some(KnownValue::Chunked)) {
                    return Err(ParseError::bad_chunking(value));
                }
            }

            KnownHeader::Host => {
                if let StartLine::Request { host: seen, .. } = &mut self.line {
                    *seen = true;
                    let (host, port) = parse_host(value)?;
                    stop |= self.handler.parsed_host_header(host, port);
                }
            }

            KnownHeader::Connection => {
                let close = value.split(',').any(|token| KnownValue::from_token(token.trim()) == Some(KnownValue::Close));
                if close && !matches!(self.field_cache, CacheState::Disabled) {
                    debug!("connection close, field cache disabled");
                    self.field_cache = CacheState::Disabled;
                }
                cacheable = false;
            }

            _ => {}
        }

        if cacheable
            && !cached
            && let CacheState::Active(cache) = &mut self.field_cache
            && cache.put(header, name, value)
        {
            trace!(%name, %value, "field cached");
        }

        Ok(stop)
    }

    /// The blank line after the headers: pick the body framing and fire the events.
    fn end_of_headers(&mut self) -> Result<bool, ParseError> {
        self.content_position = 0;

        match self.line {
            StartLine::Request { host, .. } => {
                let needs_host = self.version.is_some_and(|version| version >= Version::HTTP_11);
                ensure!(host || !needs_host, ParseError::NoHost);
                if !self.framing.is_known() {
                    self.framing = Framing::NoContent;
                }
            }
            StartLine::Response { status, .. } => {
                if self.head_response || status == 304 || status == 204 || status < 200 {
                    self.framing = Framing::NoContent;
                } else if !self.framing.is_known() {
                    self.framing = Framing::EofContent;
                }
            }
        }

        debug!(framing = ?self.framing, content_length = ?self.content_length, "header complete");

        let stop = match self.framing {
            Framing::EofContent => {
                self.set_state(State::EofContent);
                self.handler.header_complete()
            }
            Framing::ContentLength => {
                self.set_state(State::Content);
                self.handler.header_complete()
            }
            Framing::Chunked => {
                self.set_state(State::ChunkedContent);
                self.handler.header_complete()
            }
            Framing::NoContent | Framing::Unknown => {
                let mut stop = self.handler.header_complete();
                self.set_state(State::End);
                stop |= self.handler.message_complete();
                stop
            }
        };
        Ok(stop)
    }
}

/// Splits a `Host` value into host and optional port; brackets of an IPv6 literal are removed.
fn parse_host(value: &str) -> Result<(&str, Option<u16>), ParseError> {
    ensure!(!value.is_empty(), ParseError::bad_host(value));

    let (host, port) = match value.rfind([':', ']']) {
        Some(index) if value.as_bytes()[index] == COLON => {
            let port = &value[index + 1..];
            ensure!(!port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()), ParseError::bad_host(value));
            let Ok(port) = port.parse::<u16>() else {
                return Err(ParseError::bad_host(value));
            };
            (&value[..index], Some(port))
        }
        _ => (value, None),
    };

    match host.strip_prefix('[') {
        Some(literal) => match literal.strip_suffix(']') {
            Some(address) => Ok((address, port)),
            None => Err(ParseError::bad_ipv6_host(value)),
        },
        None => Ok((host, port)),
    }
}
