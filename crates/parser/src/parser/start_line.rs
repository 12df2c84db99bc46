//! Request line and status line.

use bytes::{Buf, BufMut};
use http::{Method, Version};
use tracing::debug;

use crate::cache::known;
use crate::handler::HttpHandler;
use crate::parser::{HttpParser, Mode, StartLine, State};
use crate::protocol::ParseError;
use crate::utils::{CR, LF, SPACE, TAB, ensure, is_control, is_token_byte, push_latin1};

impl<H: HttpHandler> HttpParser<H> {
    /// Skips white space before the start line and recognizes its first token.
    ///
    /// A known method (request) or version (response) at the front of the active chunk
    /// is consumed in one step.
    pub(super) fn quick_start<B: Buf>(&mut self, buf: &mut B) -> Result<(), ParseError> {
        while self.state == State::Start && buf.has_remaining() {
            if let Some(len) = self.lookahead_start(buf.chunk()) {
                buf.advance(len);
                self.header_bytes += len;
                self.eol = None;
                self.set_state(State::Space1);
                return Ok(());
            }

            let ch = buf.get_u8();
            self.count_bytes(1)?;
            if self.skip_eol(ch) || !is_token_byte(ch) {
                continue;
            }

            self.string.clear();
            push_latin1(&mut self.string, ch);
            match self.line.mode() {
                Mode::Request => self.set_state(State::Method),
                Mode::Response => self.set_state(State::ResponseVersion),
            }
        }
        Ok(())
    }

    fn lookahead_start(&mut self, chunk: &[u8]) -> Option<usize> {
        match self.line.mode() {
            Mode::Request => {
                let (len, method) = known::lookahead_method(chunk.iter().copied())?;
                if !self.fits(len) {
                    return None;
                }
                self.line = StartLine::Request { method: method.clone(), host: false };
                Some(len)
            }
            Mode::Response => {
                let (len, version) = known::lookahead_version(chunk.iter().copied())?;
                if chunk.get(len) != Some(&SPACE) || !self.fits(len + 1) {
                    return None;
                }
                self.version = Some(version);
                Some(len + 1)
            }
        }
    }

    /// Parses the start line after its first byte, up to the state `Header`.
    pub(super) fn parse_line<B: Buf>(&mut self, buf: &mut B) -> Result<bool, ParseError> {
        let mut stop = false;

        while self.state < State::Header && buf.has_remaining() && !stop {
            let ch = buf.get_u8();
            self.count_bytes(1)?;
            if self.skip_eol(ch) {
                continue;
            }

            match self.state {
                State::Method => match ch {
                    SPACE => {
                        let Ok(method) = Method::from_bytes(self.string.as_bytes()) else {
                            return Err(ParseError::bad_method(&self.string));
                        };
                        self.line = StartLine::Request { method, host: false };
                        self.set_state(State::Space1);
                    }
                    _ if is_control(ch) => return Err(ParseError::NoUri),
                    _ => push_latin1(&mut self.string, ch),
                },

                State::ResponseVersion => match ch {
                    SPACE => {
                        let version = known::version(&self.string)
                            .ok_or_else(|| ParseError::unknown_version(&self.string))?;
                        self.version = Some(version);
                        self.set_state(State::Space1);
                    }
                    _ if is_control(ch) => return Err(ParseError::NoStatus),
                    _ => push_latin1(&mut self.string, ch),
                },

                State::Space1 => match (self.line.mode(), ch) {
                    (_, SPACE | TAB) => {}
                    (Mode::Response, _) => {
                        ensure!(ch.is_ascii_digit(), ParseError::BadStatus);
                        self.line = StartLine::Response { status: u16::from(ch - b'0'), digits: 1 };
                        self.set_state(State::Status);
                    }
                    (Mode::Request, _) if is_control(ch) => return Err(ParseError::NoUri),
                    (Mode::Request, _) => {
                        self.uri.clear();
                        self.uri.put_u8(ch);
                        self.set_state(State::Uri);
                        self.scan_uri(buf);
                    }
                },

                State::Status => match ch {
                    SPACE => {
                        self.check_status()?;
                        self.set_state(State::Space2);
                    }
                    _ if ch.is_ascii_digit() => {
                        if let StartLine::Response { status, digits } = &mut self.line {
                            ensure!(*digits < 3, ParseError::BadStatus);
                            *status = *status * 10 + u16::from(ch - b'0');
                            *digits += 1;
                        }
                    }
                    _ if is_control(ch) => {
                        self.check_status()?;
                        self.eol = Some(ch);
                        self.set_state(State::Header);
                        stop |= self.begin_response(None);
                    }
                    _ => return Err(ParseError::BadStatus),
                },

                State::Uri => match ch {
                    SPACE => self.set_state(State::Space2),
                    _ if is_control(ch) => stop |= self.begin_http09(ch),
                    _ => {
                        self.uri.put_u8(ch);
                        self.scan_uri(buf);
                    }
                },

                State::Space2 => match (self.line.mode(), ch) {
                    (_, SPACE | TAB) => {}
                    (Mode::Response, _) if is_control(ch) => {
                        self.eol = Some(ch);
                        self.set_state(State::Header);
                        stop |= self.begin_response(None);
                    }
                    (Mode::Request, _) if is_control(ch) => stop |= self.begin_http09(ch),
                    (Mode::Response, _) => {
                        self.string.clear();
                        push_latin1(&mut self.string, ch);
                        self.length = self.string.len();
                        self.set_state(State::Reason);
                    }
                    (Mode::Request, _) => {
                        self.string.clear();
                        push_latin1(&mut self.string, ch);
                        self.set_state(State::RequestVersion);
                        if let Some(stopped) = self.lookahead_request_version(ch, buf) {
                            stop |= stopped;
                        }
                    }
                },

                State::RequestVersion => match ch {
                    CR | LF => {
                        let version = known::version(&self.string)
                            .ok_or_else(|| ParseError::unknown_version(&self.string))?;
                        self.eol = Some(ch);
                        self.set_state(State::Header);
                        stop |= self.begin_request(version);
                    }
                    _ => push_latin1(&mut self.string, ch),
                },

                State::Reason => match ch {
                    CR | LF => {
                        self.eol = Some(ch);
                        self.set_state(State::Header);
                        let version = self.version.unwrap_or_default();
                        let status = self.line.status();
                        stop |= self.handler.start_response(version, status, Some(&self.string[..self.length]));
                    }
                    SPACE | TAB => push_latin1(&mut self.string, ch),
                    _ => {
                        push_latin1(&mut self.string, ch);
                        self.length = self.string.len();
                    }
                },

                state => unreachable!("{state:?} is not a start line state"),
            }
        }

        Ok(stop)
    }

    /// Copies the run of URI bytes at the front of the active chunk, within the byte budget.
    fn scan_uri<B: Buf>(&mut self, buf: &mut B) {
        let budget = self.remaining_budget();
        let chunk = buf.chunk();
        let len = chunk.iter().take(budget).take_while(|ch| is_token_byte(**ch)).count();
        if len == 0 {
            return;
        }
        self.uri.extend_from_slice(&chunk[..len]);
        buf.advance(len);
        self.header_bytes += len;
    }

    /// Recognizes a known version right after its first byte, up to and including the
    /// line terminator. Returns the stop signal of the request event on a hit.
    fn lookahead_request_version<B: Buf>(&mut self, first: u8, buf: &mut B) -> Option<bool> {
        let chunk = buf.chunk();
        if chunk.len() + 1 < super::LOOKAHEAD_MIN_BYTES {
            return None;
        }
        let (len, version) = known::lookahead_version(known::lookahead_input(first, chunk))?;
        let eol = *chunk.get(len - 1)?;
        if !(eol == CR || eol == LF) || !self.fits(len) {
            return None;
        }

        buf.advance(len);
        self.header_bytes += len;
        self.eol = Some(eol);
        self.set_state(State::Header);
        Some(self.begin_request(version))
    }

    fn check_status(&self) -> Result<(), ParseError> {
        match self.line {
            StartLine::Response { status, digits: 3 } if status >= 100 => Ok(()),
            _ => Err(ParseError::BadStatus),
        }
    }

    fn begin_request(&mut self, version: Version) -> bool {
        self.version = Some(version);
        if version >= Version::HTTP_11 {
            self.enable_field_cache();
        }
        let StartLine::Request { method, .. } = &self.line else {
            return false;
        };
        debug!(%method, ?version, "request line");
        self.handler.start_request(method, &self.uri, Some(version))
    }

    fn begin_response(&mut self, reason: Option<&str>) -> bool {
        let version = self.version.unwrap_or_default();
        let status = self.line.status();
        debug!(?version, status, "status line");
        self.handler.start_response(version, status, reason)
    }

    /// A request line ending right after the URI: no version, no headers, no body.
    fn begin_http09(&mut self, ch: u8) -> bool {
        self.eol = Some(ch);
        self.set_state(State::End);
        let StartLine::Request { method, .. } = &self.line else {
            return false;
        };
        debug!(%method, "HTTP/0.9 request");
        let mut stop = self.handler.start_request(method, &self.uri, None);
        stop |= self.handler.header_complete();
        stop |= self.handler.message_complete();
        stop
    }
}
