//! Message body: fixed length, close-delimited and chunked, plus optional trailers.

use bytes::Buf;
use tracing::trace;

use crate::handler::HttpHandler;
use crate::parser::{HttpParser, State};
use crate::protocol::ParseError;
use crate::utils::{CR, LF, SEMI_COLON, SPACE, push_latin1};

impl<H: HttpHandler> HttpParser<H> {
    /// Delivers body bytes as slices of the active chunk.
    pub(super) fn parse_content<B: Buf>(&mut self, buf: &mut B) -> Result<bool, ParseError> {
        while self.state > State::End && buf.has_remaining() {
            let ch = buf.chunk()[0];
            if self.skip_eol(ch) {
                buf.advance(1);
                if self.state == State::ChunkTrailer {
                    self.count_bytes(1)?;
                }
                continue;
            }

            match self.state {
                State::EofContent => {
                    let chunk = buf.chunk();
                    let len = chunk.len();
                    self.content_position += len as u64;
                    let stop = self.handler.content(chunk);
                    buf.advance(len);
                    if stop {
                        return Ok(true);
                    }
                }

                State::Content => {
                    let remaining = self.content_length.unwrap_or(0).saturating_sub(self.content_position);
                    if remaining == 0 {
                        self.set_state(State::End);
                        return Ok(self.handler.message_complete());
                    }

                    let chunk = buf.chunk();
                    let len = chunk.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
                    self.content_position += len as u64;
                    let stop = self.handler.content(&chunk[..len]);
                    buf.advance(len);
                    if stop {
                        return Ok(true);
                    }

                    if self.content_length == Some(self.content_position) {
                        self.set_state(State::End);
                        return Ok(self.handler.message_complete());
                    }
                }

                State::ChunkedContent => {
                    buf.advance(1);
                    match ch {
                        CR | LF => self.eol = Some(ch),
                        _ if ch <= SPACE => {}
                        _ => {
                            self.chunk_length = chunk_digit(ch)?;
                            self.chunk_position = 0;
                            self.set_state(State::ChunkSize);
                        }
                    }
                }

                State::ChunkSize => {
                    buf.advance(1);
                    match ch {
                        CR | LF => {
                            self.eol = Some(ch);
                            if self.end_of_chunk_line(ch, buf) {
                                return Ok(true);
                            }
                        }
                        SEMI_COLON => self.set_state(State::ChunkParams),
                        _ if ch <= SPACE => self.set_state(State::ChunkParams),
                        _ => {
                            self.chunk_length = self
                                .chunk_length
                                .checked_mul(16)
                                .and_then(|length| length.checked_add(chunk_digit(ch).ok()?))
                                .ok_or_else(|| overflow_or_bad_char(ch))?;
                        }
                    }
                }

                State::ChunkParams => {
                    buf.advance(1);
                    if ch == CR || ch == LF {
                        self.eol = Some(ch);
                        if self.end_of_chunk_line(ch, buf) {
                            return Ok(true);
                        }
                    }
                }

                State::Chunk => {
                    let remaining = self.chunk_length - self.chunk_position;
                    if remaining == 0 {
                        self.set_state(State::ChunkedContent);
                        continue;
                    }

                    let chunk = buf.chunk();
                    let len = chunk.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
                    self.content_position += len as u64;
                    self.chunk_position += len as u64;
                    let stop = self.handler.content(&chunk[..len]);
                    buf.advance(len);
                    if stop {
                        return Ok(true);
                    }
                }

                State::ChunkTrailer => {
                    buf.advance(1);
                    self.count_bytes(1)?;
                    if self.parse_trailer_byte(ch, buf) {
                        return Ok(true);
                    }
                }

                State::Closed => {
                    self.discard(buf);
                    return Ok(false);
                }

                state => unreachable!("{state:?} is not a content state"),
            }
        }

        Ok(false)
    }

    /// The size line of a chunk ended: a chunk follows, or the body is done.
    fn end_of_chunk_line<B: Buf>(&mut self, ch: u8, buf: &mut B) -> bool {
        if self.chunk_length > 0 {
            trace!(chunk_length = self.chunk_length, "chunk");
            self.set_state(State::Chunk);
            return false;
        }

        if ch == CR && buf.has_remaining() && buf.chunk()[0] == LF {
            buf.advance(1);
            self.eol = Some(LF);
        }

        if self.config.parse_trailers() {
            self.string.clear();
            self.set_state(State::ChunkTrailer);
            false
        } else {
            self.set_state(State::End);
            self.handler.message_complete()
        }
    }

    /// Accumulates trailer lines; a blank line completes the message.
    fn parse_trailer_byte<B: Buf>(&mut self, ch: u8, buf: &mut B) -> bool {
        if ch != CR && ch != LF {
            push_latin1(&mut self.string, ch);
            return false;
        }

        if self.string.is_empty() {
            self.consume_crlf(ch, buf);
            self.set_state(State::End);
            return self.handler.message_complete();
        }

        self.eol = Some(ch);
        let line = std::mem::take(&mut self.string);
        let (name, value) = match line.split_once(':') {
            Some((name, value)) => (name.trim(), value.trim()),
            None => (line.trim(), ""),
        };
        trace!(%name, %value, "trailer");
        self.handler.parsed_trailer(name, value)
    }
}

fn chunk_digit(ch: u8) -> Result<u64, ParseError> {
    match ch {
        b'0'..=b'9' => Ok(u64::from(ch - b'0')),
        b'a'..=b'f' => Ok(u64::from(ch - b'a' + 10)),
        b'A'..=b'F' => Ok(u64::from(ch - b'A' + 10)),
        _ => Err(ParseError::BadChunkChar { byte: ch }),
    }
}

fn overflow_or_bad_char(ch: u8) -> ParseError {
    match chunk_digit(ch) {
        Ok(_) => ParseError::ChunkSizeOverflow,
        Err(error) => error,
    }
}
