use bytes::{Buf, Bytes};
use http::{Method, Version};
use indoc::indoc;

use crate::codec::EventCollector;
use crate::handler::HttpHandler;
use crate::parser::{HttpParser, Mode, ParserConfig, Phase, State};
use crate::protocol::{Framing, ParseError, ParseEvent};

/// Feeds `buf` until the parser stops making progress.
fn feed<B: Buf, H: HttpHandler>(parser: &mut HttpParser<H>, buf: &mut B) {
    loop {
        let remaining = buf.remaining();
        parser.parse_next(buf);
        if buf.remaining() == remaining {
            break;
        }
    }
}

/// Merges adjacent content events; body slices follow buffer boundaries.
fn coalesce(events: Vec<ParseEvent>) -> Vec<ParseEvent> {
    let mut merged: Vec<ParseEvent> = Vec::with_capacity(events.len());
    for event in events {
        match (merged.last_mut(), event) {
            (Some(ParseEvent::Content(previous)), ParseEvent::Content(next)) => {
                *previous = Bytes::from([previous.as_ref(), next.as_ref()].concat());
            }
            (_, event) => merged.push(event),
        }
    }
    merged
}

type Outcome = (Vec<ParseEvent>, Option<ParseError>, State);

fn parse_fragments(mode: Mode, config: ParserConfig, input: &[u8], size: usize) -> Outcome {
    let mut parser = HttpParser::with_config(EventCollector::new(), mode, config);
    for mut fragment in input.chunks(size) {
        feed(&mut parser, &mut fragment);
    }
    let state = parser.state();
    let collector = parser.handler_mut();
    (coalesce(collector.drain()), collector.take_error(), state)
}

fn parse_chained(mode: Mode, config: ParserConfig, input: &[u8], split: usize) -> Outcome {
    let mut parser = HttpParser::with_config(EventCollector::new(), mode, config);
    let mut buf = (&input[..split]).chain(&input[split..]);
    feed(&mut parser, &mut buf);
    let state = parser.state();
    let collector = parser.handler_mut();
    (coalesce(collector.drain()), collector.take_error(), state)
}

fn assert_fragmentation_invariant(mode: Mode, config: ParserConfig, input: &[u8]) -> Outcome {
    let whole = parse_fragments(mode, config, input, input.len());
    for size in 1..input.len() {
        assert_eq!(parse_fragments(mode, config, input, size), whole, "fragment size {size}");
    }
    for split in 0..=input.len() {
        assert_eq!(parse_chained(mode, config, input, split), whole, "chain split at {split}");
    }
    whole
}

const REQUEST: &str = indoc! {"
    GET /search?q=rust&lang=en HTTP/1.1\r
    Host: www.example.com:8080\r
    User-Agent: Mozilla/5.0 (X11; Linux x86_64)\r
    Accept: */*\r
    Accept-Encoding: gzip, deflate, br\r
    Accept-Language: en-US,en;q=0.5\r
    Cache-Control: no-cache\r
    Cookie: session=abc123; theme=dark\r
    X-Folded: first part\r
     second part\r
    Connection: keep-alive\r
    \r
"};

const CHUNKED_REQUEST: &str = indoc! {"
    POST /upload HTTP/1.1\r
    Host: localhost\r
    Content-Type: application/json\r
    Transfer-Encoding: chunked\r
    \r
    7;ext=1\r
    {\"a\":1}\r
    10\r
    0123456789abcdef\r
    0\r
    Checksum: feed\r
    \r
"};

const RESPONSE: &str = indoc! {"
    HTTP/1.1 200 OK\r
    Server: micro-http\r
    Content-Type: text/plain\r
    Content-Length: 12\r
    \r
    Hello World!"};

#[test]
fn request_events_do_not_depend_on_fragmentation() {
    let (events, error, state) = assert_fragmentation_invariant(Mode::Request, ParserConfig::default(), REQUEST.as_bytes());

    assert_eq!(error, None);
    assert_eq!(state, State::End);
    assert_eq!(
        events,
        vec![
            ParseEvent::RequestLine {
                method: Method::GET,
                uri: "/search?q=rust&lang=en".into(),
                version: Some(Version::HTTP_11)
            },
            ParseEvent::Host { host: "www.example.com".to_owned(), port: Some(8080) },
            header("Host", "www.example.com:8080"),
            header("User-Agent", "Mozilla/5.0 (X11; Linux x86_64)"),
            header("Accept", "*/*"),
            header("Accept-Encoding", "gzip, deflate, br"),
            header("Accept-Language", "en-US,en;q=0.5"),
            header("Cache-Control", "no-cache"),
            header("Cookie", "session=abc123; theme=dark"),
            header("X-Folded", "first part second part"),
            header("Connection", "keep-alive"),
            ParseEvent::HeaderComplete,
            ParseEvent::MessageComplete,
        ]
    );
}

#[test]
fn chunked_events_do_not_depend_on_fragmentation() {
    let config = ParserConfig::default().with_trailers(true);
    let (events, error, state) = assert_fragmentation_invariant(Mode::Request, config, CHUNKED_REQUEST.as_bytes());

    assert_eq!(error, None);
    assert_eq!(state, State::End);
    assert_eq!(
        &events[events.len() - 4..],
        &[
            ParseEvent::HeaderComplete,
            ParseEvent::Content(Bytes::from_static(b"{\"a\":1}0123456789abcdef")),
            ParseEvent::Trailer { name: "Checksum".to_owned(), value: "feed".to_owned() },
            ParseEvent::MessageComplete,
        ]
    );
}

#[test]
fn response_events_do_not_depend_on_fragmentation() {
    let (events, error, state) = assert_fragmentation_invariant(Mode::Response, ParserConfig::default(), RESPONSE.as_bytes());

    assert_eq!(error, None);
    assert_eq!(state, State::End);
    assert_eq!(
        events,
        vec![
            ParseEvent::StatusLine { version: Version::HTTP_11, status: 200, reason: Some("OK".to_owned()) },
            header("Server", "micro-http"),
            header("Content-Type", "text/plain"),
            header("Content-Length", "12"),
            ParseEvent::HeaderComplete,
            ParseEvent::Content(Bytes::from_static(b"Hello World!")),
            ParseEvent::MessageComplete,
        ]
    );
}

#[test]
fn lenient_line_ends_do_not_depend_on_fragmentation() {
    let input = b"GET /lf HTTP/1.0\nX-Lf: 1\nX-Cr: 2\r\r\nX-Last: 3\n\n";
    let (events, error, _) = assert_fragmentation_invariant(Mode::Request, ParserConfig::default(), input);

    assert_eq!(error, None);
    assert_eq!(
        events.into_iter().filter(|event| matches!(event, ParseEvent::Header { .. })).collect::<Vec<_>>(),
        vec![header("X-Lf", "1"), header("X-Cr", "2"), header("X-Last", "3")]
    );

    let input = b"POST / HTTP/1.0\r\nContent-Length: 3\r\n\r\r\nabc";
    let (events, error, state) = assert_fragmentation_invariant(Mode::Request, ParserConfig::default(), input);

    assert_eq!(error, None);
    assert_eq!(state, State::End);
    assert_eq!(
        &events[events.len() - 3..],
        &[ParseEvent::HeaderComplete, ParseEvent::Content(Bytes::from_static(b"abc")), ParseEvent::MessageComplete]
    );
}

#[test]
fn size_limit_does_not_depend_on_fragmentation() {
    for max in [20, 40, 60, 100, 200] {
        let config = ParserConfig::default().with_max_header_bytes(max);
        let (_, error, state) = assert_fragmentation_invariant(Mode::Request, config, REQUEST.as_bytes());
        assert_eq!(state, State::Closed, "limit {max}");
        match error {
            Some(ParseError::UriTooLong { max_size }) => assert_eq!(max_size, max),
            Some(ParseError::TooLargeHeader { current_size, max_size }) => {
                assert_eq!(max_size, max);
                assert_eq!(current_size, max + 1);
            }
            other => panic!("unexpected outcome {other:?} for limit {max}"),
        }
    }
}

#[test]
fn long_uri_is_414_and_large_header_is_413() {
    let config = ParserConfig::default().with_max_header_bytes(20);
    let (_, error, _) = parse_fragments(Mode::Request, config, REQUEST.as_bytes(), REQUEST.len());
    assert_eq!(error, Some(ParseError::UriTooLong { max_size: 20 }));

    let config = ParserConfig::default().with_max_header_bytes(100);
    let (_, error, _) = parse_fragments(Mode::Request, config, REQUEST.as_bytes(), REQUEST.len());
    assert_eq!(error, Some(ParseError::too_large_header(101, 100)));
}

#[test]
fn zero_budget_is_unlimited() {
    let config = ParserConfig::default().with_max_header_bytes(0);
    let input = format!("GET /{} HTTP/1.0\r\n\r\n", "a".repeat(20_000));
    let (events, error, state) = parse_fragments(Mode::Request, config, input.as_bytes(), 4096);
    assert_eq!(error, None);
    assert_eq!(state, State::End);
    assert!(matches!(&events[0], ParseEvent::RequestLine { uri, .. } if uri.len() == 20_001));
}

#[test]
fn reset_reuses_field_cache() {
    let mut parser = HttpParser::request(EventCollector::new());

    let mut buf = REQUEST.as_bytes();
    feed(&mut parser, &mut buf);
    let first = parser.handler_mut().drain();
    let cache = parser.field_cache().unwrap();
    // Host, User-Agent and Cookie; the others were well-known fields
    assert_eq!(cache.len(), 3);

    parser.reset();
    assert!(parser.is_start());

    let mut buf = REQUEST.as_bytes();
    feed(&mut parser, &mut buf);
    assert_eq!(parser.handler_mut().drain(), first);
    assert_eq!(parser.field_cache().unwrap().len(), 3);
}

#[test]
fn connection_close_disables_field_cache() {
    let mut parser = HttpParser::request(EventCollector::new());
    let mut buf = &b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n"[..];
    feed(&mut parser, &mut buf);
    assert_eq!(parser.state(), State::End);
    assert!(parser.field_cache().is_none());

    parser.reset();
    let mut buf = &b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n"[..];
    feed(&mut parser, &mut buf);
    assert_eq!(parser.state(), State::End);
    assert!(parser.field_cache().is_none());
}

#[test]
fn field_cache_needs_http11_and_capacity() {
    let mut parser = HttpParser::request(EventCollector::new());
    let mut buf = &b"GET / HTTP/1.0\r\nUser-Agent: x\r\n\r\n"[..];
    feed(&mut parser, &mut buf);
    assert!(parser.field_cache().is_none());

    let mut parser = HttpParser::request(EventCollector::with_header_cache_capacity(0));
    let mut buf = &b"GET / HTTP/1.1\r\nHost: a\r\nUser-Agent: x\r\n\r\n"[..];
    feed(&mut parser, &mut buf);
    assert_eq!(parser.state(), State::End);
    assert!(parser.field_cache().is_none());
}

/// Asks the parser to return after every body slice.
#[derive(Debug, Default)]
struct StopOnContent {
    inner: EventCollector,
}

impl HttpHandler for StopOnContent {
    fn start_request(&mut self, method: &Method, uri: &[u8], version: Option<Version>) -> bool {
        self.inner.start_request(method, uri, version)
    }

    fn parsed_header(&mut self, name: &str, value: &str) -> bool {
        self.inner.parsed_header(name, value)
    }

    fn header_complete(&mut self) -> bool {
        self.inner.header_complete()
    }

    fn content(&mut self, chunk: &[u8]) -> bool {
        self.inner.content(chunk);
        true
    }

    fn message_complete(&mut self) -> bool {
        self.inner.message_complete()
    }

    fn early_eof(&mut self) {
        self.inner.early_eof();
    }

    fn bad_message(&mut self, error: &ParseError) {
        self.inner.bad_message(error);
    }
}

#[test]
fn stop_signal_returns_and_parsing_resumes() {
    let mut parser = HttpParser::request(StopOnContent::default());
    let mut buf = &b"POST / HTTP/1.0\r\nContent-Length: 5\r\n\r\nhello"[..];

    assert!(parser.parse_next(&mut buf));
    assert!(buf.is_empty());
    assert_eq!(parser.state(), State::Content);
    assert!(!parser.handler().inner.events().contains(&ParseEvent::MessageComplete));

    // the body is complete; the next call finishes the message without input
    let mut empty = &b""[..];
    assert!(!parser.parse_next(&mut empty));
    assert_eq!(parser.state(), State::End);
    assert_eq!(parser.handler().inner.events().back(), Some(&ParseEvent::MessageComplete));
}

#[test]
fn stop_signal_through_mutable_reference() {
    let mut handler = StopOnContent::default();
    let mut parser = HttpParser::request(&mut handler);
    let mut buf = &b"POST / HTTP/1.0\r\nContent-Length: 4\r\n\r\nab"[..];
    assert!(parser.parse_next(&mut buf));
    let mut buf = &b"cd"[..];
    assert!(parser.parse_next(&mut buf));
    assert_eq!(parser.content_read(), 4);
    drop(parser);

    let content: Vec<_> = handler.inner.drain().into_iter().filter(ParseEvent::is_content).collect();
    assert_eq!(content.len(), 2);
}

#[test]
fn shutdown_in_headers_is_early_eof() {
    let mut parser = HttpParser::request(EventCollector::new());
    let mut buf = &b"GET / HTTP/1.1\r\nHost: a\r\n"[..];
    feed(&mut parser, &mut buf);
    assert_eq!(parser.phase(), Phase::Headers);

    assert!(!parser.shutdown_input());
    assert_eq!(parser.state(), State::Closed);
    let events = parser.handler_mut().drain();
    assert_eq!(&events[events.len() - 2..], &[ParseEvent::EarlyEof, ParseEvent::MessageComplete]);

    // nothing more to report
    assert!(!parser.shutdown_input());
    assert!(parser.handler_mut().drain().is_empty());
}

#[test]
fn close_in_headers_is_early_eof() {
    let mut parser = HttpParser::request(EventCollector::new());
    let mut buf = &b"GET /partial HTTP/1.1\r\nHost: a\r\nAccept: */"[..];
    feed(&mut parser, &mut buf);
    assert_eq!(parser.phase(), Phase::Headers);

    parser.close();
    assert_eq!(parser.phase(), Phase::Closed);
    assert_eq!(
        parser.handler_mut().drain(),
        vec![
            ParseEvent::RequestLine { method: Method::GET, uri: "/partial".into(), version: Some(Version::HTTP_11) },
            ParseEvent::Host { host: "a".to_owned(), port: None },
            header("Host", "a"),
            ParseEvent::EarlyEof,
            ParseEvent::MessageComplete,
        ]
    );

    let mut buf = &b"*\r\n\r\n"[..];
    assert!(!parser.parse_next(&mut buf));
    assert!(buf.is_empty());
    assert!(parser.handler().is_empty());
}

#[test]
fn shutdown_between_messages_is_silent() {
    let mut parser = HttpParser::request(EventCollector::new());
    assert!(!parser.shutdown_input());
    assert!(parser.handler().is_empty());
    assert!(parser.is_start());
}

#[test]
fn close_then_discard() {
    let mut parser = HttpParser::request(EventCollector::new());
    let mut buf = &b"PUT / HTTP/1.0\r\nContent-Length: 100\r\n\r\npartial"[..];
    feed(&mut parser, &mut buf);
    assert_eq!(parser.phase(), Phase::Content);

    parser.close();
    assert!(parser.is_closed());
    assert_eq!(parser.phase(), Phase::Closed);
    assert_eq!(parser.content_length(), None);
    assert_eq!(parser.framing(), Framing::Unknown);
    let events = parser.handler_mut().drain();
    assert_eq!(&events[events.len() - 2..], &[ParseEvent::EarlyEof, ParseEvent::MessageComplete]);

    let mut buf = &b"more body that nobody wants"[..];
    assert!(!parser.parse_next(&mut buf));
    assert!(buf.is_empty());
    assert!(parser.handler().is_empty());

    parser.reset();
    let mut buf = &b"GET / HTTP/1.0\r\n\r\n"[..];
    feed(&mut parser, &mut buf);
    assert!(parser.is_complete());
}

#[test]
fn bad_message_discards_the_buffer() {
    let mut parser = HttpParser::request(EventCollector::new());
    let mut buf = &b"GET / HTTP/9.9\r\nHost: a\r\n\r\nGET / HTTP/1.1\r\n"[..];
    assert!(parser.parse_next(&mut buf));
    assert!(buf.is_empty());
    assert!(parser.is_closed());
    assert_eq!(parser.handler_mut().take_error(), Some(ParseError::unknown_version("HTTP/9.9")));

    let mut buf = &b"anything"[..];
    assert!(!parser.parse_next(&mut buf));
    assert_eq!(parser.handler_mut().take_error(), None);
}

#[test]
fn introspection_follows_the_message() {
    let mut parser = HttpParser::request(EventCollector::new());
    assert_eq!(parser.mode(), Mode::Request);
    assert!(parser.is_idle());
    assert_eq!(parser.phase(), Phase::Idle);
    assert_eq!(parser.to_string(), "HttpParser{s=Start,0 of -1}");

    let mut buf = &b"POST /p HTTP/1.0\r\nContent-Length: 5\r\n\r\nab"[..];
    feed(&mut parser, &mut buf);
    assert!(parser.in_content_state());
    assert!(!parser.in_header_state());
    assert!(!parser.is_chunking());
    assert_eq!(parser.framing(), Framing::ContentLength);
    assert_eq!(parser.content_length(), Some(5));
    assert_eq!(parser.content_read(), 2);
    assert_eq!(parser.uri(), b"/p");
    assert_eq!(parser.to_string(), "HttpParser{s=Content,2 of 5}");

    let mut buf = &b"cde"[..];
    feed(&mut parser, &mut buf);
    assert!(parser.is_complete());
    assert!(parser.is_idle());

    parser.reset();
    assert_eq!(parser.content_length(), None);
    assert_eq!(parser.content_read(), 0);
    assert!(parser.uri().is_empty());
}

#[test]
fn latin1_header_text() {
    let mut parser = HttpParser::request(EventCollector::new());
    let mut buf = &b"GET / HTTP/1.0\r\nX-Name: caf\xe9 cr\xe8me\r\n\r\n"[..];
    feed(&mut parser, &mut buf);
    let events = parser.handler_mut().drain();
    assert!(events.contains(&header("X-Name", "caf\u{e9} cr\u{e8}me")));
}

#[test]
fn trailer_bytes_count_toward_the_limit() {
    let config = ParserConfig::default().with_trailers(true).with_max_header_bytes(80);
    let input = format!("HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n0\r\nX-Trailer: {}\r\n\r\n", "t".repeat(64));
    let (_, error, state) = parse_fragments(Mode::Response, config, input.as_bytes(), input.len());
    assert_eq!(state, State::Closed);
    assert!(matches!(error, Some(ParseError::TooLargeHeader { max_size: 80, .. })));
}

fn header(name: &str, value: &str) -> ParseEvent {
    ParseEvent::Header { name: name.to_owned(), value: value.to_owned() }
}
