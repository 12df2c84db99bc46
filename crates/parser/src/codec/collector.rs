use std::collections::VecDeque;

use bytes::Bytes;
use http::{Method, Version};

use crate::handler::HttpHandler;
use crate::protocol::{ParseError, ParseEvent};

/// An [`HttpHandler`] that queues an owned [`ParseEvent`] per callback.
///
/// It never asks the parser to stop; a malformed message is stored and reported
/// once through [`take_error`](Self::take_error).
#[derive(Debug, Default)]
pub struct EventCollector {
    events: VecDeque<ParseEvent>,
    error: Option<ParseError>,
    cache_capacity: Option<usize>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the per-connection header cache capacity of the parser config.
    pub fn with_header_cache_capacity(capacity: usize) -> Self {
        Self { cache_capacity: Some(capacity), ..Self::default() }
    }

    pub fn pop_event(&mut self) -> Option<ParseEvent> {
        self.events.pop_front()
    }

    pub fn take_error(&mut self) -> Option<ParseError> {
        self.error.take()
    }

    /// Removes and returns every queued event.
    pub fn drain(&mut self) -> Vec<ParseEvent> {
        self.events.drain(..).collect()
    }

    pub fn events(&self) -> &VecDeque<ParseEvent> {
        &self.events
    }

    /// Returns true if there is neither a queued event nor an error.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.error.is_none()
    }
}

impl HttpHandler for EventCollector {
    fn start_request(&mut self, method: &Method, uri: &[u8], version: Option<Version>) -> bool {
        self.events.push_back(ParseEvent::RequestLine {
            method: method.clone(),
            uri: Bytes::copy_from_slice(uri),
            version,
        });
        false
    }

    fn start_response(&mut self, version: Version, status: u16, reason: Option<&str>) -> bool {
        self.events.push_back(ParseEvent::StatusLine { version, status, reason: reason.map(ToOwned::to_owned) });
        false
    }

    fn parsed_header(&mut self, name: &str, value: &str) -> bool {
        self.events.push_back(ParseEvent::Header { name: name.to_owned(), value: value.to_owned() });
        false
    }

    fn parsed_host_header(&mut self, host: &str, port: Option<u16>) -> bool {
        self.events.push_back(ParseEvent::Host { host: host.to_owned(), port });
        false
    }

    fn header_complete(&mut self) -> bool {
        self.events.push_back(ParseEvent::HeaderComplete);
        false
    }

    fn content(&mut self, chunk: &[u8]) -> bool {
        self.events.push_back(ParseEvent::Content(Bytes::copy_from_slice(chunk)));
        false
    }

    fn parsed_trailer(&mut self, name: &str, value: &str) -> bool {
        self.events.push_back(ParseEvent::Trailer { name: name.to_owned(), value: value.to_owned() });
        false
    }

    fn message_complete(&mut self) -> bool {
        self.events.push_back(ParseEvent::MessageComplete);
        false
    }

    fn early_eof(&mut self) {
        self.events.push_back(ParseEvent::EarlyEof);
    }

    fn bad_message(&mut self, error: &ParseError) {
        self.error = Some(error.clone());
    }

    fn header_cache_capacity(&self) -> Option<usize> {
        self.cache_capacity
    }
}
