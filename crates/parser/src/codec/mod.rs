//! Owned-event adapters around the parser.
//!
//! - [`EventCollector`]: an [`HttpHandler`](crate::handler::HttpHandler) queueing a
//!   [`ParseEvent`](crate::protocol::ParseEvent) per callback
//! - [`EventDecoder`]: a [`tokio_util::codec::Decoder`] yielding those events from a stream

mod collector;
mod event_decoder;

pub use collector::EventCollector;
pub use event_decoder::EventDecoder;
