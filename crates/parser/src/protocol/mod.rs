//! Shared vocabulary of the parser.
//!
//! - [`Framing`]: how the end of a message body is found
//! - [`ParseEvent`]: an owned copy of a parser callback
//! - [`ParseError`]: malformed or oversized input, with its status code
//! - [`DecodeError`]: errors of the codec adapter

mod framing;
pub use framing::Framing;

mod event;
pub use event::ParseEvent;

mod error;
pub use error::DecodeError;
pub use error::ParseError;
