//! Transport adapters - deliver chat events to the event handler.

mod json_lines;

pub use json_lines::{InboundEvent, JsonLinesTransport, Reply};
