//! Event WebSocket connection

mod event_stream;

pub use event_stream::EventStream;
