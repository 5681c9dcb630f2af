pub mod event_stream;

pub use event_stream::{classify, decode_event_stream, EventStream, SseDecoder, StreamEvent};
