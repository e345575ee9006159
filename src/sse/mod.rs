//! Line-framed event stream decoding.
//!
//! The chat backend answers `/chat/stream` with lines of the form
//! `data: <json>\n`. Anything else (blank separators, `:` keep-alives,
//! `event:` lines) is ignored.
//!
//! # Module structure
//! - `decoder` - the incremental, chunk-boundary-insensitive [`EventDecoder`]
//! - `stream` - [`decode_events`], wrapping a decoder around a byte stream
//! - `events` - the typed [`ChatEvent`] payload

mod decoder;
mod events;
mod stream;

pub use decoder::{decode_frame, DecodeError, DecoderState, EventDecoder, DATA_PREFIX};
pub use events::{ChatEvent, ChatEventKind};
pub use stream::{decode_events, EventStream};
