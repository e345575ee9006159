//! Incremental decoder for line-framed `data: <json>` streams.
//!
//! Chunks are appended to an internal buffer and split on `\n`. Every piece
//! except the last is a complete frame; the last piece stays buffered until
//! more data arrives. Frames that start with [`DATA_PREFIX`] are parsed as one
//! JSON document each, everything else is ignored.
//!
//! The decoder never emits a partial event and never salvages an unterminated
//! trailing line: [`EventDecoder::finish`] drops whatever is still buffered.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

/// Prefix that marks a meaningful frame.
pub const DATA_PREFIX: &str = "data: ";

/// Lifecycle of an [`EventDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Accepting chunks; the buffer may hold a partial line.
    Accumulating,
    /// `finish` was called; no further input is accepted.
    Closed,
}

/// Misuse of a decoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("decoder is closed and accepts no further input")]
    Closed,
}

/// Chunk-boundary-insensitive decoder producing events of type `T`.
///
/// One instance belongs to exactly one stream. `T` defaults to
/// [`serde_json::Value`] so any JSON payload is accepted.
///
/// # Example
///
/// ```
/// use chatstream::sse::EventDecoder;
///
/// let mut decoder: EventDecoder = EventDecoder::new();
/// let first = decoder.feed_str("data: {\"type\":\"a\"}\nda").unwrap();
/// let second = decoder.feed_str("ta: {\"type\":\"b\"}\n").unwrap();
/// assert_eq!(first.len(), 1);
/// assert_eq!(second[0]["type"], "b");
/// ```
#[derive(Debug)]
pub struct EventDecoder<T = serde_json::Value> {
    /// Decoded text not yet terminated by a newline
    buffer: String,
    /// Trailing bytes of a UTF-8 sequence split across chunks
    pending_bytes: Vec<u8>,
    state: DecoderState,
    skipped_frames: usize,
    _event: PhantomData<fn() -> T>,
}

impl<T> Default for EventDecoder<T> {
    fn default() -> Self {
        Self {
            buffer: String::new(),
            pending_bytes: Vec::new(),
            state: DecoderState::Accumulating,
            skipped_frames: 0,
            _event: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> EventDecoder<T> {
    /// Create a decoder in the accumulating state with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of text and return every event completed by it, in order.
    pub fn feed_str(&mut self, chunk: &str) -> Result<Vec<T>, DecodeError> {
        self.ensure_open()?;
        self.flush_pending_bytes();
        self.buffer.push_str(chunk);
        Ok(self.drain_frames())
    }

    /// Feed a chunk of raw bytes.
    ///
    /// A multi-byte character split across chunks is held back until its
    /// remaining bytes arrive. Invalid sequences decode to U+FFFD.
    pub fn feed_bytes(&mut self, chunk: &[u8]) -> Result<Vec<T>, DecodeError> {
        self.ensure_open()?;
        if self.pending_bytes.is_empty() {
            self.push_utf8(chunk);
        } else {
            let mut joined = std::mem::take(&mut self.pending_bytes);
            joined.extend_from_slice(chunk);
            self.push_utf8(&joined);
        }
        Ok(self.drain_frames())
    }

    /// Signal end of stream.
    ///
    /// Any unterminated trailing content is discarded, never parsed, so the
    /// returned vector is always empty. The decoder is closed afterwards.
    pub fn finish(&mut self) -> Result<Vec<T>, DecodeError> {
        self.ensure_open()?;
        self.state = DecoderState::Closed;

        if !self.buffer.is_empty() || !self.pending_bytes.is_empty() {
            debug!(
                dropped_chars = self.buffer.len(),
                dropped_bytes = self.pending_bytes.len(),
                "dropping unterminated trailing data at end of stream"
            );
        }
        self.buffer.clear();
        self.pending_bytes.clear();

        Ok(Vec::new())
    }
}

impl<T> EventDecoder<T> {
    /// Current lifecycle state.
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Text currently held as a partial line.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Number of `data:` frames skipped because their payload did not decode.
    pub fn skipped_frames(&self) -> usize {
        self.skipped_frames
    }

    fn ensure_open(&self) -> Result<(), DecodeError> {
        match self.state {
            DecoderState::Accumulating => Ok(()),
            DecoderState::Closed => Err(DecodeError::Closed),
        }
    }

    fn flush_pending_bytes(&mut self) {
        if !self.pending_bytes.is_empty() {
            self.pending_bytes.clear();
            self.buffer.push(char::REPLACEMENT_CHARACTER);
        }
    }

    fn push_utf8(&mut self, mut input: &[u8]) {
        loop {
            match std::str::from_utf8(input) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    return;
                }
                Err(err) => {
                    let (valid, rest) = input.split_at(err.valid_up_to());
                    self.buffer.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        Some(invalid) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            input = &rest[invalid..];
                        }
                        None => {
                            // Incomplete sequence at the end of the chunk
                            self.pending_bytes = rest.to_vec();
                            return;
                        }
                    }
                }
            }
        }
    }
}

impl<T: DeserializeOwned> EventDecoder<T> {
    fn drain_frames(&mut self) -> Vec<T> {
        let Some(last_newline) = self.buffer.rfind('\n') else {
            return Vec::new();
        };

        let remainder = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, remainder);

        let mut events = Vec::new();
        for frame in complete.split_terminator('\n') {
            match decode_frame::<T>(frame) {
                Some(Ok(event)) => events.push(event),
                Some(Err(err)) => {
                    self.skipped_frames += 1;
                    warn!(error = %err, frame, "skipping event frame that failed to decode");
                }
                None => {}
            }
        }
        events
    }
}

/// Decode a single complete frame.
///
/// Returns `None` for blank frames and frames without the `data: ` prefix,
/// otherwise the result of parsing the payload.
pub fn decode_frame<T: DeserializeOwned>(frame: &str) -> Option<Result<T, serde_json::Error>> {
    if frame.trim().is_empty() {
        return None;
    }
    let payload = frame.strip_prefix(DATA_PREFIX)?;
    Some(serde_json::from_str(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn feed_all(chunks: &[&str]) -> Vec<Value> {
        let mut decoder = EventDecoder::new();
        let mut events = Vec::new();
        for chunk in chunks {
            events.extend(decoder.feed_str(chunk).unwrap());
        }
        events.extend(decoder.finish().unwrap());
        events
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let events = feed_all(&["data: {\"type\":\"a\"}\nda", "ta: {\"type\":\"b\"}\n"]);
        assert_eq!(events, vec![json!({"type": "a"}), json!({"type": "b"})]);
    }

    #[test]
    fn test_malformed_json_is_skipped() {
        let mut decoder: EventDecoder = EventDecoder::new();
        let events = decoder
            .feed_str("data: not-json\ndata: {\"type\":\"c\"}\n")
            .unwrap();
        assert_eq!(events, vec![json!({"type": "c"})]);
        assert_eq!(decoder.skipped_frames(), 1);
    }

    #[test]
    fn test_unterminated_trailing_line_is_dropped() {
        let events = feed_all(&["data: {\"type\":\"d\"}"]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_partial_line_stays_buffered() {
        let mut decoder: EventDecoder = EventDecoder::new();
        let events = decoder.feed_str("data: {\"type\":").unwrap();
        assert!(events.is_empty());
        assert_eq!(decoder.buffered(), "data: {\"type\":");

        let events = decoder.feed_str("\"x\"}\n").unwrap();
        assert_eq!(events, vec![json!({"type": "x"})]);
        assert_eq!(decoder.buffered(), "");
    }

    #[test]
    fn test_whitespace_and_blank_lines_ignored() {
        let events = feed_all(&["\n   \n\t\n\ndata: {\"type\":\"e\"}\n\n"]);
        assert_eq!(events, vec![json!({"type": "e"})]);
    }

    #[test]
    fn test_lines_without_prefix_ignored() {
        let events = feed_all(&[
            ": keep-alive\n",
            "event: content\n",
            "{\"type\":\"raw\"}\n",
            "data:{\"type\":\"no-space\"}\n",
            " data: {\"type\":\"indented\"}\n",
            "data: {\"type\":\"ok\"}\n",
        ]);
        assert_eq!(events, vec![json!({"type": "ok"})]);
    }

    #[test]
    fn test_carriage_return_tolerated() {
        let events = feed_all(&["data: {\"type\":\"crlf\"}\r\n"]);
        assert_eq!(events, vec![json!({"type": "crlf"})]);
    }

    #[test]
    fn test_multibyte_character_split_across_byte_chunks() {
        let line = "data: {\"type\":\"content\",\"content\":\"héllo 世界\"}\n".as_bytes();
        let split = line.iter().position(|b| *b == 0xe4).unwrap() + 1;

        let mut decoder: EventDecoder = EventDecoder::new();
        assert!(decoder.feed_bytes(&line[..split]).unwrap().is_empty());
        let events = decoder.feed_bytes(&line[split..]).unwrap();
        assert_eq!(events[0]["content"], "héllo 世界");
    }

    #[test]
    fn test_invalid_utf8_replaced() {
        let mut decoder: EventDecoder = EventDecoder::new();
        let events = decoder
            .feed_bytes(b"data: {\"content\":\"a\xffb\"}\n")
            .unwrap();
        assert_eq!(events[0]["content"], "a\u{fffd}b");
    }

    #[test]
    fn test_feed_after_finish_rejected() {
        let mut decoder: EventDecoder = EventDecoder::new();
        decoder.finish().unwrap();
        assert_eq!(decoder.state(), DecoderState::Closed);
        assert_eq!(decoder.feed_str("data: {}\n"), Err(DecodeError::Closed));
        assert_eq!(decoder.feed_bytes(b"data: {}\n"), Err(DecodeError::Closed));
        assert_eq!(decoder.finish(), Err(DecodeError::Closed));
    }

    #[test]
    fn test_finish_clears_buffer() {
        let mut decoder: EventDecoder = EventDecoder::new();
        decoder.feed_str("data: {\"type\":\"late\"}").unwrap();
        assert!(decoder.finish().unwrap().is_empty());
        assert_eq!(decoder.buffered(), "");
    }

    #[test]
    fn test_typed_decoding() {
        #[derive(Debug, serde::Deserialize, PartialEq)]
        struct Tick {
            n: u32,
        }

        let mut decoder: EventDecoder<Tick> = EventDecoder::new();
        let events = decoder
            .feed_str("data: {\"n\":1}\ndata: {\"m\":2}\ndata: {\"n\":3}\n")
            .unwrap();
        assert_eq!(events, vec![Tick { n: 1 }, Tick { n: 3 }]);
        assert_eq!(decoder.skipped_frames(), 1);
    }

    #[test]
    fn test_chat_events_keep_every_json_frame() {
        use crate::sse::{ChatEvent, ChatEventKind};

        let mut decoder: EventDecoder<ChatEvent> = EventDecoder::new();
        let events = decoder
            .feed_str(
                "data: {\"content\":\"x\"}\n\
                 data: {\"type\":\"content\",\"content\":7}\n\
                 data: not-json\n\
                 data: {\"type\":\"done\"}\n",
            )
            .unwrap();

        let kinds: Vec<ChatEventKind> = events.iter().map(ChatEvent::kind).collect();
        assert_eq!(
            kinds,
            vec![ChatEventKind::Other, ChatEventKind::Content, ChatEventKind::Done]
        );
        assert_eq!(decoder.skipped_frames(), 1);
    }

    #[test]
    fn test_decode_frame() {
        assert!(decode_frame::<Value>("").is_none());
        assert!(decode_frame::<Value>("   ").is_none());
        assert!(decode_frame::<Value>("id: 7").is_none());
        assert!(decode_frame::<Value>("data: {").unwrap().is_err());
        assert_eq!(decode_frame::<Value>("data: 42").unwrap().unwrap(), json!(42));
    }
}
