//! Adapter from a byte-chunk stream to an event stream.

use std::collections::VecDeque;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::stream::{self, Stream, StreamExt};
use serde::de::DeserializeOwned;
use tracing::error;

use crate::error::StreamError;
use crate::traits::HttpError;

use super::EventDecoder;

/// Stream of decoded events; ends after the first error.
pub type EventStream<T> = Pin<Box<dyn Stream<Item = Result<T, StreamError>> + Send>>;

struct DecodeState<S, T> {
    chunks: Pin<Box<S>>,
    decoder: EventDecoder<T>,
    ready: VecDeque<T>,
    finished: bool,
}

/// Run one [`EventDecoder`] over `chunks`.
///
/// Events come out in arrival order. When `chunks` ends the decoder is
/// finished, so an unterminated trailing line is dropped. A transport error
/// is yielded once and ends the stream. Dropping the returned stream drops
/// the decoder and its buffer.
pub fn decode_events<T, S>(chunks: S) -> EventStream<T>
where
    T: DeserializeOwned + Send + 'static,
    S: Stream<Item = Result<Bytes, HttpError>> + Send + 'static,
{
    let state = DecodeState {
        chunks: Box::pin(chunks),
        decoder: EventDecoder::new(),
        ready: VecDeque::new(),
        finished: false,
    };

    let events = stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.ready.pop_front() {
                return Some((Ok(event), state));
            }
            if state.finished {
                return None;
            }

            match state.chunks.next().await {
                Some(Ok(chunk)) => match state.decoder.feed_bytes(&chunk) {
                    Ok(events) => state.ready.extend(events),
                    Err(err) => {
                        state.finished = true;
                        return Some((Err(err.into()), state));
                    }
                },
                Some(Err(err)) => {
                    let err = StreamError::Transport(err);
                    error!(code = err.error_code(), error = %err, "reading event stream failed");
                    state.finished = true;
                    return Some((Err(err), state));
                }
                None => {
                    state.finished = true;
                    match state.decoder.finish() {
                        Ok(events) => state.ready.extend(events),
                        Err(err) => return Some((Err(err.into()), state)),
                    }
                }
            }
        }
    });

    Box::pin(events)
}
