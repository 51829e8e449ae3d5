//! Newline-delimited JSON processing for streaming responses.
//!
//! The daemon streams chat fragments and pull progress as one JSON object per
//! line. This module turns the raw byte stream into a stream of typed items,
//! buffering partial lines across chunk boundaries.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::observability::{STREAM_BYTES, STREAM_ERRORS, STREAM_EVENTS};
use crate::{Error, Result};

/// Process a stream of bytes into a stream of decoded NDJSON items.
///
/// Blank lines are skipped. A line of the form `{"error": "..."}` becomes an
/// `Err` item carrying the daemon's message; decoding continues afterwards.
pub fn process_ndjson<S, E, T>(byte_stream: S) -> impl Stream<Item = Result<T>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
    T: DeserializeOwned + Send + 'static,
{
    let stream = byte_stream
        .map(|result| {
            result.map_err(|e| {
                Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e)))
            })
        })
        .fuse();

    let buffer: Vec<u8> = Vec::new();

    stream::unfold(
        (stream, buffer),
        move |(mut stream, mut buffer)| async move {
            loop {
                if let Some(line) = extract_line(&mut buffer) {
                    match decode_line::<T>(&line) {
                        Some(item) => return Some((item, (stream, buffer))),
                        None => continue,
                    }
                }

                match stream.next().await {
                    Some(Ok(bytes)) => {
                        STREAM_BYTES.count(bytes.len() as u64);
                        buffer.extend_from_slice(&bytes);
                    }
                    Some(Err(e)) => {
                        STREAM_ERRORS.click();
                        return Some((Err(e), (stream, buffer)));
                    }
                    None => {
                        // End of stream; the last line may lack a trailing newline.
                        let rest = std::mem::take(&mut buffer);
                        return decode_line::<T>(&rest).map(|item| (item, (stream, buffer)));
                    }
                }
            }
        },
    )
}

/// Removes and returns the first complete line in the buffer, without its terminator.
fn extract_line(buffer: &mut Vec<u8>) -> Option<Vec<u8>> {
    let newline = buffer.iter().position(|b| *b == b'\n')?;
    let mut line: Vec<u8> = buffer.drain(..=newline).collect();
    line.pop();
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    Some(line)
}

/// Decodes one line; `None` for blank lines.
fn decode_line<T: DeserializeOwned>(line: &[u8]) -> Option<Result<T>> {
    let text = match std::str::from_utf8(line) {
        Ok(text) => text.trim(),
        Err(e) => {
            STREAM_ERRORS.click();
            return Some(Err(e.into()));
        }
    };
    if text.is_empty() {
        return None;
    }
    STREAM_EVENTS.click();
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            STREAM_ERRORS.click();
            return Some(Err(Error::serialization(
                format!("Failed to parse stream line '{text}': {e}"),
                Some(Box::new(e)),
            )));
        }
    };
    if let Some(message) = value.get("error").and_then(Value::as_str) {
        STREAM_ERRORS.click();
        return Some(Err(Error::streaming(message, None)));
    }
    Some(serde_json::from_value(value).map_err(|e| {
        STREAM_ERRORS.click();
        Error::serialization(
            format!("Unexpected stream line '{text}': {e}"),
            Some(Box::new(e)),
        )
    }))
}
