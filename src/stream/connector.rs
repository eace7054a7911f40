//! Live push-stream transport.
//!
//! The backend notifies of new shares over a standing Server-Sent Events
//! connection; every `newLocation` event carries a full `LocationRecord`.
//! [`StreamConnector`] is the seam the connection manager consumes, so tests
//! can substitute scripted streams for the real HTTP transport.

use crate::api::client::HTTP_CLIENT;
use crate::core::record::LocationRecord;
use crate::StreamError;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::Url;
use std::collections::VecDeque;

/// Event name the backend emits for every successful share.
pub const NEW_LOCATION_EVENT: &str = "newLocation";

/// FIFO stream of decoded push events; a decode/transport error ends the
/// current connection attempt but is surfaced, not swallowed.
pub type LocationEventStream = BoxStream<'static, Result<LocationRecord, StreamError>>;

/// Trait representing anything that can open a live location event stream.
#[async_trait]
pub trait StreamConnector: Send + Sync {
    async fn open(&self) -> Result<LocationEventStream, StreamError>;
}

/// Incremental Server-Sent Events decoder.
///
/// Consumes chunk boundaries wherever the transport puts them and emits
/// complete `newLocation` records in arrival order. Events with any other
/// name, comment lines, and malformed payloads are dropped.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buf: String,
    event: String,
    data: String,
}

impl SseDecoder {
    pub(crate) fn feed(&mut self, chunk: &str) -> Vec<LocationRecord> {
        self.buf.push_str(chunk);
        let mut out = Vec::new();
        while let Some(newline) = self.buf.find('\n') {
            let line: String = self.buf.drain(..=newline).collect();
            let line = line.trim_end_matches(|c| c == '\n' || c == '\r');
            if line.is_empty() {
                // Blank line terminates a frame
                if let Some(record) = self.dispatch() {
                    out.push(record);
                }
            } else if let Some(value) = line.strip_prefix("event:") {
                self.event = value.trim().to_string();
            } else if let Some(value) = line.strip_prefix("data:") {
                if !self.data.is_empty() {
                    self.data.push('\n');
                }
                self.data.push_str(value.strip_prefix(' ').unwrap_or(value));
            }
        }
        out
    }

    fn dispatch(&mut self) -> Option<LocationRecord> {
        let event = std::mem::take(&mut self.event);
        let data = std::mem::take(&mut self.data);
        if event != NEW_LOCATION_EVENT || data.is_empty() {
            return None;
        }
        match serde_json::from_str(&data) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("dropping malformed {} payload: {}", NEW_LOCATION_EVENT, e);
                None
            }
        }
    }
}

/// [`StreamConnector`] over the backend's SSE endpoint.
pub struct SseConnector {
    base: Url,
}

impl SseConnector {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    /// Builds the connector against the configured base address.
    pub fn from_config(
        config: &crate::core::config::SessionConfig,
    ) -> Result<Self, StreamError> {
        Url::parse(&config.base_url)
            .map(Self::new)
            .map_err(|e| StreamError::ConnectFailed(e.to_string()))
    }
}

#[async_trait]
impl StreamConnector for SseConnector {
    async fn open(&self) -> Result<LocationEventStream, StreamError> {
        let url = self
            .base
            .join("/api/locations/stream")
            .map_err(|e| StreamError::ConnectFailed(e.to_string()))?;
        let resp = HTTP_CLIENT
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| StreamError::ConnectFailed(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(StreamError::ConnectFailed(format!(
                "HTTP {}",
                resp.status()
            )));
        }

        let bytes = resp.bytes_stream().boxed();
        let state = (bytes, SseDecoder::default(), VecDeque::new());
        let events = futures::stream::unfold(state, |(mut bytes, mut decoder, mut pending)| {
            async move {
                loop {
                    if let Some(record) = pending.pop_front() {
                        return Some((Ok(record), (bytes, decoder, pending)));
                    }
                    match bytes.next().await {
                        Some(Ok(chunk)) => {
                            pending.extend(decoder.feed(&String::from_utf8_lossy(&chunk)));
                        }
                        Some(Err(e)) => {
                            return Some((
                                Err(StreamError::ConnectFailed(e.to_string())),
                                (bytes, decoder, pending),
                            ));
                        }
                        None => return None,
                    }
                }
            }
        });
        Ok(events.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_a_new_location_frame() {
        let mut decoder = SseDecoder::default();
        let records = decoder.feed(
            "event: newLocation\ndata: {\"id\":\"a\",\"username\":\"ada\",\"latitude\":1.0,\"longitude\":2.0}\n\n",
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "a");
    }

    #[test]
    fn test_reassembles_split_chunks_in_order() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.feed("event: newLoc").is_empty());
        assert!(decoder
            .feed("ation\ndata: {\"id\":\"a\",\"username\":\"ada\",")
            .is_empty());
        let records = decoder.feed(
            "\"latitude\":1.0,\"longitude\":2.0}\n\nevent: newLocation\ndata: {\"id\":\"b\",\"username\":\"bob\",\"latitude\":3.0,\"longitude\":4.0}\n\n",
        );
        let ids: Vec<_> = records.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_ignores_other_events_and_comments() {
        let mut decoder = SseDecoder::default();
        let records = decoder.feed(
            ": keep-alive\n\nevent: somethingElse\ndata: {\"username\":\"x\",\"latitude\":0,\"longitude\":0}\n\n",
        );
        assert!(records.is_empty());
    }

    #[test]
    fn test_handles_crlf_line_endings() {
        let mut decoder = SseDecoder::default();
        let records = decoder.feed(
            "event: newLocation\r\ndata: {\"id\":\"a\",\"username\":\"ada\",\"latitude\":1.0,\"longitude\":2.0}\r\n\r\n",
        );
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_malformed_payload_is_dropped_not_fatal() {
        let mut decoder = SseDecoder::default();
        assert!(decoder
            .feed("event: newLocation\ndata: not json\n\n")
            .is_empty());
        // Decoder stays usable afterwards
        let records = decoder.feed(
            "event: newLocation\ndata: {\"id\":\"a\",\"username\":\"ada\",\"latitude\":1.0,\"longitude\":2.0}\n\n",
        );
        assert_eq!(records.len(), 1);
    }
}
