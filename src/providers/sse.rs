//! Minimal Server-Sent Events decoding for streamed completions.

use crate::core::error::HunterError;

/// Buffers raw bytes and yields the `data` payload of each complete event.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one network chunk; returns the events it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            self.handle_line(line, &mut events);
        }
        events
    }

    /// Flushes an event left open when the stream ends without a blank line.
    pub fn finish(mut self) -> Vec<String> {
        let mut events = Vec::new();
        if !self.pending.is_empty() {
            let rest = String::from_utf8_lossy(&self.pending).to_string();
            self.pending.clear();
            self.handle_line(rest.trim_end_matches('\r'), &mut events);
        }
        if !self.data.is_empty() {
            events.push(self.data.join("\n"));
        }
        events
    }

    fn handle_line(&mut self, line: &str, events: &mut Vec<String>) {
        if line.is_empty() {
            if !self.data.is_empty() {
                events.push(std::mem::take(&mut self.data).join("\n"));
            }
            return;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            self.data.push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
        }
        // Comments, `event:`, `id:` and `retry:` lines carry nothing we use.
    }
}

/// Reads a streamed response to the end, handing each event payload to `on_event`.
/// `on_event` returns `false` to stop early.
pub async fn read_events<F>(mut resp: reqwest::Response, mut on_event: F) -> Result<(), HunterError>
where
    F: FnMut(&str) -> Result<bool, HunterError>,
{
    let mut decoder = SseDecoder::new();
    while let Some(chunk) = resp.chunk().await? {
        for event in decoder.push(&chunk) {
            if !on_event(&event)? {
                return Ok(());
            }
        }
    }
    for event in decoder.finish() {
        if !on_event(&event)? {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_split_across_chunks() {
        let mut dec = SseDecoder::new();
        assert!(dec.push(b"data: {\"a\"").is_empty());
        let events = dec.push(b":1}\n\ndata: [DONE]\n\n");
        assert_eq!(events, vec!["{\"a\":1}".to_string(), "[DONE]".to_string()]);
    }

    #[test]
    fn crlf_and_comments_are_handled() {
        let mut dec = SseDecoder::new();
        let events = dec.push(b": keep-alive\r\nevent: message\r\ndata: one\r\n\r\n");
        assert_eq!(events, vec!["one".to_string()]);
    }

    #[test]
    fn multi_line_data_joins_with_newline() {
        let mut dec = SseDecoder::new();
        let events = dec.push(b"data: a\ndata: b\n\n");
        assert_eq!(events, vec!["a\nb".to_string()]);
    }

    #[test]
    fn unterminated_event_flushed_on_finish() {
        let mut dec = SseDecoder::new();
        assert!(dec.push(b"data: tail").is_empty());
        assert_eq!(dec.finish(), vec!["tail".to_string()]);
    }
}
