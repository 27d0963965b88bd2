//! Server-sent-events line decoding shared by the streaming adapters.
//!
//! ```rust
//! use uprovider::{SseDecoder, SsePayload};
//!
//! let mut decoder = SseDecoder::new();
//! assert!(decoder.push(b"data: {\"a\"").is_empty());
//! assert_eq!(
//!     decoder.push(b":1}\n\ndata: [DONE]\n"),
//!     vec![SsePayload::Data("{\"a\":1}".to_string()), SsePayload::Done]
//! );
//! ```

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SsePayload {
    Data(String),
    /// The `[DONE]` sentinel.
    Done,
}

/// Buffers raw bytes and yields the payload of every complete `data:` line.
///
/// Bytes are buffered until a newline arrives, so lines and multi-byte characters split across
/// chunks decode correctly. `event:`, `id:`, `retry:`, comment and blank lines are dropped.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<SsePayload> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(newline_index) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let line = self.buffer.drain(..=newline_index).collect::<Vec<u8>>();
            if let Some(payload) = parse_line(&line) {
                payloads.push(payload);
            }
        }

        payloads
    }

    /// Flushes a final line that arrived without a trailing newline.
    pub fn finish(&mut self) -> Option<SsePayload> {
        let line = std::mem::take(&mut self.buffer);
        parse_line(&line)
    }
}

fn parse_line(line: &[u8]) -> Option<SsePayload> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim();
    let payload = line.strip_prefix("data:")?.trim();

    if payload.is_empty() {
        return None;
    }

    if payload == "[DONE]" {
        return Some(SsePayload::Done);
    }

    Some(SsePayload::Data(payload.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_non_data_lines() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.push(
            b": keep-alive\nevent: message\nid: 7\nretry: 100\n\ndata: {\"x\":true}\r\n",
        );

        assert_eq!(payloads, vec![SsePayload::Data("{\"x\":true}".to_string())]);
    }

    #[test]
    fn multibyte_characters_split_across_chunks_survive() {
        let text = "data: {\"t\":\"héllo\"}\n".as_bytes();
        let split = text
            .iter()
            .position(|byte| *byte == 0xC3)
            .expect("é starts with 0xC3")
            + 1;

        let mut decoder = SseDecoder::new();
        assert!(decoder.push(&text[..split]).is_empty());
        assert_eq!(
            decoder.push(&text[split..]),
            vec![SsePayload::Data("{\"t\":\"héllo\"}".to_string())]
        );
    }

    #[test]
    fn finish_flushes_unterminated_line() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: [DONE]").is_empty());
        assert_eq!(decoder.finish(), Some(SsePayload::Done));
        assert_eq!(decoder.finish(), None);
    }
}
