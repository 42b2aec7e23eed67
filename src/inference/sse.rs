//! Server-sent events plumbing shared by the providers.
//!
//! Bytes arrive in arbitrary chunks; lines are cut on `\n` before decoding so
//! a multi-byte character split across chunks survives intact.

use std::fmt;

use futures::{Stream, StreamExt};
use log::debug;

use super::ProviderError;

/// One parsed SSE line.
#[derive(Debug, PartialEq, Eq)]
pub enum SseLine<'a> {
    Event(&'a str),
    Data(&'a str),
    /// Empty line: end of an event.
    Blank,
    /// Comments, `id:`, `retry:` and anything unrecognized.
    Other,
}

pub fn parse_line(line: &str) -> SseLine<'_> {
    if line.is_empty() {
        return SseLine::Blank;
    }
    if let Some(rest) = line.strip_prefix("data:") {
        return SseLine::Data(rest.strip_prefix(' ').unwrap_or(rest));
    }
    if let Some(rest) = line.strip_prefix("event:") {
        return SseLine::Event(rest.trim());
    }
    SseLine::Other
}

/// Accumulates raw bytes and hands out complete lines.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Next complete line without its terminator (`\n` or `\r\n`).
    pub fn next_line(&mut self) -> Option<String> {
        let pos = self.buffer.iter().position(|b| *b == b'\n')?;
        let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// Whatever is left once the body has ended, if anything.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buffer);
        let line = String::from_utf8_lossy(&rest);
        Some(line.trim_end_matches('\r').to_string())
    }
}

/// Reads lines from a streamed response body.
pub struct SseReader<S> {
    stream: S,
    lines: LineBuffer,
    ended: bool,
}

impl<S, B, E> SseReader<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: fmt::Display,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            lines: LineBuffer::default(),
            ended: false,
        }
    }

    /// Returns the next line, or `None` once the body is exhausted.
    pub async fn next_line(&mut self) -> Result<Option<String>, ProviderError> {
        loop {
            if let Some(line) = self.lines.next_line() {
                return Ok(Some(line));
            }
            if self.ended {
                return Ok(self.lines.finish());
            }
            match self.stream.next().await {
                Some(Ok(bytes)) => {
                    debug!("Raw chunk received: {} bytes", bytes.as_ref().len());
                    self.lines.push(bytes.as_ref());
                }
                Some(Err(e)) => return Err(ProviderError::Network(e.to_string())),
                None => self.ended = true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_variants() {
        assert_eq!(parse_line("data: {\"a\":1}"), SseLine::Data("{\"a\":1}"));
        assert_eq!(parse_line("data:{}"), SseLine::Data("{}"));
        assert_eq!(
            parse_line("event: response.completed"),
            SseLine::Event("response.completed")
        );
        assert_eq!(parse_line(""), SseLine::Blank);
        assert_eq!(parse_line(": keep-alive"), SseLine::Other);
    }

    #[test]
    fn test_line_buffer_handles_split_lines_and_crlf() {
        let mut buf = LineBuffer::default();
        buf.push(b"data: hel");
        assert_eq!(buf.next_line(), None);
        buf.push(b"lo\r\n\r\ndata: x");
        assert_eq!(buf.next_line().as_deref(), Some("data: hello"));
        assert_eq!(buf.next_line().as_deref(), Some(""));
        assert_eq!(buf.next_line(), None);
        assert_eq!(buf.finish().as_deref(), Some("data: x"));
        assert_eq!(buf.finish(), None);
    }

    #[test]
    fn test_line_buffer_keeps_multibyte_chars_split_across_chunks() {
        let text = "data: héllo\n".as_bytes();
        let mut buf = LineBuffer::default();
        // 'é' is two bytes; split between them
        buf.push(&text[..8]);
        buf.push(&text[8..]);
        assert_eq!(buf.next_line().as_deref(), Some("data: héllo"));
    }

    #[tokio::test]
    async fn test_reader_yields_lines_across_chunks() {
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![
            Ok(b"data: a\nda".to_vec()),
            Ok(b"ta: b\n".to_vec()),
            Ok(b"data: c".to_vec()),
        ];
        let mut reader = SseReader::new(futures::stream::iter(chunks));
        let mut lines = Vec::new();
        while let Some(line) = reader.next_line().await.unwrap() {
            lines.push(line);
        }
        assert_eq!(lines, vec!["data: a", "data: b", "data: c"]);
    }

    #[tokio::test]
    async fn test_reader_surfaces_body_errors_as_network() {
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![Err(std::io::Error::other("reset"))];
        let mut reader = SseReader::new(futures::stream::iter(chunks));
        let err = reader.next_line().await.unwrap_err();
        assert!(matches!(err, ProviderError::Network(msg) if msg.contains("reset")));
    }
}
