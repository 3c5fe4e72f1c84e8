//! Content-Length frame codec
//!
//! Wire format, one frame per message:
//!
//! ```text
//! Content-Length: <byte count>\r\n
//! \r\n
//! <UTF-8 JSON body, exactly <byte count> bytes>
//! ```
//!
//! [`FrameDecoder`] is a pure state machine over a growable buffer so it can
//! be fed arbitrarily chunked input. [`FrameReader`] and [`FrameWriter`] bind
//! it to async byte streams.

use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};

/// Separates the header block from the body
pub const HEADER_DELIMITER: &[u8] = b"\r\n\r\n";

const CONTENT_LENGTH: &str = "Content-Length";

const READ_CHUNK: usize = 64 * 1024;

/// Where the decoder is within the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecoderState {
    /// Waiting for a complete header block with a usable length.
    #[default]
    PartialHeader,
    /// Header parsed; waiting for `length` body bytes starting at `body_start`.
    AwaitingBody { body_start: usize, length: usize },
    /// A full body is buffered.
    FrameReady { body_start: usize, length: usize },
}

/// Incremental decoder for Content-Length framed messages.
///
/// A header block that lacks a usable `Content-Length` is not an error while
/// input may still arrive; it only becomes one in [`finish`](Self::finish).
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    state: DecoderState,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes read from the stream.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Number of bytes held but not yet returned as frames.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Return the next complete body, leaving surplus bytes buffered.
    pub fn next_frame(&mut self) -> Option<Vec<u8>> {
        self.advance();

        let DecoderState::FrameReady { body_start, length } = self.state else {
            return None;
        };

        let Some(end) = frame_end(body_start, length) else {
            return None;
        };
        let body = self.buffer[body_start..end].to_vec();
        self.buffer.drain(..end);
        self.state = DecoderState::PartialHeader;
        Some(body)
    }

    /// Call once the stream has ended.
    ///
    /// Yields any last complete frame, then `Ok(None)` when nothing but
    /// whitespace remains. Leftover partial input is a framing error.
    pub fn finish(&mut self) -> Result<Option<Vec<u8>>> {
        if let Some(body) = self.next_frame() {
            return Ok(Some(body));
        }

        if self.buffer.iter().all(u8::is_ascii_whitespace) {
            self.buffer.clear();
            return Ok(None);
        }

        let message = match self.state {
            DecoderState::AwaitingBody { body_start, length } => format!(
                "truncated body: expected {} bytes, received {}",
                length,
                self.buffer.len() - body_start
            ),
            _ if find_delimiter(&self.buffer).is_some() => {
                "header block has no valid Content-Length".to_string()
            }
            _ => format!(
                "unterminated header block ({} bytes pending)",
                self.buffer.len()
            ),
        };
        Err(Error::Framing { message })
    }

    fn advance(&mut self) {
        if self.state == DecoderState::PartialHeader {
            let Some(header_end) = find_delimiter(&self.buffer) else {
                return;
            };
            let body_start = header_end + HEADER_DELIMITER.len();
            let Some(length) = parse_content_length(&self.buffer[..header_end])
                .filter(|&length| frame_end(body_start, length).is_some())
            else {
                tracing::trace!("Header block without usable Content-Length, waiting");
                return;
            };
            self.state = DecoderState::AwaitingBody { body_start, length };
        }

        if let DecoderState::AwaitingBody { body_start, length } = self.state
            && frame_end(body_start, length).is_some_and(|end| self.buffer.len() >= end)
        {
            self.state = DecoderState::FrameReady { body_start, length };
        }
    }
}

/// Offset one past the body, `None` if the declared length cannot fit.
fn frame_end(body_start: usize, length: usize) -> Option<usize> {
    body_start.checked_add(length)
}

fn find_delimiter(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(HEADER_DELIMITER.len())
        .position(|window| window == HEADER_DELIMITER)
}

/// Extract the `Content-Length` value from a header block.
fn parse_content_length(header: &[u8]) -> Option<usize> {
    let header = std::str::from_utf8(header).ok()?;
    header.split("\r\n").find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim().eq_ignore_ascii_case(CONTENT_LENGTH) {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

/// Serialize a message into a complete wire frame.
///
/// The declared length counts encoded bytes, not characters.
pub fn encode_frame<T: Serialize>(message: &T) -> Result<Vec<u8>> {
    let body = serde_json::to_vec(message)?;
    let mut frame = format!("{}: {}\r\n\r\n", CONTENT_LENGTH, body.len()).into_bytes();
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Reads frames from an async byte stream
pub struct FrameReader<R> {
    reader: R,
    decoder: FrameDecoder,
    chunk: Box<[u8]>,
    eof: bool,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            decoder: FrameDecoder::new(),
            chunk: vec![0; READ_CHUNK].into_boxed_slice(),
            eof: false,
        }
    }

    /// Next frame body, or `None` at a clean end of stream.
    pub async fn read_frame(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            if let Some(body) = self.decoder.next_frame() {
                return Ok(Some(body));
            }
            if self.eof {
                return self.decoder.finish();
            }

            let n = self.reader.read(&mut self.chunk).await?;
            if n == 0 {
                tracing::trace!(pending = self.decoder.buffered(), "Input stream closed");
                self.eof = true;
            } else {
                tracing::trace!(bytes = n, "Read chunk");
                self.decoder.extend(&self.chunk[..n]);
            }
        }
    }
}

/// Writes frames to an async byte stream, one flush per frame
pub struct FrameWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub async fn write_message<T: Serialize>(&mut self, message: &T) -> Result<()> {
        let frame = encode_frame(message)?;
        self.writer.write_all(&frame).await?;
        self.writer.flush().await?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
