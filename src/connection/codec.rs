//! Line framing for the wire.
//!
//! Inbound bytes are split on LF, a trailing CR is dropped and the line is
//! decoded with the connection's character encoding. Lines longer than the
//! codec limit are reported once and skipped, so one bad line never ends
//! the stream. Outbound lines are encoded, checked against the 512-byte
//! ceiling and terminated with CRLF.

use bytes::{Buf, BufMut, BytesMut};
use encoding::Encoding;
use tokio_util::codec::{Decoder, Encoder};

use super::ConnectionError;
use crate::util::{LINE_TERMINATOR, MAX_LINE_LENGTH};

/// One decoded inbound frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inbound {
    /// A complete line without its terminator.
    Line(String),
    /// A line exceeded the codec limit and is being discarded. Carries the
    /// number of bytes seen when the overflow was detected.
    Oversize(usize),
}

/// Tokio codec framing IRC lines.
#[derive(Clone, Debug)]
pub struct LineCodec {
    encoding: &'static Encoding,
    max_length: usize,
    next_index: usize,
    discarding: bool,
}

impl LineCodec {
    /// Inbound limit in bytes, terminator included.
    pub const DEFAULT_MAX_LENGTH: usize = 8191;

    pub fn new(encoding: &'static Encoding) -> Self {
        Self::with_max_length(encoding, Self::DEFAULT_MAX_LENGTH)
    }

    pub fn with_max_length(encoding: &'static Encoding, max_length: usize) -> Self {
        LineCodec {
            encoding,
            max_length,
            next_index: 0,
            discarding: false,
        }
    }

    /// Look up an encoding by its WHATWG label (`utf-8`, `latin1`, ...).
    pub fn for_label(label: &str) -> Option<Self> {
        Encoding::for_label(label.as_bytes()).map(Self::new)
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    fn decode_line(&self, mut bytes: &[u8]) -> String {
        if let Some(stripped) = bytes.strip_suffix(b"\n") {
            bytes = stripped;
        }
        if let Some(stripped) = bytes.strip_suffix(b"\r") {
            bytes = stripped;
        }
        let (text, _had_errors) = self.encoding.decode_without_bom_handling(bytes);
        text.into_owned()
    }
}

impl Decoder for LineCodec {
    type Item = Inbound;
    type Error = ConnectionError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Inbound>, ConnectionError> {
        loop {
            let read_to = src.len().min(self.max_length.saturating_add(1));
            let newline = src[self.next_index..read_to].iter().position(|b| *b == b'\n');

            match (self.discarding, newline) {
                (true, Some(offset)) => {
                    src.advance(self.next_index + offset + 1);
                    self.discarding = false;
                    self.next_index = 0;
                }
                (true, None) => {
                    src.advance(read_to);
                    self.next_index = 0;
                    if src.is_empty() {
                        return Ok(None);
                    }
                }
                (false, Some(offset)) => {
                    let end = self.next_index + offset + 1;
                    self.next_index = 0;
                    let line = src.split_to(end);
                    return Ok(Some(Inbound::Line(self.decode_line(&line))));
                }
                (false, None) if src.len() > self.max_length => {
                    self.discarding = true;
                    self.next_index = 0;
                    return Ok(Some(Inbound::Oversize(src.len())));
                }
                (false, None) => {
                    self.next_index = read_to;
                    return Ok(None);
                }
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Inbound>, ConnectionError> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if src.is_empty() || self.discarding {
            src.clear();
            return Ok(None);
        }
        let rest = src.split_to(src.len());
        self.next_index = 0;
        Ok(Some(Inbound::Line(self.decode_line(&rest))))
    }
}

impl Encoder<String> for LineCodec {
    type Error = ConnectionError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<(), ConnectionError> {
        let (bytes, _, _) = self.encoding.encode(&line);
        let length = bytes.len() + LINE_TERMINATOR.len();
        if length > MAX_LINE_LENGTH {
            return Err(ConnectionError::Oversize {
                length,
                limit: MAX_LINE_LENGTH,
            });
        }
        dst.reserve(length);
        dst.put_slice(&bytes);
        dst.put_slice(LINE_TERMINATOR.as_bytes());
        Ok(())
    }
}
