//! Response payloads and the per-response accumulation buffer.

use std::borrow::Cow;

/// One chunk handed to a `write` or `finish` call.
///
/// Mirrors what a streaming response accepts: text, raw bytes, or nothing
/// at all (a bare `finish()`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Bytes(Vec<u8>),
    #[default]
    Absent,
}

impl Payload {
    /// Decode the chunk as text. Bytes are read as UTF-8 (lossy).
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Text(text) => Some(Cow::Borrowed(text)),
            Self::Bytes(bytes) => Some(String::from_utf8_lossy(bytes)),
            Self::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Raw byte length as it would go over the wire.
    pub fn byte_len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Bytes(bytes) => bytes.len(),
            Self::Absent => 0,
        }
    }

    /// Consume into raw bytes (empty for `Absent`).
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.into_bytes(),
            Self::Bytes(bytes) => bytes,
            Self::Absent => Vec::new(),
        }
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl<T: Into<Payload>> From<Option<T>> for Payload {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

// ============================================================================
// ResponseBuffer
// ============================================================================

/// Accumulates every chunk of one response, in call order.
///
/// Byte chunks may split a multi-byte UTF-8 sequence across two writes; the
/// incomplete tail is held back until the next chunk arrives instead of
/// being decoded into replacement characters.
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    text: String,
    /// Trailing bytes of an unfinished UTF-8 sequence.
    pending: Vec<u8>,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one chunk. `Absent` appends nothing.
    pub fn accept(&mut self, chunk: Payload) {
        match chunk {
            Payload::Text(text) => {
                self.flush_pending();
                self.text.push_str(&text);
            }
            Payload::Bytes(bytes) => self.push_bytes(bytes),
            Payload::Absent => {}
        }
    }

    /// Current accumulated text, without clearing it.
    pub fn snapshot(&self) -> Cow<'_, str> {
        if self.pending.is_empty() {
            Cow::Borrowed(&self.text)
        } else {
            let mut text = self.text.clone();
            text.push_str(&String::from_utf8_lossy(&self.pending));
            Cow::Owned(text)
        }
    }

    /// Byte length of the accumulated payload.
    pub fn len(&self) -> usize {
        self.text.len() + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consume the buffer, returning the full payload text.
    pub fn into_string(mut self) -> String {
        self.flush_pending();
        self.text
    }

    fn push_bytes(&mut self, bytes: Vec<u8>) {
        let bytes = if self.pending.is_empty() {
            bytes
        } else {
            let mut joined = std::mem::take(&mut self.pending);
            joined.extend_from_slice(&bytes);
            joined
        };

        match std::str::from_utf8(&bytes) {
            Ok(text) => self.text.push_str(text),
            // Incomplete sequence at the very end: keep it for the next chunk
            Err(err) if err.error_len().is_none() => {
                let (valid, tail) = bytes.split_at(err.valid_up_to());
                self.text.push_str(&String::from_utf8_lossy(valid));
                self.pending = tail.to_vec();
            }
            Err(_) => self.text.push_str(&String::from_utf8_lossy(&bytes)),
        }
    }

    fn flush_pending(&mut self) {
        if !self.pending.is_empty() {
            let pending = std::mem::take(&mut self.pending);
            self.text.push_str(&String::from_utf8_lossy(&pending));
        }
    }
}
