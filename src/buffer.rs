use crate::error::Error;

/// An owned, append-only, growable byte buffer.
///
/// Every rendering entry point writes through one of these. A `Buffer` is
/// also the payload of `Value::Buffer`, so the sink the engine writes to and
/// the mutable byte sequence the language exposes are the same type.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Buffer {
    data: Vec<u8>,
}

impl Buffer {
    pub fn new() -> Self {
        Buffer { data: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Buffer {
            data: Vec::with_capacity(cap),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Buffer {
            data: bytes.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn push(&mut self, byte: u8) {
        self.data.push(byte);
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn push_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Grow capacity ahead of a batch of pushes. Allocation failure aborts the
    /// process (std behavior), so a `Buffer` never holds partial output.
    pub fn reserve(&mut self, additional: usize) {
        self.data.reserve(additional);
    }

    /// Fallible variant of [`reserve`](Self::reserve) for hosts that want to
    /// surface exhaustion as an error instead of aborting.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.data
            .try_reserve(additional)
            .map_err(|_| Error::OutOfMemory)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Consume the buffer as a `String`, replacing invalid UTF-8 sequences.
    /// Escaped output is always ASCII; raw `display` of binary data may not be.
    pub fn into_string(self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_read_back() {
        let mut buf = Buffer::new();
        buf.push(b'a');
        buf.push_bytes(b"bc");
        buf.push_str("de");
        assert_eq!(buf.as_bytes(), b"abcde");
        assert_eq!(buf.len(), 5);
        assert_eq!(buf.into_string(), "abcde");
    }

    #[test]
    fn test_clear_keeps_buffer_usable() {
        let mut buf = Buffer::from_bytes(b"junk");
        buf.clear();
        assert!(buf.is_empty());
        buf.push_str("ok");
        assert_eq!(buf.as_bytes(), b"ok");
    }

    #[test]
    fn test_try_reserve_small() {
        let mut buf = Buffer::new();
        assert!(buf.try_reserve(64).is_ok());
    }

    #[test]
    fn test_into_string_lossy() {
        let buf = Buffer::from_bytes(&[b'a', 0xFF, b'b']);
        assert_eq!(buf.into_string(), "a\u{FFFD}b");
    }
}
