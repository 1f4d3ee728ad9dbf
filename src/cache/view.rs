use bytes::Bytes;
use std::fmt;

/// An immutable snapshot of a cached value.
///
/// Cloning is cheap (the underlying buffer is reference-counted) so the same
/// snapshot can sit in a cache list and be handed to a caller at the same
/// time. External reads go through [`ByteView::to_vec`], which returns a
/// defensive copy: whatever the caller does with the returned buffer can
/// never reach the cached bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteView {
    bytes: Bytes,
}

impl ByteView {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Number of bytes in the snapshot. This is the value's share of the
    /// cache byte budget.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns a fresh copy of the bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for ByteView {
    fn from(bytes: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(bytes))
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_is_a_defensive_copy() {
        let view = ByteView::from(b"immutable".as_slice());

        let mut copy = view.to_vec();
        copy[0] = b'X';

        assert_eq!(view.to_vec(), b"immutable");
        assert_eq!(view.len(), 9);
    }

    #[test]
    fn test_display_renders_utf8() {
        let view = ByteView::from(b"hello".as_slice());
        assert_eq!(view.to_string(), "hello");
    }
}
