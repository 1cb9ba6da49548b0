//! Bounds-checked reads over the raw QQwry buffer

use crate::error::{IpdbError, Result};

/// Redirect mode constants
pub const DIRECT_MODE: u8 = 0x00;
pub const REDIRECT_MODE_1: u8 = 0x01;
pub const REDIRECT_MODE_2: u8 = 0x02;

/// Read-only view over the database bytes.
///
/// Every accessor checks the requested range against the buffer length and
/// reports [`IpdbError::Format`] instead of panicking, so no caller ever
/// indexes the buffer directly.
#[derive(Clone, Copy)]
pub struct ByteView<'a> {
    data: &'a [u8],
}

impl<'a> ByteView<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Borrow `len` bytes starting at `offset`
    pub fn slice(&self, offset: u32, len: usize) -> Result<&'a [u8]> {
        let start = offset as usize;
        let end = start
            .checked_add(len)
            .ok_or(IpdbError::Format("offset overflow"))?;
        self.data
            .get(start..end)
            .ok_or(IpdbError::Format("offset out of bounds"))
    }

    pub fn read_u8(&self, offset: u32) -> Result<u8> {
        Ok(self.slice(offset, 1)?[0])
    }

    /// Read a 3-byte little-endian pointer
    pub fn read_u24(&self, offset: u32) -> Result<u32> {
        let b = self.slice(offset, 3)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], 0]))
    }

    pub fn read_u32(&self, offset: u32) -> Result<u32> {
        let b = self.slice(offset, 4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a null-terminated string.
    ///
    /// Returns the bytes before the terminator and the offset just past it.
    /// A string that reaches the end of the buffer without a terminator is a
    /// format error.
    pub fn read_cstr(&self, offset: u32) -> Result<(&'a [u8], u32)> {
        let tail = self
            .data
            .get(offset as usize..)
            .filter(|tail| !tail.is_empty())
            .ok_or(IpdbError::Format("string offset out of bounds"))?;
        let len = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or(IpdbError::Format("unterminated string"))?;
        let next = u32::try_from(offset as usize + len + 1)
            .map_err(|_| IpdbError::Format("offset overflow"))?;
        Ok((&tail[..len], next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_u24() {
        let view = ByteView::new(&[0x01, 0x02, 0x03]);
        assert_eq!(view.read_u24(0).unwrap(), 0x00030201);
        assert!(view.read_u24(1).is_err());
    }

    #[test]
    fn test_read_u32() {
        let view = ByteView::new(&[0x78, 0x56, 0x34, 0x12, 0xff]);
        assert_eq!(view.read_u32(0).unwrap(), 0x12345678);
        assert!(matches!(view.read_u32(2), Err(IpdbError::Format(_))));
    }

    #[test]
    fn test_read_past_end() {
        let view = ByteView::new(&[0u8; 4]);
        assert!(view.read_u8(3).is_ok());
        assert!(view.read_u8(4).is_err());
        assert!(view.read_u8(u32::MAX).is_err());
        assert!(view.slice(u32::MAX, usize::MAX).is_err());
    }

    #[test]
    fn test_read_cstr() {
        let view = ByteView::new(b"abc\0\0xy");
        assert_eq!(view.read_cstr(0).unwrap(), (&b"abc"[..], 4));
        assert_eq!(view.read_cstr(4).unwrap(), (&b""[..], 5));
    }

    #[test]
    fn test_read_cstr_unterminated() {
        let view = ByteView::new(b"abc\0xy");
        assert!(matches!(view.read_cstr(4), Err(IpdbError::Format(_))));
        assert!(matches!(view.read_cstr(6), Err(IpdbError::Format(_))));
        assert!(matches!(view.read_cstr(100), Err(IpdbError::Format(_))));
    }
}
