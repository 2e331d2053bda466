//! Decodable trait & Decoder
use crate::error::{DecodeError, DecodeResult};

use std::{convert::TryInto, mem, net::Ipv4Addr};

/// A trait for types which are deserializable from DHCP binary formats
pub trait Decodable: Sized {
    /// Read the type from the stream
    fn decode(decoder: &mut Decoder<'_>) -> DecodeResult<Self>;

    /// Returns the object in binary form
    fn from_bytes(bytes: &[u8]) -> DecodeResult<Self> {
        let mut decoder = Decoder::new(bytes);
        Self::decode(&mut decoder)
    }
}

/// Decoder type. Wraps a buffer which only contains bytes that have not been read yet
#[derive(Debug)]
pub struct Decoder<'a> {
    buffer: &'a [u8],
}

impl<'a> Decoder<'a> {
    /// Create a new Decoder
    pub fn new(buffer: &'a [u8]) -> Self {
        Decoder { buffer }
    }

    /// read a u8
    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        Ok(u8::from_be_bytes(self.read::<{ mem::size_of::<u8>() }>()?))
    }

    /// read a u16
    pub fn read_u16(&mut self) -> DecodeResult<u16> {
        Ok(u16::from_be_bytes(
            self.read::<{ mem::size_of::<u16>() }>()?,
        ))
    }

    /// read a u32
    pub fn read_u32(&mut self) -> DecodeResult<u32> {
        Ok(u32::from_be_bytes(
            self.read::<{ mem::size_of::<u32>() }>()?,
        ))
    }

    /// read `N` bytes into an array
    pub fn read<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        if N > self.buffer.len() {
            return Err(DecodeError::NotEnoughBytes);
        }
        let (slice, remaining) = self.buffer.split_at(N);
        self.buffer = remaining;
        // can't panic-- condition checked above
        Ok(slice.try_into().unwrap())
    }

    /// peek `N` bytes without consuming them
    pub fn peek<const N: usize>(&self) -> DecodeResult<[u8; N]> {
        if N > self.buffer.len() {
            return Err(DecodeError::NotEnoughBytes);
        }
        Ok(self.buffer[..N].try_into()?)
    }

    /// peek a single byte without consuming it
    pub fn peek_u8(&self) -> DecodeResult<u8> {
        Ok(u8::from_be_bytes(self.peek::<1>()?))
    }

    /// read a slice of bytes determined at runtime
    pub fn read_slice(&mut self, len: usize) -> DecodeResult<&'a [u8]> {
        if len > self.buffer.len() {
            return Err(DecodeError::NotEnoughBytes);
        }
        let (slice, remaining) = self.buffer.split_at(len);
        self.buffer = remaining;
        Ok(slice)
    }

    /// Read `len` bytes into a String. Non-UTF-8 sequences are replaced,
    /// the wire carries no encoding promise.
    pub fn read_string(&mut self, len: usize) -> DecodeResult<String> {
        let slice = self.read_slice(len)?;
        Ok(String::from_utf8_lossy(slice).into_owned())
    }

    /// Read a `MAX` length fixed field holding a NUL-terminated string.
    /// Returns `None` when the field is empty.
    pub fn read_nul_string<const MAX: usize>(&mut self) -> DecodeResult<Option<String>> {
        let bytes = self.read::<MAX>()?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(MAX);
        if end == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&bytes[..end]).into_owned()))
    }

    /// Read an ipv4 addr
    pub fn read_ipv4(&mut self, length: usize) -> DecodeResult<Ipv4Addr> {
        if length != 4 {
            return Err(DecodeError::NotEnoughBytes);
        }
        let bytes = self.read::<4>()?;
        Ok(bytes.into())
    }

    /// return slice of buffer starting at index of unread data
    pub fn buffer(&self) -> &[u8] {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_consumes() -> DecodeResult<()> {
        let buf = [0xde, 0xad, 0xc0, 0xde, 0x01];
        let mut d = Decoder::new(&buf);
        assert_eq!(d.read_u32()?, 0xdead_c0de);
        assert_eq!(d.peek_u8()?, 1);
        assert_eq!(d.read_u8()?, 1);
        assert!(matches!(d.read_u8(), Err(DecodeError::NotEnoughBytes)));
        Ok(())
    }

    #[test]
    fn nul_string_truncates() -> DecodeResult<()> {
        let mut buf = [0u8; 8];
        buf[..3].copy_from_slice(b"srv");
        let mut d = Decoder::new(&buf);
        assert_eq!(d.read_nul_string::<8>()?.as_deref(), Some("srv"));
        assert!(d.buffer().is_empty());

        // empty field is suppressed
        let zero = [0u8; 8];
        let mut d = Decoder::new(&zero);
        assert_eq!(d.read_nul_string::<8>()?, None);
        Ok(())
    }

    #[test]
    fn nul_string_unterminated_takes_field() -> DecodeResult<()> {
        let buf = *b"abcd";
        let mut d = Decoder::new(&buf);
        assert_eq!(d.read_nul_string::<4>()?.as_deref(), Some("abcd"));
        Ok(())
    }
}
