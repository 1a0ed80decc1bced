//! Bounds-checked reading of X11 protocol data with the connection's
//! declared byte order.
//!
//! Every multi-byte integer on the wire is interpreted in the byte order the
//! client latched during initiation; strings and byte arrays pass through
//! untouched.

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};

use super::types::ByteOrder;
use crate::{Error, Result};

/// Cursor over a single framed message.
pub struct WireReader<'a> {
    data: &'a [u8],
    offset: usize,
    byte_order: ByteOrder,
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8], byte_order: ByteOrder) -> Self {
        Self {
            data,
            offset: 0,
            byte_order,
        }
    }

    fn take(&mut self, count: usize, what: &str) -> Result<&'a [u8]> {
        if self.offset + count > self.data.len() {
            return Err(Error::Protocol(format!(
                "short read at offset {}: need {} bytes for {}, have {}",
                self.offset,
                count,
                what,
                self.data.len() - self.offset
            )));
        }
        let bytes = &self.data[self.offset..self.offset + count];
        self.offset += count;
        Ok(bytes)
    }

    pub fn card8(&mut self) -> Result<u8> {
        Ok(self.take(1, "CARD8")?[0])
    }

    pub fn card16(&mut self) -> Result<u16> {
        let bytes = self.take(2, "CARD16")?;
        Ok(match self.byte_order {
            ByteOrder::LittleEndian => LittleEndian::read_u16(bytes),
            ByteOrder::BigEndian => BigEndian::read_u16(bytes),
        })
    }

    pub fn card32(&mut self) -> Result<u32> {
        let bytes = self.take(4, "CARD32")?;
        Ok(match self.byte_order {
            ByteOrder::LittleEndian => LittleEndian::read_u32(bytes),
            ByteOrder::BigEndian => BigEndian::read_u32(bytes),
        })
    }

    pub fn int8(&mut self) -> Result<i8> {
        Ok(self.card8()? as i8)
    }

    pub fn int16(&mut self) -> Result<i16> {
        Ok(self.card16()? as i16)
    }

    pub fn int32(&mut self) -> Result<i32> {
        Ok(self.card32()? as i32)
    }

    /// Raw bytes, unswapped.
    pub fn bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        self.take(count, "byte array")
    }

    /// STRING8 of exactly `len` bytes; lossy conversion keeps the trace
    /// printable for non-UTF-8 font and property names.
    pub fn string8(&mut self, len: usize) -> Result<String> {
        let bytes = self.take(len, "STRING8")?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Skip `count` unused bytes.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.take(count, "unused bytes")?;
        Ok(())
    }

    /// Skip up to the next 4-byte boundary relative to `len` consumed bytes
    /// of a variable tail.
    pub fn skip_pad(&mut self, len: usize) -> Result<()> {
        self.skip(super::pad(len) - len)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    pub fn has_remaining(&self) -> bool {
        self.offset < self.data.len()
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Next byte without advancing; used by the heterogeneous TEXTITEM lists.
    pub fn peek_card8(&self) -> Result<u8> {
        self.data
            .get(self.offset)
            .copied()
            .ok_or_else(|| Error::Protocol("short read: cannot peek next byte".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_little_endian() {
        let data = [0x34, 0x12, 0x78, 0x56, 0x34, 0x12];
        let mut r = WireReader::new(&data, ByteOrder::LittleEndian);
        assert_eq!(r.card16().unwrap(), 0x1234);
        assert_eq!(r.card32().unwrap(), 0x12345678);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_reader_big_endian() {
        let data = [0x12, 0x34, 0x12, 0x34, 0x56, 0x78];
        let mut r = WireReader::new(&data, ByteOrder::BigEndian);
        assert_eq!(r.card16().unwrap(), 0x1234);
        assert_eq!(r.card32().unwrap(), 0x12345678);
    }

    #[test]
    fn test_reader_bounds_checking() {
        let data = [0x12];
        let mut r = WireReader::new(&data, ByteOrder::LittleEndian);
        assert!(r.card8().is_ok());
        assert!(r.card8().is_err());
        let mut r = WireReader::new(&data, ByteOrder::LittleEndian);
        assert!(r.card16().is_err());
    }

    #[test]
    fn test_signed_reads() {
        let data = [0xFF, 0xFF, 0xFE, 0xFF];
        let mut r = WireReader::new(&data, ByteOrder::LittleEndian);
        assert_eq!(r.int16().unwrap(), -1);
        assert_eq!(r.int16().unwrap(), -2);
    }

    #[test]
    fn test_string_and_padding() {
        let data = [b'h', b'e', b'l', b'l', b'o', 0, 0, 0];
        let mut r = WireReader::new(&data, ByteOrder::LittleEndian);
        assert_eq!(r.string8(5).unwrap(), "hello");
        r.skip_pad(5).unwrap();
        assert_eq!(r.offset(), 8);
        assert!(!r.has_remaining());
    }
}
