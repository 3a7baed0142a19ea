//! Binary write helper shared by every format writer.
//!
//! Ported from the ancestor library's `formats::io::utils::WriteHelper`,
//! trimmed to the writer half only: format reading is out of scope here.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

/// Helper for writing to binary streams, tracking total bytes written.
pub struct WriteHelper<W: Write> {
    writer: W,
    bytes_written: usize,
}

impl<W: Write> WriteHelper<W> {
    /// Create a new `WriteHelper`.
    pub fn new(writer: W) -> Self {
        Self { writer, bytes_written: 0 }
    }

    /// Number of bytes written so far.
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Write raw bytes.
    pub fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        self.writer.write_all(data)?;
        self.bytes_written = self.bytes_written.saturating_add(data.len());
        Ok(())
    }

    /// Write a single byte.
    pub fn write_u8(&mut self, value: u8) -> io::Result<()> {
        self.writer.write_u8(value)?;
        self.bytes_written = self.bytes_written.saturating_add(1);
        Ok(())
    }

    /// Write `i8`.
    pub fn write_i8(&mut self, value: i8) -> io::Result<()> {
        self.writer.write_i8(value)?;
        self.bytes_written = self.bytes_written.saturating_add(1);
        Ok(())
    }

    /// Write `u16`, little-endian.
    pub fn write_u16_le(&mut self, value: u16) -> io::Result<()> {
        self.writer.write_u16::<LittleEndian>(value)?;
        self.bytes_written = self.bytes_written.saturating_add(2);
        Ok(())
    }

    /// Write `i16`, little-endian.
    pub fn write_i16_le(&mut self, value: i16) -> io::Result<()> {
        self.writer.write_i16::<LittleEndian>(value)?;
        self.bytes_written = self.bytes_written.saturating_add(2);
        Ok(())
    }

    /// Write `u32`, little-endian.
    pub fn write_u32_le(&mut self, value: u32) -> io::Result<()> {
        self.writer.write_u32::<LittleEndian>(value)?;
        self.bytes_written = self.bytes_written.saturating_add(4);
        Ok(())
    }

    /// Write `i32`, little-endian.
    pub fn write_i32_le(&mut self, value: i32) -> io::Result<()> {
        self.writer.write_i32::<LittleEndian>(value)?;
        self.bytes_written = self.bytes_written.saturating_add(4);
        Ok(())
    }

    /// Write a string as raw UTF-8 bytes, no length prefix.
    pub fn write_string(&mut self, s: &str) -> io::Result<()> {
        self.writer.write_all(s.as_bytes())?;
        self.bytes_written = self.bytes_written.saturating_add(s.len());
        Ok(())
    }

    /// Write a fixed-width, zero-padded (or truncated) string field.
    pub fn write_cstring(&mut self, s: &str, length: usize) -> io::Result<()> {
        if length == 0 {
            return Ok(());
        }
        let bytes = s.as_bytes();
        let len = bytes.len().min(length);
        self.writer.write_all(&bytes[..len])?;
        for _ in 0..(length - len) {
            self.writer.write_u8(0)?;
        }
        self.bytes_written = self.bytes_written.saturating_add(length);
        Ok(())
    }

    /// Consume and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_bytes_written() {
        let mut buf = Vec::new();
        let mut w = WriteHelper::new(&mut buf);
        w.write_u8(1).unwrap();
        w.write_u16_le(2).unwrap();
        assert_eq!(w.bytes_written(), 3);
        assert_eq!(buf, vec![1, 2, 0]);
    }

    #[test]
    fn cstring_pads_with_zeros() {
        let mut buf = Vec::new();
        let mut w = WriteHelper::new(&mut buf);
        w.write_cstring("AB", 5).unwrap();
        assert_eq!(buf, vec![b'A', b'B', 0, 0, 0]);
    }
}
