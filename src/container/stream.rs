// src/container/stream.rs

//! Little-endian field access for the container format.

use crate::utils::error::{HuffError, Result};
use bytemuck::{Pod, Zeroable, cast_slice};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// Writes container fields. Failures surface as [`HuffError::Write`].
pub trait ContainerWrite: Write {
    fn put_u8(&mut self, value: u8) -> Result<()> {
        WriteBytesExt::write_u8(self, value).map_err(HuffError::write)
    }

    fn put_u32(&mut self, value: u32) -> Result<()> {
        WriteBytesExt::write_u32::<LittleEndian>(self, value).map_err(HuffError::write)
    }

    fn put_u64(&mut self, value: u64) -> Result<()> {
        WriteBytesExt::write_u64::<LittleEndian>(self, value).map_err(HuffError::write)
    }

    /// Writes a batch of payload words with a single `write_all`.
    fn put_words(&mut self, words: &[u32]) -> Result<()> {
        if words.is_empty() {
            return Ok(());
        }
        let le_words: Vec<LeU32> = words.iter().map(|&w| w.into()).collect();
        let bytes: &[u8] = cast_slice(&le_words);
        self.write_all(bytes).map_err(HuffError::write)
    }
}

impl<W: Write + ?Sized> ContainerWrite for W {}

/// Reads container fields.
///
/// Errors stay as `io::Error` so each caller can decide what a premature end
/// of stream means for its section.
pub trait ContainerRead: Read {
    fn get_u8(&mut self) -> io::Result<u8> {
        ReadBytesExt::read_u8(self)
    }

    fn get_u32(&mut self) -> io::Result<u32> {
        ReadBytesExt::read_u32::<LittleEndian>(self)
    }

    fn get_u64(&mut self) -> io::Result<u64> {
        ReadBytesExt::read_u64::<LittleEndian>(self)
    }
}

impl<R: Read + ?Sized> ContainerRead for R {}

/// Maps a premature end of stream to `on_eof` and anything else to a read error.
pub(crate) fn eof_as<T>(res: io::Result<T>, on_eof: impl FnOnce() -> HuffError) -> Result<T> {
    res.map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            on_eof()
        } else {
            HuffError::read(e)
        }
    })
}

/// Counts bytes passed through to the inner writer.
pub struct CountingWriter<W: Write> {
    inner: W,
    written: u64,
}

impl<W: Write> CountingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub fn bytes_written(&self) -> u64 {
        self.written
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Counts bytes taken from the inner reader.
pub struct CountingReader<R: Read> {
    inner: R,
    read: u64,
}

impl<R: Read> CountingReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, read: 0 }
    }

    pub fn bytes_read(&self) -> u64 {
        self.read
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.read += n as u64;
        Ok(n)
    }
}

/// Little-endian u32 that can be safely cast to bytes
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct LeU32([u8; 4]);

impl From<u32> for LeU32 {
    fn from(value: u32) -> Self {
        LeU32(value.to_le_bytes())
    }
}
