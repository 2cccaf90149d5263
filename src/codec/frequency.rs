//! Symbol counting and chunked UTF-8 decoding.
//!
//! Both passes of a compression job read their input through [`SymbolReader`],
//! so the analyzer and the packer always agree on where code points begin.

use crate::utils::config::MIN_CHUNK_SIZE;
use crate::utils::error::{HuffError, Result};
use std::collections::BTreeMap;
use std::io::{self, Read};

/// The symbol reserved for internal tree nodes. Never a valid input symbol.
pub const SENTINEL: char = '\0';

/// Occurrence count per symbol, ordered by code point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<char, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts the symbols of an in-memory string.
    pub fn from_text(text: &str) -> Self {
        let mut table = Self::new();
        for c in text.chars() {
            table.add(c, 1);
        }
        table
    }

    fn add(&mut self, symbol: char, count: u64) {
        *self.counts.entry(symbol).or_insert(0) += count;
    }

    pub fn get(&self, symbol: char) -> Option<u64> {
        self.counts.get(&symbol).copied()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn contains_sentinel(&self) -> bool {
        self.counts.contains_key(&SENTINEL)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, u64)> + '_ {
        self.counts.iter().map(|(&s, &c)| (s, c))
    }
}

impl FromIterator<(char, u64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (char, u64)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (symbol, count) in iter {
            table.add(symbol, count);
        }
        table
    }
}

/// Scans `reader` to the end and counts every symbol.
///
/// Fails with [`HuffError::ReservedSymbol`] if the input contains U+0000.
pub fn analyze<R: Read>(reader: R, chunk_size: usize) -> Result<FrequencyTable> {
    let mut symbols = SymbolReader::new(reader, chunk_size);
    let mut table = FrequencyTable::new();

    while let Some(chunk) = symbols.next_chunk()? {
        for symbol in chunk {
            if symbol == SENTINEL {
                return Err(HuffError::ReservedSymbol);
            }
            table.add(symbol, 1);
        }
    }

    log::debug!(
        "analyzed {} symbols, {} distinct",
        table.total(),
        table.len()
    );
    Ok(table)
}

/// Decodes a byte stream into batches of `char`, one batch per read.
///
/// A multi-byte sequence split by a read boundary is held back and completed
/// by the next read.
pub struct SymbolReader<R: Read> {
    inner: R,
    buf: Vec<u8>,
    partial: Vec<u8>,
}

impl<R: Read> SymbolReader<R> {
    pub fn new(inner: R, chunk_size: usize) -> Self {
        Self {
            inner,
            buf: vec![0; chunk_size.max(MIN_CHUNK_SIZE)],
            partial: Vec::with_capacity(4),
        }
    }

    /// Returns the symbols decoded from the next read, or `None` at end of stream.
    pub fn next_chunk(&mut self) -> Result<Option<Vec<char>>> {
        loop {
            let n = match self.inner.read(&mut self.buf) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HuffError::read(e)),
            };

            if n == 0 {
                if !self.partial.is_empty() {
                    return Err(invalid_utf8("stream ends inside a UTF-8 sequence"));
                }
                return Ok(None);
            }

            let mut data = std::mem::take(&mut self.partial);
            data.extend_from_slice(&self.buf[..n]);

            let valid = match std::str::from_utf8(&data) {
                Ok(_) => data.len(),
                Err(e) if e.error_len().is_none() => e.valid_up_to(),
                Err(_) => return Err(invalid_utf8("input is not valid UTF-8")),
            };

            let text = std::str::from_utf8(&data[..valid])
                .map_err(|_| invalid_utf8("input is not valid UTF-8"))?;
            let symbols: Vec<char> = text.chars().collect();
            self.partial.extend_from_slice(&data[valid..]);

            if !symbols.is_empty() {
                return Ok(Some(symbols));
            }
        }
    }
}

fn invalid_utf8(msg: &str) -> HuffError {
    HuffError::read(io::Error::new(io::ErrorKind::InvalidData, msg.to_string()))
}
