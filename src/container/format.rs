// src/container/format.rs

//! The compressed container and the two top-level operations.
//!
//! ```text
//! [u32 MAGIC] [tree] [u32 word]* [u32 REMAINDER_MAGIC] [u8 remainder]
//! ```
//!
//! All integers are little-endian. `remainder` is the number of zero-padding
//! bits at the bottom of the last payload word; 0 means that word is full.

use crate::codec::code_table::CodeTable;
use crate::codec::frequency::{SymbolReader, analyze};
use crate::codec::packer::{BitPacker, WORD_BITS};
use crate::codec::tree::HuffmanTree;
use crate::codec::walker::Walker;
use crate::container::stream::{
    ContainerRead, ContainerWrite, CountingReader, CountingWriter, eof_as,
};
use crate::container::tree_io::{read_tree, write_tree};
use crate::utils::config::CodecOptions;
use crate::utils::error::{HuffError, Result};
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};

/// "HUFF" read as a little-endian word.
pub const MAGIC: u32 = 0x4855_4646;

/// "REMB": marks the end of the payload.
pub const REMAINDER_MAGIC: u32 = 0x5245_4D42;

/// Bytes after the payload: the end marker and the remainder count.
pub const TRAILER_LEN: u64 = 5;

/// Summary of a [`compress`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompressionStats {
    /// Symbols read from the input.
    pub symbols: u64,
    pub distinct_symbols: usize,
    /// Codeword bits in the payload, padding excluded.
    pub payload_bits: u64,
    pub payload_words: u64,
    /// Padding bits in the last payload word.
    pub remainder: u8,
    /// Total container size.
    pub bytes_written: u64,
}

/// Summary of a [`decompress`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecompressionStats {
    pub symbols: u64,
    pub payload_words: u64,
    pub bytes_written: u64,
}

/// Everything in a container except the payload itself.
#[derive(Debug, Clone)]
pub struct ContainerHeader {
    /// `None` for the container of an empty input.
    pub tree: Option<HuffmanTree>,
    pub remainder: u8,
    /// Offset of the first payload word from the start of the stream.
    pub payload_offset: u64,
    pub payload_words: u64,
}

impl ContainerHeader {
    /// Valid bits in the final payload word.
    pub fn last_word_bits(&self) -> u32 {
        WORD_BITS - u32::from(self.remainder)
    }
}

/// Compresses `input` into a container written to `output`.
///
/// The input is read twice: once to count symbols, then again from the
/// position it had on entry to pack them.
pub fn compress<R, W>(mut input: R, output: W, options: &CodecOptions) -> Result<CompressionStats>
where
    R: Read + Seek,
    W: Write,
{
    let start = input.stream_position().map_err(HuffError::read)?;

    let frequencies = analyze(&mut input, options.chunk_size())?;
    let tree = HuffmanTree::build(&frequencies)?;
    let codes = match &tree {
        Some(tree) => CodeTable::from_tree(tree)?,
        None => CodeTable::default(),
    };

    input.seek(SeekFrom::Start(start)).map_err(HuffError::read)?;

    let mut out = CountingWriter::new(BufWriter::new(output));
    out.put_u32(MAGIC)?;
    write_tree(tree.as_ref(), &mut out)?;

    let mut symbols = SymbolReader::new(&mut input, options.chunk_size());
    let mut packer = BitPacker::new();
    let mut words = Vec::new();
    let mut stats = CompressionStats {
        distinct_symbols: frequencies.len(),
        ..Default::default()
    };

    while let Some(chunk) = symbols.next_chunk()? {
        words.clear();
        packer.pack_into(&chunk, &codes, &mut words)?;
        out.put_words(&words)?;

        stats.symbols += chunk.len() as u64;
        stats.payload_words += words.len() as u64;
        log::trace!(
            "packed {} symbols into {} words, carry {:?}",
            chunk.len(),
            words.len(),
            packer.carry()
        );
    }

    stats.payload_bits = packer.bits_written();
    stats.remainder = match packer.finish() {
        Some((word, bits_free)) => {
            out.put_u32(word)?;
            stats.payload_words += 1;
            bits_free
        }
        None => 0,
    };

    out.put_u32(REMAINDER_MAGIC)?;
    out.put_u8(stats.remainder)?;
    out.flush().map_err(HuffError::write)?;
    stats.bytes_written = out.bytes_written();

    log::debug!(
        "compressed {} symbols ({} distinct) into {} bytes, {} payload bits",
        stats.symbols,
        stats.distinct_symbols,
        stats.bytes_written,
        stats.payload_bits
    );
    Ok(stats)
}

/// Reads and validates everything but the payload.
///
/// On success `input` is positioned at the first payload word.
pub fn read_header<R: Read + Seek>(input: &mut R) -> Result<ContainerHeader> {
    let start = input.stream_position().map_err(HuffError::read)?;
    let end = input.seek(SeekFrom::End(0)).map_err(HuffError::read)?;
    input.seek(SeekFrom::Start(start)).map_err(HuffError::read)?;

    let found = eof_as(input.get_u32(), || HuffError::BadMagic {
        expected: MAGIC,
        found: 0,
    })?;
    if found != MAGIC {
        return Err(HuffError::BadMagic {
            expected: MAGIC,
            found,
        });
    }

    // The buffer reads past the tree, so its end comes from the byte count.
    let mut tree_reader = CountingReader::new(BufReader::new(input.by_ref()));
    let tree = read_tree(&mut tree_reader)?;
    let payload_offset = start + 4 + tree_reader.bytes_read();

    if end < payload_offset + TRAILER_LEN {
        return Err(malformed("container has no trailer"));
    }
    let trailer = end - TRAILER_LEN;

    // The remainder count is the very last byte.
    input.seek(SeekFrom::Start(end - 1)).map_err(HuffError::read)?;
    let remainder = match eof_as(input.get_u8(), || malformed("missing remainder byte"))? {
        r @ 0..=31 => r,
        32 => {
            log::warn!("remainder byte 32 read as a full final word");
            0
        }
        r => return Err(malformed(&format!("remainder byte {r} out of range"))),
    };

    input.seek(SeekFrom::Start(trailer)).map_err(HuffError::read)?;
    let marker = eof_as(input.get_u32(), || malformed("missing end marker"))?;
    if marker != REMAINDER_MAGIC {
        return Err(malformed(&format!(
            "expected end marker {REMAINDER_MAGIC:#010x}, found {marker:#010x}"
        )));
    }

    let payload_len = trailer - payload_offset;
    if payload_len % 4 != 0 {
        return Err(malformed(&format!(
            "payload of {payload_len} bytes is not a whole number of words"
        )));
    }

    input.seek(SeekFrom::Start(payload_offset)).map_err(HuffError::read)?;
    Ok(ContainerHeader {
        tree,
        remainder,
        payload_offset,
        payload_words: payload_len / 4,
    })
}

/// Restores the original text of a container produced by [`compress`].
pub fn decompress<R, W>(mut input: R, output: W) -> Result<DecompressionStats>
where
    R: Read + Seek,
    W: Write,
{
    let header = read_header(&mut input)?;
    let mut out = CountingWriter::new(BufWriter::new(output));

    let Some(tree) = header.tree.as_ref() else {
        if header.payload_words != 0 {
            return Err(malformed("payload present without a tree"));
        }
        out.flush().map_err(HuffError::write)?;
        log::debug!("decompressed an empty container");
        return Ok(DecompressionStats::default());
    };
    if header.payload_words == 0 {
        return Err(malformed("tree present without a payload"));
    }

    let mut reader = BufReader::new(input);
    let mut walker = Walker::new(tree);
    let mut symbols = Vec::new();
    let mut text = String::new();

    let mut current = payload_word(&mut reader)?;
    let mut index = 1;
    loop {
        // One word of lookahead: the word after the last payload word is the end marker.
        let next = payload_word(&mut reader)?;
        let is_last = index == header.payload_words;
        if is_last && next != REMAINDER_MAGIC {
            return Err(malformed("end marker moved while reading the payload"));
        }

        let bits = if is_last { header.last_word_bits() } else { WORD_BITS };
        walker.feed(current, bits, &mut symbols)?;

        text.clear();
        text.extend(symbols.drain(..));
        out.write_all(text.as_bytes()).map_err(HuffError::write)?;

        if is_last {
            break;
        }
        current = next;
        index += 1;
    }

    let symbol_count = walker.finish()?;
    out.flush().map_err(HuffError::write)?;

    let stats = DecompressionStats {
        symbols: symbol_count,
        payload_words: header.payload_words,
        bytes_written: out.bytes_written(),
    };
    log::debug!(
        "decompressed {} words into {} symbols ({} bytes)",
        stats.payload_words,
        stats.symbols,
        stats.bytes_written
    );
    Ok(stats)
}

/// In-memory [`compress`] with default options.
pub fn compress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    compress(Cursor::new(data), &mut out, &CodecOptions::default())?;
    Ok(out)
}

/// In-memory [`decompress`].
pub fn decompress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decompress(Cursor::new(data), &mut out)?;
    Ok(out)
}

fn payload_word<R: Read>(reader: &mut R) -> Result<u32> {
    eof_as(reader.get_u32(), || malformed("payload ends before the end marker"))
}

fn malformed(msg: &str) -> HuffError {
    HuffError::MalformedBitstream(msg.to_string())
}
