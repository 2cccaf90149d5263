//! Packs codewords into 32-bit words, most significant bit first.
//!
//! Input arrives in chunks, so the partially filled word (the carry) lives in
//! [`BitPacker`] between calls and a codeword may straddle any word boundary.

use crate::codec::code_table::CodeTable;
use crate::codec::frequency::SENTINEL;
use crate::utils::error::{HuffError, Result};

/// Bits in a packed word.
pub const WORD_BITS: u32 = 32;

/// The partially filled accumulator threaded between chunks.
///
/// `word` holds `32 - bits_free` valid bits, right-aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carry {
    pub word: u32,
    pub bits_free: u32,
}

impl Carry {
    pub const EMPTY: Carry = Carry {
        word: 0,
        bits_free: WORD_BITS,
    };

    pub fn is_empty(&self) -> bool {
        self.bits_free == WORD_BITS
    }

    /// The carry as a final word: valid bits at the top, zero padding below.
    pub fn left_justified(&self) -> u32 {
        shl(self.word, self.bits_free)
    }
}

impl Default for Carry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Whole words plus the padding count of the last one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedStream {
    pub words: Vec<u32>,
    /// Zero-padding bits at the bottom of the last word (0..=31).
    pub remainder: u8,
}

impl PackedStream {
    /// Number of payload bits.
    pub fn bit_len(&self) -> u64 {
        self.words.len() as u64 * u64::from(WORD_BITS) - u64::from(self.remainder)
    }

    /// Valid bits in the word at `index`.
    pub fn bits_in_word(&self, index: usize) -> u32 {
        if index + 1 == self.words.len() {
            WORD_BITS - u32::from(self.remainder)
        } else {
            WORD_BITS
        }
    }
}

/// Stateful packer for one compression job.
#[derive(Debug, Default)]
pub struct BitPacker {
    carry: Carry,
    bits_written: u64,
}

impl BitPacker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes from a carry produced by an earlier packer.
    pub fn with_carry(carry: Carry) -> Self {
        Self {
            carry: Carry {
                word: carry.word,
                bits_free: carry.bits_free.min(WORD_BITS),
            },
            bits_written: 0,
        }
    }

    pub fn carry(&self) -> Carry {
        self.carry
    }

    /// Codeword bits packed by this packer so far.
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Packs `symbols` and returns the words completed by this batch.
    pub fn pack(&mut self, symbols: &[char], table: &CodeTable) -> Result<Vec<u32>> {
        let mut words = Vec::with_capacity(symbols.len() / 4 + 1);
        self.pack_into(symbols, table, &mut words)?;
        Ok(words)
    }

    /// Like [`pack`](Self::pack) but appends to `out`.
    pub fn pack_into(
        &mut self,
        symbols: &[char],
        table: &CodeTable,
        out: &mut Vec<u32>,
    ) -> Result<()> {
        for &symbol in symbols {
            if symbol == SENTINEL {
                continue;
            }
            let code = table.get(symbol).ok_or(HuffError::UnknownSymbol(symbol))?;
            self.push_bits(code.bits, u32::from(code.len), out);
        }
        Ok(())
    }

    fn push_bits(&mut self, bits: u64, len: u32, out: &mut Vec<u32>) {
        self.bits_written += u64::from(len);
        let mut remaining = len;

        while remaining > 0 {
            let free = self.carry.bits_free;
            if remaining <= free {
                self.carry.word = shl(self.carry.word, remaining) | (bits & mask(remaining)) as u32;
                self.carry.bits_free -= remaining;
                remaining = 0;
            } else {
                // Top `free` bits of what is left complete the current word.
                let rest = remaining - free;
                let high = (bits.checked_shr(rest).unwrap_or(0) & mask(free)) as u32;
                self.carry.word = shl(self.carry.word, free) | high;
                self.carry.bits_free = 0;
                remaining = rest;
            }

            if self.carry.bits_free == 0 {
                out.push(self.carry.word);
                self.carry = Carry::EMPTY;
            }
        }
    }

    /// The partial word as it would be written now, with its padding count.
    pub fn pending(&self) -> Option<(u32, u8)> {
        if self.carry.is_empty() {
            None
        } else {
            Some((self.carry.left_justified(), self.carry.bits_free as u8))
        }
    }

    /// Ends the job, yielding the last partial word if there is one.
    pub fn finish(self) -> Option<(u32, u8)> {
        self.pending()
    }
}

/// Packs a whole symbol sequence in one call.
pub fn pack_symbols(symbols: &[char], table: &CodeTable) -> Result<PackedStream> {
    let mut packer = BitPacker::new();
    let mut words = packer.pack(symbols, table)?;
    let remainder = match packer.finish() {
        Some((word, bits_free)) => {
            words.push(word);
            bits_free
        }
        None => 0,
    };
    Ok(PackedStream { words, remainder })
}

#[inline]
fn shl(word: u32, n: u32) -> u32 {
    word.checked_shl(n).unwrap_or(0)
}

#[inline]
fn mask(n: u32) -> u64 {
    if n >= 64 { u64::MAX } else { (1u64 << n) - 1 }
}
