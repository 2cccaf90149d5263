//! Per-symbol codewords derived from a tree's root-to-leaf paths.

use crate::codec::frequency::{FrequencyTable, SENTINEL};
use crate::codec::tree::{HuffNode, HuffmanTree};
use crate::utils::error::{HuffError, Result};
use std::collections::BTreeMap;

/// Longest codeword a [`Codeword`] can hold.
pub const MAX_CODE_LEN: usize = 64;

/// A right-aligned bit pattern and its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codeword {
    pub bits: u64,
    pub len: u8,
}

impl Codeword {
    pub fn new(bits: u64, len: u8) -> Self {
        Self { bits, len }
    }

    /// True if `self` is a bit-prefix of `other` (or equal to it).
    pub fn is_prefix_of(&self, other: &Codeword) -> bool {
        if self.len > other.len {
            return false;
        }
        let shift = other.len - self.len;
        other.bits.checked_shr(shift as u32).unwrap_or(0) == self.bits
    }
}

/// Symbol → codeword mapping for one tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<char, Codeword>,
}

impl CodeTable {
    /// Walks `tree` and records one codeword per leaf.
    ///
    /// A tree whose root is a leaf gets the one-bit codeword `0`.
    pub fn from_tree(tree: &HuffmanTree) -> Result<Self> {
        let mut table = CodeTable::default();
        let root = tree.root();

        if root.is_leaf() {
            table.codes.insert(root.symbol, Codeword::new(0, 1));
            return Ok(table);
        }

        table.collect(root, 0, 0)?;
        log::debug!("code table: {} codewords", table.len());
        Ok(table)
    }

    fn collect(&mut self, node: &HuffNode, code: u64, depth: usize) -> Result<()> {
        if depth > MAX_CODE_LEN {
            return Err(HuffError::CodeTooLong(depth));
        }

        let code = if depth == 0 {
            code
        } else {
            (code << 1) | u64::from(node.branch_code)
        };

        if node.is_leaf() {
            if node.symbol != SENTINEL {
                self.codes.insert(node.symbol, Codeword::new(code, depth as u8));
            }
            return Ok(());
        }

        if let Some(left) = &node.left {
            self.collect(left, code, depth + 1)?;
        }
        if let Some(right) = &node.right {
            self.collect(right, code, depth + 1)?;
        }
        Ok(())
    }

    pub fn get(&self, symbol: char) -> Option<Codeword> {
        self.codes.get(&symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, Codeword)> + '_ {
        self.codes.iter().map(|(&s, &c)| (s, c))
    }

    /// Payload size in bits for input with the given symbol counts.
    pub fn encoded_bits(&self, frequencies: &FrequencyTable) -> u64 {
        frequencies
            .iter()
            .filter_map(|(symbol, count)| self.get(symbol).map(|c| u64::from(c.len) * count))
            .sum()
    }

    /// Checks that no codeword is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        let codes: Vec<Codeword> = self.codes.values().copied().collect();
        codes.iter().enumerate().all(|(i, a)| {
            codes
                .iter()
                .enumerate()
                .all(|(j, b)| i == j || !a.is_prefix_of(b))
        })
    }
}

impl FromIterator<(char, Codeword)> for CodeTable {
    fn from_iter<I: IntoIterator<Item = (char, Codeword)>>(iter: I) -> Self {
        Self {
            codes: iter.into_iter().collect(),
        }
    }
}
