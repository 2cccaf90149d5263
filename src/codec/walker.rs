//! Walks packed words through the tree and emits symbols.

use crate::codec::packer::WORD_BITS;
use crate::codec::tree::{HuffNode, HuffmanTree};
use crate::utils::error::{HuffError, Result};
use bitvec::prelude::*;
use std::ptr;

/// Decodes the top `bits_to_read` bits of `word`, starting at `current`.
///
/// Returns the node the walk stopped on, which is `root` when the last bit
/// completed a codeword, together with the symbols completed on the way.
/// Passing that node back in as `current` resumes a codeword split across
/// words.
pub fn decode_word<'t>(
    word: u32,
    bits_to_read: u32,
    current: &'t HuffNode,
    root: &'t HuffNode,
) -> Result<(&'t HuffNode, Vec<char>)> {
    let mut out = Vec::new();
    let next = decode_word_into(word, bits_to_read, current, root, &mut out)?;
    Ok((next, out))
}

fn decode_word_into<'t>(
    word: u32,
    bits_to_read: u32,
    current: &'t HuffNode,
    root: &'t HuffNode,
    out: &mut Vec<char>,
) -> Result<&'t HuffNode> {
    if bits_to_read > WORD_BITS {
        return Err(HuffError::MalformedBitstream(format!(
            "cannot read {bits_to_read} bits from a {WORD_BITS}-bit word"
        )));
    }

    let bits = &word.view_bits::<Msb0>()[..bits_to_read as usize];

    // A lone leaf root has the one-bit codeword 0.
    if root.is_leaf() {
        for bit in bits.iter().by_vals() {
            if bit {
                return Err(HuffError::MalformedBitstream(
                    "bit 1 in a single-symbol stream".to_string(),
                ));
            }
            out.push(root.symbol);
        }
        return Ok(root);
    }

    let mut node = current;
    for (i, bit) in bits.iter().by_vals().enumerate() {
        let child = node.child(bit).ok_or_else(|| {
            HuffError::MalformedBitstream(format!(
                "no {} child at bit {i} of word {word:#010x}",
                if bit { "right" } else { "left" }
            ))
        })?;

        if child.is_leaf() {
            out.push(child.symbol);
            node = root;
        } else {
            node = child;
        }
    }
    Ok(node)
}

/// Resumable decoder over a sequence of words from one stream.
pub struct Walker<'t> {
    root: &'t HuffNode,
    cursor: &'t HuffNode,
    emitted: u64,
}

impl<'t> Walker<'t> {
    pub fn new(tree: &'t HuffmanTree) -> Self {
        Self {
            root: tree.root(),
            cursor: tree.root(),
            emitted: 0,
        }
    }

    /// Decodes the top `bits` bits of `word`, appending symbols to `out`.
    pub fn feed(&mut self, word: u32, bits: u32, out: &mut Vec<char>) -> Result<()> {
        let before = out.len();
        self.cursor = decode_word_into(word, bits, self.cursor, self.root, out)?;
        self.emitted += (out.len() - before) as u64;
        Ok(())
    }

    /// True when the walk sits between codewords.
    pub fn at_boundary(&self) -> bool {
        ptr::eq(self.cursor, self.root)
    }

    /// Ends the stream and returns the number of symbols emitted.
    ///
    /// Fails if the payload stopped in the middle of a codeword.
    pub fn finish(self) -> Result<u64> {
        if !self.at_boundary() {
            return Err(HuffError::MalformedBitstream(
                "payload ends in the middle of a codeword".to_string(),
            ));
        }
        Ok(self.emitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::code_table::CodeTable;
    use crate::codec::frequency::FrequencyTable;
    use crate::codec::packer::pack_symbols;
    use crate::codec::tree::tests::sample_table;

    fn sample_tree() -> HuffmanTree {
        HuffmanTree::build(&sample_table()).unwrap().unwrap()
    }

    fn text(symbols: &[char]) -> String {
        symbols.iter().collect()
    }

    #[test]
    fn test_decode_deed() {
        let tree = sample_tree();
        let (next, symbols) = decode_word(2768240640, 8, tree.root(), tree.root()).unwrap();
        assert_eq!(text(&symbols), "DEED");
        assert!(ptr::eq(next, tree.root()));
    }

    #[test]
    fn test_decode_muck() {
        let tree = sample_tree();
        let (_, symbols) = decode_word(4243537920, 18, tree.root(), tree.root()).unwrap();
        assert_eq!(text(&symbols), "MUCK");
    }

    #[test]
    fn test_resumes_across_words() {
        let tree = sample_tree();
        // Split "MUCK" (18 bits) after 7 bits: "11111 10" | "0 1110 111101".
        let word = 4243537920u32;
        let (mid, first) = decode_word(word, 7, tree.root(), tree.root()).unwrap();
        assert_eq!(text(&first), "M");
        assert!(!mid.is_leaf());

        let (end, rest) = decode_word(word << 7, 11, mid, tree.root()).unwrap();
        assert_eq!(text(&rest), "UCK");
        assert!(ptr::eq(end, tree.root()));
    }

    #[test]
    fn test_walker_over_packed_stream() {
        let input = "the rain in spain stays mainly in the plain";
        let table = FrequencyTable::from_text(input);
        let tree = HuffmanTree::build(&table).unwrap().unwrap();
        let codes = CodeTable::from_tree(&tree).unwrap();
        let symbols: Vec<char> = input.chars().collect();
        let packed = pack_symbols(&symbols, &codes).unwrap();
        assert!(packed.words.len() > 1);

        let mut walker = Walker::new(&tree);
        let mut out = Vec::new();
        for (i, &word) in packed.words.iter().enumerate() {
            walker.feed(word, packed.bits_in_word(i), &mut out).unwrap();
        }
        assert_eq!(walker.finish().unwrap(), symbols.len() as u64);
        assert_eq!(text(&out), input);
    }

    #[test]
    fn test_single_symbol_tree() {
        let table: FrequencyTable = [('z', 4)].into_iter().collect();
        let tree = HuffmanTree::build(&table).unwrap().unwrap();
        let (_, symbols) = decode_word(0, 4, tree.root(), tree.root()).unwrap();
        assert_eq!(text(&symbols), "zzzz");

        let err = decode_word(0x8000_0000, 1, tree.root(), tree.root()).unwrap_err();
        assert!(matches!(err, HuffError::MalformedBitstream(_)));
    }

    #[test]
    fn test_descending_from_leaf_is_malformed() {
        let tree = sample_tree();
        let leaf = tree.root().left.as_deref().unwrap();
        assert!(leaf.is_leaf());
        let err = decode_word(0, 1, leaf, tree.root()).unwrap_err();
        assert!(matches!(err, HuffError::MalformedBitstream(_)));
    }

    #[test]
    fn test_missing_child_is_malformed() {
        let mut root = HuffNode::leaf('\0', 1);
        root.left = Some(Box::new(HuffNode::leaf('a', 1)));
        let tree = HuffmanTree::from_root(root);
        let err = decode_word(0x8000_0000, 1, tree.root(), tree.root()).unwrap_err();
        assert!(matches!(err, HuffError::MalformedBitstream(_)));
    }

    #[test]
    fn test_walker_rejects_stream_ending_mid_codeword() {
        let tree = sample_tree();
        let mut walker = Walker::new(&tree);
        let mut out = Vec::new();
        // "111" is a proper prefix of C, M, K and Z.
        walker.feed(0xE000_0000, 3, &mut out).unwrap();
        assert!(out.is_empty());
        assert!(matches!(walker.finish(), Err(HuffError::MalformedBitstream(_))));
    }

    #[test]
    fn test_rejects_oversized_bit_count() {
        let tree = sample_tree();
        assert!(decode_word(0, 33, tree.root(), tree.root()).is_err());
    }
}
