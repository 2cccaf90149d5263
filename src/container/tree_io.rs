//! Pre-order binary form of a [`HuffmanTree`].
//!
//! Every position holds a marker byte: `0` for an absent node, `1` for a
//! node followed by its symbol (`u32`), branch code (`u8`) and weight (`u64`),
//! then its left and right subtrees. An empty tree is the single byte `0`.

use crate::codec::code_table::MAX_CODE_LEN;
use crate::codec::frequency::SENTINEL;
use crate::codec::tree::{HuffNode, HuffmanTree};
use crate::container::stream::{ContainerRead, ContainerWrite, eof_as};
use crate::utils::error::{HuffError, Result};
use std::io::{Read, Write};

const NIL: u8 = 0;
const NODE: u8 = 1;

/// Serializes `tree` (or an empty tree) to `writer`.
pub fn write_tree<W: Write>(tree: Option<&HuffmanTree>, writer: &mut W) -> Result<()> {
    write_node(tree.map(HuffmanTree::root), writer)
}

fn write_node<W: Write>(node: Option<&HuffNode>, writer: &mut W) -> Result<()> {
    let Some(node) = node else {
        return writer.put_u8(NIL);
    };

    writer.put_u8(NODE)?;
    writer.put_u32(node.symbol as u32)?;
    writer.put_u8(node.branch_code)?;
    writer.put_u64(node.weight)?;
    write_node(node.left.as_deref(), writer)?;
    write_node(node.right.as_deref(), writer)
}

/// Reads a tree written by [`write_tree`]. `None` means the empty tree.
pub fn read_tree<R: Read>(reader: &mut R) -> Result<Option<HuffmanTree>> {
    Ok(read_node(reader, 0, None)?.map(HuffmanTree::from_root))
}

fn read_node<R: Read>(reader: &mut R, depth: usize, side: Option<u8>) -> Result<Option<HuffNode>> {
    match field(reader.get_u8(), "marker")? {
        NIL => return Ok(None),
        NODE => {}
        other => return Err(corrupt(format!("unknown marker byte {other}"))),
    }

    if depth > MAX_CODE_LEN {
        return Err(corrupt(format!("tree deeper than {MAX_CODE_LEN} levels")));
    }

    let raw_symbol = field(reader.get_u32(), "symbol")?;
    let symbol = char::from_u32(raw_symbol)
        .ok_or_else(|| corrupt(format!("symbol {raw_symbol:#x} is not a valid code point")))?;
    let branch_code = field(reader.get_u8(), "branch code")?;
    if branch_code > 1 {
        return Err(corrupt(format!("branch code {branch_code}")));
    }
    if let Some(expected) = side {
        if branch_code != expected {
            return Err(corrupt(format!(
                "child on side {expected} carries branch code {branch_code}"
            )));
        }
    }
    let weight = field(reader.get_u64(), "weight")?;

    let left = read_node(reader, depth + 1, Some(0))?.map(Box::new);
    let right = read_node(reader, depth + 1, Some(1))?.map(Box::new);

    let node = HuffNode {
        symbol,
        weight,
        branch_code,
        left,
        right,
    };
    match (node.is_leaf(), node.symbol == SENTINEL) {
        (true, true) => Err(corrupt("leaf without a symbol".to_string())),
        (false, false) => Err(corrupt(format!("internal node carries symbol {symbol:?}"))),
        _ => Ok(Some(node)),
    }
}

fn field<T>(res: std::io::Result<T>, what: &str) -> Result<T> {
    eof_as(res, || corrupt(format!("stream ends before {what}")))
}

fn corrupt(msg: String) -> HuffError {
    HuffError::CorruptTree(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::frequency::FrequencyTable;
    use crate::codec::tree::tests::sample_table;
    use std::io::Cursor;

    fn serialized(tree: Option<&HuffmanTree>) -> Vec<u8> {
        let mut buf = Vec::new();
        write_tree(tree, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_sample_tree_survives() {
        let tree = HuffmanTree::build(&sample_table()).unwrap().unwrap();
        let bytes = serialized(Some(&tree));
        // 15 nodes of 14 bytes, 16 nil markers.
        assert_eq!(bytes.len(), 15 * 14 + 16);

        let mut cursor = Cursor::new(bytes);
        let restored = read_tree(&mut cursor).unwrap().unwrap();
        assert_eq!(restored, tree);
        assert_eq!(cursor.position() as usize, cursor.get_ref().len());
    }

    #[test]
    fn test_leaf_layout() {
        let table: FrequencyTable = [('A', 3)].into_iter().collect();
        let tree = HuffmanTree::build(&table).unwrap().unwrap();
        assert_eq!(
            serialized(Some(&tree)),
            vec![1, 0x41, 0, 0, 0, 0, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_empty_tree_is_one_byte() {
        let bytes = serialized(None);
        assert_eq!(bytes, vec![0]);
        assert!(read_tree(&mut Cursor::new(bytes)).unwrap().is_none());
    }

    #[test]
    fn test_truncation_is_corrupt_tree() {
        let tree = HuffmanTree::build(&sample_table()).unwrap().unwrap();
        let bytes = serialized(Some(&tree));
        for cut in [0, 1, 3, 7, 14, 100, bytes.len() - 1] {
            let err = read_tree(&mut Cursor::new(&bytes[..cut])).unwrap_err();
            assert!(matches!(err, HuffError::CorruptTree(_)), "cut at {cut}: {err:?}");
        }
    }

    #[test]
    fn test_rejects_bad_marker() {
        let err = read_tree(&mut Cursor::new(vec![2u8])).unwrap_err();
        assert!(matches!(err, HuffError::CorruptTree(_)));
    }

    #[test]
    fn test_rejects_invalid_code_point() {
        let mut bytes = vec![1u8];
        bytes.extend_from_slice(&0xD800u32.to_le_bytes());
        bytes.push(0);
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.extend_from_slice(&[0, 0]);
        let err = read_tree(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, HuffError::CorruptTree(_)));
    }

    #[test]
    fn test_rejects_leaf_without_symbol() {
        let mut bytes = vec![1u8];
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.push(0);
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.extend_from_slice(&[0, 0]);
        let err = read_tree(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, HuffError::CorruptTree(_)));
    }

    #[test]
    fn test_rejects_swapped_branch_codes() {
        let table: FrequencyTable = [('a', 1), ('b', 2)].into_iter().collect();
        let tree = HuffmanTree::build(&table).unwrap().unwrap();
        let mut bytes = serialized(Some(&tree));
        // Left child's branch code sits after root (14 bytes), its marker and symbol.
        let left_code = 14 + 1 + 4;
        assert_eq!(bytes[left_code], 0);
        bytes[left_code] = 1;
        let err = read_tree(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, HuffError::CorruptTree(_)));
    }
}
