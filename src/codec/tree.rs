//! Huffman tree construction.
//!
//! Candidates are merged smallest-first, ordered by weight and then by symbol.
//! Internal nodes carry the [`SENTINEL`] symbol, so on a weight tie they are
//! taken before any leaf. The exact order fixes the tree shape, and with it
//! every byte of the compressed output.

use crate::codec::frequency::{FrequencyTable, SENTINEL};
use crate::utils::error::{HuffError, Result};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;

/// A node of the prefix tree. Leaves have no children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffNode {
    /// The leaf symbol, or [`SENTINEL`] for internal nodes.
    pub symbol: char,
    pub weight: u64,
    /// 0 if this node is its parent's left child, 1 if the right one.
    pub branch_code: u8,
    pub left: Option<Box<HuffNode>>,
    pub right: Option<Box<HuffNode>>,
}

impl HuffNode {
    pub fn leaf(symbol: char, weight: u64) -> Self {
        Self {
            symbol,
            weight,
            branch_code: 0,
            left: None,
            right: None,
        }
    }

    /// Joins two subtrees under a new internal node; `left` is the one removed first.
    pub fn merge(left: HuffNode, right: HuffNode) -> Self {
        Self {
            symbol: SENTINEL,
            weight: left.weight + right.weight,
            branch_code: 0,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// The child reached by following `bit` (0 = left, 1 = right).
    #[inline]
    pub fn child(&self, bit: bool) -> Option<&HuffNode> {
        if bit {
            self.right.as_deref()
        } else {
            self.left.as_deref()
        }
    }

    fn assign_branch_codes(&mut self) {
        if let Some(left) = self.left.as_mut() {
            left.branch_code = 0;
            left.assign_branch_codes();
        }
        if let Some(right) = self.right.as_mut() {
            right.branch_code = 1;
            right.assign_branch_codes();
        }
    }

    fn depth(&self) -> usize {
        let left = self.left.as_ref().map_or(0, |n| n.depth() + 1);
        let right = self.right.as_ref().map_or(0, |n| n.depth() + 1);
        left.max(right)
    }

    fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            return 1;
        }
        self.left.as_ref().map_or(0, |n| n.leaf_count())
            + self.right.as_ref().map_or(0, |n| n.leaf_count())
    }

    fn fmt_outline(&self, f: &mut fmt::Formatter<'_>, depth: usize, label: &str) -> fmt::Result {
        let indent = "  ".repeat(depth);
        if self.is_leaf() {
            writeln!(
                f,
                "{indent}{label} leaf {:?} (U+{:04X}) weight={}",
                self.symbol, self.symbol as u32, self.weight
            )?;
        } else {
            writeln!(f, "{indent}{label} internal weight={}", self.weight)?;
        }
        if let Some(left) = &self.left {
            left.fmt_outline(f, depth + 1, "0")?;
        }
        if let Some(right) = &self.right {
            right.fmt_outline(f, depth + 1, "1")?;
        }
        Ok(())
    }
}

/// A heap entry. `seq` only separates internal nodes of equal weight: the
/// most recently merged one is taken first.
struct Candidate {
    weight: u64,
    symbol: char,
    seq: usize,
    node: HuffNode,
}

impl Candidate {
    fn new(node: HuffNode, seq: usize) -> Self {
        Self {
            weight: node.weight,
            symbol: node.symbol,
            seq,
            node,
        }
    }

    fn key(&self) -> (u64, char, Reverse<usize>) {
        (self.weight, self.symbol, Reverse(self.seq))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// A built or deserialized Huffman tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: HuffNode,
}

impl HuffmanTree {
    /// Builds the tree for `table`. Returns `None` for an empty table.
    ///
    /// A single-symbol table yields a tree whose root is that leaf.
    pub fn build(table: &FrequencyTable) -> Result<Option<HuffmanTree>> {
        if table.contains_sentinel() {
            return Err(HuffError::ReservedSymbol);
        }

        let mut heap: BinaryHeap<Reverse<Candidate>> = table
            .iter()
            .enumerate()
            .map(|(seq, (symbol, count))| Reverse(Candidate::new(HuffNode::leaf(symbol, count), seq)))
            .collect();
        let mut seq = heap.len();

        while heap.len() > 1 {
            let (Some(Reverse(first)), Some(Reverse(second))) = (heap.pop(), heap.pop()) else {
                break;
            };
            heap.push(Reverse(Candidate::new(
                HuffNode::merge(first.node, second.node),
                seq,
            )));
            seq += 1;
        }

        let Some(Reverse(last)) = heap.pop() else {
            return Ok(None);
        };

        let mut root = last.node;
        root.branch_code = 0;
        root.assign_branch_codes();

        let tree = HuffmanTree { root };
        log::debug!(
            "built tree: {} leaves, depth {}, weight {}",
            tree.leaf_count(),
            tree.depth(),
            tree.weight()
        );
        Ok(Some(tree))
    }

    /// Wraps an already-shaped root, e.g. one read back from a container.
    pub fn from_root(root: HuffNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &HuffNode {
        &self.root
    }

    pub fn weight(&self) -> u64 {
        self.root.weight
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }
}

impl fmt::Display for HuffmanTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt_outline(f, 0, "root")
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_table() -> FrequencyTable {
        [
            ('C', 32),
            ('D', 42),
            ('E', 120),
            ('K', 7),
            ('L', 42),
            ('M', 24),
            ('U', 37),
            ('Z', 2),
        ]
        .into_iter()
        .collect()
    }

    fn node(symbol: char, weight: u64, branch_code: u8) -> HuffNode {
        HuffNode {
            branch_code,
            ..HuffNode::leaf(symbol, weight)
        }
    }

    fn with_children(mut parent: HuffNode, left: HuffNode, right: HuffNode) -> HuffNode {
        parent.left = Some(Box::new(left));
        parent.right = Some(Box::new(right));
        parent
    }

    fn expected_sample_tree() -> HuffNode {
        let zk = with_children(node(SENTINEL, 9, 0), node('Z', 2, 0), node('K', 7, 1));
        let zkm = with_children(node(SENTINEL, 33, 1), zk, node('M', 24, 1));
        let czkm = with_children(node(SENTINEL, 65, 1), node('C', 32, 0), zkm);
        let l = with_children(node(SENTINEL, 107, 1), node('L', 42, 0), czkm);
        let ud = with_children(node(SENTINEL, 79, 0), node('U', 37, 0), node('D', 42, 1));
        let right = with_children(node(SENTINEL, 186, 1), ud, l);
        with_children(node(SENTINEL, 306, 0), node('E', 120, 0), right)
    }

    #[test]
    fn test_sample_tree_shape() {
        let tree = HuffmanTree::build(&sample_table()).unwrap().unwrap();
        assert_eq!(tree.weight(), 306);
        assert_eq!(tree.root(), &expected_sample_tree());
        assert_eq!(tree.leaf_count(), 8);
        assert_eq!(tree.depth(), 6);
    }

    #[test]
    fn test_build_is_deterministic() {
        let table: FrequencyTable = "mississippi river banks"
            .chars()
            .map(|c| (c, 1))
            .collect();
        let a = HuffmanTree::build(&table).unwrap();
        let b = HuffmanTree::build(&table).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_equal_weights_break_ties_by_symbol() {
        let table: FrequencyTable = [('b', 1), ('a', 1), ('c', 2)].into_iter().collect();
        let tree = HuffmanTree::build(&table).unwrap().unwrap();
        // a+b merge first (a left), then the internal node (2) sorts before 'c' (2).
        let root = tree.root();
        let ab = root.left.as_deref().unwrap();
        assert!(!ab.is_leaf());
        assert_eq!(ab.left.as_deref().unwrap().symbol, 'a');
        assert_eq!(ab.right.as_deref().unwrap().symbol, 'b');
        assert_eq!(root.right.as_deref().unwrap().symbol, 'c');
    }

    #[test]
    fn test_equal_internal_weights_take_newest_first() {
        let table: FrequencyTable = [('a', 1), ('b', 1), ('c', 1), ('d', 1)].into_iter().collect();
        let tree = HuffmanTree::build(&table).unwrap().unwrap();

        // (a b) merges first, then (c d); both weigh 2 and (c d) is taken first.
        let cd = with_children(node(SENTINEL, 2, 0), node('c', 1, 0), node('d', 1, 1));
        let ab = with_children(node(SENTINEL, 2, 1), node('a', 1, 0), node('b', 1, 1));
        assert_eq!(tree.root(), &with_children(node(SENTINEL, 4, 0), cd, ab));
    }

    #[test]
    fn test_empty_table_has_no_tree() {
        assert!(HuffmanTree::build(&FrequencyTable::new()).unwrap().is_none());
    }

    #[test]
    fn test_single_symbol_root_is_leaf() {
        let table: FrequencyTable = [('q', 17)].into_iter().collect();
        let tree = HuffmanTree::build(&table).unwrap().unwrap();
        assert!(tree.root().is_leaf());
        assert_eq!(tree.root().symbol, 'q');
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn test_rejects_sentinel_in_table() {
        let table: FrequencyTable = [('\0', 1), ('a', 1)].into_iter().collect();
        assert!(matches!(
            HuffmanTree::build(&table),
            Err(HuffError::ReservedSymbol)
        ));
    }

    #[test]
    fn test_display_outline() {
        let table: FrequencyTable = [('a', 1), ('b', 2)].into_iter().collect();
        let tree = HuffmanTree::build(&table).unwrap().unwrap();
        let outline = tree.to_string();
        assert!(outline.starts_with("root internal weight=3"));
        assert!(outline.contains("  0 leaf 'a' (U+0061) weight=1"));
        assert!(outline.contains("  1 leaf 'b' (U+0062) weight=2"));
    }
}
