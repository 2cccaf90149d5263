//! The coding pipeline: counting, tree building, codeword assignment,
//! bit packing and the decoding walk.

pub mod code_table;
pub mod frequency;
pub mod packer;
pub mod tree;
pub mod walker;

// Re-export commonly used types
pub use code_table::{CodeTable, Codeword};
pub use frequency::{FrequencyTable, SENTINEL, SymbolReader, analyze};
pub use packer::{BitPacker, Carry, PackedStream, pack_symbols};
pub use tree::{HuffNode, HuffmanTree};
pub use walker::{Walker, decode_word};
