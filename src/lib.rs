//! A two-pass Huffman codec for UTF-8 text.
//!
//! Compression counts every code point, builds a Huffman tree with a fixed
//! tie-break order, and packs the codewords into 32-bit words behind a
//! self-describing header. Decompression rebuilds the tree from the header
//! and walks the payload bit by bit.
//!
//! # Quick Start
//!
//! ```
//! use huffpack::{compress_bytes, decompress_bytes};
//!
//! let packed = compress_bytes("abracadabra".as_bytes())?;
//! assert_eq!(decompress_bytes(&packed)?, b"abracadabra");
//! # Ok::<(), huffpack::HuffError>(())
//! ```
//!
//! Files (or any `Read + Seek` source) go through [`compress`] and
//! [`decompress`]:
//!
//! ```no_run
//! use huffpack::{CodecOptions, compress, decompress};
//! use std::fs::File;
//!
//! let stats = compress(
//!     File::open("book.txt")?,
//!     File::create("book.huff")?,
//!     &CodecOptions::default().with_chunk_size(64 * 1024),
//! )?;
//! println!("{} symbols -> {} bytes", stats.symbols, stats.bytes_written);
//!
//! decompress(File::open("book.huff")?, File::create("book.out.txt")?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Limits
//!
//! - Input must be valid UTF-8 and must not contain U+0000, which marks
//!   internal tree nodes.
//! - Codewords longer than 64 bits are rejected; reaching that needs a
//!   pathologically skewed input of trillions of symbols.

// Core modules
pub mod codec;
pub mod container;
pub mod utils;

// Public API
pub use codec::{CodeTable, Codeword, FrequencyTable, HuffmanTree};
pub use container::{
    CompressionStats, DecompressionStats, compress, compress_bytes, decompress, decompress_bytes,
};

// Error and option types
pub use utils::{CodecOptions, HuffError, Result};
