pub mod format;
pub mod stream;
pub mod tree_io;

// Re-export commonly used types
pub use format::{
    CompressionStats, ContainerHeader, DecompressionStats, MAGIC, REMAINDER_MAGIC, compress,
    compress_bytes, decompress, decompress_bytes, read_header,
};
pub use stream::{ContainerRead, ContainerWrite};
