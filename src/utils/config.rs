//! Options for a compression job.

/// Bytes read per chunk when the caller does not choose.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// The smallest chunk that still holds any complete UTF-8 sequence.
pub const MIN_CHUNK_SIZE: usize = 4;

/// Tunables for [`compress`](crate::container::format::compress).
///
/// ```
/// use huffpack::CodecOptions;
///
/// let opts = CodecOptions::default().with_chunk_size(64 * 1024);
/// assert_eq!(opts.chunk_size(), 64 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    chunk_size: usize,
}

impl CodecOptions {
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Sets the read buffer size. Values below [`MIN_CHUNK_SIZE`] are raised to it.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(MIN_CHUNK_SIZE);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self::new()
    }
}
