// src/utils/error.rs

use std::io;

use thiserror::Error;

/// The error type for every compress/decompress operation in the crate.
///
/// None of these are retried internally. Any output written before the error
/// should be discarded by the caller.
#[derive(Error, Debug)]
pub enum HuffError {
    /// The source stream failed (I/O error or undecodable UTF-8).
    #[error("read error: {0}")]
    Read(#[source] io::Error),

    /// The destination stream failed.
    #[error("write error: {0}")]
    Write(#[source] io::Error),

    /// The container does not start with the expected format magic.
    #[error("bad magic: expected {expected:#010x}, found {found:#010x}")]
    BadMagic { expected: u32, found: u32 },

    /// The serialized tree ended early or is structurally inconsistent.
    #[error("corrupt tree: {0}")]
    CorruptTree(String),

    /// The payload does not walk cleanly through the tree.
    #[error("malformed bitstream: {0}")]
    MalformedBitstream(String),

    /// The input contains the code point reserved for internal tree nodes.
    #[error("symbol U+0000 is reserved and cannot be encoded")]
    ReservedSymbol,

    /// A symbol reached the packer with no codeword in the table.
    #[error("no codeword for symbol {0:?}")]
    UnknownSymbol(char),

    /// The tree is deeper than a codeword can represent.
    #[error("code length {0} exceeds the 64-bit codeword limit")]
    CodeTooLong(usize),
}

impl HuffError {
    pub(crate) fn read(err: io::Error) -> Self {
        HuffError::Read(err)
    }

    pub(crate) fn write(err: io::Error) -> Self {
        HuffError::Write(err)
    }
}

/// A specialized `Result` type for codec operations.
pub type Result<T> = std::result::Result<T, HuffError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_magic_message_is_hex() {
        let err = HuffError::BadMagic {
            expected: 0x4855_4646,
            found: 0x1234,
        };
        assert_eq!(
            err.to_string(),
            "bad magic: expected 0x48554646, found 0x00001234"
        );
    }

    #[test]
    fn test_io_source_is_preserved() {
        use std::error::Error;

        let err = HuffError::write(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert!(err.source().is_some());
        assert!(matches!(err, HuffError::Write(_)));
    }
}
