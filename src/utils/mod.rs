//! General-purpose utility modules.

pub mod config;
pub mod error;

// Re-export commonly used items
pub use config::CodecOptions;
pub use error::{HuffError, Result};
