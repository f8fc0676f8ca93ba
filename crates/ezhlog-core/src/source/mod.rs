//! Byte sources feeding the decode pipeline.
//!
//! A source only hands out bytes in order; framing, layout selection, and
//! decoding all happen above it. Implementations cover stored dump files
//! and in-memory buffers (serial captures arrive as either).

mod file;
mod slice;

pub use file::FileSource;
pub use slice::SliceSource;

use thiserror::Error;

/// Sequential byte supplier for one dump session.
pub trait ByteSource {
    /// Fill `buf` from the source. Returns the number of bytes written;
    /// anything short of `buf.len()` means the source has ended.
    fn read_up_to(&mut self, buf: &mut [u8]) -> Result<usize, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
