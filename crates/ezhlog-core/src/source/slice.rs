use super::{ByteSource, SourceError};

/// Byte source over an in-memory buffer (tests, captured serial output).
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }
}

impl ByteSource for SliceSource<'_> {
    fn read_up_to(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        let remaining = &self.bytes[self.offset..];
        let take = remaining.len().min(buf.len());
        buf[..take].copy_from_slice(&remaining[..take]);
        self.offset += take;
        Ok(take)
    }
}
