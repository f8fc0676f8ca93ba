use super::error::FormatError;
use super::layout::{ByteOrder, FieldSpec};

/// Cursor over one packed buffer, driven by catalog field descriptions.
///
/// The reader never indexes past the buffer: every access is bounds-checked
/// and reports how many bytes would have been needed.
pub struct FieldReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), FormatError> {
        if self.bytes.len() < needed {
            return Err(FormatError::TooShort {
                needed,
                actual: self.bytes.len(),
            });
        }
        Ok(())
    }

    /// Read the next field per its catalog description and advance the
    /// cursor. Values come back widened to `u64`; signed fields are
    /// sign-extended from their declared width first.
    pub fn read_field(&mut self, spec: &FieldSpec) -> Result<u64, FormatError> {
        let width = usize::from(spec.width);
        let end = self.offset + width;
        let bytes = self
            .bytes
            .get(self.offset..end)
            .ok_or(FormatError::TooShort {
                needed: end,
                actual: self.bytes.len(),
            })?;

        let mut value: u64 = 0;
        match spec.order {
            ByteOrder::Little => {
                for (shift, byte) in bytes.iter().enumerate() {
                    value |= u64::from(*byte) << (8 * shift);
                }
            }
            ByteOrder::Big => {
                for byte in bytes {
                    value = (value << 8) | u64::from(*byte);
                }
            }
        }
        if spec.signed {
            value = sign_extend(value, width);
        }

        self.offset = end;
        Ok(value)
    }
}

fn sign_extend(value: u64, width: usize) -> u64 {
    if width >= 8 {
        return value;
    }
    let shift = 64 - 8 * width as u32;
    (((value << shift) as i64) >> shift) as u64
}
