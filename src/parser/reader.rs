use crate::error::FormatError;
use crate::format::Record;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

/// Bounds checked random access over a whole model file.
pub(crate) struct BufferReader<'a> {
    data: &'a [u8],
}

impl<'a> BufferReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn bytes(&self, offset: usize, len: usize, what: &'static str) -> Result<&'a [u8], FormatError> {
        offset
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .map(|end| &self.data[offset..end])
            .ok_or(FormatError::Truncated { what, offset })
    }

    fn cursor(&self, offset: usize, len: usize, what: &'static str) -> Result<Cursor<&'a [u8]>, FormatError> {
        Ok(Cursor::new(self.bytes(offset, len, what)?))
    }

    pub fn record<T: Record>(&self, offset: usize, what: &'static str) -> Result<T, FormatError> {
        let mut cursor = self.cursor(offset, T::SIZE, what)?;
        T::read(&mut cursor).map_err(|_| FormatError::Truncated { what, offset })
    }

    /// Reads `count` consecutive records starting at a header offset.
    pub fn records<T: Record>(
        &self,
        offset: i32,
        count: i32,
        what: &'static str,
    ) -> Result<Vec<T>, FormatError> {
        let count = checked_count(count, what)?;
        if count == 0 {
            return Ok(Vec::new());
        }
        let offset = checked_offset(offset, what)?;
        let mut cursor = self.cursor(offset, count * T::SIZE, what)?;
        (0..count)
            .map(|_| T::read(&mut cursor).map_err(|_| FormatError::Truncated { what, offset }))
            .collect()
    }

    pub fn u16_at(&self, offset: usize, what: &'static str) -> Result<u16, FormatError> {
        let mut cursor = self.cursor(offset, 2, what)?;
        cursor
            .read_u16::<LittleEndian>()
            .map_err(|_| FormatError::Truncated { what, offset })
    }

    pub fn i16s(&self, offset: i32, count: usize, what: &'static str) -> Result<Vec<i16>, FormatError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let offset = checked_offset(offset, what)?;
        let mut cursor = self.cursor(offset, count * 2, what)?;
        (0..count)
            .map(|_| {
                cursor
                    .read_i16::<LittleEndian>()
                    .map_err(|_| FormatError::Truncated { what, offset })
            })
            .collect()
    }

    pub fn vec3s(&self, offset: i32, count: usize, what: &'static str) -> Result<Vec<[f32; 3]>, FormatError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let offset = checked_offset(offset, what)?;
        let mut cursor = self.cursor(offset, count * 12, what)?;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let mut v = [0f32; 3];
            for c in v.iter_mut() {
                *c = cursor
                    .read_f32::<LittleEndian>()
                    .map_err(|_| FormatError::Truncated { what, offset })?;
            }
            out.push(v);
        }
        Ok(out)
    }

    /// Cursor from `offset` to the end of the buffer, for streams whose
    /// length is only known once they are walked.
    pub fn tail(&self, offset: i32, what: &'static str) -> Result<Cursor<&'a [u8]>, FormatError> {
        let offset = checked_offset(offset, what)?;
        if offset > self.data.len() {
            return Err(FormatError::Truncated { what, offset });
        }
        Ok(Cursor::new(&self.data[offset..]))
    }
}

pub(crate) fn checked_count(count: i32, what: &'static str) -> Result<usize, FormatError> {
    usize::try_from(count).map_err(|_| FormatError::NegativeCount { what, count })
}

fn checked_offset(offset: i32, what: &'static str) -> Result<usize, FormatError> {
    usize::try_from(offset).map_err(|_| FormatError::Truncated { what, offset: 0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_past_the_end_are_truncation_errors() {
        let data = [1u8, 0, 2, 0];
        let reader = BufferReader::new(&data);
        assert_eq!(reader.i16s(0, 2, "values").unwrap(), vec![1, 2]);
        assert!(matches!(
            reader.i16s(2, 2, "values"),
            Err(FormatError::Truncated { what: "values", .. })
        ));
        assert!(matches!(
            reader.records::<crate::format::PivotRecord>(0, -1, "pivots"),
            Err(FormatError::NegativeCount { count: -1, .. })
        ));
    }
}
