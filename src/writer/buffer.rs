use crate::error::EncodeError;
use crate::format::Record;
use byteorder::{LittleEndian, WriteBytesExt};

/// Append-only output buffer with 4-byte section alignment and in-place
/// patching of records reserved earlier.
#[derive(Default)]
pub(crate) struct ByteWriter {
    data: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current end of the buffer as a header offset.
    pub fn position(&self) -> Result<i32, EncodeError> {
        i32::try_from(self.data.len()).map_err(|_| EncodeError::BufferTooLarge)
    }

    pub fn align(&mut self) {
        while self.data.len() % 4 != 0 {
            self.data.push(0);
        }
    }

    /// Aligns, then returns the offset where the next section starts.
    pub fn section(&mut self) -> Result<i32, EncodeError> {
        self.align();
        self.position()
    }

    /// Zero fills room for `count` records and returns their offset.
    pub fn reserve<T: Record>(&mut self, count: usize) -> Result<i32, EncodeError> {
        let offset = self.position()?;
        self.data.resize(self.data.len() + count * T::SIZE, 0);
        Ok(offset)
    }

    pub fn record<T: Record>(&mut self, record: &T) -> Result<(), EncodeError> {
        record.write(&mut self.data)?;
        Ok(())
    }

    /// Overwrites the `index`-th record of a block reserved at `offset`.
    pub fn patch<T: Record>(&mut self, offset: i32, index: usize, record: &T) -> Result<(), EncodeError> {
        let start = offset as usize + index * T::SIZE;
        let mut bytes = Vec::with_capacity(T::SIZE);
        record.write(&mut bytes)?;
        self.data[start..start + T::SIZE].copy_from_slice(&bytes);
        Ok(())
    }

    pub fn bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn u16(&mut self, value: u16) -> Result<(), EncodeError> {
        self.data.write_u16::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn i16(&mut self, value: i16) -> Result<(), EncodeError> {
        self.data.write_i16::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn vec3(&mut self, v: &[f32; 3]) -> Result<(), EncodeError> {
        for c in v {
            self.data.write_f32::<LittleEndian>(*c)?;
        }
        Ok(())
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}
