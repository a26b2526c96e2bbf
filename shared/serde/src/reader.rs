use crate::{error::SerdeErr, MAX_FIELD_BYTES};

/// Maximum encoded size of a packed u64 (ten 7-bit groups).
const MAX_VARINT_BYTES: usize = 10;

/// Cursor over a received datagram payload.
pub struct ByteReader<'b> {
    buffer: &'b [u8],
    cursor: usize,
}

impl<'b> ByteReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self { buffer, cursor: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        if self.cursor >= self.buffer.len() {
            return Err(SerdeErr::BufferUnderrun {
                needed: 1,
                offset: self.cursor,
            });
        }
        let byte = self.buffer[self.cursor];
        self.cursor += 1;
        Ok(byte)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'b [u8], SerdeErr> {
        if self.remaining() < count {
            return Err(SerdeErr::BufferUnderrun {
                needed: count - self.remaining(),
                offset: self.cursor,
            });
        }
        let slice = &self.buffer[self.cursor..self.cursor + count];
        self.cursor += count;
        Ok(slice)
    }

    pub fn read_packed_u64(&mut self) -> Result<u64, SerdeErr> {
        let mut value: u64 = 0;
        let mut shift: u32 = 0;
        for _ in 0..MAX_VARINT_BYTES {
            let group = self.read_byte()?;
            value |= u64::from(group & 0x7F) << shift;
            if group & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
        Err(SerdeErr::VarIntOverflow {
            max_bytes: MAX_VARINT_BYTES,
        })
    }

    pub fn read_packed_u32(&mut self) -> Result<u32, SerdeErr> {
        let value = self.read_packed_u64()?;
        u32::try_from(value).map_err(|_| SerdeErr::VarIntOverflow { max_bytes: 5 })
    }

    pub fn read_blob(&mut self) -> Result<Vec<u8>, SerdeErr> {
        let length = self.read_packed_u64()? as usize;
        if length > MAX_FIELD_BYTES {
            return Err(SerdeErr::LengthTooLarge {
                length,
                max: MAX_FIELD_BYTES,
            });
        }
        Ok(self.read_bytes(length)?.to_vec())
    }

    pub fn read_string(&mut self) -> Result<String, SerdeErr> {
        let bytes = self.read_blob()?;
        String::from_utf8(bytes).map_err(|_| SerdeErr::InvalidUtf8)
    }
}
