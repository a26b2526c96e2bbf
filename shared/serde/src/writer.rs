use crate::{error::SerdeErr, MAX_FIELD_BYTES};

/// Growable buffer that wire messages are serialized into.
pub struct ByteWriter {
    buffer: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(64),
        }
    }

    pub fn to_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn bytes_written(&self) -> usize {
        self.buffer.len()
    }

    pub fn write_byte(&mut self, byte: u8) {
        self.buffer.push(byte);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Writes an unsigned integer as a base-128 varint, low groups first.
    pub fn write_packed_u64(&mut self, mut value: u64) {
        loop {
            let mut group = (value & 0x7F) as u8;
            value >>= 7;
            if value != 0 {
                group |= 0x80;
            }
            self.buffer.push(group);
            if value == 0 {
                return;
            }
        }
    }

    pub fn write_packed_u32(&mut self, value: u32) {
        self.write_packed_u64(u64::from(value));
    }

    /// Writes a length prefix followed by the raw bytes.
    /// Lengths above [`MAX_FIELD_BYTES`] are rejected before anything
    /// is written, leaving the buffer untouched.
    pub fn write_blob(&mut self, bytes: &[u8]) -> Result<(), SerdeErr> {
        if bytes.len() > MAX_FIELD_BYTES {
            return Err(SerdeErr::LengthTooLarge {
                length: bytes.len(),
                max: MAX_FIELD_BYTES,
            });
        }
        self.write_packed_u64(bytes.len() as u64);
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    pub fn write_string(&mut self, value: &str) -> Result<(), SerdeErr> {
        self.write_blob(value.as_bytes())
    }
}

impl Default for ByteWriter {
    fn default() -> Self {
        Self::new()
    }
}
