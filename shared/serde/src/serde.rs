use std::collections::HashMap;

use crate::{error::SerdeErr, reader::ByteReader, writer::ByteWriter};

/// A type that can be serialized into and deserialized out of the
/// entsync wire format. Field order is part of the contract: `de` must
/// read exactly the bytes `ser` wrote, in the same order.
pub trait Serde: Sized {
    /// Writes the value into the outgoing byte stream
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr>;

    /// Reads the value from incoming packet data
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr>;

    /// Convenience: serialize into a fresh buffer
    fn to_bytes(&self) -> Result<Vec<u8>, SerdeErr> {
        let mut writer = ByteWriter::new();
        self.ser(&mut writer)?;
        Ok(writer.to_bytes())
    }

    /// Convenience: deserialize from a received payload
    fn from_bytes(payload: &[u8]) -> Result<Self, SerdeErr> {
        let mut reader = ByteReader::new(payload);
        Self::de(&mut reader)
    }
}

impl Serde for bool {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_byte(u8::from(*self));
        Ok(())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        match reader.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(SerdeErr::UnknownDiscriminant {
                type_name: "bool",
                value: u64::from(other),
            }),
        }
    }
}

impl Serde for u8 {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_byte(*self);
        Ok(())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        reader.read_byte()
    }
}

impl Serde for u16 {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_bytes(&self.to_le_bytes());
        Ok(())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let bytes = reader.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }
}

impl Serde for u32 {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_bytes(&self.to_le_bytes());
        Ok(())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let bytes = reader.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl Serde for u64 {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_bytes(&self.to_le_bytes());
        Ok(())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let bytes: [u8; 8] = reader.read_bytes(8)?.try_into().expect("read 8 bytes");
        Ok(u64::from_le_bytes(bytes))
    }
}

impl Serde for i32 {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_bytes(&self.to_le_bytes());
        Ok(())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let bytes = reader.read_bytes(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl Serde for i64 {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_bytes(&self.to_le_bytes());
        Ok(())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let bytes: [u8; 8] = reader.read_bytes(8)?.try_into().expect("read 8 bytes");
        Ok(i64::from_le_bytes(bytes))
    }
}

impl Serde for f32 {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_bytes(&self.to_le_bytes());
        Ok(())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let bytes = reader.read_bytes(4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl Serde for String {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_string(self)
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        reader.read_string()
    }
}

impl Serde for Vec<u8> {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_blob(self)
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        reader.read_blob()
    }
}

impl Serde for HashMap<String, Vec<u8>> {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_packed_u64(self.len() as u64);
        // Stable iteration order so identical maps encode identically
        let mut keys: Vec<&String> = self.keys().collect();
        keys.sort();
        for key in keys {
            writer.write_string(key)?;
            writer.write_blob(&self[key])?;
        }
        Ok(())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let count = reader.read_packed_u64()? as usize;
        let mut map = HashMap::with_capacity(count.min(64));
        for _ in 0..count {
            let key = reader.read_string()?;
            let value = reader.read_blob()?;
            map.insert(key, value);
        }
        Ok(map)
    }
}

// Tests
