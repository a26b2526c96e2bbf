use entsync_serde::{ByteReader, ByteWriter, Serde, SerdeErr};

use crate::{
    math::{Quat, Vec3},
    types::{EntityId, RemoteTimestamp},
};

/// Tag 2000. Instructs observers to instantiate a proxy entity.
/// `has_authority` is set only on the owning connection's copy.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnEntity {
    pub id: EntityId,
    pub name: String,
    pub has_authority: bool,
    pub position: Vec3,
    pub rotation: Quat,
}

impl Serde for SpawnEntity {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_packed_u32(self.id);
        writer.write_string(&self.name)?;
        self.has_authority.ser(writer)?;
        self.position.ser(writer)?;
        self.rotation.ser(writer)
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            id: reader.read_packed_u32()?,
            name: reader.read_string()?,
            has_authority: bool::de(reader)?,
            position: Vec3::de(reader)?,
            rotation: Quat::de(reader)?,
        })
    }
}

/// Tag 2001.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestroyEntity {
    pub id: EntityId,
}

impl Serde for DestroyEntity {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_packed_u32(self.id);
        Ok(())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            id: reader.read_packed_u32()?,
        })
    }
}

/// Tag 2002. Per-tick pose snapshot, stamped with the sender's clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdatePositionAndRotation {
    pub timestamp: RemoteTimestamp,
    pub id: EntityId,
    pub position: Vec3,
    pub rotation: Quat,
}

impl Serde for UpdatePositionAndRotation {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        self.timestamp.ser(writer)?;
        writer.write_packed_u32(self.id);
        self.position.ser(writer)?;
        self.rotation.ser(writer)
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            timestamp: RemoteTimestamp::de(reader)?,
            id: reader.read_packed_u32()?,
            position: Vec3::de(reader)?,
            rotation: Quat::de(reader)?,
        })
    }
}

/// Tag 2003.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetPosition {
    pub id: EntityId,
    pub position: Vec3,
}

impl Serde for SetPosition {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_packed_u32(self.id);
        self.position.ser(writer)
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            id: reader.read_packed_u32()?,
            position: Vec3::de(reader)?,
        })
    }
}

/// Tag 2004.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetRotation {
    pub id: EntityId,
    pub rotation: Quat,
}

impl Serde for SetRotation {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_packed_u32(self.id);
        self.rotation.ser(writer)
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            id: reader.read_packed_u32()?,
            rotation: Quat::de(reader)?,
        })
    }
}

/// Tag 2005.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetParent {
    pub id: EntityId,
    pub parent_id: EntityId,
}

impl Serde for SetParent {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_packed_u32(self.id);
        writer.write_packed_u32(self.parent_id);
        Ok(())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            id: reader.read_packed_u32()?,
            parent_id: reader.read_packed_u32()?,
        })
    }
}

/// Tag 2006. One Networked Variable delta, server to observers.
/// The value is an opaque length-prefixed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetNetworkedVariable {
    pub id: EntityId,
    pub name: String,
    pub value: Vec<u8>,
}

impl Serde for SetNetworkedVariable {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_packed_u32(self.id);
        writer.write_string(&self.name)?;
        writer.write_blob(&self.value)
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            id: reader.read_packed_u32()?,
            name: reader.read_string()?,
            value: reader.read_blob()?,
        })
    }
}

/// Tag 2007. One User Message delta, authority client to server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetUserMessage {
    pub id: EntityId,
    pub name: String,
    pub value: Vec<u8>,
}

impl Serde for SetUserMessage {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_packed_u32(self.id);
        writer.write_string(&self.name)?;
        writer.write_blob(&self.value)
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            id: reader.read_packed_u32()?,
            name: reader.read_string()?,
            value: reader.read_blob()?,
        })
    }
}
