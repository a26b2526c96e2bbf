use entsync_serde::{ByteReader, ByteWriter, Serde, SerdeErr};

/// Numeric tags for every message kind on the wire.
///
/// 1000-range: connection control. 2000-range: entity replication.
/// 3000-range: event invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum MsgType {
    RequestHandshake = 1000,
    RespondHandshake = 1001,
    Ready = 1002,
    NotReady = 1003,

    SpawnEntity = 2000,
    DestroyEntity = 2001,
    UpdatePositionAndRotation = 2002,
    SetPosition = 2003,
    SetRotation = 2004,
    SetParent = 2005,
    SetNetworkedVariable = 2006,
    SetUserMessage = 2007,

    InvokeEvent = 3000,
}

impl MsgType {
    pub fn tag(&self) -> u16 {
        *self as u16
    }

    pub fn from_tag(tag: u16) -> Option<MsgType> {
        match tag {
            1000 => Some(MsgType::RequestHandshake),
            1001 => Some(MsgType::RespondHandshake),
            1002 => Some(MsgType::Ready),
            1003 => Some(MsgType::NotReady),
            2000 => Some(MsgType::SpawnEntity),
            2001 => Some(MsgType::DestroyEntity),
            2002 => Some(MsgType::UpdatePositionAndRotation),
            2003 => Some(MsgType::SetPosition),
            2004 => Some(MsgType::SetRotation),
            2005 => Some(MsgType::SetParent),
            2006 => Some(MsgType::SetNetworkedVariable),
            2007 => Some(MsgType::SetUserMessage),
            3000 => Some(MsgType::InvokeEvent),
            _ => None,
        }
    }
}

impl Serde for MsgType {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        self.tag().ser(writer)
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let tag = u16::de(reader)?;
        MsgType::from_tag(tag).ok_or(SerdeErr::UnknownDiscriminant {
            type_name: "MsgType",
            value: u64::from(tag),
        })
    }
}
