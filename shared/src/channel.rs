use crate::messages::MsgType;

/// Delivery guarantee class a channel asks of the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qos {
    ReliableOrdered,
    Unreliable,
}

/// The logical channels both peers always carry, in wire id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// General messages that require reliability and order.
    GeneralOrdered,
    /// General messages that require fast transmission and no reliability.
    GeneralUnreliable,
    /// Entity position/rotation snapshots.
    PositionAndRotation,
    /// Entity Networked Variable and User Message deltas.
    EntityData,
}

impl Channel {
    pub fn id(&self) -> u8 {
        match self {
            Channel::GeneralOrdered => 0,
            Channel::GeneralUnreliable => 1,
            Channel::PositionAndRotation => 2,
            Channel::EntityData => 3,
        }
    }

    pub fn qos(&self) -> Qos {
        match self {
            Channel::GeneralOrdered | Channel::EntityData => Qos::ReliableOrdered,
            Channel::GeneralUnreliable | Channel::PositionAndRotation => Qos::Unreliable,
        }
    }

    /// The channel policy: which channel each message kind travels on.
    pub fn for_msg_type(msg_type: MsgType) -> Channel {
        match msg_type {
            MsgType::RequestHandshake
            | MsgType::RespondHandshake
            | MsgType::Ready
            | MsgType::NotReady
            | MsgType::SpawnEntity
            | MsgType::DestroyEntity
            | MsgType::SetParent
            | MsgType::InvokeEvent => Channel::GeneralOrdered,
            MsgType::SetPosition | MsgType::SetRotation => Channel::GeneralUnreliable,
            MsgType::UpdatePositionAndRotation => Channel::PositionAndRotation,
            MsgType::SetNetworkedVariable | MsgType::SetUserMessage => Channel::EntityData,
        }
    }
}
