//! The typed wire message set. Every message has a stable numeric tag
//! and an explicit field order; see each struct's `Serde` impl.

mod entity;
mod handshake;
mod msg_type;

pub use entity::{
    DestroyEntity, SetNetworkedVariable, SetParent, SetPosition, SetRotation, SetUserMessage,
    SpawnEntity, UpdatePositionAndRotation,
};
pub use handshake::{InvokeEvent, RequestHandshake, RespondHandshake};
pub use msg_type::MsgType;
