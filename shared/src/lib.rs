//! # Entsync Shared
//! Common functionality shared between the entsync-server &
//! entsync-client crates: the wire message set, channel policy,
//! math & connection types, slot tables, templates and the event bus.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use entsync_serde::{ByteReader, ByteWriter, Serde, SerdeErr, MAX_FIELD_BYTES};

mod channel;
mod connection;
mod error;
mod events;
mod handshake;
mod math;
mod messages;
mod template;
mod transport;
mod types;
mod vars;

pub use channel::{Channel, Qos};
pub use connection::Connection;
pub use error::EntityError;
pub use events::{EventArguments, EventBus};
pub use handshake::{HandshakeRequest, HandshakeResponse};
pub use math::{inverse_lerp, Pose, Quat, Vec3};
pub use messages::{
    DestroyEntity, InvokeEvent, MsgType, RequestHandshake, RespondHandshake, SetNetworkedVariable,
    SetParent, SetPosition, SetRotation, SetUserMessage, SpawnEntity, UpdatePositionAndRotation,
};
pub use template::{EntityTemplate, TemplateRegistry};
pub use transport::{ClientEvent, ClientTransport, ServerEvent, ServerTransport};
pub use types::{ConnectionId, EntityId, RemoteTimestamp};
pub use vars::{VarTable, WriteOutcome};

/// Default interval in seconds between replication flushes (33 Hz).
pub const DEFAULT_NET_UPDATE_INTERVAL: f32 = 0.030;
