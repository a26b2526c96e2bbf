//! # Entsync Client
//! The observing side of the replication layer: mirrors server
//! entities, interpolates their motion for rendering and flushes User
//! Message writes back to the authority.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub mod shared {
    pub use entsync_shared::{
        inverse_lerp, ByteReader, ByteWriter, Channel, ClientEvent, ClientTransport, ConnectionId,
        EntityError, EntityId, EventArguments, EventBus, HandshakeRequest, HandshakeResponse,
        MsgType, Pose, Qos, Quat, RemoteTimestamp, Serde, SerdeErr, Vec3,
        DEFAULT_NET_UPDATE_INTERVAL,
    };
}

mod behavior;
mod client;
mod client_config;
mod entity;
mod module;
mod registry;
mod snapshot;

pub use behavior::{Behavior, NullBehavior};
pub use client::Client;
pub use client_config::ClientConfig;
pub use entity::Entity;
pub use module::Module;
pub use registry::{EntityKey, EntityRegistry};
pub use snapshot::{Snapshot, SnapshotBuffer};
