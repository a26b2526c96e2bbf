//! # Entsync Server
//! The authoritative side of the replication layer: spawns entities,
//! owns their Networked Variables, and syncs spawn/destroy/pose/delta
//! traffic to every ready observer connection.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub mod shared {
    pub use entsync_shared::{
        inverse_lerp, ByteReader, ByteWriter, Channel, Connection, ConnectionId, EntityError,
        EntityId, EventArguments, EventBus, HandshakeRequest, HandshakeResponse, MsgType, Pose,
        Qos, Quat, RemoteTimestamp, Serde, SerdeErr, ServerEvent, ServerTransport, Vec3,
        DEFAULT_NET_UPDATE_INTERVAL,
    };
}

mod behavior;
mod entity;
mod module;
mod registry;
mod server;
mod server_config;

pub use behavior::{Behavior, NullBehavior};
pub use entity::Entity;
pub use module::Module;
pub use registry::EntityRegistry;
pub use server::Server;
pub use server_config::ServerConfig;
