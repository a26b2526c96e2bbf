use thiserror::Error;

use crate::types::{ConnectionId, EntityId};

/// Errors surfaced by registry and replication operations.
///
/// None of these are fatal: every failure degrades to "no-op plus
/// diagnostic" so a transient desync never crashes either peer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    /// No template registered under the requested name
    #[error("no entity template registered under `{name}`")]
    TemplateNotFound { name: String },

    /// No live entity with the requested id
    #[error("no live entity with id {id}")]
    EntityNotFound { id: EntityId },

    /// Spawn requested with an id that is already live
    #[error("entity with id {id} already exists, can't spawn it again")]
    DuplicateId { id: EntityId },

    /// Write attempted by a party without authority over the entity
    #[error("connection {connection} has no authority over entity {id}")]
    Unauthorized {
        id: EntityId,
        connection: ConnectionId,
    },

    /// Payload could not be encoded for the wire; state is unchanged
    #[error("value for slot `{name}` is not serializable: {reason}")]
    NotSerializable { name: String, reason: String },

    /// Template resolution or construction failed mid-spawn
    #[error("error creating entity `{name}`")]
    InstantiationFailed { name: String },
}
