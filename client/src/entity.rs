use entsync_shared::{
    EntityError, EntityId, Quat, Serde, VarTable, Vec3, WriteOutcome,
    DEFAULT_NET_UPDATE_INTERVAL,
};

use crate::{behavior::Behavior, snapshot::SnapshotBuffer};

/// A mirrored entity: the client's proxy for a server-owned original,
/// or a purely local entity that was never networked.
pub struct Entity {
    id: Option<EntityId>,
    name: String,
    has_authority: bool,
    spawned: bool,

    pub(crate) position: Vec3,
    pub(crate) rotation: Quat,
    pub(crate) parent: Option<EntityId>,

    net_update_interval: f32,
    pub(crate) net_update_time: f32,
    pub(crate) dirty: bool,

    /// Inbound mirror of the server's Networked Variables.
    pub(crate) net_data: VarTable,
    /// Outbound User Messages, flushed to the server when dirty.
    pub(crate) user_messages: VarTable,

    pub(crate) snapshots: SnapshotBuffer,

    behavior: Option<Box<dyn Behavior>>,
}

impl Entity {
    pub(crate) fn new(
        id: Option<EntityId>,
        name: &str,
        has_authority: bool,
        position: Vec3,
        rotation: Quat,
        snapshot_capacity: usize,
        behavior: Box<dyn Behavior>,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            has_authority,
            spawned: false,
            position,
            rotation,
            parent: None,
            net_update_interval: DEFAULT_NET_UPDATE_INTERVAL,
            net_update_time: 0.0,
            dirty: false,
            net_data: VarTable::new(),
            user_messages: VarTable::new(),
            snapshots: SnapshotBuffer::new(snapshot_capacity),
            behavior: Some(behavior),
        }
    }

    /// The server-assigned id, or `None` for a local-only entity.
    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this client holds authority over the entity. Fixed at
    /// spawn time.
    pub fn has_authority(&self) -> bool {
        self.has_authority
    }

    pub fn is_spawned(&self) -> bool {
        self.spawned
    }

    pub(crate) fn mark_spawned(&mut self) {
        self.spawned = true;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Seconds between outbound flushes for this entity.
    pub fn net_update_interval(&self) -> f32 {
        self.net_update_interval
    }

    pub fn set_net_update_interval(&mut self, seconds: f32) {
        self.net_update_interval = seconds.max(0.0);
    }

    /// True while the entity holds unflushed User Messages.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Sets a User Message. Unidirectional: set by the authoritative
    /// client, flushed to the server on the next outbound tick. A
    /// write equal to the stored value changes nothing.
    pub fn set_user_message<T: Serde>(
        &mut self,
        name: &str,
        value: &T,
    ) -> Result<(), EntityError> {
        if self.user_messages.set(name, value)? == WriteOutcome::Written {
            self.dirty = true;
        }
        Ok(())
    }

    pub fn get_user_message<T: Serde>(&self, name: &str) -> Option<T> {
        self.user_messages.get(name)
    }

    /// Reads a Networked Variable previously received from the server.
    pub fn get_networked_var<T: Serde>(&self, name: &str) -> Option<T> {
        self.net_data.get(name)
    }

    pub fn networked_var_names(&self) -> impl Iterator<Item = &str> {
        self.net_data.names()
    }

    pub fn snapshots(&self) -> &SnapshotBuffer {
        &self.snapshots
    }

    /// Runs a behavior hook with mutable access to this entity. The
    /// behavior is parked outside the entity for the duration so both
    /// sides can be borrowed mutably.
    pub(crate) fn with_behavior(&mut self, f: impl FnOnce(&mut dyn Behavior, &mut Entity)) {
        if let Some(mut behavior) = self.behavior.take() {
            f(behavior.as_mut(), self);
            self.behavior = Some(behavior);
        }
    }
}
