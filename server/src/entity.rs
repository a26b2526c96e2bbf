use entsync_shared::{
    ConnectionId, EntityError, EntityId, Quat, Serde, VarTable, Vec3, WriteOutcome,
    DEFAULT_NET_UPDATE_INTERVAL,
};

use crate::behavior::Behavior;

/// A live server entity: the authoritative copy observers mirror.
pub struct Entity {
    id: EntityId,
    name: String,
    authority: Option<ConnectionId>,
    spawned: bool,

    pub(crate) position: Vec3,
    pub(crate) rotation: Quat,
    pub(crate) parent: Option<EntityId>,

    /// Whether per-tick pose snapshots are broadcast for this entity.
    pub networked_position_and_rotation: bool,

    net_update_interval: f32,
    pub(crate) net_update_time: f32,
    pub(crate) dirty: bool,

    pub(crate) net_vars: VarTable,
    pub(crate) user_messages: VarTable,

    behavior: Option<Box<dyn Behavior>>,
}

impl Entity {
    pub(crate) fn new(
        id: EntityId,
        name: &str,
        authority: Option<ConnectionId>,
        position: Vec3,
        rotation: Quat,
        behavior: Box<dyn Behavior>,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            authority,
            spawned: false,
            position,
            rotation,
            parent: None,
            networked_position_and_rotation: false,
            net_update_interval: DEFAULT_NET_UPDATE_INTERVAL,
            net_update_time: 0.0,
            dirty: false,
            net_vars: VarTable::new(),
            user_messages: VarTable::new(),
            behavior: Some(behavior),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The connection holding authority, or `None` while the server
    /// keeps it. Fixed at spawn time.
    pub fn authority(&self) -> Option<ConnectionId> {
        self.authority
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

    /// Seconds between replication flushes for this entity.
    pub fn net_update_interval(&self) -> f32 {
        self.net_update_interval
    }

    pub fn set_net_update_interval(&mut self, seconds: f32) {
        self.net_update_interval = seconds.max(0.0);
    }

    /// True while the entity holds unflushed state.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Sets a Networked Variable. Unidirectional: set by the server,
    /// synchronized to all ready observers on the next replication
    /// tick. A write equal to the stored value changes nothing.
    pub fn set_networked_var<T: Serde>(
        &mut self,
        name: &str,
        value: &T,
    ) -> Result<(), EntityError> {
        if self.net_vars.set(name, value)? == WriteOutcome::Written {
            self.dirty = true;
        }
        Ok(())
    }

    pub fn get_networked_var<T: Serde>(&self, name: &str) -> Option<T> {
        self.net_vars.get(name)
    }

    /// Reads a User Message previously received from the entity's
    /// authoritative client.
    pub fn get_user_message<T: Serde>(&self, name: &str) -> Option<T> {
        self.user_messages.get(name)
    }

    pub fn networked_var_names(&self) -> impl Iterator<Item = &str> {
        self.net_vars.names()
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
