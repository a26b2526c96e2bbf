use entsync_shared::{Quat, Vec3};

use crate::entity::Entity;

/// Application hooks attached to a mirrored entity. Resolved at
/// startup through template registration, never by runtime scanning.
///
/// Every hook has a no-op default; implement only what the entity
/// kind needs.
pub trait Behavior {
    fn on_spawned(&mut self, _entity: &mut Entity) {}

    fn on_destroyed(&mut self, _entity: &mut Entity) {}

    /// Runs once per outbound flush tick, before User Messages are
    /// sent, so it is the fastest place to update them.
    fn on_net_update(&mut self, _entity: &mut Entity) {}

    fn on_set_pos(&mut self, _entity: &mut Entity, _old: Vec3, _new: Vec3) {}

    fn on_set_rot(&mut self, _entity: &mut Entity, _old: Quat, _new: Quat) {}

    fn on_set_parent(&mut self, _entity: &mut Entity) {}

    /// Called when the server updated one of the entity's Networked
    /// Variables.
    fn on_set_networked_var(&mut self, _entity: &mut Entity, _name: &str) {}
}

/// Inert behavior for entity kinds that carry no client-side logic.
pub struct NullBehavior;

impl Behavior for NullBehavior {}
