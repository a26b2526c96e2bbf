use std::collections::HashMap;

use log::error;

use entsync_shared::{EntityError, EntityId, Quat, TemplateRegistry, Vec3};

use crate::{behavior::Behavior, entity::Entity};

/// Opaque handle to a mirrored entity. Stable for the entity's
/// lifetime, independent of whether it carries a network id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityKey(u64);

/// Catalog of mirrored entities.
///
/// Networked entities arrive with a server-assigned id; local-only
/// entities have none, so the catalog is keyed by an internal handle
/// with a side table from network id to handle.
pub struct EntityRegistry {
    templates: TemplateRegistry<Box<dyn Behavior>>,
    entities: HashMap<EntityKey, Entity>,
    by_net_id: HashMap<EntityId, EntityKey>,
    next_key: u64,
    snapshot_capacity: usize,
}

impl EntityRegistry {
    pub fn new(snapshot_capacity: usize) -> Self {
        Self {
            templates: TemplateRegistry::new(),
            entities: HashMap::new(),
            by_net_id: HashMap::new(),
            next_key: 0,
            snapshot_capacity,
        }
    }

    /// Registers an entity template. Idempotent per name: a duplicate
    /// registration is logged and ignored.
    pub fn register_template(
        &mut self,
        name: &str,
        spawner: impl Fn() -> Box<dyn Behavior> + 'static,
    ) {
        self.templates.register(name, spawner);
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains(name)
    }

    /// Creates a mirrored entity. The network id, when present, comes
    /// from the server and must not collide with a live entity; the
    /// existing entity wins and the spawn is refused.
    pub fn spawn(
        &mut self,
        id: Option<EntityId>,
        name: &str,
        has_authority: bool,
        position: Vec3,
        rotation: Quat,
    ) -> Result<EntityKey, EntityError> {
        if let Some(id) = id {
            if self.by_net_id.contains_key(&id) {
                error!("error creating entity `{name}`: id {id} is already live");
                return Err(EntityError::DuplicateId { id });
            }
        }
        let Some(template) = self.templates.get(name) else {
            error!("error creating entity `{name}`: no template registered");
            return Err(EntityError::InstantiationFailed {
                name: name.to_string(),
            });
        };
        let behavior = template.instantiate();

        let key = EntityKey(self.next_key);
        self.next_key += 1;

        let entity = Entity::new(
            id,
            name,
            has_authority,
            position,
            rotation,
            self.snapshot_capacity,
            behavior,
        );
        self.entities.insert(key, entity);
        if let Some(id) = id {
            self.by_net_id.insert(id, key);
        }
        Ok(key)
    }

    /// Marks the entity spawned and fires its `on_spawned` hook.
    pub fn finish_spawn(&mut self, key: EntityKey) {
        if let Some(entity) = self.entities.get_mut(&key) {
            entity.mark_spawned();
            entity.with_behavior(|behavior, entity| behavior.on_spawned(entity));
        }
    }

    /// Destroys one mirrored entity. Cascades are not resolved here:
    /// the server sends an explicit destroy for every entity in a
    /// subtree, children first. Returns whether the key was live.
    pub fn destroy(&mut self, key: EntityKey) -> bool {
        let Some(mut entity) = self.entities.remove(&key) else {
            return false;
        };
        if let Some(id) = entity.id() {
            self.by_net_id.remove(&id);
        }
        entity.with_behavior(|behavior, entity| behavior.on_destroyed(entity));
        true
    }

    pub fn destroy_by_net_id(&mut self, id: EntityId) -> Result<(), EntityError> {
        let Some(key) = self.by_net_id.get(&id).copied() else {
            return Err(EntityError::EntityNotFound { id });
        };
        self.destroy(key);
        Ok(())
    }

    /// Destroys every mirrored entity.
    pub fn destroy_all(&mut self) {
        let keys: Vec<EntityKey> = self.entities.keys().copied().collect();
        for key in keys {
            self.destroy(key);
        }
    }

    pub fn get(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(&key)
    }

    pub fn get_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(&key)
    }

    pub fn key_for_net_id(&self, id: EntityId) -> Option<EntityKey> {
        self.by_net_id.get(&id).copied()
    }

    pub fn get_by_net_id(&self, id: EntityId) -> Option<&Entity> {
        self.key_for_net_id(id).and_then(|key| self.get(key))
    }

    pub fn get_by_net_id_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let key = self.key_for_net_id(id)?;
        self.entities.get_mut(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    /// All mirrored entities registered under the given template name.
    pub fn get_by_name<'r>(&'r self, name: &'r str) -> impl Iterator<Item = &'r Entity> {
        self.entities.values().filter(move |entity| entity.name() == name)
    }

    pub fn keys(&self) -> Vec<EntityKey> {
        self.entities.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
