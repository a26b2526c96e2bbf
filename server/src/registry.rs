use std::collections::HashMap;

use log::error;

use entsync_shared::{
    ConnectionId, EntityError, EntityId, Quat, TemplateRegistry, Vec3,
};

use crate::{behavior::Behavior, entity::Entity};

/// Authoritative catalog of live server entities.
///
/// Ids are allocated monotonically from 0 and are unique among
/// currently-live entities; the counter resets only when every entity
/// is destroyed en masse.
pub struct EntityRegistry {
    templates: TemplateRegistry<Box<dyn Behavior>>,
    entities: HashMap<EntityId, Entity>,
    next_entity_id: EntityId,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            templates: TemplateRegistry::new(),
            entities: HashMap::new(),
            next_entity_id: 0,
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

    /// Creates a live entity from a registered template, allocating
    /// the next free id. The entity is catalogued but not yet marked
    /// spawned; callers follow up with [`finish_spawn`](Self::finish_spawn)
    /// once any spawn traffic has been enqueued.
    pub fn spawn(
        &mut self,
        name: &str,
        authority: Option<ConnectionId>,
        position: Vec3,
        rotation: Quat,
    ) -> Result<EntityId, EntityError> {
        let Some(template) = self.templates.get(name) else {
            error!("error creating entity `{name}`: template not found");
            return Err(EntityError::TemplateNotFound {
                name: name.to_string(),
            });
        };
        let behavior = template.instantiate();

        let id = self.next_entity_id;
        self.next_entity_id += 1;

        let entity = Entity::new(id, name, authority, position, rotation, behavior);
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Marks the entity spawned and fires its `on_spawned` hook.
    pub fn finish_spawn(&mut self, id: EntityId) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.mark_spawned();
            entity.with_behavior(|behavior, entity| behavior.on_spawned(entity));
        }
    }

    /// Destroys the entity and, recursively, every entity whose parent
    /// pointer resolves to it. Returns the destroyed ids in teardown
    /// order: each subtree's children precede their parent, so destroy
    /// messages emitted in this order satisfy the child-before-parent
    /// observability guarantee.
    pub fn destroy(&mut self, id: EntityId) -> Result<Vec<EntityId>, EntityError> {
        if !self.entities.contains_key(&id) {
            return Err(EntityError::EntityNotFound { id });
        }
        let mut order = Vec::new();
        self.destroy_recursive(id, &mut order);
        Ok(order)
    }

    fn destroy_recursive(&mut self, id: EntityId, order: &mut Vec<EntityId>) {
        let children: Vec<EntityId> = self
            .entities
            .values()
            .filter(|entity| entity.parent() == Some(id))
            .map(Entity::id)
            .collect();
        for child in children {
            self.destroy_recursive(child, order);
        }
        if let Some(mut entity) = self.entities.remove(&id) {
            entity.with_behavior(|behavior, entity| behavior.on_destroyed(entity));
            order.push(id);
        }
    }

    /// Destroys every live entity and resets the id allocator to 0.
    /// Returns the destroyed ids.
    pub fn destroy_all(&mut self) -> Vec<EntityId> {
        let ids: Vec<EntityId> = self.entities.keys().copied().collect();
        let mut order = Vec::new();
        for id in ids {
            // A cascade may already have taken this one
            if self.entities.contains_key(&id) {
                self.destroy_recursive(id, &mut order);
            }
        }
        self.next_entity_id = 0;
        order
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// All live entities registered under the given template name.
    pub fn get_by_name<'r>(&'r self, name: &'r str) -> impl Iterator<Item = &'r Entity> {
        self.entities.values().filter(move |entity| entity.name() == name)
    }

    /// All live entities the given connection has authority over.
    pub fn get_for_authority(
        &self,
        connection: ConnectionId,
    ) -> impl Iterator<Item = &Entity> + '_ {
        self.entities
            .values()
            .filter(move |entity| entity.authority() == Some(connection))
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
