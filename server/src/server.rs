use std::collections::HashMap;

use log::{debug, info, warn};

use entsync_shared::{
    Channel, Connection, ConnectionId, DestroyEntity, EntityError, EntityId, EventArguments,
    EventBus, HandshakeResponse, InvokeEvent, MsgType, Quat, RequestHandshake, RespondHandshake,
    Serde, ServerEvent, ServerTransport, SetNetworkedVariable, SetParent, SetPosition,
    SetRotation, SetUserMessage, SpawnEntity, UpdatePositionAndRotation, Vec3,
};

use crate::{
    entity::Entity, module::Module, registry::EntityRegistry, server_config::ServerConfig,
};

/// The authoritative replication endpoint.
///
/// Owns the entity registry, the connection table, the event bus and
/// the module chain; drives the delta-synchronization engine from
/// [`tick`](Self::tick). All inbound traffic is dispatched
/// synchronously on the ticking thread, so no operation ever observes
/// concurrent mutation.
pub struct Server<T: ServerTransport> {
    config: ServerConfig,
    transport: T,
    registry: EntityRegistry,
    events: EventBus,
    connections: HashMap<ConnectionId, Connection>,
    modules: Vec<Box<dyn Module>>,
}

impl<T: ServerTransport> Server<T> {
    pub fn new(config: ServerConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            registry: EntityRegistry::new(),
            events: EventBus::new(),
            connections: HashMap::new(),
            modules: Vec::new(),
        }
    }

    // Composition

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Appends a module to the handshake/lifecycle chain.
    pub fn use_module(&mut self, mut module: Box<dyn Module>) {
        module.on_use();
        self.modules.push(module);
    }

    /// Tears the process down: destroys all entities and releases the
    /// module chain and event subscriptions.
    pub fn shutdown(&mut self) {
        self.destroy_all_entities();
        for module in &mut self.modules {
            module.on_stop_using();
        }
        self.modules.clear();
        self.events.unsubscribe_all();
    }

    // Events

    /// Publishes an event locally, and optionally on every ready
    /// client as well.
    pub fn invoke_event(&mut self, name: &str, args: &EventArguments, invoke_on_clients: bool) {
        self.events.publish(name, args);
        if invoke_on_clients && self.transport.is_listening() {
            let msg = InvokeEvent {
                name: name.to_string(),
                args: args.raw().clone(),
            };
            match msg.to_bytes() {
                Ok(payload) => Self::send_to_ready(
                    &mut self.transport,
                    &self.connections,
                    MsgType::InvokeEvent,
                    &payload,
                ),
                Err(e) => warn!("event `{name}` not sent: {e}"),
            }
        }
    }

    /// Publishes an event on a single connection, without invoking it
    /// locally.
    pub fn invoke_event_on(
        &mut self,
        connection: ConnectionId,
        name: &str,
        args: &EventArguments,
    ) {
        let msg = InvokeEvent {
            name: name.to_string(),
            args: args.raw().clone(),
        };
        match msg.to_bytes() {
            Ok(payload) => self.transport.send_to(
                connection,
                Channel::for_msg_type(MsgType::InvokeEvent),
                MsgType::InvokeEvent,
                &payload,
            ),
            Err(e) => warn!("event `{name}` not sent: {e}"),
        }
    }

    // Entity lifecycle

    pub fn register_template(
        &mut self,
        name: &str,
        spawner: impl Fn() -> Box<dyn crate::Behavior> + 'static,
    ) {
        self.registry.register_template(name, spawner);
    }

    /// Spawns an entity, fanning a SpawnEntity message out to every
    /// ready observer. The authority bit is set only on the owning
    /// connection's copy.
    pub fn spawn_entity(
        &mut self,
        name: &str,
        authority: Option<ConnectionId>,
        position: Vec3,
        rotation: Quat,
    ) -> Result<EntityId, EntityError> {
        let id = self.registry.spawn(name, authority, position, rotation)?;
        if let Some(entity) = self.registry.get_mut(id) {
            entity.set_net_update_interval(self.config.net_update_interval);
        }

        if self.transport.is_listening() {
            for connection in self.connections.values().filter(|c| c.is_ready()) {
                let msg = SpawnEntity {
                    id,
                    name: name.to_string(),
                    has_authority: authority == Some(connection.id),
                    position,
                    rotation,
                };
                match msg.to_bytes() {
                    Ok(payload) => self.transport.send_to(
                        connection.id,
                        Channel::for_msg_type(MsgType::SpawnEntity),
                        MsgType::SpawnEntity,
                        &payload,
                    ),
                    Err(e) => warn!("spawn message for entity {id} not sent: {e}"),
                }
            }
        }

        self.registry.finish_spawn(id);

        let mut args = EventArguments::new();
        args.set_var("entity", &id);
        self.events.publish("OnEntitySpawned", &args);
        Ok(id)
    }

    /// Destroys the entity and every descendant, emitting each child's
    /// destroy message before its parent's.
    pub fn destroy_entity(&mut self, id: EntityId) -> Result<(), EntityError> {
        let order = self.registry.destroy(id)?;
        self.broadcast_destroys(&order);
        Ok(())
    }

    /// Destroys all spawned entities and resets the id allocator.
    pub fn destroy_all_entities(&mut self) {
        let order = self.registry.destroy_all();
        self.broadcast_destroys(&order);
    }

    fn broadcast_destroys(&mut self, order: &[EntityId]) {
        if self.transport.is_listening() {
            for destroyed in order {
                if let Ok(payload) = (DestroyEntity { id: *destroyed }).to_bytes() {
                    Self::send_to_ready(
                        &mut self.transport,
                        &self.connections,
                        MsgType::DestroyEntity,
                        &payload,
                    );
                }
            }
        }
        for destroyed in order {
            let mut args = EventArguments::new();
            args.set_var("entity", destroyed);
            self.events.publish("OnEntityDestroyed", &args);
        }
    }

    /// Re-sends the entity's spawn message to one connection without
    /// respawning it anywhere, for newly connecting clients.
    pub fn send_entity_to_connection(
        &mut self,
        id: EntityId,
        connection: ConnectionId,
    ) -> Result<(), EntityError> {
        let entity = self
            .registry
            .get(id)
            .ok_or(EntityError::EntityNotFound { id })?;
        let msg = SpawnEntity {
            id,
            name: entity.name().to_string(),
            has_authority: entity.authority() == Some(connection),
            position: entity.position(),
            rotation: entity.rotation(),
        };
        match msg.to_bytes() {
            Ok(payload) => self.transport.send_to(
                connection,
                Channel::for_msg_type(MsgType::SpawnEntity),
                MsgType::SpawnEntity,
                &payload,
            ),
            Err(e) => warn!("spawn message for entity {id} not sent: {e}"),
        }
        Ok(())
    }

    // Entity state writes

    /// Moves the entity and sends the new position to all ready
    /// observers.
    pub fn set_position(&mut self, id: EntityId, position: Vec3) -> Result<(), EntityError> {
        let entity = self
            .registry
            .get_mut(id)
            .ok_or(EntityError::EntityNotFound { id })?;
        let old = entity.position();
        entity.position = position;
        entity.with_behavior(|behavior, entity| behavior.on_set_pos(entity, old, position));

        if self.transport.is_listening() {
            if let Ok(payload) = (SetPosition { id, position }).to_bytes() {
                Self::send_to_ready(
                    &mut self.transport,
                    &self.connections,
                    MsgType::SetPosition,
                    &payload,
                );
            }
        }
        Ok(())
    }

    /// Rotates the entity and sends the new rotation to all ready
    /// observers.
    pub fn set_rotation(&mut self, id: EntityId, rotation: Quat) -> Result<(), EntityError> {
        let entity = self
            .registry
            .get_mut(id)
            .ok_or(EntityError::EntityNotFound { id })?;
        let old = entity.rotation();
        entity.rotation = rotation;
        entity.with_behavior(|behavior, entity| behavior.on_set_rot(entity, old, rotation));

        if self.transport.is_listening() {
            if let Ok(payload) = (SetRotation { id, rotation }).to_bytes() {
                Self::send_to_ready(
                    &mut self.transport,
                    &self.connections,
                    MsgType::SetRotation,
                    &payload,
                );
            }
        }
        Ok(())
    }

    /// Reparents the entity (weak reference, by id) and notifies all
    /// ready observers.
    pub fn set_parent(&mut self, id: EntityId, parent_id: EntityId) -> Result<(), EntityError> {
        if !self.registry.contains(parent_id) {
            return Err(EntityError::EntityNotFound { id: parent_id });
        }
        let entity = self
            .registry
            .get_mut(id)
            .ok_or(EntityError::EntityNotFound { id })?;
        entity.parent = Some(parent_id);
        entity.with_behavior(|behavior, entity| behavior.on_set_parent(entity));

        if self.transport.is_listening() {
            if let Ok(payload) = (SetParent { id, parent_id }).to_bytes() {
                Self::send_to_ready(
                    &mut self.transport,
                    &self.connections,
                    MsgType::SetParent,
                    &payload,
                );
            }
        }
        Ok(())
    }

    /// Sets a Networked Variable; it reaches observers on the entity's
    /// next replication tick.
    pub fn set_networked_var<V: Serde>(
        &mut self,
        id: EntityId,
        name: &str,
        value: &V,
    ) -> Result<(), EntityError> {
        let entity = self
            .registry
            .get_mut(id)
            .ok_or(EntityError::EntityNotFound { id })?;
        entity.set_networked_var(name, value).inspect_err(|e| {
            warn!("networked variable not set on entity {id}: {e}");
        })
    }

    // The tick loop

    /// Runs one fixed-step tick: drains inbound traffic, then flushes
    /// every entity whose replication interval elapsed.
    pub fn tick(&mut self, dt: f32) {
        self.process_inbound();

        let listening = self.transport.is_listening();
        let timestamp = self.transport.network_timestamp();

        for id in self.registry.ids() {
            // An inbound handler may have destroyed this one mid-tick
            let mut pose_payload: Option<Vec<u8>> = None;
            let mut var_payloads: Vec<Vec<u8>> = Vec::new();
            {
                let Some(entity) = self.registry.get_mut(id) else {
                    continue;
                };
                entity.net_update_time += dt;
                if entity.net_update_time <= entity.net_update_interval() {
                    continue;
                }
                entity.with_behavior(|behavior, entity| behavior.on_net_update(entity));

                if entity.networked_position_and_rotation && listening {
                    let msg = UpdatePositionAndRotation {
                        timestamp,
                        id,
                        position: entity.position(),
                        rotation: entity.rotation(),
                    };
                    if let Ok(payload) = msg.to_bytes() {
                        pose_payload = Some(payload);
                    }
                }

                if entity.dirty && listening {
                    for (name, value) in entity.net_vars.drain_dirty() {
                        let msg = SetNetworkedVariable { id, name, value };
                        match msg.to_bytes() {
                            Ok(payload) => var_payloads.push(payload),
                            Err(e) => warn!("variable delta for entity {id} dropped: {e}"),
                        }
                    }
                    entity.dirty = false;
                }

                entity.net_update_time = 0.0;
            }

            if let Some(payload) = pose_payload {
                Self::send_to_ready(
                    &mut self.transport,
                    &self.connections,
                    MsgType::UpdatePositionAndRotation,
                    &payload,
                );
            }
            for payload in var_payloads {
                Self::send_to_ready(
                    &mut self.transport,
                    &self.connections,
                    MsgType::SetNetworkedVariable,
                    &payload,
                );
            }
        }
    }

    fn send_to_ready(
        transport: &mut T,
        connections: &HashMap<ConnectionId, Connection>,
        msg_type: MsgType,
        payload: &[u8],
    ) {
        let channel = Channel::for_msg_type(msg_type);
        for connection in connections.values().filter(|c| c.is_ready()) {
            transport.send_to(connection.id, channel, msg_type, payload);
        }
    }

    // Inbound dispatch

    fn process_inbound(&mut self) {
        for event in self.transport.receive() {
            match event {
                ServerEvent::Connected(connection) => self.handle_connected(connection),
                ServerEvent::Disconnected(connection) => self.handle_disconnected(connection),
                ServerEvent::Message {
                    from,
                    msg_type,
                    payload,
                } => self.handle_message(from, msg_type, &payload),
            }
        }
    }

    fn handle_connected(&mut self, connection: ConnectionId) {
        if self.connections.len() >= self.config.max_connections {
            warn!("connection {connection} refused: server is full");
            self.transport.disconnect(connection);
            return;
        }
        self.connections
            .insert(connection, Connection::new(connection));

        let mut args = EventArguments::new();
        args.set_var("connection", &connection);
        self.events.publish("OnServerConnect", &args);
        for module in &mut self.modules {
            module.on_connected(connection);
        }
    }

    fn handle_disconnected(&mut self, connection: ConnectionId) {
        // Entities owned by this authority are deliberately left
        // alive; subscribers to this event decide their fate.
        if self.connections.remove(&connection).is_none() {
            return;
        }
        let mut args = EventArguments::new();
        args.set_var("connection", &connection);
        self.events.publish("OnServerDisconnect", &args);
        for module in &mut self.modules {
            module.on_disconnected(connection);
        }
    }

    fn handle_message(&mut self, from: ConnectionId, msg_type: MsgType, payload: &[u8]) {
        match msg_type {
            MsgType::RequestHandshake => self.handle_handshake(from, payload),
            MsgType::Ready => self.handle_ready(from),
            MsgType::NotReady => self.handle_not_ready(from),
            MsgType::SetUserMessage => self.handle_set_user_message(from, payload),
            MsgType::InvokeEvent => self.handle_invoke_event(from, payload),
            other => {
                warn!("unexpected {other:?} message from connection {from}, ignoring");
            }
        }
    }

    fn handle_handshake(&mut self, from: ConnectionId, payload: &[u8]) {
        let request = match RequestHandshake::from_bytes(payload) {
            Ok(request) => request,
            Err(e) => {
                warn!("malformed handshake from connection {from}: {e}");
                return;
            }
        };
        if !self.connections.contains_key(&from) {
            return;
        }

        let response = self.modules.iter_mut().fold(
            HandshakeResponse::default(),
            |previous, module| {
                module.on_respond_handshake(previous, &request.id_token, &request.secret)
            },
        );

        let wire = RespondHandshake::from_response(&request.id_token, &response);
        match wire.to_bytes() {
            Ok(bytes) => self.transport.send_to(
                from,
                Channel::for_msg_type(MsgType::RespondHandshake),
                MsgType::RespondHandshake,
                &bytes,
            ),
            Err(e) => warn!("handshake response for connection {from} not sent: {e}"),
        }

        let mut args = EventArguments::new();
        args.set_var("connection", &from);

        if response.allowed {
            if let Some(connection) = self.connections.get_mut(&from) {
                connection.id_token = request.id_token;
                connection.authenticated = true;
                connection.authentication_token = response.authentication_token;
            }

            info!("connection {from} authenticated");
            self.events.publish("OnServerAuthenticationSuccess", &args);
            for module in &mut self.modules {
                module.on_handshake_ok(from);
            }
        } else {
            info!("connection {from} rejected: {}", response.error);
            self.events.publish("OnServerAuthenticationError", &args);
            for module in &mut self.modules {
                module.on_handshake_err(from);
            }
            self.transport.disconnect(from);
        }
    }

    fn handle_ready(&mut self, from: ConnectionId) {
        let Some(connection) = self.connections.get_mut(&from) else {
            return;
        };
        if connection.ready || !connection.authenticated || !connection.local_readiness {
            return;
        }
        connection.ready = true;

        let mut args = EventArguments::new();
        args.set_var("connection", &from);
        self.events.publish("OnServerReady", &args);
        for module in &mut self.modules {
            module.on_ready(from);
        }
    }

    fn handle_not_ready(&mut self, from: ConnectionId) {
        let Some(connection) = self.connections.get_mut(&from) else {
            return;
        };
        if !connection.ready || !connection.authenticated || !connection.local_readiness {
            return;
        }
        connection.ready = false;

        let mut args = EventArguments::new();
        args.set_var("connection", &from);
        self.events.publish("OnServerNotReady", &args);
        for module in &mut self.modules {
            module.on_not_ready(from);
        }
    }

    fn handle_set_user_message(&mut self, from: ConnectionId, payload: &[u8]) {
        let authenticated = self
            .connections
            .get(&from)
            .is_some_and(|c| c.authenticated);
        if !authenticated {
            debug!("user message from unauthenticated connection {from} dropped");
            return;
        }
        let msg = match SetUserMessage::from_bytes(payload) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("malformed user message from connection {from}: {e}");
                return;
            }
        };
        let Some(entity) = self.registry.get_mut(msg.id) else {
            debug!("user message for unknown entity {} dropped", msg.id);
            return;
        };
        // Unauthorized writes are dropped without a reply: the write
        // may simply be late relative to an authority change.
        if entity.authority() != Some(from) {
            let err = EntityError::Unauthorized {
                id: msg.id,
                connection: from,
            };
            debug!("user message `{}` dropped: {err}", msg.name);
            return;
        }
        entity.user_messages.apply_remote(&msg.name, msg.value);
        entity.with_behavior(|behavior, entity| {
            behavior.on_set_user_message(entity, &msg.name)
        });
    }

    fn handle_invoke_event(&mut self, from: ConnectionId, payload: &[u8]) {
        let msg = match InvokeEvent::from_bytes(payload) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("malformed event invocation from connection {from}: {e}");
                return;
            }
        };
        let mut args = EventArguments::from_raw(msg.args);
        args.set_var("connection", &from);
        self.events.publish_remote(&msg.name, &args);
    }

    // Connection management

    /// Forcibly disconnects a client.
    pub fn kick(&mut self, connection: ConnectionId) {
        self.transport.disconnect(connection);
    }

    /// Allows or forbids a client from setting itself ready.
    pub fn set_local_readiness(&mut self, connection: ConnectionId, allowed: bool) {
        if let Some(conn) = self.connections.get_mut(&connection) {
            conn.local_readiness = allowed;
        }
    }

    pub fn get_entity(&self, id: EntityId) -> Option<&Entity> {
        self.registry.get(id)
    }

    pub fn get_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.registry.get_mut(id)
    }
}
