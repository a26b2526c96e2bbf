use log::{debug, error, info, warn};

use entsync_shared::{
    Channel, ClientEvent, ClientTransport, DestroyEntity, EntityError, EntityId, EventArguments,
    EventBus, HandshakeRequest, InvokeEvent, MsgType, Pose, Quat, RequestHandshake,
    RespondHandshake, Serde, SetNetworkedVariable, SetParent, SetPosition, SetRotation,
    SetUserMessage, SpawnEntity, UpdatePositionAndRotation, Vec3,
};

use crate::{
    client_config::ClientConfig,
    entity::Entity,
    module::Module,
    registry::{EntityKey, EntityRegistry},
    snapshot::Snapshot,
};

/// The observing replication endpoint.
///
/// Mirrors server entities, interpolates their motion for rendering
/// and flushes User Message writes back upstream. All inbound traffic
/// is dispatched synchronously from [`tick`](Self::tick).
pub struct Client<T: ClientTransport> {
    config: ClientConfig,
    transport: T,
    registry: EntityRegistry,
    events: EventBus,
    modules: Vec<Box<dyn Module>>,
    id_token: String,
    authentication_token: String,
    authenticated: bool,
    ready: bool,
}

impl<T: ClientTransport> Client<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        let registry = EntityRegistry::new(config.snapshot_capacity);
        Self {
            config,
            transport,
            registry,
            events: EventBus::new(),
            modules: Vec::new(),
            id_token: String::new(),
            authentication_token: String::new(),
            authenticated: false,
            ready: false,
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

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// The session token handed back by a successful handshake.
    pub fn authentication_token(&self) -> &str {
        &self.authentication_token
    }

    /// Appends a module to the credential/lifecycle chain.
    pub fn use_module(&mut self, mut module: Box<dyn Module>) {
        module.on_use();
        self.modules.push(module);
    }

    /// Tears the process down: destroys all mirrored entities and
    /// releases the module chain and event subscriptions.
    pub fn shutdown(&mut self) {
        self.registry.destroy_all();
        for module in &mut self.modules {
            module.on_stop_using();
        }
        self.modules.clear();
        self.events.unsubscribe_all();
    }

    pub fn register_template(
        &mut self,
        name: &str,
        spawner: impl Fn() -> Box<dyn crate::Behavior> + 'static,
    ) {
        self.registry.register_template(name, spawner);
    }

    // Readiness

    /// Tells the server this client is ready to receive entity
    /// traffic. No effect until authenticated.
    pub fn request_ready(&mut self) {
        if !self.authenticated || self.ready || !self.transport.is_connected() {
            return;
        }
        self.transport.send(
            Channel::for_msg_type(MsgType::Ready),
            MsgType::Ready,
            &[],
        );
        self.ready = true;

        self.events.publish("OnClientReady", &EventArguments::new());
        for module in &mut self.modules {
            module.on_ready();
        }
    }

    /// Tells the server to stop sending entity traffic, e.g. while
    /// changing scenes. No effect until authenticated.
    pub fn set_not_ready(&mut self) {
        if !self.authenticated || !self.ready || !self.transport.is_connected() {
            return;
        }
        self.transport.send(
            Channel::for_msg_type(MsgType::NotReady),
            MsgType::NotReady,
            &[],
        );
        self.ready = false;

        self.events
            .publish("OnClientNotReady", &EventArguments::new());
        for module in &mut self.modules {
            module.on_not_ready();
        }
    }

    // Local entities

    /// Spawns a purely local entity with no network id. It never
    /// produces or receives replication traffic.
    pub fn spawn_local(
        &mut self,
        name: &str,
        position: Vec3,
        rotation: Quat,
    ) -> Result<EntityKey, EntityError> {
        let key = self.registry.spawn(None, name, false, position, rotation)?;
        if let Some(entity) = self.registry.get_mut(key) {
            entity.set_net_update_interval(self.config.net_update_interval);
        }
        self.registry.finish_spawn(key);
        self.events
            .publish("OnEntitySpawned", &EventArguments::new());
        Ok(key)
    }

    pub fn destroy_local(&mut self, key: EntityKey) {
        if self.registry.destroy(key) {
            self.events
                .publish("OnEntityDestroyed", &EventArguments::new());
        }
    }

    /// Sets a User Message on a mirrored entity; it reaches the server
    /// on the entity's next outbound tick. The server drops writes
    /// from connections without authority over the entity.
    pub fn set_user_message<V: Serde>(
        &mut self,
        id: EntityId,
        name: &str,
        value: &V,
    ) -> Result<(), EntityError> {
        let entity = self
            .registry
            .get_by_net_id_mut(id)
            .ok_or(EntityError::EntityNotFound { id })?;
        entity.set_user_message(name, value).inspect_err(|e| {
            warn!("user message not set on entity {id}: {e}");
        })
    }

    // Events

    /// Publishes an event locally, and optionally on the server as
    /// well.
    pub fn invoke_event(&mut self, name: &str, args: &EventArguments, invoke_on_server: bool) {
        self.events.publish(name, args);
        if invoke_on_server && self.transport.is_connected() {
            let msg = InvokeEvent {
                name: name.to_string(),
                args: args.raw().clone(),
            };
            match msg.to_bytes() {
                Ok(payload) => self.transport.send(
                    Channel::for_msg_type(MsgType::InvokeEvent),
                    MsgType::InvokeEvent,
                    &payload,
                ),
                Err(e) => warn!("event `{name}` not sent: {e}"),
            }
        }
    }

    // The tick loop

    /// Runs one fixed-step tick: drains inbound traffic, then flushes
    /// every entity whose outbound interval elapsed.
    pub fn tick(&mut self, dt: f32) {
        self.process_inbound();

        let connected = self.transport.is_connected();
        for key in self.registry.keys() {
            let mut payloads: Vec<Vec<u8>> = Vec::new();
            {
                let Some(entity) = self.registry.get_mut(key) else {
                    continue;
                };
                entity.net_update_time += dt;
                if entity.net_update_time <= entity.net_update_interval() {
                    continue;
                }
                entity.with_behavior(|behavior, entity| behavior.on_net_update(entity));

                if entity.dirty && connected {
                    match entity.id() {
                        Some(id) => {
                            for (name, value) in entity.user_messages.drain_dirty() {
                                let msg = SetUserMessage { id, name, value };
                                match msg.to_bytes() {
                                    Ok(payload) => payloads.push(payload),
                                    Err(e) => {
                                        warn!("user message for entity {id} dropped: {e}")
                                    }
                                }
                            }
                            entity.dirty = false;
                        }
                        None => {
                            // Bits stay set: the write is not lost if
                            // the entity later becomes networked
                            error!(
                                "entity `{}` has unflushed user messages but no network id",
                                entity.name()
                            );
                        }
                    }
                }

                entity.net_update_time = 0.0;
            }

            for payload in payloads {
                self.transport.send(
                    Channel::for_msg_type(MsgType::SetUserMessage),
                    MsgType::SetUserMessage,
                    &payload,
                );
            }
        }
    }

    /// Runs one render-rate frame: every entity with buffered pose
    /// snapshots is moved to its interpolated render pose, a fixed
    /// number of frame intervals behind the newest known state.
    pub fn frame(&mut self, dt: f32) {
        let render_delay = self.config.render_delay_multiplier * dt;
        let transport = &self.transport;
        for entity in self.registry.iter_mut() {
            if entity.snapshots.is_empty() {
                continue;
            }
            let current = Pose::new(entity.position, entity.rotation);
            let sampled = entity.snapshots.sample(render_delay, current, |timestamp| {
                transport.remote_delay_ms(timestamp) as f32 / 1000.0
            });
            if let Some(pose) = sampled {
                entity.position = pose.position;
                entity.rotation = pose.rotation;
            }
        }
    }

    // Inbound dispatch

    fn process_inbound(&mut self) {
        for event in self.transport.receive() {
            match event {
                ClientEvent::Connected => self.handle_connected(),
                ClientEvent::Disconnected => self.handle_disconnected(),
                ClientEvent::Message { msg_type, payload } => {
                    self.handle_message(msg_type, &payload)
                }
            }
        }
    }

    fn handle_connected(&mut self) {
        self.events.publish("OnClientConnect", &EventArguments::new());
        for module in &mut self.modules {
            module.on_connected();
        }

        let request = self
            .modules
            .iter_mut()
            .fold(HandshakeRequest::default(), |acc, module| {
                module.on_send_handshake(acc)
            });
        self.id_token = request.id_token.clone();

        let wire = RequestHandshake::from_request(&request);
        match wire.to_bytes() {
            Ok(payload) => self.transport.send(
                Channel::for_msg_type(MsgType::RequestHandshake),
                MsgType::RequestHandshake,
                &payload,
            ),
            Err(e) => error!("handshake request not sent: {e}"),
        }
    }

    fn handle_disconnected(&mut self) {
        self.authenticated = false;
        self.ready = false;
        self.events
            .publish("OnClientDisconnect", &EventArguments::new());
        for module in &mut self.modules {
            module.on_disconnected();
        }
    }

    fn handle_message(&mut self, msg_type: MsgType, payload: &[u8]) {
        match msg_type {
            MsgType::RespondHandshake => self.handle_handshake_response(payload),
            MsgType::Ready => self.handle_ready(),
            MsgType::NotReady => self.handle_not_ready(),
            MsgType::SpawnEntity => self.handle_spawn(payload),
            MsgType::DestroyEntity => self.handle_destroy(payload),
            MsgType::UpdatePositionAndRotation => self.handle_update_pose(payload),
            MsgType::SetPosition => self.handle_set_position(payload),
            MsgType::SetRotation => self.handle_set_rotation(payload),
            MsgType::SetParent => self.handle_set_parent(payload),
            MsgType::SetNetworkedVariable => self.handle_set_networked_var(payload),
            MsgType::InvokeEvent => self.handle_invoke_event(payload),
            other => {
                warn!("unexpected {other:?} message from server, ignoring");
            }
        }
    }

    fn handle_handshake_response(&mut self, payload: &[u8]) {
        let response = match RespondHandshake::from_bytes(payload) {
            Ok(response) => response,
            Err(e) => {
                warn!("malformed handshake response: {e}");
                return;
            }
        };
        if response.allowed {
            self.authenticated = true;
            self.authentication_token = response.authentication_token;

            info!("authenticated as `{}`", self.id_token);
            self.events
                .publish("OnClientAuthenticationSuccess", &EventArguments::new());
            for module in &mut self.modules {
                module.on_handshake_ok();
            }
        } else {
            info!("authentication rejected: {}", response.error);
            let mut args = EventArguments::new();
            args.set_var("error", &response.error);
            self.events.publish("OnClientAuthenticationError", &args);
            for module in &mut self.modules {
                module.on_handshake_err(&response.error);
            }
        }
    }

    // The server may flip readiness itself, e.g. during a map change.

    fn handle_ready(&mut self) {
        if self.ready {
            return;
        }
        self.ready = true;
        self.events.publish("OnClientReady", &EventArguments::new());
        for module in &mut self.modules {
            module.on_ready();
        }
    }

    fn handle_not_ready(&mut self) {
        if !self.ready {
            return;
        }
        self.ready = false;
        self.events
            .publish("OnClientNotReady", &EventArguments::new());
        for module in &mut self.modules {
            module.on_not_ready();
        }
    }

    fn handle_spawn(&mut self, payload: &[u8]) {
        let msg = match SpawnEntity::from_bytes(payload) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("malformed spawn message: {e}");
                return;
            }
        };
        let spawned = self.registry.spawn(
            Some(msg.id),
            &msg.name,
            msg.has_authority,
            msg.position,
            msg.rotation,
        );
        let key = match spawned {
            Ok(key) => key,
            // Registry logged it; the existing entity wins
            Err(_) => return,
        };
        if let Some(entity) = self.registry.get_mut(key) {
            entity.set_net_update_interval(self.config.net_update_interval);
        }
        self.registry.finish_spawn(key);

        let mut args = EventArguments::new();
        args.set_var("entity", &msg.id);
        self.events.publish("OnEntitySpawned", &args);
    }

    fn handle_destroy(&mut self, payload: &[u8]) {
        let msg = match DestroyEntity::from_bytes(payload) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("malformed destroy message: {e}");
                return;
            }
        };
        if self.registry.destroy_by_net_id(msg.id).is_err() {
            debug!("destroy for unknown entity {} ignored", msg.id);
            return;
        }
        let mut args = EventArguments::new();
        args.set_var("entity", &msg.id);
        self.events.publish("OnEntityDestroyed", &args);
    }

    fn handle_update_pose(&mut self, payload: &[u8]) {
        let msg = match UpdatePositionAndRotation::from_bytes(payload) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("malformed pose update: {e}");
                return;
            }
        };
        let Some(entity) = self.registry.get_by_net_id_mut(msg.id) else {
            debug!("pose update for unknown entity {} ignored", msg.id);
            return;
        };
        entity.snapshots.insert(Snapshot {
            timestamp: msg.timestamp,
            pose: Pose::new(msg.position, msg.rotation),
        });
    }

    fn handle_set_position(&mut self, payload: &[u8]) {
        let msg = match SetPosition::from_bytes(payload) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("malformed position set: {e}");
                return;
            }
        };
        let Some(entity) = self.registry.get_by_net_id_mut(msg.id) else {
            debug!("position set for unknown entity {} ignored", msg.id);
            return;
        };
        let old = entity.position;
        entity.position = msg.position;
        entity.with_behavior(|behavior, entity| behavior.on_set_pos(entity, old, msg.position));
    }

    fn handle_set_rotation(&mut self, payload: &[u8]) {
        let msg = match SetRotation::from_bytes(payload) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("malformed rotation set: {e}");
                return;
            }
        };
        let Some(entity) = self.registry.get_by_net_id_mut(msg.id) else {
            debug!("rotation set for unknown entity {} ignored", msg.id);
            return;
        };
        let old = entity.rotation;
        entity.rotation = msg.rotation;
        entity.with_behavior(|behavior, entity| behavior.on_set_rot(entity, old, msg.rotation));
    }

    fn handle_set_parent(&mut self, payload: &[u8]) {
        let msg = match SetParent::from_bytes(payload) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("malformed parent set: {e}");
                return;
            }
        };
        let Some(entity) = self.registry.get_by_net_id_mut(msg.id) else {
            debug!("parent set for unknown entity {} ignored", msg.id);
            return;
        };
        entity.parent = Some(msg.parent_id);
        entity.with_behavior(|behavior, entity| behavior.on_set_parent(entity));
    }

    fn handle_set_networked_var(&mut self, payload: &[u8]) {
        let msg = match SetNetworkedVariable::from_bytes(payload) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("malformed variable delta: {e}");
                return;
            }
        };
        let Some(entity) = self.registry.get_by_net_id_mut(msg.id) else {
            debug!("variable delta for unknown entity {} ignored", msg.id);
            return;
        };
        entity.net_data.apply_remote(&msg.name, msg.value);
        entity.with_behavior(|behavior, entity| {
            behavior.on_set_networked_var(entity, &msg.name)
        });
    }

    fn handle_invoke_event(&mut self, payload: &[u8]) {
        let msg = match InvokeEvent::from_bytes(payload) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("malformed event invocation: {e}");
                return;
            }
        };
        let args = EventArguments::from_raw(msg.args);
        self.events.publish_remote(&msg.name, &args);
    }

    pub fn get_entity(&self, key: EntityKey) -> Option<&Entity> {
        self.registry.get(key)
    }

    pub fn get_entity_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.registry.get_mut(key)
    }
}
