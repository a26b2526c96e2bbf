use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use entsync_shared::{
    Channel, ClientEvent, ClientTransport, ConnectionId, MsgType, RemoteTimestamp, ServerEvent,
    ServerTransport,
};

/// Everything in flight between one server and its clients, plus a
/// scriptable shared network clock.
struct Hub {
    listening: bool,
    time: RemoteTimestamp,
    next_connection_id: ConnectionId,
    connected: HashSet<ConnectionId>,
    server_inbound: Vec<ServerEvent>,
    client_inbound: HashMap<ConnectionId, Vec<ClientEvent>>,
    server_sent: Vec<(ConnectionId, MsgType, Vec<u8>)>,
}

/// Shared handle to an in-process loopback network. Clone freely; all
/// handles observe the same hub.
#[derive(Clone)]
pub struct HubHandle {
    inner: Rc<RefCell<Hub>>,
}

impl HubHandle {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Hub {
                listening: true,
                time: 0,
                next_connection_id: 0,
                connected: HashSet::new(),
                server_inbound: Vec::new(),
                client_inbound: HashMap::new(),
                server_sent: Vec::new(),
            })),
        }
    }

    pub fn server_transport(&self) -> LoopbackServer {
        LoopbackServer { hub: self.clone() }
    }

    /// Opens a new client connection: the server observes a Connected
    /// event, the returned client transport observes one too.
    pub fn connect_client(&self) -> LoopbackClient {
        let mut hub = self.inner.borrow_mut();
        let id = hub.next_connection_id;
        hub.next_connection_id += 1;
        hub.connected.insert(id);
        hub.server_inbound.push(ServerEvent::Connected(id));
        hub.client_inbound.insert(id, vec![ClientEvent::Connected]);
        LoopbackClient {
            hub: self.clone(),
            id,
        }
    }

    pub fn set_listening(&self, listening: bool) {
        self.inner.borrow_mut().listening = listening;
    }

    pub fn set_time(&self, time: RemoteTimestamp) {
        self.inner.borrow_mut().time = time;
    }

    pub fn advance_time(&self, ms: RemoteTimestamp) {
        self.inner.borrow_mut().time += ms;
    }

    pub fn is_connected(&self, connection: ConnectionId) -> bool {
        self.inner.borrow().connected.contains(&connection)
    }

    /// Everything the server has sent so far, in send order.
    pub fn server_sent(&self) -> Vec<(ConnectionId, MsgType, Vec<u8>)> {
        self.inner.borrow().server_sent.clone()
    }

    pub fn clear_server_sent(&self) {
        self.inner.borrow_mut().server_sent.clear();
    }
}

impl Default for HubHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Server side of the loopback network.
pub struct LoopbackServer {
    hub: HubHandle,
}

impl ServerTransport for LoopbackServer {
    fn is_listening(&self) -> bool {
        self.hub.inner.borrow().listening
    }

    fn send_to(
        &mut self,
        connection: ConnectionId,
        _channel: Channel,
        msg_type: MsgType,
        payload: &[u8],
    ) {
        let mut hub = self.hub.inner.borrow_mut();
        if !hub.connected.contains(&connection) {
            return;
        }
        hub.server_sent
            .push((connection, msg_type, payload.to_vec()));
        if let Some(queue) = hub.client_inbound.get_mut(&connection) {
            queue.push(ClientEvent::Message {
                msg_type,
                payload: payload.to_vec(),
            });
        }
    }

    fn receive(&mut self) -> Vec<ServerEvent> {
        std::mem::take(&mut self.hub.inner.borrow_mut().server_inbound)
    }

    fn disconnect(&mut self, connection: ConnectionId) {
        let mut hub = self.hub.inner.borrow_mut();
        if hub.connected.remove(&connection) {
            hub.server_inbound
                .push(ServerEvent::Disconnected(connection));
            if let Some(queue) = hub.client_inbound.get_mut(&connection) {
                queue.push(ClientEvent::Disconnected);
            }
        }
    }

    fn network_timestamp(&self) -> RemoteTimestamp {
        self.hub.inner.borrow().time
    }
}

/// One client's side of the loopback network.
pub struct LoopbackClient {
    hub: HubHandle,
    id: ConnectionId,
}

impl LoopbackClient {
    pub fn connection_id(&self) -> ConnectionId {
        self.id
    }
}

impl ClientTransport for LoopbackClient {
    fn is_connected(&self) -> bool {
        self.hub.inner.borrow().connected.contains(&self.id)
    }

    fn send(&mut self, _channel: Channel, msg_type: MsgType, payload: &[u8]) {
        let mut hub = self.hub.inner.borrow_mut();
        if !hub.connected.contains(&self.id) {
            return;
        }
        hub.server_inbound.push(ServerEvent::Message {
            from: self.id,
            msg_type,
            payload: payload.to_vec(),
        });
    }

    fn receive(&mut self) -> Vec<ClientEvent> {
        let mut hub = self.hub.inner.borrow_mut();
        hub.client_inbound
            .get_mut(&self.id)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    fn remote_delay_ms(&self, timestamp: RemoteTimestamp) -> i32 {
        self.hub.inner.borrow().time - timestamp
    }
}
