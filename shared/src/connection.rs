use crate::types::ConnectionId;

/// Per-peer connection record tracked on the server.
///
/// A connection becomes a "ready observer" (and starts receiving
/// entity traffic) only after it has authenticated and asked for
/// readiness while locally permitted to do so.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    /// The client authentication token presented at handshake.
    pub id_token: String,
    /// The server authentication token issued by the module chain.
    pub authentication_token: String,
    /// Whether the handshake exchange completed with an allowed result.
    pub authenticated: bool,
    /// Whether the connection has requested entity/scene traffic.
    pub ready: bool,
    /// Whether the server currently permits this client to become ready.
    pub local_readiness: bool,
}

impl Connection {
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            id_token: String::new(),
            authentication_token: String::new(),
            authenticated: false,
            ready: false,
            local_readiness: true,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.authenticated && self.ready
    }
}
