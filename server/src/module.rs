use entsync_shared::{ConnectionId, HandshakeResponse};

/// A server module: the pluggable way to hook into connection
/// lifecycle and authentication.
///
/// Modules form an ordered chain. During a handshake the chain is
/// folded left-to-right over a [`HandshakeResponse`] accumulator:
/// each module receives the previous module's response and returns
/// the next one. The final response decides whether the connection is
/// allowed.
pub trait Module {
    /// Called when the module is added to the chain.
    fn on_use(&mut self) {}

    /// Called when the server shuts the chain down.
    fn on_stop_using(&mut self) {}

    /// One folding step of the handshake chain. The default passes the
    /// accumulator through untouched.
    fn on_respond_handshake(
        &mut self,
        previous: HandshakeResponse,
        _id_token: &str,
        _secret: &[u8],
    ) -> HandshakeResponse {
        previous
    }

    fn on_handshake_ok(&mut self, _connection: ConnectionId) {}

    fn on_handshake_err(&mut self, _connection: ConnectionId) {}

    fn on_connected(&mut self, _connection: ConnectionId) {}

    fn on_disconnected(&mut self, _connection: ConnectionId) {}

    fn on_ready(&mut self, _connection: ConnectionId) {}

    fn on_not_ready(&mut self, _connection: ConnectionId) {}
}
