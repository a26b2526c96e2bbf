use entsync_shared::HandshakeRequest;

/// A client module: the pluggable way to hook into connection
/// lifecycle and authentication.
///
/// Modules form an ordered chain. When the transport connects, the
/// chain is folded left-to-right over a [`HandshakeRequest`]
/// accumulator: each module receives the previous module's request and
/// returns the next one. The final request is what the server sees.
pub trait Module {
    /// Called when the module is added to the chain.
    fn on_use(&mut self) {}

    /// Called when the client shuts the chain down.
    fn on_stop_using(&mut self) {}

    /// One folding step of the credential chain. The default passes
    /// the accumulator through untouched.
    fn on_send_handshake(&mut self, previous: HandshakeRequest) -> HandshakeRequest {
        previous
    }

    /// Called once the server accepted this client's handshake.
    fn on_handshake_ok(&mut self) {}

    /// Called when the server rejected this client's handshake.
    fn on_handshake_err(&mut self, _error: &str) {}

    fn on_connected(&mut self) {}

    fn on_disconnected(&mut self) {}

    fn on_ready(&mut self) {}

    fn on_not_ready(&mut self) {}
}
