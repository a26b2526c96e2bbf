/// Credentials a client presents when opening a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandshakeRequest {
    /// The client authentication token.
    pub id_token: String,
    /// The client authentication secret.
    pub secret: Vec<u8>,
}

/// Accumulator folded through the server's module chain to decide
/// whether a connection may join. The default response allows the
/// connection; any module may flip `allowed` or attach a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeResponse {
    /// The server authentication token handed back to the client.
    pub authentication_token: String,
    /// Whether the client was successfully authenticated.
    pub allowed: bool,
    /// Populated only when the attempt was rejected.
    pub error: String,
}

impl Default for HandshakeResponse {
    fn default() -> Self {
        Self {
            authentication_token: String::new(),
            allowed: true,
            error: String::new(),
        }
    }
}
