/// Networked entity identifier, allocated by the server.
pub type EntityId = u32;

/// Transport-level connection identifier.
pub type ConnectionId = u32;

/// Timestamp in the remote peer's clock units (milliseconds).
pub type RemoteTimestamp = i32;
