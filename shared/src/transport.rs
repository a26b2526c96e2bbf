//! The transport seam. The replication core never manages sockets:
//! it hands channel-qualified typed payloads to a transport
//! collaborator and drains inbound events from it, synchronously, on
//! the thread that drives the tick loop.

use crate::{
    channel::Channel,
    messages::MsgType,
    types::{ConnectionId, RemoteTimestamp},
};

/// Inbound happenings on the server side of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    Connected(ConnectionId),
    Disconnected(ConnectionId),
    Message {
        from: ConnectionId,
        msg_type: MsgType,
        payload: Vec<u8>,
    },
}

/// Server side of the transport collaborator. Delivery must be
/// ordered per channel for reliable-ordered channels; unreliable
/// channels may drop or reorder.
pub trait ServerTransport {
    fn is_listening(&self) -> bool;

    fn send_to(
        &mut self,
        connection: ConnectionId,
        channel: Channel,
        msg_type: MsgType,
        payload: &[u8],
    );

    /// Drains everything that arrived since the last call.
    fn receive(&mut self) -> Vec<ServerEvent>;

    /// Forcibly closes a connection (e.g. a failed handshake).
    fn disconnect(&mut self, connection: ConnectionId);

    /// Current value of this host's network clock, in milliseconds.
    fn network_timestamp(&self) -> RemoteTimestamp;
}

/// Inbound happenings on the client side of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Connected,
    Disconnected,
    Message { msg_type: MsgType, payload: Vec<u8> },
}

/// Client side of the transport collaborator.
pub trait ClientTransport {
    fn is_connected(&self) -> bool;

    fn send(&mut self, channel: Channel, msg_type: MsgType, payload: &[u8]);

    /// Drains everything that arrived since the last call.
    fn receive(&mut self) -> Vec<ClientEvent>;

    /// Estimated one-way delay, in milliseconds, of a sample stamped
    /// with the server clock value `timestamp`. Derived from the
    /// transport's round-trip estimator.
    fn remote_delay_ms(&self, timestamp: RemoteTimestamp) -> i32;
}
