use std::default::Default;

use entsync_shared::DEFAULT_NET_UPDATE_INTERVAL;

/// Contains Config properties which will be used by the Server
#[derive(Clone)]
pub struct ServerConfig {
    /// Default seconds between replication flushes for newly spawned
    /// entities. Individual entities may override their own interval.
    pub net_update_interval: f32,
    /// Maximum simultaneous connections; one is required per client.
    /// Connections past the limit are refused at accept time.
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            net_update_interval: DEFAULT_NET_UPDATE_INTERVAL,
            max_connections: 64,
        }
    }
}
