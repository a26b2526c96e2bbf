use std::default::Default;

use entsync_shared::DEFAULT_NET_UPDATE_INTERVAL;

/// Contains Config properties which will be used by the Client
#[derive(Clone)]
pub struct ClientConfig {
    /// Default seconds between outbound flushes for newly mirrored
    /// entities. Individual entities may override their own interval.
    pub net_update_interval: f32,
    /// The render delay is this many frame intervals behind the
    /// newest snapshot, trading latency for interpolation headroom.
    pub render_delay_multiplier: f32,
    /// Pose snapshots retained per entity; the oldest is evicted once
    /// the buffer is full.
    pub snapshot_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            net_update_interval: DEFAULT_NET_UPDATE_INTERVAL,
            render_delay_multiplier: 10.0,
            snapshot_capacity: 20,
        }
    }
}
