use entsync_shared::{inverse_lerp, Pose, RemoteTimestamp};

/// One received pose sample, stamped with the sender's network clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub timestamp: RemoteTimestamp,
    pub pose: Pose,
}

/// Bounded history of pose snapshots, newest first.
///
/// Samples arriving over an unreliable channel may be duplicated or
/// reordered, so each insert places the sample by rank rather than by
/// arrival. A sample stamped equal to an existing one lands behind it,
/// keeping the relative order of same-tick arrivals stable.
pub struct SnapshotBuffer {
    states: Vec<Snapshot>,
    capacity: usize,
}

impl SnapshotBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            states: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Ranks the sample into the buffer, evicting the oldest sample
    /// once the buffer is full.
    pub fn insert(&mut self, snapshot: Snapshot) {
        let at = self
            .states
            .iter()
            .position(|s| s.timestamp < snapshot.timestamp)
            .unwrap_or(self.states.len());
        self.states.insert(at, snapshot);
        self.states.truncate(self.capacity);
    }

    pub fn newest(&self) -> Option<&Snapshot> {
        self.states.first()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    /// Resolves the pose to render at `render_delay` seconds behind
    /// the newest known state.
    ///
    /// When a sample newer than the render point exists, the two
    /// samples bracketing the render point are interpolated (linear
    /// for position, spherical for rotation). When even the newest
    /// sample is older than the render point, the buffer has gone
    /// stale and the current pose is eased toward the newest sample
    /// instead, so a halted stream settles rather than extrapolates.
    ///
    /// `delay_seconds` maps a sample's remote timestamp to its
    /// estimated age in seconds.
    pub fn sample(
        &self,
        render_delay: f32,
        current: Pose,
        delay_seconds: impl Fn(RemoteTimestamp) -> f32,
    ) -> Option<Pose> {
        let newest = self.states.first()?;
        let newest_delay = delay_seconds(newest.timestamp);

        if newest_delay < render_delay {
            for i in 1..self.states.len() {
                let lhs = &self.states[i];
                let lhs_delay = delay_seconds(lhs.timestamp);
                if lhs_delay >= render_delay {
                    let rhs = &self.states[i - 1];
                    let rhs_delay = delay_seconds(rhs.timestamp);
                    let t = inverse_lerp(lhs_delay, rhs_delay, render_delay);
                    return Some(Pose {
                        position: lhs.pose.position.lerp(&rhs.pose.position, t),
                        rotation: lhs.pose.rotation.slerp(&rhs.pose.rotation, t),
                    });
                }
            }
            // Every buffered sample is newer than the render point
            self.states.last().map(|s| s.pose)
        } else {
            let t = render_delay.clamp(0.0, 1.0);
            Some(Pose {
                position: current.position.lerp(&newest.pose.position, t),
                rotation: current.rotation.slerp(&newest.pose.rotation, t),
            })
        }
    }
}
