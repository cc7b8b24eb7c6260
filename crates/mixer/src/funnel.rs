//! Packet funnel: N input queues, one time-ordered output.
//!
//! The simpler sibling of the mixer: instead of blending, it forwards one
//! buffered packet per call, always the one with the earliest timestamp
//! across all queues, and routes control events back to a specific queue by
//! stream key. Useful for multiplexing already-packetized streams that
//! share a downstream path.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

/// Identifier of one funnel input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamKey(pub u32);

impl std::fmt::Display for StreamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stream_{}", self.0)
    }
}

/// A timestamped packet buffered in the funnel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub stream: StreamKey,
    pub pts_ns: u64,
    pub payload: Vec<u8>,
}

/// A control event addressed to one input stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlEvent {
    pub payload: Vec<u8>,
}

#[derive(Debug, Default)]
struct StreamQueue {
    packets: VecDeque<Packet>,
    controls: Vec<ControlEvent>,
}

/// Earliest-timestamp packet selector over per-stream queues.
#[derive(Debug, Default)]
pub struct PacketFunnel {
    /// Queues in registration order.
    order: Vec<StreamKey>,
    queues: HashMap<StreamKey, StreamQueue>,
}

impl PacketFunnel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an input stream. Idempotent.
    pub fn register(&mut self, key: StreamKey) {
        if !self.queues.contains_key(&key) {
            self.order.push(key);
            self.queues.insert(key, StreamQueue::default());
        }
    }

    /// Remove an input stream, dropping anything still queued for it.
    pub fn release(&mut self, key: StreamKey) {
        self.order.retain(|k| *k != key);
        self.queues.remove(&key);
    }

    /// Buffer a packet on its stream's queue, registering the stream if
    /// this is the first time it is seen.
    pub fn push(&mut self, packet: Packet) {
        self.register(packet.stream);
        if let Some(queue) = self.queues.get_mut(&packet.stream) {
            queue.packets.push_back(packet);
        }
    }

    /// Forward the single buffered packet with the earliest timestamp,
    /// if any queue holds one.
    ///
    /// Equal timestamps: selection order is unspecified.
    pub fn select(&mut self) -> Option<Packet> {
        let mut earliest: Option<StreamKey> = None;
        let mut earliest_pts = u64::MAX;

        for key in &self.order {
            let Some(front) = self.queues.get(key).and_then(|q| q.packets.front()) else {
                continue;
            };
            if earliest.is_none() || front.pts_ns < earliest_pts {
                earliest = Some(*key);
                earliest_pts = front.pts_ns;
            }
        }

        let key = earliest?;
        self.queues.get_mut(&key)?.packets.pop_front()
    }

    /// Route a control event to the queue for `key`.
    ///
    /// Returns false (and drops the event) when no such stream is
    /// registered.
    pub fn route_control(&mut self, key: StreamKey, event: ControlEvent) -> bool {
        match self.queues.get_mut(&key) {
            Some(queue) => {
                queue.controls.push(event);
                true
            }
            None => {
                debug!(%key, "dropping control event for unknown stream");
                false
            }
        }
    }

    /// Drain the control events routed to `key` so its owner can act on
    /// them.
    pub fn take_controls(&mut self, key: StreamKey) -> Vec<ControlEvent> {
        self.queues
            .get_mut(&key)
            .map(|q| std::mem::take(&mut q.controls))
            .unwrap_or_default()
    }

    /// Total packets buffered across all queues.
    pub fn buffered(&self) -> usize {
        self.queues.values().map(|q| q.packets.len()).sum()
    }
}
