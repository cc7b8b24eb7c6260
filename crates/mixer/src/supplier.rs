//! The frame-supplier seam.
//!
//! Buffer timestamp synchronization and frame-rate decisions live outside
//! the mixer; by the time a cycle runs, the supplier already knows which
//! frame (if any) each slot is due. The mixer only asks.

use std::collections::HashMap;
use std::collections::VecDeque;

use framemix_frame::FrameLease;

use crate::slot::SlotId;

/// Source of per-slot frames for mix cycles.
pub trait FrameSupplier {
    /// Hand over the frame due for this slot this cycle, if any.
    ///
    /// Called at most once per slot per cycle. Must not block past the
    /// supplier's own readiness horizon; an absent frame just means the
    /// slot sits this cycle out.
    fn try_take_current_frame(&mut self, slot: SlotId) -> Option<FrameLease>;
}

/// A simple per-slot FIFO supplier for drivers and tests.
///
/// Each queued frame is handed out exactly once, front first.
#[derive(Debug, Default)]
pub struct QueueSupplier {
    queues: HashMap<SlotId, VecDeque<FrameLease>>,
}

impl QueueSupplier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a frame for a slot.
    pub fn push(&mut self, slot: SlotId, lease: impl Into<FrameLease>) {
        self.queues.entry(slot).or_default().push_back(lease.into());
    }

    /// Frames still queued for a slot.
    pub fn pending(&self, slot: SlotId) -> usize {
        self.queues.get(&slot).map_or(0, VecDeque::len)
    }
}

impl FrameSupplier for QueueSupplier {
    fn try_take_current_frame(&mut self, slot: SlotId) -> Option<FrameLease> {
        self.queues.get_mut(&slot)?.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::SlotRegistry;
    use framemix_frame::{PixelFormat, VideoFrame};

    fn lease() -> FrameLease {
        VideoFrame::alloc(PixelFormat::Ayuv, 2, 2).unwrap().into()
    }

    #[test]
    fn test_fifo_order_per_slot() {
        let mut reg = SlotRegistry::new();
        let slot = reg.add_slot();

        let mut supplier = QueueSupplier::new();
        let first = VideoFrame::alloc(PixelFormat::Ayuv, 2, 2).unwrap();
        let second = VideoFrame::alloc(PixelFormat::Ayuv, 4, 4).unwrap();
        supplier.push(slot, first);
        supplier.push(slot, second);

        assert_eq!(supplier.pending(slot), 2);
        assert_eq!(supplier.try_take_current_frame(slot).unwrap().width(), 2);
        assert_eq!(supplier.try_take_current_frame(slot).unwrap().width(), 4);
        assert!(supplier.try_take_current_frame(slot).is_none());
    }

    #[test]
    fn test_unknown_slot_yields_nothing() {
        let mut reg = SlotRegistry::new();
        let slot = reg.add_slot();

        let mut supplier = QueueSupplier::new();
        supplier.push(slot, lease());

        let mut other_reg = SlotRegistry::new();
        other_reg.add_slot();
        let other = other_reg.add_slot();
        assert!(supplier.try_take_current_frame(other).is_none());
    }
}
