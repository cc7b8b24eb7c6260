//! Input slots and the slot registry.
//!
//! One slot per attached input stream. The registry owns all per-slot state
//! the mixer reads during a cycle: geometry, opacity, stacking order, and
//! the frame lease for the tick in flight. Structural mutation goes through
//! the registry so a cycle never observes a half-updated slot.

use framemix_common::{MixError, MixResult};
use framemix_frame::FrameLease;

/// Identifier of one input slot.
///
/// Assigned at connection time, monotonically increasing, never reused, so
/// ids stay unique among currently-active slots for the mixer's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u32);

impl SlotId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sink_{}", self.0)
    }
}

/// Per-stream state for one attached input.
#[derive(Debug)]
pub struct InputSlot {
    id: SlotId,
    /// Natural (unscaled) size of the bound stream; 0 = not yet known.
    width: u32,
    height: u32,
    /// Offset of the stream's top-left corner within the output canvas.
    /// May be negative or past the canvas edge; clipped at composite time.
    xpos: i32,
    ypos: i32,
    /// Opacity in [0.0, 1.0], clamped on write.
    alpha: f64,
    /// Paint order; lower renders first. Ties break by creation order.
    zorder: u32,
    /// The frame borrowed for the cycle in flight, if any.
    current: Option<FrameLease>,
}

impl InputSlot {
    fn new(id: SlotId) -> Self {
        Self {
            id,
            width: 0,
            height: 0,
            xpos: 0,
            ypos: 0,
            alpha: 1.0,
            zorder: 0,
            current: None,
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the stream's natural size has been seen yet.
    pub fn has_known_size(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn xpos(&self) -> i32 {
        self.xpos
    }

    pub fn ypos(&self) -> i32 {
        self.ypos
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn zorder(&self) -> u32 {
        self.zorder
    }

    pub fn current_frame(&self) -> Option<&FrameLease> {
        self.current.as_ref()
    }
}

/// The set of currently-attached input slots, in creation order.
#[derive(Debug, Default)]
pub struct SlotRegistry {
    slots: Vec<InputSlot>,
    next_id: u32,
    geometry_dirty: bool,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new slot with default properties.
    pub fn add_slot(&mut self) -> SlotId {
        let id = SlotId(self.next_id);
        self.next_id += 1;
        self.slots.push(InputSlot::new(id));
        self.geometry_dirty = true;
        id
    }

    /// Detach a slot, dropping any frame it borrowed.
    pub fn remove_slot(&mut self, id: SlotId) -> MixResult<()> {
        let idx = self.index_of(id)?;
        self.slots.remove(idx);
        self.geometry_dirty = true;
        Ok(())
    }

    pub fn set_position(&mut self, id: SlotId, xpos: i32, ypos: i32) -> MixResult<()> {
        let idx = self.index_of(id)?;
        let slot = &mut self.slots[idx];
        if (slot.xpos, slot.ypos) != (xpos, ypos) {
            slot.xpos = xpos;
            slot.ypos = ypos;
            self.geometry_dirty = true;
        }
        Ok(())
    }

    /// Set a slot's opacity, clamping to [0.0, 1.0].
    pub fn set_alpha(&mut self, id: SlotId, alpha: f64) -> MixResult<()> {
        self.slot_mut(id)?.alpha = alpha.clamp(0.0, 1.0);
        Ok(())
    }

    pub fn set_zorder(&mut self, id: SlotId, zorder: u32) -> MixResult<()> {
        self.slot_mut(id)?.zorder = zorder;
        Ok(())
    }

    /// Bind (or clear) the frame a slot contributes to the cycle in flight.
    ///
    /// A supplied frame also carries the stream's current natural size; a
    /// size change marks the output geometry stale.
    pub fn supply_frame(&mut self, id: SlotId, lease: Option<FrameLease>) -> MixResult<()> {
        let idx = self.index_of(id)?;
        let slot = &mut self.slots[idx];
        if let Some(ref lease) = lease {
            if (slot.width, slot.height) != (lease.width(), lease.height()) {
                slot.width = lease.width();
                slot.height = lease.height();
                self.geometry_dirty = true;
            }
        }
        slot.current = lease;
        Ok(())
    }

    /// Drop every borrowed frame. Runs at the end of each cycle on all exit
    /// paths, so no slot caches pixel data beyond one cycle.
    pub fn release_frames(&mut self) {
        for slot in &mut self.slots {
            slot.current = None;
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn ids(&self) -> Vec<SlotId> {
        self.slots.iter().map(|s| s.id).collect()
    }

    pub fn slot(&self, id: SlotId) -> MixResult<&InputSlot> {
        self.slots
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| MixError::unknown_slot(id.raw()))
    }

    /// Slots in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &InputSlot> {
        self.slots.iter()
    }

    /// Slots in paint order: ascending zorder, creation order on ties
    /// (stable sort keeps the registry's insertion order).
    pub fn paint_order(&self) -> Vec<&InputSlot> {
        let mut ordered: Vec<&InputSlot> = self.slots.iter().collect();
        ordered.sort_by_key(|s| s.zorder);
        ordered
    }

    /// Consume the staleness flag set by structural mutation.
    pub fn take_geometry_dirty(&mut self) -> bool {
        std::mem::take(&mut self.geometry_dirty)
    }

    fn index_of(&self, id: SlotId) -> MixResult<usize> {
        self.slots
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| MixError::unknown_slot(id.raw()))
    }

    fn slot_mut(&mut self, id: SlotId) -> MixResult<&mut InputSlot> {
        let idx = self.index_of(id)?;
        Ok(&mut self.slots[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framemix_frame::{PixelFormat, VideoFrame};

    fn lease(w: u32, h: u32) -> FrameLease {
        VideoFrame::alloc(PixelFormat::Ayuv, w, h).unwrap().into()
    }

    #[test]
    fn test_ids_are_unique_and_never_reused() {
        let mut reg = SlotRegistry::new();
        let a = reg.add_slot();
        let b = reg.add_slot();
        assert_ne!(a, b);

        reg.remove_slot(a).unwrap();
        let c = reg.add_slot();
        assert_ne!(c, a);
        assert_ne!(c, b);
    }

    #[test]
    fn test_alpha_clamped_on_write() {
        let mut reg = SlotRegistry::new();
        let id = reg.add_slot();

        reg.set_alpha(id, 1.7).unwrap();
        assert_eq!(reg.slot(id).unwrap().alpha(), 1.0);

        reg.set_alpha(id, -0.3).unwrap();
        assert_eq!(reg.slot(id).unwrap().alpha(), 0.0);
    }

    #[test]
    fn test_unknown_slot_is_distinct_error() {
        let mut reg = SlotRegistry::new();
        let id = reg.add_slot();
        reg.remove_slot(id).unwrap();

        assert!(matches!(
            reg.set_zorder(id, 3),
            Err(MixError::UnknownSlot { .. })
        ));
    }

    #[test]
    fn test_paint_order_ties_keep_creation_order() {
        let mut reg = SlotRegistry::new();
        let a = reg.add_slot();
        let b = reg.add_slot();
        let c = reg.add_slot();

        reg.set_zorder(a, 5).unwrap();
        reg.set_zorder(b, 1).unwrap();
        reg.set_zorder(c, 5).unwrap();

        let order: Vec<SlotId> = reg.paint_order().iter().map(|s| s.id()).collect();
        assert_eq!(order, vec![b, a, c]);
    }

    #[test]
    fn test_supply_frame_updates_natural_size() {
        let mut reg = SlotRegistry::new();
        let id = reg.add_slot();
        reg.take_geometry_dirty();

        reg.supply_frame(id, Some(lease(320, 240))).unwrap();
        assert!(reg.take_geometry_dirty());
        let slot = reg.slot(id).unwrap();
        assert_eq!((slot.width(), slot.height()), (320, 240));

        // Same size again: no staleness
        reg.supply_frame(id, Some(lease(320, 240))).unwrap();
        assert!(!reg.take_geometry_dirty());
    }

    #[test]
    fn test_release_frames_clears_all_leases() {
        let mut reg = SlotRegistry::new();
        let a = reg.add_slot();
        let b = reg.add_slot();
        reg.supply_frame(a, Some(lease(8, 8))).unwrap();
        reg.supply_frame(b, Some(lease(4, 4))).unwrap();

        reg.release_frames();
        assert!(reg.slot(a).unwrap().current_frame().is_none());
        assert!(reg.slot(b).unwrap().current_frame().is_none());
    }

    #[test]
    fn test_position_change_marks_geometry_stale() {
        let mut reg = SlotRegistry::new();
        let id = reg.add_slot();
        reg.take_geometry_dirty();

        reg.set_position(id, 10, -5).unwrap();
        assert!(reg.take_geometry_dirty());

        // No-op write: not stale
        reg.set_position(id, 10, -5).unwrap();
        assert!(!reg.take_geometry_dirty());
    }
}
