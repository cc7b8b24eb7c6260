//! Output canvas geometry negotiation.
//!
//! The canvas is the smallest rectangle anchored at (0,0) that contains
//! every slot's bounding box. Only positive offsets grow the canvas; a
//! negative offset means the slot hangs off the top/left edge and gets
//! clipped at composite time instead.

use crate::slot::InputSlot;

/// Negotiated output canvas dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasGeometry {
    pub width: u32,
    pub height: u32,
}

/// Derive the canvas size from the slots with known natural size.
///
/// Returns `None` while no slot has a known size — the mixer has nothing to
/// negotiate from yet and skips the cycle.
pub fn negotiate<'a>(slots: impl IntoIterator<Item = &'a InputSlot>) -> Option<CanvasGeometry> {
    let mut width = 0u32;
    let mut height = 0u32;

    for slot in slots {
        if !slot.has_known_size() {
            continue;
        }
        let effective_width = slot.width().saturating_add(slot.xpos().max(0) as u32);
        let effective_height = slot.height().saturating_add(slot.ypos().max(0) as u32);
        width = width.max(effective_width);
        height = height.max(effective_height);
    }

    (width > 0 && height > 0).then_some(CanvasGeometry { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::SlotRegistry;
    use framemix_frame::{FrameLease, PixelFormat, VideoFrame};
    use proptest::prelude::*;

    fn registry_with(slots: &[(u32, u32, i32, i32)]) -> SlotRegistry {
        let mut reg = SlotRegistry::new();
        for &(w, h, x, y) in slots {
            let id = reg.add_slot();
            reg.set_position(id, x, y).unwrap();
            let frame = VideoFrame::alloc(PixelFormat::Ayuv, w, h).unwrap();
            reg.supply_frame(id, Some(FrameLease::from(frame))).unwrap();
        }
        reg
    }

    #[test]
    fn test_no_known_size_means_no_geometry() {
        let mut reg = SlotRegistry::new();
        reg.add_slot();
        reg.add_slot();
        assert_eq!(negotiate(reg.iter()), None);
    }

    #[test]
    fn test_largest_slot_wins() {
        let reg = registry_with(&[(100, 100, 0, 0), (320, 240, 0, 0)]);
        assert_eq!(
            negotiate(reg.iter()),
            Some(CanvasGeometry {
                width: 320,
                height: 240
            })
        );
    }

    #[test]
    fn test_positive_offset_grows_canvas() {
        let reg = registry_with(&[(100, 100, 50, 20)]);
        assert_eq!(
            negotiate(reg.iter()),
            Some(CanvasGeometry {
                width: 150,
                height: 120
            })
        );
    }

    #[test]
    fn test_offset_past_canvas_still_counts() {
        // A slot fully beyond another slot's box widens the canvas to reach it
        let reg = registry_with(&[(64, 64, 0, 0), (32, 32, 200, 0)]);
        assert_eq!(
            negotiate(reg.iter()),
            Some(CanvasGeometry {
                width: 232,
                height: 64
            })
        );
    }

    #[test]
    fn test_unknown_size_slot_is_ignored() {
        let mut reg = registry_with(&[(320, 240, 0, 0)]);
        reg.add_slot();
        assert_eq!(
            negotiate(reg.iter()),
            Some(CanvasGeometry {
                width: 320,
                height: 240
            })
        );
    }

    proptest! {
        /// Negative offsets never shrink or grow the canvas: with only
        /// non-positive offsets the canvas is exactly the largest natural size.
        #[test]
        fn prop_negative_offsets_do_not_affect_size(
            slots in proptest::collection::vec(
                (1u32..512, 1u32..512, -512i32..=0, -512i32..=0),
                1..8,
            )
        ) {
            let reg = registry_with(&slots);
            let geometry = negotiate(reg.iter()).unwrap();
            let max_w = slots.iter().map(|s| s.0).max().unwrap();
            let max_h = slots.iter().map(|s| s.1).max().unwrap();
            prop_assert_eq!(geometry.width, max_w);
            prop_assert_eq!(geometry.height, max_h);
        }

        /// Adding a slot whose effective box fits inside the current canvas
        /// leaves the negotiated size unchanged.
        #[test]
        fn prop_contained_slot_is_a_noop(
            base in (64u32..512, 64u32..512),
            inner in (1u32..32, 1u32..32, 0i32..32, 0i32..32),
        ) {
            let reg = registry_with(&[(base.0, base.1, 0, 0)]);
            let before = negotiate(reg.iter()).unwrap();

            let reg = registry_with(&[
                (base.0, base.1, 0, 0),
                (inner.0, inner.1, inner.2, inner.3),
            ]);
            let after = negotiate(reg.iter()).unwrap();
            prop_assert_eq!(before, after);
        }
    }
}
