//! The mix cycle controller.
//!
//! One [`VideoMixer`] produces one output canvas per cycle:
//! collect a frame per slot from the supplier, renegotiate geometry when
//! stale, paint the background, composite the slots in z-order, emit.
//! Property and topology changes go through a cloneable [`MixerControls`]
//! handle; the registry lock is held for the whole cycle so a mutation from
//! another thread can never interleave with an in-flight composite.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use framemix_common::{MixError, MixResult};
use framemix_frame::{PixelFormat, VideoFrame};

use crate::background::{self, BackgroundMode};
use crate::blend::{self, BlendPolicy};
use crate::geometry::{self, CanvasGeometry};
use crate::slot::{SlotId, SlotRegistry};
use crate::supplier::FrameSupplier;

/// Mixer state shared with property-surface handles.
#[derive(Debug, Default)]
struct Shared {
    slots: SlotRegistry,
    background: BackgroundMode,
}

/// One finished output canvas.
#[derive(Debug, Clone)]
pub struct OutputFrame {
    /// The composited canvas, in the mixer's working format.
    pub frame: Arc<VideoFrame>,
    /// The geometry the canvas was negotiated at.
    pub geometry: CanvasGeometry,
    /// Running index of emitted frames, starting at 0.
    pub sequence: u64,
}

/// Why a cycle produced no output without that being a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No slot has a known natural size yet, so there is no geometry.
    NoGeometry,
}

/// Outcome of one successful mix cycle.
#[derive(Debug, Clone)]
pub enum CycleOutput {
    Frame(OutputFrame),
    Skipped(SkipReason),
}

/// Multi-stream frame compositor.
pub struct VideoMixer {
    shared: Arc<Mutex<Shared>>,
    format: PixelFormat,
    canvas: Option<Arc<VideoFrame>>,
    geometry: Option<CanvasGeometry>,
    sequence: u64,
}

impl VideoMixer {
    /// Create a mixer producing canvases in the given working format.
    pub fn new(format: PixelFormat) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared::default())),
            format,
            canvas: None,
            geometry: None,
            sequence: 0,
        }
    }

    /// The working pixel format every input frame must arrive in.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// A cloneable handle for property and topology changes, usable from
    /// other threads.
    pub fn controls(&self) -> MixerControls {
        MixerControls {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Run one mix cycle against the given frame supplier.
    ///
    /// Skippable conditions (a slot with no frame, no geometry yet) degrade
    /// the cycle; contract violations (wrong pixel format, failed canvas
    /// allocation) abort it with an error and emit nothing. Either way every
    /// frame borrowed this cycle is released before returning.
    pub fn mix_cycle(&mut self, supplier: &mut dyn FrameSupplier) -> MixResult<CycleOutput> {
        let shared = Arc::clone(&self.shared);
        let mut guard = shared.lock();

        let result = self.cycle_locked(&mut guard, supplier);
        guard.slots.release_frames();
        result
    }

    fn cycle_locked(
        &mut self,
        shared: &mut Shared,
        supplier: &mut dyn FrameSupplier,
    ) -> MixResult<CycleOutput> {
        // Collect
        for id in shared.slots.ids() {
            let lease = supplier.try_take_current_frame(id);
            if lease.is_none() {
                trace!(slot = %id, "no frame this cycle");
            }
            shared.slots.supply_frame(id, lease)?;
        }

        // Negotiate
        let Some(geometry) = self.ensure_geometry(&mut shared.slots) else {
            debug!("no slot with known size, skipping cycle");
            return Ok(CycleOutput::Skipped(SkipReason::NoGeometry));
        };

        // Prepare canvas: reuse the allocation when the downstream consumer
        // has released the previous frame, otherwise make_mut clones.
        let mut canvas_arc = match self.canvas.take() {
            Some(arc) => arc,
            None => Arc::new(
                VideoFrame::alloc(self.format, geometry.width, geometry.height)
                    .map_err(|e| MixError::allocation(e.to_string()))?,
            ),
        };
        let canvas = Arc::make_mut(&mut canvas_arc);

        // Background
        background::paint_background(canvas, shared.background);

        // Composite in z-order. A transparent background has no alpha to
        // blend against, so its first layer must establish coverage.
        let policy = if shared.background == BackgroundMode::Transparent {
            BlendPolicy::Overlay
        } else {
            BlendPolicy::Blend
        };

        for slot in shared.slots.paint_order() {
            let Some(lease) = slot.current_frame() else {
                continue;
            };
            if lease.format() != self.format {
                return Err(MixError::format_mismatch(
                    slot.id().raw(),
                    lease.format().to_string(),
                    self.format.to_string(),
                ));
            }
            trace!(
                slot = %slot.id(),
                zorder = slot.zorder(),
                alpha = slot.alpha(),
                "compositing slot"
            );
            blend::composite_frame(
                canvas,
                lease.frame(),
                slot.xpos(),
                slot.ypos(),
                slot.alpha(),
                policy,
            );
        }

        // Emit
        let sequence = self.sequence;
        self.sequence += 1;
        self.canvas = Some(Arc::clone(&canvas_arc));

        debug!(
            sequence,
            width = geometry.width,
            height = geometry.height,
            "cycle complete"
        );

        Ok(CycleOutput::Frame(OutputFrame {
            frame: canvas_arc,
            geometry,
            sequence,
        }))
    }

    /// Re-run negotiation when slot geometry went stale; keep the cached
    /// canvas when the result is unchanged so a no-op renegotiation never
    /// reallocates.
    fn ensure_geometry(&mut self, slots: &mut SlotRegistry) -> Option<CanvasGeometry> {
        if slots.take_geometry_dirty() || self.geometry.is_none() {
            match geometry::negotiate(slots.iter()) {
                Some(negotiated) => {
                    if self.geometry != Some(negotiated) {
                        debug!(
                            width = negotiated.width,
                            height = negotiated.height,
                            "negotiated output geometry"
                        );
                        self.geometry = Some(negotiated);
                        self.canvas = None;
                    }
                }
                None => {
                    self.geometry = None;
                    self.canvas = None;
                }
            }
        }
        self.geometry
    }
}

/// Typed property surface over the mixer's shared state.
///
/// Setters validate at the boundary (alpha clamps, unknown slots error) and
/// serialize against in-flight cycles via the registry lock.
#[derive(Debug, Clone)]
pub struct MixerControls {
    shared: Arc<Mutex<Shared>>,
}

impl MixerControls {
    /// Attach a new input slot with default properties
    /// (position (0,0), alpha 1.0, zorder 0).
    pub fn add_slot(&self) -> SlotId {
        self.shared.lock().slots.add_slot()
    }

    /// Detach a slot. Waits for any in-flight cycle before taking effect.
    pub fn remove_slot(&self, id: SlotId) -> MixResult<()> {
        self.shared.lock().slots.remove_slot(id)
    }

    pub fn set_position(&self, id: SlotId, xpos: i32, ypos: i32) -> MixResult<()> {
        self.shared.lock().slots.set_position(id, xpos, ypos)
    }

    pub fn set_alpha(&self, id: SlotId, alpha: f64) -> MixResult<()> {
        self.shared.lock().slots.set_alpha(id, alpha)
    }

    pub fn set_zorder(&self, id: SlotId, zorder: u32) -> MixResult<()> {
        self.shared.lock().slots.set_zorder(id, zorder)
    }

    pub fn set_background(&self, mode: BackgroundMode) {
        self.shared.lock().background = mode;
    }

    pub fn background(&self) -> BackgroundMode {
        self.shared.lock().background
    }

    pub fn position(&self, id: SlotId) -> MixResult<(i32, i32)> {
        let shared = self.shared.lock();
        let slot = shared.slots.slot(id)?;
        Ok((slot.xpos(), slot.ypos()))
    }

    pub fn alpha(&self, id: SlotId) -> MixResult<f64> {
        Ok(self.shared.lock().slots.slot(id)?.alpha())
    }

    pub fn zorder(&self, id: SlotId) -> MixResult<u32> {
        Ok(self.shared.lock().slots.slot(id)?.zorder())
    }

    pub fn slot_count(&self) -> usize {
        self.shared.lock().slots.len()
    }
}
