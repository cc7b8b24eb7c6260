//! Framemix Mixer Engine
//!
//! Composites N independently-sized, independently-positioned input streams
//! into one output frame per tick.
//!
//! # Pipeline per cycle
//!
//! ```text
//! slot frames ──┐
//!               ├── Collect (frame supplier, one lease per slot)
//! slot props ───┘         │
//!                         ├── Negotiate (canvas = bounding box of slots)
//!                         │
//!                         ├── Background (checker / solid / transparent)
//!                         │
//!                         ├── Composite (z-order, blend or overlay)
//!                         ▼
//!                   emitted canvas
//! ```
//!
//! Synchronization, format conversion, and frame-rate negotiation live in
//! external collaborators; the engine consumes already-decoded,
//! already-synchronized frames through the [`FrameSupplier`] seam and
//! emits one decoded frame per cycle.

pub mod background;
pub mod blend;
pub mod funnel;
pub mod geometry;
pub mod mixer;
pub mod scene;
pub mod slot;
pub mod supplier;

pub use background::BackgroundMode;
pub use blend::BlendPolicy;
pub use geometry::CanvasGeometry;
pub use mixer::{CycleOutput, MixerControls, OutputFrame, SkipReason, VideoMixer};
pub use scene::{SceneConfig, SlotConfig};
pub use slot::{InputSlot, SlotId, SlotRegistry};
pub use supplier::{FrameSupplier, QueueSupplier};
