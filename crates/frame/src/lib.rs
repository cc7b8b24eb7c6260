//! Framemix Frame Model
//!
//! The data layer under the compositing engine:
//! - The fixed set of working pixel formats all frames are converted to
//!   before they reach the mixer, with byte-layout descriptors
//! - Plane-based frame buffers with fallible allocation
//! - Frame leases: borrow tokens handed out by frame suppliers, released
//!   deterministically at the end of each mix cycle
//! - Limited-range YUV color handling
//! - Deterministic test-pattern sources for drivers and tests

pub mod color;
pub mod format;
pub mod frame;
pub mod pattern;

pub use color::*;
pub use format::*;
pub use frame::*;
pub use pattern::*;
