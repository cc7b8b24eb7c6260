//! Framemix Common Utilities
//!
//! Shared infrastructure for all Framemix crates:
//! - Error types and result aliases
//! - Output tick pacing for mix-cycle drivers
//! - Tracing/logging initialization

pub mod error;
pub mod logging;
pub mod tick;

pub use error::*;
pub use logging::*;
pub use tick::*;
