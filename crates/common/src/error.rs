//! Error types shared across Framemix crates.
//!
//! The mix cycle distinguishes *skippable* conditions (a slot with no frame
//! this tick, no negotiable geometry yet) from *contract violations*.
//! Skippable conditions never show up here; they degrade the cycle and move
//! on. Everything in this enum aborts the operation it occurred in.

/// Top-level error type for Framemix operations.
#[derive(Debug, thiserror::Error)]
pub enum MixError {
    /// A frame reached the compositor in a pixel format other than the
    /// negotiated working format. This indicates a broken format-conversion
    /// collaborator, not bad input data.
    #[error("frame format mismatch on slot {slot}: got {got}, canvas is {expected}")]
    FormatMismatch {
        slot: u32,
        got: String,
        expected: String,
    },

    #[error("canvas allocation failed: {message}")]
    Allocation { message: String },

    #[error("unknown slot: {slot}")]
    UnknownSlot { slot: u32 },

    #[error("scene error: {message}")]
    Scene { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using MixError.
pub type MixResult<T> = Result<T, MixError>;

impl MixError {
    pub fn format_mismatch(
        slot: u32,
        got: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::FormatMismatch {
            slot,
            got: got.into(),
            expected: expected.into(),
        }
    }

    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::Allocation {
            message: msg.into(),
        }
    }

    pub fn unknown_slot(slot: u32) -> Self {
        Self::UnknownSlot { slot }
    }

    pub fn scene(msg: impl Into<String>) -> Self {
        Self::Scene {
            message: msg.into(),
        }
    }

    /// Whether this error is a compositing contract violation (as opposed to
    /// an IO/config problem surfaced outside a mix cycle).
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::FormatMismatch { .. } | Self::Allocation { .. } | Self::UnknownSlot { .. }
        )
    }
}
