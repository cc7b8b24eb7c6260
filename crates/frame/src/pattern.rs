//! Deterministic test-pattern frame sources.
//!
//! Stand-ins for an upstream test source when driving the mixer from the
//! CLI or from tests. Every generator is a pure function of its inputs so
//! repeated frames are byte-identical.

use serde::{Deserialize, Serialize};

use crate::color::YuvColor;
use crate::format::PixelFormat;
use crate::frame::{FrameError, VideoFrame};

/// A selectable test pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestPattern {
    White,
    Black,
    /// Neutral gray at a given luma.
    Gray { luma: u8 },
    /// Horizontal luma ramp from limited-range black to white.
    LumaRamp,
}

impl TestPattern {
    /// Generate one frame of this pattern.
    pub fn generate(
        self,
        format: PixelFormat,
        width: u32,
        height: u32,
    ) -> Result<VideoFrame, FrameError> {
        match self {
            TestPattern::White => solid(format, width, height, YuvColor::WHITE),
            TestPattern::Black => solid(format, width, height, YuvColor::BLACK),
            TestPattern::Gray { luma } => solid(format, width, height, YuvColor::gray(luma)),
            TestPattern::LumaRamp => luma_ramp(format, width, height),
        }
    }
}

/// A frame filled with a single color, fully opaque.
pub fn solid(
    format: PixelFormat,
    width: u32,
    height: u32,
    color: YuvColor,
) -> Result<VideoFrame, FrameError> {
    let mut frame = VideoFrame::alloc(format, width, height)?;

    if let Some(layout) = format.packed_layout() {
        let px = layout.encode(color, 255);
        let bpp = layout.bytes_per_pixel;
        for chunk in frame.plane_mut(0).data.chunks_exact_mut(bpp) {
            chunk.copy_from_slice(&px[..bpp]);
        }
    } else {
        frame.plane_mut(0).data.fill(color.y);
        frame.plane_mut(1).data.fill(color.u);
        frame.plane_mut(2).data.fill(color.v);
    }

    Ok(frame)
}

/// A frame whose luma ramps left-to-right from black to white, fully opaque.
pub fn luma_ramp(format: PixelFormat, width: u32, height: u32) -> Result<VideoFrame, FrameError> {
    let mut frame = VideoFrame::alloc(format, width, height)?;
    let span = width.max(2) - 1;

    let luma_at = |x: u32| -> u8 {
        let lo = YuvColor::BLACK.y as u32;
        let hi = YuvColor::WHITE.y as u32;
        (lo + (hi - lo) * x.min(span) / span) as u8
    };

    if let Some(layout) = format.packed_layout() {
        let bpp = layout.bytes_per_pixel;
        let stride = frame.plane(0).stride;
        let data = &mut frame.plane_mut(0).data;
        for row in 0..height as usize {
            for x in 0..width {
                let px = layout.encode(YuvColor::gray(luma_at(x)), 255);
                let off = row * stride + x as usize * bpp;
                data[off..off + bpp].copy_from_slice(&px[..bpp]);
            }
        }
    } else {
        let stride = frame.plane(0).stride;
        let data = &mut frame.plane_mut(0).data;
        for row in 0..height as usize {
            for x in 0..width {
                data[row * stride + x as usize] = luma_at(x);
            }
        }
        frame.plane_mut(1).data.fill(128);
        frame.plane_mut(2).data.fill(128);
    }

    Ok(frame)
}
