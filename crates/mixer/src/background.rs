//! Background fills.
//!
//! The canvas is fully painted before any slot composites onto it, so every
//! pixel no slot covers shows the background. The transparent mode must
//! leave a byte-exact zeroed buffer (alpha included) because its whole
//! purpose is feeding a downstream compositor.

use serde::{Deserialize, Serialize};

use framemix_frame::{PixelFormat, VideoFrame, YuvColor};

/// Checker tile edge in pixels. Fixed so the pattern cannot flicker.
const CHECKER_TILE: u32 = 8;

/// The two checker tones (luma, neutral chroma).
const CHECKER_TONES: [u8; 2] = [0x40, 0x60];

/// Selectable background fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundMode {
    /// Two-tone checker grid, the "no input yet" neutral.
    #[default]
    Checker,
    /// Every pixel one fixed color, fully opaque.
    Solid(YuvColor),
    /// Every sample zero, alpha included, for downstream compositing.
    Transparent,
}

impl BackgroundMode {
    pub const BLACK: BackgroundMode = BackgroundMode::Solid(YuvColor::BLACK);
    pub const WHITE: BackgroundMode = BackgroundMode::Solid(YuvColor::WHITE);
}

/// Paint the whole canvas according to the background mode.
pub fn paint_background(canvas: &mut VideoFrame, mode: BackgroundMode) {
    match mode {
        BackgroundMode::Checker => fill_checker(canvas),
        BackgroundMode::Solid(color) => fill_solid(canvas, color),
        BackgroundMode::Transparent => fill_transparent(canvas),
    }
}

fn fill_checker(canvas: &mut VideoFrame) {
    let tone_at = |x: u32, y: u32| CHECKER_TONES[((x / CHECKER_TILE + y / CHECKER_TILE) & 1) as usize];
    let (width, height) = (canvas.width(), canvas.height());

    if let Some(layout) = canvas.format().packed_layout() {
        let tiles = CHECKER_TONES.map(|t| layout.encode(YuvColor::gray(t), 255));
        let bpp = layout.bytes_per_pixel;
        let stride = canvas.plane(0).stride;
        let data = &mut canvas.plane_mut(0).data;
        for y in 0..height {
            let row = &mut data[y as usize * stride..][..width as usize * bpp];
            for x in 0..width {
                let idx = ((x / CHECKER_TILE + y / CHECKER_TILE) & 1) as usize;
                row[x as usize * bpp..][..bpp].copy_from_slice(&tiles[idx][..bpp]);
            }
        }
    } else {
        let stride = canvas.plane(0).stride;
        let data = &mut canvas.plane_mut(0).data;
        for y in 0..height {
            let row = &mut data[y as usize * stride..][..width as usize];
            for x in 0..width {
                row[x as usize] = tone_at(x, y);
            }
        }
        canvas.plane_mut(1).data.fill(128);
        canvas.plane_mut(2).data.fill(128);
    }
}

fn fill_solid(canvas: &mut VideoFrame, color: YuvColor) {
    if let Some(layout) = canvas.format().packed_layout() {
        let px = layout.encode(color, 255);
        let bpp = layout.bytes_per_pixel;
        for chunk in canvas.plane_mut(0).data.chunks_exact_mut(bpp) {
            chunk.copy_from_slice(&px[..bpp]);
        }
    } else {
        canvas.plane_mut(0).data.fill(color.y);
        canvas.plane_mut(1).data.fill(color.u);
        canvas.plane_mut(2).data.fill(color.v);
    }
}

fn fill_transparent(canvas: &mut VideoFrame) {
    for idx in 0..canvas.format().plane_count() {
        canvas.plane_mut(idx).data.fill(0);
    }
}
