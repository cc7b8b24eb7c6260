//! Blend and overlay compositing.
//!
//! Per-sample alpha compositing of one source frame onto the canvas at a
//! signed offset, clipped to the canvas bounds. All arithmetic is 8-bit
//! samples with u32 intermediates; weights sum to 255 so nothing can
//! overflow.

use framemix_frame::{PackedLayout, Plane, VideoFrame};

/// Per-slot paint policy, selected by the background mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendPolicy {
    /// Alpha-composite against existing destination content.
    Blend,
    /// Like [`BlendPolicy::Blend`] for color samples, but destination alpha
    /// is accumulated instead of blended. Used when the canvas starts fully
    /// transparent: the first layer must establish coverage, not blend with
    /// paint that is not there, so the output stays composable downstream.
    Overlay,
}

/// Composite `src` onto `canvas` at `(xpos, ypos)`.
///
/// Any portion outside the canvas is silently dropped. `alpha` is the
/// slot's scalar opacity; a source format with its own alpha sample
/// multiplies it in per pixel. The caller has already verified that `src`
/// is in the canvas's working format.
pub fn composite_frame(
    canvas: &mut VideoFrame,
    src: &VideoFrame,
    xpos: i32,
    ypos: i32,
    alpha: f64,
    policy: BlendPolicy,
) {
    debug_assert_eq!(canvas.format(), src.format());

    let slot_alpha = (alpha.clamp(0.0, 1.0) * 255.0).round() as u32;
    if slot_alpha == 0 {
        return;
    }

    match canvas.format().packed_layout() {
        Some(layout) => blend_packed(canvas, src, &layout, xpos, ypos, slot_alpha, policy),
        None => blend_i420(canvas, src, xpos, ypos, slot_alpha),
    }
}

/// The overlap of a source frame placed at a signed offset with the canvas.
#[derive(Debug, Clone, Copy)]
struct ClipRect {
    src_x: usize,
    src_y: usize,
    dst_x: usize,
    dst_y: usize,
    width: usize,
    height: usize,
}

fn clip(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32, xpos: i32, ypos: i32) -> Option<ClipRect> {
    let src_x = (-i64::from(xpos)).max(0);
    let src_y = (-i64::from(ypos)).max(0);
    let dst_x = i64::from(xpos).max(0);
    let dst_y = i64::from(ypos).max(0);

    let width = (i64::from(src_w) - src_x).min(i64::from(dst_w) - dst_x);
    let height = (i64::from(src_h) - src_y).min(i64::from(dst_h) - dst_y);
    if width <= 0 || height <= 0 {
        return None;
    }

    Some(ClipRect {
        src_x: src_x as usize,
        src_y: src_y as usize,
        dst_x: dst_x as usize,
        dst_y: dst_y as usize,
        width: width as usize,
        height: height as usize,
    })
}

fn blend_sample(s: u8, d: u8, a: u32) -> u8 {
    ((s as u32 * a + d as u32 * (255 - a)) / 255) as u8
}

fn blend_packed(
    canvas: &mut VideoFrame,
    src: &VideoFrame,
    layout: &PackedLayout,
    xpos: i32,
    ypos: i32,
    slot_alpha: u32,
    policy: BlendPolicy,
) {
    let Some(rect) = clip(
        src.width(),
        src.height(),
        canvas.width(),
        canvas.height(),
        xpos,
        ypos,
    ) else {
        return;
    };

    let bpp = layout.bytes_per_pixel;
    let s_stride = src.plane(0).stride;
    let d_stride = canvas.plane(0).stride;
    let s_data = &src.plane(0).data;
    let d_data = &mut canvas.plane_mut(0).data;

    for row in 0..rect.height {
        let s_off = (rect.src_y + row) * s_stride + rect.src_x * bpp;
        let d_off = (rect.dst_y + row) * d_stride + rect.dst_x * bpp;
        let s_row = &s_data[s_off..][..rect.width * bpp];
        let d_row = &mut d_data[d_off..][..rect.width * bpp];

        for (s_px, d_px) in s_row.chunks_exact(bpp).zip(d_row.chunks_exact_mut(bpp)) {
            let src_alpha = layout.alpha.map_or(255, |o| s_px[o] as u32);
            let a = src_alpha * slot_alpha / 255;

            for &c in &layout.channels {
                d_px[c] = blend_sample(s_px[c], d_px[c], a);
            }
            if let Some(o) = layout.alpha {
                d_px[o] = match policy {
                    BlendPolicy::Blend => blend_sample(s_px[o], d_px[o], a),
                    BlendPolicy::Overlay => (a + d_px[o] as u32 * (255 - a) / 255) as u8,
                };
            }
        }
    }
}

/// Planar 4:2:0 has no alpha sample, so blend and overlay coincide and the
/// slot's scalar opacity is the only weight. The composite origin rounds
/// down to even to keep luma and chroma aligned.
fn blend_i420(canvas: &mut VideoFrame, src: &VideoFrame, xpos: i32, ypos: i32, slot_alpha: u32) {
    let xpos = xpos & !1;
    let ypos = ypos & !1;

    if let Some(rect) = clip(
        src.width(),
        src.height(),
        canvas.width(),
        canvas.height(),
        xpos,
        ypos,
    ) {
        blend_plane(canvas.plane_mut(0), src.plane(0), rect, slot_alpha);
    }

    let (s_w, s_h) = src.format().plane_dimensions(1, src.width(), src.height());
    let (d_w, d_h) = canvas
        .format()
        .plane_dimensions(1, canvas.width(), canvas.height());
    if let Some(rect) = clip(s_w, s_h, d_w, d_h, xpos / 2, ypos / 2) {
        blend_plane(canvas.plane_mut(1), src.plane(1), rect, slot_alpha);
        blend_plane(canvas.plane_mut(2), src.plane(2), rect, slot_alpha);
    }
}

fn blend_plane(dst: &mut Plane, src: &Plane, rect: ClipRect, a: u32) {
    for row in 0..rect.height {
        let s_off = (rect.src_y + row) * src.stride + rect.src_x;
        let d_off = (rect.dst_y + row) * dst.stride + rect.dst_x;
        let s_row = &src.data[s_off..][..rect.width];
        let d_row = &mut dst.data[d_off..][..rect.width];

        for (s, d) in s_row.iter().zip(d_row.iter_mut()) {
            *d = blend_sample(*s, *d, a);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framemix_frame::{pattern, PixelFormat, VideoFrame, YuvColor};

    fn solid(format: PixelFormat, w: u32, h: u32, color: YuvColor) -> VideoFrame {
        pattern::solid(format, w, h, color).unwrap()
    }

    #[test]
    fn test_opaque_paint_copies_source_exactly() {
        let src = solid(PixelFormat::Ayuv, 4, 4, YuvColor { y: 90, u: 70, v: 50 });
        let mut canvas = solid(PixelFormat::Ayuv, 4, 4, YuvColor::WHITE);

        composite_frame(&mut canvas, &src, 0, 0, 1.0, BlendPolicy::Blend);
        assert_eq!(canvas, src);
    }

    #[test]
    fn test_zero_alpha_leaves_destination_unchanged() {
        let src = solid(PixelFormat::Rgba, 4, 4, YuvColor::WHITE);
        let mut canvas = solid(PixelFormat::Rgba, 4, 4, YuvColor::BLACK);
        let before = canvas.clone();

        composite_frame(&mut canvas, &src, 0, 0, 0.0, BlendPolicy::Blend);
        assert_eq!(canvas, before);
    }

    #[test]
    fn test_half_alpha_midpoint() {
        // Y: src 200 over dst 100 at a=128 -> (200*128 + 100*127)/255 = 150
        let src = solid(PixelFormat::Ayuv, 1, 1, YuvColor { y: 200, u: 128, v: 128 });
        let mut canvas = solid(PixelFormat::Ayuv, 1, 1, YuvColor { y: 100, u: 128, v: 128 });

        composite_frame(&mut canvas, &src, 0, 0, 128.0 / 255.0, BlendPolicy::Blend);
        assert_eq!(canvas.plane(0).data[1], 150);
    }

    #[test]
    fn test_source_alpha_multiplies_slot_alpha() {
        // Source pixel alpha 128, slot alpha 0.5 -> effective a = 128*128/255 = 64
        let mut src = solid(PixelFormat::Ayuv, 1, 1, YuvColor { y: 255, u: 128, v: 128 });
        src.plane_mut(0).data[0] = 128;
        let mut canvas = solid(PixelFormat::Ayuv, 1, 1, YuvColor { y: 0, u: 128, v: 128 });

        composite_frame(&mut canvas, &src, 0, 0, 128.0 / 255.0, BlendPolicy::Blend);
        assert_eq!(canvas.plane(0).data[1], blend_sample(255, 0, 64));
    }

    #[test]
    fn test_negative_offset_clips_top_left() {
        let src = solid(PixelFormat::Rgb, 4, 4, YuvColor::WHITE);
        let mut canvas = solid(PixelFormat::Rgb, 4, 4, YuvColor::BLACK);

        composite_frame(&mut canvas, &src, -2, -2, 1.0, BlendPolicy::Blend);

        let stride = canvas.plane(0).stride;
        let data = &canvas.plane(0).data;
        // (0,0) and (1,1) painted (source rows 2..4 land there)
        assert_ne!(data[0], 0);
        // (2,2) untouched: source has run out
        assert_eq!(data[2 * stride + 2 * 3], 0);
    }

    #[test]
    fn test_fully_off_canvas_is_a_noop() {
        let src = solid(PixelFormat::Bgra, 8, 8, YuvColor::WHITE);
        let mut canvas = solid(PixelFormat::Bgra, 4, 4, YuvColor::BLACK);
        let before = canvas.clone();

        composite_frame(&mut canvas, &src, 100, 0, 1.0, BlendPolicy::Blend);
        composite_frame(&mut canvas, &src, 0, -50, 1.0, BlendPolicy::Blend);
        assert_eq!(canvas, before);
    }

    #[test]
    fn test_overlay_establishes_alpha_on_transparent() {
        let src = solid(PixelFormat::Rgba, 2, 2, YuvColor::WHITE);
        let mut canvas = VideoFrame::alloc(PixelFormat::Rgba, 2, 2).unwrap(); // all zero

        composite_frame(&mut canvas, &src, 0, 0, 1.0, BlendPolicy::Overlay);
        for px in canvas.plane(0).data.chunks_exact(4) {
            assert_eq!(px[3], 255);
        }
    }

    #[test]
    fn test_overlay_accumulates_partial_coverage() {
        let mut src = solid(PixelFormat::Rgba, 1, 1, YuvColor::WHITE);
        src.plane_mut(0).data[3] = 128;
        let mut canvas = VideoFrame::alloc(PixelFormat::Rgba, 1, 1).unwrap();

        // First layer: coverage 128 over 0
        composite_frame(&mut canvas, &src, 0, 0, 1.0, BlendPolicy::Overlay);
        assert_eq!(canvas.plane(0).data[3], 128);

        // Second identical layer: 128 + 128*(255-128)/255 = 191
        composite_frame(&mut canvas, &src, 0, 0, 1.0, BlendPolicy::Overlay);
        assert_eq!(canvas.plane(0).data[3], 191);
    }

    #[test]
    fn test_i420_origin_rounds_down_to_even() {
        let src = solid(PixelFormat::I420, 2, 2, YuvColor::WHITE);
        let mut canvas = solid(PixelFormat::I420, 8, 8, YuvColor::BLACK);

        composite_frame(&mut canvas, &src, 1, 1, 1.0, BlendPolicy::Blend);

        let stride = canvas.plane(0).stride;
        // Painted at (0,0) rather than (1,1)
        assert_eq!(canvas.plane(0).data[0], 235);
        assert_eq!(canvas.plane(0).data[2 * stride + 2], 16);
    }

    #[test]
    fn test_i420_chroma_follows_luma() {
        let src = solid(PixelFormat::I420, 4, 4, YuvColor { y: 80, u: 30, v: 220 });
        let mut canvas = solid(PixelFormat::I420, 8, 8, YuvColor::BLACK);

        composite_frame(&mut canvas, &src, 4, 4, 1.0, BlendPolicy::Blend);

        let u = canvas.plane(1);
        // Chroma plane is 4x4; the source covers its bottom-right 2x2
        assert_eq!(u.data[2 * u.stride + 2], 30);
        assert_eq!(u.data[0], 128);
    }
}
