//! Working pixel formats.
//!
//! Every frame entering the mixer has already been converted (by an external
//! collaborator) to one of the formats here. The set deliberately spans the
//! three layout families the blend routines must handle: packed with alpha,
//! packed without alpha, and planar subsampled.

use serde::{Deserialize, Serialize};

use crate::color::YuvColor;

/// The fixed set of working pixel formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// Packed A Y U V, 4 bytes per pixel.
    Ayuv,
    /// Packed A R G B, 4 bytes per pixel.
    Argb,
    /// Packed B G R A, 4 bytes per pixel.
    Bgra,
    /// Packed R G B A, 4 bytes per pixel.
    Rgba,
    /// Packed R G B, 3 bytes per pixel, no alpha.
    Rgb,
    /// Packed B G R, 3 bytes per pixel, no alpha.
    Bgr,
    /// Planar YUV 4:2:0, three planes, no alpha.
    I420,
}

/// Which color triple a format's channels carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorModel {
    Yuv,
    Rgb,
}

/// Byte layout of one pixel of a packed format.
#[derive(Debug, Clone, Copy)]
pub struct PackedLayout {
    /// Bytes per pixel.
    pub bytes_per_pixel: usize,
    /// Byte offset of the alpha sample within a pixel, if the format has one.
    pub alpha: Option<usize>,
    /// Byte offsets of the color samples: (Y, U, V) or (R, G, B).
    pub channels: [usize; 3],
    /// Color model of the channel triple.
    pub model: ColorModel,
}

impl PackedLayout {
    /// Encode a color (plus alpha, ignored by alpha-less formats) as pixel
    /// bytes. Only the first `bytes_per_pixel` entries are meaningful.
    pub fn encode(&self, color: YuvColor, alpha: u8) -> [u8; 4] {
        let mut px = [0u8; 4];
        let (c0, c1, c2) = match self.model {
            ColorModel::Yuv => (color.y, color.u, color.v),
            ColorModel::Rgb => {
                let [r, g, b] = color.to_rgb();
                (r, g, b)
            }
        };
        px[self.channels[0]] = c0;
        px[self.channels[1]] = c1;
        px[self.channels[2]] = c2;
        if let Some(a) = self.alpha {
            px[a] = alpha;
        }
        px
    }
}

impl PixelFormat {
    /// All supported working formats.
    pub const ALL: [PixelFormat; 7] = [
        PixelFormat::Ayuv,
        PixelFormat::Argb,
        PixelFormat::Bgra,
        PixelFormat::Rgba,
        PixelFormat::Rgb,
        PixelFormat::Bgr,
        PixelFormat::I420,
    ];

    /// Whether the format carries a native alpha sample.
    pub fn has_alpha(self) -> bool {
        matches!(
            self,
            PixelFormat::Ayuv | PixelFormat::Argb | PixelFormat::Bgra | PixelFormat::Rgba
        )
    }

    /// Whether the format stores its samples in separate planes.
    pub fn is_planar(self) -> bool {
        matches!(self, PixelFormat::I420)
    }

    /// Number of planes a frame of this format carries.
    pub fn plane_count(self) -> usize {
        if self.is_planar() {
            3
        } else {
            1
        }
    }

    /// The byte layout, for packed formats.
    pub fn packed_layout(self) -> Option<PackedLayout> {
        let layout = match self {
            PixelFormat::Ayuv => PackedLayout {
                bytes_per_pixel: 4,
                alpha: Some(0),
                channels: [1, 2, 3],
                model: ColorModel::Yuv,
            },
            PixelFormat::Argb => PackedLayout {
                bytes_per_pixel: 4,
                alpha: Some(0),
                channels: [1, 2, 3],
                model: ColorModel::Rgb,
            },
            PixelFormat::Bgra => PackedLayout {
                bytes_per_pixel: 4,
                alpha: Some(3),
                channels: [2, 1, 0],
                model: ColorModel::Rgb,
            },
            PixelFormat::Rgba => PackedLayout {
                bytes_per_pixel: 4,
                alpha: Some(3),
                channels: [0, 1, 2],
                model: ColorModel::Rgb,
            },
            PixelFormat::Rgb => PackedLayout {
                bytes_per_pixel: 3,
                alpha: None,
                channels: [0, 1, 2],
                model: ColorModel::Rgb,
            },
            PixelFormat::Bgr => PackedLayout {
                bytes_per_pixel: 3,
                alpha: None,
                channels: [2, 1, 0],
                model: ColorModel::Rgb,
            },
            PixelFormat::I420 => return None,
        };
        Some(layout)
    }

    /// Dimensions of plane `plane` for a `width`×`height` frame.
    ///
    /// I420 chroma planes are subsampled 2x2, rounding up so odd frame sizes
    /// still cover every pixel.
    pub fn plane_dimensions(self, plane: usize, width: u32, height: u32) -> (u32, u32) {
        match (self, plane) {
            (PixelFormat::I420, 1) | (PixelFormat::I420, 2) => {
                (width.div_ceil(2), height.div_ceil(2))
            }
            _ => (width, height),
        }
    }

    /// Row stride in bytes of plane `plane` for a frame `width` pixels wide.
    pub fn plane_stride(self, plane: usize, width: u32) -> usize {
        match self.packed_layout() {
            Some(layout) => width as usize * layout.bytes_per_pixel,
            None => {
                let (w, _) = self.plane_dimensions(plane, width, 1);
                w as usize
            }
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PixelFormat::Ayuv => "AYUV",
            PixelFormat::Argb => "ARGB",
            PixelFormat::Bgra => "BGRA",
            PixelFormat::Rgba => "RGBA",
            PixelFormat::Rgb => "RGB",
            PixelFormat::Bgr => "BGR",
            PixelFormat::I420 => "I420",
        };
        f.pad(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_formats() {
        assert!(PixelFormat::Ayuv.has_alpha());
        assert!(PixelFormat::Bgra.has_alpha());
        assert!(!PixelFormat::Rgb.has_alpha());
        assert!(!PixelFormat::I420.has_alpha());
    }

    #[test]
    fn test_packed_layout_offsets() {
        let bgra = PixelFormat::Bgra.packed_layout().unwrap();
        assert_eq!(bgra.bytes_per_pixel, 4);
        assert_eq!(bgra.alpha, Some(3));
        assert_eq!(bgra.channels, [2, 1, 0]);

        let rgb = PixelFormat::Rgb.packed_layout().unwrap();
        assert_eq!(rgb.bytes_per_pixel, 3);
        assert_eq!(rgb.alpha, None);

        assert!(PixelFormat::I420.packed_layout().is_none());
    }

    #[test]
    fn test_i420_plane_dimensions() {
        assert_eq!(PixelFormat::I420.plane_dimensions(0, 320, 240), (320, 240));
        assert_eq!(PixelFormat::I420.plane_dimensions(1, 320, 240), (160, 120));
        // Odd sizes round up so chroma covers the last column/row
        assert_eq!(PixelFormat::I420.plane_dimensions(2, 321, 241), (161, 121));
    }

    #[test]
    fn test_encode_maps_channels() {
        let color = YuvColor { y: 10, u: 20, v: 30 };
        let px = PixelFormat::Ayuv.packed_layout().unwrap().encode(color, 200);
        assert_eq!(px, [200, 10, 20, 30]);
    }
}
