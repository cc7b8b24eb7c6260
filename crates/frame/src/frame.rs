//! Plane-based frame buffers and frame leases.

use std::ops::Deref;
use std::sync::Arc;

use crate::format::PixelFormat;

/// Errors from frame buffer construction.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame allocation of {needed} bytes failed")]
    Allocation { needed: usize },

    #[error("invalid frame dimensions {width}x{height}")]
    BadDimensions { width: u32, height: u32 },
}

/// One plane of sample data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    /// Sample bytes, `stride * rows` long.
    pub data: Vec<u8>,
    /// Bytes per row.
    pub stride: usize,
}

/// A decoded video frame in one of the working pixel formats.
///
/// Packed formats carry one plane; I420 carries Y, U, V in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    format: PixelFormat,
    width: u32,
    height: u32,
    planes: Vec<Plane>,
}

impl VideoFrame {
    /// Allocate a zero-filled frame.
    ///
    /// Allocation is fallible so a failed canvas allocation can surface as a
    /// reported cycle failure instead of aborting the process.
    pub fn alloc(format: PixelFormat, width: u32, height: u32) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::BadDimensions { width, height });
        }

        let mut planes = Vec::with_capacity(format.plane_count());
        for plane in 0..format.plane_count() {
            let (_, rows) = format.plane_dimensions(plane, width, height);
            let stride = format.plane_stride(plane, width);
            let len = stride * rows as usize;

            let mut data = Vec::new();
            data.try_reserve_exact(len)
                .map_err(|_| FrameError::Allocation { needed: len })?;
            data.resize(len, 0);
            planes.push(Plane { data, stride });
        }

        Ok(Self {
            format,
            width,
            height,
            planes,
        })
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn plane(&self, idx: usize) -> &Plane {
        &self.planes[idx]
    }

    pub fn plane_mut(&mut self, idx: usize) -> &mut Plane {
        &mut self.planes[idx]
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// Total payload size in bytes across all planes.
    pub fn byte_len(&self) -> usize {
        self.planes.iter().map(|p| p.data.len()).sum()
    }
}

/// A borrow token for a frame handed out by a frame supplier.
///
/// The lease is held for at most one mix cycle; dropping it is the release.
/// Cycle abandonment and contract-violation aborts release through the same
/// path, so no pixel data outlives the cycle that borrowed it.
#[derive(Debug, Clone)]
pub struct FrameLease {
    frame: Arc<VideoFrame>,
}

impl FrameLease {
    pub fn new(frame: Arc<VideoFrame>) -> Self {
        Self { frame }
    }

    pub fn frame(&self) -> &VideoFrame {
        &self.frame
    }
}

impl Deref for FrameLease {
    type Target = VideoFrame;

    fn deref(&self) -> &VideoFrame {
        &self.frame
    }
}

impl From<VideoFrame> for FrameLease {
    fn from(frame: VideoFrame) -> Self {
        Self::new(Arc::new(frame))
    }
}

impl From<Arc<VideoFrame>> for FrameLease {
    fn from(frame: Arc<VideoFrame>) -> Self {
        Self::new(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_packed_is_zeroed() {
        let frame = VideoFrame::alloc(PixelFormat::Bgra, 4, 3).unwrap();
        assert_eq!(frame.planes().len(), 1);
        assert_eq!(frame.plane(0).stride, 16);
        assert_eq!(frame.plane(0).data.len(), 48);
        assert!(frame.plane(0).data.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_alloc_i420_plane_sizes() {
        let frame = VideoFrame::alloc(PixelFormat::I420, 6, 4).unwrap();
        assert_eq!(frame.planes().len(), 3);
        assert_eq!(frame.plane(0).data.len(), 24);
        assert_eq!(frame.plane(1).data.len(), 6);
        assert_eq!(frame.plane(2).data.len(), 6);
    }

    #[test]
    fn test_alloc_rejects_zero_dimensions() {
        assert!(matches!(
            VideoFrame::alloc(PixelFormat::Rgb, 0, 10),
            Err(FrameError::BadDimensions { .. })
        ));
    }

    #[test]
    fn test_lease_releases_on_drop() {
        let frame = Arc::new(VideoFrame::alloc(PixelFormat::Ayuv, 2, 2).unwrap());
        let lease = FrameLease::new(Arc::clone(&frame));
        assert_eq!(Arc::strong_count(&frame), 2);
        drop(lease);
        assert_eq!(Arc::strong_count(&frame), 1);
    }
}
