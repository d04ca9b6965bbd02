//! Centered scan-region selection.
//!
//! Decoding the full frame every tick is wasteful and picks up off-center
//! clutter. Instead, a square region centered on the frame is cropped out and
//! handed to the decoder. Larger regions tolerate hand-jitter and off-center
//! framing at added per-frame decode cost; the configured size usually sits
//! in the 200-400 range.
//!
//! The region is clamped, not resized, at frame edges: when the frame is
//! smaller than the configured size the extracted slice is simply the
//! top-left-anchored clamp. That is an accepted edge case, not an error.

use crate::decode::Quad;
use crate::frame::Frame;

/// An axis-aligned crop window within a frame.
///
/// Invariant: `x, y >= 0` and `x <= frame_width`, `y <= frame_height` for
/// every frame the region was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRegion {
    /// Left edge in frame coordinates.
    pub x: u32,
    /// Top edge in frame coordinates.
    pub y: u32,
    /// Extracted width; may be smaller than the configured size.
    pub width: u32,
    /// Extracted height; may be smaller than the configured size.
    pub height: u32,
}

impl ScanRegion {
    /// Compute the square region of side `size` centered on a
    /// `frame_width` x `frame_height` frame, clamped to the frame bounds.
    pub fn centered(frame_width: u32, frame_height: u32, size: u32) -> Self {
        let x = (frame_width / 2).saturating_sub(size / 2);
        let y = (frame_height / 2).saturating_sub(size / 2);
        Self {
            x,
            y,
            width: size.min(frame_width - x),
            height: size.min(frame_height - y),
        }
    }

    /// Copy the region's pixels out of a frame into a tightly packed buffer.
    pub fn extract(&self, frame: &Frame) -> Vec<u8> {
        let stride = frame.width() as usize;
        let pixels = frame.pixels();
        let mut out = Vec::with_capacity((self.width as usize) * (self.height as usize));
        for row in self.y..self.y + self.height {
            let start = (row as usize) * stride + self.x as usize;
            out.extend_from_slice(&pixels[start..start + self.width as usize]);
        }
        out
    }

    /// Map region-local marker geometry back into frame coordinates.
    pub fn to_frame_coords(&self, quad: Quad) -> Quad {
        quad.offset(self.x as i32, self.y as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::Point;
    use proptest::prelude::*;

    #[test]
    fn test_centered_region_in_large_frame() {
        let region = ScanRegion::centered(1280, 720, 300);
        assert_eq!(region.x, 490);
        assert_eq!(region.y, 210);
        assert_eq!(region.width, 300);
        assert_eq!(region.height, 300);
    }

    #[test]
    fn test_region_clamped_when_frame_narrower_than_size() {
        // Frame narrower than the configured size: top-left anchored clamp.
        let region = ScanRegion::centered(200, 720, 300);
        assert_eq!(region.x, 0);
        assert_eq!(region.width, 200);
        assert_eq!(region.y, 210);
        assert_eq!(region.height, 300);
    }

    #[test]
    fn test_region_clamped_when_frame_smaller_both_axes() {
        let region = ScanRegion::centered(100, 80, 300);
        assert_eq!((region.x, region.y), (0, 0));
        assert_eq!((region.width, region.height), (100, 80));
    }

    #[test]
    fn test_extract_copies_expected_pixels() {
        // 4x4 frame with sequential pixel values
        let frame = Frame::from_raw(4, 4, (0..16).collect()).unwrap();
        let region = ScanRegion::centered(4, 4, 2);
        assert_eq!((region.x, region.y), (1, 1));
        assert_eq!(region.extract(&frame), vec![5, 6, 9, 10]);
    }

    #[test]
    fn test_extract_full_frame_when_region_larger() {
        let frame = Frame::from_raw(3, 2, (0..6).collect()).unwrap();
        let region = ScanRegion::centered(3, 2, 10);
        assert_eq!(region.extract(&frame), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_to_frame_coords_applies_offset() {
        let region = ScanRegion::centered(1280, 720, 300);
        let quad = Quad([
            Point { x: 0, y: 0 },
            Point { x: 10, y: 0 },
            Point { x: 10, y: 10 },
            Point { x: 0, y: 10 },
        ]);
        let mapped = region.to_frame_coords(quad);
        assert_eq!(mapped.0[0], Point { x: 490, y: 210 });
        assert_eq!(mapped.0[2], Point { x: 500, y: 220 });
    }

    proptest! {
        #[test]
        fn prop_region_origin_within_frame(
            frame_width in 1u32..4096,
            frame_height in 1u32..4096,
            size in 1u32..1024,
        ) {
            let region = ScanRegion::centered(frame_width, frame_height, size);
            prop_assert!(region.x <= frame_width);
            prop_assert!(region.y <= frame_height);
            prop_assert!(region.x + region.width <= frame_width);
            prop_assert!(region.y + region.height <= frame_height);
            prop_assert!(region.width <= size);
            prop_assert!(region.height <= size);
        }
    }
}
