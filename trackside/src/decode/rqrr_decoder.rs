//! QR decoding via the `rqrr` crate.

use rqrr::PreparedImage;
use tracing::debug;

use super::{DecodedPayload, Point, Quad, QrDecoder};

/// Production decoder backed by `rqrr`.
///
/// rqrr works on grayscale images and does not attempt inverted-module
/// recovery, matching the kiosk's "don't invert" configuration. Grid
/// detection and decode failures are logged at debug level and reported as
/// an absent code.
#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrDecoder;

impl RqrrDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl QrDecoder for RqrrDecoder {
    fn decode(&self, pixels: &[u8], width: u32, height: u32) -> Option<DecodedPayload> {
        let expected = (width as usize) * (height as usize);
        if pixels.len() < expected {
            debug!(
                len = pixels.len(),
                expected, "Pixel buffer too small for stated dimensions"
            );
            return None;
        }

        let img = image::GrayImage::from_raw(width, height, pixels[..expected].to_vec())?;
        let mut prepared = PreparedImage::prepare(img);
        let grids = prepared.detect_grids();
        debug!(count = grids.len(), "Detected candidate QR grids");

        for grid in grids {
            let bounds = grid.bounds;
            match grid.decode() {
                Ok((_, text)) => {
                    let quad = Quad(bounds.map(|p| Point { x: p.x, y: p.y }));
                    return Some(DecodedPayload { text, quad });
                }
                Err(e) => {
                    debug!(error = ?e, "Grid decode failed");
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_buffer_decodes_nothing() {
        let decoder = RqrrDecoder::new();
        assert!(decoder.decode(&vec![255u8; 64 * 64], 64, 64).is_none());
    }

    #[test]
    fn test_noise_buffer_decodes_nothing() {
        let decoder = RqrrDecoder::new();
        // Checkerboard noise: grids may be probed but nothing decodes.
        let pixels: Vec<u8> = (0..64 * 64)
            .map(|i| if (i + i / 64) % 2 == 0 { 0 } else { 255 })
            .collect();
        assert!(decoder.decode(&pixels, 64, 64).is_none());
    }

    #[test]
    fn test_undersized_buffer_is_rejected() {
        let decoder = RqrrDecoder::new();
        assert!(decoder.decode(&[0u8; 10], 64, 64).is_none());
    }
}
