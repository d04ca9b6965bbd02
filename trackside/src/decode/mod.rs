//! QR decoding adapter.
//!
//! The kiosk does not implement QR decoding itself; it wraps an external
//! decoder behind the [`QrDecoder`] trait so the scan daemon can be tested
//! with scripted decoders and the real implementation can be swapped.
//!
//! The production implementation is [`RqrrDecoder`], built on the `rqrr`
//! crate over `image` grayscale buffers. It performs no bit-inversion
//! correction, trading a small recall loss for per-frame speed, and treats
//! every internal decode error as "no code found".

mod rqrr_decoder;

pub use rqrr_decoder::RqrrDecoder;

/// A point in pixel coordinates.
///
/// Coordinates are signed: decoders may report corners slightly outside the
/// buffer for codes clipped at an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Four corner points of a detected code, in source-buffer coordinates.
///
/// Order follows the decoder's convention: top-left, top-right,
/// bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quad(pub [Point; 4]);

impl Quad {
    /// Translate all four corners by the given offset.
    ///
    /// Used to map region-local geometry back into frame coordinates.
    pub fn offset(self, dx: i32, dy: i32) -> Quad {
        Quad(self.0.map(|p| Point {
            x: p.x + dx,
            y: p.y + dy,
        }))
    }
}

/// A successfully decoded code: its payload text and where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    /// Decoded payload text.
    pub text: String,
    /// Corner geometry in the coordinates of the decoded buffer.
    pub quad: Quad,
}

/// Decoder over a raw grayscale pixel buffer.
///
/// Implementations must be pure with respect to control flow: a failed
/// decode is `None`, never an error, so the scan loop always continues.
pub trait QrDecoder: Send + Sync {
    /// Attempt to decode a QR code from a tightly packed luma buffer.
    fn decode(&self, pixels: &[u8], width: u32, height: u32) -> Option<DecodedPayload>;
}
