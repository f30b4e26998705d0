//! Framebuffer dumps returned by `SSHOT`.

use crate::ProtocolError;

/// Display width in pixels.
pub const SCREEN_WIDTH: usize = 320;
/// Display height in pixels.
pub const SCREEN_HEIGHT: usize = 320;
/// Size of a full RGB565 framebuffer dump.
pub const FRAMEBUFFER_LEN: usize = SCREEN_WIDTH * SCREEN_HEIGHT * 2;

/// A validated 320x320 RGB565 (little-endian) framebuffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screenshot {
    pixels: Vec<u8>,
}

impl Screenshot {
    /// Wrap a raw dump, rejecting anything that is not exactly one frame.
    pub fn from_rgb565(pixels: Vec<u8>) -> Result<Self, ProtocolError> {
        if pixels.len() != FRAMEBUFFER_LEN {
            return Err(ProtocolError::MalformedPayload {
                what: "framebuffer",
                reason: format!("expected {FRAMEBUFFER_LEN} bytes, got {}", pixels.len()),
            });
        }
        Ok(Self { pixels })
    }

    /// The raw RGB565 bytes.
    pub fn as_rgb565(&self) -> &[u8] {
        &self.pixels
    }

    /// Expand to 8-bit RGB, row-major from the top-left pixel.
    pub fn to_rgb888(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SCREEN_WIDTH * SCREEN_HEIGHT * 3);
        for px in self.pixels.chunks_exact(2) {
            let c = u16::from_le_bytes([px[0], px[1]]);
            out.push((((c >> 11) & 0x1f) << 3) as u8);
            out.push((((c >> 5) & 0x3f) << 2) as u8);
            out.push(((c & 0x1f) << 3) as u8);
        }
        out
    }

    /// Encode as a binary PPM (P6) image.
    pub fn to_ppm(&self) -> Vec<u8> {
        let mut out = format!("P6\n{SCREEN_WIDTH} {SCREEN_HEIGHT}\n255\n").into_bytes();
        out.extend_from_slice(&self.to_rgb888());
        out
    }
}
