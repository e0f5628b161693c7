//! Frame capture.
//!
//! Encodes a tab's current BGRA frame as a real PNG and returns it
//! base64-encoded, ready for the chat panel or clipboard.

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{ImageBuffer, ImageFormat, Rgba};

use crate::types::errors::ScreenshotError;
use crate::types::frame::BufferSize;

/// An encoded screenshot.
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// PNG bytes, base64-encoded.
    pub data_base64: String,
    pub width: i32,
    pub height: i32,
}

/// Encode a BGRA frame (with the given row stride) as PNG.
pub fn encode_png(
    pixels: &[u8],
    size: BufferSize,
    stride: usize,
) -> Result<Screenshot, ScreenshotError> {
    if size.width <= 0 || size.height <= 0 || pixels.is_empty() {
        return Err(ScreenshotError::NoFrame);
    }
    if pixels.len() < stride * size.height as usize {
        return Err(ScreenshotError::EncodeFailed(format!(
            "frame is {} bytes, expected at least {}",
            pixels.len(),
            stride * size.height as usize
        )));
    }

    let width = size.width as u32;
    let height = size.height as u32;

    // BGRA rows (possibly padded to the stride) -> tightly packed RGBA.
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for row in 0..height as usize {
        let line = &pixels[row * stride..row * stride + width as usize * 4];
        for px in line.chunks_exact(4) {
            rgba.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
        }
    }

    let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_raw(width, height, rgba)
        .ok_or_else(|| ScreenshotError::EncodeFailed("pixel count mismatch".to_string()))?;

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| ScreenshotError::EncodeFailed(e.to_string()))?;

    Ok(Screenshot {
        data_base64: BASE64.encode(png),
        width: size.width,
        height: size.height,
    })
}
