// SPDX-License-Identifier: MPL-2.0
//! Still capture of the shared playback surface.
//!
//! When a player loses the surface, its last decoded frame is frozen into a
//! [`Thumbnail`] and left behind as the node's background, so the tile keeps
//! showing the moment the viewer last saw. The capture letterboxes the frame
//! into the tile's box: full width, vertically centered, transparent bars.

use crate::error::SnapshotError;
use crate::video::backend::RawFrame;
use image_rs::imageops::FilterType;
use image_rs::{DynamicImage, ImageBuffer, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;

/// An encoded still image sized to a stage node's box.
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    /// PNG-encoded image data (shared reference to avoid expensive clones).
    pub png: Arc<Vec<u8>>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl Thumbnail {
    #[must_use]
    pub fn new(png: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            png: Arc::new(png),
            width,
            height,
        }
    }
}

/// Letterboxes a decoded frame into a `target_width` × `target_height` box
/// and encodes it as PNG.
///
/// The frame is scaled to the full target width, keeping its aspect ratio,
/// then centered vertically on a transparent canvas. Frames wider than tall
/// leave transparent bars above and below, matching how the live surface is
/// fitted over a tile.
///
/// # Errors
///
/// Returns a [`SnapshotError`] if the frame data is malformed, the target
/// box is degenerate, or PNG encoding fails.
pub fn capture(
    frame: &RawFrame,
    target_width: u32,
    target_height: u32,
) -> Result<Thumbnail, SnapshotError> {
    if frame.width == 0 || frame.height == 0 {
        return Err(SnapshotError::InvalidFrame);
    }
    if target_width == 0 || target_height == 0 {
        return Err(SnapshotError::InvalidFrame);
    }

    let source: ImageBuffer<Rgba<u8>, _> =
        ImageBuffer::from_raw(frame.width, frame.height, (*frame.rgba).clone())
            .ok_or(SnapshotError::InvalidFrame)?;

    // Scale to the full target width, preserving aspect ratio.
    let ratio = f64::from(frame.width) / f64::from(frame.height);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scaled_height = ((f64::from(target_width) / ratio).round() as u32).max(1);

    let scaled = DynamicImage::ImageRgba8(source).resize_exact(
        target_width,
        scaled_height,
        FilterType::Lanczos3,
    );

    // Center vertically on a transparent canvas.
    let mut canvas = RgbaImage::new(target_width, target_height);
    let offset_y = (i64::from(target_height) - i64::from(scaled_height)) / 2;
    image_rs::imageops::overlay(&mut canvas, &scaled.to_rgba8(), 0, offset_y);

    let mut png = Vec::new();
    DynamicImage::ImageRgba8(canvas)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| SnapshotError::Encode(e.to_string()))?;

    Ok(Thumbnail::new(png, target_width, target_height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(width: u32, height: u32, rgba: [u8; 4]) -> RawFrame {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&rgba);
        }
        RawFrame::from_rgba(width, height, data)
    }

    #[test]
    fn capture_matches_target_box() {
        let frame = solid_frame(16, 9, [200, 10, 10, 255]);
        let thumb = capture(&frame, 160, 120).unwrap();
        assert_eq!(thumb.width, 160);
        assert_eq!(thumb.height, 120);

        let decoded = image_rs::load_from_memory(&thumb.png).unwrap();
        assert_eq!(decoded.width(), 160);
        assert_eq!(decoded.height(), 120);
    }

    #[test]
    fn wide_frame_is_letterboxed_vertically() {
        let frame = solid_frame(32, 8, [10, 200, 10, 255]);
        let thumb = capture(&frame, 32, 32).unwrap();

        let decoded = image_rs::load_from_memory(&thumb.png).unwrap().to_rgba8();
        // 32x8 scaled to width 32 keeps height 8, centered at y = 12..20.
        assert_eq!(decoded.get_pixel(0, 0).0[3], 0, "top bar is transparent");
        assert_eq!(decoded.get_pixel(0, 31).0[3], 0, "bottom bar is transparent");
        assert_eq!(decoded.get_pixel(16, 16).0, [10, 200, 10, 255]);
    }

    #[test]
    fn zero_sized_frame_is_rejected() {
        let frame = RawFrame::from_rgba(0, 0, Vec::new());
        assert_eq!(capture(&frame, 64, 64), Err(SnapshotError::InvalidFrame));
    }

    #[test]
    fn zero_sized_target_is_rejected() {
        let frame = solid_frame(4, 4, [0, 0, 0, 255]);
        assert_eq!(capture(&frame, 0, 64), Err(SnapshotError::InvalidFrame));
    }
}
