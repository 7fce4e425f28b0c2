// SPDX-License-Identifier: MPL-2.0
//! Pixel sources for the base image and overlays.
//!
//! A source is data-addressable: it can be decoded again at any time so the
//! export renderer can redraw at a resolution independent of the preview.
//! Pixel payloads are shared via `Arc` so capturing an export snapshot never
//! copies image data.

use crate::error::{Error, Result};
use image_rs::RgbaImage;
use std::sync::Arc;

/// A redrawable reference to image pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelSource {
    /// Already-decoded RGBA8 pixels (row-major, `width * height * 4` bytes).
    Rgba {
        width: u32,
        height: u32,
        data: Arc<Vec<u8>>,
    },
    /// An encoded image (PNG, JPEG, WebP) decoded on demand.
    Encoded(Arc<Vec<u8>>),
}

impl PixelSource {
    /// Wraps raw RGBA8 pixels, validating the buffer length.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4));
        if expected != Some(data.len()) {
            return Err(Error::Decode(format!(
                "RGBA buffer length {} does not match {width}x{height}",
                data.len()
            )));
        }
        Ok(Self::Rgba {
            width,
            height,
            data: Arc::new(data),
        })
    }

    /// Wraps encoded image bytes without decoding them yet.
    #[must_use]
    pub fn from_encoded(bytes: Vec<u8>) -> Self {
        Self::Encoded(Arc::new(bytes))
    }

    /// Decodes the source into an RGBA image buffer.
    ///
    /// Fails with [`Error::Decode`] when the payload is corrupt; the
    /// export pipeline propagates this as whole-export failure.
    pub fn decode(&self) -> Result<RgbaImage> {
        match self {
            PixelSource::Rgba {
                width,
                height,
                data,
            } => RgbaImage::from_raw(*width, *height, data.as_ref().clone()).ok_or_else(|| {
                Error::Decode(format!("invalid RGBA buffer for {width}x{height}"))
            }),
            PixelSource::Encoded(bytes) => image_rs::load_from_memory(bytes)
                .map(|img| img.to_rgba8())
                .map_err(|e| Error::Decode(e.to_string())),
        }
    }

    /// Natural pixel dimensions, if they are knowable without a full decode.
    #[must_use]
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            PixelSource::Rgba { width, height, .. } => Some((*width, *height)),
            PixelSource::Encoded(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_source_round_trips() {
        let data = vec![255u8; 2 * 3 * 4];
        let source = PixelSource::from_rgba(2, 3, data).expect("valid buffer");
        assert_eq!(source.dimensions(), Some((2, 3)));
        let decoded = source.decode().expect("decodes");
        assert_eq!(decoded.dimensions(), (2, 3));
    }

    #[test]
    fn mismatched_buffer_is_rejected() {
        let err = PixelSource::from_rgba(4, 4, vec![0u8; 7]);
        assert!(matches!(err, Err(Error::Decode(_))));
    }

    #[test]
    fn corrupt_encoded_bytes_fail_to_decode() {
        let source = PixelSource::from_encoded(vec![1, 2, 3, 4]);
        assert!(matches!(source.decode(), Err(Error::Decode(_))));
    }
}
