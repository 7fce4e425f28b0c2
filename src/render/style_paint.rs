// SPDX-License-Identifier: MPL-2.0
//! Per-pixel application of resolved style effects.
//!
//! Operates on straight-alpha RGBA buffers before they enter the
//! compositor. Channels are processed as normalized floats and clamped
//! after every operation so one effect cannot feed out-of-range values
//! into the next. Alpha is never touched.
//!
//! Luma weights are the Rec.601 coefficients (0.299/0.587/0.114), matching
//! the `image` crate's grayscale conversion.

use crate::domain::style::Effect;
use image_rs::RgbaImage;

const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Full-scale red/blue shift applied at warmth ±1.0.
const WARMTH_SHIFT: f32 = 0.2;

/// Applies the effect list, in order, to every pixel of `image`.
pub fn apply_ops(image: &mut RgbaImage, ops: &[Effect]) {
    if ops.is_empty() {
        return;
    }
    for pixel in image.pixels_mut() {
        let mut r = f32::from(pixel[0]) / 255.0;
        let mut g = f32::from(pixel[1]) / 255.0;
        let mut b = f32::from(pixel[2]) / 255.0;
        for op in ops {
            (r, g, b) = apply_one(*op, r, g, b);
            r = r.clamp(0.0, 1.0);
            g = g.clamp(0.0, 1.0);
            b = b.clamp(0.0, 1.0);
        }
        pixel[0] = (r * 255.0).round() as u8;
        pixel[1] = (g * 255.0).round() as u8;
        pixel[2] = (b * 255.0).round() as u8;
    }
}

fn apply_one(op: Effect, r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    match op {
        Effect::Brightness(f) => (r * f, g * f, b * f),
        Effect::Contrast(f) => (
            (r - 0.5) * f + 0.5,
            (g - 0.5) * f + 0.5,
            (b - 0.5) * f + 0.5,
        ),
        Effect::Saturate(f) => {
            let luma = LUMA_R * r + LUMA_G * g + LUMA_B * b;
            (
                luma + (r - luma) * f,
                luma + (g - luma) * f,
                luma + (b - luma) * f,
            )
        }
        Effect::Warmth(w) => (r + w * WARMTH_SHIFT, g, b - w * WARMTH_SHIFT),
        Effect::HueRotate(degrees) => {
            // The standard filter-effects hue-rotation matrix.
            let (sin, cos) = degrees.to_radians().sin_cos();
            let nr = (0.213 + cos * 0.787 - sin * 0.213) * r
                + (0.715 - cos * 0.715 - sin * 0.715) * g
                + (0.072 - cos * 0.072 + sin * 0.928) * b;
            let ng = (0.213 - cos * 0.213 + sin * 0.143) * r
                + (0.715 + cos * 0.285 + sin * 0.140) * g
                + (0.072 - cos * 0.072 - sin * 0.283) * b;
            let nb = (0.213 - cos * 0.213 - sin * 0.787) * r
                + (0.715 - cos * 0.715 + sin * 0.715) * g
                + (0.072 + cos * 0.928 + sin * 0.072) * b;
            (nr, ng, nb)
        }
        Effect::Grayscale(amount) => {
            let luma = LUMA_R * r + LUMA_G * g + LUMA_B * b;
            (
                r + (luma - r) * amount,
                g + (luma - g) * amount,
                b + (luma - b) * amount,
            )
        }
        Effect::Sepia(amount) => {
            let sr = 0.393 * r + 0.769 * g + 0.189 * b;
            let sg = 0.349 * r + 0.686 * g + 0.168 * b;
            let sb = 0.272 * r + 0.534 * g + 0.131 * b;
            (
                r + (sr - r) * amount,
                g + (sg - g) * amount,
                b + (sb - b) * amount,
            )
        }
        Effect::Invert(amount) => (
            r + (1.0 - 2.0 * r) * amount,
            g + (1.0 - 2.0 * g) * amount,
            b + (1.0 - 2.0 * b) * amount,
        ),
    }
}
