// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the crate. Constants are organized by category.
//!
//! # Categories
//!
//! - **Zoom**: maximum zoom and wheel sensitivity
//! - **Export**: output resolution multiplier
//! - **Overlay**: sticker sizing relative to the frame
//! - **Brush**: freehand annotation defaults

// ==========================================================================
// Zoom Defaults
// ==========================================================================

/// Maximum zoom factor relative to the image's natural size.
pub const MAX_ZOOM: f32 = 5.0;

/// Scale factor applied per unit of wheel delta (`factor = 1 - delta * k`).
pub const WHEEL_ZOOM_SENSITIVITY: f32 = 0.002;

/// Minimum allowed wheel sensitivity.
pub const MIN_WHEEL_ZOOM_SENSITIVITY: f32 = 0.0005;

/// Maximum allowed wheel sensitivity.
pub const MAX_WHEEL_ZOOM_SENSITIVITY: f32 = 0.02;

// ==========================================================================
// Export Defaults
// ==========================================================================

/// Export raster size as a multiple of the on-screen frame size.
pub const OUTPUT_MULTIPLIER: f32 = 2.0;

/// Minimum output multiplier.
pub const MIN_OUTPUT_MULTIPLIER: f32 = 1.0;

/// Maximum output multiplier.
pub const MAX_OUTPUT_MULTIPLIER: f32 = 4.0;

// ==========================================================================
// Overlay Defaults
// ==========================================================================

/// A newly inserted overlay spans this fraction of the frame width.
pub const OVERLAY_WIDTH_RATIO: f32 = 0.2;

/// Lower bound for a newly inserted overlay's width, in frame pixels.
pub const OVERLAY_MIN_WIDTH: f32 = 24.0;

// ==========================================================================
// Brush Defaults
// ==========================================================================

/// Default freehand stroke width, in image pixels.
pub const BRUSH_WIDTH: f32 = 8.0;

/// Minimum freehand stroke width.
pub const MIN_BRUSH_WIDTH: f32 = 1.0;

/// Maximum freehand stroke width.
pub const MAX_BRUSH_WIDTH: f32 = 128.0;
