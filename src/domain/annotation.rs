// SPDX-License-Identifier: MPL-2.0
//! Freehand annotation strokes, recorded in image-space coordinates.
//!
//! Strokes are stored in the image's own coordinate space so they move,
//! rotate, and scale with the image automatically when drawn through the
//! display transform. The inverse mapping that converts a frame point into
//! image space is [`frame_point_to_image`]; it delegates to
//! [`Transform::map_frame_to_image`] so it is exactly the inverse of the
//! renderer's forward transform.

use crate::domain::color::Rgba;
use crate::domain::geometry::{Bounds, Vec2};
use crate::domain::transform::Transform;

/// Brush settings for the next stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub color: Rgba,
    /// Stroke width in image pixels.
    pub width: f32,
    /// Eraser strokes are compositing instructions (destination removal
    /// within the annotation layer), not geometric deletions.
    pub is_eraser: bool,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            color: Rgba::BLACK,
            width: crate::config::defaults::BRUSH_WIDTH,
            is_eraser: false,
        }
    }
}

/// One continuous freehand path. Immutable once its interaction ends.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    /// Ordered points in image-space coordinates.
    pub points: Vec<Vec2>,
    pub color: Rgba,
    pub width: f32,
    pub is_eraser: bool,
}

/// Append-only ordered stroke history with an in-progress stroke slot.
#[derive(Debug, Clone, Default)]
pub struct StrokeHistory {
    committed: Vec<Stroke>,
    active: Option<Stroke>,
}

impl StrokeHistory {
    /// Begins a stroke at `point` (image space) with the given brush.
    ///
    /// Any stale in-progress stroke is superseded, matching the gesture
    /// contract that a new press re-initializes interaction state.
    pub fn start_stroke(&mut self, point: Vec2, brush: Brush) {
        self.active = Some(Stroke {
            points: vec![point],
            color: brush.color,
            width: brush.width.max(crate::config::defaults::MIN_BRUSH_WIDTH),
            is_eraser: brush.is_eraser,
        });
    }

    /// Appends a point to the in-progress stroke, if any.
    pub fn extend_stroke(&mut self, point: Vec2) {
        if let Some(stroke) = self.active.as_mut() {
            stroke.points.push(point);
        }
    }

    /// Commits the in-progress stroke to the history.
    pub fn end_stroke(&mut self) {
        if let Some(stroke) = self.active.take() {
            self.committed.push(stroke);
        }
    }

    /// Removes the most recently committed stroke.
    pub fn undo_last(&mut self) -> Option<Stroke> {
        self.committed.pop()
    }

    /// Empties the history (and drops any in-progress stroke).
    pub fn clear(&mut self) {
        self.committed.clear();
        self.active = None;
    }

    /// Committed strokes in draw order.
    #[must_use]
    pub fn strokes(&self) -> &[Stroke] {
        &self.committed
    }

    /// The stroke currently being drawn, if any.
    #[must_use]
    pub fn active_stroke(&self) -> Option<&Stroke> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.committed.is_empty() && self.active.is_none()
    }
}

/// Converts a frame-space point into image space under `transform`.
///
/// This is the correctness-critical contract of the annotation surface:
/// it must be the exact algebraic inverse of the forward display mapping,
/// or strokes visually swim relative to the image during pan/zoom/rotate.
#[must_use]
pub fn frame_point_to_image(
    point: Vec2,
    transform: Transform,
    image: Bounds,
    frame: Bounds,
) -> Vec2 {
    transform.map_frame_to_image(point, image, frame)
}
