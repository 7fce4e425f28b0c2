// SPDX-License-Identifier: MPL-2.0
//! The interactive transform model: pan, zoom, rotation, and axis flips for
//! the loaded image, constrained so the image's rotated bounding box always
//! covers the frame.
//!
//! All state changes funnel through [`TransformModel::clamped`], which is the
//! single invariant-enforcing function. Input handlers never mutate a
//! [`Transform`] directly.
//!
//! ## Coordinate spaces
//!
//! - *Image space*: origin at the image's top-left corner, natural pixels.
//! - *Frame space*: origin at the frame's top-left corner, frame pixels.
//! - *Frame-centered space*: origin at the frame center. [`Transform::offset`]
//!   and all gesture pivots live here.
//!
//! The forward display mapping is `translate(frame center + offset)` ∘ `flip`
//! ∘ `rotate` ∘ `scale`, anchored at the image center. The renderer and the
//! annotation inverse mapping both derive from [`Transform::display_matrix`]
//! so they can never disagree.

use crate::config::defaults;
use crate::domain::geometry::{normalize_degrees, rotated_extent, Bounds, Vec2};

// =============================================================================
// Transform
// =============================================================================

/// The affine state applied to the base image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Displacement of the image center from the frame center, frame pixels.
    pub offset: Vec2,
    /// Uniform scale factor; always strictly positive after clamping.
    pub scale: f32,
    /// Rotation in degrees, normalized into (-180, 180].
    pub rotation_degrees: f32,
    /// Mirror across the vertical axis.
    pub flip_x: bool,
    /// Mirror across the horizontal axis.
    pub flip_y: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
            rotation_degrees: 0.0,
            flip_x: false,
            flip_y: false,
        }
    }
}

/// Row-major 2x3 affine matrix mapping image-space points to output pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMatrix {
    pub sx: f32,
    pub kx: f32,
    pub ky: f32,
    pub sy: f32,
    pub tx: f32,
    pub ty: f32,
}

impl DisplayMatrix {
    /// Maps an image-space point to output-space.
    #[must_use]
    pub fn map(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.sx * p.x + self.kx * p.y + self.tx,
            self.ky * p.x + self.sy * p.y + self.ty,
        )
    }
}

impl Transform {
    /// The forward display matrix at the given output multiplier.
    ///
    /// `multiplier` is 1 for the on-screen preview; the export renderer
    /// passes its resolution multiplier so pan and scale grow with the
    /// output surface.
    #[must_use]
    pub fn display_matrix(&self, image: Bounds, frame: Bounds, multiplier: f32) -> DisplayMatrix {
        let k = self.scale * multiplier;
        let radians = self.rotation_degrees.to_radians();
        let (sin, cos) = radians.sin_cos();
        let fx = if self.flip_x { -1.0 } else { 1.0 };
        let fy = if self.flip_y { -1.0 } else { 1.0 };

        // Linear part: flip ∘ rotate ∘ scale.
        let sx = fx * cos * k;
        let kx = -fx * sin * k;
        let ky = fy * sin * k;
        let sy = fy * cos * k;

        let translation = (frame.center() + self.offset) * multiplier;
        let image_center = image.center();
        DisplayMatrix {
            sx,
            kx,
            ky,
            sy,
            tx: translation.x - sx * image_center.x - kx * image_center.y,
            ty: translation.y - ky * image_center.x - sy * image_center.y,
        }
    }

    /// Maps an image-space point to frame-space (preview scale).
    #[must_use]
    pub fn map_image_to_frame(&self, p: Vec2, image: Bounds, frame: Bounds) -> Vec2 {
        self.display_matrix(image, frame, 1.0).map(p)
    }

    /// Maps a frame-space point back to image-space.
    ///
    /// Exact algebraic inverse of [`Self::map_image_to_frame`], applied in
    /// reverse composition order: untranslate, unflip, unrotate, unscale,
    /// then shift from center-relative to top-left-relative.
    #[must_use]
    pub fn map_frame_to_image(&self, p: Vec2, image: Bounds, frame: Bounds) -> Vec2 {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return image.center();
        }
        let fx = if self.flip_x { -1.0 } else { 1.0 };
        let fy = if self.flip_y { -1.0 } else { 1.0 };

        let v = p - (frame.center() + self.offset);
        let v = Vec2::new(v.x * fx, v.y * fy);
        let radians = (-self.rotation_degrees).to_radians();
        let (sin, cos) = radians.sin_cos();
        let v = Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos);
        let v = v * (1.0 / self.scale);
        v + image.center()
    }
}

// =============================================================================
// TransformModel
// =============================================================================

/// Owner of the session's [`Transform`] and its geometric constraints.
///
/// While either the image or the frame is unmeasured, every operation is a
/// deferred no-op: the model simply keeps its current state.
#[derive(Debug, Clone)]
pub struct TransformModel {
    transform: Transform,
    image_bounds: Option<Bounds>,
    frame_bounds: Option<Bounds>,
    /// Set once the initial fit has run; later frame resizes re-clamp but
    /// never discard the user's pan/zoom.
    fitted: bool,
    max_zoom: f32,
}

impl Default for TransformModel {
    fn default() -> Self {
        Self::new(defaults::MAX_ZOOM)
    }
}

impl TransformModel {
    #[must_use]
    pub fn new(max_zoom: f32) -> Self {
        Self {
            transform: Transform::default(),
            image_bounds: None,
            frame_bounds: None,
            fitted: false,
            max_zoom: max_zoom.max(1.0),
        }
    }

    /// The current transform.
    #[must_use]
    pub fn transform(&self) -> Transform {
        self.transform
    }

    #[must_use]
    pub fn image_bounds(&self) -> Option<Bounds> {
        self.image_bounds
    }

    #[must_use]
    pub fn frame_bounds(&self) -> Option<Bounds> {
        self.frame_bounds
    }

    #[must_use]
    pub fn max_zoom(&self) -> f32 {
        self.max_zoom
    }

    /// Whether both image and frame have been measured.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(
            (self.image_bounds, self.frame_bounds),
            (Some(image), Some(frame)) if image.is_measurable() && frame.is_measurable()
        )
    }

    /// Records the natural size of a newly loaded image.
    ///
    /// The first time both image and frame are known the transform is fit
    /// to cover the frame; loading a different image re-fits.
    pub fn set_image_bounds(&mut self, bounds: Bounds) {
        if self.image_bounds != Some(bounds) {
            self.fitted = false;
        }
        self.image_bounds = Some(bounds);
        self.fit_or_reclamp();
    }

    /// Records the frame size after a container resize or aspect change.
    ///
    /// Distinguished from the one-time initial fit: an already-fitted model
    /// only re-clamps, preserving user pan/zoom.
    pub fn set_frame_bounds(&mut self, bounds: Bounds) {
        self.frame_bounds = Some(bounds);
        self.fit_or_reclamp();
    }

    fn fit_or_reclamp(&mut self) {
        if !self.is_ready() {
            return;
        }
        if self.fitted {
            self.transform = self.clamped(self.transform, Vec2::ZERO);
        } else {
            self.fit_to_frame();
        }
    }

    /// Minimal uniform cover scale at zero pan/rotation/flip.
    fn fit_to_frame(&mut self) {
        let (Some(image), Some(frame)) = (self.image_bounds, self.frame_bounds) else {
            return;
        };
        let scale = cover_scale(image, frame);
        self.transform = Transform {
            scale: if scale > 0.0 { scale } else { 1.0 },
            ..Transform::default()
        };
        self.fitted = true;
        log::debug!(
            "fit image {}x{} to frame {}x{} at scale {scale}",
            image.width,
            image.height,
            frame.width,
            frame.height
        );
    }

    /// The smallest scale at which the rotated image's bounding box still
    /// covers the frame.
    ///
    /// A zero dimension contributes no constraint rather than producing
    /// NaN or infinity.
    #[must_use]
    pub fn min_scale_to_cover(&self, rotation_degrees: f32) -> f32 {
        let (Some(image), Some(frame)) = (self.image_bounds, self.frame_bounds) else {
            return 0.0;
        };
        let extent = rotated_extent(image, rotation_degrees);
        let sx = safe_ratio(frame.width, extent.width);
        let sy = safe_ratio(frame.height, extent.height);
        sx.max(sy)
    }

    /// Clamps a candidate transform into the valid region.
    ///
    /// `pivot` is the interaction's anchor in frame-centered coordinates;
    /// when the scale has to be corrected, pan is re-derived so the world
    /// point under the pivot stays put. Idempotent, and total over finite
    /// inputs (non-finite components are sanitized instead of propagated).
    #[must_use]
    pub fn clamped(&self, candidate: Transform, pivot: Vec2) -> Transform {
        if !self.is_ready() {
            return candidate;
        }
        let image = self.image_bounds.unwrap_or_default();
        let frame = self.frame_bounds.unwrap_or_default();

        let rotation = normalize_degrees(candidate.rotation_degrees);
        let min_scale = self.min_scale_to_cover(rotation);
        let floor = if min_scale > 0.0 {
            min_scale
        } else {
            f32::MIN_POSITIVE
        };
        // The cover constraint wins over the zoom ceiling when they conflict
        // (tiny image in a huge frame).
        let ceiling = self.max_zoom.max(floor);

        let proposed = candidate.scale;
        let mut offset = candidate.offset;
        if !offset.x.is_finite() {
            offset.x = 0.0;
        }
        if !offset.y.is_finite() {
            offset.y = 0.0;
        }

        let scale = if proposed.is_finite() && proposed > 0.0 {
            proposed.clamp(floor, ceiling)
        } else {
            floor
        };
        if proposed.is_finite() && proposed > 0.0 && scale != proposed {
            // Keep the world point under the pivot fixed across the correction.
            offset = pivot + (offset - pivot) * (scale / proposed);
        }

        let extent = rotated_extent(image, rotation);
        let max_pan_x = ((extent.width * scale - frame.width) * 0.5).max(0.0);
        let max_pan_y = ((extent.height * scale - frame.height) * 0.5).max(0.0);
        offset.x = offset.x.clamp(-max_pan_x, max_pan_x);
        offset.y = offset.y.clamp(-max_pan_y, max_pan_y);

        Transform {
            offset,
            scale,
            rotation_degrees: rotation,
            flip_x: candidate.flip_x,
            flip_y: candidate.flip_y,
        }
    }

    /// Clamps and stores a candidate transform. No-op until bounds are known.
    pub fn apply(&mut self, candidate: Transform, pivot: Vec2) {
        if !self.is_ready() {
            return;
        }
        self.transform = self.clamped(candidate, pivot);
    }

    /// Re-runs the clamp on the current state (end-of-interaction cleanup).
    pub fn reclamp(&mut self) {
        self.apply(self.transform, Vec2::ZERO);
    }

    /// Translates the image by `delta` frame pixels.
    pub fn pan_by(&mut self, delta: Vec2) {
        let mut candidate = self.transform;
        candidate.offset = candidate.offset + delta;
        self.apply(candidate, Vec2::ZERO);
    }

    /// Scales by `factor` anchored at `pivot` (frame-centered coordinates).
    pub fn zoom_by(&mut self, factor: f32, pivot: Vec2) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let mut candidate = self.transform;
        candidate.scale *= factor;
        candidate.offset = pivot + (candidate.offset - pivot) * factor;
        self.apply(candidate, pivot);
    }

    /// Rotates by `delta` degrees about the frame center.
    pub fn rotate_by(&mut self, delta: f32) {
        let mut candidate = self.transform;
        candidate.rotation_degrees += delta;
        self.apply(candidate, Vec2::ZERO);
    }

    /// Sets an absolute rotation angle about the frame center.
    pub fn set_rotation(&mut self, degrees: f32) {
        let mut candidate = self.transform;
        candidate.rotation_degrees = degrees;
        self.apply(candidate, Vec2::ZERO);
    }

    /// Mirrors across the vertical axis.
    pub fn flip_horizontal(&mut self) {
        let mut candidate = self.transform;
        candidate.flip_x = !candidate.flip_x;
        candidate.offset.x = -candidate.offset.x;
        self.apply(candidate, Vec2::ZERO);
    }

    /// Mirrors across the horizontal axis.
    pub fn flip_vertical(&mut self) {
        let mut candidate = self.transform;
        candidate.flip_y = !candidate.flip_y;
        candidate.offset.y = -candidate.offset.y;
        self.apply(candidate, Vec2::ZERO);
    }
}

/// `max(fw/iw, fh/ih)` with zero dimensions treated as "no constraint".
fn cover_scale(image: Bounds, frame: Bounds) -> f32 {
    safe_ratio(frame.width, image.width).max(safe_ratio(frame.height, image.height))
}

fn safe_ratio(numerator: f32, denominator: f32) -> f32 {
    if numerator > 0.0 && denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}
