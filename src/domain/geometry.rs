// SPDX-License-Identifier: MPL-2.0
//! Geometry primitives shared by the transform model and the renderer.
//!
//! Coordinates are `f32` frame or image pixels. Angles are degrees,
//! normalized into the half-open interval (-180, 180].

use std::ops::{Add, Mul, Neg, Sub};

// =============================================================================
// Vec2
// =============================================================================

/// A 2D vector / point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Distance to another point.
    #[must_use]
    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    /// Midpoint between two points.
    #[must_use]
    pub fn midpoint(self, other: Vec2) -> Vec2 {
        Vec2::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    /// Angle of the segment from `self` to `other`, in degrees.
    #[must_use]
    pub fn angle_to(self, other: Vec2) -> f32 {
        (other.y - self.y).atan2(other.x - self.x).to_degrees()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

// =============================================================================
// Bounds
// =============================================================================

/// A width/height pair: the natural image size or the viewing frame size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions are finite and strictly positive.
    ///
    /// A zero-sized frame or image is a legitimate "not yet measured"
    /// state, not an error; callers treat it as the absence of a
    /// covering constraint.
    #[must_use]
    pub fn is_measurable(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// The center point, with the origin at the top-left corner.
    #[must_use]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Half-extents on each axis.
    #[must_use]
    pub fn half(self) -> Vec2 {
        self.center()
    }
}

// =============================================================================
// Angles
// =============================================================================

/// Normalizes an angle in degrees into (-180, 180].
#[must_use]
pub fn normalize_degrees(degrees: f32) -> f32 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Axis-aligned extent of `bounds` rotated by `degrees` about its center.
///
/// This is the classic |cos|/|sin| bounding box; it is what the cover
/// constraint and the pan limits are computed from.
#[must_use]
pub fn rotated_extent(bounds: Bounds, degrees: f32) -> Bounds {
    let radians = degrees.to_radians();
    let cos = radians.cos().abs();
    let sin = radians.sin().abs();
    Bounds::new(
        bounds.width * cos + bounds.height * sin,
        bounds.width * sin + bounds.height * cos,
    )
}
