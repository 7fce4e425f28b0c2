// SPDX-License-Identifier: MPL-2.0
//! Domain layer: the editing engine's value objects and state owners.
//!
//! Everything in here is pure data and math with no rendering or I/O,
//! so the whole layer is testable without a UI or a pixel buffer.

pub mod annotation;
pub mod color;
pub mod geometry;
pub mod overlay;
pub mod source;
pub mod style;
pub mod transform;

pub use annotation::{Stroke, StrokeHistory};
pub use color::Rgba;
pub use geometry::{Bounds, Vec2};
pub use overlay::{Overlay, OverlayId, OverlayRegistry};
pub use source::PixelSource;
pub use style::{Effect, FilterPreset, Finetune, ResolvedStyle, StyleState};
pub use transform::{Transform, TransformModel};
