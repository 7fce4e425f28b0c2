// SPDX-License-Identifier: MPL-2.0
//! `framelens` is the headless core of an interactive photo editor.
//!
//! It owns the 2D display transform (pan/zoom/rotate/flip under a cover
//! constraint), a gesture interpreter for pointer and touch input, brush
//! annotations, sticker overlays, filter-plus-finetune styling, and a
//! deterministic CPU export renderer. A UI shell feeds raw input events
//! into an [`session::EditorSession`] and draws from its state.

#![doc(html_root_url = "https://docs.rs/framelens/0.1.0")]

pub mod config;
pub mod domain;
pub mod error;
pub mod gesture;
pub mod render;
pub mod session;

pub use domain::annotation::{Brush, Stroke, StrokeHistory};
pub use domain::color::Rgba;
pub use domain::geometry::{Bounds, Vec2};
pub use domain::overlay::{Overlay, OverlayId, OverlayRegistry};
pub use domain::source::PixelSource;
pub use domain::style::{FilterPreset, ResolvedStyle, StyleState};
pub use domain::transform::{Transform, TransformModel};
pub use error::{Error, Result};
pub use render::{render_export, ExportSnapshot, ExportedImage, FrameDecoration};
pub use session::{EditorSession, ToolMode};
