// SPDX-License-Identifier: MPL-2.0
//! Deterministic CPU rasterization of the edited scene.

pub mod export;
pub mod style_paint;

pub use export::{render_export, ExportSnapshot, ExportedImage, FrameDecoration};
