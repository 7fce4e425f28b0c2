// SPDX-License-Identifier: MPL-2.0
//! Placeable decorative overlays (stickers).
//!
//! Overlays live in frame-relative coordinates (position measured from the
//! frame center) and are deliberately independent of the image transform:
//! panning or zooming the photo does not move its stickers.

use crate::config::defaults;
use crate::domain::geometry::{Bounds, Vec2};
use crate::domain::source::PixelSource;

/// Session-unique overlay identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(u64);

impl OverlayId {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// One placed sticker.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub id: OverlayId,
    pub source: PixelSource,
    /// Center position relative to the frame center, frame pixels.
    pub position: Vec2,
    /// Display width in frame pixels.
    pub width: f32,
    /// Display height in frame pixels.
    pub height: f32,
    /// Rotation in degrees about the overlay's own center.
    pub rotation_degrees: f32,
    /// Extra uniform scale on top of width/height.
    pub scale: f32,
}

impl Overlay {
    /// Half-extents of the overlay's (unrotated) bounding box.
    #[must_use]
    pub fn half_size(&self) -> Vec2 {
        Vec2::new(
            self.width * self.scale * 0.5,
            self.height * self.scale * 0.5,
        )
    }
}

/// Owner of the session's overlays, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct OverlayRegistry {
    overlays: Vec<Overlay>,
    next_id: u64,
}

impl OverlayRegistry {
    /// Inserts a new overlay at the frame center.
    ///
    /// The default width is a fraction of the frame width with a lower
    /// bound; height preserves the source aspect ratio when known and
    /// falls back to square otherwise.
    pub fn add(&mut self, source: PixelSource, frame: Bounds) -> OverlayId {
        let width = (frame.width * defaults::OVERLAY_WIDTH_RATIO).max(defaults::OVERLAY_MIN_WIDTH);
        let height = match source.dimensions() {
            Some((w, h)) if w > 0 => width * h as f32 / w as f32,
            _ => width,
        };
        let id = OverlayId(self.next_id);
        self.next_id += 1;
        self.overlays.push(Overlay {
            id,
            source,
            position: Vec2::ZERO,
            width,
            height,
            rotation_degrees: 0.0,
            scale: 1.0,
        });
        id
    }

    /// Moves an overlay, clamping each axis so its bounding box stays
    /// fully inside the frame.
    pub fn move_to(&mut self, id: OverlayId, proposed: Vec2, frame: Bounds) {
        let Some(overlay) = self.overlays.iter_mut().find(|o| o.id == id) else {
            return;
        };
        overlay.position = clamp_to_frame(proposed, overlay.half_size(), frame);
    }

    /// Removes an overlay. Unknown ids are ignored.
    pub fn remove(&mut self, id: OverlayId) {
        self.overlays.retain(|o| o.id != id);
    }

    #[must_use]
    pub fn get(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.id == id)
    }

    /// Overlays in draw order (insertion order).
    #[must_use]
    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}

/// Clamps a frame-centered position so a box of `half_size` stays inside
/// the frame. Axes are independent; an overlay larger than the frame pins
/// to the center on that axis.
fn clamp_to_frame(position: Vec2, half_size: Vec2, frame: Bounds) -> Vec2 {
    let frame_half = frame.half();
    let range_x = (frame_half.x - half_size.x).max(0.0);
    let range_y = (frame_half.y - half_size.y).max(0.0);
    Vec2::new(
        position.x.clamp(-range_x, range_x),
        position.y.clamp(-range_y, range_y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Bounds {
        Bounds::new(800.0, 600.0)
    }

    fn source(w: u32, h: u32) -> PixelSource {
        PixelSource::from_rgba(w, h, vec![128u8; (w * h * 4) as usize]).unwrap()
    }

    #[test]
    fn add_centers_with_derived_size() {
        let mut registry = OverlayRegistry::default();
        let id = registry.add(source(100, 50), frame());
        let overlay = registry.get(id).unwrap();
        assert_eq!(overlay.position, Vec2::ZERO);
        assert!((overlay.width - 160.0).abs() < 1e-3); // 800 * 0.2
        assert!((overlay.height - 80.0).abs() < 1e-3); // aspect preserved
    }

    #[test]
    fn tiny_frame_still_yields_minimum_width() {
        let mut registry = OverlayRegistry::default();
        let id = registry.add(source(10, 10), Bounds::new(50.0, 50.0));
        let overlay = registry.get(id).unwrap();
        assert!((overlay.width - defaults::OVERLAY_MIN_WIDTH).abs() < 1e-3);
    }

    #[test]
    fn ids_are_unique_and_monotonic() {
        let mut registry = OverlayRegistry::default();
        let a = registry.add(source(10, 10), frame());
        let b = registry.add(source(10, 10), frame());
        assert!(b > a);
        registry.remove(a);
        let c = registry.add(source(10, 10), frame());
        assert!(c > b);
    }

    #[test]
    fn drag_clamps_to_right_edge_exactly() {
        let mut registry = OverlayRegistry::default();
        let id = registry.add(source(100, 100), frame());
        let half = registry.get(id).unwrap().half_size();

        registry.move_to(id, Vec2::new(10_000.0, 0.0), frame());
        let overlay = registry.get(id).unwrap();
        // x == frame_half_width - overlay_half_width, exactly
        assert_eq!(overlay.position.x, 400.0 - half.x);
        assert_eq!(overlay.position.y, 0.0);
    }

    #[test]
    fn drag_clamps_each_axis_independently() {
        let mut registry = OverlayRegistry::default();
        let id = registry.add(source(100, 100), frame());
        let half = registry.get(id).unwrap().half_size();

        registry.move_to(id, Vec2::new(-9999.0, 42.0), frame());
        let overlay = registry.get(id).unwrap();
        assert_eq!(overlay.position.x, -(400.0 - half.x));
        assert_eq!(overlay.position.y, 42.0);
    }

    #[test]
    fn oversized_overlay_pins_to_center() {
        let clamped = clamp_to_frame(
            Vec2::new(500.0, -500.0),
            Vec2::new(900.0, 700.0),
            Bounds::new(800.0, 600.0),
        );
        assert_eq!(clamped, Vec2::ZERO);
    }

    #[test]
    fn remove_unknown_id_is_ignored() {
        let mut registry = OverlayRegistry::default();
        let id = registry.add(source(10, 10), frame());
        registry.remove(id);
        registry.remove(id);
        assert!(registry.is_empty());
    }
}
