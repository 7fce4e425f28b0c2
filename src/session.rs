// SPDX-License-Identifier: MPL-2.0
//! The editor session: one loaded photo plus all of its edit state, behind
//! a single facade the UI shell drives with raw input events.
//!
//! The session routes pointer input by the active tool (move strokes go to
//! the gesture interpreter, annotate strokes to the stroke history, sticker
//! drags to the overlay registry), keeps the transform model clamped, and
//! captures by-value [`ExportSnapshot`]s so exports are isolated from
//! concurrent edits.

use crate::config::Config;
use crate::domain::annotation::{frame_point_to_image, Brush, Stroke, StrokeHistory};
use crate::domain::geometry::{Bounds, Vec2};
use crate::domain::overlay::{Overlay, OverlayId, OverlayRegistry};
use crate::domain::source::PixelSource;
use crate::domain::style::{
    AdjustmentPercent, FilterPreset, ResolvedStyle, StyleState, VignetteStrength,
};
use crate::domain::transform::{Transform, TransformModel};
use crate::error::{Error, Result};
use crate::gesture;
use crate::render::{render_export, ExportSnapshot, ExportedImage, FrameDecoration};

/// The tool that currently owns single-pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolMode {
    /// Pan/zoom/rotate the photo.
    #[default]
    Move,
    /// Draw brush or eraser strokes.
    Annotate,
    /// Select and drag overlays.
    Sticker,
}

/// What a handled input event changed, for the UI's redraw decisions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    None,
    TransformChanged,
    /// An interaction finished and the transform got its final clamp.
    InteractionEnded,
    AnnotationChanged,
    OverlayChanged,
}

impl From<gesture::Effect> for Event {
    fn from(effect: gesture::Effect) -> Self {
        match effect {
            gesture::Effect::None => Event::None,
            gesture::Effect::TransformChanged => Event::TransformChanged,
            gesture::Effect::InteractionEnded => Event::InteractionEnded,
        }
    }
}

/// An in-progress sticker drag.
#[derive(Debug, Clone, Copy)]
struct OverlayDrag {
    id: OverlayId,
    /// Overlay-center minus grab-point, so the sticker does not jump under
    /// the pointer.
    grab_offset: Vec2,
}

/// One photo being edited.
#[derive(Debug, Clone)]
pub struct EditorSession {
    config: Config,
    model: TransformModel,
    gesture: gesture::State,
    strokes: StrokeHistory,
    overlays: OverlayRegistry,
    style: StyleState,
    brush: Brush,
    tool: ToolMode,
    source: Option<PixelSource>,
    decoration: Option<FrameDecoration>,
    overlay_drag: Option<OverlayDrag>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl EditorSession {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let model = TransformModel::new(config.effective_max_zoom());
        let gesture = gesture::State::new(
            config.effective_wheel_sensitivity(),
            config.effective_gesture_rotation(),
        );
        Self {
            config,
            model,
            gesture,
            strokes: StrokeHistory::default(),
            overlays: OverlayRegistry::default(),
            style: StyleState::default(),
            brush: Brush::default(),
            tool: ToolMode::Move,
            source: None,
            decoration: None,
            overlay_drag: None,
        }
    }

    // =========================================================================
    // Setup
    // =========================================================================

    /// Loads a new photo, replacing the current one.
    ///
    /// Edit state tied to the old photo (strokes, style, transform fit) is
    /// reset; overlays and the frame measurement are kept.
    pub fn load_image(&mut self, source: PixelSource) -> Result<()> {
        let (width, height) = match source.dimensions() {
            Some(dims) => dims,
            // Encoded sources decode once up front so a corrupt payload
            // fails at load time, not at export time.
            None => source.decode()?.dimensions(),
        };
        if width == 0 || height == 0 {
            return Err(Error::Decode("image has no pixels".to_string()));
        }
        let frame = self.model.frame_bounds();
        self.model = TransformModel::new(self.config.effective_max_zoom());
        if let Some(frame) = frame {
            self.model.set_frame_bounds(frame);
        }
        self.model
            .set_image_bounds(Bounds::new(width as f32, height as f32));
        self.strokes.clear();
        self.style = StyleState::default();
        self.source = Some(source);
        log::info!("loaded {width}x{height} image");
        Ok(())
    }

    /// Reports the frame's current size (called on every frame resize).
    pub fn set_frame_bounds(&mut self, bounds: Bounds) {
        self.model.set_frame_bounds(bounds);
    }

    /// Selects the active tool. Rotation-by-gesture is only available while
    /// the move tool owns the pointer.
    pub fn set_tool(&mut self, tool: ToolMode) {
        self.tool = tool;
        self.gesture.set_rotation_enabled(
            self.config.effective_gesture_rotation() && tool == ToolMode::Move,
        );
        self.overlay_drag = None;
    }

    #[must_use]
    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    pub fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
    }

    #[must_use]
    pub fn brush(&self) -> Brush {
        self.brush
    }

    pub fn set_decoration(&mut self, decoration: Option<FrameDecoration>) {
        self.decoration = decoration;
    }

    // =========================================================================
    // Input routing
    // =========================================================================

    /// Routes one gesture message by the active tool.
    pub fn handle_input(&mut self, msg: gesture::Message) -> Event {
        match self.tool {
            ToolMode::Move => self.gesture.handle(msg, &mut self.model).into(),
            ToolMode::Annotate => self.handle_annotate(msg),
            ToolMode::Sticker => self.handle_sticker(msg),
        }
    }

    fn handle_annotate(&mut self, msg: gesture::Message) -> Event {
        match msg {
            gesture::Message::PointerPressed(position) => {
                let Some(point) = self.frame_to_image(position) else {
                    return Event::None;
                };
                self.strokes.start_stroke(point, self.brush);
                Event::AnnotationChanged
            }
            gesture::Message::PointerMoved(position) => {
                if self.strokes.active_stroke().is_none() {
                    return Event::None;
                }
                let Some(point) = self.frame_to_image(position) else {
                    return Event::None;
                };
                self.strokes.extend_stroke(point);
                Event::AnnotationChanged
            }
            gesture::Message::PointerReleased | gesture::Message::PointerCancelled => {
                if self.strokes.active_stroke().is_none() {
                    return Event::None;
                }
                self.strokes.end_stroke();
                Event::AnnotationChanged
            }
            // Two-pointer and wheel input still drives the transform, with
            // rotation disabled outside the move tool.
            other => self.gesture.handle(other, &mut self.model).into(),
        }
    }

    fn handle_sticker(&mut self, msg: gesture::Message) -> Event {
        match msg {
            gesture::Message::PointerPressed(position) => {
                let Some(frame) = self.frame_bounds() else {
                    return Event::None;
                };
                let point = position - frame.center();
                // Topmost overlay under the pointer wins.
                let hit = self.overlays.overlays().iter().rev().find(|overlay| {
                    let half = overlay.half_size();
                    let d = point - overlay.position;
                    d.x.abs() <= half.x && d.y.abs() <= half.y
                });
                match hit {
                    Some(overlay) => {
                        self.overlay_drag = Some(OverlayDrag {
                            id: overlay.id,
                            grab_offset: overlay.position - point,
                        });
                        Event::None
                    }
                    None => Event::None,
                }
            }
            gesture::Message::PointerMoved(position) => {
                let (Some(drag), Some(frame)) = (self.overlay_drag, self.frame_bounds()) else {
                    return Event::None;
                };
                let point = position - frame.center();
                self.overlays
                    .move_to(drag.id, point + drag.grab_offset, frame);
                Event::OverlayChanged
            }
            gesture::Message::PointerReleased | gesture::Message::PointerCancelled => {
                if self.overlay_drag.take().is_none() {
                    return Event::None;
                }
                Event::OverlayChanged
            }
            other => self.gesture.handle(other, &mut self.model).into(),
        }
    }

    fn frame_to_image(&self, position: Vec2) -> Option<Vec2> {
        let image = self.model.image_bounds()?;
        let frame = self.model.frame_bounds()?;
        Some(frame_point_to_image(
            position,
            self.model.transform(),
            image,
            frame,
        ))
    }

    // =========================================================================
    // Annotations
    // =========================================================================

    /// Removes the most recently committed stroke.
    pub fn undo_stroke(&mut self) -> bool {
        self.strokes.undo_last().is_some()
    }

    /// Removes every stroke.
    pub fn clear_strokes(&mut self) {
        self.strokes.clear();
    }

    #[must_use]
    pub fn strokes(&self) -> &StrokeHistory {
        &self.strokes
    }

    // =========================================================================
    // Overlays
    // =========================================================================

    /// Adds a sticker at the frame center.
    pub fn add_overlay(&mut self, source: PixelSource) -> Result<OverlayId> {
        let frame = self
            .frame_bounds()
            .ok_or_else(|| Error::Render("frame not measured".to_string()))?;
        Ok(self.overlays.add(source, frame))
    }

    /// Moves a sticker, clamped to the frame.
    pub fn move_overlay(&mut self, id: OverlayId, position: Vec2) {
        if let Some(frame) = self.frame_bounds() {
            self.overlays.move_to(id, position, frame);
        }
    }

    pub fn remove_overlay(&mut self, id: OverlayId) {
        self.overlays.remove(id);
    }

    #[must_use]
    pub fn overlays(&self) -> &[Overlay] {
        self.overlays.overlays()
    }

    // =========================================================================
    // Style
    // =========================================================================

    pub fn set_preset(&mut self, preset: FilterPreset) {
        self.style.preset = preset;
    }

    /// Applies a preset suggested by name (e.g. from an auto-enhance hint).
    /// Unknown names are ignored.
    pub fn apply_suggested_preset(&mut self, name: &str) {
        match FilterPreset::by_name(name) {
            Some(preset) => self.style.preset = preset,
            None => log::warn!("ignoring unknown suggested preset {name:?}"),
        }
    }

    pub fn set_brightness(&mut self, value: i32) {
        self.style.finetune.brightness = AdjustmentPercent::new(value);
    }

    pub fn set_contrast(&mut self, value: i32) {
        self.style.finetune.contrast = AdjustmentPercent::new(value);
    }

    pub fn set_saturation(&mut self, value: i32) {
        self.style.finetune.saturation = AdjustmentPercent::new(value);
    }

    pub fn set_warmth(&mut self, value: i32) {
        self.style.finetune.warmth = AdjustmentPercent::new(value);
    }

    pub fn set_vignette(&mut self, value: f32) {
        self.style.finetune.vignette = VignetteStrength::new(value);
    }

    #[must_use]
    pub fn style(&self) -> &StyleState {
        &self.style
    }

    /// The effective style after merging preset and sliders.
    #[must_use]
    pub fn resolved_style(&self) -> ResolvedStyle {
        self.style.resolve()
    }

    // =========================================================================
    // Transform readout and direct edits
    // =========================================================================

    #[must_use]
    pub fn transform(&self) -> Transform {
        self.model.transform()
    }

    #[must_use]
    pub fn frame_bounds(&self) -> Option<Bounds> {
        self.model.frame_bounds()
    }

    #[must_use]
    pub fn image_bounds(&self) -> Option<Bounds> {
        self.model.image_bounds()
    }

    /// Rotates by a fixed step (e.g. a rotate-90° button).
    pub fn rotate_by(&mut self, degrees: f32) {
        self.model.rotate_by(degrees);
    }

    pub fn flip_horizontal(&mut self) {
        self.model.flip_horizontal();
    }

    pub fn flip_vertical(&mut self) {
        self.model.flip_vertical();
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Captures every render input by value.
    ///
    /// Edits made after this call cannot affect a render of the returned
    /// snapshot. An in-progress stroke is included as drawn so far.
    pub fn snapshot(&self) -> Result<ExportSnapshot> {
        let source = self
            .source
            .clone()
            .ok_or_else(|| Error::Render("no image loaded".to_string()))?;
        let image_bounds = self
            .model
            .image_bounds()
            .ok_or_else(|| Error::Render("image not measured".to_string()))?;
        let frame_bounds = self
            .model
            .frame_bounds()
            .ok_or_else(|| Error::Render("frame not measured".to_string()))?;

        let mut strokes: Vec<Stroke> = self.strokes.strokes().to_vec();
        if let Some(active) = self.strokes.active_stroke() {
            strokes.push(active.clone());
        }

        Ok(ExportSnapshot {
            source,
            image_bounds,
            frame_bounds,
            transform: self.model.transform(),
            style: self.resolved_style(),
            strokes,
            overlays: self.overlays.overlays().to_vec(),
            decoration: self.decoration,
            multiplier: self.config.effective_output_multiplier(),
        })
    }

    /// Renders the current state to a flattened raster.
    pub fn export(&self) -> Result<ExportedImage> {
        render_export(&self.snapshot()?)
    }

    /// Renders the current state and encodes it as PNG.
    pub fn export_png(&self) -> Result<Vec<u8>> {
        self.export()?.encode_png()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::color::Rgba;

    fn white_source(width: u32, height: u32) -> PixelSource {
        PixelSource::from_rgba(width, height, vec![255u8; (width * height * 4) as usize])
            .expect("valid buffer")
    }

    fn ready_session() -> EditorSession {
        let mut session = EditorSession::default();
        session.set_frame_bounds(Bounds::new(800.0, 600.0));
        session.load_image(white_source(1600, 1200)).expect("loads");
        session
    }

    #[test]
    fn load_fits_image_to_frame() {
        let session = ready_session();
        let transform = session.transform();
        assert!((transform.scale - 0.5).abs() < 1e-6);
        assert_eq!(transform.offset, Vec2::ZERO);
    }

    #[test]
    fn move_tool_routes_pointer_to_gesture() {
        let mut session = ready_session();
        session.handle_input(gesture::Message::Wheel {
            delta_y: -500.0,
            position: Vec2::new(400.0, 300.0),
        });
        session.handle_input(gesture::Message::PointerPressed(Vec2::new(100.0, 100.0)));
        let event = session.handle_input(gesture::Message::PointerMoved(Vec2::new(120.0, 100.0)));
        assert_eq!(event, Event::TransformChanged);
        assert!(session.transform().offset.x > 0.0);
        assert!(session.strokes().is_empty());
    }

    #[test]
    fn annotate_tool_records_strokes_in_image_space() {
        let mut session = ready_session();
        session.set_tool(ToolMode::Annotate);
        session.handle_input(gesture::Message::PointerPressed(Vec2::new(400.0, 300.0)));
        session.handle_input(gesture::Message::PointerMoved(Vec2::new(410.0, 300.0)));
        let event = session.handle_input(gesture::Message::PointerReleased);
        assert_eq!(event, Event::AnnotationChanged);

        let strokes = session.strokes().strokes();
        assert_eq!(strokes.len(), 1);
        // Frame center maps to image center; scale 0.5 doubles deltas.
        assert!(strokes[0].points[0].distance(Vec2::new(800.0, 600.0)) < 1e-3);
        assert!(strokes[0].points[1].distance(Vec2::new(820.0, 600.0)) < 1e-3);
        // None of this touched the transform.
        assert_eq!(session.transform().offset, Vec2::ZERO);
    }

    #[test]
    fn annotate_tool_still_allows_pinch_zoom_without_rotation() {
        let mut session = ready_session();
        session.set_tool(ToolMode::Annotate);
        session.handle_input(gesture::Message::PinchStarted {
            a: Vec2::new(300.0, 300.0),
            b: Vec2::new(500.0, 300.0),
        });
        session.handle_input(gesture::Message::PinchMoved {
            a: Vec2::new(400.0, 200.0),
            b: Vec2::new(400.0, 400.0),
        });
        // The pair rotated 90° but rotation is gated off outside Move.
        assert!(session.transform().rotation_degrees.abs() < 1e-3);
    }

    #[test]
    fn sticker_tool_drags_hit_overlay() {
        let mut session = ready_session();
        let id = session.add_overlay(white_source(100, 100)).expect("adds");
        session.set_tool(ToolMode::Sticker);

        // Grab the overlay slightly off its center, drag right by 50.
        session.handle_input(gesture::Message::PointerPressed(Vec2::new(410.0, 300.0)));
        session.handle_input(gesture::Message::PointerMoved(Vec2::new(460.0, 300.0)));
        session.handle_input(gesture::Message::PointerReleased);

        let overlay = session.overlays().iter().find(|o| o.id == id).unwrap();
        assert!((overlay.position.x - 50.0).abs() < 1e-3);
        assert!(overlay.position.y.abs() < 1e-3);
    }

    #[test]
    fn sticker_press_on_empty_space_is_inert() {
        let mut session = ready_session();
        session.add_overlay(white_source(100, 100)).expect("adds");
        session.set_tool(ToolMode::Sticker);

        session.handle_input(gesture::Message::PointerPressed(Vec2::new(10.0, 10.0)));
        let event = session.handle_input(gesture::Message::PointerMoved(Vec2::new(50.0, 50.0)));
        assert_eq!(event, Event::None);
        assert_eq!(session.overlays()[0].position, Vec2::ZERO);
    }

    #[test]
    fn suggested_preset_applies_known_and_ignores_unknown() {
        let mut session = ready_session();
        session.apply_suggested_preset("Noir");
        assert_eq!(session.style().preset.name, "noir");

        session.apply_suggested_preset("does-not-exist");
        assert_eq!(session.style().preset.name, "noir");
    }

    #[test]
    fn loading_new_image_resets_photo_state_but_keeps_overlays() {
        let mut session = ready_session();
        session.set_tool(ToolMode::Annotate);
        session.handle_input(gesture::Message::PointerPressed(Vec2::new(400.0, 300.0)));
        session.handle_input(gesture::Message::PointerReleased);
        session.set_brightness(40);
        let id = session.add_overlay(white_source(64, 64)).expect("adds");

        session.load_image(white_source(400, 400)).expect("loads");
        assert!(session.strokes().is_empty());
        assert!(session.style().finetune.is_neutral());
        assert!(session.overlays().iter().any(|o| o.id == id));
        // Refit to the 800x600 frame: cover scale is max(800/400, 600/400).
        assert!((session.transform().scale - 2.0).abs() < 1e-6);
    }

    #[test]
    fn corrupt_image_fails_at_load() {
        let mut session = EditorSession::default();
        session.set_frame_bounds(Bounds::new(800.0, 600.0));
        let err = session.load_image(PixelSource::from_encoded(vec![9, 9, 9]));
        assert!(matches!(err, Err(Error::Decode(_))));
    }

    #[test]
    fn snapshot_is_isolated_from_later_edits() {
        let mut session = ready_session();
        session.set_tool(ToolMode::Annotate);
        session.set_brush(Brush {
            color: Rgba::opaque(255, 0, 0),
            width: 6.0,
            is_eraser: false,
        });
        session.handle_input(gesture::Message::PointerPressed(Vec2::new(200.0, 200.0)));
        session.handle_input(gesture::Message::PointerReleased);

        let snapshot = session.snapshot().expect("snapshot");
        session.clear_strokes();
        session.set_vignette(0.9);

        assert_eq!(snapshot.strokes.len(), 1);
        assert_eq!(snapshot.style.vignette, 0.0);
    }

    #[test]
    fn snapshot_includes_in_progress_stroke() {
        let mut session = ready_session();
        session.set_tool(ToolMode::Annotate);
        session.handle_input(gesture::Message::PointerPressed(Vec2::new(300.0, 300.0)));
        session.handle_input(gesture::Message::PointerMoved(Vec2::new(320.0, 300.0)));

        let snapshot = session.snapshot().expect("snapshot");
        assert_eq!(snapshot.strokes.len(), 1);
        assert_eq!(snapshot.strokes[0].points.len(), 2);
    }

    #[test]
    fn snapshot_without_image_is_an_error() {
        let session = EditorSession::default();
        assert!(matches!(session.snapshot(), Err(Error::Render(_))));
    }

    #[test]
    fn export_uses_configured_multiplier() {
        let config = Config {
            output_multiplier: Some(1.0),
            ..Config::default()
        };
        let mut session = EditorSession::new(config);
        session.set_frame_bounds(Bounds::new(200.0, 100.0));
        session.load_image(white_source(400, 200)).expect("loads");
        let out = session.export().expect("exports");
        assert_eq!((out.width, out.height), (200, 100));
    }
}
