// SPDX-License-Identifier: MPL-2.0
//! Gesture interpreter: converts raw pointer/touch sequences into clamped
//! transform updates.
//!
//! Modeled as an explicit state machine (Idle → Interacting → Idle) with one
//! transition per input message, so the pivot/baseline bookkeeping is
//! auditable in isolation from any UI framework. All deltas are computed
//! incrementally against the previous move event, never against the
//! interaction's start — the distance/angle/centroid baselines update on
//! every move, which avoids accumulating-error divergence under noisy input.
//!
//! Positions arrive in frame coordinates (origin at the frame's top-left).
//! Pivots handed to the transform model are frame-centered.

use crate::config::defaults;
use crate::domain::geometry::{normalize_degrees, Vec2};
use crate::domain::transform::TransformModel;

/// Two-pointer distances below this are treated as degenerate.
const MIN_PINCH_DISTANCE: f32 = 1.0;

/// Interaction phases.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Phase {
    #[default]
    Idle,
    /// Single-pointer pan; `last` is the previous move's position.
    Panning { last: Vec2 },
    /// Two-pointer pinch/rotate; baselines from the previous move.
    Pinching {
        last_distance: f32,
        last_angle: f32,
        last_centroid: Vec2,
    },
}

/// Gesture interpreter state.
#[derive(Debug, Clone)]
pub struct State {
    phase: Phase,
    /// Wheel zoom sensitivity (`factor = 1 - delta_y * k`).
    wheel_sensitivity: f32,
    /// Whether two-pointer gestures may rotate (disabled for some tools).
    rotation_enabled: bool,
}

impl Default for State {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            wheel_sensitivity: defaults::WHEEL_ZOOM_SENSITIVITY,
            rotation_enabled: true,
        }
    }
}

/// Messages for the gesture interpreter.
#[derive(Debug, Clone, Copy)]
pub enum Message {
    /// Single pointer pressed. Always re-initializes interaction state.
    PointerPressed(Vec2),
    /// Single pointer moved.
    PointerMoved(Vec2),
    /// Single pointer released.
    PointerReleased,
    /// Pointer left the surface or the interaction was cancelled.
    PointerCancelled,
    /// Wheel/scroll zoom at a cursor position.
    Wheel { delta_y: f32, position: Vec2 },
    /// Second pointer went down; both positions given.
    PinchStarted { a: Vec2, b: Vec2 },
    /// Two-pointer move.
    PinchMoved { a: Vec2, b: Vec2 },
    /// A pointer of the pair lifted.
    PinchEnded,
}

/// Effects produced by gesture handling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// No observable change.
    None,
    /// The transform changed; the preview should refresh.
    TransformChanged,
    /// The interaction finished and a final clamp ran.
    InteractionEnded,
}

impl State {
    #[must_use]
    pub fn new(wheel_sensitivity: f32, rotation_enabled: bool) -> Self {
        Self {
            phase: Phase::Idle,
            wheel_sensitivity: wheel_sensitivity.clamp(
                defaults::MIN_WHEEL_ZOOM_SENSITIVITY,
                defaults::MAX_WHEEL_ZOOM_SENSITIVITY,
            ),
            rotation_enabled,
        }
    }

    /// Enables or disables rotation-by-gesture (tool-mode dependent).
    pub fn set_rotation_enabled(&mut self, enabled: bool) {
        self.rotation_enabled = enabled;
    }

    #[must_use]
    pub fn rotation_enabled(&self) -> bool {
        self.rotation_enabled
    }

    /// Whether an interaction is currently in progress.
    #[must_use]
    pub fn is_interacting(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Handles one input message against the transform model.
    pub fn handle(&mut self, msg: Message, model: &mut TransformModel) -> Effect {
        match msg {
            Message::PointerPressed(position) => {
                // A new press supersedes any stale interaction.
                self.phase = Phase::Panning { last: position };
                Effect::None
            }
            Message::PointerMoved(position) => {
                let Phase::Panning { last } = self.phase else {
                    return Effect::None;
                };
                let delta = position - last;
                self.phase = Phase::Panning { last: position };
                if !model.is_ready() {
                    return Effect::None;
                }
                model.pan_by(delta);
                Effect::TransformChanged
            }
            Message::PointerReleased | Message::PointerCancelled | Message::PinchEnded => {
                self.finish(model)
            }
            Message::Wheel { delta_y, position } => {
                if !model.is_ready() {
                    return Effect::None;
                }
                let factor = (1.0 - delta_y * self.wheel_sensitivity).clamp(0.2, 5.0);
                let pivot = self.frame_centered(position, model);
                model.zoom_by(factor, pivot);
                Effect::TransformChanged
            }
            Message::PinchStarted { a, b } => {
                self.phase = Phase::Pinching {
                    last_distance: a.distance(b).max(MIN_PINCH_DISTANCE),
                    last_angle: a.angle_to(b),
                    last_centroid: a.midpoint(b),
                };
                Effect::None
            }
            Message::PinchMoved { a, b } => {
                let Phase::Pinching {
                    last_distance,
                    last_angle,
                    last_centroid,
                } = self.phase
                else {
                    return Effect::None;
                };

                let distance = a.distance(b).max(MIN_PINCH_DISTANCE);
                let angle = a.angle_to(b);
                let centroid = a.midpoint(b);

                // Baselines update every move: the next delta is relative
                // to this event, not to the gesture's start.
                self.phase = Phase::Pinching {
                    last_distance: distance,
                    last_angle: angle,
                    last_centroid: centroid,
                };

                if !model.is_ready() {
                    return Effect::None;
                }

                let factor = distance / last_distance;
                let angle_delta = normalize_degrees(angle - last_angle);
                let pivot = self.frame_centered(centroid, model);

                let mut candidate = model.transform();
                candidate.offset = candidate.offset + (centroid - last_centroid);
                candidate.offset = pivot + (candidate.offset - pivot) * factor;
                candidate.scale *= factor;
                if self.rotation_enabled {
                    candidate.rotation_degrees += angle_delta;
                }
                model.apply(candidate, pivot);
                Effect::TransformChanged
            }
        }
    }

    /// Ends the current interaction with one final clamp.
    fn finish(&mut self, model: &mut TransformModel) -> Effect {
        if self.phase == Phase::Idle {
            return Effect::None;
        }
        self.phase = Phase::Idle;
        // Covers any value allowed transiently during the interaction.
        model.reclamp();
        log::debug!("gesture interaction ended");
        Effect::InteractionEnded
    }

    fn frame_centered(&self, position: Vec2, model: &TransformModel) -> Vec2 {
        match model.frame_bounds() {
            Some(frame) => position - frame.center(),
            None => position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::Bounds;

    const TOLERANCE: f32 = 1e-3;

    fn ready_model() -> TransformModel {
        let mut model = TransformModel::default();
        model.set_image_bounds(Bounds::new(1600.0, 1200.0));
        model.set_frame_bounds(Bounds::new(800.0, 600.0));
        // Head-room for panning.
        model.zoom_by(2.0, Vec2::ZERO);
        model
    }

    #[test]
    fn pan_uses_incremental_deltas() {
        let mut state = State::default();
        let mut model = ready_model();

        state.handle(Message::PointerPressed(Vec2::new(100.0, 100.0)), &mut model);
        state.handle(Message::PointerMoved(Vec2::new(110.0, 100.0)), &mut model);
        state.handle(Message::PointerMoved(Vec2::new(115.0, 95.0)), &mut model);

        let offset = model.transform().offset;
        assert!((offset.x - 15.0).abs() < TOLERANCE);
        assert!((offset.y + 5.0).abs() < TOLERANCE);
    }

    #[test]
    fn move_without_press_is_ignored() {
        let mut state = State::default();
        let mut model = ready_model();
        let before = model.transform();
        let effect = state.handle(Message::PointerMoved(Vec2::new(50.0, 50.0)), &mut model);
        assert_eq!(effect, Effect::None);
        assert_eq!(model.transform(), before);
    }

    #[test]
    fn release_ends_interaction_and_reclamps() {
        let mut state = State::default();
        let mut model = ready_model();

        state.handle(Message::PointerPressed(Vec2::ZERO), &mut model);
        assert!(state.is_interacting());

        let effect = state.handle(Message::PointerReleased, &mut model);
        assert_eq!(effect, Effect::InteractionEnded);
        assert!(!state.is_interacting());

        // Releasing again with no interaction is a no-op.
        let effect = state.handle(Message::PointerReleased, &mut model);
        assert_eq!(effect, Effect::None);
    }

    #[test]
    fn cancel_resets_to_idle() {
        let mut state = State::default();
        let mut model = ready_model();
        state.handle(Message::PointerPressed(Vec2::ZERO), &mut model);
        state.handle(Message::PointerCancelled, &mut model);
        assert!(!state.is_interacting());
    }

    #[test]
    fn new_press_supersedes_previous_interaction() {
        let mut state = State::default();
        let mut model = ready_model();

        state.handle(Message::PointerPressed(Vec2::new(0.0, 0.0)), &mut model);
        // Second press without a release: deltas restart from the new point.
        state.handle(Message::PointerPressed(Vec2::new(500.0, 500.0)), &mut model);
        state.handle(Message::PointerMoved(Vec2::new(505.0, 500.0)), &mut model);
        assert!((model.transform().offset.x - 5.0).abs() < TOLERANCE);
    }

    #[test]
    fn wheel_zooms_in_for_negative_delta() {
        let mut state = State::default();
        let mut model = ready_model();
        let before = model.transform().scale;

        state.handle(
            Message::Wheel {
                delta_y: -100.0,
                position: Vec2::new(400.0, 300.0),
            },
            &mut model,
        );
        assert!(model.transform().scale > before);
    }

    #[test]
    fn wheel_zoom_preserves_cursor_world_point() {
        let mut state = State::default();
        let mut model = ready_model();
        let image = model.image_bounds().unwrap();
        let frame = model.frame_bounds().unwrap();

        let cursor = Vec2::new(500.0, 350.0);
        let world_before = model.transform().map_frame_to_image(cursor, image, frame);

        state.handle(
            Message::Wheel {
                delta_y: -50.0,
                position: cursor,
            },
            &mut model,
        );
        let world_after = model.transform().map_frame_to_image(cursor, image, frame);
        assert!(world_before.distance(world_after) < 0.1);
    }

    #[test]
    fn pinch_scales_by_distance_ratio() {
        let mut state = State::default();
        let mut model = ready_model();
        let before = model.transform().scale;

        state.handle(
            Message::PinchStarted {
                a: Vec2::new(300.0, 300.0),
                b: Vec2::new(500.0, 300.0),
            },
            &mut model,
        );
        state.handle(
            Message::PinchMoved {
                a: Vec2::new(250.0, 300.0),
                b: Vec2::new(550.0, 300.0),
            },
            &mut model,
        );
        // Distance went from 200 to 300.
        assert!((model.transform().scale - before * 1.5).abs() < TOLERANCE);
    }

    #[test]
    fn pinch_baselines_update_every_move() {
        // Two successive moves must compose to the same scale as one
        // combined move.
        let run = |moves: &[(Vec2, Vec2)]| {
            let mut state = State::default();
            let mut model = ready_model();
            state.handle(
                Message::PinchStarted {
                    a: Vec2::new(350.0, 300.0),
                    b: Vec2::new(450.0, 300.0),
                },
                &mut model,
            );
            for &(a, b) in moves {
                state.handle(Message::PinchMoved { a, b }, &mut model);
            }
            model.transform().scale
        };

        let stepped = run(&[
            (Vec2::new(340.0, 300.0), Vec2::new(460.0, 300.0)),
            (Vec2::new(325.0, 300.0), Vec2::new(475.0, 300.0)),
        ]);
        let direct = run(&[(Vec2::new(325.0, 300.0), Vec2::new(475.0, 300.0))]);
        assert!((stepped - direct).abs() < TOLERANCE);
    }

    #[test]
    fn pinch_rotation_respects_toggle() {
        let rotate = |enabled: bool| {
            let mut state = State::new(defaults::WHEEL_ZOOM_SENSITIVITY, enabled);
            let mut model = ready_model();
            state.handle(
                Message::PinchStarted {
                    a: Vec2::new(300.0, 300.0),
                    b: Vec2::new(500.0, 300.0),
                },
                &mut model,
            );
            // Rotate the pointer pair by 90° around its centroid.
            state.handle(
                Message::PinchMoved {
                    a: Vec2::new(400.0, 200.0),
                    b: Vec2::new(400.0, 400.0),
                },
                &mut model,
            );
            model.transform().rotation_degrees
        };

        assert!((rotate(true) - 90.0).abs() < 1.0);
        assert!(rotate(false).abs() < TOLERANCE);
    }

    #[test]
    fn pinch_pan_follows_centroid() {
        let mut state = State::new(defaults::WHEEL_ZOOM_SENSITIVITY, false);
        let mut model = ready_model();

        state.handle(
            Message::PinchStarted {
                a: Vec2::new(300.0, 300.0),
                b: Vec2::new(500.0, 300.0),
            },
            &mut model,
        );
        // Same distance and angle, centroid moved +20 on x.
        state.handle(
            Message::PinchMoved {
                a: Vec2::new(320.0, 300.0),
                b: Vec2::new(520.0, 300.0),
            },
            &mut model,
        );
        assert!((model.transform().offset.x - 20.0).abs() < TOLERANCE);
    }

    #[test]
    fn input_before_bounds_known_is_harmless() {
        let mut state = State::default();
        let mut model = TransformModel::default();
        let before = model.transform();

        state.handle(Message::PointerPressed(Vec2::ZERO), &mut model);
        state.handle(Message::PointerMoved(Vec2::new(10.0, 10.0)), &mut model);
        state.handle(
            Message::Wheel {
                delta_y: -100.0,
                position: Vec2::ZERO,
            },
            &mut model,
        );
        assert_eq!(model.transform(), before);
    }
}
