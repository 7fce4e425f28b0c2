// SPDX-License-Identifier: MPL-2.0
//! The style compositor: merges a named filter preset with the user's
//! finetune sliders into one effective style description.
//!
//! Effects are a typed list of named numeric operations, not a
//! presentation string. Merge rules:
//!
//! - brightness / contrast / saturation are multiplicative: preset and
//!   slider contributions multiply (and therefore commute);
//! - warmth is additive and clamped to its valid range;
//! - preset effects with no finetune counterpart (hue rotation, grayscale,
//!   sepia, invert) pass through unchanged;
//! - vignette is resolved separately — it is a positional radial pass at
//!   render time, not a per-pixel color function.

pub mod presets;

pub use presets::FilterPreset;

// =============================================================================
// Slider newtypes
// =============================================================================

/// Slider bounds (-100 to +100).
pub mod adjustment_bounds {
    /// Minimum slider value.
    pub const MIN: i32 = -100;
    /// Maximum slider value.
    pub const MAX: i32 = 100;
    /// Default (neutral) slider value.
    pub const DEFAULT: i32 = 0;
}

/// Finetune slider percentage, guaranteed to be within -100..=+100.
///
/// 0 is neutral. For multiplicative dimensions the value maps to a factor
/// (`1 + v/100`, so -100 → 0.0 and +100 → 2.0); for warmth it maps to an
/// additive shift in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdjustmentPercent(i32);

impl AdjustmentPercent {
    /// Creates a new slider value, clamping to the valid range.
    #[must_use]
    pub fn new(value: i32) -> Self {
        Self(value.clamp(adjustment_bounds::MIN, adjustment_bounds::MAX))
    }

    /// Returns the raw value.
    #[must_use]
    pub fn value(self) -> i32 {
        self.0
    }

    /// Returns whether this represents no adjustment.
    #[must_use]
    pub fn is_neutral(self) -> bool {
        self.0 == adjustment_bounds::DEFAULT
    }

    /// Multiplicative interpretation: 1.0 is neutral.
    #[must_use]
    pub fn as_factor(self) -> f32 {
        1.0 + self.0 as f32 / 100.0
    }

    /// Additive interpretation: a shift in [-1, 1].
    #[must_use]
    pub fn as_shift(self) -> f32 {
        self.0 as f32 / 100.0
    }
}

/// Vignette strength, clamped to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VignetteStrength(f32);

impl VignetteStrength {
    #[must_use]
    pub fn new(value: f32) -> Self {
        if value.is_finite() {
            Self(value.clamp(0.0, 1.0))
        } else {
            Self(0.0)
        }
    }

    #[must_use]
    pub fn value(self) -> f32 {
        self.0
    }
}

// =============================================================================
// Effects
// =============================================================================

/// A single named numeric effect operation.
///
/// Multiplier-style variants are neutral at 1.0; amount-style variants at
/// 0.0. Warmth is an additive shift in [-1, 1] (positive = warmer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    Brightness(f32),
    Contrast(f32),
    Saturate(f32),
    Warmth(f32),
    /// Hue rotation in degrees.
    HueRotate(f32),
    Grayscale(f32),
    Sepia(f32),
    Invert(f32),
}

/// The continuously-adjustable finetune sliders.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Finetune {
    pub brightness: AdjustmentPercent,
    pub contrast: AdjustmentPercent,
    pub saturation: AdjustmentPercent,
    pub warmth: AdjustmentPercent,
    pub vignette: VignetteStrength,
}

impl Finetune {
    /// Returns true if every slider is at its neutral position.
    #[must_use]
    pub fn is_neutral(&self) -> bool {
        self.brightness.is_neutral()
            && self.contrast.is_neutral()
            && self.saturation.is_neutral()
            && self.warmth.is_neutral()
            && self.vignette.value() == 0.0
    }
}

/// Preset selection plus finetune sliders; the effective style is a pure
/// function of this state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleState {
    pub preset: FilterPreset,
    pub finetune: Finetune,
}

/// The merged, render-ready style description.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedStyle {
    /// Ordered effect operations applied to image pixels.
    pub ops: Vec<Effect>,
    /// Residual vignette strength in [0, 1], applied as a radial pass.
    pub vignette: f32,
}

impl ResolvedStyle {
    /// True when the style changes no pixels and has no vignette.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.ops.is_empty() && self.vignette == 0.0
    }
}

impl StyleState {
    /// Merges preset and finetune into the effective style.
    #[must_use]
    pub fn resolve(&self) -> ResolvedStyle {
        let finetune = &self.finetune;
        let mut ops = Vec::with_capacity(self.preset.effects.len() + 4);

        let mut folded_brightness = false;
        let mut folded_contrast = false;
        let mut folded_saturation = false;
        let mut folded_warmth = false;

        for effect in &self.preset.effects {
            let merged = match *effect {
                Effect::Brightness(v) if !folded_brightness => {
                    folded_brightness = true;
                    Effect::Brightness(v * finetune.brightness.as_factor())
                }
                Effect::Contrast(v) if !folded_contrast => {
                    folded_contrast = true;
                    Effect::Contrast(v * finetune.contrast.as_factor())
                }
                Effect::Saturate(v) if !folded_saturation => {
                    folded_saturation = true;
                    Effect::Saturate(v * finetune.saturation.as_factor())
                }
                Effect::Warmth(v) if !folded_warmth => {
                    folded_warmth = true;
                    Effect::Warmth((v + finetune.warmth.as_shift()).clamp(-1.0, 1.0))
                }
                other => other,
            };
            if !is_neutral_effect(merged) {
                ops.push(merged);
            }
        }

        // Finetune dimensions with no preset counterpart contribute their
        // own operations.
        if !folded_brightness && !finetune.brightness.is_neutral() {
            ops.push(Effect::Brightness(finetune.brightness.as_factor()));
        }
        if !folded_contrast && !finetune.contrast.is_neutral() {
            ops.push(Effect::Contrast(finetune.contrast.as_factor()));
        }
        if !folded_saturation && !finetune.saturation.is_neutral() {
            ops.push(Effect::Saturate(finetune.saturation.as_factor()));
        }
        if !folded_warmth && !finetune.warmth.is_neutral() {
            ops.push(Effect::Warmth(finetune.warmth.as_shift().clamp(-1.0, 1.0)));
        }

        ResolvedStyle {
            ops,
            vignette: (self.preset.vignette + finetune.vignette.value()).clamp(0.0, 1.0),
        }
    }
}

fn is_neutral_effect(effect: Effect) -> bool {
    match effect {
        Effect::Brightness(v) | Effect::Contrast(v) | Effect::Saturate(v) => {
            (v - 1.0).abs() < f32::EPSILON
        }
        Effect::Warmth(v)
        | Effect::HueRotate(v)
        | Effect::Grayscale(v)
        | Effect::Sepia(v)
        | Effect::Invert(v) => v.abs() < f32::EPSILON,
    }
}
