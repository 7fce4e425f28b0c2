// SPDX-License-Identifier: MPL-2.0
//! Built-in filter presets.
//!
//! A preset bundles a name, an ordered list of [`Effect`] operations, and an
//! optional baked-in vignette strength. "original" is the neutral preset.

use super::Effect;

/// A selectable named filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPreset {
    pub name: &'static str,
    pub effects: Vec<Effect>,
    /// Vignette strength contributed by the preset, in [0, 1].
    pub vignette: f32,
}

impl Default for FilterPreset {
    fn default() -> Self {
        Self::original()
    }
}

impl FilterPreset {
    /// The neutral preset: no effects, no vignette.
    #[must_use]
    pub fn original() -> Self {
        Self {
            name: "original",
            effects: Vec::new(),
            vignette: 0.0,
        }
    }

    /// Looks up a built-in preset by name (case-insensitive).
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        let wanted = name.trim().to_ascii_lowercase();
        Self::all().into_iter().find(|p| p.name == wanted)
    }

    /// Names of every built-in preset, in menu order.
    #[must_use]
    pub fn names() -> &'static [&'static str] {
        &[
            "original", "warm", "cool", "vivid", "fade", "mono", "noir", "sepia",
        ]
    }

    /// Every built-in preset, in menu order.
    #[must_use]
    pub fn all() -> Vec<Self> {
        vec![
            Self::original(),
            Self {
                name: "warm",
                effects: vec![
                    Effect::Warmth(0.25),
                    Effect::Brightness(1.05),
                    Effect::Saturate(1.1),
                ],
                vignette: 0.0,
            },
            Self {
                name: "cool",
                effects: vec![Effect::Warmth(-0.25), Effect::Saturate(0.95)],
                vignette: 0.0,
            },
            Self {
                name: "vivid",
                effects: vec![Effect::Saturate(1.4), Effect::Contrast(1.1)],
                vignette: 0.0,
            },
            Self {
                name: "fade",
                effects: vec![
                    Effect::Brightness(1.1),
                    Effect::Contrast(0.85),
                    Effect::Saturate(0.8),
                ],
                vignette: 0.0,
            },
            Self {
                name: "mono",
                effects: vec![Effect::Grayscale(1.0)],
                vignette: 0.0,
            },
            Self {
                name: "noir",
                effects: vec![Effect::Grayscale(1.0), Effect::Contrast(1.25)],
                vignette: 0.35,
            },
            Self {
                name: "sepia",
                effects: vec![Effect::Sepia(0.85), Effect::Brightness(1.05)],
                vignette: 0.0,
            },
        ]
    }
}
