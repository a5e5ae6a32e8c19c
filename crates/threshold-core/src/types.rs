// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Threshold editor: paint values, brush settings,
// and threshold limits.

use serde::{Deserialize, Serialize};

/// Byte values stored in a brush mask.
pub mod paint {
    /// No override; the thresholded pixel shows through.
    pub const NEUTRAL: u8 = 128;
    /// Force the pixel to black.
    pub const BLACK: u8 = 0;
    /// Force the pixel to white.
    pub const WHITE: u8 = 255;
}

/// Lowest cutoff the threshold slider can select.
pub const MIN_THRESHOLD: f64 = 1.0;
/// Highest cutoff the threshold slider can select.
pub const MAX_THRESHOLD: f64 = 255.0;

/// Smallest brush radius in view points.
pub const MIN_BRUSH_SIZE: f32 = 2.0;
/// Largest brush radius in view points.
pub const MAX_BRUSH_SIZE: f32 = 80.0;

/// Which value the brush paints into the mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushMode {
    #[default]
    Black,
    White,
}

impl BrushMode {
    /// The mask byte this mode writes.
    pub fn mask_value(self) -> u8 {
        match self {
            Self::Black => paint::BLACK,
            Self::White => paint::WHITE,
        }
    }

    /// Parse `"black"` / `"white"` (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "black" | "b" => Some(Self::Black),
            "white" | "w" => Some(Self::White),
            _ => None,
        }
    }
}

/// Brush size presets offered by the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrushSize {
    Small,
    Medium,
    Large,
}

impl BrushSize {
    /// Radius in view points.
    pub fn radius(self) -> f32 {
        match self {
            Self::Small => 10.0,
            Self::Medium => 24.0,
            Self::Large => 48.0,
        }
    }

    pub const ALL: [BrushSize; 3] = [Self::Small, Self::Medium, Self::Large];
}

/// Session-scoped brush settings consumed by stroke operations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushSettings {
    /// Radius in view points, within [`MIN_BRUSH_SIZE`, `MAX_BRUSH_SIZE`].
    pub size: f32,
    pub mode: BrushMode,
}

impl BrushSettings {
    pub fn new(size: f32, mode: BrushMode) -> Self {
        Self {
            size: clamp_brush_size(size),
            mode,
        }
    }
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self::new(BrushSize::Medium.radius(), BrushMode::Black)
    }
}

/// Clamp a brush size into the supported range. NaN maps to the minimum.
pub fn clamp_brush_size(size: f32) -> f32 {
    if size.is_nan() {
        return MIN_BRUSH_SIZE;
    }
    size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE)
}

/// Clamp a slider value into [`MIN_THRESHOLD`, `MAX_THRESHOLD`]. NaN maps to
/// the minimum.
pub fn clamp_threshold(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_THRESHOLD;
    }
    value.clamp(MIN_THRESHOLD, MAX_THRESHOLD)
}

/// Convert a continuous slider value into the integer cutoff used by the
/// threshold filter. Fractions are truncated.
pub fn cutoff_from_value(value: f64) -> u8 {
    clamp_threshold(value).trunc() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brush_size_is_clamped() {
        assert_eq!(clamp_brush_size(0.5), MIN_BRUSH_SIZE);
        assert_eq!(clamp_brush_size(500.0), MAX_BRUSH_SIZE);
        assert_eq!(clamp_brush_size(24.0), 24.0);
        assert_eq!(clamp_brush_size(f32::NAN), MIN_BRUSH_SIZE);
    }

    #[test]
    fn cutoff_truncates_and_clamps() {
        assert_eq!(cutoff_from_value(128.9), 128);
        assert_eq!(cutoff_from_value(0.0), 1);
        assert_eq!(cutoff_from_value(300.0), 255);
        assert_eq!(cutoff_from_value(f64::NAN), 1);
    }

    #[test]
    fn mode_values_match_paint_constants() {
        assert_eq!(BrushMode::Black.mask_value(), paint::BLACK);
        assert_eq!(BrushMode::White.mask_value(), paint::WHITE);
        assert_eq!(BrushMode::from_name("WHITE"), Some(BrushMode::White));
        assert_eq!(BrushMode::from_name("grey"), None);
    }

    #[test]
    fn presets_fit_range() {
        for preset in BrushSize::ALL {
            let r = preset.radius();
            assert!((MIN_BRUSH_SIZE..=MAX_BRUSH_SIZE).contains(&r));
        }
        assert_eq!(BrushSettings::default().size, 24.0);
    }
}
