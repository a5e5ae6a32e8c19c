// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Editor configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::geometry::PixelSize;
use crate::types::{BrushMode, BrushSettings, BrushSize};

/// Settings shared by the processor, the editor session, and the app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Working raster width every edit happens at.
    pub working_width: u32,
    /// Working raster height every edit happens at.
    pub working_height: u32,
    /// Threshold value used at session start and on reset.
    pub default_threshold: f64,
    /// Quiet period after the last slider change before recomputing.
    pub debounce_ms: u64,
    /// Initial brush radius in view points.
    pub default_brush_size: f32,
    /// Initial brush paint mode.
    pub default_brush_mode: BrushMode,
    /// Maximum undo depth. `None` keeps every stroke.
    pub history_limit: Option<usize>,
    /// File name of the export, created inside the OS temp directory.
    pub export_file_name: String,
}

impl EditorConfig {
    pub fn working_size(&self) -> PixelSize {
        PixelSize::new(self.working_width, self.working_height)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn default_brush(&self) -> BrushSettings {
        BrushSettings::new(self.default_brush_size, self.default_brush_mode)
    }

    /// Well-known export location; each export overwrites the previous one.
    pub fn export_path(&self) -> PathBuf {
        std::env::temp_dir().join(&self.export_file_name)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            working_width: 2000,
            working_height: 2500,
            default_threshold: 128.0,
            debounce_ms: 80,
            default_brush_size: BrushSize::Medium.radius(),
            default_brush_mode: BrushMode::Black,
            history_limit: None,
            export_file_name: "Threshold-Export.png".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_working_resolution() {
        let config = EditorConfig::default();
        assert_eq!(config.working_size(), PixelSize::new(2000, 2500));
        assert_eq!(config.debounce(), Duration::from_millis(80));
        assert!(config.export_path().ends_with("Threshold-Export.png"));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{ "debounce_ms": 20, "default_brush_mode": "white" }"#).unwrap();
        assert_eq!(config.debounce_ms, 20);
        assert_eq!(config.default_brush_mode, BrushMode::White);
        assert_eq!(config.working_width, 2000);
        assert_eq!(config.default_threshold, 128.0);
    }
}
