// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data directory resolution and persisted editor settings.

use std::path::{Path, PathBuf};

use threshold_core::EditorConfig;
use threshold_core::error::Result;

/// File name of the persisted editor settings inside the data dir.
pub const CONFIG_FILE: &str = "config.json";

/// Return the application data directory, creating it if needed.
///
/// On desktop this uses a conventional location. On mobile the platform
/// shell should provide its documents directory instead.
pub fn data_dir() -> PathBuf {
    let dir = dirs_fallback().join("threshold");
    if let Err(err) = std::fs::create_dir_all(&dir) {
        tracing::warn!(path = %dir.display(), error = %err, "could not create data dir");
    }
    dir
}

fn dirs_fallback() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    std::env::temp_dir()
}

/// Saved settings from `data_dir`, or `None` when absent or unreadable.
pub fn load_config(data_dir: &Path) -> Option<EditorConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(config) => Some(config),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring malformed config");
            None
        }
    }
}

pub fn persist_config(data_dir: &Path, config: &EditorConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    tracing::debug!(path = %path.display(), "config persisted");
    Ok(())
}

/// Read an explicit config file. Unlike [`load_config`], failures are errors.
pub fn read_config_file(path: &Path) -> Result<EditorConfig> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}
