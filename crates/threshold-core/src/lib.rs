// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Threshold — Core types, geometry, configuration, and error definitions shared
// across all crates.

pub mod config;
pub mod error;
pub mod geometry;
pub mod human_errors;
pub mod types;

pub use config::EditorConfig;
pub use error::{ErrorClass, ThresholdError};
pub use geometry::{PixelSize, Point, Rect, Size, aspect_fit};
pub use types::*;
