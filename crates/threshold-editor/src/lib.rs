// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// threshold-editor — Editing session for the Threshold app.
//
// Owns the working image, the brush mask with its undo/redo history, the
// threshold value and brush settings, and publishes the composited result.
// `controller` runs a session on a single Tokio task with a debounced,
// cancellable threshold recompute.

pub mod controller;
pub mod events;
pub mod history;
pub mod remap;
pub mod session;

pub use controller::{EditorController, EditorHandle, SessionSnapshot};
pub use events::EditorEvent;
pub use history::MaskHistory;
pub use remap::ViewMapping;
pub use session::{EditorSession, ThresholdJob, ThresholdOutcome};
