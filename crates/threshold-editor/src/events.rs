// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Change notifications fired by the editor session.

use std::path::PathBuf;
use std::sync::Arc;

use image::GrayImage;

/// Something observable changed in the session.
#[derive(Debug, Clone)]
pub enum EditorEvent {
    /// A new composite is ready for display.
    Rendered(Arc<GrayImage>),
    /// A threshold recompute finished and is now the base.
    ThresholdApplied { cutoff: u8 },
    /// Undo/redo availability after a stroke, undo, or redo.
    HistoryChanged { can_undo: bool, can_redo: bool },
    /// Mask, history, and threshold went back to defaults.
    Reset,
    /// An export was written.
    Exported { path: PathBuf },
}

type Listener = Box<dyn Fn(&EditorEvent) + Send>;

/// Callback list notified after each state change, in registration order.
#[derive(Default)]
pub struct Listeners {
    callbacks: Vec<Listener>,
}

impl Listeners {
    pub fn subscribe(&mut self, listener: impl Fn(&EditorEvent) + Send + 'static) {
        self.callbacks.push(Box::new(listener));
    }

    pub fn emit(&self, event: &EditorEvent) {
        for callback in &self.callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners").field("count", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn listeners_fire_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = Listeners::default();
        for tag in ["a", "b"] {
            let seen = Arc::clone(&seen);
            listeners.subscribe(move |event| {
                if let EditorEvent::ThresholdApplied { cutoff } = event {
                    seen.lock().unwrap().push(format!("{tag}{cutoff}"));
                }
            });
        }
        listeners.emit(&EditorEvent::ThresholdApplied { cutoff: 7 });
        listeners.emit(&EditorEvent::Reset);
        assert_eq!(*seen.lock().unwrap(), vec!["a7".to_string(), "b7".to_string()]);
    }
}
