// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Undo/redo stacks of brush-mask snapshots, one entry per stroke.

use std::collections::VecDeque;

use threshold_imaging::BrushMask;

/// Past and undone mask states, most recent last.
#[derive(Debug, Default)]
pub struct MaskHistory {
    undo: VecDeque<BrushMask>,
    redo: Vec<BrushMask>,
    limit: Option<usize>,
}

impl MaskHistory {
    /// History keeping at most `limit` undo entries (`None` = unbounded).
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit,
        }
    }

    /// Record the mask as it was before a new stroke. Clears redo.
    pub fn record(&mut self, pre_stroke: BrushMask) {
        self.redo.clear();
        self.undo.push_back(pre_stroke);
        if let Some(limit) = self.limit {
            while self.undo.len() > limit {
                self.undo.pop_front();
            }
        }
    }

    /// Step back: returns the mask to restore and keeps `current` for redo.
    pub fn undo(&mut self, current: &BrushMask) -> Option<BrushMask> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current.clone());
        Some(previous)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: &BrushMask) -> Option<BrushMask> {
        let next = self.redo.pop()?;
        self.undo.push_back(current.clone());
        Some(next)
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }
}
