// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Brush mask — a single-channel override layer sized to the working image.

use std::fmt;

use threshold_core::PixelSize;
use threshold_core::paint::NEUTRAL;

/// Per-pixel override layer.
///
/// Each byte is [`NEUTRAL`] (show the thresholded pixel) or a forced value
/// (`BLACK`/`WHITE`). Storage is row-major, top row first. Every accessor is
/// total: reads outside the mask return `NEUTRAL` and writes outside it are
/// ignored.
#[derive(Clone, PartialEq, Eq)]
pub struct BrushMask {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl BrushMask {
    /// A mask with every pixel set to `NEUTRAL`.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, NEUTRAL)
    }

    /// A mask with every pixel set to `fill`.
    pub fn filled(width: u32, height: u32, fill: u8) -> Self {
        Self {
            data: vec![fill; PixelSize::new(width, height).area()],
            width,
            height,
        }
    }

    pub fn with_size(size: PixelSize) -> Self {
        Self::new(size.width, size.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }

    /// Raw row-major bytes.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Value at `(x, y)`, or `NEUTRAL` outside the mask.
    pub fn get(&self, x: i32, y: i32) -> u8 {
        self.index(x, y).map_or(NEUTRAL, |idx| self.data[idx])
    }

    /// Write `value` at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, value: u8) {
        if let Some(idx) = self.index(x, y) {
            self.data[idx] = value;
        }
    }

    /// Reset every pixel to `NEUTRAL`.
    pub fn clear(&mut self) {
        self.data.fill(NEUTRAL);
    }

    /// Number of pixels that override the base image.
    pub fn overridden_count(&self) -> usize {
        self.data.iter().filter(|&&v| v != NEUTRAL).count()
    }

    pub fn is_neutral(&self) -> bool {
        self.data.iter().all(|&v| v == NEUTRAL)
    }
}

// A derived Debug would dump millions of bytes.
impl fmt::Debug for BrushMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrushMask")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("overridden", &self.overridden_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threshold_core::paint::{BLACK, WHITE};

    #[test]
    fn fresh_mask_holds_fill_everywhere() {
        for (w, h, fill) in [(1, 1, NEUTRAL), (7, 3, BLACK), (4, 9, WHITE), (16, 16, 42)] {
            let mask = BrushMask::filled(w, h, fill);
            assert_eq!(mask.as_raw().len(), (w * h) as usize);
            for y in 0..h as i32 {
                for x in 0..w as i32 {
                    assert_eq!(mask.get(x, y), fill);
                }
            }
        }
    }

    #[test]
    fn last_write_wins() {
        let mut mask = BrushMask::new(5, 4);
        mask.set(2, 3, WHITE);
        mask.set(2, 3, BLACK);
        mask.set(4, 0, WHITE);
        assert_eq!(mask.get(2, 3), BLACK);
        assert_eq!(mask.get(4, 0), WHITE);
        assert_eq!(mask.get(0, 0), NEUTRAL);
        assert_eq!(mask.overridden_count(), 2);
    }

    #[test]
    fn row_major_layout() {
        let mut mask = BrushMask::new(3, 2);
        mask.set(1, 1, WHITE);
        assert_eq!(mask.as_raw()[1 * 3 + 1], WHITE);
    }

    #[test]
    fn out_of_bounds_reads_neutral_regardless_of_contents() {
        let mask = BrushMask::filled(3, 3, BLACK);
        for (x, y) in [(-1, 0), (0, -1), (3, 0), (0, 3), (i32::MAX, i32::MAX), (i32::MIN, 1)] {
            assert_eq!(mask.get(x, y), NEUTRAL);
        }
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut mask = BrushMask::new(2, 2);
        let before = mask.clone();
        mask.set(-1, 0, WHITE);
        mask.set(2, 1, WHITE);
        mask.set(0, 2, WHITE);
        assert_eq!(mask, before);
    }

    #[test]
    fn equality_is_by_content() {
        let mut a = BrushMask::new(4, 4);
        let mut b = BrushMask::new(4, 4);
        a.set(1, 1, WHITE);
        assert_ne!(a, b);
        b.set(1, 1, WHITE);
        assert_eq!(a, b);
        a.clear();
        assert!(a.is_neutral());
        assert_ne!(BrushMask::new(2, 8), BrushMask::new(8, 2));
    }
}
