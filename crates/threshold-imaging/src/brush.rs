// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Brush renderer — rasterises strokes into a brush mask by stamping filled
// circles along the segment.

use threshold_core::{BrushMode, Point, Rect};
use tracing::trace;

use crate::mask::BrushMask;

/// Maximum distance between consecutive dabs along a stroke, in mask pixels.
///
/// Gesture events arrive far apart at working resolution; stamping at half a
/// pixel keeps fast strokes continuous.
pub const DAB_SPACING: f64 = 0.5;

/// Stateless circle-stamping brush.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrushRenderer;

impl BrushRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Paint the segment `from`..`to` into `mask` with a round brush of
    /// `radius` mask pixels. A zero-length segment paints a single dab.
    ///
    /// Only the dabs that can reach the mask are visited, so the cost is
    /// bounded by the mask size rather than the segment length.
    ///
    /// Returns the number of dabs stamped.
    pub fn apply_stroke(
        &self,
        mask: &mut BrushMask,
        from: Point,
        to: Point,
        radius: f64,
        mode: BrushMode,
    ) -> usize {
        let distance = from.distance(to);
        if !distance.is_finite() || !(radius.is_finite() && radius > 0.0) {
            return 0;
        }
        let steps = ((distance / DAB_SPACING).floor() as usize).max(1);
        let Some((first, last)) = reachable_steps(mask, from, to, radius, steps) else {
            trace!(steps, radius, "stroke misses the mask");
            return 0;
        };
        let value = mode.mask_value();

        for i in first..=last {
            let t = i as f64 / steps as f64;
            self.paint_circle(mask, from.lerp(to, t), radius, value);
        }

        trace!(steps, first, last, radius, ?mode, "stroke stamped");
        last - first + 1
    }

    /// Fill every pixel whose centre lies within `radius` of `center`.
    pub fn paint_circle(&self, mask: &mut BrushMask, center: Point, radius: f64, value: u8) {
        if !(radius.is_finite() && radius > 0.0 && center.x.is_finite() && center.y.is_finite()) {
            return;
        }
        if mask.width() == 0 || mask.height() == 0 {
            return;
        }

        // Bounding box clipped to the mask; `as i64` saturates for far-off points.
        let min_x = ((center.x - radius).floor() as i64).max(0);
        let max_x = ((center.x + radius).floor() as i64).min(mask.width() as i64 - 1);
        let min_y = ((center.y - radius).floor() as i64).max(0);
        let max_y = ((center.y + radius).floor() as i64).min(mask.height() as i64 - 1);
        let r2 = radius * radius;

        for y in min_y..=max_y {
            let dy = y as f64 + 0.5 - center.y;
            for x in min_x..=max_x {
                let dx = x as f64 + 0.5 - center.x;
                if dx * dx + dy * dy <= r2 {
                    mask.set(x as i32, y as i32, value);
                }
            }
        }
    }
}

/// Indices in `0..=steps` of the dabs whose circles can touch the mask.
///
/// A dab further than `radius` from the mask covers no pixel centre. The
/// segment is clipped (Liang-Barsky) against the mask grown by `radius` plus
/// one pixel of slack.
fn reachable_steps(
    mask: &BrushMask,
    from: Point,
    to: Point,
    radius: f64,
    steps: usize,
) -> Option<(usize, usize)> {
    let reach = radius + 1.0;
    let bounds = Rect::new(
        -reach,
        -reach,
        mask.width() as f64 + 2.0 * reach,
        mask.height() as f64 + 2.0 * reach,
    );
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);

    for (p, q) in [
        (-dx, from.x - bounds.origin.x),
        (dx, bounds.max_x() - from.x),
        (-dy, from.y - bounds.origin.y),
        (dy, bounds.max_y() - from.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else if p < 0.0 {
            t0 = t0.max(q / p);
        } else {
            t1 = t1.min(q / p);
        }
    }
    if t0 > t1 {
        return None;
    }

    let n = steps as f64;
    let first = (t0 * n).ceil() as usize;
    let last = ((t1 * n).floor() as usize).min(steps);
    (first <= last).then_some((first, last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use threshold_core::paint::{BLACK, NEUTRAL, WHITE};

    fn count(mask: &BrushMask, value: u8) -> usize {
        mask.as_raw().iter().filter(|&&v| v == value).count()
    }

    #[test]
    fn single_dab_covers_a_neighbourhood() {
        let mut mask = BrushMask::new(5, 5);
        let p = Point::new(2.0, 2.0);
        BrushRenderer::new().apply_stroke(&mut mask, p, p, 1.5, BrushMode::White);
        assert!(count(&mask, WHITE) > 1);
        // The four pixels around the lattice point (2,2) are inside.
        for (x, y) in [(1, 1), (2, 1), (1, 2), (2, 2)] {
            assert_eq!(mask.get(x, y), WHITE);
        }
        assert_eq!(mask.get(0, 0), NEUTRAL);
    }

    #[test]
    fn pixel_centre_rule() {
        let mut mask = BrushMask::new(9, 9);
        BrushRenderer::new().paint_circle(&mut mask, Point::new(4.5, 4.5), 1.0, BLACK);
        // Centre plus its four edge neighbours (distance exactly 1.0).
        assert_eq!(count(&mask, BLACK), 5);
        assert_eq!(mask.get(4, 4), BLACK);
        assert_eq!(mask.get(3, 4), BLACK);
        assert_eq!(mask.get(3, 3), NEUTRAL);
    }

    #[test]
    fn long_stroke_is_continuous() {
        let mut mask = BrushMask::new(200, 10);
        let dabs = BrushRenderer::new().apply_stroke(
            &mut mask,
            Point::new(5.0, 5.0),
            Point::new(195.0, 5.0),
            1.0,
            BrushMode::Black,
        );
        assert_eq!(dabs, 381);
        for x in 5..195 {
            assert_eq!(mask.get(x, 4), BLACK, "gap at x={x}");
        }
    }

    #[test]
    fn clipped_at_mask_edges() {
        let mut mask = BrushMask::new(4, 4);
        BrushRenderer::new().paint_circle(&mut mask, Point::new(0.0, 0.0), 3.0, WHITE);
        assert_eq!(mask.get(0, 0), WHITE);
        assert_eq!(mask.get(-1, -1), NEUTRAL);

        let mut far = BrushMask::new(4, 4);
        BrushRenderer::new().paint_circle(&mut far, Point::new(-50.0, 1e12), 3.0, WHITE);
        assert!(far.is_neutral());
    }

    #[test]
    fn degenerate_radius_paints_nothing() {
        let mut mask = BrushMask::new(4, 4);
        let p = Point::new(2.0, 2.0);
        let renderer = BrushRenderer::new();
        renderer.apply_stroke(&mut mask, p, p, 0.0, BrushMode::White);
        renderer.apply_stroke(&mut mask, p, p, f64::NAN, BrushMode::White);
        renderer.apply_stroke(&mut mask, p, Point::new(f64::INFINITY, 0.0), 2.0, BrushMode::White);
        assert!(mask.is_neutral());
    }

    #[test]
    fn partly_outside_stroke_matches_full_stamping() {
        let (from, to, radius) = (Point::new(-300.3, 1.7), Point::new(40.2, 3.1), 1.5);
        let renderer = BrushRenderer::new();

        let mut clipped = BrushMask::new(20, 6);
        let dabs = renderer.apply_stroke(&mut clipped, from, to, radius, BrushMode::Black);

        let mut full = BrushMask::new(20, 6);
        let steps = (from.distance(to) / DAB_SPACING).floor() as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            renderer.paint_circle(&mut full, from.lerp(to, t), radius, BLACK);
        }

        assert_eq!(clipped, full);
        assert!(dabs < steps / 4, "{dabs} of {steps} dabs visited");
    }

    #[test]
    fn far_reaching_stroke_visits_only_nearby_dabs() {
        let mut mask = BrushMask::new(10, 5);
        let dabs = BrushRenderer::new().apply_stroke(
            &mut mask,
            Point::new(-1e12, 2.5),
            Point::new(1e12, 2.5),
            1.0,
            BrushMode::White,
        );
        assert!(dabs <= 64, "{dabs} dabs");
        for x in 0..10 {
            assert_eq!(mask.get(x, 2), WHITE);
        }
    }

    #[test]
    fn stroke_missing_the_mask_stamps_nothing() {
        let mut mask = BrushMask::new(10, 5);
        let dabs = BrushRenderer::new().apply_stroke(
            &mut mask,
            Point::new(-100.0, -100.0),
            Point::new(100.0, -50.0),
            3.0,
            BrushMode::Black,
        );
        assert_eq!(dabs, 0);
        assert!(mask.is_neutral());
    }
}
