// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// View-to-working coordinate mapping under aspect-fit letterboxing.

use threshold_core::error::Result;
use threshold_core::{PixelSize, Point, Rect, Size, aspect_fit};

/// Maps on-screen points into working-image pixel coordinates.
///
/// The working image is shown aspect-fit inside the viewport, so bars may
/// appear on either axis. `to_working(p) = p * scale + offset` with
/// `scale = working.width / fit.width` and `offset = -fit.origin * scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewMapping {
    fit: Rect,
    scale: f64,
    offset: Point,
}

impl ViewMapping {
    pub fn new(working: PixelSize, viewport: Size) -> Result<Self> {
        let fit = aspect_fit(working.as_size(), viewport)?;
        let scale = working.width as f64 / fit.size.width;
        let offset = Point::new(-fit.origin.x * scale, -fit.origin.y * scale);
        Ok(Self { fit, scale, offset })
    }

    /// Where the working image sits inside the viewport.
    pub fn displayed_rect(&self) -> Rect {
        self.fit
    }

    /// Working pixels per view point.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn to_working(&self, point: Point) -> Point {
        Point::new(
            point.x * self.scale + self.offset.x,
            point.y * self.scale + self.offset.y,
        )
    }

    /// Convert a view-space length (e.g. brush radius) to working pixels.
    pub fn scale_length(&self, length: f64) -> f64 {
        length * self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKING: PixelSize = PixelSize::new(2000, 2500);

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn square_viewport_centre_maps_to_image_centre() {
        let mapping = ViewMapping::new(WORKING, Size::new(1000.0, 1000.0)).unwrap();
        assert_eq!(mapping.displayed_rect(), Rect::new(100.0, 0.0, 800.0, 1000.0));
        assert!((mapping.scale() - 2.5).abs() < 1e-12);
        assert!(approx(mapping.to_working(Point::new(500.0, 500.0)), Point::new(1000.0, 1250.0)));
    }

    #[test]
    fn pillarbox_edges_map_to_image_edges() {
        let mapping = ViewMapping::new(WORKING, Size::new(1000.0, 1000.0)).unwrap();
        assert!(approx(mapping.to_working(Point::new(100.0, 0.0)), Point::new(0.0, 0.0)));
        assert!(approx(mapping.to_working(Point::new(900.0, 1000.0)), Point::new(2000.0, 2500.0)));
        // Inside the left bar lands left of the image.
        assert!(mapping.to_working(Point::new(50.0, 10.0)).x < 0.0);
    }

    #[test]
    fn letterbox_offsets_vertically() {
        // Tall phone viewport: image fills the width, bars top and bottom.
        let mapping = ViewMapping::new(WORKING, Size::new(400.0, 800.0)).unwrap();
        let rect = mapping.displayed_rect();
        assert!((rect.origin.y - 150.0).abs() < 1e-9);
        assert!(approx(mapping.to_working(Point::new(0.0, 150.0)), Point::new(0.0, 0.0)));
        assert!((mapping.scale_length(10.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn empty_viewport_is_an_error() {
        assert!(ViewMapping::new(WORKING, Size::new(0.0, 0.0)).is_err());
    }
}
