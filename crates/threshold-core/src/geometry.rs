// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plane geometry shared by the imaging pipeline and the editor.
//
// Convention: y grows downwards, (0, 0) is the top-left corner, and pixel
// (x, y) covers [x, x+1) x [y, y+1) with its sample centre at (x+0.5, y+0.5).

use serde::{Deserialize, Serialize};

use crate::error::{Result, ThresholdError};

/// A 2-D point in continuous coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Linear interpolation: `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// A continuous size (view points or pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width divided by height.
    pub fn aspect_ratio(self) -> f64 {
        self.width / self.height
    }

    fn is_positive(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }
}

/// An integer raster size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn as_size(self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    pub fn aspect_ratio(self) -> f64 {
        self.as_size().aspect_ratio()
    }

    /// Number of pixels (`width * height`).
    pub fn area(self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Scale `content` uniformly to the largest size that fits inside `container`
/// and centre it there.
///
/// Fails with [`ThresholdError::InvalidGeometry`] if either size has a zero,
/// negative, or non-finite dimension.
pub fn aspect_fit(content: Size, container: Size) -> Result<Rect> {
    if !content.is_positive() {
        return Err(ThresholdError::InvalidGeometry(format!(
            "content size {}x{} must be positive",
            content.width, content.height
        )));
    }
    if !container.is_positive() {
        return Err(ThresholdError::InvalidGeometry(format!(
            "container size {}x{} must be positive",
            container.width, container.height
        )));
    }

    let scale = (container.width / content.width).min(container.height / content.height);
    let size = Size::new(content.width * scale, content.height * scale);
    let origin = Point::new(
        (container.width - size.width) / 2.0,
        (container.height - size.height) / 2.0,
    );
    Ok(Rect { origin, size })
}
