#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_BOUNDARY_HEIGHT, DEFAULT_BOUNDARY_WIDTH, MAX_SURFACE_EDGE};

/// A point in surface space (pixels, origin at the top-left corner).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The rectangle captions may occupy, anchored at the surface origin.
///
/// Width and height are in surface pixels. Caption positions are clamped into
/// `0..=width` by `0..=height`; the edges themselves are valid resting
/// positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub width: f64,
    pub height: f64,
}

impl Default for Boundary {
    fn default() -> Self {
        Self { width: DEFAULT_BOUNDARY_WIDTH, height: DEFAULT_BOUNDARY_HEIGHT }
    }
}

impl Boundary {
    /// Create a boundary, flooring negative dimensions at zero.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width: width.max(0.0), height: height.max(0.0) }
    }

    /// Boundary for a background with the given native pixel dimensions,
    /// scaled down (aspect preserved) so the longest edge fits
    /// [`MAX_SURFACE_EDGE`]. Smaller backgrounds keep their native size.
    /// Degenerate dimensions fall back to the default boundary.
    #[must_use]
    pub fn fit(native_width: u32, native_height: u32) -> Self {
        if native_width == 0 || native_height == 0 {
            return Self::default();
        }
        let w = f64::from(native_width);
        let h = f64::from(native_height);
        let longest = w.max(h);
        if longest <= MAX_SURFACE_EDGE {
            return Self::new(w, h);
        }
        let scale = MAX_SURFACE_EDGE / longest;
        Self::new((w * scale).round(), (h * scale).round())
    }

    /// Clamp a point into the boundary rectangle.
    ///
    /// The result is inside the boundary for any input: infinite coordinates
    /// pin to the edges and NaN coordinates pin to zero.
    #[must_use]
    pub fn clamp(&self, pt: Point) -> Point {
        Point {
            x: if pt.x.is_nan() { 0.0 } else { pt.x.clamp(0.0, self.width) },
            y: if pt.y.is_nan() { 0.0 } else { pt.y.clamp(0.0, self.height) },
        }
    }

    /// The boundary center; the resting position for new captions.
    #[must_use]
    pub fn center(&self) -> Point {
        Point { x: self.width / 2.0, y: self.height / 2.0 }
    }

    /// Whether a point lies inside the boundary (edges inclusive).
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= 0.0 && pt.x <= self.width && pt.y >= 0.0 && pt.y <= self.height
    }
}
