//! Axis-aligned rectangles in database units.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle with inclusive lower-left and upper-right corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Lower x coordinate.
    pub x_lo: i64,
    /// Lower y coordinate.
    pub y_lo: i64,
    /// Upper x coordinate.
    pub x_hi: i64,
    /// Upper y coordinate.
    pub y_hi: i64,
}

impl Rect {
    /// Creates a rectangle from two opposite corners in any order.
    pub fn new(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        Self {
            x_lo: x0.min(x1),
            y_lo: y0.min(y1),
            x_hi: x0.max(x1),
            y_hi: y0.max(y1),
        }
    }

    /// Width of the rectangle.
    pub fn dx(&self) -> i64 {
        self.x_hi - self.x_lo
    }

    /// Height of the rectangle.
    pub fn dy(&self) -> i64 {
        self.y_hi - self.y_lo
    }

    /// Area of the rectangle.
    pub fn area(&self) -> i128 {
        i128::from(self.dx()) * i128::from(self.dy())
    }

    /// Returns the smallest rectangle covering both `self` and `other`.
    pub fn merge(&self, other: &Rect) -> Rect {
        Rect {
            x_lo: self.x_lo.min(other.x_lo),
            y_lo: self.y_lo.min(other.y_lo),
            x_hi: self.x_hi.max(other.x_hi),
            y_hi: self.y_hi.max(other.y_hi),
        }
    }

    /// Returns the bounding box of all rectangles, or `None` for an empty input.
    pub fn bounding<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
        rects.into_iter().fold(None, |acc, r| match acc {
            None => Some(*r),
            Some(b) => Some(b.merge(r)),
        })
    }
}
