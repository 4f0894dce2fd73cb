//! Geometric primitives in PDF user space.
//!
//! PDF user space has its origin at the lower-left corner of the page and
//! the y axis pointing up, so the "top" of a rectangle is its larger y value.

/// A 2D point in user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in user space, stored as normalized corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge
    pub x0: f32,
    /// Bottom edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Top edge
    pub y1: f32,
}

impl Rect {
    /// Create a rectangle from two opposite corners in any order.
    ///
    /// # Examples
    ///
    /// ```
    /// use taxform_oxide::geometry::Rect;
    ///
    /// let rect = Rect::from_corners(110.0, 70.0, 10.0, 20.0);
    /// assert_eq!(rect.x0, 10.0);
    /// assert_eq!(rect.y1, 70.0);
    /// assert_eq!(rect.width(), 100.0);
    /// ```
    pub fn from_corners(ax: f32, ay: f32, bx: f32, by: f32) -> Self {
        Self {
            x0: ax.min(bx),
            y0: ay.min(by),
            x1: ax.max(bx),
            y1: ay.max(by),
        }
    }

    /// Create a rectangle from its lower-left corner and dimensions.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::from_corners(x, y, x + width, y + height)
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Top edge (larger y).
    pub fn top(&self) -> f32 {
        self.y1
    }

    /// Check whether two rectangles overlap with a non-empty area.
    ///
    /// Rectangles that only share an edge do not intersect.
    ///
    /// # Examples
    ///
    /// ```
    /// use taxform_oxide::geometry::Rect;
    ///
    /// let r1 = Rect::new(0.0, 0.0, 100.0, 100.0);
    /// let r2 = Rect::new(50.0, 50.0, 100.0, 100.0);
    /// let r3 = Rect::new(100.0, 0.0, 10.0, 10.0);
    ///
    /// assert!(r1.intersects(&r2));
    /// assert!(!r1.intersects(&r3));
    /// ```
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }

    /// Smallest rectangle containing both rectangles.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Region above and to the left of this rectangle where a printed
    /// caption for a form widget usually sits.
    ///
    /// The region keeps the widget's right edge, extends left by
    /// `width_factor` times the widget width, and spans `margin` units
    /// upward from the widget's top edge.
    pub fn caption_region(&self, width_factor: f32, margin: f32) -> Rect {
        Rect {
            x0: self.x0 - self.width() * width_factor,
            y0: self.y1,
            x1: self.x1,
            y1: self.y1 + margin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_normalizes() {
        let rect = Rect::from_corners(200.0, 700.0, 100.0, 680.0);
        assert_eq!(rect, Rect::new(100.0, 680.0, 100.0, 20.0));
        assert_eq!(rect.height(), 20.0);
        assert_eq!(rect.top(), 700.0);
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn test_contained_rect_intersects() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(10.0, 10.0, 5.0, 5.0);
        assert!(outer.intersects(&inner));
        assert!(inner.intersects(&outer));
    }

    #[test]
    fn test_union() {
        let r1 = Rect::new(0.0, 0.0, 50.0, 50.0);
        let r2 = Rect::new(25.0, 25.0, 50.0, 50.0);
        let union = r1.union(&r2);
        assert_eq!(union, Rect::from_corners(0.0, 0.0, 75.0, 75.0));
    }

    #[test]
    fn test_caption_region() {
        let widget = Rect::from_corners(300.0, 700.0, 400.0, 712.0);
        let region = widget.caption_region(1.5, 30.0);
        assert_eq!(region.x0, 150.0);
        assert_eq!(region.x1, 400.0);
        assert_eq!(region.y0, 712.0);
        assert_eq!(region.y1, 742.0);
    }
}
