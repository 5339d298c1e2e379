//! Grid geometry.
//!
//! `Point` is an unsigned 2D cell coordinate. Neighbor lookups are
//! bounds-aware: stepping off the edge of the grid yields `None` rather
//! than wrapping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell coordinate on the board grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// The cell directly above, or `None` on the top row.
    pub fn top(&self) -> Option<Point> {
        self.y.checked_sub(1).map(|y| Point::new(self.x, y))
    }

    /// The cell directly below, or `None` on the bottom row.
    pub fn bottom(&self, height: u16) -> Option<Point> {
        self.y
            .checked_add(1)
            .filter(|&y| y < height)
            .map(|y| Point::new(self.x, y))
    }

    /// The cell to the left, or `None` in the leftmost column.
    pub fn left(&self) -> Option<Point> {
        self.x.checked_sub(1).map(|x| Point::new(x, self.y))
    }

    /// The cell to the right, or `None` in the rightmost column.
    pub fn right(&self, width: u16) -> Option<Point> {
        self.x
            .checked_add(1)
            .filter(|&x| x < width)
            .map(|x| Point::new(x, self.y))
    }

    /// The orthogonal neighbors that exist on a `width` x `height` grid.
    pub fn neighbors(&self, width: u16, height: u16) -> impl Iterator<Item = Point> {
        [
            self.top(),
            self.bottom(height),
            self.left(),
            self.right(width),
        ]
        .into_iter()
        .flatten()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_point_has_four_neighbors() {
        let p = Point::new(1, 1);
        let neighbors: Vec<Point> = p.neighbors(3, 3).collect();
        assert_eq!(neighbors.len(), 4);
        assert!(neighbors.contains(&Point::new(1, 0)));
        assert!(neighbors.contains(&Point::new(1, 2)));
        assert!(neighbors.contains(&Point::new(0, 1)));
        assert!(neighbors.contains(&Point::new(2, 1)));
    }

    #[test]
    fn test_corner_is_clipped() {
        let origin = Point::new(0, 0);
        assert_eq!(origin.top(), None);
        assert_eq!(origin.left(), None);
        assert_eq!(origin.bottom(2), Some(Point::new(0, 1)));
        assert_eq!(origin.right(2), Some(Point::new(1, 0)));

        let far = Point::new(1, 1);
        assert_eq!(far.bottom(2), None);
        assert_eq!(far.right(2), None);
        assert_eq!(far.neighbors(2, 2).count(), 2);
    }

    #[test]
    fn test_degenerate_grid() {
        let p = Point::new(0, 0);
        assert_eq!(p.neighbors(1, 1).count(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Point::new(3, 7).to_string(), "(3,7)");
    }
}
