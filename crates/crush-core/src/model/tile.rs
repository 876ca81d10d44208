use super::color::Color;
use core::fmt;

/// A colored cell at column `x` and row `y`, with row 0 at the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tile {
    x: usize,
    y: usize,
    color: Color,
}

impl Tile {
    pub const fn new(x: usize, y: usize, color: Color) -> Self {
        Self { x, y, color }
    }

    pub const fn x(self) -> usize {
        self.x
    }

    pub const fn y(self) -> usize {
        self.y
    }

    pub const fn color(self) -> Color {
        self.color
    }

    pub const fn position(self) -> (usize, usize) {
        (self.x, self.y)
    }

    pub const fn same_position(self, other: Tile) -> bool {
        self.x == other.x && self.y == other.y
    }

    /// True when the two tiles differ by exactly one step on exactly one axis.
    pub const fn is_adjacent_to(self, other: Tile) -> bool {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        (dx == 1 && dy == 0) || (dx == 0 && dy == 1)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})={}", self.x, self.y, self.color)
    }
}
