use super::direction::Direction;
use super::tile::Tile;
use core::fmt;
use thiserror::Error;

/// Errors raised when a move or its directed form is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("move contains no tiles")]
    EmptyMove,
    #[error("a move swaps exactly two tiles, found {count}")]
    InvalidMove { count: usize },
    #[error("move swaps the tile at ({x}, {y}) with itself")]
    SameTiles { x: usize, y: usize },
    #[error("tiles at ({x1}, {y1}) and ({x2}, {y2}) are not axis-adjacent")]
    InvalidDirectionForMove {
        x1: usize,
        y1: usize,
        x2: usize,
        y2: usize,
    },
    #[error("direction code {0} is not one of 2, 4, 6 or 8")]
    InvalidDirection(i32),
    #[error("cell ({x}, {y}) lies outside the board")]
    OutOfBounds { x: i64, y: i64 },
}

/// An ordered pair of tiles to be swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    first: Tile,
    second: Tile,
}

impl Move {
    /// Builds a move without validating adjacency; `directed` reports problems.
    pub const fn new(first: Tile, second: Tile) -> Self {
        Self { first, second }
    }

    pub fn from_tiles(tiles: &[Tile]) -> Result<Self, MoveError> {
        match tiles {
            [] => Err(MoveError::EmptyMove),
            [first, second] => Ok(Self::new(*first, *second)),
            other => Err(MoveError::InvalidMove { count: other.len() }),
        }
    }

    pub const fn first(&self) -> Tile {
        self.first
    }

    pub const fn second(&self) -> Tile {
        self.second
    }

    pub const fn tiles(&self) -> [Tile; 2] {
        [self.first, self.second]
    }

    /// `[x1, y1, x2, y2]`.
    pub const fn cords(&self) -> [usize; 4] {
        [self.first.x(), self.first.y(), self.second.x(), self.second.y()]
    }

    /// Highest row touched by the swap.
    pub fn max_y(&self) -> usize {
        self.first.y().max(self.second.y())
    }

    /// True when both moves swap the same two cells, in either order.
    pub fn same_cells(&self, other: &Move) -> bool {
        (self.first.same_position(other.first) && self.second.same_position(other.second))
            || (self.first.same_position(other.second) && self.second.same_position(other.first))
    }

    /// Canonical `(origin, direction)` form, with the first tile as origin.
    pub fn directed(&self) -> Result<DirectedMove, MoveError> {
        let (x1, y1) = self.first.position();
        let (x2, y2) = self.second.position();

        if x1 == x2 && y1 == y2 {
            return Err(MoveError::SameTiles { x: x1, y: y1 });
        }
        if !self.first.is_adjacent_to(self.second) {
            return Err(MoveError::InvalidDirectionForMove { x1, y1, x2, y2 });
        }

        let direction = if x1 > x2 {
            Direction::Left
        } else if x1 < x2 {
            Direction::Right
        } else if y1 > y2 {
            Direction::Down
        } else {
            Direction::Up
        };

        Ok(DirectedMove {
            x: x1,
            y: y1,
            direction,
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x1, y1, x2, y2] = self.cords();
        write!(f, "({x1},{y1})<->({x2},{y2})")
    }
}

/// A swap expressed as an origin cell and the direction of its partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirectedMove {
    pub x: usize,
    pub y: usize,
    pub direction: Direction,
}

impl DirectedMove {
    /// Partner cell, if it does not fall below column or row zero.
    pub fn target(&self) -> Option<(usize, usize)> {
        self.direction.step(self.x, self.y)
    }

    /// `[x, y, direction_code]`.
    pub fn to_array(&self) -> [i32; 3] {
        [self.x as i32, self.y as i32, self.direction.code()]
    }

    pub fn from_array(raw: [i32; 3]) -> Result<Self, MoveError> {
        let [x, y, code] = raw;
        if x < 0 || y < 0 {
            return Err(MoveError::OutOfBounds {
                x: i64::from(x),
                y: i64::from(y),
            });
        }
        let direction = Direction::from_code(code).ok_or(MoveError::InvalidDirection(code))?;
        Ok(Self {
            x: x as usize,
            y: y as usize,
            direction,
        })
    }
}
