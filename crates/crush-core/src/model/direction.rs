use core::fmt;

/// Axis direction of a swap, with `Up` pointing towards higher rows.
///
/// Integer codes follow a numeric keypad: 8 up, 2 down, 4 left, 6 right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            8 => Some(Direction::Up),
            2 => Some(Direction::Down),
            4 => Some(Direction::Left),
            6 => Some(Direction::Right),
            _ => None,
        }
    }

    pub const fn code(self) -> i32 {
        match self {
            Direction::Up => 8,
            Direction::Down => 2,
            Direction::Left => 4,
            Direction::Right => 6,
        }
    }

    /// Column and row offsets of one step.
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Neighbour of `(x, y)` one step away, or `None` when it would go below zero.
    pub fn step(self, x: usize, y: usize) -> Option<(usize, usize)> {
        let (dx, dy) = self.delta();
        Some((x.checked_add_signed(dx)?, y.checked_add_signed(dy)?))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::Direction;

    #[test]
    fn codes_round_trip() {
        for direction in Direction::ALL {
            assert_eq!(Direction::from_code(direction.code()), Some(direction));
        }
        assert_eq!(Direction::from_code(5), None);
    }

    #[test]
    fn step_stops_at_zero_edge() {
        assert_eq!(Direction::Up.step(0, 0), Some((0, 1)));
        assert_eq!(Direction::Down.step(0, 0), None);
        assert_eq!(Direction::Left.step(0, 4), None);
        assert_eq!(Direction::Right.step(2, 4), Some((3, 4)));
    }
}
