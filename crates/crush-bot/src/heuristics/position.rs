use super::{DEFAULT_RANGE, Heuristic};
use crate::error::BotError;
use crush_core::model::board::Board;
use crush_core::model::moves::Move;

/// Prefers swaps close to the bottom of the board, where the resulting
/// cascade disturbs more of the cells above it.
#[derive(Debug, Clone)]
pub struct PositionalHeuristic {
    playable_rows: usize,
    mv: Move,
    range: f64,
}

impl PositionalHeuristic {
    pub fn new(board: &Board, mv: Move) -> Self {
        Self {
            playable_rows: board.playable_rows(),
            mv,
            range: DEFAULT_RANGE,
        }
    }

    pub fn with_range(mut self, range: f64) -> Self {
        self.range = range;
        self
    }
}

impl Heuristic for PositionalHeuristic {
    fn range(&self) -> f64 {
        self.range
    }

    fn evaluate(&self) -> Result<f64, BotError> {
        let top = self.mv.max_y();
        if top >= self.playable_rows {
            return Err(BotError::InvalidArgument(format!(
                "move {} reaches row {top} of a board with {} playable rows",
                self.mv, self.playable_rows
            )));
        }
        let step = self.range / self.playable_rows as f64;
        Ok(step * (self.playable_rows - top - 1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crush_core::model::color::Color;
    use crush_core::model::tile::Tile;

    fn ten_by_ten() -> Board {
        let row: Vec<i32> = (0..10).collect();
        let scheme: Vec<Vec<i32>> = (0..10)
            .map(|shift| row.iter().map(|c| (c + shift) % 7).collect())
            .collect();
        Board::from_scheme(scheme.as_slice()).unwrap()
    }

    fn swap(a: (usize, usize), b: (usize, usize)) -> Move {
        Move::new(
            Tile::new(a.0, a.1, Color::Known(0)),
            Tile::new(b.0, b.1, Color::Known(1)),
        )
    }

    fn score(mv: Move) -> f64 {
        PositionalHeuristic::new(&ten_by_ten(), mv).evaluate().unwrap()
    }

    #[test]
    fn higher_rows_score_lower() {
        assert!((score(swap((3, 6), (4, 6))) - 30.0).abs() < 1e-9);
        assert!((score(swap((3, 0), (4, 0))) - 90.0).abs() < 1e-9);
        assert!((score(swap((3, 0), (3, 1))) - 80.0).abs() < 1e-9);
        assert_eq!(score(swap((3, 9), (3, 8))), 0.0);
    }

    #[test]
    fn only_the_highest_cell_counts() {
        assert_eq!(score(swap((5, 4), (5, 5))), score(swap((0, 5), (1, 5))));
    }

    #[test]
    fn range_scales_the_step() {
        let heuristic =
            PositionalHeuristic::new(&ten_by_ten(), swap((0, 0), (1, 0))).with_range(10.0);
        assert!((heuristic.evaluate().unwrap() - 9.0).abs() < 1e-9);
    }

    #[test]
    fn moves_above_the_playable_area_are_rejected() {
        let board = ten_by_ten().with_playable_rows(5).unwrap();
        let heuristic = PositionalHeuristic::new(&board, swap((0, 5), (0, 4)));
        assert!(matches!(
            heuristic.evaluate(),
            Err(BotError::InvalidArgument(_))
        ));
    }
}
