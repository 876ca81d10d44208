use super::{DEFAULT_RANGE, Heuristic};
use crate::error::BotError;
use crate::runs::{adjacent_same_color, find_all_runs, tiles_that_crush};
use crush_core::game::match_state::EXTRA_TURN_MIN_CRUSH;
use crush_core::model::board::{Board, MIN_RUN};
use crush_core::model::moves::Move;
use crush_core::model::tile::Tile;
use std::cell::Cell;
use std::collections::BTreeSet;

/// Cells reached from each swapped tile when looking for its opening match.
const SWAP_REACH: usize = 2;

/// `(cells, points per cell)` tiers of the removal schedule.
const SCHEDULE: [(usize, f64); 3] = [(6, 4.0), (8, 2.0), (10, 1.0)];

/// Points shared by every cell removed past the schedule.
const TAIL_POINTS: f64 = 50.0;

/// Scores a swap by how many cells it removes, directly and through the
/// chain reactions that follow.
///
/// Evaluating also records whether the opening match was big enough for an
/// extra turn; read it back with [`MoveImpactHeuristic::granted_extra_turn`].
pub struct MoveImpactHeuristic<'a> {
    board: &'a Board,
    mv: Move,
    range: f64,
    extra_turn: Cell<Option<bool>>,
}

impl<'a> MoveImpactHeuristic<'a> {
    pub fn new(board: &'a Board, mv: Move) -> Self {
        Self {
            board,
            mv,
            range: DEFAULT_RANGE,
            extra_turn: Cell::new(None),
        }
    }

    pub fn with_range(mut self, range: f64) -> Self {
        self.range = range;
        self
    }

    pub fn board(&self) -> &Board {
        self.board
    }

    pub fn mv(&self) -> &Move {
        &self.mv
    }

    /// `None` until [`Heuristic::evaluate`] has run.
    pub fn granted_extra_turn(&self) -> Option<bool> {
        self.extra_turn.get()
    }

    /// Cells removed by the swap itself, as tiles of the unswapped board.
    pub fn initial_removed(&self) -> Result<BTreeSet<Tile>, BotError> {
        let swapped = self.board.after_swap(&self.mv)?;
        let moved = self.mv.tiles().map(|tile| swapped.tile_at(tile.x(), tile.y()));
        let [Some(first), Some(second)] = moved else {
            return Err(BotError::InvalidArgument(format!(
                "move {} leaves the board",
                self.mv
            )));
        };

        let mut candidates = BTreeSet::new();
        for tile in [first, second] {
            candidates.extend(adjacent_same_color(&swapped, tile, SWAP_REACH)?);
            candidates.insert(tile);
        }

        // When only one side of the swap matched, count the other position.
        let mut crushed = tiles_that_crush(&candidates);
        match (crushed.contains(&first), crushed.contains(&second)) {
            (true, false) => {
                crushed.remove(&first);
                crushed.insert(second);
            }
            (false, true) => {
                crushed.remove(&second);
                crushed.insert(first);
            }
            _ => {}
        }

        Ok(crushed
            .iter()
            .filter_map(|tile| self.board.tile_at(tile.x(), tile.y()))
            .collect())
    }

    /// Cells removed by chain reactions on a board that has already had its
    /// first crush resolved.
    pub fn chained_removed(board: &Board) -> usize {
        let runs = find_all_runs(board);
        if runs.len() < MIN_RUN {
            return 0;
        }
        runs.len() + Self::chained_removed(&board.after_cascade_step(&runs))
    }
}

impl Heuristic for MoveImpactHeuristic<'_> {
    fn range(&self) -> f64 {
        self.range
    }

    fn evaluate(&self) -> Result<f64, BotError> {
        let initial = self.initial_removed()?;
        self.extra_turn.set(Some(initial.len() >= EXTRA_TURN_MIN_CRUSH));

        let settled = self.board.after_first_cascade(&self.mv)?;
        let removed = initial.len() + Self::chained_removed(&settled);
        Ok(removal_score(removed, self.board.playable_cells()).min(self.range))
    }
}

/// Diminishing-returns value of removing `removed` cells from a board with
/// `cells` playable cells.
pub fn removal_score(removed: usize, cells: usize) -> f64 {
    let mut remaining = removed;
    let mut score = 0.0;

    for (count, points) in SCHEDULE {
        let taken = remaining.min(count);
        score += taken as f64 * points;
        remaining -= taken;
    }

    if remaining > 0 && cells > 0 {
        score += remaining as f64 * TAIL_POINTS / cells as f64;
    }
    score
}
