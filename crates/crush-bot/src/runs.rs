//! Run detection over a board.
//!
//! A run is a line of at least three same-colored cells. Unknown cells never
//! match, so they never appear in any result.

use crate::error::BotError;
use crush_core::model::board::{Board, MIN_RUN};
use crush_core::model::color::Color;
use crush_core::model::direction::Direction;
use crush_core::model::tile::Tile;
use std::collections::{BTreeMap, BTreeSet};

/// Step limit meaning "walk until the colour changes".
pub const UNBOUNDED: usize = usize::MAX;

/// Walks from `origin` towards `direction`, collecting each next cell while it
/// matches the previous one. The origin itself is never part of the result.
pub fn same_color_run(
    board: &Board,
    origin: Tile,
    direction: Direction,
    max_steps: usize,
) -> Result<BTreeSet<Tile>, BotError> {
    let start = seed_tile(board, origin)?;
    Ok(walk(board, start, direction, max_steps))
}

/// Union of the four directional walks from `origin`.
pub fn adjacent_same_color(
    board: &Board,
    origin: Tile,
    max_steps: usize,
) -> Result<BTreeSet<Tile>, BotError> {
    let start = seed_tile(board, origin)?;
    Ok(adjacent(board, start, max_steps))
}

/// Keeps every candidate that shares a color and a row or column with at
/// least two other candidates.
///
/// Candidates are expected to come from directional walks; an arbitrary set
/// of same-colored cells spread over a row over-reports.
pub fn tiles_that_crush(candidates: &BTreeSet<Tile>) -> BTreeSet<Tile> {
    let mut columns: BTreeMap<(Color, usize), Vec<Tile>> = BTreeMap::new();
    let mut rows: BTreeMap<(Color, usize), Vec<Tile>> = BTreeMap::new();

    for tile in candidates.iter().filter(|tile| tile.color().is_known()) {
        columns
            .entry((tile.color(), tile.x()))
            .or_default()
            .push(*tile);
        rows.entry((tile.color(), tile.y())).or_default().push(*tile);
    }

    columns
        .into_values()
        .chain(rows.into_values())
        .filter(|group| group.len() >= MIN_RUN)
        .flatten()
        .collect()
}

/// Every playable cell that takes part in some run.
pub fn find_all_runs(board: &Board) -> BTreeSet<Tile> {
    let mut runs = BTreeSet::new();
    for tile in board.playable_tiles().filter(|tile| tile.color().is_known()) {
        let mut candidates = adjacent(board, tile, UNBOUNDED);
        candidates.insert(tile);
        runs.extend(tiles_that_crush(&candidates));
    }
    runs
}

fn seed_tile(board: &Board, origin: Tile) -> Result<Tile, BotError> {
    if !board.contains(origin.x(), origin.y()) {
        return Err(BotError::InvalidArgument(format!(
            "seed tile {origin} lies outside the {}x{} playable area",
            board.cols(),
            board.playable_rows()
        )));
    }
    board.tile_at(origin.x(), origin.y()).ok_or_else(|| {
        BotError::InvalidArgument(format!("no tile at ({}, {})", origin.x(), origin.y()))
    })
}

fn adjacent(board: &Board, start: Tile, max_steps: usize) -> BTreeSet<Tile> {
    Direction::ALL
        .iter()
        .flat_map(|direction| walk(board, start, *direction, max_steps))
        .collect()
}

fn walk(board: &Board, start: Tile, direction: Direction, max_steps: usize) -> BTreeSet<Tile> {
    let mut run = BTreeSet::new();
    let mut previous = start;

    while run.len() < max_steps {
        let Some((x, y)) = direction.step(previous.x(), previous.y()) else {
            break;
        };
        if !board.contains(x, y) {
            break;
        }
        let Some(next) = board.tile_at(x, y) else {
            break;
        };
        if !previous.color().matches(next.color()) {
            break;
        }
        run.insert(next);
        previous = next;
    }

    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const CROSS: [[i32; 10]; 10] = [
        [0, 1, 2, 3, 4, 5, 6, 0, 1, 2],
        [1, 2, 3, 4, 6, 6, 0, 1, 2, 3],
        [2, 3, 6, 6, 6, 6, 1, 2, 3, 4],
        [3, 4, 5, 6, 6, 1, 2, 3, 4, 5],
        [4, 5, 6, 0, 6, 2, 3, 4, 5, 6],
        [5, 6, 0, 1, 2, 3, 4, 5, 6, 0],
        [0, 1, 2, 3, 4, 5, 6, 0, 1, 2],
        [1, 2, 3, 4, 5, 6, 0, 1, 2, 3],
        [2, 3, 4, 5, 6, 0, 1, 2, 3, 4],
        [3, 4, 5, 6, 0, 1, 2, 3, 4, 5],
    ];

    fn positions(tiles: &BTreeSet<Tile>) -> Vec<(usize, usize)> {
        tiles.iter().map(|tile| tile.position()).collect()
    }

    fn at(board: &Board, x: usize, y: usize) -> Tile {
        board.tile_at(x, y).unwrap()
    }

    #[test]
    fn walks_stop_at_first_mismatch() {
        let board = Board::from_scheme(&CROSS).unwrap();
        let origin = at(&board, 4, 7);

        let left = same_color_run(&board, origin, Direction::Left, 3).unwrap();
        assert_eq!(positions(&left), vec![(2, 7), (3, 7)]);

        let right = same_color_run(&board, origin, Direction::Right, 3).unwrap();
        assert_eq!(positions(&right), vec![(5, 7)]);

        let up = same_color_run(&board, origin, Direction::Up, 3).unwrap();
        assert_eq!(positions(&up), vec![(4, 8)]);

        let down = same_color_run(&board, origin, Direction::Down, 3).unwrap();
        assert_eq!(positions(&down), vec![(4, 5), (4, 6)]);
    }

    #[test]
    fn walks_respect_step_limit() {
        let board = Board::from_scheme(&CROSS).unwrap();
        let origin = at(&board, 4, 7);
        let left = same_color_run(&board, origin, Direction::Left, 1).unwrap();
        assert_eq!(positions(&left), vec![(3, 7)]);
        assert!(
            same_color_run(&board, origin, Direction::Left, 0)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn adjacent_unions_all_directions() {
        let board = Board::from_scheme(&CROSS).unwrap();
        let tiles = adjacent_same_color(&board, at(&board, 4, 7), 5).unwrap();
        assert_eq!(
            positions(&tiles),
            vec![(2, 7), (3, 7), (4, 5), (4, 6), (4, 8), (5, 7)]
        );
    }

    #[test]
    fn seed_outside_playable_area_is_rejected() {
        let board = Board::from_scheme(&CROSS)
            .unwrap()
            .with_playable_rows(5)
            .unwrap();
        let staged = at(&board, 0, 7);
        assert!(matches!(
            same_color_run(&board, staged, Direction::Up, 2),
            Err(BotError::InvalidArgument(_))
        ));
        assert!(matches!(
            adjacent_same_color(&board, Tile::new(10, 0, Color::Known(1)), 2),
            Err(BotError::InvalidArgument(_))
        ));
    }

    #[test]
    fn unknown_cells_never_join_a_run() {
        let board = Board::from_scheme(&[[-1, -1, -1, -1], [2, -1, -1, 2], [-1, -1, -1, -1]])
            .unwrap();
        for tile in board.playable_tiles() {
            assert!(adjacent_same_color(&board, tile, UNBOUNDED).unwrap().is_empty());
        }
        assert!(find_all_runs(&board).is_empty());
    }

    #[test]
    fn crush_keeps_lines_of_three() {
        let board = Board::from_scheme(&[
            [1, 2, 2, 2],
            [3, 2, 4, 5],
            [3, 2, 5, 4],
            [3, 1, 4, 5],
        ])
        .unwrap();
        let all = find_all_runs(&board);
        assert_eq!(
            positions(&all),
            vec![(0, 0), (0, 1), (0, 2), (1, 1), (1, 2), (1, 3), (2, 3), (3, 3)]
        );
        assert_eq!(all, board.crushing_cells());
    }

    #[test]
    fn crush_ignores_pairs() {
        let board = Board::from_scheme(&[[1, 1, 2], [2, 3, 3]]).unwrap();
        let candidates: BTreeSet<Tile> = board.playable_tiles().collect();
        assert!(tiles_that_crush(&candidates).is_empty());
    }

    #[test]
    fn crush_is_idempotent_over_random_candidates() {
        for seed in 0..50u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let scheme: Vec<Vec<i32>> = (0..8)
                .map(|_| (0..8).map(|_| rng.gen_range(-1..4)).collect())
                .collect();
            let board = Board::from_scheme(scheme.as_slice()).unwrap();

            let candidates: BTreeSet<Tile> = board
                .playable_tiles()
                .filter(|_| rng.gen_bool(0.6))
                .collect();
            let crushed = tiles_that_crush(&candidates);
            assert!(crushed.is_subset(&candidates), "seed {seed}");

            let mut widened = crushed.clone();
            widened.extend(candidates.iter().copied());
            assert_eq!(tiles_that_crush(&widened), crushed, "seed {seed}");
            assert_eq!(tiles_that_crush(&crushed), crushed, "seed {seed}");
        }
    }
}
