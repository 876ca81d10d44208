use super::color::Color;
use super::direction::Direction;
use super::moves::{DirectedMove, Move, MoveError};
use super::tile::Tile;
use core::fmt;
use rand::Rng;
use std::collections::BTreeSet;
use thiserror::Error;

/// Shortest line of matching colors that crushes.
pub const MIN_RUN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("a board needs at least one column and one row")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("color code {0} is out of range")]
    InvalidColor(i32),
    #[error("{playable} playable rows exceed the {rows} rows of the board")]
    PlayableRows { playable: usize, rows: usize },
    #[error("at least 3 colors are required, got {0}")]
    TooFewColors(u8),
}

/// Fixed-size grid of colored cells.
///
/// Rows `0..playable_rows` form the playable area. Rows above it are the
/// staging area: they are never swapped or matched, and only feed gravity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cols: usize,
    rows: usize,
    playable_rows: usize,
    cells: Vec<Color>,
}

impl Board {
    /// Builds a board from color codes listed top row first, `-1` for unknown.
    /// Every row is playable.
    pub fn from_scheme<R: AsRef<[i32]>>(scheme: &[R]) -> Result<Self, BoardError> {
        let rows = scheme.len();
        let cols = scheme.first().map(|row| row.as_ref().len()).unwrap_or(0);
        if rows == 0 || cols == 0 {
            return Err(BoardError::Empty);
        }

        let mut cells = vec![Color::Unknown; cols * rows];
        for (index, row) in scheme.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(BoardError::Ragged {
                    row: index,
                    expected: cols,
                    found: row.len(),
                });
            }
            let y = rows - index - 1;
            for (x, &code) in row.iter().enumerate() {
                cells[y * cols + x] = Color::from_code(code).ok_or(BoardError::InvalidColor(code))?;
            }
        }

        Ok(Self {
            cols,
            rows,
            playable_rows: rows,
            cells,
        })
    }

    /// Restricts the playable area to the bottom `playable` rows.
    pub fn with_playable_rows(mut self, playable: usize) -> Result<Self, BoardError> {
        if playable == 0 || playable > self.rows {
            return Err(BoardError::PlayableRows {
                playable,
                rows: self.rows,
            });
        }
        self.playable_rows = playable;
        Ok(self)
    }

    /// Random board without any run of three in the playable area.
    pub fn random<R: Rng + ?Sized>(
        cols: usize,
        playable_rows: usize,
        staging_rows: usize,
        colors: u8,
        rng: &mut R,
    ) -> Result<Self, BoardError> {
        if cols == 0 || playable_rows == 0 {
            return Err(BoardError::Empty);
        }
        if colors < 3 {
            return Err(BoardError::TooFewColors(colors));
        }

        let rows = playable_rows + staging_rows;
        let mut board = Self {
            cols,
            rows,
            playable_rows,
            cells: vec![Color::Unknown; cols * rows],
        };

        for y in 0..rows {
            for x in 0..cols {
                let left = (x >= 2)
                    .then(|| (board.color(x - 1, y), board.color(x - 2, y)))
                    .filter(|(a, b)| a == b)
                    .map(|(a, _)| a);
                let below = (y >= 2)
                    .then(|| (board.color(x, y - 1), board.color(x, y - 2)))
                    .filter(|(a, b)| a == b)
                    .map(|(a, _)| a);
                let choices: Vec<u8> = (0..colors)
                    .filter(|id| {
                        let candidate = Some(Color::Known(*id));
                        candidate != left && candidate != below
                    })
                    .collect();
                let pick = choices[rng.gen_range(0..choices.len())];
                let index = board.index(x, y);
                board.cells[index] = Color::Known(pick);
            }
        }

        Ok(board)
    }

    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Total rows, staging area included.
    pub const fn rows(&self) -> usize {
        self.rows
    }

    pub const fn playable_rows(&self) -> usize {
        self.playable_rows
    }

    /// Number of cells in the playable area.
    pub const fn playable_cells(&self) -> usize {
        self.cols * self.playable_rows
    }

    /// True when `(x, y)` lies in the playable area.
    pub const fn contains(&self, x: usize, y: usize) -> bool {
        x < self.cols && y < self.playable_rows
    }

    pub fn tile_at(&self, x: usize, y: usize) -> Option<Tile> {
        (x < self.cols && y < self.rows).then(|| Tile::new(x, y, self.color(x, y)))
    }

    /// Tiles of the playable area, bottom row first.
    pub fn playable_tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        (0..self.playable_rows)
            .flat_map(move |y| (0..self.cols).map(move |x| Tile::new(x, y, self.color(x, y))))
    }

    pub fn unknown_count(&self) -> usize {
        self.cells.iter().filter(|color| !color.is_known()).count()
    }

    /// Color codes, top row first, as accepted by [`Board::from_scheme`].
    pub fn to_scheme(&self) -> Vec<Vec<i32>> {
        (0..self.rows)
            .rev()
            .map(|y| (0..self.cols).map(|x| self.color(x, y).code()).collect())
            .collect()
    }

    /// Every playable tile that sits in a horizontal or vertical line of
    /// at least three matching colors.
    pub fn crushing_cells(&self) -> BTreeSet<Tile> {
        let mut crushing = BTreeSet::new();
        for y in 0..self.playable_rows {
            self.collect_runs((0..self.cols).map(|x| (x, y)), &mut crushing);
        }
        for x in 0..self.cols {
            self.collect_runs((0..self.playable_rows).map(|y| (x, y)), &mut crushing);
        }
        crushing
    }

    /// Adjacent swaps inside the playable area that produce at least one run,
    /// bottom row first, horizontal swaps before vertical ones.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        let mut probe = self.clone();

        for y in 0..self.playable_rows {
            for x in 0..self.cols {
                let origin = Tile::new(x, y, self.color(x, y));
                for (nx, ny) in [(x + 1, y), (x, y + 1)] {
                    if !self.contains(nx, ny) {
                        continue;
                    }
                    let partner = Tile::new(nx, ny, self.color(nx, ny));
                    if origin.color() == partner.color() {
                        continue;
                    }

                    probe.swap_cells((x, y), (nx, ny));
                    if probe.has_run_through(x, y) || probe.has_run_through(nx, ny) {
                        moves.push(Move::new(origin, partner));
                    }
                    probe.swap_cells((x, y), (nx, ny));
                }
            }
        }

        moves
    }

    /// Resolves the canonical `(x, y, direction)` form against this board.
    pub fn move_from_directed(&self, directed: &DirectedMove) -> Result<Move, MoveError> {
        let out_of_bounds = || MoveError::OutOfBounds {
            x: directed.x as i64,
            y: directed.y as i64,
        };
        let first = self
            .tile_at(directed.x, directed.y)
            .filter(|tile| self.contains(tile.x(), tile.y()))
            .ok_or_else(out_of_bounds)?;
        let (x, y) = directed.target().ok_or_else(out_of_bounds)?;
        let second = self
            .tile_at(x, y)
            .filter(|tile| self.contains(tile.x(), tile.y()))
            .ok_or(MoveError::OutOfBounds {
                x: x as i64,
                y: y as i64,
            })?;
        Ok(Move::new(first, second))
    }

    /// The board right after swapping, before anything crushes.
    pub fn after_swap(&self, mv: &Move) -> Result<Board, MoveError> {
        mv.directed()?;
        for tile in mv.tiles() {
            if !self.contains(tile.x(), tile.y()) {
                return Err(MoveError::OutOfBounds {
                    x: tile.x() as i64,
                    y: tile.y() as i64,
                });
            }
        }

        let mut next = self.clone();
        next.swap_cells(mv.first().position(), mv.second().position());
        Ok(next)
    }

    /// Removes the given cells and lets every column settle once. Vacated
    /// cells at the top of a column become unknown.
    pub fn after_cascade_step<'a, I>(&self, cells: I) -> Board
    where
        I: IntoIterator<Item = &'a Tile>,
    {
        let mut removed = vec![false; self.cells.len()];
        for tile in cells {
            if tile.x() < self.cols && tile.y() < self.rows {
                removed[self.index(tile.x(), tile.y())] = true;
            }
        }

        let mut next = self.clone();
        for x in 0..self.cols {
            let mut write = 0;
            for y in 0..self.rows {
                let index = self.index(x, y);
                if !removed[index] {
                    next.cells[self.index(x, write)] = self.cells[index];
                    write += 1;
                }
            }
            for y in write..self.rows {
                next.cells[self.index(x, y)] = Color::Unknown;
            }
        }
        next
    }

    /// Swap followed by exactly one crush and settle.
    pub fn after_first_cascade(&self, mv: &Move) -> Result<Board, MoveError> {
        let swapped = self.after_swap(mv)?;
        let crushing = swapped.crushing_cells();
        Ok(swapped.after_cascade_step(&crushing))
    }

    /// Swap followed by crush and settle steps until nothing matches.
    pub fn after_full_resolution(&self, mv: &Move) -> Result<Board, MoveError> {
        let mut board = self.after_swap(mv)?;
        loop {
            let crushing = board.crushing_cells();
            if crushing.is_empty() {
                return Ok(board);
            }
            board = board.after_cascade_step(&crushing);
        }
    }

    /// Assigns random colors to every unknown cell, returning how many changed.
    pub fn fill_unknown<R: Rng + ?Sized>(&mut self, colors: u8, rng: &mut R) -> usize {
        let mut filled = 0;
        for cell in self.cells.iter_mut().filter(|color| !color.is_known()) {
            *cell = Color::Known(rng.gen_range(0..colors.max(1)));
            filled += 1;
        }
        filled
    }

    /// Copy whose staging area is hidden behind unknown cells.
    pub fn masked(&self) -> Board {
        let mut masked = self.clone();
        let start = self.index(0, self.playable_rows);
        for cell in &mut masked.cells[start..] {
            *cell = Color::Unknown;
        }
        masked
    }

    const fn index(&self, x: usize, y: usize) -> usize {
        y * self.cols + x
    }

    fn color(&self, x: usize, y: usize) -> Color {
        self.cells[self.index(x, y)]
    }

    fn swap_cells(&mut self, a: (usize, usize), b: (usize, usize)) {
        let first = self.index(a.0, a.1);
        let second = self.index(b.0, b.1);
        self.cells.swap(first, second);
    }

    fn collect_runs<I>(&self, line: I, out: &mut BTreeSet<Tile>)
    where
        I: Iterator<Item = (usize, usize)>,
    {
        let mut run: Vec<Tile> = Vec::new();
        for (x, y) in line {
            let tile = Tile::new(x, y, self.color(x, y));
            if run
                .last()
                .is_some_and(|last| last.color().matches(tile.color()))
            {
                run.push(tile);
                continue;
            }
            if run.len() >= MIN_RUN {
                out.extend(run.iter().copied());
            }
            run.clear();
            run.push(tile);
        }
        if run.len() >= MIN_RUN {
            out.extend(run);
        }
    }

    fn has_run_through(&self, x: usize, y: usize) -> bool {
        let color = self.color(x, y);
        if !color.is_known() {
            return false;
        }
        let horizontal = 1
            + self.count_matching(x, y, Direction::Left, color)
            + self.count_matching(x, y, Direction::Right, color);
        let vertical = 1
            + self.count_matching(x, y, Direction::Down, color)
            + self.count_matching(x, y, Direction::Up, color);
        horizontal >= MIN_RUN || vertical >= MIN_RUN
    }

    fn count_matching(&self, x: usize, y: usize, direction: Direction, color: Color) -> usize {
        let mut count = 0;
        let (mut cx, mut cy) = (x, y);
        while let Some((nx, ny)) = direction.step(cx, cy) {
            if !self.contains(nx, ny) || !self.color(nx, ny).matches(color) {
                break;
            }
            count += 1;
            cx = nx;
            cy = ny;
        }
        count
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.rows).rev() {
            if y + 1 == self.playable_rows && self.playable_rows < self.rows {
                writeln!(f, "{}", "--".repeat(self.cols))?;
            }
            let line = (0..self.cols)
                .map(|x| self.color(x, y).to_string())
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
