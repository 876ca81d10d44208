use crate::model::board::{Board, BoardError};
use crate::model::moves::{Move, MoveError};
use core::fmt;
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;

/// Smallest opening crush that lets the mover play again.
pub const EXTRA_TURN_MIN_CRUSH: usize = 4;

const MAX_RESHUFFLES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub const LOOP: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    pub const fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }

    pub const fn other(self) -> PlayerId {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerId::One => f.write_str("one"),
            PlayerId::Two => f.write_str("two"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRules {
    pub cols: usize,
    pub playable_rows: usize,
    pub staging_rows: usize,
    pub colors: u8,
    pub turns: u32,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            cols: 10,
            playable_rows: 10,
            staging_rows: 10,
            colors: 7,
            turns: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("match already finished after {0} turns")]
    Finished(u32),
    #[error("move {cords:?} is not legal on the current board")]
    IllegalMove { cords: [usize; 4] },
    #[error(transparent)]
    Move(#[from] MoveError),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("no board with a legal move after {0} attempts")]
    NoMovesAvailable(usize),
}

/// What a single applied move did to the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub player: PlayerId,
    pub mv: Move,
    pub initial_removed: usize,
    pub removed: usize,
    pub cascades: usize,
    pub extra_turn: bool,
    pub reshuffled: bool,
}

/// Two-player match on a live board with random refills.
#[derive(Debug, Clone)]
pub struct MatchState {
    rules: MatchRules,
    board: Board,
    scores: [u32; 2],
    to_move: PlayerId,
    turns_played: u32,
    extra_turns: [u32; 2],
    rng: StdRng,
    seed: u64,
}

impl MatchState {
    pub fn with_seed(rules: MatchRules, seed: u64) -> Result<Self, MatchError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let board = fresh_board(&rules, &mut rng)?;
        Ok(Self::assemble(rules, board, rng, seed))
    }

    /// Starts from a prepared board instead of a random one.
    pub fn from_board(rules: MatchRules, board: Board, seed: u64) -> Self {
        Self::assemble(rules, board, StdRng::seed_from_u64(seed), seed)
    }

    fn assemble(rules: MatchRules, board: Board, rng: StdRng, seed: u64) -> Self {
        Self {
            rules,
            board,
            scores: [0; 2],
            to_move: PlayerId::One,
            turns_played: 0,
            extra_turns: [0; 2],
            rng,
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> PlayerId {
        self.to_move
    }

    pub fn scores(&self) -> [u32; 2] {
        self.scores
    }

    pub fn score(&self, player: PlayerId) -> u32 {
        self.scores[player.index()]
    }

    pub fn extra_turns(&self, player: PlayerId) -> u32 {
        self.extra_turns[player.index()]
    }

    pub fn turns_played(&self) -> u32 {
        self.turns_played
    }

    pub fn is_finished(&self) -> bool {
        self.turns_played >= self.rules.turns
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.board.legal_moves()
    }

    /// Plays `mv` for the player to move and resolves every cascade,
    /// refilling vacated cells at random between steps.
    pub fn apply_move(&mut self, mv: &Move) -> Result<TurnOutcome, MatchError> {
        if self.is_finished() {
            return Err(MatchError::Finished(self.turns_played));
        }
        if !self.board.legal_moves().iter().any(|legal| legal.same_cells(mv)) {
            return Err(MatchError::IllegalMove { cords: mv.cords() });
        }

        let player = self.to_move;
        let mut board = self.board.after_swap(mv)?;
        let mut initial_removed = 0;
        let mut removed = 0;
        let mut cascades = 0;

        loop {
            let crushing = board.crushing_cells();
            if crushing.is_empty() {
                break;
            }
            if cascades == 0 {
                initial_removed = crushing.len();
            }
            removed += crushing.len();
            cascades += 1;
            board = board.after_cascade_step(&crushing);
            board.fill_unknown(self.rules.colors, &mut self.rng);
        }

        let extra_turn = initial_removed >= EXTRA_TURN_MIN_CRUSH;
        self.scores[player.index()] += removed as u32;
        self.turns_played += 1;
        if extra_turn {
            self.extra_turns[player.index()] += 1;
        } else {
            self.to_move = player.other();
        }

        let reshuffled = board.legal_moves().is_empty();
        if reshuffled {
            board = fresh_board(&self.rules, &mut self.rng)?;
        }
        self.board = board;

        Ok(TurnOutcome {
            player,
            mv: *mv,
            initial_removed,
            removed,
            cascades,
            extra_turn,
            reshuffled,
        })
    }
}

fn fresh_board(rules: &MatchRules, rng: &mut StdRng) -> Result<Board, MatchError> {
    for _ in 0..MAX_RESHUFFLES {
        let board = Board::random(
            rules.cols,
            rules.playable_rows,
            rules.staging_rows,
            rules.colors,
            rng,
        )?;
        if !board.legal_moves().is_empty() {
            return Ok(board);
        }
    }
    Err(MatchError::NoMovesAvailable(MAX_RESHUFFLES))
}
