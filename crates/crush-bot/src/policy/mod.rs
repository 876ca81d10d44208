mod greedy;
mod minimax;

pub use greedy::GreedyPolicy;
pub use minimax::MinimaxPolicy;

use crate::error::BotError;
use crate::search::SearchConfig;
use crush_core::model::board::Board;
use crush_core::model::moves::{DirectedMove, Move};
use std::sync::OnceLock;
use tracing::{Level, event};

/// Anything that can pick a move for the side to play.
pub trait Policy: Send {
    fn difficulty(&self) -> BotDifficulty;

    /// Picks one of `legal`. Fails with [`BotError::NoLegalMoves`] when
    /// `legal` is empty.
    fn choose_move(&mut self, board: &Board, legal: &[Move]) -> Result<Move, BotError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BotDifficulty {
    /// First legal move.
    Easy,
    /// Best single-ply score.
    Normal,
    /// Minimax search.
    Hard,
}

impl Default for BotDifficulty {
    fn default() -> Self {
        Self::Hard
    }
}

impl BotDifficulty {
    pub fn from_env() -> Self {
        static CACHED: OnceLock<BotDifficulty> = OnceLock::new();
        *CACHED.get_or_init(|| {
            std::env::var("CRUSH_BOT_DIFFICULTY")
                .ok()
                .and_then(|raw| Self::parse(&raw))
                .unwrap_or_default()
        })
    }

    /// Accepts the canonical names and a few aliases, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" | "first" | "baseline" => Some(Self::Easy),
            "normal" | "greedy" => Some(Self::Normal),
            "hard" | "minimax" | "search" => Some(Self::Hard),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
        }
    }
}

/// Builds the policy for `difficulty`. Only [`BotDifficulty::Hard`] and
/// [`BotDifficulty::Normal`] read `config`.
pub fn policy_for(difficulty: BotDifficulty, config: SearchConfig) -> Box<dyn Policy> {
    match difficulty {
        BotDifficulty::Easy => Box::new(FirstLegalPolicy),
        BotDifficulty::Normal => Box::new(GreedyPolicy::new(config.slider_factor)),
        BotDifficulty::Hard => Box::new(MinimaxPolicy::new(config)),
    }
}

/// Baseline that always plays the first legal move.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstLegalPolicy;

impl Policy for FirstLegalPolicy {
    fn difficulty(&self) -> BotDifficulty {
        BotDifficulty::Easy
    }

    fn choose_move(&mut self, board: &Board, legal: &[Move]) -> Result<Move, BotError> {
        let chosen = legal.first().copied().ok_or(BotError::NoLegalMoves)?;
        log_decision(self.difficulty(), board, legal.len(), chosen, "first_legal");
        Ok(chosen)
    }
}

/// Resolves `[x, y, direction_code]` triples into moves on `board`.
pub fn moves_from_directed(board: &Board, raw: &[[i32; 3]]) -> Result<Vec<Move>, BotError> {
    raw.iter()
        .map(|entry| {
            let directed = DirectedMove::from_array(*entry)?;
            Ok(board.move_from_directed(&directed)?)
        })
        .collect()
}

pub(crate) fn log_decision(
    difficulty: BotDifficulty,
    board: &Board,
    legal_count: usize,
    chosen: Move,
    reason: &str,
) {
    if !tracing::enabled!(target: "crush_bot::policy", Level::INFO) {
        return;
    }

    event!(
        target: "crush_bot::policy",
        Level::INFO,
        difficulty = difficulty.as_str(),
        cols = board.cols(),
        playable_rows = board.playable_rows(),
        legal_count,
        chosen = %chosen,
        reason,
    );
}
