use super::{BotDifficulty, Policy, log_decision};
use crate::error::BotError;
use crate::search::score_move;
use crate::weighting::SliderModel;
use crush_core::model::board::Board;
use crush_core::model::moves::Move;

/// One-ply player: the legal move with the best composite score wins.
#[derive(Debug, Clone, Copy)]
pub struct GreedyPolicy {
    slider_factor: f64,
}

impl GreedyPolicy {
    pub const fn new(slider_factor: f64) -> Self {
        Self { slider_factor }
    }
}

impl Default for GreedyPolicy {
    fn default() -> Self {
        Self::new(SliderModel::DEFAULT_FACTOR)
    }
}

impl Policy for GreedyPolicy {
    fn difficulty(&self) -> BotDifficulty {
        BotDifficulty::Normal
    }

    fn choose_move(&mut self, board: &Board, legal: &[Move]) -> Result<Move, BotError> {
        let mut best: Option<(Move, f64)> = None;
        for mv in legal {
            let (score, _) = score_move(board, *mv, self.slider_factor)?;
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((*mv, score));
            }
        }

        let (chosen, _) = best.ok_or(BotError::NoLegalMoves)?;
        log_decision(self.difficulty(), board, legal.len(), chosen, "best_single_ply");
        Ok(chosen)
    }
}
