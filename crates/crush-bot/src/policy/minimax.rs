use super::{BotDifficulty, Policy, log_decision};
use crate::error::BotError;
use crate::search::{SearchConfig, SearchDriver};
use crush_core::model::board::Board;
use crush_core::model::moves::Move;

/// Plays the move picked by the alpha-beta search.
#[derive(Debug, Default)]
pub struct MinimaxPolicy {
    driver: SearchDriver,
}

impl MinimaxPolicy {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            driver: SearchDriver::new(config),
        }
    }

    pub fn from_env() -> Self {
        Self::new(SearchConfig::from_env())
    }

    pub fn config(&self) -> &SearchConfig {
        self.driver.config()
    }
}

impl Policy for MinimaxPolicy {
    fn difficulty(&self) -> BotDifficulty {
        BotDifficulty::Hard
    }

    fn choose_move(&mut self, board: &Board, legal: &[Move]) -> Result<Move, BotError> {
        let chosen = self.driver.choose_move(board, legal)?;
        log_decision(self.difficulty(), board, legal.len(), chosen, "minimax");
        Ok(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agrees_with_the_driver() {
        let board = Board::from_scheme(&[
            [0, 1, 2, 3, 3, 5, 4, 4, 1, 2],
            [1, 3, 3, 4, 4, 6, 4, 1, 2, 3],
            [2, 3, 4, 5, 6, 0, 1, 2, 3, 4],
            [3, 4, 5, 6, 0, 1, 2, 3, 4, 5],
        ])
        .unwrap();
        let legal = board.legal_moves();
        let config = SearchConfig::new(2, 1.7);

        let mut policy = MinimaxPolicy::new(config);
        let expected = SearchDriver::new(config).choose_move(&board, &legal).unwrap();
        assert_eq!(policy.choose_move(&board, &legal).unwrap(), expected);
        assert_eq!(policy.config().depth, 2);
    }
}
