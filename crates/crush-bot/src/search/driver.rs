use super::SearchConfig;
use super::tree::{GameTree, NodeId};
use crate::error::BotError;
use crush_core::model::board::Board;
use crush_core::model::moves::Move;
use tracing::{Level, event};

/// Utility added for the side to move when a node has no legal children and
/// no depth is left below it.
const EXHAUSTED_AT_HORIZON: f64 = 4.0;
/// Same, with depth still remaining.
const EXHAUSTED_EARLY: f64 = 3.0;

/// Runs one search per decision, reusing the arena between decisions.
#[derive(Debug, Default)]
pub struct SearchDriver {
    config: SearchConfig,
    tree: GameTree,
}

impl SearchDriver {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            tree: GameTree::new(),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Tree left behind by the last decision: the root and its children.
    pub fn tree(&self) -> &GameTree {
        &self.tree
    }

    /// Picks the legal move with the best minimax utility for the side to
    /// move. Ties keep the earliest move in `legal`.
    pub fn choose_move(&mut self, board: &Board, legal: &[Move]) -> Result<Move, BotError> {
        if legal.is_empty() {
            return Err(BotError::NoLegalMoves);
        }

        self.tree.clear();
        let root = self.tree.add_root(board.clone());
        self.search(
            root,
            self.config.depth.max(1),
            f64::NEG_INFINITY,
            f64::INFINITY,
            false,
            Some(legal),
        )?;

        let mut best: Option<(Move, f64)> = None;
        for &child in self.tree.children(root)? {
            let utility = self.tree.utility(child)?;
            let Some(mv) = self.tree.mv(child)? else {
                continue;
            };
            if best.is_none_or(|(_, top)| utility > top) {
                best = Some((mv, utility));
            }
        }

        let (chosen, utility) = best.ok_or(BotError::NoLegalMoves)?;
        log_search(&self.config, legal.len(), &self.tree, chosen, utility);
        Ok(chosen)
    }

    /// `maximizing` tells whether the move leading to `id` was made by the
    /// maximizing side. Bounds apply to the node's total utility.
    fn search(
        &mut self,
        id: NodeId,
        depth: usize,
        alpha: f64,
        beta: f64,
        maximizing: bool,
        moves: Option<&[Move]>,
    ) -> Result<f64, BotError> {
        let own = self
            .tree
            .evaluate_own_move(id, maximizing, self.config.slider_factor)?;
        if depth == 0 {
            self.tree.release_board(id)?;
            return Ok(own);
        }

        let extra_turn = self.tree.extra_turn(id)?;
        let remaining = if extra_turn { depth } else { depth - 1 };
        let next = if maximizing { extra_turn } else { !extra_turn };

        let children = match moves {
            Some(moves) => self.tree.expand_with(id, moves)?.to_vec(),
            None => self.tree.expand(id)?.to_vec(),
        };

        let utility = if children.is_empty() {
            let fallback = if remaining == 0 {
                EXHAUSTED_AT_HORIZON
            } else {
                EXHAUSTED_EARLY
            };
            if next { own + fallback } else { own - fallback }
        } else {
            let (mut floor, mut ceiling) = (alpha - own, beta - own);
            let mut best = if next {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            };

            for child in children {
                let value = self.search(child, remaining, floor, ceiling, next, None)?;
                if next {
                    best = best.max(value);
                    if best >= ceiling {
                        break;
                    }
                    floor = floor.max(best);
                } else {
                    best = best.min(value);
                    if best <= floor {
                        break;
                    }
                    ceiling = ceiling.min(best);
                }
            }
            own + best
        };

        self.tree.set_utility(id, utility)?;
        self.tree.release_board(id)?;
        if self.tree.level(id)? >= 1 {
            self.tree.release_children(id)?;
        }
        Ok(utility)
    }
}

/// Chooses a move with the default search configuration.
pub fn choose_move(board: &Board, legal: &[Move]) -> Result<Move, BotError> {
    SearchDriver::new(SearchConfig::default()).choose_move(board, legal)
}

fn log_search(
    config: &SearchConfig,
    legal_count: usize,
    tree: &GameTree,
    chosen: Move,
    utility: f64,
) {
    if !tracing::enabled!(target: "crush_bot::search", Level::INFO) {
        return;
    }

    event!(
        target: "crush_bot::search",
        Level::INFO,
        depth = config.depth,
        slider_factor = config.slider_factor,
        legal_count,
        nodes_created = tree.nodes_created(),
        peak_live_nodes = tree.peak_live_nodes(),
        chosen = %chosen,
        utility,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::tree::{NodeState, score_move};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// One legal move, a plain run of three, nothing left to play afterwards.
    fn plain_board() -> Board {
        Board::from_scheme(&[[0, 4, 2, 2], [1, 3, 1, 0], [2, 1, 4, 3]]).unwrap()
    }

    /// One legal move crushing two columns at once, nothing left afterwards.
    fn extra_turn_board() -> Board {
        Board::from_scheme(&[[3, 2, 3, 2], [3, 2, 0, 4], [2, 3, 0, 0]]).unwrap()
    }

    fn only_child_utility(board: &Board, depth: usize) -> (f64, f64) {
        let legal = board.legal_moves();
        assert_eq!(legal.len(), 1);

        let mut driver = SearchDriver::new(SearchConfig::new(depth, 1.7));
        let chosen = driver.choose_move(board, &legal).unwrap();
        assert_eq!(chosen, legal[0]);

        let tree = driver.tree();
        let root = tree.root().unwrap();
        let child = tree.children(root).unwrap()[0];
        let (own, _) = score_move(board, legal[0], 1.7).unwrap();
        (own, tree.utility(child).unwrap())
    }

    #[test]
    fn empty_legal_list_is_an_error() {
        let board = plain_board();
        assert_eq!(choose_move(&board, &[]), Err(BotError::NoLegalMoves));
    }

    #[test]
    fn leaf_children_keep_their_own_score() {
        let (own, utility) = only_child_utility(&plain_board(), 1);
        assert!(own > 0.0);
        assert_eq!(utility, own);
    }

    #[test]
    fn opponent_without_moves_at_the_horizon() {
        let (own, utility) = only_child_utility(&plain_board(), 2);
        assert!((utility - (own - 4.0)).abs() < 1e-9);
    }

    #[test]
    fn opponent_without_moves_before_the_horizon() {
        let (own, utility) = only_child_utility(&plain_board(), 3);
        assert!((utility - (own - 3.0)).abs() < 1e-9);
    }

    #[test]
    fn extra_turn_without_moves_favours_the_mover() {
        let (own, utility) = only_child_utility(&extra_turn_board(), 2);
        assert!((utility - (own + 3.0)).abs() < 1e-9);
    }

    #[test]
    fn composite_weights_impact_over_position() {
        let board = extra_turn_board();
        let mv = board.legal_moves()[0];
        let (own, extra_turn) = score_move(&board, mv, 1.7).unwrap();
        assert!(extra_turn);

        let high = (4.0f64 * 1.7).exp();
        let expected = (24.0 * high + 100.0 / 3.0 * 2.0) / (1.0 + high);
        assert!((own - expected).abs() < 1e-9);
    }

    #[test]
    fn only_root_and_children_survive_a_search() {
        let (board, legal) = (11u64..)
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let board = Board::random(8, 8, 4, 5, &mut rng).unwrap().masked();
                let legal = board.legal_moves();
                (board, legal)
            })
            .find(|(_, legal)| legal.len() >= 2)
            .unwrap();

        let mut driver = SearchDriver::new(SearchConfig::new(3, 1.7));
        let chosen = driver.choose_move(&board, &legal).unwrap();
        assert!(legal.contains(&chosen));

        let tree = driver.tree();
        let root = tree.root().unwrap();
        let children = tree.children(root).unwrap();
        assert_eq!(children.len(), legal.len());
        assert_eq!(tree.live_nodes(), legal.len() + 1);
        assert!(tree.nodes_created() > tree.live_nodes());
        for &child in children {
            assert_eq!(tree.state(child).unwrap(), NodeState::Released);
            assert!(tree.children(child).unwrap().is_empty());
            assert_eq!(tree.board(child).unwrap(), None);
        }
    }

    fn minimax(parent: &Board, mv: Move, depth: usize, maximizing: bool) -> f64 {
        let (score, extra_turn) = score_move(parent, mv, 1.7).unwrap();
        let own = if maximizing { score } else { -score };
        if depth == 0 {
            return own;
        }

        let board = parent.after_full_resolution(&mv).unwrap();
        let remaining = if extra_turn { depth } else { depth - 1 };
        let next = if maximizing { extra_turn } else { !extra_turn };
        let values: Vec<f64> = board
            .legal_moves()
            .into_iter()
            .map(|child| minimax(&board, child, remaining, next))
            .collect();

        if values.is_empty() {
            let fallback = if remaining == 0 { 4.0 } else { 3.0 };
            return if next { own + fallback } else { own - fallback };
        }
        let best = if next {
            values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        } else {
            values.iter().copied().fold(f64::INFINITY, f64::min)
        };
        own + best
    }

    #[test]
    fn pruning_keeps_the_minimax_value() {
        for seed in [1u64, 2, 3, 4] {
            let mut rng = StdRng::seed_from_u64(seed);
            let board = Board::random(6, 6, 3, 4, &mut rng).unwrap().masked();
            let legal = board.legal_moves();
            if legal.is_empty() {
                continue;
            }

            let mut driver = SearchDriver::new(SearchConfig::new(3, 1.7));
            let chosen = driver.choose_move(&board, &legal).unwrap();

            let expected = legal
                .iter()
                .map(|mv| minimax(&board, *mv, 2, true))
                .fold(f64::NEG_INFINITY, f64::max);
            let tree = driver.tree();
            let root = tree.root().unwrap();
            let chosen_utility = tree
                .children(root)
                .unwrap()
                .iter()
                .find(|child| tree.mv(**child).unwrap() == Some(chosen))
                .map(|child| tree.utility(*child).unwrap())
                .unwrap();
            assert!(
                (chosen_utility - expected).abs() < 1e-9,
                "seed {seed}: {chosen_utility} vs {expected}"
            );
        }
    }
}
