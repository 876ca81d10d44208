//! Decision core of the crush bot: run detection, move heuristics, the
//! weighting model that combines them, and the alpha-beta search on top.

pub mod error;
pub mod heuristics;
pub mod policy;
pub mod runs;
pub mod scoring;
pub mod search;
pub mod weighting;

pub use error::BotError;
pub use heuristics::{Heuristic, MoveImpactHeuristic, PositionalHeuristic};
pub use policy::{
    BotDifficulty, FirstLegalPolicy, GreedyPolicy, MinimaxPolicy, Policy, moves_from_directed,
    policy_for,
};
pub use scoring::ScoringEngine;
pub use search::{GameTree, NodeId, NodeState, SearchConfig, SearchDriver, choose_move};
pub use weighting::{SliderModel, Tier, WeightingModel};
