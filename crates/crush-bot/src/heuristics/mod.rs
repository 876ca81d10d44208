mod impact;
mod position;

pub use impact::{MoveImpactHeuristic, removal_score};
pub use position::PositionalHeuristic;

use crate::error::BotError;

/// Output range used when a heuristic is not configured otherwise.
pub const DEFAULT_RANGE: f64 = 100.0;

/// A scoring unit that turns its own move/board context into one scalar
/// in `0.0..=range()`.
pub trait Heuristic {
    fn range(&self) -> f64;

    fn evaluate(&self) -> Result<f64, BotError>;
}
