use crate::search::NodeId;
use crate::weighting::Tier;
use crush_core::model::moves::MoveError;
use thiserror::Error;

/// Contract violations raised by the decision core.
///
/// None of these are retried or defaulted: a heuristic score feeding the
/// search must never be silently wrong.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BotError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("direction code {0} is not one of the four axis directions")]
    InvalidDirection(i32),
    #[error("tier {0} is not declared by the weighting model")]
    IllegalWeight(Tier),
    #[error("malformed move: {0}")]
    Move(MoveError),
    #[error("node {0} was queried before its move was scored")]
    NonEvaluatedNode(NodeId),
    #[error("no legal moves were supplied")]
    NoLegalMoves,
}

impl From<MoveError> for BotError {
    fn from(err: MoveError) -> Self {
        match err {
            MoveError::InvalidDirection(code) => BotError::InvalidDirection(code),
            other => BotError::Move(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_codes_surface_as_invalid_direction() {
        assert_eq!(
            BotError::from(MoveError::InvalidDirection(7)),
            BotError::InvalidDirection(7)
        );
        assert_eq!(
            BotError::from(MoveError::EmptyMove),
            BotError::Move(MoveError::EmptyMove)
        );
    }
}
