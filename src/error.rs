//! Error type shared by the card codec, evaluator and equity engine.

use thiserror::Error;

use crate::card::Card;

/// Everything that can go wrong between receiving a hand/board/opponent
/// triple and returning an estimate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EquityError {
    #[error("invalid card `{0}`: expected a rank in 23456789TJQKA followed by a suit in cdhs")]
    InvalidCard(String),

    #[error("invalid card id {0}: expected 0-51")]
    InvalidCardId(u8),

    #[error("expected exactly 2 hole cards, got {0}")]
    HoleCardCount(usize),

    #[error("at most 5 community cards can be known, got {0}")]
    CommunityCardCount(usize),

    #[error("opponent count must be between 1 and 9, got {0}")]
    OpponentCount(usize),

    #[error("card {0} is dealt more than once")]
    DuplicateCard(Card),

    #[error("card {0} is not in the deck")]
    MissingCard(Card),

    #[error("evaluation takes 5 to 7 cards, got {0}")]
    EvaluationSize(usize),

    #[error("trial count must be at least 1")]
    ZeroTrials,

    #[error("unknown pool holds {available} cards but a deal needs {needed}")]
    PoolExhausted { available: usize, needed: usize },

    #[error("simulation cancelled after {completed} trials")]
    Cancelled { completed: usize },
}

pub type Result<T> = std::result::Result<T, EquityError>;
