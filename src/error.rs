use thiserror::Error;

/// Fatal data and invariant errors raised by the evaluation core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RatingError {
    #[error("rating weight '{name}' must be non-negative, got {value}")]
    NegativeWeight { name: &'static str, value: f64 },

    #[error("rating weights must sum to 1, got {sum}")]
    WeightSum { sum: f64 },

    #[error("unknown excuse '{0}' encountered")]
    UnknownExcuse(String),

    #[error("invalid war identifier '{0}', expected <season>.<section>")]
    InvalidPeriod(String),
}
