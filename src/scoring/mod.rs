pub mod engine;
pub mod normalize;
pub mod validation;
pub mod weights;

pub use engine::evaluate_performance;
pub use normalize::{mean, min_max_score, quantile, MinMax};
pub use validation::validate_parameters;
pub use weights::WeightSet;
