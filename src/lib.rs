pub mod clan;
pub mod config;
pub mod credentials;
pub mod discord;
pub mod error;
pub mod evaluation;
pub mod excuses;
pub mod history;
pub mod output;
pub mod promotion;
pub mod scoring;
pub mod season;
pub mod sheets;

pub use error::RatingError;
