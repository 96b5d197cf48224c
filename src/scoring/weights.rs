use serde::{Deserialize, Serialize};

use crate::config::constants::WEIGHT_TOLERANCE;
use crate::error::RatingError;

/// Rating weights of the seven scored dimensions.
///
/// Example YAML:
/// ```yaml
/// rating_weights:
///   ladder: 0.075
///   war_history: 0.4
///   current_war: 0.25
///   previous_season_league: 0.0375
///   previous_season_trophies: 0.0375
///   current_season_league: 0.1
///   current_season_trophies: 0.1
/// ```
///
/// Redistribution never mutates a weight set in place; every step returns a new value.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WeightSet {
    pub ladder: f64,
    pub war_history: f64,
    pub current_war: f64,
    pub previous_season_league: f64,
    pub previous_season_trophies: f64,
    pub current_season_league: f64,
    pub current_season_trophies: f64,
}

impl WeightSet {
    pub fn named(&self) -> [(&'static str, f64); 7] {
        [
            ("ladder", self.ladder),
            ("war_history", self.war_history),
            ("current_war", self.current_war),
            ("previous_season_league", self.previous_season_league),
            ("previous_season_trophies", self.previous_season_trophies),
            ("current_season_league", self.current_season_league),
            ("current_season_trophies", self.current_season_trophies),
        ]
    }

    pub fn sum(&self) -> f64 {
        self.named().iter().map(|(_, w)| w).sum()
    }

    /// Check that all weights are non-negative and add up to 1.
    pub fn check(&self) -> Result<(), RatingError> {
        if let Some((name, value)) = self.named().into_iter().find(|(_, w)| *w < 0.0) {
            return Err(RatingError::NegativeWeight { name, value });
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(RatingError::WeightSum { sum });
        }
        Ok(())
    }

    /// Shift the current war weight into war history according to war progress.
    ///
    /// `progress` is 0 outside of battle days, in which case the whole current war
    /// weight moves to war history.
    pub fn redistribute_for_war(self, progress: f64) -> Result<Self, RatingError> {
        let progress = progress.clamp(0.0, 1.0);
        let moved = self.current_war * (1.0 - progress);
        let weights = Self {
            war_history: self.war_history + moved,
            current_war: self.current_war - moved,
            ..self
        };
        weights.check()?;
        Ok(weights)
    }

    /// Shift current season weights into previous season weights according to season progress.
    pub fn redistribute_for_season(self, progress: f64) -> Result<Self, RatingError> {
        let progress = progress.clamp(0.0, 1.0);
        let moved_league = self.current_season_league * progress;
        let moved_trophies = self.current_season_trophies * progress;
        let weights = Self {
            previous_season_league: self.previous_season_league + moved_league,
            current_season_league: self.current_season_league - moved_league,
            previous_season_trophies: self.previous_season_trophies + moved_trophies,
            current_season_trophies: self.current_season_trophies - moved_trophies,
            ..self
        };
        weights.check()?;
        Ok(weights)
    }

    /// Human-readable rating formula, e.g. for logging.
    pub fn formula(&self) -> String {
        let terms: Vec<String> = self
            .named()
            .iter()
            .map(|(name, w)| format!("{:.2}*{}", w, name))
            .collect();
        format!("rating = {}", terms.join(" + "))
    }
}

impl Default for WeightSet {
    fn default() -> Self {
        Self {
            ladder: 0.075,
            war_history: 0.4,
            current_war: 0.25,
            previous_season_league: 0.0375,
            previous_season_trophies: 0.0375,
            current_season_league: 0.1,
            current_season_trophies: 0.1,
        }
    }
}
