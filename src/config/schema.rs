use serde::{Deserialize, Serialize};

use crate::clan::{PeriodId, DEFAULT_API_ENDPOINT};
use crate::error::RatingError;
use crate::excuses::ExcuseCodes;
use crate::scoring::WeightSet;

/// Ranking parameters, loaded from `ranking_parameters.yaml`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RankingParameters {
    /// Clan tag including the leading `#`
    pub clan_tag: String,
    pub rating_weights: WeightSet,
    /// War history score (0..=1000) used for players without any counting war
    pub new_player_war_log_rating: f64,
    pub promotion_requirements: PromotionRequirements,
    pub excuses: ExcuseCodes,
    pub sheets: SheetNames,
    /// Ranking table written after every run
    pub rating_file: String,
    /// Rating history, one column per run
    pub rating_history_file: String,
    /// Wars that do not count for anybody, as `<season>.<section>`
    #[serde(default)]
    pub ignore_wars: Vec<String>,
    /// Wars that only had three battle days
    #[serde(default)]
    pub three_day_wars: Vec<String>,
    #[serde(default)]
    pub api_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PromotionRequirements {
    pub min_fame_per_war: u32,
    pub min_counting_wars: usize,
}

/// Names of the sheets inside the spreadsheet.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SheetNames {
    pub rating: String,
    pub excuses: String,
}

fn parse_periods(labels: &[String]) -> Result<Vec<PeriodId>, RatingError> {
    labels.iter().map(|label| label.parse()).collect()
}

impl RankingParameters {
    pub fn ignored_wars(&self) -> Result<Vec<PeriodId>, RatingError> {
        parse_periods(&self.ignore_wars)
    }

    pub fn short_wars(&self) -> Result<Vec<PeriodId>, RatingError> {
        parse_periods(&self.three_day_wars)
    }

    pub fn api_endpoint(&self) -> &str {
        self.api_endpoint.as_deref().unwrap_or(DEFAULT_API_ENDPOINT)
    }
}

impl Default for RankingParameters {
    fn default() -> Self {
        Self {
            clan_tag: "#CLAN".to_string(),
            rating_weights: WeightSet::default(),
            new_player_war_log_rating: 500.0,
            promotion_requirements: PromotionRequirements {
                min_fame_per_war: 2800,
                min_counting_wars: 8,
            },
            excuses: ExcuseCodes::default(),
            sheets: SheetNames {
                rating: "rating".to_string(),
                excuses: "excuses".to_string(),
            },
            rating_file: "player-ranking.csv".to_string(),
            rating_history_file: "rating-history.csv".to_string(),
            ignore_wars: Vec::new(),
            three_day_wars: Vec::new(),
            api_endpoint: None,
        }
    }
}
