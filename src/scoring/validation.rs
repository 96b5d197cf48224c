use std::collections::HashSet;

use crate::clan::PeriodId;
use crate::config::constants::SCORE_SCALE;
use crate::config::RankingParameters;

/// Validate ranking parameters at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_parameters(params: &RankingParameters) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if !params.clan_tag.starts_with('#') || params.clan_tag.len() < 2 {
        errors.push(format!("clan_tag: '{}' must start with '#'", params.clan_tag));
    }

    // Validate rating weights
    for (name, weight) in params.rating_weights.named() {
        if weight < 0.0 || weight.is_nan() {
            errors.push(format!("rating_weights.{}: must be non-negative, got {}", name, weight));
        }
    }
    if let Err(e) = params.rating_weights.check() {
        if matches!(e, crate::error::RatingError::WeightSum { .. }) {
            errors.push(format!("rating_weights: {}", e));
        }
    }

    let fallback = params.new_player_war_log_rating;
    if !(0.0..=SCORE_SCALE).contains(&fallback) {
        errors.push(format!(
            "new_player_war_log_rating: must be between 0 and {}, got {}",
            SCORE_SCALE, fallback
        ));
    }

    // Validate promotion thresholds
    let promotion = &params.promotion_requirements;
    if promotion.min_fame_per_war == 0 {
        errors.push("promotion_requirements.min_fame_per_war: must be positive".to_string());
    }
    if promotion.min_counting_wars == 0 {
        errors.push("promotion_requirements.min_counting_wars: must be positive".to_string());
    }

    // Validate excuse codes
    let codes = params.excuses.all();
    for (field, code) in ["not_in_clan", "new_player", "personal"].iter().zip(codes) {
        if code.trim().is_empty() {
            errors.push(format!("excuses.{}: must not be empty", field));
        }
    }
    let unique: HashSet<&str> = codes.into_iter().collect();
    if unique.len() != codes.len() {
        errors.push("excuses: codes must be distinct".to_string());
    }

    // Validate war identifiers
    for (field, labels) in [
        ("ignore_wars", &params.ignore_wars),
        ("three_day_wars", &params.three_day_wars),
    ] {
        for (i, label) in labels.iter().enumerate() {
            if let Err(e) = label.parse::<PeriodId>() {
                errors.push(format!("{}[{}]: {}", field, i, e));
            }
        }
    }

    for (field, value) in [
        ("sheets.rating", &params.sheets.rating),
        ("sheets.excuses", &params.sheets.excuses),
        ("rating_file", &params.rating_file),
        ("rating_history_file", &params.rating_history_file),
    ] {
        if value.trim().is_empty() {
            errors.push(format!("{}: must not be empty", field));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excuses::ExcuseCodes;
    use crate::scoring::WeightSet;

    #[test]
    fn test_valid_parameters() {
        assert!(validate_parameters(&RankingParameters::default()).is_ok());
    }

    #[test]
    fn test_negative_weight() {
        let params = RankingParameters {
            rating_weights: WeightSet {
                ladder: -0.075,
                war_history: 0.55,
                ..WeightSet::default()
            },
            ..RankingParameters::default()
        };
        let errors = validate_parameters(&params).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("rating_weights.ladder"));
    }

    #[test]
    fn test_weight_sum() {
        let params = RankingParameters {
            rating_weights: WeightSet {
                ladder: 0.5,
                ..WeightSet::default()
            },
            ..RankingParameters::default()
        };
        let errors = validate_parameters(&params).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("sum to 1"));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut params = RankingParameters {
            clan_tag: "ABC".to_string(),
            new_player_war_log_rating: 1500.0,
            excuses: ExcuseCodes {
                not_in_clan: "x".to_string(),
                new_player: "x".to_string(),
                personal: "".to_string(),
            },
            ignore_wars: vec!["100.1".to_string(), "soon".to_string()],
            rating_file: " ".to_string(),
            ..RankingParameters::default()
        };
        params.promotion_requirements.min_counting_wars = 0;

        let errors = validate_parameters(&params).unwrap_err();
        assert_eq!(errors.len(), 7, "{:?}", errors);
        assert!(errors.iter().any(|e| e.starts_with("clan_tag")));
        assert!(errors.iter().any(|e| e.starts_with("new_player_war_log_rating")));
        assert!(errors.iter().any(|e| e.starts_with("promotion_requirements.min_counting_wars")));
        assert!(errors.iter().any(|e| e == "excuses.personal: must not be empty"));
        assert!(errors.iter().any(|e| e == "excuses: codes must be distinct"));
        assert!(errors.iter().any(|e| e.starts_with("ignore_wars[1]")));
        assert!(errors.iter().any(|e| e.starts_with("rating_file")));
    }
}
