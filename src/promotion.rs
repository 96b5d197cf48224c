use serde::Serialize;
use tracing::info;

use crate::clan::{Clan, Role, WarLog};
use crate::config::PromotionRequirements;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromotionCandidate {
    pub tag: String,
    pub name: String,
}

/// Ordinary members who reached the fame threshold in enough completed wars.
///
/// `war_log` must be the excuse-adjusted log of completed wars. Only a
/// recommendation; nothing is changed in the clan.
pub fn pending_promotions(
    clan: &Clan,
    war_log: &WarLog,
    requirements: &PromotionRequirements,
) -> Vec<PromotionCandidate> {
    let min_fame = requirements.min_fame_per_war as f64;

    let candidates: Vec<PromotionCandidate> = clan
        .filter(|m| m.role == Role::Ordinary)
        .members()
        .filter(|m| war_log.count_at_least(&m.tag, min_fame) >= requirements.min_counting_wars)
        .map(|m| PromotionCandidate {
            tag: m.tag.clone(),
            name: m.name.clone(),
        })
        .collect();

    if candidates.is_empty() {
        info!("No promotions pending");
    } else {
        let names: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
        info!("Pending promotions for: {}", names.join(", "));
    }
    candidates
}
