use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};
use tracing::info;

use crate::config::PromotionRequirements;
use crate::promotion::PromotionCandidate;

const CLAN_WARS_ICON_URL: &str =
    "https://static.wikia.nocookie.net/clashroyale/images/9/9f/War_Shield.png/revision/latest";
const ELITE_BARBS_ICON_URL: &str =
    "https://static.wikia.nocookie.net/clashroyale/images/e/e8/EliteBarbariansCard.png/revision/latest";

/// Build the webhook payload announcing pending promotions.
pub fn promotion_message(
    requirements: &PromotionRequirements,
    candidates: &[PromotionCandidate],
) -> Value {
    let criteria = format!(
        "To be recommended for promotion, a player must score at least **{} fame** \
         in **{} or more recent clan wars**.",
        requirements.min_fame_per_war, requirements.min_counting_wars
    );
    let players: Vec<String> = candidates
        .iter()
        .map(|c| format!("**{}** ({})", c.name, c.tag))
        .collect();

    json!({
        "username": "Clan Herald",
        "avatar_url": CLAN_WARS_ICON_URL,
        "embeds": [{
            "title": "🎖️ Promotion Announcement",
            "description": "The following players have earned a promotion to the rank of **Elder**:",
            "color": 0xFFD700,
            "fields": [
                { "name": "🏅 Up for Promotion", "value": players.join("\n"), "inline": false },
                { "name": "📋 Promotion Criteria", "value": criteria, "inline": false },
            ],
            "footer": { "text": "Keep up the great work!", "icon_url": ELITE_BARBS_ICON_URL },
        }],
    })
}

pub struct DiscordClient {
    client: reqwest::Client,
    webhook: String,
}

impl DiscordClient {
    pub fn new(webhook: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("clan-rating/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create Discord client")?;
        Ok(Self {
            client,
            webhook: webhook.to_string(),
        })
    }

    /// Post the pending promotions to the webhook
    pub async fn post_pending_promotions(
        &self,
        requirements: &PromotionRequirements,
        candidates: &[PromotionCandidate],
    ) -> Result<()> {
        info!("Posting pending promotion message to webhook");
        let response = self
            .client
            .post(&self.webhook)
            .json(&promotion_message(requirements, candidates))
            .send()
            .await
            .context("Failed to reach Discord webhook")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Discord webhook rejected the message: {}", status));
        }
        Ok(())
    }
}
