use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio_retry::{strategy::ExponentialBackoff, Retry};
use tracing::{debug, info};

use super::member::{Member, Role, SeasonStats};
use super::roster::Clan;
use super::war::{CurrentWar, Participation, PeriodId, WarLog};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClanResponse {
    member_list: Vec<RawMember>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMember {
    tag: String,
    name: String,
    role: String,
    trophies: u32,
    exp_level: Option<u32>,
    donations: Option<i64>,
    donations_received: Option<i64>,
    last_seen: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RiverRaceLog {
    items: Vec<RawRiverRace>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRiverRace {
    season_id: u32,
    section_index: u32,
    created_date: String,
    standings: Vec<RawStanding>,
}

#[derive(Debug, Deserialize)]
struct RawStanding {
    clan: RawRaceClan,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRaceClan {
    tag: String,
    #[serde(default)]
    participants: Vec<RawParticipant>,
    finish_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawParticipant {
    tag: String,
    fame: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCurrentRace {
    section_index: u32,
    clan: RawRaceClan,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlayer {
    current_path_of_legend_season_result: Option<RawPathResult>,
    last_path_of_legend_season_result: Option<RawPathResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPathResult {
    league_number: u32,
    trophies: u32,
}

/// Game API timestamps look like `20250320T094432.000Z`.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y%m%dT%H%M%S%.fZ")
        .map(|ts| ts.and_utc())
        .with_context(|| format!("Invalid API timestamp '{}'", raw))
}

/// Tags start with '#', which must be escaped in URL paths.
fn encode_tag(tag: &str) -> String {
    urlencoding::encode(tag).into_owned()
}

/// Short wars end after 3 instead of 4 battle days; scale fame up to a full war.
fn adjust_fame_for_short_war(fame: u32, short_war: bool) -> f64 {
    if short_war {
        (u64::from(fame) * 4 / 3) as f64
    } else {
        fame as f64
    }
}

/// A race ended early when it was created (i.e. the war week closed) one day after
/// the clan crossed the finish line.
fn is_short_war(created_at: &str, finished_at: &str) -> Result<bool> {
    let created = parse_timestamp(created_at)?.date_naive();
    let finished = parse_timestamp(finished_at)?.date_naive();
    Ok((created - finished).num_days() == 1)
}

fn member_from_raw(raw: RawMember) -> Result<Member> {
    let last_seen = raw.last_seen.as_deref().map(parse_timestamp).transpose()?;
    let net_donations = match (raw.donations, raw.donations_received) {
        (Some(given), Some(received)) => Some(given - received),
        _ => None,
    };
    Ok(Member {
        level: raw.exp_level,
        net_donations,
        last_seen,
        ..Member::new(raw.tag, raw.name, Role::from_api(&raw.role), raw.trophies)
    })
}

fn war_log_from_races(races: Vec<RawRiverRace>, clan_tag: &str, clan: &Clan) -> Result<WarLog> {
    let mut war_log = WarLog::new();
    for tag in clan.tags() {
        war_log.add_member(tag);
    }

    for race in races {
        let period = PeriodId::new(race.season_id, race.section_index);
        let Some(standing) = race.standings.into_iter().find(|s| s.clan.tag == clan_tag) else {
            continue;
        };

        let short_war = match standing.clan.finish_time.as_deref() {
            Some(finished_at) => is_short_war(&race.created_date, finished_at)?,
            None => false,
        };
        if short_war {
            info!("River race {} finished early, scaling fame to a full week", period);
        }
        debug!(
            "Date info for {}: created_at={}, finished_at={:?}",
            period, race.created_date, standing.clan.finish_time
        );

        for participant in standing.clan.participants {
            if clan.contains(&participant.tag) {
                let fame = adjust_fame_for_short_war(participant.fame, short_war);
                war_log.insert(&participant.tag, period, Participation::Fame(fame));
            }
        }
    }
    Ok(war_log)
}

fn current_war_from_race(race: RawCurrentRace, last_war: PeriodId) -> CurrentWar {
    // Section 0 opens a new season
    let season = if race.section_index > 0 {
        last_war.season
    } else {
        last_war.season + 1
    };
    let id = PeriodId::new(season, race.section_index);

    let short_war = race.clan.finish_time.is_some();
    if short_war {
        info!("Current river race {} finished early, scaling fame to a full week", id);
    }

    let mut current_war = CurrentWar::new(id);
    for participant in race.clan.participants {
        let fame = adjust_fame_for_short_war(participant.fame, short_war);
        current_war.set(&participant.tag, Participation::Fame(fame));
    }
    current_war
}

fn season_stats_from_player(raw: RawPlayer) -> SeasonStats {
    let (current_league, current_trophies) = raw
        .current_path_of_legend_season_result
        .map(|r| (r.league_number, r.trophies))
        .unwrap_or_default();
    let (previous_league, previous_trophies) = raw
        .last_path_of_legend_season_result
        .map(|r| (r.league_number, r.trophies))
        .unwrap_or_default();
    SeasonStats {
        current_league,
        current_trophies,
        previous_league,
        previous_trophies,
    }
}

/// Read-only access to the clan, war and player endpoints of the game API.
pub struct RoyaleApi {
    client: reqwest::Client,
    endpoint: String,
    clan_tag: String,
}

impl RoyaleApi {
    pub fn new(client: reqwest::Client, endpoint: &str, clan_tag: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            clan_tag: clan_tag.to_string(),
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Game API request failed: {}", e))?;

        match response.status() {
            status if status.is_success() => response
                .json::<T>()
                .await
                .with_context(|| format!("Unexpected response format from {}", url)),
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => Err(anyhow!(
                "Access denied. Check the API token and that its IP allow-list matches this machine."
            )),
            StatusCode::NOT_FOUND => Err(anyhow!("Not found: {}. Check the clan tag.", url)),
            StatusCode::TOO_MANY_REQUESTS => {
                Err(anyhow!("Game API rate limit exceeded. Wait a moment and try again."))
            }
            status => Err(anyhow!("Game API error {} for {}", status, url)),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.endpoint, path);

        // Retry strategy: exponential backoff with 3 attempts
        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(std::time::Duration::from_secs(5))
            .take(3);

        Retry::spawn(retry_strategy, || self.get_once::<T>(&url)).await
    }

    /// Fetch the current member list of the clan
    pub async fn fetch_members(&self) -> Result<Clan> {
        info!("Building list of current members...");
        let path = format!("/clans/{}", encode_tag(&self.clan_tag));
        let response: ClanResponse = self.get_json(&path).await?;

        let clan = response
            .member_list
            .into_iter()
            .map(member_from_raw)
            .collect::<Result<Clan>>()?;
        info!("{} current members have been found", clan.len());
        Ok(clan)
    }

    /// Fetch completed river races for the members of `clan`
    pub async fn fetch_war_log(&self, clan: &Clan) -> Result<WarLog> {
        info!("Fetching river race statistics...");
        let path = format!("/clans/{}/riverracelog", encode_tag(&self.clan_tag));
        let log: RiverRaceLog = self.get_json(&path).await?;
        let war_log = war_log_from_races(log.items, &self.clan_tag, clan)?;
        info!("Collected {} completed river races", war_log.periods().count());
        Ok(war_log)
    }

    /// Fetch the river race in progress. `last_war` labels it relative to the log.
    pub async fn fetch_current_war(&self, last_war: PeriodId) -> Result<CurrentWar> {
        info!("Fetching current river race...");
        let path = format!("/clans/{}/currentriverrace", encode_tag(&self.clan_tag));
        let race: RawCurrentRace = self.get_json(&path).await?;
        Ok(current_war_from_race(race, last_war))
    }

    async fn fetch_player_season(&self, tag: &str) -> Result<SeasonStats> {
        let path = format!("/players/{}", encode_tag(tag));
        let player: RawPlayer = self.get_json(&path).await?;
        Ok(season_stats_from_player(player))
    }

    /// Fetch Path of Legends results for every member, one request per member in parallel
    pub async fn fetch_season_stats(&self, clan: &mut Clan) -> Result<()> {
        info!("Fetching path of legends statistics for all {} members...", clan.len());
        let tags: Vec<String> = clan.tags().map(str::to_string).collect();

        let mut futures = FuturesUnordered::new();
        for tag in tags {
            futures.push(async move {
                let result = self.fetch_player_season(&tag).await;
                (tag, result)
            });
        }

        while let Some((tag, result)) = futures.next().await {
            let stats =
                result.with_context(|| format!("Failed to fetch season stats for {}", tag))?;
            if let Some(member) = clan.get_mut(&tag) {
                member.season = stats;
            }
        }

        info!("Collection of path of legends statistics has finished");
        Ok(())
    }
}
