use tracing::info;

use super::normalize::{min_max_score, MinMax};
use super::weights::WeightSet;
use crate::clan::{Clan, CurrentWar, Member, MemberRatings, WarLog};
use crate::config::constants::TOP_LEAGUE;

/// Value ranges of every scored dimension over the clan.
#[derive(Debug, Clone, Copy)]
struct Cohorts {
    trophies: Option<MinMax>,
    war_history: Option<MinMax>,
    current_war: Option<MinMax>,
    previous_league: Option<MinMax>,
    current_league: Option<MinMax>,
    previous_trophies: Option<MinMax>,
    current_trophies: Option<MinMax>,
}

impl Cohorts {
    fn new(clan: &Clan, war_log: &WarLog, current_war: &CurrentWar) -> Self {
        Self {
            trophies: clan.min_max(|m| Some(m.trophies as f64)),
            war_history: clan.min_max(|m| war_log.mean_fame(&m.tag)),
            current_war: current_war_range(clan, current_war),
            previous_league: clan.min_max(|m| Some(m.season.previous_league as f64)),
            current_league: clan.min_max(|m| Some(m.season.current_league as f64)),
            // Trophy ranges only cover the top league
            previous_trophies: clan.min_max(|m| {
                (m.season.previous_league == TOP_LEAGUE).then(|| m.season.previous_trophies as f64)
            }),
            current_trophies: clan.min_max(|m| {
                (m.season.current_league == TOP_LEAGUE).then(|| m.season.current_trophies as f64)
            }),
        }
    }
}

/// Range over the whole race snapshot, including participants who left the clan.
/// Members missing from the snapshot count as zero, excused entries are skipped.
fn current_war_range(clan: &Clan, current_war: &CurrentWar) -> Option<MinMax> {
    let absent = clan
        .members()
        .filter(|m| current_war.get(&m.tag).is_none())
        .map(|_| 0.0);
    MinMax::from_values(
        current_war
            .entries()
            .filter_map(|(_, value)| value.fame())
            .chain(absent),
    )
}

/// Trophy score, granted only to players who reached the top league.
fn trophy_score(league: u32, trophies: u32, range: Option<MinMax>) -> f64 {
    if league == TOP_LEAGUE {
        min_max_score(trophies as f64, range, 1.0)
    } else {
        0.0
    }
}

fn rate_member(
    member: &Member,
    cohorts: &Cohorts,
    war_log: &WarLog,
    current_war: &CurrentWar,
    weights: &WeightSet,
    new_player_rating: f64,
) -> MemberRatings {
    let season = &member.season;

    let ladder = min_max_score(member.trophies as f64, cohorts.trophies, 1.0);

    let avg_fame = war_log.mean_fame(&member.tag);
    let war_history = avg_fame.map(|fame| min_max_score(fame, cohorts.war_history, 1.0));

    // An excused current war does not move the rating
    let current_war = current_war
        .get_or_zero(&member.tag)
        .fame()
        .map(|fame| min_max_score(fame, cohorts.current_war, 1.0))
        .unwrap_or_else(|| min_max_score(0.0, None, 1.0));

    let previous_league = min_max_score(season.previous_league as f64, cohorts.previous_league, 1.0);
    let current_league = min_max_score(season.current_league as f64, cohorts.current_league, 1.0);
    let previous_trophies = trophy_score(
        season.previous_league,
        season.previous_trophies,
        cohorts.previous_trophies,
    );
    let current_trophies = trophy_score(
        season.current_league,
        season.current_trophies,
        cohorts.current_trophies,
    );

    let rating = weights.ladder * ladder
        + weights.current_war * current_war
        + weights.war_history * war_history.unwrap_or(new_player_rating)
        + weights.previous_season_league * previous_league
        + weights.previous_season_trophies * previous_trophies
        + weights.current_season_league * current_league
        + weights.current_season_trophies * current_trophies;

    MemberRatings {
        rating,
        ladder,
        current_war,
        war_history,
        avg_fame,
        previous_league,
        current_league,
        previous_trophies,
        current_trophies,
        previous_season: previous_league + previous_trophies,
        current_season: current_league + current_trophies,
    }
}

/// Score every clan member and return the members ranked by rating, best first.
///
/// `war_log` and `current_war` must already be adjusted for excuses and ignored
/// wars. Members without any counting war get `new_player_rating` as war history
/// score. Equal ratings keep roster order.
pub fn evaluate_performance(
    clan: &mut Clan,
    war_log: &WarLog,
    current_war: &CurrentWar,
    weights: &WeightSet,
    new_player_rating: f64,
) -> Vec<Member> {
    let cohorts = Cohorts::new(clan, war_log, current_war);

    for member in clan.members_mut() {
        let ratings = rate_member(member, &cohorts, war_log, current_war, weights, new_player_rating);
        member.ratings = Some(ratings);
    }

    info!("Performance rating calculated according to the following formula:");
    info!("{}", weights.formula());

    let mut ranked: Vec<Member> = clan.members().cloned().collect();
    ranked.sort_by(|a, b| {
        let a = a.rating().unwrap_or(f64::NEG_INFINITY);
        let b = b.rating().unwrap_or(f64::NEG_INFINITY);
        b.total_cmp(&a)
    });
    ranked
}
