//! One evaluation run: fetch, reconcile excuses, score, publish.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{info, warn};

use crate::clan::{Clan, CurrentWar, Member, PeriodId, RoyaleApi, WarLog};
use crate::config::constants::SHORT_WAR_FACTOR;
use crate::config::RankingParameters;
use crate::discord::DiscordClient;
use crate::error::RatingError;
use crate::excuses::{adjust_fame_with_excuses, table_from_grid, table_to_grid, update_excuses, ExcuseTable};
use crate::history::append_rating_history;
use crate::output::{ranking_grid, write_ranking_file};
use crate::promotion::{pending_promotions, PromotionCandidate};
use crate::scoring::{evaluate_performance, WeightSet};
use crate::season::{season_progress, time_since_war_start, war_progress};
use crate::sheets::SheetStore;

/// Everything fetched before the evaluation starts.
#[derive(Debug, Clone)]
pub struct EvaluationInputs {
    pub clan: Clan,
    pub war_log: WarLog,
    pub current_war: CurrentWar,
    /// Excuse table as stored
    pub excuses: ExcuseTable,
}

#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Members ranked by rating, best first
    pub ranked: Vec<Member>,
    /// Weights after redistribution
    pub weights: WeightSet,
    pub war_progress: f64,
    pub season_progress: f64,
    /// Reconciled excuse table, to be written back in full
    pub excuses: ExcuseTable,
    /// War log after short wars, ignored wars and excuses were applied
    pub war_log: WarLog,
    pub current_war: CurrentWar,
    pub promotions: Vec<PromotionCandidate>,
}

fn format_elapsed(elapsed: chrono::Duration) -> String {
    let seconds = elapsed.num_seconds().max(0) as u64;
    humantime::format_duration(std::time::Duration::from_secs(seconds)).to_string()
}

/// Redistribute the configured weights for the point in time `now`.
///
/// Returns the weights together with war and season progress.
pub fn redistribute_weights(
    weights: WeightSet,
    now: DateTime<Utc>,
) -> Result<(WeightSet, f64, f64), RatingError> {
    let elapsed = time_since_war_start(now);
    let war = war_progress(elapsed);
    info!("War progress: {:.3} ({} since war start)", war, format_elapsed(elapsed));
    let weights = weights.redistribute_for_war(war)?;

    let season = season_progress(now);
    info!("Season progress: {:.3}", season);
    let weights = weights.redistribute_for_season(season)?;

    Ok((weights, war, season))
}

/// Scale wars that only had three battle days up to a full war.
fn account_for_short_wars(war_log: &mut WarLog, short_wars: &[PeriodId]) {
    for period in short_wars {
        if war_log.contains_period(*period) {
            info!("Scaling fame of three-day war {}", period);
            war_log.scale_period(*period, SHORT_WAR_FACTOR);
        }
    }
}

/// Exclude ignored wars. An ignored war newer than every logged war is the
/// current one, so nobody's current fame counts.
fn ignore_selected_wars(war_log: &mut WarLog, current_war: &mut CurrentWar, ignored: &[PeriodId]) {
    for period in ignored {
        if war_log.contains_period(*period) {
            info!("Ignoring war {}", period);
            war_log.exclude_period(*period);
        }
    }

    let Some(newest_ignored) = ignored.iter().max().copied() else {
        return;
    };
    let ignore_current = match war_log.latest_period() {
        Some(latest) => newest_ignored > latest,
        None => newest_ignored >= current_war.id,
    };
    if ignore_current {
        info!("Ignoring current war {}", current_war.id);
        current_war.clear_fame();
    }
}

/// Run the evaluation on fully materialized inputs.
///
/// Deterministic: identical inputs and `now` give identical ratings.
pub fn evaluate(
    inputs: EvaluationInputs,
    params: &RankingParameters,
    now: DateTime<Utc>,
) -> Result<Evaluation, RatingError> {
    let EvaluationInputs {
        mut clan,
        mut war_log,
        mut current_war,
        excuses,
    } = inputs;

    let excuses = update_excuses(&excuses, &clan, current_war.id, &war_log, &params.excuses);

    let (weights, war_progress, season_progress) = redistribute_weights(params.rating_weights, now)?;

    account_for_short_wars(&mut war_log, &params.short_wars()?);
    ignore_selected_wars(&mut war_log, &mut current_war, &params.ignored_wars()?);
    adjust_fame_with_excuses(
        &excuses,
        &params.excuses,
        &clan,
        &mut current_war,
        &mut war_log,
        war_progress,
    )?;

    let ranked = evaluate_performance(
        &mut clan,
        &war_log,
        &current_war,
        &weights,
        params.new_player_war_log_rating,
    );
    let promotions = pending_promotions(&clan, &war_log, &params.promotion_requirements);

    Ok(Evaluation {
        ranked,
        weights,
        war_progress,
        season_progress,
        excuses,
        war_log,
        current_war,
        promotions,
    })
}

/// Fetch all inputs from the game API and the sheet store.
pub async fn fetch_inputs<S: SheetStore>(
    api: &RoyaleApi,
    store: &S,
    params: &RankingParameters,
) -> Result<EvaluationInputs> {
    info!("Evaluating performance of players from {}...", params.clan_tag);
    let mut clan = api.fetch_members().await?;
    let war_log = api.fetch_war_log(&clan).await?;
    let last_war = war_log
        .latest_period()
        .ok_or_else(|| anyhow!("The river race log is empty, cannot identify the current war"))?;
    let current_war = api.fetch_current_war(last_war).await?;
    api.fetch_season_stats(&mut clan).await?;

    let grid = store.read_sheet(&params.sheets.excuses).await?;
    let excuses = table_from_grid(&grid)
        .with_context(|| format!("Failed to parse excuse sheet '{}'", params.sheets.excuses))?;

    Ok(EvaluationInputs {
        clan,
        war_log,
        current_war,
        excuses,
    })
}

/// Write the results: history file, ranking file, both sheets.
pub async fn publish<S: SheetStore>(
    evaluation: &Evaluation,
    store: &S,
    params: &RankingParameters,
    now: DateTime<Utc>,
) -> Result<()> {
    append_rating_history(Path::new(&params.rating_history_file), &evaluation.ranked, now)?;

    let grid = ranking_grid(&evaluation.ranked);
    write_ranking_file(Path::new(&params.rating_file), &grid)?;
    store.write_sheet(&params.sheets.rating, &grid).await?;
    store
        .write_sheet(&params.sheets.excuses, &table_to_grid(&evaluation.excuses))
        .await?;
    info!("Results written to {} and {}", params.rating_file, params.rating_history_file);
    Ok(())
}

/// Announce pending promotions, if any.
pub async fn notify(
    evaluation: &Evaluation,
    discord: Option<&DiscordClient>,
    params: &RankingParameters,
) -> Result<()> {
    if evaluation.promotions.is_empty() {
        return Ok(());
    }
    match discord {
        Some(discord) => {
            discord
                .post_pending_promotions(&params.promotion_requirements, &evaluation.promotions)
                .await
        }
        None => {
            warn!("No Discord webhook configured, skipping promotion announcement");
            Ok(())
        }
    }
}
