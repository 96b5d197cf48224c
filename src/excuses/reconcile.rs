use tracing::info;

use super::types::{ExcuseCodes, ExcuseTable};
use crate::clan::{Clan, PeriodId, WarLog};
use crate::config::constants::{RETENTION_ABSENCES, RETENTION_COLUMNS};

/// Make sure there is a column for the current war and every logged war.
pub fn add_missing_wars(excuses: &mut ExcuseTable, current_war: PeriodId, war_log: &WarLog) {
    for period in std::iter::once(current_war).chain(war_log.periods()) {
        excuses.add_period(period);
    }
}

/// Give every member a row and refresh display names.
pub fn add_missing_players(excuses: &mut ExcuseTable, clan: &Clan) {
    for member in clan.members() {
        excuses.row_mut_or_insert(&member.tag).name = member.name.clone();
    }
}

/// Set the not-in-clan excuse for former members and clear it for current ones.
pub fn update_current_war(
    excuses: &mut ExcuseTable,
    clan: &Clan,
    current_war: PeriodId,
    not_in_clan: &str,
) {
    let tags: Vec<String> = excuses.tags().map(str::to_string).collect();
    for tag in tags {
        let excuse = excuses.get(&tag, current_war).to_string();
        if clan.contains(&tag) {
            if excuse == not_in_clan {
                info!("Unsetting excuse {} for player {} as player is in clan", not_in_clan, tag);
                excuses.set(&tag, current_war, "");
            }
        } else if excuse.is_empty() {
            excuses.set(&tag, current_war, not_in_clan);
            info!("Setting excuse {} for player {} as player is not in clan", not_in_clan, tag);
        }
    }
}

/// Only retain the current and the previous 10 wars, and forget players that
/// have been gone for the whole window.
pub fn truncate(excuses: &mut ExcuseTable, not_in_clan: &str) {
    let removed = excuses.remove_rows(|row| row.count(not_in_clan) >= RETENTION_ABSENCES);
    if !removed.is_empty() {
        info!(
            "Drop rows for tags {:?} from excuses as players haven't been in the clan in a long time",
            removed
        );
    }

    // One column is the player name
    let dropped = excuses.retain_newest_periods(RETENTION_COLUMNS - 1);
    if !dropped.is_empty() {
        let labels: Vec<String> = dropped.iter().map(PeriodId::to_string).collect();
        info!("Drop columns {:?} from excuses as wars are too old", labels);
    }
}

/// Reconcile the stored excuses with the current roster and wars.
///
/// Works on a copy; the stored table is written back in full by the caller.
pub fn update_excuses(
    excuses: &ExcuseTable,
    clan: &Clan,
    current_war: PeriodId,
    war_log: &WarLog,
    codes: &ExcuseCodes,
) -> ExcuseTable {
    let mut updated = excuses.clone();
    add_missing_wars(&mut updated, current_war, war_log);
    add_missing_players(&mut updated, clan);
    update_current_war(&mut updated, clan, current_war, &codes.not_in_clan);
    truncate(&mut updated, &codes.not_in_clan);
    updated.sort_by_name();
    updated
}
