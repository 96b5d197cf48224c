use tracing::info;

use super::types::{ExcuseCodes, ExcuseKind, ExcuseTable};
use crate::clan::{Clan, CurrentWar, Participation, PeriodId, WarLog};
use crate::config::constants::NOMINAL_EXCUSE_FAME;
use crate::error::RatingError;

/// Fame record after applying `excuse`.
///
/// Records without an excuse, missing records and records already excluded are
/// returned unchanged; the code is only checked when it would take effect.
/// `factor` scales the nominal fame of a war still in progress.
pub fn adjusted_fame(
    codes: &ExcuseCodes,
    excuse: &str,
    fame: Option<Participation>,
    factor: f64,
) -> Result<Option<Participation>, RatingError> {
    match fame {
        Some(Participation::Fame(_)) if !excuse.is_empty() => match codes.classify(excuse)? {
            ExcuseKind::IgnoreWar => Ok(Some(Participation::Excused)),
            ExcuseKind::Nominal => Ok(Some(Participation::Fame((NOMINAL_EXCUSE_FAME * factor).trunc()))),
        },
        other => Ok(other),
    }
}

fn log_accepted(excuse: &str, name: &str, period: PeriodId) {
    info!("Excuse {} accepted for player={} in war={}", excuse, name, period);
}

/// Apply excuses to the fame records of all clan members.
///
/// Members missing from the current war enter with zero fame.
pub fn adjust_fame_with_excuses(
    excuses: &ExcuseTable,
    codes: &ExcuseCodes,
    clan: &Clan,
    current_war: &mut CurrentWar,
    war_log: &mut WarLog,
    war_progress: f64,
) -> Result<(), RatingError> {
    for member in clan.members() {
        let tag = member.tag.as_str();

        let excuse = excuses.get(tag, current_war.id);
        let before = current_war.get_or_zero(tag);
        if let Some(after) = adjusted_fame(codes, excuse, Some(before), war_progress)? {
            if after != before {
                log_accepted(excuse, &member.name, current_war.id);
            }
            current_war.set(tag, after);
        }

        if let Some(row) = war_log.row_mut(tag) {
            for (period, record) in row.iter_mut() {
                let excuse = excuses.get(tag, *period);
                if let Some(after) = adjusted_fame(codes, excuse, Some(*record), 1.0)? {
                    if after != *record {
                        log_accepted(excuse, &member.name, *period);
                    }
                    *record = after;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clan::{Member, Role};

    fn codes() -> ExcuseCodes {
        ExcuseCodes {
            not_in_clan: "NIC".to_string(),
            new_player: "NPE".to_string(),
            personal: "PE".to_string(),
        }
    }

    #[test]
    fn test_no_excuse_returns_old_fame() {
        let fame = Some(Participation::Fame(1234.0));
        assert_eq!(adjusted_fame(&codes(), "", fame, 1.0), Ok(fame));
    }

    #[test]
    fn test_missing_record_is_preserved() {
        assert_eq!(adjusted_fame(&codes(), "ANY", None, 1.0), Ok(None));
        let excused = Some(Participation::Excused);
        assert_eq!(adjusted_fame(&codes(), "PE", excused, 1.0), Ok(excused));
    }

    #[test]
    fn test_ignore_war_excuse_excludes_record() {
        let fame = Some(Participation::Fame(1200.0));
        assert_eq!(adjusted_fame(&codes(), "NIC", fame, 1.0), Ok(Some(Participation::Excused)));
        assert_eq!(adjusted_fame(&codes(), "NPE", fame, 1.0), Ok(Some(Participation::Excused)));
    }

    #[test]
    fn test_personal_excuse_scales_nominal_fame() {
        let fame = Some(Participation::Fame(500.0));
        assert_eq!(adjusted_fame(&codes(), "PE", fame, 0.5), Ok(Some(Participation::Fame(800.0))));
        assert_eq!(adjusted_fame(&codes(), "PE", fame, 1.0), Ok(Some(Participation::Fame(1600.0))));
        assert_eq!(adjusted_fame(&codes(), "PE", fame, 0.3), Ok(Some(Participation::Fame(480.0))));
    }

    #[test]
    fn test_invalid_excuse_is_fatal() {
        let result = adjusted_fame(&codes(), "INVALID_EXCUSE", Some(Participation::Fame(1000.0)), 1.0);
        assert_eq!(result, Err(RatingError::UnknownExcuse("INVALID_EXCUSE".to_string())));
    }

    #[test]
    fn test_adjust_fame_with_excuses() {
        let clan: Clan = [
            Member::new("#1", "player1", Role::Ordinary, 5000),
            Member::new("#2", "player2", Role::Ordinary, 5000),
            Member::new("#3", "player3", Role::Ordinary, 5000),
        ]
        .into_iter()
        .collect();

        let current = PeriodId::new(100, 1);
        let previous = PeriodId::new(100, 0);

        let mut excuses = ExcuseTable::new();
        excuses.set("#1", current, "PE");
        excuses.set("#2", previous, "NPE");
        excuses.set("#3", previous, "PE");

        let mut current_war = CurrentWar::new(current);
        current_war.set("#1", Participation::Fame(100.0));
        current_war.set("#2", Participation::Fame(700.0));

        let mut war_log = WarLog::new();
        war_log.insert("#1", previous, Participation::Fame(2000.0));
        war_log.insert("#2", previous, Participation::Fame(300.0));
        war_log.add_member("#3");

        adjust_fame_with_excuses(&excuses, &codes(), &clan, &mut current_war, &mut war_log, 0.5).unwrap();

        assert_eq!(current_war.get("#1"), Some(Participation::Fame(800.0)));
        assert_eq!(current_war.get("#2"), Some(Participation::Fame(700.0)));
        assert_eq!(current_war.get("#3"), Some(Participation::Fame(0.0)));

        assert_eq!(war_log.get("#1", previous), Some(Participation::Fame(2000.0)));
        assert_eq!(war_log.get("#2", previous), Some(Participation::Excused));
        // No record, so the excuse has nothing to adjust
        assert_eq!(war_log.get("#3", previous), None);
    }

    #[test]
    fn test_adjust_fame_rejects_unknown_code_on_record() {
        let clan: Clan = [Member::new("#1", "player1", Role::Ordinary, 5000)].into_iter().collect();
        let previous = PeriodId::new(100, 0);
        let mut excuses = ExcuseTable::new();
        excuses.set("#1", previous, "vacation");

        let mut current_war = CurrentWar::new(PeriodId::new(100, 1));
        let mut war_log = WarLog::new();
        war_log.insert("#1", previous, Participation::Fame(100.0));

        let result =
            adjust_fame_with_excuses(&excuses, &codes(), &clan, &mut current_war, &mut war_log, 1.0);
        assert!(matches!(result, Err(RatingError::UnknownExcuse(code)) if code == "vacation"));
    }
}
