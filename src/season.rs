//! Season and war calendar.
//!
//! Seasons start at 10:00 UTC on the first Monday of a month and run until the
//! first Monday of the following month. Wars start every Thursday at 10:00 UTC.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

use crate::config::constants::{RESET_HOUR, WAR_DURATION_DAYS, WAR_START_WEEKDAY};

fn reset_time() -> NaiveTime {
    NaiveTime::MIN + Duration::hours(RESET_HOUR)
}

fn first_monday_of_month(date: NaiveDate) -> NaiveDate {
    let first_day = date - Duration::days(date.day0() as i64);
    let offset = (7 - first_day.weekday().num_days_from_monday()) % 7;
    first_day + Duration::days(offset as i64)
}

/// Start of the season `now` falls into.
pub fn season_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let weekday = now.weekday().num_days_from_monday();
    let day = now.day();

    // No Monday 10:00 has happened yet this month
    let before_first_monday =
        weekday >= day || (weekday == 0 && day < 8 && now.time() < reset_time());

    let anchor = if before_first_monday {
        (now - Duration::weeks(1)).date_naive()
    } else {
        now.date_naive()
    };

    first_monday_of_month(anchor).and_time(reset_time()).and_utc()
}

/// End of the season starting at `start`: 4 or 5 weeks later, always in the next month.
pub fn season_end(start: DateTime<Utc>) -> DateTime<Utc> {
    let four_weeks_later = start + Duration::weeks(4);
    if four_weeks_later.month() != start.month() {
        four_weeks_later
    } else {
        four_weeks_later + Duration::weeks(1)
    }
}

/// Fraction of the current season that has elapsed, in [0, 1].
pub fn season_progress(now: DateTime<Utc>) -> f64 {
    let start = season_start(now);
    let end = season_end(start);
    let elapsed = (now - start).num_milliseconds() as f64;
    let total = (end - start).num_milliseconds() as f64;
    (elapsed / total).clamp(0.0, 1.0)
}

/// Time elapsed since the most recent war started.
pub fn time_since_war_start(now: DateTime<Utc>) -> Duration {
    let weekday = now.weekday().num_days_from_monday() as i64;
    let start_weekday = WAR_START_WEEKDAY.num_days_from_monday() as i64;
    let mut days_since_start = (weekday - start_weekday).rem_euclid(7);
    if days_since_start == 0 && now.time() < reset_time() {
        // Today's war has not started yet
        days_since_start = 7;
    }
    let war_start = (now.date_naive() - Duration::days(days_since_start))
        .and_time(reset_time())
        .and_utc();
    now - war_start
}

/// Fraction of the battle days that have elapsed, or 0 once the battle days are over.
pub fn war_progress(elapsed: Duration) -> f64 {
    let battle_days = Duration::days(WAR_DURATION_DAYS);
    if elapsed > battle_days {
        0.0
    } else {
        elapsed.num_milliseconds() as f64 / battle_days.num_milliseconds() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_season_start_mid_month() {
        assert_eq!(season_start(utc(2025, 3, 15, 12, 0)), utc(2025, 3, 3, 10, 0));
    }

    #[test]
    fn test_season_start_before_first_monday() {
        assert_eq!(season_start(utc(2025, 3, 1, 12, 0)), utc(2025, 2, 3, 10, 0));
    }

    #[test]
    fn test_season_start_on_first_monday_after_reset() {
        assert_eq!(season_start(utc(2025, 3, 3, 12, 0)), utc(2025, 3, 3, 10, 0));
    }

    #[test]
    fn test_season_start_on_first_monday_before_reset() {
        assert_eq!(season_start(utc(2025, 3, 3, 8, 0)), utc(2025, 2, 3, 10, 0));
    }

    #[test]
    fn test_season_start_end_of_month() {
        assert_eq!(season_start(utc(2025, 3, 31, 8, 0)), utc(2025, 3, 3, 10, 0));
    }

    #[test]
    fn test_season_start_second_monday() {
        assert_eq!(season_start(utc(2025, 9, 8, 8, 0)), utc(2025, 9, 1, 10, 0));
    }

    #[test]
    fn test_season_start_exactly_on_boundary() {
        assert_eq!(season_start(utc(2025, 9, 1, 10, 0)), utc(2025, 9, 1, 10, 0));
    }

    #[test]
    fn test_long_season_end() {
        let start = utc(2025, 3, 3, 10, 0);
        assert_eq!(season_end(start), start + Duration::weeks(5));
    }

    #[test]
    fn test_short_season_end() {
        let start = utc(2025, 4, 7, 10, 0);
        assert_eq!(season_end(start), start + Duration::weeks(4));
    }

    #[test]
    fn test_season_end_lands_in_following_month() {
        // Walk a couple of years day by day
        let mut now = utc(2024, 1, 1, 0, 0);
        while now < utc(2026, 1, 1, 0, 0) {
            let start = season_start(now);
            let end = season_end(start);
            let weeks = (end - start).num_weeks();
            assert!(weeks == 4 || weeks == 5, "{} -> {}", start, end);
            assert_eq!(end - start, Duration::weeks(weeks));
            let month_gap = (end.year() * 12 + end.month() as i32)
                - (start.year() * 12 + start.month() as i32);
            assert_eq!(month_gap, 1, "{} -> {}", start, end);
            assert!(start <= now && now < end);
            now += Duration::hours(13);
        }
    }

    #[test]
    fn test_season_progress_bounds() {
        assert_abs_diff_eq!(season_progress(utc(2025, 3, 3, 10, 0)), 0.0);
        let halfway = utc(2025, 3, 3, 10, 0) + Duration::minutes(5 * 7 * 24 * 60 / 2);
        assert_abs_diff_eq!(season_progress(halfway), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_time_since_war_start_on_war_end() {
        assert_eq!(time_since_war_start(utc(2025, 3, 24, 10, 0)), Duration::days(4));
    }

    #[test]
    fn test_time_since_war_start_on_war_start() {
        assert_eq!(time_since_war_start(utc(2025, 3, 20, 10, 0)), Duration::zero());
    }

    #[test]
    fn test_time_since_war_start_one_minute_after_start() {
        assert_eq!(time_since_war_start(utc(2025, 3, 20, 10, 1)), Duration::minutes(1));
    }

    #[test]
    fn test_time_since_war_start_one_minute_before_start() {
        assert_eq!(
            time_since_war_start(utc(2025, 3, 20, 9, 59)),
            Duration::days(6) + Duration::hours(23) + Duration::minutes(59)
        );
    }

    #[test]
    fn test_war_progress() {
        assert_abs_diff_eq!(war_progress(Duration::zero()), 0.0);
        assert_abs_diff_eq!(war_progress(Duration::days(2)), 0.5);
        assert_abs_diff_eq!(war_progress(Duration::days(4)), 1.0);
        assert_abs_diff_eq!(war_progress(Duration::days(4) + Duration::minutes(1)), 0.0);
    }
}
