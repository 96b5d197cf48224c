//! Tuning constants shared by the evaluation pipeline.

use chrono::Weekday;

/// Hour (UTC) at which wars start and seasons roll over.
pub const RESET_HOUR: i64 = 10;

/// Weekday on which a new war starts.
pub const WAR_START_WEEKDAY: Weekday = Weekday::Thu;

/// Number of battle days in a regular war.
pub const WAR_DURATION_DAYS: i64 = 4;

/// Fame granted for an accepted excuse in a completed war.
pub const NOMINAL_EXCUSE_FAME: f64 = 1600.0;

/// Short wars last three instead of four battle days.
pub const SHORT_WAR_FACTOR: f64 = 4.0 / 3.0;

/// Rows carrying the not-in-clan excuse this many times are dropped.
pub const RETENTION_ABSENCES: usize = 11;

/// Excuse table width: name + current war + 10 completed wars.
pub const RETENTION_COLUMNS: usize = 12;

/// Only players in this league receive a season trophy score.
pub const TOP_LEAGUE: u32 = 10;

/// Upper bound of every normalized score.
pub const SCORE_SCALE: f64 = 1000.0;

/// Allowed deviation of the weight sum from 1.
pub const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Column label format of the rating history file (UTC).
pub const HISTORY_TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";
