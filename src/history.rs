use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::path::Path;

use crate::clan::Member;
use crate::config::constants::HISTORY_TIMESTAMP_FORMAT;
use crate::sheets::{read_grid, write_grid, Grid};

/// Add one rating column labelled `label` to a history grid.
///
/// Rows of former members are padded with an empty cell, new members get a row
/// with empty cells for all earlier runs.
pub fn append_column(mut history: Grid, label: &str, ratings: &[(String, f64)]) -> Grid {
    if history.is_empty() {
        history.push(vec!["tag".to_string()]);
    }
    let width = history.iter().map(Vec::len).max().unwrap_or(1);
    for row in history.iter_mut() {
        row.resize(width, String::new());
    }
    history[0].push(label.to_string());

    for (tag, rating) in ratings {
        let cell = format!("{:.0}", rating);
        match history.iter().skip(1).position(|row| row[0] == *tag) {
            Some(i) => history[i + 1].push(cell),
            None => {
                let mut row = vec![String::new(); width];
                row[0] = tag.clone();
                row.push(cell);
                history.push(row);
            }
        }
    }

    for row in history.iter_mut() {
        row.resize(width + 1, String::new());
    }
    history
}

/// Append the ratings of this run to the history file, creating it if needed.
pub fn append_rating_history(path: &Path, ranked: &[Member], now: DateTime<Utc>) -> Result<()> {
    let history = if path.exists() {
        let file = File::open(path)
            .with_context(|| format!("Failed to open rating history at {}", path.display()))?;
        read_grid(file).context("Failed to load rating history")?
    } else {
        Grid::new()
    };

    let ratings: Vec<(String, f64)> = ranked
        .iter()
        .filter_map(|m| m.rating().map(|r| (m.tag.clone(), r)))
        .collect();
    let label = now.format(HISTORY_TIMESTAMP_FORMAT).to_string();
    let history = append_column(history, &label, &ratings);

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    write_grid(&mut file, &history)?;
    file.commit().context("Failed to save rating history")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clan::{MemberRatings, Role};
    use chrono::TimeZone;
    use std::env;

    fn rated(tag: &str, rating: f64) -> Member {
        let mut member = Member::new(tag, tag, Role::Ordinary, 5000);
        member.ratings = Some(MemberRatings {
            rating,
            ladder: 0.0,
            current_war: 0.0,
            war_history: None,
            avg_fame: None,
            previous_league: 0.0,
            current_league: 0.0,
            previous_trophies: 0.0,
            current_trophies: 0.0,
            previous_season: 0.0,
            current_season: 0.0,
        });
        member
    }

    #[test]
    fn test_append_column() {
        let first = append_column(Grid::new(), "t1", &[("#1".to_string(), 612.4), ("#2".to_string(), 300.6)]);
        assert_eq!(
            first,
            vec![
                vec!["tag".to_string(), "t1".to_string()],
                vec!["#1".to_string(), "612".to_string()],
                vec!["#2".to_string(), "301".to_string()],
            ]
        );

        let second = append_column(first, "t2", &[("#3".to_string(), 100.0), ("#1".to_string(), 650.0)]);
        assert_eq!(second[0], vec!["tag", "t1", "t2"]);
        assert_eq!(second[1], vec!["#1", "612", "650"]);
        assert_eq!(second[2], vec!["#2", "301", ""]);
        assert_eq!(second[3], vec!["#3", "", "100"]);
    }

    #[test]
    fn test_append_rating_history_file() {
        let path = env::temp_dir().join("clan_rating_test_history.csv");
        let _ = std::fs::remove_file(&path);

        let now = Utc.with_ymd_and_hms(2025, 3, 20, 9, 44, 32).unwrap();
        append_rating_history(&path, &[rated("#1", 500.0)], now).unwrap();
        append_rating_history(&path, &[rated("#1", 510.0), rated("#2", 90.0)], now).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "tag;20.03.2025 09:44:32;20.03.2025 09:44:32");
        assert_eq!(lines[1], "#1;500;510");
        assert_eq!(lines[2], "#2;;90");

        let _ = std::fs::remove_file(&path);
    }
}
