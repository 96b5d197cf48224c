use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::clan::PeriodId;
use crate::error::RatingError;

/// Excuse codes recognized in the excuse sheet.
///
/// Example YAML:
/// ```yaml
/// excuses:
///   not_in_clan: "not in clan"
///   new_player: "new player"
///   personal: "personal"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExcuseCodes {
    /// Player was not a member during the war; set automatically
    pub not_in_clan: String,
    /// Player joined during the war
    pub new_player: String,
    /// Leadership accepted a personal reason
    pub personal: String,
}

/// What an accepted excuse does to a fame record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExcuseKind {
    /// The war does not count for the player
    IgnoreWar,
    /// The player is credited with nominal fame
    Nominal,
}

impl ExcuseCodes {
    pub fn all(&self) -> [&str; 3] {
        [self.not_in_clan.as_str(), self.new_player.as_str(), self.personal.as_str()]
    }

    pub fn classify(&self, code: &str) -> Result<ExcuseKind, RatingError> {
        if code == self.not_in_clan || code == self.new_player {
            Ok(ExcuseKind::IgnoreWar)
        } else if code == self.personal {
            Ok(ExcuseKind::Nominal)
        } else {
            Err(RatingError::UnknownExcuse(code.to_string()))
        }
    }
}

impl Default for ExcuseCodes {
    fn default() -> Self {
        Self {
            not_in_clan: "not in clan".to_string(),
            new_player: "new player".to_string(),
            personal: "personal".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExcuseRow {
    pub name: String,
    codes: BTreeMap<PeriodId, String>,
}

impl ExcuseRow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            codes: BTreeMap::new(),
        }
    }

    /// Code for `period`, empty if none was entered.
    pub fn get(&self, period: PeriodId) -> &str {
        self.codes.get(&period).map(String::as_str).unwrap_or("")
    }

    /// Set the code for `period`; an empty code clears the cell.
    pub fn set(&mut self, period: PeriodId, code: &str) {
        if code.is_empty() {
            self.codes.remove(&period);
        } else {
            self.codes.insert(period, code.to_string());
        }
    }

    /// Number of cells holding exactly `code`.
    pub fn count(&self, code: &str) -> usize {
        self.codes.values().filter(|c| c.as_str() == code).count()
    }
}

/// Curated excuses per player and war, persisted as a sheet.
///
/// Every row has a cell for every column in `periods`; empty cells are not stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExcuseTable {
    periods: BTreeSet<PeriodId>,
    rows: IndexMap<String, ExcuseRow>,
}

impl ExcuseTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// War columns, newest first.
    pub fn periods(&self) -> impl Iterator<Item = PeriodId> + '_ {
        self.periods.iter().rev().copied()
    }

    pub fn contains_period(&self, period: PeriodId) -> bool {
        self.periods.contains(&period)
    }

    /// Add an empty column; existing cells are untouched.
    pub fn add_period(&mut self, period: PeriodId) -> bool {
        self.periods.insert(period)
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        self.rows.contains_key(tag)
    }

    pub fn row(&self, tag: &str) -> Option<&ExcuseRow> {
        self.rows.get(tag)
    }

    /// Row of `tag`, created empty if missing.
    pub fn row_mut_or_insert(&mut self, tag: &str) -> &mut ExcuseRow {
        self.rows.entry(tag.to_string()).or_default()
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &ExcuseRow)> {
        self.rows.iter().map(|(tag, row)| (tag.as_str(), row))
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// Code of `tag` for `period`, empty if there is none.
    pub fn get(&self, tag: &str, period: PeriodId) -> &str {
        self.rows.get(tag).map(|row| row.get(period)).unwrap_or("")
    }

    pub fn set(&mut self, tag: &str, period: PeriodId, code: &str) {
        self.add_period(period);
        self.row_mut_or_insert(tag).set(period, code);
    }

    /// Drop rows matching `condition`, returning their tags.
    pub fn remove_rows<F>(&mut self, condition: F) -> Vec<String>
    where
        F: Fn(&ExcuseRow) -> bool,
    {
        let removed: Vec<String> = self
            .rows
            .iter()
            .filter(|(_, row)| condition(row))
            .map(|(tag, _)| tag.clone())
            .collect();
        self.rows.retain(|_, row| !condition(row));
        removed
    }

    /// Keep only the `count` newest war columns, returning the dropped ones.
    pub fn retain_newest_periods(&mut self, count: usize) -> Vec<PeriodId> {
        let dropped: Vec<PeriodId> = self.periods().skip(count).collect();
        for period in &dropped {
            self.periods.remove(period);
            for row in self.rows.values_mut() {
                row.codes.remove(period);
            }
        }
        dropped
    }

    /// Stable sort of the rows by display name.
    pub fn sort_by_name(&mut self) {
        self.rows.sort_by(|_, a, _, b| a.name.cmp(&b.name));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
