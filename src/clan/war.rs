use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::error::RatingError;

/// War identifier `<season>.<section>`; later wars compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodId {
    pub season: u32,
    pub section: u32,
}

impl PeriodId {
    pub fn new(season: u32, section: u32) -> Self {
        Self { season, section }
    }
}

impl fmt::Display for PeriodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.season, self.section)
    }
}

impl FromStr for PeriodId {
    type Err = RatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RatingError::InvalidPeriod(s.to_string());
        let (season, section) = s.trim().split_once('.').ok_or_else(invalid)?;
        Ok(PeriodId {
            season: season.parse().map_err(|_| invalid())?,
            section: section.parse().map_err(|_| invalid())?,
        })
    }
}

/// A recorded war result. A missing record means the player did not take part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Participation {
    /// Fame collected (possibly zero)
    Fame(f64),
    /// Excluded from scoring by an excuse or an ignored war
    Excused,
}

impl Participation {
    /// Fame that counts towards scoring, if any.
    pub fn fame(&self) -> Option<f64> {
        match self {
            Participation::Fame(f) => Some(*f),
            Participation::Excused => None,
        }
    }
}

/// Completed wars per member. Sparse: only actual records are stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WarLog {
    periods: BTreeSet<PeriodId>,
    rows: IndexMap<String, BTreeMap<PeriodId, Participation>>,
}

impl WarLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `tag` has a (possibly empty) row.
    pub fn add_member(&mut self, tag: &str) {
        if !self.rows.contains_key(tag) {
            self.rows.insert(tag.to_string(), BTreeMap::new());
        }
    }

    pub fn add_period(&mut self, period: PeriodId) {
        self.periods.insert(period);
    }

    pub fn insert(&mut self, tag: &str, period: PeriodId, value: Participation) {
        self.periods.insert(period);
        self.add_member(tag);
        if let Some(row) = self.rows.get_mut(tag) {
            row.insert(period, value);
        }
    }

    pub fn get(&self, tag: &str, period: PeriodId) -> Option<Participation> {
        self.rows.get(tag).and_then(|row| row.get(&period)).copied()
    }

    pub fn contains_member(&self, tag: &str) -> bool {
        self.rows.contains_key(tag)
    }

    pub fn contains_period(&self, period: PeriodId) -> bool {
        self.periods.contains(&period)
    }

    /// Known wars, newest first.
    pub fn periods(&self) -> impl Iterator<Item = PeriodId> + '_ {
        self.periods.iter().rev().copied()
    }

    pub fn latest_period(&self) -> Option<PeriodId> {
        self.periods.last().copied()
    }

    pub fn row_mut(&mut self, tag: &str) -> Option<&mut BTreeMap<PeriodId, Participation>> {
        self.rows.get_mut(tag)
    }

    /// Average fame over the wars that count, `None` if none do.
    pub fn mean_fame(&self, tag: &str) -> Option<f64> {
        let fame: Vec<f64> = self
            .rows
            .get(tag)?
            .values()
            .filter_map(Participation::fame)
            .collect();
        crate::scoring::mean(&fame)
    }

    /// Number of wars in which `tag` collected at least `min_fame`.
    pub fn count_at_least(&self, tag: &str, min_fame: f64) -> usize {
        self.rows
            .get(tag)
            .map(|row| {
                row.values()
                    .filter_map(Participation::fame)
                    .filter(|f| *f >= min_fame)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Multiply all fame recorded in `period` by `factor`.
    pub fn scale_period(&mut self, period: PeriodId, factor: f64) {
        for row in self.rows.values_mut() {
            if let Some(Participation::Fame(fame)) = row.get_mut(&period) {
                *fame *= factor;
            }
        }
    }

    /// Exclude every record of `period` from scoring.
    pub fn exclude_period(&mut self, period: PeriodId) {
        for row in self.rows.values_mut() {
            if let Some(value) = row.get_mut(&period) {
                *value = Participation::Excused;
            }
        }
    }
}

/// Fame snapshot of the war in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWar {
    pub id: PeriodId,
    fame: IndexMap<String, Participation>,
}

impl CurrentWar {
    pub fn new(id: PeriodId) -> Self {
        Self {
            id,
            fame: IndexMap::new(),
        }
    }

    pub fn set(&mut self, tag: &str, value: Participation) {
        self.fame.insert(tag.to_string(), value);
    }

    pub fn get(&self, tag: &str) -> Option<Participation> {
        self.fame.get(tag).copied()
    }

    /// Fame of `tag`, treating players missing from the snapshot as zero.
    pub fn get_or_zero(&self, tag: &str) -> Participation {
        self.get(tag).unwrap_or(Participation::Fame(0.0))
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, Participation)> {
        self.fame.iter().map(|(tag, v)| (tag.as_str(), *v))
    }

    /// Reset everybody's fame to zero.
    pub fn clear_fame(&mut self) {
        for value in self.fame.values_mut() {
            *value = Participation::Fame(0.0);
        }
    }
}
