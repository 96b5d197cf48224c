use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Clan role, collapsed to what the rating cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Plain member, eligible for promotion
    Ordinary,
    /// Elder, co-leader or leader
    Elevated,
}

impl Role {
    /// Map the role string reported by the game API.
    pub fn from_api(role: &str) -> Self {
        if role.eq_ignore_ascii_case("member") {
            Role::Ordinary
        } else {
            Role::Elevated
        }
    }
}

/// Path of Legends results of the current and the previous season.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonStats {
    pub current_league: u32,
    pub current_trophies: u32,
    pub previous_league: u32,
    pub previous_trophies: u32,
}

/// Scores derived by the scoring engine, all on a 0..=1000 scale except `rating`
/// and `avg_fame`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MemberRatings {
    pub rating: f64,
    pub ladder: f64,
    pub current_war: f64,
    pub war_history: Option<f64>,
    pub avg_fame: Option<f64>,
    pub previous_league: f64,
    pub current_league: f64,
    pub previous_trophies: f64,
    pub current_trophies: f64,
    pub previous_season: f64,
    pub current_season: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub tag: String,
    pub name: String,
    pub role: Role,
    pub trophies: u32,
    pub level: Option<u32>,
    pub net_donations: Option<i64>,
    pub last_seen: Option<DateTime<Utc>>,
    pub season: SeasonStats,
    /// `None` until the scoring engine has run
    pub ratings: Option<MemberRatings>,
}

impl Member {
    pub fn new(tag: impl Into<String>, name: impl Into<String>, role: Role, trophies: u32) -> Self {
        Self {
            tag: tag.into(),
            name: name.into(),
            role,
            trophies,
            level: None,
            net_donations: None,
            last_seen: None,
            season: SeasonStats::default(),
            ratings: None,
        }
    }

    pub fn with_season(mut self, season: SeasonStats) -> Self {
        self.season = season;
        self
    }

    pub fn rating(&self) -> Option<f64> {
        self.ratings.map(|r| r.rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_api() {
        assert_eq!(Role::from_api("member"), Role::Ordinary);
        assert_eq!(Role::from_api("elder"), Role::Elevated);
        assert_eq!(Role::from_api("coLeader"), Role::Elevated);
        assert_eq!(Role::from_api("leader"), Role::Elevated);
    }

    #[test]
    fn test_new_member_has_no_ratings() {
        let member = Member::new("#ABC", "alice", Role::Ordinary, 5000);
        assert!(member.ratings.is_none());
        assert_eq!(member.rating(), None);
        assert_eq!(member.season, SeasonStats::default());
    }
}
