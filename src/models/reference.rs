//! Reference entities: seasons, teams and leagues.

use serde::{Deserialize, Serialize};

use super::SeasonId;

/// A season of play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub id: SeasonId,

    /// Number of regular-season weeks scheduled, if known
    #[serde(default)]
    pub weeks_scheduled: Option<u32>,
}

impl Season {
    pub fn new(id: SeasonId) -> Self {
        Self {
            id,
            weeks_scheduled: None,
        }
    }

    pub fn with_weeks_scheduled(mut self, weeks: u32) -> Self {
        self.weeks_scheduled = Some(weeks);
        self
    }
}

/// A franchise, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
}

/// A league, with the seasons it was active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub name: String,
    pub first_season_id: SeasonId,
    pub last_season_id: Option<SeasonId>,
}

impl League {
    pub fn new(name: String, first_season_id: SeasonId) -> Self {
        Self {
            name,
            first_season_id,
            last_season_id: None,
        }
    }

    /// Whether the league played in `season_id`.
    pub fn active_in(&self, season_id: SeasonId) -> bool {
        season_id >= self.first_season_id
            && self.last_season_id.map_or(true, |last| season_id <= last)
    }
}
