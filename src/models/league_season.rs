//! League-wide season totals.

use serde::{Deserialize, Serialize};

use super::SeasonId;

/// One league's totals for one season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueSeason {
    pub league_name: String,
    pub season_id: SeasonId,

    /// Team-games played by member teams
    pub total_games: u32,

    /// Points scored by member teams
    pub total_points: u32,

    /// Points per team-game, `None` before any game
    pub average_points: Option<f64>,
}

impl LeagueSeason {
    pub fn new(league_name: String, season_id: SeasonId) -> Self {
        Self {
            league_name,
            season_id,
            total_games: 0,
            total_points: 0,
            average_points: None,
        }
    }

    pub fn key(&self) -> (String, SeasonId) {
        (self.league_name.clone(), self.season_id)
    }
}
