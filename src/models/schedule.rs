//! Schedule-strength profiles.

use serde::{Deserialize, Serialize};

use super::SeasonId;
use crate::calculate::divide;

/// One opponent faced in one game, with that opponent's season record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentRecord {
    pub opponent_name: String,
    pub games: u32,
    pub points_for: u32,
    pub points_against: u32,
}

/// Sums over every opponent entry in a schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTotals {
    pub games: u32,
    pub points_for: u32,
    pub points_against: u32,
}

/// Per-game opponent scoring, derived from [`ScheduleTotals`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleAverages {
    pub points_for: f64,
    pub points_against: f64,
}

/// Everything known about the strength of one team's schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleProfile {
    pub team_name: String,
    pub season_id: SeasonId,
    pub opponents: Vec<OpponentRecord>,
    pub totals: ScheduleTotals,

    /// `None` when the opponents have no games between them
    pub averages: Option<ScheduleAverages>,
}

impl ScheduleProfile {
    /// Build a profile and its totals/averages from opponent entries.
    pub fn from_opponents(
        team_name: String,
        season_id: SeasonId,
        opponents: Vec<OpponentRecord>,
    ) -> Self {
        let totals = opponents
            .iter()
            .fold(ScheduleTotals::default(), |mut acc, o| {
                acc.games += o.games;
                acc.points_for += o.points_for;
                acc.points_against += o.points_against;
                acc
            });

        let games = f64::from(totals.games);
        let averages = divide(f64::from(totals.points_for), games)
            .zip(divide(f64::from(totals.points_against), games))
            .map(|(points_for, points_against)| ScheduleAverages {
                points_for,
                points_against,
            });

        Self {
            team_name,
            season_id,
            opponents,
            totals,
            averages,
        }
    }
}

/// League-wide totals for one season.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueTotals {
    pub total_games: u32,
    pub total_points: u32,
}
