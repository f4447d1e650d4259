//! Per-team season aggregates.

use serde::{Deserialize, Serialize};

use super::SeasonId;

/// One team's accumulated record for one season.
///
/// Raw fields (`games` through `pythagorean_losses`) are maintained by the
/// aggregate updater; the offensive/defensive block and
/// `final_pythagorean_winning_percentage` are written by the ranking pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSeason {
    pub team_name: String,
    pub season_id: SeasonId,

    /// Classification only, not aggregated
    pub league_name: String,
    pub conference_name: Option<String>,
    pub division_name: Option<String>,

    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,

    /// `(2 * wins + ties) / (2 * games)`, `None` before the first game
    pub winning_percentage: Option<f64>,

    pub points_for: u32,
    pub points_against: u32,

    pub pythagorean_wins: f64,
    pub pythagorean_losses: f64,

    pub offensive_average: Option<f64>,
    pub offensive_factor: Option<f64>,
    pub offensive_index: Option<f64>,

    pub defensive_average: Option<f64>,
    pub defensive_factor: Option<f64>,
    pub defensive_index: Option<f64>,

    pub final_pythagorean_winning_percentage: Option<f64>,
}

impl TeamSeason {
    /// Create an empty season row for a team.
    pub fn new(team_name: String, season_id: SeasonId, league_name: String) -> Self {
        Self {
            team_name,
            season_id,
            league_name,
            conference_name: None,
            division_name: None,
            games: 0,
            wins: 0,
            losses: 0,
            ties: 0,
            winning_percentage: None,
            points_for: 0,
            points_against: 0,
            pythagorean_wins: 0.0,
            pythagorean_losses: 0.0,
            offensive_average: None,
            offensive_factor: None,
            offensive_index: None,
            defensive_average: None,
            defensive_factor: None,
            defensive_index: None,
            final_pythagorean_winning_percentage: None,
        }
    }

    /// Builder method to set the conference.
    pub fn with_conference(mut self, conference: String) -> Self {
        self.conference_name = Some(conference);
        self
    }

    /// Builder method to set the division.
    pub fn with_division(mut self, division: String) -> Self {
        self.division_name = Some(division);
        self
    }

    /// Key used by the stores.
    pub fn key(&self) -> (String, SeasonId) {
        (self.team_name.clone(), self.season_id)
    }

    /// Whether the record satisfies `games == wins + losses + ties`.
    pub fn is_consistent(&self) -> bool {
        self.games == self.wins + self.losses + self.ties
    }

    /// Zero every aggregate, keeping identity and classification.
    pub fn reset(&mut self) {
        let mut fresh = Self::new(
            std::mem::take(&mut self.team_name),
            self.season_id,
            std::mem::take(&mut self.league_name),
        );
        fresh.conference_name = self.conference_name.take();
        fresh.division_name = self.division_name.take();
        *self = fresh;
    }

    /// Clear the fields owned by the ranking pass.
    pub fn clear_rankings(&mut self) {
        self.offensive_average = None;
        self.offensive_factor = None;
        self.offensive_index = None;
        self.defensive_average = None;
        self.defensive_factor = None;
        self.defensive_index = None;
        self.final_pythagorean_winning_percentage = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_team_season_is_empty() {
        let row = TeamSeason::new("Akron Pros".into(), 1920, "APFA".into());

        assert_eq!(row.games, 0);
        assert_eq!(row.winning_percentage, None);
        assert_eq!(row.pythagorean_wins, 0.0);
        assert!(row.is_consistent());
        assert_eq!(row.key(), ("Akron Pros".to_string(), 1920));
    }

    #[test]
    fn test_reset_keeps_classification() {
        let mut row = TeamSeason::new("Akron Pros".into(), 1920, "APFA".into())
            .with_conference("East".into())
            .with_division("North".into());
        row.games = 3;
        row.wins = 3;
        row.points_for = 42;
        row.offensive_index = Some(9.5);

        row.reset();

        let expected = TeamSeason::new("Akron Pros".into(), 1920, "APFA".into())
            .with_conference("East".into())
            .with_division("North".into());
        assert_eq!(row, expected);
    }

    #[test]
    fn test_inconsistent_record_detected() {
        let mut row = TeamSeason::new("Akron Pros".into(), 1920, "APFA".into());
        row.games = 2;
        row.wins = 1;
        assert!(!row.is_consistent());
    }

    #[test]
    fn test_clear_rankings() {
        let mut row = TeamSeason::new("Akron Pros".into(), 1920, "APFA".into());
        row.offensive_factor = Some(1.2);
        row.final_pythagorean_winning_percentage = Some(0.7);
        row.clear_rankings();
        assert_eq!(row.offensive_factor, None);
        assert_eq!(row.final_pythagorean_winning_percentage, None);
    }
}
