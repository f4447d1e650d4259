//! Game model and outcome resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityId, GameId, SeasonId};

/// Winner and loser of a decided game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<'a> {
    pub winner_name: &'a str,
    pub winner_score: u32,
    pub loser_name: &'a str,
    pub loser_score: u32,
}

/// A single game between a guest and a host team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// Unique identifier (derived from season + week + guest + host)
    pub id: GameId,

    /// Season this game belongs to
    pub season_id: SeasonId,

    /// Week of the season
    pub week: u32,

    pub guest_name: String,
    pub guest_score: u32,

    pub host_name: String,
    pub host_score: u32,

    /// Winner, `None` on a tie
    pub winner_name: Option<String>,
    pub winner_score: Option<u32>,

    /// Loser, `None` on a tie
    pub loser_name: Option<String>,
    pub loser_score: Option<u32>,

    /// Whether this is a playoff game
    #[serde(default)]
    pub is_playoff: bool,

    /// Free-text note
    #[serde(default)]
    pub notes: Option<String>,

    /// When this record was created
    pub created_at: DateTime<Utc>,
}

impl Game {
    /// Create a new Game with auto-generated ID and resolved outcome.
    pub fn new(
        season_id: SeasonId,
        week: u32,
        guest_name: String,
        guest_score: u32,
        host_name: String,
        host_score: u32,
    ) -> Self {
        let id = Self::generate_id(season_id, week, &guest_name, &host_name);

        Self {
            id,
            season_id,
            week,
            guest_name,
            guest_score,
            host_name,
            host_score,
            winner_name: None,
            winner_score: None,
            loser_name: None,
            loser_score: None,
            is_playoff: false,
            notes: None,
            created_at: Utc::now(),
        }
        .resolve_outcome()
    }

    /// Deterministic id for a matchup in a given week.
    pub fn generate_id(season_id: SeasonId, week: u32, guest: &str, host: &str) -> GameId {
        EntityId::generate(&[&season_id.to_string(), &week.to_string(), guest, host])
    }

    /// Builder method to mark a playoff game.
    pub fn with_playoff(mut self, is_playoff: bool) -> Self {
        self.is_playoff = is_playoff;
        self
    }

    /// Builder method to attach a note.
    pub fn with_notes(mut self, notes: String) -> Self {
        self.notes = Some(notes);
        self
    }

    /// Fill in winner and loser from the two scores.
    ///
    /// A tie clears all four winner/loser fields; it is a valid result, not
    /// an error. Calling this more than once has no further effect.
    pub fn resolve_outcome(mut self) -> Self {
        let resolved = self.decide_outcome().map(|o| {
            (
                o.winner_name.to_string(),
                o.winner_score,
                o.loser_name.to_string(),
                o.loser_score,
            )
        });

        match resolved {
            Some((winner_name, winner_score, loser_name, loser_score)) => {
                self.winner_name = Some(winner_name);
                self.winner_score = Some(winner_score);
                self.loser_name = Some(loser_name);
                self.loser_score = Some(loser_score);
            }
            None => {
                self.winner_name = None;
                self.winner_score = None;
                self.loser_name = None;
                self.loser_score = None;
            }
        }
        self
    }

    /// Compare the scores directly, without reading the stored winner/loser.
    pub fn decide_outcome(&self) -> Option<Outcome<'_>> {
        use std::cmp::Ordering;

        match self.guest_score.cmp(&self.host_score) {
            Ordering::Greater => Some(Outcome {
                winner_name: &self.guest_name,
                winner_score: self.guest_score,
                loser_name: &self.host_name,
                loser_score: self.host_score,
            }),
            Ordering::Less => Some(Outcome {
                winner_name: &self.host_name,
                winner_score: self.host_score,
                loser_name: &self.guest_name,
                loser_score: self.guest_score,
            }),
            Ordering::Equal => None,
        }
    }

    /// Whether `team` played in this game.
    pub fn involves(&self, team: &str) -> bool {
        self.guest_name == team || self.host_name == team
    }

    /// The other side of the game from `team`'s point of view.
    pub fn opponent_of(&self, team: &str) -> Option<&str> {
        if self.guest_name == team {
            Some(&self.host_name)
        } else if self.host_name == team {
            Some(&self.guest_name)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} week {}: {} {} @ {} {}",
            self.season_id,
            self.week,
            self.guest_name,
            self.guest_score,
            self.host_name,
            self.host_score
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_win_resolves_guest_as_winner() {
        let game = Game::new(1920, 1, "Akron".into(), 20, "Canton".into(), 10);

        assert_eq!(game.winner_name.as_deref(), Some("Akron"));
        assert_eq!(game.winner_score, Some(20));
        assert_eq!(game.loser_name.as_deref(), Some("Canton"));
        assert_eq!(game.loser_score, Some(10));
    }

    #[test]
    fn test_host_win_resolves_host_as_winner() {
        let game = Game::new(1920, 1, "Akron".into(), 3, "Canton".into(), 7);

        assert_eq!(game.winner_name.as_deref(), Some("Canton"));
        assert_eq!(game.winner_score, Some(7));
        assert_eq!(game.loser_name.as_deref(), Some("Akron"));
        assert_eq!(game.loser_score, Some(3));
    }

    #[test]
    fn test_tie_leaves_winner_and_loser_unset() {
        let game = Game::new(1920, 1, "Akron".into(), 0, "Canton".into(), 0);

        assert!(game.winner_name.is_none());
        assert!(game.winner_score.is_none());
        assert!(game.loser_name.is_none());
        assert!(game.loser_score.is_none());
    }

    #[test]
    fn test_resolve_outcome_is_idempotent() {
        let game = Game::new(1920, 1, "Akron".into(), 14, "Canton".into(), 7);
        let again = game.clone().resolve_outcome();
        assert_eq!(game, again);
    }

    #[test]
    fn test_resolve_outcome_clears_stale_winner_after_score_change() {
        let mut game = Game::new(1920, 1, "Akron".into(), 14, "Canton".into(), 7);
        game.host_score = 14;
        let game = game.resolve_outcome();

        assert!(game.winner_name.is_none());
        assert!(game.loser_score.is_none());
    }

    #[test]
    fn test_game_id_is_deterministic() {
        let a = Game::new(1920, 2, "Akron".into(), 14, "Canton".into(), 7);
        let b = Game::new(1920, 2, "Akron".into(), 0, "Canton".into(), 0);
        assert_eq!(a.id, b.id);
        assert_eq!(a.id, Game::generate_id(1920, 2, "Akron", "Canton"));
    }

    #[test]
    fn test_opponent_of() {
        let game = Game::new(1920, 1, "Akron".into(), 14, "Canton".into(), 7);
        assert_eq!(game.opponent_of("Akron"), Some("Canton"));
        assert_eq!(game.opponent_of("Canton"), Some("Akron"));
        assert_eq!(game.opponent_of("Dayton"), None);
        assert!(game.involves("Canton"));
        assert!(!game.involves("Dayton"));
    }

    #[test]
    fn test_builders_and_display() {
        let game = Game::new(1921, 12, "Akron".into(), 14, "Canton".into(), 7)
            .with_playoff(true)
            .with_notes("Neutral site".to_string());

        assert!(game.is_playoff);
        assert_eq!(game.notes.as_deref(), Some("Neutral site"));
        assert_eq!(game.to_string(), "1921 week 12: Akron 14 @ Canton 7");
    }

    #[test]
    fn test_game_serialization() {
        let game = Game::new(1920, 1, "Akron".into(), 14, "Canton".into(), 7);
        let json = serde_json::to_string(&game).unwrap();
        let parsed: Game = serde_json::from_str(&json).unwrap();
        assert_eq!(game, parsed);
    }
}
