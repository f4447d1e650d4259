//! Incremental season aggregates.
//!
//! One code path adds or reverses a game's effect on the two participating
//! teams' [`TeamSeason`] rows. Both rows are updated on local copies and
//! written back only when every step succeeded, so a failed call leaves the
//! store exactly as it was.

use std::str::FromStr;

use thiserror::Error;

use crate::calculate::{
    pythagorean_record, pythagorean_winning_percentage_with_exponent, winning_percentage,
    DEFAULT_PYTHAGOREAN_EXPONENT,
};
use crate::models::{Game, GameId, SeasonId, TeamSeason};
use crate::storage::SeasonStore;

/// Errors that can occur while applying a game.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("No season record for {team} in {season_id}")]
    TeamSeasonNotFound { team: String, season_id: SeasonId },

    #[error("Invalid direction: {0}")]
    InvalidDirection(String),

    #[error("{field} for {team} in {season_id} would leave the u32 range")]
    CounterUnderflow {
        team: String,
        season_id: SeasonId,
        field: &'static str,
    },

    #[error("Invalid game {id}: {reason}")]
    InvalidGame { id: GameId, reason: String },
}

/// Whether a game's effect is being added or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increase,
    Decrease,
}

impl Direction {
    fn step(self, value: u32, amount: u32) -> Option<u32> {
        match self {
            Direction::Increase => value.checked_add(amount),
            Direction::Decrease => value.checked_sub(amount),
        }
    }
}

impl TryFrom<i64> for Direction {
    type Error = AggregateError;

    fn try_from(sign: i64) -> Result<Self, Self::Error> {
        match sign {
            1 => Ok(Direction::Increase),
            -1 => Ok(Direction::Decrease),
            other => Err(AggregateError::InvalidDirection(other.to_string())),
        }
    }
}

impl FromStr for Direction {
    type Err = AggregateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "increase" | "add" | "+" => Ok(Direction::Increase),
            "decrease" | "remove" | "-" => Ok(Direction::Decrease),
            other => Err(AggregateError::InvalidDirection(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SideResult {
    Win,
    Loss,
    Tie,
}

/// Applies and reverses single games against a [`SeasonStore`].
#[derive(Debug, Clone, Copy)]
pub struct AggregateUpdater {
    pythagorean_exponent: f64,
}

impl Default for AggregateUpdater {
    fn default() -> Self {
        Self::new(DEFAULT_PYTHAGOREAN_EXPONENT)
    }
}

impl AggregateUpdater {
    pub fn new(pythagorean_exponent: f64) -> Self {
        Self {
            pythagorean_exponent,
        }
    }

    /// Add (`Increase`) or remove (`Decrease`) one game's effect on both
    /// teams' season rows.
    ///
    /// The game's winner/loser fields must already be resolved.
    pub fn apply<S>(
        &self,
        store: &mut S,
        game: &Game,
        direction: Direction,
    ) -> Result<(), AggregateError>
    where
        S: SeasonStore + ?Sized,
    {
        let (guest_result, host_result) = side_results(game)?;

        let mut guest = find_row(&*store, &game.guest_name, game.season_id)?;
        let mut host = find_row(&*store, &game.host_name, game.season_id)?;

        self.apply_side(
            &mut guest,
            game.guest_score,
            game.host_score,
            guest_result,
            direction,
        )?;
        self.apply_side(
            &mut host,
            game.host_score,
            game.guest_score,
            host_result,
            direction,
        )?;

        store.put_team_season(guest);
        store.put_team_season(host);
        Ok(())
    }

    /// Swap one version of a game for another: decrease `old`, then
    /// increase `new`.
    ///
    /// When the increase fails the old version is re-applied, so the store
    /// ends up as it was before the call.
    pub fn replace<S>(&self, store: &mut S, old: &Game, new: &Game) -> Result<(), AggregateError>
    where
        S: SeasonStore + ?Sized,
    {
        self.apply(store, old, Direction::Decrease)?;

        if let Err(err) = self.apply(store, new, Direction::Increase) {
            self.apply(store, old, Direction::Increase)?;
            return Err(err);
        }

        Ok(())
    }

    fn apply_side(
        &self,
        row: &mut TeamSeason,
        own_score: u32,
        opponent_score: u32,
        result: SideResult,
        direction: Direction,
    ) -> Result<(), AggregateError> {
        row.games = adjust(row, "games", row.games, 1, direction)?;

        match result {
            SideResult::Win => row.wins = adjust(row, "wins", row.wins, 1, direction)?,
            SideResult::Loss => row.losses = adjust(row, "losses", row.losses, 1, direction)?,
            SideResult::Tie => row.ties = adjust(row, "ties", row.ties, 1, direction)?,
        }

        row.winning_percentage = winning_percentage(row.wins, row.losses, row.ties, row.games);

        row.points_for = adjust(row, "points_for", row.points_for, own_score, direction)?;
        row.points_against = adjust(
            row,
            "points_against",
            row.points_against,
            opponent_score,
            direction,
        )?;

        let pct = pythagorean_winning_percentage_with_exponent(
            row.points_for,
            row.points_against,
            self.pythagorean_exponent,
        );
        (row.pythagorean_wins, row.pythagorean_losses) = pythagorean_record(pct, row.games);

        Ok(())
    }
}

fn find_row<S>(store: &S, team: &str, season_id: SeasonId) -> Result<TeamSeason, AggregateError>
where
    S: SeasonStore + ?Sized,
{
    store
        .find_team_season(team, season_id)
        .ok_or_else(|| AggregateError::TeamSeasonNotFound {
            team: team.to_string(),
            season_id,
        })
}

fn adjust(
    row: &TeamSeason,
    field: &'static str,
    value: u32,
    amount: u32,
    direction: Direction,
) -> Result<u32, AggregateError> {
    direction
        .step(value, amount)
        .ok_or_else(|| AggregateError::CounterUnderflow {
            team: row.team_name.clone(),
            season_id: row.season_id,
            field,
        })
}

/// Read each side's result from the game's resolved winner/loser fields.
fn side_results(game: &Game) -> Result<(SideResult, SideResult), AggregateError> {
    let invalid = |reason: &str| AggregateError::InvalidGame {
        id: game.id.clone(),
        reason: reason.to_string(),
    };

    if game.guest_name == game.host_name {
        return Err(invalid("a team cannot play itself"));
    }

    match (game.winner_name.as_deref(), game.loser_name.as_deref()) {
        (None, None) => Ok((SideResult::Tie, SideResult::Tie)),
        (Some(w), Some(l)) if w == game.guest_name && l == game.host_name => {
            Ok((SideResult::Win, SideResult::Loss))
        }
        (Some(w), Some(l)) if w == game.host_name && l == game.guest_name => {
            Ok((SideResult::Loss, SideResult::Win))
        }
        _ => Err(invalid("winner and loser do not match the participants")),
    }
}
