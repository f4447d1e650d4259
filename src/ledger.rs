//! Season ledger.
//!
//! Use cases built on the aggregate updater and ranking engine:
//! registering seasons and teams, recording, editing and deleting games,
//! rebuilding a season from its games, and reading standings. Every
//! mutating call commits the repository before returning.

use std::cmp::Ordering;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::aggregate::{AggregateError, AggregateUpdater, Direction};
use crate::config::RatingsConfig;
use crate::models::{Game, GameId, League, LeagueSeason, Season, SeasonId, Team, TeamSeason};
use crate::ranking::{RankingEngine, RankingError, RankingReport};
use crate::storage::{Repository, SeasonStore, StorageError};

/// Errors that can occur in ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Aggregate error: {0}")]
    Aggregate(#[from] AggregateError),

    #[error("Ranking error: {0}")]
    Ranking(#[from] RankingError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Game not found: {0}")]
    GameNotFound(GameId),

    #[error("Game already recorded: {0}")]
    DuplicateGame(GameId),

    #[error("Unknown season: {0}")]
    UnknownSeason(SeasonId),

    #[error("League {league} was not active in {season_id}")]
    InactiveLeague { league: String, season_id: SeasonId },

    #[error("Unknown standings order: {0}")]
    UnknownOrder(String),
}

/// How standings are sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandingsOrder {
    /// Final Pythagorean winning percentage
    Power,
    /// Actual winning percentage
    Record,
}

impl FromStr for StandingsOrder {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "power" => Ok(StandingsOrder::Power),
            "record" => Ok(StandingsOrder::Record),
            other => Err(LedgerError::UnknownOrder(other.to_string())),
        }
    }
}

/// Owns the repository and routes every change through the engine.
pub struct Ledger {
    repo: Repository,
    updater: AggregateUpdater,
    engine: RankingEngine,
}

impl Ledger {
    pub fn new(repo: Repository, ratings: &RatingsConfig) -> Self {
        Self {
            repo,
            updater: AggregateUpdater::new(ratings.pythagorean_exponent),
            engine: RankingEngine::new(ratings.pythagorean_exponent),
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Record a season. Re-registering replaces its metadata.
    pub fn register_season(&mut self, season: Season) -> Result<(), LedgerError> {
        info!("Registering season {}", season.id);
        self.repo.insert_season(season);
        self.repo.save_all()?;
        Ok(())
    }

    /// Create a team's row for a season, along with the team, league and
    /// league-season records it depends on. An existing row is returned
    /// unchanged.
    pub fn register_team_season(
        &mut self,
        team_name: &str,
        season_id: SeasonId,
        league_name: &str,
        conference: Option<String>,
        division: Option<String>,
    ) -> Result<TeamSeason, LedgerError> {
        if self.repo.season(season_id).is_none() {
            return Err(LedgerError::UnknownSeason(season_id));
        }

        if let Some(existing) = self.repo.find_team_season(team_name, season_id) {
            debug!("{} already registered for {}", team_name, season_id);
            return Ok(existing);
        }

        match self.repo.league(league_name) {
            Some(league) if !league.active_in(season_id) => {
                return Err(LedgerError::InactiveLeague {
                    league: league_name.to_string(),
                    season_id,
                });
            }
            Some(_) => {}
            None => {
                info!("Creating league {}", league_name);
                self.repo
                    .insert_league(League::new(league_name.to_string(), season_id));
            }
        }

        if self.repo.team(team_name).is_none() {
            self.repo.insert_team(Team {
                name: team_name.to_string(),
            });
        }

        if self.repo.find_league_season(league_name, season_id).is_none() {
            self.repo
                .put_league_season(LeagueSeason::new(league_name.to_string(), season_id));
        }

        let mut row = TeamSeason::new(
            team_name.to_string(),
            season_id,
            league_name.to_string(),
        );
        if let Some(conference) = conference {
            row = row.with_conference(conference);
        }
        if let Some(division) = division {
            row = row.with_division(division);
        }
        self.repo.put_team_season(row.clone());
        self.repo.save_all()?;

        info!("Registered {} for {} in {}", team_name, season_id, league_name);
        Ok(row)
    }

    /// Record a new game and add its effect to both teams.
    pub fn add_game(&mut self, game: Game) -> Result<Game, LedgerError> {
        let game = game.resolve_outcome();

        if self.repo.game(&game.id).is_some() {
            return Err(LedgerError::DuplicateGame(game.id));
        }
        if self.repo.season(game.season_id).is_none() {
            return Err(LedgerError::UnknownSeason(game.season_id));
        }

        self.updater
            .apply(&mut self.repo, &game, Direction::Increase)
            .inspect_err(|e| error!("Failed to add {}: {}", game, e))?;

        self.repo.insert_game(game.clone());
        self.repo.save_all()?;

        info!("Added game {} ({})", game.id, game);
        Ok(game)
    }

    /// Replace a recorded game with a new version.
    ///
    /// The old version's effect is removed before the new version's is
    /// added. The new version keeps the original creation time.
    pub fn edit_game(&mut self, id: &GameId, replacement: Game) -> Result<Game, LedgerError> {
        let old = self
            .repo
            .game(id)
            .cloned()
            .ok_or_else(|| LedgerError::GameNotFound(id.clone()))?;

        let mut new = replacement.resolve_outcome();
        new.created_at = old.created_at;

        if new.id != old.id && self.repo.game(&new.id).is_some() {
            return Err(LedgerError::DuplicateGame(new.id));
        }
        if self.repo.season(new.season_id).is_none() {
            return Err(LedgerError::UnknownSeason(new.season_id));
        }

        self.updater
            .replace(&mut self.repo, &old, &new)
            .inspect_err(|e| error!("Failed to edit {}: {}", old.id, e))?;

        self.repo.remove_game(&old.id);
        self.repo.insert_game(new.clone());
        self.repo.save_all()?;

        info!("Edited game {} -> {} ({})", old.id, new.id, new);
        Ok(new)
    }

    /// Remove a game after reversing its effect.
    pub fn delete_game(&mut self, id: &GameId) -> Result<Game, LedgerError> {
        let game = self
            .repo
            .game(id)
            .cloned()
            .ok_or_else(|| LedgerError::GameNotFound(id.clone()))?;

        self.updater
            .apply(&mut self.repo, &game, Direction::Decrease)
            .inspect_err(|e| error!("Failed to delete {}: {}", game.id, e))?;

        self.repo.remove_game(&game.id);
        self.repo.save_all()?;

        info!("Deleted game {} ({})", game.id, game);
        Ok(game)
    }

    /// Run the ranking batch for a season.
    pub fn update_rankings(&mut self, season_id: SeasonId) -> Result<RankingReport, LedgerError> {
        let report = self
            .engine
            .update_rankings(&mut self.repo, season_id)
            .inspect_err(|e| error!("Ranking {} failed: {}", season_id, e))?;

        if !report.teams_skipped.is_empty() {
            warn!(
                "Season {}: no schedule for {}",
                season_id,
                report.teams_skipped.join(", ")
            );
        }
        info!(
            "Ranked {} teams in {} leagues for {}",
            report.teams_ranked.len(),
            report.leagues_updated,
            season_id
        );
        Ok(report)
    }

    /// Zero every team's aggregates for a season, replay all of its games
    /// in week order, then rank.
    ///
    /// If a game cannot be replayed the season's rows are restored to what
    /// they were before the call.
    pub fn rebuild_season(&mut self, season_id: SeasonId) -> Result<RankingReport, LedgerError> {
        info!("Rebuilding season {}", season_id);

        let snapshot: Vec<TeamSeason> = self
            .repo
            .team_season_rows(season_id)
            .into_iter()
            .cloned()
            .collect();

        for row in &snapshot {
            let mut row = row.clone();
            row.reset();
            self.repo.put_team_season(row);
        }

        if let Err(err) = self.replay_games(season_id) {
            for row in snapshot {
                self.repo.put_team_season(row);
            }
            return Err(err.into());
        }

        self.update_rankings(season_id)
    }

    fn replay_games(&mut self, season_id: SeasonId) -> Result<(), AggregateError> {
        let games: Vec<Game> = self
            .repo
            .games_in(season_id)
            .into_iter()
            .cloned()
            .collect();
        for game in &games {
            self.updater
                .apply(&mut self.repo, game, Direction::Increase)
                .inspect_err(|e| error!("Rebuild of {} stopped at {}: {}", season_id, game, e))?;
        }
        debug!("Replayed {} games for {}", games.len(), season_id);
        Ok(())
    }

    /// Team rows for a season, best first.
    pub fn standings(&self, season_id: SeasonId, order: StandingsOrder) -> Vec<&TeamSeason> {
        let mut rows = self.repo.team_season_rows(season_id);
        rows.sort_by(|a, b| {
            let primary = match order {
                StandingsOrder::Power => cmp_desc(
                    a.final_pythagorean_winning_percentage,
                    b.final_pythagorean_winning_percentage,
                ),
                StandingsOrder::Record => cmp_desc(a.winning_percentage, b.winning_percentage),
            };
            primary
                .then_with(|| b.wins.cmp(&a.wins))
                .then_with(|| a.team_name.cmp(&b.team_name))
        });
        rows
    }
}

/// Descending order with undefined values last.
fn cmp_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
