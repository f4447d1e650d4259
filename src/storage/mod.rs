//! Season data storage.
//!
//! Defines the two collaborator contracts the engine is written against and
//! the filesystem layout used by the JSONL-backed [`Repository`]:
//! - `reference/` holds seasons, teams and leagues
//! - `seasons/<year>/` holds games, team seasons and league seasons

mod jsonl;
mod repository;

pub use jsonl::*;
pub use repository::*;

use std::path::PathBuf;
use thiserror::Error;

use crate::models::{LeagueSeason, LeagueTotals, ScheduleProfile, SeasonId, TeamSeason};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn reference_dir(&self) -> PathBuf {
        self.data_dir.join("reference")
    }

    pub fn seasons_dir(&self) -> PathBuf {
        self.data_dir.join("seasons")
    }

    pub fn season_dir(&self, season_id: SeasonId) -> PathBuf {
        self.seasons_dir().join(season_id.to_string())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

/// Row access for season aggregates.
///
/// Lookups return owned copies; changes become visible only through
/// `put_*`, and durable only after `save_all`.
pub trait SeasonStore {
    fn find_team_season(&self, team_name: &str, season_id: SeasonId) -> Option<TeamSeason>;

    fn find_league_season(&self, league_name: &str, season_id: SeasonId) -> Option<LeagueSeason>;

    fn put_team_season(&mut self, row: TeamSeason);

    fn put_league_season(&mut self, row: LeagueSeason);

    /// Names of every team with a row in the season, in stable order.
    fn team_seasons_in(&self, season_id: SeasonId) -> Vec<String>;

    /// Names of every league with a row in the season, in stable order.
    fn league_seasons_in(&self, season_id: SeasonId) -> Vec<String>;

    fn save_all(&mut self) -> Result<(), StorageError>;
}

/// Opponent and league aggregates built from current season rows.
pub trait ScheduleProfileProvider {
    fn schedule_profile(&self, team_name: &str, season_id: SeasonId) -> Option<ScheduleProfile>;

    fn league_totals(&self, league_name: &str, season_id: SeasonId) -> Option<LeagueTotals>;
}
