//! JSONL (JSON Lines) storage.
//!
//! JSONL is the source of truth for all season data.
//! Each line is a valid JSON object representing one entity.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::{StorageConfig, StorageError};
use crate::models::SeasonId;

/// Entity types for JSONL storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Season,
    Team,
    League,
    Game,
    TeamSeason,
    LeagueSeason,
}

impl EntityType {
    /// Get the filename for this entity type.
    pub fn filename(&self) -> &'static str {
        match self {
            EntityType::Season => "seasons.jsonl",
            EntityType::Team => "teams.jsonl",
            EntityType::League => "leagues.jsonl",
            EntityType::Game => "games.jsonl",
            EntityType::TeamSeason => "team_seasons.jsonl",
            EntityType::LeagueSeason => "league_seasons.jsonl",
        }
    }

    /// Whether files of this type live under a season directory.
    pub fn is_seasonal(&self) -> bool {
        matches!(
            self,
            EntityType::Game | EntityType::TeamSeason | EntityType::LeagueSeason
        )
    }
}

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    /// Create a new JSONL writer for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a writer for an entity type, scoped to a season when seasonal.
    pub fn for_entity(config: &StorageConfig, entity: EntityType, season_id: SeasonId) -> Self {
        Self::new(entity_path(config, entity, season_id))
    }

    /// Ensure the parent directory exists.
    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Write entities, replacing the entire file.
    pub fn write_all<'a, I>(&self, entities: I) -> Result<usize, StorageError>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        self.ensure_dir()?;

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        let mut count = 0;

        for entity in entities {
            let json = serde_json::to_string(entity)?;
            writeln!(writer, "{}", json)?;
            count += 1;
        }

        writer.flush()?;
        debug!("Wrote {} entities to {:?}", count, self.path);

        Ok(count)
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    /// Create a new JSONL reader for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a reader for an entity type, scoped to a season when seasonal.
    pub fn for_entity(config: &StorageConfig, entity: EntityType, season_id: SeasonId) -> Self {
        Self::new(entity_path(config, entity, season_id))
    }

    /// Read all entities from the file.
    ///
    /// A missing file reads as empty; unparseable lines are skipped.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entities = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    warn!(
                        "Failed to parse line {} in {:?}: {}",
                        idx + 1,
                        self.path,
                        e
                    );
                }
            }
        }

        debug!("Read {} entities from {:?}", entities.len(), self.path);
        Ok(entities)
    }
}

/// Find all season directories.
pub fn list_seasons(config: &StorageConfig) -> Result<Vec<SeasonId>, StorageError> {
    let dir = config.seasons_dir();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut seasons = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        match name.to_str().and_then(|s| s.parse::<SeasonId>().ok()) {
            Some(season_id) => seasons.push(season_id),
            None => warn!("Ignoring non-season directory {:?} in {:?}", name, dir),
        }
    }

    seasons.sort_unstable();
    Ok(seasons)
}

/// Get the path for an entity file.
///
/// `season_id` is ignored for reference entities.
pub fn entity_path(config: &StorageConfig, entity: EntityType, season_id: SeasonId) -> PathBuf {
    if entity.is_seasonal() {
        config.season_dir(season_id).join(entity.filename())
    } else {
        config.reference_dir().join(entity.filename())
    }
}
