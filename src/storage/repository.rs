//! In-memory working set of season data, optionally backed by JSONL files.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use super::{
    list_seasons, EntityType, JsonlReader, JsonlWriter, ScheduleProfileProvider, SeasonStore,
    StorageConfig, StorageError,
};
use crate::models::{
    Game, GameId, League, LeagueSeason, LeagueTotals, OpponentRecord, ScheduleProfile, Season,
    SeasonId, Team, TeamSeason,
};

type RowKey = (String, SeasonId);

/// All seasons, teams, games and aggregates known to the application.
///
/// Everything is loaded on [`Repository::open`] and rewritten by
/// [`SeasonStore::save_all`].
#[derive(Debug, Default)]
pub struct Repository {
    config: Option<StorageConfig>,
    seasons: BTreeMap<SeasonId, Season>,
    teams: BTreeMap<String, Team>,
    leagues: BTreeMap<String, League>,
    games: BTreeMap<GameId, Game>,
    team_seasons: BTreeMap<RowKey, TeamSeason>,
    league_seasons: BTreeMap<RowKey, LeagueSeason>,
}

impl Repository {
    /// A repository with no backing directory; `save_all` does nothing.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load every reference and season file under the data directory.
    pub fn open(config: StorageConfig) -> Result<Self, StorageError> {
        let mut repo = Self {
            config: Some(config.clone()),
            ..Self::default()
        };

        for season in JsonlReader::<Season>::for_entity(&config, EntityType::Season, 0).read_all()? {
            repo.seasons.insert(season.id, season);
        }
        for team in JsonlReader::<Team>::for_entity(&config, EntityType::Team, 0).read_all()? {
            repo.teams.insert(team.name.clone(), team);
        }
        for league in JsonlReader::<League>::for_entity(&config, EntityType::League, 0).read_all()? {
            repo.leagues.insert(league.name.clone(), league);
        }

        for season_id in list_seasons(&config)? {
            let games: Vec<Game> =
                JsonlReader::for_entity(&config, EntityType::Game, season_id).read_all()?;
            let team_seasons: Vec<TeamSeason> =
                JsonlReader::for_entity(&config, EntityType::TeamSeason, season_id).read_all()?;
            let league_seasons: Vec<LeagueSeason> =
                JsonlReader::for_entity(&config, EntityType::LeagueSeason, season_id)
                    .read_all()?;

            debug!(
                "Season {}: {} games, {} team seasons, {} league seasons",
                season_id,
                games.len(),
                team_seasons.len(),
                league_seasons.len()
            );

            for game in games {
                if game.season_id != season_id {
                    warn!(
                        "Game {} filed under season {} belongs to {}",
                        game.id, season_id, game.season_id
                    );
                }
                repo.games.insert(game.id.clone(), game);
            }
            for row in team_seasons {
                repo.team_seasons.insert(row.key(), row);
            }
            for row in league_seasons {
                repo.league_seasons.insert(row.key(), row);
            }
        }

        info!(
            "Loaded {} seasons, {} teams, {} games from {:?}",
            repo.seasons.len(),
            repo.teams.len(),
            repo.games.len(),
            config.data_dir
        );

        Ok(repo)
    }

    pub fn season(&self, season_id: SeasonId) -> Option<&Season> {
        self.seasons.get(&season_id)
    }

    pub fn seasons(&self) -> impl Iterator<Item = &Season> {
        self.seasons.values()
    }

    pub fn insert_season(&mut self, season: Season) {
        self.seasons.insert(season.id, season);
    }

    pub fn team(&self, name: &str) -> Option<&Team> {
        self.teams.get(name)
    }

    pub fn insert_team(&mut self, team: Team) {
        self.teams.insert(team.name.clone(), team);
    }

    pub fn league(&self, name: &str) -> Option<&League> {
        self.leagues.get(name)
    }

    pub fn insert_league(&mut self, league: League) {
        self.leagues.insert(league.name.clone(), league);
    }

    pub fn game(&self, id: &GameId) -> Option<&Game> {
        self.games.get(id)
    }

    /// Games of a season ordered by week, then id.
    pub fn games_in(&self, season_id: SeasonId) -> Vec<&Game> {
        let mut games: Vec<&Game> = self
            .games
            .values()
            .filter(|g| g.season_id == season_id)
            .collect();
        games.sort_by(|a, b| a.week.cmp(&b.week).then_with(|| a.id.cmp(&b.id)));
        games
    }

    pub fn insert_game(&mut self, game: Game) {
        self.games.insert(game.id.clone(), game);
    }

    pub fn remove_game(&mut self, id: &GameId) -> Option<Game> {
        self.games.remove(id)
    }

    /// Borrowed view of a season's team rows.
    pub fn team_season_rows(&self, season_id: SeasonId) -> Vec<&TeamSeason> {
        self.team_seasons
            .values()
            .filter(|row| row.season_id == season_id)
            .collect()
    }

    fn all_season_ids(&self) -> BTreeSet<SeasonId> {
        self.seasons
            .keys()
            .copied()
            .chain(self.games.values().map(|g| g.season_id))
            .chain(self.team_seasons.keys().map(|(_, s)| *s))
            .chain(self.league_seasons.keys().map(|(_, s)| *s))
            .collect()
    }
}

impl SeasonStore for Repository {
    fn find_team_season(&self, team_name: &str, season_id: SeasonId) -> Option<TeamSeason> {
        self.team_seasons
            .get(&(team_name.to_string(), season_id))
            .cloned()
    }

    fn find_league_season(&self, league_name: &str, season_id: SeasonId) -> Option<LeagueSeason> {
        self.league_seasons
            .get(&(league_name.to_string(), season_id))
            .cloned()
    }

    fn put_team_season(&mut self, row: TeamSeason) {
        self.team_seasons.insert(row.key(), row);
    }

    fn put_league_season(&mut self, row: LeagueSeason) {
        self.league_seasons.insert(row.key(), row);
    }

    fn team_seasons_in(&self, season_id: SeasonId) -> Vec<String> {
        self.team_seasons
            .keys()
            .filter(|(_, s)| *s == season_id)
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn league_seasons_in(&self, season_id: SeasonId) -> Vec<String> {
        self.league_seasons
            .keys()
            .filter(|(_, s)| *s == season_id)
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn save_all(&mut self) -> Result<(), StorageError> {
        let Some(config) = self.config.as_ref() else {
            return Ok(());
        };

        JsonlWriter::for_entity(config, EntityType::Season, 0).write_all(self.seasons.values())?;
        JsonlWriter::for_entity(config, EntityType::Team, 0).write_all(self.teams.values())?;
        JsonlWriter::for_entity(config, EntityType::League, 0).write_all(self.leagues.values())?;

        // Seasons that emptied out still need their files rewritten.
        let mut season_ids = self.all_season_ids();
        season_ids.extend(list_seasons(config)?);

        for season_id in season_ids {
            JsonlWriter::for_entity(config, EntityType::Game, season_id)
                .write_all(self.games.values().filter(|g| g.season_id == season_id))?;
            JsonlWriter::for_entity(config, EntityType::TeamSeason, season_id).write_all(
                self.team_seasons
                    .values()
                    .filter(|row| row.season_id == season_id),
            )?;
            JsonlWriter::for_entity(config, EntityType::LeagueSeason, season_id).write_all(
                self.league_seasons
                    .values()
                    .filter(|row| row.season_id == season_id),
            )?;
        }

        debug!("Saved repository to {:?}", config.data_dir);
        Ok(())
    }
}

impl ScheduleProfileProvider for Repository {
    /// One opponent entry per game played, carrying that opponent's full
    /// season record. Opponents without a season row are left out.
    fn schedule_profile(&self, team_name: &str, season_id: SeasonId) -> Option<ScheduleProfile> {
        self.team_seasons
            .get(&(team_name.to_string(), season_id))?;

        let opponents = self
            .games_in(season_id)
            .into_iter()
            .filter_map(|game| game.opponent_of(team_name))
            .filter_map(|opponent| {
                let row = self.team_seasons.get(&(opponent.to_string(), season_id));
                if row.is_none() {
                    warn!(
                        "No season row for opponent {} of {} in {}",
                        opponent, team_name, season_id
                    );
                }
                row
            })
            .map(|row| OpponentRecord {
                opponent_name: row.team_name.clone(),
                games: row.games,
                points_for: row.points_for,
                points_against: row.points_against,
            })
            .collect();

        Some(ScheduleProfile::from_opponents(
            team_name.to_string(),
            season_id,
            opponents,
        ))
    }

    fn league_totals(&self, league_name: &str, season_id: SeasonId) -> Option<LeagueTotals> {
        self.league_seasons
            .get(&(league_name.to_string(), season_id))?;

        Some(
            self.team_season_rows(season_id)
                .into_iter()
                .filter(|row| row.league_name == league_name)
                .fold(LeagueTotals::default(), |mut acc, row| {
                    acc.total_games += row.games;
                    acc.total_points += row.points_for;
                    acc
                }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn row(team: &str, games: u32, pf: u32, pa: u32) -> TeamSeason {
        let mut row = TeamSeason::new(team.to_string(), 1920, "APFA".to_string());
        row.games = games;
        row.wins = games;
        row.points_for = pf;
        row.points_against = pa;
        row
    }

    fn sample_repo() -> Repository {
        let mut repo = Repository::in_memory();
        repo.insert_season(Season::new(1920));
        repo.insert_league(League::new("APFA".into(), 1920));
        repo.put_league_season(LeagueSeason::new("APFA".into(), 1920));
        repo.put_team_season(row("Akron", 2, 27, 0));
        repo.put_team_season(row("Canton", 1, 7, 0));
        repo.put_team_season(row("Dayton", 1, 20, 10));
        repo.insert_game(Game::new(1920, 1, "Akron".into(), 20, "Canton".into(), 0));
        repo.insert_game(Game::new(1920, 2, "Dayton".into(), 7, "Akron".into(), 7));
        repo
    }

    #[test]
    fn test_find_and_put_team_season() {
        let mut repo = sample_repo();

        let mut akron = repo.find_team_season("Akron", 1920).unwrap();
        assert_eq!(akron.points_for, 27);
        assert!(repo.find_team_season("Akron", 1921).is_none());

        akron.points_for = 30;
        assert_eq!(repo.find_team_season("Akron", 1920).unwrap().points_for, 27);

        repo.put_team_season(akron);
        assert_eq!(repo.find_team_season("Akron", 1920).unwrap().points_for, 30);
    }

    #[test]
    fn test_rows_listed_per_season() {
        let mut repo = sample_repo();
        repo.put_team_season(TeamSeason::new("Akron".into(), 1921, "APFA".into()));

        assert_eq!(
            repo.team_seasons_in(1920),
            vec!["Akron".to_string(), "Canton".to_string(), "Dayton".to_string()]
        );
        assert_eq!(repo.team_seasons_in(1921), vec!["Akron".to_string()]);
        assert_eq!(repo.league_seasons_in(1920), vec!["APFA".to_string()]);
    }

    #[test]
    fn test_schedule_profile_counts_each_game() {
        let repo = sample_repo();
        let profile = repo.schedule_profile("Akron", 1920).unwrap();

        let names: Vec<_> = profile
            .opponents
            .iter()
            .map(|o| o.opponent_name.as_str())
            .collect();
        assert_eq!(names, vec!["Canton", "Dayton"]);
        assert_eq!(profile.totals.games, 2);
        assert_eq!(profile.totals.points_for, 27);
        assert_eq!(profile.totals.points_against, 10);
    }

    #[test]
    fn test_schedule_profile_unknown_team() {
        let repo = sample_repo();
        assert!(repo.schedule_profile("Rock Island", 1920).is_none());
    }

    #[test]
    fn test_league_totals() {
        let repo = sample_repo();
        let totals = repo.league_totals("APFA", 1920).unwrap();
        assert_eq!(totals.total_games, 4);
        assert_eq!(totals.total_points, 54);
        assert!(repo.league_totals("AFL", 1920).is_none());
    }

    #[test]
    fn test_games_in_orders_by_week() {
        let repo = sample_repo();
        let weeks: Vec<u32> = repo.games_in(1920).iter().map(|g| g.week).collect();
        assert_eq!(weeks, vec![1, 2]);
        assert!(repo.games_in(1921).is_empty());
    }

    #[test]
    fn test_in_memory_save_is_noop() {
        let mut repo = sample_repo();
        assert!(repo.save_all().is_ok());
    }

    #[test]
    fn test_save_and_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig::new(temp_dir.path().to_path_buf());

        let mut repo = Repository::open(config.clone()).unwrap();
        let source = sample_repo();
        for season in source.seasons() {
            repo.insert_season(season.clone());
        }
        repo.insert_team(Team {
            name: "Akron".into(),
        });
        repo.insert_league(League::new("APFA".into(), 1920));
        for game in source.games_in(1920) {
            repo.insert_game(game.clone());
        }
        for row in source.team_season_rows(1920) {
            repo.put_team_season(row.clone());
        }
        repo.put_league_season(LeagueSeason::new("APFA".into(), 1920));
        repo.save_all().unwrap();

        let reopened = Repository::open(config).unwrap();
        assert!(reopened.season(1920).is_some());
        assert!(reopened.team("Akron").is_some());
        assert!(reopened.league("APFA").is_some());
        assert_eq!(reopened.games_in(1920).len(), 2);
        assert_eq!(
            reopened.find_team_season("Dayton", 1920),
            repo.find_team_season("Dayton", 1920)
        );
        assert!(reopened.find_league_season("APFA", 1920).is_some());
    }

    #[test]
    fn test_removed_game_not_persisted() {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig::new(temp_dir.path().to_path_buf());

        let mut repo = Repository::open(config.clone()).unwrap();
        let game = Game::new(1920, 1, "Akron".into(), 20, "Canton".into(), 0);
        let id = game.id.clone();
        repo.insert_game(game);
        repo.save_all().unwrap();

        assert!(repo.remove_game(&id).is_some());
        repo.save_all().unwrap();

        let reopened = Repository::open(config).unwrap();
        assert!(reopened.game(&id).is_none());
    }
}
