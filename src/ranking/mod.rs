//! Schedule-adjusted power ratings.
//!
//! Runs as a batch over one season once every game's aggregate effect has
//! been applied:
//! 1. League pass: average points per team-game for each league
//! 2. Team pass: offensive/defensive averages, factors against the
//!    strength of the opponents faced, blended indices and the final
//!    Pythagorean percentage
//!
//! The team pass only writes derived fields, so the raw aggregates every
//! schedule profile is built from stay fixed for the whole run.

use thiserror::Error;

use crate::calculate::{
    add, divide, multiply, pythagorean_winning_percentage_with_exponent,
    DEFAULT_PYTHAGOREAN_EXPONENT,
};
use crate::models::{LeagueSeason, ScheduleProfile, SeasonId, TeamSeason};
use crate::storage::{ScheduleProfileProvider, SeasonStore, StorageError};

/// Errors that can occur during a ranking run.
#[derive(Debug, Error)]
pub enum RankingError {
    /// A team row vanished mid-run. Teams already updated keep their new
    /// values; re-running once the row exists completes the season.
    #[error("Ranking for {season_id} aborted at {team} after {updated} teams: season record missing")]
    Aborted {
        season_id: SeasonId,
        team: String,
        updated: usize,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Summary of a completed ranking run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingReport {
    pub season_id: SeasonId,
    pub leagues_updated: usize,
    pub teams_ranked: Vec<String>,

    /// Teams with no opponents on record; their derived fields are cleared
    pub teams_skipped: Vec<String>,
}

/// Computes derived rating fields for a whole season.
#[derive(Debug, Clone, Copy)]
pub struct RankingEngine {
    pythagorean_exponent: f64,
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_PYTHAGOREAN_EXPONENT)
    }
}

impl RankingEngine {
    pub fn new(pythagorean_exponent: f64) -> Self {
        Self {
            pythagorean_exponent,
        }
    }

    /// Recompute league averages and every team's rating for `season_id`,
    /// then commit with `save_all`.
    pub fn update_rankings<S>(
        &self,
        store: &mut S,
        season_id: SeasonId,
    ) -> Result<RankingReport, RankingError>
    where
        S: SeasonStore + ScheduleProfileProvider + ?Sized,
    {
        let mut report = RankingReport {
            season_id,
            ..RankingReport::default()
        };

        for league_name in store.league_seasons_in(season_id) {
            let Some(mut league) = store.find_league_season(&league_name, season_id) else {
                continue;
            };
            let totals = store
                .league_totals(&league_name, season_id)
                .unwrap_or_default();
            league.total_games = totals.total_games;
            league.total_points = totals.total_points;
            league.average_points =
                divide(f64::from(totals.total_points), f64::from(totals.total_games));
            store.put_league_season(league);
            report.leagues_updated += 1;
        }

        for team_name in store.team_seasons_in(season_id) {
            let Some(mut row) = store.find_team_season(&team_name, season_id) else {
                return Err(RankingError::Aborted {
                    season_id,
                    team: team_name,
                    updated: report.teams_ranked.len(),
                });
            };

            let profile = store.schedule_profile(&team_name, season_id);
            let league = store.find_league_season(&row.league_name, season_id);

            if self.rate_team(&mut row, profile.as_ref(), league.as_ref()) {
                report.teams_ranked.push(team_name);
            } else {
                report.teams_skipped.push(team_name);
            }
            store.put_team_season(row);
        }

        store.save_all()?;
        Ok(report)
    }

    /// Fill in one team's derived fields. Returns `false`, with the fields
    /// cleared, when the team has no usable schedule.
    pub fn rate_team(
        &self,
        row: &mut TeamSeason,
        profile: Option<&ScheduleProfile>,
        league: Option<&LeagueSeason>,
    ) -> bool {
        row.clear_rankings();

        let Some(profile) = profile.filter(|p| p.totals.games > 0) else {
            return false;
        };
        let Some(schedule) = profile.averages.as_ref() else {
            return false;
        };

        let games = f64::from(row.games);
        let offensive_average = divide(f64::from(row.points_for), games);
        let defensive_average = divide(f64::from(row.points_against), games);

        row.offensive_average = offensive_average;
        row.defensive_average = defensive_average;
        row.offensive_factor = offensive_average.and_then(|avg| divide(avg, schedule.points_against));
        row.defensive_factor = defensive_average.and_then(|avg| divide(avg, schedule.points_for));

        if let Some(league_average) = league.and_then(|l| l.average_points) {
            row.offensive_index = blend(offensive_average, row.offensive_factor, league_average);
            row.defensive_index = blend(defensive_average, row.defensive_factor, league_average);
        }

        row.final_pythagorean_winning_percentage = pythagorean_winning_percentage_with_exponent(
            row.points_for,
            row.points_against,
            self.pythagorean_exponent,
        );

        true
    }
}

/// `(average + factor * league_average) / 2`
fn blend(average: Option<f64>, factor: Option<f64>, league_average: f64) -> Option<f64> {
    let (average, factor) = average.zip(factor)?;
    divide(add(average, multiply(factor, league_average)), 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{AggregateUpdater, Direction};
    use crate::models::{Game, OpponentRecord};
    use crate::storage::Repository;

    fn close(a: Option<f64>, b: f64) -> bool {
        a.map_or(false, |a| (a - b).abs() < 1e-9)
    }

    fn season_repo(games: &[(&str, u32, &str, u32)]) -> Repository {
        let mut repo = Repository::in_memory();
        repo.put_league_season(LeagueSeason::new("APFA".into(), 1920));
        for team in ["Akron", "Canton", "Dayton", "Hammond"] {
            repo.put_team_season(TeamSeason::new(team.into(), 1920, "APFA".into()));
        }

        let updater = AggregateUpdater::default();
        for (week, (guest, gs, host, hs)) in games.iter().enumerate() {
            let game = Game::new(1920, week as u32 + 1, guest.to_string(), *gs, host.to_string(), *hs);
            updater.apply(&mut repo, &game, Direction::Increase).unwrap();
            repo.insert_game(game);
        }
        repo
    }

    #[test]
    fn test_league_pass_sets_average_points() {
        let mut repo = season_repo(&[("Akron", 20, "Canton", 10), ("Dayton", 7, "Akron", 3)]);

        let report = RankingEngine::default()
            .update_rankings(&mut repo, 1920)
            .unwrap();
        assert_eq!(report.leagues_updated, 1);

        let league = repo.find_league_season("APFA", 1920).unwrap();
        assert_eq!(league.total_games, 4);
        assert_eq!(league.total_points, 40);
        assert_eq!(league.average_points, Some(10.0));
    }

    #[test]
    fn test_team_pass_factors_and_indices() {
        // Akron beats Canton 20-10, loses to Dayton 3-7.
        let mut repo = season_repo(&[("Akron", 20, "Canton", 10), ("Dayton", 7, "Akron", 3)]);
        RankingEngine::default()
            .update_rankings(&mut repo, 1920)
            .unwrap();

        let akron = repo.find_team_season("Akron", 1920).unwrap();
        // Opponents: Canton (1 game, 10 for, 20 against), Dayton (1, 7, 3).
        let sched_pf = 17.0 / 2.0;
        let sched_pa = 23.0 / 2.0;
        let off_avg = 23.0 / 2.0;
        let def_avg = 17.0 / 2.0;

        assert!(close(akron.offensive_average, off_avg));
        assert!(close(akron.defensive_average, def_avg));
        assert!(close(akron.offensive_factor, off_avg / sched_pa));
        assert!(close(akron.defensive_factor, def_avg / sched_pf));
        assert!(close(
            akron.offensive_index,
            (off_avg + (off_avg / sched_pa) * 10.0) / 2.0
        ));
        assert!(close(
            akron.defensive_index,
            (def_avg + (def_avg / sched_pf) * 10.0) / 2.0
        ));

        let expected = pythagorean_winning_percentage_with_exponent(23, 17, 2.37).unwrap();
        assert!(close(akron.final_pythagorean_winning_percentage, expected));
    }

    #[test]
    fn test_team_without_games_is_skipped() {
        let mut repo = season_repo(&[("Akron", 20, "Canton", 10)]);
        let report = RankingEngine::default()
            .update_rankings(&mut repo, 1920)
            .unwrap();

        assert_eq!(report.teams_ranked, vec!["Akron".to_string(), "Canton".to_string()]);
        assert_eq!(
            report.teams_skipped,
            vec!["Dayton".to_string(), "Hammond".to_string()]
        );
        let dayton = repo.find_team_season("Dayton", 1920).unwrap();
        assert_eq!(dayton.offensive_factor, None);
        assert_eq!(dayton.final_pythagorean_winning_percentage, None);
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let mut repo = season_repo(&[("Akron", 20, "Canton", 10), ("Dayton", 7, "Akron", 3)]);
        let engine = RankingEngine::default();

        engine.update_rankings(&mut repo, 1920).unwrap();
        let first: Vec<TeamSeason> = repo.team_season_rows(1920).into_iter().cloned().collect();
        engine.update_rankings(&mut repo, 1920).unwrap();
        let second: Vec<TeamSeason> = repo.team_season_rows(1920).into_iter().cloned().collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_league_row_leaves_indices_unset() {
        let mut repo = Repository::in_memory();
        for team in ["Akron", "Canton"] {
            repo.put_team_season(TeamSeason::new(team.into(), 1920, "APFA".into()));
        }
        let game = Game::new(1920, 1, "Akron".into(), 14, "Canton".into(), 7);
        AggregateUpdater::default()
            .apply(&mut repo, &game, Direction::Increase)
            .unwrap();
        repo.insert_game(game);

        RankingEngine::default()
            .update_rankings(&mut repo, 1920)
            .unwrap();

        let akron = repo.find_team_season("Akron", 1920).unwrap();
        assert!(akron.offensive_factor.is_some());
        assert_eq!(akron.offensive_index, None);
        assert_eq!(akron.defensive_index, None);
    }

    #[test]
    fn test_rate_team_with_scoreless_schedule() {
        let engine = RankingEngine::default();
        let mut row = TeamSeason::new("Akron".into(), 1920, "APFA".into());
        row.games = 1;
        row.ties = 1;

        let profile = ScheduleProfile::from_opponents(
            "Akron".into(),
            1920,
            vec![OpponentRecord {
                opponent_name: "Canton".into(),
                games: 1,
                points_for: 0,
                points_against: 0,
            }],
        );

        assert!(engine.rate_team(&mut row, Some(&profile), None));
        assert_eq!(row.offensive_average, Some(0.0));
        assert_eq!(row.offensive_factor, None);
        assert_eq!(row.final_pythagorean_winning_percentage, None);
    }

    #[test]
    fn test_rate_team_without_profile() {
        let engine = RankingEngine::default();
        let mut row = TeamSeason::new("Akron".into(), 1920, "APFA".into());
        row.offensive_factor = Some(2.0);

        assert!(!engine.rate_team(&mut row, None, None));
        assert_eq!(row.offensive_factor, None);
    }

    /// Store whose team listing names a row that does not exist.
    struct GhostStore {
        inner: Repository,
    }

    impl SeasonStore for GhostStore {
        fn find_team_season(&self, team: &str, season: SeasonId) -> Option<TeamSeason> {
            self.inner.find_team_season(team, season)
        }
        fn find_league_season(&self, league: &str, season: SeasonId) -> Option<LeagueSeason> {
            self.inner.find_league_season(league, season)
        }
        fn put_team_season(&mut self, row: TeamSeason) {
            self.inner.put_team_season(row)
        }
        fn put_league_season(&mut self, row: LeagueSeason) {
            self.inner.put_league_season(row)
        }
        fn team_seasons_in(&self, season: SeasonId) -> Vec<String> {
            let mut names = self.inner.team_seasons_in(season);
            names.insert(1, "Ghost".to_string());
            names
        }
        fn league_seasons_in(&self, season: SeasonId) -> Vec<String> {
            self.inner.league_seasons_in(season)
        }
        fn save_all(&mut self) -> Result<(), StorageError> {
            self.inner.save_all()
        }
    }

    impl ScheduleProfileProvider for GhostStore {
        fn schedule_profile(&self, team: &str, season: SeasonId) -> Option<ScheduleProfile> {
            self.inner.schedule_profile(team, season)
        }
        fn league_totals(
            &self,
            league: &str,
            season: SeasonId,
        ) -> Option<crate::models::LeagueTotals> {
            self.inner.league_totals(league, season)
        }
    }

    #[test]
    fn test_missing_row_aborts_but_keeps_earlier_teams() {
        let mut store = GhostStore {
            inner: season_repo(&[("Akron", 20, "Canton", 10)]),
        };

        let err = RankingEngine::default()
            .update_rankings(&mut store, 1920)
            .unwrap_err();

        match err {
            RankingError::Aborted { team, updated, .. } => {
                assert_eq!(team, "Ghost");
                assert_eq!(updated, 1);
            }
            other => panic!("unexpected error: {other}"),
        }

        let akron = store.inner.find_team_season("Akron", 1920).unwrap();
        assert!(akron.final_pythagorean_winning_percentage.is_some());
        let canton = store.inner.find_team_season("Canton", 1920).unwrap();
        assert_eq!(canton.final_pythagorean_winning_percentage, None);
    }
}
