use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gridiron::config::AppConfig;
use gridiron::ledger::{Ledger, StandingsOrder};
use gridiron::models::{Game, GameId, Season, SeasonId};
use gridiron::storage::{Repository, ScheduleProfileProvider, StorageConfig};

#[derive(Parser)]
#[command(name = "gridiron")]
#[command(about = "American-football season tracker with schedule-adjusted power ratings")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage seasons
    Season {
        #[command(subcommand)]
        action: SeasonAction,
    },

    /// Register a team for a season
    Team {
        #[command(subcommand)]
        action: TeamAction,
    },

    /// Record, correct or remove game results
    Game {
        #[command(subcommand)]
        action: GameAction,
    },

    /// Compute power ratings for a season
    Rank {
        #[arg(long)]
        season: SeasonId,
    },

    /// Recompute a season's aggregates from its games, then rank
    Rebuild {
        #[arg(long)]
        season: SeasonId,
    },

    /// Show standings for a season
    Standings {
        #[arg(long)]
        season: SeasonId,

        /// Sort by "power" (Pythagorean rating) or "record"
        #[arg(long, default_value = "power")]
        order: String,
    },

    /// Show the opponents a team faced and their combined strength
    Schedule {
        #[arg(long)]
        season: SeasonId,

        #[arg(long)]
        team: String,
    },
}

#[derive(Subcommand)]
enum SeasonAction {
    /// Add a season
    Add {
        /// Season year
        id: SeasonId,

        /// Regular-season weeks scheduled
        #[arg(long)]
        weeks: Option<u32>,
    },

    /// List seasons
    List,
}

#[derive(Subcommand)]
enum TeamAction {
    /// Add a team to a season
    Add {
        #[arg(long)]
        season: SeasonId,

        #[arg(long)]
        name: String,

        #[arg(long)]
        league: String,

        #[arg(long)]
        conference: Option<String>,

        #[arg(long)]
        division: Option<String>,
    },
}

#[derive(Subcommand)]
enum GameAction {
    /// Record a new game
    Add(GameArgs),

    /// Replace a recorded game
    Edit {
        /// Id of the game to replace
        id: String,

        #[command(flatten)]
        game: GameArgs,
    },

    /// Delete a game
    Delete { id: String },

    /// List games
    List {
        #[arg(long)]
        season: SeasonId,

        #[arg(long)]
        week: Option<u32>,

        /// Only games this team played in
        #[arg(long)]
        team: Option<String>,
    },
}

#[derive(Args)]
struct GameArgs {
    #[arg(long)]
    season: SeasonId,

    #[arg(long)]
    week: u32,

    #[arg(long)]
    guest: String,

    #[arg(long)]
    guest_score: u32,

    #[arg(long)]
    host: String,

    #[arg(long)]
    host_score: u32,

    /// Mark as a playoff game
    #[arg(long)]
    playoff: bool,

    #[arg(long)]
    notes: Option<String>,
}

impl GameArgs {
    fn into_game(self) -> Game {
        let game = Game::new(
            self.season,
            self.week,
            self.guest,
            self.guest_score,
            self.host,
            self.host_score,
        )
        .with_playoff(self.playoff);

        match self.notes {
            Some(notes) => game.with_notes(notes),
            None => game,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::debug!("Starting gridiron v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageConfig::new(config.data_dir.clone());
    let repo = Repository::open(storage)
        .with_context(|| format!("Failed to open data directory {:?}", config.data_dir))?;
    let mut ledger = Ledger::new(repo, &config.ratings);

    match cli.command {
        Commands::Season { action } => match action {
            SeasonAction::Add { id, weeks } => {
                let season = match weeks {
                    Some(weeks) => Season::new(id).with_weeks_scheduled(weeks),
                    None => Season::new(id),
                };
                ledger.register_season(season)?;
                println!("Added season {}", id);
            }
            SeasonAction::List => {
                for season in ledger.repository().seasons() {
                    match season.weeks_scheduled {
                        Some(weeks) => println!("{} ({} weeks)", season.id, weeks),
                        None => println!("{}", season.id),
                    }
                }
            }
        },

        Commands::Team { action } => match action {
            TeamAction::Add {
                season,
                name,
                league,
                conference,
                division,
            } => {
                ledger.register_team_season(&name, season, &league, conference, division)?;
                println!("Registered {} for {} in {}", name, season, league);
            }
        },

        Commands::Game { action } => match action {
            GameAction::Add(args) => {
                let game = ledger.add_game(args.into_game())?;
                println!("Added {}  [{}]", game, game.id);
            }
            GameAction::Edit { id, game } => {
                let game = ledger.edit_game(&GameId::from(id), game.into_game())?;
                println!("Updated {}  [{}]", game, game.id);
            }
            GameAction::Delete { id } => {
                let game = ledger.delete_game(&GameId::from(id))?;
                println!("Deleted {}", game);
            }
            GameAction::List { season, week, team } => {
                for game in ledger
                    .repository()
                    .games_in(season)
                    .into_iter()
                    .filter(|g| week.map_or(true, |w| g.week == w))
                    .filter(|g| team.as_deref().map_or(true, |t| g.involves(t)))
                {
                    let flag = if game.is_playoff { " (playoff)" } else { "" };
                    println!("{}  {}{}", game.id, game, flag);
                }
            }
        },

        Commands::Rank { season } => {
            let report = ledger.update_rankings(season)?;
            println!(
                "Ranked {} teams, skipped {}",
                report.teams_ranked.len(),
                report.teams_skipped.len()
            );
        }

        Commands::Rebuild { season } => {
            let report = ledger.rebuild_season(season)?;
            println!(
                "Rebuilt {}: ranked {} teams, skipped {}",
                season,
                report.teams_ranked.len(),
                report.teams_skipped.len()
            );
        }

        Commands::Standings { season, order } => {
            let order: StandingsOrder = order.parse()?;
            println!(
                "{:<4} {:<28} {:>3} {:>3} {:>3} {:>3} {:>6} {:>5} {:>5} {:>7} {:>7} {:>6}",
                "#", "Team", "G", "W", "L", "T", "Pct", "PF", "PA", "OffIdx", "DefIdx", "Pyth"
            );
            for (rank, row) in ledger.standings(season, order).iter().enumerate() {
                println!(
                    "{:<4} {:<28} {:>3} {:>3} {:>3} {:>3} {:>6} {:>5} {:>5} {:>7} {:>7} {:>6}",
                    rank + 1,
                    row.team_name,
                    row.games,
                    row.wins,
                    row.losses,
                    row.ties,
                    fmt_pct(row.winning_percentage),
                    row.points_for,
                    row.points_against,
                    fmt_num(row.offensive_index),
                    fmt_num(row.defensive_index),
                    fmt_pct(row.final_pythagorean_winning_percentage),
                );
            }
        }

        Commands::Schedule { season, team } => {
            let Some(profile) = ledger.repository().schedule_profile(&team, season) else {
                eprintln!("{} has no record in {}", team, season);
                return Ok(());
            };
            for opponent in &profile.opponents {
                println!(
                    "{:<28} G {:>3}  PF {:>5}  PA {:>5}",
                    opponent.opponent_name,
                    opponent.games,
                    opponent.points_for,
                    opponent.points_against
                );
            }
            println!(
                "Totals: G {}  PF {}  PA {}",
                profile.totals.games, profile.totals.points_for, profile.totals.points_against
            );
            if let Some(avg) = profile.averages {
                println!(
                    "Per game: PF {:.2}  PA {:.2}",
                    avg.points_for, avg.points_against
                );
            }
        }
    }

    Ok(())
}

fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.3}", v))
}

fn fmt_num(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}
