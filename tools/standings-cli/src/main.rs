//! League Ledger standings CLI
//!
//! Loads a game log, division registry and playoff-odds table from JSON and
//! prints standings tables:
//! - season: one season's standings, optionally projected to season end
//! - all-time: every season combined
//! - week: the same week number across every season
//! - records: streak, score and margin leaderboards
//! - streak: a team's current streak

mod logging;
mod output;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use standings_engine::{
    EngineConfig, GameNormalizer, InMemoryGameLog, QueryScope, ScoreMode, SimulationProjector,
    SortDirection, SortKey, SortSpec, StandingsEngine, StandingsTable, StaticDivisionRegistry,
    StaticOddsTable, WeekCutoff,
};

#[derive(Parser)]
#[command(name = "standings")]
#[command(about = "Fantasy football standings, streaks and playoff races")]
#[command(version)]
struct Cli {
    /// TOML configuration file (defaults to STANDINGS_CONFIG or built-in defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Game log JSON file
    #[arg(short, long, global = true, default_value = "games.json")]
    games: PathBuf,

    /// Division registry JSON file
    #[arg(short, long, global = true)]
    divisions: Option<PathBuf>,

    /// Playoff odds JSON file
    #[arg(short, long, global = true)]
    odds: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone, Copy)]
struct TableArgs {
    /// Use bench scores instead of starter scores
    #[arg(long)]
    bench: bool,

    /// Column to sort by
    #[arg(long, value_enum, default_value_t = SortArg::WinPct)]
    sort: SortArg,

    /// Sort ascending instead of descending
    #[arg(long)]
    ascending: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Standings for one season
    Season {
        /// Season year (defaults to the latest season in the log)
        season: Option<u16>,

        /// Only count weeks up to and including this one
        #[arg(short, long)]
        week: Option<u8>,

        /// Project records to the end of the regular season
        #[arg(long)]
        project: bool,

        /// Use the Monte-Carlo simulator for projections
        #[arg(long, requires = "project")]
        simulate: bool,

        #[command(flatten)]
        table: TableArgs,
    },

    /// Standings across every season
    AllTime {
        #[command(flatten)]
        table: TableArgs,
    },

    /// Standings for one week number across every season
    Week {
        week: u8,

        #[command(flatten)]
        table: TableArgs,
    },

    /// League record book
    Records {
        /// Entries per leaderboard
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// A team's current streak
    Streak {
        team: String,

        /// As of this season
        #[arg(long)]
        season: Option<u16>,

        /// As of this week of the season
        #[arg(short, long, requires = "season")]
        week: Option<u8>,

        #[arg(long)]
        bench: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortArg {
    Team,
    Wins,
    Losses,
    WinPct,
    PlayoffPct,
    PointsFor,
    PointsAgainst,
    Differential,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Team => SortKey::TeamName,
            SortArg::Wins => SortKey::Wins,
            SortArg::Losses => SortKey::Losses,
            SortArg::WinPct => SortKey::WinPct,
            SortArg::PlayoffPct => SortKey::PlayoffPct,
            SortArg::PointsFor => SortKey::PointsFor,
            SortArg::PointsAgainst => SortKey::PointsAgainst,
            SortArg::Differential => SortKey::PointDifferential,
        }
    }
}

impl TableArgs {
    fn apply(self, scope: QueryScope) -> QueryScope {
        let direction =
            if self.ascending { SortDirection::Ascending } else { SortDirection::Descending };
        scope
            .with_score_mode(score_mode(self.bench))
            .with_sort(SortSpec::new(self.sort.into(), direction))
    }
}

fn score_mode(bench: bool) -> ScoreMode {
    if bench {
        ScoreMode::Bench
    } else {
        ScoreMode::Starters
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => EngineConfig::from_env().context("Failed to load configuration")?,
    };

    logging::initialize_logging(&config.logging)?;
    info!("Starting standings CLI v{}", env!("CARGO_PKG_VERSION"));

    let (games, stats) = InMemoryGameLog::from_json_file(&cli.games, &GameNormalizer::new())
        .with_context(|| format!("Failed to load game log from {}", cli.games.display()))?;
    info!(
        "Game log: {} accepted, {} dropped, {} unplayed",
        stats.accepted, stats.dropped, stats.unplayed
    );
    let games = Arc::new(games);

    let divisions = match &cli.divisions {
        Some(path) => StaticDivisionRegistry::from_json_file(path)
            .with_context(|| format!("Failed to load divisions from {}", path.display()))?,
        None => StaticDivisionRegistry::new(),
    };

    let odds = match &cli.odds {
        Some(path) => StaticOddsTable::from_json_file(path)
            .with_context(|| format!("Failed to load playoff odds from {}", path.display()))?,
        None => StaticOddsTable::new(),
    };

    let simulate = matches!(cli.command, Commands::Season { simulate: true, .. });
    let mut engine = StandingsEngine::new(config.clone(), games.clone(), Arc::new(divisions), Arc::new(odds));
    if simulate {
        engine = engine.with_projection_engine(Arc::new(SimulationProjector::new(games, &config)));
    }

    match cli.command {
        Commands::Season { season, week, project, table, .. } => {
            let season = match season {
                Some(season) => season,
                None => match engine.seasons()?.last() {
                    Some(season) => *season,
                    None => bail!("Game log {} has no seasons", cli.games.display()),
                },
            };
            let cutoff = week.map_or(WeekCutoff::All, WeekCutoff::Through);
            let scope = table.apply(QueryScope::season(season, cutoff)).with_projection(project);

            let standings = engine.query(&scope).await?;
            if project && !standings.rows().any(|row| row.is_projected()) {
                eprintln!("{}", "Projection unavailable, showing current standings".yellow());
            }
            show(&standings, cli.json)?;
        }
        Commands::AllTime { table } => {
            let standings = engine.standings(&table.apply(QueryScope::all_time()))?;
            show(&standings, cli.json)?;
        }
        Commands::Week { week, table } => {
            let standings = engine.standings(&table.apply(QueryScope::week_across_seasons(week)))?;
            show(&standings, cli.json)?;
        }
        Commands::Records { limit } => {
            let book = engine.record_book(limit)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&book)?);
            } else {
                output::print_record_book(&book);
            }
        }
        Commands::Streak { team, season, week, bench } => {
            let streak = engine.current_streak(&team, season, week, score_mode(bench))?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&streak)?);
            } else {
                output::print_streak(&team, streak);
            }
        }
    }

    Ok(())
}

fn show(table: &StandingsTable, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(table)?);
    } else {
        output::print_standings(table);
    }
    Ok(())
}
