//! The standings engine facade
//!
//! Every call rescans the game log for the requested [`QueryScope`]; nothing
//! is cached between calls.

use crate::aggregation::{GameFilter, RecordAggregator};
use crate::config::EngineConfig;
use crate::divisions::DivisionGrouper;
use crate::error::{Result, StandingsError};
use crate::magic::MagicCalculator;
use crate::overall::overall_records;
use crate::playoff_odds::apply_playoff_odds;
use crate::projection::{ProjectionAdapter, ProjectionEngine, ProjectionRequest};
use crate::records::RecordBook;
use crate::sorting::sort_and_rank;
use crate::store::{DivisionRegistry, GameLogStore, PlayoffOddsTable};
use crate::streaks::StreakCalculator;
use crate::types::{
    DivisionStandings, Game, LongestStreaks, QueryScope, ScopeView, ScoreMode, SeasonYear,
    StandingsRow, StandingsTable, Streak, TeamRecord, WeekCutoff, WeekNumber,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Computes standings tables from a game log, division registry and odds table
pub struct StandingsEngine {
    config: EngineConfig,
    games: Arc<dyn GameLogStore>,
    divisions: Arc<dyn DivisionRegistry>,
    odds: Arc<dyn PlayoffOddsTable>,
    projection: ProjectionAdapter,
}

impl StandingsEngine {
    /// Create an engine with no projection engine; projections use the
    /// linear fallback
    pub fn new(
        config: EngineConfig,
        games: Arc<dyn GameLogStore>,
        divisions: Arc<dyn DivisionRegistry>,
        odds: Arc<dyn PlayoffOddsTable>,
    ) -> Self {
        let projection = ProjectionAdapter::new(None, &config);

        tracing::info!(
            "Creating StandingsEngine with {} playoff format rules",
            config.playoff_formats.len()
        );

        Self { config, games, divisions, odds, projection }
    }

    /// Use `engine` for season-end projections
    pub fn with_projection_engine(mut self, engine: Arc<dyn ProjectionEngine>) -> Self {
        self.projection = ProjectionAdapter::new(Some(engine), &self.config);
        self
    }

    /// Seasons present in the game log, ascending
    pub fn seasons(&self) -> Result<Vec<SeasonYear>> {
        self.games.seasons().map_err(unavailable)
    }

    /// Standings for `scope`, honoring its projection flag.
    ///
    /// A projected query whose projection cannot be produced falls back to
    /// current standings. [`StandingsError::Superseded`] is returned as is so
    /// the caller can drop the stale result.
    pub async fn query(&self, scope: &QueryScope) -> Result<StandingsTable> {
        if !scope.projected {
            return self.standings(scope);
        }

        match self.projected_standings(scope).await {
            Err(StandingsError::ProjectionUnavailable(reason)) => {
                tracing::warn!("Projection unavailable ({}), showing current standings", reason);
                self.standings(scope)
            }
            result => result,
        }
    }

    /// Current standings for `scope`, whatever its projection flag
    pub fn standings(&self, scope: &QueryScope) -> Result<StandingsTable> {
        let games = self.load_games()?;
        let records = self.records(&games, scope);
        let rows = records.into_values().map(StandingsRow::from_record).collect();

        let table = self.finish(rows, scope, &games)?;
        tracing::debug!("Computed standings for {} teams in {:?}", table.team_count(), scope.view);
        Ok(table)
    }

    /// Season-end projected standings.
    ///
    /// Only season views can be projected. Fails with
    /// [`StandingsError::ProjectionUnavailable`] when neither the projection
    /// engine nor the linear fallback produce rows, and with
    /// [`StandingsError::Superseded`] when a newer projection started first.
    pub async fn projected_standings(&self, scope: &QueryScope) -> Result<StandingsTable> {
        let ScopeView::Season { season, .. } = scope.view else {
            return Err(StandingsError::projection_unavailable(
                "projections are only available for a single season",
            ));
        };

        let games = self.load_games()?;
        let records = self.records(&games, scope);

        let regular_season_weeks = self
            .config
            .playoff_format(season)
            .map(|format| format.regular_season_weeks)
            .unwrap_or(self.config.projection.default_regular_season_weeks);
        let current_week = self.current_week(&games, &scope.view);

        let request = ProjectionRequest {
            season,
            remaining_weeks: regular_season_weeks as i64 - current_week as i64,
        };

        let rows = self.projection.project(request, &records).await?;
        self.finish(rows, scope, &games)
    }

    /// One team's record for `scope`; a team without games gets an empty record
    pub fn team_record(&self, scope: &QueryScope, team: &str) -> Result<TeamRecord> {
        let games = self.load_games()?;
        let filter = self.filter(scope.score_mode);

        let mut records = BTreeMap::new();
        records.insert(
            team.to_string(),
            RecordAggregator::new(filter).aggregate_team(&games, &scope.view, team),
        );
        self.streaks(filter).apply(&mut records, &games, &scope.view);

        Ok(records.remove(team).unwrap_or_else(|| TeamRecord::new(team)))
    }

    /// Current streak as of a season and week; `None` for either means no cap
    pub fn current_streak(
        &self,
        team: &str,
        as_of_season: Option<SeasonYear>,
        as_of_week: Option<WeekNumber>,
        mode: ScoreMode,
    ) -> Result<Option<Streak>> {
        let games = self.load_games()?;
        Ok(self.streaks(self.filter(mode)).current_streak(&games, team, as_of_season, as_of_week))
    }

    /// Longest streaks over the team's full history
    pub fn longest_streaks(&self, team: &str) -> Result<LongestStreaks> {
        let games = self.load_games()?;
        Ok(self.streaks(self.filter(ScoreMode::Starters)).longest_streaks(&games, team))
    }

    /// League record book over the full history
    pub fn record_book(&self, limit: usize) -> Result<RecordBook> {
        let games = self.load_games()?;
        let filter = self.filter(ScoreMode::Starters);
        Ok(RecordBook::build(&games, filter, &self.streaks(filter), limit))
    }

    fn filter(&self, mode: ScoreMode) -> GameFilter<'_> {
        GameFilter::new(&self.config.standings.bye_team, mode)
    }

    fn streaks<'a>(&self, filter: GameFilter<'a>) -> StreakCalculator<'a> {
        StreakCalculator::new(
            filter,
            self.config.standings.high_score_threshold,
            self.config.standings.low_score_threshold,
        )
    }

    fn load_games(&self) -> Result<Vec<Game>> {
        self.games.games_for(None, None).map_err(unavailable)
    }

    /// Aggregated records with streaks for every team in the scope
    fn records(&self, games: &[Game], scope: &QueryScope) -> BTreeMap<String, TeamRecord> {
        let filter = self.filter(scope.score_mode);
        let mut records = RecordAggregator::new(filter).aggregate(games, &scope.view);
        self.streaks(filter).apply(&mut records, games, &scope.view);
        records
    }

    /// The week magic numbers and projections count from
    fn current_week(&self, games: &[Game], view: &ScopeView) -> WeekNumber {
        match view {
            ScopeView::Season { cutoff: WeekCutoff::Through(week), .. } => *week,
            ScopeView::Season { season, cutoff: WeekCutoff::All } => {
                let filter = self.filter(ScoreMode::Starters);
                games
                    .iter()
                    .filter(|game| game.season == *season && filter.line(game).is_some())
                    .map(|game| game.week)
                    .max()
                    .unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Group, sort, rank and annotate rows
    fn finish(
        &self,
        rows: Vec<StandingsRow>,
        scope: &QueryScope,
        games: &[Game],
    ) -> Result<StandingsTable> {
        let standings = &self.config.standings;

        let grouped = DivisionGrouper::new(self.divisions.as_ref(), &standings.unknown_division)
            .group(rows, &scope.view)?;

        let overall = if scope.view.is_all_time() {
            Some(overall_records(games, &scope.view, self.filter(scope.score_mode)))
        } else {
            None
        };

        let mut divisions: Vec<DivisionStandings> = grouped
            .into_iter()
            .map(|(name, mut rows)| {
                apply_playoff_odds(self.odds.as_ref(), rows.iter_mut(), &scope.view);
                if let Some(overall) = &overall {
                    for row in rows.iter_mut() {
                        row.overall_record = Some(overall.get(&row.team).copied().unwrap_or_default());
                    }
                }
                sort_and_rank(&mut rows, scope.sort, standings.win_pct_tolerance);
                DivisionStandings { name, rows }
            })
            .collect();

        if let ScopeView::Season { season, .. } = scope.view {
            let format = self.config.playoff_format(season);
            if format.is_none() {
                tracing::info!("No playoff format configured for {}", season);
            }
            MagicCalculator::new(format, self.current_week(games, &scope.view))
                .apply(&mut divisions, &scope.view);
        } else {
            MagicCalculator::new(None, 0).apply(&mut divisions, &scope.view);
        }

        Ok(StandingsTable { scope: *scope, divisions })
    }
}

fn unavailable(error: StandingsError) -> StandingsError {
    match error {
        StandingsError::DataUnavailable(_) => error,
        other => StandingsError::data_unavailable(other.to_string()),
    }
}
