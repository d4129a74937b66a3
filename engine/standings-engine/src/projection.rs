//! # Projection Adapter
//!
//! Season-end projections come from an external [`ProjectionEngine`] when one
//! is configured. If it fails, times out, is absent or returns nothing, the
//! adapter extrapolates each team's current pace linearly.
//!
//! Every request takes a generation number. A result that arrives after a
//! newer request was issued is discarded as [`StandingsError::Superseded`].

use crate::config::EngineConfig;
use crate::error::{Result, StandingsError};
use crate::sorting::projected_order;
use crate::types::{ProjectedLine, ProjectionSource, SeasonYear, StandingsRow, TeamRecord};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Season-end line for a team that has not played yet
const ZERO_GAME_WINS: f64 = 7.0;
const ZERO_GAME_LOSSES: f64 = 7.0;

/// Average season-end line for one team across all simulated trials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerTeamProjection {
    pub team: String,
    pub avg_wins: f64,
    pub avg_losses: f64,
    pub avg_points_for: f64,
    pub avg_points_against: f64,
}

/// External season simulator
#[async_trait]
pub trait ProjectionEngine: Send + Sync {
    async fn run_simulation(&self, season: SeasonYear, trials: u32) -> Result<Vec<PerTeamProjection>>;
}

/// What a projection request needs besides the season's current records
#[derive(Debug, Clone, Copy)]
pub struct ProjectionRequest {
    pub season: SeasonYear,
    /// Weeks left after the current week; negative once the season is over
    pub remaining_weeks: i64,
}

/// Runs projections with a linear fallback
pub struct ProjectionAdapter {
    engine: Option<Arc<dyn ProjectionEngine>>,
    trials: u32,
    timeout: Duration,
    generation: AtomicU64,
}

impl ProjectionAdapter {
    pub fn new(engine: Option<Arc<dyn ProjectionEngine>>, config: &EngineConfig) -> Self {
        Self {
            engine,
            trials: config.projection.trials,
            timeout: config.projection_timeout(),
            generation: AtomicU64::new(0),
        }
    }

    /// Latest generation handed out
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Start a new request, invalidating any in flight
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Fail if a newer request started after `generation`
    pub fn ensure_current(&self, generation: u64) -> Result<()> {
        if self.current_generation() == generation {
            Ok(())
        } else {
            Err(StandingsError::Superseded { generation })
        }
    }

    /// Projected rows for a season, ordered by projected wins, win
    /// percentage and point differential.
    ///
    /// `current` holds every team's record so far. Rows carry the current
    /// record alongside the projected line.
    pub async fn project(
        &self,
        request: ProjectionRequest,
        current: &BTreeMap<String, TeamRecord>,
    ) -> Result<Vec<StandingsRow>> {
        let generation = self.begin();

        let simulated = self.simulate(request.season).await;
        self.ensure_current(generation)?;

        let mut rows = match simulated {
            Some(projections) => from_simulation(projections, current, request),
            None => linear_fallback(current, request),
        };

        if rows.is_empty() {
            return Err(StandingsError::projection_unavailable(format!(
                "no teams to project for {}",
                request.season
            )));
        }

        rows.sort_by(projected_order);
        Ok(rows)
    }

    /// Non-empty simulation output, or `None` when the fallback should run
    async fn simulate(&self, season: SeasonYear) -> Option<Vec<PerTeamProjection>> {
        let Some(engine) = &self.engine else {
            debug!("No projection engine configured, using linear fallback");
            return None;
        };

        match tokio::time::timeout(self.timeout, engine.run_simulation(season, self.trials)).await {
            Ok(Ok(projections)) if !projections.is_empty() => {
                info!("Projection engine returned {} teams for {}", projections.len(), season);
                Some(projections)
            }
            Ok(Ok(_)) => {
                warn!("Projection engine returned no teams for {}, using linear fallback", season);
                None
            }
            Ok(Err(e)) => {
                warn!("Projection engine failed for {}: {}, using linear fallback", season, e);
                None
            }
            Err(_) => {
                warn!(
                    "Projection engine timed out after {:?} for {}, using linear fallback",
                    self.timeout, season
                );
                None
            }
        }
    }
}

/// Simulated rows for every team in `current`. Teams the engine left out are
/// extrapolated linearly; teams only the engine knows start from an empty record.
fn from_simulation(
    projections: Vec<PerTeamProjection>,
    current: &BTreeMap<String, TeamRecord>,
    request: ProjectionRequest,
) -> Vec<StandingsRow> {
    let mut simulated: BTreeMap<String, PerTeamProjection> = projections
        .into_iter()
        .map(|projection| (projection.team.clone(), projection))
        .collect();

    let mut rows: Vec<StandingsRow> = current
        .values()
        .map(|record| {
            let line = match simulated.remove(&record.team) {
                Some(projection) => simulated_line(&projection),
                None => {
                    debug!("No simulated line for {}, extrapolating", record.team);
                    linear_line(record, request)
                }
            };
            projected_row(record.clone(), line)
        })
        .collect();

    rows.extend(
        simulated
            .into_values()
            .map(|projection| projected_row(TeamRecord::new(projection.team.as_str()), simulated_line(&projection))),
    );
    rows
}

/// Extrapolate each team's pace over the remaining weeks.
///
/// A team with no games yet is projected to an even 7-7 split.
pub fn linear_fallback(
    current: &BTreeMap<String, TeamRecord>,
    request: ProjectionRequest,
) -> Vec<StandingsRow> {
    current
        .values()
        .map(|record| projected_row(record.clone(), linear_line(record, request)))
        .collect()
}

fn simulated_line(projection: &PerTeamProjection) -> ProjectedLine {
    ProjectedLine {
        wins: projection.avg_wins,
        losses: projection.avg_losses,
        points_for: projection.avg_points_for,
        points_against: projection.avg_points_against,
        source: ProjectionSource::Simulation,
    }
}

fn linear_line(record: &TeamRecord, request: ProjectionRequest) -> ProjectedLine {
    if record.games == 0 {
        return ProjectedLine {
            wins: ZERO_GAME_WINS,
            losses: ZERO_GAME_LOSSES,
            points_for: 0.0,
            points_against: 0.0,
            source: ProjectionSource::LinearFallback,
        };
    }

    let remaining = request.remaining_weeks.max(0) as f64;
    let games = record.games as f64;
    let pace = |total: f64| total + remaining * (total / games);
    ProjectedLine {
        wins: pace(record.wins as f64),
        losses: pace(record.losses as f64),
        points_for: pace(record.points_for),
        points_against: pace(record.points_against),
        source: ProjectionSource::LinearFallback,
    }
}

fn projected_row(record: TeamRecord, line: ProjectedLine) -> StandingsRow {
    let mut row = StandingsRow::from_record(record);
    row.projection = Some(line);
    row
}
