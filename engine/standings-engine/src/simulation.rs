//! Monte-Carlo season projector
//!
//! Played games fix each team's current record. Every unplayed regular-season
//! matchup is simulated by drawing both scores from a normal distribution
//! fitted to that team's scores so far.

use crate::aggregation::GameFilter;
use crate::config::EngineConfig;
use crate::error::{Result, StandingsError};
use crate::projection::{PerTeamProjection, ProjectionEngine};
use crate::store::GameLogStore;
use crate::types::{Game, ScoreMode, SeasonYear, WeekNumber};
use async_trait::async_trait;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

/// Mean score used when a season has no played games at all
const FALLBACK_MEAN_SCORE: f64 = 100.0;

#[derive(Debug, Clone, Default)]
struct TeamModel {
    wins: f64,
    losses: f64,
    points_for: f64,
    points_against: f64,
    scores: Vec<f64>,
}

/// A season reduced to what the simulation needs
#[derive(Debug, Clone)]
pub struct SeasonModel {
    teams: Vec<(String, TeamModel)>,
    /// (mean, std dev) per team, same order as `teams`
    distributions: Vec<(f64, f64)>,
    matchups: Vec<(usize, usize)>,
}

impl SeasonModel {
    /// Build from one season's games
    pub fn build(games: &[Game], bye_team: &str, min_std_dev: f64) -> Result<Self> {
        let filter = GameFilter::new(bye_team, ScoreMode::Starters);
        let mut teams: BTreeMap<String, TeamModel> = BTreeMap::new();
        let mut unplayed: BTreeSet<(WeekNumber, String, String)> = BTreeSet::new();

        for game in games.iter().filter(|game| !game.involves_bye(bye_team)) {
            let team = teams.entry(game.team.clone()).or_default();
            match filter.line(game) {
                Some(line) => {
                    team.points_for += line.team_score;
                    team.points_against += line.opponent_score;
                    team.scores.push(line.team_score);
                    if line.is_win() {
                        team.wins += 1.0;
                    } else {
                        team.losses += 1.0;
                    }
                }
                None if game.period.is_regular() && !game.opponent.is_empty() => {
                    // Both perspectives of a matchup collapse to one entry
                    let (a, b) = if game.team <= game.opponent {
                        (game.team.clone(), game.opponent.clone())
                    } else {
                        (game.opponent.clone(), game.team.clone())
                    };
                    unplayed.insert((game.week, a, b));
                }
                None => {}
            }
        }

        for (_, a, b) in &unplayed {
            teams.entry(a.clone()).or_default();
            teams.entry(b.clone()).or_default();
        }

        if teams.is_empty() {
            return Err(StandingsError::projection_unavailable("season has no games to simulate"));
        }

        let league_scores: Vec<f64> = teams.values().flat_map(|team| team.scores.iter().copied()).collect();
        let (league_mean, league_std) =
            mean_and_std(&league_scores).unwrap_or((FALLBACK_MEAN_SCORE, min_std_dev));

        let teams: Vec<(String, TeamModel)> = teams.into_iter().collect();
        let distributions = teams
            .iter()
            .map(|(_, team)| {
                let (mean, std) = match mean_and_std(&team.scores) {
                    Some((mean, std)) if team.scores.len() > 1 => (mean, std),
                    Some((mean, _)) => (mean, league_std),
                    None => (league_mean, league_std),
                };
                (mean, std.max(min_std_dev))
            })
            .collect();

        let index: BTreeMap<&str, usize> =
            teams.iter().enumerate().map(|(i, (name, _))| (name.as_str(), i)).collect();
        let matchups = unplayed
            .iter()
            .filter_map(|(_, a, b)| Some((*index.get(a.as_str())?, *index.get(b.as_str())?)))
            .collect();

        Ok(Self { teams, distributions, matchups })
    }

    pub fn unplayed_matchups(&self) -> usize {
        self.matchups.len()
    }

    /// Average season-end lines over `trials` simulated seasons
    pub fn run(&self, trials: u32, seed: u64) -> Result<Vec<PerTeamProjection>> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let normals = self
            .distributions
            .iter()
            .map(|(mean, std)| Normal::new(*mean, *std))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| StandingsError::projection_unavailable(format!("bad score distribution: {e}")))?;

        let trials = trials.max(1);
        let count = self.teams.len();
        let mut wins = vec![0.0; count];
        let mut losses = vec![0.0; count];
        let mut points_for = vec![0.0; count];
        let mut points_against = vec![0.0; count];

        for _ in 0..trials {
            for &(a, b) in &self.matchups {
                let a_score: f64 = normals[a].sample(&mut rng).max(0.0);
                let b_score: f64 = normals[b].sample(&mut rng).max(0.0);

                points_for[a] += a_score;
                points_against[a] += b_score;
                points_for[b] += b_score;
                points_against[b] += a_score;

                // Exact ties lose for both sides, like recorded games
                if a_score > b_score {
                    wins[a] += 1.0;
                    losses[b] += 1.0;
                } else if b_score > a_score {
                    wins[b] += 1.0;
                    losses[a] += 1.0;
                } else {
                    losses[a] += 1.0;
                    losses[b] += 1.0;
                }
            }
        }

        let trials = trials as f64;
        Ok(self
            .teams
            .iter()
            .enumerate()
            .map(|(i, (name, team))| PerTeamProjection {
                team: name.clone(),
                avg_wins: team.wins + wins[i] / trials,
                avg_losses: team.losses + losses[i] / trials,
                avg_points_for: team.points_for + points_for[i] / trials,
                avg_points_against: team.points_against + points_against[i] / trials,
            })
            .collect())
    }
}

/// Population mean and standard deviation, `None` for no samples
fn mean_and_std(samples: &[f64]) -> Option<(f64, f64)> {
    if samples.is_empty() {
        return None;
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}

/// [`ProjectionEngine`] backed by the game log
pub struct SimulationProjector {
    store: Arc<dyn GameLogStore>,
    bye_team: String,
    seed: Option<u64>,
    min_score_std_dev: f64,
}

impl SimulationProjector {
    pub fn new(store: Arc<dyn GameLogStore>, config: &EngineConfig) -> Self {
        Self {
            store,
            bye_team: config.standings.bye_team.clone(),
            seed: config.projection.seed,
            min_score_std_dev: config.projection.min_score_std_dev,
        }
    }
}

#[async_trait]
impl ProjectionEngine for SimulationProjector {
    async fn run_simulation(&self, season: SeasonYear, trials: u32) -> Result<Vec<PerTeamProjection>> {
        let games = self.store.games_for(Some(season), None)?;
        let model = SeasonModel::build(&games, &self.bye_team, self.min_score_std_dev)?;
        let seed = self.seed.unwrap_or_else(rand::random);

        debug!(
            "Simulating {} unplayed matchups for {} over {} trials (seed {})",
            model.unplayed_matchups(),
            season,
            trials,
            seed
        );

        tokio::task::spawn_blocking(move || model.run(trials, seed))
            .await
            .map_err(|e| StandingsError::projection_unavailable(format!("simulation task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::LeagueBuilder;
    use crate::store::InMemoryGameLog;

    fn season() -> LeagueBuilder {
        LeagueBuilder::new()
            .game(2023, 1, "A", "B", 140.0, 90.0)
            .game(2023, 2, "A", "B", 130.0, 100.0)
            .unplayed(2023, 3, "A", "B")
            .unplayed(2023, 4, "A", "B")
    }

    #[test]
    fn test_model_deduplicates_matchups() {
        let model = SeasonModel::build(&season().games(), "Bye", 10.0).unwrap();
        assert_eq!(model.unplayed_matchups(), 2);
    }

    #[test]
    fn test_every_unplayed_game_decided() {
        let model = SeasonModel::build(&season().games(), "Bye", 10.0).unwrap();
        let projections = model.run(200, 7).unwrap();

        for projection in &projections {
            // 2 played + 2 simulated
            assert!((projection.avg_wins + projection.avg_losses - 4.0).abs() < 1e-9);
        }

        let a = projections.iter().find(|p| p.team == "A").unwrap();
        assert!(a.avg_wins >= 2.0);
        assert!(a.avg_points_for > 270.0);
    }

    #[test]
    fn test_same_seed_same_result() {
        let model = SeasonModel::build(&season().games(), "Bye", 10.0).unwrap();
        assert_eq!(model.run(50, 42).unwrap(), model.run(50, 42).unwrap());
    }

    #[test]
    fn test_empty_season_is_unavailable() {
        let err = SeasonModel::build(&[], "Bye", 10.0).unwrap_err();
        assert!(err.is_projection_failure());
    }

    #[tokio::test]
    async fn test_projector_reads_store() {
        let mut config = EngineConfig::default();
        config.projection.seed = Some(1);
        let projector = SimulationProjector::new(Arc::new(season().log()), &config);

        let projections = projector.run_simulation(2023, 100).await.unwrap();
        assert_eq!(projections.len(), 2);
    }

    #[tokio::test]
    async fn test_projector_unknown_season() {
        let projector = SimulationProjector::new(
            Arc::new(InMemoryGameLog::new(Vec::new())),
            &EngineConfig::default(),
        );
        assert!(projector.run_simulation(1999, 10).await.is_err());
    }
}
