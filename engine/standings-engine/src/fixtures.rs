//! Small leagues for tests

use crate::store::{InMemoryGameLog, StaticDivisionRegistry};
use crate::types::{Game, SeasonPeriod, SeasonYear, WeekNumber};

/// One side of a played game with no bench data
pub fn played(
    game_id: u64,
    season: SeasonYear,
    week: WeekNumber,
    team: &str,
    opponent: &str,
    team_score: f64,
    opponent_score: f64,
) -> Game {
    Game {
        game_id,
        season,
        week,
        team: team.to_string(),
        opponent: opponent.to_string(),
        team_score: Some(team_score),
        opponent_score: Some(opponent_score),
        score_diff: Some(team_score - opponent_score),
        bench_score: None,
        opponent_bench_score: None,
        bench_score_diff: None,
        period: SeasonPeriod::Regular,
    }
}

/// One side of a scheduled game that has not been played
pub fn unplayed(
    game_id: u64,
    season: SeasonYear,
    week: WeekNumber,
    team: &str,
    opponent: &str,
) -> Game {
    Game {
        team_score: None,
        opponent_score: None,
        score_diff: None,
        ..played(game_id, season, week, team, opponent, 0.0, 0.0)
    }
}

/// Builds a game log one matchup at a time, writing both perspectives
#[derive(Debug, Default)]
pub struct LeagueBuilder {
    games: Vec<Game>,
    next_id: u64,
}

impl LeagueBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn game(
        mut self,
        season: SeasonYear,
        week: WeekNumber,
        home: &str,
        away: &str,
        home_score: f64,
        away_score: f64,
    ) -> Self {
        let id = self.id();
        self.games.push(played(id, season, week, home, away, home_score, away_score));
        self.games.push(played(id, season, week, away, home, away_score, home_score));
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn bench_game(
        mut self,
        season: SeasonYear,
        week: WeekNumber,
        home: &str,
        away: &str,
        home_score: f64,
        away_score: f64,
        home_bench: f64,
        away_bench: f64,
    ) -> Self {
        let id = self.id();
        let mut home_side = played(id, season, week, home, away, home_score, away_score);
        home_side.bench_score = Some(home_bench);
        home_side.opponent_bench_score = Some(away_bench);
        home_side.bench_score_diff = Some(home_bench - away_bench);

        let mut away_side = played(id, season, week, away, home, away_score, home_score);
        away_side.bench_score = Some(away_bench);
        away_side.opponent_bench_score = Some(home_bench);
        away_side.bench_score_diff = Some(away_bench - home_bench);

        self.games.push(home_side);
        self.games.push(away_side);
        self
    }

    pub fn unplayed(mut self, season: SeasonYear, week: WeekNumber, home: &str, away: &str) -> Self {
        let id = self.id();
        self.games.push(unplayed(id, season, week, home, away));
        self.games.push(unplayed(id, season, week, away, home));
        self
    }

    pub fn bye(mut self, season: SeasonYear, week: WeekNumber, team: &str, score: f64) -> Self {
        let id = self.id();
        self.games.push(played(id, season, week, team, "Bye", score, 0.0));
        self
    }

    /// Append a raw game record as-is
    pub fn raw(mut self, game: Game) -> Self {
        self.games.push(game);
        self
    }

    pub fn games(&self) -> Vec<Game> {
        self.games.clone()
    }

    pub fn log(&self) -> InMemoryGameLog {
        InMemoryGameLog::new(self.games.clone())
    }
}

/// Division registry for a single season
pub fn registry(season: SeasonYear, divisions: &[(&str, &[&str])]) -> StaticDivisionRegistry {
    let mut registry = StaticDivisionRegistry::new();
    for (name, teams) in divisions {
        registry.insert(season, *name, teams.iter().map(|team| team.to_string()).collect());
    }
    registry
}

/// Four teams, two divisions, three weeks of 2023:
///
/// | team | record | PF    | PA    |
/// |------|--------|-------|-------|
/// | A    | 3-0    | 390.0 | 300.0 |
/// | B    | 1-2    | 310.0 | 340.0 |
/// | C    | 2-1    | 330.0 | 320.0 |
/// | D    | 0-3    | 290.0 | 360.0 |
pub fn small_league() -> LeagueBuilder {
    LeagueBuilder::new()
        .game(2023, 1, "A", "B", 130.0, 100.0)
        .game(2023, 1, "C", "D", 110.0, 100.0)
        .game(2023, 2, "A", "C", 120.0, 100.0)
        .game(2023, 2, "B", "D", 110.0, 90.0)
        .game(2023, 3, "A", "D", 140.0, 100.0)
        .game(2023, 3, "C", "B", 120.0, 100.0)
}

pub fn small_registry() -> StaticDivisionRegistry {
    registry(2023, &[("East", &["A", "B"]), ("West", &["C", "D"])])
}
