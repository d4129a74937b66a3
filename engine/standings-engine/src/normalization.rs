// Game record normalization for the standings engine
//
// Historical exports named the same column several ways and stored numbers as
// either JSON numbers or strings. Everything downstream only sees `Game`.

use crate::types::{Game, SeasonPeriod, SeasonYear, WeekNumber};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Canonical fields a raw record is mapped onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameField {
    GameId,
    Season,
    Week,
    Team,
    Opponent,
    TeamScore,
    OpponentScore,
    ScoreDiff,
    BenchScore,
    OpponentBenchScore,
    BenchScoreDiff,
    Period,
}

const GAME_ID_KEYS: &[&str] = &["Game ID", "gameId", "game_id", "GameID", "id"];
const SEASON_KEYS: &[&str] = &["Season", "season", "Year", "year"];
const WEEK_KEYS: &[&str] = &["Week", "week"];
const TEAM_KEYS: &[&str] = &["Team", "team", "Team Name", "teamName", "Manager"];
const OPPONENT_KEYS: &[&str] = &["Opponent", "opponent", "Opponent Team", "opponentName"];
const TEAM_SCORE_KEYS: &[&str] = &["Team Score", "teamScore", "Score", "score", "Points"];
const OPPONENT_SCORE_KEYS: &[&str] =
    &["Opponent Score", "opponentScore", "Opp Score", "Opponent Points"];
const SCORE_DIFF_KEYS: &[&str] = &["Score Diff", "scoreDiff", "Score Differential", "Margin"];
const BENCH_SCORE_KEYS: &[&str] = &["Bench Score", "benchScore", "Bench Points"];
const OPPONENT_BENCH_SCORE_KEYS: &[&str] =
    &["Opponent Bench Score", "opponentBenchScore", "Opp Bench Score"];
const BENCH_SCORE_DIFF_KEYS: &[&str] = &["Bench Score Diff", "benchScoreDiff", "Bench Diff"];
const PERIOD_KEYS: &[&str] = &["Season Period", "seasonPeriod", "Period", "period", "Game Type"];

/// Counters from one normalization batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizationStats {
    pub accepted: usize,
    /// Records without a usable season, week or team
    pub dropped: usize,
    /// Accepted records with no starter score yet
    pub unplayed: usize,
    /// Accepted records that needed a synthesized game id
    pub synthesized_ids: usize,
}

/// Maps loosely-typed game records onto canonical [`Game`] values
#[derive(Debug, Clone, Default)]
pub struct GameNormalizer {
    extra_aliases: Vec<(GameField, String)>,
}

impl GameNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept one more key name for a field
    pub fn with_alias(mut self, field: GameField, key: impl Into<String>) -> Self {
        self.extra_aliases.push((field, key.into()));
        self
    }

    /// Normalize one record, or `None` if it lacks season, week or team
    pub fn normalize(&self, record: &Map<String, Value>, fallback_id: u64) -> Option<Game> {
        let season = self.lookup(record, GameField::Season).and_then(parse_season);
        let week = self.lookup(record, GameField::Week).and_then(parse_week);
        let team = self.lookup(record, GameField::Team).and_then(parse_text);

        let (Some(season), Some(week), Some(team)) = (season, week, team) else {
            debug!("Dropping game record without season/week/team: {:?}", record);
            return None;
        };

        let game_id = self.lookup(record, GameField::GameId).and_then(parse_id).unwrap_or(fallback_id);

        Some(Game {
            game_id,
            season,
            week,
            team,
            opponent: self.lookup(record, GameField::Opponent).and_then(parse_text).unwrap_or_default(),
            team_score: self.number(record, GameField::TeamScore),
            opponent_score: self.number(record, GameField::OpponentScore),
            score_diff: self.number(record, GameField::ScoreDiff),
            bench_score: self.number(record, GameField::BenchScore),
            opponent_bench_score: self.number(record, GameField::OpponentBenchScore),
            bench_score_diff: self.number(record, GameField::BenchScoreDiff),
            period: self
                .lookup(record, GameField::Period)
                .and_then(parse_text)
                .map(|label| SeasonPeriod::parse(&label))
                .unwrap_or_default(),
        })
    }

    /// Normalize a batch of JSON values. Non-object values are dropped.
    pub fn normalize_batch(&self, records: &[Value]) -> (Vec<Game>, NormalizationStats) {
        let mut stats = NormalizationStats::default();
        let mut games = Vec::with_capacity(records.len());

        for (index, value) in records.iter().enumerate() {
            let Some(record) = value.as_object() else {
                stats.dropped += 1;
                continue;
            };

            let has_id = self.lookup(record, GameField::GameId).and_then(parse_id).is_some();
            match self.normalize(record, index as u64) {
                Some(game) => {
                    if !has_id {
                        stats.synthesized_ids += 1;
                    }
                    if game.team_score.is_none() {
                        stats.unplayed += 1;
                    }
                    stats.accepted += 1;
                    games.push(game);
                }
                None => stats.dropped += 1,
            }
        }

        debug!(
            "Normalized {} game records ({} dropped, {} unplayed)",
            stats.accepted, stats.dropped, stats.unplayed
        );

        (games, stats)
    }

    fn lookup<'a>(&self, record: &'a Map<String, Value>, field: GameField) -> Option<&'a Value> {
        let builtin = builtin_keys(field).iter().copied();
        let extra = self
            .extra_aliases
            .iter()
            .filter(move |(f, _)| *f == field)
            .map(|(_, key)| key.as_str());

        builtin.chain(extra).find_map(|key| record.get(key).filter(|value| !value.is_null()))
    }

    fn number(&self, record: &Map<String, Value>, field: GameField) -> Option<f64> {
        self.lookup(record, field).and_then(parse_number)
    }
}

fn builtin_keys(field: GameField) -> &'static [&'static str] {
    match field {
        GameField::GameId => GAME_ID_KEYS,
        GameField::Season => SEASON_KEYS,
        GameField::Week => WEEK_KEYS,
        GameField::Team => TEAM_KEYS,
        GameField::Opponent => OPPONENT_KEYS,
        GameField::TeamScore => TEAM_SCORE_KEYS,
        GameField::OpponentScore => OPPONENT_SCORE_KEYS,
        GameField::ScoreDiff => SCORE_DIFF_KEYS,
        GameField::BenchScore => BENCH_SCORE_KEYS,
        GameField::OpponentBenchScore => OPPONENT_BENCH_SCORE_KEYS,
        GameField::BenchScoreDiff => BENCH_SCORE_DIFF_KEYS,
        GameField::Period => PERIOD_KEYS,
    }
}

/// Numbers may arrive as JSON numbers or numeric strings; anything else is absent
fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn parse_whole(value: &Value) -> Option<u64> {
    let number = parse_number(value)?;
    (number >= 0.0 && number.fract() == 0.0).then_some(number as u64)
}

fn parse_season(value: &Value) -> Option<SeasonYear> {
    parse_whole(value).and_then(|n| SeasonYear::try_from(n).ok())
}

fn parse_week(value: &Value) -> Option<WeekNumber> {
    parse_whole(value).and_then(|n| WeekNumber::try_from(n).ok())
}

fn parse_id(value: &Value) -> Option<u64> {
    parse_whole(value)
}

fn parse_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_canonical_keys() {
        let normalizer = GameNormalizer::new();
        let record = object(json!({
            "gameId": 42,
            "season": 2023,
            "week": 5,
            "team": "Team A",
            "opponent": "Team B",
            "teamScore": 150.2,
            "opponentScore": 140.1,
            "scoreDiff": 10.1,
            "seasonPeriod": "Regular"
        }));

        let game = normalizer.normalize(&record, 0).unwrap();
        assert_eq!(game.game_id, 42);
        assert_eq!(game.season, 2023);
        assert_eq!(game.week, 5);
        assert_eq!(game.team, "Team A");
        assert_eq!(game.opponent, "Team B");
        assert_eq!(game.team_score, Some(150.2));
        assert_eq!(game.score_diff, Some(10.1));
        assert_eq!(game.period, SeasonPeriod::Regular);
    }

    #[test]
    fn test_historical_keys_and_string_numbers() {
        let normalizer = GameNormalizer::new();
        let record = object(json!({
            "Game ID": "7",
            "Year": "2014",
            "Week": "10",
            "Team Name": "Team A",
            "Opponent": "Team B",
            "Score": "98.5",
            "Opp Score": "101",
            "Margin": "-2.5",
            "Bench Score": "40.0",
            "Opponent Bench Score": 35,
            "Bench Score Diff": "5",
            "Period": "Playoffs"
        }));

        let game = normalizer.normalize(&record, 0).unwrap();
        assert_eq!(game.game_id, 7);
        assert_eq!(game.season, 2014);
        assert_eq!(game.week, 10);
        assert_eq!(game.team_score, Some(98.5));
        assert_eq!(game.opponent_score, Some(101.0));
        assert_eq!(game.score_diff, Some(-2.5));
        assert_eq!(game.bench_score_diff, Some(5.0));
        assert_eq!(game.period, SeasonPeriod::Playoff);
    }

    #[test]
    fn test_non_numeric_scores_become_absent() {
        let normalizer = GameNormalizer::new();
        let record = object(json!({
            "Season": 2023, "Week": 3, "Team": "A", "Opponent": "B",
            "Team Score": "TBD", "Opponent Score": "", "Score Diff": null
        }));

        let game = normalizer.normalize(&record, 0).unwrap();
        assert_eq!(game.team_score, None);
        assert_eq!(game.opponent_score, None);
        assert_eq!(game.score_diff, None);
    }

    #[test]
    fn test_missing_identity_drops_record() {
        let normalizer = GameNormalizer::new();
        let no_week = object(json!({ "Season": 2023, "Team": "A" }));
        let fractional_week = object(json!({ "Season": 2023, "Week": 2.5, "Team": "A" }));

        assert!(normalizer.normalize(&no_week, 0).is_none());
        assert!(normalizer.normalize(&fractional_week, 0).is_none());
    }

    #[test]
    fn test_batch_stats() {
        let normalizer = GameNormalizer::new();
        let records = vec![
            json!({ "Season": 2023, "Week": 1, "Team": "A", "Opponent": "B",
                    "Team Score": 100, "Opponent Score": 90, "Score Diff": 10 }),
            json!({ "Season": 2023, "Week": 2, "Team": "A", "Opponent": "C" }),
            json!({ "Week": 2, "Team": "A" }),
            json!("not an object"),
        ];

        let (games, stats) = normalizer.normalize_batch(&records);
        assert_eq!(games.len(), 2);
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.dropped, 2);
        assert_eq!(stats.unplayed, 1);
        assert_eq!(stats.synthesized_ids, 2);
        // Fallback ids follow input order
        assert!(games[0].game_id < games[1].game_id);
    }

    #[test]
    fn test_extra_alias() {
        let normalizer = GameNormalizer::new().with_alias(GameField::Team, "Franchise");
        let record = object(json!({ "Season": 2020, "Week": 1, "Franchise": "Team Z" }));

        let game = normalizer.normalize(&record, 3).unwrap();
        assert_eq!(game.team, "Team Z");
        assert_eq!(game.game_id, 3);
    }
}
