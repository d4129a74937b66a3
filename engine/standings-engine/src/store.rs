//! Read-only data sources the engine consumes, and in-memory implementations
//!
//! The engine never mutates anything it reads through these traits.

use crate::error::{Result, StandingsError};
use crate::normalization::{GameNormalizer, NormalizationStats};
use crate::types::{Game, SeasonYear, WeekNumber};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Division name to member teams for one season
pub type DivisionMap = BTreeMap<String, Vec<String>>;

/// Source of game records
pub trait GameLogStore: Send + Sync {
    /// Games filtered by season and by weeks up to and including `through_week`.
    /// `None` means no filter on that dimension.
    fn games_for(
        &self,
        season: Option<SeasonYear>,
        through_week: Option<WeekNumber>,
    ) -> Result<Vec<Game>>;

    /// Every season present in the log, ascending
    fn seasons(&self) -> Result<Vec<SeasonYear>>;
}

/// Source of per-season division membership
pub trait DivisionRegistry: Send + Sync {
    /// Division assignments for `season`; an empty map if the season is unknown
    fn divisions_for(&self, season: SeasonYear) -> Result<DivisionMap>;
}

/// Historical playoff qualification rates by record
pub trait PlayoffOddsTable: Send + Sync {
    /// Percentage (0-100) of teams with this record that made the playoffs
    fn lookup(&self, wins: u32, losses: u32) -> Option<f64>;
}

/// Game log held in memory, kept in chronological order
#[derive(Debug, Clone, Default)]
pub struct InMemoryGameLog {
    games: Vec<Game>,
}

impl InMemoryGameLog {
    pub fn new(mut games: Vec<Game>) -> Self {
        games.sort_by_key(Game::chronological_key);
        Self { games }
    }

    /// Load a game log from a JSON file.
    ///
    /// Accepts either a flat array of records or an object grouped as
    /// season -> week -> records, in which case season and week are filled in
    /// from the keys when a record omits them.
    pub fn from_json_file(
        path: impl AsRef<Path>,
        normalizer: &GameNormalizer,
    ) -> Result<(Self, NormalizationStats)> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            StandingsError::data_unavailable(format!("cannot read game log {}: {e}", path.display()))
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|e| {
            StandingsError::data_unavailable(format!("cannot parse game log {}: {e}", path.display()))
        })?;

        let (log, stats) = Self::from_json_value(value, normalizer)?;
        info!("Loaded {} games from {}", log.len(), path.display());
        Ok((log, stats))
    }

    /// Build a game log from an already-parsed JSON document
    pub fn from_json_value(
        value: Value,
        normalizer: &GameNormalizer,
    ) -> Result<(Self, NormalizationStats)> {
        let records = match value {
            Value::Array(records) => records,
            Value::Object(seasons) => flatten_grouped(seasons)?,
            _ => {
                return Err(StandingsError::data_unavailable(
                    "game log must be an array or a season/week object",
                ))
            }
        };

        let (games, stats) = normalizer.normalize_batch(&records);
        Ok((Self::new(games), stats))
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }
}

fn flatten_grouped(seasons: serde_json::Map<String, Value>) -> Result<Vec<Value>> {
    let mut records = Vec::new();

    for (season, weeks) in seasons {
        let Value::Object(weeks) = weeks else {
            return Err(StandingsError::data_unavailable(format!(
                "season {season} must map weeks to games"
            )));
        };

        for (week, games) in weeks {
            let Value::Array(games) = games else {
                return Err(StandingsError::data_unavailable(format!(
                    "season {season} week {week} must be a list of games"
                )));
            };

            for mut game in games {
                if let Value::Object(fields) = &mut game {
                    fields.entry("season").or_insert_with(|| Value::String(season.clone()));
                    fields.entry("week").or_insert_with(|| Value::String(week.clone()));
                }
                records.push(game);
            }
        }
    }

    Ok(records)
}

impl GameLogStore for InMemoryGameLog {
    fn games_for(
        &self,
        season: Option<SeasonYear>,
        through_week: Option<WeekNumber>,
    ) -> Result<Vec<Game>> {
        Ok(self
            .games
            .iter()
            .filter(|game| season.map_or(true, |s| game.season == s))
            .filter(|game| through_week.map_or(true, |w| game.week <= w))
            .cloned()
            .collect())
    }

    fn seasons(&self) -> Result<Vec<SeasonYear>> {
        let mut seasons: Vec<SeasonYear> = self.games.iter().map(|game| game.season).collect();
        seasons.dedup();
        Ok(seasons)
    }
}

/// Division assignments held in memory
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct StaticDivisionRegistry {
    by_season: BTreeMap<SeasonYear, DivisionMap>,
}

impl StaticDivisionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, season: SeasonYear, division: impl Into<String>, teams: Vec<String>) {
        self.by_season.entry(season).or_default().insert(division.into(), teams);
    }

    /// Load `{"2023": {"East": ["Team A", ...]}}` from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            StandingsError::data_unavailable(format!("cannot read divisions {}: {e}", path.display()))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            StandingsError::data_unavailable(format!("cannot parse divisions {}: {e}", path.display()))
        })
    }
}

impl DivisionRegistry for StaticDivisionRegistry {
    fn divisions_for(&self, season: SeasonYear) -> Result<DivisionMap> {
        Ok(self.by_season.get(&season).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct OddsEntry {
    wins: u32,
    losses: u32,
    pct: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OddsFile {
    Entries(Vec<OddsEntry>),
    /// `{"7-3": 88.5}`
    Keyed(BTreeMap<String, f64>),
}

/// Playoff odds held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticOddsTable {
    odds: BTreeMap<(u32, u32), f64>,
}

impl StaticOddsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, wins: u32, losses: u32, pct: f64) {
        self.odds.insert((wins, losses), pct);
    }

    pub fn len(&self) -> usize {
        self.odds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.odds.is_empty()
    }

    /// Load odds from a JSON list of `{wins, losses, pct}` or a `"W-L": pct` object
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            StandingsError::data_unavailable(format!("cannot read odds {}: {e}", path.display()))
        })?;
        let file: OddsFile = serde_json::from_str(&content).map_err(|e| {
            StandingsError::data_unavailable(format!("cannot parse odds {}: {e}", path.display()))
        })?;

        let mut table = Self::new();
        match file {
            OddsFile::Entries(entries) => {
                for entry in entries {
                    table.insert(entry.wins, entry.losses, entry.pct);
                }
            }
            OddsFile::Keyed(keyed) => {
                for (record, pct) in keyed {
                    let (wins, losses) = parse_record_key(&record).ok_or_else(|| {
                        StandingsError::data_unavailable(format!("bad odds record key: {record}"))
                    })?;
                    table.insert(wins, losses, pct);
                }
            }
        }

        Ok(table)
    }
}

fn parse_record_key(key: &str) -> Option<(u32, u32)> {
    let (wins, losses) = key.split_once('-')?;
    Some((wins.trim().parse().ok()?, losses.trim().parse().ok()?))
}

impl PlayoffOddsTable for StaticOddsTable {
    fn lookup(&self, wins: u32, losses: u32) -> Option<f64> {
        self.odds.get(&(wins, losses)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::played;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_games_for_filters() {
        let log = InMemoryGameLog::new(vec![
            played(3, 2023, 10, "A", "B", 100.0, 90.0),
            played(1, 2023, 9, "A", "C", 100.0, 90.0),
            played(2, 2022, 12, "A", "D", 100.0, 90.0),
        ]);

        assert_eq!(log.games_for(None, None).unwrap().len(), 3);
        assert_eq!(log.games_for(Some(2023), None).unwrap().len(), 2);

        // Week 9 sorts before week 10 numerically
        let through_nine = log.games_for(Some(2023), Some(9)).unwrap();
        assert_eq!(through_nine.len(), 1);
        assert_eq!(through_nine[0].week, 9);

        assert_eq!(log.seasons().unwrap(), vec![2022, 2023]);
        // Chronological storage order
        assert_eq!(log.games()[0].season, 2022);
        assert_eq!(log.games()[1].week, 9);
    }

    #[test]
    fn test_grouped_json() {
        let document = json!({
            "2023": {
                "1": [
                    { "Team": "A", "Opponent": "B", "Team Score": 100, "Opponent Score": 90, "Score Diff": 10 },
                    { "Team": "B", "Opponent": "A", "Team Score": 90, "Opponent Score": 100, "Score Diff": -10 }
                ]
            }
        });

        let (log, stats) = InMemoryGameLog::from_json_value(document, &GameNormalizer::new()).unwrap();
        assert_eq!(stats.accepted, 2);
        assert!(log.games().iter().all(|g| g.season == 2023 && g.week == 1));
    }

    #[test]
    fn test_malformed_game_log_is_unavailable() {
        let err = InMemoryGameLog::from_json_value(json!(42), &GameNormalizer::new()).unwrap_err();
        assert!(matches!(err, StandingsError::DataUnavailable(_)));

        let err = InMemoryGameLog::from_json_file("/nonexistent/games.json", &GameNormalizer::new())
            .unwrap_err();
        assert!(matches!(err, StandingsError::DataUnavailable(_)));
    }

    #[test]
    fn test_division_registry_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"2023": {{"East": ["A", "B"], "West": ["C", "D"]}}}}"#).unwrap();

        let registry = StaticDivisionRegistry::from_json_file(file.path()).unwrap();
        let divisions = registry.divisions_for(2023).unwrap();
        assert_eq!(divisions["East"], vec!["A".to_string(), "B".to_string()]);
        assert!(registry.divisions_for(2010).unwrap().is_empty());
    }

    #[test]
    fn test_odds_file_formats() {
        let mut list = tempfile::NamedTempFile::new().unwrap();
        write!(list, r#"[{{"wins": 3, "losses": 1, "pct": 72.5}}]"#).unwrap();
        let table = StaticOddsTable::from_json_file(list.path()).unwrap();
        assert_eq!(table.lookup(3, 1), Some(72.5));
        assert_eq!(table.lookup(1, 3), None);

        let mut keyed = tempfile::NamedTempFile::new().unwrap();
        write!(keyed, r#"{{"10-3": 99.0, "0-0": 50.0}}"#).unwrap();
        let table = StaticOddsTable::from_json_file(keyed.path()).unwrap();
        assert_eq!(table.lookup(10, 3), Some(99.0));
        assert_eq!(table.len(), 2);
    }
}
