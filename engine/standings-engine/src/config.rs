//! # Configuration Management
//!
//! Configuration for the standings engine: tie-break tolerance, score
//! thresholds, year-dependent playoff formats and projection settings.

use crate::error::{Result, StandingsError};
use crate::types::{SeasonYear, WeekNumber};
use crate::{
    DEFAULT_BYE_TEAM, DEFAULT_PROJECTION_TRIALS, DEFAULT_UNKNOWN_DIVISION,
    DEFAULT_WIN_PCT_TOLERANCE,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration for the StandingsEngine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Standings computation settings
    pub standings: StandingsConfig,
    /// Playoff format rules, keyed by season range
    pub playoff_formats: Vec<PlayoffFormatRule>,
    /// Projection settings
    pub projection: ProjectionConfig,
    /// Logging settings (consumed by binaries)
    pub logging: LoggingConfig,
}

/// Standings computation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingsConfig {
    /// Win percentages closer than this tie and fall back to point differential
    pub win_pct_tolerance: f64,
    /// Division name for teams the registry does not list
    pub unknown_division: String,
    /// Team name of bye-week placeholder records
    pub bye_team: String,
    /// Score at or above which a game extends the high-score streak
    pub high_score_threshold: f64,
    /// Score below which a game extends the low-score streak
    pub low_score_threshold: f64,
}

/// One era of playoff format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayoffFormatRule {
    /// First season this rule covers
    pub first_season: SeasonYear,
    /// Last season this rule covers, open-ended if absent
    pub last_season: Option<SeasonYear>,
    /// Regular-season length in weeks
    pub regular_season_weeks: WeekNumber,
    /// Playoff spots per division, or in total for an overall bracket
    pub slots: u32,
    /// Playoff pool spans divisions instead of being per-division
    pub overall_bracket: bool,
}

/// Where playoff spots are allocated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayoffSlots {
    PerDivision(u32),
    Overall(u32),
}

/// Resolved playoff format for a single season
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffFormat {
    pub regular_season_weeks: WeekNumber,
    pub slots: PlayoffSlots,
}

impl PlayoffFormat {
    pub fn is_overall_bracket(&self) -> bool {
        matches!(self.slots, PlayoffSlots::Overall(_))
    }

    pub fn slot_count(&self) -> u32 {
        match self.slots {
            PlayoffSlots::PerDivision(n) | PlayoffSlots::Overall(n) => n,
        }
    }

    /// Weeks left in the regular season after `current_week`, negative once over
    pub fn remaining_weeks(&self, current_week: WeekNumber) -> i64 {
        self.regular_season_weeks as i64 - current_week as i64
    }
}

impl PlayoffFormatRule {
    pub fn covers(&self, season: SeasonYear) -> bool {
        season >= self.first_season && self.last_season.map_or(true, |last| season <= last)
    }

    pub fn format(&self) -> PlayoffFormat {
        let slots = if self.overall_bracket {
            PlayoffSlots::Overall(self.slots)
        } else {
            PlayoffSlots::PerDivision(self.slots)
        };
        PlayoffFormat { regular_season_weeks: self.regular_season_weeks, slots }
    }
}

/// Projection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Monte-Carlo trials requested from the projection engine
    pub trials: u32,
    /// Upper bound on one simulation call
    pub timeout_ms: u64,
    /// Season length used when a season has no playoff format
    pub default_regular_season_weeks: WeekNumber,
    /// Fixed RNG seed for reproducible simulations
    pub seed: Option<u64>,
    /// Floor for a team's simulated score spread
    pub min_score_std_dev: f64,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive (e.g. "info", "standings_engine=debug")
    pub level: String,
    /// Output format: plain, pretty, json
    pub format: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            standings: StandingsConfig::default(),
            playoff_formats: default_playoff_formats(),
            projection: ProjectionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for StandingsConfig {
    fn default() -> Self {
        Self {
            win_pct_tolerance: DEFAULT_WIN_PCT_TOLERANCE,
            unknown_division: DEFAULT_UNKNOWN_DIVISION.to_string(),
            bye_team: DEFAULT_BYE_TEAM.to_string(),
            high_score_threshold: 150.0,
            low_score_threshold: 100.0,
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_PROJECTION_TRIALS,
            timeout_ms: 5000,
            default_regular_season_weeks: 14,
            seed: None,
            min_score_std_dev: 10.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "plain".to_string() }
    }
}

/// League history: an 8-team overall bracket, then per-division formats
fn default_playoff_formats() -> Vec<PlayoffFormatRule> {
    vec![
        PlayoffFormatRule {
            first_season: 2012,
            last_season: Some(2015),
            regular_season_weeks: 13,
            slots: 8,
            overall_bracket: true,
        },
        PlayoffFormatRule {
            first_season: 2016,
            last_season: Some(2020),
            regular_season_weeks: 13,
            slots: 3,
            overall_bracket: false,
        },
        PlayoffFormatRule {
            first_season: 2021,
            last_season: None,
            regular_season_weeks: 14,
            slots: 4,
            overall_bracket: false,
        },
    ]
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&content)?;
        config.validate().map_err(StandingsError::config)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from environment variables.
    ///
    /// `STANDINGS_CONFIG` names a TOML file to start from; the remaining
    /// variables override individual fields.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("STANDINGS_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(trials) = std::env::var("STANDINGS_PROJECTION_TRIALS") {
            config.projection.trials = trials.parse().map_err(|_| {
                StandingsError::config(format!("STANDINGS_PROJECTION_TRIALS is not a number: {trials}"))
            })?;
        }

        if let Ok(seed) = std::env::var("STANDINGS_PROJECTION_SEED") {
            config.projection.seed = Some(seed.parse().map_err(|_| {
                StandingsError::config(format!("STANDINGS_PROJECTION_SEED is not a number: {seed}"))
            })?);
        }

        if let Ok(level) = std::env::var("STANDINGS_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.validate().map_err(StandingsError::config)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.standings.win_pct_tolerance > 0.0) {
            return Err("standings.win_pct_tolerance must be greater than 0".to_string());
        }

        if self.projection.default_regular_season_weeks == 0 {
            return Err("projection.default_regular_season_weeks must be greater than 0".to_string());
        }

        for rule in &self.playoff_formats {
            if rule.slots == 0 {
                return Err(format!("playoff format starting {} has no slots", rule.first_season));
            }
            if rule.regular_season_weeks == 0 {
                return Err(format!(
                    "playoff format starting {} has no regular season",
                    rule.first_season
                ));
            }
            if rule.last_season.is_some_and(|last| last < rule.first_season) {
                return Err(format!(
                    "playoff format starting {} ends before it begins",
                    rule.first_season
                ));
            }
        }

        for (i, a) in self.playoff_formats.iter().enumerate() {
            for b in &self.playoff_formats[i + 1..] {
                let a_end = a.last_season.unwrap_or(SeasonYear::MAX);
                let b_end = b.last_season.unwrap_or(SeasonYear::MAX);
                if a.first_season <= b_end && b.first_season <= a_end {
                    return Err(format!(
                        "playoff formats starting {} and {} overlap",
                        a.first_season, b.first_season
                    ));
                }
            }
        }

        Ok(())
    }

    /// Playoff format for a season; `None` for seasons no rule covers
    pub fn playoff_format(&self, season: SeasonYear) -> Option<PlayoffFormat> {
        self.playoff_formats.iter().find(|rule| rule.covers(season)).map(PlayoffFormatRule::format)
    }

    /// Projection timeout as Duration
    pub fn projection_timeout(&self) -> Duration {
        Duration::from_millis(self.projection.timeout_ms)
    }
}
