//! # StandingsEngine
//!
//! Standings and playoff-race computation for League Ledger.
//!
//! The engine turns a flat, denormalized fantasy-football game log into ranked,
//! tie-broken division standings with streaks, clinch/elimination numbers,
//! historical playoff odds and optional season-end projections.
//!
//! ## Pipeline
//!
//! - **Record Aggregator** (`aggregation`): one pass over the scoped games
//! - **Streak Calculator** (`streaks`): current and longest streaks
//! - **Division Grouper** (`divisions`): per-season division membership
//! - **Tie-Break Sorter** (`sorting`): display ordering and ranks
//! - **Magic/Elimination Calculator** (`magic`)
//! - **Playoff-Odds Resolver** (`playoff_odds`) and the all-time overall record (`overall`)
//! - **Projection Adapter** (`projection`): external simulation with a linear fallback
//!
//! The engine holds no state between calls. Every query is described by an
//! immutable [`QueryScope`] and recomputed from the game log.

pub mod aggregation;
pub mod config;
pub mod divisions;
pub mod engine;
pub mod error;
pub mod magic;
pub mod normalization;
pub mod overall;
pub mod playoff_odds;
pub mod projection;
pub mod records;
pub mod simulation;
pub mod sorting;
pub mod store;
pub mod streaks;
pub mod types;

#[cfg(test)]
mod fixtures;


pub use config::{EngineConfig, PlayoffFormat, PlayoffFormatRule};
pub use engine::StandingsEngine;
pub use error::{Result, StandingsError};
pub use normalization::{GameNormalizer, NormalizationStats};
pub use projection::{PerTeamProjection, ProjectionAdapter, ProjectionEngine};
pub use records::RecordBook;
pub use simulation::SimulationProjector;
pub use store::{
    DivisionRegistry, GameLogStore, InMemoryGameLog, PlayoffOddsTable, StaticDivisionRegistry,
    StaticOddsTable,
};
pub use types::*;

/// Current version of the StandingsEngine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Two win percentages closer than this are treated as tied
pub const DEFAULT_WIN_PCT_TOLERANCE: f64 = 0.001;

/// Division label for teams missing from the registry
pub const DEFAULT_UNKNOWN_DIVISION: &str = "Unknown";

/// Team name used for bye-week placeholder records
pub const DEFAULT_BYE_TEAM: &str = "Bye";

/// Default Monte-Carlo trial count for projections
pub const DEFAULT_PROJECTION_TRIALS: u32 = 1000;
