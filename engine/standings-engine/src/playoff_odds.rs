//! Historical playoff odds by record

use crate::store::PlayoffOddsTable;
use crate::types::{ScopeView, StandingsRow};

/// Percentage of teams with this record that made the playoffs.
///
/// A 0-0 record has not occurred yet and is never looked up.
pub fn resolve(table: &dyn PlayoffOddsTable, wins: u32, losses: u32) -> Option<f64> {
    if wins == 0 && losses == 0 {
        return None;
    }
    table.lookup(wins, losses)
}

/// Set `playoff_pct` on season rows. Season-spanning views get none.
///
/// Projected rows use their projected record rounded to whole games.
pub fn apply_playoff_odds<'r>(
    table: &dyn PlayoffOddsTable,
    rows: impl Iterator<Item = &'r mut StandingsRow>,
    view: &ScopeView,
) {
    for row in rows {
        row.playoff_pct = if view.is_all_time() {
            None
        } else {
            match &row.projection {
                Some(line) => resolve(table, round_games(line.wins), round_games(line.losses)),
                None => resolve(table, row.record.wins, row.record.losses),
            }
        };
    }
}

fn round_games(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}
