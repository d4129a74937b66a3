//! Record aggregation
//!
//! Folds the games of one [`ScopeView`] into per-team [`TeamRecord`]s in a
//! single pass. Bye games never count. A game missing any of its three score
//! fields for the active [`ScoreMode`] is skipped for that aggregation only.

use crate::types::{Game, ScopeView, ScoreLine, ScoreMode, TeamRecord};
use std::collections::BTreeMap;
use tracing::debug;

/// Decides which games count and which score line they contribute
#[derive(Debug, Clone, Copy)]
pub struct GameFilter<'a> {
    pub bye_team: &'a str,
    pub mode: ScoreMode,
}

impl<'a> GameFilter<'a> {
    pub fn new(bye_team: &'a str, mode: ScoreMode) -> Self {
        Self { bye_team, mode }
    }

    /// The game's score line, or `None` for byes and unplayed or malformed games
    pub fn line(&self, game: &Game) -> Option<ScoreLine> {
        if game.involves_bye(self.bye_team) {
            return None;
        }
        game.line(self.mode)
    }
}

/// Builds team records for a scope
#[derive(Debug, Clone, Copy)]
pub struct RecordAggregator<'a> {
    filter: GameFilter<'a>,
}

impl<'a> RecordAggregator<'a> {
    pub fn new(filter: GameFilter<'a>) -> Self {
        Self { filter }
    }

    /// Aggregate every team in the view.
    ///
    /// Teams scheduled in the view's season (or present in the view for
    /// season-spanning views) get a record even with zero valid games.
    pub fn aggregate(&self, games: &[Game], view: &ScopeView) -> BTreeMap<String, TeamRecord> {
        let mut records: BTreeMap<String, TeamRecord> = BTreeMap::new();
        let mut skipped = 0usize;

        for game in games {
            if game.involves_bye(self.filter.bye_team) || !on_roster(view, game) {
                continue;
            }

            if !records.contains_key(&game.team) {
                records.insert(game.team.clone(), TeamRecord::new(game.team.as_str()));
            }

            if !view.contains(game) {
                continue;
            }

            match game.line(self.filter.mode) {
                Some(line) => {
                    if let Some(record) = records.get_mut(&game.team) {
                        fold(record, &line);
                    }
                }
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!("Skipped {} unplayed or malformed games while aggregating {:?}", skipped, view);
        }

        records
    }

    /// Aggregate a single team; a team with no games yields an empty record
    pub fn aggregate_team(&self, games: &[Game], view: &ScopeView, team: &str) -> TeamRecord {
        let mut record = TeamRecord::new(team);

        for game in games.iter().filter(|game| game.team == team && view.contains(game)) {
            if let Some(line) = self.filter.line(game) {
                fold(&mut record, &line);
            }
        }

        record
    }
}

/// Games that put a team in the table for this view, played or not
fn on_roster(view: &ScopeView, game: &Game) -> bool {
    match view {
        ScopeView::Season { season, .. } => game.season == *season,
        _ => view.contains(game),
    }
}

fn fold(record: &mut TeamRecord, line: &ScoreLine) {
    record.games += 1;
    record.points_for += line.team_score;
    record.points_against += line.opponent_score;
    if line.is_win() {
        record.wins += 1;
    } else {
        record.losses += 1;
    }
}
