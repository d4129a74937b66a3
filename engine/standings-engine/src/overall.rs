//! Overall record against the whole field
//!
//! Each week a team is compared with every other team that played that
//! same season and week. Beating a score is an overall win, losing to one
//! is an overall loss, equal scores count for neither. Totals therefore
//! exceed games played.

use crate::aggregation::GameFilter;
use crate::types::{Game, OverallRecord, ScopeView, SeasonYear, WeekNumber};
use std::collections::BTreeMap;

/// Overall records for every team with a valid game in `view`
pub fn overall_records(
    games: &[Game],
    view: &ScopeView,
    filter: GameFilter<'_>,
) -> BTreeMap<String, OverallRecord> {
    let mut weeks: BTreeMap<(SeasonYear, WeekNumber), Vec<(&str, f64)>> = BTreeMap::new();

    for game in games.iter().filter(|game| view.contains(game)) {
        if let Some(line) = filter.line(game) {
            weeks.entry((game.season, game.week)).or_default().push((game.team.as_str(), line.team_score));
        }
    }

    let mut records: BTreeMap<String, OverallRecord> = BTreeMap::new();
    for scores in weeks.values() {
        for (team, score) in scores {
            let record = records.entry(team.to_string()).or_default();
            for (other, other_score) in scores {
                if other == team {
                    continue;
                }
                if score > other_score {
                    record.wins += 1;
                } else if score < other_score {
                    record.losses += 1;
                }
            }
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::LeagueBuilder;
    use crate::types::ScoreMode;

    fn filter() -> GameFilter<'static> {
        GameFilter::new("Bye", ScoreMode::Starters)
    }

    #[test]
    fn test_compares_against_whole_field() {
        let games = LeagueBuilder::new()
            .game(2023, 1, "A", "B", 130.0, 100.0)
            .game(2023, 1, "C", "D", 120.0, 90.0)
            .games();

        let records = overall_records(&games, &ScopeView::AllTime, filter());
        assert_eq!(records["A"], OverallRecord { wins: 3, losses: 0 });
        assert_eq!(records["C"], OverallRecord { wins: 2, losses: 1 });
        assert_eq!(records["B"], OverallRecord { wins: 1, losses: 2 });
        assert_eq!(records["D"], OverallRecord { wins: 0, losses: 3 });
    }

    #[test]
    fn test_ties_count_for_neither() {
        let games = LeagueBuilder::new()
            .game(2023, 1, "A", "B", 100.0, 100.0)
            .game(2023, 1, "C", "D", 100.0, 90.0)
            .games();

        let records = overall_records(&games, &ScopeView::AllTime, filter());
        assert_eq!(records["A"], OverallRecord { wins: 1, losses: 0 });
        assert_eq!(records["C"], OverallRecord { wins: 1, losses: 0 });
    }

    #[test]
    fn test_weeks_never_mix() {
        let games = LeagueBuilder::new()
            .game(2022, 1, "A", "B", 150.0, 140.0)
            .game(2023, 1, "A", "B", 80.0, 90.0)
            .bye(2023, 1, "C", 200.0)
            .games();

        let records = overall_records(&games, &ScopeView::WeekAcrossSeasons { week: 1 }, filter());
        assert_eq!(records["A"], OverallRecord { wins: 1, losses: 1 });
        assert!(!records.contains_key("C"));
    }
}
