//! League record book
//!
//! Longest streaks per team over full history plus leaderboards for
//! streaks, single-game scores and margins of victory.

use crate::aggregation::GameFilter;
use crate::streaks::StreakCalculator;
use crate::types::{Game, LongestStreaks, SeasonYear, WeekNumber};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One team's entry on a streak leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakEntry {
    pub team: String,
    pub length: u32,
}

/// One game on a score or margin leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEntry {
    pub team: String,
    pub opponent: String,
    pub season: SeasonYear,
    pub week: WeekNumber,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordBook {
    /// Longest streaks by team
    pub teams: BTreeMap<String, LongestStreaks>,
    pub longest_win_streaks: Vec<StreakEntry>,
    pub longest_loss_streaks: Vec<StreakEntry>,
    pub longest_high_score_streaks: Vec<StreakEntry>,
    pub longest_low_score_streaks: Vec<StreakEntry>,
    pub highest_scores: Vec<GameEntry>,
    pub lowest_scores: Vec<GameEntry>,
    pub largest_margins: Vec<GameEntry>,
}

impl RecordBook {
    /// Build from the full game history, keeping `limit` entries per leaderboard
    pub fn build(
        games: &[Game],
        filter: GameFilter<'_>,
        streaks: &StreakCalculator<'_>,
        limit: usize,
    ) -> Self {
        let teams = streaks.all_longest_streaks(games);

        let leaderboard = |length: fn(&LongestStreaks) -> u32| -> Vec<StreakEntry> {
            let mut entries: Vec<StreakEntry> = teams
                .iter()
                .map(|(team, longest)| StreakEntry { team: team.clone(), length: length(longest) })
                .filter(|entry| entry.length > 0)
                .collect();
            entries.sort_by(|a, b| b.length.cmp(&a.length).then_with(|| a.team.cmp(&b.team)));
            entries.truncate(limit);
            entries
        };

        let longest_win_streaks = leaderboard(|l: &LongestStreaks| l.win);
        let longest_loss_streaks = leaderboard(|l: &LongestStreaks| l.loss);
        let longest_high_score_streaks = leaderboard(|l: &LongestStreaks| l.high_score);
        let longest_low_score_streaks = leaderboard(|l: &LongestStreaks| l.low_score);

        let mut played: Vec<(&Game, f64, f64)> = games
            .iter()
            .filter_map(|game| filter.line(game).map(|line| (game, line.team_score, line.score_diff)))
            .collect();
        played.sort_by_key(|(game, _, _)| game.chronological_key());

        let entry = |game: &Game, value: f64| GameEntry {
            team: game.team.clone(),
            opponent: game.opponent.clone(),
            season: game.season,
            week: game.week,
            value,
        };

        let mut by_score = played.clone();
        by_score.sort_by(|a, b| b.1.total_cmp(&a.1));
        let highest_scores = by_score.iter().take(limit).map(|(game, score, _)| entry(*game, *score)).collect();

        by_score.sort_by(|a, b| a.1.total_cmp(&b.1));
        let lowest_scores = by_score.iter().take(limit).map(|(game, score, _)| entry(*game, *score)).collect();

        let mut margins: Vec<_> = played.iter().filter(|(_, _, diff)| *diff > 0.0).collect();
        margins.sort_by(|a, b| b.2.total_cmp(&a.2));
        let largest_margins = margins.iter().take(limit).map(|(game, _, diff)| entry(*game, *diff)).collect();

        Self {
            longest_win_streaks,
            longest_loss_streaks,
            longest_high_score_streaks,
            longest_low_score_streaks,
            teams,
            highest_scores,
            lowest_scores,
            largest_margins,
        }
    }

    pub fn team(&self, team: &str) -> Option<&LongestStreaks> {
        self.teams.get(team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::LeagueBuilder;
    use crate::types::ScoreMode;

    fn book(games: &[Game], limit: usize) -> RecordBook {
        let filter = GameFilter::new("Bye", ScoreMode::Starters);
        let streaks = StreakCalculator::new(filter, 150.0, 100.0);
        RecordBook::build(games, filter, &streaks, limit)
    }

    #[test]
    fn test_streak_leaderboards() {
        let games = LeagueBuilder::new()
            .game(2022, 1, "A", "B", 155.0, 90.0)
            .game(2022, 2, "A", "B", 152.0, 95.0)
            .game(2023, 1, "A", "B", 120.0, 130.0)
            .games();

        let book = book(&games, 10);
        assert_eq!(book.longest_win_streaks[0], StreakEntry { team: "A".into(), length: 2 });
        assert_eq!(book.longest_loss_streaks[0], StreakEntry { team: "B".into(), length: 2 });
        assert_eq!(book.longest_high_score_streaks, vec![StreakEntry { team: "A".into(), length: 2 }]);
        assert_eq!(book.longest_low_score_streaks[0], StreakEntry { team: "B".into(), length: 2 });
        assert_eq!(book.team("A").unwrap().loss, 1);
    }

    #[test]
    fn test_game_leaderboards() {
        let games = LeagueBuilder::new()
            .game(2022, 1, "A", "B", 180.0, 60.0)
            .game(2022, 2, "C", "D", 150.0, 140.0)
            .bye(2022, 3, "A", 300.0)
            .games();

        let book = book(&games, 2);
        assert_eq!(book.highest_scores.len(), 2);
        assert_eq!(book.highest_scores[0].team, "A");
        assert_eq!(book.highest_scores[0].value, 180.0);
        assert_eq!(book.lowest_scores[0].team, "B");
        assert_eq!(book.largest_margins[0].value, 120.0);
        assert_eq!(book.largest_margins[1].team, "C");
    }
}
