//! Streak calculation
//!
//! Streaks replay a team's valid games in chronological order (season, then
//! week, then game id). The current streak walks backward from the most
//! recent game; longest streaks take one forward pass per team.

use crate::aggregation::GameFilter;
use crate::types::{
    Game, LongestStreaks, ScopeView, ScoreLine, SeasonYear, Streak, StreakKind, TeamRecord,
    WeekNumber,
};
use std::collections::BTreeMap;

type Timeline<'g> = Vec<(&'g Game, ScoreLine)>;

/// Computes current and longest streaks
#[derive(Debug, Clone, Copy)]
pub struct StreakCalculator<'a> {
    filter: GameFilter<'a>,
    high_score_threshold: f64,
    low_score_threshold: f64,
}

impl<'a> StreakCalculator<'a> {
    pub fn new(filter: GameFilter<'a>, high_score_threshold: f64, low_score_threshold: f64) -> Self {
        Self { filter, high_score_threshold, low_score_threshold }
    }

    /// Current streak of `team` over every season up to `as_of_season`, with
    /// `as_of_season` itself capped at `as_of_week`. `None` means no cap.
    /// Zero valid games is no streak.
    pub fn current_streak(
        &self,
        games: &[Game],
        team: &str,
        as_of_season: Option<SeasonYear>,
        as_of_week: Option<WeekNumber>,
    ) -> Option<Streak> {
        let timelines =
            self.timelines(games, |game| game.team == team && as_of(game, as_of_season, as_of_week));
        timelines.get(team).and_then(|timeline| trailing_streak(timeline))
    }

    /// Longest runs over every game of `team` in `games`
    pub fn longest_streaks(&self, games: &[Game], team: &str) -> LongestStreaks {
        let timelines = self.timelines(games, |game| game.team == team);
        timelines
            .get(team)
            .map(|timeline| self.longest(timeline))
            .unwrap_or_default()
    }

    /// Longest runs for every team with at least one valid game
    pub fn all_longest_streaks(&self, games: &[Game]) -> BTreeMap<String, LongestStreaks> {
        self.timelines(games, |_| true)
            .into_iter()
            .map(|(team, timeline)| (team.to_string(), self.longest(&timeline)))
            .collect()
    }

    /// Fill the streak fields of records aggregated for `view`.
    ///
    /// Season views count the current streak across season boundaries up to
    /// the cutoff. A week-across-seasons view only sees that week's games.
    /// Longest streaks cover the games inside the view.
    pub fn apply(&self, records: &mut BTreeMap<String, TeamRecord>, games: &[Game], view: &ScopeView) {
        let current = match view {
            ScopeView::Season { season, cutoff } => {
                let week = cutoff.as_week();
                self.timelines(games, |game| as_of(game, Some(*season), week))
            }
            ScopeView::AllTime => self.timelines(games, |_| true),
            ScopeView::WeekAcrossSeasons { .. } => self.timelines(games, |game| view.contains(game)),
        };
        let scoped = self.timelines(games, |game| view.contains(game));

        for (team, record) in records.iter_mut() {
            record.current_streak = current.get(team.as_str()).and_then(|t| trailing_streak(t));

            let longest = scoped.get(team.as_str()).map(|t| self.longest(t)).unwrap_or_default();
            record.longest_win_streak = longest.win;
            record.longest_loss_streak = longest.loss;
        }
    }

    fn timelines<'g>(
        &self,
        games: &'g [Game],
        include: impl Fn(&Game) -> bool,
    ) -> BTreeMap<&'g str, Timeline<'g>> {
        let mut by_team: BTreeMap<&'g str, Timeline<'g>> = BTreeMap::new();

        for game in games.iter().filter(|game| include(game)) {
            if let Some(line) = self.filter.line(game) {
                by_team.entry(game.team.as_str()).or_default().push((game, line));
            }
        }

        for timeline in by_team.values_mut() {
            timeline.sort_by_key(|(game, _)| game.chronological_key());
        }

        by_team
    }

    fn longest(&self, timeline: &[(&Game, ScoreLine)]) -> LongestStreaks {
        let lines = || timeline.iter().map(|(_, line)| line);

        LongestStreaks {
            win: longest_run(lines().map(|line| line.is_win())),
            loss: longest_run(lines().map(|line| !line.is_win())),
            high_score: longest_run(lines().map(|line| line.team_score >= self.high_score_threshold)),
            low_score: longest_run(lines().map(|line| line.team_score < self.low_score_threshold)),
        }
    }
}

fn as_of(game: &Game, season: Option<SeasonYear>, week: Option<WeekNumber>) -> bool {
    match season {
        None => true,
        Some(season) if game.season < season => true,
        Some(season) if game.season == season => week.map_or(true, |week| game.week <= week),
        Some(_) => false,
    }
}

fn trailing_streak(timeline: &[(&Game, ScoreLine)]) -> Option<Streak> {
    let mut results = timeline.iter().rev().map(|(_, line)| line.is_win());
    let last = results.next()?;
    let length = 1 + results.take_while(|won| *won == last).count() as u32;
    Some(Streak { length, kind: StreakKind::from_win(last) })
}

fn longest_run(flags: impl Iterator<Item = bool>) -> u32 {
    let mut run = 0;
    let mut best = 0;
    for flag in flags {
        if flag {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::RecordAggregator;
    use crate::fixtures::{played, LeagueBuilder};
    use crate::types::{ScoreMode, WeekCutoff};

    fn calculator() -> StreakCalculator<'static> {
        StreakCalculator::new(GameFilter::new("Bye", ScoreMode::Starters), 150.0, 100.0)
    }

    fn streak(length: u32, kind: StreakKind) -> Option<Streak> {
        Some(Streak { length, kind })
    }

    #[test]
    fn test_current_streak_stops_at_first_change() {
        let games = LeagueBuilder::new()
            .game(2023, 1, "A", "B", 90.0, 100.0)
            .game(2023, 2, "A", "B", 110.0, 100.0)
            .game(2023, 3, "A", "B", 120.0, 100.0)
            .games();

        assert_eq!(calculator().current_streak(&games, "A", None, None), streak(2, StreakKind::Win));
        assert_eq!(calculator().current_streak(&games, "B", None, None), streak(2, StreakKind::Loss));
    }

    #[test]
    fn test_streak_orders_weeks_numerically_across_seasons() {
        // Inserted out of order; week 10 must come after week 9
        let games = LeagueBuilder::new()
            .game(2023, 10, "A", "B", 90.0, 100.0)
            .game(2023, 9, "A", "B", 110.0, 100.0)
            .game(2022, 14, "A", "B", 110.0, 100.0)
            .games();

        assert_eq!(calculator().current_streak(&games, "A", None, None), streak(1, StreakKind::Loss));
        // Capped at week 9 the streak spans the season boundary
        assert_eq!(
            calculator().current_streak(&games, "A", Some(2023), Some(9)),
            streak(2, StreakKind::Win)
        );
    }

    #[test]
    fn test_no_games_is_no_streak() {
        let games = LeagueBuilder::new().bye(2023, 1, "A", 100.0).unplayed(2023, 2, "A", "B").games();
        assert_eq!(calculator().current_streak(&games, "A", None, None), None);
        assert_eq!(calculator().longest_streaks(&games, "A"), LongestStreaks::default());
    }

    #[test]
    fn test_longest_streaks() {
        let games = LeagueBuilder::new()
            .game(2022, 1, "A", "B", 155.0, 100.0)
            .game(2022, 2, "A", "B", 160.0, 100.0)
            .game(2022, 3, "A", "B", 95.0, 100.0)
            .game(2023, 1, "A", "B", 99.0, 100.0)
            .game(2023, 2, "A", "B", 80.0, 90.0)
            .game(2023, 3, "A", "B", 150.0, 100.0)
            .games();

        let longest = calculator().longest_streaks(&games, "A");
        assert_eq!(longest.win, 2);
        assert_eq!(longest.loss, 3);
        assert_eq!(longest.high_score, 2);
        assert_eq!(longest.low_score, 3);
    }

    #[test]
    fn test_high_score_streak_ignores_results() {
        // 150+ in a loss still extends the high-score streak
        let games = vec![
            played(1, 2023, 1, "A", "B", 151.0, 160.0),
            played(2, 2023, 2, "A", "B", 152.0, 100.0),
        ];
        let longest = calculator().longest_streaks(&games, "A");
        assert_eq!(longest.high_score, 2);
        assert_eq!(longest.win, 1);
    }

    #[test]
    fn test_week_across_seasons_streak_uses_only_that_week() {
        let games = LeagueBuilder::new()
            .game(2022, 1, "A", "B", 110.0, 100.0)
            .game(2022, 2, "A", "B", 90.0, 100.0)
            .game(2023, 1, "A", "B", 110.0, 100.0)
            .game(2023, 2, "A", "B", 90.0, 100.0)
            .games();

        let view = ScopeView::WeekAcrossSeasons { week: 1 };
        let filter = GameFilter::new("Bye", ScoreMode::Starters);
        let mut records = RecordAggregator::new(filter).aggregate(&games, &view);
        calculator().apply(&mut records, &games, &view);

        assert_eq!(records["A"].current_streak, streak(2, StreakKind::Win));
        assert_eq!(records["A"].longest_win_streak, 2);
    }

    #[test]
    fn test_season_view_streak_crosses_season_boundary() {
        let games = LeagueBuilder::new()
            .game(2022, 13, "A", "B", 110.0, 100.0)
            .game(2023, 1, "A", "B", 110.0, 100.0)
            .game(2023, 2, "A", "B", 90.0, 100.0)
            .games();

        let view = ScopeView::Season { season: 2023, cutoff: WeekCutoff::Through(1) };
        let filter = GameFilter::new("Bye", ScoreMode::Starters);
        let mut records = RecordAggregator::new(filter).aggregate(&games, &view);
        calculator().apply(&mut records, &games, &view);

        assert_eq!(records["A"].current_streak, streak(2, StreakKind::Win));
        // Longest streak stays inside the season view
        assert_eq!(records["A"].longest_win_streak, 1);
        assert_eq!(records["B"].longest_loss_streak, 1);
    }
}
