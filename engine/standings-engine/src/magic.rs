//! Magic and elimination numbers
//!
//! Both numbers assume the worst case: the rival at the playoff line wins
//! every remaining game. The race is ordered by wins, win percentage and
//! points for, independent of the displayed sort.

use crate::config::PlayoffFormat;
use crate::sorting::race_order;
use crate::types::{DivisionStandings, MagicElim, ScopeView, StandingsRow, WeekNumber};
use tracing::debug;

/// Magic number for a team inside the playoff line, or elimination number
/// for a team outside it.
///
/// `race_wins` holds the wins of every team in the division or pool, in race
/// order.
pub fn magic_or_elim(
    team_wins: u32,
    in_playoff_position: bool,
    race_wins: &[u32],
    slots: usize,
    remaining_weeks: u32,
) -> MagicElim {
    let team_wins = team_wins as i64;
    let remaining = remaining_weeks as i64;

    if in_playoff_position {
        // Nobody outside the line to catch up
        let Some(&cutoff_wins) = race_wins.get(slots) else {
            return MagicElim::Clinched;
        };

        let magic = cutoff_wins as i64 + remaining + 1 - team_wins;
        if magic <= 0 {
            MagicElim::Clinched
        } else {
            MagicElim::Number(magic as u32)
        }
    } else {
        let Some(&playoff_wins) = slots.checked_sub(1).and_then(|index| race_wins.get(index)) else {
            return MagicElim::NotApplicable;
        };

        let max_possible_wins = team_wins + remaining;
        let elim = max_possible_wins + 1 - playoff_wins as i64 - 1;
        if elim <= 0 {
            MagicElim::Eliminated
        } else {
            MagicElim::Number(elim as u32)
        }
    }
}

/// Fills `magic_elim` on every row of a ranked table
pub struct MagicCalculator {
    format: Option<PlayoffFormat>,
    current_week: WeekNumber,
}

impl MagicCalculator {
    pub fn new(format: Option<PlayoffFormat>, current_week: WeekNumber) -> Self {
        Self { format, current_week }
    }

    /// Weeks left to play, or `None` when magic numbers do not apply
    fn remaining_weeks(&self, view: &ScopeView) -> Option<(PlayoffFormat, u32)> {
        if view.is_all_time() || self.current_week == 0 {
            return None;
        }

        let Some(format) = self.format else {
            debug!("No playoff format for {:?}, magic numbers not applicable", view);
            return None;
        };

        let remaining = format.remaining_weeks(self.current_week);
        if remaining <= 0 {
            return None;
        }

        Some((format, remaining as u32))
    }

    /// Divisions must already be sorted and ranked
    pub fn apply(&self, divisions: &mut [DivisionStandings], view: &ScopeView) {
        for row in divisions.iter_mut().flat_map(|division| division.rows.iter_mut()) {
            row.magic_elim = MagicElim::NotApplicable;
        }

        let Some((format, remaining)) = self.remaining_weeks(view) else {
            return;
        };
        let slots = format.slot_count() as usize;

        if format.is_overall_bracket() {
            self.apply_overall(divisions, slots, remaining);
        } else {
            for division in divisions.iter_mut() {
                let mut race: Vec<&StandingsRow> = division.rows.iter().collect();
                race.sort_by(|a, b| race_order(a, b));
                let race_wins: Vec<u32> = race.iter().map(|row| row.record.wins).collect();

                for row in division.rows.iter_mut().filter(|row| !row.is_projected()) {
                    let in_position = row.rank as usize <= slots;
                    row.magic_elim =
                        magic_or_elim(row.record.wins, in_position, &race_wins, slots, remaining);
                }
            }
        }
    }

    fn apply_overall(&self, divisions: &mut [DivisionStandings], slots: usize, remaining: u32) {
        let mut pool: Vec<&StandingsRow> =
            divisions.iter().flat_map(|division| division.rows.iter()).collect();
        pool.sort_by(|a, b| race_order(a, b));

        let race_wins: Vec<u32> = pool.iter().map(|row| row.record.wins).collect();
        let positions: Vec<String> = pool.iter().map(|row| row.team.clone()).collect();

        for row in divisions.iter_mut().flat_map(|division| division.rows.iter_mut()) {
            if row.is_projected() {
                continue;
            }
            let Some(index) = positions.iter().position(|team| *team == row.team) else {
                continue;
            };
            row.magic_elim = magic_or_elim(row.record.wins, index < slots, &race_wins, slots, remaining);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayoffSlots;
    use crate::sorting::sort_and_rank;
    use crate::types::{ProjectedLine, ProjectionSource, SortSpec, TeamRecord, WeekCutoff};

    fn row(team: &str, wins: u32, losses: u32, points_for: f64) -> StandingsRow {
        let mut record = TeamRecord::new(team);
        record.wins = wins;
        record.losses = losses;
        record.games = wins + losses;
        record.points_for = points_for;
        StandingsRow::from_record(record)
    }

    fn division(name: &str, mut rows: Vec<StandingsRow>) -> DivisionStandings {
        sort_and_rank(&mut rows, SortSpec::default(), 0.001);
        DivisionStandings { name: name.to_string(), rows }
    }

    fn find<'a>(divisions: &'a [DivisionStandings], team: &str) -> &'a StandingsRow {
        divisions
            .iter()
            .flat_map(|division| division.rows.iter())
            .find(|row| row.team == team)
            .unwrap()
    }

    fn season_view() -> ScopeView {
        ScopeView::Season { season: 2023, cutoff: WeekCutoff::Through(10) }
    }

    const DIVISIONAL: PlayoffFormat =
        PlayoffFormat { regular_season_weeks: 14, slots: PlayoffSlots::PerDivision(2) };

    #[test]
    fn test_magic_number_inside_line() {
        // Cutoff team has 5 wins, 4 weeks left: 5 + 4 + 1 - 8 = 2
        assert_eq!(magic_or_elim(8, true, &[8, 7, 5, 2], 2, 4), MagicElim::Number(2));
        // Already out of reach: 5 + 4 + 1 - 10 <= 0
        assert_eq!(magic_or_elim(10, true, &[10, 7, 5, 2], 2, 4), MagicElim::Clinched);
    }

    #[test]
    fn test_elimination_number_outside_line() {
        // Last team in has 7 wins: 2 + 4 - 7 < 0
        assert_eq!(magic_or_elim(2, false, &[8, 7, 5, 2], 2, 4), MagicElim::Eliminated);
        // 5 + 4 - 7 = 2
        assert_eq!(magic_or_elim(5, false, &[8, 7, 5, 2], 2, 4), MagicElim::Number(2));
        // Exactly reaching the line but not passing it is elimination
        assert_eq!(magic_or_elim(3, false, &[8, 7, 5, 3], 2, 4), MagicElim::Eliminated);
    }

    #[test]
    fn test_no_team_outside_line_is_clinched() {
        assert_eq!(magic_or_elim(1, true, &[3, 1], 2, 4), MagicElim::Clinched);
    }

    #[test]
    fn test_divisional_apply() {
        let mut divisions = vec![division(
            "East",
            vec![row("A", 8, 2, 1300.0), row("B", 7, 3, 1200.0), row("C", 5, 5, 1100.0), row("D", 2, 8, 900.0)],
        )];

        MagicCalculator::new(Some(DIVISIONAL), 10).apply(&mut divisions, &season_view());

        assert_eq!(find(&divisions, "A").magic_elim, MagicElim::Number(2));
        assert_eq!(find(&divisions, "B").magic_elim, MagicElim::Number(3));
        assert_eq!(find(&divisions, "C").magic_elim, MagicElim::Number(2));
        assert_eq!(find(&divisions, "D").magic_elim, MagicElim::Eliminated);
    }

    #[test]
    fn test_season_over_or_preseason_not_applicable() {
        let build = || vec![division("East", vec![row("A", 8, 2, 0.0), row("B", 1, 9, 0.0), row("C", 0, 10, 0.0)])];

        for week in [0, 14, 15] {
            let mut divisions = build();
            MagicCalculator::new(Some(DIVISIONAL), week).apply(&mut divisions, &season_view());
            assert!(divisions[0].rows.iter().all(|row| row.magic_elim == MagicElim::NotApplicable));
        }
    }

    #[test]
    fn test_unknown_format_and_all_time_not_applicable() {
        let mut divisions = vec![division("East", vec![row("A", 8, 2, 0.0), row("B", 1, 9, 0.0)])];
        MagicCalculator::new(None, 10).apply(&mut divisions, &season_view());
        assert_eq!(find(&divisions, "A").magic_elim, MagicElim::NotApplicable);

        MagicCalculator::new(Some(DIVISIONAL), 10).apply(&mut divisions, &ScopeView::AllTime);
        assert_eq!(find(&divisions, "A").magic_elim, MagicElim::NotApplicable);
    }

    #[test]
    fn test_overall_bracket_pools_divisions() {
        let format = PlayoffFormat { regular_season_weeks: 13, slots: PlayoffSlots::Overall(2) };
        let mut divisions = vec![
            division("East", vec![row("A", 9, 1, 0.0), row("B", 8, 2, 0.0)]),
            division("West", vec![row("C", 3, 7, 0.0), row("D", 1, 9, 0.0)]),
        ];

        MagicCalculator::new(Some(format), 10).apply(&mut divisions, &season_view());

        // Pool cutoff is C with 3 wins, 3 weeks left: 3 + 3 + 1 - 9 < 0
        assert_eq!(find(&divisions, "A").magic_elim, MagicElim::Clinched);
        // B: 3 + 3 + 1 - 8 < 0
        assert_eq!(find(&divisions, "B").magic_elim, MagicElim::Clinched);
        // C: 3 + 3 - 8 < 0, even though C ranks first in its division
        assert_eq!(find(&divisions, "C").magic_elim, MagicElim::Eliminated);
    }

    #[test]
    fn test_projected_rows_not_applicable() {
        let mut projected = row("A", 8, 2, 0.0);
        projected.projection = Some(ProjectedLine {
            wins: 11.0,
            losses: 3.0,
            points_for: 0.0,
            points_against: 0.0,
            source: ProjectionSource::LinearFallback,
        });
        let mut divisions = vec![division("East", vec![projected, row("B", 1, 9, 0.0), row("C", 0, 10, 0.0)])];

        MagicCalculator::new(Some(DIVISIONAL), 10).apply(&mut divisions, &season_view());
        assert_eq!(find(&divisions, "A").magic_elim, MagicElim::NotApplicable);
    }
}
