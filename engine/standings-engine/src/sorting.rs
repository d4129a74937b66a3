//! Tie-break sorting
//!
//! Win percentage is the only key with a secondary tie-break: rows whose win
//! percentages fall within the tolerance of the first row of their group are
//! ordered by point differential, higher first. Every other key keeps the
//! incoming order for ties.

use crate::types::{SortDirection, SortKey, SortSpec, StandingsRow};
use std::cmp::Ordering;

/// Sort rows in place and assign 1-based ranks
pub fn sort_and_rank(rows: &mut [StandingsRow], spec: SortSpec, win_pct_tolerance: f64) {
    sort_rows(rows, spec, win_pct_tolerance);
    assign_ranks(rows);
}

/// Sort rows in place by `spec`. Ranks are left untouched.
pub fn sort_rows(rows: &mut [StandingsRow], spec: SortSpec, win_pct_tolerance: f64) {
    rows.sort_by(|a, b| directed(compare(a, b, spec.key), spec.direction));

    if spec.key == SortKey::WinPct {
        break_win_pct_ties(rows, win_pct_tolerance);
    }
}

pub fn assign_ranks(rows: &mut [StandingsRow]) {
    for (index, row) in rows.iter_mut().enumerate() {
        row.rank = index as u32 + 1;
    }
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Ascending comparison on the key alone
fn compare(a: &StandingsRow, b: &StandingsRow, key: SortKey) -> Ordering {
    match key {
        SortKey::TeamName => a.team.cmp(&b.team),
        SortKey::Wins => a.wins_value().total_cmp(&b.wins_value()),
        SortKey::Losses => a.losses_value().total_cmp(&b.losses_value()),
        SortKey::WinPct => a.win_pct().total_cmp(&b.win_pct()),
        // No odds sorts below any odds
        SortKey::PlayoffPct => match (playoff_column(a), playoff_column(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        },
        SortKey::PointsFor => a.points_for().total_cmp(&b.points_for()),
        SortKey::PointsAgainst => a.points_against().total_cmp(&b.points_against()),
        SortKey::PointDifferential => a.point_differential().total_cmp(&b.point_differential()),
    }
}

/// The playoff column; season-spanning rows show their overall record there
fn playoff_column(row: &StandingsRow) -> Option<f64> {
    row.playoff_pct.or_else(|| row.overall_record.map(|record| record.win_pct() * 100.0))
}

/// Regroup rows already sorted by win percentage into tolerance clusters and
/// order each cluster by point differential, descending
fn break_win_pct_ties(rows: &mut [StandingsRow], tolerance: f64) {
    let mut start = 0;

    while start < rows.len() {
        let anchor = rows[start].win_pct();
        let mut end = start + 1;
        while end < rows.len() && (rows[end].win_pct() - anchor).abs() < tolerance {
            end += 1;
        }

        if end - start > 1 {
            rows[start..end]
                .sort_by(|a, b| b.point_differential().total_cmp(&a.point_differential()));
        }

        start = end;
    }
}

/// Order used by the playoff race: wins, then win percentage, then points for,
/// all descending
pub fn race_order(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    b.record
        .wins
        .cmp(&a.record.wins)
        .then_with(|| b.record.win_pct().total_cmp(&a.record.win_pct()))
        .then_with(|| b.record.points_for.total_cmp(&a.record.points_for))
}

/// Order used for projected rows: wins, then win percentage, then point
/// differential, all descending
pub fn projected_order(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    b.wins_value()
        .total_cmp(&a.wins_value())
        .then_with(|| b.win_pct().total_cmp(&a.win_pct()))
        .then_with(|| b.point_differential().total_cmp(&a.point_differential()))
}
