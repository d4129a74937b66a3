//! Terminal rendering for standings, streaks and the record book

use colored::*;
use standings_engine::records::{GameEntry, StreakEntry};
use standings_engine::{MagicElim, RecordBook, ScopeView, StandingsRow, StandingsTable, Streak, StreakKind, WeekCutoff};
use standings_engine::types::streak_display;

pub fn print_standings(table: &StandingsTable) {
    println!("{}", title(&table.scope.view).cyan().bold());
    if table.team_count() == 0 {
        println!("  {}", "No teams in scope".dimmed());
        return;
    }

    let all_time = table.scope.view.is_all_time();
    let extra = if all_time { "Overall" } else { "Playoff%" };

    for division in &table.divisions {
        println!();
        if !division.name.is_empty() {
            println!("{}", division.name.bold());
        }
        println!(
            "  {}",
            format!(
                "{:>3}  {:<24} {:>6} {:>6} {:>6} {:>9} {:>9} {:>8} {:>5} {:>9} {:>4}",
                "#", "Team", "W", "L", "Pct", "PF", "PA", "Diff", "Strk", extra, "M/E"
            )
            .dimmed()
        );

        for row in &division.rows {
            print_row(row, all_time);
        }
    }
    println!();
}

fn print_row(row: &StandingsRow, all_time: bool) {
    let (wins, losses) = match &row.projection {
        Some(line) => (format!("{:.1}", line.wins), format!("{:.1}", line.losses)),
        None => (row.record.wins.to_string(), row.record.losses.to_string()),
    };

    let extra = if all_time {
        row.overall_record.map(|record| record.to_string()).unwrap_or_else(|| "-".to_string())
    } else {
        row.playoff_pct.map(|pct| format!("{pct:.1}")).unwrap_or_else(|| "-".to_string())
    };

    let diff = row.point_differential();
    let diff = format!("{diff:>+8.1}");
    let diff = if row.point_differential() >= 0.0 { diff.green() } else { diff.red() };

    println!(
        "  {:>3}  {:<24} {:>6} {:>6} {:>6.3} {:>9.1} {:>9.1} {} {} {:>9} {}",
        row.rank,
        row.team,
        wins,
        losses,
        row.win_pct(),
        row.points_for(),
        row.points_against(),
        diff,
        streak_cell(row.record.current_streak, format!("{:>5}", row.streak_display)),
        extra,
        magic_cell(row.magic_elim),
    );
}

fn title(view: &ScopeView) -> String {
    match view {
        ScopeView::Season { season, cutoff: WeekCutoff::All } => format!("{season} Standings"),
        ScopeView::Season { season, cutoff: WeekCutoff::Through(week) } => {
            format!("{season} Standings through Week {week}")
        }
        ScopeView::AllTime => "All-Time Standings".to_string(),
        ScopeView::WeekAcrossSeasons { week } => format!("All-Time Week {week} Standings"),
    }
}

fn streak_cell(streak: Option<Streak>, cell: String) -> ColoredString {
    match streak.map(|s| s.kind) {
        Some(StreakKind::Win) => cell.green(),
        Some(StreakKind::Loss) => cell.red(),
        None => cell.dimmed(),
    }
}

fn magic_cell(magic: MagicElim) -> ColoredString {
    let cell = format!("{:>4}", magic.to_string());
    match magic {
        MagicElim::Clinched => cell.green().bold(),
        MagicElim::Eliminated => cell.red(),
        MagicElim::Number(_) => cell.yellow(),
        MagicElim::NotApplicable => cell.dimmed(),
    }
}

pub fn print_record_book(book: &RecordBook) {
    println!("{}", "Record Book".cyan().bold());

    print_streaks("Longest Win Streaks", &book.longest_win_streaks);
    print_streaks("Longest Losing Streaks", &book.longest_loss_streaks);
    print_streaks("Longest High-Score Streaks", &book.longest_high_score_streaks);
    print_streaks("Longest Low-Score Streaks", &book.longest_low_score_streaks);
    print_games("Highest Scores", &book.highest_scores);
    print_games("Lowest Scores", &book.lowest_scores);
    print_games("Largest Margins of Victory", &book.largest_margins);
}

fn print_streaks(heading: &str, entries: &[StreakEntry]) {
    println!();
    println!("{}", heading.bold());
    if entries.is_empty() {
        println!("  {}", "None".dimmed());
    }
    for (index, entry) in entries.iter().enumerate() {
        println!("  {:>2}. {:<24} {}", index + 1, entry.team, entry.length.to_string().yellow());
    }
}

fn print_games(heading: &str, entries: &[GameEntry]) {
    println!();
    println!("{}", heading.bold());
    if entries.is_empty() {
        println!("  {}", "None".dimmed());
    }
    for (index, entry) in entries.iter().enumerate() {
        println!(
            "  {:>2}. {:<24} {:>7.2}  vs {:<24} {} Week {}",
            index + 1,
            entry.team,
            entry.value,
            entry.opponent,
            entry.season,
            entry.week
        );
    }
}

pub fn print_streak(team: &str, streak: Option<Streak>) {
    println!("{}: {}", team.bold(), streak_cell(streak, streak_display(streak)));
}
