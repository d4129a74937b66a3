//! Core types shared across the standings pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

/// Season year (e.g. 2023)
pub type SeasonYear = u16;

/// Week number within a season, 1-based. Week 0 is pre-season.
pub type WeekNumber = u8;

/// Which part of the fantasy season a game belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SeasonPeriod {
    #[default]
    Regular,
    Playoff,
    Championship,
    Consolation,
    Other(String),
}

impl SeasonPeriod {
    /// Parse a period label as it appears in historical logs
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "regular" | "regular season" | "reg" => SeasonPeriod::Regular,
            "playoff" | "playoffs" | "post" | "postseason" => SeasonPeriod::Playoff,
            "championship" | "final" | "finals" => SeasonPeriod::Championship,
            "consolation" | "toilet bowl" => SeasonPeriod::Consolation,
            _ => SeasonPeriod::Other(raw.trim().to_string()),
        }
    }

    pub fn is_regular(&self) -> bool {
        matches!(self, SeasonPeriod::Regular)
    }
}

/// Which scoring universe an aggregation reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ScoreMode {
    /// Starting lineup scores
    #[default]
    Starters,
    /// Bench scores
    Bench,
}

/// The three numbers one game contributes under a score mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreLine {
    pub team_score: f64,
    pub opponent_score: f64,
    pub score_diff: f64,
}

impl ScoreLine {
    /// `score_diff` is the source of truth for the result, not the two scores
    pub fn is_win(&self) -> bool {
        self.score_diff > 0.0
    }
}

/// One team's view of one matchup. Every matchup appears twice in the log,
/// once per side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// Larger for more recent games
    pub game_id: u64,
    pub season: SeasonYear,
    pub week: WeekNumber,
    pub team: String,
    pub opponent: String,
    /// `None` until the game has been played
    pub team_score: Option<f64>,
    pub opponent_score: Option<f64>,
    pub score_diff: Option<f64>,
    pub bench_score: Option<f64>,
    pub opponent_bench_score: Option<f64>,
    pub bench_score_diff: Option<f64>,
    pub period: SeasonPeriod,
}

impl Game {
    /// Whether either side is the bye placeholder
    pub fn involves_bye(&self, bye_team: &str) -> bool {
        self.team == bye_team || self.opponent == bye_team
    }

    /// The score line for `mode`, or `None` if any of the three fields is
    /// missing or not a finite number
    pub fn line(&self, mode: ScoreMode) -> Option<ScoreLine> {
        let (team_score, opponent_score, score_diff) = match mode {
            ScoreMode::Starters => (self.team_score?, self.opponent_score?, self.score_diff?),
            ScoreMode::Bench => {
                (self.bench_score?, self.opponent_bench_score?, self.bench_score_diff?)
            }
        };

        if !(team_score.is_finite() && opponent_score.is_finite() && score_diff.is_finite()) {
            return None;
        }

        Some(ScoreLine { team_score, opponent_score, score_diff })
    }

    /// Chronological sort key: season, then week, then game id
    pub fn chronological_key(&self) -> (SeasonYear, WeekNumber, u64) {
        (self.season, self.week, self.game_id)
    }
}

/// How far into a season a season-scoped query looks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeekCutoff {
    /// Every week of the season
    All,
    /// Weeks up to and including this one
    Through(WeekNumber),
}

impl WeekCutoff {
    pub fn includes(&self, week: WeekNumber) -> bool {
        match self {
            WeekCutoff::All => true,
            WeekCutoff::Through(cutoff) => week <= *cutoff,
        }
    }

    pub fn as_week(&self) -> Option<WeekNumber> {
        match self {
            WeekCutoff::All => None,
            WeekCutoff::Through(week) => Some(*week),
        }
    }
}

/// Which games a query covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeView {
    /// One season, optionally capped at a week
    Season { season: SeasonYear, cutoff: WeekCutoff },
    /// Every valid game ever played
    AllTime,
    /// The same week number in every season
    WeekAcrossSeasons { week: WeekNumber },
}

impl ScopeView {
    /// Season-spanning views have no divisions, magic numbers or playoff odds
    pub fn is_all_time(&self) -> bool {
        !matches!(self, ScopeView::Season { .. })
    }

    /// Whether a game belongs to this view
    pub fn contains(&self, game: &Game) -> bool {
        match self {
            ScopeView::Season { season, cutoff } => {
                game.season == *season && cutoff.includes(game.week)
            }
            ScopeView::AllTime => true,
            ScopeView::WeekAcrossSeasons { week } => game.week == *week,
        }
    }
}

/// Column a standings table is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortKey {
    TeamName,
    Wins,
    Losses,
    #[default]
    WinPct,
    PlayoffPct,
    PointsFor,
    PointsAgainst,
    PointDifferential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }
}

/// Everything a standings computation depends on besides the data itself
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryScope {
    pub view: ScopeView,
    pub score_mode: ScoreMode,
    pub sort: SortSpec,
    /// Replace current records with season-end projections in [`StandingsEngine::query`](crate::StandingsEngine::query)
    pub projected: bool,
}

impl QueryScope {
    pub fn new(view: ScopeView) -> Self {
        Self { view, score_mode: ScoreMode::default(), sort: SortSpec::default(), projected: false }
    }

    pub fn season(season: SeasonYear, cutoff: WeekCutoff) -> Self {
        Self::new(ScopeView::Season { season, cutoff })
    }

    pub fn all_time() -> Self {
        Self::new(ScopeView::AllTime)
    }

    pub fn week_across_seasons(week: WeekNumber) -> Self {
        Self::new(ScopeView::WeekAcrossSeasons { week })
    }

    pub fn with_score_mode(self, score_mode: ScoreMode) -> Self {
        Self { score_mode, ..self }
    }

    pub fn with_sort(self, sort: SortSpec) -> Self {
        Self { sort, ..self }
    }

    pub fn with_projection(self, projected: bool) -> Self {
        Self { projected, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreakKind {
    Win,
    Loss,
}

impl StreakKind {
    pub fn from_win(won: bool) -> Self {
        if won {
            StreakKind::Win
        } else {
            StreakKind::Loss
        }
    }
}

/// A run of consecutive identical results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub length: u32,
    pub kind: StreakKind,
}

impl fmt::Display for Streak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.kind {
            StreakKind::Win => "W",
            StreakKind::Loss => "L",
        };
        write!(f, "{}{}", self.length, suffix)
    }
}

/// Display text for an optional streak; no games yet reads "None"
pub fn streak_display(streak: Option<Streak>) -> String {
    match streak {
        Some(streak) => streak.to_string(),
        None => "None".to_string(),
    }
}

/// Longest historical runs for one team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LongestStreaks {
    pub win: u32,
    pub loss: u32,
    /// Consecutive games at or above the high-score threshold
    pub high_score: u32,
    /// Consecutive games below the low-score threshold
    pub low_score: u32,
}

/// Aggregated results for one team over one query scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub team: String,
    pub wins: u32,
    pub losses: u32,
    pub points_for: f64,
    pub points_against: f64,
    pub games: u32,
    pub current_streak: Option<Streak>,
    pub longest_win_streak: u32,
    pub longest_loss_streak: u32,
}

impl TeamRecord {
    /// An empty record; a team without games is a valid zero state
    pub fn new(team: impl Into<String>) -> Self {
        Self {
            team: team.into(),
            wins: 0,
            losses: 0,
            points_for: 0.0,
            points_against: 0.0,
            games: 0,
            current_streak: None,
            longest_win_streak: 0,
            longest_loss_streak: 0,
        }
    }

    pub fn win_pct(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64
        }
    }

    pub fn avg_points_for(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.points_for / self.games as f64
        }
    }

    pub fn avg_points_against(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.points_against / self.games as f64
        }
    }

    pub fn point_differential(&self) -> f64 {
        self.points_for - self.points_against
    }
}

/// Clinch/elimination indicator for one standings row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MagicElim {
    /// Wins still needed to clinch, or wins from elimination
    Number(u32),
    Clinched,
    Eliminated,
    NotApplicable,
}

impl fmt::Display for MagicElim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MagicElim::Number(n) => write!(f, "{n}"),
            MagicElim::Clinched => write!(f, "X"),
            MagicElim::Eliminated => write!(f, "E"),
            MagicElim::NotApplicable => write!(f, "--"),
        }
    }
}

/// Head-to-head record against the whole field, week by week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverallRecord {
    pub wins: u32,
    pub losses: u32,
}

impl OverallRecord {
    pub fn win_pct(&self) -> f64 {
        let total = self.wins + self.losses;
        if total == 0 {
            0.0
        } else {
            self.wins as f64 / total as f64
        }
    }
}

impl fmt::Display for OverallRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.wins, self.losses)
    }
}

/// Where a projected line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionSource {
    Simulation,
    LinearFallback,
}

/// Season-end totals for a projected row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedLine {
    pub wins: f64,
    pub losses: f64,
    pub points_for: f64,
    pub points_against: f64,
    pub source: ProjectionSource,
}

impl ProjectedLine {
    pub fn win_pct(&self) -> f64 {
        let games = self.wins + self.losses;
        if games <= 0.0 {
            0.0
        } else {
            self.wins / games
        }
    }
}

/// One line of a standings table, ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub team: String,
    /// Empty for season-spanning views
    pub division: String,
    /// 1-based within the division
    pub rank: u32,
    pub record: TeamRecord,
    pub streak_display: String,
    pub playoff_pct: Option<f64>,
    pub magic_elim: MagicElim,
    /// Only set for season-spanning views
    pub overall_record: Option<OverallRecord>,
    pub projection: Option<ProjectedLine>,
}

impl StandingsRow {
    pub fn from_record(record: TeamRecord) -> Self {
        Self {
            team: record.team.clone(),
            division: String::new(),
            rank: 0,
            streak_display: streak_display(record.current_streak),
            record,
            playoff_pct: None,
            magic_elim: MagicElim::NotApplicable,
            overall_record: None,
            projection: None,
        }
    }

    pub fn is_projected(&self) -> bool {
        self.projection.is_some()
    }

    pub fn wins_value(&self) -> f64 {
        match &self.projection {
            Some(line) => line.wins,
            None => self.record.wins as f64,
        }
    }

    pub fn losses_value(&self) -> f64 {
        match &self.projection {
            Some(line) => line.losses,
            None => self.record.losses as f64,
        }
    }

    pub fn win_pct(&self) -> f64 {
        match &self.projection {
            Some(line) => line.win_pct(),
            None => self.record.win_pct(),
        }
    }

    pub fn points_for(&self) -> f64 {
        match &self.projection {
            Some(line) => line.points_for,
            None => self.record.points_for,
        }
    }

    pub fn points_against(&self) -> f64 {
        match &self.projection {
            Some(line) => line.points_against,
            None => self.record.points_against,
        }
    }

    pub fn point_differential(&self) -> f64 {
        self.points_for() - self.points_against()
    }
}

/// Ordered rows of one division
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionStandings {
    pub name: String,
    pub rows: Vec<StandingsRow>,
}

/// Output of one standings query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsTable {
    pub scope: QueryScope,
    /// Ordered by division name
    pub divisions: Vec<DivisionStandings>,
}

impl StandingsTable {
    pub fn rows(&self) -> impl Iterator<Item = &StandingsRow> {
        self.divisions.iter().flat_map(|division| division.rows.iter())
    }

    pub fn find(&self, team: &str) -> Option<&StandingsRow> {
        self.rows().find(|row| row.team == team)
    }

    pub fn team_count(&self) -> usize {
        self.divisions.iter().map(|division| division.rows.len()).sum()
    }
}
