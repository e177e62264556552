// Season records: one athlete-season row as handed over by the ingester.

use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Fantasy position code from the `FantasyFantPos` column.
///
/// Only the four skill positions get their own variant; anything else
/// (including an empty cell) is kept verbatim so that equality between two
/// seasons still means "same code in the source table".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    Other(String),
}

impl Position {
    /// Parse a position code. Matching is case-insensitive and ignores
    /// surrounding whitespace.
    pub fn from_code(code: &str) -> Self {
        let code = code.trim();
        match code.to_uppercase().as_str() {
            "QB" => Position::QB,
            "RB" => Position::RB,
            "WR" => Position::WR,
            "TE" => Position::TE,
            _ => Position::Other(code.to_string()),
        }
    }

    /// Return the code as it appears in the source tables.
    pub fn code(&self) -> &str {
        match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::Other(code) => code,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Counting stats carried by every season row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stat {
    GamesPlayed,
    GamesStarted,
    Completions,
    PassAttempts,
    PassYards,
    PassTds,
    Interceptions,
    RushAttempts,
    RushYards,
    RushTds,
    Receptions,
    RecYards,
    RecTds,
}

impl Stat {
    pub const ALL: [Stat; 13] = [
        Stat::GamesPlayed,
        Stat::GamesStarted,
        Stat::Completions,
        Stat::PassAttempts,
        Stat::PassYards,
        Stat::PassTds,
        Stat::Interceptions,
        Stat::RushAttempts,
        Stat::RushYards,
        Stat::RushTds,
        Stat::Receptions,
        Stat::RecYards,
        Stat::RecTds,
    ];

    /// Column name in the season tables.
    pub fn column(&self) -> &'static str {
        match self {
            Stat::GamesPlayed => "G",
            Stat::GamesStarted => "GS",
            Stat::Completions => "PassingCmp",
            Stat::PassAttempts => "PassingAtt",
            Stat::PassYards => "PassingYds",
            Stat::PassTds => "PassingTD",
            Stat::Interceptions => "PassingInt",
            Stat::RushAttempts => "RushingAtt",
            Stat::RushYards => "RushingYds",
            Stat::RushTds => "RushingTD",
            Stat::Receptions => "ReceivingRec",
            Stat::RecYards => "ReceivingYds",
            Stat::RecTds => "ReceivingTD",
        }
    }

    /// Feature name used for the tracked matrix columns.
    pub fn feature_name(&self) -> &'static str {
        match self {
            Stat::GamesPlayed => "games_played",
            Stat::GamesStarted => "games_started",
            Stat::Completions => "completions",
            Stat::PassAttempts => "pass_attempts",
            Stat::PassYards => "pass_yards",
            Stat::PassTds => "pass_tds",
            Stat::Interceptions => "interceptions",
            Stat::RushAttempts => "rush_attempts",
            Stat::RushYards => "rush_yards",
            Stat::RushTds => "rush_tds",
            Stat::Receptions => "rec_receptions",
            Stat::RecYards => "rec_yards",
            Stat::RecTds => "rec_tds",
        }
    }
}

/// One season's counting stats. `None` means the cell was empty or
/// non-numeric, which is distinct from a recorded zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatLine {
    pub games_played: Option<f64>,
    pub games_started: Option<f64>,
    pub completions: Option<f64>,
    pub pass_attempts: Option<f64>,
    pub pass_yards: Option<f64>,
    pub pass_tds: Option<f64>,
    pub interceptions: Option<f64>,
    pub rush_attempts: Option<f64>,
    pub rush_yards: Option<f64>,
    pub rush_tds: Option<f64>,
    pub receptions: Option<f64>,
    pub rec_yards: Option<f64>,
    pub rec_tds: Option<f64>,
}

impl StatLine {
    pub fn get(&self, stat: Stat) -> Option<f64> {
        *self.slot(stat)
    }

    pub fn set(&mut self, stat: Stat, value: Option<f64>) {
        *self.slot_mut(stat) = value;
    }

    fn slot(&self, stat: Stat) -> &Option<f64> {
        match stat {
            Stat::GamesPlayed => &self.games_played,
            Stat::GamesStarted => &self.games_started,
            Stat::Completions => &self.completions,
            Stat::PassAttempts => &self.pass_attempts,
            Stat::PassYards => &self.pass_yards,
            Stat::PassTds => &self.pass_tds,
            Stat::Interceptions => &self.interceptions,
            Stat::RushAttempts => &self.rush_attempts,
            Stat::RushYards => &self.rush_yards,
            Stat::RushTds => &self.rush_tds,
            Stat::Receptions => &self.receptions,
            Stat::RecYards => &self.rec_yards,
            Stat::RecTds => &self.rec_tds,
        }
    }

    fn slot_mut(&mut self, stat: Stat) -> &mut Option<f64> {
        match stat {
            Stat::GamesPlayed => &mut self.games_played,
            Stat::GamesStarted => &mut self.games_started,
            Stat::Completions => &mut self.completions,
            Stat::PassAttempts => &mut self.pass_attempts,
            Stat::PassYards => &mut self.pass_yards,
            Stat::PassTds => &mut self.pass_tds,
            Stat::Interceptions => &mut self.interceptions,
            Stat::RushAttempts => &mut self.rush_attempts,
            Stat::RushYards => &mut self.rush_yards,
            Stat::RushTds => &mut self.rush_tds,
            Stat::Receptions => &mut self.receptions,
            Stat::RecYards => &mut self.rec_yards,
            Stat::RecTds => &mut self.rec_tds,
        }
    }
}

// ---------------------------------------------------------------------------
// Season records and tables
// ---------------------------------------------------------------------------

/// One athlete-season observation.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonRecord {
    pub name: String,
    pub team: String,
    pub position: Position,
    pub year: i32,
    pub age: Option<f64>,
    pub stats: StatLine,
}

impl SeasonRecord {
    pub fn new(name: impl Into<String>, team: impl Into<String>, position: Position, year: i32) -> Self {
        Self {
            name: name.into(),
            team: team.into(),
            position,
            year,
            age: None,
            stats: StatLine::default(),
        }
    }

    pub fn with_age(mut self, age: f64) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_stat(mut self, stat: Stat, value: f64) -> Self {
        self.stats.set(stat, Some(value));
        self
    }
}

/// All rows read for one season, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonTable {
    /// Where the rows came from (file path or fixture label).
    pub source: String,
    pub year: i32,
    pub records: Vec<SeasonRecord>,
}

impl SeasonTable {
    pub fn new(source: impl Into<String>, year: i32, records: Vec<SeasonRecord>) -> Self {
        Self {
            source: source.into(),
            year,
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
