// Identity resolution: linking season rows to stable athlete identities.

pub mod predicates;
pub mod resolver;
pub mod sink;

use crate::record::Position;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

pub use resolver::{resolve, Assignment, IdentityResolver, Resolution, ResolvedRecord};
pub use sink::{ResolutionEvent, ResolutionSink, TracingSink};

// ---------------------------------------------------------------------------
// Identity and candidate keys
// ---------------------------------------------------------------------------

/// Stable key for one real-world athlete. Assigned once, densely from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Identity(pub u32);

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Most recently seen season of one still-open identity sharing a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateKey {
    pub year: i32,
    pub team: String,
    pub identity: Identity,
    pub name: String,
    pub position: Position,
}

impl fmt::Display for CandidateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} ({} {} {})",
            self.identity, self.name, self.team, self.position, self.year
        )
    }
}

/// Which rule produced an identity assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchRule {
    FirstSighting,
    SameTeam,
    Doppelganger,
    Traded,
    SpecialCaseTrade,
    PositionChange,
}


// ---------------------------------------------------------------------------
// Trade overrides
// ---------------------------------------------------------------------------

/// The season an overridden trade moves a player away from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TradeSource {
    pub team: String,
    pub year: i32,
}

/// Operator-supplied table for trades the heuristics cannot disambiguate:
/// `(name, new_team, new_year) -> (old_team, old_year)`.
#[derive(Debug, Clone, Default)]
pub struct TradeOverrides {
    entries: HashMap<(String, String, i32), TradeSource>,
}

impl TradeOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        new_team: impl Into<String>,
        new_year: i32,
        old_team: impl Into<String>,
        old_year: i32,
    ) {
        self.entries.insert(
            (name.into(), new_team.into(), new_year),
            TradeSource {
                team: old_team.into(),
                year: old_year,
            },
        );
    }

    pub fn get(&self, name: &str, team: &str, year: i32) -> Option<&TradeSource> {
        self.entries
            .get(&(name.to_string(), team.to_string(), year))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Per-record resolution failure. Never aborts the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionError {
    #[error(
        "could not assign {year} {name} {team} {position}: no rule matched exactly one of {open_keys} open keys"
    )]
    AmbiguousIdentity {
        name: String,
        team: String,
        position: String,
        year: i32,
        open_keys: usize,
    },

    #[error("trade override for {name} ({team}, {year}) names {old_team} {old_year}, which has no open key")]
    OverrideNotFound {
        name: String,
        team: String,
        year: i32,
        old_team: String,
        old_year: i32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_lookup_by_name_team_and_year() {
        let mut overrides = TradeOverrides::new();
        overrides.insert("Zach Miller", "SEA", 2011, "OAK", 2010);

        let source = overrides.get("Zach Miller", "SEA", 2011).unwrap();
        assert_eq!(source.team, "OAK");
        assert_eq!(source.year, 2010);
        assert!(overrides.get("Zach Miller", "SEA", 2012).is_none());
        assert!(overrides.get("Zach Miller", "JAX", 2011).is_none());
        assert_eq!(overrides.len(), 1);
    }

    #[test]
    fn errors_render_with_context() {
        let err = ResolutionError::OverrideNotFound {
            name: "Zach Miller".into(),
            team: "SEA".into(),
            year: 2011,
            old_team: "OAK".into(),
            old_year: 2010,
        };
        let msg = err.to_string();
        assert!(msg.contains("Zach Miller"));
        assert!(msg.contains("OAK 2010"));
    }
}
