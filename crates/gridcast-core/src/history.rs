// Per-identity season histories built from a finished resolution pass.

use crate::identity::{Identity, Resolution};
use crate::record::{Position, SeasonRecord};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("identity {identity} has more than one season row for {year}")]
    DuplicateSeason { identity: Identity, year: i32 },
}

/// All seasons of one identity, keyed by year.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    pub identity: Identity,
    seasons: BTreeMap<i32, SeasonRecord>,
}

impl History {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            seasons: BTreeMap::new(),
        }
    }

    /// Add a season. A second row for the same year is rejected.
    pub fn insert(&mut self, record: SeasonRecord) -> Result<(), HistoryError> {
        if self.seasons.contains_key(&record.year) {
            return Err(HistoryError::DuplicateSeason {
                identity: self.identity,
                year: record.year,
            });
        }
        self.seasons.insert(record.year, record);
        Ok(())
    }

    pub fn get(&self, year: i32) -> Option<&SeasonRecord> {
        self.seasons.get(&year)
    }

    pub fn len(&self) -> usize {
        self.seasons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seasons.is_empty()
    }

    /// Seasons most recent first.
    pub fn seasons_desc(&self) -> impl Iterator<Item = &SeasonRecord> {
        self.seasons.values().rev()
    }

    pub fn latest(&self) -> Option<&SeasonRecord> {
        self.seasons.values().next_back()
    }

    /// Name, team and position from the most recent season, for reports.
    pub fn display(&self) -> Option<(&str, &str, &Position)> {
        self.latest()
            .map(|r| (r.name.as_str(), r.team.as_str(), &r.position))
    }
}

/// Regroup resolved rows by identity. Unresolved rows are left out.
pub fn assemble(resolution: &Resolution) -> Result<BTreeMap<Identity, History>, HistoryError> {
    let mut histories: BTreeMap<Identity, History> = BTreeMap::new();
    for (identity, record) in resolution.resolved() {
        histories
            .entry(identity)
            .or_insert_with(|| History::new(identity))
            .insert(record.clone())?;
    }
    info!(
        "Assembled {} histories from {} resolved rows",
        histories.len(),
        resolution.resolved_count()
    );
    Ok(histories)
}
