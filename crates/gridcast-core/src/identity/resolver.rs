// Priority-ordered record linkage over season tables.
//
// Tracks, per name, the latest season of every still-distinct athlete with
// that name. Each incoming row is matched against those open keys using the
// rules in `predicates`, tried in this order:
//
//   same_team -> doppelganger -> traded -> special_case_trade -> position_change
//
// The first rule matching exactly one key decides. A row no rule decides is
// reported and left without an identity.

use super::predicates;
use super::sink::{ResolutionEvent, ResolutionSink};
use super::{CandidateKey, Identity, MatchRule, ResolutionError, TradeOverrides};
use crate::record::{SeasonRecord, SeasonTable};
use std::collections::{BTreeMap, HashMap};
use tracing::info;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A successful assignment and the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub identity: Identity,
    pub rule: MatchRule,
}

/// A season row together with its resolution outcome.
#[derive(Debug, Clone)]
pub struct ResolvedRecord {
    pub record: SeasonRecord,
    pub outcome: Result<Assignment, ResolutionError>,
}

impl ResolvedRecord {
    pub fn identity(&self) -> Option<Identity> {
        self.outcome.as_ref().ok().map(|a| a.identity)
    }
}

/// Result of a full resolution pass, in processing order (years ascending,
/// source order within a year).
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub records: Vec<ResolvedRecord>,
    /// Number of identities minted; identities are exactly `0..identity_count`.
    pub identity_count: u32,
}

impl Resolution {
    /// Rows that received an identity.
    pub fn resolved(&self) -> impl Iterator<Item = (Identity, &SeasonRecord)> {
        self.records
            .iter()
            .filter_map(|r| r.identity().map(|id| (id, &r.record)))
    }

    /// Failures in processing order.
    pub fn failures(&self) -> impl Iterator<Item = &ResolutionError> {
        self.records.iter().filter_map(|r| r.outcome.as_ref().err())
    }

    pub fn resolved_count(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_ok()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.records.len() - self.resolved_count()
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// What to do with a row once the rules have been evaluated.
enum Decision {
    /// Carry the identity of the open key at this index into the new season.
    Continue(usize, MatchRule),
    /// Mint a new identity alongside the existing keys.
    Open(MatchRule),
    Fail(ResolutionError),
}

/// Incremental resolver. Feed it rows in ascending year order.
#[derive(Debug, Default)]
pub struct IdentityResolver {
    open_keys: HashMap<String, Vec<CandidateKey>>,
    next_id: u32,
    overrides: TradeOverrides,
}

impl IdentityResolver {
    pub fn new(overrides: TradeOverrides) -> Self {
        Self {
            open_keys: HashMap::new(),
            next_id: 0,
            overrides,
        }
    }

    /// Number of identities minted so far.
    pub fn identity_count(&self) -> u32 {
        self.next_id
    }

    /// Open keys currently held for `name`, oldest update first.
    #[cfg(test)]
    fn open_keys(&self, name: &str) -> &[CandidateKey] {
        self.open_keys.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve one row, updating the open keys for its name on success.
    pub fn assign<S: ResolutionSink>(
        &mut self,
        record: &SeasonRecord,
        sink: &mut S,
    ) -> Result<Assignment, ResolutionError> {
        let keys = self.open_keys.entry(record.name.clone()).or_default();
        let decision = if keys.is_empty() {
            Decision::Open(MatchRule::FirstSighting)
        } else {
            decide(record, keys, &self.overrides)
        };

        match decision {
            Decision::Open(rule) => {
                let identity = Identity(self.next_id);
                self.next_id += 1;
                keys.push(CandidateKey {
                    year: record.year,
                    team: record.team.clone(),
                    identity,
                    name: record.name.clone(),
                    position: record.position.clone(),
                });
                sink.on_event(ResolutionEvent::Opened {
                    name: record.name.clone(),
                    team: record.team.clone(),
                    year: record.year,
                    identity,
                    rule,
                });
                Ok(Assignment { identity, rule })
            }
            Decision::Continue(index, rule) => {
                let old = keys.remove(index);
                let identity = old.identity;
                sink.on_event(ResolutionEvent::Linked {
                    name: record.name.clone(),
                    team: record.team.clone(),
                    year: record.year,
                    identity,
                    rule,
                    from_team: old.team.clone(),
                    from_year: old.year,
                });
                // Only year and team move forward; the key keeps the position
                // it was opened with.
                keys.push(CandidateKey {
                    year: record.year,
                    team: record.team.clone(),
                    ..old
                });
                Ok(Assignment { identity, rule })
            }
            Decision::Fail(error) => {
                sink.on_event(ResolutionEvent::Unresolved {
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }
}

fn decide(record: &SeasonRecord, keys: &[CandidateKey], overrides: &TradeOverrides) -> Decision {
    if let Some(i) = unique_match(keys, |k| predicates::same_team(record, k)) {
        return Decision::Continue(i, MatchRule::SameTeam);
    }

    // Only trusted while a single athlete holds the name; with two or more
    // open keys a new same-name row is more likely one of them moving.
    if keys.len() == 1 && unique_match(keys, |k| predicates::doppelganger(record, k)).is_some() {
        return Decision::Open(MatchRule::Doppelganger);
    }

    if let Some(i) = unique_match(keys, |k| predicates::traded(record, k)) {
        return Decision::Continue(i, MatchRule::Traded);
    }

    if let Some(source) = overrides.get(&record.name, &record.team, record.year) {
        return match keys
            .iter()
            .position(|k| predicates::special_case_trade(record, source, k))
        {
            Some(i) => Decision::Continue(i, MatchRule::SpecialCaseTrade),
            None => Decision::Fail(ResolutionError::OverrideNotFound {
                name: record.name.clone(),
                team: record.team.clone(),
                year: record.year,
                old_team: source.team.clone(),
                old_year: source.year,
            }),
        };
    }

    if let Some(i) = unique_match(keys, |k| predicates::position_change(record, k)) {
        return Decision::Continue(i, MatchRule::PositionChange);
    }

    Decision::Fail(ResolutionError::AmbiguousIdentity {
        name: record.name.clone(),
        team: record.team.clone(),
        position: record.position.code().to_string(),
        year: record.year,
        open_keys: keys.len(),
    })
}

/// Index of the only key satisfying `pred`, or `None` for zero or several.
fn unique_match<F>(keys: &[CandidateKey], pred: F) -> Option<usize>
where
    F: Fn(&CandidateKey) -> bool,
{
    let mut found = None;
    for (i, key) in keys.iter().enumerate() {
        if pred(key) {
            if found.is_some() {
                return None;
            }
            found = Some(i);
        }
    }
    found
}

/// Resolve every row of every season, years ascending.
///
/// Rows are resolved against their own `year` field; the ingester keeps that
/// consistent with the table's year.
pub fn resolve<S: ResolutionSink>(
    seasons: BTreeMap<i32, SeasonTable>,
    overrides: TradeOverrides,
    mut sink: S,
) -> Resolution {
    let mut resolver = IdentityResolver::new(overrides);
    let mut records = Vec::with_capacity(seasons.values().map(SeasonTable::len).sum());

    for (year, table) in seasons {
        let before = records.len();
        for record in table.records {
            let outcome = resolver.assign(&record, &mut sink);
            records.push(ResolvedRecord { record, outcome });
        }
        info!(
            "Resolved season {year}: {} rows, {} identities so far",
            records.len() - before,
            resolver.identity_count()
        );
    }

    let resolution = Resolution {
        records,
        identity_count: resolver.identity_count(),
    };
    info!(
        "Identity resolution complete: {} of {} rows assigned to {} identities, {} unresolved",
        resolution.resolved_count(),
        resolution.records.len(),
        resolution.identity_count,
        resolution.failure_count()
    );
    resolution
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
