// Matching rules between an incoming season row and an open candidate key.
//
// Each rule is a pure function of the record and one key. The resolver
// evaluates them in a fixed priority order and accepts a rule only when it
// matches exactly one open key.

use super::{CandidateKey, TradeSource};
use crate::record::SeasonRecord;

/// Same name, team and position in an earlier season: one more year for the
/// same athlete.
pub fn same_team(record: &SeasonRecord, key: &CandidateKey) -> bool {
    key.year < record.year
        && key.team == record.team
        && key.name == record.name
        && key.position == record.position
}

/// A second athlete sharing the name: either seen this same season on another
/// team (two Adrian Petersons), or seen earlier on another team at another
/// position (Alex Smith TE vs QB).
pub fn doppelganger(record: &SeasonRecord, key: &CandidateKey) -> bool {
    key.name == record.name
        && key.team != record.team
        && (key.year == record.year || (key.year < record.year && key.position != record.position))
}

/// Earlier season at the same position on a different team: probably traded.
pub fn traded(record: &SeasonRecord, key: &CandidateKey) -> bool {
    key.year < record.year && key.team != record.team && key.position == record.position
}

/// The key an override entry points at, provided it lies in an earlier
/// season than the row. The name is implied by the open-key list the key was
/// taken from.
pub fn special_case_trade(record: &SeasonRecord, source: &TradeSource, key: &CandidateKey) -> bool {
    key.year < record.year && key.team == source.team && key.year == source.year
}

/// Earlier season on the same team at a different position
/// (Steve Slaton 2008 RB -> 2009 WR).
pub fn position_change(record: &SeasonRecord, key: &CandidateKey) -> bool {
    key.year < record.year
        && key.team == record.team
        && key.name == record.name
        && key.position != record.position
}
