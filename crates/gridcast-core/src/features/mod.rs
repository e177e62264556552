// Feature engineering: fantasy scoring, history windowing, matrix assembly.

pub mod matrix;
pub mod scoring;
pub mod windower;

use crate::identity::Identity;
use crate::record::Stat;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

pub use matrix::{FeatureMatrix, IdentifierRow};
pub use windower::{featurize, forecast_instance, split_observations, window_all, PlayerFeatures};

// ---------------------------------------------------------------------------
// Feature names
// ---------------------------------------------------------------------------

/// Features taken once from the anchor season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FixedFeature {
    Age,
    IsQB,
    IsRB,
    IsWR,
    IsTE,
}

impl FixedFeature {
    pub const ALL: [FixedFeature; 5] = [
        FixedFeature::Age,
        FixedFeature::IsQB,
        FixedFeature::IsRB,
        FixedFeature::IsWR,
        FixedFeature::IsTE,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FixedFeature::Age => "age",
            FixedFeature::IsQB => "isQB",
            FixedFeature::IsRB => "isRB",
            FixedFeature::IsWR => "isWR",
            FixedFeature::IsTE => "isTE",
        }
    }
}

/// Features replicated once per season offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrackedFeature {
    Stat(Stat),
    FantasyPoints,
}

impl TrackedFeature {
    /// Every tracked feature: the raw stats in table order, then fantasy points.
    pub fn all() -> impl Iterator<Item = TrackedFeature> {
        Stat::ALL
            .into_iter()
            .map(TrackedFeature::Stat)
            .chain(std::iter::once(TrackedFeature::FantasyPoints))
    }

    pub fn name(&self) -> &'static str {
        match self {
            TrackedFeature::Stat(stat) => stat.feature_name(),
            TrackedFeature::FantasyPoints => "fantasy_points",
        }
    }
}

/// One matrix column.
///
/// Columns order by feature name, then offset, with fixed features (no
/// offset) ahead of any tracked column sharing the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKey {
    Fixed(FixedFeature),
    Tracked(TrackedFeature, u32),
}

impl FeatureKey {
    pub fn name(&self) -> &'static str {
        match self {
            FeatureKey::Fixed(f) => f.name(),
            FeatureKey::Tracked(f, _) => f.name(),
        }
    }

    pub fn offset(&self) -> Option<u32> {
        match self {
            FeatureKey::Fixed(_) => None,
            FeatureKey::Tracked(_, offset) => Some(*offset),
        }
    }

    /// Column header: `age`, `pass_tds_0`, ...
    pub fn column_name(&self) -> String {
        match self {
            FeatureKey::Fixed(f) => f.name().to_string(),
            FeatureKey::Tracked(f, offset) => format!("{}_{offset}", f.name()),
        }
    }
}

impl Ord for FeatureKey {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.name(), self.offset()).cmp(&(other.name(), other.offset()))
    }
}

impl PartialOrd for FeatureKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.column_name())
    }
}

// ---------------------------------------------------------------------------
// Feature instances
// ---------------------------------------------------------------------------

/// One training (or forecast) row: an identity's history re-anchored at
/// `delta` seasons back. Offset 0 of the tracked features is the season the
/// row predicts.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureInstance {
    pub identity: Identity,
    pub delta: u32,
    pub values: BTreeMap<FeatureKey, f64>,
}

impl FeatureInstance {
    pub fn get(&self, key: FeatureKey) -> Option<f64> {
        self.values.get(&key).copied()
    }

    /// Tracked offsets present in this instance, ascending.
    pub fn offsets(&self) -> Vec<u32> {
        let mut offsets: Vec<u32> = self.values.keys().filter_map(FeatureKey::offset).collect();
        offsets.sort_unstable();
        offsets.dedup();
        offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_sort_by_name_then_offset() {
        let mut keys = vec![
            FeatureKey::Tracked(TrackedFeature::Stat(Stat::PassTds), 1),
            FeatureKey::Fixed(FixedFeature::IsQB),
            FeatureKey::Tracked(TrackedFeature::FantasyPoints, 0),
            FeatureKey::Tracked(TrackedFeature::Stat(Stat::PassTds), 0),
            FeatureKey::Fixed(FixedFeature::Age),
        ];
        keys.sort();
        let names: Vec<String> = keys.iter().map(FeatureKey::column_name).collect();
        assert_eq!(
            names,
            vec!["age", "fantasy_points_0", "isQB", "pass_tds_0", "pass_tds_1"]
        );
    }

    #[test]
    fn tracked_features_cover_stats_and_score() {
        let names: Vec<&str> = TrackedFeature::all().map(|f| f.name()).collect();
        assert_eq!(names.len(), Stat::ALL.len() + 1);
        assert_eq!(names.first(), Some(&"games_played"));
        assert_eq!(names.last(), Some(&"fantasy_points"));
    }

    #[test]
    fn instance_offsets_are_distinct_and_sorted() {
        let mut values = BTreeMap::new();
        values.insert(FeatureKey::Fixed(FixedFeature::Age), 25.0);
        values.insert(FeatureKey::Tracked(TrackedFeature::FantasyPoints, 1), 10.0);
        values.insert(FeatureKey::Tracked(TrackedFeature::Stat(Stat::RushTds), 1), 2.0);
        values.insert(FeatureKey::Tracked(TrackedFeature::FantasyPoints, 0), 12.0);
        let instance = FeatureInstance {
            identity: Identity(0),
            delta: 1,
            values,
        };
        assert_eq!(instance.offsets(), vec![0, 1]);
        assert_eq!(
            instance.get(FeatureKey::Tracked(TrackedFeature::FantasyPoints, 1)),
            Some(10.0)
        );
    }
}
