// History windowing.
//
// Players have careers of very different lengths, so stats are keyed by how
// many seasons back they are rather than by calendar year; a rookie simply
// ends up with a sparse row. `featurize` builds that view from the most
// recent season, and `split_observations` re-anchors it at every earlier
// season so each past year becomes its own training row.

use super::scoring::fantasy_points;
use super::{FeatureInstance, FeatureKey, FixedFeature, TrackedFeature};
use crate::history::History;
use crate::identity::Identity;
use crate::record::{Position, SeasonRecord};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// An identity's full history as features, anchored at its latest season.
/// Tracked offsets run from 1 (latest season) to the number of seasons.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerFeatures {
    pub identity: Identity,
    pub fixed: BTreeMap<FixedFeature, f64>,
    pub tracked: BTreeMap<(TrackedFeature, u32), f64>,
}

fn fixed_value(feature: FixedFeature, anchor: &SeasonRecord) -> f64 {
    let flag = |pos: Position| if anchor.position == pos { 1.0 } else { 0.0 };
    match feature {
        FixedFeature::Age => anchor.age.unwrap_or(f64::NAN),
        FixedFeature::IsQB => flag(Position::QB),
        FixedFeature::IsRB => flag(Position::RB),
        FixedFeature::IsWR => flag(Position::WR),
        FixedFeature::IsTE => flag(Position::TE),
    }
}

fn tracked_value(feature: TrackedFeature, season: &SeasonRecord) -> f64 {
    match feature {
        TrackedFeature::Stat(stat) => season.stats.get(stat).unwrap_or(f64::NAN),
        TrackedFeature::FantasyPoints => fantasy_points(&season.stats),
    }
}

/// Build the feature view of one history. Returns `None` for an empty history.
pub fn featurize(history: &History) -> Option<PlayerFeatures> {
    let anchor = history.latest()?;

    let fixed = FixedFeature::ALL
        .iter()
        .map(|f| (*f, fixed_value(*f, anchor)))
        .collect();

    let mut tracked = BTreeMap::new();
    for (index, season) in history.seasons_desc().enumerate() {
        let offset = index as u32 + 1;
        for feature in TrackedFeature::all() {
            tracked.insert((feature, offset), tracked_value(feature, season));
        }
    }

    Some(PlayerFeatures {
        identity: history.identity,
        fixed,
        tracked,
    })
}

/// Re-anchor a player's features at every offset, yielding one instance per
/// usable delta.
///
/// At `delta`, the value tracked at `offset >= delta` moves to
/// `offset - delta` and age is rolled back by `delta - 1` years. A delta that
/// would leave a single offset has no season before the target and is
/// skipped.
pub fn split_observations(features: &PlayerFeatures) -> Vec<FeatureInstance> {
    let offsets: BTreeSet<u32> = features.tracked.keys().map(|(_, offset)| *offset).collect();
    let mut instances = Vec::new();

    for &delta in &offsets {
        if offsets.range(delta..).count() < 2 {
            debug!(
                "Skipping delta {delta} for identity {}: insufficient window",
                features.identity
            );
            continue;
        }

        let mut values = BTreeMap::new();
        for (feature, value) in &features.fixed {
            let value = match feature {
                FixedFeature::Age => value - (delta - 1) as f64,
                _ => *value,
            };
            values.insert(FeatureKey::Fixed(*feature), value);
        }
        for ((feature, offset), value) in &features.tracked {
            if *offset >= delta {
                values.insert(FeatureKey::Tracked(*feature, offset - delta), *value);
            }
        }

        instances.push(FeatureInstance {
            identity: features.identity,
            delta,
            values,
        });
    }

    instances
}

/// Turn a delta-1 instance into a delta-0 row for predicting the season after
/// the latest one on record: every tracked offset moves back one season and
/// the player is a year older. Other deltas return `None`.
pub fn forecast_instance(instance: &FeatureInstance) -> Option<FeatureInstance> {
    if instance.delta != 1 {
        return None;
    }
    let values = instance
        .values
        .iter()
        .map(|(key, value)| match key {
            FeatureKey::Fixed(FixedFeature::Age) => (*key, value + 1.0),
            FeatureKey::Fixed(_) => (*key, *value),
            FeatureKey::Tracked(feature, offset) => (FeatureKey::Tracked(*feature, offset + 1), *value),
        })
        .collect();
    Some(FeatureInstance {
        identity: instance.identity,
        delta: 0,
        values,
    })
}

/// Window every history. Identities are independent, so with `parallel` the
/// work is spread over the rayon pool; output order follows identity order
/// either way.
pub fn window_all(histories: &BTreeMap<Identity, History>, parallel: bool) -> Vec<FeatureInstance> {
    let histories: Vec<&History> = histories.values().collect();
    let window = |history: &&History| {
        featurize(history)
            .map(|features| split_observations(&features))
            .unwrap_or_default()
    };

    let per_identity: Vec<Vec<FeatureInstance>> = if parallel {
        histories.par_iter().map(window).collect()
    } else {
        histories.iter().map(window).collect()
    };

    let instances: Vec<FeatureInstance> = per_identity.into_iter().flatten().collect();
    info!(
        "Windowed {} histories into {} instances",
        histories.len(),
        instances.len()
    );
    instances
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
