// Dense feature matrix with a sorted column index and per-row identifiers.

use super::{FeatureInstance, FeatureKey, TrackedFeature};
use crate::identity::Identity;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Non-feature fields of one matrix row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierRow {
    pub identity: Identity,
    pub delta: u32,
}

/// Row-major `f64` matrix. Cells with no value are NaN; a stored zero always
/// means a recorded zero.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    columns: Vec<FeatureKey>,
    index: HashMap<FeatureKey, usize>,
    data: Vec<f64>,
    identifiers: Vec<IdentifierRow>,
}

impl FeatureMatrix {
    /// Build from instances. Columns are the sorted union of every instance's
    /// feature keys, so the whole set has to be known before any row is laid
    /// out.
    pub fn build(instances: &[FeatureInstance], parallel: bool) -> Self {
        let columns: BTreeSet<FeatureKey> = instances
            .iter()
            .flat_map(|instance| instance.values.keys().copied())
            .collect();
        let matrix = Self::project(instances, columns.into_iter().collect(), parallel);
        info!(
            "Built feature matrix: {} rows x {} columns",
            matrix.n_rows(),
            matrix.n_cols()
        );
        debug!(
            "Feature columns: {}",
            matrix.column_names().join(", ")
        );
        matrix
    }

    /// Lay instances out against an existing column order. Features missing
    /// from `columns` are dropped; columns an instance lacks stay NaN. With
    /// `parallel` the rows are filled on the rayon pool.
    pub fn project(instances: &[FeatureInstance], columns: Vec<FeatureKey>, parallel: bool) -> Self {
        let index: HashMap<FeatureKey, usize> =
            columns.iter().enumerate().map(|(i, key)| (*key, i)).collect();
        let n_cols = columns.len();
        let mut data = vec![f64::NAN; instances.len() * n_cols];

        let fill = |(row, instance): (&mut [f64], &FeatureInstance)| {
            for (key, value) in &instance.values {
                if let Some(&col) = index.get(key) {
                    row[col] = *value;
                }
            }
        };
        if n_cols > 0 {
            if parallel {
                data.par_chunks_mut(n_cols).zip(instances.par_iter()).for_each(fill);
            } else {
                data.chunks_mut(n_cols).zip(instances.iter()).for_each(fill);
            }
        }

        let identifiers = instances
            .iter()
            .map(|instance| IdentifierRow {
                identity: instance.identity,
                delta: instance.delta,
            })
            .collect();

        Self {
            columns,
            index,
            data,
            identifiers,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.identifiers.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[FeatureKey] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(FeatureKey::column_name).collect()
    }

    pub fn column(&self, key: FeatureKey) -> Option<usize> {
        self.index.get(&key).copied()
    }

    pub fn identifiers(&self) -> &[IdentifierRow] {
        &self.identifiers
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let n = self.n_cols();
        &self.data[row * n..(row + 1) * n]
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.n_cols() + col]
    }

    /// Iterate `(identifiers, values)` row by row.
    pub fn rows(&self) -> impl Iterator<Item = (&IdentifierRow, &[f64])> {
        self.identifiers
            .iter()
            .enumerate()
            .map(move |(i, ident)| (ident, self.row(i)))
    }

    /// Columns usable as model inputs: fixed features and tracked features
    /// from seasons before the target.
    pub fn input_columns(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, key)| key.offset() != Some(0))
            .map(|(i, _)| i)
            .collect()
    }

    /// Column holding the target season's fantasy points.
    pub fn target_column(&self) -> Option<usize> {
        self.column(FeatureKey::Tracked(TrackedFeature::FantasyPoints, 0))
    }
}
