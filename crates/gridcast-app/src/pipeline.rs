// Pipeline orchestration: resolution -> histories -> windowing -> matrices.

use crate::config::Config;
use gridcast_core::features::{forecast_instance, window_all, FeatureInstance, FeatureMatrix};
use gridcast_core::history::{assemble, History, HistoryError};
use gridcast_core::identity::{resolve, Identity, Resolution, TracingSink, TradeOverrides};
use gridcast_core::record::SeasonTable;
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to assemble histories: {0}")]
    History(#[from] HistoryError),
}

/// Everything one run produces.
#[derive(Debug)]
pub struct PipelineOutput {
    pub resolution: Resolution,
    pub histories: BTreeMap<Identity, History>,
    pub instances: Vec<FeatureInstance>,
    /// Training rows, one per (identity, delta).
    pub matrix: FeatureMatrix,
    /// Next-season rows laid out against the training columns.
    pub forecast: FeatureMatrix,
}

/// Run the pipeline with settings from `config`.
pub fn run(config: &Config, seasons: BTreeMap<i32, SeasonTable>) -> Result<PipelineOutput, PipelineError> {
    run_with(
        seasons,
        config.trade_override_table(),
        config.windowing.parallel,
    )
}

/// Run the pipeline with explicit settings.
pub fn run_with(
    seasons: BTreeMap<i32, SeasonTable>,
    overrides: TradeOverrides,
    parallel: bool,
) -> Result<PipelineOutput, PipelineError> {
    let resolution = resolve(seasons, overrides, TracingSink);
    if resolution.failure_count() > 0 {
        warn!(
            "{} rows could not be assigned an identity and are excluded",
            resolution.failure_count()
        );
    }

    let histories = assemble(&resolution)?;

    let instances = window_all(&histories, parallel);
    let matrix = FeatureMatrix::build(&instances, parallel);

    let forecasts: Vec<FeatureInstance> = instances.iter().filter_map(forecast_instance).collect();
    let forecast = FeatureMatrix::project(&forecasts, matrix.columns().to_vec(), parallel);
    info!("Built {} forecast rows", forecast.n_rows());

    Ok(PipelineOutput {
        resolution,
        histories,
        instances,
        matrix,
        forecast,
    })
}
