// Output writers: feature matrices and identifiers as CSV, resolution report as JSON.

use crate::pipeline::PipelineOutput;
use gridcast_core::features::FeatureMatrix;
use gridcast_core::history::History;
use gridcast_core::identity::{Identity, Resolution, ResolutionError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const MATRIX_FILE: &str = "matrix.csv";
pub const IDENTIFIERS_FILE: &str = "identifiers.csv";
pub const FORECAST_FILE: &str = "forecast.csv";
pub const RESOLUTION_FILE: &str = "resolution.json";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error writing {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("JSON error writing {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Row and report shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct IdentifierCsvRow<'a> {
    identity: Identity,
    delta: u32,
    name: &'a str,
    team: &'a str,
    position: &'a str,
}

/// Summary written to `resolution.json`.
#[derive(Debug, Serialize)]
pub struct ResolutionReport<'a> {
    pub identity_count: u32,
    pub rows: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub failures: Vec<&'a ResolutionError>,
}

impl<'a> ResolutionReport<'a> {
    pub fn from_resolution(resolution: &'a Resolution) -> Self {
        Self {
            identity_count: resolution.identity_count,
            rows: resolution.records.len(),
            resolved: resolution.resolved_count(),
            unresolved: resolution.failure_count(),
            failures: resolution.failures().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Writer-based serializers (enable testing without temp files)
// ---------------------------------------------------------------------------

fn format_cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

/// `identity,delta,<columns...>` with NaN cells left empty.
pub fn write_matrix_to<W: Write>(writer: W, matrix: &FeatureMatrix) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["identity".to_string(), "delta".to_string()];
    header.extend(matrix.column_names());
    wtr.write_record(&header)?;

    for (ident, values) in matrix.rows() {
        let mut row = Vec::with_capacity(values.len() + 2);
        row.push(ident.identity.to_string());
        row.push(ident.delta.to_string());
        row.extend(values.iter().map(|v| format_cell(*v)));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// One identifier row per matrix row, with display fields from the
/// identity's most recent season.
pub fn write_identifiers_to<W: Write>(
    writer: W,
    matrix: &FeatureMatrix,
    histories: &BTreeMap<Identity, History>,
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for ident in matrix.identifiers() {
        let (name, team, position) = histories
            .get(&ident.identity)
            .and_then(History::display)
            .map(|(name, team, position)| (name, team, position.code()))
            .unwrap_or(("", "", ""));
        wtr.serialize(IdentifierCsvRow {
            identity: ident.identity,
            delta: ident.delta,
            name,
            team,
            position,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_resolution_to<W: Write>(writer: W, resolution: &Resolution) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(writer, &ResolutionReport::from_resolution(resolution))
}

// ---------------------------------------------------------------------------
// File output
// ---------------------------------------------------------------------------

fn create(path: &Path) -> Result<std::fs::File, ExportError> {
    std::fs::File::create(path).map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn csv_error(path: &Path) -> impl FnOnce(csv::Error) -> ExportError + '_ {
    move |e| ExportError::Csv {
        path: path.display().to_string(),
        source: e,
    }
}

/// Write every output file into `dir`, creating it if needed. Returns the
/// paths written.
pub fn write_all(dir: &Path, output: &PipelineOutput) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(dir).map_err(|e| ExportError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;

    let matrix_path = dir.join(MATRIX_FILE);
    write_matrix_to(create(&matrix_path)?, &output.matrix).map_err(csv_error(&matrix_path))?;

    let identifiers_path = dir.join(IDENTIFIERS_FILE);
    write_identifiers_to(create(&identifiers_path)?, &output.matrix, &output.histories)
        .map_err(csv_error(&identifiers_path))?;

    let forecast_path = dir.join(FORECAST_FILE);
    write_matrix_to(create(&forecast_path)?, &output.forecast).map_err(csv_error(&forecast_path))?;

    let resolution_path = dir.join(RESOLUTION_FILE);
    write_resolution_to(create(&resolution_path)?, &output.resolution).map_err(|e| {
        ExportError::Json {
            path: resolution_path.display().to_string(),
            source: e,
        }
    })?;

    let written = vec![matrix_path, identifiers_path, forecast_path, resolution_path];
    for path in &written {
        info!("Wrote {}", path.display());
    }
    Ok(written)
}
