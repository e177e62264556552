// Season table ingestion (pro-football-reference fantasy CSV exports).
//
// The exports carry a two-line header: a group row ("Passing", "Rushing", ...)
// above the column row ("Yds", "TD", ...). Column names are the two joined,
// so passing yards becomes `PassingYds`. The header is repeated every few
// dozen rows; data rows are the ones starting with the numeric rank.

use crate::config::Config;
use csv::StringRecord;
use gridcast_core::record::{Position, SeasonRecord, SeasonTable, Stat, StatLine};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("{path}: data row on line {line} appears before a two-line header")]
    MissingSchema { path: String, line: u64 },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private)
// ---------------------------------------------------------------------------

/// Identity columns of one data row, keyed by the joined header names. The
/// stat columns are read separately through [`StatColumns`].
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawSeasonRow {
    #[serde(default)]
    Name: String,
    #[serde(default)]
    Tm: String,
    #[serde(default)]
    FantasyFantPos: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    Age: Option<f64>,
}

impl RawSeasonRow {
    fn into_record(self, year: i32, stats: StatLine) -> SeasonRecord {
        SeasonRecord {
            name: self.Name,
            team: self.Tm,
            position: Position::from_code(&self.FantasyFantPos),
            year,
            age: self.Age,
            stats,
        }
    }
}

/// Cell index of every stat column in one schema. A stat whose column the
/// file lacks stays `None` on every row.
#[derive(Debug)]
struct StatColumns([Option<usize>; 13]);

impl StatColumns {
    fn locate(headers: &StringRecord) -> Self {
        Self(Stat::ALL.map(|stat| headers.iter().position(|h| h == stat.column())))
    }

    /// Empty or non-numeric cells come through as `None`.
    fn read(&self, row: &StringRecord) -> StatLine {
        let mut stats = StatLine::default();
        for (stat, index) in Stat::ALL.iter().zip(self.0) {
            let value = index
                .and_then(|i| row.get(i))
                .and_then(|cell| cell.parse::<f64>().ok());
            stats.set(*stat, value);
        }
        stats
    }
}

// ---------------------------------------------------------------------------
// Header handling
// ---------------------------------------------------------------------------

/// Name for one column given its group and column header cells.
fn column_name(group: &str, column: &str) -> String {
    let joined = format!("{}{}", group.trim(), column.trim());
    if joined.is_empty() {
        return "Name".to_string();
    }
    joined.replace(' ', "_").replace('/', "p")
}

/// Zip the two header lines into one header record. Extra cells on the
/// longer line are dropped.
fn build_schema(group: &StringRecord, column: &StringRecord) -> StringRecord {
    group
        .iter()
        .zip(column.iter())
        .map(|(g, c)| column_name(g, c))
        .collect()
}

fn is_data_row(record: &StringRecord) -> bool {
    record
        .get(0)
        .and_then(|cell| cell.trim_start().chars().next())
        .is_some_and(|c| c.is_ascii_digit())
}

/// Strip the Pro Bowl (`*`) and All-Pro (`+`) markers from every cell.
fn strip_markers(record: &StringRecord) -> StringRecord {
    record
        .iter()
        .map(|cell| cell.replace(['*', '+'], "").trim().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Reader-based loader (private, enables testing without temp files)
// ---------------------------------------------------------------------------

fn load_season_from_reader<R: Read>(
    rdr: R,
    source: &str,
    year: i32,
) -> Result<Vec<SeasonRecord>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(rdr);

    let mut header_lines: Vec<StringRecord> = Vec::new();
    let mut schema: Option<(StringRecord, StatColumns)> = None;
    let mut records = Vec::new();

    for result in reader.records() {
        let raw = result.map_err(|e| IngestError::Csv {
            path: source.to_string(),
            source: e,
        })?;

        if !is_data_row(&raw) {
            if schema.is_none() {
                header_lines.push(raw);
                if let [group, column] = header_lines.as_slice() {
                    let built = build_schema(group, column);
                    debug!("{source}: schema {:?}", built.iter().collect::<Vec<_>>());
                    let columns = StatColumns::locate(&built);
                    schema = Some((built, columns));
                }
            }
            continue;
        }

        let Some((headers, columns)) = schema.as_ref() else {
            return Err(IngestError::MissingSchema {
                path: source.to_string(),
                line: raw.position().map_or(0, |p| p.line()),
            });
        };

        let cells = strip_markers(&raw);
        match cells.deserialize::<RawSeasonRow>(Some(headers)) {
            Ok(row) => {
                if row.Name.is_empty() {
                    warn!("{source}: skipping row with empty name");
                    continue;
                }
                records.push(row.into_record(year, columns.read(&cells)));
            }
            Err(e) => {
                warn!("{source}: skipping malformed row: {e}");
            }
        }
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Load one season file.
pub fn load_season(path: &Path, year: i32) -> Result<SeasonTable, IngestError> {
    let source = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: source.clone(),
        source: e,
    })?;
    let records = load_season_from_reader(file, &source, year)?;
    Ok(SeasonTable::new(source, year, records))
}

/// Load every season in the configured range, keyed by year.
pub fn load_seasons(config: &Config) -> Result<BTreeMap<i32, SeasonTable>, IngestError> {
    let mut seasons = BTreeMap::new();
    for year in config.seasons.years() {
        let table = load_season(&config.season_path(year), year)?;
        if table.is_empty() {
            return Err(IngestError::Validation(format!(
                "season {year} ({}) produced zero valid rows",
                table.source
            )));
        }
        info!("Loaded {} rows for {year} from {}", table.len(), table.source);
        seasons.insert(year, table);
    }
    Ok(seasons)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
