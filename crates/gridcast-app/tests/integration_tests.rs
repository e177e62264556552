// Integration tests for gridcast.
//
// These drive the full system through the library crate's public API: config
// loading, season ingestion from fixture CSVs, identity resolution,
// windowing, matrix assembly and export.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use gridcast_app::config::{load_config_from, Config};
use gridcast_app::export::{self, FORECAST_FILE, IDENTIFIERS_FILE, MATRIX_FILE, RESOLUTION_FILE};
use gridcast_app::ingest::load_seasons;
use gridcast_app::pipeline::{run, run_with, PipelineOutput};
use gridcast_core::features::{FeatureKey, FixedFeature, TrackedFeature};
use gridcast_core::identity::{Identity, ResolutionError, TradeOverrides};
use gridcast_core::record::{SeasonTable, Stat};

// ===========================================================================
// Test helpers
// ===========================================================================

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Write a config into a fresh temp dir pointing at the fixture seasons.
fn fixture_config(dir_name: &str, with_override: bool) -> Config {
    let base = std::env::temp_dir().join(dir_name);
    let _ = fs::remove_dir_all(&base);
    fs::create_dir_all(base.join("config")).unwrap();

    let pattern = fixtures_dir().join("fant{year}.csv");
    let mut toml = format!(
        "[seasons]\nfirst_year = 2009\nlast_year = 2011\npath_pattern = '{}'\n\n[output]\ndir = \"out\"\n",
        pattern.display()
    );
    if with_override {
        toml.push_str(
            "\n[[trade_overrides]]\nname = \"Zach Miller\"\nnew_team = \"SEA\"\nnew_year = 2011\nold_team = \"OAK\"\nold_year = 2010\n",
        );
    }
    fs::write(base.join("config/gridcast.toml"), toml).unwrap();
    load_config_from(&base).expect("fixture config should load")
}

fn fixture_seasons(dir_name: &str) -> BTreeMap<i32, SeasonTable> {
    let config = fixture_config(dir_name, false);
    load_seasons(&config).unwrap()
}

/// Identity whose latest season matches `name` and `team`.
fn identity_of(output: &PipelineOutput, name: &str, team: &str) -> Identity {
    output
        .histories
        .values()
        .find(|h| h.display().is_some_and(|(n, t, _)| n == name && t == team))
        .map(|h| h.identity)
        .unwrap_or_else(|| panic!("no identity for {name} ({team})"))
}

/// Matrix row index of `(identity, delta)`.
fn row_of(output: &PipelineOutput, identity: Identity, delta: u32) -> usize {
    output
        .matrix
        .identifiers()
        .iter()
        .position(|r| r.identity == identity && r.delta == delta)
        .unwrap_or_else(|| panic!("no row for identity {identity} delta {delta}"))
}

fn cell(output: &PipelineOutput, row: usize, key: FeatureKey) -> f64 {
    let col = output.matrix.column(key).unwrap();
    output.matrix.get(row, col)
}

// ===========================================================================
// Ingestion
// ===========================================================================

#[test]
fn fixture_seasons_load_with_headers_and_markers_handled() {
    let seasons = fixture_seasons("gridcast_it_ingest");
    assert_eq!(seasons.keys().copied().collect::<Vec<_>>(), vec![2009, 2010, 2011]);
    assert_eq!(seasons[&2009].len(), 7);
    assert_eq!(seasons[&2010].len(), 8);
    assert_eq!(seasons[&2011].len(), 6);

    let fitz = &seasons[&2011].records[1];
    assert_eq!(fitz.name, "Larry Fitzgerald");
    assert_eq!(fitz.year, 2011);
    assert_eq!(fitz.stats.get(Stat::RecYards), Some(1411.0));
    assert_eq!(fitz.stats.get(Stat::PassYards), None);
}

#[test]
fn shipped_config_is_valid_toml() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/gridcast.toml");
    let content = fs::read_to_string(&path).expect("config/gridcast.toml should exist");
    let parsed: Result<toml::Value, _> = toml::from_str(&content);
    assert!(parsed.is_ok(), "config/gridcast.toml is not valid TOML: {:?}", parsed.err());
}

// ===========================================================================
// End-to-end pipeline
// ===========================================================================

#[test]
fn pipeline_resolves_every_fixture_row_with_override() {
    let config = fixture_config("gridcast_it_full", true);
    let seasons = load_seasons(&config).unwrap();
    let output = run(&config, seasons).unwrap();

    assert_eq!(output.resolution.identity_count, 8);
    assert_eq!(output.resolution.failure_count(), 0);
    assert_eq!(output.resolution.resolved_count(), 21);
    assert_eq!(output.histories.len(), 8);

    // Two Adrian Petersons, each with three seasons.
    let petersons: Vec<usize> = output
        .histories
        .values()
        .filter(|h| h.display().is_some_and(|(n, _, _)| n == "Adrian Peterson"))
        .map(|h| h.len())
        .collect();
    assert_eq!(petersons, vec![3, 3]);

    // Zach Miller OAK -> SEA is one identity; the Jaguars' Zach Miller another.
    let seattle = identity_of(&output, "Zach Miller", "SEA");
    let jacksonville = identity_of(&output, "Zach Miller", "JAX");
    assert_ne!(seattle, jacksonville);
    let seattle_history = &output.histories[&seattle];
    assert_eq!(seattle_history.len(), 3);
    assert_eq!(seattle_history.get(2010).unwrap().team, "OAK");
    assert_eq!(output.histories[&jacksonville].len(), 2);

    // Identities are dense from zero.
    let ids: Vec<u32> = output.histories.keys().map(|id| id.0).collect();
    assert_eq!(ids, (0..8).collect::<Vec<_>>());

    // Three-season careers give two rows, two-season careers one.
    assert_eq!(output.instances.len(), 13);
    assert_eq!(output.matrix.n_rows(), 13);
    assert_eq!(
        output.matrix.n_cols(),
        FixedFeature::ALL.len() + 3 * TrackedFeature::all().count()
    );
    assert_eq!(output.forecast.n_rows(), 8);
    assert_eq!(output.forecast.columns(), output.matrix.columns());
}

#[test]
fn pipeline_without_override_reports_ambiguous_trade() {
    let config = fixture_config("gridcast_it_no_override", false);
    let seasons = load_seasons(&config).unwrap();
    let output = run(&config, seasons).unwrap();

    let failures: Vec<&ResolutionError> = output.resolution.failures().collect();
    assert_eq!(failures.len(), 1);
    match failures[0] {
        ResolutionError::AmbiguousIdentity {
            name,
            team,
            year,
            open_keys,
            ..
        } => {
            assert_eq!(name, "Zach Miller");
            assert_eq!(team, "SEA");
            assert_eq!(*year, 2011);
            assert_eq!(*open_keys, 2);
        }
        other => panic!("expected AmbiguousIdentity, got {other:?}"),
    }

    // The Jaguars' Zach Miller still continues; the Raiders' stops at 2010.
    assert_eq!(output.resolution.identity_count, 8);
    assert_eq!(output.instances.len(), 12);
}

#[test]
fn position_change_keeps_identity_and_features_follow_latest_season() {
    let config = fixture_config("gridcast_it_slaton", true);
    let output = run(&config, load_seasons(&config).unwrap()).unwrap();

    let slaton = identity_of(&output, "Steve Slaton", "HOU");
    assert_eq!(output.histories[&slaton].len(), 2);

    let row = row_of(&output, slaton, 1);
    assert_eq!(cell(&output, row, FeatureKey::Fixed(FixedFeature::IsWR)), 1.0);
    assert_eq!(cell(&output, row, FeatureKey::Fixed(FixedFeature::IsRB)), 0.0);
    assert_eq!(cell(&output, row, FeatureKey::Fixed(FixedFeature::Age)), 24.0);

    let rush_yards = |offset| FeatureKey::Tracked(TrackedFeature::Stat(Stat::RushYards), offset);
    assert_eq!(cell(&output, row, rush_yards(0)), 93.0);
    assert_eq!(cell(&output, row, rush_yards(1)), 437.0);
    assert!(cell(&output, row, rush_yards(2)).is_nan());

    // 9.3 rushing + 1.5 receptions + 3.8 receiving
    let points = cell(&output, row, FeatureKey::Tracked(TrackedFeature::FantasyPoints, 0));
    assert!((points - 14.6).abs() < 1e-9);
}

#[test]
fn deeper_deltas_roll_age_back() {
    let config = fixture_config("gridcast_it_deltas", true);
    let output = run(&config, load_seasons(&config).unwrap()).unwrap();

    let fitz = identity_of(&output, "Larry Fitzgerald", "ARI");
    let age = FeatureKey::Fixed(FixedFeature::Age);
    let rec_yards_0 = FeatureKey::Tracked(TrackedFeature::Stat(Stat::RecYards), 0);

    let d1 = row_of(&output, fitz, 1);
    let d2 = row_of(&output, fitz, 2);
    assert_eq!(cell(&output, d1, age), 28.0);
    assert_eq!(cell(&output, d2, age), 27.0);
    assert_eq!(cell(&output, d1, rec_yards_0), 1411.0);
    assert_eq!(cell(&output, d2, rec_yards_0), 1137.0);

    let target = output.matrix.target_column().unwrap();
    assert!((output.matrix.get(d1, target) - 209.1).abs() < 1e-9);
    assert!(!output.matrix.input_columns().contains(&target));
}

#[test]
fn parallel_and_sequential_windowing_agree() {
    let seasons = fixture_seasons("gridcast_it_parallel");
    let mut overrides = TradeOverrides::new();
    overrides.insert("Zach Miller", "SEA", 2011, "OAK", 2010);

    let sequential = run_with(seasons.clone(), overrides.clone(), false).unwrap();
    let parallel = run_with(seasons, overrides, true).unwrap();

    assert_eq!(sequential.matrix.columns(), parallel.matrix.columns());
    assert_eq!(sequential.matrix.identifiers(), parallel.matrix.identifiers());
    for ((_, a), (_, b)) in sequential.matrix.rows().zip(parallel.matrix.rows()) {
        let a: Vec<u64> = a.iter().map(|v| v.to_bits()).collect();
        let b: Vec<u64> = b.iter().map(|v| v.to_bits()).collect();
        assert_eq!(a, b);
    }
}

// ===========================================================================
// Export
// ===========================================================================

#[test]
fn write_all_produces_every_output_file() {
    let config = fixture_config("gridcast_it_export", true);
    let output = run(&config, load_seasons(&config).unwrap()).unwrap();
    let out_dir = config.output_dir();

    let written = export::write_all(&out_dir, &output).unwrap();
    assert_eq!(written.len(), 4);

    let matrix = fs::read_to_string(out_dir.join(MATRIX_FILE)).unwrap();
    let mut lines = matrix.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("identity,delta,age,"));
    assert_eq!(header.split(',').count(), 2 + output.matrix.n_cols());
    assert_eq!(lines.count(), 13);

    let identifiers = fs::read_to_string(out_dir.join(IDENTIFIERS_FILE)).unwrap();
    assert!(identifiers.starts_with("identity,delta,name,team,position"));
    assert!(identifiers.contains("Zach Miller,SEA,TE"));
    assert!(identifiers.contains("Steve Slaton,HOU,WR"));
    assert_eq!(identifiers.lines().count(), 14);

    let forecast = fs::read_to_string(out_dir.join(FORECAST_FILE)).unwrap();
    assert_eq!(forecast.lines().count(), 9);
    assert!(forecast.lines().skip(1).all(|l| l.split(',').nth(1) == Some("0")));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join(RESOLUTION_FILE)).unwrap()).unwrap();
    assert_eq!(report["identity_count"], 8);
    assert_eq!(report["rows"], 21);
    assert_eq!(report["unresolved"], 0);
    assert_eq!(report["failures"].as_array().map(Vec::len), Some(0));
}
