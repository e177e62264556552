// Configuration loading and parsing (config/gridcast.toml).

use gridcast_core::identity::TradeOverrides;
use serde::Deserialize;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Placeholder replaced by the season year in `seasons.path_pattern`.
pub const YEAR_PLACEHOLDER: &str = "{year}";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory relative paths in the config are resolved against.
    pub base_dir: PathBuf,
    pub seasons: SeasonsConfig,
    pub trade_overrides: Vec<TradeOverrideEntry>,
    pub output: OutputConfig,
    pub windowing: WindowingConfig,
}

// ---------------------------------------------------------------------------
// gridcast.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire gridcast.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    seasons: SeasonsConfig,
    #[serde(default)]
    trade_overrides: Vec<TradeOverrideEntry>,
    output: OutputConfig,
    #[serde(default)]
    windowing: WindowingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonsConfig {
    pub first_year: i32,
    pub last_year: i32,
    /// Season file path with a `{year}` placeholder, e.g. `data/fant{year}.csv`.
    pub path_pattern: String,
}

impl SeasonsConfig {
    pub fn years(&self) -> RangeInclusive<i32> {
        self.first_year..=self.last_year
    }
}

/// One `[[trade_overrides]]` entry: the player named `name` on `new_team` in
/// `new_year` is the one who played for `old_team` in `old_year`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TradeOverrideEntry {
    pub name: String,
    pub new_team: String,
    pub new_year: i32,
    pub old_team: String,
    pub old_year: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowingConfig {
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_parallel() -> bool {
    true
}

impl Default for WindowingConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
        }
    }
}

impl Config {
    /// Path of the season file for `year`.
    pub fn season_path(&self, year: i32) -> PathBuf {
        self.base_dir.join(
            self.seasons
                .path_pattern
                .replace(YEAR_PLACEHOLDER, &year.to_string()),
        )
    }

    pub fn output_dir(&self) -> PathBuf {
        self.base_dir.join(&self.output.dir)
    }

    /// The override entries as the resolver's lookup table.
    pub fn trade_override_table(&self) -> TradeOverrides {
        let mut table = TradeOverrides::new();
        for entry in &self.trade_overrides {
            table.insert(
                entry.name.clone(),
                entry.new_team.clone(),
                entry.new_year,
                entry.old_team.clone(),
                entry.old_year,
            );
        }
        table
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/gridcast.toml` relative to
/// `base_dir`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("gridcast.toml");
    let text = read_file(&path)?;
    let file: ConfigFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    let config = Config {
        base_dir: base_dir.to_path_buf(),
        seasons: file.seasons,
        trade_overrides: file.trade_overrides,
        output: file.output,
        windowing: file.windowing,
    };

    validate(&config)?;

    Ok(config)
}

/// Convenience wrapper: loads config relative to the current working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let seasons = &config.seasons;
    if seasons.first_year > seasons.last_year {
        return Err(ConfigError::ValidationError {
            field: "seasons.first_year".into(),
            message: format!(
                "must not be after last_year ({} > {})",
                seasons.first_year, seasons.last_year
            ),
        });
    }

    if !seasons.path_pattern.contains(YEAR_PLACEHOLDER) {
        return Err(ConfigError::ValidationError {
            field: "seasons.path_pattern".into(),
            message: format!("must contain {YEAR_PLACEHOLDER}"),
        });
    }

    if config.output.dir.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "output.dir".into(),
            message: "must not be empty".into(),
        });
    }

    for (i, entry) in config.trade_overrides.iter().enumerate() {
        let text_fields: &[(&str, &str)] = &[
            ("name", entry.name.as_str()),
            ("new_team", entry.new_team.as_str()),
            ("old_team", entry.old_team.as_str()),
        ];
        for (name, val) in text_fields {
            if val.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    field: format!("trade_overrides[{i}].{name}"),
                    message: "must not be empty".into(),
                });
            }
        }
        if entry.old_year >= entry.new_year {
            return Err(ConfigError::ValidationError {
                field: format!("trade_overrides[{i}].old_year"),
                message: format!(
                    "must be before new_year ({} >= {})",
                    entry.old_year, entry.new_year
                ),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
