//! Serializable run configuration, read from TOML.
//!
//! ```toml
//! data_dir = "data"
//! symbols = ["FOLD", "KHFARS"]
//! start_date = "2019-03-20"
//! initial_capital = 100000.0
//! output_dir = "results"
//!
//! [sizing]
//! type = "ALL_IN"
//!
//! [execution]
//! venue = "TSE"
//! commission = { model = "PERCENTAGE", percent = 0.5 }
//!
//! [metrics]
//! risk_free_rate = 0.25
//! periods_per_year = 252
//! ```

use chrono::NaiveDate;
use eventlab_core::engine::CommissionModel;
use eventlab_core::portfolio::{AllInSizer, FixedQuantitySizer, MetricsConfig, OrderSizer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Everything needed to reproduce one backtest run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    /// Directory holding one `<symbol>.csv` per instrument.
    pub data_dir: PathBuf,

    /// Instruments to replay, in registration order.
    pub symbols: Vec<String>,

    /// Rows dated on or before this date are dropped.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,

    #[serde(default)]
    pub sizing: SizingConfig,

    #[serde(default)]
    pub execution: ExecutionConfig,

    #[serde(default)]
    pub metrics: MetricsSection,

    /// Where report artifacts go. Nothing is written when unset.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn default_initial_capital() -> f64 {
    100_000.0
}

/// Order sizing policy.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SizingConfig {
    /// Enter with a fixed number of units.
    FixedQuantity { quantity: u64 },

    /// Enter with as many units as the initial capital buys.
    #[default]
    AllIn,
}

impl SizingConfig {
    pub fn build(&self) -> Box<dyn OrderSizer> {
        match *self {
            SizingConfig::FixedQuantity { quantity } => Box::new(FixedQuantitySizer::new(quantity)),
            SizingConfig::AllIn => Box::new(AllInSizer),
        }
    }
}

/// Simulated execution settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionConfig {
    #[serde(default = "default_venue")]
    pub venue: String,

    #[serde(default)]
    pub commission: CommissionModel,
}

fn default_venue() -> String {
    "SIMULATED".to_string()
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            venue: default_venue(),
            commission: CommissionModel::None,
        }
    }
}

/// Summary-statistics parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MetricsSection {
    /// Annual risk-free rate.
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,

    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: f64,
}

fn default_risk_free_rate() -> f64 {
    0.25
}

fn default_periods_per_year() -> f64 {
    252.0
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            risk_free_rate: default_risk_free_rate(),
            periods_per_year: default_periods_per_year(),
        }
    }
}

impl From<MetricsSection> for MetricsConfig {
    fn from(m: MetricsSection) -> Self {
        MetricsConfig {
            risk_free_rate: m.risk_free_rate,
            periods_per_year: m.periods_per_year,
        }
    }
}

impl RunConfig {
    /// Minimal config with defaults for everything but the data location.
    pub fn new(data_dir: impl Into<PathBuf>, symbols: Vec<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            symbols,
            start_date: None,
            initial_capital: default_initial_capital(),
            sizing: SizingConfig::default(),
            execution: ExecutionConfig::default(),
            metrics: MetricsSection::default(),
            output_dir: None,
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a config file. Relative `data_dir` and `output_dir`
    /// resolve against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        if self.data_dir.is_relative() {
            self.data_dir = base.join(&self.data_dir);
        }
        if let Some(out) = self.output_dir.as_mut() {
            if out.is_relative() {
                *out = base.join(&*out);
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.symbols.is_empty() {
            return invalid("symbols must not be empty".into());
        }
        let mut seen = HashSet::new();
        for symbol in &self.symbols {
            if symbol.trim().is_empty() {
                return invalid("symbol names must not be blank".into());
            }
            if !seen.insert(symbol) {
                return invalid(format!("duplicate symbol '{symbol}'"));
            }
        }
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return invalid(format!(
                "initial_capital must be positive, got {}",
                self.initial_capital
            ));
        }
        if let SizingConfig::FixedQuantity { quantity: 0 } = self.sizing {
            return invalid("fixed quantity must be at least 1".into());
        }
        match self.execution.commission {
            CommissionModel::PerTrade { amount: x } | CommissionModel::Percentage { percent: x }
                if !x.is_finite() || x < 0.0 =>
            {
                return invalid(format!("commission must be non-negative, got {x}"));
            }
            _ => {}
        }
        if self.execution.venue.trim().is_empty() {
            return invalid("venue must not be blank".into());
        }
        if !self.metrics.periods_per_year.is_finite() || self.metrics.periods_per_year <= 0.0 {
            return invalid(format!(
                "periods_per_year must be positive, got {}",
                self.metrics.periods_per_year
            ));
        }
        if !self.metrics.risk_free_rate.is_finite() {
            return invalid("risk_free_rate must be finite".into());
        }
        Ok(())
    }

    /// Content hash of the configuration (BLAKE3 over its JSON form).
    ///
    /// Two runs with identical configs share the same hash.
    pub fn config_hash(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }

    pub fn metrics_config(&self) -> MetricsConfig {
        self.metrics.into()
    }
}
