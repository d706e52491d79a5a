//! EventLab Runner: run configuration, data loading, orchestration, reporting.
//!
//! This crate builds on `eventlab-core` to provide:
//! - TOML run configuration with validation and content hashing
//! - tsetmc CSV loading with fail-fast row errors
//! - A built-in buy-and-hold strategy
//! - Single-run orchestration and artifact export (equity CSV, summary JSON)

pub mod config;
pub mod loader;
pub mod report;
pub mod runner;
pub mod strategies;

pub use config::{ConfigError, ExecutionConfig, MetricsSection, RunConfig, SizingConfig};
pub use loader::{load_symbol_csv, load_symbols, LoadError};
pub use report::{write_artifacts, ArtifactPaths, RunReport, SCHEMA_VERSION};
pub use runner::{run_from_config, run_from_data, RunOutcome};
pub use strategies::BuyAndHold;
