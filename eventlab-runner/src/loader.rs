//! CSV bar loading for the runner.
//!
//! Reads one `<symbol>.csv` per instrument in the tsetmc export layout:
//!
//! ```text
//! <TICKER>,<DTYYYYMMDD>,<FIRST>,<HIGH>,<LOW>,<CLOSE>,<VALUE>,<VOL>,<OPENINT>,<PER>,<OPEN>,<LAST>
//! ```
//!
//! `<FIRST>` is the session open and `<OPEN>` is the previous session's
//! reference close, which drives price adjustment. `<TICKER>` and `<PER>`
//! are ignored. Any malformed row fails the whole load.

use chrono::NaiveDate;
use csv::StringRecord;
use eventlab_core::data::{DataError, RawBar};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

const DATE: usize = 1;
const FIRST: usize = 2;
const HIGH: usize = 3;
const LOW: usize = 4;
const CLOSE: usize = 5;
const VALUE: usize = 6;
const VOLUME: usize = 7;
const OPEN_INTEREST: usize = 8;
const YESTERDAY: usize = 10;
const LAST: usize = 11;
const COLUMNS: usize = 12;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error(transparent)]
    Data(#[from] DataError),
}

/// Path of the CSV file for `symbol` under `dir`.
pub fn csv_path(dir: &Path, symbol: &str) -> PathBuf {
    dir.join(format!("{symbol}.csv"))
}

/// Load every symbol's rows, in the given order.
pub fn load_symbols(
    dir: &Path,
    symbols: &[String],
) -> Result<Vec<(String, Vec<RawBar>)>, LoadError> {
    symbols
        .iter()
        .map(|s| load_symbol_csv(dir, s).map(|rows| (s.clone(), rows)))
        .collect()
}

/// Load one symbol's rows, sorted ascending by date.
pub fn load_symbol_csv(dir: &Path, symbol: &str) -> Result<Vec<RawBar>, LoadError> {
    let path = csv_path(dir, symbol);
    let csv_err = |source: csv::Error| LoadError::Csv {
        path: path.clone(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(&path)
        .map_err(csv_err)?;

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        // Line 1 is the header.
        let line = i + 2;
        let record = record.map_err(csv_err)?;
        rows.push(parse_record(symbol, line, &record)?);
    }
    if rows.is_empty() {
        return Err(DataError::EmptySource {
            symbol: symbol.to_string(),
        }
        .into());
    }
    rows.sort_by_key(|r| r.date);

    info!(
        symbol,
        rows = rows.len(),
        first = %rows[0].date,
        last = %rows[rows.len() - 1].date,
        "loaded CSV"
    );
    Ok(rows)
}

fn parse_record(symbol: &str, line: usize, record: &StringRecord) -> Result<RawBar, DataError> {
    if record.len() < COLUMNS {
        return Err(DataError::load(
            symbol,
            line,
            format!("expected {COLUMNS} columns, found {}", record.len()),
        ));
    }
    let field = |idx: usize| record.get(idx).unwrap_or_default();
    let float = |idx: usize, name: &str| -> Result<f64, DataError> {
        field(idx)
            .parse::<f64>()
            .map_err(|e| DataError::load(symbol, line, format!("{name} '{}': {e}", field(idx))))
    };
    let count = |idx: usize, name: &str| -> Result<u64, DataError> {
        let value = float(idx, name)?;
        if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
            Ok(value as u64)
        } else {
            Err(DataError::load(
                symbol,
                line,
                format!("{name} must be a non-negative whole number, got {value}"),
            ))
        }
    };

    let date = NaiveDate::parse_from_str(field(DATE), "%Y%m%d")
        .map_err(|e| DataError::load(symbol, line, format!("date '{}': {e}", field(DATE))))?;

    Ok(RawBar {
        date,
        open: float(FIRST, "open")?,
        high: float(HIGH, "high")?,
        low: float(LOW, "low")?,
        close: float(CLOSE, "close")?,
        value: float(VALUE, "value")?,
        volume: count(VOLUME, "volume")?,
        open_interest: count(OPEN_INTEREST, "open interest")?,
        yesterday_close: float(YESTERDAY, "yesterday close")?,
        last: float(LAST, "last")?,
    })
}
