//! Metric CSV reading.

use std::{io::Cursor, path::Path};

use anyhow::{Context, Result, anyhow, ensure};
use polars::{frame::DataFrame, io::SerReader, prelude::{CsvReadOptions, CsvReader, DataType}};

use crate::region::RegionId;

/// Reads a metric CSV file from `path` into a Polars DataFrame.
pub(crate) fn read_csv(path: &Path) -> Result<DataFrame> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?;
    read_csv_bytes(&bytes)
        .with_context(|| format!("[io::csv::read] Failed to read CSV from {:?}", path))
}

/// Reads a metric CSV from bytes (for WASM/browser use).
///
/// Every column is read as a string so ids keep their leading zeros.
pub(crate) fn read_csv_bytes(bytes: &[u8]) -> Result<DataFrame> {
    let options = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0));

    CsvReader::new(Cursor::new(bytes))
        .with_options(options)
        .finish()
        .context("[io::csv::read] Failed to read CSV from bytes")
}

/// Read `(id, metric)` records from a DataFrame.
///
/// The first column holds region ids and the second the metric. Returns the
/// metric column's header alongside the records.
pub(crate) fn read_metrics(df: DataFrame) -> Result<(String, Vec<(RegionId, f64)>)> {
    ensure!(df.width() >= 2, "[io::csv::read] CSV must have two columns: id,metric");

    let names = df.get_column_names();
    let metric_name = names[1].to_string();

    let ids = df.column(names[0])?.cast(&DataType::String)?;
    let metrics = df.column(names[1])?.cast(&DataType::Float64)?;

    let records = ids.str()?.into_iter()
        .zip(metrics.f64()?.into_iter())
        .enumerate()
        .map(|(row, (id, metric))| {
            let id = id.ok_or_else(|| anyhow!("[io::csv::read] Row {} has no id", row + 1))?;
            let metric = metric.ok_or_else(|| anyhow!("[io::csv::read] Row {} ('{}') has no numeric {}", row + 1, id, metric_name))?;
            Ok((RegionId::new(id.trim()), metric))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((metric_name, records))
}
