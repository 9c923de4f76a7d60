//! CSV catalog ingestion.
//!
//! One row may carry a generator record (columns 0–10) and a battery record
//! (columns 11–21) side by side. Ingestion is best-effort: a row without a
//! usable name or fuel marker contributes nothing, it never aborts the load.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use csv::StringRecord;
use thiserror::Error;
use tracing::{debug, info};

use super::Catalog;
use super::types::{BatterySpec, FuelType, GeneratorSpec};

/// Column offset of the battery record within a row.
const BATTERY_OFFSET: usize = 11;

/// Errors that abort catalog loading.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot open catalog \"{}\": {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("catalog read failed: {0}")]
    Read(#[from] csv::Error),
}

/// Loads a catalog from a CSV file on disk.
///
/// # Errors
///
/// Returns a `CatalogError` if the file cannot be opened or read. Malformed
/// rows are skipped rather than reported.
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let file = File::open(path).map_err(|source| CatalogError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let catalog = read_catalog(file)?;
    info!(
        path = %path.display(),
        generators = catalog.generators().len(),
        batteries = catalog.batteries().len(),
        "catalog loaded"
    );
    Ok(catalog)
}

/// Reads a catalog from any CSV source. The first row is a header.
///
/// # Errors
///
/// Returns a `CatalogError` only for I/O failures of the underlying reader.
pub fn read_catalog(reader: impl Read) -> Result<Catalog, CatalogError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut generators = Vec::new();
    let mut batteries = Vec::new();

    for (idx, record) in rdr.records().enumerate() {
        let row = idx + 2;
        let record = match record {
            Ok(r) => r,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                debug!(row, error = %e, "skipping unreadable catalog row");
                continue;
            }
        };

        match generator_from_record(&record) {
            Some(g) => generators.push(g),
            None => debug!(row, "no generator record"),
        }
        if let Some(b) = battery_from_record(&record) {
            batteries.push(b);
        }
    }

    Ok(Catalog::new(generators, batteries))
}

fn generator_from_record(record: &StringRecord) -> Option<GeneratorSpec> {
    let name = text(record, 0)?;
    let fuel_type = FuelType::from_marker(&text(record, 6)?)?;

    Some(GeneratorSpec {
        name,
        p_max_kw: number(record, 1),
        p_min_kw: number(record, 2),
        cost: number(record, 3),
        mass: number(record, 4),
        volume: number(record, 5),
        fuel_type,
        bsfc: raw(record, 7),
        fcc: raw(record, 8),
        db_index: text(record, 9).unwrap_or_else(|| "default_eng_idx".to_string()),
        retrofit_cost: number(record, 10),
    })
}

fn battery_from_record(record: &StringRecord) -> Option<BatterySpec> {
    let col = |i: usize| BATTERY_OFFSET + i;
    let name = text(record, col(0))?;

    let mut battery = BatterySpec::new(
        name,
        number(record, col(1)),
        number(record, col(2)),
        number(record, col(3)),
        number(record, col(4)),
        number(record, col(5)),
        number(record, col(6)),
        number(record, col(7)),
    );
    if let Some(idx) = text(record, col(8)) {
        battery.db_index = idx;
    }
    if let Some(abb) = text(record, col(9)) {
        battery.abbreviation = abb;
    }
    battery.cycle_limit = optional_number(record, col(10));
    Some(battery)
}

/// Trimmed, non-empty field.
fn text(record: &StringRecord, i: usize) -> Option<String> {
    record
        .get(i)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn raw(record: &StringRecord, i: usize) -> String {
    record.get(i).unwrap_or_default().to_string()
}

fn optional_number(record: &StringRecord, i: usize) -> Option<f64> {
    record
        .get(i)
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Missing or unparseable numeric fields read as zero.
fn number(record: &StringRecord, i: usize) -> f64 {
    optional_number(record, i).unwrap_or(0.0)
}
