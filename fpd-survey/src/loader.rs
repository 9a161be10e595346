//! Turns the published ANP survey table into the cleaned table the
//! dashboard aggregates over.

use crate::error::{DashboardError, Result};
use crate::record::{Columns, CleanedRecord, RawRecord, DROPPED_COLUMNS};
use crate::TARGET_PRODUCT;
use csv::{ReaderBuilder, StringRecord};
use flate2::read::GzDecoder;
use log::{debug, info};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// The cleaned survey table: gasoline records ordered by date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedTable {
    records: Vec<CleanedRecord>,
}

impl CleanedTable {
    pub fn new(mut records: Vec<CleanedRecord>) -> Self {
        records.sort_by(|a, b| a.chronological_cmp(b));
        CleanedTable { records }
    }

    pub fn records(&self) -> &[CleanedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct years present, ascending.
    pub fn years(&self) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.year.as_str()).collect()
    }
}

/// Decompress `bytes` if they carry the gzip magic number.
pub fn maybe_decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    if bytes.starts_with(&GZIP_MAGIC) {
        let mut decoder = GzDecoder::new(bytes);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out)?;
        debug!("decompressed {} bytes into {}", bytes.len(), out.len());
        Ok(out)
    } else {
        Ok(bytes.to_vec())
    }
}

/// Pick the field delimiter by counting candidates on the header line.
pub fn detect_delimiter(bytes: &[u8]) -> u8 {
    let header_line = bytes.split(|b| *b == b'\n').next().unwrap_or(&[]);
    let count = |d: u8| header_line.iter().filter(|b| **b == d).count();
    let (semicolons, tabs, commas) = (count(b';'), count(b'\t'), count(b','));
    if semicolons > 0 && semicolons >= tabs && semicolons >= commas {
        b';'
    } else if tabs > 0 && tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

/// Trim stray whitespace (and a UTF-8 BOM) from header names.
///
/// The published table ships `" DATA INICIAL"` with a leading space.
pub fn repair_headers(headers: &StringRecord) -> StringRecord {
    headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim())
        .collect()
}

/// Parse and clean a raw survey table.
///
/// Keeps only [`TARGET_PRODUCT`] rows, derives the representative date and
/// year, and drops every statistical column. Rows with an unparsable date
/// or price are skipped.
pub fn clean_csv(bytes: &[u8]) -> Result<CleanedTable> {
    let bytes = maybe_decompress(bytes)?;
    let delimiter = detect_delimiter(&bytes);
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes.as_slice());

    let headers = repair_headers(rdr.headers()?);
    let columns = Columns::from_headers(&headers)?;
    let dropped_present = DROPPED_COLUMNS
        .iter()
        .filter(|name| headers.iter().any(|h| h == **name))
        .count();
    debug!(
        "loader: delimiter '{}', dropping {} of {} statistical columns",
        delimiter as char,
        dropped_present,
        DROPPED_COLUMNS.len()
    );

    let mut records = Vec::new();
    let mut skipped = 0u32;
    let mut other_products = 0u32;
    for (source_index, result) in rdr.records().enumerate() {
        let row = result?;
        let raw = match RawRecord::from_row(&columns, &row, source_index) {
            Some(raw) => raw,
            None => {
                skipped += 1;
                continue;
            }
        };
        if raw.product != TARGET_PRODUCT {
            other_products += 1;
            continue;
        }
        records.push(CleanedRecord::from(raw));
    }

    info!(
        "loader: kept {} {} records, skipped {} invalid, excluded {} other products",
        records.len(),
        TARGET_PRODUCT,
        skipped,
        other_products
    );
    if records.is_empty() {
        return Err(DashboardError::DataUnavailable(format!(
            "no {} records in source table",
            TARGET_PRODUCT
        )));
    }
    Ok(CleanedTable::new(records))
}

/// Load and clean a local survey table (plain or gzip-compressed CSV).
pub fn read_cleaned_table(path: &Path) -> Result<CleanedTable> {
    info!("loader: reading survey data from {}", path.display());
    let bytes = std::fs::read(path).map_err(|e| {
        DashboardError::DataUnavailable(format!("cannot read {}: {}", path.display(), e))
    })?;
    clean_csv(&bytes)
}
