use crate::error::{DashboardError, Result};
use chrono::NaiveDate;
use csv::StringRecord;
use fpd_utils::dates::{parse_survey_date, period_midpoint, year_label};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const COL_INITIAL_DATE: &str = "DATA INICIAL";
pub const COL_FINAL_DATE: &str = "DATA FINAL";
pub const COL_REGION: &str = "REGIÃO";
pub const COL_STATE: &str = "ESTADO";
pub const COL_PRODUCT: &str = "PRODUTO";
pub const COL_STATIONS: &str = "NÚMERO DE POSTOS PESQUISADOS";
pub const COL_UNIT: &str = "UNIDADE DE MEDIDA";
pub const COL_RESALE_MEAN: &str = "PREÇO MÉDIO REVENDA";
pub const COL_RESALE_STD_DEV: &str = "DESVIO PADRÃO REVENDA";
pub const COL_RESALE_MIN: &str = "PREÇO MÍNIMO REVENDA";
pub const COL_RESALE_MAX: &str = "PREÇO MÁXIMO REVENDA";
pub const COL_RESALE_MARGIN: &str = "MARGEM MÉDIA REVENDA";
pub const COL_RESALE_CV: &str = "COEF DE VARIAÇÃO REVENDA";
pub const COL_DIST_MEAN: &str = "PREÇO MÉDIO DISTRIBUIÇÃO";
pub const COL_DIST_STD_DEV: &str = "DESVIO PADRÃO DISTRIBUIÇÃO";
pub const COL_DIST_MIN: &str = "PREÇO MÍNIMO DISTRIBUIÇÃO";
pub const COL_DIST_MAX: &str = "PREÇO MÁXIMO DISTRIBUIÇÃO";
pub const COL_DIST_CV: &str = "COEF DE VARIAÇÃO DISTRIBUIÇÃO";

/// Display name of the cleaned resale price column.
pub const RESALE_PRICE_LABEL: &str = "VALOR REVENDA (R$/L)";

/// Columns that never reach a [`CleanedRecord`].
pub const DROPPED_COLUMNS: [&str; 14] = [
    COL_UNIT,
    COL_RESALE_CV,
    COL_DIST_CV,
    COL_STATIONS,
    COL_INITIAL_DATE,
    COL_FINAL_DATE,
    COL_DIST_MAX,
    COL_DIST_MIN,
    COL_DIST_STD_DEV,
    COL_RESALE_MARGIN,
    COL_RESALE_MIN,
    COL_RESALE_MAX,
    COL_RESALE_STD_DEV,
    COL_DIST_MEAN,
];

/// Positions of the known columns within a header row.
///
/// Required columns are resolved eagerly; statistical columns are optional
/// because they are only carried on the raw record.
#[derive(Debug, Clone)]
pub struct Columns {
    initial_date: usize,
    final_date: usize,
    region: usize,
    state: usize,
    product: usize,
    resale_mean: usize,
    stations: Option<usize>,
    unit: Option<usize>,
    resale_std_dev: Option<usize>,
    resale_min: Option<usize>,
    resale_max: Option<usize>,
    resale_margin: Option<usize>,
    resale_cv: Option<usize>,
    dist_mean: Option<usize>,
    dist_std_dev: Option<usize>,
    dist_min: Option<usize>,
    dist_max: Option<usize>,
    dist_cv: Option<usize>,
}

impl Columns {
    /// Resolve column positions from an already repaired header row.
    pub fn from_headers(headers: &StringRecord) -> Result<Columns> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                DashboardError::DataUnavailable(format!("missing column '{}'", name))
            })
        };
        Ok(Columns {
            initial_date: require(COL_INITIAL_DATE)?,
            final_date: require(COL_FINAL_DATE)?,
            region: require(COL_REGION)?,
            state: require(COL_STATE)?,
            product: require(COL_PRODUCT)?,
            resale_mean: require(COL_RESALE_MEAN)?,
            stations: find(COL_STATIONS),
            unit: find(COL_UNIT),
            resale_std_dev: find(COL_RESALE_STD_DEV),
            resale_min: find(COL_RESALE_MIN),
            resale_max: find(COL_RESALE_MAX),
            resale_margin: find(COL_RESALE_MARGIN),
            resale_cv: find(COL_RESALE_CV),
            dist_mean: find(COL_DIST_MEAN),
            dist_std_dev: find(COL_DIST_STD_DEV),
            dist_min: find(COL_DIST_MIN),
            dist_max: find(COL_DIST_MAX),
            dist_cv: find(COL_DIST_CV),
        })
    }
}

/// One row of the ANP survey table as published.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Position of the row in the source file (0-based, header excluded).
    pub source_index: usize,
    pub initial_date: NaiveDate,
    pub final_date: NaiveDate,
    pub region: String,
    pub state: String,
    pub product: String,
    pub stations_surveyed: Option<u32>,
    pub unit: Option<String>,
    /// Average resale price in R$ per unit.
    pub resale_mean: f64,
    pub resale_std_dev: Option<f64>,
    pub resale_min: Option<f64>,
    pub resale_max: Option<f64>,
    pub resale_margin: Option<f64>,
    pub resale_cv: Option<f64>,
    pub distribution_mean: Option<f64>,
    pub distribution_std_dev: Option<f64>,
    pub distribution_min: Option<f64>,
    pub distribution_max: Option<f64>,
    pub distribution_cv: Option<f64>,
}

/// Parse a price-like number, accepting a decimal comma.
///
/// ANP uses "-" for values that were not surveyed.
pub fn parse_decimal(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    match trimmed {
        "" | "-" => None,
        s => s.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite()),
    }
}

fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("").trim()
}

fn optional_field(record: &StringRecord, idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| record.get(i)).map(str::trim)
}

impl RawRecord {
    /// Build a raw record from one CSV row.
    ///
    /// Returns `None` when a required field is empty or unparsable; the
    /// loader counts these rows as skipped.
    pub fn from_row(columns: &Columns, record: &StringRecord, source_index: usize) -> Option<RawRecord> {
        let initial_date = parse_survey_date(field(record, columns.initial_date)).ok()?;
        let final_date = parse_survey_date(field(record, columns.final_date)).ok()?;
        let region = field(record, columns.region);
        let state = field(record, columns.state);
        let product = field(record, columns.product);
        if region.is_empty() || state.is_empty() || product.is_empty() {
            return None;
        }
        let resale_mean = parse_decimal(field(record, columns.resale_mean))?;
        let stat = |idx: Option<usize>| optional_field(record, idx).and_then(parse_decimal);

        Some(RawRecord {
            source_index,
            initial_date,
            final_date,
            region: region.to_string(),
            state: state.to_string(),
            product: product.to_string(),
            stations_surveyed: optional_field(record, columns.stations)
                .and_then(|s| s.parse::<u32>().ok()),
            unit: optional_field(record, columns.unit)
                .filter(|s| !s.is_empty())
                .map(String::from),
            resale_mean,
            resale_std_dev: stat(columns.resale_std_dev),
            resale_min: stat(columns.resale_min),
            resale_max: stat(columns.resale_max),
            resale_margin: stat(columns.resale_margin),
            resale_cv: stat(columns.resale_cv),
            distribution_mean: stat(columns.dist_mean),
            distribution_std_dev: stat(columns.dist_std_dev),
            distribution_min: stat(columns.dist_min),
            distribution_max: stat(columns.dist_max),
            distribution_cv: stat(columns.dist_cv),
        })
    }

    /// Representative date of the survey period.
    pub fn midpoint(&self) -> NaiveDate {
        period_midpoint(&self.initial_date, &self.final_date)
    }
}

/// A survey record after cleaning: one product, one representative date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub source_index: usize,
    pub date: NaiveDate,
    pub year: String,
    pub region: String,
    pub state: String,
    /// Average resale price in R$/l.
    pub resale_price: f64,
}

impl From<RawRecord> for CleanedRecord {
    fn from(raw: RawRecord) -> Self {
        let date = raw.midpoint();
        CleanedRecord {
            source_index: raw.source_index,
            year: year_label(&date),
            date,
            region: raw.region,
            state: raw.state,
            resale_price: raw.resale_mean,
        }
    }
}

impl CleanedRecord {
    /// Chronological order, falling back to source position so sorting is total.
    pub fn chronological_cmp(&self, other: &Self) -> Ordering {
        self.date
            .cmp(&other.date)
            .then(self.source_index.cmp(&other.source_index))
    }
}
