//! Query result model structs for the derived aggregate tables.
//!
//! All structs derive `Serialize` so they can be handed to the chart
//! builders and returned as JSON.

use serde::{Serialize, Serializer};

/// Serialize a price with exactly two decimals ("5.10").
pub fn serialize_two_decimals<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:.2}", value))
}

/// Highest and lowest resale price observed in one year.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct YearlyExtremes {
    pub year: String,
    pub max_price: f64,
    pub min_price: f64,
}

/// Mean resale price of a region in one year.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RegionMean {
    pub year: String,
    pub region: String,
    #[serde(serialize_with = "serialize_two_decimals")]
    pub mean_price: f64,
}

/// Mean resale price of a state in one year, rounded to cents.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StateMean {
    pub year: String,
    pub state: String,
    pub region: String,
    #[serde(serialize_with = "serialize_two_decimals")]
    pub mean_price: f64,
}

/// A single unaggregated observation for the multi-state time series.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatePricePoint {
    /// Representative survey date (YYYY-MM-DD).
    pub date: String,
    pub state: String,
    pub price: f64,
}

/// A single (date, value) pair used for line chart data points.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DateValue {
    pub date: String,
    pub value: f64,
}

/// One month of the pairwise comparison between two states.
///
/// `difference` is `price_a - price_b`, or `None` when either state has no
/// survey in that month.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlyDifference {
    /// Month start (YYYY-MM-01).
    pub month: String,
    pub price_a: Option<f64>,
    pub price_b: Option<f64>,
    pub difference: Option<f64>,
}

/// Headline numbers for one state.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StateKpi {
    pub state: String,
    /// Price of the most recent survey.
    pub latest_price: f64,
    pub latest_date: String,
    /// Price of the earliest survey, used as the delta reference.
    pub reference_price: f64,
    pub reference_date: String,
    /// Relative change from reference to latest, in percent.
    pub change_pct: Option<f64>,
    /// Display label for the reference period (the year before the first year).
    pub reference_label: String,
    /// Display label for the current period (the last year).
    pub current_label: String,
}

/// A cleaned record as returned by the range filter.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SurveyRow {
    pub source_index: i64,
    pub date: String,
    pub year: String,
    pub region: String,
    pub state: String,
    pub resale_price: f64,
}
