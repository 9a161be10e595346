//! Core types and data loader for ANP fuel price survey data.

pub mod error;
pub mod loader;
pub mod record;
#[cfg(feature = "api")]
pub mod source;

/// The only product the dashboard reports on.
pub const TARGET_PRODUCT: &str = "GASOLINA COMUM";

/// Default location of the published survey table.
pub const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/AsimovAcademy/Dashboards/main/Dashboard%20Combust%C3%ADveis/data_gas.csv";

pub use error::{DashboardError, Result};
pub use loader::{clean_csv, read_cleaned_table, CleanedTable};
pub use record::{CleanedRecord, RawRecord};
