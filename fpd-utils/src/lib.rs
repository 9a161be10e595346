//! Shared utility functions for fuel price dashboard crates.

/// Date utility functions
pub mod dates {
    use crate::error::DateError;
    use chrono::{Datelike, NaiveDate};

    /// ISO date format used by the JSON API and the SQLite snapshot.
    pub const ISO_FORMAT: &str = "%Y-%m-%d";

    /// Day-first format used by ANP spreadsheets exported with a Brazilian locale.
    pub const BR_FORMAT: &str = "%d/%m/%Y";

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format(ISO_FORMAT).to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s, ISO_FORMAT)?)
    }

    /// Parse a survey date in either "YYYY-MM-DD" or "DD/MM/YYYY" format.
    ///
    /// A trailing time component ("2004-05-09 00:00:00") is ignored.
    pub fn parse_survey_date(s: &str) -> Result<NaiveDate, DateError> {
        let day_part = s.split_whitespace().next().unwrap_or("");
        NaiveDate::parse_from_str(day_part, ISO_FORMAT)
            .or_else(|_| NaiveDate::parse_from_str(day_part, BR_FORMAT))
            .map_err(|_| DateError(format!("unrecognized survey date '{}'", s)))
    }

    /// Midpoint of a survey period, rounded down to a whole day.
    ///
    /// If `end` precedes `start` the two are swapped.
    pub fn period_midpoint(start: &NaiveDate, end: &NaiveDate) -> NaiveDate {
        let (first, last) = if end < start { (end, start) } else { (start, end) };
        let half = (*last - *first).num_days() / 2;
        *first + chrono::Duration::days(half)
    }

    /// The year of `date` as a label ("2021").
    pub fn year_label(date: &NaiveDate) -> String {
        date.year().to_string()
    }

}

/// Error types
pub mod error {
    use std::fmt;

    #[derive(Debug)]
    pub struct DateError(pub String);

    impl fmt::Display for DateError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Date error: {}", self.0)
        }
    }

    impl std::error::Error for DateError {}
}
