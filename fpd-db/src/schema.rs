//! SQL schema definitions for the in-memory SQLite database.
//!
//! The schema is applied as a single batch when the database is initialized.

/// Returns the full SQL schema as a single batch string.
///
/// This creates the `surveys` table holding the cleaned survey records.
/// `position` is the record's index in the date-ordered cleaned table and
/// is what "first seen" means for tie-breaking; `source_index` is the row
/// position in the published file.
///
/// Every aggregate (yearly extremes, region/state means, monthly means) is
/// derived on-the-fly via `GROUP BY` queries against this table.
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS surveys (
        position INTEGER PRIMARY KEY,
        source_index INTEGER NOT NULL,
        date TEXT NOT NULL,
        year TEXT NOT NULL,
        region TEXT NOT NULL,
        state TEXT NOT NULL,
        resale_price REAL NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_surveys_year ON surveys(year);
    CREATE INDEX IF NOT EXISTS idx_surveys_state ON surveys(state);
    CREATE INDEX IF NOT EXISTS idx_surveys_region ON surveys(region);
    "#
}
