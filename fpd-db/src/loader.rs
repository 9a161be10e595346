//! Populates the snapshot from cleaned survey records.

use crate::Database;
use fpd_survey::CleanedRecord;
use fpd_utils::dates::format_date;
use rusqlite::params;

impl Database {
    /// Insert cleaned records in table order.
    ///
    /// Only called while the snapshot is being built.
    pub(crate) fn load_records(&self, records: &[CleanedRecord]) -> anyhow::Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO surveys (position, source_index, date, year, region, state, resale_price)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for (position, record) in records.iter().enumerate() {
                stmt.execute(params![
                    position as i64,
                    record.source_index as i64,
                    format_date(&record.date),
                    record.year,
                    record.region,
                    record.state,
                    record.resale_price,
                ])?;
            }
        }
        tx.commit()?;
        log::info!("loader: Loaded {} survey records", records.len());
        Ok(())
    }
}
