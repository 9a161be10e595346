//! Typed query methods producing the derived aggregate tables.
//!
//! All queries are read-only and return typed structs from
//! [`crate::models`]. Orderings always end in a deterministic tie-breaker
//! so that repeated calls return identical tables.
//!
//! # Ties
//!
//! State means are rounded to cents before sorting, so two states often
//! share a value. Ties are ordered by the group's first appearance in the
//! date-ordered table (`MIN(position)`).

use crate::models::{
    DateValue, MonthlyDifference, RegionMean, StateKpi, StateMean, StatePricePoint, SurveyRow,
    YearlyExtremes,
};
use crate::Database;
use fpd_data::alignment::{align, DataPoint};
use fpd_data::kpi::percent_change;
use fpd_utils::dates::parse_date;
use rusqlite::{params, params_from_iter, OptionalExtension};

/// Inclusive year bounds shared by the range filter and the series query.
/// Binds two positional parameters: start year, end year.
const YEAR_IN_RANGE: &str = "CAST(year AS INTEGER) BETWEEN ? AND ?";

impl Database {
    // ───────────────────── Aggregates ─────────────────────

    /// Highest and lowest price per year, ordered by year.
    pub fn query_yearly_extremes(&self) -> anyhow::Result<Vec<YearlyExtremes>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT year, MAX(resale_price), MIN(resale_price)
             FROM surveys
             GROUP BY year
             ORDER BY year",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(YearlyExtremes {
                    year: row.get(0)?,
                    max_price: row.get(1)?,
                    min_price: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("query: query_yearly_extremes returned {} records", rows.len());
        Ok(rows)
    }

    /// Mean price per region for one year, cheapest first.
    ///
    /// The mean keeps full precision so it always lies within the prices of
    /// its group; it is shown with two decimals when serialized.
    pub fn query_region_means(&self, year: &str) -> anyhow::Result<Vec<RegionMean>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT year, region, AVG(resale_price) AS mean_price,
                    MIN(position) AS first_seen
             FROM surveys
             WHERE year = ?1
             GROUP BY year, region
             ORDER BY mean_price, first_seen",
        )?;
        let rows = stmt
            .query_map(params![year], |row| {
                Ok(RegionMean {
                    year: row.get(0)?,
                    region: row.get(1)?,
                    mean_price: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "query: query_region_means({}) returned {} records",
            year,
            rows.len()
        );
        Ok(rows)
    }

    /// Mean price per state of `region` for one year, cheapest first.
    pub fn query_state_means(&self, year: &str, region: &str) -> anyhow::Result<Vec<StateMean>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT year, state, region, ROUND(AVG(resale_price), 2) AS mean_price,
                    MIN(position) AS first_seen
             FROM surveys
             WHERE year = ?1
             GROUP BY year, state, region
             HAVING region = ?2
             ORDER BY mean_price, first_seen",
        )?;
        let rows = stmt
            .query_map(params![year, region], |row| {
                Ok(StateMean {
                    year: row.get(0)?,
                    state: row.get(1)?,
                    region: row.get(2)?,
                    mean_price: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "query: query_state_means({}, {}) returned {} records",
            year,
            region,
            rows.len()
        );
        Ok(rows)
    }

    /// Unaggregated observations of the given states, in table order.
    ///
    /// `years` optionally restricts the rows to an inclusive year range.
    pub fn query_states_series(
        &self,
        states: &[String],
        years: Option<(i32, i32)>,
    ) -> anyhow::Result<Vec<StatePricePoint>> {
        if states.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; states.len()].join(", ");
        let (start, end) = years.unwrap_or((i32::MIN, i32::MAX));
        let sql = format!(
            "SELECT date, state, resale_price
             FROM surveys
             WHERE state IN ({})
               AND {}
             ORDER BY position",
            placeholders, YEAR_IN_RANGE
        );
        let mut values: Vec<rusqlite::types::Value> = states
            .iter()
            .map(|s| rusqlite::types::Value::Text(s.clone()))
            .collect();
        values.push(rusqlite::types::Value::Integer(start as i64));
        values.push(rusqlite::types::Value::Integer(end as i64));

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), |row| {
                Ok(StatePricePoint {
                    date: row.get(0)?,
                    state: row.get(1)?,
                    price: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "query: query_states_series({} states) returned {} records",
            states.len(),
            rows.len()
        );
        Ok(rows)
    }

    /// Mean price per calendar month for one state, keyed by month start.
    pub fn query_monthly_means(&self, state: &str) -> anyhow::Result<Vec<DateValue>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT strftime('%Y-%m-01', date) AS month, AVG(resale_price)
             FROM surveys
             WHERE state = ?1
             GROUP BY month
             ORDER BY month",
        )?;
        let rows = stmt
            .query_map(params![state], |row| {
                Ok(DateValue {
                    date: row.get(0)?,
                    value: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "query: query_monthly_means({}) returned {} records",
            state,
            rows.len()
        );
        Ok(rows)
    }

    /// Monthly price difference `state_a - state_b`, aligned on the month.
    ///
    /// Months where only one of the states was surveyed are kept with a
    /// `None` difference.
    pub fn query_monthly_difference(
        &self,
        state_a: &str,
        state_b: &str,
    ) -> anyhow::Result<Vec<MonthlyDifference>> {
        let to_points = |values: Vec<DateValue>| -> anyhow::Result<Vec<DataPoint>> {
            values
                .into_iter()
                .map(|dv| -> anyhow::Result<DataPoint> {
                    Ok(DataPoint {
                        date: parse_date(&dv.date)?,
                        value: dv.value,
                    })
                })
                .collect()
        };
        let a = to_points(self.query_monthly_means(state_a)?)?;
        let b = to_points(self.query_monthly_means(state_b)?)?;
        let rows: Vec<MonthlyDifference> = align(&a, &b)
            .into_iter()
            .map(|p| MonthlyDifference {
                month: fpd_utils::dates::format_date(&p.date),
                difference: p.difference(),
                price_a: p.a,
                price_b: p.b,
            })
            .collect();
        log::debug!(
            "query: query_monthly_difference({}, {}) returned {} records",
            state_a,
            state_b,
            rows.len()
        );
        Ok(rows)
    }

    /// Latest price, earliest price and their relative change for one state.
    ///
    /// Returns `None` when the state has no surveys.
    pub fn query_state_kpi(&self, state: &str) -> anyhow::Result<Option<StateKpi>> {
        let conn = self.conn()?;
        let price_at = |order: &str| -> rusqlite::Result<Option<(f64, String)>> {
            conn.query_row(
                &format!(
                    "SELECT resale_price, date FROM surveys
                     WHERE state = ?1
                     ORDER BY position {}
                     LIMIT 1",
                    order
                ),
                params![state],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
        };
        let (latest_price, latest_date) = match price_at("DESC")? {
            Some(latest) => latest,
            None => return Ok(None),
        };
        let (reference_price, reference_date) = match price_at("ASC")? {
            Some(first) => first,
            None => return Ok(None),
        };
        let (min_year, max_year): (Option<i64>, Option<i64>) = conn.query_row(
            "SELECT MIN(CAST(year AS INTEGER)), MAX(CAST(year AS INTEGER)) FROM surveys",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let kpi = StateKpi {
            state: state.to_string(),
            latest_price,
            latest_date,
            reference_price,
            reference_date,
            change_pct: percent_change(reference_price, latest_price),
            reference_label: min_year.map(|y| (y - 1).to_string()).unwrap_or_default(),
            current_label: max_year.map(|y| y.to_string()).unwrap_or_default(),
        };
        log::debug!("query: query_state_kpi({}) -> {:?}", state, kpi.change_pct);
        Ok(Some(kpi))
    }

    /// Records whose year lies within `start..=end`, in table order.
    ///
    /// `start > end` yields an empty table.
    pub fn query_year_range(&self, start: i32, end: i32) -> anyhow::Result<Vec<SurveyRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT source_index, date, year, region, state, resale_price
             FROM surveys
             WHERE {}
             ORDER BY position",
            YEAR_IN_RANGE
        ))?;
        let rows = stmt
            .query_map(params![start, end], |row| {
                Ok(SurveyRow {
                    source_index: row.get(0)?,
                    date: row.get(1)?,
                    year: row.get(2)?,
                    region: row.get(3)?,
                    state: row.get(4)?,
                    resale_price: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "query: query_year_range({}, {}) returned {} records",
            start,
            end,
            rows.len()
        );
        Ok(rows)
    }

    // ───────────────────── Lookups ─────────────────────

    /// Number of records in the snapshot.
    pub fn query_record_count(&self) -> anyhow::Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM surveys", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Distinct years, ascending.
    pub fn query_years(&self) -> anyhow::Result<Vec<String>> {
        self.query_distinct("year")
    }

    /// Distinct regions, alphabetical.
    pub fn query_regions(&self) -> anyhow::Result<Vec<String>> {
        self.query_distinct("region")
    }

    /// Distinct states, alphabetical.
    pub fn query_states(&self) -> anyhow::Result<Vec<String>> {
        self.query_distinct("state")
    }

    fn query_distinct(&self, column: &'static str) -> anyhow::Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT DISTINCT {0} FROM surveys ORDER BY {0}",
            column
        ))?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(rows)
    }

    /// The (min, max) year present, or `None` for an empty snapshot.
    pub fn query_year_bounds(&self) -> anyhow::Result<Option<(i32, i32)>> {
        let conn = self.conn()?;
        let (min, max): (Option<i32>, Option<i32>) = conn.query_row(
            "SELECT MIN(CAST(year AS INTEGER)), MAX(CAST(year AS INTEGER)) FROM surveys",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(min.zip(max))
    }

    pub fn contains_year(&self, year: &str) -> anyhow::Result<bool> {
        self.contains("year", year)
    }

    pub fn contains_region(&self, region: &str) -> anyhow::Result<bool> {
        self.contains("region", region)
    }

    pub fn contains_state(&self, state: &str) -> anyhow::Result<bool> {
        self.contains("state", state)
    }

    fn contains(&self, column: &'static str, value: &str) -> anyhow::Result<bool> {
        let conn = self.conn()?;
        let exists: bool = conn.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM surveys WHERE {} = ?1)", column),
            params![value],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;
    use chrono::NaiveDate;
    use fpd_survey::{clean_csv, CleanedRecord, CleanedTable};

    static SAMPLE_CSV: &str = include_str!("../../fixtures/gas_prices_sample.csv");

    fn record(
        source_index: usize,
        (y, m, d): (i32, u32, u32),
        region: &str,
        state: &str,
        price: f64,
    ) -> CleanedRecord {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        CleanedRecord {
            source_index,
            date,
            year: y.to_string(),
            region: region.to_string(),
            state: state.to_string(),
            resale_price: price,
        }
    }

    /// Helper to create the two-year scenario: SE {SP 5.00, SP 5.20, RJ 5.10}
    /// in 2020, plus a southern state and a 2021 survey.
    fn scenario_db() -> Database {
        let table = CleanedTable::new(vec![
            record(0, (2020, 1, 8), "SE", "SP", 5.00),
            record(1, (2020, 1, 15), "SE", "SP", 5.20),
            record(2, (2020, 2, 12), "SE", "RJ", 5.10),
            record(3, (2020, 2, 12), "S", "PR", 4.80),
            record(4, (2021, 3, 10), "SE", "SP", 5.60),
            record(5, (2021, 3, 10), "SE", "RJ", 5.90),
        ]);
        Database::from_table(&table).unwrap()
    }

    /// Helper to create a database from the sample fixture.
    fn sample_db() -> Database {
        let table = clean_csv(SAMPLE_CSV.as_bytes()).unwrap();
        Database::from_table(&table).unwrap()
    }

    // ───────────────────── Aggregate Tests ─────────────────────

    #[test]
    fn query_yearly_extremes_bounds_every_price() {
        let db = sample_db();
        let extremes = db.query_yearly_extremes().unwrap();
        let years: Vec<&str> = extremes.iter().map(|e| e.year.as_str()).collect();
        assert_eq!(years, vec!["2019", "2020", "2021"]);
        for e in &extremes {
            let y: i32 = e.year.parse().unwrap();
            let rows = db.query_year_range(y, y).unwrap();
            assert!(!rows.is_empty());
            for row in rows {
                assert!(e.min_price <= row.resale_price && row.resale_price <= e.max_price);
            }
        }
        assert_eq!(extremes[2].max_price, 5.9);
        assert_eq!(extremes[2].min_price, 5.4);
    }

    #[test]
    fn query_region_means_end_to_end() {
        let db = scenario_db();
        let means = db.query_region_means("2020").unwrap();
        assert_eq!(means.len(), 2);
        assert_eq!(means[0].region, "S");
        assert_eq!(means[0].mean_price, 4.8);
        assert_eq!(means[1].region, "SE");
        assert!((means[1].mean_price - 5.1).abs() < 1e-9);
        let json = serde_json::to_value(&means).unwrap();
        assert_eq!(json[1]["mean_price"], "5.10");
    }

    #[test]
    fn query_region_means_single_record_keeps_its_price() {
        let table = CleanedTable::new(vec![record(0, (2004, 5, 12), "NORTE", "AM", 2.123)]);
        let db = Database::from_table(&table).unwrap();
        let means = db.query_region_means("2004").unwrap();
        assert_eq!(means.len(), 1);
        assert_eq!(means[0].mean_price, 2.123);
        let json = serde_json::to_value(&means).unwrap();
        assert_eq!(json[0]["mean_price"], "2.12");
    }

    #[test]
    fn query_region_means_sorts_on_unrounded_mean() {
        // 4.804 and 4.806 both show as 4.80 but keep their true order
        let table = CleanedTable::new(vec![
            record(0, (2020, 1, 8), "SUL", "PR", 4.806),
            record(1, (2020, 1, 8), "NORTE", "AM", 4.804),
        ]);
        let db = Database::from_table(&table).unwrap();
        let regions: Vec<String> = db
            .query_region_means("2020")
            .unwrap()
            .into_iter()
            .map(|m| m.region)
            .collect();
        assert_eq!(regions, vec!["NORTE", "SUL"]);
    }

    #[test]
    fn query_region_means_one_row_per_group_within_bounds() {
        let db = sample_db();
        for year in db.query_years().unwrap() {
            let means = db.query_region_means(&year).unwrap();
            let mut regions: Vec<&str> = means.iter().map(|m| m.region.as_str()).collect();
            regions.sort();
            regions.dedup();
            assert_eq!(regions.len(), means.len());

            let y: i32 = year.parse().unwrap();
            let rows = db.query_year_range(y, y).unwrap();
            for mean in &means {
                let prices: Vec<f64> = rows
                    .iter()
                    .filter(|r| r.region == mean.region)
                    .map(|r| r.resale_price)
                    .collect();
                let min = prices.iter().cloned().fold(f64::MAX, f64::min);
                let max = prices.iter().cloned().fold(f64::MIN, f64::max);
                assert!(min <= mean.mean_price && mean.mean_price <= max);
            }
            assert!(means.windows(2).all(|w| w[0].mean_price <= w[1].mean_price));
        }
    }

    #[test]
    fn query_state_means_end_to_end() {
        let db = scenario_db();
        let means = db.query_state_means("2020", "SE").unwrap();
        let states: Vec<(&str, f64)> = means
            .iter()
            .map(|m| (m.state.as_str(), m.mean_price))
            .collect();
        // tie at 5.10: SP was seen first
        assert_eq!(states, vec![("SP", 5.1), ("RJ", 5.1)]);
        let json = serde_json::to_value(&means).unwrap();
        assert_eq!(json[0]["mean_price"], "5.10");
        assert_eq!(json[1]["mean_price"], "5.10");
    }

    #[test]
    fn query_state_means_stay_within_region() {
        let db = sample_db();
        for year in db.query_years().unwrap() {
            for region in db.query_regions().unwrap() {
                let means = db.query_state_means(&year, &region).unwrap();
                assert!(means.iter().all(|m| m.region == region && m.year == year));
            }
        }
        let sul = db.query_state_means("2021", "SUL").unwrap();
        assert_eq!(sul.len(), 1);
        assert_eq!(sul[0].state, "PARANA");
    }

    #[test]
    fn query_state_means_unknown_region_is_empty() {
        let db = scenario_db();
        assert!(db.query_state_means("2020", "NORTE").unwrap().is_empty());
        assert!(db.query_state_means("1999", "SE").unwrap().is_empty());
    }

    #[test]
    fn query_states_series_filters_states_and_years() {
        let db = sample_db();
        let states = vec!["PARANA".to_string(), "RIO DE JANEIRO".to_string()];
        let all = db.query_states_series(&states, None).unwrap();
        assert_eq!(all.len(), 8);
        assert!(all.iter().all(|p| states.contains(&p.state)));
        assert!(all.windows(2).all(|w| w[0].date <= w[1].date));

        let only_2020 = db.query_states_series(&states, Some((2020, 2020))).unwrap();
        assert_eq!(only_2020.len(), 4);
        assert!(only_2020.iter().all(|p| p.date.starts_with("2020")));
    }

    #[test]
    fn query_states_series_no_states() {
        let db = sample_db();
        assert!(db.query_states_series(&[], None).unwrap().is_empty());
    }

    #[test]
    fn query_monthly_means_groups_by_month() {
        let db = scenario_db();
        let sp = db.query_monthly_means("SP").unwrap();
        assert_eq!(sp.len(), 2);
        assert_eq!(sp[0].date, "2020-01-01");
        assert!((sp[0].value - 5.1).abs() < 1e-9);
        assert_eq!(sp[1].date, "2021-03-01");
    }

    #[test]
    fn query_monthly_difference_aligns_on_month() {
        let db = scenario_db();
        let diff = db.query_monthly_difference("SP", "RJ").unwrap();
        let months: Vec<&str> = diff.iter().map(|d| d.month.as_str()).collect();
        assert_eq!(months, vec!["2020-01-01", "2020-02-01", "2021-03-01"]);
        // January has SP only, February RJ only
        assert_eq!(diff[0].difference, None);
        assert_eq!(diff[0].price_b, None);
        assert_eq!(diff[1].difference, None);
        assert_eq!(diff[1].price_a, None);
        assert!((diff[2].difference.unwrap() - (5.6 - 5.9)).abs() < 1e-9);
    }

    #[test]
    fn query_state_kpi_uses_first_and_latest_record() {
        let db = scenario_db();
        let kpi = db.query_state_kpi("SP").unwrap().unwrap();
        assert_eq!(kpi.latest_price, 5.6);
        assert_eq!(kpi.latest_date, "2021-03-10");
        assert_eq!(kpi.reference_price, 5.0);
        assert_eq!(kpi.reference_date, "2020-01-08");
        assert!((kpi.change_pct.unwrap() - 12.0).abs() < 1e-9);
        assert_eq!(kpi.reference_label, "2019");
        assert_eq!(kpi.current_label, "2021");
    }

    #[test]
    fn query_state_kpi_unknown_state() {
        let db = scenario_db();
        assert!(db.query_state_kpi("AC").unwrap().is_none());
    }

    #[test]
    fn query_states_series_matches_range_filter() {
        let db = sample_db();
        let states = db.query_states().unwrap();
        for (start, end) in [(2019, 2019), (2020, 2021), (2021, 2019)] {
            let series = db.query_states_series(&states, Some((start, end))).unwrap();
            let rows = db.query_year_range(start, end).unwrap();
            let series_dates: Vec<&str> = series.iter().map(|p| p.date.as_str()).collect();
            let range_dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
            assert_eq!(series_dates, range_dates);
        }
    }

    #[test]
    fn query_year_range_single_year() {
        let db = sample_db();
        let rows = db.query_year_range(2020, 2020).unwrap();
        assert_eq!(rows.len(), 6);
        assert!(rows.iter().all(|r| r.year == "2020"));
    }

    #[test]
    fn query_year_range_inclusive_bounds() {
        let db = sample_db();
        assert_eq!(db.query_year_range(2019, 2021).unwrap().len(), 13);
        assert_eq!(db.query_year_range(2020, 2021).unwrap().len(), 10);
    }

    #[test]
    fn query_year_range_outside_span_is_empty() {
        let db = sample_db();
        assert!(db.query_year_range(2030, 2040).unwrap().is_empty());
        assert!(db.query_year_range(1990, 2000).unwrap().is_empty());
        assert!(db.query_year_range(2021, 2019).unwrap().is_empty());
    }

    #[test]
    fn aggregations_are_idempotent() {
        let db = sample_db();
        let first = serde_json::to_string(&db.query_region_means("2020").unwrap()).unwrap();
        let second = serde_json::to_string(&db.query_region_means("2020").unwrap()).unwrap();
        assert_eq!(first, second);

        let first = serde_json::to_string(&db.query_state_means("2021", "SUDESTE").unwrap()).unwrap();
        let second = serde_json::to_string(&db.query_state_means("2021", "SUDESTE").unwrap()).unwrap();
        assert_eq!(first, second);

        assert_eq!(
            db.query_yearly_extremes().unwrap(),
            db.query_yearly_extremes().unwrap()
        );
    }

    // ───────────────────── Lookup Tests ─────────────────────

    #[test]
    fn query_lookups() {
        let db = sample_db();
        assert_eq!(db.query_years().unwrap(), vec!["2019", "2020", "2021"]);
        assert_eq!(db.query_regions().unwrap(), vec!["SUDESTE", "SUL"]);
        assert_eq!(
            db.query_states().unwrap(),
            vec!["PARANA", "RIO DE JANEIRO", "SAO PAULO"]
        );
        assert_eq!(db.query_year_bounds().unwrap(), Some((2019, 2021)));
    }

    #[test]
    fn query_contains() {
        let db = sample_db();
        assert!(db.contains_year("2020").unwrap());
        assert!(!db.contains_year("2022").unwrap());
        assert!(db.contains_region("SUL").unwrap());
        assert!(!db.contains_region("NORTE").unwrap());
        assert!(db.contains_state("PARANA").unwrap());
        assert!(!db.contains_state("ACRE").unwrap());
    }

    #[test]
    fn query_year_bounds_empty() {
        let db = Database::from_table(&CleanedTable::default()).unwrap();
        assert_eq!(db.query_year_bounds().unwrap(), None);
    }
}
