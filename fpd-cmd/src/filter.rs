//! The user-controlled filter state and the options it is chosen from.

use fpd_chart::Theme;
use fpd_db::Database;
use serde::{Deserialize, Serialize};

/// One field of [`FilterState`]; widgets declare the fields they read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    Year,
    Region,
    StatesMulti,
    StateA,
    StateB,
    DateRange,
    Theme,
}

impl FilterField {
    pub const ALL: [FilterField; 7] = [
        FilterField::Year,
        FilterField::Region,
        FilterField::StatesMulti,
        FilterField::StateA,
        FilterField::StateB,
        FilterField::DateRange,
        FilterField::Theme,
    ];
}

/// Current selection of every dashboard control. Sent by the client with
/// each update; the server keeps no session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub selected_year: String,
    pub selected_region: String,
    #[serde(default)]
    pub selected_states_multi: Vec<String>,
    pub selected_state_a: String,
    pub selected_state_b: String,
    /// Inclusive year bounds.
    pub date_range: (i32, i32),
    #[serde(default)]
    pub theme: Theme,
}

impl FilterState {
    /// Fields whose value differs from `previous`. Every field counts as
    /// changed when there is no previous state.
    pub fn changed_fields(&self, previous: Option<&FilterState>) -> Vec<FilterField> {
        let Some(previous) = previous else {
            return FilterField::ALL.to_vec();
        };
        FilterField::ALL
            .into_iter()
            .filter(|field| match field {
                FilterField::Year => self.selected_year != previous.selected_year,
                FilterField::Region => self.selected_region != previous.selected_region,
                FilterField::StatesMulti => {
                    self.selected_states_multi != previous.selected_states_multi
                }
                FilterField::StateA => self.selected_state_a != previous.selected_state_a,
                FilterField::StateB => self.selected_state_b != previous.selected_state_b,
                FilterField::DateRange => self.date_range != previous.date_range,
                FilterField::Theme => self.theme != previous.theme,
            })
            .collect()
    }
}

/// Values offered by the controls, plus the state the page starts in.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardOptions {
    pub years: Vec<String>,
    pub regions: Vec<String>,
    pub states: Vec<String>,
    pub year_min: i32,
    pub year_max: i32,
    pub default_state: FilterState,
}

impl DashboardOptions {
    /// Read the options from the snapshot.
    ///
    /// The default state selects the latest year, the first region, the
    /// first two states and the full year span.
    pub fn from_db(db: &Database) -> anyhow::Result<Self> {
        let years = db.query_years()?;
        let regions = db.query_regions()?;
        let states = db.query_states()?;
        let (year_min, year_max) = db
            .query_year_bounds()?
            .ok_or_else(|| anyhow::anyhow!("survey snapshot is empty"))?;

        let first = |values: &[String]| values.first().cloned().unwrap_or_default();
        let state_a = first(&states);
        let state_b = states.get(1).cloned().unwrap_or_else(|| state_a.clone());
        let default_state = FilterState {
            selected_year: years.last().cloned().unwrap_or_default(),
            selected_region: first(&regions),
            selected_states_multi: states.iter().take(2).cloned().collect(),
            selected_state_a: state_a,
            selected_state_b: state_b,
            date_range: (year_min, year_max),
            theme: Theme::default(),
        };

        Ok(DashboardOptions {
            years,
            regions,
            states,
            year_min,
            year_max,
            default_state,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use fpd_survey::clean_csv;

    static SAMPLE_CSV: &str = include_str!("../../fixtures/gas_prices_sample.csv");

    pub(crate) fn sample_db() -> Database {
        let table = clean_csv(SAMPLE_CSV.as_bytes()).unwrap();
        Database::from_table(&table).unwrap()
    }

    pub(crate) fn sample_state() -> FilterState {
        DashboardOptions::from_db(&sample_db()).unwrap().default_state
    }

    #[test]
    fn options_from_sample() {
        let options = DashboardOptions::from_db(&sample_db()).unwrap();
        assert_eq!(options.years, vec!["2019", "2020", "2021"]);
        assert_eq!(options.regions, vec!["SUDESTE", "SUL"]);
        assert_eq!(options.states, vec!["PARANA", "RIO DE JANEIRO", "SAO PAULO"]);
        assert_eq!((options.year_min, options.year_max), (2019, 2021));
    }

    #[test]
    fn default_state_references_present_values() {
        let state = sample_state();
        assert_eq!(state.selected_year, "2021");
        assert_eq!(state.selected_region, "SUDESTE");
        assert_eq!(state.selected_states_multi, vec!["PARANA", "RIO DE JANEIRO"]);
        assert_eq!(state.selected_state_a, "PARANA");
        assert_eq!(state.selected_state_b, "RIO DE JANEIRO");
        assert_eq!(state.date_range, (2019, 2021));
        assert_eq!(state.theme, Theme::Light);
    }

    #[test]
    fn no_previous_state_changes_everything() {
        let state = sample_state();
        assert_eq!(state.changed_fields(None), FilterField::ALL.to_vec());
        assert!(state.changed_fields(Some(&state)).is_empty());
    }

    #[test]
    fn changed_fields_reports_each_difference() {
        let previous = sample_state();
        let mut current = previous.clone();
        current.selected_year = "2020".into();
        current.theme = Theme::Dark;
        assert_eq!(
            current.changed_fields(Some(&previous)),
            vec![FilterField::Year, FilterField::Theme]
        );
    }

    #[test]
    fn filter_state_json_shape() {
        let json = r#"{
            "selected_year": "2020",
            "selected_region": "SUL",
            "selected_states_multi": ["PARANA"],
            "selected_state_a": "PARANA",
            "selected_state_b": "SAO PAULO",
            "date_range": [2019, 2020],
            "theme": "dark"
        }"#;
        let state: FilterState = serde_json::from_str(json).unwrap();
        assert_eq!(state.date_range, (2019, 2020));
        assert_eq!(state.theme, Theme::Dark);
    }
}
