//! Widgets of the dashboard and the dispatcher that re-renders them.
//!
//! Each [`Widget`] declares the filter fields it reads. On an update only the
//! widgets whose dependencies changed are rendered, each one independently:
//! a failing widget is replaced by a placeholder and never blocks the others.

use crate::filter::{FilterField, FilterState};
use fpd_chart::builders;
use fpd_chart::{ChartSpec, Theme};
use fpd_db::Database;
use fpd_survey::DashboardError;
use log::{debug, error, warn};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Widget {
    YearlyExtremes,
    RegionMeans,
    StateMeans,
    StatesSeries,
    Comparison,
    KpiA,
    KpiB,
}

impl Widget {
    pub const ALL: [Widget; 7] = [
        Widget::YearlyExtremes,
        Widget::RegionMeans,
        Widget::StateMeans,
        Widget::StatesSeries,
        Widget::Comparison,
        Widget::KpiA,
        Widget::KpiB,
    ];

    /// Identifier of the widget's container on the page.
    pub fn name(&self) -> &'static str {
        match self {
            Widget::YearlyExtremes => "yearly_extremes",
            Widget::RegionMeans => "region_means",
            Widget::StateMeans => "state_means",
            Widget::StatesSeries => "states_series",
            Widget::Comparison => "comparison",
            Widget::KpiA => "kpi_a",
            Widget::KpiB => "kpi_b",
        }
    }

    /// Filter fields this widget reads.
    pub fn dependencies(&self) -> &'static [FilterField] {
        use FilterField as F;
        match self {
            Widget::YearlyExtremes => &[F::Theme],
            Widget::RegionMeans => &[F::Year, F::Theme],
            Widget::StateMeans => &[F::Year, F::Region, F::Theme],
            Widget::StatesSeries => &[F::StatesMulti, F::DateRange, F::Theme],
            Widget::Comparison => &[F::StateA, F::StateB, F::Theme],
            Widget::KpiA => &[F::StateA, F::Theme],
            Widget::KpiB => &[F::StateB, F::Theme],
        }
    }

    pub fn affected_by(&self, changed: &[FilterField]) -> bool {
        self.dependencies().iter().any(|dep| changed.contains(dep))
    }
}

/// Widgets to re-render when moving from `previous` to `current`.
pub fn affected_widgets(previous: Option<&FilterState>, current: &FilterState) -> Vec<Widget> {
    let changed = current.changed_fields(previous);
    Widget::ALL
        .into_iter()
        .filter(|widget| widget.affected_by(&changed))
        .collect()
}

/// Render every affected widget, keyed by its container name.
pub fn dispatch(
    db: &Database,
    previous: Option<&FilterState>,
    current: &FilterState,
) -> BTreeMap<&'static str, ChartSpec> {
    let widgets = affected_widgets(previous, current);
    debug!(
        "dispatch: rendering {:?}",
        widgets.iter().map(Widget::name).collect::<Vec<_>>()
    );
    widgets
        .into_iter()
        .map(|widget| (widget.name(), render_widget(db, widget, current)))
        .collect()
}

/// Render one widget, turning any failure into a placeholder chart.
pub fn render_widget(db: &Database, widget: Widget, state: &FilterState) -> ChartSpec {
    match build_widget(db, widget, state) {
        Ok(spec) => spec,
        Err(err) => match err.downcast_ref::<DashboardError>() {
            Some(e) if e.is_recoverable() => {
                warn!("{}: {}", widget.name(), e);
                builders::placeholder_chart(&e.to_string(), state.theme)
            }
            _ => {
                error!("{}: failed to render: {:#}", widget.name(), err);
                builders::placeholder_chart("Chart unavailable", state.theme)
            }
        },
    }
}

fn build_widget(db: &Database, widget: Widget, state: &FilterState) -> anyhow::Result<ChartSpec> {
    let theme = state.theme;
    match widget {
        Widget::YearlyExtremes => {
            let rows = non_empty(db.query_yearly_extremes()?, "yearly extremes")?;
            Ok(builders::yearly_extremes_chart(&rows, theme))
        }
        Widget::RegionMeans => {
            check_year(db, &state.selected_year)?;
            let rows = non_empty(
                db.query_region_means(&state.selected_year)?,
                &format!("regions in {}", state.selected_year),
            )?;
            Ok(builders::region_means_chart(&rows, theme))
        }
        Widget::StateMeans => {
            check_year(db, &state.selected_year)?;
            if !db.contains_region(&state.selected_region)? {
                return Err(invalid("region", &state.selected_region));
            }
            let rows = non_empty(
                db.query_state_means(&state.selected_year, &state.selected_region)?,
                &format!("{} in {}", state.selected_region, state.selected_year),
            )?;
            Ok(builders::state_means_chart(&rows, theme))
        }
        Widget::StatesSeries => {
            for selected in &state.selected_states_multi {
                check_state(db, selected)?;
            }
            let rows = non_empty(
                db.query_states_series(&state.selected_states_multi, Some(state.date_range))?,
                "the selected states and years",
            )?;
            Ok(builders::states_series_chart(&rows, theme))
        }
        Widget::Comparison => {
            check_state(db, &state.selected_state_a)?;
            check_state(db, &state.selected_state_b)?;
            let rows = non_empty(
                db.query_monthly_difference(&state.selected_state_a, &state.selected_state_b)?,
                "the selected states",
            )?;
            Ok(builders::comparison_chart(
                &rows,
                &state.selected_state_a,
                &state.selected_state_b,
                theme,
            ))
        }
        Widget::KpiA => kpi(db, &state.selected_state_a, theme),
        Widget::KpiB => kpi(db, &state.selected_state_b, theme),
    }
}

fn kpi(db: &Database, state: &str, theme: Theme) -> anyhow::Result<ChartSpec> {
    check_state(db, state)?;
    let kpi = db
        .query_state_kpi(state)?
        .ok_or_else(|| DashboardError::EmptyAggregate(state.to_string()))?;
    Ok(builders::kpi_indicator(&kpi, theme))
}

fn invalid(field: &str, value: &str) -> anyhow::Error {
    DashboardError::InvalidFilterSelection {
        field: field.to_string(),
        value: value.to_string(),
    }
    .into()
}

fn check_year(db: &Database, year: &str) -> anyhow::Result<()> {
    if db.contains_year(year)? {
        Ok(())
    } else {
        Err(invalid("year", year))
    }
}

fn check_state(db: &Database, state: &str) -> anyhow::Result<()> {
    if db.contains_state(state)? {
        Ok(())
    } else {
        Err(invalid("state", state))
    }
}

fn non_empty<T>(rows: Vec<T>, what: &str) -> anyhow::Result<Vec<T>> {
    if rows.is_empty() {
        Err(DashboardError::EmptyAggregate(what.to_string()).into())
    } else {
        Ok(rows)
    }
}
