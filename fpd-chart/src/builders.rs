//! One builder per dashboard widget.
//!
//! Builders only reshape a derived table into a [`ChartSpec`]; every
//! aggregate is computed upstream by the database queries.

use crate::spec::{Annotation, Axis, Band, ChartKind, ChartSpec, Indicator, Trace, Values};
use crate::theme::Theme;
use fpd_db::models::{MonthlyDifference, RegionMean, StateKpi, StateMean, StatePricePoint, YearlyExtremes};
use fpd_survey::record::RESALE_PRICE_LABEL;

const PRICE_AXIS: &str = RESALE_PRICE_LABEL;

/// Space left on each side of the bars so the labels fit.
const BAR_PADDING: f64 = 0.2;

fn price_label(value: f64) -> String {
    format!("{:.2}", value)
}

/// Axis range around `values` padded by [`BAR_PADDING`], never below zero.
fn padded_range(values: impl Iterator<Item = f64>) -> Option<[f64; 2]> {
    let (min, max) = values.fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min > max {
        return None;
    }
    Some([(min - BAR_PADDING).max(0.0), max + BAR_PADDING])
}

/// Yearly maximum and minimum price as two lines.
pub fn yearly_extremes_chart(rows: &[YearlyExtremes], theme: Theme) -> ChartSpec {
    let palette = theme.palette();
    let years: Vec<String> = rows.iter().map(|r| r.year.clone()).collect();
    let mut spec = ChartSpec::new(ChartKind::Line, "Highest and lowest price per year", theme.template());
    spec.traces = vec![
        Trace {
            name: "Max".to_string(),
            x: Values::Labels(years.clone()),
            y: Values::Numbers(rows.iter().map(|r| Some(r.max_price)).collect()),
            text: None,
            color: palette.primary,
        },
        Trace {
            name: "Min".to_string(),
            x: Values::Labels(years),
            y: Values::Numbers(rows.iter().map(|r| Some(r.min_price)).collect()),
            text: None,
            color: palette.secondary,
        },
    ];
    spec.x_axis.title = Some("Year".to_string());
    spec.y_axis.title = Some(PRICE_AXIS.to_string());
    spec
}

fn mean_bars(
    title: String,
    labels: Vec<String>,
    means: Vec<f64>,
    theme: Theme,
) -> ChartSpec {
    let mut spec = ChartSpec::new(ChartKind::HorizontalBar, title, theme.template());
    spec.x_axis = Axis {
        title: Some(PRICE_AXIS.to_string()),
        range: padded_range(means.iter().copied()),
    };
    spec.traces = vec![Trace {
        name: "Mean price".to_string(),
        text: Some(means.iter().map(|m| price_label(*m)).collect()),
        x: Values::Numbers(means.into_iter().map(Some).collect()),
        y: Values::Labels(labels),
        color: theme.palette().primary,
    }];
    spec
}

/// Mean price per region as horizontal bars, in the given order.
pub fn region_means_chart(rows: &[RegionMean], theme: Theme) -> ChartSpec {
    let year = rows.first().map(|r| r.year.as_str()).unwrap_or_default();
    mean_bars(
        format!("Mean price per region in {}", year),
        rows.iter().map(|r| r.region.clone()).collect(),
        rows.iter().map(|r| r.mean_price).collect(),
        theme,
    )
}

/// Mean price per state of one region as horizontal bars.
pub fn state_means_chart(rows: &[StateMean], theme: Theme) -> ChartSpec {
    let (year, region) = rows
        .first()
        .map(|r| (r.year.as_str(), r.region.as_str()))
        .unwrap_or_default();
    mean_bars(
        format!("Mean price per state of {} in {}", region, year),
        rows.iter().map(|r| r.state.clone()).collect(),
        rows.iter().map(|r| r.mean_price).collect(),
        theme,
    )
}

/// One price line per state; states appear in order of first observation.
pub fn states_series_chart(points: &[StatePricePoint], theme: Theme) -> ChartSpec {
    let mut order: Vec<&str> = Vec::new();
    for point in points {
        if !order.contains(&point.state.as_str()) {
            order.push(point.state.as_str());
        }
    }
    let mut spec = ChartSpec::new(ChartKind::Line, "Resale price by state", theme.template());
    spec.traces = order
        .iter()
        .enumerate()
        .map(|(i, state)| {
            let series: Vec<&StatePricePoint> = points.iter().filter(|p| p.state == *state).collect();
            Trace {
                name: state.to_string(),
                x: Values::Labels(series.iter().map(|p| p.date.clone()).collect()),
                y: Values::Numbers(series.iter().map(|p| Some(p.price)).collect()),
                text: None,
                color: theme.series_color(i),
            }
        })
        .collect();
    spec.x_axis.title = Some("Date".to_string());
    spec.y_axis.title = Some(PRICE_AXIS.to_string());
    spec
}

/// Monthly difference `state_a - state_b`, with the regions above and
/// below zero shaded and labelled.
pub fn comparison_chart(rows: &[MonthlyDifference], state_a: &str, state_b: &str, theme: Theme) -> ChartSpec {
    let palette = theme.palette();
    let mut spec = ChartSpec::new(
        ChartKind::Line,
        format!("{} vs {}", state_a, state_b),
        theme.template(),
    );
    spec.traces = vec![Trace {
        name: format!("{} - {}", state_a, state_b),
        x: Values::Labels(rows.iter().map(|r| r.month.clone()).collect()),
        y: Values::Numbers(rows.iter().map(|r| r.difference).collect()),
        text: None,
        color: palette.primary,
    }];
    spec.bands = vec![
        Band {
            y0: Some(0.0),
            y1: None,
            color: palette.negative,
            opacity: 0.1,
        },
        Band {
            y0: None,
            y1: Some(0.0),
            color: palette.positive,
            opacity: 0.1,
        },
    ];
    let extent = rows
        .iter()
        .filter_map(|r| r.difference)
        .fold(0.0_f64, |acc, d| acc.max(d.abs()));
    let offset = if extent > 0.0 { extent / 2.0 } else { 0.5 };
    spec.annotations = vec![
        Annotation {
            text: format!("{} more expensive", state_a),
            x_fraction: 0.1,
            y: offset,
        },
        Annotation {
            text: format!("{} more expensive", state_b),
            x_fraction: 0.1,
            y: -offset,
        },
    ];
    spec.caption = Some(format!(
        "Monthly mean resale price of {} minus {}. Months surveyed in only one state are left blank.",
        state_a, state_b
    ));
    spec.x_axis.title = Some("Month".to_string());
    spec.y_axis.title = Some(PRICE_AXIS.to_string());
    spec
}

/// Latest price of a state with its change since the first survey.
pub fn kpi_indicator(kpi: &StateKpi, theme: Theme) -> ChartSpec {
    let mut spec = ChartSpec::new(
        ChartKind::Indicator,
        format!("{} ({} - {})", kpi.state, kpi.reference_label, kpi.current_label),
        theme.template(),
    );
    spec.indicator = Some(Indicator {
        value: kpi.latest_price,
        reference: kpi.reference_price,
        delta_pct: kpi.change_pct,
        prefix: "R$",
        value_format: ".2f",
    });
    spec
}

/// Stand-in for a widget that has nothing to show.
pub fn placeholder_chart(message: &str, theme: Theme) -> ChartSpec {
    let mut spec = ChartSpec::new(ChartKind::Placeholder, message, theme.template());
    spec.annotations = vec![Annotation {
        text: message.to_string(),
        x_fraction: 0.5,
        y: 0.5,
    }];
    spec
}
