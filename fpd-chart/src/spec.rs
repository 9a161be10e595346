//! Serializable chart specifications.
//!
//! A [`ChartSpec`] carries everything the browser needs to draw one widget:
//! the kind of chart, its traces, axis ranges, annotations and the template
//! of the active theme. Specs hold no floating state of their own, so the
//! same input always serializes to the same JSON.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    HorizontalBar,
    Indicator,
    Placeholder,
}

/// Values along one axis of a trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Values {
    /// Numeric values; `None` leaves a gap in a line.
    Numbers(Vec<Option<f64>>),
    /// Category labels or ISO dates.
    Labels(Vec<String>),
}

impl Values {
    pub fn len(&self) -> usize {
        match self {
            Values::Numbers(v) => v.len(),
            Values::Labels(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub name: String,
    pub x: Values,
    pub y: Values,
    /// Per-point labels drawn on the chart.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    pub color: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
}

/// A shaded horizontal band, e.g. "above zero".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Band {
    /// Lower bound; `None` extends to the bottom of the plot.
    pub y0: Option<f64>,
    /// Upper bound; `None` extends to the top of the plot.
    pub y1: Option<f64>,
    pub color: &'static str,
    pub opacity: f64,
}

/// Free text placed in plot coordinates (x as a fraction of the width).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub text: String,
    pub x_fraction: f64,
    pub y: f64,
}

/// Single value with a relative delta against a reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicator {
    pub value: f64,
    pub reference: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_pct: Option<f64>,
    pub prefix: &'static str,
    pub value_format: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub traces: Vec<Trace>,
    pub x_axis: Axis,
    pub y_axis: Axis,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bands: Vec<Band>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicator: Option<Indicator>,
    pub template: &'static str,
}

impl ChartSpec {
    /// An empty spec of the given kind.
    pub fn new(kind: ChartKind, title: impl Into<String>, template: &'static str) -> Self {
        ChartSpec {
            kind,
            title: title.into(),
            traces: Vec::new(),
            x_axis: Axis::default(),
            y_axis: Axis::default(),
            bands: Vec::new(),
            annotations: Vec::new(),
            caption: None,
            indicator: None,
            template,
        }
    }
}
