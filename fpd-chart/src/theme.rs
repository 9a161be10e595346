//! Light and dark themes. Switching theme swaps the template of every chart.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Colors used by the builders for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub positive: &'static str,
    pub negative: &'static str,
    pub muted: &'static str,
    /// Cycled through for multi-series charts.
    pub series: [&'static str; 6],
}

const LIGHT: Palette = Palette {
    primary: "#78c2ad",
    secondary: "#f3969a",
    positive: "#56cc9d",
    negative: "#ff7851",
    muted: "#888888",
    series: ["#78c2ad", "#f3969a", "#6cc3d5", "#ffce67", "#ff7851", "#5a5a5a"],
};

const DARK: Palette = Palette {
    primary: "#2a9fd6",
    secondary: "#9933cc",
    positive: "#77b300",
    negative: "#cc0000",
    muted: "#adafae",
    series: ["#2a9fd6", "#9933cc", "#77b300", "#ff8800", "#cc0000", "#adafae"],
};

impl Theme {
    /// Name of the chart template applied by the front end.
    pub fn template(&self) -> &'static str {
        match self {
            Theme::Light => "minty",
            Theme::Dark => "cyborg",
        }
    }

    pub fn palette(&self) -> &'static Palette {
        match self {
            Theme::Light => &LIGHT,
            Theme::Dark => &DARK,
        }
    }

    /// Color for the `index`-th series of a chart.
    pub fn series_color(&self, index: usize) -> &'static str {
        let series = &self.palette().series;
        series[index % series.len()]
    }
}
