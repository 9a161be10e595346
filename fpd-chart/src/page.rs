//! The dashboard page served at `/`.
//!
//! The page is a single HTML document with the controls and one container
//! per widget; the script asks the server for the options and re-renders the
//! widgets returned by `POST /api/update`.

pub const INDEX_HTML: &str = include_str!("../assets/index.html");
pub const DASHBOARD_JS: &str = include_str!("../assets/js/dashboard.js");

/// Marker in `index.html` replaced by the inlined script.
const SCRIPT_MARKER: &str = "<!-- dashboard-script -->";

/// Names of the chart containers on the page, in layout order.
pub const WIDGET_CONTAINERS: [&str; 7] = [
    "yearly_extremes",
    "region_means",
    "state_means",
    "states_series",
    "comparison",
    "kpi_a",
    "kpi_b",
];

/// The full page with the script inlined.
pub fn render_index() -> String {
    INDEX_HTML.replace(
        SCRIPT_MARKER,
        &format!("<script>\n{}\n</script>", DASHBOARD_JS),
    )
}
