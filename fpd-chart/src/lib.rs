//! Chart builders for the fuel price dashboard.
//!
//! This crate provides:
//! - `spec`: serializable chart specifications rendered by the browser
//! - `theme`: light/dark templates and palettes
//! - `builders`: one builder per dashboard widget, derived table in, spec out
//! - `page`: the embedded dashboard page and its script

pub mod builders;
pub mod page;
pub mod spec;
pub mod theme;

pub use spec::ChartSpec;
pub use theme::Theme;
