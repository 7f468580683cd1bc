//! Food waste reporting: load a CSV of catered events, summarize how much
//! food each event wasted, and show the results as a small three-tab
//! dashboard drawn with vello.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use waste_tracker::{Dataset, dashboard::{Dashboard, Tab}};
//!
//! let dataset = Dataset::load("food_wastage_data.csv")?;
//! let dashboard = Dashboard::new(&dataset)?;
//! let state = dashboard.state(Tab::AdditionalInsights, Some("Wedding"))?;
//! dashboard.download(&state)?.save(Path::new("."))?;
//! # Ok::<(), waste_tracker::Error>(())
//! ```

pub mod aggregate;
mod axes;
mod bounds;
pub mod config;
pub mod dashboard;
mod dataset;
mod error;
mod legend;
mod marker;
mod plot;
pub mod render;
pub mod theme;

pub use axes::{
  Axes, BoxPlotAxes, BoxStats, LineAxes, LinearFit, PieAxes, PieSlice, ScatterAxes, Trendline,
  TrendlineKind,
};
pub use bounds::{Bounds, DataBounds, DataRange, Range};
pub use config::Config;
pub use dataset::{EVENT_TYPE, FOOD_TYPE, GUESTS, Dataset, Record, WASTAGE, records};
pub use error::{Error, Result, ResultExt};
pub use marker::Marker;
pub use plot::{Axis, Plot};
