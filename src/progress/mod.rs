//! Progress screen: trend analysis, score history chart and weekly
//! self-report records.

pub mod chart;
pub mod tracker;
pub mod trend;

pub use chart::{ChartPoint, project_chart};
pub use tracker::{ProgressAction, ProgressForm, ProgressState, ProgressTracker, ProgressView};
pub use trend::{TrendDisplay, TrendTone};
