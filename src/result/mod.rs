//! Result screen: score, stage and breakdown of one assessment.

pub mod classify;
pub mod presenter;

pub use classify::{BarUrgency, ScoreBand, StageSeverity, bar_urgency, score_band, stage_severity};
pub use presenter::{FactorView, ResultAction, ResultPresenter, ResultState, ResultView};
