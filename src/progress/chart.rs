//! Score history chart.
//!
//! The service lists assessments most recent first; the chart runs oldest
//! first. Labels are positional ("Week 1".."Week N") regardless of how the
//! assessments fall on the calendar.

use serde::Serialize;

use crate::api::AssessmentSummary;
use crate::screen::display_date;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub score: f64,
    pub date: String,
}

pub fn project_chart(history: &[AssessmentSummary]) -> Vec<ChartPoint> {
    history
        .iter()
        .rev()
        .enumerate()
        .map(|(i, assessment)| ChartPoint {
            label: format!("Week {}", i + 1),
            score: assessment.burnout_score,
            date: display_date(&assessment.created_at),
        })
        .collect()
}
