//! How the service's trend verdict is presented.

use serde::Serialize;

use crate::api::{Trend, TrendSummary};

/// Framing of the trend banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendTone {
    Positive,
    Negative,
    Cautionary,
    Informational,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendDisplay {
    pub indicator: &'static str,
    pub tone: TrendTone,
    /// Capitalised trend label, e.g. "Improving".
    pub label: String,
    /// Signed change, absent when zero.
    pub change: Option<String>,
    pub recommendation: String,
}

impl TrendDisplay {
    pub fn new(summary: &TrendSummary) -> Self {
        let (indicator, tone) = presentation(&summary.trend);
        Self {
            indicator,
            tone,
            label: capitalise(summary.trend.as_str()),
            change: format_change(summary.change),
            recommendation: summary.recommendation.clone(),
        }
    }
}

pub fn presentation(trend: &Trend) -> (&'static str, TrendTone) {
    match trend {
        Trend::Improving => ("📈", TrendTone::Positive),
        Trend::Declining => ("📉", TrendTone::Negative),
        Trend::Stagnant => ("➡️", TrendTone::Cautionary),
        Trend::Other(_) => ("📊", TrendTone::Informational),
    }
}

/// One decimal with an explicit sign; `None` for no change.
pub fn format_change(change: f64) -> Option<String> {
    if change == 0.0 || change.is_nan() {
        None
    } else if change > 0.0 {
        Some(format!("+{change:.1}"))
    } else {
        Some(format!("{change:.1}"))
    }
}

fn capitalise(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
