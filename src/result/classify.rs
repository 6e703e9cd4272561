//! Pure classification helpers for the result view.
//!
//! The score band and the stage severity are derived independently and are
//! shown side by side. They can disagree (a score of 30 with a custom stage
//! label is "early" by band and "neutral" by severity); neither is adjusted
//! to match the other.

use serde::Serialize;

/// Client-side band of a 0–100 burnout score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Healthy,
    Early,
    Moderate,
    Severe,
}

impl ScoreBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Early => "early",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        }
    }
}

/// [0,25] healthy, (25,50] early, (50,75] moderate, above 75 severe.
pub fn score_band(score: f64) -> ScoreBand {
    if score <= 25.0 {
        ScoreBand::Healthy
    } else if score <= 50.0 {
        ScoreBand::Early
    } else if score <= 75.0 {
        ScoreBand::Moderate
    } else {
        ScoreBand::Severe
    }
}

/// Styling derived from the service's free-text stage label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageSeverity {
    Healthy,
    Early,
    Moderate,
    Severe,
    Neutral,
}

impl StageSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Early => "early",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
            Self::Neutral => "neutral",
        }
    }
}

/// Checked in this order; the first substring hit wins.
const SEVERITY_KEYWORDS: [(&str, StageSeverity); 4] = [
    ("healthy", StageSeverity::Healthy),
    ("early", StageSeverity::Early),
    ("moderate", StageSeverity::Moderate),
    ("severe", StageSeverity::Severe),
];

pub fn stage_severity(stage: &str) -> StageSeverity {
    let lowered = stage.to_lowercase();
    SEVERITY_KEYWORDS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, severity)| *severity)
        .unwrap_or(StageSeverity::Neutral)
}

/// Colour of a breakdown bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarUrgency {
    High,
    Medium,
    Low,
}

pub fn bar_urgency(percentage: f64) -> BarUrgency {
    if percentage > 20.0 {
        BarUrgency::High
    } else if percentage > 10.0 {
        BarUrgency::Medium
    } else {
        BarUrgency::Low
    }
}

/// Bar width as a share of the full track.
pub fn bar_width(percentage: f64) -> f64 {
    if percentage.is_nan() {
        0.0
    } else {
        percentage.clamp(0.0, 100.0)
    }
}

/// `perceived_stress` → `Perceived Stress`.
pub fn factor_display_name(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_band_partitions_full_range() {
        // Sweep in tenths: every score lands in exactly one band and bands
        // never move backwards as the score grows.
        let mut previous = ScoreBand::Healthy;
        let order = |b: ScoreBand| b as u8;
        for tenth in 0..=1000 {
            let score = f64::from(tenth) / 10.0;
            let band = score_band(score);
            assert!(order(band) >= order(previous), "band regressed at {score}");
            previous = band;
        }
        assert_eq!(score_band(0.0), ScoreBand::Healthy);
        assert_eq!(score_band(25.0), ScoreBand::Healthy);
        assert_eq!(score_band(25.1), ScoreBand::Early);
        assert_eq!(score_band(50.0), ScoreBand::Early);
        assert_eq!(score_band(50.1), ScoreBand::Moderate);
        assert_eq!(score_band(75.0), ScoreBand::Moderate);
        assert_eq!(score_band(75.1), ScoreBand::Severe);
        assert_eq!(score_band(100.0), ScoreBand::Severe);
    }

    #[test]
    fn stage_severity_priority_order() {
        assert_eq!(stage_severity("Healthy"), StageSeverity::Healthy);
        assert_eq!(stage_severity("EARLY BURNOUT"), StageSeverity::Early);
        assert_eq!(stage_severity("Moderate Burnout"), StageSeverity::Moderate);
        assert_eq!(stage_severity("severe burnout"), StageSeverity::Severe);
        // Several keywords: the earlier one in priority order wins.
        assert_eq!(stage_severity("early to severe"), StageSeverity::Early);
        assert_eq!(stage_severity("severe, was healthy"), StageSeverity::Healthy);
        assert_eq!(stage_severity(""), StageSeverity::Neutral);
        assert_eq!(stage_severity("Custom Label"), StageSeverity::Neutral);
    }

    #[test]
    fn stage_severity_is_deterministic() {
        for stage in ["Healthy", "Custom", "Moderate Burnout", "sEvErE"] {
            assert_eq!(stage_severity(stage), stage_severity(stage));
        }
    }

    #[test]
    fn severe_score_and_stage_agree() {
        assert_eq!(score_band(82.4), ScoreBand::Severe);
        assert_eq!(stage_severity("Severe Burnout"), StageSeverity::Severe);
    }

    #[test]
    fn band_and_severity_may_disagree() {
        assert_eq!(score_band(30.0), ScoreBand::Early);
        assert_eq!(stage_severity("Custom Label"), StageSeverity::Neutral);
    }

    #[test]
    fn bar_urgency_thresholds() {
        assert_eq!(bar_urgency(28.0), BarUrgency::High);
        assert_eq!(bar_urgency(20.1), BarUrgency::High);
        assert_eq!(bar_urgency(20.0), BarUrgency::Medium);
        assert_eq!(bar_urgency(10.1), BarUrgency::Medium);
        assert_eq!(bar_urgency(10.0), BarUrgency::Low);
        assert_eq!(bar_urgency(0.0), BarUrgency::Low);
    }

    #[test]
    fn bar_width_clamps() {
        assert_eq!(bar_width(-5.0), 0.0);
        assert_eq!(bar_width(42.5), 42.5);
        assert_eq!(bar_width(140.0), 100.0);
        assert_eq!(bar_width(f64::NAN), 0.0);
    }

    #[test]
    fn factor_names_are_humanised() {
        assert_eq!(factor_display_name("perceived_stress"), "Perceived Stress");
        assert_eq!(factor_display_name("sleep_quality"), "Sleep Quality");
        assert_eq!(factor_display_name("screen_time"), "Screen Time");
        assert_eq!(factor_display_name("workload"), "Workload");
    }
}
