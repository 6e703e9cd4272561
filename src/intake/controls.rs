//! Response controls: the seven sliders and their fixed domains.
//!
//! Values are clamped and snapped to the control's step when set, so a
//! [`ResponseSet`] built through these controls is always in range.

use crate::api::ResponseSet;

/// Range, granularity and default of one control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl Domain {
    const fn hours(max: f64, default: f64) -> Self {
        Self {
            min: 0.0,
            max,
            step: 0.5,
            default,
        }
    }

    const fn scale(default: f64) -> Self {
        Self {
            min: 1.0,
            max: 5.0,
            step: 1.0,
            default,
        }
    }

    /// Clamp into range and snap to the nearest step.
    pub fn constrain(&self, raw: f64) -> f64 {
        let clamped = raw.clamp(self.min, self.max);
        let steps = ((clamped - self.min) / self.step).round();
        (self.min + steps * self.step).clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseField {
    DailyWorkHours,
    SleepDuration,
    SleepQuality,
    EmotionalExhaustion,
    MotivationLevel,
    ScreenTime,
    PerceivedStress,
}

impl ResponseField {
    pub const ALL: [ResponseField; 7] = [
        Self::DailyWorkHours,
        Self::SleepDuration,
        Self::SleepQuality,
        Self::EmotionalExhaustion,
        Self::MotivationLevel,
        Self::ScreenTime,
        Self::PerceivedStress,
    ];

    pub fn domain(&self) -> Domain {
        match self {
            Self::DailyWorkHours => Domain::hours(16.0, 8.0),
            Self::SleepDuration => Domain::hours(12.0, 7.0),
            Self::ScreenTime => Domain::hours(16.0, 3.0),
            Self::SleepQuality
            | Self::EmotionalExhaustion
            | Self::MotivationLevel
            | Self::PerceivedStress => Domain::scale(3.0),
        }
    }

    /// Wire/field name.
    pub fn key(&self) -> &'static str {
        match self {
            Self::DailyWorkHours => "daily_work_hours",
            Self::SleepDuration => "sleep_duration",
            Self::SleepQuality => "sleep_quality",
            Self::EmotionalExhaustion => "emotional_exhaustion",
            Self::MotivationLevel => "motivation_level",
            Self::ScreenTime => "screen_time",
            Self::PerceivedStress => "perceived_stress",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::DailyWorkHours => "Daily Work/Study Hours",
            Self::SleepDuration => "Sleep Duration",
            Self::SleepQuality => "Sleep Quality",
            Self::EmotionalExhaustion => "Emotional Exhaustion Level",
            Self::MotivationLevel => "Motivation and Engagement",
            Self::ScreenTime => "Screen Time per Day",
            Self::PerceivedStress => "Perceived Stress Level",
        }
    }

    /// Hour-valued controls versus 1–5 scales.
    pub fn is_hours(&self) -> bool {
        matches!(
            self,
            Self::DailyWorkHours | Self::SleepDuration | Self::ScreenTime
        )
    }

    pub fn get(&self, set: &ResponseSet) -> f64 {
        match self {
            Self::DailyWorkHours => set.daily_work_hours,
            Self::SleepDuration => set.sleep_duration,
            Self::SleepQuality => f64::from(set.sleep_quality),
            Self::EmotionalExhaustion => f64::from(set.emotional_exhaustion),
            Self::MotivationLevel => f64::from(set.motivation_level),
            Self::ScreenTime => set.screen_time,
            Self::PerceivedStress => f64::from(set.perceived_stress),
        }
    }

    /// Apply `raw` through the control and return the stored value.
    /// Non-finite input leaves the current value untouched.
    pub fn set(&self, set: &mut ResponseSet, raw: f64) -> f64 {
        if !raw.is_finite() {
            return self.get(set);
        }
        let value = self.domain().constrain(raw);
        match self {
            Self::DailyWorkHours => set.daily_work_hours = value,
            Self::SleepDuration => set.sleep_duration = value,
            Self::ScreenTime => set.screen_time = value,
            Self::SleepQuality => set.sleep_quality = value as u8,
            Self::EmotionalExhaustion => set.emotional_exhaustion = value as u8,
            Self::MotivationLevel => set.motivation_level = value as u8,
            Self::PerceivedStress => set.perceived_stress = value as u8,
        }
        value
    }

    /// Render the current value the way the form shows it.
    pub fn display_value(&self, set: &ResponseSet) -> String {
        let value = self.get(set);
        if self.is_hours() {
            format!("{value} hours")
        } else {
            format!("{value}/5")
        }
    }
}

impl std::str::FromStr for ResponseField {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.key() == s.trim())
            .ok_or_else(|| format!("Unknown response field: {}", s))
    }
}
