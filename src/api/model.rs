//! Assessment API data model: request payloads and response records.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifiers arrive as integers or strings; both are kept as opaque text.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Int(i64),
    Str(String),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Str(s) => s,
        }
    }
}

/// Numeric identifiers go back on the wire as integers.
fn serialize_wire_id<S: Serializer>(id: &str, serializer: S) -> Result<S::Ok, S::Error> {
    match id.parse::<i64>() {
        Ok(n) => serializer.serialize_i64(n),
        Err(_) => serializer.serialize_str(id),
    }
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serialize_wire_id(&self.0, serializer)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                WireId::deserialize(deserializer).map(|id| Self(id.into_string()))
            }
        }
    };
}

opaque_id!(
    /// The active user's identifier, issued by the service on profile creation.
    UserId
);
opaque_id!(
    /// Identifier of one completed assessment.
    AssessmentId
);
opaque_id!(PlanId);
opaque_id!(ProgressId);

/// Timestamp parsing tolerant of the formats the service emits.
pub mod timestamp {
    use serde::de::Error as _;

    use super::*;

    /// Parse RFC 3339, naive ISO-8601 or `YYYY-MM-DD HH:MM:SS` (naive values are UTC).
    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub fn deserialize_option<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}"))),
            None => Ok(None),
        }
    }
}

// ── Profile ─────────────────────────────────────────────────────────

/// Fixed age bands offered by the profile form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AgeRange {
    #[default]
    #[serde(rename = "18-25")]
    From18To25,
    #[serde(rename = "26-35")]
    From26To35,
    #[serde(rename = "36-45")]
    From36To45,
    #[serde(rename = "46-55")]
    From46To55,
    #[serde(rename = "56-65")]
    From56To65,
    #[serde(rename = "65+")]
    Over65,
}

impl AgeRange {
    pub const ALL: [AgeRange; 6] = [
        Self::From18To25,
        Self::From26To35,
        Self::From36To45,
        Self::From46To55,
        Self::From56To65,
        Self::Over65,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::From18To25 => "18-25",
            Self::From26To35 => "26-35",
            Self::From36To45 => "36-45",
            Self::From46To55 => "46-55",
            Self::From56To65 => "56-65",
            Self::Over65 => "65+",
        }
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgeRange {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown age range: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupationType {
    #[default]
    Student,
    Professional,
    Other,
}

impl fmt::Display for OccupationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Student => write!(f, "student"),
            Self::Professional => write!(f, "professional"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for OccupationType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "professional" => Ok(Self::Professional),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown occupation type: {}", s)),
        }
    }
}

/// Profile payload for create-identity.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProfileInput {
    pub name: String,
    pub age_range: AgeRange,
    pub occupation_type: OccupationType,
}

/// A user record as returned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub user_id: UserId,
    pub name: String,
    pub age_range: AgeRange,
    pub occupation_type: OccupationType,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
}

// ── Assessments ─────────────────────────────────────────────────────

/// The seven self-reported wellbeing metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResponseSet {
    pub daily_work_hours: f64,
    pub sleep_duration: f64,
    pub sleep_quality: u8,
    pub emotional_exhaustion: u8,
    pub motivation_level: u8,
    pub screen_time: f64,
    pub perceived_stress: u8,
}

impl Default for ResponseSet {
    fn default() -> Self {
        Self {
            daily_work_hours: 8.0,
            sleep_duration: 7.0,
            sleep_quality: 3,
            emotional_exhaustion: 3,
            motivation_level: 3,
            screen_time: 3.0,
            perceived_stress: 3,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateAssessmentRequest<'a> {
    pub user_id: &'a UserId,
    pub responses: &'a ResponseSet,
}

/// Summary of a stored assessment (create-assessment and history entries).
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentSummary {
    pub assessment_id: AssessmentId,
    pub user_id: UserId,
    pub burnout_score: f64,
    pub burnout_stage: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

/// One named contributing factor with its percentage share.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownFactor {
    pub name: String,
    pub percentage: f64,
}

/// Keeps the service's factor order.
fn deserialize_breakdown<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Vec<BreakdownFactor>, D::Error> {
    let map = serde_json::Map::<String, serde_json::Value>::deserialize(d)?;
    map.into_iter()
        .map(|(name, value)| {
            let percentage = value
                .as_f64()
                .ok_or_else(|| D::Error::custom(format!("non-numeric breakdown for {name}")))?;
            Ok(BreakdownFactor { name, percentage })
        })
        .collect()
}

/// Service-side classification of a score.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Classification {
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub stage_key: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub recommendations_level: Option<String>,
}

/// Full result of a completed assessment.
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentDetails {
    pub assessment_id: AssessmentId,
    pub user_id: UserId,
    pub burnout_score: f64,
    pub burnout_stage: String,
    #[serde(default)]
    pub classification: Classification,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, deserialize_with = "deserialize_breakdown")]
    pub score_breakdown: Vec<BreakdownFactor>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
}

// ── Recovery plans ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct GeneratePlanRequest<'a> {
    pub user_id: &'a UserId,
    pub assessment_id: &'a AssessmentId,
}

/// The generated recommendations of a plan.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Recommendations {
    #[serde(default)]
    pub daily_actions: Vec<String>,
    #[serde(default)]
    pub weekly_goals: Vec<String>,
    #[serde(default)]
    pub behavioral_suggestions: Vec<String>,
    #[serde(default)]
    pub caution_notes: Vec<String>,
    #[serde(default)]
    pub disclaimer: Option<String>,
    /// Seed for the local completion overlay, keyed `"{category}_{index}"`.
    #[serde(default)]
    pub completion_status: Option<BTreeMap<String, bool>>,
}

/// An immutable recovery plan snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct RecoveryPlan {
    pub plan_id: PlanId,
    pub user_id: UserId,
    pub recommendations: Recommendations,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub updated_at: Option<DateTime<Utc>>,
}

// ── Progress ────────────────────────────────────────────────────────

/// Payload for create-progress-record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProgressRecord {
    pub user_id: UserId,
    pub weekly_score: f64,
    pub user_notes: Option<String>,
}

/// An append-only self-report record.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressRecord {
    pub progress_id: ProgressId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub weekly_score: f64,
    #[serde(default)]
    pub user_notes: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

/// Service-computed direction of score change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trend {
    Improving,
    Declining,
    Stagnant,
    /// Any other label, e.g. `stable` or `insufficient_data`.
    Other(String),
}

impl Trend {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Improving => "improving",
            Self::Declining => "declining",
            Self::Stagnant => "stagnant",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for Trend {
    fn from(label: String) -> Self {
        match label.as_str() {
            "improving" => Self::Improving,
            "declining" => Self::Declining,
            "stagnant" => Self::Stagnant,
            _ => Self::Other(label),
        }
    }
}

impl<'de> Deserialize<'de> for Trend {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        String::deserialize(d).map(Trend::from)
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trend block of the progress analysis.
#[derive(Debug, Clone, Deserialize)]
pub struct TrendSummary {
    pub trend: Trend,
    #[serde(default)]
    pub change: f64,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub needs_adjustment: bool,
    #[serde(default)]
    pub previous_score: Option<f64>,
}

/// Aggregate progress view, recomputed by the service on every fetch.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressAnalysis {
    pub current_score: f64,
    pub current_stage: String,
    #[serde(rename = "progress_analysis", default)]
    pub trend: Option<TrendSummary>,
    #[serde(default)]
    pub progress_history: Vec<ProgressRecord>,
}
