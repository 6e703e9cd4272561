//! Scripted in-memory Assessment API for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use super::AssessmentApi;
use super::model::*;
use crate::error::ApiError;

#[derive(Default)]
pub(crate) struct FakeState {
    pub next_id: u32,
    pub assessments: Vec<AssessmentSummary>,
    pub details: HashMap<AssessmentId, AssessmentDetails>,
    pub latest_plan: Option<RecoveryPlan>,
    pub analysis: Option<ProgressAnalysis>,
    /// Forced failures keyed by operation name.
    pub failures: HashMap<&'static str, ApiError>,
    /// Operation names in call order.
    pub calls: Vec<String>,
    pub plan_requests: Vec<(UserId, AssessmentId)>,
    pub progress_requests: Vec<NewProgressRecord>,
}

#[derive(Default)]
pub(crate) struct FakeApi {
    pub state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, op: &'static str, err: ApiError) {
        self.state.lock().unwrap().failures.insert(op, err);
    }

    pub fn recover(&self, op: &'static str) {
        self.state.lock().unwrap().failures.remove(op);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == op).count()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    fn enter(&self, op: &'static str) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(op.to_string());
        match state.failures.get(op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn next_id(&self) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        state.next_id.to_string()
    }
}

pub(crate) fn summary(id: &str, score: f64, day: u32) -> AssessmentSummary {
    AssessmentSummary {
        assessment_id: AssessmentId::new(id),
        user_id: UserId::new("1"),
        burnout_score: score,
        burnout_stage: stage_for(score).to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap(),
    }
}

pub(crate) fn details(id: &str, score: f64, stage: &str) -> AssessmentDetails {
    AssessmentDetails {
        assessment_id: AssessmentId::new(id),
        user_id: UserId::new("1"),
        burnout_score: score,
        burnout_stage: stage.to_string(),
        classification: Classification {
            stage: Some(stage.to_string()),
            description: format!("{stage} description"),
            ..Default::default()
        },
        explanation: "Driven mostly by stress".to_string(),
        score_breakdown: vec![
            BreakdownFactor {
                name: "perceived_stress".into(),
                percentage: 28.0,
            },
            BreakdownFactor {
                name: "sleep_quality".into(),
                percentage: 15.0,
            },
            BreakdownFactor {
                name: "screen_time".into(),
                percentage: 6.5,
            },
        ],
        created_at: None,
    }
}

pub(crate) fn plan(id: &str, daily: &[&str], weekly: &[&str]) -> RecoveryPlan {
    RecoveryPlan {
        plan_id: PlanId::new(id),
        user_id: UserId::new("1"),
        recommendations: Recommendations {
            daily_actions: daily.iter().map(|s| s.to_string()).collect(),
            weekly_goals: weekly.iter().map(|s| s.to_string()).collect(),
            behavioral_suggestions: vec!["Keep a consistent bedtime".into()],
            caution_notes: Vec::new(),
            disclaimer: None,
            completion_status: None,
        },
        created_at: Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap(),
        updated_at: None,
    }
}

pub(crate) fn analysis(score: f64, trend: Trend, change: f64) -> ProgressAnalysis {
    ProgressAnalysis {
        current_score: score,
        current_stage: stage_for(score).to_string(),
        trend: Some(TrendSummary {
            trend,
            change,
            recommendation: "Keep going".into(),
            needs_adjustment: false,
            previous_score: None,
        }),
        progress_history: Vec::new(),
    }
}

fn stage_for(score: f64) -> &'static str {
    if score <= 25.0 {
        "Healthy"
    } else if score <= 50.0 {
        "Early Burnout"
    } else if score <= 75.0 {
        "Moderate Burnout"
    } else {
        "Severe Burnout"
    }
}

#[async_trait]
impl AssessmentApi for FakeApi {
    async fn create_user(&self, profile: &ProfileInput) -> Result<UserRecord, ApiError> {
        self.enter("create_user")?;
        Ok(UserRecord {
            user_id: UserId::new(self.next_id()),
            name: profile.name.clone(),
            age_range: profile.age_range,
            occupation_type: profile.occupation_type,
            created_at: Some(Utc::now()),
        })
    }

    async fn get_user(&self, user_id: &UserId) -> Result<UserRecord, ApiError> {
        self.enter("get_user")?;
        Ok(UserRecord {
            user_id: user_id.clone(),
            name: "Alex".into(),
            age_range: AgeRange::default(),
            occupation_type: OccupationType::default(),
            created_at: None,
        })
    }

    async fn create_assessment(
        &self,
        user_id: &UserId,
        _responses: &ResponseSet,
    ) -> Result<AssessmentSummary, ApiError> {
        self.enter("create_assessment")?;
        let id = format!("a{}", self.next_id());
        let mut created = summary(&id, 42.0, 1);
        created.user_id = user_id.clone();
        self.with(|s| s.assessments.insert(0, created.clone()));
        Ok(created)
    }

    async fn get_assessment(&self, id: &AssessmentId) -> Result<AssessmentSummary, ApiError> {
        self.enter("get_assessment")?;
        self.with(|s| s.assessments.iter().find(|a| &a.assessment_id == id).cloned())
            .ok_or(ApiError::NotFound {
                detail: Some("Assessment not found".into()),
            })
    }

    async fn get_assessment_details(
        &self,
        id: &AssessmentId,
    ) -> Result<AssessmentDetails, ApiError> {
        self.enter("get_assessment_details")?;
        self.with(|s| s.details.get(id).cloned())
            .ok_or(ApiError::NotFound {
                detail: Some("Assessment not found".into()),
            })
    }

    async fn get_user_assessments(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<AssessmentSummary>, ApiError> {
        self.enter("get_user_assessments")?;
        Ok(self.with(|s| s.assessments.clone()))
    }

    async fn generate_recovery_plan(
        &self,
        user_id: &UserId,
        assessment_id: &AssessmentId,
    ) -> Result<RecoveryPlan, ApiError> {
        self.enter("generate_recovery_plan")?;
        let id = format!("p{}", self.next_id());
        let generated = plan(&id, &["Take a 10 minute walk"], &["Plan one rest day"]);
        self.with(|s| {
            s.plan_requests.push((user_id.clone(), assessment_id.clone()));
            s.latest_plan = Some(generated.clone());
        });
        Ok(generated)
    }

    async fn get_latest_recovery_plan(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<RecoveryPlan>, ApiError> {
        self.enter("get_latest_recovery_plan")?;
        Ok(self.with(|s| s.latest_plan.clone()))
    }

    async fn get_recovery_plan(&self, plan_id: &PlanId) -> Result<RecoveryPlan, ApiError> {
        self.enter("get_recovery_plan")?;
        self.with(|s| s.latest_plan.clone())
            .filter(|p| &p.plan_id == plan_id)
            .ok_or(ApiError::NotFound { detail: None })
    }

    async fn create_progress_record(
        &self,
        record: &NewProgressRecord,
    ) -> Result<ProgressRecord, ApiError> {
        self.enter("create_progress_record")?;
        let created = ProgressRecord {
            progress_id: ProgressId::new(self.next_id()),
            user_id: Some(record.user_id.clone()),
            weekly_score: record.weekly_score,
            user_notes: record.user_notes.clone(),
            timestamp: Utc::now(),
        };
        self.with(|s| {
            s.progress_requests.push(record.clone());
            if let Some(analysis) = s.analysis.as_mut() {
                analysis.progress_history.insert(0, created.clone());
            }
        });
        Ok(created)
    }

    async fn get_user_progress(&self, _user_id: &UserId) -> Result<Vec<ProgressRecord>, ApiError> {
        self.enter("get_user_progress")?;
        Ok(self.with(|s| {
            s.analysis
                .as_ref()
                .map(|a| a.progress_history.clone())
                .unwrap_or_default()
        }))
    }

    async fn get_progress_analysis(
        &self,
        _user_id: &UserId,
    ) -> Result<ProgressAnalysis, ApiError> {
        self.enter("get_progress_analysis")?;
        self.with(|s| s.analysis.clone()).ok_or(ApiError::NotFound {
            detail: Some("No assessments found for user".into()),
        })
    }
}
