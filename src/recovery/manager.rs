//! RecoveryPlanManager: loads, generates and tracks the user's recovery plan.
//!
//! Entry checks the assessment history first: with no assessment there is
//! nothing to build a plan from. Generation and regeneration are the same
//! operation and always work from the most recent assessment, never from the
//! plan being replaced.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::checklist::{Category, ChecklistKey, CompletionOverlay};
use crate::api::{AssessmentApi, AssessmentSummary, RecoveryPlan, UserId};
use crate::error::{ApiError, ScreenError};
use crate::identity::IdentityStore;
use crate::screen::{Action, InFlight, Pending, Ticket, display_date};

pub const DEFAULT_DISCLAIMER: &str =
    "This is not medical advice. Please consult a healthcare professional for severe symptoms.";

const LOAD_FALLBACK: &str = "Failed to load recovery plan";
const GENERATE_FALLBACK: &str = "Failed to generate recovery plan";
const MISSING_IDENTITY: &str = "User ID not found";
const MISSING_ASSESSMENT: &str = "Please complete an assessment first.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    Load,
    Generate,
}

impl Action for RecoveryAction {
    fn name(&self) -> &'static str {
        match self {
            Self::Load => "recovery plan load",
            Self::Generate => "recovery plan generation",
        }
    }
}

#[derive(Debug, Clone)]
pub enum RecoveryState {
    Loading,
    /// No assessment yet; the user is sent to intake.
    NoAssessment,
    /// Assessments exist but no plan; generation is offered.
    NoPlan,
    Ready {
        plan: RecoveryPlan,
        overlay: CompletionOverlay,
    },
    Failed(String),
}

impl RecoveryState {
    fn name(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::NoAssessment => "no_assessment",
            Self::NoPlan => "no_plan",
            Self::Ready { .. } => "ready",
            Self::Failed(_) => "failed",
        }
    }

    fn ready(plan: RecoveryPlan) -> Self {
        let overlay = CompletionOverlay::seeded(plan.recommendations.completion_status.as_ref());
        Self::Ready { plan, overlay }
    }
}

/// What a load found.
#[derive(Debug)]
pub struct PlanLookup {
    pub history: Vec<AssessmentSummary>,
    /// Not looked up when the history is empty.
    pub plan: Option<RecoveryPlan>,
}

/// What a generation attempt produced.
#[derive(Debug)]
pub enum Generation {
    NoAssessment,
    Generated {
        history: Vec<AssessmentSummary>,
        plan: RecoveryPlan,
    },
}

/// Fetch the history and, when it is non-empty, the latest plan.
pub async fn lookup_plan(
    api: &dyn AssessmentApi,
    user_id: &UserId,
) -> Result<PlanLookup, ApiError> {
    let history = api.get_user_assessments(user_id).await?;
    if history.is_empty() {
        return Ok(PlanLookup { history, plan: None });
    }
    let plan = api.get_latest_recovery_plan(user_id).await?;
    Ok(PlanLookup { history, plan })
}

/// Re-read the history and request a plan for its first (most recent) entry.
pub async fn generate_from_latest(
    api: &dyn AssessmentApi,
    user_id: &UserId,
) -> Result<Generation, ApiError> {
    let history = api.get_user_assessments(user_id).await?;
    let Some(latest) = history.first() else {
        return Ok(Generation::NoAssessment);
    };
    let plan = api.generate_recovery_plan(user_id, &latest.assessment_id).await?;
    Ok(Generation::Generated { history, plan })
}

/// One trackable plan item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistItem {
    pub key: String,
    pub text: String,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanView {
    pub generated_on: String,
    pub disclaimer: String,
    /// Present only when the plan carries caution notes.
    pub caution_notes: Option<Vec<String>>,
    pub daily_actions: Vec<ChecklistItem>,
    pub weekly_goals: Vec<ChecklistItem>,
    pub behavioral_suggestions: Vec<String>,
}

impl PlanView {
    pub fn new(plan: &RecoveryPlan, overlay: &CompletionOverlay) -> Self {
        let recs = &plan.recommendations;
        let items = |category: Category, texts: &[String]| -> Vec<ChecklistItem> {
            texts
                .iter()
                .enumerate()
                .map(|(index, text)| {
                    let key = ChecklistKey::new(category, index);
                    ChecklistItem {
                        key: key.to_string(),
                        text: text.clone(),
                        done: overlay.is_done(key),
                    }
                })
                .collect()
        };
        Self {
            generated_on: format!("Generated on {}", display_date(&plan.created_at)),
            disclaimer: recs
                .disclaimer
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DISCLAIMER.to_string()),
            caution_notes: (!recs.caution_notes.is_empty()).then(|| recs.caution_notes.clone()),
            daily_actions: items(Category::Daily, &recs.daily_actions),
            weekly_goals: items(Category::Weekly, &recs.weekly_goals),
            behavioral_suggestions: recs.behavioral_suggestions.clone(),
        }
    }
}

pub struct RecoveryPlanManager {
    api: Arc<dyn AssessmentApi>,
    identity: Arc<IdentityStore>,
    state: RecoveryState,
    history: Vec<AssessmentSummary>,
    /// Banner for a failed generation; the current state is kept.
    error: Option<String>,
    inflight: InFlight<RecoveryAction>,
}

impl RecoveryPlanManager {
    pub fn new(api: Arc<dyn AssessmentApi>, identity: Arc<IdentityStore>) -> Self {
        Self {
            api,
            identity,
            state: RecoveryState::Loading,
            history: Vec::new(),
            error: None,
            inflight: InFlight::new(),
        }
    }

    pub fn state(&self) -> &RecoveryState {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn history(&self) -> &[AssessmentSummary] {
        &self.history
    }

    pub fn is_generating(&self) -> bool {
        self.inflight.is_busy(RecoveryAction::Generate)
    }

    pub fn view(&self) -> Option<PlanView> {
        match &self.state {
            RecoveryState::Ready { plan, overlay } => Some(PlanView::new(plan, overlay)),
            _ => None,
        }
    }

    pub fn begin_load(&mut self) -> Result<Pending<RecoveryAction, UserId>, ScreenError> {
        let user_id = self.require_identity()?;
        let ticket = self.inflight.restart(RecoveryAction::Load);
        self.state = RecoveryState::Loading;
        self.error = None;
        Ok(Pending {
            ticket,
            payload: user_id,
        })
    }

    /// A missing plan is the `NoPlan` state, not an error.
    pub fn settle_load(
        &mut self,
        ticket: Ticket<RecoveryAction>,
        outcome: Result<PlanLookup, ApiError>,
    ) -> Result<bool, ScreenError> {
        if !self.inflight.settle(ticket) {
            return Ok(false);
        }
        let lookup = match outcome {
            Ok(lookup) => lookup,
            Err(e) => {
                warn!(error = %e, "Failed to load recovery plan");
                self.state = RecoveryState::Failed(e.user_message(LOAD_FALLBACK));
                return Err(e.into());
            }
        };
        self.state = match (lookup.history.is_empty(), lookup.plan) {
            (true, _) => RecoveryState::NoAssessment,
            (false, None) => RecoveryState::NoPlan,
            (false, Some(plan)) => RecoveryState::ready(plan),
        };
        self.history = lookup.history;
        Ok(true)
    }

    pub async fn load(&mut self) -> Result<(), ScreenError> {
        let request = self.begin_load()?;
        let outcome = lookup_plan(self.api.as_ref(), &request.payload).await;
        self.settle_load(request.ticket, outcome)?;
        Ok(())
    }

    pub fn begin_generate(&mut self) -> Result<Pending<RecoveryAction, UserId>, ScreenError> {
        let user_id = self.require_identity()?;
        let ticket = self.inflight.begin(RecoveryAction::Generate)?;
        self.error = None;
        Ok(Pending {
            ticket,
            payload: user_id,
        })
    }

    /// A new plan replaces the displayed one wholesale, overlay included.
    /// On failure the displayed plan (if any) stays.
    pub fn settle_generate(
        &mut self,
        ticket: Ticket<RecoveryAction>,
        outcome: Result<Generation, ApiError>,
    ) -> Result<bool, ScreenError> {
        if !self.inflight.settle(ticket) {
            return Ok(false);
        }
        match outcome {
            Ok(Generation::Generated { history, plan }) => {
                info!(plan_id = %plan.plan_id, "Recovery plan replaced");
                self.history = history;
                self.state = RecoveryState::ready(plan);
                Ok(true)
            }
            Ok(Generation::NoAssessment) => {
                self.history.clear();
                self.error = Some(MISSING_ASSESSMENT.to_string());
                Err(ScreenError::Precondition(MISSING_ASSESSMENT.to_string()))
            }
            Err(e) => {
                warn!(error = %e, "Plan generation failed");
                self.error = Some(e.user_message(GENERATE_FALLBACK));
                Err(e.into())
            }
        }
    }

    pub async fn generate(&mut self) -> Result<(), ScreenError> {
        let request = self.begin_generate()?;
        let outcome = generate_from_latest(self.api.as_ref(), &request.payload).await;
        self.settle_generate(request.ticket, outcome)?;
        Ok(())
    }

    /// Same operation as [`generate`](Self::generate).
    pub async fn regenerate(&mut self) -> Result<(), ScreenError> {
        self.generate().await
    }

    /// Flip one checklist item of the displayed plan; returns its new value.
    pub fn toggle(&mut self, category: Category, index: usize) -> Result<bool, ScreenError> {
        let state = self.state.name();
        let RecoveryState::Ready { plan, overlay } = &mut self.state else {
            return Err(ScreenError::InvalidState {
                action: "toggle a checklist item",
                state: state.to_string(),
            });
        };
        let len = match category {
            Category::Daily => plan.recommendations.daily_actions.len(),
            Category::Weekly => plan.recommendations.weekly_goals.len(),
        };
        if index >= len {
            return Err(ScreenError::Precondition(format!(
                "No {category} item at position {index}"
            )));
        }
        Ok(overlay.toggle(ChecklistKey::new(category, index)))
    }

    fn require_identity(&mut self) -> Result<UserId, ScreenError> {
        self.identity.get().ok_or_else(|| {
            self.error = Some(MISSING_IDENTITY.to_string());
            ScreenError::Precondition(MISSING_IDENTITY.to_string())
        })
    }
}
