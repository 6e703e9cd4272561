//! ResultPresenter: shows one completed assessment and offers plan generation.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::classify::{
    BarUrgency, ScoreBand, StageSeverity, bar_urgency, bar_width, factor_display_name, score_band,
    stage_severity,
};
use crate::api::{AssessmentApi, AssessmentDetails, AssessmentId, RecoveryPlan, UserId};
use crate::error::{ApiError, ScreenError};
use crate::identity::IdentityStore;
use crate::screen::{Action, InFlight, Pending, Ticket};
use crate::workflow::Screen;

pub const RESULT_DISCLAIMER: &str = "This assessment is not a medical diagnosis. It is a \
decision-support tool for awareness purposes only. If you are experiencing severe symptoms, \
please consult a healthcare professional.";

const LOAD_FALLBACK: &str = "Failed to load assessment details";
const GENERATE_FALLBACK: &str = "Failed to generate recovery plan";
const MISSING_IDENTITY: &str = "User ID not found";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultAction {
    Load,
    GeneratePlan,
}

impl Action for ResultAction {
    fn name(&self) -> &'static str {
        match self {
            Self::Load => "result load",
            Self::GeneratePlan => "plan generation",
        }
    }
}

#[derive(Debug, Clone)]
pub enum ResultState {
    Loading,
    Loaded(AssessmentDetails),
    Failed(String),
}

/// One breakdown bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorView {
    pub key: String,
    pub label: String,
    pub percentage: f64,
    pub width: f64,
    pub urgency: BarUrgency,
}

/// Everything the result screen renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub score: String,
    pub band: ScoreBand,
    pub stage: String,
    pub severity: StageSeverity,
    pub description: String,
    pub explanation: String,
    pub factors: Vec<FactorView>,
    pub disclaimer: &'static str,
}

impl ResultView {
    pub fn from_details(details: &AssessmentDetails) -> Self {
        let factors = details
            .score_breakdown
            .iter()
            .map(|factor| FactorView {
                key: factor.name.clone(),
                label: factor_display_name(&factor.name),
                percentage: factor.percentage,
                width: bar_width(factor.percentage),
                urgency: bar_urgency(factor.percentage),
            })
            .collect();
        Self {
            score: format!("{:.1}", details.burnout_score),
            band: score_band(details.burnout_score),
            stage: details.burnout_stage.clone(),
            severity: stage_severity(&details.burnout_stage),
            description: details.classification.description.clone(),
            explanation: details.explanation.clone(),
            factors,
            disclaimer: RESULT_DISCLAIMER,
        }
    }
}

pub struct ResultPresenter {
    api: Arc<dyn AssessmentApi>,
    identity: Arc<IdentityStore>,
    assessment_id: AssessmentId,
    state: ResultState,
    /// Message from the last failed plan generation.
    error: Option<String>,
    generated: Option<RecoveryPlan>,
    inflight: InFlight<ResultAction>,
}

impl ResultPresenter {
    pub fn new(
        api: Arc<dyn AssessmentApi>,
        identity: Arc<IdentityStore>,
        assessment_id: AssessmentId,
    ) -> Self {
        Self {
            api,
            identity,
            assessment_id,
            state: ResultState::Loading,
            error: None,
            generated: None,
            inflight: InFlight::new(),
        }
    }

    pub fn assessment_id(&self) -> &AssessmentId {
        &self.assessment_id
    }

    pub fn state(&self) -> &ResultState {
        &self.state
    }

    pub fn view(&self) -> Option<ResultView> {
        match &self.state {
            ResultState::Loaded(details) => Some(ResultView::from_details(details)),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_generating(&self) -> bool {
        self.inflight.is_busy(ResultAction::GeneratePlan)
    }

    /// Where to go next: the recovery screen once a plan was generated.
    pub fn handoff(&self) -> Option<Screen> {
        self.generated.as_ref().map(|_| Screen::Recovery)
    }

    /// Start (or restart) the details fetch. Outstanding requests are orphaned.
    pub fn begin_load(&mut self) -> Pending<ResultAction, AssessmentId> {
        let ticket = self.inflight.restart(ResultAction::Load);
        self.state = ResultState::Loading;
        self.error = None;
        Pending {
            ticket,
            payload: self.assessment_id.clone(),
        }
    }

    pub fn settle_load(
        &mut self,
        ticket: Ticket<ResultAction>,
        outcome: Result<AssessmentDetails, ApiError>,
    ) -> Result<bool, ScreenError> {
        if !self.inflight.settle(ticket) {
            return Ok(false);
        }
        match outcome {
            Ok(details) => {
                self.state = ResultState::Loaded(details);
                Ok(true)
            }
            Err(e) => {
                warn!(assessment_id = %self.assessment_id, error = %e, "Failed to load result");
                self.state = ResultState::Failed(e.user_message(LOAD_FALLBACK));
                Err(e.into())
            }
        }
    }

    pub async fn load(&mut self) -> Result<(), ScreenError> {
        let request = self.begin_load();
        let outcome = self.api.get_assessment_details(&request.payload).await;
        self.settle_load(request.ticket, outcome)?;
        Ok(())
    }

    /// Start plan generation for this assessment. Refused locally without
    /// an identity.
    pub fn begin_generate_plan(
        &mut self,
    ) -> Result<Pending<ResultAction, (UserId, AssessmentId)>, ScreenError> {
        let Some(user_id) = self.identity.get() else {
            self.error = Some(MISSING_IDENTITY.to_string());
            return Err(ScreenError::Precondition(MISSING_IDENTITY.to_string()));
        };
        let ticket = self.inflight.begin(ResultAction::GeneratePlan)?;
        self.error = None;
        Ok(Pending {
            ticket,
            payload: (user_id, self.assessment_id.clone()),
        })
    }

    /// On failure the screen stays put and the action can be retried.
    pub fn settle_generate_plan(
        &mut self,
        ticket: Ticket<ResultAction>,
        outcome: Result<RecoveryPlan, ApiError>,
    ) -> Result<bool, ScreenError> {
        if !self.inflight.settle(ticket) {
            return Ok(false);
        }
        match outcome {
            Ok(plan) => {
                info!(plan_id = %plan.plan_id, assessment_id = %self.assessment_id, "Recovery plan generated");
                self.generated = Some(plan);
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "Plan generation failed");
                self.error = Some(e.user_message(GENERATE_FALLBACK));
                Err(e.into())
            }
        }
    }

    pub async fn generate_plan(&mut self) -> Result<(), ScreenError> {
        let request = self.begin_generate_plan()?;
        let (user_id, assessment_id) = &request.payload;
        let outcome = self.api.generate_recovery_plan(user_id, assessment_id).await;
        self.settle_generate_plan(request.ticket, outcome)?;
        Ok(())
    }
}
