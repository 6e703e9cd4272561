//! IntakeWizard: collects the profile, then the assessment responses, and
//! submits each stage to the Assessment API.

use std::sync::Arc;

use tracing::{info, warn};

use super::controls::ResponseField;
use super::state::IntakeStage;
use crate::api::{
    AgeRange, AssessmentApi, AssessmentId, AssessmentSummary, OccupationType, ProfileInput,
    ResponseSet, UserId, UserRecord,
};
use crate::error::{ApiError, ScreenError};
use crate::identity::IdentityStore;
use crate::screen::{Action, InFlight, Pending, Ticket};

const MISSING_NAME: &str = "Name is required.";
const MISSING_IDENTITY: &str = "User ID not found. Please start over.";
const PROFILE_FALLBACK: &str = "Failed to create user";
const ASSESSMENT_FALLBACK: &str = "Failed to submit assessment";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeAction {
    SubmitProfile,
    SubmitResponses,
}

impl Action for IntakeAction {
    fn name(&self) -> &'static str {
        match self {
            Self::SubmitProfile => "profile submission",
            Self::SubmitResponses => "assessment submission",
        }
    }
}

/// Two-stage intake form driving create-identity and create-assessment.
pub struct IntakeWizard {
    api: Arc<dyn AssessmentApi>,
    identity: Arc<IdentityStore>,
    stage: IntakeStage,
    profile: ProfileInput,
    responses: ResponseSet,
    /// Identity created by this wizard run, preferred over the store.
    user_id: Option<UserId>,
    submitted: Option<AssessmentSummary>,
    error: Option<String>,
    inflight: InFlight<IntakeAction>,
}

impl IntakeWizard {
    pub fn new(api: Arc<dyn AssessmentApi>, identity: Arc<IdentityStore>) -> Self {
        Self {
            api,
            identity,
            stage: IntakeStage::default(),
            profile: ProfileInput::default(),
            responses: ResponseSet::default(),
            user_id: None,
            submitted: None,
            error: None,
            inflight: InFlight::new(),
        }
    }

    pub fn stage(&self) -> IntakeStage {
        self.stage
    }

    pub fn profile(&self) -> &ProfileInput {
        &self.profile
    }

    pub fn responses(&self) -> &ResponseSet {
        &self.responses
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.inflight.any_busy()
    }

    /// The assessment to hand to the result screen once submitted.
    pub fn handoff(&self) -> Option<&AssessmentId> {
        self.submitted.as_ref().map(|a| &a.assessment_id)
    }

    pub fn submitted(&self) -> Option<&AssessmentSummary> {
        self.submitted.as_ref()
    }

    // ── Profile stage ───────────────────────────────────────────────

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.profile.name = name.into();
    }

    pub fn set_age_range(&mut self, age_range: AgeRange) {
        self.profile.age_range = age_range;
    }

    pub fn set_occupation_type(&mut self, occupation_type: OccupationType) {
        self.profile.occupation_type = occupation_type;
    }

    /// Validate the profile and start create-identity.
    pub fn begin_profile_submit(
        &mut self,
    ) -> Result<Pending<IntakeAction, ProfileInput>, ScreenError> {
        self.expect_stage(IntakeStage::CollectingProfile, "submit the profile")?;
        if self.profile.name.trim().is_empty() {
            return Err(self.local_failure(MISSING_NAME));
        }
        let ticket = self.inflight.begin(IntakeAction::SubmitProfile)?;
        self.error = None;
        Ok(Pending {
            ticket,
            payload: self.profile.clone(),
        })
    }

    /// Apply the create-identity outcome. Returns `Ok(false)` for a stale response.
    pub fn settle_profile_submit(
        &mut self,
        ticket: Ticket<IntakeAction>,
        outcome: Result<UserRecord, ApiError>,
    ) -> Result<bool, ScreenError> {
        if !self.inflight.settle(ticket) {
            return Ok(false);
        }
        let user = match outcome {
            Ok(user) => user,
            Err(e) => return Err(self.remote_failure(e, PROFILE_FALLBACK)),
        };
        if let Err(e) = self.identity.set(user.user_id.clone()) {
            warn!(error = %e, "Could not persist identity");
            self.error = Some(format!("Could not save your session: {e}"));
            return Err(e.into());
        }
        info!(user_id = %user.user_id, "Profile created");
        self.user_id = Some(user.user_id);
        self.transition(IntakeStage::CollectingResponses);
        Ok(true)
    }

    pub async fn submit_profile(&mut self) -> Result<(), ScreenError> {
        let request = self.begin_profile_submit()?;
        let outcome = self.api.create_user(&request.payload).await;
        self.settle_profile_submit(request.ticket, outcome)?;
        Ok(())
    }

    // ── Responses stage ─────────────────────────────────────────────

    /// Set one response through its control; returns the stored value.
    pub fn set_response(&mut self, field: ResponseField, raw: f64) -> f64 {
        field.set(&mut self.responses, raw)
    }

    /// Resolve the identity and start create-assessment. With no identity
    /// this fails locally and nothing is sent.
    pub fn begin_responses_submit(
        &mut self,
    ) -> Result<Pending<IntakeAction, (UserId, ResponseSet)>, ScreenError> {
        self.expect_stage(IntakeStage::CollectingResponses, "submit the assessment")?;
        let Some(user_id) = self.user_id.clone().or_else(|| self.identity.get()) else {
            return Err(self.local_failure(MISSING_IDENTITY));
        };
        let ticket = self.inflight.begin(IntakeAction::SubmitResponses)?;
        self.error = None;
        Ok(Pending {
            ticket,
            payload: (user_id, self.responses),
        })
    }

    /// Apply the create-assessment outcome. Entered values survive a failure.
    pub fn settle_responses_submit(
        &mut self,
        ticket: Ticket<IntakeAction>,
        outcome: Result<AssessmentSummary, ApiError>,
    ) -> Result<bool, ScreenError> {
        if !self.inflight.settle(ticket) {
            return Ok(false);
        }
        match outcome {
            Ok(summary) => {
                info!(
                    assessment_id = %summary.assessment_id,
                    score = summary.burnout_score,
                    "Assessment submitted"
                );
                self.submitted = Some(summary);
                self.transition(IntakeStage::Submitted);
                Ok(true)
            }
            Err(e) => Err(self.remote_failure(e, ASSESSMENT_FALLBACK)),
        }
    }

    pub async fn submit_responses(&mut self) -> Result<(), ScreenError> {
        let request = self.begin_responses_submit()?;
        let (user_id, responses) = &request.payload;
        let outcome = self.api.create_assessment(user_id, responses).await;
        self.settle_responses_submit(request.ticket, outcome)?;
        Ok(())
    }

    /// Start over from the profile stage with fresh inputs. The stored
    /// identity is kept; pending submissions are orphaned.
    pub fn restart(&mut self) {
        self.inflight.invalidate();
        self.stage = IntakeStage::CollectingProfile;
        self.profile = ProfileInput::default();
        self.responses = ResponseSet::default();
        self.user_id = None;
        self.submitted = None;
        self.error = None;
    }

    // ── Internals ───────────────────────────────────────────────────

    fn expect_stage(&self, stage: IntakeStage, action: &'static str) -> Result<(), ScreenError> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(ScreenError::InvalidState {
                action,
                state: self.stage.to_string(),
            })
        }
    }

    fn transition(&mut self, target: IntakeStage) {
        debug_assert!(self.stage.can_transition_to(target));
        self.stage = target;
    }

    fn local_failure(&mut self, message: &str) -> ScreenError {
        self.error = Some(message.to_string());
        ScreenError::Precondition(message.to_string())
    }

    fn remote_failure(&mut self, e: ApiError, fallback: &str) -> ScreenError {
        warn!(stage = %self.stage, error = %e, "Intake submission failed");
        self.error = Some(e.user_message(fallback));
        e.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;

    fn wizard() -> (IntakeWizard, Arc<FakeApi>, Arc<IdentityStore>) {
        let api = Arc::new(FakeApi::new());
        let identity = Arc::new(IdentityStore::in_memory());
        let wizard = IntakeWizard::new(api.clone(), identity.clone());
        (wizard, api, identity)
    }

    #[tokio::test]
    async fn profile_submit_advances_with_defaults() {
        let (mut wizard, _api, identity) = wizard();
        wizard.set_name("Alex");
        wizard.set_age_range(AgeRange::From26To35);
        wizard.set_occupation_type(OccupationType::Professional);

        wizard.submit_profile().await.unwrap();

        assert_eq!(wizard.stage(), IntakeStage::CollectingResponses);
        assert!(identity.get().is_some());
        let r = wizard.responses();
        assert_eq!(r.daily_work_hours, 8.0);
        assert_eq!(r.sleep_duration, 7.0);
        assert_eq!(r.sleep_quality, 3);
        assert_eq!(r.emotional_exhaustion, 3);
        assert_eq!(r.motivation_level, 3);
        assert_eq!(r.screen_time, 3.0);
        assert_eq!(r.perceived_stress, 3);
    }

    #[tokio::test]
    async fn empty_name_fails_locally() {
        let (mut wizard, api, _identity) = wizard();
        wizard.set_name("   ");
        let err = wizard.submit_profile().await.unwrap_err();
        assert!(matches!(err, ScreenError::Precondition(_)));
        assert_eq!(wizard.error(), Some(MISSING_NAME));
        assert_eq!(api.call_count("create_user"), 0);
    }

    #[tokio::test]
    async fn profile_failure_keeps_stage_and_input() {
        let (mut wizard, api, identity) = wizard();
        api.fail(
            "create_user",
            ApiError::Service {
                status: 422,
                detail: Some("Name too long".into()),
            },
        );
        wizard.set_name("Alex");
        wizard.set_occupation_type(OccupationType::Other);

        assert!(wizard.submit_profile().await.is_err());
        assert_eq!(wizard.stage(), IntakeStage::CollectingProfile);
        assert_eq!(wizard.error(), Some("Name too long"));
        assert_eq!(wizard.profile().name, "Alex");
        assert_eq!(wizard.profile().occupation_type, OccupationType::Other);
        assert!(identity.get().is_none());

        // Retry succeeds once the service recovers.
        api.recover("create_user");
        wizard.submit_profile().await.unwrap();
        assert_eq!(wizard.stage(), IntakeStage::CollectingResponses);
        assert!(wizard.error().is_none());
    }

    #[tokio::test]
    async fn responses_submit_hands_off_assessment() {
        let (mut wizard, api, _identity) = wizard();
        wizard.set_name("Alex");
        wizard.submit_profile().await.unwrap();
        wizard.set_response(ResponseField::PerceivedStress, 5.0);

        wizard.submit_responses().await.unwrap();

        assert_eq!(wizard.stage(), IntakeStage::Submitted);
        assert!(wizard.handoff().is_some());
        assert_eq!(api.call_count("create_assessment"), 1);
    }

    #[tokio::test]
    async fn responses_fall_back_to_stored_identity() {
        let (mut wizard, api, identity) = wizard();
        wizard.set_name("Alex");
        wizard.submit_profile().await.unwrap();
        // Simulate a wizard that lost its own copy but the store still has one.
        wizard.user_id = None;
        identity.set(UserId::new("99")).unwrap();

        let request = wizard.begin_responses_submit().unwrap();
        assert_eq!(request.payload.0, UserId::new("99"));
        let outcome = api.create_assessment(&request.payload.0, &request.payload.1).await;
        assert!(wizard.settle_responses_submit(request.ticket, outcome).unwrap());
    }

    #[tokio::test]
    async fn missing_identity_is_a_local_failure() {
        let (mut wizard, api, identity) = wizard();
        wizard.set_name("Alex");
        wizard.submit_profile().await.unwrap();
        wizard.user_id = None;
        identity.clear().unwrap();

        let err = wizard.submit_responses().await.unwrap_err();
        assert!(matches!(err, ScreenError::Precondition(_)));
        assert_eq!(wizard.error(), Some(MISSING_IDENTITY));
        assert_eq!(api.call_count("create_assessment"), 0);
        assert_eq!(wizard.stage(), IntakeStage::CollectingResponses);
    }

    #[tokio::test]
    async fn responses_failure_preserves_values() {
        let (mut wizard, api, _identity) = wizard();
        wizard.set_name("Alex");
        wizard.submit_profile().await.unwrap();
        wizard.set_response(ResponseField::SleepDuration, 4.5);
        wizard.set_response(ResponseField::MotivationLevel, 1.0);
        api.fail("create_assessment", ApiError::Unreachable { reason: "refused".into() });

        assert!(wizard.submit_responses().await.is_err());
        assert_eq!(wizard.stage(), IntakeStage::CollectingResponses);
        assert_eq!(wizard.responses().sleep_duration, 4.5);
        assert_eq!(wizard.responses().motivation_level, 1);
        assert_eq!(wizard.error(), Some(crate::error::UNREACHABLE_MESSAGE));
    }

    #[tokio::test]
    async fn service_error_without_detail_uses_fallback() {
        let (mut wizard, api, _identity) = wizard();
        wizard.set_name("Alex");
        wizard.submit_profile().await.unwrap();
        api.fail("create_assessment", ApiError::Service { status: 500, detail: None });
        assert!(wizard.submit_responses().await.is_err());
        assert_eq!(wizard.error(), Some(ASSESSMENT_FALLBACK));
    }

    #[test]
    fn duplicate_submission_is_refused_while_busy() {
        let (mut wizard, _api, _identity) = wizard();
        wizard.set_name("Alex");
        let first = wizard.begin_profile_submit().unwrap();
        assert!(wizard.is_busy());
        let err = wizard.begin_profile_submit().unwrap_err();
        assert!(matches!(err, ScreenError::Busy { .. }));
        drop(first);
    }

    #[test]
    fn responses_cannot_be_submitted_from_profile_stage() {
        let (mut wizard, _api, _identity) = wizard();
        let err = wizard.begin_responses_submit().unwrap_err();
        assert!(matches!(err, ScreenError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn restart_discards_pending_submission() {
        let (mut wizard, api, identity) = wizard();
        wizard.set_name("Alex");
        let pending = wizard.begin_profile_submit().unwrap();
        wizard.restart();

        let outcome = api.create_user(&pending.payload).await;
        assert!(!wizard.settle_profile_submit(pending.ticket, outcome).unwrap());
        assert_eq!(wizard.stage(), IntakeStage::CollectingProfile);
        assert!(identity.get().is_none());
        assert!(wizard.profile().name.is_empty());
    }
}
