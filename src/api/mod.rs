//! Assessment API: the remote service that scores assessments, generates
//! recovery plans and analyses progress.
//!
//! Screens depend only on the [`AssessmentApi`] trait; [`HttpAssessmentApi`]
//! is the production implementation over JSON/HTTP.

pub mod http;
pub mod model;

#[cfg(test)]
pub(crate) mod fake;

pub use http::HttpAssessmentApi;
pub use model::*;

use async_trait::async_trait;

use crate::error::ApiError;

/// Operations consumed from the Assessment API.
#[async_trait]
pub trait AssessmentApi: Send + Sync {
    /// create-identity: register a profile and obtain the user identifier.
    async fn create_user(&self, profile: &ProfileInput) -> Result<UserRecord, ApiError>;

    async fn get_user(&self, user_id: &UserId) -> Result<UserRecord, ApiError>;

    async fn create_assessment(
        &self,
        user_id: &UserId,
        responses: &ResponseSet,
    ) -> Result<AssessmentSummary, ApiError>;

    async fn get_assessment(&self, id: &AssessmentId) -> Result<AssessmentSummary, ApiError>;

    async fn get_assessment_details(&self, id: &AssessmentId)
    -> Result<AssessmentDetails, ApiError>;

    /// Assessment history, most recent first.
    async fn get_user_assessments(&self, user_id: &UserId)
    -> Result<Vec<AssessmentSummary>, ApiError>;

    async fn generate_recovery_plan(
        &self,
        user_id: &UserId,
        assessment_id: &AssessmentId,
    ) -> Result<RecoveryPlan, ApiError>;

    /// `Ok(None)` when the user has no plan yet.
    async fn get_latest_recovery_plan(
        &self,
        user_id: &UserId,
    ) -> Result<Option<RecoveryPlan>, ApiError>;

    async fn get_recovery_plan(&self, plan_id: &PlanId) -> Result<RecoveryPlan, ApiError>;

    async fn create_progress_record(
        &self,
        record: &NewProgressRecord,
    ) -> Result<ProgressRecord, ApiError>;

    /// Progress records, most recent first.
    async fn get_user_progress(&self, user_id: &UserId) -> Result<Vec<ProgressRecord>, ApiError>;

    async fn get_progress_analysis(&self, user_id: &UserId)
    -> Result<ProgressAnalysis, ApiError>;
}
