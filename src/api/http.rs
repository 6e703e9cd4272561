//! JSON/HTTP client for the Assessment API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::USER_AGENT as USER_AGENT_HEADER;
use reqwest::{Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::AssessmentApi;
use super::model::*;
use crate::config::ClientConfig;
use crate::error::ApiError;

/// Assessment API over HTTP, following the service's REST layout.
pub struct HttpAssessmentApi {
    base_url: String,
    request_timeout: Duration,
    client: reqwest::Client,
}

const USER_AGENT: &str = concat!("burnout-tracker/", env!("CARGO_PKG_VERSION"));

impl HttpAssessmentApi {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.api_url.clone(), config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(path, "GET");
        let resp = self
            .client
            .get(self.url(path))
            .timeout(self.request_timeout)
            .header(USER_AGENT_HEADER, USER_AGENT)
            .send()
            .await
            .map_err(|e| transport_error(path, e))?;
        decode(path, resp).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!(path, "POST");
        let resp = self
            .client
            .post(self.url(path))
            .timeout(self.request_timeout)
            .header(USER_AGENT_HEADER, USER_AGENT)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(path, e))?;
        decode(path, resp).await
    }
}

fn transport_error(path: &str, e: reqwest::Error) -> ApiError {
    warn!(path, error = %e, "Assessment API unreachable");
    ApiError::Unreachable {
        reason: e.to_string(),
    }
}

/// Map a response to the typed body or to the error taxonomy.
async fn decode<T: DeserializeOwned>(path: &str, resp: Response) -> Result<T, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return resp.json::<T>().await.map_err(|e| {
            warn!(path, error = %e, "Assessment API returned an unexpected body");
            ApiError::Decode(e.to_string())
        });
    }

    let body = resp.text().await.unwrap_or_default();
    let detail = extract_detail(&body);
    warn!(path, status = status.as_u16(), detail = ?detail, "Assessment API error");

    if status == StatusCode::NOT_FOUND {
        Err(ApiError::NotFound { detail })
    } else {
        Err(ApiError::Service {
            status: status.as_u16(),
            detail,
        })
    }
}

/// Pull `detail` out of an error body. Structured details (validation error
/// lists) are kept as compact JSON text.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Null | serde_json::Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl AssessmentApi for HttpAssessmentApi {
    async fn create_user(&self, profile: &ProfileInput) -> Result<UserRecord, ApiError> {
        self.post("/users/", profile).await
    }

    async fn get_user(&self, user_id: &UserId) -> Result<UserRecord, ApiError> {
        self.get(&format!("/users/{user_id}")).await
    }

    async fn create_assessment(
        &self,
        user_id: &UserId,
        responses: &ResponseSet,
    ) -> Result<AssessmentSummary, ApiError> {
        let body = CreateAssessmentRequest { user_id, responses };
        self.post("/assessments/", &body).await
    }

    async fn get_assessment(&self, id: &AssessmentId) -> Result<AssessmentSummary, ApiError> {
        self.get(&format!("/assessments/{id}")).await
    }

    async fn get_assessment_details(
        &self,
        id: &AssessmentId,
    ) -> Result<AssessmentDetails, ApiError> {
        self.get(&format!("/assessments/{id}/details")).await
    }

    async fn get_user_assessments(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<AssessmentSummary>, ApiError> {
        self.get(&format!("/assessments/user/{user_id}")).await
    }

    async fn generate_recovery_plan(
        &self,
        user_id: &UserId,
        assessment_id: &AssessmentId,
    ) -> Result<RecoveryPlan, ApiError> {
        let body = GeneratePlanRequest {
            user_id,
            assessment_id,
        };
        self.post("/recovery/generate", &body).await
    }

    async fn get_latest_recovery_plan(
        &self,
        user_id: &UserId,
    ) -> Result<Option<RecoveryPlan>, ApiError> {
        let path = format!("/recovery/user/{user_id}/latest");
        match self.get::<RecoveryPlan>(&path).await {
            Ok(plan) => Ok(Some(plan)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_recovery_plan(&self, plan_id: &PlanId) -> Result<RecoveryPlan, ApiError> {
        self.get(&format!("/recovery/{plan_id}")).await
    }

    async fn create_progress_record(
        &self,
        record: &NewProgressRecord,
    ) -> Result<ProgressRecord, ApiError> {
        self.post("/progress/", record).await
    }

    async fn get_user_progress(&self, user_id: &UserId) -> Result<Vec<ProgressRecord>, ApiError> {
        self.get(&format!("/progress/user/{user_id}")).await
    }

    async fn get_progress_analysis(
        &self,
        user_id: &UserId,
    ) -> Result<ProgressAnalysis, ApiError> {
        self.get(&format!("/progress/user/{user_id}/analysis")).await
    }
}
