//! ProgressTracker: trend analysis, score chart and self-report records.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::chart::{ChartPoint, project_chart};
use super::trend::TrendDisplay;
use crate::api::{
    AssessmentApi, AssessmentSummary, NewProgressRecord, ProgressAnalysis, UserId,
};
use crate::error::{ApiError, ScreenError};
use crate::identity::IdentityStore;
use crate::screen::{Action, InFlight, Pending, Ticket, display_date};

const LOAD_FALLBACK: &str = "Failed to load progress data";
const SAVE_FALLBACK: &str = "Failed to save progress";
const MISSING_IDENTITY: &str = "User ID not found";

pub const EMPTY_CHART_MESSAGE: &str =
    "Not enough data points yet. Complete more assessments to see your progress over time.";

const DEFAULT_WEEKLY_SCORE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressAction {
    Load,
    AddRecord,
}

impl Action for ProgressAction {
    fn name(&self) -> &'static str {
        match self {
            Self::Load => "progress load",
            Self::AddRecord => "progress record submission",
        }
    }
}

#[derive(Debug, Clone)]
pub enum ProgressState {
    Loading,
    /// The service has no assessments for this user yet.
    Empty,
    Ready(ProgressAnalysis),
    Failed(String),
}

/// The add-record form.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressForm {
    pub open: bool,
    weekly_score: f64,
    notes: String,
}

impl Default for ProgressForm {
    fn default() -> Self {
        Self {
            open: false,
            weekly_score: DEFAULT_WEEKLY_SCORE,
            notes: String::new(),
        }
    }
}

impl ProgressForm {
    pub fn weekly_score(&self) -> f64 {
        self.weekly_score
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Whole points in [0,100]; non-finite input is ignored.
    pub fn set_weekly_score(&mut self, raw: f64) -> f64 {
        if raw.is_finite() {
            self.weekly_score = raw.round().clamp(0.0, 100.0);
        }
        self.weekly_score
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// The record to submit; an empty note is sent as absent.
    pub fn to_record(&self, user_id: UserId) -> NewProgressRecord {
        NewProgressRecord {
            user_id,
            weekly_score: self.weekly_score,
            user_notes: (!self.notes.trim().is_empty()).then(|| self.notes.clone()),
        }
    }
}

/// What the entry fetch returned; the two halves are independent.
#[derive(Debug)]
pub struct ProgressSnapshot {
    pub analysis: Result<ProgressAnalysis, ApiError>,
    pub history: Result<Vec<AssessmentSummary>, ApiError>,
}

/// Fetch analysis and assessment history concurrently.
pub async fn fetch_snapshot(api: &dyn AssessmentApi, user_id: &UserId) -> ProgressSnapshot {
    let (analysis, history) = futures::future::join(
        api.get_progress_analysis(user_id),
        api.get_user_assessments(user_id),
    )
    .await;
    ProgressSnapshot { analysis, history }
}

/// Save a record, then re-read the analysis. The chart is not refreshed.
pub async fn save_and_refresh(
    api: &dyn AssessmentApi,
    record: &NewProgressRecord,
) -> Result<ProgressAnalysis, ApiError> {
    api.create_progress_record(record).await?;
    api.get_progress_analysis(&record.user_id).await
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordView {
    pub score: String,
    pub date: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressView {
    pub current_score: String,
    pub current_stage: String,
    pub trend: Option<TrendDisplay>,
    pub chart: Vec<ChartPoint>,
    /// Shown in place of the chart when it has no points.
    pub chart_notice: Option<&'static str>,
    pub records: Vec<RecordView>,
}

pub struct ProgressTracker {
    api: Arc<dyn AssessmentApi>,
    identity: Arc<IdentityStore>,
    state: ProgressState,
    chart: Vec<ChartPoint>,
    form: ProgressForm,
    error: Option<String>,
    inflight: InFlight<ProgressAction>,
}

impl ProgressTracker {
    pub fn new(api: Arc<dyn AssessmentApi>, identity: Arc<IdentityStore>) -> Self {
        Self {
            api,
            identity,
            state: ProgressState::Loading,
            chart: Vec::new(),
            form: ProgressForm::default(),
            error: None,
            inflight: InFlight::new(),
        }
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn chart(&self) -> &[ChartPoint] {
        &self.chart
    }

    pub fn form(&self) -> &ProgressForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ProgressForm {
        &mut self.form
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_saving(&self) -> bool {
        self.inflight.is_busy(ProgressAction::AddRecord)
    }

    pub fn open_form(&mut self) {
        self.form.open = true;
    }

    /// Close and reset the form without saving.
    pub fn cancel_form(&mut self) {
        self.form = ProgressForm::default();
    }

    pub fn view(&self) -> Option<ProgressView> {
        let ProgressState::Ready(analysis) = &self.state else {
            return None;
        };
        let records = analysis
            .progress_history
            .iter()
            .map(|record| RecordView {
                score: format!("{:.1}", record.weekly_score),
                date: display_date(&record.timestamp),
                notes: record.user_notes.clone().filter(|n| !n.is_empty()),
            })
            .collect();
        Some(ProgressView {
            current_score: format!("{:.1}", analysis.current_score),
            current_stage: analysis.current_stage.clone(),
            trend: analysis.trend.as_ref().map(TrendDisplay::new),
            chart: self.chart.clone(),
            chart_notice: self.chart.is_empty().then_some(EMPTY_CHART_MESSAGE),
            records,
        })
    }

    pub fn begin_load(&mut self) -> Result<Pending<ProgressAction, UserId>, ScreenError> {
        let user_id = self.require_identity()?;
        let ticket = self.inflight.restart(ProgressAction::Load);
        self.state = ProgressState::Loading;
        self.error = None;
        Ok(Pending {
            ticket,
            payload: user_id,
        })
    }

    /// A not-found analysis means no assessments yet and renders as
    /// [`ProgressState::Empty`]. Any other failure of either half fails
    /// the load.
    pub fn settle_load(
        &mut self,
        ticket: Ticket<ProgressAction>,
        snapshot: ProgressSnapshot,
    ) -> Result<bool, ScreenError> {
        if !self.inflight.settle(ticket) {
            return Ok(false);
        }
        let analysis = match snapshot.analysis {
            Ok(analysis) => Some(analysis),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(self.load_failure(e)),
        };
        let history = match snapshot.history {
            Ok(history) => history,
            Err(e) => return Err(self.load_failure(e)),
        };
        self.chart = project_chart(&history);
        self.state = match analysis {
            Some(analysis) => ProgressState::Ready(analysis),
            None => ProgressState::Empty,
        };
        Ok(true)
    }

    pub async fn load(&mut self) -> Result<(), ScreenError> {
        let request = self.begin_load()?;
        let snapshot = fetch_snapshot(self.api.as_ref(), &request.payload).await;
        self.settle_load(request.ticket, snapshot)?;
        Ok(())
    }

    pub fn begin_add_record(
        &mut self,
    ) -> Result<Pending<ProgressAction, NewProgressRecord>, ScreenError> {
        let user_id = self.require_identity()?;
        let ticket = self.inflight.begin(ProgressAction::AddRecord)?;
        self.error = None;
        Ok(Pending {
            ticket,
            payload: self.form.to_record(user_id),
        })
    }

    /// Success replaces the analysis and resets the form; failure keeps
    /// the form as entered.
    pub fn settle_add_record(
        &mut self,
        ticket: Ticket<ProgressAction>,
        outcome: Result<ProgressAnalysis, ApiError>,
    ) -> Result<bool, ScreenError> {
        if !self.inflight.settle(ticket) {
            return Ok(false);
        }
        match outcome {
            Ok(analysis) => {
                info!(current_score = analysis.current_score, "Progress record saved");
                self.state = ProgressState::Ready(analysis);
                self.form = ProgressForm::default();
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "Failed to save progress record");
                self.error = Some(e.user_message(SAVE_FALLBACK));
                Err(e.into())
            }
        }
    }

    pub async fn add_record(&mut self) -> Result<(), ScreenError> {
        let request = self.begin_add_record()?;
        let outcome = save_and_refresh(self.api.as_ref(), &request.payload).await;
        self.settle_add_record(request.ticket, outcome)?;
        Ok(())
    }

    fn load_failure(&mut self, e: ApiError) -> ScreenError {
        warn!(error = %e, "Failed to load progress");
        self.state = ProgressState::Failed(e.user_message(LOAD_FALLBACK));
        e.into()
    }

    fn require_identity(&mut self) -> Result<UserId, ScreenError> {
        self.identity.get().ok_or_else(|| {
            self.error = Some(MISSING_IDENTITY.to_string());
            ScreenError::Precondition(MISSING_IDENTITY.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Trend;
    use crate::api::fake::{self, FakeApi};
    use crate::progress::trend::TrendTone;

    fn tracker() -> (ProgressTracker, Arc<FakeApi>) {
        let api = Arc::new(FakeApi::new());
        let identity = Arc::new(IdentityStore::in_memory());
        identity.set(UserId::new("1")).unwrap();
        (ProgressTracker::new(api.clone(), identity), api)
    }

    fn seed(api: &FakeApi) {
        api.with(|s| {
            s.assessments = vec![
                fake::summary("C", 35.0, 20),
                fake::summary("B", 48.0, 13),
                fake::summary("A", 62.0, 6),
            ];
            s.analysis = Some(fake::analysis(35.0, Trend::Improving, -13.0));
        });
    }

    #[tokio::test]
    async fn load_projects_chart_and_trend() {
        let (mut tracker, api) = tracker();
        seed(&api);
        tracker.load().await.unwrap();

        let view = tracker.view().unwrap();
        assert_eq!(view.current_score, "35.0");
        let labels: Vec<_> = view.chart.iter().map(|p| (p.label.as_str(), p.score)).collect();
        assert_eq!(labels, [("Week 1", 62.0), ("Week 2", 48.0), ("Week 3", 35.0)]);
        assert!(view.chart_notice.is_none());
        let trend = view.trend.unwrap();
        assert_eq!(trend.tone, TrendTone::Positive);
        assert_eq!(trend.change.as_deref(), Some("-13.0"));
        assert_eq!(trend.label, "Improving");
    }

    #[tokio::test]
    async fn no_assessments_is_an_empty_state() {
        let (mut tracker, _api) = tracker();
        tracker.load().await.unwrap();
        assert!(matches!(tracker.state(), ProgressState::Empty));
        assert!(tracker.error().is_none());
        assert!(tracker.view().is_none());
    }

    #[tokio::test]
    async fn empty_chart_shows_notice() {
        let (mut tracker, api) = tracker();
        api.with(|s| s.analysis = Some(fake::analysis(20.0, Trend::Other("stable".into()), 0.0)));
        tracker.load().await.unwrap();
        let view = tracker.view().unwrap();
        assert_eq!(view.chart_notice, Some(EMPTY_CHART_MESSAGE));
        assert!(view.trend.unwrap().change.is_none());
    }

    #[tokio::test]
    async fn history_failure_fails_the_load() {
        let (mut tracker, api) = tracker();
        seed(&api);
        api.fail("get_user_assessments", ApiError::Decode("bad".into()));
        assert!(tracker.load().await.is_err());
        match tracker.state() {
            ProgressState::Failed(msg) => assert_eq!(msg, LOAD_FALLBACK),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[tokio::test]
    async fn add_record_refreshes_analysis_only() {
        let (mut tracker, api) = tracker();
        seed(&api);
        tracker.load().await.unwrap();
        tracker.open_form();
        tracker.form_mut().set_weekly_score(40.0);
        tracker.form_mut().set_notes("Better week");

        tracker.add_record().await.unwrap();

        assert_eq!(api.call_count("get_progress_analysis"), 2);
        assert_eq!(api.call_count("get_user_assessments"), 1);
        assert_eq!(tracker.chart().len(), 3);
        let view = tracker.view().unwrap();
        assert_eq!(view.records.len(), 1);
        assert_eq!(view.records[0].score, "40.0");
        assert_eq!(view.records[0].notes.as_deref(), Some("Better week"));
        assert_eq!(tracker.form(), &ProgressForm::default());
    }

    #[tokio::test]
    async fn empty_note_is_sent_as_absent() {
        let (mut tracker, api) = tracker();
        seed(&api);
        tracker.load().await.unwrap();
        tracker.form_mut().set_notes("   ");
        tracker.add_record().await.unwrap();
        let sent = api.with(|s| s.progress_requests.clone());
        assert_eq!(sent[0].user_notes, None);
        assert_eq!(sent[0].weekly_score, DEFAULT_WEEKLY_SCORE);
    }

    #[tokio::test]
    async fn failed_save_keeps_form() {
        let (mut tracker, api) = tracker();
        seed(&api);
        tracker.load().await.unwrap();
        tracker.open_form();
        tracker.form_mut().set_weekly_score(72.0);
        api.fail("create_progress_record", ApiError::Service { status: 500, detail: None });

        assert!(tracker.add_record().await.is_err());
        assert_eq!(tracker.error(), Some(SAVE_FALLBACK));
        assert!(tracker.form().open);
        assert_eq!(tracker.form().weekly_score(), 72.0);
    }

    #[test]
    fn weekly_score_is_clamped_to_whole_points() {
        let mut form = ProgressForm::default();
        assert_eq!(form.weekly_score(), 50.0);
        assert_eq!(form.set_weekly_score(150.0), 100.0);
        assert_eq!(form.set_weekly_score(-1.0), 0.0);
        assert_eq!(form.set_weekly_score(33.6), 34.0);
        assert_eq!(form.set_weekly_score(f64::INFINITY), 34.0);
    }

    #[test]
    fn cancel_resets_form() {
        let (mut tracker, _api) = tracker();
        tracker.open_form();
        tracker.form_mut().set_notes("draft");
        tracker.cancel_form();
        assert_eq!(tracker.form(), &ProgressForm::default());
    }

    #[test]
    fn record_submission_is_not_reentrant() {
        let (mut tracker, _api) = tracker();
        let _pending = tracker.begin_add_record().unwrap();
        assert!(tracker.is_saving());
        assert!(matches!(
            tracker.begin_add_record(),
            Err(ScreenError::Busy { .. })
        ));
    }

    #[tokio::test]
    async fn reload_during_record_save_keeps_busy() {
        let (mut tracker, api) = tracker();
        seed(&api);
        tracker.load().await.unwrap();
        tracker.open_form();
        tracker.form_mut().set_weekly_score(40.0);

        let saving = tracker.begin_add_record().unwrap();
        let reload = tracker.begin_load().unwrap();
        assert!(tracker.is_saving());
        assert!(matches!(
            tracker.begin_add_record(),
            Err(ScreenError::Busy { .. })
        ));

        let outcome = save_and_refresh(&*api, &saving.payload).await;
        assert!(tracker.settle_add_record(saving.ticket, outcome).unwrap());
        assert!(!tracker.is_saving());
        assert_eq!(tracker.form(), &ProgressForm::default());

        let snapshot = fetch_snapshot(&*api, &reload.payload).await;
        assert!(tracker.settle_load(reload.ticket, snapshot).unwrap());
        assert_eq!(tracker.view().unwrap().records.len(), 1);
        assert_eq!(api.call_count("create_progress_record"), 1);
    }
}
