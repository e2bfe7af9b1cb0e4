//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the two view states (dashboard
//! and planner) that analysis results are applied to.

use chrono::{DateTime, Utc};
use mirror_core::{
    domain::{AIRecommendation, DashboardInsights, DashboardSnapshot, PerformanceDNA},
    gateway::AnalysisGateway,
    ports::{ContentStore, PortError, PortResult},
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;
use utoipa::ToSchema;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub gateway: AnalysisGateway,
    pub dashboard: RwLock<DashboardView>,
    pub planner: RwLock<PlannerView>,
}

impl AppState {
    pub fn new(store: Arc<dyn ContentStore>, gateway: AnalysisGateway) -> Self {
        Self {
            store,
            gateway,
            dashboard: RwLock::new(DashboardView::default()),
            planner: RwLock::new(PlannerView::default()),
        }
    }
}

//=========================================================================================
// Request Tracking
//=========================================================================================

/// Orders overlapping requests against one view.
///
/// Each request takes a ticket when it starts. Its outcome is applied only if no
/// later-issued request has been applied already, so the most recently issued
/// request that finishes always determines what the view shows. A request that
/// is dropped before finishing is abandoned and no longer counts as in flight.
#[derive(Debug, Default, Clone)]
pub struct RequestTracker {
    issued: u64,
    applied: u64,
    pending: BTreeSet<u64>,
}

impl RequestTracker {
    pub fn begin(&mut self) -> u64 {
        self.issued += 1;
        self.pending.insert(self.issued);
        self.issued
    }

    /// Marks `ticket` as applied if it is newer than anything applied so far.
    pub fn try_apply(&mut self, ticket: u64) -> bool {
        self.pending.remove(&ticket);
        if ticket <= self.applied {
            return false;
        }
        self.applied = ticket;
        true
    }

    /// Forgets `ticket` without applying anything.
    pub fn abandon(&mut self, ticket: u64) {
        self.pending.remove(&ticket);
    }

    /// True while some request newer than the last applied one is still running.
    pub fn in_flight(&self) -> bool {
        self.pending.iter().any(|ticket| *ticket > self.applied)
    }
}

/// The view a ticket was issued against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Dashboard,
    Planner,
}

/// Holds a ticket for a running request until its outcome is applied.
///
/// If the request future is dropped first (client disconnect, shutdown) the
/// ticket is abandoned on drop so the view does not keep reporting `loading`.
pub struct TicketGuard {
    app_state: Arc<AppState>,
    kind: ViewKind,
    ticket: u64,
    settled: bool,
}

impl TicketGuard {
    pub fn new(app_state: Arc<AppState>, kind: ViewKind, ticket: u64) -> Self {
        Self {
            app_state,
            kind,
            ticket,
            settled: false,
        }
    }

    /// Call once the outcome has been handed to the view's `finish`.
    pub fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for TicketGuard {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let (app_state, kind, ticket) = (self.app_state.clone(), self.kind, self.ticket);
        warn!(ticket, ?kind, "Request dropped before finishing; abandoning its ticket.");
        // The views sit behind async locks, so the release runs as its own task.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                match kind {
                    ViewKind::Dashboard => app_state.dashboard.write().await.abandon(ticket),
                    ViewKind::Planner => app_state.planner.write().await.abandon(ticket),
                }
            });
        }
    }
}

/// A failure as shown to the client, with a hint that the action may be retried.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub message: String,
    pub kind: String,
    pub retryable: bool,
}

impl From<&PortError> for ErrorInfo {
    fn from(error: &PortError) -> Self {
        Self {
            message: error.to_string(),
            kind: error.kind().to_string(),
            retryable: error.is_retryable(),
        }
    }
}

//=========================================================================================
// Dashboard View
//=========================================================================================

/// What the dashboard currently shows. DNA and insights are always replaced together.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub dna: Option<PerformanceDNA>,
    pub insights: Option<DashboardInsights>,
    pub loading: bool,
    pub last_error: Option<ErrorInfo>,
    pub refreshed_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    tracker: RequestTracker,
}

impl DashboardView {
    pub fn begin(&mut self) -> u64 {
        let ticket = self.tracker.begin();
        self.loading = true;
        ticket
    }

    /// Applies the outcome of refresh `ticket`. Returns false if it was stale and ignored.
    ///
    /// A failed refresh keeps the previous DNA and insights on screen.
    pub fn finish(&mut self, ticket: u64, outcome: &PortResult<DashboardSnapshot>) -> bool {
        let applied = self.tracker.try_apply(ticket);
        if applied {
            match outcome {
                Ok(snapshot) => {
                    self.dna = Some(snapshot.dna.clone());
                    self.insights = Some(snapshot.insights.clone());
                    self.last_error = None;
                    self.refreshed_at = Some(Utc::now());
                }
                Err(e) => self.last_error = Some(ErrorInfo::from(e)),
            }
        }
        self.loading = self.tracker.in_flight();
        applied
    }

    pub fn abandon(&mut self, ticket: u64) {
        self.tracker.abandon(ticket);
        self.loading = self.tracker.in_flight();
    }
}

//=========================================================================================
// Planner View
//=========================================================================================

/// The most recent recommendation shown in the content planner.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlannerView {
    pub topic: Option<String>,
    pub recommendation: Option<AIRecommendation>,
    pub loading: bool,
    pub last_error: Option<ErrorInfo>,
    #[serde(skip)]
    tracker: RequestTracker,
}

impl PlannerView {
    pub fn begin(&mut self) -> u64 {
        self.loading = true;
        self.tracker.begin()
    }

    pub fn finish(
        &mut self,
        ticket: u64,
        topic: &str,
        outcome: &PortResult<AIRecommendation>,
    ) -> bool {
        let applied = self.tracker.try_apply(ticket);
        if applied {
            self.topic = Some(topic.to_string());
            match outcome {
                Ok(recommendation) => {
                    self.recommendation = Some(recommendation.clone());
                    self.last_error = None;
                }
                Err(e) => {
                    self.recommendation = None;
                    self.last_error = Some(ErrorInfo::from(e));
                }
            }
        }
        self.loading = self.tracker.in_flight();
        applied
    }

    pub fn abandon(&mut self, ticket: u64) {
        self.tracker.abandon(ticket);
        self.loading = self.tracker.in_flight();
    }
}
