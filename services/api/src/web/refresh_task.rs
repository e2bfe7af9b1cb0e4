//! services/api/src/web/refresh_task.rs
//!
//! The worker that refreshes the dashboard: one concurrent DNA + insights
//! request against the current history, applied to the view all at once.

use crate::web::state::{AppState, DashboardView, TicketGuard, ViewKind};
use mirror_core::ports::PortResult;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Runs one dashboard refresh and applies its outcome.
///
/// On success returns the view as it stands after applying the new results.
/// On failure the previous DNA and insights stay in place and the error is returned.
pub async fn refresh_process(app_state: Arc<AppState>) -> PortResult<DashboardView> {
    let ticket = app_state.dashboard.write().await.begin();
    let guard = TicketGuard::new(app_state.clone(), ViewKind::Dashboard, ticket);
    info!(ticket, "Dashboard refresh started.");

    let outcome = match app_state.store.list().await {
        Ok(history) => app_state.gateway.refresh_dashboard(&history).await,
        Err(e) => Err(e),
    };

    let mut view = app_state.dashboard.write().await;
    if !view.finish(ticket, &outcome) {
        warn!(ticket, "A newer dashboard refresh already landed; discarding this one.");
    }
    guard.settle();

    match outcome {
        Ok(_) => {
            info!(ticket, "Dashboard refresh applied.");
            Ok(view.clone())
        }
        Err(e) => {
            error!(ticket, "Dashboard refresh failed: {}", e);
            Err(e)
        }
    }
}

/// Spawns the refresh that runs when the service comes up. Cancelling `shutdown`
/// abandons it; the dashboard then stays empty and stops reporting `loading`.
pub fn spawn_initial_refresh(
    app_state: Arc<AppState>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Initial dashboard refresh cancelled by shutdown.");
            }
            result = refresh_process(app_state) => {
                if result.is_err() {
                    warn!("Initial dashboard refresh failed; POST /dashboard/refresh to retry.");
                }
            }
        }
    })
}
