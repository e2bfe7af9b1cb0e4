//! services/api/src/web/recommendation_task.rs
//!
//! The worker behind the content planner: one recommendation request for a topic.

use crate::web::state::{AppState, TicketGuard, ViewKind};
use mirror_core::{
    domain::AIRecommendation,
    ports::{PortError, PortResult},
};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Requests a recommendation for `topic` and records it in the planner view.
///
/// Overlapping requests are not cancelled; whichever was issued last wins the view.
pub async fn recommendation_process(
    app_state: Arc<AppState>,
    topic: &str,
) -> PortResult<AIRecommendation> {
    let topic = topic.trim();
    // Rejected here too so a blank submission never disturbs the planner view.
    if topic.is_empty() {
        return Err(PortError::InvalidInput(
            "A topic is required to request a recommendation.".to_string(),
        ));
    }

    let ticket = app_state.planner.write().await.begin();
    let guard = TicketGuard::new(app_state.clone(), ViewKind::Planner, ticket);
    info!(ticket, topic, "Recommendation requested.");

    let outcome = match app_state.store.list().await {
        Ok(history) => app_state.gateway.get_recommendation(topic, &history).await,
        Err(e) => Err(e),
    };

    if !app_state.planner.write().await.finish(ticket, topic, &outcome) {
        warn!(ticket, "A newer recommendation already landed; keeping it on screen.");
    }
    guard.settle();

    if let Err(e) = &outcome {
        error!(ticket, "Recommendation failed: {}", e);
    }
    outcome
}
