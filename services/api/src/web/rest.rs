//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    recommendation_task::recommendation_process,
    refresh_task::refresh_process,
    state::{AppState, DashboardView, ErrorInfo, PlannerView},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use mirror_core::{
    domain::{
        AIRecommendation, Alert, AlertSeverity, ContentEntry, ContentTone, ContentType,
        DashboardInsights, HookStyle, NewContentEntry, PerformanceDNA, TrendPoint,
    },
    ports::PortError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_content_handler,
        get_content_handler,
        create_content_handler,
        get_dashboard_handler,
        refresh_dashboard_handler,
        create_recommendation_handler,
        latest_recommendation_handler,
    ),
    components(
        schemas(
            ContentEntry, NewContentEntry, ContentType, ContentTone, HookStyle,
            PerformanceDNA, AIRecommendation, DashboardInsights, TrendPoint, Alert, AlertSeverity,
            DashboardResponse, DashboardView, PlannerView, ErrorInfo, RecommendationRequest
        )
    ),
    tags(
        (name = "MirrorAI API", description = "Content history and AI performance analysis for creators.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The dashboard view plus the size of the history it was computed from.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub view: DashboardView,
    pub record_count: usize,
}

/// The payload for requesting a recommendation.
#[derive(Deserialize, ToSchema)]
pub struct RecommendationRequest {
    pub topic: String,
}

type ErrorResponse = (StatusCode, Json<ErrorInfo>);

fn status_for(error: &PortError) -> StatusCode {
    match error {
        PortError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        PortError::Transport(_)
        | PortError::MalformedResponse(_)
        | PortError::IncompleteResponse(_) => StatusCode::BAD_GATEWAY,
        PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Maps a port error onto an HTTP status and a body the client can offer a retry from.
pub fn error_response(error: &PortError) -> ErrorResponse {
    (status_for(error), Json(ErrorInfo::from(error)))
}

//=========================================================================================
// Content Handlers
//=========================================================================================

/// List the content history in publication order.
#[utoipa::path(
    get,
    path = "/content",
    responses(
        (status = 200, description = "All stored content entries", body = [ContentEntry]),
        (status = 500, description = "Internal server error", body = ErrorInfo)
    )
)]
pub async fn list_content_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<ContentEntry>>, ErrorResponse> {
    app_state.store.list().await.map(Json).map_err(|e| {
        error!("Failed to list content: {:?}", e);
        error_response(&e)
    })
}

/// Fetch a single content entry by id.
#[utoipa::path(
    get,
    path = "/content/{id}",
    params(("id" = String, Path, description = "The content entry id.")),
    responses(
        (status = 200, description = "The content entry", body = ContentEntry),
        (status = 404, description = "No entry with that id", body = ErrorInfo)
    )
)]
pub async fn get_content_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ContentEntry>, ErrorResponse> {
    app_state
        .store
        .get(&id)
        .await
        .map(Json)
        .map_err(|e| error_response(&e))
}

/// Append a new content entry to the history.
#[utoipa::path(
    post,
    path = "/content",
    request_body = NewContentEntry,
    responses(
        (status = 201, description = "Entry stored", body = ContentEntry),
        (status = 400, description = "Invalid entry", body = ErrorInfo)
    )
)]
pub async fn create_content_handler(
    State(app_state): State<Arc<AppState>>,
    Json(entry): Json<NewContentEntry>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let stored = app_state
        .store
        .append(entry)
        .await
        .map_err(|e| error_response(&e))?;
    Ok((StatusCode::CREATED, Json(stored)))
}

//=========================================================================================
// Dashboard Handlers
//=========================================================================================

/// The current dashboard: Performance DNA, insights and refresh status.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses((status = 200, description = "Current dashboard view", body = DashboardResponse))
)]
pub async fn get_dashboard_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<DashboardResponse>, ErrorResponse> {
    let record_count = app_state
        .store
        .count()
        .await
        .map_err(|e| error_response(&e))?;
    let view = app_state.dashboard.read().await.clone();
    Ok(Json(DashboardResponse { view, record_count }))
}

/// Re-run the combined DNA + insights analysis over the current history.
///
/// Both results are applied together or not at all.
#[utoipa::path(
    post,
    path = "/dashboard/refresh",
    responses(
        (status = 200, description = "Refresh applied", body = DashboardResponse),
        (status = 502, description = "Analysis backend failed; previous results kept", body = ErrorInfo)
    )
)]
pub async fn refresh_dashboard_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<DashboardResponse>, ErrorResponse> {
    let view = refresh_process(app_state.clone())
        .await
        .map_err(|e| error_response(&e))?;
    let record_count = app_state
        .store
        .count()
        .await
        .map_err(|e| error_response(&e))?;
    Ok(Json(DashboardResponse { view, record_count }))
}

//=========================================================================================
// Planner Handlers
//=========================================================================================

/// Ask for a duration/tone/hook recommendation for a new topic.
#[utoipa::path(
    post,
    path = "/recommendations",
    request_body = RecommendationRequest,
    responses(
        (status = 200, description = "Recommendation generated", body = AIRecommendation),
        (status = 400, description = "Empty topic", body = ErrorInfo),
        (status = 502, description = "Analysis backend failed", body = ErrorInfo)
    )
)]
pub async fn create_recommendation_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<RecommendationRequest>,
) -> Result<Json<AIRecommendation>, ErrorResponse> {
    recommendation_process(app_state, &request.topic)
        .await
        .map(Json)
        .map_err(|e| error_response(&e))
}

/// The recommendation currently shown in the planner.
#[utoipa::path(
    get,
    path = "/recommendations/latest",
    responses((status = 200, description = "Current planner view", body = PlannerView))
)]
pub async fn latest_recommendation_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<PlannerView> {
    Json(app_state.planner.read().await.clone())
}
