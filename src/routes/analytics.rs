use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    aggregate::analytics::{EventAnalytics, QuestionSummary},
    error::AppError,
    services::analytics_service,
    state::SharedState,
};

/// Post-event analytics routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/events/{event_id}/analytics", get(event_analytics))
        .route("/questions/{question_id}/analytics", get(question_analytics))
}

/// Accuracy, points and timing for every question of an event.
#[utoipa::path(
    get,
    path = "/events/{event_id}/analytics",
    tag = "analytics",
    params(("event_id" = Uuid, Path, description = "Event identifier")),
    responses(
        (status = 200, description = "Event analytics", body = EventAnalytics),
        (status = 404, description = "Unknown event")
    )
)]
pub async fn event_analytics(
    State(state): State<SharedState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventAnalytics>, AppError> {
    Ok(Json(
        analytics_service::event_analytics(&state, event_id).await?,
    ))
}

/// Accuracy, points, timing and answer distribution of one question.
#[utoipa::path(
    get,
    path = "/questions/{question_id}/analytics",
    tag = "analytics",
    params(("question_id" = Uuid, Path, description = "Question identifier")),
    responses(
        (status = 200, description = "Question analytics", body = QuestionSummary),
        (status = 404, description = "Unknown question")
    )
)]
pub async fn question_analytics(
    State(state): State<SharedState>,
    Path(question_id): Path<Uuid>,
) -> Result<Json<QuestionSummary>, AppError> {
    Ok(Json(
        analytics_service::question_analytics(&state, question_id).await?,
    ))
}
