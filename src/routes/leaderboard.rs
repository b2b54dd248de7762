use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::leaderboard::{LeaderboardQuery, LeaderboardResponse},
    error::AppError,
    services::leaderboard_service,
    state::SharedState,
};

/// Standings routes.
pub fn router() -> Router<SharedState> {
    Router::new().route("/events/{event_id}/leaderboard", get(leaderboard))
}

/// Rank teams or participants by points.
#[utoipa::path(
    get,
    path = "/events/{event_id}/leaderboard",
    tag = "leaderboard",
    params(
        ("event_id" = Uuid, Path, description = "Event identifier"),
        LeaderboardQuery
    ),
    responses(
        (status = 200, description = "Current standings", body = LeaderboardResponse),
        (status = 404, description = "Unknown event"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn leaderboard(
    State(state): State<SharedState>,
    Path(event_id): Path<Uuid>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    Ok(Json(
        leaderboard_service::leaderboard(&state, event_id, query.kind).await?,
    ))
}
