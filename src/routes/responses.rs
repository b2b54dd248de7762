use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use axum_valid::Valid;

use crate::{
    dto::response::{ResponseView, SubmitResponseRequest},
    error::AppError,
    services::submission_service,
    state::SharedState,
};

/// Participant answer submission.
pub fn router() -> Router<SharedState> {
    Router::new().route("/responses", post(submit_response))
}

/// Score and store an answer.
#[utoipa::path(
    post,
    path = "/responses",
    tag = "responses",
    request_body = SubmitResponseRequest,
    responses(
        (status = 201, description = "Response scored and stored", body = ResponseView),
        (status = 400, description = "Invalid payload or question from another event"),
        (status = 404, description = "Unknown participant or question"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn submit_response(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<SubmitResponseRequest>>,
) -> Result<(StatusCode, Json<ResponseView>), AppError> {
    let response = submission_service::submit_response(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
