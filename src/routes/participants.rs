use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        participant::{ParticipantView, SwitchTeamRequest},
        response::ResponseView,
    },
    error::AppError,
    services::{submission_service, team_service},
    state::SharedState,
};

/// Participant-facing routes: response history and team switching.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/participants/{participant_id}/responses",
            get(participant_responses),
        )
        .route("/participants/{participant_id}/team", put(switch_team))
}

/// List every response a participant submitted.
#[utoipa::path(
    get,
    path = "/participants/{participant_id}/responses",
    tag = "participants",
    params(("participant_id" = Uuid, Path, description = "Participant identifier")),
    responses(
        (status = 200, description = "Submitted responses", body = [ResponseView]),
        (status = 404, description = "Unknown participant")
    )
)]
pub async fn participant_responses(
    State(state): State<SharedState>,
    Path(participant_id): Path<Uuid>,
) -> Result<Json<Vec<ResponseView>>, AppError> {
    Ok(Json(
        submission_service::participant_responses(&state, participant_id).await?,
    ))
}

/// Move a participant to another team before the first question.
#[utoipa::path(
    put,
    path = "/participants/{participant_id}/team",
    tag = "participants",
    params(("participant_id" = Uuid, Path, description = "Participant identifier")),
    request_body = SwitchTeamRequest,
    responses(
        (status = 200, description = "Team updated", body = ParticipantView),
        (status = 400, description = "Team belongs to another event"),
        (status = 404, description = "Unknown participant or team"),
        (status = 409, description = "Team is full"),
        (status = 423, description = "Team switching is locked")
    )
)]
pub async fn switch_team(
    State(state): State<SharedState>,
    Path(participant_id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<SwitchTeamRequest>>,
) -> Result<Json<ParticipantView>, AppError> {
    Ok(Json(
        team_service::switch_team(&state, participant_id, payload.team_id).await?,
    ))
}
