use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::session::{AutoAdvanceRequest, SessionCommand, SessionView},
    error::AppError,
    services::session_service,
    state::SharedState,
};

/// Presenter session routes: open, poll, close and drive one event's session.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/events/{event_id}/session",
            post(open_session).get(get_session).delete(close_session),
        )
        .route(
            "/events/{event_id}/session/auto-advance",
            put(set_auto_advance),
        )
        .route("/events/{event_id}/session/{command}", post(run_command))
}

/// Open the presenter session of an event, or join it if already open.
#[utoipa::path(
    post,
    path = "/events/{event_id}/session",
    tag = "session",
    params(("event_id" = Uuid, Path, description = "Event to present")),
    responses(
        (status = 200, description = "Session opened or joined", body = SessionView),
        (status = 404, description = "Unknown event"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn open_session(
    State(state): State<SharedState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(session_service::open_session(&state, event_id).await?))
}

/// Poll the session; events nobody presents yet report `idle`.
#[utoipa::path(
    get,
    path = "/events/{event_id}/session",
    tag = "session",
    params(("event_id" = Uuid, Path, description = "Event to inspect")),
    responses(
        (status = 200, description = "Current session state", body = SessionView),
        (status = 404, description = "Unknown event")
    )
)]
pub async fn get_session(
    State(state): State<SharedState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(session_service::session_view(&state, event_id).await?))
}

/// Close the presenter session, discarding its phase and countdown.
#[utoipa::path(
    delete,
    path = "/events/{event_id}/session",
    tag = "session",
    params(("event_id" = Uuid, Path, description = "Event whose session to close")),
    responses(
        (status = 204, description = "Session closed"),
        (status = 404, description = "No open session")
    )
)]
pub async fn close_session(
    State(state): State<SharedState>,
    Path(event_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    session_service::close_session(&state, event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Apply a host command to the session.
#[utoipa::path(
    post,
    path = "/events/{event_id}/session/{command}",
    tag = "session",
    params(
        ("event_id" = Uuid, Path, description = "Event whose session to drive"),
        ("command" = SessionCommand, Path, description = "Host command")
    ),
    responses(
        (status = 200, description = "Command applied", body = SessionView),
        (status = 404, description = "No open session"),
        (status = 409, description = "Command not allowed in the current phase"),
        (status = 503, description = "Team lock could not be persisted")
    )
)]
pub async fn run_command(
    State(state): State<SharedState>,
    Path((event_id, command)): Path<(Uuid, SessionCommand)>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(
        session_service::run_command(&state, event_id, command).await?,
    ))
}

/// Enable or disable the automatic reveal of expired questions.
#[utoipa::path(
    put,
    path = "/events/{event_id}/session/auto-advance",
    tag = "session",
    params(("event_id" = Uuid, Path, description = "Event whose session to configure")),
    request_body = AutoAdvanceRequest,
    responses(
        (status = 200, description = "Preference updated", body = SessionView),
        (status = 404, description = "No open session")
    )
)]
pub async fn set_auto_advance(
    State(state): State<SharedState>,
    Path(event_id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<AutoAdvanceRequest>>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(
        session_service::set_auto_advance(&state, event_id, payload.enabled).await?,
    ))
}
