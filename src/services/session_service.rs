use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::EventEntity,
    dao::trivia_store::TriviaStore,
    dto::session::{SessionCommand, SessionView},
    error::ServiceError,
    state::{SessionHandle, SessionSnapshot, SharedState},
};

/// Open the presenter session of `event_id`, or join the one already open.
pub async fn open_session(state: &SharedState, event_id: Uuid) -> Result<SessionView, ServiceError> {
    if let Some(handle) = state.session(event_id) {
        return Ok(handle.snapshot().into());
    }

    let store = state.require_trivia_store().await?;
    let event = load_event(store.as_ref(), event_id).await?;
    let questions = store.list_questions(event_id).await?;

    let handle = SessionHandle::spawn(
        event_id,
        &questions,
        event.team_switch_locked,
        state,
        state.session_settings(),
    );
    let handle = state.register_session(handle);
    info!(
        event_id = %event_id,
        questions = questions.len(),
        "presenter session opened"
    );

    Ok(handle.snapshot().into())
}

/// Close the presenter session of `event_id`, discarding its in-memory state.
pub async fn close_session(state: &SharedState, event_id: Uuid) -> Result<(), ServiceError> {
    match state.remove_session(event_id) {
        Some(_) => {
            info!(event_id = %event_id, "presenter session closed");
            Ok(())
        }
        None => Err(no_session(event_id)),
    }
}

/// Current session view. Events without an open session report `idle`.
pub async fn session_view(state: &SharedState, event_id: Uuid) -> Result<SessionView, ServiceError> {
    if let Some(handle) = state.session(event_id) {
        return Ok(handle.snapshot().into());
    }

    let store = state.require_trivia_store().await?;
    let event = load_event(store.as_ref(), event_id).await?;
    let questions = store.list_questions(event_id).await?;

    Ok(SessionSnapshot::unopened(event_id, questions.len(), event.team_switch_locked).into())
}

/// Forward a host command to the session task.
pub async fn run_command(
    state: &SharedState,
    event_id: Uuid,
    command: SessionCommand,
) -> Result<SessionView, ServiceError> {
    let handle = state.session(event_id).ok_or_else(|| no_session(event_id))?;
    let snapshot = handle.send(command.into()).await?;
    Ok(snapshot.into())
}

/// Toggle the automatic reveal of expired questions.
pub async fn set_auto_advance(
    state: &SharedState,
    event_id: Uuid,
    enabled: bool,
) -> Result<SessionView, ServiceError> {
    let handle = state.session(event_id).ok_or_else(|| no_session(event_id))?;
    let snapshot = handle.set_auto_advance(enabled).await?;
    Ok(snapshot.into())
}

async fn load_event(store: &dyn TriviaStore, event_id: Uuid) -> Result<EventEntity, ServiceError> {
    store
        .find_event(event_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event `{event_id}` not found")))
}

fn no_session(event_id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("no open session for event `{event_id}`"))
}
