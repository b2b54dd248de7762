use std::time::SystemTime;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    dao::models::ResponseEntity,
    dto::response::{ResponseView, SubmitResponseRequest},
    error::ServiceError,
    services::scoring::score_answer,
    state::SharedState,
};

/// Score and persist one answer.
///
/// Submissions are not gated on the session phase, and a participant may
/// answer the same question more than once; every submission is stored.
pub async fn submit_response(
    state: &SharedState,
    payload: SubmitResponseRequest,
) -> Result<ResponseView, ServiceError> {
    let store = state.require_trivia_store().await?;

    let participant = store
        .find_participant(payload.participant_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("participant `{}` not found", payload.participant_id))
        })?;
    let question = store
        .find_question(payload.question_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("question `{}` not found", payload.question_id))
        })?;

    if participant.event_id != question.event_id {
        return Err(ServiceError::InvalidInput(format!(
            "question `{}` does not belong to the participant's event",
            question.id
        )));
    }

    let score = score_answer(
        &payload.answer,
        &question.correct_answer,
        payload.time_remaining_secs,
    );
    let now = SystemTime::now();
    let response = ResponseEntity {
        id: Uuid::new_v4(),
        event_id: question.event_id,
        participant_id: participant.id,
        question_id: question.id,
        answer: payload.answer,
        is_correct: score.is_correct,
        points: score.points,
        time_remaining_secs: payload.time_remaining_secs,
        response_time_secs: payload.response_time_secs,
        submitted_at: now,
    };

    store.insert_response(response.clone()).await?;
    debug!(
        participant_id = %participant.id,
        question_id = %question.id,
        is_correct = score.is_correct,
        points = score.points,
        "response recorded"
    );

    if let Err(err) = store.touch_participant(participant.id, now).await {
        warn!(
            participant_id = %participant.id,
            error = %err,
            "failed to update participant activity"
        );
    }

    Ok(response.into())
}

/// Every response a participant has submitted, oldest first.
pub async fn participant_responses(
    state: &SharedState,
    participant_id: Uuid,
) -> Result<Vec<ResponseView>, ServiceError> {
    let store = state.require_trivia_store().await?;
    store
        .find_participant(participant_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("participant `{participant_id}` not found")))?;

    let responses = store.responses_for_participant(participant_id).await?;
    Ok(responses.into_iter().map(ResponseView::from).collect())
}
