use uuid::Uuid;

use crate::{
    aggregate::analytics::{EventAnalytics, QuestionSummary, summarize_event, summarize_question},
    error::ServiceError,
    state::SharedState,
};

/// Per-question and event-wide figures for `event_id`.
pub async fn event_analytics(
    state: &SharedState,
    event_id: Uuid,
) -> Result<EventAnalytics, ServiceError> {
    let store = state.require_trivia_store().await?;
    store
        .find_event(event_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event `{event_id}` not found")))?;

    let questions = store.list_questions(event_id).await?;
    let teams = store.list_teams(event_id).await?;
    let participants = store.list_participants(event_id).await?;
    let responses = store.responses_for_event(event_id).await?;

    Ok(summarize_event(
        event_id,
        &questions,
        &teams,
        &participants,
        &responses,
    ))
}

/// Figures for a single question.
pub async fn question_analytics(
    state: &SharedState,
    question_id: Uuid,
) -> Result<QuestionSummary, ServiceError> {
    let store = state.require_trivia_store().await?;
    let question = store
        .find_question(question_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("question `{question_id}` not found")))?;
    let responses = store.responses_for_question(question_id).await?;

    Ok(summarize_question(&question, &responses))
}
