use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dao::models::ResponseEntity;

use super::format_system_time;

/// Longest answer text accepted from a participant.
pub const MAX_ANSWER_LEN: u64 = 500;

/// Answer submitted by a participant for one question.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubmitResponseRequest {
    pub participant_id: Uuid,
    pub question_id: Uuid,
    /// Answer text. Required, but may be blank when the participant ran out of time.
    #[validate(length(max = MAX_ANSWER_LEN))]
    pub answer: String,
    /// Seconds left on the participant's countdown when they answered.
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub time_remaining_secs: Option<f64>,
    /// Seconds the participant took to answer.
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub response_time_secs: Option<f64>,
}

/// A stored, scored response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResponseView {
    pub id: Uuid,
    pub event_id: Uuid,
    pub participant_id: Uuid,
    pub question_id: Uuid,
    pub answer: String,
    pub is_correct: bool,
    pub points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_remaining_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_secs: Option<f64>,
    /// RFC 3339 timestamp.
    pub submitted_at: String,
}

impl From<ResponseEntity> for ResponseView {
    fn from(response: ResponseEntity) -> Self {
        Self {
            id: response.id,
            event_id: response.event_id,
            participant_id: response.participant_id,
            question_id: response.question_id,
            answer: response.answer,
            is_correct: response.is_correct,
            points: response.points,
            time_remaining_secs: response.time_remaining_secs,
            response_time_secs: response.response_time_secs,
            submitted_at: format_system_time(response.submitted_at),
        }
    }
}
