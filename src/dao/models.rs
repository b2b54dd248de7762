use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// One trivia occasion with its own questions, teams and participants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventEntity {
    /// Stable identifier for the event.
    pub id: Uuid,
    /// Human readable event name.
    pub name: String,
    /// Set once the first question has been shown; never cleared afterwards.
    #[serde(default)]
    pub team_switch_locked: bool,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
}

/// How a question expects to be answered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Answer must match one of the listed options.
    #[default]
    MultipleChoice,
    /// Implicit `True` / `False` options.
    TrueFalse,
}

/// Question definition owned by an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionEntity {
    /// Stable identifier for the question.
    pub id: Uuid,
    /// Event this question belongs to.
    pub event_id: Uuid,
    /// Position of the question within its event.
    pub ordinal: u32,
    /// Prompt displayed to participants.
    pub prompt: String,
    /// Multiple choice or true/false.
    #[serde(default)]
    pub kind: QuestionKind,
    /// Answer options (empty for true/false questions).
    #[serde(default)]
    pub options: Vec<String>,
    /// Designated correct answer text.
    pub correct_answer: String,
    /// Seconds allotted to answer once the question is shown.
    pub time_limit_secs: u32,
    /// Explanation shown when the answer is revealed.
    #[serde(default)]
    pub explanation: Option<String>,
    /// Descriptive difficulty tag, not used by scoring.
    #[serde(default)]
    pub difficulty: Option<String>,
    /// Descriptive category tag, not used by scoring.
    #[serde(default)]
    pub category: Option<String>,
}

/// Team registered for an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamEntity {
    /// Stable identifier for the team.
    pub id: Uuid,
    /// Event this team belongs to.
    pub event_id: Uuid,
    /// Display name chosen for the team.
    pub name: String,
    /// Optional table/seat number in the venue.
    #[serde(default)]
    pub table_number: Option<u32>,
    /// Optional capacity overriding the configured default.
    #[serde(default)]
    pub max_members: Option<u32>,
}

/// Participant registered for an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParticipantEntity {
    /// Stable identifier for the participant.
    pub id: Uuid,
    /// Event this participant registered for.
    pub event_id: Uuid,
    /// Display name.
    pub name: String,
    /// Team the participant currently belongs to, if any.
    #[serde(default)]
    pub team_id: Option<Uuid>,
    /// Whether the participant may still change teams.
    pub can_switch_team: bool,
    /// Inactive participants are left out of the participant leaderboard.
    pub is_active: bool,
    /// Last time the participant interacted with the event.
    pub last_active_at: SystemTime,
}

/// One scored answer submission. Responses are append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseEntity {
    /// Stable identifier for the response.
    pub id: Uuid,
    /// Event shared by the participant and the question.
    pub event_id: Uuid,
    /// Participant who submitted the answer.
    pub participant_id: Uuid,
    /// Question being answered.
    pub question_id: Uuid,
    /// Raw submitted answer text.
    pub answer: String,
    /// Derived correctness flag.
    pub is_correct: bool,
    /// Derived point value.
    pub points: u32,
    /// Client-reported seconds left on the countdown.
    #[serde(default)]
    pub time_remaining_secs: Option<f64>,
    /// Client-reported seconds taken to answer.
    #[serde(default)]
    pub response_time_secs: Option<f64>,
    /// Server-side submission timestamp.
    pub submitted_at: SystemTime,
}
