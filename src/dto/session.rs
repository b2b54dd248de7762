//! DTOs for the presenter session routes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::phase::{VisiblePhase, VisibleStandingsOrigin},
    state::{SessionEvent, SessionSnapshot},
};

/// Host command accepted on `POST /events/{event_id}/session/{command}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SessionCommand {
    /// Idle to briefing.
    Start,
    /// Briefing to the first question; freezes team membership.
    BeginQuestions,
    /// Show the correct answer.
    Reveal,
    /// Move to the next question, or finish after the last one.
    Next,
    /// Show the leaderboard.
    ShowLeaderboard,
    /// Leave the leaderboard.
    Continue,
    /// Back to idle from anywhere.
    Restart,
    /// Stop the countdown.
    Pause,
    /// Restart a paused countdown.
    Resume,
}

impl From<SessionCommand> for SessionEvent {
    fn from(value: SessionCommand) -> Self {
        match value {
            SessionCommand::Start => SessionEvent::Start,
            SessionCommand::BeginQuestions => SessionEvent::BeginQuestions,
            SessionCommand::Reveal => SessionEvent::Reveal,
            SessionCommand::Next => SessionEvent::Next,
            SessionCommand::ShowLeaderboard => SessionEvent::ShowLeaderboard,
            SessionCommand::Continue => SessionEvent::Continue,
            SessionCommand::Restart => SessionEvent::Restart,
            SessionCommand::Pause => SessionEvent::Pause,
            SessionCommand::Resume => SessionEvent::Resume,
        }
    }
}

/// Toggle the automatic reveal of expired questions.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AutoAdvanceRequest {
    pub enabled: bool,
}

/// Session state returned by every session route.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionView {
    pub event_id: Uuid,
    pub phase: VisiblePhase,
    /// Set while the leaderboard is shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standings_origin: Option<VisibleStandingsOrigin>,
    /// Zero-based index of the current question.
    pub question_index: usize,
    /// Present once questions have begun.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_id: Option<Uuid>,
    pub question_count: usize,
    pub remaining_secs: u32,
    pub timer_running: bool,
    pub auto_advance: bool,
    pub team_switch_locked: bool,
    /// Increases on every change; lets pollers skip unchanged snapshots.
    pub version: u64,
}

impl From<SessionSnapshot> for SessionView {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self {
            event_id: snapshot.event_id,
            phase: VisiblePhase::from(&snapshot.phase),
            standings_origin: VisibleStandingsOrigin::of(&snapshot.phase),
            question_index: snapshot.question_index,
            question_id: snapshot.question_id,
            question_count: snapshot.question_count,
            remaining_secs: snapshot.countdown.remaining_secs,
            timer_running: snapshot.countdown.running,
            auto_advance: snapshot.auto_advance,
            team_switch_locked: snapshot.team_switch_locked,
            version: snapshot.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_use_kebab_case_names() {
        let command: SessionCommand = serde_json::from_str("\"begin-questions\"").unwrap();
        assert_eq!(command, SessionCommand::BeginQuestions);
        assert_eq!(
            SessionEvent::from(command),
            SessionEvent::BeginQuestions
        );

        let command: SessionCommand = serde_json::from_str("\"show-leaderboard\"").unwrap();
        assert_eq!(SessionEvent::from(command), SessionEvent::ShowLeaderboard);
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(serde_json::from_str::<SessionCommand>("\"skip\"").is_err());
    }
}
